//! Backtracking subgraph matching.

use crate::molecule::Molecule;

struct Matcher<'a> {
    query: &'a Molecule,
    target: &'a Molecule,
    /// Query atoms in visiting order, each with an already-visited neighbour
    /// to extend from when one exists.
    order: Vec<(usize, Option<usize>)>,
    mapping: Vec<Option<usize>>,
    used: Vec<bool>,
}

impl<'a> Matcher<'a> {
    fn new(query: &'a Molecule, target: &'a Molecule) -> Self {
        let mut order = Vec::with_capacity(query.atom_count());
        let mut placed = vec![false; query.atom_count()];
        for root in 0..query.atom_count() {
            if placed[root] {
                continue;
            }
            placed[root] = true;
            order.push((root, None));
            let mut cursor = order.len() - 1;
            while cursor < order.len() {
                let (atom, _) = order[cursor];
                for &(next, _) in query.neighbors(atom) {
                    if !placed[next] {
                        placed[next] = true;
                        order.push((next, Some(atom)));
                    }
                }
                cursor += 1;
            }
        }
        Self {
            query,
            target,
            order,
            mapping: vec![None; query.atom_count()],
            used: vec![false; target.atom_count()],
        }
    }

    fn atoms_compatible(&self, q: usize, t: usize) -> bool {
        let qa = self.query.atom(q);
        let ta = self.target.atom(t);
        qa.element == ta.element
            && qa.aromatic == ta.aromatic
            && (qa.charge == 0 || qa.charge == ta.charge)
            && self.target.degree(t) >= self.query.degree(q)
    }

    fn bonds_consistent(&self, q: usize, t: usize) -> bool {
        self.query.neighbors(q).iter().all(|&(qn, qbond)| {
            match self.mapping[qn] {
                None => true,
                Some(tn) => self
                    .target
                    .bond_between(t, tn)
                    .is_some_and(|tb| tb.order == self.query.bonds()[qbond].order),
            }
        })
    }

    fn extend(&mut self, depth: usize) -> bool {
        let Some(&(q, anchor)) = self.order.get(depth) else {
            return true;
        };
        let candidates: Vec<usize> = match anchor.and_then(|a| self.mapping[a]) {
            Some(anchor_image) => self
                .target
                .neighbors(anchor_image)
                .iter()
                .map(|(n, _)| *n)
                .collect(),
            None => (0..self.target.atom_count()).collect(),
        };
        for t in candidates {
            if self.used[t] || !self.atoms_compatible(q, t) || !self.bonds_consistent(q, t) {
                continue;
            }
            self.mapping[q] = Some(t);
            self.used[t] = true;
            if self.extend(depth + 1) {
                return true;
            }
            self.mapping[q] = None;
            self.used[t] = false;
        }
        false
    }
}

impl Molecule {
    /// Whether `query` occurs in this molecule as a subgraph with matching
    /// elements, aromaticity and bond orders. Charges in the query must match
    /// when set; hydrogen counts are ignored.
    pub fn has_substructure(&self, query: &Molecule) -> bool {
        if query.atom_count() > self.atom_count() || query.bond_count() > self.bond_count() {
            return false;
        }
        Matcher::new(query, self).extend(0)
    }
}
