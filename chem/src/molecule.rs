use crate::element::Element;
use crate::error::ChemError;

/// Bond multiplicity. Aromatic bonds count as one valence unit; the extra
/// pi electron is accounted for on the atom.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BondOrder {
    Single,
    Double,
    Triple,
    Quadruple,
    Aromatic,
}

impl BondOrder {
    pub fn valence(self) -> u8 {
        match self {
            Self::Single | Self::Aromatic => 1,
            Self::Double => 2,
            Self::Triple => 3,
            Self::Quadruple => 4,
        }
    }

    pub(crate) fn code(self) -> u64 {
        match self {
            Self::Single => 1,
            Self::Double => 2,
            Self::Triple => 3,
            Self::Quadruple => 4,
            Self::Aromatic => 5,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Atom {
    pub element: Element,
    pub aromatic: bool,
    pub charge: i8,
    pub isotope: Option<u16>,
    /// Set for bracket atoms, whose hydrogen count is never implicit.
    pub explicit_hydrogens: Option<u8>,
}

impl Atom {
    pub fn new(element: Element) -> Self {
        Self {
            element,
            aromatic: false,
            charge: 0,
            isotope: None,
            explicit_hydrogens: None,
        }
    }

    pub fn aromatic(element: Element) -> Self {
        Self {
            aromatic: true,
            ..Self::new(element)
        }
    }

    pub fn is_bracket(&self) -> bool {
        self.explicit_hydrogens.is_some()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Bond {
    pub a: usize,
    pub b: usize,
    pub order: BondOrder,
}

impl Bond {
    pub fn other(&self, atom: usize) -> usize {
        if self.a == atom { self.b } else { self.a }
    }
}

/// Undirected molecular graph with hydrogens kept implicit.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Molecule {
    atoms: Vec<Atom>,
    bonds: Vec<Bond>,
    /// For each atom: (neighbour, bond index).
    adjacency: Vec<Vec<(usize, usize)>>,
}

impl Molecule {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_atom(&mut self, atom: Atom) -> usize {
        self.atoms.push(atom);
        self.adjacency.push(Vec::new());
        self.atoms.len() - 1
    }

    /// Adds a bond, returning its index, or `None` when the atoms are the
    /// same or already bonded.
    pub fn add_bond(&mut self, a: usize, b: usize, order: BondOrder) -> Option<usize> {
        if a == b
            || a >= self.atoms.len()
            || b >= self.atoms.len()
            || self.bond_between(a, b).is_some()
        {
            return None;
        }
        let index = self.bonds.len();
        self.bonds.push(Bond { a, b, order });
        self.adjacency[a].push((b, index));
        self.adjacency[b].push((a, index));
        Some(index)
    }

    pub fn atoms(&self) -> &[Atom] {
        &self.atoms
    }

    pub fn atom(&self, index: usize) -> &Atom {
        &self.atoms[index]
    }

    pub fn bonds(&self) -> &[Bond] {
        &self.bonds
    }

    pub fn atom_count(&self) -> usize {
        self.atoms.len()
    }

    pub fn bond_count(&self) -> usize {
        self.bonds.len()
    }

    pub fn is_empty(&self) -> bool {
        self.atoms.is_empty()
    }

    pub fn neighbors(&self, atom: usize) -> &[(usize, usize)] {
        &self.adjacency[atom]
    }

    pub fn degree(&self, atom: usize) -> usize {
        self.adjacency[atom].len()
    }

    pub fn bond_between(&self, a: usize, b: usize) -> Option<&Bond> {
        self.adjacency
            .get(a)?
            .iter()
            .find(|(neighbor, _)| *neighbor == b)
            .map(|(_, bond)| &self.bonds[*bond])
    }

    fn bond_valence_sum(&self, atom: usize) -> u16 {
        self.adjacency[atom]
            .iter()
            .map(|(_, bond)| u16::from(self.bonds[*bond].order.valence()))
            .sum()
    }

    /// Implicit hydrogen count from the lowest default valence that fits the
    /// current bonds, or `None` when no valence fits.
    fn implied_hydrogens(&self, atom: usize) -> Option<u8> {
        let info = &self.atoms[atom];
        let bonded = self.bond_valence_sum(atom);
        let fit = |used: u16| {
            info.element
                .default_valences()
                .iter()
                .map(|valence| u16::from(*valence))
                .find(|valence| *valence >= used)
                .map(|valence| (valence - used) as u8)
        };
        if info.aromatic && info.element.takes_aromatic_valence() {
            // Pyridone-style exocyclic double bonds leave no room for the extra unit.
            fit(bonded + 1).or_else(|| fit(bonded))
        } else {
            fit(bonded)
        }
    }

    /// Attached hydrogens: explicit for bracket atoms, implied otherwise.
    pub fn hydrogen_count(&self, atom: usize) -> u8 {
        match self.atoms[atom].explicit_hydrogens {
            Some(count) => count,
            None => self.implied_hydrogens(atom).unwrap_or(0),
        }
    }

    /// Whether a bracket atom could be written without brackets.
    pub(crate) fn hydrogens_are_implied(&self, atom: usize) -> bool {
        match self.atoms[atom].explicit_hydrogens {
            None => true,
            Some(count) => self.implied_hydrogens(atom) == Some(count),
        }
    }

    /// Checks valences and that every aromatic atom sits in a ring.
    pub fn validate(&self) -> Result<(), ChemError> {
        let ring_atoms = self.ring_atoms();
        for (index, atom) in self.atoms.iter().enumerate() {
            if atom.aromatic && !ring_atoms[index] {
                return Err(ChemError::AromaticOutsideRing { index });
            }
            let exceeded = match atom.explicit_hydrogens {
                None => self.implied_hydrogens(index).is_none(),
                // Charged bracket atoms follow isoelectronic valences; only
                // neutral ones are checked here.
                Some(hydrogens) if atom.charge == 0 => {
                    self.bond_valence_sum(index) + u16::from(hydrogens)
                        > u16::from(atom.element.max_valence())
                }
                Some(_) => false,
            };
            if exceeded {
                return Err(ChemError::ValenceExceeded {
                    index,
                    symbol: atom.element.symbol().to_string(),
                });
            }
        }
        Ok(())
    }

    /// Flags bonds that lie on at least one cycle (non-bridges).
    pub fn ring_bonds(&self) -> Vec<bool> {
        let n = self.atoms.len();
        let mut discovery = vec![usize::MAX; n];
        let mut low = vec![0usize; n];
        let mut is_bridge = vec![false; self.bonds.len()];
        let mut timer = 0usize;

        for root in 0..n {
            if discovery[root] != usize::MAX {
                continue;
            }
            // Iterative DFS: (atom, bond used to enter, next adjacency slot).
            let mut stack: Vec<(usize, Option<usize>, usize)> = vec![(root, None, 0)];
            discovery[root] = timer;
            low[root] = timer;
            timer += 1;

            while let Some(frame) = stack.last_mut() {
                let (atom, via, slot) = *frame;
                if let Some(&(next, bond)) = self.adjacency[atom].get(slot) {
                    frame.2 += 1;
                    if Some(bond) == via {
                        continue;
                    }
                    if discovery[next] == usize::MAX {
                        discovery[next] = timer;
                        low[next] = timer;
                        timer += 1;
                        stack.push((next, Some(bond), 0));
                    } else {
                        low[atom] = low[atom].min(discovery[next]);
                    }
                } else {
                    stack.pop();
                    if let (Some(bond), Some(&(parent, _, _))) = (via, stack.last()) {
                        low[parent] = low[parent].min(low[atom]);
                        if low[atom] > discovery[parent] {
                            is_bridge[bond] = true;
                        }
                    }
                }
            }
        }

        is_bridge.into_iter().map(|bridge| !bridge).collect()
    }

    pub fn ring_atoms(&self) -> Vec<bool> {
        let mut in_ring = vec![false; self.atoms.len()];
        for (bond, ring) in self.bonds.iter().zip(self.ring_bonds()) {
            if ring {
                in_ring[bond.a] = true;
                in_ring[bond.b] = true;
            }
        }
        in_ring
    }

    /// Number of connected components.
    pub fn component_count(&self) -> usize {
        let mut seen = vec![false; self.atoms.len()];
        let mut components = 0;
        for start in 0..self.atoms.len() {
            if seen[start] {
                continue;
            }
            components += 1;
            let mut stack = vec![start];
            seen[start] = true;
            while let Some(atom) = stack.pop() {
                for &(next, _) in &self.adjacency[atom] {
                    if !seen[next] {
                        seen[next] = true;
                        stack.push(next);
                    }
                }
            }
        }
        components
    }

    /// Cyclomatic number: the size of the smallest set of smallest rings.
    pub fn ring_count(&self) -> usize {
        (self.bonds.len() + self.component_count()).saturating_sub(self.atoms.len())
    }

    /// The subgraph induced by the atoms flagged in `keep`, re-indexed.
    pub fn induced_subgraph(&self, keep: &[bool]) -> Molecule {
        let mut mapping = vec![None; self.atoms.len()];
        let mut sub = Molecule::new();
        for (index, atom) in self.atoms.iter().enumerate() {
            if keep[index] {
                mapping[index] = Some(sub.add_atom(atom.clone()));
            }
        }
        for bond in &self.bonds {
            if let (Some(a), Some(b)) = (mapping[bond.a], mapping[bond.b]) {
                sub.add_bond(a, b, bond.order);
            }
        }
        sub
    }

    /// A copy with atoms and bonds rewritten by the given functions.
    pub fn map_graph(
        &self,
        atom_fn: impl Fn(&Atom) -> Atom,
        bond_fn: impl Fn(&Bond) -> BondOrder,
    ) -> Molecule {
        let mut mapped = Molecule::new();
        for atom in &self.atoms {
            mapped.add_atom(atom_fn(atom));
        }
        for bond in &self.bonds {
            mapped.add_bond(bond.a, bond.b, bond_fn(bond));
        }
        mapped
    }
}
