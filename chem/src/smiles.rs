//! SMILES reading and writing.

use crate::canon::canonical_ranks;
use crate::element::Element;
use crate::error::ChemError;
use crate::molecule::{Atom, BondOrder, Molecule};
use crate::tokenizer::tokenize;
use std::collections::HashMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum BondSymbol {
    Single,
    Double,
    Triple,
    Quadruple,
    Aromatic,
}

impl BondSymbol {
    fn from_token(token: &str) -> Option<Self> {
        match token {
            "-" | "/" | "\\" => Some(Self::Single),
            "=" => Some(Self::Double),
            "#" => Some(Self::Triple),
            "$" => Some(Self::Quadruple),
            ":" => Some(Self::Aromatic),
            _ => None,
        }
    }

    fn order(self) -> BondOrder {
        match self {
            Self::Single => BondOrder::Single,
            Self::Double => BondOrder::Double,
            Self::Triple => BondOrder::Triple,
            Self::Quadruple => BondOrder::Quadruple,
            Self::Aromatic => BondOrder::Aromatic,
        }
    }
}

fn implicit_order(mol: &Molecule, a: usize, b: usize) -> BondOrder {
    if mol.atom(a).aromatic && mol.atom(b).aromatic {
        BondOrder::Aromatic
    } else {
        BondOrder::Single
    }
}

fn ring_label(token: &str) -> Option<u16> {
    if let Some(digits) = token.strip_prefix('%') {
        return digits.parse().ok();
    }
    let mut chars = token.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) => c.to_digit(10).map(|d| d as u16),
        _ => None,
    }
}

fn organic_atom(token: &str) -> Option<Atom> {
    if let Some(element) = Element::from_aromatic_symbol(token) {
        return Some(Atom::aromatic(element));
    }
    Element::from_symbol(token)
        .filter(|element| element.is_organic_subset())
        .map(Atom::new)
}

/// Parses the inside of `[...]`: isotope, symbol, chirality, H count, charge
/// and atom class.
fn bracket_atom(token: &str) -> Result<Atom, ChemError> {
    let malformed = || ChemError::MalformedBracketAtom {
        token: token.to_string(),
    };
    let body: Vec<char> = token
        .strip_prefix('[')
        .and_then(|t| t.strip_suffix(']'))
        .ok_or_else(malformed)?
        .chars()
        .collect();
    let mut pos = 0;

    let mut isotope = String::new();
    while pos < body.len() && body[pos].is_ascii_digit() {
        isotope.push(body[pos]);
        pos += 1;
    }

    let first = *body.get(pos).ok_or_else(malformed)?;
    let second = body.get(pos + 1).copied();
    let mut atom = if first.is_ascii_lowercase() {
        let two: String = [Some(first), second].into_iter().flatten().collect();
        if let Some(element) = Element::from_aromatic_symbol(&two).filter(|_| two == "se") {
            pos += 2;
            Atom::aromatic(element)
        } else if let Some(element) = Element::from_aromatic_symbol(&first.to_string()) {
            pos += 1;
            Atom::aromatic(element)
        } else {
            return Err(ChemError::UnknownElement {
                symbol: first.to_string(),
            });
        }
    } else if first.is_ascii_uppercase() {
        let two: Option<String> = second
            .filter(char::is_ascii_lowercase)
            .map(|s| format!("{first}{s}"));
        match two.as_deref().and_then(Element::from_symbol) {
            Some(element) => {
                pos += 2;
                Atom::new(element)
            }
            None => {
                let symbol = first.to_string();
                let element = Element::from_symbol(&symbol)
                    .ok_or(ChemError::UnknownElement { symbol })?;
                pos += 1;
                Atom::new(element)
            }
        }
    } else {
        return Err(malformed());
    };

    if !isotope.is_empty() {
        atom.isotope = Some(isotope.parse().map_err(|_| malformed())?);
    }

    while pos < body.len() && body[pos] == '@' {
        pos += 1;
    }

    let mut hydrogens = 0u8;
    if pos < body.len() && body[pos] == 'H' {
        pos += 1;
        hydrogens = 1;
        if let Some(digit) = body.get(pos).and_then(|c| c.to_digit(10)) {
            hydrogens = digit as u8;
            pos += 1;
        }
    }
    atom.explicit_hydrogens = Some(hydrogens);

    if pos < body.len() && (body[pos] == '+' || body[pos] == '-') {
        let sign: i8 = if body[pos] == '+' { 1 } else { -1 };
        let symbol = body[pos];
        pos += 1;
        let mut magnitude: i8 = 1;
        if let Some(digit) = body.get(pos).and_then(|c| c.to_digit(10)) {
            magnitude = digit as i8;
            pos += 1;
        } else {
            while pos < body.len() && body[pos] == symbol {
                magnitude = magnitude.saturating_add(1);
                pos += 1;
            }
        }
        atom.charge = sign * magnitude;
    }

    if pos < body.len() && body[pos] == ':' {
        pos += 1;
        while pos < body.len() && body[pos].is_ascii_digit() {
            pos += 1;
        }
    }

    if pos != body.len() {
        return Err(malformed());
    }
    Ok(atom)
}

impl Molecule {
    /// Parses and validates a SMILES string.
    pub fn from_smiles(smiles: &str) -> Result<Self, ChemError> {
        let tokens = tokenize(smiles.trim());
        if tokens.is_empty() {
            return Err(ChemError::Empty);
        }

        let mut mol = Molecule::new();
        let mut previous: Option<usize> = None;
        let mut branches: Vec<Option<usize>> = Vec::new();
        let mut pending: Option<(BondSymbol, usize)> = None;
        let mut open_rings: HashMap<u16, (usize, Option<BondSymbol>)> = HashMap::new();

        for (position, token) in tokens.iter().enumerate() {
            let token = token.as_str();

            let atom = if token.starts_with('[') {
                Some(bracket_atom(token)?)
            } else {
                organic_atom(token)
            };
            if let Some(atom) = atom {
                let index = mol.add_atom(atom);
                match (previous, pending.take()) {
                    (Some(prev), Some((symbol, _))) => {
                        mol.add_bond(prev, index, symbol.order());
                    }
                    (Some(prev), None) => {
                        let order = implicit_order(&mol, prev, index);
                        mol.add_bond(prev, index, order);
                    }
                    (None, Some((_, at))) => {
                        return Err(ChemError::DanglingBond { position: at });
                    }
                    (None, None) => {}
                }
                previous = Some(index);
                continue;
            }

            if let Some(symbol) = BondSymbol::from_token(token) {
                if pending.is_some() || previous.is_none() {
                    return Err(ChemError::DanglingBond { position });
                }
                pending = Some((symbol, position));
                continue;
            }

            if let Some(label) = ring_label(token) {
                let atom = previous.ok_or(ChemError::UnexpectedToken {
                    token: token.to_string(),
                    position,
                })?;
                let symbol = pending.take().map(|(symbol, _)| symbol);
                match open_rings.remove(&label) {
                    Some((partner, opening)) => {
                        let order = match (opening, symbol) {
                            (Some(a), Some(b)) if a != b => {
                                return Err(ChemError::InvalidRingClosure {
                                    label,
                                    reason: "conflicting bond symbols".to_string(),
                                });
                            }
                            (Some(s), _) | (None, Some(s)) => s.order(),
                            (None, None) => implicit_order(&mol, partner, atom),
                        };
                        if mol.add_bond(partner, atom, order).is_none() {
                            return Err(ChemError::InvalidRingClosure {
                                label,
                                reason: "closes onto the same or an already bonded atom"
                                    .to_string(),
                            });
                        }
                    }
                    None => {
                        open_rings.insert(label, (atom, symbol));
                    }
                }
                continue;
            }

            match token {
                "(" => {
                    if previous.is_none() || pending.is_some() {
                        return Err(ChemError::UnbalancedBranch { position });
                    }
                    branches.push(previous);
                }
                ")" => {
                    if pending.is_some() {
                        return Err(ChemError::DanglingBond { position });
                    }
                    previous = branches
                        .pop()
                        .ok_or(ChemError::UnbalancedBranch { position })?;
                }
                "." => {
                    if pending.is_some() || !branches.is_empty() {
                        return Err(ChemError::UnexpectedToken {
                            token: token.to_string(),
                            position,
                        });
                    }
                    previous = None;
                }
                other => {
                    return Err(if other.chars().all(char::is_alphabetic) {
                        ChemError::UnknownElement {
                            symbol: other.to_string(),
                        }
                    } else {
                        ChemError::UnexpectedToken {
                            token: other.to_string(),
                            position,
                        }
                    });
                }
            }
        }

        if let Some((_, position)) = pending {
            return Err(ChemError::DanglingBond { position });
        }
        if !branches.is_empty() {
            return Err(ChemError::UnbalancedBranch {
                position: tokens.len(),
            });
        }
        if let Some(label) = open_rings.keys().min() {
            return Err(ChemError::UnclosedRing { label: *label });
        }
        if mol.is_empty() {
            return Err(ChemError::Empty);
        }

        mol.validate()?;
        Ok(mol)
    }

    /// Writes a SMILES string. Atoms are visited depth-first from the lowest
    /// canonical rank with neighbours in rank order, so graph-equal molecules
    /// usually produce the same string.
    pub fn to_smiles(&self) -> String {
        if self.is_empty() {
            return String::new();
        }
        let ranks = canonical_ranks(self);
        let order_key = |atom: usize| (ranks[atom], atom);

        let mut visited = vec![false; self.atom_count()];
        let mut fragments = Vec::new();
        let mut starts: Vec<usize> = (0..self.atom_count()).collect();
        starts.sort_by_key(|&atom| order_key(atom));

        for start in starts {
            if visited[start] {
                continue;
            }
            // Spanning tree first; every other bond in the fragment is a ring closure.
            let mut children: Vec<Vec<usize>> = vec![Vec::new(); self.atom_count()];
            let mut closures: Vec<Vec<usize>> = vec![Vec::new(); self.atom_count()];
            let mut tree_bond = vec![false; self.bond_count()];
            let mut seen = visited.clone();
            self.build_tree(start, &mut seen, &mut children, &mut tree_bond, &order_key);
            for (index, bond) in self.bonds().iter().enumerate() {
                if !tree_bond[index] && seen[bond.a] && seen[bond.b] && !visited[bond.a] {
                    closures[bond.a].push(index);
                    closures[bond.b].push(index);
                }
            }

            let mut out = String::new();
            let mut ring_numbers: HashMap<usize, u16> = HashMap::new();
            let mut free_labels: Vec<u16> = Vec::new();
            let mut next_label = 1u16;
            self.write_atom(
                start,
                None,
                &children,
                &closures,
                &mut ring_numbers,
                &mut free_labels,
                &mut next_label,
                &mut out,
            );
            for (atom, was) in seen.iter().enumerate() {
                if *was {
                    visited[atom] = true;
                }
            }
            fragments.push(out);
        }
        fragments.join(".")
    }

    fn build_tree(
        &self,
        start: usize,
        seen: &mut [bool],
        children: &mut [Vec<usize>],
        tree_bond: &mut [bool],
        order_key: &impl Fn(usize) -> (usize, usize),
    ) {
        // Iterative DFS that mirrors recursive visiting order.
        let mut stack: Vec<(usize, usize)> = vec![(start, 0)];
        seen[start] = true;
        let mut sorted_neighbors: HashMap<usize, Vec<(usize, usize)>> = HashMap::new();
        while let Some(frame) = stack.last_mut() {
            let (atom, slot) = *frame;
            let neighbors = sorted_neighbors.entry(atom).or_insert_with(|| {
                let mut list = self.neighbors(atom).to_vec();
                list.sort_by_key(|(n, _)| order_key(*n));
                list
            });
            if let Some(&(next, bond)) = neighbors.get(slot) {
                frame.1 += 1;
                if !seen[next] {
                    seen[next] = true;
                    tree_bond[bond] = true;
                    children[atom].push(next);
                    stack.push((next, 0));
                }
            } else {
                stack.pop();
            }
        }
    }

    fn bond_symbol(&self, bond: usize) -> &'static str {
        let bond = self.bonds()[bond];
        let both_aromatic = self.atom(bond.a).aromatic && self.atom(bond.b).aromatic;
        match bond.order {
            BondOrder::Single if both_aromatic => "-",
            BondOrder::Single | BondOrder::Aromatic => "",
            BondOrder::Double => "=",
            BondOrder::Triple => "#",
            BondOrder::Quadruple => "$",
        }
    }

    fn atom_symbol(&self, atom: usize) -> String {
        let info = self.atom(atom);
        let symbol = if info.aromatic {
            info.element.symbol().to_lowercase()
        } else {
            info.element.symbol().to_string()
        };
        let plain = info.element.is_organic_subset()
            && info.charge == 0
            && info.isotope.is_none()
            && self.hydrogens_are_implied(atom);
        if plain {
            return symbol;
        }

        let mut out = String::from("[");
        if let Some(isotope) = info.isotope {
            out.push_str(&isotope.to_string());
        }
        out.push_str(&symbol);
        match self.hydrogen_count(atom) {
            0 => {}
            1 => out.push('H'),
            n => out.push_str(&format!("H{n}")),
        }
        match info.charge {
            0 => {}
            1 => out.push('+'),
            -1 => out.push('-'),
            c if c > 0 => out.push_str(&format!("+{c}")),
            c => out.push_str(&format!("-{}", -c)),
        }
        out.push(']');
        out
    }

    fn write_atom(
        &self,
        atom: usize,
        via_bond: Option<usize>,
        children: &[Vec<usize>],
        closures: &[Vec<usize>],
        ring_numbers: &mut HashMap<usize, u16>,
        free_labels: &mut Vec<u16>,
        next_label: &mut u16,
        out: &mut String,
    ) {
        if let Some(bond) = via_bond {
            out.push_str(self.bond_symbol(bond));
        }
        out.push_str(&self.atom_symbol(atom));

        for &bond in &closures[atom] {
            match ring_numbers.remove(&bond) {
                Some(label) => {
                    out.push_str(self.bond_symbol(bond));
                    push_ring_label(out, label);
                    free_labels.push(label);
                    free_labels.sort_unstable_by(|a, b| b.cmp(a));
                }
                None => {
                    let label = free_labels.pop().unwrap_or_else(|| {
                        let label = *next_label;
                        *next_label += 1;
                        label
                    });
                    ring_numbers.insert(bond, label);
                    push_ring_label(out, label);
                }
            }
        }

        let kids = &children[atom];
        for (i, &child) in kids.iter().enumerate() {
            let bond = self
                .neighbors(atom)
                .iter()
                .find(|(n, _)| *n == child)
                .map(|(_, b)| *b);
            let last = i + 1 == kids.len();
            if !last {
                out.push('(');
            }
            self.write_atom(
                child,
                bond,
                children,
                closures,
                ring_numbers,
                free_labels,
                next_label,
                out,
            );
            if !last {
                out.push(')');
            }
        }
    }
}

fn push_ring_label(out: &mut String, label: u16) {
    if label < 10 {
        out.push_str(&label.to_string());
    } else {
        out.push_str(&format!("%{label:02}"));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_simple_chain() {
        let mol = Molecule::from_smiles("CCO").unwrap();
        assert_eq!(mol.atom_count(), 3);
        assert_eq!(mol.bond_count(), 2);
        assert_eq!(mol.atom(2).element, Element::O);
    }

    #[test]
    fn test_parse_benzene_is_aromatic_ring() {
        let mol = Molecule::from_smiles("c1ccccc1").unwrap();
        assert_eq!(mol.ring_count(), 1);
        assert!(mol.bonds().iter().all(|b| b.order == BondOrder::Aromatic));
        assert_eq!(mol.hydrogen_count(0), 1);
    }

    #[test]
    fn test_parse_branches_and_double_bonds() {
        let mol = Molecule::from_smiles("CC(=O)O").unwrap();
        assert_eq!(mol.degree(1), 3);
        assert_eq!(mol.bond_between(1, 2).unwrap().order, BondOrder::Double);
    }

    #[test]
    fn test_parse_bracket_atoms() {
        let mol = Molecule::from_smiles("C[NH3+]").unwrap();
        let nitrogen = mol.atom(1);
        assert_eq!(nitrogen.charge, 1);
        assert_eq!(nitrogen.explicit_hydrogens, Some(3));

        let pyrrole = Molecule::from_smiles("c1cc[nH]c1").unwrap();
        assert_eq!(pyrrole.hydrogen_count(3), 1);

        let isotope = Molecule::from_smiles("[13CH4]").unwrap();
        assert_eq!(isotope.atom(0).isotope, Some(13));
    }

    #[test]
    fn test_parse_heteroaromatics() {
        assert!(Molecule::from_smiles("c1ccncc1").is_ok());
        assert!(Molecule::from_smiles("o1cccc1").is_ok());
        assert!(Molecule::from_smiles("s1cccc1").is_ok());
    }

    #[test]
    fn test_parse_disconnected() {
        let mol = Molecule::from_smiles("CCO.Cl").unwrap();
        assert_eq!(mol.component_count(), 2);
    }

    #[test]
    fn test_invalid_smiles_are_rejected() {
        assert_eq!(Molecule::from_smiles(""), Err(ChemError::Empty));
        assert!(matches!(
            Molecule::from_smiles("C1CC"),
            Err(ChemError::UnclosedRing { label: 1 })
        ));
        assert!(matches!(
            Molecule::from_smiles("CC(C"),
            Err(ChemError::UnbalancedBranch { .. })
        ));
        assert!(matches!(
            Molecule::from_smiles("CC)C"),
            Err(ChemError::UnbalancedBranch { .. })
        ));
        assert!(matches!(
            Molecule::from_smiles("=CC"),
            Err(ChemError::DanglingBond { .. })
        ));
        assert!(matches!(
            Molecule::from_smiles("CC="),
            Err(ChemError::DanglingBond { .. })
        ));
        assert!(matches!(
            Molecule::from_smiles("C(C)(C)(C)(C)C"),
            Err(ChemError::ValenceExceeded { .. })
        ));
        assert!(matches!(
            Molecule::from_smiles("ccc"),
            Err(ChemError::AromaticOutsideRing { .. })
        ));
        assert!(matches!(
            Molecule::from_smiles("CXC"),
            Err(ChemError::UnknownElement { .. })
        ));
        assert!(matches!(
            Molecule::from_smiles("C11"),
            Err(ChemError::InvalidRingClosure { .. })
        ));
    }

    #[test]
    fn test_written_smiles_reparses_to_same_graph() {
        for smiles in [
            "CCO",
            "c1ccccc1O",
            "CC(=O)Oc1ccccc1C(=O)O",
            "C1CC2CCC1CC2",
            "C[NH3+].[Cl-]",
            "O=C1CCCCN1",
        ] {
            let mol = Molecule::from_smiles(smiles).unwrap();
            let written = mol.to_smiles();
            let reparsed = Molecule::from_smiles(&written).unwrap();
            assert_eq!(
                crate::canon::graph_key(&mol),
                crate::canon::graph_key(&reparsed),
                "{smiles} -> {written}"
            );
        }
    }

    #[test]
    fn test_writer_is_order_independent_for_simple_cases() {
        let a = Molecule::from_smiles("OCC").unwrap().to_smiles();
        let b = Molecule::from_smiles("CCO").unwrap().to_smiles();
        assert_eq!(a, b);
    }
}
