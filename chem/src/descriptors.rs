//! Simple physico-chemical descriptors.

use crate::element::Element;
use crate::molecule::{BondOrder, Molecule};

const HYDROGEN_MASS: f64 = 1.008;

impl Molecule {
    /// Average molecular weight including implicit hydrogens.
    pub fn molecular_weight(&self) -> f64 {
        (0..self.atom_count())
            .map(|atom| {
                self.atom(atom).element.atomic_mass()
                    + f64::from(self.hydrogen_count(atom)) * HYDROGEN_MASS
            })
            .sum()
    }

    pub fn heavy_atom_count(&self) -> usize {
        self.atoms()
            .iter()
            .filter(|atom| atom.element != Element::H)
            .count()
    }

    fn heavy_degree(&self, atom: usize) -> usize {
        self.neighbors(atom)
            .iter()
            .filter(|(next, _)| self.atom(*next).element != Element::H)
            .count()
    }

    /// Acyclic single bonds between two non-terminal heavy atoms, excluding
    /// bonds next to a triple bond.
    pub fn rotatable_bonds(&self) -> usize {
        let ring_bonds = self.ring_bonds();
        let next_to_triple = |atom: usize| {
            self.neighbors(atom)
                .iter()
                .any(|(_, bond)| self.bonds()[*bond].order == BondOrder::Triple)
        };
        self.bonds()
            .iter()
            .enumerate()
            .filter(|(index, bond)| {
                bond.order == BondOrder::Single
                    && !ring_bonds[*index]
                    && self.heavy_degree(bond.a) > 1
                    && self.heavy_degree(bond.b) > 1
                    && !next_to_triple(bond.a)
                    && !next_to_triple(bond.b)
            })
            .count()
    }

    /// Lipinski donors: hydrogens attached to nitrogen or oxygen.
    pub fn hbond_donors(&self) -> usize {
        (0..self.atom_count())
            .filter(|&atom| matches!(self.atom(atom).element, Element::N | Element::O))
            .map(|atom| usize::from(self.hydrogen_count(atom)))
            .sum()
    }

    /// Lipinski acceptors: nitrogen and oxygen atoms.
    pub fn hbond_acceptors(&self) -> usize {
        self.atoms()
            .iter()
            .filter(|atom| matches!(atom.element, Element::N | Element::O))
            .count()
    }
}
