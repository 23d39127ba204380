//! Murcko and topological scaffolds.

use crate::canon::graph_key;
use crate::element::Element;
use crate::molecule::{Atom, BondOrder, Molecule};

/// A scaffold graph together with its identity key and written form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Scaffold {
    pub molecule: Molecule,
    /// Canonical graph key; empty for acyclic molecules.
    pub key: String,
    pub smiles: String,
}

impl Scaffold {
    fn from_molecule(molecule: Molecule) -> Self {
        Self {
            key: graph_key(&molecule),
            smiles: molecule.to_smiles(),
            molecule,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.molecule.is_empty()
    }
}

impl Molecule {
    /// Ring systems plus the linkers between them. Side chains are stripped by
    /// repeatedly removing atoms with at most one neighbour, so an acyclic
    /// molecule reduces to the empty scaffold.
    pub fn murcko_scaffold(&self) -> Scaffold {
        let mut alive = vec![true; self.atom_count()];
        let mut degree: Vec<usize> = (0..self.atom_count()).map(|a| self.degree(a)).collect();
        let mut queue: Vec<usize> = (0..self.atom_count()).filter(|&a| degree[a] <= 1).collect();

        while let Some(atom) = queue.pop() {
            if !alive[atom] {
                continue;
            }
            alive[atom] = false;
            for &(next, _) in self.neighbors(atom) {
                if alive[next] {
                    degree[next] -= 1;
                    if degree[next] <= 1 {
                        queue.push(next);
                    }
                }
            }
        }

        let mut core = self.induced_subgraph(&alive);
        // Removing substituents changes implicit hydrogens on organic atoms
        // automatically; bracket atoms keep their stated counts.
        core = core.map_graph(
            |atom| Atom {
                isotope: None,
                ..atom.clone()
            },
            |bond| bond.order,
        );
        Scaffold::from_molecule(core)
    }

    /// The Murcko scaffold with every atom turned into an aliphatic carbon and
    /// every bond into a single bond.
    pub fn topological_scaffold(&self) -> Scaffold {
        let murcko = self.murcko_scaffold();
        let generic = murcko
            .molecule
            .map_graph(|_| Atom::new(Element::C), |_| BondOrder::Single);
        Scaffold::from_molecule(generic)
    }
}
