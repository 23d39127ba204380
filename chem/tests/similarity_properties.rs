use chem::fingerprint::DEFAULT_RADIUS;
use chem::{Molecule, tanimoto};
use proptest::prelude::*;

proptest! {
    #[test]
    fn parsing_arbitrary_text_never_panics(text in "\\PC{0,40}") {
        let _ = Molecule::from_smiles(&text);
    }

    #[test]
    fn tanimoto_is_bounded_and_symmetric(a in "[CNO]{1,12}", b in "[CNO]{1,12}") {
        let fa = Molecule::from_smiles(&a).unwrap().fingerprint(DEFAULT_RADIUS);
        let fb = Molecule::from_smiles(&b).unwrap().fingerprint(DEFAULT_RADIUS);
        let ab = tanimoto(&fa, &fb);
        prop_assert!((0.0..=1.0).contains(&ab));
        prop_assert_eq!(ab, tanimoto(&fb, &fa));
        prop_assert_eq!(tanimoto(&fa, &fa), 1.0);
    }

    #[test]
    fn written_chains_reparse(chain in "[CNO]{1,12}") {
        let mol = Molecule::from_smiles(&chain).unwrap();
        let written = mol.to_smiles();
        let reparsed = Molecule::from_smiles(&written).unwrap();
        prop_assert_eq!(reparsed.atom_count(), mol.atom_count());
        prop_assert_eq!(
            chem::canon::graph_key(&reparsed),
            chem::canon::graph_key(&mol)
        );
    }

    #[test]
    fn scaffolds_of_chains_are_empty(chain in "[CNO]{1,12}") {
        let mol = Molecule::from_smiles(&chain).unwrap();
        prop_assert!(mol.murcko_scaffold().is_empty());
    }
}
