use memory::InceptionMemory;
use proptest::prelude::*;

proptest! {
    #[test]
    fn memory_never_exceeds_capacity_and_keeps_the_best(
        capacity in 1usize..12,
        scores in prop::collection::vec(0.0f64..1.0, 0..60),
    ) {
        let mut memory = InceptionMemory::new(capacity, 1);
        for (i, score) in scores.iter().enumerate() {
            memory.add(&format!("C{}", "C".repeat(i)), *score, -1.0);
            prop_assert!(memory.len() <= capacity);
        }

        let mut sorted = scores.clone();
        sorted.sort_by(|a, b| b.total_cmp(a));
        sorted.truncate(capacity);
        let mut held: Vec<f64> = memory.entries().iter().map(|e| e.score).collect();
        held.sort_by(|a, b| b.total_cmp(a));
        prop_assert_eq!(held, sorted);
    }
}
