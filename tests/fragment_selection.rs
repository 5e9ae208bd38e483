//! Fragment selection before reconstruction.

use galois_ec::{min_fragments_needed, BackendKind, ErasureCodeError};
use rand::{rngs::StdRng, seq::index, Rng, SeedableRng};

mod common;
use common::{assertions::assert_sets_equal, CoderSpec, FragmentSet};

#[test]
fn test_selection_k10_m4() {
    println!("Testing selection for k=10, m=4 with fragments 2 and 7 missing and 0 excluded");

    let chosen = min_fragments_needed(10, 4, &[2, 7], &[0]).unwrap();
    assert_eq!(chosen, vec![1, 3, 4, 5, 6, 8, 9, 10, 11, 12]);

    println!("✓ Selected {:?}", chosen);
}

#[test]
fn test_selection_properties_random() {
    println!("Testing selection invariants on random inputs");

    let mut rng = StdRng::seed_from_u64(galois_ec::config::TEST_RANDOM_SEED);
    for _ in 0..500 {
        let k = rng.gen_range(1..12);
        let m = rng.gen_range(1..6);
        let total = k + m;
        let missing_count = rng.gen_range(0..=total);
        let excluded_count = rng.gen_range(0..=total.min(3));
        let missing = index::sample(&mut rng, total, missing_count).into_vec();
        let excluded = index::sample(&mut rng, total, excluded_count).into_vec();

        let unusable = (0..total)
            .filter(|i| missing.contains(i) || excluded.contains(i))
            .count();

        match min_fragments_needed(k, m, &missing, &excluded) {
            Ok(chosen) => {
                assert!(total - unusable >= k);
                assert_eq!(chosen.len(), k);
                assert!(chosen.windows(2).all(|w| w[0] < w[1]));
                assert!(chosen.iter().all(|i| !missing.contains(i) && !excluded.contains(i)));
            }
            Err(ErasureCodeError::InsufficientFragments { needed, available }) => {
                assert!(total - unusable < k);
                assert_eq!(needed, k);
                assert_eq!(available, total - unusable);
            }
            Err(e) => panic!("unexpected error: {}", e),
        }
    }

    println!("✓ 500 random cases satisfy the selection invariants");
}

#[test]
fn test_selected_fragments_suffice_to_decode() {
    println!("Testing decode from exactly the selected fragments");

    for kind in BackendKind::ALL {
        let spec = CoderSpec::new(kind, 6, 3, 8);
        let backend = spec.build();
        let original = FragmentSet::encoded(backend.as_ref(), 64);

        let chosen = backend.min_fragments_needed(&[1], &[4]).unwrap();
        let unfetched: Vec<usize> = (0..spec.k + spec.m).filter(|i| !chosen.contains(i)).collect();
        assert_eq!(unfetched, vec![1, 4, 8]);

        let mut damaged = original.clone();
        damaged.erase(&unfetched);
        damaged.decode(backend.as_ref(), &unfetched).unwrap();
        assert_sets_equal(&original, &damaged, "decode from selected fragments");
    }

    println!("✓ Selected fragments reconstruct the object");
}

#[test]
fn test_selection_errors() {
    println!("Testing selection failures");

    assert!(matches!(
        min_fragments_needed(4, 2, &[0, 1], &[2]),
        Err(ErasureCodeError::InsufficientFragments { needed: 4, available: 3 })
    ));
    assert!(matches!(
        min_fragments_needed(4, 2, &[6], &[]),
        Err(ErasureCodeError::InvalidFragmentIndex { index: 6, total: 6 })
    ));

    println!("✓ Insufficient and out-of-range inputs rejected");
}
