//! High-level assertion helpers for common test patterns.

#![allow(dead_code)]

use super::fixtures::FragmentSet;
use galois_ec::ErasureBackend;

/// Asserts that erasing `missing` and decoding restores every fragment.
pub fn assert_decode_restores(backend: &dyn ErasureBackend, original: &FragmentSet, missing: &[usize]) {
    let mut damaged = original.clone();
    damaged.erase(missing);
    damaged
        .decode(backend, missing)
        .unwrap_or_else(|e| panic!("decode of {:?} failed: {}", missing, e));
    assert_sets_equal(original, &damaged, &format!("decode of {:?}", missing));
}

/// Asserts that reconstructing `destination` alone restores that fragment.
pub fn assert_reconstruct_restores(
    backend: &dyn ErasureBackend,
    original: &FragmentSet,
    missing: &[usize],
    destination: usize,
) {
    let mut damaged = original.clone();
    damaged.erase(missing);
    damaged
        .reconstruct(backend, missing, destination)
        .unwrap_or_else(|e| panic!("reconstruct {} with {:?} missing failed: {}", destination, missing, e));
    assert_eq!(
        damaged.fragment(destination),
        original.fragment(destination),
        "fragment {} differs after reconstruct with {:?} missing",
        destination,
        missing
    );
}

/// Asserts two fragment sets are byte-identical, naming the first mismatch.
pub fn assert_sets_equal(expected: &FragmentSet, actual: &FragmentSet, context: &str) {
    let total = expected.data.len() + expected.parity.len();
    for index in 0..total {
        assert!(
            expected.fragment(index) == actual.fragment(index),
            "{}: fragment {} differs",
            context,
            index
        );
    }
}

/// Asserts that an operation failed with an error containing a specific message.
pub fn assert_error_contains<T, E: std::fmt::Display>(
    result: Result<T, E>,
    expected_substring: &str,
) {
    match result {
        Ok(_) => panic!(
            "Expected error containing '{}', but operation succeeded",
            expected_substring
        ),
        Err(error) => {
            let error_msg = format!("{}", error);
            assert!(
                error_msg.contains(expected_substring),
                "Expected error message to contain '{}', but got: {}",
                expected_substring,
                error_msg
            );
        }
    }
}
