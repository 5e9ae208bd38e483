//! Choosing which fragments to fetch before a reconstruction.

use crate::{ErasureCodeError, Result};

/// The `k` lowest-numbered fragments that are neither missing nor excluded.
///
/// Returned ids are sorted ascending. Fails with `InsufficientFragments` when
/// fewer than `k` candidates remain, and with `InvalidFragmentIndex` when
/// either list names a fragment outside `0..k+m`.
pub fn min_fragments_needed(
    k: usize,
    m: usize,
    missing: &[usize],
    excluded: &[usize],
) -> Result<Vec<usize>> {
    let total = k + m;
    let mut unusable = vec![false; total];
    for &index in missing.iter().chain(excluded) {
        if index >= total {
            return Err(ErasureCodeError::InvalidFragmentIndex { index, total });
        }
        unusable[index] = true;
    }

    let chosen: Vec<usize> = (0..total).filter(|&i| !unusable[i]).take(k).collect();
    if chosen.len() < k {
        return Err(ErasureCodeError::InsufficientFragments {
            needed: k,
            available: chosen.len(),
        });
    }
    Ok(chosen)
}
