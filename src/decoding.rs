//! Erasure decoding shared by both backends.
//!
//! The scalar and bit-matrix coders differ only in how a generator row is
//! represented (one field element per fragment, or `w` bit-rows per
//! fragment) and in how rows are inverted and applied. [`CodingKernel`]
//! captures exactly that; everything else lives here once.
//!
//! Per call the flow is linear: erasure map, decoding matrix from the first
//! `k` survivors, inversion, application. All transients are locals and are
//! dropped on every return path.

use tracing::debug;

use crate::{ErasureCodeError, Result};

/// What a backend has to provide for the shared decoder.
pub(crate) trait CodingKernel {
    /// Matrix entry type: `u32` field elements or `u8` bits.
    type Symbol: Copy + PartialEq + From<u8>;

    fn data_fragments(&self) -> usize;
    fn parity_fragments(&self) -> usize;

    /// Matrix rows (and columns) contributed by one fragment.
    fn rows_per_fragment(&self) -> usize;

    /// Parity generator, `(m * r) x (k * r)` row-major.
    fn generator(&self) -> &[Self::Symbol];

    /// Invert a `dim x dim` row-major matrix.
    fn invert(&self, matrix: Vec<Self::Symbol>, dim: usize) -> Result<Vec<Self::Symbol>>;

    /// Apply one fragment's worth of rows (`r x (k * r)`) to `k` sources.
    fn dotprod(&self, rows: &[Self::Symbol], sources: &[&[u8]], dest: &mut [u8]) -> Result<()>;

    /// True when parity 0 is the plain XOR of all data fragments.
    fn first_parity_row_is_ones(&self) -> bool;

    /// Generator rows producing parity fragment `index`.
    fn parity_rows(&self, index: usize) -> &[Self::Symbol] {
        let block = self.rows_per_fragment() * self.rows_per_fragment() * self.data_fragments();
        &self.generator()[index * block..(index + 1) * block]
    }
}

/// One flag per fragment, `true` when the fragment is missing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErasureMap {
    k: usize,
    erased: Vec<bool>,
}

impl ErasureMap {
    /// Build the map from a list of missing indices in any order.
    ///
    /// Duplicates are tolerated. Fails if an index is out of range or fewer
    /// than `k` fragments survive.
    pub fn from_missing(k: usize, m: usize, missing: &[usize]) -> Result<Self> {
        let total = k + m;
        let mut erased = vec![false; total];
        for &index in missing {
            if index >= total {
                return Err(ErasureCodeError::InvalidFragmentIndex { index, total });
            }
            erased[index] = true;
        }

        let available = erased.iter().filter(|&&e| !e).count();
        if available < k {
            return Err(ErasureCodeError::InsufficientFragments {
                needed: k,
                available,
            });
        }
        Ok(Self { k, erased })
    }

    pub fn is_erased(&self, index: usize) -> bool {
        self.erased[index]
    }

    pub fn erased_count(&self) -> usize {
        self.erased.iter().filter(|&&e| e).count()
    }

    /// Missing data fragment indices, ascending.
    pub fn erased_data(&self) -> impl Iterator<Item = usize> + '_ {
        (0..self.k).filter(move |&i| self.erased[i])
    }

    /// Missing parity fragments as parity-relative indices, ascending.
    pub fn erased_parity(&self) -> impl Iterator<Item = usize> + '_ {
        (self.k..self.erased.len())
            .filter(move |&i| self.erased[i])
            .map(move |i| i - self.k)
    }

    /// The first `k` surviving fragment ids, ascending.
    pub fn survivors(&self) -> Vec<usize> {
        (0..self.erased.len())
            .filter(|&i| !self.erased[i])
            .take(self.k)
            .collect()
    }
}

/// Inverse of the matrix formed by the surviving fragments' generator rows.
pub(crate) struct DecodingMatrix<S> {
    source_ids: Vec<usize>,
    rows: Vec<S>,
    row_len: usize,
    rows_per_fragment: usize,
}

impl<S: Copy + PartialEq + From<u8>> DecodingMatrix<S> {
    pub(crate) fn build<K>(kernel: &K, map: &ErasureMap) -> Result<Self>
    where
        K: CodingKernel<Symbol = S> + ?Sized,
    {
        let k = kernel.data_fragments();
        let r = kernel.rows_per_fragment();
        let dim = k * r;
        let source_ids = map.survivors();

        let mut matrix = Vec::with_capacity(dim * dim);
        for &id in &source_ids {
            if id < k {
                for bit in 0..r {
                    let hot = id * r + bit;
                    matrix.extend((0..dim).map(|c| S::from(u8::from(c == hot))));
                }
            } else {
                matrix.extend_from_slice(kernel.parity_rows(id - k));
            }
        }

        let rows = kernel.invert(matrix, dim)?;
        Ok(Self {
            source_ids,
            rows,
            row_len: dim,
            rows_per_fragment: r,
        })
    }

    /// Rows of the inverse that recover data fragment `index`.
    pub(crate) fn row(&self, index: usize) -> &[S] {
        let block = self.rows_per_fragment * self.row_len;
        &self.rows[index * block..(index + 1) * block]
    }

    pub(crate) fn source_ids(&self) -> &[usize] {
        &self.source_ids
    }
}

/// Slice the given fragments out of the data/parity sets.
fn gather<'a>(
    ids: &[usize],
    data: &'a [&mut [u8]],
    parity: &'a [&mut [u8]],
    blocksize: usize,
) -> Vec<&'a [u8]> {
    let k = data.len();
    ids.iter()
        .map(|&id| {
            if id < k {
                &data[id][..blocksize]
            } else {
                &parity[id - k][..blocksize]
            }
        })
        .collect()
}

/// Compute data fragment `target` from `ids` into a scratch buffer and store it.
fn recover_data<K: CodingKernel + ?Sized>(
    kernel: &K,
    rows: &[K::Symbol],
    ids: &[usize],
    target: usize,
    data: &mut [&mut [u8]],
    parity: &[&mut [u8]],
    blocksize: usize,
) -> Result<()> {
    let mut scratch = vec![0u8; blocksize];
    {
        let sources = gather(ids, data, parity, blocksize);
        kernel.dotprod(rows, &sources, &mut scratch)?;
    }
    data[target][..blocksize].copy_from_slice(&scratch);
    Ok(())
}

fn encode_parity<K: CodingKernel + ?Sized>(
    kernel: &K,
    index: usize,
    data: &[&mut [u8]],
    parity: &mut [&mut [u8]],
    blocksize: usize,
) -> Result<()> {
    let sources: Vec<&[u8]> = data.iter().map(|d| &d[..blocksize]).collect();
    kernel.dotprod(
        kernel.parity_rows(index),
        &sources,
        &mut parity[index][..blocksize],
    )
}

/// Recover every missing fragment in place.
///
/// Erased data fragments are rebuilt first; erased parity fragments are then
/// re-encoded from the complete data set. When parity 0 is the XOR of the
/// data and survives, the highest erased data fragment is rebuilt from it
/// directly, so a single lost data fragment needs no matrix inversion.
pub(crate) fn decode<K: CodingKernel + ?Sized>(
    kernel: &K,
    data: &mut [&mut [u8]],
    parity: &mut [&mut [u8]],
    missing: &[usize],
    blocksize: usize,
) -> Result<()> {
    let k = kernel.data_fragments();
    let map = ErasureMap::from_missing(k, kernel.parity_fragments(), missing)?;
    let erased_data: Vec<usize> = map.erased_data().collect();

    let xor_target = if kernel.first_parity_row_is_ones() && !map.is_erased(k) {
        erased_data.last().copied()
    } else {
        None
    };
    let matrix_targets = &erased_data[..erased_data.len() - usize::from(xor_target.is_some())];

    debug!(
        erased = map.erased_count(),
        data = erased_data.len(),
        inverted = !matrix_targets.is_empty(),
        "decoding"
    );

    if !matrix_targets.is_empty() {
        let matrix = DecodingMatrix::build(kernel, &map)?;
        for &target in matrix_targets {
            recover_data(
                kernel,
                matrix.row(target),
                matrix.source_ids(),
                target,
                data,
                parity,
                blocksize,
            )?;
        }
    }

    if let Some(target) = xor_target {
        let ids: Vec<usize> = (0..k).filter(|&i| i != target).chain([k]).collect();
        recover_data(
            kernel,
            kernel.parity_rows(0),
            &ids,
            target,
            data,
            parity,
            blocksize,
        )?;
    }

    for index in map.erased_parity() {
        encode_parity(kernel, index, data, parity, blocksize)?;
    }
    Ok(())
}

/// Recover the single fragment `destination`.
///
/// A data fragment is computed from its decoding-matrix row alone. A parity
/// fragment goes through a full [`decode`] and is then re-encoded, which
/// also refreshes every other erased fragment.
pub(crate) fn reconstruct<K: CodingKernel + ?Sized>(
    kernel: &K,
    data: &mut [&mut [u8]],
    parity: &mut [&mut [u8]],
    missing: &[usize],
    destination: usize,
    blocksize: usize,
) -> Result<()> {
    let k = kernel.data_fragments();
    let total = k + kernel.parity_fragments();
    if destination >= total {
        return Err(ErasureCodeError::InvalidFragmentIndex {
            index: destination,
            total,
        });
    }

    if destination < k {
        let map = ErasureMap::from_missing(k, kernel.parity_fragments(), missing)?;
        let matrix = DecodingMatrix::build(kernel, &map)?;
        debug!(destination, sources = ?matrix.source_ids(), "reconstructing data fragment");
        return recover_data(
            kernel,
            matrix.row(destination),
            matrix.source_ids(),
            destination,
            data,
            parity,
            blocksize,
        );
    }

    debug!(destination, "reconstructing parity fragment via full decode");
    decode(kernel, data, parity, missing, blocksize)?;
    if !missing.contains(&destination) {
        encode_parity(kernel, destination - k, data, parity, blocksize)?;
    }
    Ok(())
}
