use rayon::iter::{IntoParallelIterator, ParallelIterator};

use crate::consts::parallel_minutiae_threshold;
use crate::math::{angular_difference, euclidean_distance};
use crate::types::{Endpoint, Minutia, PairKey, PairwiseRecord};

impl PairwiseRecord {
    #[inline]
    pub fn between(a: &Minutia, b: &Minutia) -> Self {
        PairwiseRecord {
            distance: euclidean_distance(a, b),
            angle: angular_difference(a, b),
        }
    }
}

/// Local structures of every ordered pair of distinct minutiae in a template.
///
/// Records are stored row by row: `(1, 2), (1, 3), ..., (1, n), (2, 1), (2, 3), ...`,
/// so a key is located without hashing and iteration follows this order.
#[derive(Debug, Clone, PartialEq)]
pub struct PairwiseTable {
    minutiae: usize,
    records: Vec<PairwiseRecord>,
}

impl PairwiseTable {
    /// Number of records, `n * (n - 1)` for `n` minutiae.
    #[inline]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Number of minutiae the table was built from.
    #[inline]
    pub fn minutiae(&self) -> usize {
        self.minutiae
    }

    #[inline]
    pub fn get(&self, key: PairKey) -> Option<&PairwiseRecord> {
        let first = key.first.get() as usize;
        let second = key.second.get() as usize;
        if first == second || first > self.minutiae || second > self.minutiae {
            return None;
        }
        self.records
            .get(offset_of(self.minutiae, key.first.offset(), key.second.offset()))
    }

    pub fn iter(&self) -> impl Iterator<Item = (PairKey, &PairwiseRecord)> + '_ {
        let minutiae = self.minutiae;
        self.records
            .iter()
            .enumerate()
            .map(move |(offset, record)| (key_at(minutiae, offset), record))
    }
}

#[inline]
fn offset_of(minutiae: usize, i: usize, j: usize) -> usize {
    i * (minutiae - 1) + if j < i { j } else { j - 1 }
}

#[inline]
fn key_at(minutiae: usize, offset: usize) -> PairKey {
    let i = offset / (minutiae - 1);
    let column = offset % (minutiae - 1);
    let j = if column < i { column } else { column + 1 };
    PairKey::from_endpoints(Endpoint::from_offset(i), Endpoint::from_offset(j))
}

#[inline]
fn row(minutiae: &[Minutia], i: usize) -> impl Iterator<Item = PairwiseRecord> + '_ {
    let origin = &minutiae[i];
    minutiae
        .iter()
        .enumerate()
        .filter(move |&(j, _)| j != i)
        .map(move |(_, other)| PairwiseRecord::between(origin, other))
}

pub(crate) fn sequential_rows(minutiae: &[Minutia]) -> Vec<PairwiseRecord> {
    let n = minutiae.len();
    let mut records = Vec::with_capacity(n * n.saturating_sub(1));
    for i in 0..n {
        records.extend(row(minutiae, i));
    }
    records
}

pub(crate) fn parallel_rows(minutiae: &[Minutia]) -> Vec<PairwiseRecord> {
    (0..minutiae.len())
        .into_par_iter()
        .flat_map_iter(|i| row(minutiae, i))
        .collect()
}

pub fn build_pairwise_table(minutiae: &[Minutia]) -> PairwiseTable {
    let records = if minutiae.len() < 2 {
        Vec::new()
    } else if minutiae.len() >= parallel_minutiae_threshold() {
        parallel_rows(minutiae)
    } else {
        sequential_rows(minutiae)
    };

    PairwiseTable {
        minutiae: minutiae.len(),
        records,
    }
}
