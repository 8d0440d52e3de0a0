use std::ops::Range;

use crate::timeit;
use crate::types::{Endpoint, MatchedPair};

#[derive(Clone)]
struct SmallOptionalRange {
    start: u32,
    end: u32,
}

const MARKER_EMPTY: u32 = u32::max_value();

impl SmallOptionalRange {
    #[inline]
    const fn new(start: u32, end: u32) -> Self {
        SmallOptionalRange { start, end }
    }

    #[inline]
    const fn empty() -> Self {
        SmallOptionalRange {
            start: MARKER_EMPTY,
            end: MARKER_EMPTY,
        }
    }

    #[inline]
    fn as_range(&self) -> Option<Range<usize>> {
        if !(self.start == MARKER_EMPTY && self.end == MARKER_EMPTY) {
            Some(self.start as usize..self.end as usize)
        } else {
            None
        }
    }
}

/// Matched pairs in insertion order, indexed by the endpoints of their keys.
///
/// After [`PairHolder::prepare`] the pairs touching a given endpoint are found
/// without scanning the whole collection.
pub struct PairHolder {
    pairs: Vec<MatchedPair>,
    /// Indices into `pairs` sorted by `(first, second)`.
    forward: Vec<u32>,
    forward_ranges: Vec<SmallOptionalRange>,
    /// Indices into `pairs` sorted by `(second, first)`.
    backward: Vec<u32>,
    backward_ranges: Vec<SmallOptionalRange>,
    dirty: bool,
}

impl Default for PairHolder {
    fn default() -> Self {
        Self::new()
    }
}

impl PairHolder {
    pub fn new() -> Self {
        PairHolder {
            pairs: Vec::new(),
            forward: Vec::new(),
            forward_ranges: Vec::new(),
            backward: Vec::new(),
            backward_ranges: Vec::new(),
            dirty: false,
        }
    }

    #[inline]
    pub fn iter(&self) -> impl Iterator<Item = &MatchedPair> + '_ {
        self.pairs.iter()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    #[inline]
    pub fn clear(&mut self) {
        self.pairs.clear();
        self.forward.clear();
        self.backward.clear();
        self.forward_ranges.clear();
        self.backward_ranges.clear();
        self.dirty = false;
    }

    #[inline]
    pub fn push(&mut self, pair: MatchedPair) {
        self.pairs.push(pair);
        self.dirty = true;
    }

    pub fn prepare(&mut self) {
        if !self.dirty {
            return;
        }

        let PairHolder {
            pairs,
            forward,
            forward_ranges,
            backward,
            backward_ranges,
            ..
        } = self;

        let endpoints = pairs
            .iter()
            .map(|pair| pair.key.first.max(pair.key.second).get() as usize)
            .max()
            .unwrap_or(0);

        timeit("index_forward", || {
            forward.clear();
            forward.extend(0..pairs.len() as u32);
            forward.sort_by_key(|&index| pairs[index as usize].key);
        });
        timeit("index_backward", || {
            backward.clear();
            backward.extend(0..pairs.len() as u32);
            backward.sort_by_key(|&index| {
                let key = pairs[index as usize].key;
                (key.second, key.first)
            });
        });

        forward_ranges.clear();
        forward_ranges.resize(endpoints, SmallOptionalRange::empty());
        make_range_cache(&forward[..], &mut forward_ranges[..], |&index| {
            pairs[index as usize].key.first.offset()
        });

        backward_ranges.clear();
        backward_ranges.resize(endpoints, SmallOptionalRange::empty());
        make_range_cache(&backward[..], &mut backward_ranges[..], |&index| {
            pairs[index as usize].key.second.offset()
        });

        self.dirty = false;
    }

    pub fn pairs(&self) -> &[MatchedPair] {
        self.pairs.as_slice()
    }

    /// Indices of the pairs whose first endpoint is `endpoint`.
    #[inline]
    pub fn find_pairs_by_first_endpoint(
        &self,
        endpoint: Endpoint,
    ) -> impl Iterator<Item = u32> + '_ {
        debug_assert!(!self.dirty);
        lookup(&self.forward, &self.forward_ranges, endpoint)
    }

    /// Indices of the pairs whose second endpoint is `endpoint`.
    #[inline]
    pub fn find_pairs_by_second_endpoint(
        &self,
        endpoint: Endpoint,
    ) -> impl Iterator<Item = u32> + '_ {
        debug_assert!(!self.dirty);
        lookup(&self.backward, &self.backward_ranges, endpoint)
    }

    #[inline]
    pub fn get(&self, index: usize) -> &MatchedPair {
        &self.pairs[index]
    }
}

#[inline]
fn lookup<'a>(
    order: &'a [u32],
    ranges: &[SmallOptionalRange],
    endpoint: Endpoint,
) -> impl Iterator<Item = u32> + 'a {
    let range = ranges
        .get(endpoint.offset())
        .and_then(SmallOptionalRange::as_range)
        .unwrap_or(0..0);
    order[range].iter().copied()
}

#[inline]
fn make_range_cache<T, F>(slice: &[T], ranges: &mut [SmallOptionalRange], extractor: F)
where
    F: Fn(&T) -> usize,
{
    let mut previous = None;
    let mut range_start = 0;
    for (i, item) in slice.iter().enumerate() {
        let current = extractor(item);
        if let Some(index) = previous {
            if index != current {
                ranges[index] = SmallOptionalRange::new(range_start as u32, i as u32);
                previous = Some(current);
                range_start = i;
            }
        } else {
            previous = Some(current);
        }
    }

    if let Some(index) = previous {
        ranges[index] = SmallOptionalRange::new(range_start as u32, slice.len() as u32);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{PairKey, PairwiseRecord};

    fn holder(keys: &[(u32, u32)]) -> PairHolder {
        let mut holder = PairHolder::new();
        for &(first, second) in keys {
            holder.push(MatchedPair::new(
                PairKey::new(first, second),
                PairwiseRecord {
                    distance: 1.0,
                    angle: 0,
                },
            ));
        }
        holder.prepare();
        holder
    }

    fn keys_of(holder: &PairHolder, indices: impl Iterator<Item = u32>) -> Vec<(u32, u32)> {
        indices
            .map(|index| {
                let key = holder.get(index as usize).key;
                (key.first.get(), key.second.get())
            })
            .collect()
    }

    #[test]
    fn finds_by_first_endpoint() {
        let holder = holder(&[(2, 1), (1, 3), (3, 1), (1, 2), (2, 3)]);
        let found = keys_of(&holder, holder.find_pairs_by_first_endpoint(Endpoint::new(1)));
        assert_eq!(found, vec![(1, 2), (1, 3)]);
        let found = keys_of(&holder, holder.find_pairs_by_first_endpoint(Endpoint::new(2)));
        assert_eq!(found, vec![(2, 1), (2, 3)]);
    }

    #[test]
    fn finds_by_second_endpoint() {
        let holder = holder(&[(2, 1), (1, 3), (3, 1), (1, 2), (2, 3)]);
        let found = keys_of(&holder, holder.find_pairs_by_second_endpoint(Endpoint::new(1)));
        assert_eq!(found, vec![(2, 1), (3, 1)]);
        let found = keys_of(&holder, holder.find_pairs_by_second_endpoint(Endpoint::new(2)));
        assert_eq!(found, vec![(1, 2)]);
    }

    #[test]
    fn unknown_endpoints_have_no_pairs() {
        let holder = holder(&[(1, 2)]);
        assert_eq!(holder.find_pairs_by_first_endpoint(Endpoint::new(2)).count(), 0);
        assert_eq!(holder.find_pairs_by_first_endpoint(Endpoint::new(40)).count(), 0);
        assert_eq!(holder.find_pairs_by_second_endpoint(Endpoint::new(1)).count(), 0);
    }

    #[test]
    fn keeps_insertion_order() {
        let holder = holder(&[(3, 1), (1, 2)]);
        assert_eq!(holder.get(0).key, PairKey::new(3, 1));
        assert_eq!(holder.get(1).key, PairKey::new(1, 2));
    }

    #[test]
    fn clear_resets_index() {
        let mut holder = holder(&[(1, 2), (2, 1)]);
        holder.clear();
        holder.prepare();
        assert!(holder.is_empty());
        assert_eq!(holder.find_pairs_by_first_endpoint(Endpoint::new(1)).count(), 0);
    }
}
