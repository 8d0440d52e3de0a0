use tracing::debug;

use crate::pair_holder::PairHolder;
use crate::pairwise::PairwiseTable;
use crate::types::{MatchParameters, MatchedPair};

/// Collects the keys whose local structures agree between the probe and the gallery.
///
/// Pairs are pushed in probe table order with the probe-side record as their
/// observation. Keys missing from either table are skipped.
pub fn match_tables_into_pairs(
    probe: &PairwiseTable,
    gallery: &PairwiseTable,
    parameters: &MatchParameters,
    pairs: &mut PairHolder,
) {
    if probe.is_empty() || gallery.is_empty() {
        return;
    }

    let before = pairs.len();
    for (key, probe_record) in probe.iter() {
        let gallery_record = match gallery.get(key) {
            Some(record) => record,
            None => continue,
        };

        if !parameters.accepts(probe_record, gallery_record) {
            continue;
        }

        pairs.push(MatchedPair::new(key, *probe_record));
    }

    debug!("Total matched pairs: {}", pairs.len() - before);
}
