//! Simplified Bozorth3 fingerprint matcher.
//!
//! A template is turned into a table of local structures (distance and
//! orientation difference of every ordered pair of minutiae). Structures that
//! agree between two templates become matched pairs, consistent matched pairs
//! sharing an endpoint are linked, and the number of connected components is
//! the score.

pub use bozorth::{
    match_outcome, match_score, match_tables_score, score_clusters, BozorthState, MatchOutcome,
};
pub use clusters::{extract_clusters, Cluster};
pub use consistency::{build_consistency_graph, ConsistencyGraph};
pub use error::Error;
pub use match_tables::match_tables_into_pairs;
pub use pair_holder::PairHolder;
pub use pairwise::{build_pairwise_table, PairwiseTable};
pub use parsing::{parse_xyt, parse_xyt_reader};
pub use prof::timeit;
pub use reference::{Bozorth3Binary, ComparisonOracle, InProcessOracle};
pub use report::ComparisonReport;
pub use template::Template;
pub use types::{Adjacency, Endpoint, MatchParameters, MatchedPair, Minutia, PairKey, PairwiseRecord};

mod bozorth;
mod clusters;
mod consistency;
pub mod consts;
mod error;
mod match_tables;
mod math;
mod pair_holder;
mod pairwise;
pub mod parsing;
mod prof;
pub mod reference;
mod report;
mod template;
pub mod types;
