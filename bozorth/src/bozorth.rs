use crate::clusters::{extract_clusters_into, Cluster, ClusterAssigner};
use crate::consistency::build_consistency_graph;
use crate::match_tables::match_tables_into_pairs;
use crate::pair_holder::PairHolder;
use crate::pairwise::{build_pairwise_table, PairwiseTable};
use crate::timeit;
use crate::types::{MatchParameters, MatchedPair, Minutia};

/// Scratch buffers reused between comparisons. Holds nothing that affects the score.
pub struct BozorthState {
    pairs: PairHolder,
    assigner: ClusterAssigner,
}

impl Default for BozorthState {
    fn default() -> Self {
        Self::new()
    }
}

impl BozorthState {
    pub fn new() -> Self {
        BozorthState {
            pairs: PairHolder::new(),
            assigner: ClusterAssigner::new(),
        }
    }

    /// Matched pairs of the last comparison.
    pub fn pairs(&self) -> &PairHolder {
        &self.pairs
    }

    pub fn clear(&mut self) {
        self.pairs.clear();
        self.assigner.reset(0);
    }
}

/// Everything a comparison produced.
#[derive(Debug, Clone, PartialEq)]
pub struct MatchOutcome {
    pub matched_pairs: Vec<MatchedPair>,
    /// Cluster index of every matched pair, in the same order.
    pub assignments: Vec<u32>,
    pub clusters: Vec<Cluster>,
    pub score: u32,
}

#[inline]
pub fn score_clusters(clusters: &[Cluster]) -> u32 {
    clusters.len() as u32
}

fn run_pipeline(
    probe: &PairwiseTable,
    gallery: &PairwiseTable,
    parameters: &MatchParameters,
    state: &mut BozorthState,
) -> Vec<Cluster> {
    state.clear();

    timeit("match_tables", || {
        match_tables_into_pairs(probe, gallery, parameters, &mut state.pairs)
    });
    timeit("prepare_pairs", || state.pairs.prepare());

    let graph = timeit("consistency_graph", || {
        build_consistency_graph(&state.pairs, parameters)
    });

    let BozorthState { pairs, assigner } = state;
    timeit("clusters", || extract_clusters_into(pairs, &graph, assigner))
}

/// Score of two templates whose pairwise tables are already built.
pub fn match_tables_score(
    probe: &PairwiseTable,
    gallery: &PairwiseTable,
    parameters: &MatchParameters,
    state: &mut BozorthState,
) -> u32 {
    score_clusters(&run_pipeline(probe, gallery, parameters, state))
}

/// Same as [`match_tables_score`] but keeps the intermediate results.
pub fn match_outcome(
    probe: &PairwiseTable,
    gallery: &PairwiseTable,
    parameters: &MatchParameters,
    state: &mut BozorthState,
) -> MatchOutcome {
    let clusters = run_pipeline(probe, gallery, parameters, state);
    MatchOutcome {
        matched_pairs: state.pairs.pairs().to_vec(),
        assignments: state.assigner.assignments(),
        score: score_clusters(&clusters),
        clusters,
    }
}

/// Number of clusters of mutually consistent local structures shared by both templates.
///
/// Templates with fewer than two minutiae always score 0.
pub fn match_score(probe: &[Minutia], gallery: &[Minutia], parameters: &MatchParameters) -> u32 {
    let probe = timeit("probe_table", || build_pairwise_table(probe));
    let gallery = timeit("gallery_table", || build_pairwise_table(gallery));
    match_tables_score(&probe, &gallery, parameters, &mut BozorthState::new())
}
