use tracing::debug;

use crate::consistency::ConsistencyGraph;
use crate::pair_holder::PairHolder;
use crate::types::PairKey;

/// Records which cluster every matched pair belongs to.
pub(crate) struct ClusterAssigner {
    cluster_by_pair: Vec<u32>,
}

impl ClusterAssigner {
    #[inline]
    pub(crate) fn new() -> Self {
        Self {
            cluster_by_pair: Vec::new(),
        }
    }

    #[inline]
    pub(crate) fn reset(&mut self, pairs: usize) {
        self.cluster_by_pair.clear();
        self.cluster_by_pair.resize(pairs, 0);
    }

    /// Gets cluster assigned to given matched pair.
    #[inline]
    pub(crate) fn get_cluster(&self, pair_index: u32) -> Option<u32> {
        let cluster = self.cluster_by_pair[pair_index as usize];
        if cluster == 0 {
            None
        } else {
            Some(cluster - 1)
        }
    }

    #[inline]
    pub(crate) fn assign(&mut self, pair_index: u32, cluster: u32) {
        self.cluster_by_pair[pair_index as usize] = cluster + 1;
    }

    /// Cluster of every pair, in pair order. All pairs must be assigned.
    pub(crate) fn assignments(&self) -> Vec<u32> {
        self.cluster_by_pair.iter().map(|&cluster| cluster - 1).collect()
    }
}

/// Connected set of matched pairs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cluster {
    /// Keys of the member pairs, sorted.
    keys: Vec<PairKey>,
}

impl Cluster {
    #[inline]
    pub fn len(&self) -> usize {
        self.keys.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    #[inline]
    pub fn keys(&self) -> &[PairKey] {
        &self.keys
    }

    #[inline]
    pub fn contains(&self, key: &PairKey) -> bool {
        self.keys.binary_search(key).is_ok()
    }
}

/// Collects the component containing `start`, using an explicit stack instead of recursion.
fn traverse_component(
    graph: &ConsistencyGraph,
    start: u32,
    cluster: u32,
    assigner: &mut ClusterAssigner,
    stack: &mut Vec<u32>,
    members: &mut Vec<u32>,
) {
    stack.clear();
    stack.push(start);

    while let Some(current) = stack.pop() {
        if assigner.get_cluster(current).is_some() {
            continue;
        }
        assigner.assign(current, cluster);
        members.push(current);

        for &neighbor in graph.neighbors(current) {
            if assigner.get_cluster(neighbor).is_none() {
                stack.push(neighbor);
            }
        }
    }
}

/// Partitions all matched pairs into connected components of the graph.
///
/// Clusters are enumerated in the order of their first pair in `pairs`.
pub(crate) fn extract_clusters_into(
    pairs: &PairHolder,
    graph: &ConsistencyGraph,
    assigner: &mut ClusterAssigner,
) -> Vec<Cluster> {
    debug_assert_eq!(pairs.len(), graph.len());

    assigner.reset(pairs.len());
    let mut clusters = vec![];
    let mut stack = vec![];
    let mut members = vec![];

    for start in 0..pairs.len() as u32 {
        if assigner.get_cluster(start).is_some() {
            // Was assigned to some cluster already so it was visited - no need to do it again
            continue;
        }

        members.clear();
        traverse_component(
            graph,
            start,
            clusters.len() as u32,
            assigner,
            &mut stack,
            &mut members,
        );

        let mut keys: Vec<PairKey> = members
            .iter()
            .map(|&index| pairs.get(index as usize).key)
            .collect();
        keys.sort_unstable();
        clusters.push(Cluster { keys });
    }

    debug!("Total clusters: {}", clusters.len());
    clusters
}

pub fn extract_clusters(pairs: &PairHolder, graph: &ConsistencyGraph) -> Vec<Cluster> {
    extract_clusters_into(pairs, graph, &mut ClusterAssigner::new())
}
