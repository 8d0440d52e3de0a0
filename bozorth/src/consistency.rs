use rayon::iter::{IntoParallelIterator, ParallelIterator};
use tracing::debug;

use crate::consts::parallel_pairs_threshold;
use crate::pair_holder::PairHolder;
use crate::types::{Adjacency, MatchParameters};

/// Undirected graph over matched pairs, addressed by their index in the [`PairHolder`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConsistencyGraph {
    adjacency: Vec<Vec<u32>>,
}

impl ConsistencyGraph {
    /// Number of nodes, equal to the number of matched pairs.
    #[inline]
    pub fn len(&self) -> usize {
        self.adjacency.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.adjacency.is_empty()
    }

    /// Sorted neighbours of a node, without the node itself.
    #[inline]
    pub fn neighbors(&self, node: u32) -> &[u32] {
        &self.adjacency[node as usize]
    }

    pub fn edge_count(&self) -> usize {
        self.adjacency.iter().map(Vec::len).sum::<usize>() / 2
    }
}

/// Links matched pairs that share an endpoint and whose first observations agree.
///
/// `pairs` must be prepared.
pub fn build_consistency_graph(pairs: &PairHolder, parameters: &MatchParameters) -> ConsistencyGraph {
    let adjacency = if pairs.len() >= parallel_pairs_threshold() {
        (0..pairs.len())
            .into_par_iter()
            .map(|index| consistent_neighbors(pairs, index, parameters))
            .collect()
    } else {
        (0..pairs.len())
            .map(|index| consistent_neighbors(pairs, index, parameters))
            .collect()
    };

    let graph = ConsistencyGraph { adjacency };
    debug!(
        "Consistency graph: {} nodes, {} edges",
        graph.len(),
        graph.edge_count()
    );
    graph
}

fn consistent_neighbors(pairs: &PairHolder, index: usize, parameters: &MatchParameters) -> Vec<u32> {
    let pair = pairs.get(index);
    let key = pair.key;

    let mut candidates: Vec<u32> = pairs
        .find_pairs_by_first_endpoint(key.first)
        .chain(pairs.find_pairs_by_second_endpoint(key.second))
        .collect();
    if parameters.adjacency == Adjacency::SharedMinutia {
        candidates.extend(pairs.find_pairs_by_first_endpoint(key.second));
        candidates.extend(pairs.find_pairs_by_second_endpoint(key.first));
    }
    candidates.sort_unstable();
    candidates.dedup();

    let observation = pair.first_observation();
    candidates.retain(|&candidate| {
        candidate as usize != index
            && parameters.accepts(observation, pairs.get(candidate as usize).first_observation())
    });
    candidates
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{MatchedPair, PairKey, PairwiseRecord};

    fn record(distance: f64, angle: i32) -> PairwiseRecord {
        PairwiseRecord { distance, angle }
    }

    fn holder(items: &[((u32, u32), PairwiseRecord)]) -> PairHolder {
        let mut holder = PairHolder::new();
        for &((first, second), observation) in items {
            holder.push(MatchedPair::new(PairKey::new(first, second), observation));
        }
        holder.prepare();
        holder
    }

    /// Every pair against every other pair.
    fn quadratic_scan(pairs: &PairHolder, parameters: &MatchParameters) -> ConsistencyGraph {
        let adjacency = (0..pairs.len())
            .map(|i| {
                let a = pairs.get(i);
                (0..pairs.len())
                    .filter(|&j| {
                        let b = pairs.get(j);
                        let adjacent = match parameters.adjacency {
                            Adjacency::SharedPosition => a.key.shares_position(&b.key),
                            Adjacency::SharedMinutia => a.key.shares_minutia(&b.key),
                        };
                        i != j
                            && adjacent
                            && parameters.accepts(a.first_observation(), b.first_observation())
                    })
                    .map(|j| j as u32)
                    .collect()
            })
            .collect();
        ConsistencyGraph { adjacency }
    }

    fn sample() -> PairHolder {
        let mut items = vec![];
        for first in 1..=6u32 {
            for second in 1..=6u32 {
                if first != second && (first * 7 + second * 3) % 4 != 0 {
                    let distance = f64::from((first * 13 + second * 29) % 61);
                    let angle = ((first * 41 + second * 17) % 181) as i32;
                    items.push(((first, second), record(distance, angle)));
                }
            }
        }
        holder(&items)
    }

    #[test]
    fn links_only_the_same_position() {
        let pairs = holder(&[
            ((1, 2), record(10.0, 90)),
            ((1, 3), record(12.0, 95)),
            ((3, 2), record(14.0, 90)),
            ((2, 1), record(10.0, 90)),
        ]);
        let graph = build_consistency_graph(&pairs, &MatchParameters::default());
        assert_eq!(graph.neighbors(0), &[1, 2]);
        assert_eq!(graph.neighbors(1), &[0]);
        assert_eq!(graph.neighbors(2), &[0]);
        assert!(graph.neighbors(3).is_empty());
        assert_eq!(graph.edge_count(), 2);
    }

    #[test]
    fn shared_minutia_adds_cross_links() {
        let pairs = holder(&[((1, 2), record(10.0, 90)), ((2, 1), record(10.0, 90))]);
        let parameters = MatchParameters::default().with_adjacency(Adjacency::SharedMinutia);
        let graph = build_consistency_graph(&pairs, &parameters);
        assert_eq!(graph.neighbors(0), &[1]);
        assert_eq!(graph.neighbors(1), &[0]);
    }

    #[test]
    fn inconsistent_observations_are_not_linked() {
        let pairs = holder(&[((1, 2), record(10.0, 90)), ((1, 3), record(10.0, 180))]);
        let graph = build_consistency_graph(&pairs, &MatchParameters::default());
        assert_eq!(graph.edge_count(), 0);
    }

    #[test]
    fn endpoint_index_agrees_with_quadratic_scan() {
        let pairs = sample();
        for &adjacency in &[Adjacency::SharedPosition, Adjacency::SharedMinutia] {
            let parameters = MatchParameters::new(20.0, 40).with_adjacency(adjacency);
            assert_eq!(
                build_consistency_graph(&pairs, &parameters),
                quadratic_scan(&pairs, &parameters)
            );
        }
    }

    #[test]
    fn graph_is_undirected() {
        let pairs = sample();
        let graph = build_consistency_graph(&pairs, &MatchParameters::new(15.0, 30));
        for node in 0..graph.len() as u32 {
            for &neighbor in graph.neighbors(node) {
                assert!(graph.neighbors(neighbor).contains(&node));
            }
        }
    }
}
