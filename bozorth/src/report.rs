use std::fmt;

use crate::bozorth::MatchOutcome;

/// Human-readable comparison table of a [`MatchOutcome`].
pub struct ComparisonReport<'a> {
    outcome: &'a MatchOutcome,
    names: Option<(&'a str, &'a str)>,
}

impl<'a> ComparisonReport<'a> {
    pub fn new(outcome: &'a MatchOutcome) -> Self {
        ComparisonReport {
            outcome,
            names: None,
        }
    }

    pub fn with_names(self, probe: &'a str, gallery: &'a str) -> Self {
        ComparisonReport {
            names: Some((probe, gallery)),
            ..self
        }
    }
}

impl fmt::Display for ComparisonReport<'_> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let outcome = self.outcome;
        if let Some((probe, gallery)) = self.names {
            writeln!(f, "probe: {}", probe)?;
            writeln!(f, "gallery: {}", gallery)?;
        }

        writeln!(f, "matched pairs: {}", outcome.matched_pairs.len())?;
        writeln!(
            f,
            "{:>5} {:>5} {:>10} {:>6} {:>8}",
            "i", "j", "distance", "angle", "cluster"
        )?;
        for (pair, cluster) in outcome.matched_pairs.iter().zip(&outcome.assignments) {
            let observation = pair.first_observation();
            writeln!(
                f,
                "{:>5} {:>5} {:>10.3} {:>6} {:>8}",
                pair.key.first, pair.key.second, observation.distance, observation.angle, cluster
            )?;
        }

        writeln!(f, "clusters: {}", outcome.clusters.len())?;
        for (index, cluster) in outcome.clusters.iter().enumerate() {
            write!(f, "{:>5} [{}]", index, cluster.len())?;
            for key in cluster.keys() {
                write!(f, " {}", key)?;
            }
            writeln!(f)?;
        }

        writeln!(f, "score: {}", outcome.score)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bozorth::{match_outcome, BozorthState};
    use crate::pairwise::build_pairwise_table;
    use crate::types::{MatchParameters, Minutia};

    #[test]
    fn lists_pairs_and_clusters() {
        let table = build_pairwise_table(&[Minutia::new(0, 0, 0), Minutia::new(3, 4, 10)]);
        let outcome = match_outcome(
            &table,
            &table,
            &MatchParameters::default(),
            &mut BozorthState::new(),
        );
        let report = ComparisonReport::new(&outcome)
            .with_names("a.xyt", "b.xyt")
            .to_string();

        let lines: Vec<_> = report.lines().collect();
        assert_eq!(lines[0], "probe: a.xyt");
        assert_eq!(lines[1], "gallery: b.xyt");
        assert_eq!(lines[2], "matched pairs: 2");
        assert_eq!(lines[4], "    1     2      5.000     10        0");
        assert_eq!(lines[5], "    2     1      5.000     10        1");
        assert_eq!(lines[6], "clusters: 2");
        assert_eq!(lines[7], "    0 [1] (1, 2)");
        assert_eq!(lines[9], "score: 2");
    }
}
