//! Per-generation fitness bookkeeping.
//!
//! Raw fitness may be negative. [`FitnessRecord`] keeps the raw values for ranking
//! and tournaments, and derives a selection distribution by clamping every value to
//! [`FITNESS_FLOOR`] and normalizing.

use serde::{Deserialize, Serialize};
use tracing::warn;

/// Lower bound applied to raw fitness before normalization.
pub const FITNESS_FLOOR: f64 = 1e-6;

/// An individual whose evaluation failed; it is scored at [`FITNESS_FLOOR`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, derive_more::Display)]
#[display("individual {index}: {reason}")]
pub struct EvaluationFailure {
    pub index: usize,
    pub reason: String,
}

/// Minimum, maximum, and mean of the raw fitness of one generation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FitnessSummary {
    pub min: f64,
    pub max: f64,
    pub mean: f64,
}

impl FitnessSummary {
    #[expect(clippy::cast_precision_loss)]
    fn from_values(values: &[f64]) -> Self {
        let min = values.iter().copied().fold(f64::INFINITY, f64::min);
        let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        let mean = values.iter().sum::<f64>() / values.len() as f64;
        Self { min, max, mean }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct FitnessRecord {
    raw: Vec<f64>,
    probabilities: Vec<f64>,
    failures: Vec<EvaluationFailure>,
    non_positive_sum: bool,
}

impl FitnessRecord {
    /// Builds a record from per-individual evaluation outcomes, in population order.
    ///
    /// # Panics
    ///
    /// Panics if `outcomes` is empty.
    #[must_use]
    pub fn from_outcomes<I>(outcomes: I) -> Self
    where
        I: IntoIterator<Item = Result<f64, String>>,
    {
        let mut failures = vec![];
        let raw = outcomes
            .into_iter()
            .enumerate()
            .map(|(index, outcome)| match outcome {
                Ok(fitness) if fitness.is_finite() => fitness,
                Ok(fitness) => {
                    failures.push(EvaluationFailure {
                        index,
                        reason: format!("fitness is not finite: {fitness}"),
                    });
                    FITNESS_FLOOR
                }
                Err(reason) => {
                    failures.push(EvaluationFailure { index, reason });
                    FITNESS_FLOOR
                }
            })
            .collect::<Vec<_>>();
        assert!(!raw.is_empty());

        for failure in &failures {
            warn!(index = failure.index, reason = %failure.reason, "evaluation failed");
        }

        let raw_sum = raw.iter().sum::<f64>();
        let non_positive_sum = raw_sum <= 0.0;
        if non_positive_sum {
            warn!(raw_sum, "sum of raw fitness is not positive; selection relies on the floor");
        }

        let clamped = raw.iter().map(|f| f.max(FITNESS_FLOOR)).collect::<Vec<_>>();
        let total = clamped.iter().sum::<f64>();
        let probabilities = clamped.into_iter().map(|f| f / total).collect();

        Self {
            raw,
            probabilities,
            failures,
            non_positive_sum,
        }
    }

    /// Builds a record from raw fitness values that all evaluated successfully.
    #[must_use]
    pub fn from_raw(raw: Vec<f64>) -> Self {
        Self::from_outcomes(raw.into_iter().map(Ok))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.raw.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.raw.is_empty()
    }

    #[must_use]
    pub fn raw(&self) -> &[f64] {
        &self.raw
    }

    /// Selection distribution: clamped fitness normalized to sum to 1.
    #[must_use]
    pub fn probabilities(&self) -> &[f64] {
        &self.probabilities
    }

    #[must_use]
    pub fn failures(&self) -> &[EvaluationFailure] {
        &self.failures
    }

    /// Whether the raw fitness summed to zero or less before clamping.
    #[must_use]
    pub fn has_non_positive_sum(&self) -> bool {
        self.non_positive_sum
    }

    /// Index of the highest raw fitness; the lowest index wins ties.
    #[must_use]
    pub fn best_index(&self) -> usize {
        self.ranking()[0]
    }

    /// Indices ordered by descending raw fitness; equal values keep population order.
    #[must_use]
    pub fn ranking(&self) -> Vec<usize> {
        let mut order = (0..self.raw.len()).collect::<Vec<_>>();
        order.sort_by(|&a, &b| self.raw[b].total_cmp(&self.raw[a]));
        order
    }

    #[must_use]
    pub fn summary(&self) -> FitnessSummary {
        FitnessSummary::from_values(&self.raw)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_probabilities_sum_to_one() {
        let record = FitnessRecord::from_raw(vec![1.0, 3.0, -5.0, 4.0]);
        let sum = record.probabilities().iter().sum::<f64>();
        assert!((sum - 1.0).abs() < 1e-12);
        assert!(record.probabilities().iter().all(|p| *p > 0.0));
        assert!(!record.has_non_positive_sum());
    }

    #[test]
    fn test_all_negative_fitness_is_flagged() {
        let record = FitnessRecord::from_raw(vec![-10.0, -20.0, -30.0]);
        assert!(record.has_non_positive_sum());
        // everything clamps to the floor: uniform distribution
        for p in record.probabilities() {
            assert!((p - 1.0 / 3.0).abs() < 1e-12);
        }
        // raw values still order the population
        assert_eq!(record.ranking(), vec![0, 1, 2]);
    }

    #[test]
    fn test_ranking_is_stable_on_ties() {
        let record = FitnessRecord::from_raw(vec![2.0, 5.0, 2.0, 5.0, 1.0]);
        assert_eq!(record.ranking(), vec![1, 3, 0, 2, 4]);
        assert_eq!(record.best_index(), 1);
    }

    #[test]
    fn test_failures_score_at_floor() {
        let record = FitnessRecord::from_outcomes([
            Ok(100.0),
            Err("panicked".to_owned()),
            Ok(f64::NAN),
        ]);
        assert_eq!(record.raw(), &[100.0, FITNESS_FLOOR, FITNESS_FLOOR]);
        assert_eq!(record.failures().len(), 2);
        assert_eq!(record.failures()[0].index, 1);
        assert_eq!(record.failures()[1].index, 2);
        assert_eq!(record.best_index(), 0);
    }

    #[test]
    fn test_summary() {
        let summary = FitnessRecord::from_raw(vec![1.0, -2.0, 7.0]).summary();
        assert_eq!(summary.min, -2.0);
        assert_eq!(summary.max, 7.0);
        assert!((summary.mean - 2.0).abs() < 1e-12);
    }
}
