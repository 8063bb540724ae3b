//! Candidate ranking under a preference model.
//!
//! All orderings are by descending score with a stable tie-break: equal
//! scores keep candidate load order.

use std::cmp::Ordering;

use feature_engine::FeatureMatrix;
use nalgebra::DVector;
use swipe_core::Candidate;

use crate::model::PreferenceWeights;

/// Stateless scoring and top-K selection
pub struct Ranker;

impl Ranker {
    /// Score of every row of `features` under `weights`.
    ///
    /// # Panics
    ///
    /// If the weights and the feature matrix have different dimensions.
    pub fn score_all(features: &FeatureMatrix, weights: &PreferenceWeights) -> DVector<f64> {
        assert_eq!(
            features.dimension(),
            weights.dimension(),
            "feature matrix has {} columns, model has {} weights",
            features.dimension(),
            weights.dimension()
        );
        features.values() * weights.as_vector()
    }

    /// Indices of `pool` ordered by descending score, ties in pool order.
    pub fn rank_pool(scores: &DVector<f64>, pool: &[usize]) -> Vec<usize> {
        let mut ranked = pool.to_vec();
        // sort_by is stable
        ranked.sort_by(|&a, &b| scores[b].partial_cmp(&scores[a]).unwrap_or(Ordering::Equal));
        ranked
    }

    /// Top `count` candidates of the whole corpus.
    ///
    /// Returns exactly `min(count, candidates.len())` candidates.
    pub fn top_recommendations(
        candidates: &[Candidate],
        features: &FeatureMatrix,
        weights: &PreferenceWeights,
        count: usize,
    ) -> Vec<Candidate> {
        let pool: Vec<usize> = (0..candidates.len()).collect();
        Self::top_among(candidates, features, weights, &pool, count)
    }

    /// Top `count` candidates restricted to the indices in `pool`.
    pub fn top_among(
        candidates: &[Candidate],
        features: &FeatureMatrix,
        weights: &PreferenceWeights,
        pool: &[usize],
        count: usize,
    ) -> Vec<Candidate> {
        assert_eq!(
            candidates.len(),
            features.len(),
            "candidate list and feature matrix have different lengths"
        );
        let scores = Self::score_all(features, weights);

        Self::rank_pool(&scores, pool)
            .into_iter()
            .take(count)
            .map(|i| candidates[i].clone())
            .collect()
    }

    /// Highest-scoring index in `pool`; the earliest entry wins ties.
    pub fn best_in_pool(
        features: &FeatureMatrix,
        weights: &PreferenceWeights,
        pool: &[usize],
    ) -> Option<usize> {
        let scores = Self::score_all(features, weights);

        let mut best: Option<(usize, f64)> = None;
        for &idx in pool {
            let score = scores[idx];
            match best {
                Some((_, best_score)) if score <= best_score => {}
                _ => best = Some((idx, score)),
            }
        }
        best.map(|(idx, _)| idx)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use feature_engine::{FeatureBuilder, WordVectors};
    use std::sync::Arc;
    use swipe_core::Feedback;

    fn corpus(volatilities: &[f64]) -> (Vec<Candidate>, FeatureMatrix) {
        let sectors = ["Tech", "Energy", "Health", "Utilities", "Financials"];
        let candidates: Vec<Candidate> = volatilities
            .iter()
            .enumerate()
            .map(|(i, &v)| {
                Candidate::new(
                    format!("T{}", i),
                    50.0,
                    1.0e9,
                    10.0,
                    sectors[i % sectors.len()],
                    v,
                    "Medium",
                    "",
                )
                .unwrap()
            })
            .collect();
        let features = FeatureBuilder::new(Arc::new(WordVectors::empty(3))).build(&candidates);
        (candidates, features)
    }

    fn tickers(candidates: &[Candidate]) -> Vec<&str> {
        candidates.iter().map(|c| c.ticker()).collect()
    }

    #[test]
    fn test_zero_weights_keep_load_order() {
        let (candidates, features) = corpus(&[3.0, 1.0, 2.0, 0.0]);
        let weights = PreferenceWeights::zeros(features.dimension());

        let top = Ranker::top_recommendations(&candidates, &features, &weights, 3);
        assert_eq!(tickers(&top), vec!["T0", "T1", "T2"]);
    }

    #[test]
    fn test_count_is_clamped_to_corpus() {
        let (candidates, features) = corpus(&[1.0, 2.0]);
        let weights = PreferenceWeights::zeros(features.dimension());

        assert_eq!(Ranker::top_recommendations(&candidates, &features, &weights, 10).len(), 2);
        assert!(Ranker::top_recommendations(&candidates, &features, &weights, 0).is_empty());
    }

    #[test]
    fn test_sorted_by_non_increasing_score() {
        let (candidates, features) = corpus(&[0.0, 10.0, 5.0, 7.5, 2.5]);
        // like the most volatile candidate: scores follow volatility
        let weights = PreferenceWeights::zeros(features.dimension())
            .updated(&features.row(1), Feedback::Like);

        let top = Ranker::top_recommendations(&candidates, &features, &weights, 5);
        assert_eq!(tickers(&top), vec!["T1", "T3", "T2", "T4", "T0"]);

        let scores = Ranker::score_all(&features, &weights);
        let ranked = Ranker::rank_pool(&scores, &[0, 1, 2, 3, 4]);
        for pair in ranked.windows(2) {
            assert!(scores[pair[0]] >= scores[pair[1]]);
        }
    }

    #[test]
    fn test_ties_preserve_original_order() {
        let scores = DVector::from_vec(vec![1.0, 2.0, 1.0, 2.0, 0.0]);
        assert_eq!(Ranker::rank_pool(&scores, &[0, 1, 2, 3, 4]), vec![1, 3, 0, 2, 4]);
        // pool order is the tie-break
        assert_eq!(Ranker::rank_pool(&scores, &[3, 2, 1]), vec![3, 1, 2]);
    }

    #[test]
    fn test_top_among_restricts_pool() {
        let (candidates, features) = corpus(&[0.0, 10.0, 5.0]);
        let weights = PreferenceWeights::zeros(features.dimension())
            .updated(&features.row(1), Feedback::Like);

        let top = Ranker::top_among(&candidates, &features, &weights, &[0, 2], 5);
        assert_eq!(tickers(&top), vec!["T2", "T0"]);
    }

    #[test]
    fn test_best_in_pool() {
        let (_, features) = corpus(&[0.0, 10.0, 5.0]);
        let zero = PreferenceWeights::zeros(features.dimension());
        assert_eq!(Ranker::best_in_pool(&features, &zero, &[2, 0, 1]), Some(2));
        assert_eq!(Ranker::best_in_pool(&features, &zero, &[]), None);

        let liked = zero.updated(&features.row(1), Feedback::Like);
        assert_eq!(Ranker::best_in_pool(&features, &liked, &[0, 1, 2]), Some(1));
        assert_eq!(Ranker::best_in_pool(&features, &liked, &[0, 2]), Some(2));
    }
}
