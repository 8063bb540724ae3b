//! Feature matrix assembly.
//!
//! Column layout (fixed):
//! `price, market_cap, pe_ratio, volatility, Sector_<a> .. Sector_<z>, embedding_0 .. embedding_{D-1}`

use std::sync::Arc;

use nalgebra::{DMatrix, DVector};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use swipe_core::{Candidate, Embedder};

use crate::embedding::embed_text;
use crate::encoding::one_hot_encode;
use crate::normalize::normalize;

/// Numeric feature columns, in matrix order
pub const NUMERIC_FEATURES: [&str; 4] = ["price", "market_cap", "pe_ratio", "volatility"];

const SECTOR_PREFIX: &str = "Sector";

/// Scalar multipliers applied to each feature block
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FeatureWeights {
    /// Min-max scaled numeric attributes
    pub numeric: f64,
    /// One-hot sector columns
    pub categorical: f64,
    /// Min-max scaled summary embedding
    pub text: f64,
}

impl Default for FeatureWeights {
    fn default() -> Self {
        Self {
            numeric: 1.0,
            categorical: 0.8,
            text: 0.5,
        }
    }
}

/// Width of each block of the feature vector
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeatureLayout {
    pub numeric: usize,
    pub categorical: usize,
    pub embedding: usize,
}

impl FeatureLayout {
    /// Total feature vector length (L)
    pub fn dimension(&self) -> usize {
        self.numeric + self.categorical + self.embedding
    }
}

/// Immutable feature matrix for one session: one row per candidate, in
/// candidate order, with a parallel list of column names.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureMatrix {
    names: Vec<String>,
    values: DMatrix<f64>,
    layout: FeatureLayout,
}

impl FeatureMatrix {
    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn values(&self) -> &DMatrix<f64> {
        &self.values
    }

    pub fn layout(&self) -> FeatureLayout {
        self.layout
    }

    /// Feature vector length shared by every row
    pub fn dimension(&self) -> usize {
        self.values.ncols()
    }

    /// Number of candidate rows
    pub fn len(&self) -> usize {
        self.values.nrows()
    }

    pub fn is_empty(&self) -> bool {
        self.values.nrows() == 0
    }

    /// Feature vector of the candidate at `index`
    pub fn row(&self, index: usize) -> DVector<f64> {
        self.values.row(index).transpose()
    }
}

/// Builds [`FeatureMatrix`] values from a closed candidate corpus
#[derive(Clone)]
pub struct FeatureBuilder {
    embedder: Arc<dyn Embedder>,
    weights: FeatureWeights,
}

impl FeatureBuilder {
    pub fn new(embedder: Arc<dyn Embedder>) -> Self {
        Self {
            embedder,
            weights: FeatureWeights::default(),
        }
    }

    pub fn with_weights(mut self, weights: FeatureWeights) -> Self {
        self.weights = weights;
        self
    }

    pub fn embedding_dimension(&self) -> usize {
        self.embedder.dimension()
    }

    /// Assemble `numeric * w1 ++ categorical * w2 ++ embedding * w3` per candidate.
    ///
    /// Numeric and embedding blocks are min-max scaled across the corpus
    /// before weighting; the one-hot block is used as is. The sector
    /// vocabulary is closed over `candidates`.
    pub fn build(&self, candidates: &[Candidate]) -> FeatureMatrix {
        let n = candidates.len();

        let numeric = DMatrix::from_fn(n, NUMERIC_FEATURES.len(), |r, c| {
            candidates[r].numeric_attributes()[c]
        });
        let numeric = normalize(&numeric) * self.weights.numeric;

        let sectors: Vec<&str> = candidates.iter().map(|c| c.sector()).collect();
        let encoded = one_hot_encode(&sectors, SECTOR_PREFIX);
        let categorical = encoded.matrix * self.weights.categorical;

        let dim = self.embedder.dimension();
        let embedder = self.embedder.as_ref();
        let embeddings: Vec<DVector<f64>> = candidates
            .par_iter()
            .map(|c| embed_text(c.summary(), embedder))
            .collect();
        let text = DMatrix::from_fn(n, dim, |r, c| embeddings[r][c]);
        let text = normalize(&text) * self.weights.text;

        let layout = FeatureLayout {
            numeric: NUMERIC_FEATURES.len(),
            categorical: encoded.names.len(),
            embedding: dim,
        };

        let mut values = DMatrix::zeros(n, layout.dimension());
        values
            .view_mut((0, 0), (n, layout.numeric))
            .copy_from(&numeric);
        values
            .view_mut((0, layout.numeric), (n, layout.categorical))
            .copy_from(&categorical);
        values
            .view_mut((0, layout.numeric + layout.categorical), (n, layout.embedding))
            .copy_from(&text);

        let names: Vec<String> = NUMERIC_FEATURES
            .iter()
            .map(|s| s.to_string())
            .chain(encoded.names)
            .chain((0..dim).map(|i| format!("embedding_{}", i)))
            .collect();

        assert_eq!(
            names.len(),
            values.ncols(),
            "feature names and feature columns disagree"
        );

        tracing::debug!(
            "Built feature matrix: {} candidates x {} features (numeric={}, categorical={}, embedding={})",
            n,
            layout.dimension(),
            layout.numeric,
            layout.categorical,
            layout.embedding
        );

        FeatureMatrix {
            names,
            values,
            layout,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::embedding::WordVectors;
    use approx::assert_relative_eq;

    fn block(features: &FeatureMatrix, row: usize, start: usize, len: usize) -> Vec<f64> {
        features.row(row).rows(start, len).iter().copied().collect()
    }

    fn candidate(ticker: &str, volatility: f64, sector: &str, summary: &str) -> Candidate {
        Candidate::new(ticker, 100.0, 1.0e9, 15.0, sector, volatility, "Medium", summary).unwrap()
    }

    #[test]
    fn test_layout_and_names() {
        let candidates = vec![
            candidate("AAA", 0.0, "Tech", ""),
            candidate("BBB", 5.0, "Energy", ""),
            candidate("CCC", 10.0, "Health", ""),
        ];
        let builder = FeatureBuilder::new(Arc::new(WordVectors::empty(2)));
        let features = builder.build(&candidates);

        assert_eq!(features.len(), 3);
        assert_eq!(features.dimension(), 4 + 3 + 2);
        assert_eq!(
            features.names(),
            &[
                "price",
                "market_cap",
                "pe_ratio",
                "volatility",
                "Sector_Energy",
                "Sector_Health",
                "Sector_Tech",
                "embedding_0",
                "embedding_1"
            ]
        );
        assert_eq!(
            features.layout(),
            FeatureLayout {
                numeric: 4,
                categorical: 3,
                embedding: 2
            }
        );
    }

    #[test]
    fn test_blocks_are_scaled_and_weighted() {
        let candidates = vec![
            candidate("AAA", 0.0, "Tech", ""),
            candidate("BBB", 5.0, "Energy", ""),
            candidate("CCC", 10.0, "Tech", ""),
        ];
        let builder = FeatureBuilder::new(Arc::new(WordVectors::empty(2)));
        let features = builder.build(&candidates);

        // price, market_cap and pe_ratio are constant -> 0
        for row in 0..3 {
            for col in 0..3 {
                assert_eq!(features.values()[(row, col)], 0.0);
            }
        }
        assert_relative_eq!(features.values()[(0, 3)], 0.0);
        assert_relative_eq!(features.values()[(1, 3)], 0.5);
        assert_relative_eq!(features.values()[(2, 3)], 1.0);

        // Sector_Energy, Sector_Tech scaled by 0.8
        assert_eq!(block(&features, 0, 4, 2), vec![0.0, 0.8]);
        assert_eq!(block(&features, 1, 4, 2), vec![0.8, 0.0]);

        // empty summaries -> zero embedding block
        assert_eq!(block(&features, 2, 6, 2), vec![0.0, 0.0]);
    }

    #[test]
    fn test_text_block_normalized_then_weighted() {
        let vocab = WordVectors::from_pairs(
            2,
            vec![("oil", vec![2.0, 1.0]), ("chips", vec![4.0, 1.0])],
        )
        .unwrap();
        let candidates = vec![
            candidate("XOM", 1.0, "Energy", "Oil"),
            candidate("NVDA", 1.0, "Tech", "chips"),
            candidate("JPM", 1.0, "Financials", "Oil and chips"),
        ];
        let weights = FeatureWeights {
            numeric: 1.0,
            categorical: 1.0,
            text: 0.5,
        };
        let features = FeatureBuilder::new(Arc::new(vocab))
            .with_weights(weights)
            .build(&candidates);

        let first_embedding = 4 + 3;
        // column 0: [2, 4, 3] -> [0, 1, 0.5] * 0.5
        assert_relative_eq!(features.values()[(0, first_embedding)], 0.0);
        assert_relative_eq!(features.values()[(1, first_embedding)], 0.5);
        assert_relative_eq!(features.values()[(2, first_embedding)], 0.25);
        // column 1 is constant -> 0
        for row in 0..3 {
            assert_eq!(features.values()[(row, first_embedding + 1)], 0.0);
        }
    }

    #[test]
    fn test_empty_corpus() {
        let builder = FeatureBuilder::new(Arc::new(WordVectors::empty(3)));
        let features = builder.build(&[]);
        assert!(features.is_empty());
        assert_eq!(features.dimension(), 4 + 3);
    }

    #[test]
    fn test_default_weights() {
        let w = FeatureWeights::default();
        assert_eq!((w.numeric, w.categorical, w.text), (1.0, 0.8, 0.5));
    }
}
