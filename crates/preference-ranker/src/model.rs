use nalgebra::DVector;
use serde::{Deserialize, Serialize};
use swipe_core::Feedback;

/// Learned linear preference model: one weight per feature column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PreferenceWeights {
    weights: DVector<f64>,
}

impl PreferenceWeights {
    /// All-zero weights for feature vectors of length `dimension`
    pub fn zeros(dimension: usize) -> Self {
        Self {
            weights: DVector::zeros(dimension),
        }
    }

    pub fn from_vec(weights: Vec<f64>) -> Self {
        Self {
            weights: DVector::from_vec(weights),
        }
    }

    pub fn dimension(&self) -> usize {
        self.weights.len()
    }

    pub fn as_slice(&self) -> &[f64] {
        self.weights.as_slice()
    }

    pub fn as_vector(&self) -> &DVector<f64> {
        &self.weights
    }

    /// Dot product of `features` with the weights.
    ///
    /// # Panics
    ///
    /// If `features` has a different length than the weights.
    pub fn score(&self, features: &DVector<f64>) -> f64 {
        self.check_dimension(features);
        self.weights.dot(features)
    }

    /// Weights after one feedback event: `w + features * sign(feedback)`.
    ///
    /// `self` is left untouched, so a reader holding the old weights never
    /// observes a partial update.
    ///
    /// # Panics
    ///
    /// If `features` has a different length than the weights.
    pub fn updated(&self, features: &DVector<f64>, feedback: Feedback) -> Self {
        self.check_dimension(features);
        Self {
            weights: &self.weights + features * feedback.sign(),
        }
    }

    fn check_dimension(&self, features: &DVector<f64>) {
        assert_eq!(
            features.len(),
            self.weights.len(),
            "feature vector length {} does not match model dimension {}",
            features.len(),
            self.weights.len()
        );
    }
}
