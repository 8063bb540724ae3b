use async_trait::async_trait;

use crate::{Candidate, SwipeError};

/// Source of the candidate corpus for a session.
///
/// Implementations return candidates in load order; that order is the
/// presentation order of sequential sessions and the tie-break order of
/// every ranking.
#[async_trait]
pub trait CandidateLoader: Send + Sync {
    async fn load(&self) -> Result<Vec<Candidate>, SwipeError>;
}

/// Token-level word embeddings.
///
/// Every vector returned by [`Embedder::vector`] has exactly
/// [`Embedder::dimension`] components. Unknown tokens return `None`.
pub trait Embedder: Send + Sync {
    fn dimension(&self) -> usize;

    fn vector(&self, token: &str) -> Option<Vec<f32>>;
}
