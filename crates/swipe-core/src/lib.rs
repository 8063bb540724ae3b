//! Stock Swipe Core
//!
//! Shared data model for the preference-ranking pipeline: the validated
//! [`Candidate`] record, the binary [`Feedback`] signal, the crate-wide error
//! enum and the collaborator traits (candidate loading, word embeddings).

pub mod error;
pub mod traits;
pub mod types;

pub use error::*;
pub use traits::*;
pub use types::*;
