//! Preference Ranker
//!
//! Online linear preference learning over the feature matrix built by
//! `feature-engine`, plus the swipe session that drives it.
//!
//! The learned model is a single weight vector, zero at session start and
//! moved by `+features` on a like and `-features` on a dislike. There is no
//! learning rate, decay or regularisation: the score is the raw dot product.

pub mod model;
pub mod ranker;
pub mod session;

pub use model::PreferenceWeights;
pub use ranker::Ranker;
pub use session::{
    FeedbackEvent, RecommendationScope, SessionConfig, SessionController, SessionState,
    TraversalPolicy,
};
