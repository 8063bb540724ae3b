//! Swipe Session
//!
//! Owns the candidate corpus, the feature matrix and the preference weights
//! for one session, presents candidates one at a time, applies feedback and
//! produces the final shortlist.
//!
//! States: `Loading -> AwaitingFeedback -> Completed`. A session with no
//! candidates (or a failed load) goes straight to `Completed` with an empty
//! shortlist. Tickers identify candidates in the history and the shortlist,
//! so a corpus with a repeated ticker is refused. Abandoning a session is
//! dropping the controller.

use std::collections::HashSet;

use feature_engine::{FeatureBuilder, FeatureMatrix};
use serde::{Deserialize, Serialize};
use swipe_core::{Candidate, CandidateLoader, Feedback, SwipeError};

use crate::model::PreferenceWeights;
use crate::ranker::Ranker;

/// Order in which candidates are presented
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TraversalPolicy {
    /// Load order, one after another
    Sequential,
    /// Highest current score among the not-yet-presented candidates
    Greedy,
}

impl TraversalPolicy {
    /// Shortlist pool used when [`SessionConfig::scope`] is not set
    pub fn default_scope(&self) -> RecommendationScope {
        match self {
            TraversalPolicy::Sequential => RecommendationScope::FullCorpus,
            TraversalPolicy::Greedy => RecommendationScope::Unseen,
        }
    }
}

impl std::fmt::Display for TraversalPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TraversalPolicy::Sequential => write!(f, "sequential"),
            TraversalPolicy::Greedy => write!(f, "greedy"),
        }
    }
}

impl std::str::FromStr for TraversalPolicy {
    type Err = SwipeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "sequential" => Ok(TraversalPolicy::Sequential),
            "greedy" => Ok(TraversalPolicy::Greedy),
            _ => Err(SwipeError::Validation(format!("Invalid traversal policy: {}", s))),
        }
    }
}

/// Which candidates the final shortlist is drawn from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RecommendationScope {
    /// Every loaded candidate, including those already swiped
    FullCorpus,
    /// Only candidates that were never presented
    Unseen,
}

impl std::fmt::Display for RecommendationScope {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RecommendationScope::FullCorpus => write!(f, "full"),
            RecommendationScope::Unseen => write!(f, "unseen"),
        }
    }
}

impl std::str::FromStr for RecommendationScope {
    type Err = SwipeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "full" | "full_corpus" | "all" => Ok(RecommendationScope::FullCorpus),
            "unseen" | "remaining" => Ok(RecommendationScope::Unseen),
            _ => Err(SwipeError::Validation(format!("Invalid recommendation scope: {}", s))),
        }
    }
}

/// Session settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Feedback events accepted before the session completes
    pub swipe_budget: usize,
    /// Length of the final shortlist
    pub recommendation_count: usize,
    pub traversal: TraversalPolicy,
    /// Overrides the traversal's default shortlist pool
    pub scope: Option<RecommendationScope>,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            swipe_budget: 10,
            recommendation_count: 5,
            traversal: TraversalPolicy::Sequential,
            scope: None,
        }
    }
}

impl SessionConfig {
    pub fn effective_scope(&self) -> RecommendationScope {
        self.scope.unwrap_or_else(|| self.traversal.default_scope())
    }
}

/// Current phase of a session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SessionState {
    Loading,
    AwaitingFeedback,
    Completed,
}

impl std::fmt::Display for SessionState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SessionState::Loading => write!(f, "loading"),
            SessionState::AwaitingFeedback => write!(f, "awaiting_feedback"),
            SessionState::Completed => write!(f, "completed"),
        }
    }
}

/// First ticker that appears more than once, in load order
fn duplicate_ticker(candidates: &[Candidate]) -> Option<&str> {
    let mut seen = HashSet::new();
    candidates
        .iter()
        .map(|c| c.ticker())
        .find(|ticker| !seen.insert(*ticker))
}

/// One applied feedback event
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeedbackEvent {
    pub ticker: String,
    pub feedback: Feedback,
    /// Score of the candidate when it was presented
    pub score: f64,
}

#[derive(Debug, Clone)]
enum Cursor {
    Sequential { next: usize },
    Greedy { pool: Vec<usize> },
}

/// Drives one swipe session.
///
/// The controller is the only owner of the preference weights; feedback is
/// applied through `&mut self`, so scoring and updates never overlap.
pub struct SessionController {
    config: SessionConfig,
    state: SessionState,
    candidates: Vec<Candidate>,
    features: Option<FeatureMatrix>,
    weights: PreferenceWeights,
    cursor: Cursor,
    presented: Option<usize>,
    history: Vec<FeedbackEvent>,
    recommendations: Vec<Candidate>,
}

impl SessionController {
    /// New session in the `Loading` state
    pub fn new(config: SessionConfig) -> Self {
        let cursor = match config.traversal {
            TraversalPolicy::Sequential => Cursor::Sequential { next: 0 },
            TraversalPolicy::Greedy => Cursor::Greedy { pool: Vec::new() },
        };

        Self {
            config,
            state: SessionState::Loading,
            candidates: Vec::new(),
            features: None,
            weights: PreferenceWeights::zeros(0),
            cursor,
            presented: None,
            history: Vec::new(),
            recommendations: Vec::new(),
        }
    }

    /// Session over an already built corpus.
    ///
    /// # Panics
    ///
    /// If `features` does not have one row per candidate, or if two
    /// candidates share a ticker.
    pub fn with_candidates(
        config: SessionConfig,
        candidates: Vec<Candidate>,
        features: FeatureMatrix,
    ) -> Self {
        let mut session = Self::new(config);
        session.begin(candidates, features);
        session
    }

    /// Load the corpus and build its feature matrix.
    ///
    /// This is the only step that suspends. Feature building runs on the
    /// blocking pool. A load failure, or a corpus with a repeated ticker, is
    /// logged and completes the session with no candidates.
    pub async fn load<L>(&mut self, loader: &L, builder: &FeatureBuilder) -> SessionState
    where
        L: CandidateLoader + ?Sized,
    {
        if self.state != SessionState::Loading {
            tracing::warn!("Ignoring load: session is already {}", self.state);
            return self.state;
        }

        let candidates = match loader.load().await {
            Ok(candidates) => candidates,
            Err(e) => {
                tracing::warn!("Candidate load failed, no candidates available: {}", e);
                self.state = SessionState::Completed;
                return self.state;
            }
        };
        if let Some(ticker) = duplicate_ticker(&candidates) {
            tracing::warn!(
                "Duplicate ticker {} in loaded candidates, no candidates available",
                ticker
            );
            self.state = SessionState::Completed;
            return self.state;
        }

        let builder = builder.clone();
        let built = tokio::task::spawn_blocking(move || {
            let features = builder.build(&candidates);
            (candidates, features)
        })
        .await;

        match built {
            Ok((candidates, features)) => self.begin(candidates, features),
            Err(e) if e.is_panic() => std::panic::resume_unwind(e.into_panic()),
            Err(e) => {
                tracing::warn!("Feature build was cancelled: {}", e);
                self.state = SessionState::Completed;
            }
        }

        self.state
    }

    fn begin(&mut self, candidates: Vec<Candidate>, features: FeatureMatrix) {
        assert_eq!(
            candidates.len(),
            features.len(),
            "feature matrix must have one row per candidate"
        );
        if let Some(ticker) = duplicate_ticker(&candidates) {
            panic!("duplicate ticker {} in candidate corpus", ticker);
        }

        self.weights = PreferenceWeights::zeros(features.dimension());
        if let Cursor::Greedy { pool } = &mut self.cursor {
            *pool = (0..candidates.len()).collect();
        }
        self.candidates = candidates;
        self.features = Some(features);

        tracing::info!(
            "Session started: {} candidates, {} features, budget {}, traversal {}",
            self.candidates.len(),
            self.weights.dimension(),
            self.config.swipe_budget,
            self.config.traversal
        );

        self.presented = self.next_candidate();
        if self.presented.is_none() || self.config.swipe_budget == 0 {
            self.complete();
        } else {
            self.state = SessionState::AwaitingFeedback;
        }
    }

    /// Apply feedback to the presented candidate and advance the session.
    pub fn submit(&mut self, feedback: Feedback) -> Result<SessionState, SwipeError> {
        if self.state != SessionState::AwaitingFeedback {
            return Err(SwipeError::SessionClosed);
        }
        let (index, features) = match (self.presented, self.features.as_ref()) {
            (Some(index), Some(features)) => (index, features),
            _ => return Err(SwipeError::SessionClosed),
        };

        let row = features.row(index);
        let score = self.weights.score(&row);
        self.weights = self.weights.updated(&row, feedback);

        let ticker = self.candidates[index].ticker().to_string();
        tracing::debug!(
            "Swipe {}/{}: {} {} (score {:.4})",
            self.history.len() + 1,
            self.config.swipe_budget,
            feedback,
            ticker,
            score
        );
        self.history.push(FeedbackEvent {
            ticker,
            feedback,
            score,
        });

        match &mut self.cursor {
            Cursor::Sequential { next } => *next = index + 1,
            Cursor::Greedy { pool } => pool.retain(|&i| i != index),
        }

        self.presented = if self.history.len() >= self.config.swipe_budget {
            None
        } else {
            self.next_candidate()
        };
        if self.presented.is_none() {
            self.complete();
        }

        Ok(self.state)
    }

    fn next_candidate(&self) -> Option<usize> {
        let features = self.features.as_ref()?;
        match &self.cursor {
            Cursor::Sequential { next } => (*next < self.candidates.len()).then_some(*next),
            Cursor::Greedy { pool } => Ranker::best_in_pool(features, &self.weights, pool),
        }
    }

    /// Indices never presented, in load order
    fn unseen(&self) -> Vec<usize> {
        match &self.cursor {
            Cursor::Sequential { next } => (*next..self.candidates.len()).collect(),
            Cursor::Greedy { pool } => pool.clone(),
        }
    }

    fn complete(&mut self) {
        self.presented = None;
        self.state = SessionState::Completed;

        let Some(features) = self.features.as_ref() else {
            return;
        };
        let count = self.config.recommendation_count;
        self.recommendations = match self.config.effective_scope() {
            RecommendationScope::FullCorpus => {
                Ranker::top_recommendations(&self.candidates, features, &self.weights, count)
            }
            RecommendationScope::Unseen => Ranker::top_among(
                &self.candidates,
                features,
                &self.weights,
                &self.unseen(),
                count,
            ),
        };

        tracing::info!(
            "Session completed after {} swipes ({} liked); top picks: {}",
            self.history.len(),
            self.history.iter().filter(|e| e.feedback.is_like()).count(),
            self.recommendations
                .iter()
                .map(|c| c.ticker())
                .collect::<Vec<_>>()
                .join(", ")
        );
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// Candidate awaiting feedback, if any
    pub fn current(&self) -> Option<&Candidate> {
        self.presented.map(|i| &self.candidates[i])
    }

    /// Score of the candidate awaiting feedback under the current weights
    pub fn current_score(&self) -> Option<f64> {
        let index = self.presented?;
        let features = self.features.as_ref()?;
        Some(self.weights.score(&features.row(index)))
    }

    /// Number of feedback events applied so far
    pub fn swipes(&self) -> usize {
        self.history.len()
    }

    pub fn remaining_swipes(&self) -> usize {
        self.config.swipe_budget.saturating_sub(self.history.len())
    }

    pub fn history(&self) -> &[FeedbackEvent] {
        &self.history
    }

    pub fn candidates(&self) -> &[Candidate] {
        &self.candidates
    }

    pub fn features(&self) -> Option<&FeatureMatrix> {
        self.features.as_ref()
    }

    /// Current preference weights (diagnostics and tests)
    pub fn weights(&self) -> &PreferenceWeights {
        &self.weights
    }

    /// Final shortlist; empty until the session is `Completed`
    pub fn recommendations(&self) -> &[Candidate] {
        &self.recommendations
    }
}
