//! Semantic Scorer Module
//!
//! Turns short flow summaries into independent per-label confidences.
//! The classifier only sees the `SemanticScorer` trait; which backend runs
//! is decided once at startup.
//!
//! - `zero_shot`: remote zero-shot NLI endpoint (multi-label)
//! - `heuristic`: offline port/protocol scoring, used when no endpoint is configured

pub mod heuristic;
pub mod zero_shot;

use thiserror::Error;

use crate::logic::threat::{LabelScores, ThreatLabel};

pub use heuristic::HeuristicScorer;
pub use zero_shot::ZeroShotScorer;

#[derive(Error, Debug)]
pub enum ScorerError {
    #[error("scorer endpoint unreachable: {0}")]
    Network(String),

    #[error("scorer endpoint returned HTTP {status}: {message}")]
    Status { status: u16, message: String },

    #[error("could not parse scorer response: {0}")]
    Parse(String),

    #[error("scorer returned {actual} results for a batch of {expected}")]
    LengthMismatch { expected: usize, actual: usize },
}

/// Stateless across calls; output order matches input order.
pub trait SemanticScorer {
    fn score(&self, texts: &[String], labels: &[ThreatLabel]) -> Result<Vec<LabelScores>, ScorerError>;

    /// Short backend name for logs and reports
    fn name(&self) -> &str;
}

impl<S: SemanticScorer + ?Sized> SemanticScorer for Box<S> {
    fn score(&self, texts: &[String], labels: &[ThreatLabel]) -> Result<Vec<LabelScores>, ScorerError> {
        (**self).score(texts, labels)
    }

    fn name(&self) -> &str {
        (**self).name()
    }
}
