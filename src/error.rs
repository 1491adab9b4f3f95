//! Error handling
//!
//! `PipelineError` is what the orchestrator surfaces to its caller. Every
//! variant maps to the pipeline stage that produced it.

use thiserror::Error;

use crate::logic::collector::CollectorError;
use crate::logic::index::IndexError;
use crate::logic::policy::PolicyError;
use crate::logic::scorer::ScorerError;
use crate::logic::store::StoreError;

pub type PipelineResult<T> = Result<T, PipelineError>;

/// Pipeline stage a failure belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Collection,
    Index,
    Classification,
    Environment,
    Policy,
}

impl Stage {
    pub fn as_str(&self) -> &'static str {
        match self {
            Stage::Collection => "collection",
            Stage::Index => "index",
            Stage::Classification => "classification",
            Stage::Environment => "environment",
            Stage::Policy => "policy",
        }
    }
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("traffic collection failed: {0}")]
    CollectionFailure(#[from] CollectorError),

    #[error("retrieval index unavailable: {0}")]
    IndexUnavailable(#[from] IndexError),

    #[error("record store unavailable during {stage}: {source}")]
    StoreUnavailable {
        stage: Stage,
        #[source]
        source: StoreError,
    },

    #[error("failed to persist labeled batch of {batch} records: {source}")]
    BatchPersistFailure {
        batch: usize,
        #[source]
        source: StoreError,
    },

    #[error("semantic scorer failed: {0}")]
    ScorerFailure(#[from] ScorerError),

    #[error("no labeled records in the store; classify records before building an episode")]
    EmptyEpisode,

    #[error("decision policy could not be loaded: {0}")]
    PolicyLoadFailure(#[source] PolicyError),

    #[error("decision policy failed at step {step}: {source}")]
    PolicyFailure {
        step: usize,
        #[source]
        source: PolicyError,
    },
}

impl PipelineError {
    /// Stage that produced this failure
    pub fn stage(&self) -> Stage {
        match self {
            PipelineError::CollectionFailure(_) => Stage::Collection,
            PipelineError::IndexUnavailable(_) => Stage::Index,
            PipelineError::StoreUnavailable { stage, .. } => *stage,
            PipelineError::BatchPersistFailure { .. } => Stage::Classification,
            PipelineError::ScorerFailure(_) => Stage::Classification,
            PipelineError::EmptyEpisode => Stage::Environment,
            PipelineError::PolicyLoadFailure(_) => Stage::Policy,
            PipelineError::PolicyFailure { .. } => Stage::Policy,
        }
    }
}
