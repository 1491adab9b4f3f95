//! FlowGuard Core
//!
//! Labels captured network flows as SAFE / SUSPICIOUS / THREAT and replays
//! the labeled set through a decision environment to score a response policy.

pub mod config;
pub mod constants;
pub mod error;
pub mod logic;

pub use config::Config;
pub use error::{PipelineError, PipelineResult, Stage};
pub use logic::pipeline::{evaluate, EpisodeScore, Pipeline, RunReport};
