//! Decision Environment Module
//!
//! Replayable step-through of already-labeled records. Not a traffic
//! generator: the episode is a fixed snapshot taken at construction.
//!
//! ## Structure
//! - `types`: Observation, Action, Reward, EnvState
//! - `episode`: Episode snapshot (id order)
//! - `machine`: DecisionEnvironment / ActiveRun / FinishedRun / Step
//!
//! ## Usage
//! ```ignore
//! let env = DecisionEnvironment::from_store(&store)?;
//! let (mut run, mut obs) = env.reset();
//! loop {
//!     match run.step(policy.act(&obs)?) {
//!         Step::Running { run: next, observation, .. } => { run = next; obs = observation; }
//!         Step::Done { .. } => break,
//!     }
//! }
//! ```

pub mod types;
pub mod episode;
pub mod machine;

#[cfg(test)]
mod tests;

pub use types::{argmax, Action, EnvState, Observation, Reward, OBSERVATION_WIDTH};
pub use episode::{Episode, EpisodeStep};
pub use machine::{ActiveRun, DecisionEnvironment, FinishedRun, Step};
