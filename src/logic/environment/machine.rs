//! Decision Environment state machine
//!
//! `DecisionEnvironment` owns the episode. `reset` hands out an `ActiveRun`
//! (READY or RUNNING). `ActiveRun::step` consumes the run and returns either
//! the next `ActiveRun` or a `FinishedRun` (DONE). `FinishedRun` has no
//! `step`, so stepping a finished episode does not compile.

use crate::error::PipelineResult;
use crate::logic::store::{LabeledRecord, RecordStore};
use super::episode::Episode;
use super::types::{Action, EnvState, Observation, Reward};

pub struct DecisionEnvironment {
    episode: Episode,
}

impl DecisionEnvironment {
    /// Materialize the episode from the store. Fails with `EmptyEpisode`
    /// when nothing is labeled yet.
    pub fn from_store(store: &dyn RecordStore) -> PipelineResult<Self> {
        let episode = Episode::load(store)?;
        log::info!("Decision environment ready: {} labeled records", episode.len());
        Ok(Self { episode })
    }

    pub fn from_labels(labeled: Vec<LabeledRecord>) -> PipelineResult<Self> {
        Ok(Self {
            episode: Episode::from_labels(labeled)?,
        })
    }

    pub fn episode(&self) -> &Episode {
        &self.episode
    }

    pub fn len(&self) -> usize {
        self.episode.len()
    }

    pub fn is_empty(&self) -> bool {
        self.episode.is_empty()
    }

    /// Start (or restart) at cursor 0
    pub fn reset(&self) -> (ActiveRun<'_>, Observation) {
        let run = ActiveRun {
            episode: &self.episode,
            cursor: 0,
        };
        let observation = run.observation();
        (run, observation)
    }
}

/// A run that can still be stepped. Invariant: `cursor < episode.len()`.
#[derive(Debug, Clone, Copy)]
pub struct ActiveRun<'e> {
    episode: &'e Episode,
    cursor: usize,
}

impl<'e> ActiveRun<'e> {
    pub fn state(&self) -> EnvState {
        if self.cursor == 0 {
            EnvState::Ready
        } else {
            EnvState::Running
        }
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Observation at the cursor
    pub fn observation(&self) -> Observation {
        self.episode.steps()[self.cursor].observation
    }

    /// Score `action` against the ground truth at the cursor and advance by one.
    ///
    /// Pure: the same run stepped with the same action always yields the same result.
    pub fn step(self, action: Action) -> Step<'e> {
        let current = self.episode.steps()[self.cursor];
        let reward = Reward::for_action(action, current.truth);
        let next = self.cursor + 1;

        if next == self.episode.len() {
            Step::Done {
                run: FinishedRun { episode: self.episode },
                reward,
            }
        } else {
            let run = ActiveRun {
                episode: self.episode,
                cursor: next,
            };
            Step::Running {
                observation: run.observation(),
                run,
                reward,
            }
        }
    }

    pub fn reset(self) -> (ActiveRun<'e>, Observation) {
        restart(self.episode)
    }
}

/// DONE: cursor == episode length. Only `reset` is available.
#[derive(Debug, Clone, Copy)]
pub struct FinishedRun<'e> {
    episode: &'e Episode,
}

impl<'e> FinishedRun<'e> {
    pub fn state(&self) -> EnvState {
        EnvState::Done
    }

    pub fn cursor(&self) -> usize {
        self.episode.len()
    }

    pub fn reset(self) -> (ActiveRun<'e>, Observation) {
        restart(self.episode)
    }
}

fn restart(episode: &Episode) -> (ActiveRun<'_>, Observation) {
    let run = ActiveRun { episode, cursor: 0 };
    let observation = run.observation();
    (run, observation)
}

/// Outcome of one `step`
#[derive(Debug, Clone, Copy)]
pub enum Step<'e> {
    Running {
        run: ActiveRun<'e>,
        observation: Observation,
        reward: Reward,
    },
    Done {
        run: FinishedRun<'e>,
        reward: Reward,
    },
}

impl<'e> Step<'e> {
    pub fn reward(&self) -> Reward {
        match self {
            Step::Running { reward, .. } | Step::Done { reward, .. } => *reward,
        }
    }

    pub fn is_done(&self) -> bool {
        matches!(self, Step::Done { .. })
    }

    /// Next observation; the zero sentinel once done
    pub fn observation(&self) -> Observation {
        match self {
            Step::Running { observation, .. } => *observation,
            Step::Done { .. } => Observation::zero(),
        }
    }
}
