//! Pipeline Orchestrator
//!
//! ensure index -> classify batch -> build environment -> load policy ->
//! step the whole episode -> report accuracy.
//!
//! Strictly sequential: labels are persisted before the environment
//! snapshots them. Nothing here writes to the store besides the classifier.


use std::fs;
use std::path::Path;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::constants::DEFAULT_BATCH_SIZE;
use crate::error::{PipelineError, PipelineResult};
use crate::logic::environment::{DecisionEnvironment, Step};
use crate::logic::index::IndexBuilder;
use crate::logic::policy::{Policy, PolicyLoader};
use crate::logic::scorer::SemanticScorer;
use crate::logic::store::RecordStore;
use crate::logic::threat::{ClassifierEngine, LabelThresholds};

// ============================================================================
// REPORTS
// ============================================================================

/// Result of stepping one full episode
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EpisodeScore {
    pub steps: usize,
    pub correct: usize,
    pub total_reward: i64,
    /// correct / steps, in [0, 1]
    pub accuracy: f64,
}

/// One orchestration run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunReport {
    pub run_id: Uuid,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub scorer: String,
    pub policy: String,
    /// Records labeled by this run
    pub classified: usize,
    pub episode_length: usize,
    pub correct: usize,
    pub total_reward: i64,
    pub accuracy: f64,
}

impl RunReport {
    /// Pretty JSON, creating parent directories as needed
    pub fn write_json(&self, path: &Path) -> std::io::Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_vec_pretty(self)?;
        fs::write(path, json)
    }
}

impl std::fmt::Display for RunReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Decision accuracy: {}/{} = {:.2}%",
            self.correct,
            self.episode_length,
            self.accuracy * 100.0
        )
    }
}

// ============================================================================
// EPISODE LOOP
// ============================================================================

/// reset, then step with the policy's action until done
pub fn evaluate(env: &DecisionEnvironment, policy: &dyn Policy) -> PipelineResult<EpisodeScore> {
    let (mut run, mut observation) = env.reset();
    let mut steps = 0usize;
    let mut correct = 0usize;
    let mut total_reward = 0i64;

    loop {
        let action = policy
            .act(&observation)
            .map_err(|source| PipelineError::PolicyFailure { step: steps, source })?;

        let step = run.step(action);
        steps += 1;
        let reward = step.reward();
        total_reward += i64::from(reward.value());
        if reward.is_positive() {
            correct += 1;
        }

        match step {
            Step::Running { run: next, observation: next_obs, .. } => {
                run = next;
                observation = next_obs;
            }
            Step::Done { .. } => break,
        }
    }

    // steps >= 1: environments are never empty
    Ok(EpisodeScore {
        steps,
        correct,
        total_reward,
        accuracy: correct as f64 / steps as f64,
    })
}

// ============================================================================
// ORCHESTRATOR
// ============================================================================

pub struct Pipeline<'a> {
    store: &'a dyn RecordStore,
    scorer: &'a dyn SemanticScorer,
    index: &'a dyn IndexBuilder,
    policy: &'a dyn PolicyLoader,
    thresholds: LabelThresholds,
    batch_size: usize,
}

impl<'a> Pipeline<'a> {
    pub fn new(
        store: &'a dyn RecordStore,
        scorer: &'a dyn SemanticScorer,
        index: &'a dyn IndexBuilder,
        policy: &'a dyn PolicyLoader,
    ) -> Self {
        Self {
            store,
            scorer,
            index,
            policy,
            thresholds: LabelThresholds::default(),
            batch_size: DEFAULT_BATCH_SIZE,
        }
    }

    pub fn with_thresholds(mut self, thresholds: LabelThresholds) -> Self {
        self.thresholds = thresholds;
        self
    }

    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size;
        self
    }

    /// Run the whole pipeline once for up to `limit` new records.
    pub fn run(&self, limit: usize) -> PipelineResult<RunReport> {
        let run_id = Uuid::new_v4();
        let started_at = Utc::now();
        log::info!("Run {} starting (limit {})", run_id, limit);

        self.index.ensure_index()?;

        log::info!("Performing classification...");
        let mut engine = ClassifierEngine::new(self.store, self.scorer)
            .with_thresholds(self.thresholds)
            .with_batch_size(self.batch_size);
        let classified = engine.classify(limit)?;

        match self.store.count_unlabeled() {
            Ok(0) => {}
            Ok(remaining) => log::info!("{} records still unlabeled", remaining),
            Err(e) => log::warn!("Could not count unlabeled records: {}", e),
        }

        log::info!("Making decisions on classified entries...");
        let env = DecisionEnvironment::from_store(self.store)?;
        let policy = self.policy.load().map_err(PipelineError::PolicyLoadFailure)?;
        let score = evaluate(&env, policy.as_ref())?;

        let report = RunReport {
            run_id,
            started_at,
            finished_at: Utc::now(),
            scorer: self.scorer.name().to_string(),
            policy: policy.name().to_string(),
            classified,
            episode_length: score.steps,
            correct: score.correct,
            total_reward: score.total_reward,
            accuracy: score.accuracy,
        };

        log::info!("{}", report);
        Ok(report)
    }
}
