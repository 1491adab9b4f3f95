//! Episode materialization
//!
//! Built once from every labeled record, in id order, and never refreshed.

use crate::error::{PipelineError, PipelineResult, Stage};
use crate::logic::store::{LabeledRecord, RecordId, RecordStore};
use crate::logic::threat::ThreatLabel;
use super::types::Observation;

/// One position in the episode
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EpisodeStep {
    pub id: RecordId,
    pub observation: Observation,
    pub truth: ThreatLabel,
}

/// Fixed, non-empty sequence of (observation, ground truth) pairs
#[derive(Debug, Clone, PartialEq)]
pub struct Episode {
    steps: Vec<EpisodeStep>,
}

impl Episode {
    /// Snapshot the store's labeled records
    pub fn load(store: &dyn RecordStore) -> PipelineResult<Self> {
        let labeled = store
            .fetch_labeled()
            .map_err(|source| PipelineError::StoreUnavailable {
                stage: Stage::Environment,
                source,
            })?;
        Self::from_labels(labeled)
    }

    pub fn from_labels(mut labeled: Vec<LabeledRecord>) -> PipelineResult<Self> {
        if labeled.is_empty() {
            return Err(PipelineError::EmptyEpisode);
        }
        labeled.sort_by_key(|r| r.id);

        let steps = labeled
            .into_iter()
            .map(|r| EpisodeStep {
                id: r.id,
                observation: Observation::from_label(r.label),
                truth: r.label,
            })
            .collect();

        Ok(Self { steps })
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    /// Always false for a constructed episode
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    pub fn get(&self, cursor: usize) -> Option<&EpisodeStep> {
        self.steps.get(cursor)
    }

    pub fn steps(&self) -> &[EpisodeStep] {
        &self.steps
    }
}
