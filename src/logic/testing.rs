//! Test doubles shared by the engine tests

use std::collections::HashMap;

use parking_lot::Mutex;

use crate::logic::index::{IndexBuilder, IndexError, IndexStatus};
use crate::logic::policy::{Policy, PolicyError, PolicyLoader, TablePolicy};
use crate::logic::scorer::{ScorerError, SemanticScorer};
use crate::logic::store::{FlowRecord, LabeledRecord, NewFlow, RecordId, RecordStore, SqliteStore, StoreError};
use crate::logic::threat::{LabelScores, ThreatLabel};

pub fn new_flow(src_ip: &str, dst_port: u16) -> NewFlow {
    NewFlow {
        timestamp: "2024-05-01 12:00:00".to_string(),
        src_ip: src_ip.to_string(),
        dst_ip: "192.168.1.10".to_string(),
        src_port: 50000,
        dst_port,
        protocol: "6".to_string(),
    }
}

/// Returns canned scores keyed by source address and records every call.
pub struct ScriptedScorer {
    by_source: HashMap<String, LabelScores>,
    fallback: LabelScores,
    truncate: bool,
    batches: Mutex<Vec<usize>>,
    seen: Mutex<Vec<String>>,
}

impl ScriptedScorer {
    pub fn new() -> Self {
        Self {
            by_source: HashMap::new(),
            fallback: LabelScores::new(0.5, 0.5, 0.5),
            truncate: false,
            batches: Mutex::new(Vec::new()),
            seen: Mutex::new(Vec::new()),
        }
    }

    pub fn with(mut self, src_ip: &str, scores: LabelScores) -> Self {
        self.by_source.insert(src_ip.to_string(), scores);
        self
    }

    /// Drop the last result of every batch
    pub fn truncating(mut self) -> Self {
        self.truncate = true;
        self
    }

    pub fn batches(&self) -> Vec<usize> {
        self.batches.lock().clone()
    }

    pub fn seen(&self) -> Vec<String> {
        self.seen.lock().clone()
    }
}

impl SemanticScorer for ScriptedScorer {
    fn score(&self, texts: &[String], _labels: &[ThreatLabel]) -> Result<Vec<LabelScores>, ScorerError> {
        self.batches.lock().push(texts.len());
        self.seen.lock().extend(texts.iter().cloned());

        let mut out: Vec<LabelScores> = texts
            .iter()
            .map(|text| {
                self.by_source
                    .iter()
                    .find(|(src, _)| text.contains(&format!("{} ->", src)))
                    .map(|(_, scores)| *scores)
                    .unwrap_or(self.fallback)
            })
            .collect();

        if self.truncate {
            out.pop();
        }
        Ok(out)
    }

    fn name(&self) -> &str {
        "scripted"
    }
}

pub struct FailingScorer;

impl SemanticScorer for FailingScorer {
    fn score(&self, _texts: &[String], _labels: &[ThreatLabel]) -> Result<Vec<LabelScores>, ScorerError> {
        Err(ScorerError::Network("connection refused".to_string()))
    }

    fn name(&self) -> &str {
        "failing"
    }
}

/// Reads pass through; every persist fails.
pub struct PersistFailStore<'a>(pub &'a SqliteStore);

impl RecordStore for PersistFailStore<'_> {
    fn fetch_unlabeled(&self, limit: usize) -> Result<Vec<FlowRecord>, StoreError> {
        self.0.fetch_unlabeled(limit)
    }

    fn fetch_labeled(&self) -> Result<Vec<LabeledRecord>, StoreError> {
        self.0.fetch_labeled()
    }

    fn persist(&self, labels: &[(RecordId, ThreatLabel)]) -> Result<(), StoreError> {
        let id = labels.first().map(|(id, _)| *id).unwrap_or(RecordId(0));
        Err(StoreError::Conflict { id })
    }

    fn count_unlabeled(&self) -> Result<usize, StoreError> {
        self.0.count_unlabeled()
    }
}

/// Hands out a fixed table policy and counts loads.
pub struct StaticLoader {
    pub policy: TablePolicy,
    pub loads: Mutex<usize>,
}

impl StaticLoader {
    pub fn new(policy: TablePolicy) -> Self {
        Self {
            policy,
            loads: Mutex::new(0),
        }
    }
}

impl PolicyLoader for StaticLoader {
    fn load(&self) -> Result<Box<dyn Policy>, PolicyError> {
        *self.loads.lock() += 1;
        Ok(Box::new(self.policy.clone()))
    }
}

/// Index that is always present
pub struct ReadyIndex;

impl IndexBuilder for ReadyIndex {
    fn ensure_index(&self) -> Result<IndexStatus, IndexError> {
        Ok(IndexStatus::AlreadyPresent)
    }
}

/// Index that can never be built
pub struct MissingIndex;

impl IndexBuilder for MissingIndex {
    fn ensure_index(&self) -> Result<IndexStatus, IndexError> {
        Err(IndexError::NotConfigured("data/faiss_index".into()))
    }
}
