//! Classifier Engine
//!
//! Input: unlabeled flow records from the store
//! Output: one persisted label per record, written as a single batch
//!
//! Web-port records are decided by the override rule and never reach the
//! scorer. Everything else is scored in fixed-size groups; grouping only
//! amortizes scorer overhead and never changes a record's label.

use crate::constants::DEFAULT_BATCH_SIZE;
use crate::error::{PipelineError, PipelineResult, Stage};
use crate::logic::scorer::{ScorerError, SemanticScorer};
use crate::logic::store::{FlowRecord, RecordId, RecordStore};
use super::rules::{decide, LabelThresholds, RuleInput};
use super::types::{Decision, LabelRule, ThreatLabel};

pub struct ClassifierEngine<'a> {
    store: &'a dyn RecordStore,
    scorer: &'a dyn SemanticScorer,
    thresholds: LabelThresholds,
    batch_size: usize,
}

impl<'a> ClassifierEngine<'a> {
    pub fn new(store: &'a dyn RecordStore, scorer: &'a dyn SemanticScorer) -> Self {
        Self {
            store,
            scorer,
            thresholds: LabelThresholds::default(),
            batch_size: DEFAULT_BATCH_SIZE,
        }
    }

    pub fn with_thresholds(mut self, thresholds: LabelThresholds) -> Self {
        self.thresholds = thresholds;
        self
    }

    /// Records per scorer call (minimum 1)
    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size.max(1);
        self
    }

    /// Label up to `limit` unlabeled records and persist them as one batch.
    ///
    /// Takes `&mut self`: one engine, one writer. Returns the number of
    /// records labeled; 0 when `limit` is 0 or nothing is pending.
    pub fn classify(&mut self, limit: usize) -> PipelineResult<usize> {
        if limit == 0 {
            log::info!("Classification limit is 0, nothing to do");
            return Ok(0);
        }

        let records = self
            .store
            .fetch_unlabeled(limit)
            .map_err(|source| PipelineError::StoreUnavailable {
                stage: Stage::Classification,
                source,
            })?;

        if records.is_empty() {
            log::info!("No unlabeled records found to classify");
            return Ok(0);
        }

        log::info!(
            "Classifying {} records with '{}' scorer (batch size {})",
            records.len(),
            self.scorer.name(),
            self.batch_size
        );

        let decisions = self.label_records(&records)?;

        let labels: Vec<(RecordId, ThreatLabel)> = records
            .iter()
            .zip(&decisions)
            .map(|(record, decision)| (record.id, decision.label))
            .collect();

        self.store
            .persist(&labels)
            .map_err(|source| PipelineError::BatchPersistFailure {
                batch: labels.len(),
                source,
            })?;

        log_tally(&decisions);
        Ok(labels.len())
    }

    /// Decide a label for every record without touching the store.
    ///
    /// Output is index-aligned with `records`.
    pub fn label_records(&self, records: &[FlowRecord]) -> PipelineResult<Vec<Decision>> {
        // Unscored pass: web ports resolve here, the rest get a provisional fallback
        let mut decisions: Vec<Decision> = records
            .iter()
            .map(|r| decide(&RuleInput { dst_port: r.dst_port, scores: None }, &self.thresholds))
            .collect();

        let pending: Vec<usize> = decisions
            .iter()
            .enumerate()
            .filter(|(_, d)| d.rule != LabelRule::WebPortOverride)
            .map(|(i, _)| i)
            .collect();

        let overridden = records.len() - pending.len();
        if overridden > 0 {
            log::debug!("{} records matched the web-port override", overridden);
        }

        for chunk in pending.chunks(self.batch_size) {
            let texts: Vec<String> = chunk.iter().map(|&i| records[i].summary()).collect();
            let scores = self.scorer.score(&texts, &ThreatLabel::ALL)?;

            if scores.len() != chunk.len() {
                return Err(ScorerError::LengthMismatch {
                    expected: chunk.len(),
                    actual: scores.len(),
                }
                .into());
            }

            for (&i, score) in chunk.iter().zip(scores) {
                let input = RuleInput {
                    dst_port: records[i].dst_port,
                    scores: Some(score),
                };
                decisions[i] = decide(&input, &self.thresholds);
            }
        }

        for (n, (record, decision)) in records.iter().zip(&decisions).enumerate() {
            log::debug!(
                "  {}/{}: Entry {} labeled as {} ({})",
                n + 1,
                records.len(),
                record.id,
                decision.label,
                decision.rule.as_str()
            );
        }

        Ok(decisions)
    }
}

fn log_tally(decisions: &[Decision]) {
    let count = |label: ThreatLabel| decisions.iter().filter(|d| d.label == label).count();
    log::info!(
        "Classified {} records: {} SAFE, {} SUSPICIOUS, {} THREAT",
        decisions.len(),
        count(ThreatLabel::Safe),
        count(ThreatLabel::Suspicious),
        count(ThreatLabel::Threat)
    );
}

// ============================================================================
// TESTS
// ============================================================================
