//! Record Store Module
//!
//! Durable table of captured flows with a lazily-added classification column.
//!
//! ## Structure
//! - `types`: FlowRecord, NewFlow, RecordId, LabeledRecord
//! - `sqlite`: SQLite-backed store (the capture process writes the same table)
//!
//! The classifier is the only writer. `persist` is atomic per call: either
//! every pair in the batch is written or none is.

pub mod types;
pub mod sqlite;


use thiserror::Error;

use crate::logic::threat::ThreatLabel;

pub use types::{FlowRecord, LabeledRecord, NewFlow, RecordId};
pub use sqlite::SqliteStore;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("table '{0}' not found")]
    MissingTable(&'static str),

    #[error("record {id} has unknown classification '{value}'")]
    UnknownLabel { id: RecordId, value: String },

    #[error("record {id} is malformed: {reason}")]
    InvalidRecord { id: RecordId, reason: String },

    #[error("record {id} missing or already labeled")]
    Conflict { id: RecordId },
}

/// Storage seen by the classifier and the decision environment
pub trait RecordStore {
    /// Up to `limit` unlabeled records, by id ascending. Rows with missing or
    /// out-of-range ports are left in place and never returned.
    fn fetch_unlabeled(&self, limit: usize) -> Result<Vec<FlowRecord>, StoreError>;

    /// Every labeled record, by id ascending
    fn fetch_labeled(&self) -> Result<Vec<LabeledRecord>, StoreError>;

    /// Write all labels or none
    fn persist(&self, labels: &[(RecordId, ThreatLabel)]) -> Result<(), StoreError>;

    /// Well-formed records still waiting for a label
    fn count_unlabeled(&self) -> Result<usize, StoreError>;
}
