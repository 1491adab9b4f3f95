//! Policy Module
//!
//! Read-only decision function trained elsewhere. The core only needs
//! `act(observation) -> action`; the artifact format is picked by extension.
//!
//! - `table`: JSON label -> action table
//! - `onnx`: exported network run through ONNX Runtime
//!
//! ## Usage
//! ```ignore
//! let policy = PolicyFile::new("models/decision_agent.onnx").load()?;
//! let action = policy.act(&observation)?;
//! ```

pub mod onnx;
pub mod table;

use std::fs;
use std::path::{Path, PathBuf};

use sha2::{Digest, Sha256};
use thiserror::Error;

use crate::logic::environment::{Action, Observation};

pub use onnx::OnnxPolicy;
pub use table::TablePolicy;

#[derive(Error, Debug)]
pub enum PolicyError {
    #[error("policy artifact not found: {0}")]
    NotFound(PathBuf),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("checksum mismatch: expected {expected}, got {actual}")]
    ChecksumMismatch { expected: String, actual: String },

    #[error("unsupported policy format: {0}")]
    UnsupportedFormat(String),

    #[error("invalid policy: {0}")]
    Invalid(String),

    #[error("ONNX runtime error: {0}")]
    Onnx(String),

    #[error("policy produced out-of-range action {0}")]
    InvalidAction(i64),
}

/// Pure decision function; no state visible to the caller changes.
pub trait Policy {
    fn act(&self, observation: &Observation) -> Result<Action, PolicyError>;

    fn name(&self) -> &str;
}

/// Source of the policy for one orchestration run
pub trait PolicyLoader {
    fn load(&self) -> Result<Box<dyn Policy>, PolicyError>;
}

/// Policy artifact on disk, optionally pinned by SHA-256
#[derive(Debug, Clone)]
pub struct PolicyFile {
    pub path: PathBuf,
    pub sha256: Option<String>,
}

impl PolicyFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            sha256: None,
        }
    }

    pub fn with_checksum(mut self, sha256: Option<String>) -> Self {
        self.sha256 = sha256;
        self
    }
}

impl PolicyLoader for PolicyFile {
    fn load(&self) -> Result<Box<dyn Policy>, PolicyError> {
        if !self.path.exists() {
            return Err(PolicyError::NotFound(self.path.clone()));
        }

        if let Some(expected) = &self.sha256 {
            verify_checksum(&self.path, expected)?;
            log::info!("Policy checksum verified");
        }

        let ext = self
            .path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase)
            .unwrap_or_default();

        let policy: Box<dyn Policy> = match ext.as_str() {
            "onnx" => Box::new(OnnxPolicy::load(&self.path)?),
            "json" => Box::new(TablePolicy::load(&self.path)?),
            other => return Err(PolicyError::UnsupportedFormat(other.to_string())),
        };

        log::info!("Loaded {} policy from {}", policy.name(), self.path.display());
        Ok(policy)
    }
}

/// Hex SHA-256 of a file
pub fn file_sha256(path: &Path) -> Result<String, PolicyError> {
    let bytes = fs::read(path)?;
    Ok(hex::encode(Sha256::digest(&bytes)))
}

/// Compare a file against an expected hex digest (case-insensitive)
pub fn verify_checksum(path: &Path, expected: &str) -> Result<(), PolicyError> {
    let actual = file_sha256(path)?;
    if actual.eq_ignore_ascii_case(expected.trim()) {
        Ok(())
    } else {
        Err(PolicyError::ChecksumMismatch {
            expected: expected.trim().to_string(),
            actual,
        })
    }
}
