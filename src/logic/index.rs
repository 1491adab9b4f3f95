//! Retrieval Index (delegated)
//!
//! The vector index is built and queried by an external tool. The pipeline
//! only makes sure it exists before classification starts.

use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum IndexError {
    #[error("index at {0} is missing and no build command is configured")]
    NotConfigured(PathBuf),

    #[error("could not start index builder: {0}")]
    Spawn(std::io::Error),

    #[error("index builder exited with {0}")]
    BuildFailed(String),

    #[error("index builder finished but {0} is still empty")]
    StillMissing(PathBuf),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndexStatus {
    AlreadyPresent,
    Built,
}

pub trait IndexBuilder {
    fn ensure_index(&self) -> Result<IndexStatus, IndexError>;
}

/// Index stored as a directory; non-empty means present.
#[derive(Debug, Clone)]
pub struct DirectoryIndex {
    dir: PathBuf,
    build_command: Option<Vec<String>>,
}

impl DirectoryIndex {
    pub fn new(dir: impl Into<PathBuf>, build_command: Option<Vec<String>>) -> Self {
        Self {
            dir: dir.into(),
            build_command: build_command.filter(|c| !c.is_empty()),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn is_present(&self) -> bool {
        fs::read_dir(&self.dir)
            .map(|mut entries| entries.next().is_some())
            .unwrap_or(false)
    }
}

impl IndexBuilder for DirectoryIndex {
    fn ensure_index(&self) -> Result<IndexStatus, IndexError> {
        log::info!("Ensuring retrieval index at {}", self.dir.display());

        if self.is_present() {
            log::info!("Index already exists");
            return Ok(IndexStatus::AlreadyPresent);
        }

        let command = self
            .build_command
            .as_ref()
            .ok_or_else(|| IndexError::NotConfigured(self.dir.clone()))?;

        log::info!("No index found, running builder: {}", command.join(" "));
        let status = Command::new(&command[0])
            .args(&command[1..])
            .status()
            .map_err(IndexError::Spawn)?;

        if !status.success() {
            return Err(IndexError::BuildFailed(status.to_string()));
        }
        if !self.is_present() {
            return Err(IndexError::StillMissing(self.dir.clone()));
        }

        log::info!("Index built");
        Ok(IndexStatus::Built)
    }
}
