//! Configuration module
//!
//! Built once in `main` and handed to each component at construction.

use std::env;
use std::path::PathBuf;

use crate::constants::*;
use crate::logic::threat::LabelThresholds;

/// Application configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// SQLite flow record database
    pub db_path: PathBuf,

    /// Decision policy artifact (.onnx or .json)
    pub policy_path: PathBuf,

    /// Optional SHA-256 pin for the policy artifact
    pub policy_sha256: Option<String>,

    /// Retrieval index directory
    pub index_dir: PathBuf,

    /// Command that builds the retrieval index when it is missing
    pub index_build_command: Option<Vec<String>>,

    /// Command that captures live traffic into the database
    pub collector_command: Option<Vec<String>>,

    /// Zero-shot scorer endpoint; heuristic scoring when unset
    pub scorer_url: Option<String>,

    /// Bearer token for the scorer endpoint
    pub scorer_token: Option<String>,

    /// Model name passed to the scorer
    pub scorer_model: String,

    /// Records per scorer call
    pub batch_size: usize,

    /// Label thresholds
    pub thresholds: LabelThresholds,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        Self {
            db_path: env::var(ENV_DB_PATH)
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from(DEFAULT_DB_PATH)),

            policy_path: env::var(ENV_POLICY_PATH)
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from(DEFAULT_POLICY_PATH)),

            policy_sha256: non_empty_var(ENV_POLICY_SHA256),

            index_dir: env::var(ENV_INDEX_DIR)
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from(DEFAULT_INDEX_DIR)),

            index_build_command: non_empty_var(ENV_INDEX_BUILD_CMD).map(|s| split_command(&s)),

            collector_command: non_empty_var(ENV_COLLECTOR_CMD).map(|s| split_command(&s)),

            scorer_url: non_empty_var(ENV_SCORER_URL),

            scorer_token: non_empty_var(ENV_SCORER_TOKEN),

            scorer_model: env::var(ENV_SCORER_MODEL)
                .unwrap_or_else(|_| DEFAULT_SCORER_MODEL.to_string()),

            batch_size: env::var(ENV_BATCH_SIZE)
                .ok()
                .and_then(|s| s.parse().ok())
                .filter(|n: &usize| *n > 0)
                .unwrap_or(DEFAULT_BATCH_SIZE),

            thresholds: LabelThresholds {
                threat_min: parse_threshold(ENV_THREAT_THRESHOLD, DEFAULT_THREAT_THRESHOLD),
                safe_min: parse_threshold(ENV_SAFE_THRESHOLD, DEFAULT_SAFE_THRESHOLD),
            },
        }
    }
}

fn non_empty_var(name: &str) -> Option<String> {
    env::var(name).ok().map(|s| s.trim().to_string()).filter(|s| !s.is_empty())
}

fn parse_threshold(name: &str, default: f32) -> f32 {
    env::var(name)
        .ok()
        .and_then(|s| s.parse::<f32>().ok())
        .filter(|v| (0.0..=1.0).contains(v))
        .unwrap_or(default)
}

/// Split a shell-style command line on whitespace (no quoting support)
pub fn split_command(line: &str) -> Vec<String> {
    line.split_whitespace().map(str::to_string).collect()
}
