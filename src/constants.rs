//! Central Configuration Constants
//!
//! Single source of truth for all configuration defaults.
//! Every value here can be overridden from the environment (see `config.rs`).

/// Default SQLite database written by the capture process
pub const DEFAULT_DB_PATH: &str = "data/packets.db";

/// Default exported decision policy
pub const DEFAULT_POLICY_PATH: &str = "models/decision_agent.onnx";

/// Default retrieval index directory (owned by the external index builder)
pub const DEFAULT_INDEX_DIR: &str = "data/faiss_index";

/// Default zero-shot model name sent to the scorer endpoint
pub const DEFAULT_SCORER_MODEL: &str = "typeform/distilbert-base-uncased-mnli";

/// Hypothesis template for zero-shot scoring
pub const HYPOTHESIS_TEMPLATE: &str = "This network log entry is {}.";

/// Records per scorer call
pub const DEFAULT_BATCH_SIZE: usize = 16;

/// THREAT wins when its score is strictly above this
pub const DEFAULT_THREAT_THRESHOLD: f32 = 0.7;

/// SAFE wins (after THREAT) when its score is strictly above this
pub const DEFAULT_SAFE_THRESHOLD: f32 = 0.7;

/// Destination ports that are always labeled SAFE
pub const WEB_PORTS: [u16; 2] = [80, 443];

/// Default number of records classified per run
pub const DEFAULT_LIMIT: usize = 100;

/// App version
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// App name
pub const APP_NAME: &str = "FlowGuard";

// ============================================
// Environment variable names
// ============================================

pub const ENV_DB_PATH: &str = "FLOWGUARD_DB_PATH";
pub const ENV_POLICY_PATH: &str = "FLOWGUARD_POLICY_PATH";
pub const ENV_POLICY_SHA256: &str = "FLOWGUARD_POLICY_SHA256";
pub const ENV_INDEX_DIR: &str = "FLOWGUARD_INDEX_DIR";
pub const ENV_INDEX_BUILD_CMD: &str = "FLOWGUARD_INDEX_BUILD_CMD";
pub const ENV_COLLECTOR_CMD: &str = "FLOWGUARD_COLLECTOR_CMD";
pub const ENV_SCORER_URL: &str = "FLOWGUARD_SCORER_URL";
pub const ENV_SCORER_TOKEN: &str = "HUGGINGFACEHUB_API_TOKEN";
pub const ENV_SCORER_MODEL: &str = "FLOWGUARD_SCORER_MODEL";
pub const ENV_BATCH_SIZE: &str = "FLOWGUARD_BATCH_SIZE";
pub const ENV_THREAT_THRESHOLD: &str = "FLOWGUARD_THREAT_THRESHOLD";
pub const ENV_SAFE_THRESHOLD: &str = "FLOWGUARD_SAFE_THRESHOLD";
