//! Threat Module
//!
//! Turns flow records into SAFE / SUSPICIOUS / THREAT labels.
//!
//! ## Structure
//! - `types`: ThreatLabel, LabelScores, LabelRule, Decision
//! - `rules`: thresholds and the ordered rule chain
//! - `classifier`: ClassifierEngine (fetch -> override -> score -> decide -> persist)
//!
//! ## Usage
//! ```ignore
//! let mut engine = ClassifierEngine::new(&store, &scorer);
//! let labeled = engine.classify(100)?;
//! ```

pub mod types;
pub mod rules;
pub mod classifier;

pub use types::{Decision, LabelRule, LabelScores, ThreatLabel};
pub use rules::{decide, is_web_port, LabelThresholds, RuleInput, RULE_CHAIN};
pub use classifier::ClassifierEngine;
