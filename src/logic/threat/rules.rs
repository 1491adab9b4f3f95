//! Labeling Rules & Thresholds
//!
//! The labeling decision is an ordered chain, first match wins:
//! web-port override -> THREAT threshold -> SAFE threshold -> fallback.

use serde::{Deserialize, Serialize};

use crate::constants::{DEFAULT_SAFE_THRESHOLD, DEFAULT_THREAT_THRESHOLD, WEB_PORTS};
use super::types::{Decision, LabelRule, LabelScores, ThreatLabel};

// ============================================================================
// CONFIGURABLE THRESHOLDS
// ============================================================================

/// Score thresholds (strictly greater-than)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LabelThresholds {
    /// THREAT when score[THREAT] > threat_min
    pub threat_min: f32,
    /// SAFE when score[SAFE] > safe_min (checked after THREAT)
    pub safe_min: f32,
}

impl Default for LabelThresholds {
    fn default() -> Self {
        Self {
            threat_min: DEFAULT_THREAT_THRESHOLD,
            safe_min: DEFAULT_SAFE_THRESHOLD,
        }
    }
}

// ============================================================================
// RULE CHAIN
// ============================================================================

/// What a rule can see about one record
#[derive(Debug, Clone, Copy)]
pub struct RuleInput {
    pub dst_port: u16,
    /// None when the record was never scored (override hit)
    pub scores: Option<LabelScores>,
}

/// Evaluation order. `Fallback` is last and always matches.
pub const RULE_CHAIN: [LabelRule; 4] = [
    LabelRule::WebPortOverride,
    LabelRule::ThreatThreshold,
    LabelRule::SafeThreshold,
    LabelRule::Fallback,
];

pub fn is_web_port(port: u16) -> bool {
    WEB_PORTS.contains(&port)
}

impl LabelRule {
    /// Label this rule assigns, or None if it does not match
    pub fn evaluate(&self, input: &RuleInput, thresholds: &LabelThresholds) -> Option<ThreatLabel> {
        match self {
            LabelRule::WebPortOverride => {
                is_web_port(input.dst_port).then_some(ThreatLabel::Safe)
            }
            LabelRule::ThreatThreshold => input
                .scores
                .filter(|s| s.threat > thresholds.threat_min)
                .map(|_| ThreatLabel::Threat),
            LabelRule::SafeThreshold => input
                .scores
                .filter(|s| s.safe > thresholds.safe_min)
                .map(|_| ThreatLabel::Safe),
            LabelRule::Fallback => Some(ThreatLabel::Suspicious),
        }
    }
}

/// Walk the chain and return the first match.
pub fn decide(input: &RuleInput, thresholds: &LabelThresholds) -> Decision {
    RULE_CHAIN
        .iter()
        .find_map(|rule| {
            rule.evaluate(input, thresholds)
                .map(|label| Decision { label, rule: *rule })
        })
        .unwrap_or(Decision {
            label: ThreatLabel::Suspicious,
            rule: LabelRule::Fallback,
        })
}
