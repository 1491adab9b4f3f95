//! Threat Types
//!
//! Core types for flow labeling.
//! No classification logic here - data structures only.

use serde::{Deserialize, Serialize};

// ============================================================================
// THREAT LABEL
// ============================================================================

/// Categorical label persisted on a flow record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ThreatLabel {
    /// Known or confidently benign traffic
    Safe,
    /// Low-confidence or ambiguous traffic
    Suspicious,
    /// Confidently hostile traffic
    Threat,
}

impl ThreatLabel {
    /// Candidate labels in observation-index order
    pub const ALL: [ThreatLabel; 3] = [ThreatLabel::Safe, ThreatLabel::Suspicious, ThreatLabel::Threat];

    pub fn as_str(&self) -> &'static str {
        match self {
            ThreatLabel::Safe => "SAFE",
            ThreatLabel::Suspicious => "SUSPICIOUS",
            ThreatLabel::Threat => "THREAT",
        }
    }

    /// Position in the one-hot observation (SAFE=0, SUSPICIOUS=1, THREAT=2)
    pub fn index(&self) -> usize {
        match self {
            ThreatLabel::Safe => 0,
            ThreatLabel::Suspicious => 1,
            ThreatLabel::Threat => 2,
        }
    }

    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }
}

impl std::fmt::Display for ThreatLabel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for ThreatLabel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "SAFE" => Ok(ThreatLabel::Safe),
            "SUSPICIOUS" => Ok(ThreatLabel::Suspicious),
            "THREAT" => Ok(ThreatLabel::Threat),
            other => Err(format!("unknown label '{}'", other)),
        }
    }
}

// ============================================================================
// LABEL SCORES (from the semantic scorer)
// ============================================================================

/// Independent per-label confidences, each in [0, 1].
///
/// Multi-label: the three values need not sum to 1.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct LabelScores {
    pub safe: f32,
    pub suspicious: f32,
    pub threat: f32,
}

impl LabelScores {
    pub fn new(safe: f32, suspicious: f32, threat: f32) -> Self {
        Self {
            safe: safe.clamp(0.0, 1.0),
            suspicious: suspicious.clamp(0.0, 1.0),
            threat: threat.clamp(0.0, 1.0),
        }
    }

    pub fn get(&self, label: ThreatLabel) -> f32 {
        match label {
            ThreatLabel::Safe => self.safe,
            ThreatLabel::Suspicious => self.suspicious,
            ThreatLabel::Threat => self.threat,
        }
    }

    /// Build from parallel label/score lists; unknown names are ignored,
    /// missing labels score 0.
    pub fn from_pairs<'a, I>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (&'a str, f32)>,
    {
        let mut scores = LabelScores::default();
        for (name, score) in pairs {
            let score = score.clamp(0.0, 1.0);
            match name.parse::<ThreatLabel>() {
                Ok(ThreatLabel::Safe) => scores.safe = score,
                Ok(ThreatLabel::Suspicious) => scores.suspicious = score,
                Ok(ThreatLabel::Threat) => scores.threat = score,
                Err(_) => {}
            }
        }
        scores
    }
}

// ============================================================================
// DECISION
// ============================================================================

/// Rule in the labeling chain that produced a decision
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LabelRule {
    /// Destination is a well-known web port
    WebPortOverride,
    /// THREAT score above threshold
    ThreatThreshold,
    /// SAFE score above threshold
    SafeThreshold,
    /// Nothing else matched
    Fallback,
}

impl LabelRule {
    pub fn as_str(&self) -> &'static str {
        match self {
            LabelRule::WebPortOverride => "web_port_override",
            LabelRule::ThreatThreshold => "threat_threshold",
            LabelRule::SafeThreshold => "safe_threshold",
            LabelRule::Fallback => "fallback",
        }
    }
}

/// Final label plus the rule that chose it
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Decision {
    pub label: ThreatLabel,
    pub rule: LabelRule,
}
