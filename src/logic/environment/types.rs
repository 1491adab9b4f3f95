//! Decision Environment Types
//!
//! Observation / Action / Reward / state names. No stepping logic here.

use serde::{Deserialize, Serialize};

use crate::logic::threat::ThreatLabel;

/// Width of the one-hot observation
pub const OBSERVATION_WIDTH: usize = 3;

// ============================================================================
// OBSERVATION
// ============================================================================

/// One-hot encoding of a label (SAFE=0, SUSPICIOUS=1, THREAT=2)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Observation(pub [f32; OBSERVATION_WIDTH]);

impl Observation {
    pub fn from_label(label: ThreatLabel) -> Self {
        let mut values = [0.0f32; OBSERVATION_WIDTH];
        values[label.index()] = 1.0;
        Self(values)
    }

    /// Terminal sentinel; never a real observation
    pub fn zero() -> Self {
        Self([0.0; OBSERVATION_WIDTH])
    }

    pub fn is_zero(&self) -> bool {
        self.0.iter().all(|v| *v == 0.0)
    }

    pub fn as_slice(&self) -> &[f32] {
        &self.0
    }

    /// Label this observation encodes (None for the zero sentinel)
    pub fn label(&self) -> Option<ThreatLabel> {
        if self.is_zero() {
            return None;
        }
        let hot = argmax(&self.0)?;
        ThreatLabel::from_index(hot)
    }
}

/// Index of the largest value; first one wins on ties
pub fn argmax(values: &[f32]) -> Option<usize> {
    values
        .iter()
        .enumerate()
        .fold(None, |best: Option<(usize, f32)>, (i, &v)| match best {
            Some((_, b)) if b >= v => best,
            _ => Some((i, v)),
        })
        .map(|(i, _)| i)
}

// ============================================================================
// ACTION
// ============================================================================

/// Mitigation action chosen by the policy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    Ignore,
    Alert,
    Quarantine,
}

impl Action {
    pub const ALL: [Action; 3] = [Action::Ignore, Action::Alert, Action::Quarantine];

    pub fn index(&self) -> usize {
        match self {
            Action::Ignore => 0,
            Action::Alert => 1,
            Action::Quarantine => 2,
        }
    }

    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Action::Ignore => "ignore",
            Action::Alert => "alert",
            Action::Quarantine => "quarantine",
        }
    }
}

impl std::fmt::Display for Action {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// ============================================================================
// REWARD
// ============================================================================

/// Exact-match reward: +1 or -1, nothing else
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reward {
    Match,
    Miss,
}

impl Reward {
    pub fn for_action(action: Action, truth: ThreatLabel) -> Self {
        if action.index() == truth.index() {
            Reward::Match
        } else {
            Reward::Miss
        }
    }

    pub fn value(&self) -> i32 {
        match self {
            Reward::Match => 1,
            Reward::Miss => -1,
        }
    }

    pub fn is_positive(&self) -> bool {
        matches!(self, Reward::Match)
    }
}

// ============================================================================
// STATE
// ============================================================================

/// READY: cursor 0. RUNNING: 0 < cursor < len. DONE: cursor == len.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EnvState {
    Ready,
    Running,
    Done,
}
