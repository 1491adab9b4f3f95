//! Table policy
//!
//! `{"SAFE": 0, "SUSPICIOUS": 1, "THREAT": 2}` - one action per label.

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use crate::logic::environment::{argmax, Action, Observation};
use crate::logic::threat::ThreatLabel;
use super::{Policy, PolicyError};

#[derive(Debug, Clone, PartialEq)]
pub struct TablePolicy {
    /// Indexed by label index
    actions: [Action; 3],
}

impl Default for TablePolicy {
    /// SAFE -> ignore, SUSPICIOUS -> alert, THREAT -> quarantine
    fn default() -> Self {
        Self {
            actions: [Action::Ignore, Action::Alert, Action::Quarantine],
        }
    }
}

impl TablePolicy {
    pub fn new(actions: [Action; 3]) -> Self {
        Self { actions }
    }

    /// Same action regardless of observation
    pub fn constant(action: Action) -> Self {
        Self { actions: [action; 3] }
    }

    pub fn load(path: &Path) -> Result<Self, PolicyError> {
        let data = fs::read_to_string(path)?;
        Self::from_json(&data)
    }

    /// Every label must map to an action index in 0..=2
    pub fn from_json(data: &str) -> Result<Self, PolicyError> {
        let table: HashMap<String, i64> =
            serde_json::from_str(data).map_err(|e| PolicyError::Invalid(e.to_string()))?;

        let mut actions = [Action::Ignore; 3];
        for label in ThreatLabel::ALL {
            let raw = *table
                .get(label.as_str())
                .ok_or_else(|| PolicyError::Invalid(format!("no action for {}", label)))?;
            actions[label.index()] = usize::try_from(raw)
                .ok()
                .and_then(Action::from_index)
                .ok_or(PolicyError::InvalidAction(raw))?;
        }
        Ok(Self { actions })
    }

    pub fn action_for(&self, label: ThreatLabel) -> Action {
        self.actions[label.index()]
    }
}

impl Policy for TablePolicy {
    fn act(&self, observation: &Observation) -> Result<Action, PolicyError> {
        let hot = argmax(observation.as_slice())
            .ok_or_else(|| PolicyError::Invalid("empty observation".to_string()))?;
        Ok(self.actions[hot])
    }

    fn name(&self) -> &str {
        "table"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_matches_label_order() {
        let policy = TablePolicy::default();
        for label in ThreatLabel::ALL {
            let action = policy.act(&Observation::from_label(label)).unwrap();
            assert_eq!(action.index(), label.index());
        }
    }

    #[test]
    fn test_from_json() {
        let policy = TablePolicy::from_json(r#"{"SAFE": 0, "SUSPICIOUS": 2, "THREAT": 2}"#).unwrap();
        assert_eq!(policy.action_for(ThreatLabel::Suspicious), Action::Quarantine);
    }

    #[test]
    fn test_from_json_missing_label() {
        assert!(matches!(
            TablePolicy::from_json(r#"{"SAFE": 0, "THREAT": 2}"#),
            Err(PolicyError::Invalid(_))
        ));
    }

    #[test]
    fn test_from_json_out_of_range_action() {
        assert!(matches!(
            TablePolicy::from_json(r#"{"SAFE": 0, "SUSPICIOUS": 1, "THREAT": 3}"#),
            Err(PolicyError::InvalidAction(3))
        ));
    }

    #[test]
    fn test_constant_policy() {
        let policy = TablePolicy::constant(Action::Ignore);
        let obs = Observation::from_label(ThreatLabel::Threat);
        assert_eq!(policy.act(&obs).unwrap(), Action::Ignore);
    }
}
