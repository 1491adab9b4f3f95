//! Heuristic scorer (no model)
//!
//! Port-based scoring over the flow summary text. Used when no scorer
//! endpoint is configured so the pipeline still runs offline.

use crate::logic::threat::{LabelScores, ThreatLabel};
use super::{ScorerError, SemanticScorer};

/// Ports commonly abused for lateral movement or remote control
const RISKY_PORTS: [u16; 10] = [23, 135, 139, 445, 1433, 3306, 3389, 4444, 5900, 6667];

/// Routine infrastructure services
const SERVICE_PORTS: [u16; 9] = [22, 25, 53, 110, 123, 143, 587, 993, 995];

/// Start of the IANA dynamic/ephemeral range
const EPHEMERAL_START: u16 = 49152;

#[derive(Debug, Default, Clone, Copy)]
pub struct HeuristicScorer;

impl HeuristicScorer {
    pub fn new() -> Self {
        Self
    }

    fn score_one(&self, text: &str) -> LabelScores {
        match destination_port(text) {
            Some(port) if RISKY_PORTS.contains(&port) => LabelScores::new(0.1, 0.4, 0.85),
            Some(port) if SERVICE_PORTS.contains(&port) => LabelScores::new(0.75, 0.3, 0.1),
            Some(port) if port >= EPHEMERAL_START => LabelScores::new(0.3, 0.6, 0.3),
            Some(_) => LabelScores::new(0.4, 0.5, 0.2),
            None => LabelScores::new(0.2, 0.5, 0.2),
        }
    }
}

/// Pull the destination port out of `"... | Port: 443 | ..."`
fn destination_port(text: &str) -> Option<u16> {
    let rest = text.split("Port: ").nth(1)?;
    let digits: String = rest.chars().take_while(|c| c.is_ascii_digit()).collect();
    digits.parse().ok()
}

impl SemanticScorer for HeuristicScorer {
    fn score(&self, texts: &[String], _labels: &[ThreatLabel]) -> Result<Vec<LabelScores>, ScorerError> {
        Ok(texts.iter().map(|t| self.score_one(t)).collect())
    }

    fn name(&self) -> &str {
        "heuristic"
    }
}
