//! Zero-shot scorer over HTTP
//!
//! Speaks the zero-shot-classification request shape used by hosted
//! inference endpoints: one POST per batch, `multi_label = true`.

use std::time::Duration;

use serde::Deserialize;

use crate::constants::HYPOTHESIS_TEMPLATE;
use crate::logic::threat::{LabelScores, ThreatLabel};
use super::{ScorerError, SemanticScorer};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

/// One classified sequence in the endpoint reply
#[derive(Debug, Deserialize)]
struct ZeroShotItem {
    labels: Vec<String>,
    scores: Vec<f32>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ZeroShotReply {
    Batch(Vec<ZeroShotItem>),
    Single(ZeroShotItem),
}

pub struct ZeroShotScorer {
    endpoint: String,
    token: Option<String>,
    model: String,
    agent: ureq::Agent,
}

impl ZeroShotScorer {
    /// `url` may contain a `{model}` placeholder.
    pub fn new(url: &str, model: &str, token: Option<String>) -> Self {
        let agent = ureq::AgentBuilder::new().timeout(REQUEST_TIMEOUT).build();
        Self {
            endpoint: url.replace("{model}", model),
            token,
            model: model.to_string(),
            agent,
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

/// Request body for one batch
pub fn build_payload(texts: &[String], labels: &[ThreatLabel]) -> serde_json::Value {
    let candidate_labels: Vec<&str> = labels.iter().map(|l| l.as_str()).collect();
    serde_json::json!({
        "inputs": texts,
        "parameters": {
            "candidate_labels": candidate_labels,
            "multi_label": true,
            "hypothesis_template": HYPOTHESIS_TEMPLATE,
        }
    })
}

/// Map the endpoint reply to per-item scores, checking the count
pub fn parse_reply(body: &str, expected: usize) -> Result<Vec<LabelScores>, ScorerError> {
    let reply: ZeroShotReply =
        serde_json::from_str(body).map_err(|e| ScorerError::Parse(e.to_string()))?;

    let items = match reply {
        ZeroShotReply::Batch(items) => items,
        ZeroShotReply::Single(item) => vec![item],
    };

    if items.len() != expected {
        return Err(ScorerError::LengthMismatch {
            expected,
            actual: items.len(),
        });
    }

    items
        .into_iter()
        .map(|item| {
            if item.labels.len() != item.scores.len() {
                return Err(ScorerError::Parse(format!(
                    "{} labels but {} scores",
                    item.labels.len(),
                    item.scores.len()
                )));
            }
            Ok(LabelScores::from_pairs(
                item.labels.iter().map(String::as_str).zip(item.scores.iter().copied()),
            ))
        })
        .collect()
}

impl SemanticScorer for ZeroShotScorer {
    fn score(&self, texts: &[String], labels: &[ThreatLabel]) -> Result<Vec<LabelScores>, ScorerError> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        let payload = build_payload(texts, labels).to_string();
        let mut request = self
            .agent
            .post(&self.endpoint)
            .set("Content-Type", "application/json");
        if let Some(token) = &self.token {
            request = request.set("Authorization", &format!("Bearer {}", token));
        }

        log::debug!("Scoring {} entries with '{}'", texts.len(), self.model);

        match request.send_string(&payload) {
            Ok(resp) => {
                let body = resp
                    .into_string()
                    .map_err(|e| ScorerError::Parse(e.to_string()))?;
                parse_reply(&body, texts.len())
            }
            Err(ureq::Error::Status(status, resp)) => {
                let message = resp.into_string().unwrap_or_default();
                Err(ScorerError::Status { status, message })
            }
            Err(e) => Err(ScorerError::Network(e.to_string())),
        }
    }

    fn name(&self) -> &str {
        "zero-shot"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_payload_shape() {
        let texts = vec!["a | b -> c | Port: 22 | Protocol: 6".to_string()];
        let payload = build_payload(&texts, &ThreatLabel::ALL);

        assert_eq!(payload["inputs"][0], texts[0]);
        assert_eq!(payload["parameters"]["multi_label"], true);
        assert_eq!(
            payload["parameters"]["candidate_labels"],
            serde_json::json!(["SAFE", "SUSPICIOUS", "THREAT"])
        );
    }

    #[test]
    fn test_parse_batch_reply_any_label_order() {
        let body = r#"[
            {"sequence": "x", "labels": ["THREAT", "SUSPICIOUS", "SAFE"], "scores": [0.9, 0.3, 0.2]},
            {"sequence": "y", "labels": ["SAFE", "THREAT", "SUSPICIOUS"], "scores": [0.8, 0.1, 0.4]}
        ]"#;

        let scores = parse_reply(body, 2).unwrap();
        assert_eq!(scores[0].threat, 0.9);
        assert_eq!(scores[0].safe, 0.2);
        assert_eq!(scores[1].safe, 0.8);
        assert_eq!(scores[1].suspicious, 0.4);
    }

    #[test]
    fn test_parse_single_object_reply() {
        let body = r#"{"sequence": "x", "labels": ["SAFE"], "scores": [0.75]}"#;
        let scores = parse_reply(body, 1).unwrap();
        assert_eq!(scores[0].safe, 0.75);
        // Missing labels score zero
        assert_eq!(scores[0].threat, 0.0);
    }

    #[test]
    fn test_parse_reply_length_mismatch() {
        let body = r#"[{"labels": ["SAFE"], "scores": [0.5]}]"#;
        assert!(matches!(
            parse_reply(body, 3),
            Err(ScorerError::LengthMismatch { expected: 3, actual: 1 })
        ));
    }

    #[test]
    fn test_parse_reply_garbage() {
        assert!(matches!(parse_reply("{\"error\": \"loading\"}", 1), Err(ScorerError::Parse(_))));
    }

    #[test]
    fn test_model_placeholder() {
        let scorer = ZeroShotScorer::new(
            "https://inference.example/models/{model}",
            "typeform/distilbert-base-uncased-mnli",
            None,
        );
        assert_eq!(
            scorer.endpoint(),
            "https://inference.example/models/typeform/distilbert-base-uncased-mnli"
        );
    }
}
