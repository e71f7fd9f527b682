//! HTTP client for the text-classification service.

use async_trait::async_trait;
use aegis_common::config::ClassifierConfig;
use reqwest::Client;
use serde_json::{Value, json};
use std::time::Duration;
use thiserror::Error;
use tracing::debug;

use crate::scores::{AttributeScores, attributes};

/// Errors from the classification collaborator.
///
/// Callers on the automated scoring path treat every variant the same way:
/// fail open, log, and do not flag.
#[derive(Debug, Error)]
pub enum ClassifierError {
    /// Transport-level failure, including timeouts.
    #[error("classifier request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Non-success HTTP status from the service.
    #[error("classifier returned status {0}")]
    Status(u16),

    /// Response body did not match the expected shape.
    #[error("malformed classifier response: {0}")]
    MalformedResponse(String),

    /// A requested attribute was absent from the response.
    #[error("classifier response missing attribute: {0}")]
    MissingAttribute(String),
}

/// Scores message text for abuse risk.
#[async_trait]
pub trait ScoreEvaluator: Send + Sync {
    /// Score the given text, returning a mapping of named attributes to
    /// values in `[0, 1]`.
    async fn score(&self, text: &str) -> Result<AttributeScores, ClassifierError>;
}

/// Client for the Perspective comment-analysis API.
#[derive(Debug, Clone)]
pub struct PerspectiveClient {
    http_client: Client,
    api_url: String,
    api_key: String,
}

impl PerspectiveClient {
    /// Create a new client with a bounded request timeout.
    pub fn new(config: &ClassifierConfig) -> Result<Self, ClassifierError> {
        let http_client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            http_client,
            api_url: config.api_url.clone(),
            api_key: config.api_key.clone(),
        })
    }

    /// Build the analyze request body for a piece of text.
    fn request_body(text: &str) -> Value {
        let requested: serde_json::Map<String, Value> = attributes::REQUESTED
            .iter()
            .map(|name| ((*name).to_string(), json!({})))
            .collect();

        json!({
            "comment": { "text": text },
            "requestedAttributes": requested,
            "doNotStore": true,
        })
    }

    /// Extract attribute scores from an analyze response.
    ///
    /// Attributes beyond the requested set are kept; a requested attribute
    /// missing from the response is an error so the caller can apply the
    /// fail-open rule.
    fn parse_response(body: &Value) -> Result<AttributeScores, ClassifierError> {
        let attribute_scores = body
            .get("attributeScores")
            .and_then(Value::as_object)
            .ok_or_else(|| {
                ClassifierError::MalformedResponse("no attributeScores object".to_string())
            })?;

        let mut scores = AttributeScores::new();
        for (name, entry) in attribute_scores {
            let value = entry
                .pointer("/summaryScore/value")
                .and_then(Value::as_f64)
                .ok_or_else(|| {
                    ClassifierError::MalformedResponse(format!(
                        "no summary score for attribute {name}"
                    ))
                })?;
            scores.insert(name.clone(), value);
        }

        for required in attributes::REQUESTED {
            if !scores.contains(required) {
                return Err(ClassifierError::MissingAttribute(required.to_string()));
            }
        }

        Ok(scores)
    }
}

#[async_trait]
impl ScoreEvaluator for PerspectiveClient {
    async fn score(&self, text: &str) -> Result<AttributeScores, ClassifierError> {
        let url = format!("{}?key={}", self.api_url, self.api_key);

        let response = self
            .http_client
            .post(&url)
            .json(&Self::request_body(text))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(ClassifierError::Status(status.as_u16()));
        }

        let body: Value = response.json().await?;
        let scores = Self::parse_response(&body)?;
        debug!(attributes = scores.len(), "Scored message text");
        Ok(scores)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn analyze_response(pairs: &[(&str, f64)]) -> Value {
        let mut attribute_scores = serde_json::Map::new();
        for (name, value) in pairs {
            attribute_scores.insert(
                (*name).to_string(),
                json!({ "summaryScore": { "value": value, "type": "PROBABILITY" } }),
            );
        }
        json!({ "attributeScores": attribute_scores })
    }

    #[test]
    fn test_request_body_asks_for_all_attributes() {
        let body = PerspectiveClient::request_body("hello");
        assert_eq!(body["comment"]["text"], "hello");
        assert_eq!(body["doNotStore"], true);
        for name in attributes::REQUESTED {
            assert!(body["requestedAttributes"].get(name).is_some());
        }
    }

    #[test]
    fn test_parse_response_full() {
        let body = analyze_response(&[
            (attributes::SEVERE_TOXICITY, 0.1),
            (attributes::PROFANITY, 0.2),
            (attributes::IDENTITY_ATTACK, 0.3),
            (attributes::THREAT, 0.4),
            (attributes::TOXICITY, 0.5),
            (attributes::FLIRTATION, 0.6),
        ]);

        let scores = PerspectiveClient::parse_response(&body).unwrap();
        assert_eq!(scores.get(attributes::TOXICITY), Some(0.5));
        assert_eq!(scores.get(attributes::FLIRTATION), Some(0.6));
    }

    #[test]
    fn test_parse_response_keeps_extra_attributes() {
        let body = analyze_response(&[
            (attributes::SEVERE_TOXICITY, 0.1),
            (attributes::PROFANITY, 0.2),
            (attributes::IDENTITY_ATTACK, 0.3),
            (attributes::THREAT, 0.4),
            (attributes::TOXICITY, 0.5),
            (attributes::FLIRTATION, 0.6),
            ("INSULT", 0.7),
        ]);

        let scores = PerspectiveClient::parse_response(&body).unwrap();
        assert_eq!(scores.get("INSULT"), Some(0.7));
        assert_eq!(scores.len(), 7);
    }

    #[test]
    fn test_parse_response_missing_requested_attribute() {
        let body = analyze_response(&[
            (attributes::SEVERE_TOXICITY, 0.1),
            (attributes::PROFANITY, 0.2),
            (attributes::IDENTITY_ATTACK, 0.3),
            (attributes::THREAT, 0.4),
            (attributes::TOXICITY, 0.5),
            // FLIRTATION absent
        ]);

        match PerspectiveClient::parse_response(&body) {
            Err(ClassifierError::MissingAttribute(name)) => {
                assert_eq!(name, attributes::FLIRTATION);
            }
            other => panic!("Expected MissingAttribute, got {other:?}"),
        }
    }

    #[test]
    fn test_parse_response_malformed() {
        let body = json!({ "unexpected": true });
        match PerspectiveClient::parse_response(&body) {
            Err(ClassifierError::MalformedResponse(_)) => {}
            other => panic!("Expected MalformedResponse, got {other:?}"),
        }
    }
}
