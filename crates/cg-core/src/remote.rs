//! Hosted vision API classifier backend.
//!
//! Forwards the image to a remote vision/chat endpoint and maps the text
//! reply back onto the label set. Responses go through typed structs and a
//! typed [`ApiError`]; there is no schema-less key probing, so callers cannot
//! forget to handle the failure path.
//!
//! No retry or batching: a failed request surfaces immediately and the caller
//! decides what to do.

use crate::classifier::{ClassifierBackend, Prediction};
use crate::error::EstimateError;
use crate::label::Label;
use anyhow::Context;
use base64::Engine;
use image::DynamicImage;
use serde::Deserialize;
use std::str::FromStr;

/// Environment variable holding the API key. Never read from the config
/// file.
pub const API_KEY_ENV: &str = "CG_API_KEY";

/// Confidence reported when the reply names a label directly.
const MATCH_CONFIDENCE: f32 = 0.9;

/// Confidence reported when no label can be extracted from the reply.
const FALLBACK_CONFIDENCE: f32 = 0.25;

/// Non-2xx response from the vision API.
#[derive(Debug, thiserror::Error)]
#[error("vision API returned status {status}: {body}")]
pub struct ApiError {
    pub status: u16,
    pub body: String,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    content: String,
}

/// Classifier backed by a hosted vision/chat API.
pub struct RemoteClassifier {
    endpoint: String,
    model: String,
    api_key: String,
}

impl RemoteClassifier {
    /// Build a client for the given endpoint and hosted model name.
    ///
    /// The API key is taken from [`API_KEY_ENV`]; a missing key is
    /// [`EstimateError::ModelUnavailable`] so the problem surfaces before any
    /// request is made.
    pub fn new(endpoint: &str, model: &str) -> Result<Self, EstimateError> {
        let api_key = std::env::var(API_KEY_ENV).map_err(|_| {
            EstimateError::model_unavailable(format!("{API_KEY_ENV} environment variable not set"))
        })?;

        Ok(Self {
            endpoint: endpoint.to_string(),
            model: model.to_string(),
            api_key,
        })
    }

    fn request_description(&self, image: &DynamicImage) -> Result<String, EstimateError> {
        let mut jpeg = Vec::new();
        image
            .write_to(&mut std::io::Cursor::new(&mut jpeg), image::ImageFormat::Jpeg)
            .map_err(|e| {
                EstimateError::Inference(
                    anyhow::Error::new(e).context("failed to encode image for upload"),
                )
            })?;
        let encoded = base64::engine::general_purpose::STANDARD.encode(&jpeg);

        let payload = serde_json::json!({
            "model": self.model,
            "messages": [{
                "role": "user",
                "content": [
                    {
                        "type": "text",
                        "text": "What drink is in this photo? Answer with one of: \
                                 coffee, cola, chocolate, green_tea, energy, non_caffeine."
                    },
                    {
                        "type": "image_url",
                        "image_url": { "url": format!("data:image/jpeg;base64,{encoded}") }
                    }
                ]
            }]
        });

        let response = ureq::post(&self.endpoint)
            .set("Authorization", &format!("Bearer {}", self.api_key))
            .send_json(payload);

        let body = match response {
            Ok(resp) => resp
                .into_string()
                .context("failed to read vision API response body")
                .map_err(EstimateError::Inference)?,
            Err(ureq::Error::Status(status, resp)) => {
                let body = resp.into_string().unwrap_or_default();
                return Err(EstimateError::Inference(ApiError { status, body }.into()));
            }
            Err(e) => {
                return Err(EstimateError::Inference(
                    anyhow::Error::new(e).context("vision API request failed"),
                ))
            }
        };

        extract_reply(&body).map_err(EstimateError::Inference)
    }
}

impl ClassifierBackend for RemoteClassifier {
    fn classify(&self, image: &DynamicImage) -> Result<Prediction, EstimateError> {
        let reply = self.request_description(image)?;
        tracing::debug!(reply = %reply, "vision API reply");
        Ok(prediction_from_reply(&reply))
    }

    fn name(&self) -> &'static str {
        "remote"
    }

    // A real request costs money; remote warmup is key validation only,
    // which already happened in the constructor.
    fn warmup(&self) -> Result<(), EstimateError> {
        Ok(())
    }
}

/// Pull the assistant text out of a chat-completions response body.
fn extract_reply(body: &str) -> anyhow::Result<String> {
    let parsed: ChatResponse =
        serde_json::from_str(body).context("vision API response did not match expected schema")?;
    let choice = parsed
        .choices
        .into_iter()
        .next()
        .context("vision API response contained no choices")?;
    Ok(choice.message.content)
}

/// Keywords scanned in reply text, longest first: "chocolate" contains
/// "cola" as a substring, so shorter keywords must come last. Includes the
/// natural English spellings alongside the label names.
const REPLY_KEYWORDS: &[(&str, Label)] = &[
    ("non_caffeine", Label::NonCaffeine),
    ("energy drink", Label::Energy),
    ("green_tea", Label::GreenTea),
    ("green tea", Label::GreenTea),
    ("chocolate", Label::Chocolate),
    ("coffee", Label::Coffee),
    ("energy", Label::Energy),
    ("cola", Label::Cola),
];

/// Map a free-text reply onto the label set.
///
/// The first label whose name appears in the reply wins; an unrecognized
/// reply falls back to `non_caffeine` at low confidence so the pipeline still
/// returns a best-effort answer.
fn prediction_from_reply(reply: &str) -> Prediction {
    let trimmed = reply.trim();
    if let Ok(label) = Label::from_str(trimmed) {
        return Prediction {
            label,
            confidence: MATCH_CONFIDENCE,
        };
    }

    let lowered = trimmed.to_lowercase();
    for &(keyword, label) in REPLY_KEYWORDS {
        if lowered.contains(keyword) {
            return Prediction {
                label,
                confidence: MATCH_CONFIDENCE,
            };
        }
    }

    Prediction {
        label: Label::NonCaffeine,
        confidence: FALLBACK_CONFIDENCE,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_reply_from_valid_response() {
        let body = r#"{"choices":[{"message":{"role":"assistant","content":"coffee"}}]}"#;
        assert_eq!(extract_reply(body).unwrap(), "coffee");
    }

    #[test]
    fn test_extract_reply_rejects_missing_choices() {
        let body = r#"{"error":{"message":"invalid key"}}"#;
        assert!(extract_reply(body).is_err());
    }

    #[test]
    fn test_extract_reply_rejects_empty_choices() {
        let body = r#"{"choices":[]}"#;
        assert!(extract_reply(body).is_err());
    }

    #[test]
    fn test_prediction_from_exact_reply() {
        let pred = prediction_from_reply("green_tea");
        assert_eq!(pred.label, Label::GreenTea);
        assert_eq!(pred.confidence, MATCH_CONFIDENCE);
    }

    #[test]
    fn test_prediction_from_sentence_reply() {
        let pred = prediction_from_reply("This looks like a cup of coffee with milk.");
        assert_eq!(pred.label, Label::Coffee);
    }

    #[test]
    fn test_prediction_from_spaced_reply() {
        let pred = prediction_from_reply("That is a glass of iced green tea.");
        assert_eq!(pred.label, Label::GreenTea);
        assert_eq!(pred.confidence, MATCH_CONFIDENCE);

        let pred = prediction_from_reply("Looks like an energy drink can.");
        assert_eq!(pred.label, Label::Energy);
    }

    #[test]
    fn test_chocolate_reply_not_shadowed_by_cola() {
        let pred = prediction_from_reply("A mug of hot chocolate, I think.");
        assert_eq!(pred.label, Label::Chocolate);
    }

    #[test]
    fn test_prediction_fallback_on_unrecognized_reply() {
        let pred = prediction_from_reply("I cannot tell what this is.");
        assert_eq!(pred.label, Label::NonCaffeine);
        assert_eq!(pred.confidence, FALLBACK_CONFIDENCE);
    }

    #[test]
    fn test_api_error_display() {
        let err = ApiError {
            status: 401,
            body: "unauthorized".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "vision API returned status 401: unauthorized"
        );
    }
}
