//! Conversion between relay requests and the Gemini format

use super::types::{GeminiErrorEnvelope, GeminiGenerationConfig, GeminiRequest};
use crate::protocol::{Content, GenerationRequest};
use crate::providers::BackendError;
use reqwest::StatusCode;

/// Convert a validated request to the Gemini body
pub fn to_gemini_request(request: &GenerationRequest) -> GeminiRequest {
    GeminiRequest {
        contents: request.contents.to_turns(),
        system_instruction: Some(Content::untagged(request.system_instruction.clone())),
        generation_config: Some(GeminiGenerationConfig {
            temperature: Some(request.temperature),
        }),
    }
}

/// Map a non-success response to a `BackendError`.
///
/// Uses the message from the Gemini error envelope when the body carries
/// one, otherwise the raw body (or the status reason when the body is empty).
pub fn error_from_response(status: StatusCode, body: &str) -> BackendError {
    let message = serde_json::from_str::<GeminiErrorEnvelope>(body)
        .map(|envelope| envelope.error.message)
        .ok()
        .filter(|message| !message.is_empty())
        .or_else(|| Some(body.trim().to_string()).filter(|b| !b.is_empty()))
        .unwrap_or_else(|| {
            status
                .canonical_reason()
                .unwrap_or("Unknown error")
                .to_string()
        });

    BackendError::Api {
        status: status.as_u16(),
        message,
    }
}
