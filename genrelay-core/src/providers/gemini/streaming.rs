//! Streaming support for Gemini responses

use super::types::{GeminiErrorEnvelope, GeminiResponse};
use crate::providers::{BackendError, FragmentStream};
use bytes::Bytes;
use eventsource_stream::Eventsource;
use futures::{Stream, StreamExt};
use std::fmt::Display;

/// Parse the Server-Sent Events body of `streamGenerateContent?alt=sse`.
///
/// Every `data:` line holds a complete `GeminiResponse`; its text becomes one
/// fragment. The first error ends the stream.
pub fn parse_stream<S, E>(stream: S) -> FragmentStream
where
    S: Stream<Item = Result<Bytes, E>> + Send + 'static,
    E: Display + Send + 'static,
{
    let mut events = Box::pin(stream.eventsource());

    Box::pin(async_stream::stream! {
        while let Some(result) = events.next().await {
            let event = match result {
                Ok(event) => event,
                Err(e) => {
                    tracing::warn!("Gemini stream transport error: {}", e);
                    yield Err(BackendError::Stream(e.to_string()));
                    return;
                }
            };

            if event.data.trim().is_empty() {
                continue;
            }

            match parse_event(&event.data) {
                Ok(fragment) => {
                    tracing::trace!(bytes = fragment.len(), "Gemini fragment");
                    yield Ok(fragment);
                }
                Err(e) => {
                    tracing::warn!("Failed to parse Gemini stream event: {}", e);
                    yield Err(e);
                    return;
                }
            }
        }
    })
}

/// Decode one event payload into its text fragment
fn parse_event(data: &str) -> Result<String, BackendError> {
    if let Ok(envelope) = serde_json::from_str::<GeminiErrorEnvelope>(data) {
        return Err(BackendError::Api {
            status: envelope.error.code.unwrap_or(500),
            message: envelope.error.message,
        });
    }

    let response: GeminiResponse = serde_json::from_str(data)?;
    Ok(response.text())
}
