//! Response assembly
//!
//! `Relay` drives one request through normalization, the backend call and,
//! for streamed requests, the transcoder. Whatever happens, the caller gets a
//! `GenerationOutcome`; faults never propagate past `Relay::handle`.

use crate::config::defaults::INTERNAL_ERROR_MESSAGE;
use crate::config::RequestDefaults;
use crate::normalize::{normalize, normalize_json, NormalizeError};
use crate::protocol::{GenerationRequest, RawRequest, ResponseBody};
use crate::providers::{Backend, BackendError};
use crate::stream::{PacketStream, StreamTranscoder};
use futures::FutureExt;
use serde::{Deserialize, Serialize};
use std::any::Any;
use std::fmt;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use tracing::{debug, error, info, info_span, warn, Instrument};
use uuid::Uuid;

/// Category of a failed request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorKind {
    MissingInput,
    MissingCredential,
    InvalidTemperature,
    InvalidMessageShape,
    MalformedBody,
    BackendError,
    InternalError,
}

/// Lifecycle of one request, logged as the `state` field on each transition
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestState {
    Received,
    Validating,
    Rejected,
    Validated,
    Invoking,
    Completed,
    BackendFailed,
    Streaming,
    StreamCompleted,
    StreamFailed,
}

impl RequestState {
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            Self::Rejected
                | Self::Completed
                | Self::BackendFailed
                | Self::StreamCompleted
                | Self::StreamFailed
        )
    }
}

/// Result of handling one request
pub enum GenerationOutcome {
    /// Complete text of a single-shot request
    Text(String),
    /// Live packets of a streamed request
    Packets(PacketStream),
    /// Request failed; `message` is safe to show to the caller
    Failure {
        kind: ErrorKind,
        message: String,
        details: Option<String>,
    },
}

impl GenerationOutcome {
    fn rejected(err: &NormalizeError) -> Self {
        Self::Failure {
            kind: err.kind(),
            message: err.message(),
            details: err.details(),
        }
    }

    fn backend_failure(err: &BackendError) -> Self {
        Self::Failure {
            kind: ErrorKind::BackendError,
            message: INTERNAL_ERROR_MESSAGE.to_string(),
            details: Some(err.to_string()),
        }
    }

    fn internal(details: String) -> Self {
        Self::Failure {
            kind: ErrorKind::InternalError,
            message: INTERNAL_ERROR_MESSAGE.to_string(),
            details: Some(details),
        }
    }

    pub fn is_success(&self) -> bool {
        !matches!(self, Self::Failure { .. })
    }

    pub fn failure_kind(&self) -> Option<ErrorKind> {
        match self {
            Self::Failure { kind, .. } => Some(*kind),
            _ => None,
        }
    }

    /// JSON document for single-shot outcomes; `None` for packet streams
    pub fn body(&self) -> Option<ResponseBody> {
        match self {
            Self::Text(text) => Some(ResponseBody::success(text.clone())),
            Self::Packets(_) => None,
            Self::Failure {
                message, details, ..
            } => Some(ResponseBody::failure(message.clone(), details.clone())),
        }
    }
}

impl fmt::Debug for GenerationOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text(text) => f.debug_tuple("Text").field(text).finish(),
            Self::Packets(_) => f.write_str("Packets(..)"),
            Self::Failure {
                kind,
                message,
                details,
            } => f
                .debug_struct("Failure")
                .field("kind", kind)
                .field("message", message)
                .field("details", details)
                .finish(),
        }
    }
}

/// Request pipeline bound to one backend
#[derive(Clone)]
pub struct Relay {
    backend: Arc<dyn Backend>,
    defaults: RequestDefaults,
}

impl Relay {
    pub fn new(backend: Arc<dyn Backend>, defaults: RequestDefaults) -> Self {
        Self { backend, defaults }
    }

    pub fn backend_name(&self) -> &str {
        self.backend.name()
    }

    /// Handle an already-parsed request body
    pub async fn handle(&self, raw: RawRequest) -> GenerationOutcome {
        let request_id = Uuid::new_v4();
        let span = info_span!("relay_request", %request_id, backend = self.backend.name());

        async {
            info!(state = ?RequestState::Received, "Request received");
            debug!(state = ?RequestState::Validating);
            self.dispatch(normalize(raw, &self.defaults)).await
        }
        .instrument(span)
        .await
    }

    /// Handle a raw JSON request body
    pub async fn handle_json(&self, body: &[u8]) -> GenerationOutcome {
        let request_id = Uuid::new_v4();
        let span = info_span!("relay_request", %request_id, backend = self.backend.name());

        async {
            info!(state = ?RequestState::Received, bytes = body.len(), "Request received");
            debug!(state = ?RequestState::Validating);
            self.dispatch(normalize_json(body, &self.defaults)).await
        }
        .instrument(span)
        .await
    }

    async fn dispatch(
        &self,
        normalized: Result<GenerationRequest, NormalizeError>,
    ) -> GenerationOutcome {
        let request = match normalized {
            Ok(request) => request,
            Err(err) => {
                info!(state = ?RequestState::Rejected, kind = ?err.kind(), "{}", err);
                return GenerationOutcome::rejected(&err);
            }
        };

        info!(
            state = ?RequestState::Validated,
            streaming = request.streaming,
            temperature = request.temperature,
            "Request validated"
        );

        match AssertUnwindSafe(self.invoke(&request)).catch_unwind().await {
            Ok(outcome) => outcome,
            Err(panic) => {
                let details = panic_message(panic.as_ref());
                error!("Backend call panicked: {}", details);
                GenerationOutcome::internal(details)
            }
        }
    }

    async fn invoke(&self, request: &GenerationRequest) -> GenerationOutcome {
        info!(state = ?RequestState::Invoking, "Invoking backend");

        if request.streaming {
            match self.backend.generate_stream(request).await {
                Ok(fragments) => {
                    let transcoder = StreamTranscoder::new();
                    info!(
                        state = ?RequestState::Streaming,
                        stream_id = transcoder.stream_id(),
                        "Streaming response"
                    );
                    GenerationOutcome::Packets(transcoder.transcode(fragments))
                }
                Err(err) => {
                    warn!(state = ?RequestState::StreamFailed, "Failed to open stream: {}", err);
                    GenerationOutcome::backend_failure(&err)
                }
            }
        } else {
            match self.backend.generate_once(request).await {
                Ok(text) => {
                    info!(state = ?RequestState::Completed, chars = text.len(), "Request completed");
                    GenerationOutcome::Text(text)
                }
                Err(err) => {
                    warn!(state = ?RequestState::BackendFailed, "Backend call failed: {}", err);
                    GenerationOutcome::backend_failure(&err)
                }
            }
        }
    }
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(message) = panic.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = panic.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic".to_string()
    }
}
