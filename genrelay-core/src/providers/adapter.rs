//! Backend adapter trait
//!
//! The relay talks to exactly one generative-language backend through this
//! seam. Production code uses the Gemini REST client; tests plug in scripted
//! fakes.

use super::error::BackendResult;
use crate::protocol::GenerationRequest;
use async_trait::async_trait;
use futures::stream::BoxStream;

/// Lazily produced text fragments, in emission order.
///
/// The stream ends when the backend closes it; a failure part-way through is
/// yielded as an `Err` item and nothing follows it.
pub type FragmentStream = BoxStream<'static, BackendResult<String>>;

/// Core backend trait
#[async_trait]
pub trait Backend: Send + Sync {
    /// Backend name used in logs
    fn name(&self) -> &str;

    /// Single round trip returning the complete generated text
    async fn generate_once(&self, request: &GenerationRequest) -> BackendResult<String>;

    /// Open a fragment stream for the request
    async fn generate_stream(&self, request: &GenerationRequest) -> BackendResult<FragmentStream>;
}
