//! Gemini REST client implementation

use super::converter::{error_from_response, to_gemini_request};
use super::streaming::parse_stream;
use super::types::GeminiResponse;
use crate::config::BackendConfig;
use crate::protocol::GenerationRequest;
use crate::providers::{Backend, BackendError, BackendResult, FragmentStream};
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, CONTENT_TYPE};
use reqwest::{Client, ClientBuilder, Response};
use std::time::Duration;
use tracing::{debug, info, warn};

/// Default user agent
const USER_AGENT: &str = concat!("genrelay/", env!("CARGO_PKG_VERSION"));

/// Header carrying the caller's credential
const API_KEY_HEADER: &str = "x-goog-api-key";

/// Gemini backend talking to the Generative Language REST API
#[derive(Clone)]
pub struct GeminiBackend {
    config: BackendConfig,
    client: Client,
}

impl GeminiBackend {
    /// Create a new Gemini backend with pooled connections
    pub fn new(config: BackendConfig) -> BackendResult<Self> {
        let client = ClientBuilder::new()
            .pool_max_idle_per_host(10)
            .pool_idle_timeout(Duration::from_secs(90))
            .connect_timeout(config.connect_timeout())
            .read_timeout(config.request_timeout())
            .user_agent(USER_AGENT)
            .gzip(true)
            .build()
            .map_err(|e| BackendError::Configuration(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self { config, client })
    }

    pub fn model(&self) -> &str {
        &self.config.model
    }

    /// `{base_url}/models/{model}:{action}`
    fn endpoint(&self, action: &str) -> String {
        format!(
            "{}/models/{}:{}",
            self.config.base_url.trim_end_matches('/'),
            self.config.model,
            action
        )
    }

    /// Build request headers; the key is marked sensitive so it never shows
    /// up in reqwest's debug output.
    fn build_headers(&self, request: &GenerationRequest) -> BackendResult<HeaderMap> {
        let mut api_key = HeaderValue::from_str(request.api_key.expose_secret()).map_err(|_| {
            BackendError::Configuration("API key contains invalid header characters".to_string())
        })?;
        api_key.set_sensitive(true);

        let mut headers = HeaderMap::new();
        headers.insert(API_KEY_HEADER, api_key);
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        Ok(headers)
    }

    /// POST a generation request. `deadline` bounds the whole exchange, body included,
    /// so streams pass `None` and rely on the client's idle read timeout instead.
    async fn send(
        &self,
        url: &str,
        request: &GenerationRequest,
        deadline: Option<Duration>,
    ) -> BackendResult<Response> {
        let body = to_gemini_request(request);
        debug!(url = %url, turns = body.contents.len(), "Sending Gemini request");

        let mut builder = self
            .client
            .post(url)
            .headers(self.build_headers(request)?)
            .json(&body);
        if let Some(deadline) = deadline {
            builder = builder.timeout(deadline);
        }
        let response = builder.send().await?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response
            .text()
            .await
            .unwrap_or_else(|_| "Unknown error".to_string());
        let err = error_from_response(status, &body);
        warn!(status = status.as_u16(), "Gemini request failed: {}", err);
        Err(err)
    }
}

#[async_trait]
impl Backend for GeminiBackend {
    fn name(&self) -> &str {
        "gemini"
    }

    async fn generate_once(&self, request: &GenerationRequest) -> BackendResult<String> {
        let url = self.endpoint("generateContent");
        let response = self
            .send(&url, request, Some(self.config.request_timeout()))
            .await?;

        let text = response.text().await?;
        let parsed: GeminiResponse = serde_json::from_str(&text)?;

        if let Some(reason) = parsed
            .prompt_feedback
            .as_ref()
            .and_then(|feedback| feedback.block_reason.as_deref())
        {
            warn!(block_reason = reason, "Gemini blocked the prompt");
        }

        let generated = parsed.text();
        info!(model = %self.config.model, chars = generated.len(), "Gemini request completed");
        Ok(generated)
    }

    async fn generate_stream(&self, request: &GenerationRequest) -> BackendResult<FragmentStream> {
        let url = self.endpoint("streamGenerateContent?alt=sse");
        let response = self.send(&url, request, None).await?;

        info!(model = %self.config.model, "Gemini stream opened");
        Ok(parse_stream(response.bytes_stream()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoint_building() {
        let backend = GeminiBackend::new(BackendConfig {
            base_url: "http://localhost:1234/v1beta/".to_string(),
            ..Default::default()
        })
        .unwrap();

        assert_eq!(
            backend.endpoint("generateContent"),
            "http://localhost:1234/v1beta/models/gemini-2.0-flash:generateContent"
        );
        assert_eq!(backend.model(), "gemini-2.0-flash");
    }
}
