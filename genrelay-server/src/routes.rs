//! HTTP routes
//!
//! One chat route (POST only), a preflight answer for OPTIONS and a health
//! check. Every response carries permissive CORS headers.

use axum::body::Body;
use axum::extract::State;
use axum::http::{header, HeaderValue, StatusCode};
use axum::middleware::map_response;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use bytes::Bytes;
use futures::TryStreamExt;
use genrelay_core::config::defaults::STREAM_CONTENT_TYPE;
use genrelay_core::stream::encode_lines;
use genrelay_core::{GenerationOutcome, Relay};
use serde_json::json;
use tracing::{debug, warn};

/// Path of the liveness check
pub const HEALTH_ROUTE: &str = "/health";

const METHOD_NOT_ALLOWED_MESSAGE: &str = "Only POST method is allowed";

/// Build the application router serving the relay on `route`
pub fn build_router(relay: Relay, route: &str) -> Router {
    let chat = post(chat_handler)
        .options(preflight_handler)
        .fallback(method_not_allowed_handler);

    let router = Router::new().route(route, chat);
    let router = if route == HEALTH_ROUTE {
        router
    } else {
        router.route(HEALTH_ROUTE, get(health_handler))
    };

    router.layer(map_response(cors_headers)).with_state(relay)
}

async fn chat_handler(State(relay): State<Relay>, body: Bytes) -> Response {
    debug!(bytes = body.len(), "Chat request");
    outcome_response(relay.handle_json(&body).await)
}

/// Map an outcome to its HTTP shape: JSON for single-shot results and
/// failures, NDJSON packets for streams.
fn outcome_response(outcome: GenerationOutcome) -> Response {
    match outcome {
        GenerationOutcome::Packets(packets) => {
            let lines = encode_lines(packets)
                .inspect_err(|e| warn!("Aborting response stream: {}", e));

            (
                [
                    (header::CONTENT_TYPE, STREAM_CONTENT_TYPE),
                    (header::CACHE_CONTROL, "no-cache"),
                    (header::CONNECTION, "keep-alive"),
                ],
                Body::from_stream(lines),
            )
                .into_response()
        }
        other => {
            let status = if other.is_success() {
                StatusCode::OK
            } else {
                StatusCode::BAD_REQUEST
            };
            match other.body() {
                Some(body) => (status, Json(body)).into_response(),
                None => StatusCode::INTERNAL_SERVER_ERROR.into_response(),
            }
        }
    }
}

async fn preflight_handler() -> StatusCode {
    StatusCode::OK
}

async fn method_not_allowed_handler() -> Response {
    (
        StatusCode::METHOD_NOT_ALLOWED,
        Json(json!({ "error": METHOD_NOT_ALLOWED_MESSAGE })),
    )
        .into_response()
}

async fn health_handler() -> &'static str {
    "OK"
}

async fn cors_headers(mut response: Response) -> Response {
    let headers = response.headers_mut();
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_ORIGIN,
        HeaderValue::from_static("*"),
    );
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_METHODS,
        HeaderValue::from_static("GET, POST, OPTIONS"),
    );
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_HEADERS,
        HeaderValue::from_static("Content-Type"),
    );
    response
}
