//! HTTP front end for the relay
//!
//! Exposes the core `Relay` over axum: POST on the chat route runs a request
//! end to end and answers with JSON or a stream of NDJSON packets.

pub mod logging;
pub mod routes;

pub use logging::init_logging;
pub use routes::{build_router, HEALTH_ROUTE};
