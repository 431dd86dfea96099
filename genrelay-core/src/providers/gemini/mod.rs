//! Gemini backend implementation
//!
//! Adapter for the Generative Language REST API, translating between the
//! relay's `GenerationRequest` and Gemini's `generateContent` format.

mod client;
pub mod converter;
mod streaming;
pub mod types;

pub use client::GeminiBackend;
pub use streaming::parse_stream;
pub use types::{GeminiRequest, GeminiResponse};
