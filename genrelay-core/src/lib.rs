//! Genrelay Core Library
//!
//! Request normalization and streaming translation for a chat-style relay in
//! front of a generative-language backend:
//! - [`normalize`] validates caller input and produces a [`GenerationRequest`]
//! - [`providers`] defines the [`Backend`] seam and the Gemini implementation
//! - [`stream`] turns backend fragments into protocol packets
//! - [`assembler`] drives a request end to end and yields a [`GenerationOutcome`]

pub mod assembler;
pub mod config;
pub mod normalize;
pub mod protocol;
pub mod providers;
pub mod stream;

pub use assembler::{ErrorKind, GenerationOutcome, Relay, RequestState};
pub use config::RelayConfig;
pub use normalize::NormalizeError;
pub use protocol::{GenerationRequest, ProtocolPacket, RawRequest, ResponseBody};
pub use providers::{Backend, BackendError, BackendResult, FragmentStream, GeminiBackend};
pub use stream::{PacketStream, StreamTranscoder};

/// Returns the version of the Genrelay Core library.
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
