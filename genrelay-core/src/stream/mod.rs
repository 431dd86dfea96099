//! Streaming translation from backend fragments to protocol packets

mod ndjson;
mod transcoder;

pub use ndjson::{encode_lines, LineStream};
pub use transcoder::{PacketStream, StreamTranscoder};
