//! Fixed values of the relay contract
//!
//! Everything a caller or the backend can observe without configuring it
//! lives here, so the wire contract can be audited in one place.

/// Persona used when the caller does not supply a system instruction
pub const DEFAULT_SYSTEM_INSTRUCTION: &str =
    "你是一个高效的助理，能分布思考解决用户的问题，你一般都用中文回答内容";

/// Sampling temperature used when the caller omits one
pub const DEFAULT_TEMPERATURE: f64 = 1.0;

/// Inclusive temperature bounds accepted from callers
pub const MIN_TEMPERATURE: f64 = 0.0;
pub const MAX_TEMPERATURE: f64 = 2.0;

/// Streaming is on unless the caller opts out
pub const DEFAULT_STREAMING: bool = true;

/// Backend model identifier
pub const DEFAULT_MODEL: &str = "gemini-2.0-flash";

/// Generative Language REST endpoint
pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Caller-facing assistant role and its canonical backend label
pub const CALLER_ASSISTANT_ROLE: &str = "assistant";
pub const CANONICAL_MODEL_ROLE: &str = "model";

/// Role given to free-text input when it is sent to the backend
pub const DEFAULT_USER_ROLE: &str = "user";

/// Event tag carried by every protocol packet
pub const PACKET_EVENT: &str = "message";

/// Prefix of packet identifiers (`chunk_1`, `chunk_2`, ...)
pub const PACKET_ID_PREFIX: &str = "chunk_";

/// Prefix of stream identifiers
pub const STREAM_ID_PREFIX: &str = "stream_";

/// Protocol mode codes; 0 is the only supported mode
pub const CONTEXT_MODE: u8 = 0;
pub const OUTPUT_MODE: u8 = 0;
pub const RETURN_TYPE: u8 = 0;
pub const CONTENT_TYPE: u8 = 0;

/// Generic message returned when the backend or the relay itself fails
pub const INTERNAL_ERROR_MESSAGE: &str = "Internal server error";

/// Content type advertised for streamed packet responses
pub const STREAM_CONTENT_TYPE: &str = "text/event-stream";

/// Default listener settings
pub const DEFAULT_HOST: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 8000;
pub const DEFAULT_ROUTE: &str = "/chat";

/// Default backend timeouts in milliseconds
pub const DEFAULT_CONNECT_TIMEOUT_MS: u64 = 10_000;
pub const DEFAULT_REQUEST_TIMEOUT_MS: u64 = 120_000;

/// Schema version understood by the config loader
pub const CONFIG_VERSION: &str = "0.1";
