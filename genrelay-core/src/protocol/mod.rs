//! Protocol module for relay request/response structures
//!
//! Defines the inbound request body, the normalized request handed to a
//! backend, and the two outbound shapes: a JSON document for single-shot
//! responses and protocol packets for streamed ones.

pub mod types;

pub use types::{
    canonical_role, ChatMessage, Content, Contents, GenerationRequest, PacketData, Part,
    ProtocolPacket, RawRequest, ResponseBody,
};
