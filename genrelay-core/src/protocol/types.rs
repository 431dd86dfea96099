//! Core protocol types for the relay
//!
//! This module contains the data structures exchanged with callers and handed
//! to the backend:
//! - `RawRequest`, the loosely-typed inbound body
//! - `GenerationRequest`, the validated unit passed to a backend
//! - `ProtocolPacket`, the wire unit of a streamed response
//! - `ResponseBody`, the JSON document of a non-streamed response

use crate::config::defaults;
use crate::config::SecretString;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Inbound request body as sent by callers.
///
/// Fields whose shape varies between callers are kept as raw JSON so the
/// normalizer can report shape problems with a precise error instead of a
/// generic parse failure.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RawRequest {
    /// Free text or a list of `{role, content}` objects
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub input: Option<Value>,

    /// Alternate name for the list form of `input`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message_list: Option<Value>,

    /// Backend credential
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub apikey: Option<Value>,

    /// Persona override
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub system_instruction: Option<String>,

    /// Sampling temperature in [0, 2]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temperature: Option<Value>,

    /// Streamed packets (default) or a single JSON document
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub streaming: Option<bool>,
}

/// A single caller-side chat turn
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    role: String,
    content: String,
}

impl ChatMessage {
    pub fn new(role: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            role: role.into(),
            content: content.into(),
        }
    }

    /// Convert into the backend's canonical content block
    pub fn to_content(&self) -> Content {
        Content::text(canonical_role(&self.role), self.content.clone())
    }
}

/// Map a caller-facing role onto the backend vocabulary.
///
/// Only the exact string `"assistant"` is rewritten (to `"model"`); every
/// other role is returned unchanged.
pub fn canonical_role(role: &str) -> &str {
    if role == defaults::CALLER_ASSISTANT_ROLE {
        defaults::CANONICAL_MODEL_ROLE
    } else {
        role
    }
}

/// One text part of a content block
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Part {
    pub text: String,
}

/// Role-tagged content block in the backend's canonical form
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Content {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    pub parts: Vec<Part>,
}

impl Content {
    /// Content block holding a single text part
    pub fn text(role: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            role: Some(role.into()),
            parts: vec![Part { text: text.into() }],
        }
    }

    /// Role-less content block, as used for system instructions
    pub fn untagged(text: impl Into<String>) -> Self {
        Self {
            role: None,
            parts: vec![Part { text: text.into() }],
        }
    }
}

/// What the caller asked the model to continue
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Contents {
    /// Single free-text prompt
    Text(String),
    /// Ordered conversation, roles already canonical
    Turns(Vec<Content>),
}

impl Contents {
    /// Content blocks as the backend expects them; free text becomes a
    /// single user turn.
    pub fn to_turns(&self) -> Vec<Content> {
        match self {
            Contents::Text(text) => vec![Content::text(defaults::DEFAULT_USER_ROLE, text.clone())],
            Contents::Turns(turns) => turns.clone(),
        }
    }
}

/// Validated request handed to a backend
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationRequest {
    pub contents: Contents,
    pub system_instruction: String,
    pub temperature: f64,
    pub api_key: SecretString,
    pub streaming: bool,
}

/// Wire unit of a streamed response
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProtocolPacket {
    /// `chunk_<n>`, increasing by one per packet within a stream
    pub id: String,
    pub event: String,
    pub data: PacketData,
}

/// Payload of a protocol packet
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PacketData {
    pub is_last_message: bool,
    pub is_finished: bool,
    pub is_last_packet_in_message: bool,
    pub stream_id: String,
    pub context_mode: u8,
    pub output_mode: u8,
    pub return_type: u8,
    pub content_type: u8,
    pub content: String,
    pub ext: Map<String, Value>,
}

impl ProtocolPacket {
    /// Packet carrying one fragment of generated text
    pub fn fragment(sequence: u64, stream_id: &str, content: impl Into<String>) -> Self {
        Self::build(sequence, stream_id, content.into(), false)
    }

    /// The closing packet of a stream; carries no content
    pub fn terminal(sequence: u64, stream_id: &str) -> Self {
        Self::build(sequence, stream_id, String::new(), true)
    }

    fn build(sequence: u64, stream_id: &str, content: String, last: bool) -> Self {
        Self {
            id: format!("{}{}", defaults::PACKET_ID_PREFIX, sequence),
            event: defaults::PACKET_EVENT.to_string(),
            data: PacketData {
                is_last_message: last,
                is_finished: last,
                is_last_packet_in_message: last,
                stream_id: stream_id.to_string(),
                context_mode: defaults::CONTEXT_MODE,
                output_mode: defaults::OUTPUT_MODE,
                return_type: defaults::RETURN_TYPE,
                content_type: defaults::CONTENT_TYPE,
                content,
                ext: Map::new(),
            },
        }
    }

    /// True for the closing packet of a stream
    pub fn is_terminal(&self) -> bool {
        self.data.is_last_message && self.data.is_finished && self.data.is_last_packet_in_message
    }

    /// Serialize as one newline-terminated JSON line
    pub fn to_line(&self) -> serde_json::Result<String> {
        let mut line = serde_json::to_string(self)?;
        line.push('\n');
        Ok(line)
    }
}

/// JSON document returned for non-streamed outcomes
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResponseBody {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub response: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl ResponseBody {
    pub fn success(response: impl Into<String>) -> Self {
        Self {
            success: true,
            response: Some(response.into()),
            error: None,
            details: None,
        }
    }

    pub fn failure(error: impl Into<String>, details: Option<String>) -> Self {
        Self {
            success: false,
            response: None,
            error: Some(error.into()),
            details,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_canonical_role() {
        assert_eq!(canonical_role("assistant"), "model");
        assert_eq!(canonical_role("user"), "user");
        assert_eq!(canonical_role("Assistant"), "Assistant");
        assert_eq!(canonical_role("model"), "model");
    }

    #[test]
    fn test_message_to_content() {
        let content = ChatMessage::new("assistant", "Hello").to_content();
        assert_eq!(content.role.as_deref(), Some("model"));
        assert_eq!(content.parts[0].text, "Hello");
    }

    #[test]
    fn test_free_text_becomes_user_turn() {
        let turns = Contents::Text("hi".to_string()).to_turns();
        assert_eq!(turns, vec![Content::text("user", "hi")]);
    }

    #[test]
    fn test_fragment_packet_shape() {
        let packet = ProtocolPacket::fragment(1, "stream_abc", "Hi");
        let value = serde_json::to_value(&packet).unwrap();
        assert_eq!(
            value,
            json!({
                "id": "chunk_1",
                "event": "message",
                "data": {
                    "isLastMessage": false,
                    "isFinished": false,
                    "isLastPacketInMessage": false,
                    "streamId": "stream_abc",
                    "contextMode": 0,
                    "outputMode": 0,
                    "returnType": 0,
                    "contentType": 0,
                    "content": "Hi",
                    "ext": {}
                }
            })
        );
        assert!(!packet.is_terminal());
    }

    #[test]
    fn test_terminal_packet_shape() {
        let packet = ProtocolPacket::terminal(3, "stream_abc");
        assert_eq!(packet.id, "chunk_3");
        assert!(packet.is_terminal());
        assert!(packet.data.content.is_empty());
    }

    #[test]
    fn test_packet_line_is_single_json_line() {
        let line = ProtocolPacket::fragment(2, "s", "multi\nline").to_line().unwrap();
        assert!(line.ends_with('\n'));
        assert_eq!(line.matches('\n').count(), 1);
        let parsed: ProtocolPacket = serde_json::from_str(line.trim_end()).unwrap();
        assert_eq!(parsed.data.content, "multi\nline");
    }

    #[test]
    fn test_response_body_serialization() {
        let ok = serde_json::to_string(&ResponseBody::success("Hi there")).unwrap();
        assert_eq!(ok, r#"{"success":true,"response":"Hi there"}"#);

        let err = serde_json::to_string(&ResponseBody::failure("boom", None)).unwrap();
        assert_eq!(err, r#"{"success":false,"error":"boom"}"#);

        let detailed =
            serde_json::to_string(&ResponseBody::failure("boom", Some("why".into()))).unwrap();
        assert_eq!(detailed, r#"{"success":false,"error":"boom","details":"why"}"#);
    }

    #[test]
    fn test_raw_request_accepts_aliases() {
        let raw: RawRequest = serde_json::from_value(json!({
            "messageList": [{"role": "user", "content": "hi"}],
            "apikey": "k",
            "systemInstruction": "be brief",
            "temperature": 0.5,
            "streaming": false
        }))
        .unwrap();
        assert!(raw.message_list.is_some());
        assert!(raw.input.is_none());
        assert_eq!(raw.system_instruction.as_deref(), Some("be brief"));
        assert_eq!(raw.streaming, Some(false));
    }
}
