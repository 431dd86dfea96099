//! Input normalization
//!
//! Turns a caller's `RawRequest` into a `GenerationRequest` or rejects it
//! before any backend is contacted. Checks run in a fixed order (input,
//! credential, temperature, message shape) so a request with several
//! problems always reports the same one.

use crate::assembler::ErrorKind;
use crate::config::defaults;
use crate::config::{RequestDefaults, SecretString};
use crate::protocol::{ChatMessage, Contents, GenerationRequest, RawRequest};
use serde_json::Value;
use thiserror::Error;

/// Reasons a request is rejected during normalization
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NormalizeError {
    #[error("Missing required parameter: input or messageList")]
    MissingInput,

    #[error("Missing required parameter: apikey")]
    MissingCredential,

    #[error("Temperature must be between 0 and 2")]
    InvalidTemperature,

    #[error("Invalid message list: {0}")]
    InvalidMessageShape(String),

    #[error("Failed to parse request: {0}")]
    MalformedBody(String),
}

impl NormalizeError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::MissingInput => ErrorKind::MissingInput,
            Self::MissingCredential => ErrorKind::MissingCredential,
            Self::InvalidTemperature => ErrorKind::InvalidTemperature,
            Self::InvalidMessageShape(_) => ErrorKind::InvalidMessageShape,
            Self::MalformedBody(_) => ErrorKind::MalformedBody,
        }
    }

    /// Top-level message reported to the caller
    pub fn message(&self) -> String {
        match self {
            Self::MalformedBody(_) => "Failed to parse request".to_string(),
            other => other.to_string(),
        }
    }

    /// Diagnostic detail reported next to the message, if any
    pub fn details(&self) -> Option<String> {
        match self {
            Self::MalformedBody(detail) => Some(detail.clone()),
            _ => None,
        }
    }
}

/// Where the prompt came from
enum InputSource<'a> {
    Text(&'a str),
    List(&'a [Value]),
    /// `messageList` was given but is not a list
    NotAList,
}

/// Validate and canonicalize a parsed request body
pub fn normalize(
    raw: RawRequest,
    request_defaults: &RequestDefaults,
) -> Result<GenerationRequest, NormalizeError> {
    let source = select_input(&raw)?;
    let api_key = credential(&raw)?;
    let temperature = temperature(&raw, request_defaults)?;

    let contents = match source {
        InputSource::Text(text) => Contents::Text(text.to_string()),
        InputSource::List(items) => {
            let messages = parse_messages(items)?;
            Contents::Turns(messages.iter().map(ChatMessage::to_content).collect())
        }
        InputSource::NotAList => {
            return Err(NormalizeError::InvalidMessageShape(
                "messageList must be a list of {role, content} objects".to_string(),
            ))
        }
    };

    let system_instruction = match raw.system_instruction {
        Some(instruction) if !instruction.is_empty() => instruction,
        _ => request_defaults.system_instruction.clone(),
    };

    Ok(GenerationRequest {
        contents,
        system_instruction,
        temperature,
        api_key,
        streaming: raw.streaming.unwrap_or(defaults::DEFAULT_STREAMING),
    })
}

/// Parse a JSON body and normalize it
pub fn normalize_json(
    body: &[u8],
    request_defaults: &RequestDefaults,
) -> Result<GenerationRequest, NormalizeError> {
    let raw: RawRequest = serde_json::from_slice(body)
        .map_err(|e| NormalizeError::MalformedBody(e.to_string()))?;
    normalize(raw, request_defaults)
}

/// `messageList` wins over `input` when it holds at least one element. A
/// `messageList` that is not a list gives way to a usable `input`; without one
/// it is reported as a shape error once the earlier checks have passed.
fn select_input(raw: &RawRequest) -> Result<InputSource<'_>, NormalizeError> {
    let list_present = match raw.message_list.as_ref() {
        Some(Value::Array(items)) if !items.is_empty() => return Ok(InputSource::List(items)),
        None | Some(Value::Null) | Some(Value::Array(_)) => false,
        Some(_) => true,
    };
    let no_input = || {
        if list_present {
            Ok(InputSource::NotAList)
        } else {
            Err(NormalizeError::MissingInput)
        }
    };

    match raw.input.as_ref() {
        None | Some(Value::Null) => no_input(),
        Some(Value::String(text)) if text.is_empty() => no_input(),
        Some(Value::String(text)) => Ok(InputSource::Text(text)),
        Some(Value::Array(items)) if items.is_empty() => no_input(),
        Some(Value::Array(items)) => Ok(InputSource::List(items)),
        Some(_) => Err(NormalizeError::MalformedBody(
            "input must be a string or a list of messages".to_string(),
        )),
    }
}

fn credential(raw: &RawRequest) -> Result<SecretString, NormalizeError> {
    match raw.apikey.as_ref() {
        Some(Value::String(key)) if !key.is_empty() => Ok(SecretString::new(key.clone())),
        _ => Err(NormalizeError::MissingCredential),
    }
}

fn temperature(raw: &RawRequest, request_defaults: &RequestDefaults) -> Result<f64, NormalizeError> {
    match raw.temperature.as_ref() {
        None | Some(Value::Null) => Ok(request_defaults.temperature),
        Some(Value::Number(number)) => match number.as_f64() {
            Some(value)
                if (defaults::MIN_TEMPERATURE..=defaults::MAX_TEMPERATURE).contains(&value) =>
            {
                Ok(value)
            }
            _ => Err(NormalizeError::InvalidTemperature),
        },
        Some(_) => Err(NormalizeError::InvalidTemperature),
    }
}

/// Every element must carry a non-empty `role` and `content`; one bad
/// element rejects the whole list.
fn parse_messages(items: &[Value]) -> Result<Vec<ChatMessage>, NormalizeError> {
    items
        .iter()
        .enumerate()
        .map(|(index, item)| {
            let object = item.as_object().ok_or_else(|| {
                NormalizeError::InvalidMessageShape(format!("message {} is not an object", index))
            })?;

            let role = non_empty_str(object.get("role")).ok_or_else(|| {
                NormalizeError::InvalidMessageShape(format!(
                    "message {} must have a non-empty role",
                    index
                ))
            })?;

            let content = non_empty_str(object.get("content")).ok_or_else(|| {
                NormalizeError::InvalidMessageShape(format!(
                    "message {} must have a non-empty content",
                    index
                ))
            })?;

            Ok(ChatMessage::new(role, content))
        })
        .collect()
}

fn non_empty_str(value: Option<&Value>) -> Option<&str> {
    value.and_then(Value::as_str).filter(|s| !s.is_empty())
}
