//! Fragment-to-packet transcoding
//!
//! Contract:
//! - one packet per non-empty fragment, ids `chunk_1`, `chunk_2`, ...
//! - empty fragments produce nothing
//! - a normally closed source is followed by exactly one terminal packet
//!   carrying the next id and no content
//! - a failing source yields its error and ends the stream; no terminal
//!   packet is emitted after an error
//!
//! The output is pull-driven: the source is polled only when the consumer
//! asks for the next packet, and dropping the output drops the source.

use crate::assembler::RequestState;
use crate::config::defaults;
use crate::protocol::ProtocolPacket;
use crate::providers::{BackendResult, FragmentStream};
use futures::stream::BoxStream;
use futures::StreamExt;
use tracing::{debug, info, warn};
use uuid::Uuid;

/// Lazily produced protocol packets
pub type PacketStream = BoxStream<'static, BackendResult<ProtocolPacket>>;

/// Owns the identity of one packet stream
#[derive(Debug, Clone)]
pub struct StreamTranscoder {
    stream_id: String,
}

impl Default for StreamTranscoder {
    fn default() -> Self {
        Self::new()
    }
}

impl StreamTranscoder {
    /// Transcoder with a freshly generated stream id
    pub fn new() -> Self {
        Self {
            stream_id: format!("{}{}", defaults::STREAM_ID_PREFIX, Uuid::new_v4().simple()),
        }
    }

    /// Transcoder with a caller-chosen stream id
    pub fn with_stream_id(stream_id: impl Into<String>) -> Self {
        Self {
            stream_id: stream_id.into(),
        }
    }

    pub fn stream_id(&self) -> &str {
        &self.stream_id
    }

    /// Wrap a fragment stream into a packet stream
    pub fn transcode(self, fragments: FragmentStream) -> PacketStream {
        let stream_id = self.stream_id;

        Box::pin(async_stream::stream! {
            let mut fragments = fragments;
            let mut sequence: u64 = 1;

            while let Some(item) = fragments.next().await {
                match item {
                    Ok(fragment) if fragment.is_empty() => {
                        debug!(stream_id = %stream_id, "Skipping empty fragment");
                    }
                    Ok(fragment) => {
                        yield Ok(ProtocolPacket::fragment(sequence, &stream_id, fragment));
                        sequence += 1;
                    }
                    Err(e) => {
                        warn!(
                            state = ?RequestState::StreamFailed,
                            stream_id = %stream_id,
                            packets = sequence - 1,
                            "Stream failed: {}", e
                        );
                        yield Err(e);
                        return;
                    }
                }
            }

            info!(
                state = ?RequestState::StreamCompleted,
                stream_id = %stream_id,
                packets = sequence,
                "Stream completed"
            );
            yield Ok(ProtocolPacket::terminal(sequence, &stream_id));
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::providers::BackendError;
    use futures::stream;

    fn fragments(items: Vec<BackendResult<&'static str>>) -> FragmentStream {
        Box::pin(stream::iter(
            items.into_iter().map(|item| item.map(str::to_string)),
        ))
    }

    #[tokio::test]
    async fn test_packets_and_terminal() {
        let packets: Vec<_> = StreamTranscoder::with_stream_id("s1")
            .transcode(fragments(vec![Ok("Hi"), Ok(" there")]))
            .collect()
            .await;

        let packets: Vec<ProtocolPacket> = packets.into_iter().map(Result::unwrap).collect();
        assert_eq!(packets.len(), 3);
        assert_eq!(packets[0], ProtocolPacket::fragment(1, "s1", "Hi"));
        assert_eq!(packets[1], ProtocolPacket::fragment(2, "s1", " there"));
        assert_eq!(packets[2], ProtocolPacket::terminal(3, "s1"));
    }

    #[tokio::test]
    async fn test_empty_source_yields_only_terminal() {
        let packets: Vec<_> = StreamTranscoder::with_stream_id("s2")
            .transcode(fragments(vec![]))
            .collect()
            .await;

        assert_eq!(packets, vec![Ok(ProtocolPacket::terminal(1, "s2"))]);
    }

    #[tokio::test]
    async fn test_error_stops_without_terminal() {
        let packets: Vec<_> = StreamTranscoder::with_stream_id("s3")
            .transcode(fragments(vec![
                Ok("a"),
                Err(BackendError::Stream("reset".to_string())),
                Ok("never"),
            ]))
            .collect()
            .await;

        assert_eq!(packets.len(), 2);
        assert_eq!(packets[0], Ok(ProtocolPacket::fragment(1, "s3", "a")));
        assert_eq!(packets[1], Err(BackendError::Stream("reset".to_string())));
    }

    #[test]
    fn test_stream_ids_are_unique() {
        let a = StreamTranscoder::new();
        let b = StreamTranscoder::new();
        assert_ne!(a.stream_id(), b.stream_id());
        assert!(a.stream_id().starts_with("stream_"));
    }
}
