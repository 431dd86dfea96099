//! Newline-delimited JSON framing of packet streams

use super::transcoder::PacketStream;
use crate::providers::BackendError;
use bytes::Bytes;
use futures::stream::BoxStream;
use futures::StreamExt;

/// Framed packet bytes, one JSON document per line
pub type LineStream = BoxStream<'static, Result<Bytes, BackendError>>;

/// Frame each packet as a single `\n`-terminated JSON line.
///
/// Errors pass through unchanged so the transport can abort the body.
pub fn encode_lines(packets: PacketStream) -> LineStream {
    Box::pin(packets.map(|packet| {
        let packet = packet?;
        packet
            .to_line()
            .map(Bytes::from)
            .map_err(|e| BackendError::Stream(format!("Failed to encode packet {}: {}", packet.id, e)))
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::ProtocolPacket;
    use crate::stream::StreamTranscoder;
    use futures::stream;

    #[tokio::test]
    async fn test_lines_are_independently_parseable() {
        let packets = StreamTranscoder::with_stream_id("s")
            .transcode(Box::pin(stream::iter(vec![Ok("x".to_string()), Ok("y".to_string())])));

        let chunks: Vec<_> = encode_lines(packets).collect().await;
        assert_eq!(chunks.len(), 3);

        for (i, chunk) in chunks.into_iter().enumerate() {
            let bytes = chunk.unwrap();
            assert_eq!(bytes.last(), Some(&b'\n'));
            let packet: ProtocolPacket = serde_json::from_slice(&bytes[..bytes.len() - 1]).unwrap();
            assert_eq!(packet.id, format!("chunk_{}", i + 1));
        }
    }

    #[tokio::test]
    async fn test_errors_pass_through() {
        let packets = StreamTranscoder::with_stream_id("s").transcode(Box::pin(stream::iter(vec![
            Err(BackendError::Network("gone".to_string())),
        ])));

        let chunks: Vec<_> = encode_lines(packets).collect().await;
        assert_eq!(chunks, vec![Err(BackendError::Network("gone".to_string()))]);
    }
}
