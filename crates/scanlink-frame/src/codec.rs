use bytes::{Buf, BufMut, Bytes, BytesMut};

use crate::error::{FrameError, Result};

/// Length prefix: 4 bytes, little-endian payload byte count.
pub const PREFIX_SIZE: usize = 4;

/// Default maximum payload size: 16 MiB.
pub const DEFAULT_MAX_PAYLOAD: usize = 16 * 1024 * 1024;

/// Encode a payload into the wire format.
///
/// Wire format:
/// ```text
/// ┌──────────────┬──────────────────┐
/// │ Length       │ Payload          │
/// │ (4B LE)      │ (Length bytes)   │
/// └──────────────┴──────────────────┘
/// ```
pub fn encode_frame(payload: &[u8], dst: &mut BytesMut) -> Result<()> {
    if payload.len() > u32::MAX as usize {
        return Err(FrameError::PayloadTooLarge {
            size: payload.len(),
            max: u32::MAX as usize,
        });
    }
    dst.reserve(PREFIX_SIZE + payload.len());
    dst.put_u32_le(payload.len() as u32);
    dst.put_slice(payload);
    Ok(())
}

/// Decode progress between chunk arrivals.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DecodeState {
    /// Waiting for the 4-byte length prefix.
    AwaitingPrefix,
    /// Prefix consumed; waiting for `len` payload bytes.
    AwaitingBody { len: usize },
}

/// Incremental decoder for length-prefixed frames.
///
/// Bytes go in via [`feed`](FrameDecoder::feed) in whatever chunks the socket
/// delivers them; complete payloads come out of
/// [`next_frame`](FrameDecoder::next_frame). The emitted frame sequence never
/// depends on how the stream was chunked.
///
/// A [`FrameError::PayloadTooLarge`] from `next_frame` is fatal: the prefix
/// has already been consumed and the stream position is unrecoverable, so the
/// decoder (and the connection feeding it) must be discarded.
#[derive(Debug)]
pub struct FrameDecoder {
    buf: BytesMut,
    state: DecodeState,
    config: FrameConfig,
}

impl FrameDecoder {
    /// Create a decoder with default configuration.
    pub fn new() -> Self {
        Self::with_config(FrameConfig::default())
    }

    /// Create a decoder with explicit configuration.
    pub fn with_config(config: FrameConfig) -> Self {
        Self {
            buf: BytesMut::new(),
            state: DecodeState::AwaitingPrefix,
            config,
        }
    }

    /// Append a chunk of stream bytes to the accumulation buffer.
    ///
    /// This is the only copy a chunk undergoes; emitted payloads are split
    /// off the buffer without copying again.
    pub fn feed(&mut self, chunk: &[u8]) {
        self.buf.extend_from_slice(chunk);
    }

    /// Extract the next complete payload, if the buffer holds one.
    ///
    /// Returns `Ok(None)` when more bytes are needed. A zero length prefix
    /// yields an empty payload immediately.
    pub fn next_frame(&mut self) -> Result<Option<Bytes>> {
        loop {
            match self.state {
                DecodeState::AwaitingPrefix => {
                    if self.buf.len() < PREFIX_SIZE {
                        return Ok(None);
                    }
                    let len = self.buf.get_u32_le() as usize;
                    if len > self.config.max_payload_size {
                        return Err(FrameError::PayloadTooLarge {
                            size: len,
                            max: self.config.max_payload_size,
                        });
                    }
                    self.state = DecodeState::AwaitingBody { len };
                }
                DecodeState::AwaitingBody { len } => {
                    if self.buf.len() < len {
                        return Ok(None);
                    }
                    self.state = DecodeState::AwaitingPrefix;
                    return Ok(Some(self.buf.split_to(len).freeze()));
                }
            }
        }
    }

    /// Number of bytes buffered but not yet emitted as frames.
    pub fn buffered(&self) -> usize {
        self.buf.len()
    }

    /// Current decoder configuration.
    pub fn config(&self) -> &FrameConfig {
        &self.config
    }
}

impl Default for FrameDecoder {
    fn default() -> Self {
        Self::new()
    }
}

/// Configuration for the frame codec.
#[derive(Debug, Clone)]
pub struct FrameConfig {
    /// Maximum payload size in bytes. Default: 16 MiB.
    pub max_payload_size: usize,
}

impl Default for FrameConfig {
    fn default() -> Self {
        Self {
            max_payload_size: DEFAULT_MAX_PAYLOAD,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn drain(decoder: &mut FrameDecoder) -> Vec<Bytes> {
        let mut frames = Vec::new();
        while let Some(frame) = decoder.next_frame().unwrap() {
            frames.push(frame);
        }
        frames
    }

    #[test]
    fn test_encode_decode_roundtrip() {
        let mut wire = BytesMut::new();
        let payload = b"hello, scanner!";
        encode_frame(payload, &mut wire).unwrap();

        assert_eq!(wire.len(), PREFIX_SIZE + payload.len());

        let mut decoder = FrameDecoder::new();
        decoder.feed(&wire);
        let frame = decoder.next_frame().unwrap().unwrap();

        assert_eq!(frame.as_ref(), payload);
        assert_eq!(decoder.buffered(), 0);
    }

    #[test]
    fn test_encode_prefix_is_little_endian() {
        let mut wire = BytesMut::new();
        encode_frame(b"abcde", &mut wire).unwrap();
        assert_eq!(&wire[..PREFIX_SIZE], &[0x05, 0x00, 0x00, 0x00]);
        assert_eq!(&wire[PREFIX_SIZE..], b"abcde");
    }

    #[test]
    fn test_prefix_then_body_in_separate_chunks() {
        // Prefix 0x05000000, then the five body bytes as a 3-byte and a
        // 2-byte chunk. One frame must come out, after the last chunk.
        let mut decoder = FrameDecoder::new();

        decoder.feed(&[0x05, 0x00, 0x00, 0x00]);
        assert!(decoder.next_frame().unwrap().is_none());

        decoder.feed(b"abc");
        assert!(decoder.next_frame().unwrap().is_none());

        decoder.feed(b"de");
        let frame = decoder.next_frame().unwrap().unwrap();
        assert_eq!(frame.as_ref(), b"abcde");
    }

    #[test]
    fn test_partial_prefix_across_chunks() {
        let mut decoder = FrameDecoder::new();
        decoder.feed(&[0x02, 0x00]);
        assert!(decoder.next_frame().unwrap().is_none());

        decoder.feed(&[0x00, 0x00, b'h', b'i']);
        let frame = decoder.next_frame().unwrap().unwrap();
        assert_eq!(frame.as_ref(), b"hi");
    }

    #[test]
    fn test_chunking_invariance_byte_at_a_time() {
        let mut wire = BytesMut::new();
        encode_frame(b"first", &mut wire).unwrap();
        encode_frame(b"", &mut wire).unwrap();
        encode_frame(b"second frame payload", &mut wire).unwrap();

        let mut whole = FrameDecoder::new();
        whole.feed(&wire);
        let expected = drain(&mut whole);

        let mut trickled = FrameDecoder::new();
        let mut got = Vec::new();
        for byte in wire.iter() {
            trickled.feed(std::slice::from_ref(byte));
            got.extend(drain(&mut trickled));
        }

        assert_eq!(expected, got);
        assert_eq!(got.len(), 3);
        assert_eq!(trickled.buffered(), 0);
    }

    #[test]
    fn test_zero_length_prefix_yields_empty_frame() {
        let mut decoder = FrameDecoder::new();
        decoder.feed(&[0x00, 0x00, 0x00, 0x00]);

        let frame = decoder.next_frame().unwrap().unwrap();
        assert!(frame.is_empty());
        assert!(decoder.next_frame().unwrap().is_none());
    }

    #[test]
    fn test_multiple_frames_in_one_chunk() {
        let mut wire = BytesMut::new();
        encode_frame(b"first", &mut wire).unwrap();
        encode_frame(b"second", &mut wire).unwrap();

        let mut decoder = FrameDecoder::new();
        decoder.feed(&wire);

        let f1 = decoder.next_frame().unwrap().unwrap();
        let f2 = decoder.next_frame().unwrap().unwrap();
        assert_eq!(f1.as_ref(), b"first");
        assert_eq!(f2.as_ref(), b"second");
        assert!(decoder.next_frame().unwrap().is_none());
    }

    #[test]
    fn test_decoder_reusable_across_frames() {
        let mut decoder = FrameDecoder::new();
        for i in 0..16u8 {
            let payload = vec![i; i as usize];
            let mut wire = BytesMut::new();
            encode_frame(&payload, &mut wire).unwrap();
            decoder.feed(&wire);
            let frame = decoder.next_frame().unwrap().unwrap();
            assert_eq!(frame.as_ref(), payload.as_slice());
        }
    }

    #[test]
    fn test_prefix_exceeding_max_errors() {
        let cfg = FrameConfig {
            max_payload_size: 16,
        };
        let mut decoder = FrameDecoder::with_config(cfg);
        decoder.feed(&[0xFF, 0xFF, 0xFF, 0x00]); // ~16 MiB announced

        let err = decoder.next_frame().unwrap_err();
        assert!(matches!(
            err,
            FrameError::PayloadTooLarge { size, max: 16 } if size == 0x00FF_FFFF
        ));
    }

    #[test]
    fn test_empty_buffer_needs_more_data() {
        let mut decoder = FrameDecoder::new();
        assert!(decoder.next_frame().unwrap().is_none());
    }

    #[test]
    fn test_encode_empty_payload() {
        let mut wire = BytesMut::new();
        encode_frame(b"", &mut wire).unwrap();
        assert_eq!(&wire[..], &[0x00, 0x00, 0x00, 0x00]);
    }
}
