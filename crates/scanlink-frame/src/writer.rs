use bytes::BytesMut;
use tokio::io::{AsyncWrite, AsyncWriteExt};

use crate::codec::{encode_frame, FrameConfig};
use crate::error::{FrameError, Result};

const INITIAL_BUFFER_CAPACITY: usize = 8 * 1024;

/// Writes complete frames to any async byte stream.
pub struct FrameWriter<T> {
    inner: T,
    buf: BytesMut,
    config: FrameConfig,
}

impl<T: AsyncWrite + Unpin> FrameWriter<T> {
    /// Create a new frame writer with default configuration.
    pub fn new(inner: T) -> Self {
        Self::with_config(inner, FrameConfig::default())
    }

    /// Create a new frame writer with explicit configuration.
    pub fn with_config(inner: T, config: FrameConfig) -> Self {
        Self {
            inner,
            buf: BytesMut::with_capacity(INITIAL_BUFFER_CAPACITY),
            config,
        }
    }

    /// Encode and send one payload, then flush.
    pub async fn send(&mut self, payload: &[u8]) -> Result<()> {
        if payload.len() > self.config.max_payload_size {
            return Err(FrameError::PayloadTooLarge {
                size: payload.len(),
                max: self.config.max_payload_size,
            });
        }

        self.buf.clear();
        encode_frame(payload, &mut self.buf)?;

        self.inner.write_all(&self.buf).await?;
        self.inner.flush().await?;
        Ok(())
    }

    /// Shut down the write side of the underlying stream.
    pub async fn shutdown(&mut self) -> Result<()> {
        self.inner.shutdown().await?;
        Ok(())
    }

    /// Borrow the underlying stream.
    pub fn get_ref(&self) -> &T {
        &self.inner
    }

    /// Mutably borrow the underlying stream.
    pub fn get_mut(&mut self) -> &mut T {
        &mut self.inner
    }

    /// Consume the writer and return the inner stream.
    pub fn into_inner(self) -> T {
        self.inner
    }

    /// Current frame writer configuration.
    pub fn config(&self) -> &FrameConfig {
        &self.config
    }
}

#[cfg(test)]
mod tests {
    use tokio::io::AsyncReadExt;

    use super::*;
    use crate::reader::FrameReader;

    #[tokio::test]
    async fn roundtrip_over_duplex() {
        let (tx, rx) = tokio::io::duplex(256);
        let mut writer = FrameWriter::new(tx);
        let mut reader = FrameReader::new(rx);

        writer.send(b"ping").await.unwrap();
        let frame = reader.read_frame().await.unwrap();
        assert_eq!(frame.as_ref(), b"ping");
    }

    #[tokio::test]
    async fn empty_payload_on_the_wire() {
        let (tx, mut rx) = tokio::io::duplex(64);
        let mut writer = FrameWriter::new(tx);
        writer.send(b"").await.unwrap();

        let mut wire = [0u8; 4];
        rx.read_exact(&mut wire).await.unwrap();
        assert_eq!(wire, [0x00, 0x00, 0x00, 0x00]);
    }

    #[tokio::test]
    async fn rejects_oversized_payload() {
        let (tx, _rx) = tokio::io::duplex(64);
        let cfg = FrameConfig {
            max_payload_size: 8,
        };
        let mut writer = FrameWriter::with_config(tx, cfg);

        let err = writer.send(&[0u8; 9]).await.unwrap_err();
        assert!(matches!(
            err,
            FrameError::PayloadTooLarge { size: 9, max: 8 }
        ));
    }

    #[tokio::test]
    async fn shutdown_signals_eof_to_peer() {
        let (tx, rx) = tokio::io::duplex(64);
        let mut writer = FrameWriter::new(tx);
        let mut reader = FrameReader::new(rx);

        writer.send(b"last").await.unwrap();
        writer.shutdown().await.unwrap();

        assert_eq!(reader.read_frame().await.unwrap().as_ref(), b"last");
        let err = reader.read_frame().await.unwrap_err();
        assert!(matches!(err, FrameError::ConnectionClosed));
    }

    #[tokio::test]
    async fn accessors_and_into_inner() {
        let (tx, _rx) = tokio::io::duplex(64);
        let mut writer = FrameWriter::new(tx);

        let _ = writer.get_ref();
        let _ = writer.get_mut();
        let _ = writer.config();
        let _inner = writer.into_inner();
    }
}
