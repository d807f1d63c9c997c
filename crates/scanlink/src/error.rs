use std::time::Duration;

pub use scanlink_proto::DeviceError;

/// Errors that can occur on a device connection.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// Establishing the connection failed, either at the socket or during
    /// the hello handshake. The cause is wrapped.
    #[error("connect failed: {0}")]
    Connect(#[source] Box<ClientError>),

    /// I/O error on the underlying stream.
    #[error("connection I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Frame-level error.
    #[error("frame error: {0}")]
    Frame(#[from] scanlink_frame::FrameError),

    /// The response envelope could not be decoded.
    #[error("malformed response envelope: {0}")]
    Decode(#[from] prost::DecodeError),

    /// Structured failure reported by the device. The connection stays up.
    #[error("device error: {0}")]
    Device(#[from] DeviceError),

    /// The connection is not in the Connected state, or died while the
    /// request was in flight.
    #[error("not connected")]
    NotConnected,

    /// A request is already in flight on this connection.
    #[error("a request is already in flight")]
    ProtocolBusy,

    /// A response arrived with no request outstanding. Never surfaced to
    /// callers; the read task logs and drops the message.
    #[error("response arrived with no request outstanding")]
    UnexpectedMessage,

    /// Request timed out.
    #[error("request timed out after {0:?}")]
    Timeout(Duration),
}

pub type Result<T> = std::result::Result<T, ClientError>;
