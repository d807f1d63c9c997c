use std::time::Duration;

use scanlink_frame::DEFAULT_MAX_PAYLOAD;
use scanlink_proto::PROTOCOL_VERSION;

/// TCP port devices listen on unless the target names another one.
pub const DEFAULT_PORT: u16 = 8000;

/// Configuration for establishing and driving a device connection.
#[derive(Debug, Clone)]
pub struct ConnectConfig {
    /// Deadline covering TCP establishment and the hello handshake.
    pub connect_timeout: Duration,
    /// Per-request deadline. `None` waits as long as the device takes.
    /// An expired deadline fails the whole connection: without message IDs a
    /// late response could not be told apart from the next one.
    pub request_timeout: Option<Duration>,
    /// Maximum frame payload size accepted or sent, in bytes.
    pub max_payload_size: usize,
    /// Protocol version announced in the connect hello.
    pub protocol_version: u32,
}

impl Default for ConnectConfig {
    fn default() -> Self {
        Self {
            connect_timeout: Duration::from_secs(10),
            request_timeout: None,
            max_payload_size: DEFAULT_MAX_PAYLOAD,
            protocol_version: PROTOCOL_VERSION,
        }
    }
}
