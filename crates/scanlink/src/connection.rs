use std::fmt;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::Arc;

use bytes::Bytes;
use prost::Message;
use scanlink_frame::{FrameConfig, FrameError, FrameReader, FrameWriter};
use scanlink_proto::{DeviceError, Request, Response};
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::net::TcpStream;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio::time::timeout;

use crate::config::{ConnectConfig, DEFAULT_PORT};
use crate::error::{ClientError, Result};
use crate::pending::PendingSlot;

/// Lifecycle of a device connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum ConnectionState {
    /// No socket. The state after an explicit close.
    Disconnected = 0,
    /// Socket establishment and hello handshake in progress.
    Connecting = 1,
    /// Handshake accepted; calls are admitted.
    Connected = 2,
    /// An I/O or protocol error killed the connection.
    Failed = 3,
}

impl ConnectionState {
    fn from_u8(raw: u8) -> Self {
        match raw {
            0 => Self::Disconnected,
            1 => Self::Connecting,
            2 => Self::Connected,
            _ => Self::Failed,
        }
    }
}

/// State shared between the connection handle and its read task.
#[derive(Debug)]
struct Shared {
    state: AtomicU8,
    pending: PendingSlot,
    peer: SocketAddr,
}

impl Shared {
    fn state(&self) -> ConnectionState {
        ConnectionState::from_u8(self.state.load(Ordering::Acquire))
    }

    fn set_state(&self, state: ConnectionState) {
        self.state.store(state as u8, Ordering::Release);
    }

    fn is_open(&self) -> bool {
        matches!(
            self.state(),
            ConnectionState::Connecting | ConnectionState::Connected
        )
    }

    /// Mark the connection dead and wake whoever waits on a response.
    ///
    /// An explicit close wins: once Disconnected, the failure the read task
    /// observes when its socket is shut down must not overwrite it.
    fn fail(&self) {
        let _ = self
            .state
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |raw| {
                match ConnectionState::from_u8(raw) {
                    ConnectionState::Connecting | ConnectionState::Connected => {
                        Some(ConnectionState::Failed as u8)
                    }
                    ConnectionState::Disconnected | ConnectionState::Failed => None,
                }
            });
        self.pending.fail(ClientError::NotConnected);
    }
}

/// A client connection to a scanning device.
///
/// Exactly one request is in flight at a time; concurrent callers queue in
/// arrival order on a fair gate and never interleave on the wire. The handle
/// is `Send + Sync` and can be shared by reference or `Arc` from as many
/// tasks as needed.
pub struct Connection {
    shared: Arc<Shared>,
    writer: Mutex<FrameWriter<OwnedWriteHalf>>,
    reader_task: JoinHandle<()>,
    config: ConnectConfig,
}

impl Connection {
    /// Connect to `target` (`host` or `host:port`, default port 8000) and
    /// perform the hello handshake.
    pub async fn connect(target: &str) -> Result<Self> {
        Self::connect_with_config(target, ConnectConfig::default()).await
    }

    /// Connect with explicit configuration.
    ///
    /// Fails with [`ClientError::Connect`] wrapping the cause: an I/O error,
    /// the configured deadline, or the device error that rejected the hello.
    pub async fn connect_with_config(target: &str, config: ConnectConfig) -> Result<Self> {
        let deadline = config.connect_timeout;
        match timeout(deadline, Self::establish(target, config)).await {
            Ok(Ok(conn)) => Ok(conn),
            Ok(Err(err)) => Err(ClientError::Connect(Box::new(err))),
            Err(_) => Err(ClientError::Connect(Box::new(ClientError::Timeout(
                deadline,
            )))),
        }
    }

    async fn establish(target: &str, config: ConnectConfig) -> Result<Self> {
        let (host, port) = resolve_target(target)?;
        tracing::debug!(host = %host, port, "connecting");

        let stream = TcpStream::connect((host, port)).await?;
        let peer = stream.peer_addr()?;
        let (read_half, write_half) = stream.into_split();

        let frame_config = FrameConfig {
            max_payload_size: config.max_payload_size,
        };
        let reader = FrameReader::with_config(read_half, frame_config.clone());
        let writer = FrameWriter::with_config(write_half, frame_config);

        let shared = Arc::new(Shared {
            state: AtomicU8::new(ConnectionState::Connecting as u8),
            pending: PendingSlot::new(),
            peer,
        });
        let reader_task = tokio::spawn(read_loop(reader, Arc::clone(&shared)));

        let conn = Self {
            shared,
            writer: Mutex::new(writer),
            reader_task,
            config,
        };

        conn.handshake().await?;
        conn.shared.set_state(ConnectionState::Connected);
        tracing::debug!(peer = %conn.shared.peer, "connected");
        Ok(conn)
    }

    /// The hello exchange rides the normal request path, before the state
    /// reaches Connected.
    async fn handshake(&self) -> Result<()> {
        let hello = Request::hello(self.config.protocol_version).encode_to_vec();
        let raw = self.send_and_wait(hello.into()).await?;

        // The read task already screened the envelope for the error case;
        // this decode only feeds the log.
        if let Ok(resp) = Response::decode(raw.as_ref()) {
            if let Some(hello) = resp.hello() {
                tracing::debug!(
                    peer = %self.shared.peer,
                    device_protocol = hello.protocol_version,
                    device_library = %hello.library_version,
                    "handshake accepted"
                );
            }
        }
        Ok(())
    }

    /// Send one request payload and wait for the device's response payload.
    ///
    /// Responses reporting a device error resolve to
    /// [`ClientError::Device`]; the connection stays usable afterwards.
    pub async fn call(&self, payload: impl Into<Bytes>) -> Result<Bytes> {
        if self.shared.state() != ConnectionState::Connected {
            return Err(ClientError::NotConnected);
        }
        self.send_and_wait(payload.into()).await
    }

    async fn send_and_wait(&self, payload: Bytes) -> Result<Bytes> {
        let mut writer = self.writer.lock().await;

        // The connection may have died while this caller sat in the queue.
        if !self.shared.is_open() {
            return Err(ClientError::NotConnected);
        }

        // Reject before reserving: an oversized payload never reaches the
        // wire, so the connection stays consistent.
        let max = writer.config().max_payload_size;
        if payload.len() > max {
            return Err(ClientError::Frame(FrameError::PayloadTooLarge {
                size: payload.len(),
                max,
            }));
        }

        let rx = self.shared.pending.reserve()?;

        if let Err(err) = writer.send(&payload).await {
            tracing::debug!(peer = %self.shared.peer, error = %err, "request write failed");
            self.abandon(&mut writer).await;
            return Err(ClientError::NotConnected);
        }

        match self.config.request_timeout {
            None => match rx.await {
                Ok(result) => result,
                Err(_) => Err(ClientError::NotConnected),
            },
            Some(deadline) => match timeout(deadline, rx).await {
                Ok(Ok(result)) => result,
                Ok(Err(_)) => Err(ClientError::NotConnected),
                Err(_) => {
                    tracing::debug!(peer = %self.shared.peer, ?deadline, "request timed out");
                    self.abandon(&mut writer).await;
                    Err(ClientError::Timeout(deadline))
                }
            },
        }
    }

    /// Tear the connection down from inside a call, while the write gate is
    /// still held.
    async fn abandon(&self, writer: &mut FrameWriter<OwnedWriteHalf>) {
        self.shared.fail();
        self.reader_task.abort();
        let _ = writer.shutdown().await;
    }

    /// Close the connection. Idempotent; an in-flight call is failed.
    pub async fn close(&self) {
        self.shared.set_state(ConnectionState::Disconnected);
        self.reader_task.abort();
        self.shared.pending.fail(ClientError::NotConnected);

        let mut writer = self.writer.lock().await;
        let _ = writer.shutdown().await;
        tracing::debug!(peer = %self.shared.peer, "connection closed");
    }

    /// Current lifecycle state.
    pub fn state(&self) -> ConnectionState {
        self.shared.state()
    }

    /// Address of the device this connection talks to.
    pub fn peer_addr(&self) -> SocketAddr {
        self.shared.peer
    }
}

impl fmt::Debug for Connection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Connection")
            .field("peer", &self.shared.peer)
            .field("state", &self.shared.state())
            .finish_non_exhaustive()
    }
}

impl Drop for Connection {
    fn drop(&mut self) {
        self.reader_task.abort();
    }
}

/// Drives inbound frames: every message either resolves the one pending call
/// or is logged and dropped.
async fn read_loop(mut reader: FrameReader<OwnedReadHalf>, shared: Arc<Shared>) {
    loop {
        let raw = match reader.read_frame().await {
            Ok(raw) => raw,
            Err(FrameError::ConnectionClosed) => {
                tracing::debug!(peer = %shared.peer, "device closed the connection");
                shared.fail();
                return;
            }
            Err(err) => {
                tracing::error!(peer = %shared.peer, error = %err, "read failed");
                shared.fail();
                return;
            }
        };
        let frame_len = raw.len();

        let verdict = match Response::decode(raw.as_ref()) {
            Ok(resp) => match resp.error() {
                Some(wire_err) => Err(ClientError::Device(DeviceError::from_wire(wire_err))),
                None => Ok(raw),
            },
            Err(err) => {
                tracing::error!(peer = %shared.peer, error = %err, "malformed response envelope");
                let _ = shared.pending.resolve(Err(ClientError::Decode(err)));
                shared.fail();
                return;
            }
        };

        if shared.pending.resolve(verdict).is_err() {
            tracing::warn!(
                peer = %shared.peer,
                bytes = frame_len,
                "response arrived with no request outstanding; dropping"
            );
        }
    }
}

/// Split `host[:port]` apart. Targets with more than one colon are taken as
/// bare IPv6 hosts.
fn resolve_target(target: &str) -> Result<(String, u16)> {
    match target.rsplit_once(':') {
        Some((host, port)) if !host.contains(':') => {
            let port = port.parse().map_err(|_| {
                ClientError::Io(std::io::Error::new(
                    std::io::ErrorKind::InvalidInput,
                    format!("invalid port in target '{target}'"),
                ))
            })?;
            Ok((host.to_string(), port))
        }
        _ => Ok((target.to_string(), DEFAULT_PORT)),
    }
}
