//! Client transport for scanning devices.
//!
//! Speaks the device's native wire protocol (a 4-byte little-endian length
//! prefix around a protobuf envelope, strictly one request in flight) over
//! a single persistent TCP connection. Higher layers build request payloads
//! and interpret response payloads; this crate moves them reliably, runs the
//! hello handshake on connect and turns structured device failures into
//! typed errors.
//!
//! ```no_run
//! use prost::Message;
//! use scanlink::Connection;
//! use scanlink_proto::{Request, Response, PROTOCOL_VERSION};
//!
//! # async fn demo() -> scanlink::Result<()> {
//! let conn = Connection::connect("192.168.26.26").await?;
//!
//! let raw = conn.call(Request::hello(PROTOCOL_VERSION).encode_to_vec()).await?;
//! let resp = Response::decode(raw.as_ref())?;
//! println!("device clock: {} ns", resp.timestamp_ns);
//!
//! conn.close().await;
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod connection;
pub mod error;
mod pending;

pub use config::{ConnectConfig, DEFAULT_PORT};
pub use connection::{Connection, ConnectionState};
pub use error::{ClientError, DeviceError, Result};
