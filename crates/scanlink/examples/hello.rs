//! Connect to a device and read its clock via the hello request.
//!
//! Run with:
//!   cargo run --example hello -- 192.168.26.26
//!
//! The argument accepts `host` or `host:port`; devices listen on port 8000
//! by default.

use prost::Message;
use scanlink::{ConnectConfig, Connection};
use scanlink_proto::{Request, Response};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .init();

    let target = std::env::args()
        .nth(1)
        .ok_or("usage: hello <host[:port]>")?;

    let config = ConnectConfig::default();
    let version = config.protocol_version;
    let conn = Connection::connect_with_config(&target, config).await?;
    eprintln!("Connected to {}", conn.peer_addr());

    let raw = conn.call(Request::hello(version).encode_to_vec()).await?;
    let resp = Response::decode(raw.as_ref())?;
    eprintln!("Device clock: {} ns", resp.timestamp_ns);
    if let Some(hello) = resp.hello() {
        eprintln!("Device library: {}", hello.library_version);
    }

    conn.close().await;
    Ok(())
}
