//! Length-prefixed message framing for scanning device connections.
//!
//! Every message on the wire is framed with a 4-byte little-endian payload
//! length followed by the payload itself. There are no magic bytes, no
//! checksums and no message IDs; the protocol relies on strict
//! request-then-response ordering instead.
//!
//! No partial reads, no buffer management in user code.

pub mod codec;
pub mod error;
pub mod reader;
pub mod writer;

pub use codec::{encode_frame, FrameConfig, FrameDecoder, DEFAULT_MAX_PAYLOAD, PREFIX_SIZE};
pub use error::{FrameError, Result};
pub use reader::FrameReader;
pub use writer::FrameWriter;
