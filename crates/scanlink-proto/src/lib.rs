//! Protocol envelope messages for scanning devices.
//!
//! The transport builds exactly one request itself (the hello exchanged on
//! connect) and inspects responses only for the error case; everything else
//! passes through as opaque payload bytes. Higher layers own the full device
//! schema.

pub mod device_error;
pub mod envelope;

pub use device_error::DeviceError;
pub use envelope::{error, request, response, Error, Hello, Request, Response, PROTOCOL_VERSION};
