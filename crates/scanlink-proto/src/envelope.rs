//! Wire envelope messages, hand-written in the shape `prost-build` would
//! generate so no protoc run is needed at build time.
//!
//! Field tags match the device wire schema and must not be renumbered.
//! Devices extend `Request`/`Response` with many more cases; those are opaque
//! to this crate (prost skips unknown fields), which is exactly what the
//! transport wants: payloads pass through raw.

/// Protocol version spoken by this library, sent in the connect hello.
pub const PROTOCOL_VERSION: u32 = 1;

/// Handshake message exchanged when a connection is established.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct Hello {
    /// Protocol version of the sender.
    #[prost(uint32, tag = "1")]
    pub protocol_version: u32,
    /// Software version of the sender, informational only.
    #[prost(string, tag = "2")]
    pub library_version: String,
}

/// Envelope for every message sent to the device.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct Request {
    #[prost(oneof = "request::Data", tags = "11")]
    pub data: Option<request::Data>,
}

pub mod request {
    /// Request cases known to the transport. Higher layers encode richer
    /// supersets of this envelope; the transport never inspects those.
    #[derive(Clone, PartialEq, ::prost::Oneof)]
    pub enum Data {
        #[prost(message, tag = "11")]
        Hello(super::Hello),
    }
}

impl Request {
    /// Build the hello request sent during connection establishment.
    pub fn hello(protocol_version: u32) -> Self {
        Self {
            data: Some(request::Data::Hello(Hello {
                protocol_version,
                library_version: env!("CARGO_PKG_VERSION").to_string(),
            })),
        }
    }
}

/// Envelope for every message received from the device.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct Response {
    /// Device clock at the moment the response was generated.
    #[prost(uint64, tag = "1")]
    pub timestamp_ns: u64,
    #[prost(oneof = "response::Data", tags = "10, 11")]
    pub data: Option<response::Data>,
}

pub mod response {
    /// Response cases known to the transport. Unknown cases decode as `None`
    /// and are treated as success payloads.
    #[derive(Clone, PartialEq, ::prost::Oneof)]
    pub enum Data {
        #[prost(message, tag = "10")]
        Error(super::Error),
        #[prost(message, tag = "11")]
        Hello(super::Hello),
    }
}

impl Response {
    /// The device error, if this response reports one.
    pub fn error(&self) -> Option<&Error> {
        match &self.data {
            Some(response::Data::Error(err)) => Some(err),
            _ => None,
        }
    }

    /// The hello payload, if this is a handshake response.
    pub fn hello(&self) -> Option<&Hello> {
        match &self.data {
            Some(response::Data::Hello(hello)) => Some(hello),
            _ => None,
        }
    }
}

/// Structured failure reported by the device. Exactly one case is populated.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct Error {
    #[prost(
        oneof = "error::Kind",
        tags = "1, 2, 3, 4, 5, 6, 11, 12, 13, 14, 15, 16, 17, 18, 21, 22, 23, 24, 25"
    )]
    pub kind: Option<error::Kind>,
}

pub mod error {
    use serde::Serialize;

    /// Failure detail union. Case tags are the device's stable error numbers.
    #[derive(Clone, PartialEq, ::prost::Oneof)]
    pub enum Kind {
        #[prost(message, tag = "1")]
        Unknown(Unknown),
        #[prost(message, tag = "2")]
        NotImplemented(NotImplemented),
        #[prost(message, tag = "3")]
        Empty(Empty),
        #[prost(message, tag = "4")]
        ServerImplementation(ServerImplementation),
        #[prost(message, tag = "5")]
        InvalidRequest(InvalidRequest),
        #[prost(message, tag = "6")]
        ConnectionClosed(ConnectionClosed),
        #[prost(message, tag = "11")]
        OutdatedServerProtocol(OutdatedServerProtocol),
        #[prost(message, tag = "12")]
        OutdatedClientProtocol(OutdatedClientProtocol),
        #[prost(message, tag = "13")]
        ScannerBusy(ScannerBusy),
        #[prost(message, tag = "14")]
        WrongOperationMode(WrongOperationMode),
        #[prost(message, tag = "15")]
        NotAllowed(NotAllowed),
        #[prost(message, tag = "16")]
        HardwareError(HardwareError),
        #[prost(message, tag = "17")]
        SystemStop(SystemStop),
        #[prost(message, tag = "18")]
        NotFound(NotFound),
        #[prost(message, tag = "21")]
        UnknownErrorCode(UnknownErrorCode),
        #[prost(message, tag = "22")]
        NotInRange(NotInRange),
        #[prost(message, tag = "23")]
        TimeSyncFailed(TimeSyncFailed),
        #[prost(message, tag = "24")]
        NoDeviceDiscovered(NoDeviceDiscovered),
        #[prost(message, tag = "25")]
        NotSupported(NotSupported),
    }

    /// Failure the device could not classify further.
    #[derive(Clone, PartialEq, ::prost::Message, Serialize)]
    pub struct Unknown {
        #[prost(string, tag = "1")]
        pub description: String,
    }

    #[derive(Clone, PartialEq, ::prost::Message, Serialize)]
    pub struct NotImplemented {
        #[prost(string, tag = "1")]
        pub reason: String,
    }

    /// The request was understood but carried no actionable content.
    #[derive(Clone, PartialEq, ::prost::Message, Serialize)]
    pub struct Empty {}

    /// Defect inside the device software.
    #[derive(Clone, PartialEq, ::prost::Message, Serialize)]
    pub struct ServerImplementation {}

    #[derive(Clone, PartialEq, ::prost::Message, Serialize)]
    pub struct InvalidRequest {
        #[prost(string, tag = "1")]
        pub validation_error: String,
    }

    /// The device is shutting the connection down.
    #[derive(Clone, PartialEq, ::prost::Message, Serialize)]
    pub struct ConnectionClosed {}

    /// Device firmware speaks an older protocol than this client.
    #[derive(Clone, PartialEq, ::prost::Message, Serialize)]
    pub struct OutdatedServerProtocol {
        #[prost(uint32, tag = "1")]
        pub required_version: u32,
    }

    /// This client speaks an older protocol than the device requires.
    #[derive(Clone, PartialEq, ::prost::Message, Serialize)]
    pub struct OutdatedClientProtocol {
        #[prost(uint32, tag = "1")]
        pub required_version: u32,
    }

    /// Another client holds the operation the request needs.
    #[derive(Clone, PartialEq, ::prost::Message, Serialize)]
    pub struct ScannerBusy {}

    #[derive(Clone, PartialEq, ::prost::Message, Serialize)]
    pub struct WrongOperationMode {}

    #[derive(Clone, PartialEq, ::prost::Message, Serialize)]
    pub struct NotAllowed {}

    #[derive(Clone, PartialEq, ::prost::Message, Serialize)]
    pub struct HardwareError {}

    /// The device entered a protective stop.
    #[derive(Clone, PartialEq, ::prost::Message, Serialize)]
    pub struct SystemStop {}

    #[derive(Clone, PartialEq, ::prost::Message, Serialize)]
    pub struct NotFound {}

    /// The device reported an error number this schema revision cannot name.
    #[derive(Clone, PartialEq, ::prost::Message, Serialize)]
    pub struct UnknownErrorCode {
        #[prost(uint32, tag = "1")]
        pub error_code: u32,
    }

    /// A request parameter fell outside its permitted range.
    #[derive(Clone, PartialEq, ::prost::Message, Serialize)]
    pub struct NotInRange {
        #[prost(string, tag = "1")]
        pub parameter: String,
        #[prost(float, tag = "2")]
        pub minimum: f32,
        #[prost(float, tag = "3")]
        pub maximum: f32,
        #[prost(float, tag = "4")]
        pub requested: f32,
        #[prost(string, tag = "5")]
        pub unit: String,
    }

    #[derive(Clone, PartialEq, ::prost::Message, Serialize)]
    pub struct TimeSyncFailed {
        #[prost(string, tag = "1")]
        pub ntp_daemon_log: String,
    }

    #[derive(Clone, PartialEq, ::prost::Message, Serialize)]
    pub struct NoDeviceDiscovered {}

    #[derive(Clone, PartialEq, ::prost::Message, Serialize)]
    pub struct NotSupported {
        #[prost(string, tag = "1")]
        pub reason: String,
    }
}
