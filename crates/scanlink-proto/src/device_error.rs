use serde::Serialize;

use crate::envelope::{error, Error};

/// A structured failure reported by the device.
///
/// `errno` is the wire tag of the populated error case, `name` its stable
/// snake_case label and `message` the case detail serialized as JSON so
/// operators see every field the device filled in.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("{name} (errno {errno}): {message}")]
pub struct DeviceError {
    pub errno: u32,
    pub name: &'static str,
    pub message: String,
}

impl DeviceError {
    /// Translate a wire error into its typed form.
    ///
    /// An error with no populated case (absent detail, or a case newer than
    /// this schema revision) maps to the generic zero-errno failure.
    pub fn from_wire(err: &Error) -> Self {
        let Some(kind) = &err.kind else {
            return Self {
                errno: 0,
                name: "unknown",
                message: String::new(),
            };
        };

        use error::Kind;
        let (errno, name, message) = match kind {
            Kind::Unknown(d) => (1, "unknown", detail(d)),
            Kind::NotImplemented(d) => (2, "not_implemented", detail(d)),
            Kind::Empty(d) => (3, "empty", detail(d)),
            Kind::ServerImplementation(d) => (4, "server_implementation", detail(d)),
            Kind::InvalidRequest(d) => (5, "invalid_request", detail(d)),
            Kind::ConnectionClosed(d) => (6, "connection_closed", detail(d)),
            Kind::OutdatedServerProtocol(d) => (11, "outdated_server_protocol", detail(d)),
            Kind::OutdatedClientProtocol(d) => (12, "outdated_client_protocol", detail(d)),
            Kind::ScannerBusy(d) => (13, "scanner_busy", detail(d)),
            Kind::WrongOperationMode(d) => (14, "wrong_operation_mode", detail(d)),
            Kind::NotAllowed(d) => (15, "not_allowed", detail(d)),
            Kind::HardwareError(d) => (16, "hardware_error", detail(d)),
            Kind::SystemStop(d) => (17, "system_stop", detail(d)),
            Kind::NotFound(d) => (18, "not_found", detail(d)),
            Kind::UnknownErrorCode(d) => (21, "unknown_error_code", detail(d)),
            Kind::NotInRange(d) => (22, "not_in_range", detail(d)),
            Kind::TimeSyncFailed(d) => (23, "time_sync_failed", detail(d)),
            Kind::NoDeviceDiscovered(d) => (24, "no_device_discovered", detail(d)),
            Kind::NotSupported(d) => (25, "not_supported", detail(d)),
        };

        Self {
            errno,
            name,
            message,
        }
    }
}

fn detail<T: Serialize>(value: &T) -> String {
    serde_json::to_string(value).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use prost::Message;

    use super::*;
    use crate::envelope::error::Kind;

    #[test]
    fn translates_string_detail() {
        let err = Error {
            kind: Some(Kind::InvalidRequest(error::InvalidRequest {
                validation_error: "scan pattern missing".to_string(),
            })),
        };

        let translated = DeviceError::from_wire(&err);
        assert_eq!(translated.errno, 5);
        assert_eq!(translated.name, "invalid_request");
        assert_eq!(
            translated.message,
            r#"{"validation_error":"scan pattern missing"}"#
        );
    }

    #[test]
    fn translates_numeric_detail() {
        let err = Error {
            kind: Some(Kind::NotInRange(error::NotInRange {
                parameter: "horizontal_fov".to_string(),
                minimum: 0.1,
                maximum: 1.5,
                requested: 2.0,
                unit: "rad".to_string(),
            })),
        };

        let translated = DeviceError::from_wire(&err);
        assert_eq!(translated.errno, 22);
        assert_eq!(translated.name, "not_in_range");
        assert!(translated.message.contains(r#""parameter":"horizontal_fov""#));
        assert!(translated.message.contains(r#""requested":2.0"#));
    }

    #[test]
    fn translates_fieldless_detail() {
        let err = Error {
            kind: Some(Kind::ScannerBusy(error::ScannerBusy {})),
        };

        let translated = DeviceError::from_wire(&err);
        assert_eq!(translated.errno, 13);
        assert_eq!(translated.name, "scanner_busy");
        assert_eq!(translated.message, "{}");
    }

    #[test]
    fn absent_case_is_generic_failure() {
        let err = Error { kind: None };

        let translated = DeviceError::from_wire(&err);
        assert_eq!(translated.errno, 0);
        assert_eq!(translated.name, "unknown");
        assert!(translated.message.is_empty());
    }

    /// A case tag newer than this schema revision decodes as `kind: None`
    /// and must fall back to the generic failure, not crash.
    #[test]
    fn unknown_case_tag_is_generic_failure() {
        #[derive(Clone, PartialEq, ::prost::Message)]
        struct FutureError {
            #[prost(string, tag = "63")]
            firmware_meltdown: String,
        }

        let wire = FutureError {
            firmware_meltdown: "new failure mode".to_string(),
        }
        .encode_to_vec();

        let decoded = Error::decode(wire.as_slice()).unwrap();
        let translated = DeviceError::from_wire(&decoded);
        assert_eq!(translated.errno, 0);
    }

    #[test]
    fn display_names_the_case() {
        let err = Error {
            kind: Some(Kind::HardwareError(error::HardwareError {})),
        };

        let text = DeviceError::from_wire(&err).to_string();
        assert_eq!(text, "hardware_error (errno 16): {}");
    }
}
