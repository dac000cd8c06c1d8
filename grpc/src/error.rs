//! Error types for the message codecs and the gRPC API.

use thiserror::Error;
use tonic::Status;

/// Failure to decode a message from binary or JSON input.
///
/// This is the only error the schema layer produces: construction, encoding
/// and equality are total.
#[derive(Debug, Error)]
pub enum DecodeError {
    /// Malformed or truncated protobuf binary input
    #[error("Invalid binary encoding: {0}")]
    Binary(#[from] prost::DecodeError),

    /// Structurally invalid JSON or a value of the wrong type
    #[error("Invalid JSON encoding: {0}")]
    Json(#[from] serde_json::Error),

    /// Unknown JSON key while decoding in strict mode
    #[error("Unknown field `{field}` in {message}")]
    UnknownField {
        message: &'static str,
        field: String,
    },

    /// Binary input exceeds the configured read limit
    #[error("Message of {size} bytes exceeds limit of {limit} bytes")]
    MessageTooLarge { size: usize, limit: usize },
}

/// RPC-specific errors that can occur during request processing.
#[derive(Debug, Error)]
pub enum RpcError {
    /// A backing component the request needs is not attached
    #[error("Unavailable: {0}")]
    Unavailable(String),

    /// Encoded response would exceed the configured message size
    #[error("Response of {size} bytes exceeds limit of {limit} bytes")]
    ResponseTooLarge { size: usize, limit: usize },
}

impl From<RpcError> for Status {
    fn from(err: RpcError) -> Self {
        match err {
            RpcError::Unavailable(msg) => Status::unavailable(msg),
            RpcError::ResponseTooLarge { .. } => Status::resource_exhausted(err.to_string()),
        }
    }
}

/// Result type for RPC operations
pub type RpcResult<T> = Result<T, RpcError>;

#[cfg(test)]
mod tests {
    use super::*;
    use tonic::Code;

    #[test]
    fn unavailable_maps_to_unavailable() {
        let status: Status = RpcError::Unavailable("Mempool reader not attached".into()).into();
        assert_eq!(status.code(), Code::Unavailable);
        assert_eq!(status.message(), "Mempool reader not attached");
    }

    #[test]
    fn response_too_large_maps_to_resource_exhausted() {
        let status: Status = RpcError::ResponseTooLarge {
            size: 100,
            limit: 10,
        }
        .into();
        assert_eq!(status.code(), Code::ResourceExhausted);
        assert!(status.message().contains("100 bytes"));
    }

    #[test]
    fn unknown_field_display() {
        let err = DecodeError::UnknownField {
            message: "node_read_service.v1.Token",
            field: "color".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Unknown field `color` in node_read_service.v1.Token"
        );
    }

    #[test]
    fn too_large_message_display() {
        let err = DecodeError::MessageTooLarge { size: 10, limit: 4 };
        assert_eq!(
            err.to_string(),
            "Message of 10 bytes exceeds limit of 4 bytes"
        );
    }
}
