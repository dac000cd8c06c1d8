//! SDK error types

use thiserror::Error;

/// SDK error type.
#[derive(Error, Debug)]
pub enum Error {
    /// Failed to connect to the node.
    #[error("Connection failed: {0}")]
    ConnectionFailed(#[source] tonic::transport::Error),

    /// Invalid endpoint URI.
    #[error("Invalid endpoint: {0}")]
    InvalidEndpoint(String),

    /// gRPC transport error.
    #[error("gRPC error: {0}")]
    Grpc(#[from] tonic::Status),

    /// Message payload could not be decoded.
    #[error("Decode error: {0}")]
    Decode(#[from] node_read_grpc::DecodeError),

    /// Hex decode error.
    #[error("Hex decode error: {0}")]
    HexDecode(#[from] hex::FromHexError),
}

/// Result type alias for SDK operations.
pub type Result<T> = std::result::Result<T, Error>;
