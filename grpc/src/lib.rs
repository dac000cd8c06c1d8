//! Node read service: message schema and gRPC server.
//!
//! This crate provides:
//! - The `node_read_service.v1` protobuf messages with binary and proto3 JSON codecs
//! - A shared [`WireMessage`] codec trait driven by per-message field descriptors
//! - A lock-free mempool snapshot channel the read service answers from
//! - The `NodeReadService` gRPC server (`GetNodeType`, `GetFullMempool`)

pub mod config;
pub mod error;
pub mod mempool;
pub mod schema;
pub mod server;
pub mod services;

/// Generated protobuf code from tonic-prost-build, plus the pbjson serde impls.
/// This module is populated by the build.rs script.
#[allow(clippy::all)]
#[allow(clippy::pedantic)]
pub mod proto {
    tonic::include_proto!("node_read_service.v1");
    include!(concat!(env!("OUT_DIR"), "/node_read_service.v1.serde.rs"));

    /// Encoded `FileDescriptorSet` for the `node_read_service.v1` package.
    pub const FILE_DESCRIPTOR_SET: &[u8] =
        include_bytes!(concat!(env!("OUT_DIR"), "/node_read_service_descriptor.bin"));
}

// Re-export key types for convenience
pub use config::{Network, NodeType, RpcConfig};
pub use error::{DecodeError, RpcError};
pub use mempool::{MempoolReader, MempoolSnapshot, MempoolWriter};
pub use schema::{BinaryReadOptions, JsonReadOptions, WireMessage};
pub use server::RpcServer;
