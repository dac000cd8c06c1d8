//! Offline encode/decode of node read messages by name.

use node_read_grpc::proto::{
    GetFullMempoolRequest, GetFullMempoolResponse, GetNodeTypeRequest, GetNodeTypeResponse, Token,
    TransactionRecord,
};
use node_read_grpc::{JsonReadOptions, WireMessage};
use serde_json::Value;

use crate::error::Result;

/// Selects one of the `node_read_service.v1` message types at runtime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum MessageKind {
    NodeTypeRequest,
    NodeTypeResponse,
    FullMempoolRequest,
    FullMempoolResponse,
    TransactionRecord,
    Token,
}

impl MessageKind {
    /// Fully qualified proto type name.
    pub fn type_name(self) -> &'static str {
        match self {
            MessageKind::NodeTypeRequest => GetNodeTypeRequest::type_name(),
            MessageKind::NodeTypeResponse => GetNodeTypeResponse::type_name(),
            MessageKind::FullMempoolRequest => GetFullMempoolRequest::type_name(),
            MessageKind::FullMempoolResponse => GetFullMempoolResponse::type_name(),
            MessageKind::TransactionRecord => TransactionRecord::type_name(),
            MessageKind::Token => Token::type_name(),
        }
    }

    /// Decode protobuf binary into canonical proto3 JSON.
    pub fn binary_to_json(self, bytes: &[u8]) -> Result<Value> {
        match self {
            MessageKind::NodeTypeRequest => binary_to_json::<GetNodeTypeRequest>(bytes),
            MessageKind::NodeTypeResponse => binary_to_json::<GetNodeTypeResponse>(bytes),
            MessageKind::FullMempoolRequest => binary_to_json::<GetFullMempoolRequest>(bytes),
            MessageKind::FullMempoolResponse => binary_to_json::<GetFullMempoolResponse>(bytes),
            MessageKind::TransactionRecord => binary_to_json::<TransactionRecord>(bytes),
            MessageKind::Token => binary_to_json::<Token>(bytes),
        }
    }

    /// Encode proto3 JSON text into protobuf binary.
    pub fn json_to_binary(self, json: &str, options: &JsonReadOptions) -> Result<Vec<u8>> {
        match self {
            MessageKind::NodeTypeRequest => json_to_binary::<GetNodeTypeRequest>(json, options),
            MessageKind::NodeTypeResponse => json_to_binary::<GetNodeTypeResponse>(json, options),
            MessageKind::FullMempoolRequest => {
                json_to_binary::<GetFullMempoolRequest>(json, options)
            }
            MessageKind::FullMempoolResponse => {
                json_to_binary::<GetFullMempoolResponse>(json, options)
            }
            MessageKind::TransactionRecord => json_to_binary::<TransactionRecord>(json, options),
            MessageKind::Token => json_to_binary::<Token>(json, options),
        }
    }
}

fn binary_to_json<M: WireMessage>(bytes: &[u8]) -> Result<Value> {
    Ok(M::from_binary(bytes)?.to_json())
}

fn json_to_binary<M: WireMessage>(json: &str, options: &JsonReadOptions) -> Result<Vec<u8>> {
    Ok(M::from_json_str_with(json, options)?.to_binary())
}
