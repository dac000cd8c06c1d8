//! NodeReadService implementation.

use prost::Message;
use tonic::{Request, Response, Status};

use crate::config::NodeType;
use crate::error::{RpcError, RpcResult};
use crate::proto::node_read_service_server::NodeReadService;
use crate::proto::{
    GetFullMempoolRequest, GetFullMempoolResponse, GetNodeTypeRequest, GetNodeTypeResponse,
};
use crate::server::ReadOnlyContext;

/// Implementation of the NodeReadService gRPC service.
pub struct NodeReadServiceImpl {
    context: ReadOnlyContext,
    node_id: String,
    node_type: NodeType,
    max_message_size: usize,
}

impl NodeReadServiceImpl {
    /// Create a new NodeReadService implementation.
    pub fn new(
        context: ReadOnlyContext,
        node_id: String,
        node_type: NodeType,
        max_message_size: usize,
    ) -> Self {
        Self {
            context,
            node_id,
            node_type,
            max_message_size,
        }
    }

    fn node_type_response(&self) -> GetNodeTypeResponse {
        GetNodeTypeResponse {
            id: self.node_id.clone(),
            result: self.node_type.to_string(),
        }
    }

    fn full_mempool_response(&self) -> RpcResult<GetFullMempoolResponse> {
        let reader = self
            .context
            .mempool
            .as_ref()
            .ok_or_else(|| RpcError::Unavailable("Mempool reader not attached".to_string()))?;

        let snapshot = reader.load();
        let response = GetFullMempoolResponse {
            transaction_records: snapshot.records.clone(),
        };

        let size = response.encoded_len();
        if size > self.max_message_size {
            return Err(RpcError::ResponseTooLarge {
                size,
                limit: self.max_message_size,
            });
        }

        slog::debug!(
            self.context.logger,
            "Serving full mempool";
            "records" => response.transaction_records.len(),
            "published_at_ms" => snapshot.published_at_ms,
            "bytes" => size,
        );

        Ok(response)
    }
}

#[tonic::async_trait]
impl NodeReadService for NodeReadServiceImpl {
    async fn get_node_type(
        &self,
        _request: Request<GetNodeTypeRequest>,
    ) -> Result<Response<GetNodeTypeResponse>, Status> {
        slog::debug!(self.context.logger, "Serving node type"; "node_type" => %self.node_type);
        Ok(Response::new(self.node_type_response()))
    }

    async fn get_full_mempool(
        &self,
        _request: Request<GetFullMempoolRequest>,
    ) -> Result<Response<GetFullMempoolResponse>, Status> {
        match self.full_mempool_response() {
            Ok(response) => Ok(Response::new(response)),
            Err(err) => {
                slog::warn!(self.context.logger, "GetFullMempool failed"; "error" => %err);
                Err(err.into())
            }
        }
    }
}
