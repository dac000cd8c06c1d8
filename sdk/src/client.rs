//! Client for the node read service

use std::time::Duration;

use node_read_grpc::proto::node_read_service_client::NodeReadServiceClient;
use node_read_grpc::proto::{GetFullMempoolRequest, GetNodeTypeRequest, TransactionRecord};
use node_read_grpc::schema::DEFAULT_MAX_MESSAGE_SIZE;
use tonic::transport::{Channel, Endpoint};

use crate::error::{Error, Result};

/// Connection settings.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// gRPC endpoint, e.g. `http://localhost:50051`
    pub endpoint: String,
    /// Timeout for establishing the connection
    pub connect_timeout: Duration,
    /// Timeout applied to every request
    pub request_timeout: Duration,
    /// Largest response message accepted, in bytes
    pub max_message_size: usize,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            endpoint: "http://localhost:50051".to_string(),
            connect_timeout: Duration::from_secs(5),
            request_timeout: Duration::from_secs(30),
            max_message_size: DEFAULT_MAX_MESSAGE_SIZE,
        }
    }
}

/// Identity and role reported by a node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeTypeInfo {
    /// Node identifier.
    pub id: String,
    /// Node role, e.g. `full` or `validator`.
    pub node_type: String,
}

/// Client for node read operations.
#[derive(Clone)]
pub struct NodeReadClient {
    client: NodeReadServiceClient<Channel>,
}

impl NodeReadClient {
    /// Connect to a node with default settings.
    pub async fn connect(endpoint: impl Into<String>) -> Result<Self> {
        Self::connect_with_config(ClientConfig {
            endpoint: endpoint.into(),
            ..ClientConfig::default()
        })
        .await
    }

    /// Connect to a node.
    pub async fn connect_with_config(config: ClientConfig) -> Result<Self> {
        let channel = Endpoint::from_shared(config.endpoint.clone())
            .map_err(|_| Error::InvalidEndpoint(config.endpoint.clone()))?
            .connect_timeout(config.connect_timeout)
            .timeout(config.request_timeout)
            .connect()
            .await
            .map_err(Error::ConnectionFailed)?;

        Ok(Self::from_channel(channel, config.max_message_size))
    }

    /// Wrap an existing channel.
    pub fn from_channel(channel: Channel, max_message_size: usize) -> Self {
        Self {
            client: NodeReadServiceClient::new(channel)
                .max_decoding_message_size(max_message_size),
        }
    }

    /// Get the node's id and role.
    pub async fn node_type(&mut self) -> Result<NodeTypeInfo> {
        let response = self
            .client
            .get_node_type(GetNodeTypeRequest {})
            .await?
            .into_inner();

        Ok(NodeTypeInfo {
            id: response.id,
            node_type: response.result,
        })
    }

    /// Get every pending transaction, in the order the node reports them.
    pub async fn full_mempool(&mut self) -> Result<Vec<TransactionRecord>> {
        let response = self
            .client
            .get_full_mempool(GetFullMempoolRequest {})
            .await?
            .into_inner();

        Ok(response.transaction_records)
    }
}
