//! gRPC server setup and configuration.

use std::future::Future;

use slog::Logger;
use tokio::net::TcpListener;
use tokio_stream::wrappers::TcpListenerStream;
use tonic::transport::Server;
use tonic::transport::server::Router;

use crate::config::RpcConfig;
use crate::mempool::MempoolReader;
use crate::proto::node_read_service_server::NodeReadServiceServer;
use crate::services::NodeReadServiceImpl;

/// Read-only context for services that only query state.
///
/// This context is `Send + Sync` and safe for use with tonic's async trait.
#[derive(Clone)]
pub struct ReadOnlyContext {
    /// Mempool snapshot reader (lock-free). `None` until a mempool is attached.
    pub mempool: Option<MempoolReader>,
    /// Logger
    pub logger: Logger,
}

impl ReadOnlyContext {
    /// Create a new read-only context.
    pub fn new(mempool: Option<MempoolReader>, logger: Logger) -> Self {
        Self { mempool, logger }
    }
}

/// gRPC server instance.
pub struct RpcServer {
    config: RpcConfig,
    context: ReadOnlyContext,
}

impl RpcServer {
    /// Create a new RPC server with the given configuration and context.
    pub fn new(config: RpcConfig, context: ReadOnlyContext) -> Self {
        Self { config, context }
    }

    /// Start the gRPC server on the configured address.
    ///
    /// This will block until the server is shut down.
    pub async fn serve(self) -> Result<(), tonic::transport::Error> {
        let addr = self.config.listen_addr;
        self.log_start(&addr.to_string());
        self.into_router().serve(addr).await
    }

    /// Start the gRPC server on the configured address and stop when
    /// `signal` resolves.
    pub async fn serve_with_shutdown<F>(self, signal: F) -> Result<(), tonic::transport::Error>
    where
        F: Future<Output = ()>,
    {
        let addr = self.config.listen_addr;
        self.log_start(&addr.to_string());
        self.into_router().serve_with_shutdown(addr, signal).await
    }

    /// Serve on an already bound listener (e.g. an ephemeral port) and stop
    /// when `signal` resolves. `listen_addr` from the config is ignored.
    pub async fn serve_with_listener<F>(
        self,
        listener: TcpListener,
        signal: F,
    ) -> Result<(), tonic::transport::Error>
    where
        F: Future<Output = ()>,
    {
        let addr = listener
            .local_addr()
            .map(|addr| addr.to_string())
            .unwrap_or_else(|_| "unknown".to_string());
        self.log_start(&addr);

        let incoming = TcpListenerStream::new(listener);
        self.into_router()
            .serve_with_incoming_shutdown(incoming, signal)
            .await
    }

    fn log_start(&self, addr: &str) {
        slog::info!(
            self.context.logger,
            "Starting gRPC server";
            "address" => addr,
            "node_id" => &self.config.node_id,
            "node_type" => %self.config.node_type,
            "network" => %self.config.network,
            "mempool_attached" => self.context.mempool.is_some(),
        );
    }

    fn into_router(self) -> Router {
        let max_message_size = self.config.max_message_size;
        let node_read_service = NodeReadServiceImpl::new(
            self.context,
            self.config.node_id.clone(),
            self.config.node_type,
            max_message_size,
        );

        let service = NodeReadServiceServer::new(node_read_service)
            .max_decoding_message_size(max_message_size)
            .max_encoding_message_size(max_message_size);

        Server::builder()
            .timeout(self.config.request_timeout())
            .max_concurrent_streams(self.config.max_concurrent_streams)
            .add_service(service)
    }
}
