//! Shared helpers for the node read service integration tests.

#![allow(dead_code)]

use std::net::SocketAddr;

use node_read_grpc::config::{NodeType, RpcConfig};
use node_read_grpc::mempool::{MempoolReader, MempoolWriter};
use node_read_grpc::proto::node_read_service_client::NodeReadServiceClient;
use node_read_grpc::proto::{Token, TransactionRecord};
use node_read_grpc::server::{ReadOnlyContext, RpcServer};
use slog::{Logger, o};
use tokio::net::TcpListener;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tonic::transport::Channel;

/// A running server on an ephemeral localhost port.
///
/// The server is stopped when the handle is dropped.
pub struct TestServer {
    /// Address the server is bound to
    pub addr: SocketAddr,
    /// Writer half of the mempool snapshot the server reads
    pub mempool: MempoolWriter,
    shutdown: Option<oneshot::Sender<()>>,
    handle: Option<JoinHandle<Result<(), tonic::transport::Error>>>,
}

impl TestServer {
    /// `http://` endpoint for clients.
    pub fn endpoint(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// Connect a raw generated client.
    pub async fn node_read_client(
        &mut self,
    ) -> Result<NodeReadServiceClient<Channel>, tonic::transport::Error> {
        NodeReadServiceClient::connect(self.endpoint()).await
    }

    /// Stop the server and wait for it to exit.
    pub async fn stop(mut self) -> Result<(), tonic::transport::Error> {
        if let Some(shutdown) = self.shutdown.take() {
            let _ = shutdown.send(());
        }
        match self.handle.take() {
            Some(handle) => handle.await.expect("server task panicked"),
            None => Ok(()),
        }
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        if let Some(shutdown) = self.shutdown.take() {
            let _ = shutdown.send(());
        }
    }
}

pub fn test_logger() -> Logger {
    Logger::root(slog::Discard, o!())
}

pub fn test_config() -> RpcConfig {
    RpcConfig {
        node_id: "test-node".to_string(),
        node_type: NodeType::Full,
        ..RpcConfig::default()
    }
}

/// Spawn a server with the default test config and an attached mempool.
pub async fn spawn_test_server() -> TestServer {
    spawn_test_server_with(test_config(), true).await
}

/// Spawn a server with `config`. When `attach_mempool` is false the server
/// runs without a mempool reader.
pub async fn spawn_test_server_with(config: RpcConfig, attach_mempool: bool) -> TestServer {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let (reader, writer) = MempoolReader::new();
    let mempool = attach_mempool.then_some(reader);
    let context = ReadOnlyContext::new(mempool, test_logger());

    let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();
    let server = RpcServer::new(config, context);
    let handle = tokio::spawn(async move {
        server
            .serve_with_listener(listener, async {
                let _ = shutdown_rx.await;
            })
            .await
    });

    TestServer {
        addr,
        mempool: writer,
        shutdown: Some(shutdown_tx),
        handle: Some(handle),
    }
}

/// A fully populated pending transaction.
pub fn sample_record(id: &str, nonce: u64) -> TransactionRecord {
    let mut record = TransactionRecord {
        id: id.to_string(),
        timestamp: 1_700_000_000_000 + nonce as i64,
        sender_address: format!("sender-{id}"),
        sender_public_key: format!("pk-{id}"),
        receiver_address: format!("receiver-{id}"),
        token: Some(Token::new("Versatus", "VRRB", 18)),
        amount: 1_000 * (nonce + 1),
        signature: format!("sig-{id}"),
        nonce,
        ..Default::default()
    };
    record.validators.insert("validator-a".to_string(), true);
    record.validators.insert("validator-b".to_string(), false);
    record
}
