//! Node read SDK - Rust client for the node read service
//!
//! # Quick Start
//!
//! ```ignore
//! use node_read_sdk::NodeReadClient;
//!
//! #[tokio::main]
//! async fn main() -> node_read_sdk::Result<()> {
//!     let mut client = NodeReadClient::connect("http://localhost:50051").await?;
//!
//!     let info = client.node_type().await?;
//!     println!("{} is a {} node", info.id, info.node_type);
//!
//!     for record in client.full_mempool().await? {
//!         println!("{} nonce={} amount={}", record.id, record.nonce, record.amount);
//!     }
//!
//!     Ok(())
//! }
//! ```

pub mod client;
pub mod error;
pub mod message;

// Re-exports for convenience
pub use client::{ClientConfig, NodeReadClient, NodeTypeInfo};
pub use error::{Error, Result};
pub use message::MessageKind;
pub use node_read_grpc::proto::{Token, TransactionRecord};
