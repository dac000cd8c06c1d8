//! gRPC service implementations.

mod node_read;

pub use node_read::NodeReadServiceImpl;
