//! Standalone node read server.
//!
//! Serves `NodeReadService` from a TOML config, or from `NODE_READ_`
//! environment variables when no path is given. The mempool snapshot starts
//! empty; an embedding node publishes into it through the writer half.

use std::path::PathBuf;
use std::str::FromStr;

use anyhow::{Context, Result};
use node_read_grpc::config::RpcConfig;
use node_read_grpc::mempool::MempoolReader;
use node_read_grpc::server::{ReadOnlyContext, RpcServer};
use slog::{Drain, Level, Logger, o};

fn create_logger(level: &str) -> Logger {
    let log_level = std::env::var("RUST_LOG")
        .ok()
        .and_then(|env_str| Level::from_str(&env_str).ok())
        .or_else(|| Level::from_str(level).ok())
        .unwrap_or(Level::Info);

    let decorator = slog_term::TermDecorator::new().build();
    let drain = slog_term::FullFormat::new(decorator).build().fuse();
    let drain = slog_async::Async::new(drain)
        .build()
        .fuse()
        .filter_level(log_level)
        .fuse();

    slog::Logger::root(drain, o!("service" => "node-read"))
}

#[tokio::main]
async fn main() -> Result<()> {
    let config = match std::env::args_os().nth(1).map(PathBuf::from) {
        Some(path) => RpcConfig::from_path(&path)
            .with_context(|| format!("Failed to load config from {}", path.display()))?,
        None => RpcConfig::from_env().context("Failed to load config from environment")?,
    };

    let logger = create_logger(&config.log_level);
    let (mempool_reader, _mempool_writer) = MempoolReader::new();
    let context = ReadOnlyContext::new(Some(mempool_reader), logger.clone());

    let shutdown_logger = logger.clone();
    let shutdown = async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => slog::info!(shutdown_logger, "Shutdown requested"),
            Err(err) => {
                slog::warn!(shutdown_logger, "Ctrl+C handler unavailable"; "error" => %err);
                std::future::pending::<()>().await;
            }
        }
    };

    RpcServer::new(config, context)
        .serve_with_shutdown(shutdown)
        .await
        .context("gRPC server failed")?;

    slog::info!(logger, "gRPC server stopped");
    Ok(())
}
