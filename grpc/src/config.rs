//! gRPC server configuration.

use std::net::SocketAddr;
use std::path::Path;
use std::time::Duration;

use anyhow::Result;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};

use crate::schema::DEFAULT_MAX_MESSAGE_SIZE;

/// Network environment for the node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Network {
    /// Production mainnet.
    Mainnet,
    /// Public testnet.
    Testnet,
    /// Local development network.
    #[default]
    Local,
}

impl std::fmt::Display for Network {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Network::Mainnet => write!(f, "mainnet"),
            Network::Testnet => write!(f, "testnet"),
            Network::Local => write!(f, "local"),
        }
    }
}

/// Role this node plays in the network, reported by `GetNodeType`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeType {
    /// Keeps full state and serves reads.
    #[default]
    Full,
    /// Tracks headers only.
    Light,
    /// Keeps full history.
    Archive,
    /// Produces blocks.
    Miner,
    /// Votes on transaction validity.
    Validator,
    /// Executes work delegated by validators.
    Farmer,
    /// Entry point for peer discovery.
    Bootstrap,
}

impl std::fmt::Display for NodeType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            NodeType::Full => "full",
            NodeType::Light => "light",
            NodeType::Archive => "archive",
            NodeType::Miner => "miner",
            NodeType::Validator => "validator",
            NodeType::Farmer => "farmer",
            NodeType::Bootstrap => "bootstrap",
        };
        f.write_str(name)
    }
}

/// Configuration for the RPC server.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RpcConfig {
    /// Address to listen on (e.g., "0.0.0.0:50051")
    #[serde(with = "socket_addr_serde")]
    pub listen_addr: SocketAddr,
    /// Identifier reported in `GetNodeTypeResponse.id`
    pub node_id: String,
    /// Node role reported in `GetNodeTypeResponse.result`
    pub node_type: NodeType,
    /// Network environment (mainnet, testnet, local)
    pub network: Network,
    /// Maximum concurrent streams per connection
    pub max_concurrent_streams: u32,
    /// Request timeout in seconds
    pub request_timeout_secs: u64,
    /// Largest request or response message accepted, in bytes
    pub max_message_size: usize,
    /// slog level name (e.g. "info", "debug")
    pub log_level: String,
}

impl Default for RpcConfig {
    fn default() -> Self {
        Self {
            listen_addr: SocketAddr::from(([0, 0, 0, 0], 50051)),
            node_id: "node-0".to_string(),
            node_type: NodeType::Full,
            network: Network::Local,
            max_concurrent_streams: 100,
            request_timeout_secs: 30,
            max_message_size: DEFAULT_MAX_MESSAGE_SIZE,
            log_level: "info".to_string(),
        }
    }
}

impl RpcConfig {
    /// Load configuration from a file path.
    ///
    /// Only TOML is supported. Environment variables with the `NODE_READ_`
    /// prefix override file values; nested keys are separated by `__`.
    ///
    /// # Example config (TOML)
    /// ```toml
    /// [grpc]
    /// listen_addr = "0.0.0.0:50051"
    /// node_id = "node-0"
    /// node_type = "full"
    /// network = "local"
    /// max_concurrent_streams = 100
    /// request_timeout_secs = 30
    /// max_message_size = 4194304
    /// log_level = "info"
    /// ```
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();

        let mut figment = Figment::new();

        // Detect file format based on extension
        if let Some(ext) = path.extension().and_then(|e| e.to_str()) {
            figment = match ext {
                "toml" => figment.merge(Toml::file(path)),
                _ => {
                    return Err(anyhow::anyhow!(
                        "Unsupported config file format: {}. Use .toml",
                        ext
                    ));
                }
            };
        } else {
            return Err(anyhow::anyhow!("Config file must have a .toml extension"));
        }

        // Environment variables take precedence over file config
        Self::extract(figment.merge(env_overrides()))
    }

    /// Load configuration from defaults and `NODE_READ_` environment
    /// variables only.
    pub fn from_env() -> Result<Self> {
        Self::extract(
            Figment::from(Serialized::default("grpc", RpcConfig::default())).merge(env_overrides()),
        )
    }

    fn extract(figment: Figment) -> Result<Self> {
        let config: RpcConfig = figment.extract_inner("grpc").map_err(anyhow::Error::msg)?;
        Ok(config)
    }

    /// Request timeout as a [`Duration`].
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

fn env_overrides() -> Env {
    Env::prefixed("NODE_READ_").split("__").map(|key| {
        // NODE_READ_LISTEN_ADDR -> grpc.listen_addr
        format!("grpc.{}", key.as_str().to_ascii_lowercase()).into()
    })
}

/// Custom serde module for SocketAddr to handle string serialization.
mod socket_addr_serde {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};
    use std::net::SocketAddr;

    pub fn serialize<S>(addr: &SocketAddr, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        addr.to_string().serialize(serializer)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<SocketAddr, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn network_display() {
        assert_eq!(Network::Mainnet.to_string(), "mainnet");
        assert_eq!(Network::Testnet.to_string(), "testnet");
        assert_eq!(Network::Local.to_string(), "local");
    }

    #[test]
    fn node_type_display_matches_serde() {
        let all = [
            NodeType::Full,
            NodeType::Light,
            NodeType::Archive,
            NodeType::Miner,
            NodeType::Validator,
            NodeType::Farmer,
            NodeType::Bootstrap,
        ];
        for node_type in all {
            let json = serde_json::to_string(&node_type).unwrap();
            assert_eq!(json, format!("\"{}\"", node_type));
            let parsed: NodeType = serde_json::from_str(&json).unwrap();
            assert_eq!(parsed, node_type);
        }
    }

    #[test]
    fn node_type_rejects_unknown_name() {
        assert!(serde_json::from_str::<NodeType>("\"oracle\"").is_err());
    }

    #[test]
    fn config_default_values() {
        let config = RpcConfig::default();
        assert_eq!(config.listen_addr.to_string(), "0.0.0.0:50051");
        assert_eq!(config.node_id, "node-0");
        assert_eq!(config.node_type, NodeType::Full);
        assert_eq!(config.network, Network::Local);
        assert_eq!(config.max_concurrent_streams, 100);
        assert_eq!(config.request_timeout(), Duration::from_secs(30));
        assert_eq!(config.max_message_size, DEFAULT_MAX_MESSAGE_SIZE);
    }

    #[test]
    fn config_serde_roundtrip() {
        let config = RpcConfig::default();
        let json = serde_json::to_string(&config).unwrap();
        let parsed: RpcConfig = serde_json::from_str(&json).unwrap();

        assert_eq!(config.listen_addr, parsed.listen_addr);
        assert_eq!(config.node_type, parsed.node_type);
        assert_eq!(config.node_id, parsed.node_id);
    }

    #[test]
    fn from_path_reads_toml_with_defaults() {
        figment::Jail::expect_with(|jail| {
            jail.create_file(
                "node.toml",
                "[grpc]\nlisten_addr = \"127.0.0.1:6000\"\nnode_id = \"validator-7\"\nnode_type = \"validator\"",
            )?;

            let config = RpcConfig::from_path("node.toml").map_err(|e| e.to_string())?;
            assert_eq!(config.listen_addr.to_string(), "127.0.0.1:6000");
            assert_eq!(config.node_id, "validator-7");
            assert_eq!(config.node_type, NodeType::Validator);
            // Unset keys fall back to defaults
            assert_eq!(config.request_timeout_secs, 30);
            assert_eq!(config.network, Network::Local);
            Ok(())
        });
    }

    #[test]
    fn from_path_env_overrides_file() {
        figment::Jail::expect_with(|jail| {
            jail.create_file(
                "node.toml",
                "[grpc]\nlisten_addr = \"127.0.0.1:6000\"\nnode_id = \"validator-7\"\nnode_type = \"full\"",
            )?;
            jail.set_env("NODE_READ_NODE_ID", "from-env");
            jail.set_env("NODE_READ_NODE_TYPE", "validator");
            jail.set_env("NODE_READ_MAX_MESSAGE_SIZE", "1024");
            jail.set_env("NODE_READ_ENDPOINT", "http://localhost:50051");

            let config = RpcConfig::from_path("node.toml").map_err(|e| e.to_string())?;
            assert_eq!(config.node_id, "from-env");
            assert_eq!(config.node_type, NodeType::Validator);
            assert_eq!(config.max_message_size, 1024);
            // Keys only in the file are kept
            assert_eq!(config.listen_addr.to_string(), "127.0.0.1:6000");
            Ok(())
        });
    }

    #[test]
    fn from_env_without_file() {
        figment::Jail::expect_with(|jail| {
            let config = RpcConfig::from_env().map_err(|e| e.to_string())?;
            assert_eq!(config.node_id, "node-0");
            assert_eq!(config.listen_addr.to_string(), "0.0.0.0:50051");

            jail.set_env("NODE_READ_LISTEN_ADDR", "127.0.0.1:7000");
            jail.set_env("NODE_READ_NETWORK", "testnet");
            jail.set_env("NODE_READ_REQUEST_TIMEOUT_SECS", "5");

            let config = RpcConfig::from_env().map_err(|e| e.to_string())?;
            assert_eq!(config.listen_addr.to_string(), "127.0.0.1:7000");
            assert_eq!(config.network, Network::Testnet);
            assert_eq!(config.request_timeout(), Duration::from_secs(5));
            assert_eq!(config.node_type, NodeType::Full);
            Ok(())
        });
    }

    #[test]
    fn from_path_rejects_bad_address() {
        figment::Jail::expect_with(|jail| {
            jail.create_file("node.toml", "[grpc]\nlisten_addr = \"not-an-address\"")?;
            assert!(RpcConfig::from_path("node.toml").is_err());
            Ok(())
        });
    }

    #[test]
    fn from_path_unsupported_extension() {
        let result = RpcConfig::from_path("config.json");
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("Unsupported"));
    }

    #[test]
    fn from_path_no_extension() {
        let result = RpcConfig::from_path("config");
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("extension"));
    }
}
