use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use clap::{Args, Parser, Subcommand};
use node_read_grpc::JsonReadOptions;
use node_read_sdk::{MessageKind, NodeReadClient, TransactionRecord};

#[derive(Parser)]
#[command(name = "node-read", about = "Node read service CLI", version)]
struct Cli {
    /// gRPC endpoint of a node
    #[arg(long, short, global = true, default_value = "http://localhost:50051", env = "NODE_READ_ENDPOINT")]
    endpoint: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Show the node's id and role
    NodeType,
    /// List pending transactions
    Mempool {
        /// One line per transaction instead of JSON
        #[arg(long)]
        summary: bool,
    },
    /// Decode a binary message to JSON (offline)
    Decode {
        #[arg(value_enum)]
        message: MessageKind,
        #[command(flatten)]
        input: BinaryInput,
    },
    /// Encode a JSON message to hex binary (offline)
    Encode {
        #[arg(value_enum)]
        message: MessageKind,
        /// Message as proto3 JSON
        json: String,
        /// Reject unknown JSON fields
        #[arg(long)]
        strict: bool,
    },
}

/// Where binary input comes from
#[derive(Args)]
#[group(required = true, multiple = false)]
struct BinaryInput {
    /// Message bytes as hex
    #[arg(long)]
    hex: Option<String>,
    /// File holding the raw message bytes
    #[arg(long)]
    file: Option<PathBuf>,
}

impl BinaryInput {
    fn read(self) -> Result<Vec<u8>> {
        match (self.hex, self.file) {
            (Some(hex), _) => hex::decode(hex.trim()).context("invalid hex input"),
            (None, Some(path)) => {
                std::fs::read(&path).with_context(|| format!("failed to read {}", path.display()))
            }
            (None, None) => bail!("either --hex or --file is required"),
        }
    }
}

fn print_record(record: &TransactionRecord) {
    let token = record
        .token
        .as_ref()
        .map(|token| token.symbol.as_str())
        .unwrap_or("-");
    println!(
        "{}  {} -> {}  amount={} token={} nonce={} approvals={}/{}",
        record.id,
        record.sender_address,
        record.receiver_address,
        record.amount,
        token,
        record.nonce,
        record.approving_validators().len(),
        record.validators.len(),
    );
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    match cli.command {
        Command::NodeType => {
            let mut client = NodeReadClient::connect(cli.endpoint.as_str()).await?;
            let info = client.node_type().await?;
            println!("id:        {}", info.id);
            println!("node_type: {}", info.node_type);
        }
        Command::Mempool { summary } => {
            let mut client = NodeReadClient::connect(cli.endpoint.as_str()).await?;
            let records = client.full_mempool().await?;
            if summary {
                println!("pending: {}", records.len());
                for record in &records {
                    print_record(record);
                }
            } else {
                let response = node_read_grpc::proto::GetFullMempoolResponse {
                    transaction_records: records,
                };
                let json = node_read_grpc::WireMessage::to_json(&response);
                println!("{}", serde_json::to_string_pretty(&json)?);
            }
        }
        Command::Decode { message, input } => {
            let bytes = input.read()?;
            let json = message
                .binary_to_json(&bytes)
                .with_context(|| format!("failed to decode {}", message.type_name()))?;
            println!("{}", serde_json::to_string_pretty(&json)?);
        }
        Command::Encode {
            message,
            json,
            strict,
        } => {
            let options = if strict {
                JsonReadOptions::strict()
            } else {
                JsonReadOptions::default()
            };
            let bytes = message
                .json_to_binary(&json, &options)
                .with_context(|| format!("failed to encode {}", message.type_name()))?;
            println!("{}", hex::encode(bytes));
        }
    }
    Ok(())
}
