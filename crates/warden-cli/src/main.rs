//! MCP Warden CLI — terminal demo/launcher for the validation pipeline.
//!
//! Not part of the core (the design: "CLI launchers... are not the core"); it
//! exists to exercise `Warden` end-to-end by validating newline-delimited
//! JSON-RPC messages read from stdin.

use std::io::Write as _;

use clap::Parser;
use serde_json::Value;
use warden_proto::{Message, WardenError};
use warden_transport::{Warden, WardenConfig};

#[derive(Parser)]
#[command(name = "warden")]
#[command(about = "MCP Warden - security validation middleware for the Model Context Protocol")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(clap::Subcommand)]
enum Commands {
    /// Validate newline-delimited JSON-RPC messages read from stdin, one
    /// decision per line written to stdout.
    Run,
    /// Print the default configuration's tunables.
    Status,
}

/// Writes each inbound value's wire form straight to stdout; `Warden`
/// forwards sanitized error responses and verbatim responses through here.
struct StdioTransport;

impl warden_transport::Transport for StdioTransport {
    async fn send(&self, message: Value) -> Result<(), WardenError> {
        let mut stdout = std::io::stdout();
        writeln!(stdout, "{message}").map_err(|e| WardenError::Internal(e.to_string()))?;
        stdout.flush().map_err(|e| WardenError::Internal(e.to_string()))
    }
}

fn print_forwarded(message: &Message) {
    println!(
        "{}",
        serde_json::json!({"forwarded": true, "method": message.method, "id": message.id})
    );
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();
    let cli = Cli::parse();

    match cli.command {
        Some(Commands::Status) | None => {
            let cfg = WardenConfig::default();
            println!("MCP Warden v{}", env!("CARGO_PKG_VERSION"));
            println!("burst_threshold: {}", cfg.behavior.burst_threshold);
            println!("per_minute_limit: {:?}", cfg.behavior.per_minute_limit);
            println!("per_hour_limit: {:?}", cfg.behavior.per_hour_limit);
            println!("contextual layer enabled: {}", cfg.enable_contextual);
        }
        Some(Commands::Run) => {
            let warden = Warden::new(WardenConfig::default(), StdioTransport, print_forwarded);
            let stdin = std::io::stdin();
            for line in std::io::BufRead::lines(stdin.lock()) {
                let line = line?;
                if line.trim().is_empty() {
                    continue;
                }
                let value: Value = match serde_json::from_str(&line) {
                    Ok(v) => v,
                    Err(err) => {
                        eprintln!("skipping invalid JSON line: {err}");
                        continue;
                    }
                };
                warden.handle_inbound(value).await?;
            }
        }
    }

    Ok(())
}
