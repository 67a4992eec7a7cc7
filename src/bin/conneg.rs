//! Conneg CLI binary.
//!
//! # Commands
//!
//! - `negotiate` - Classify an Accept header
//! - `rank` - Show the ranked preferences of an Accept header
//! - `sign` - Compute an API-key request signature
//! - `server` - Start the HTTP server

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use conneg::{
    config::Config,
    negotiation::{AcceptList, Negotiator},
    server::{Server, ServerConfig},
    VERSION,
};

#[derive(Parser)]
#[command(name = "conneg")]
#[command(version = VERSION)]
#[command(about = "HTTP content negotiation - Accept header ranking and decoder selection", long_about = None)]
struct Cli {
    /// Config file (default: <config dir>/conneg/config.toml)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the decoder family selected for an Accept header
    Negotiate {
        /// Header value (empty means no header)
        #[arg(default_value = "")]
        header: String,
    },

    /// Print the ranked preferences of an Accept header
    Rank {
        /// Header value
        header: String,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Compute the signature for an outbound request
    Sign {
        /// HTTP method
        #[arg(short, long, default_value = "GET")]
        method: String,

        /// Request path including query
        #[arg(short, long)]
        path: String,

        /// Request body
        #[arg(short, long, default_value = "")]
        body: String,

        /// Unix timestamp (default: now)
        #[arg(short, long)]
        timestamp: Option<i64>,

        /// Base64 secret (default: CONNEG_API_SECRET or config)
        #[arg(short, long)]
        secret: Option<String>,
    },

    /// Start the HTTP server
    Server {
        /// Listen port (overrides config)
        #[arg(short, long)]
        port: Option<u16>,

        /// Listen host (overrides config)
        #[arg(long)]
        host: Option<String>,

        /// Enable verbose logging
        #[arg(short, long)]
        verbose: bool,

        /// Log as JSON lines
        #[arg(long)]
        log_json: bool,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = Config::load(cli.config)?;

    match cli.command {
        Commands::Negotiate { header } => {
            let negotiator = config.negotiation.negotiator();
            println!("{}", negotiator.negotiate(&header));
        },
        Commands::Rank { header, json } => {
            cmd_rank(&config.negotiation.negotiator(), &header, json)?;
        },
        Commands::Sign {
            method,
            path,
            body,
            timestamp,
            secret,
        } => cmd_sign(&config, &method, &path, &body, timestamp, secret)?,
        Commands::Server {
            port,
            host,
            verbose,
            log_json,
        } => cmd_server(config, port, host, verbose, log_json)?,
    }

    Ok(())
}

fn cmd_rank(negotiator: &Negotiator, header: &str, json: bool) -> anyhow::Result<()> {
    let accepted = AcceptList::parse(header);
    let decode_type = negotiator.select(&accepted);

    if json {
        let output = serde_json::json!({
            "decode_type": decode_type,
            "dropped": accepted.dropped(),
            "preferences": accepted.entries(),
        });
        println!("{}", serde_json::to_string_pretty(&output)?);
        return Ok(());
    }

    println!("{:<4} {:<32} {:<6} EXTENSIONS", "POS", "RANGE", "Q");
    for entry in &accepted {
        let extensions = entry
            .extensions
            .iter()
            .map(|(k, v)| format!("{k}={v}"))
            .collect::<Vec<_>>()
            .join(";");
        println!(
            "{:<4} {:<32} {:<6.3} {}",
            entry.position,
            entry.essence(),
            entry.quality,
            extensions
        );
    }
    if accepted.dropped() > 0 {
        println!("({} malformed range(s) dropped)", accepted.dropped());
    }
    println!("decoder: {decode_type}");

    Ok(())
}

fn cmd_sign(
    config: &Config,
    method: &str,
    path: &str,
    body: &str,
    timestamp: Option<i64>,
    secret: Option<String>,
) -> anyhow::Result<()> {
    let secret = secret
        .or_else(|| config.auth.as_ref().map(|auth| auth.secret.clone()))
        .filter(|s| !s.is_empty())
        .ok_or_else(|| anyhow::anyhow!("No secret given. Use --secret or CONNEG_API_SECRET"))?;
    let timestamp = timestamp
        .unwrap_or_else(|| chrono::Utc::now().timestamp())
        .to_string();

    let sig = conneg::auth::signature(
        &secret,
        &method.to_uppercase(),
        path,
        body.as_bytes(),
        &timestamp,
    )?;

    println!("timestamp: {timestamp}");
    println!("signature: {sig}");
    Ok(())
}

fn cmd_server(
    mut config: Config,
    port: Option<u16>,
    host: Option<String>,
    verbose: bool,
    log_json: bool,
) -> anyhow::Result<()> {
    // Initialize logging
    let log_level = if verbose { "debug" } else { "info" };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(log_level));
    if log_json {
        tracing_subscriber::fmt().json().with_env_filter(filter).init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }

    if let Some(port) = port {
        config.server.port = port;
    }
    if let Some(host) = host {
        config.server.host = host;
    }

    let server = Server::new(ServerConfig::from_config(&config)?);

    let runtime = tokio::runtime::Runtime::new()?;
    runtime.block_on(server.run())?;
    Ok(())
}
