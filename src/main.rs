use std::path::PathBuf;

use clap::Parser;
use hopgraph::{config, server};

/// hopgraph - connection manager, SQL console and hop-graph API
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// YAML configuration file (environment variables are used when omitted)
    #[arg(long)]
    config: Option<PathBuf>,

    /// HTTP server host address
    #[arg(long)]
    http_host: Option<String>,

    /// HTTP server port
    #[arg(long)]
    http_port: Option<u16>,

    /// JSON file holding the connection profiles
    #[arg(long)]
    profiles_path: Option<PathBuf>,

    /// Per-request timeout in seconds
    #[arg(long)]
    request_timeout_secs: Option<u64>,

    /// Row limit for /hops when the request does not give one
    #[arg(long)]
    default_hop_limit: Option<i64>,
}

impl From<Cli> for config::CliConfig {
    fn from(cli: Cli) -> Self {
        config::CliConfig {
            http_host: cli.http_host,
            http_port: cli.http_port,
            profiles_path: cli.profiles_path,
            request_timeout_secs: cli.request_timeout_secs,
            default_hop_limit: cli.default_hop_limit,
        }
    }
}

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    // Defaults to INFO level, can be overridden with RUST_LOG env var
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    log::info!("hopgraph v{}", env!("CARGO_PKG_VERSION"));

    let base = match &cli.config {
        Some(path) => config::ServerConfig::from_yaml_file(path),
        None => config::ServerConfig::from_env(),
    };
    let config = match base.and_then(|base| base.apply_cli(cli.into())) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Configuration error: {}", e);
            std::process::exit(1);
        }
    };

    if let Err(e) = server::run_with_config(config).await {
        log::error!("{:#}", e);
        std::process::exit(1);
    }
}
