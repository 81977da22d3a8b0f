//! txgate main entry point

use clap::Parser;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use tokio::runtime::Runtime;
use txgate_api::start_server;
use txgate_client::RemoteClient;
use txgate_config::Config;
use txgate_core::{FallbackStore, Gateway, GatewayOptions};

#[derive(Parser, Debug)]
#[command(name = "txgate")]
#[command(version)]
#[command(about = "Signed-request transaction history gateway with offline fallback", long_about = None)]
struct Args {
    /// Configuration file path (optional; environment variables are enough)
    #[arg(short, long, default_value = "config.yaml")]
    config: PathBuf,

    /// Print the default configuration file and exit
    #[arg(long)]
    print_default_config: bool,
}

fn main() -> ExitCode {
    dotenv::dotenv().ok();
    let args = Args::parse();

    if args.print_default_config {
        print!("{}", Config::generate_default());
        return ExitCode::SUCCESS;
    }

    let config = match Config::load_or_default(args.config.clone()) {
        Ok(config) => config,
        Err(e) => {
            // Logging is configured from the file we failed to read
            env_logger::init();
            log::error!("[{}] {}", e.code(), e);
            for hint in e.suggestions() {
                log::error!("  - {}", hint);
            }
            return ExitCode::FAILURE;
        }
    };

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(&config.logging.level)).init();

    match run(config) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("{:#}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(config: Config) -> anyhow::Result<()> {
    let store = match &config.fallback.dataset_path {
        Some(path) => FallbackStore::from_path(path)?,
        None => FallbackStore::bundled()?,
    };
    log::info!(
        "Fallback dataset loaded: {} records{}",
        store.len(),
        if config.fallback.use_mock { " (use_mock: upstream disabled)" } else { "" }
    );

    let client = RemoteClient::new(&config.upstream)?;
    log::info!(
        "Upstream: {} (timeout {}s)",
        config.upstream.base_url(),
        config.upstream.timeout_secs
    );

    let gateway = Gateway::new(
        Arc::new(client),
        Arc::new(store),
        GatewayOptions::from_config(&config),
    );

    let rt = Runtime::new()?;
    rt.block_on(start_server(Arc::new(config), Arc::new(gateway)))
}
