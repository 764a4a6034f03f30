/*
[INPUT]:  CLI arguments, YAML configuration file, environment variables
[OUTPUT]: Login, session status, logout and network reports
[POS]:    Binary entry point
[UPDATE]: When changing CLI commands, flags, or startup flow
*/

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result, anyhow};
use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::EnvFilter;

use ijazah_adapter::config::ENV_PRIVATE_KEY;
use ijazah_adapter::{LocalKeyProvider, NetworkConfig, WalletConnector};
use ijazah_cli::{CliConfig, build_store, describe};

#[derive(Parser, Debug)]
#[command(name = "ijazah", version, about = "Diploma registry wallet login and session tool")]
struct Cli {
    #[arg(long = "config", value_name = "PATH")]
    config_path: Option<PathBuf>,
    #[arg(long = "log-level", value_name = "LEVEL", default_value = "info")]
    log_level: String,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Sign in with a local EVM key and persist the session
    Login {
        /// Environment variable holding the hex private key
        #[arg(long = "private-key-env", value_name = "VAR", default_value = ENV_PRIVATE_KEY)]
        private_key_env: String,
    },
    /// Restore the persisted session, revalidate it and print it
    Status,
    /// Clear the persisted session
    Logout,
    /// Print deployment network settings from the environment
    Network,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Cli::parse();
    init_tracing(&args.log_level)?;

    let config = load_config(args.config_path.as_ref())?;
    info!(api_base_url = %config.api_base_url, "configuration loaded");

    match args.command {
        Command::Login { private_key_env } => login(&config, &private_key_env).await,
        Command::Status => status(&config).await,
        Command::Logout => logout(&config).await,
        Command::Network => network(),
    }
}

async fn login(config: &CliConfig, private_key_env: &str) -> Result<()> {
    let private_key = std::env::var(private_key_env)
        .with_context(|| format!("{private_key_env} is not set"))?;
    let provider = LocalKeyProvider::new(&private_key).context("load private key")?;
    let wallet = WalletConnector::new(Arc::new(provider));

    let store = build_store(config)?;
    store.init().await;
    if store.is_authenticated() {
        info!("replacing existing session");
        store.logout().await;
    }

    let user = store.authenticate(&wallet).await.context("login")?;
    println!("signed in as {} ({})", user.address, user.role);
    Ok(())
}

async fn status(config: &CliConfig) -> Result<()> {
    let store = build_store(config)?;
    store.init().await;

    let snapshot = store.snapshot();
    println!("{}", describe(&snapshot));
    if let Some(user) = snapshot.user.as_ref().filter(|_| snapshot.is_authenticated()) {
        let active = store.check_session(&user.address).await;
        println!("backend session active: {active}");
    }
    Ok(())
}

async fn logout(config: &CliConfig) -> Result<()> {
    let store = build_store(config)?;
    store.init().await;
    store.logout().await;
    println!("signed out");
    Ok(())
}

fn network() -> Result<()> {
    let network = NetworkConfig::from_env().context("read network settings")?;
    println!("{network:#?}");
    let deployer = network.deployer_address().context("derive deployer address")?;
    println!("deployer address: {deployer}");
    Ok(())
}

fn init_tracing(log_level: &str) -> Result<()> {
    let filter = EnvFilter::try_new(log_level).context("invalid log level")?;
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .try_init()
        .map_err(|err| anyhow!(err))
        .context("initialize tracing subscriber")?;
    Ok(())
}

fn load_config(path: Option<&PathBuf>) -> Result<CliConfig> {
    match path {
        Some(path) => CliConfig::from_file(path).context("load config"),
        None => Ok(CliConfig::default()),
    }
}
