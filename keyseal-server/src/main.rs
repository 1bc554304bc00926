//! keyseal command line
//!
//! Usage:
//!   keyseal serve --key-file <path> [--data-dir <dir> | --memory-store]
//!   keyseal generate-master-key --out <path>

use anyhow::Context;
use clap::Parser;
use keyseal_server::{run_server, write_master_key_file, Cli, Command};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .try_init();

    let cli = Cli::parse();

    match cli.command {
        Command::Serve(args) => {
            let config = args.into_config();
            run_server(config).await.context("keyseal server failed")?;
        }
        Command::GenerateMasterKey { out } => {
            write_master_key_file(&out)
                .with_context(|| format!("could not write master key to {}", out.display()))?;
        }
    }

    Ok(())
}
