use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

mod commands;
mod output;
pub mod ux_error;

use commands::{Cli, Commands};
use ux_error::UxError;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)))
        .init();

    if let Err(err) = dispatch(cli.command).await {
        match err.downcast_ref::<UxError>() {
            Some(ux) => ux.display(),
            None => output::error(&format!("{err:#}")),
        }
        std::process::exit(1);
    }
}

async fn dispatch(command: Commands) -> Result<()> {
    match command {
        Commands::Run(args) => commands::run::run(args).await,
        Commands::Validate(args) => commands::validate::run(args),
        Commands::Sample(args) => commands::sample::run(args),
        Commands::Score(args) => commands::score::run(args),
    }
}
