//! CLI entry point - the composition root.

use std::process::ExitCode;
use std::time::Duration;

use clap::{CommandFactory, Parser};
use tracing_subscriber::EnvFilter;

use parley_cli::config::load_config;
use parley_cli::handlers;
use parley_cli::{Cli, CliError, Commands};

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let Some(command) = cli.command else {
        Cli::command().print_help()?;
        return Ok(());
    };

    let file = cli.config.as_deref();
    let overrides = cli.overrides.to_update();

    match command {
        Commands::Replay {
            script,
            reply_ms,
            json,
        } => {
            let config = load_config(file, &overrides)?;
            let args = handlers::replay::ReplayArgs {
                script,
                reply_duration: Duration::from_millis(reply_ms),
                json,
            };
            handlers::replay::execute(config, args).await?;
        }
        Commands::Classify {
            text,
            confidence,
            tokens,
            json,
        } => {
            let config = load_config(file, &overrides)?;
            handlers::classify::execute(config, &text, confidence, &tokens, json)?;
        }
        Commands::Config { command } => {
            handlers::config::execute(command, file, &overrides)?;
        }
    }

    Ok(())
}

#[tokio::main]
async fn main() -> ExitCode {
    // Load .env before parsing so clap `env` fallbacks see it
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e:#}");
            let code = e.downcast_ref::<CliError>().map_or(1, CliError::exit_code);
            ExitCode::from(u8::try_from(code).unwrap_or(1))
        }
    }
}
