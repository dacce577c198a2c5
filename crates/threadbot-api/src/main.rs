//! threadbot CLI entry point.
//!
//! Binary name: `threadbot`
//!
//! Loads `.env`, parses CLI arguments, initializes tracing, loads the config
//! and dispatches to the command handler.

mod cli;
mod state;

use clap::Parser;
use clap_complete::generate;

use cli::{Cli, Commands};
use state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // A missing .env is normal in production; the real environment wins.
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();

    threadbot_observe::init_tracing(cli.log_filter(), cli.otel)
        .map_err(|e| anyhow::anyhow!("failed to initialize tracing: {e}"))?;

    let result = dispatch(cli).await;
    threadbot_observe::shutdown_tracing();
    result
}

async fn dispatch(cli: Cli) -> anyhow::Result<()> {
    // Shell completions don't need config
    if let Commands::Completions { shell } = &cli.command {
        let mut cmd = <Cli as clap::CommandFactory>::command();
        generate(*shell, &mut cmd, "threadbot", &mut std::io::stdout());
        return Ok(());
    }

    let state = AppState::load(cli.config.as_deref()).await?;

    match cli.command {
        Commands::Run => {
            let engine = state.build_engine().await?;
            cli::run::run_once(&engine, cli.json, cli.quiet).await?;
        }

        Commands::Schedule { every } => {
            let cadence = every.unwrap_or_else(|| state.config.schedule.clone());
            let engine = state.build_engine().await?;
            cli::schedule::schedule(engine, &cadence, cli.json).await?;
        }

        Commands::Show => {
            cli::thread::show_thread(&state, cli.json).await?;
        }

        Commands::Personas => {
            cli::persona::list_personas(&state, cli.json)?;
        }

        Commands::Completions { .. } => unreachable!("handled above"),
    }

    Ok(())
}
