/// Tether - offline-first key/value sync from the command line
use anyhow::Context;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::time::Duration;
use tether_cli::{build_agent, commands, spawn_connectivity_probe, TetherConfig};
use tokio_util::sync::CancellationToken;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "tether")]
#[command(about = "Offline-first sync of application state", long_about = None)]
struct Cli {
    /// Configuration file path
    #[arg(short, long, global = true, env = "TETHER_CONFIG")]
    config: Option<PathBuf>,

    /// Never contact the remote store
    #[arg(long, global = true)]
    offline: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Save a JSON value under a key
    Save {
        /// Data key
        key: String,
        /// JSON value, e.g. '{"name":"A"}'
        value: String,
    },
    /// Print the value stored under a key
    Load {
        /// Data key
        key: String,
    },
    /// Show connectivity, pending writes and namespace
    Status,
    /// Push queued writes to the remote store
    Flush,
    /// Print the value of a key every time it is polled
    Watch {
        /// Data key
        key: String,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Logs go to stderr so stdout stays machine-readable
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "tether_cli=info,tether_sync=info,tether_remote=info,tether_cache=info".into()
            }),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    let config = TetherConfig::load(cli.config.as_deref()).context("Failed to load configuration")?;
    let host = build_agent(&config, cli.offline)
        .await
        .context("Failed to start sync agent")?;

    match cli.command {
        Commands::Save { key, value } => {
            let outcome = commands::save(&host.agent, &key, &value).await?;
            println!("{}", commands::render(&outcome, true)?);
        }
        Commands::Load { key } => {
            let value = commands::load(&host.agent, &key).await?;
            println!("{}", commands::render(&value, true)?);
        }
        Commands::Status => {
            let status = commands::status(&host.agent);
            println!("{}", commands::render(&status, true)?);
        }
        Commands::Flush => {
            let report = commands::flush(&host.agent).await?;
            println!("{}", commands::render(&report, true)?);
        }
        Commands::Watch { key } => {
            let stop = CancellationToken::new();

            if !cli.offline {
                spawn_connectivity_probe(
                    host.store.clone(),
                    host.connectivity.clone(),
                    Duration::from_secs(config.agent.poll_interval_secs),
                    stop.child_token(),
                );
            }

            let ctrl_c = stop.clone();
            tokio::spawn(async move {
                if tokio::signal::ctrl_c().await.is_ok() {
                    ctrl_c.cancel();
                }
            });

            commands::watch(&host.agent, &key, stop, |value| {
                match commands::render(&value, false) {
                    Ok(line) => println!("{}", line),
                    Err(e) => tracing::error!(error = %e, "Failed to render value"),
                }
            })
            .await?;
        }
    }

    host.agent.shutdown();
    Ok(())
}
