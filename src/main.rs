use anyhow::{Context, Result};
use clap::Parser;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use seatchecker::checker::SeatChecker;
use seatchecker::config;
use seatchecker::event::CheckEvent;
use seatchecker::notifier::NtfyNotifier;
use seatchecker::ryanair::RyanairClient;

#[derive(Debug, Parser)]
#[command(author, version, about)]
struct Args {
    /// Path to YAML config file
    #[arg(long, default_value = "config.yaml")]
    config: PathBuf,

    /// Path to the event JSON; rewritten with the result after every check
    #[arg(long, default_value = "event.json")]
    event: PathBuf,

    /// Keep checking every `app.poll_interval_secs` until interrupted
    #[arg(long)]
    watch: bool,

    /// Print an example config and exit
    #[arg(long)]
    print_example_config: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_target(false)
        .compact()
        .init();

    let args = Args::parse();
    if args.print_example_config {
        print!("{}", config::example());
        return Ok(());
    }

    let cfg = config::load(Some(&args.config))
        .with_context(|| format!("failed to load config {}", args.config.display()))?;
    let airline = RyanairClient::from_config(&cfg).context("failed to build airline client")?;
    let notifier = NtfyNotifier::from_config(&cfg).context("failed to build ntfy client")?;
    let checker = SeatChecker::new(Arc::new(airline), Arc::new(notifier))
        .with_deadline(cfg.app.check_timeout());

    let cancel = CancellationToken::new();
    let interrupt = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("interrupt received; stopping");
            interrupt.cancel();
        }
    });

    loop {
        let event = read_event(&args.event).await?;
        let result = checker.run(event, &cancel).await;
        write_event(&args.event, &result).await?;
        if result.is_success() {
            info!(seats = ?result.seat_state, departure = %result.departure, "check succeeded");
        } else {
            warn!(message = %result.message, "check failed");
        }

        if !args.watch || cancel.is_cancelled() {
            break;
        }
        tokio::select! {
            _ = cancel.cancelled() => break,
            _ = tokio::time::sleep(cfg.app.poll_interval()) => {}
        }
    }

    Ok(())
}

async fn read_event(path: &Path) -> Result<CheckEvent> {
    let raw = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("failed to read event {}", path.display()))?;
    serde_json::from_str(&raw).with_context(|| format!("invalid event JSON in {}", path.display()))
}

/// Replace the event file atomically so an interrupted write never loses state.
async fn write_event(path: &Path, event: &CheckEvent) -> Result<()> {
    let body = serde_json::to_string_pretty(event)?;
    let tmp = path.with_extension("json.tmp");
    tokio::fs::write(&tmp, body)
        .await
        .with_context(|| format!("failed to write {}", tmp.display()))?;
    tokio::fs::rename(&tmp, path)
        .await
        .with_context(|| format!("failed to replace event {}", path.display()))?;
    Ok(())
}
