use anyhow::{Context, Result};
use clap::Parser;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use webcam_common::{config::log_level_from_env, Config};
use webcam_scout::scheduler::{CycleOutcome, Scheduler};
use webcam_scout::scout::Scout;

#[derive(Parser, Debug)]
#[command(name = "webcam-scout", about = "Discovers live webcams on YouTube and serves them as an M3U playlist")]
struct Cli {
    /// Run a single cycle without the web server, then exit
    #[arg(long)]
    once: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(log_level_from_env())),
        )
        .init();

    info!("Webcam scout starting...");

    let config = Config::from_env()?;
    config.log_redacted();

    let scout = Scout::from_config(&config);
    let mut scheduler = Scheduler::new(scout, config.update_interval());

    if cli.once {
        return match scheduler.run_cycle().await {
            CycleOutcome::Completed(_) => Ok(()),
            CycleOutcome::Failed(e) => Err(e.context("Cycle failed")),
        };
    }

    // Bind before the first cycle so a bad address fails fast.
    let addr = config.web_addr();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;

    let playlist_path = config.playlist_path.clone();
    tokio::spawn(async move {
        if let Err(e) = webcam_api::serve(listener, playlist_path).await {
            error!(error = %e, "Web server stopped");
        }
    });

    scheduler.run().await;
    Ok(())
}
