//! notify-irc - post a CI event summary to an IRC channel and leave.

use clap::Parser;
use slirc_notify::app::{self, Outcome};
use slirc_notify::cli::Cli;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = cli.resolve()?;

    // --verbose forces debug; otherwise RUST_LOG, falling back to warnings only
    let filter = if config.output.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .init();

    info!(
        server = %config.irc.server,
        port = config.irc.port,
        channel = %config.irc.channel,
        event = %cli.event_name,
        ansicolor = config.output.ansicolor,
        "Starting notify-irc"
    );

    match app::run(&config, cli.event_kind(), &cli.eventpath).await {
        Ok(Outcome::Delivered) => info!("Notification delivered"),
        Ok(Outcome::NothingToSend) => info!("No notification for this event"),
        Err(e) => {
            error!(error = %e, code = e.error_code(), "Notification failed");
            return Err(e.into());
        }
    }
    Ok(())
}
