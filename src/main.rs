//! # Midtide Application Entry Point
//!
//! Fetches (or restores) the forecast for the configured spot, finds the
//! mid-tide surf sessions and books them on the calendar.
//!
//! Flags:
//! - `--offline`: use the saved forecast snapshot regardless of age
//! - `--dry-run`: print calendar events instead of creating them
//! - `--config <path>`: config file (default `midtide-config.toml`)

use anyhow::Context;
use chrono::Utc;
use std::env;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use midtide_lib::calendar::{CalendarEvent, EventSink};
use midtide_lib::config::Config;
use midtide_lib::forecast::{self, ForecastClient, ForecastSnapshot};
use midtide_lib::{find_sessions, renderer::draw_ascii};

/// Command line switches
struct Options {
    offline: bool,
    dry_run: bool,
    config_path: Option<String>,
}

impl Options {
    /// Parse switches from the arguments after the program name
    fn parse(args: &[String]) -> anyhow::Result<Self> {
        let config_path = match args.iter().position(|arg| arg == "--config") {
            Some(i) => match args.get(i + 1) {
                Some(path) if !path.starts_with("--") => Some(path.clone()),
                _ => anyhow::bail!("--config requires a path"),
            },
            None => None,
        };

        Ok(Options {
            offline: args.iter().any(|arg| arg == "--offline"),
            dry_run: args.iter().any(|arg| arg == "--dry-run"),
            config_path,
        })
    }
}

/// Main application entry point.
fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args: Vec<String> = env::args().skip(1).collect();
    let options = Options::parse(&args)?;
    let config = match &options.config_path {
        Some(path) => Config::load_from_path(path),
        None => Config::load(),
    };

    // Tokio runtime for the HTTP clients
    let rt = tokio::runtime::Runtime::new()?;
    rt.block_on(run(config, options))
}

async fn run(config: Config, options: Options) -> anyhow::Result<()> {
    let snapshot = load_forecast(&config, options.offline).await?;

    let now = snapshot
        .local_now(Utc::now())
        .context("snapshot has an unusable UTC offset")?;
    let sessions = find_sessions(&snapshot.bundle, &config.params, now);
    info!(
        spot = %config.spot.name,
        count = sessions.len(),
        "surf sessions found"
    );

    draw_ascii(&sessions);
    if sessions.is_empty() {
        return Ok(());
    }

    let sink = if options.dry_run || !config.calendar.enabled {
        EventSink::Stdout
    } else {
        EventSink::google(&config.calendar).context("loading calendar token")?
    };

    // One failed insert should not stop the rest
    for session in &sessions {
        let event = CalendarEvent::from_session(session, &config.calendar);
        if let Err(e) = sink.publish(&event).await {
            warn!(start = %session.start, error = %e, "could not create calendar event");
        }
    }

    Ok(())
}

async fn load_forecast(config: &Config, offline: bool) -> anyhow::Result<ForecastSnapshot> {
    if offline {
        return forecast::load_snapshot(&config.forecast.snapshot_path, None).with_context(|| {
            format!(
                "no saved forecast at {} (run once without --offline)",
                config.forecast.snapshot_path
            )
        });
    }

    let client = ForecastClient::new(config.forecast.base_url.as_str());
    let snapshot = forecast::fetch_or_load(&client, &config.spot, &config.forecast)
        .await
        .with_context(|| format!("fetching forecast for spot {}", config.spot.id))?;
    Ok(snapshot)
}
