// Binary includes library modules - some public API items are only for library consumers
#![allow(unused)]

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{bail, Result};
use chrono::Utc;
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

mod app;
mod config;
mod data;
mod probe;
mod store;

use app::App;
use config::Settings;
use data::LayoutContext;
use probe::HttpProbe;
use store::{FileRepository, HistoryStore};

#[derive(Parser, Debug)]
#[command(name = "powerwatch")]
#[command(about = "Debounced power-status monitor with a timeline compiler")]
struct Args {
    /// Endpoint to probe (overrides settings file / POWERWATCH_URL)
    #[arg(short, long)]
    url: Option<String>,

    /// Path to a TOML settings file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Directory for the history document and monthly archives
    #[arg(short, long)]
    storage: Option<PathBuf>,

    /// Probe interval in seconds
    #[arg(short, long)]
    interval: Option<u64>,

    /// Compile the current timeline to a JSON file and exit
    #[arg(short, long)]
    export: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let args = Args::parse();

    let mut settings = Settings::load(args.config.as_deref())?;
    if let Some(url) = args.url {
        settings.url = url;
    }
    if let Some(storage) = args.storage {
        settings.storage_dir = storage;
    }
    if let Some(interval) = args.interval {
        settings.tick_interval_secs = interval;
    }

    let repo = FileRepository::new(&settings.storage_dir)?;
    let store = HistoryStore::open(Box::new(repo), Utc::now());

    // Handle export mode (non-interactive)
    if let Some(export_path) = args.export {
        return export_to_file(&store, &export_path, &settings).await;
    }

    if settings.url.is_empty() {
        bail!("no endpoint configured; pass --url or set POWERWATCH_URL");
    }

    let probe = HttpProbe::new(
        settings.url.clone(),
        Duration::from_secs(settings.probe_timeout_secs),
    );
    let tick_interval = chrono::Duration::seconds(settings.tick_interval_secs as i64);
    let mut app = App::new(Box::new(probe), store, tick_interval).await;

    info!(
        url = settings.url,
        interval_secs = settings.tick_interval_secs,
        storage = %settings.storage_dir.display(),
        "powerwatch started"
    );

    let mut ticker = tokio::time::interval(Duration::from_secs(settings.tick_interval_secs));
    ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
    loop {
        ticker.tick().await;
        app.tick().await;
    }
}

/// Compile the stored history into a timeline document and write it out.
async fn export_to_file(
    store: &HistoryStore,
    export_path: &std::path::Path,
    settings: &Settings,
) -> Result<()> {
    let now = Utc::now();
    let snapshot = store.snapshot(now).await;

    let ctx = LayoutContext {
        minutes_per_pixel: settings.minutes_per_pixel,
        line_height: settings.line_height,
        ..LayoutContext::for_now(now)
    };
    let timeline = data::compile(&snapshot.history, now, &ctx);

    let export = serde_json::json!({
        "generated_at": now,
        "snapshot": snapshot,
        "timeline": timeline,
    });
    std::fs::write(export_path, serde_json::to_string_pretty(&export)?)?;

    println!("Exported status timeline to: {}", export_path.display());
    Ok(())
}
