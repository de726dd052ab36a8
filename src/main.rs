//! Market Traction Engine: binary entrypoint
//! Loads calibration, taxonomy and a JSON signal snapshot, runs the engine once
//! and prints the run report as pretty JSON on stdout.
//!
//! Env:
//!   TRACTION_SNAPSHOT_PATH     snapshot file (else first CLI arg, else demos/snapshot.json)
//!   TRACTION_CALIBRATION_PATH  calibration TOML/JSON
//!   TRACTION_TAXONOMY_PATH     taxonomy JSON
//!   TRACTION_METRICS_DUMP=1    print Prometheus exposition to stderr after the run
//!   LOG_FORMAT=json            JSON logs instead of compact

use anyhow::Context;
use chrono::Utc;
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use market_traction::metrics::Metrics;
use market_traction::{Calibration, SnapshotRepository, Taxonomy, TractionEngine};

const ENV_SNAPSHOT_PATH: &str = "TRACTION_SNAPSHOT_PATH";
const DEFAULT_SNAPSHOT_PATH: &str = "demos/snapshot.json";

/// Logs go to stderr so stdout stays valid JSON.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("market_traction=info,warn"));

    let json = std::env::var("LOG_FORMAT")
        .map(|v| v.eq_ignore_ascii_case("json"))
        .unwrap_or(false);

    let registry = tracing_subscriber::registry().with(filter);
    if json {
        registry
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        registry
            .with(fmt::layer().compact().with_writer(std::io::stderr))
            .init();
    }
}

fn snapshot_path() -> PathBuf {
    std::env::var(ENV_SNAPSHOT_PATH)
        .ok()
        .or_else(|| std::env::args().nth(1))
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_SNAPSHOT_PATH))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env in local/dev; no-op when absent.
    let _ = dotenvy::dotenv();
    init_tracing();

    let metrics = match std::env::var("TRACTION_METRICS_DUMP").as_deref() {
        Ok("1") => Some(Metrics::install().context("installing prometheus recorder")?),
        _ => None,
    };

    let calibration = Calibration::load_default()?;
    let taxonomy = Taxonomy::load_default();
    let trend_window = calibration.trend.window();
    let engine = TractionEngine::new(calibration, taxonomy).context("building engine")?;

    let path = snapshot_path();
    let repo = SnapshotRepository::load_from(&path, trend_window)?;
    let now = repo.as_of().unwrap_or_else(Utc::now);
    let assets = repo.assets().to_vec();
    tracing::info!(path = %path.display(), assets = assets.len(), as_of = %now, "snapshot loaded");

    let report = engine.run(Arc::new(repo), &assets, now).await?;
    println!("{}", serde_json::to_string_pretty(&report)?);

    if let Some(m) = metrics {
        eprintln!("{}", m.render());
    }
    Ok(())
}
