// =============================================================================
// Market Tally — Main Entry Point
// =============================================================================
//
// Reads a BEGIN/END delimited stream of JSON trades from stdin and writes one
// JSON summary per market to stdout.  Diagnostics go to stderr via tracing.
// =============================================================================

// ── Module declarations ──────────────────────────────────────────────────────
mod aggregation;
mod error;
mod pipeline;
mod runtime_config;
mod stream;
mod types;

use tokio::io::{BufReader, BufWriter};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use crate::runtime_config::TallyConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // ── 1. Environment & config ──────────────────────────────────────────
    let _ = dotenv::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let config_path =
        std::env::var("TALLY_CONFIG").unwrap_or_else(|_| "tally_config.json".into());
    let mut config = TallyConfig::load_or_default(&config_path);
    config.apply_overrides(|key| std::env::var(key).ok())?;
    config.validate()?;

    info!(
        begin_marker = %config.begin_marker,
        end_marker = %config.end_marker,
        malformed_policy = %config.malformed_policy,
        include_market = config.include_market,
        "market tally starting"
    );

    // ── 2. Ingest + report ───────────────────────────────────────────────
    let input = BufReader::new(tokio::io::stdin());
    let output = BufWriter::new(tokio::io::stdout());

    let stats = match pipeline::run(input, output, &config).await {
        Ok(stats) => stats,
        Err(e) => {
            error!(error = %format!("{e:#}"), "run failed");
            std::process::exit(1);
        }
    };

    // ── 3. Diagnostics ───────────────────────────────────────────────────
    info!(
        started_at = %stats.started_at,
        records_applied = stats.records_applied,
        records_skipped = stats.records_skipped,
        last_record_id = ?stats.last_record_id,
        lines_read = stats.lines_read,
        end_marker_seen = stats.end_marker_seen,
        "trade count: {}",
        stats.records_applied
    );
    info!(markets = stats.markets, "market count: {}", stats.markets);
    info!(elapsed = ?stats.elapsed, "duration: {:?}", stats.elapsed);

    Ok(())
}
