// =============================================================================
// Pipeline — reader -> aggregation engine -> reporter
// =============================================================================
//
// Single sequential loop.  Records are applied in arrival order; summaries
// are written only after the stream has ended.

use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use tokio::io::{AsyncBufRead, AsyncWrite};
use tracing::{info, warn};

use crate::aggregation::AggregationEngine;
use crate::runtime_config::TallyConfig;
use crate::stream::{RecordReader, StreamEnd, SummaryWriter};
use crate::types::{MalformedPolicy, MarketId};

/// Diagnostics for one run.
#[derive(Debug, Clone)]
pub struct RunStats {
    pub started_at: DateTime<Utc>,
    pub elapsed: Duration,
    /// Records actually applied, independent of their `id` values.
    pub records_applied: u64,
    pub records_skipped: u64,
    pub markets: usize,
    /// `id` of the last applied record, if any.
    pub last_record_id: Option<i64>,
    pub lines_read: u64,
    pub end_marker_seen: bool,
}

/// Ingest every record from `input` into a fresh engine.
pub async fn ingest<R>(input: R, config: &TallyConfig) -> Result<(AggregationEngine, RunStats)>
where
    R: AsyncBufRead + Unpin,
{
    let started_at = Utc::now();
    let clock = Instant::now();

    let mut reader = RecordReader::new(input, &*config.begin_marker, &*config.end_marker);
    let mut engine = AggregationEngine::new();
    let mut applied = 0u64;
    let mut skipped = 0u64;
    let mut last_record_id = None;

    while let Some(item) = reader.next_record().await.context("failed to read trade stream")? {
        match item {
            Ok(trade) => {
                engine.apply(&trade);
                applied += 1;
                last_record_id = Some(trade.id);
            }
            Err(e) => match config.malformed_policy {
                MalformedPolicy::Skip => {
                    warn!(error = %e, "skipping malformed record");
                    skipped += 1;
                }
                MalformedPolicy::Abort => {
                    return Err(e).context("aborting run on malformed record");
                }
            },
        }
    }

    let stats = RunStats {
        started_at,
        elapsed: clock.elapsed(),
        records_applied: applied,
        records_skipped: skipped,
        markets: engine.market_count(),
        last_record_id,
        lines_read: reader.lines_read(),
        end_marker_seen: reader.stream_end() == Some(StreamEnd::Marker),
    };
    Ok((engine, stats))
}

/// Ingest `input`, write one summary per market to `output`, and return the
/// run diagnostics.
pub async fn run<R, W>(input: R, output: W, config: &TallyConfig) -> Result<RunStats>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let clock = Instant::now();
    let (engine, mut stats) = ingest(input, config).await?;

    if let Some(market) = config.debug_market {
        log_market_state(&engine, market);
    }

    let mut writer = SummaryWriter::new(output, config.include_market);
    writer
        .write_all(&engine)
        .await
        .context("failed to write market summaries")?;

    stats.elapsed = clock.elapsed();
    Ok(stats)
}

fn log_market_state(engine: &AggregationEngine, market: MarketId) {
    match engine.stats(market) {
        Some(state) => info!(
            market,
            state = ?state,
            summary = ?engine.summarize(market),
            "debug market state"
        ),
        None => warn!(market, "debug market has no trades"),
    }
}
