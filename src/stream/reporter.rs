// =============================================================================
// Reporter — one JSON summary line per market
// =============================================================================

use serde::Serialize;
use tokio::io::{AsyncWrite, AsyncWriteExt};
use tracing::debug;

use crate::aggregation::AggregationEngine;
use crate::error::IngestError;
use crate::types::{MarketId, MarketSummary};

/// Output shape when the market id is requested alongside the summary.
#[derive(Serialize)]
struct KeyedSummary<'a> {
    market: MarketId,
    #[serde(flatten)]
    summary: &'a MarketSummary,
}

pub struct SummaryWriter<W> {
    out: W,
    include_market: bool,
}

impl<W: AsyncWrite + Unpin> SummaryWriter<W> {
    pub fn new(out: W, include_market: bool) -> Self {
        Self { out, include_market }
    }

    /// Encode one summary as a single JSON line.
    pub fn encode(&self, summary: &MarketSummary) -> Result<Vec<u8>, IngestError> {
        let mut line = if self.include_market {
            serde_json::to_vec(&KeyedSummary {
                market: summary.market,
                summary,
            })?
        } else {
            serde_json::to_vec(summary)?
        };
        line.push(b'\n');
        Ok(line)
    }

    /// Write a summary for every market in `engine`, ascending by market id,
    /// then flush.  Returns the number of lines written.
    pub async fn write_all(&mut self, engine: &AggregationEngine) -> Result<usize, IngestError> {
        let mut markets: Vec<MarketId> = engine.all_market_ids().collect();
        markets.sort_unstable();

        for market in &markets {
            let line = self.encode(&engine.summarize(*market))?;
            self.out.write_all(&line).await?;
        }
        self.out.flush().await?;

        debug!(markets = markets.len(), "summaries written");
        Ok(markets.len())
    }
}
