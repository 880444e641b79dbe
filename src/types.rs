// =============================================================================
// Shared types used across the tally pipeline
// =============================================================================

use serde::{Deserialize, Serialize};

/// Market identifier as it appears in the `market` field of a trade record.
pub type MarketId = i64;

/// A single decoded trade from the input stream.
///
/// Every field is required; a line missing any of them is rejected by the
/// reader instead of being filled with zeros.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct TradeRecord {
    pub id: i64,
    #[serde(rename = "market")]
    pub market_id: MarketId,
    pub price: f32,
    pub volume: f32,
    pub is_buy: bool,
}

/// Per-market output, derived on demand from the running aggregate state.
///
/// `market` is not part of the default output object; the reporter adds it
/// when `include_market` is enabled.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct MarketSummary {
    #[serde(skip)]
    pub market: MarketId,
    pub total_volume: f32,
    pub mean_price: f32,
    pub mean_volume: f32,
    pub volume_weighted_average_price: f32,
    pub percentage_buy: f32,
}

/// What to do with a line inside the stream that does not decode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MalformedPolicy {
    /// Log a warning, count the line, keep going.
    Skip,
    /// Fail the run.
    Abort,
}

impl Default for MalformedPolicy {
    fn default() -> Self {
        Self::Skip
    }
}

impl std::fmt::Display for MalformedPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Skip => write!(f, "skip"),
            Self::Abort => write!(f, "abort"),
        }
    }
}

impl std::str::FromStr for MalformedPolicy {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "skip" => Ok(Self::Skip),
            "abort" => Ok(Self::Abort),
            other => anyhow::bail!("unknown malformed policy: {other}"),
        }
    }
}
