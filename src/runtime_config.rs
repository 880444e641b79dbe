// =============================================================================
// Runtime Configuration — sentinels, malformed-line policy, output options
// =============================================================================
//
// Loaded from an optional JSON file, then overridden from the environment.
// All fields carry `#[serde(default)]` so a partial (or empty) file is valid.
//
// =============================================================================

use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::types::{MalformedPolicy, MarketId};

// =============================================================================
// Default-value helpers (required by serde `default = "..."` attribute)
// =============================================================================

fn default_begin_marker() -> String {
    "BEGIN".to_string()
}

fn default_end_marker() -> String {
    "END".to_string()
}

// =============================================================================
// TallyConfig
// =============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TallyConfig {
    /// Line that opens the trade stream.  Everything before it is ignored.
    #[serde(default = "default_begin_marker")]
    pub begin_marker: String,

    /// Line that closes the trade stream.
    #[serde(default = "default_end_marker")]
    pub end_marker: String,

    /// Skip or abort on lines that fail to decode.
    #[serde(default)]
    pub malformed_policy: MalformedPolicy,

    /// Prefix each output object with its `market` id.
    #[serde(default)]
    pub include_market: bool,

    /// Log the raw aggregate state of this market at the end of the run.
    #[serde(default)]
    pub debug_market: Option<MarketId>,
}

impl Default for TallyConfig {
    fn default() -> Self {
        Self {
            begin_marker: default_begin_marker(),
            end_marker: default_end_marker(),
            malformed_policy: MalformedPolicy::default(),
            include_market: false,
            debug_market: None,
        }
    }
}

impl TallyConfig {
    /// Load configuration from a JSON file at `path`.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read tally config from {}", path.display()))?;

        let config: Self = serde_json::from_str(&content)
            .with_context(|| format!("failed to parse tally config from {}", path.display()))?;

        info!(
            path = %path.display(),
            malformed_policy = %config.malformed_policy,
            include_market = config.include_market,
            "tally config loaded"
        );

        Ok(config)
    }

    /// Load from `path`, falling back to defaults with a warning.
    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        Self::load(path).unwrap_or_else(|e| {
            warn!(error = %e, "failed to load config, using defaults");
            Self::default()
        })
    }

    /// Apply `TALLY_*` overrides.  `lookup` is `std::env::var` in production.
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(v) = lookup("TALLY_BEGIN_MARKER") {
            self.begin_marker = v;
        }
        if let Some(v) = lookup("TALLY_END_MARKER") {
            self.end_marker = v;
        }
        if let Some(v) = lookup("TALLY_MALFORMED_POLICY") {
            self.malformed_policy = v
                .parse::<MalformedPolicy>()
                .context("invalid TALLY_MALFORMED_POLICY")?;
        }
        if let Some(v) = lookup("TALLY_INCLUDE_MARKET") {
            self.include_market = parse_flag(&v)
                .with_context(|| format!("invalid TALLY_INCLUDE_MARKET: {v}"))?;
        }
        if let Some(v) = lookup("TALLY_DEBUG_MARKET") {
            let v = v.trim();
            self.debug_market = if v.is_empty() {
                None
            } else {
                let market = v
                    .parse::<MarketId>()
                    .with_context(|| format!("invalid TALLY_DEBUG_MARKET: {v}"))?;
                Some(market)
            };
        }
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        if self.begin_marker.is_empty() || self.end_marker.is_empty() {
            anyhow::bail!("begin and end markers must be non-empty");
        }
        if self.begin_marker == self.end_marker {
            anyhow::bail!("begin and end markers must differ (both are {:?})", self.begin_marker);
        }
        Ok(())
    }
}

fn parse_flag(v: &str) -> Option<bool> {
    match v.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
