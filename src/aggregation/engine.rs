// =============================================================================
// Aggregation Engine — per-market running statistics
// =============================================================================
//
// Owns one `MarketStats` per market id seen.  Ingestion (`apply`) and
// queries (`summarize`, `all_market_ids`) happen in two separate phases; the
// engine is never read while the stream is still being applied.

use std::collections::HashMap;

use tracing::trace;

use super::market_stats::MarketStats;
use crate::types::{MarketId, MarketSummary, TradeRecord};

#[derive(Debug, Default)]
pub struct AggregationEngine {
    markets: HashMap<MarketId, MarketStats>,
}

impl AggregationEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply one trade.  Unknown markets are created zeroed on first sight.
    pub fn apply(&mut self, trade: &TradeRecord) {
        let stats = self.markets.entry(trade.market_id).or_default();
        stats.update(trade);
        trace!(
            market = trade.market_id,
            id = trade.id,
            trade_count = stats.trade_count,
            "trade applied"
        );
    }

    /// Summary for `market`.  A market that was never seen summarises to zeros.
    pub fn summarize(&self, market: MarketId) -> MarketSummary {
        self.markets
            .get(&market)
            .map(|stats| stats.summarize(market))
            .unwrap_or(MarketSummary {
                market,
                ..Default::default()
            })
    }

    /// Raw state for `market`, if any trade for it has been applied.
    pub fn stats(&self, market: MarketId) -> Option<&MarketStats> {
        self.markets.get(&market)
    }

    /// Every market id with state.  Order is unspecified.
    pub fn all_market_ids(&self) -> impl Iterator<Item = MarketId> + '_ {
        self.markets.keys().copied()
    }

    pub fn market_count(&self) -> usize {
        self.markets.len()
    }

    /// Fold another engine's state into this one, market by market.
    #[cfg(test)]
    pub fn merge(&mut self, other: AggregationEngine) {
        for (market, stats) in other.markets {
            self.markets.entry(market).or_default().merge(&stats);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn trade(id: i64, market_id: MarketId, price: f32, volume: f32, is_buy: bool) -> TradeRecord {
        TradeRecord {
            id,
            market_id,
            price,
            volume,
            is_buy,
        }
    }

    #[test]
    fn unknown_market_is_zero_summary() {
        let engine = AggregationEngine::new();
        let s = engine.summarize(42);
        assert_eq!(s.market, 42);
        assert_eq!(s.total_volume, 0.0);
        assert_eq!(s.mean_price, 0.0);
        assert_eq!(s.mean_volume, 0.0);
        assert_eq!(s.volume_weighted_average_price, 0.0);
        assert_eq!(s.percentage_buy, 0.0);
        assert!(engine.stats(42).is_none());
    }

    #[test]
    fn single_trade_summary() {
        let mut engine = AggregationEngine::new();
        engine.apply(&trade(1, 3, 1.25, 8.0, true));
        let s = engine.summarize(3);
        assert_eq!(s.total_volume, 8.0);
        assert_eq!(s.mean_price, 1.25);
        assert_eq!(s.mean_volume, 8.0);
        assert_eq!(s.volume_weighted_average_price, 1.25);
        assert_eq!(s.percentage_buy, 1.0);
    }

    #[test]
    fn interleaving_markets_does_not_change_state() {
        let a1 = trade(1, 1, 2.0, 10.0, true);
        let b1 = trade(2, 2, 7.0, 3.0, false);
        let a2 = trade(3, 1, 4.0, 10.0, false);

        let mut first = AggregationEngine::new();
        for t in [a1, b1, a2] {
            first.apply(&t);
        }
        let mut second = AggregationEngine::new();
        for t in [a1, a2, b1] {
            second.apply(&t);
        }

        assert_eq!(first.stats(1), second.stats(1));
        assert_eq!(first.stats(2), second.stats(2));
        assert_eq!(first.summarize(1), second.summarize(1));
    }

    #[test]
    fn tracks_every_market_id() {
        let mut engine = AggregationEngine::new();
        assert_eq!(engine.market_count(), 0);
        for (i, m) in [5, 1, 5, 9, 1].into_iter().enumerate() {
            engine.apply(&trade(i as i64, m, 1.0, 1.0, false));
        }
        let mut ids: Vec<_> = engine.all_market_ids().collect();
        ids.sort_unstable();
        assert_eq!(ids, vec![1, 5, 9]);
        assert_eq!(engine.market_count(), 3);
        assert_eq!(engine.stats(5).map(|s| s.trade_count), Some(2));
    }

    #[test]
    fn merge_of_shards_equals_single_pass() {
        let trades = [
            trade(1, 1, 2.0, 10.0, true),
            trade(2, 2, 3.0, 1.0, true),
            trade(3, 1, 4.0, 10.0, false),
            trade(4, 3, 1.0, 2.0, false),
        ];

        let mut single = AggregationEngine::new();
        trades.iter().for_each(|t| single.apply(t));

        let mut shard_a = AggregationEngine::new();
        let mut shard_b = AggregationEngine::new();
        for t in &trades {
            if t.market_id % 2 == 0 {
                shard_a.apply(t);
            } else {
                shard_b.apply(t);
            }
        }
        shard_a.merge(shard_b);

        assert_eq!(shard_a.market_count(), single.market_count());
        for market in single.all_market_ids() {
            assert_eq!(shard_a.stats(market), single.stats(market));
        }
    }
}
