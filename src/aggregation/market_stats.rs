// =============================================================================
// Market Stats — running aggregate state for a single market
// =============================================================================

use super::formulas::{percentage, vwap};
use crate::types::{MarketId, MarketSummary, TradeRecord};

/// Sums and counts for one market.  All fields only ever grow.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct MarketStats {
    pub trade_count: u64,
    /// Trades with `is_buy == true`.  Never exceeds `trade_count`.
    pub buy_count: u64,
    pub price_sum: f32,
    pub volume_sum: f32,
    /// Sum of `price * volume`, the VWAP numerator.
    pub notional_sum: f32,
}

impl MarketStats {
    /// Fold one trade into the running state.
    pub fn update(&mut self, trade: &TradeRecord) {
        self.price_sum += trade.price;
        self.notional_sum += trade.price * trade.volume;
        self.volume_sum += trade.volume;
        self.trade_count += 1;
        if trade.is_buy {
            self.buy_count += 1;
        }
    }

    /// Add another partial state for the same market into this one.
    #[cfg(test)]
    pub fn merge(&mut self, other: &MarketStats) {
        self.price_sum += other.price_sum;
        self.notional_sum += other.notional_sum;
        self.volume_sum += other.volume_sum;
        self.trade_count += other.trade_count;
        self.buy_count += other.buy_count;
    }

    /// Derive the output summary.  A state with no trades yields all zeros.
    pub fn summarize(&self, market: MarketId) -> MarketSummary {
        let (mean_price, mean_volume) = if self.trade_count == 0 {
            (0.0, 0.0)
        } else {
            let n = self.trade_count as f32;
            (self.price_sum / n, self.volume_sum / n)
        };

        MarketSummary {
            market,
            total_volume: self.volume_sum,
            mean_price,
            mean_volume,
            volume_weighted_average_price: vwap(self.notional_sum, self.volume_sum),
            percentage_buy: percentage(self.buy_count, self.trade_count),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn trade(price: f32, volume: f32, is_buy: bool) -> TradeRecord {
        TradeRecord {
            id: 0,
            market_id: 1,
            price,
            volume,
            is_buy,
        }
    }

    #[test]
    fn empty_state_summarises_to_zero() {
        let s = MarketStats::default().summarize(9);
        assert_eq!(s, MarketSummary { market: 9, ..Default::default() });
    }

    #[test]
    fn single_buy_trade() {
        let mut stats = MarketStats::default();
        stats.update(&trade(2.5, 40.0, true));
        let s = stats.summarize(1);
        assert_eq!(s.total_volume, 40.0);
        assert_eq!(s.mean_price, 2.5);
        assert_eq!(s.mean_volume, 40.0);
        assert_eq!(s.volume_weighted_average_price, 2.5);
        assert_eq!(s.percentage_buy, 1.0);
    }

    #[test]
    fn accumulates_counts_and_sums() {
        let mut stats = MarketStats::default();
        stats.update(&trade(1.0, 10.0, true));
        stats.update(&trade(2.0, 20.0, false));
        stats.update(&trade(3.0, 30.0, true));
        stats.update(&trade(6.0, 40.0, false));

        assert_eq!(stats.trade_count, 4);
        assert_eq!(stats.buy_count, 2);
        assert_eq!(stats.price_sum, 12.0);
        assert_eq!(stats.volume_sum, 100.0);
        assert_eq!(stats.notional_sum, 380.0);

        let s = stats.summarize(1);
        assert_eq!(s.total_volume, 100.0);
        assert_eq!(s.mean_price, 3.0);
        assert_eq!(s.mean_volume, 25.0);
        assert!((s.volume_weighted_average_price - 3.8).abs() < 1e-6);
        assert_eq!(s.percentage_buy, 0.5);
    }

    #[test]
    fn zero_volume_trades_give_zero_vwap() {
        let mut stats = MarketStats::default();
        stats.update(&trade(5.0, 0.0, false));
        stats.update(&trade(7.0, 0.0, true));
        let s = stats.summarize(1);
        assert_eq!(s.volume_weighted_average_price, 0.0);
        assert_eq!(s.mean_price, 6.0);
        assert_eq!(s.percentage_buy, 0.5);
    }

    #[test]
    fn merge_matches_sequential_update() {
        let trades = [
            trade(1.0, 10.0, true),
            trade(2.0, 5.0, false),
            trade(4.0, 1.0, true),
        ];

        let mut whole = MarketStats::default();
        trades.iter().for_each(|t| whole.update(t));

        let mut left = MarketStats::default();
        left.update(&trades[0]);
        let mut right = MarketStats::default();
        right.update(&trades[1]);
        right.update(&trades[2]);
        left.merge(&right);

        assert_eq!(left, whole);
    }
}
