// =============================================================================
// Aggregation Module
// =============================================================================
//
// Running per-market statistics.  Every trade updates its market's state in
// constant time; summaries are derived from that state only when asked for.

pub mod engine;
pub mod formulas;
pub mod market_stats;

pub use engine::AggregationEngine;
