// =============================================================================
// Summary formulas
// =============================================================================
//
// Both helpers return 0 instead of NaN/inf when the denominator is empty.

/// Ratio `num / den` as a fraction in [0, 1] for counts.
pub fn percentage(num: u64, den: u64) -> f32 {
    if den == 0 {
        return 0.0;
    }
    num as f32 / den as f32
}

/// Volume-weighted average price: `sum(price * volume) / sum(volume)`.
pub fn vwap(notional_sum: f32, volume_sum: f32) -> f32 {
    if volume_sum == 0.0 || notional_sum == 0.0 {
        return 0.0;
    }
    notional_sum / volume_sum
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn percentage_basic() {
        assert_eq!(percentage(1, 2), 0.5);
        assert_eq!(percentage(3, 3), 1.0);
        assert_eq!(percentage(0, 4), 0.0);
    }

    #[test]
    fn percentage_zero_denominator() {
        assert_eq!(percentage(0, 0), 0.0);
        assert_eq!(percentage(5, 0), 0.0);
    }

    #[test]
    fn vwap_basic() {
        // 2*10 + 4*10 over 20
        assert_eq!(vwap(60.0, 20.0), 3.0);
    }

    #[test]
    fn vwap_zero_guards() {
        assert_eq!(vwap(0.0, 10.0), 0.0);
        assert_eq!(vwap(10.0, 0.0), 0.0);
        assert!(!vwap(0.0, 0.0).is_nan());
    }
}
