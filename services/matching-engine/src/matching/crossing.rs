//! Crossing detection
//!
//! A taker BUY crosses a resting SELL when its price is at or above the
//! maker's; a taker SELL crosses a resting BUY when its price is at or
//! below. Comparisons are integer ticks.

use types::numeric::Price;
use types::order::Side;

/// Check whether an aggressing order can trade against the given maker price.
pub fn crosses(taker_side: Side, taker_price: Price, maker_price: Price) -> bool {
    match taker_side {
        Side::Buy => taker_price >= maker_price,
        Side::Sell => taker_price <= maker_price,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_buy_crosses_at_or_above() {
        assert!(crosses(Side::Buy, Price::new(101), Price::new(100)));
        assert!(crosses(Side::Buy, Price::new(100), Price::new(100)));
        assert!(!crosses(Side::Buy, Price::new(99), Price::new(100)));
    }

    #[test]
    fn test_sell_crosses_at_or_below() {
        assert!(crosses(Side::Sell, Price::new(99), Price::new(100)));
        assert!(crosses(Side::Sell, Price::new(100), Price::new(100)));
        assert!(!crosses(Side::Sell, Price::new(101), Price::new(100)));
    }
}
