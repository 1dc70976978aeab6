//! Inventory tests
//!
//! Tests for the stock ledger including:
//! - Signed deltas per transaction type
//! - The floor at zero and the reported deficit
//! - Low-stock and out-of-stock detection

use proptest::prelude::*;
use shared::{
    apply_stock_delta, is_low_stock, stock_delta, stock_level, validate_transaction_quantity,
    StockLevel, TransactionType,
};

// ============================================================================
// Property Test Strategies
// ============================================================================

fn transaction_type_strategy() -> impl Strategy<Value = TransactionType> {
    prop_oneof![
        Just(TransactionType::Purchase),
        Just(TransactionType::Sale),
        Just(TransactionType::Adjustment),
        Just(TransactionType::Return),
    ]
}

/// Non-zero quantities as they could be typed into the form
fn quantity_strategy() -> impl Strategy<Value = i32> {
    prop_oneof![-100_000i32..=-1, 1i32..=100_000]
}

// ============================================================================
// Unit Tests
// ============================================================================

#[cfg(test)]
mod unit_tests {
    use super::*;

    #[test]
    fn test_transaction_type_names() {
        for (name, kind) in [
            ("purchase", TransactionType::Purchase),
            ("sale", TransactionType::Sale),
            ("adjustment", TransactionType::Adjustment),
            ("return", TransactionType::Return),
        ] {
            assert_eq!(name.parse::<TransactionType>().unwrap(), kind);
            assert_eq!(kind.to_string(), name);
        }
        assert!("transfer".parse::<TransactionType>().is_err());
    }

    #[test]
    fn test_sale_of_more_than_stock_clamps() {
        let delta = stock_delta(TransactionType::Sale, 8);
        let adjustment = apply_stock_delta(5, delta);

        assert_eq!(adjustment.delta, -8);
        assert_eq!(adjustment.new_stock, 0);
        assert_eq!(adjustment.clamped, 3);
    }

    #[test]
    fn test_negative_adjustment_keeps_sign() {
        let adjustment = apply_stock_delta(20, stock_delta(TransactionType::Adjustment, -5));
        assert_eq!(adjustment.new_stock, 15);
        assert_eq!(adjustment.clamped, 0);
    }

    #[test]
    fn test_zero_quantity_rejected() {
        assert!(validate_transaction_quantity(0).is_err());
        assert!(validate_transaction_quantity(1).is_ok());
    }

    #[test]
    fn test_low_stock_boundaries() {
        assert!(is_low_stock(10, 10));
        assert!(!is_low_stock(11, 10));
        assert_eq!(stock_level(0, 10), StockLevel::OutOfStock);
        assert_eq!(stock_level(4, 10), StockLevel::Low);
        assert_eq!(stock_level(50, 10), StockLevel::Healthy);
    }
}

// ============================================================================
// Property Tests
// ============================================================================

#[cfg(test)]
mod property_tests {
    use super::*;

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(500))]

        /// sale/return -> -|q|; purchase/adjustment -> q
        #[test]
        fn prop_delta_sign_rule(
            kind in transaction_type_strategy(),
            quantity in quantity_strategy()
        ) {
            let delta = stock_delta(kind, quantity);
            match kind {
                TransactionType::Sale | TransactionType::Return => {
                    prop_assert_eq!(delta, -quantity.abs())
                }
                TransactionType::Purchase | TransactionType::Adjustment => {
                    prop_assert_eq!(delta, quantity)
                }
            }
        }

        /// new_stock = max(0, s + d), never negative
        #[test]
        fn prop_new_stock_floor(
            stock in 0i32..=1_000_000,
            kind in transaction_type_strategy(),
            quantity in quantity_strategy()
        ) {
            let delta = stock_delta(kind, quantity);
            let adjustment = apply_stock_delta(stock, delta);

            prop_assert!(adjustment.new_stock >= 0);
            prop_assert_eq!(adjustment.new_stock, (stock + delta).max(0));
        }

        /// The deficit dropped by the floor is accounted for exactly
        #[test]
        fn prop_clamped_deficit_accounted(
            stock in 0i32..=1_000,
            delta in -5_000i32..=5_000
        ) {
            let adjustment = apply_stock_delta(stock, delta);
            prop_assert_eq!(
                i64::from(adjustment.new_stock) - adjustment.clamped,
                i64::from(stock) + i64::from(delta)
            );
            prop_assert!(adjustment.clamped >= 0);
        }

        /// Out of stock is always also low stock
        #[test]
        fn prop_out_of_stock_is_low(min_level in 0i32..=1_000) {
            prop_assert!(is_low_stock(0, min_level));
            prop_assert_eq!(stock_level(0, min_level), StockLevel::OutOfStock);
        }
    }
}
