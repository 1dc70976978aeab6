//! Procurement order tests
//!
//! Tests for supplier-fulfilled purchase orders including:
//! - Supplier delivery updates and the closed received state
//! - Admin-only receipt confirmation
//! - Server-side order totals

use proptest::prelude::*;
use rust_decimal::Decimal;
use shared::{
    confirm_receipt, procurement_total, update_delivery_status, validate_procurement_line,
    DeliveryStatus, DeliveryTimestamp, Role, TransitionPolicy, DELIVERY_PROGRESSION,
};
use std::str::FromStr;

fn dec(s: &str) -> Decimal {
    Decimal::from_str(s).unwrap()
}

// ============================================================================
// Property Test Strategies
// ============================================================================

fn delivery_status_strategy() -> impl Strategy<Value = DeliveryStatus> {
    (0usize..4).prop_map(|i| DELIVERY_PROGRESSION[i])
}

fn role_strategy() -> impl Strategy<Value = Role> {
    prop_oneof![Just(Role::Admin), Just(Role::Supplier), Just(Role::Customer)]
}

/// Prices with two decimal places between 0.01 and 10,000.00
fn unit_price_strategy() -> impl Strategy<Value = Decimal> {
    (1i64..=1_000_000i64).prop_map(|cents| Decimal::new(cents, 2))
}

// ============================================================================
// Unit Tests
// ============================================================================

#[cfg(test)]
mod unit_tests {
    use super::*;

    #[test]
    fn test_total_ten_at_twenty_five() {
        assert_eq!(procurement_total(10, dec("25.00")), Some(dec("250.00")));
    }

    #[test]
    fn test_extreme_price_rejected_without_panicking() {
        let price = dec("79228162514264337593543950335");
        assert_eq!(
            validate_procurement_line(2, price),
            Err(("unit_price", "Unit price is too large"))
        );
        assert_eq!(procurement_total(2, price), None);
    }

    #[test]
    fn test_admin_confirms_delivered_order() {
        let t = confirm_receipt(DeliveryStatus::Delivered, Role::Admin).unwrap();
        assert_eq!(t.from, DeliveryStatus::Delivered);
        assert_eq!(t.to, DeliveryStatus::Received);
        assert_eq!(t.stamp, Some(DeliveryTimestamp::ReceivedAt));
    }

    #[test]
    fn test_supplier_cannot_confirm_receipt() {
        let err = confirm_receipt(DeliveryStatus::Delivered, Role::Supplier).unwrap_err();
        assert!(err.is_permission_error());
    }

    #[test]
    fn test_delivered_stamps_delivered_at() {
        let t = update_delivery_status(
            DeliveryStatus::Pending,
            DeliveryStatus::Delivered,
            Role::Supplier,
            TransitionPolicy::ForwardOnly,
        )
        .unwrap();
        assert_eq!(t.stamp.map(|s| s.column()), Some("delivered_at"));
    }

    #[test]
    fn test_in_transit_stamps_nothing() {
        let t = update_delivery_status(
            DeliveryStatus::Pending,
            DeliveryStatus::InTransit,
            Role::Supplier,
            TransitionPolicy::ForwardOnly,
        )
        .unwrap();
        assert_eq!(t.stamp, None);
    }

    #[test]
    fn test_delivery_status_wire_names() {
        assert_eq!("in_transit".parse::<DeliveryStatus>(), Ok(DeliveryStatus::InTransit));
        assert!("shipped".parse::<DeliveryStatus>().is_err());
        assert_eq!(
            serde_json::to_string(&DeliveryStatus::Received).unwrap(),
            "\"received\""
        );
    }
}

// ============================================================================
// Property Tests
// ============================================================================

#[cfg(test)]
mod property_tests {
    use super::*;

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(200))]

        /// total_amount = quantity x unit_price
        #[test]
        fn prop_total_is_quantity_times_price(
            quantity in 1i32..=10_000,
            unit_price in unit_price_strategy()
        ) {
            prop_assert!(validate_procurement_line(quantity, unit_price).is_ok());
            let total = procurement_total(quantity, unit_price).unwrap();
            prop_assert_eq!(total, unit_price * Decimal::from(quantity));
            prop_assert!(total >= unit_price);
        }

        /// Any accepted line has a representable total
        #[test]
        fn prop_accepted_line_total_never_overflows(
            quantity in 1i32..=i32::MAX,
            cents in 1i64..=999_999_999_999i64
        ) {
            let unit_price = Decimal::new(cents, 2);
            prop_assert!(validate_procurement_line(quantity, unit_price).is_ok());
            prop_assert!(procurement_total(quantity, unit_price).is_some());
        }

        /// Only an admin confirms receipt, and only from delivered
        #[test]
        fn prop_confirm_receipt_is_admin_only(
            current in delivery_status_strategy(),
            role in role_strategy()
        ) {
            let result = confirm_receipt(current, role);
            prop_assert_eq!(
                result.is_ok(),
                role == Role::Admin && current == DeliveryStatus::Delivered
            );
        }

        /// No role can reach received through the status update path
        #[test]
        fn prop_update_never_sets_received(
            current in delivery_status_strategy(),
            role in role_strategy()
        ) {
            for policy in [TransitionPolicy::ForwardOnly, TransitionPolicy::Permissive] {
                prop_assert!(
                    update_delivery_status(current, DeliveryStatus::Received, role, policy).is_err()
                );
            }
        }

        /// A received order is closed to supplier updates
        #[test]
        fn prop_received_is_closed(requested in delivery_status_strategy()) {
            prop_assert!(update_delivery_status(
                DeliveryStatus::Received,
                requested,
                Role::Supplier,
                TransitionPolicy::Permissive,
            )
            .is_err());
        }

        /// Forward-only updates never regress
        #[test]
        fn prop_forward_only_never_regresses(
            current in delivery_status_strategy(),
            requested in delivery_status_strategy()
        ) {
            if let Ok(t) = update_delivery_status(
                current,
                requested,
                Role::Supplier,
                TransitionPolicy::ForwardOnly,
            ) {
                prop_assert!(t.to.progress_index() >= t.from.progress_index());
            }
        }
    }
}
