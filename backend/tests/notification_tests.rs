//! Notification feed tests
//!
//! Tests for role-scoped procurement alerts including:
//! - Admin alerts for delivered orders, capped at five
//! - Supplier alerts for their own pending orders
//! - Empty feed for customers

use proptest::prelude::*;
use shared::{
    actionable_status, derive_notifications, summarize_awaiting, DeliveryStatus, NotificationKind,
    ProcurementNotice, Role, NOTIFICATION_LIMIT,
};
use uuid::Uuid;

fn notice(number: usize, status: DeliveryStatus, supplier_id: Uuid) -> ProcurementNotice {
    ProcurementNotice {
        id: Uuid::new_v4(),
        order_number: format!("PO-{}", number),
        product_name: format!("Item {}", number),
        supplier_id,
        delivery_status: status,
    }
}

// ============================================================================
// Property Test Strategies
// ============================================================================

fn delivery_status_strategy() -> impl Strategy<Value = DeliveryStatus> {
    prop_oneof![
        Just(DeliveryStatus::Pending),
        Just(DeliveryStatus::InTransit),
        Just(DeliveryStatus::Delivered),
        Just(DeliveryStatus::Received),
    ]
}

// ============================================================================
// Unit Tests
// ============================================================================

#[cfg(test)]
mod unit_tests {
    use super::*;

    #[test]
    fn test_admin_entry_shape() {
        let supplier = Uuid::new_v4();
        let orders = vec![notice(7, DeliveryStatus::Delivered, supplier)];

        let list = derive_notifications(Role::Admin, Uuid::new_v4(), &orders);
        assert_eq!(list.len(), 1);

        let entry = &list[0];
        assert_eq!(entry.id, orders[0].id.to_string());
        assert_eq!(entry.kind, NotificationKind::Procurement);
        assert_eq!(entry.title, "Delivery Confirmation Needed");
        assert_eq!(entry.message, "Order PO-7 - Item 7");
        assert_eq!(entry.link, "/dashboard/stock");
    }

    #[test]
    fn test_actionable_status_per_role() {
        assert_eq!(actionable_status(Role::Admin), Some(DeliveryStatus::Delivered));
        assert_eq!(actionable_status(Role::Supplier), Some(DeliveryStatus::Pending));
        assert_eq!(actionable_status(Role::Customer), None);
    }

    #[test]
    fn test_admin_summary_message() {
        let summary = summarize_awaiting(Role::Admin, 2).unwrap();
        assert_eq!(
            summary.message,
            "2 procurement orders delivered and awaiting confirmation"
        );
        assert!(summarize_awaiting(Role::Customer, 4).is_none());
    }
}

// ============================================================================
// Property Tests
// ============================================================================

#[cfg(test)]
mod property_tests {
    use super::*;

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(100))]

        /// N delivered orders -> admin list has min(N, 5) entries
        #[test]
        fn prop_admin_list_is_capped(n in 0usize..20) {
            let supplier = Uuid::new_v4();
            let orders: Vec<_> = (0..n)
                .map(|i| notice(i, DeliveryStatus::Delivered, supplier))
                .collect();

            let list = derive_notifications(Role::Admin, Uuid::new_v4(), &orders);
            prop_assert_eq!(list.len(), n.min(NOTIFICATION_LIMIT));
        }

        /// Suppliers only ever see their own pending orders
        #[test]
        fn prop_supplier_sees_own_pending(
            statuses in proptest::collection::vec((delivery_status_strategy(), any::<bool>()), 0..15)
        ) {
            let me = Uuid::new_v4();
            let other = Uuid::new_v4();
            let orders: Vec<_> = statuses
                .iter()
                .enumerate()
                .map(|(i, (status, mine))| notice(i, *status, if *mine { me } else { other }))
                .collect();

            let list = derive_notifications(Role::Supplier, me, &orders);
            let expected = orders
                .iter()
                .filter(|o| o.supplier_id == me && o.delivery_status == DeliveryStatus::Pending)
                .count()
                .min(NOTIFICATION_LIMIT);

            prop_assert_eq!(list.len(), expected);
            for entry in &list {
                prop_assert_eq!(entry.title.as_str(), "New Procurement Order");
            }
        }

        /// Customers never receive procurement notifications
        #[test]
        fn prop_customer_feed_empty(
            statuses in proptest::collection::vec(delivery_status_strategy(), 0..10)
        ) {
            let me = Uuid::new_v4();
            let orders: Vec<_> = statuses
                .iter()
                .enumerate()
                .map(|(i, status)| notice(i, *status, me))
                .collect();

            prop_assert!(derive_notifications(Role::Customer, me, &orders).is_empty());
        }
    }
}
