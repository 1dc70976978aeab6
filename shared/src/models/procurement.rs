//! Procurement orders placed by the admin with suppliers
//!
//! Delivery moves `pending -> in_transit -> delivered -> received` with no
//! cancellation path. Suppliers report progress up to `delivered`; only an
//! admin confirms receipt.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::Role;
use crate::error::TransitionError;
use crate::types::{ParseEnumError, TransitionPolicy};

/// An internal purchase order from the admin to a supplier
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProcurementOrder {
    pub id: Uuid,
    pub order_number: String,
    pub admin_id: Uuid,
    pub supplier_id: Uuid,
    /// Snapshot of the product at ordering time, not a live reference
    pub product_name: String,
    pub product_sku: String,
    pub category: Option<String>,
    pub description: Option<String>,
    pub quantity: i32,
    pub unit_price: Decimal,
    pub total_amount: Decimal,
    pub delivery_status: DeliveryStatus,
    pub notes: Option<String>,
    pub ordered_at: DateTime<Utc>,
    pub delivered_at: Option<DateTime<Utc>>,
    pub received_at: Option<DateTime<Utc>>,
}

/// Fulfillment state of a procurement order
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum DeliveryStatus {
    Pending,
    InTransit,
    Delivered,
    Received,
}

pub const DELIVERY_PROGRESSION: [DeliveryStatus; 4] = [
    DeliveryStatus::Pending,
    DeliveryStatus::InTransit,
    DeliveryStatus::Delivered,
    DeliveryStatus::Received,
];

/// Statuses a supplier may report
pub const SUPPLIER_SETTABLE_STATUSES: [DeliveryStatus; 3] = [
    DeliveryStatus::Pending,
    DeliveryStatus::InTransit,
    DeliveryStatus::Delivered,
];

impl DeliveryStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            DeliveryStatus::Pending => "pending",
            DeliveryStatus::InTransit => "in_transit",
            DeliveryStatus::Delivered => "delivered",
            DeliveryStatus::Received => "received",
        }
    }

    /// Upper-case label shown on badges, e.g. "IN TRANSIT"
    pub fn label(&self) -> String {
        self.as_str().replace('_', " ").to_uppercase()
    }

    pub fn progress_index(&self) -> usize {
        match self {
            DeliveryStatus::Pending => 0,
            DeliveryStatus::InTransit => 1,
            DeliveryStatus::Delivered => 2,
            DeliveryStatus::Received => 3,
        }
    }
}

impl std::fmt::Display for DeliveryStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for DeliveryStatus {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(DeliveryStatus::Pending),
            "in_transit" => Ok(DeliveryStatus::InTransit),
            "delivered" => Ok(DeliveryStatus::Delivered),
            "received" => Ok(DeliveryStatus::Received),
            other => Err(ParseEnumError::new("delivery status", other)),
        }
    }
}

/// Timestamp columns on a procurement order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeliveryTimestamp {
    DeliveredAt,
    ReceivedAt,
}

impl DeliveryTimestamp {
    pub fn column(&self) -> &'static str {
        match self {
            DeliveryTimestamp::DeliveredAt => "delivered_at",
            DeliveryTimestamp::ReceivedAt => "received_at",
        }
    }
}

/// An accepted delivery status change
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeliveryTransition {
    pub from: DeliveryStatus,
    pub to: DeliveryStatus,
    pub stamp: Option<DeliveryTimestamp>,
}

/// Supplier progress report on a procurement order.
///
/// `received` can never be set here; that is [`confirm_receipt`]. Received
/// orders are closed to further updates.
pub fn update_delivery_status(
    current: DeliveryStatus,
    requested: DeliveryStatus,
    role: Role,
    policy: TransitionPolicy,
) -> Result<DeliveryTransition, TransitionError> {
    if role != Role::Supplier || !SUPPLIER_SETTABLE_STATUSES.contains(&requested) {
        return Err(TransitionError::RoleNotPermitted {
            role,
            requested: requested.as_str(),
        });
    }

    if current == DeliveryStatus::Received {
        return Err(invalid(current, requested));
    }

    if policy == TransitionPolicy::ForwardOnly
        && requested.progress_index() < current.progress_index()
    {
        return Err(invalid(current, requested));
    }

    let stamp = (requested == DeliveryStatus::Delivered && current != requested)
        .then_some(DeliveryTimestamp::DeliveredAt);

    Ok(DeliveryTransition {
        from: current,
        to: requested,
        stamp,
    })
}

/// Admin confirmation that a delivered order has arrived
pub fn confirm_receipt(
    current: DeliveryStatus,
    role: Role,
) -> Result<DeliveryTransition, TransitionError> {
    if role != Role::Admin {
        return Err(TransitionError::RoleNotPermitted {
            role,
            requested: DeliveryStatus::Received.as_str(),
        });
    }

    if current != DeliveryStatus::Delivered {
        return Err(invalid(current, DeliveryStatus::Received));
    }

    Ok(DeliveryTransition {
        from: current,
        to: DeliveryStatus::Received,
        stamp: Some(DeliveryTimestamp::ReceivedAt),
    })
}

/// Order total, computed server-side from the line values; `None` on overflow
pub fn procurement_total(quantity: i32, unit_price: Decimal) -> Option<Decimal> {
    Decimal::from(quantity).checked_mul(unit_price)
}

fn invalid(from: DeliveryStatus, to: DeliveryStatus) -> TransitionError {
    TransitionError::InvalidTransition {
        from: from.as_str(),
        to: to.as_str(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_labels() {
        assert_eq!(DeliveryStatus::InTransit.label(), "IN TRANSIT");
        assert_eq!(DeliveryStatus::Pending.label(), "PENDING");
    }

    #[test]
    fn test_supplier_marks_delivered() {
        let t = update_delivery_status(
            DeliveryStatus::InTransit,
            DeliveryStatus::Delivered,
            Role::Supplier,
            TransitionPolicy::ForwardOnly,
        )
        .unwrap();
        assert_eq!(t.stamp, Some(DeliveryTimestamp::DeliveredAt));
    }

    #[test]
    fn test_supplier_notes_only_update_keeps_status() {
        let t = update_delivery_status(
            DeliveryStatus::InTransit,
            DeliveryStatus::InTransit,
            Role::Supplier,
            TransitionPolicy::ForwardOnly,
        )
        .unwrap();
        assert_eq!(t.from, t.to);
        assert_eq!(t.stamp, None);
    }

    #[test]
    fn test_supplier_cannot_set_received() {
        let err = update_delivery_status(
            DeliveryStatus::Delivered,
            DeliveryStatus::Received,
            Role::Supplier,
            TransitionPolicy::Permissive,
        )
        .unwrap_err();
        assert!(err.is_permission_error());
    }

    #[test]
    fn test_admin_cannot_use_supplier_update() {
        assert!(update_delivery_status(
            DeliveryStatus::Pending,
            DeliveryStatus::InTransit,
            Role::Admin,
            TransitionPolicy::Permissive,
        )
        .is_err());
    }

    #[test]
    fn test_forward_only_blocks_regression() {
        assert!(update_delivery_status(
            DeliveryStatus::Delivered,
            DeliveryStatus::Pending,
            Role::Supplier,
            TransitionPolicy::ForwardOnly,
        )
        .is_err());
        assert!(update_delivery_status(
            DeliveryStatus::Delivered,
            DeliveryStatus::Pending,
            Role::Supplier,
            TransitionPolicy::Permissive,
        )
        .is_ok());
    }

    #[test]
    fn test_received_is_closed() {
        for policy in [TransitionPolicy::ForwardOnly, TransitionPolicy::Permissive] {
            assert!(update_delivery_status(
                DeliveryStatus::Received,
                DeliveryStatus::Delivered,
                Role::Supplier,
                policy,
            )
            .is_err());
        }
    }

    #[test]
    fn test_confirm_receipt_requires_delivered() {
        let t = confirm_receipt(DeliveryStatus::Delivered, Role::Admin).unwrap();
        assert_eq!(t.to, DeliveryStatus::Received);
        assert_eq!(t.stamp.map(|s| s.column()), Some("received_at"));

        assert!(confirm_receipt(DeliveryStatus::InTransit, Role::Admin).is_err());
        assert!(confirm_receipt(DeliveryStatus::Received, Role::Admin).is_err());
    }

    #[test]
    fn test_total_amount() {
        let total = procurement_total(10, Decimal::from_str("25.00").unwrap());
        assert_eq!(total, Some(Decimal::from_str("250.00").unwrap()));
    }

    #[test]
    fn test_total_overflow_is_reported() {
        assert_eq!(procurement_total(2, Decimal::MAX), None);
        assert_eq!(procurement_total(i32::MAX, crate::MAX_UNIT_PRICE).map(|t| t.scale()), Some(2));
    }
}
