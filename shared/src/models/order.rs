//! Customer orders and the order status lifecycle
//!
//! Orders move `pending -> processing -> in_transit -> delivered -> received`.
//! `cancelled` is terminal and reachable from any non-terminal state. Staff
//! (admin and supplier) drive the fulfillment side; the customer only
//! confirms receipt of a delivered order.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::Role;
use crate::error::TransitionError;
use crate::types::{ParseEnumError, TransitionPolicy};

/// A customer order
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Order {
    pub id: Uuid,
    /// Display code, e.g. "ORD-1718000000000-k3j9x0a1b"
    pub order_number: String,
    pub customer_id: Uuid,
    pub supplier_id: Option<Uuid>,
    pub total_amount: Decimal,
    pub order_status: OrderStatus,
    #[serde(flatten)]
    pub timestamps: OrderTimestamps,
    pub customer_phone: Option<String>,
    pub customer_email: Option<String>,
    pub delivery_address: Option<String>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A line of an order; immutable once written
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderItem {
    pub id: Uuid,
    pub order_id: Uuid,
    pub product_id: Uuid,
    pub quantity: i32,
    pub unit_price: Decimal,
    pub subtotal: Decimal,
}

/// Order fulfillment status
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    Pending,
    Processing,
    InTransit,
    Delivered,
    Received,
    Cancelled,
}

/// Tracker checkpoints in lifecycle order
pub const ORDER_PROGRESSION: [OrderStatus; 5] = [
    OrderStatus::Pending,
    OrderStatus::Processing,
    OrderStatus::InTransit,
    OrderStatus::Delivered,
    OrderStatus::Received,
];

/// Statuses admins and suppliers may set directly
pub const STAFF_SETTABLE_STATUSES: [OrderStatus; 5] = [
    OrderStatus::Pending,
    OrderStatus::Processing,
    OrderStatus::InTransit,
    OrderStatus::Delivered,
    OrderStatus::Cancelled,
];

impl OrderStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Pending => "pending",
            OrderStatus::Processing => "processing",
            OrderStatus::InTransit => "in_transit",
            OrderStatus::Delivered => "delivered",
            OrderStatus::Received => "received",
            OrderStatus::Cancelled => "cancelled",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            OrderStatus::Pending => "Pending",
            OrderStatus::Processing => "Processing",
            OrderStatus::InTransit => "In Transit",
            OrderStatus::Delivered => "Delivered",
            OrderStatus::Received => "Received",
            OrderStatus::Cancelled => "Cancelled",
        }
    }

    /// Position in [`ORDER_PROGRESSION`]; `None` for `cancelled`
    pub fn progress_index(&self) -> Option<usize> {
        ORDER_PROGRESSION.iter().position(|s| s == self)
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, OrderStatus::Received | OrderStatus::Cancelled)
    }

    /// Timestamp column recorded when an order enters this status
    pub fn timestamp_field(&self) -> Option<OrderTimestamp> {
        match self {
            OrderStatus::Processing => Some(OrderTimestamp::ConfirmedAt),
            OrderStatus::InTransit => Some(OrderTimestamp::ShippedAt),
            OrderStatus::Delivered => Some(OrderTimestamp::DeliveredAt),
            OrderStatus::Received => Some(OrderTimestamp::ReceivedAt),
            OrderStatus::Pending | OrderStatus::Cancelled => None,
        }
    }
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for OrderStatus {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(OrderStatus::Pending),
            "processing" => Ok(OrderStatus::Processing),
            "in_transit" => Ok(OrderStatus::InTransit),
            "delivered" => Ok(OrderStatus::Delivered),
            "received" => Ok(OrderStatus::Received),
            "cancelled" => Ok(OrderStatus::Cancelled),
            other => Err(ParseEnumError::new("order status", other)),
        }
    }
}

/// Milestone timestamp columns on an order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderTimestamp {
    ConfirmedAt,
    ShippedAt,
    DeliveredAt,
    ReceivedAt,
}

impl OrderTimestamp {
    pub fn column(&self) -> &'static str {
        match self {
            OrderTimestamp::ConfirmedAt => "confirmed_at",
            OrderTimestamp::ShippedAt => "shipped_at",
            OrderTimestamp::DeliveredAt => "delivered_at",
            OrderTimestamp::ReceivedAt => "received_at",
        }
    }
}

/// Milestone timestamps recorded on an order
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderTimestamps {
    pub confirmed_at: Option<DateTime<Utc>>,
    pub shipped_at: Option<DateTime<Utc>>,
    pub delivered_at: Option<DateTime<Utc>>,
    pub received_at: Option<DateTime<Utc>>,
}

impl OrderTimestamps {
    pub fn get(&self, field: OrderTimestamp) -> Option<DateTime<Utc>> {
        match field {
            OrderTimestamp::ConfirmedAt => self.confirmed_at,
            OrderTimestamp::ShippedAt => self.shipped_at,
            OrderTimestamp::DeliveredAt => self.delivered_at,
            OrderTimestamp::ReceivedAt => self.received_at,
        }
    }

    pub fn set(&mut self, field: OrderTimestamp, at: DateTime<Utc>) {
        let slot = match field {
            OrderTimestamp::ConfirmedAt => &mut self.confirmed_at,
            OrderTimestamp::ShippedAt => &mut self.shipped_at,
            OrderTimestamp::DeliveredAt => &mut self.delivered_at,
            OrderTimestamp::ReceivedAt => &mut self.received_at,
        };
        *slot = Some(at);
    }
}

/// An accepted status change
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OrderTransition {
    pub from: OrderStatus,
    pub to: OrderStatus,
    /// Column to stamp with the current time, if any
    pub stamp: Option<OrderTimestamp>,
}

impl OrderTransition {
    pub fn is_noop(&self) -> bool {
        self.from == self.to
    }

    /// Apply the timestamp side effect to a set of timestamps
    pub fn apply(&self, timestamps: &mut OrderTimestamps, now: DateTime<Utc>) {
        if let Some(field) = self.stamp {
            timestamps.set(field, now);
        }
    }
}

/// Decide whether `role` may move an order from `current` to `requested`.
///
/// Customers may only confirm receipt of a delivered order. Staff may set any
/// of [`STAFF_SETTABLE_STATUSES`]; under [`TransitionPolicy::ForwardOnly`]
/// they cannot move backwards or leave a terminal state.
pub fn advance(
    current: OrderStatus,
    requested: OrderStatus,
    role: Role,
    policy: TransitionPolicy,
) -> Result<OrderTransition, TransitionError> {
    match role {
        Role::Customer => {
            if requested != OrderStatus::Received {
                return Err(TransitionError::RoleNotPermitted {
                    role,
                    requested: requested.as_str(),
                });
            }
            if current != OrderStatus::Delivered {
                return Err(invalid(current, requested));
            }
        }
        Role::Admin | Role::Supplier => {
            if !STAFF_SETTABLE_STATUSES.contains(&requested) {
                return Err(TransitionError::RoleNotPermitted {
                    role,
                    requested: requested.as_str(),
                });
            }
            if policy == TransitionPolicy::ForwardOnly {
                check_forward(current, requested)?;
            }
        }
    }

    let stamp = if current != requested {
        requested.timestamp_field()
    } else {
        None
    };

    Ok(OrderTransition {
        from: current,
        to: requested,
        stamp,
    })
}

fn check_forward(current: OrderStatus, requested: OrderStatus) -> Result<(), TransitionError> {
    if current == requested {
        return Ok(());
    }
    if current.is_terminal() {
        return Err(invalid(current, requested));
    }
    if requested == OrderStatus::Cancelled {
        return Ok(());
    }

    match (current.progress_index(), requested.progress_index()) {
        (Some(from), Some(to)) if to > from => Ok(()),
        _ => Err(invalid(current, requested)),
    }
}

fn invalid(from: OrderStatus, to: OrderStatus) -> TransitionError {
    TransitionError::InvalidTransition {
        from: from.as_str(),
        to: to.as_str(),
    }
}

// ============================================================================
// Progress tracker
// ============================================================================

/// A single tracker checkpoint
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Checkpoint {
    pub status: OrderStatus,
    pub label: String,
    pub completed: bool,
    pub current: bool,
    pub timestamp: Option<DateTime<Utc>>,
}

/// What the order tracker shows for an order
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TrackerView {
    /// Terminal badge; no checkpoints are drawn
    Cancelled { badge: String },
    Progress {
        status: OrderStatus,
        checkpoints: Vec<Checkpoint>,
    },
}

impl TrackerView {
    pub fn completed_statuses(&self) -> Vec<OrderStatus> {
        match self {
            TrackerView::Cancelled { .. } => Vec::new(),
            TrackerView::Progress { checkpoints, .. } => checkpoints
                .iter()
                .filter(|c| c.completed)
                .map(|c| c.status)
                .collect(),
        }
    }
}

/// Build the tracker for an order in `current` status.
///
/// Checkpoint `i` is complete when `i <= index(current)`. A cancelled order
/// short-circuits to a badge whatever timestamps are present.
pub fn order_tracker(current: OrderStatus, timestamps: &OrderTimestamps) -> TrackerView {
    let current_index = match current.progress_index() {
        Some(index) => index,
        None => {
            return TrackerView::Cancelled {
                badge: "Order Cancelled".to_string(),
            }
        }
    };

    let checkpoints = ORDER_PROGRESSION
        .iter()
        .enumerate()
        .map(|(index, status)| Checkpoint {
            status: *status,
            label: status.label().to_string(),
            completed: index <= current_index,
            current: index == current_index,
            timestamp: status.timestamp_field().and_then(|f| timestamps.get(f)),
        })
        .collect();

    TrackerView::Progress {
        status: current,
        checkpoints,
    }
}

// ============================================================================
// Order numbers
// ============================================================================

const BASE36: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";

/// Encode the low bits of `seed` as `len` base-36 characters
pub fn base36_suffix(seed: u128, len: usize) -> String {
    let mut value = seed;
    let mut out = String::with_capacity(len);
    for _ in 0..len {
        out.push(BASE36[(value % 36) as usize] as char);
        value /= 36;
    }
    out
}

/// Build a display code such as `ORD-1718000000000-k3j9x0a1b`
pub fn generate_order_number(prefix: &str, timestamp_millis: i64, seed: u128) -> String {
    format!("{}-{}-{}", prefix, timestamp_millis, base36_suffix(seed, 9))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_status_strings_round_trip() {
        for status in ORDER_PROGRESSION.iter().chain([OrderStatus::Cancelled].iter()) {
            assert_eq!(status.as_str().parse::<OrderStatus>().unwrap(), *status);
        }
        assert!("shipped".parse::<OrderStatus>().is_err());
    }

    #[test]
    fn test_timestamp_fields() {
        assert_eq!(OrderStatus::Pending.timestamp_field(), None);
        assert_eq!(
            OrderStatus::Processing.timestamp_field(),
            Some(OrderTimestamp::ConfirmedAt)
        );
        assert_eq!(
            OrderStatus::InTransit.timestamp_field().map(|f| f.column()),
            Some("shipped_at")
        );
        assert_eq!(OrderStatus::Cancelled.timestamp_field(), None);
    }

    #[test]
    fn test_staff_forward_transition_stamps_timestamp() {
        let t = advance(
            OrderStatus::InTransit,
            OrderStatus::Delivered,
            Role::Supplier,
            TransitionPolicy::ForwardOnly,
        )
        .unwrap();

        assert_eq!(t.stamp, Some(OrderTimestamp::DeliveredAt));

        let mut ts = OrderTimestamps::default();
        let now = Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap();
        t.apply(&mut ts, now);
        assert_eq!(ts.delivered_at, Some(now));
        assert_eq!(ts.shipped_at, None);
    }

    #[test]
    fn test_staff_can_skip_forward() {
        assert!(advance(
            OrderStatus::Pending,
            OrderStatus::Delivered,
            Role::Admin,
            TransitionPolicy::ForwardOnly,
        )
        .is_ok());
    }

    #[test]
    fn test_forward_only_rejects_backwards() {
        let err = advance(
            OrderStatus::Delivered,
            OrderStatus::Processing,
            Role::Admin,
            TransitionPolicy::ForwardOnly,
        )
        .unwrap_err();

        assert_eq!(
            err,
            TransitionError::InvalidTransition {
                from: "delivered",
                to: "processing"
            }
        );
    }

    #[test]
    fn test_permissive_allows_backwards() {
        let t = advance(
            OrderStatus::Delivered,
            OrderStatus::Pending,
            Role::Supplier,
            TransitionPolicy::Permissive,
        )
        .unwrap();
        assert_eq!(t.to, OrderStatus::Pending);
        assert_eq!(t.stamp, None);
    }

    #[test]
    fn test_cancel_from_non_terminal_only() {
        assert!(advance(
            OrderStatus::InTransit,
            OrderStatus::Cancelled,
            Role::Admin,
            TransitionPolicy::ForwardOnly,
        )
        .is_ok());
        assert!(advance(
            OrderStatus::Received,
            OrderStatus::Cancelled,
            Role::Admin,
            TransitionPolicy::ForwardOnly,
        )
        .is_err());
        assert!(advance(
            OrderStatus::Cancelled,
            OrderStatus::Pending,
            Role::Admin,
            TransitionPolicy::ForwardOnly,
        )
        .is_err());
    }

    #[test]
    fn test_staff_cannot_mark_received() {
        for policy in [TransitionPolicy::ForwardOnly, TransitionPolicy::Permissive] {
            let err = advance(OrderStatus::Delivered, OrderStatus::Received, Role::Admin, policy)
                .unwrap_err();
            assert!(err.is_permission_error());
        }
    }

    #[test]
    fn test_customer_confirms_delivery() {
        let t = advance(
            OrderStatus::Delivered,
            OrderStatus::Received,
            Role::Customer,
            TransitionPolicy::Permissive,
        )
        .unwrap();
        assert_eq!(t.stamp, Some(OrderTimestamp::ReceivedAt));
    }

    #[test]
    fn test_customer_cannot_cancel() {
        let err = advance(
            OrderStatus::Pending,
            OrderStatus::Cancelled,
            Role::Customer,
            TransitionPolicy::Permissive,
        )
        .unwrap_err();
        assert!(err.is_permission_error());
    }

    #[test]
    fn test_same_status_is_noop() {
        let t = advance(
            OrderStatus::Processing,
            OrderStatus::Processing,
            Role::Supplier,
            TransitionPolicy::ForwardOnly,
        )
        .unwrap();
        assert!(t.is_noop());
        assert_eq!(t.stamp, None);
    }

    #[test]
    fn test_tracker_in_transit() {
        let view = order_tracker(OrderStatus::InTransit, &OrderTimestamps::default());
        assert_eq!(
            view.completed_statuses(),
            vec![
                OrderStatus::Pending,
                OrderStatus::Processing,
                OrderStatus::InTransit
            ]
        );

        if let TrackerView::Progress { checkpoints, .. } = view {
            let current: Vec<_> = checkpoints.iter().filter(|c| c.current).collect();
            assert_eq!(current.len(), 1);
            assert_eq!(current[0].status, OrderStatus::InTransit);
            assert_eq!(current[0].label, "In Transit");
        } else {
            panic!("expected progress view");
        }
    }

    #[test]
    fn test_tracker_shows_timestamps() {
        let shipped = Utc.with_ymd_and_hms(2024, 3, 2, 8, 30, 0).unwrap();
        let ts = OrderTimestamps {
            shipped_at: Some(shipped),
            ..Default::default()
        };

        match order_tracker(OrderStatus::Delivered, &ts) {
            TrackerView::Progress { checkpoints, .. } => {
                assert_eq!(checkpoints[0].timestamp, None);
                assert_eq!(checkpoints[2].timestamp, Some(shipped));
                assert_eq!(checkpoints[3].timestamp, None);
            }
            other => panic!("unexpected view: {:?}", other),
        }
    }

    #[test]
    fn test_tracker_cancelled_short_circuits() {
        let now = Utc::now();
        let ts = OrderTimestamps {
            confirmed_at: Some(now),
            shipped_at: Some(now),
            delivered_at: Some(now),
            received_at: None,
        };

        let view = order_tracker(OrderStatus::Cancelled, &ts);
        assert_eq!(
            view,
            TrackerView::Cancelled {
                badge: "Order Cancelled".to_string()
            }
        );
        assert!(view.completed_statuses().is_empty());
    }

    #[test]
    fn test_order_number_format() {
        let number = generate_order_number("ORD", 1_718_000_000_000, 123_456_789);
        assert!(number.starts_with("ORD-1718000000000-"));
        let suffix = number.rsplit('-').next().unwrap();
        assert_eq!(suffix.len(), 9);
        assert!(suffix.chars().all(|c| c.is_ascii_digit() || c.is_ascii_lowercase()));
    }
}
