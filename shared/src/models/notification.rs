//! Role-scoped alerts derived from procurement order state

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{DeliveryStatus, Role};

/// Maximum number of entries in a notification list
pub const NOTIFICATION_LIMIT: usize = 5;

/// Dashboard page the procurement alerts link to
pub const PROCUREMENT_LINK: &str = "/dashboard/stock";

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    Procurement,
}

/// A derived alert; never persisted
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Notification {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: NotificationKind,
    pub title: String,
    pub message: String,
    pub link: String,
}

/// The procurement columns the deriver reads
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProcurementNotice {
    pub id: Uuid,
    pub order_number: String,
    pub product_name: String,
    pub supplier_id: Uuid,
    pub delivery_status: DeliveryStatus,
}

/// Status that needs the viewer's attention, if any
pub fn actionable_status(role: Role) -> Option<DeliveryStatus> {
    match role {
        Role::Admin => Some(DeliveryStatus::Delivered),
        Role::Supplier => Some(DeliveryStatus::Pending),
        Role::Customer => None,
    }
}

/// Derive the viewer's alert list.
///
/// Admins see delivered orders awaiting confirmation; suppliers see their own
/// pending orders. At most [`NOTIFICATION_LIMIT`] entries are returned.
pub fn derive_notifications(
    role: Role,
    viewer_id: Uuid,
    orders: &[ProcurementNotice],
) -> Vec<Notification> {
    let Some(wanted) = actionable_status(role) else {
        return Vec::new();
    };

    let title = match role {
        Role::Admin => "Delivery Confirmation Needed",
        _ => "New Procurement Order",
    };

    orders
        .iter()
        .filter(|o| o.delivery_status == wanted)
        .filter(|o| role == Role::Admin || o.supplier_id == viewer_id)
        .take(NOTIFICATION_LIMIT)
        .map(|o| Notification {
            id: o.id.to_string(),
            kind: NotificationKind::Procurement,
            title: title.to_string(),
            message: format!("Order {} - {}", o.order_number, o.product_name),
            link: PROCUREMENT_LINK.to_string(),
        })
        .collect()
}

/// Single summary line for the dashboard, e.g.
/// "2 procurement orders delivered and awaiting confirmation"
pub fn summarize_awaiting(role: Role, count: i64) -> Option<Notification> {
    if count <= 0 {
        return None;
    }
    let plural = if count > 1 { "s" } else { "" };

    let (id, message) = match role {
        Role::Admin => (
            "proc-delivered",
            format!(
                "{} procurement order{} delivered and awaiting confirmation",
                count, plural
            ),
        ),
        Role::Supplier => (
            "proc-pending",
            format!(
                "{} new procurement order{} awaiting processing",
                count, plural
            ),
        ),
        Role::Customer => return None,
    };

    Some(Notification {
        id: id.to_string(),
        kind: NotificationKind::Procurement,
        title: "Procurement".to_string(),
        message,
        link: PROCUREMENT_LINK.to_string(),
    })
}
