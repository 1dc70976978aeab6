//! Dashboard statistics for admins and suppliers

use rust_decimal::Decimal;
use serde::Serialize;
use shared::{actionable_status, Notification, Role};
use sqlx::{FromRow, PgPool};

use crate::error::AppResult;
use crate::middleware::AuthUser;
use crate::services::NotificationService;

#[derive(Clone)]
pub struct DashboardService {
    db: PgPool,
    notifications: NotificationService,
}

/// Headline figures scoped to the caller (everything for the admin, own
/// records for a supplier)
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct DashboardCounts {
    pub total_products: i64,
    pub total_orders: i64,
    pub total_revenue: Decimal,
    pub total_customers: i64,
    pub procurement_orders: i64,
    /// Procurement orders needing the caller: delivered for the admin, pending for a supplier
    pub pending_procurement: i64,
}

#[derive(Debug, Serialize)]
pub struct DashboardStats {
    pub role: Role,
    #[serde(flatten)]
    pub counts: DashboardCounts,
    pub notifications: Vec<Notification>,
}

impl DashboardService {
    pub fn new(db: PgPool, notifications: NotificationService) -> Self {
        Self { db, notifications }
    }

    pub async fn get_stats(&self, user: &AuthUser) -> AppResult<DashboardStats> {
        let awaiting = actionable_status(user.role).map(|s| s.as_str());

        let counts = sqlx::query_as::<_, DashboardCounts>(
            r#"
            SELECT
                (SELECT COUNT(*) FROM products WHERE $1 OR supplier_id = $2) AS total_products,
                (SELECT COUNT(*) FROM orders WHERE $1 OR supplier_id = $2) AS total_orders,
                (SELECT COALESCE(SUM(total_amount), 0) FROM orders WHERE $1 OR supplier_id = $2)
                    AS total_revenue,
                (SELECT COUNT(DISTINCT customer_id) FROM orders WHERE $1 OR supplier_id = $2)
                    AS total_customers,
                (SELECT COUNT(*) FROM procurement_orders WHERE $1 OR supplier_id = $2)
                    AS procurement_orders,
                (SELECT COUNT(*) FROM procurement_orders
                    WHERE ($1 OR supplier_id = $2) AND delivery_status = $3) AS pending_procurement
            "#,
        )
        .bind(user.is_admin())
        .bind(user.user_id)
        .bind(awaiting)
        .fetch_one(&self.db)
        .await?;

        let notifications = self
            .notifications
            .summary_for(user)
            .await?
            .into_iter()
            .collect();

        Ok(DashboardStats {
            role: user.role,
            counts,
            notifications,
        })
    }
}
