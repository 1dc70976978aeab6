//! Notification service: role-scoped alerts derived from procurement orders
//!
//! Nothing is stored. Every read re-derives the list from the current
//! procurement rows, either on demand or on each tick of a client stream.

use std::time::Duration;

use futures_util::{Stream, StreamExt};
use shared::{
    actionable_status, derive_notifications, summarize_awaiting, DeliveryStatus, Notification,
    ProcurementNotice, Role,
};
use sqlx::{FromRow, PgPool};
use tokio_stream::wrappers::IntervalStream;
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::middleware::AuthUser;

/// Notification service for deriving alerts
#[derive(Clone)]
pub struct NotificationService {
    db: PgPool,
    limit: i64,
}

#[derive(Debug, FromRow)]
struct NoticeRow {
    id: Uuid,
    order_number: String,
    product_name: String,
    supplier_id: Uuid,
    delivery_status: String,
}

impl NoticeRow {
    fn into_notice(self) -> AppResult<ProcurementNotice> {
        let delivery_status = self
            .delivery_status
            .parse::<DeliveryStatus>()
            .map_err(|e| AppError::Internal(e.to_string()))?;

        Ok(ProcurementNotice {
            id: self.id,
            order_number: self.order_number,
            product_name: self.product_name,
            supplier_id: self.supplier_id,
            delivery_status,
        })
    }
}

impl NotificationService {
    pub fn new(db: PgPool, limit: i64) -> Self {
        Self { db, limit }
    }

    /// Current alert list for the caller
    pub async fn notifications_for(&self, user: &AuthUser) -> AppResult<Vec<Notification>> {
        let Some(status) = actionable_status(user.role) else {
            return Ok(Vec::new());
        };

        let notices = sqlx::query_as::<_, NoticeRow>(
            r#"
            SELECT id, order_number, product_name, supplier_id, delivery_status
            FROM procurement_orders
            WHERE delivery_status = $1
              AND ($2 OR supplier_id = $3)
            ORDER BY ordered_at DESC
            LIMIT $4
            "#,
        )
        .bind(status.as_str())
        .bind(user.role == Role::Admin)
        .bind(user.user_id)
        .bind(self.limit)
        .fetch_all(&self.db)
        .await?
        .into_iter()
        .map(NoticeRow::into_notice)
        .collect::<AppResult<Vec<_>>>()?;

        Ok(derive_notifications(user.role, user.user_id, &notices))
    }

    /// Number of procurement orders waiting on the caller
    pub async fn awaiting_count(&self, user: &AuthUser) -> AppResult<i64> {
        let Some(status) = actionable_status(user.role) else {
            return Ok(0);
        };

        let count = sqlx::query_scalar::<_, i64>(
            r#"
            SELECT COUNT(*)
            FROM procurement_orders
            WHERE delivery_status = $1
              AND ($2 OR supplier_id = $3)
            "#,
        )
        .bind(status.as_str())
        .bind(user.role == Role::Admin)
        .bind(user.user_id)
        .fetch_one(&self.db)
        .await?;

        Ok(count)
    }

    /// Dashboard summary line, if anything is waiting
    pub async fn summary_for(&self, user: &AuthUser) -> AppResult<Option<Notification>> {
        let count = self.awaiting_count(user).await?;
        Ok(summarize_awaiting(user.role, count))
    }

    /// Re-derive the caller's alerts every `interval`, starting immediately.
    ///
    /// The stream holds no background task; dropping it (client disconnect)
    /// stops the polling.
    pub fn watch(
        self,
        user: AuthUser,
        interval: Duration,
    ) -> impl Stream<Item = Vec<Notification>> + Send + 'static {
        IntervalStream::new(tokio::time::interval(interval))
            .then(move |_| {
                let service = self.clone();
                let user = user.clone();
                async move { service.notifications_for(&user).await }
            })
            .filter_map(|result| async move {
                match result {
                    Ok(notifications) => Some(notifications),
                    Err(e) => {
                        tracing::warn!("Notification refresh failed: {}", e);
                        None
                    }
                }
            })
    }
}
