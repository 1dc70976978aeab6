//! Dashboard handlers

use axum::{extract::State, Json};

use crate::error::AppResult;
use crate::middleware::CurrentUser;
use crate::services::dashboard::DashboardStats;
use crate::services::{DashboardService, NotificationService};
use crate::AppState;

/// Headline stats and the procurement summary for staff
pub async fn get_dashboard_stats(
    State(state): State<AppState>,
    current_user: CurrentUser,
) -> AppResult<Json<DashboardStats>> {
    current_user.0.require_staff()?;

    let notifications =
        NotificationService::new(state.db.clone(), state.config.notifications.limit);
    let service = DashboardService::new(state.db, notifications);
    let stats = service.get_stats(&current_user.0).await?;
    Ok(Json(stats))
}
