//! HTTP handlers for inventory transactions

use axum::{extract::State, http::StatusCode, Json};

use crate::error::AppResult;
use crate::middleware::CurrentUser;
use crate::services::inventory::{
    InventorySummary, RecordTransactionInput, RecordedTransaction, TransactionListing,
};
use crate::services::InventoryService;
use crate::AppState;

/// Record an inventory transaction
pub async fn record_transaction(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Json(input): Json<RecordTransactionInput>,
) -> AppResult<(StatusCode, Json<RecordedTransaction>)> {
    current_user.0.require_staff()?;

    let service = InventoryService::new(state.db);
    let recorded = service.record_transaction(&current_user.0, input).await?;
    Ok((StatusCode::CREATED, Json(recorded)))
}

/// List recent transactions
pub async fn list_transactions(
    State(state): State<AppState>,
    current_user: CurrentUser,
) -> AppResult<Json<Vec<TransactionListing>>> {
    current_user.0.require_staff()?;

    let service = InventoryService::new(state.db);
    let transactions = service.list_recent(&current_user.0).await?;
    Ok(Json(transactions))
}

/// Get inventory summary
pub async fn get_inventory_summary(
    State(state): State<AppState>,
    current_user: CurrentUser,
) -> AppResult<Json<InventorySummary>> {
    current_user.0.require_staff()?;

    let service = InventoryService::new(state.db);
    let summary = service.get_summary(&current_user.0).await?;
    Ok(Json(summary))
}
