//! HTTP handlers for procurement orders

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use shared::{ListFilter, ProcurementOrder};
use uuid::Uuid;

use crate::error::AppResult;
use crate::middleware::CurrentUser;
use crate::services::procurement::{
    CreateProcurementInput, ProcurementListing, UpdateDeliveryInput,
};
use crate::services::ProcurementService;
use crate::AppState;

/// Create a procurement order (admin only)
pub async fn create_procurement_order(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Json(input): Json<CreateProcurementInput>,
) -> AppResult<(StatusCode, Json<ProcurementOrder>)> {
    current_user.0.require_admin()?;

    let service = ProcurementService::new(state.db);
    let order = service.create_order(&current_user.0, input).await?;
    Ok((StatusCode::CREATED, Json(order)))
}

/// All procurement orders for the admin, own orders for a supplier
pub async fn list_procurement_orders(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Query(filter): Query<ListFilter>,
) -> AppResult<Json<Vec<ProcurementListing>>> {
    current_user.0.require_staff()?;

    let service = ProcurementService::new(state.db);
    let orders = service.list_orders(&current_user.0, &filter).await?;
    Ok(Json(orders))
}

/// Supplier delivery progress report
pub async fn update_delivery_status(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(order_id): Path<Uuid>,
    Json(input): Json<UpdateDeliveryInput>,
) -> AppResult<Json<ProcurementOrder>> {
    let service = ProcurementService::new(state.db);
    let order = service
        .update_delivery(
            &current_user.0,
            order_id,
            input,
            state.config.orders.policy(),
        )
        .await?;
    Ok(Json(order))
}

/// Admin confirmation that a delivery was received
pub async fn confirm_procurement_receipt(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(order_id): Path<Uuid>,
) -> AppResult<Json<ProcurementOrder>> {
    let service = ProcurementService::new(state.db);
    let order = service.confirm_receipt(&current_user.0, order_id).await?;
    Ok(Json(order))
}
