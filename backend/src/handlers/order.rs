//! HTTP handlers for customer orders

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use shared::{CheckoutContact, ListFilter, Order, OrderStatus};
use uuid::Uuid;

use crate::error::AppResult;
use crate::middleware::CurrentUser;
use crate::services::order::OrderDetail;
use crate::services::OrderService;
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct UpdateStatusRequest {
    pub status: OrderStatus,
}

/// Place an order from the customer's cart
pub async fn checkout(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Json(contact): Json<CheckoutContact>,
) -> AppResult<(StatusCode, Json<OrderDetail>)> {
    current_user.0.require_customer()?;

    let service = OrderService::new(state.db);
    let order = service.checkout(current_user.0.user_id, contact).await?;
    Ok((StatusCode::CREATED, Json(order)))
}

/// The customer's own orders
pub async fn list_my_orders(
    State(state): State<AppState>,
    current_user: CurrentUser,
) -> AppResult<Json<Vec<Order>>> {
    current_user.0.require_customer()?;

    let service = OrderService::new(state.db);
    let orders = service.list_customer_orders(current_user.0.user_id).await?;
    Ok(Json(orders))
}

/// Orders to fulfil, with `?status=` and `?search=`
pub async fn list_orders(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Query(filter): Query<ListFilter>,
) -> AppResult<Json<Vec<Order>>> {
    current_user.0.require_staff()?;

    let service = OrderService::new(state.db);
    let orders = service.list_staff_orders(&current_user.0, &filter).await?;
    Ok(Json(orders))
}

/// Order detail with items and tracker
pub async fn get_order(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(order_id): Path<Uuid>,
) -> AppResult<Json<OrderDetail>> {
    let service = OrderService::new(state.db);
    let order = service.get_order_detail(&current_user.0, order_id).await?;
    Ok(Json(order))
}

/// Change an order's status; which moves are allowed depends on the caller's role
pub async fn update_order_status(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(order_id): Path<Uuid>,
    Json(body): Json<UpdateStatusRequest>,
) -> AppResult<Json<Order>> {
    let service = OrderService::new(state.db);
    let order = service
        .update_status(
            &current_user.0,
            order_id,
            body.status,
            state.config.orders.policy(),
        )
        .await?;
    Ok(Json(order))
}

/// Customer confirmation that a delivered order arrived
pub async fn confirm_order_received(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(order_id): Path<Uuid>,
) -> AppResult<Json<Order>> {
    current_user.0.require_customer()?;

    let service = OrderService::new(state.db);
    let order = service
        .update_status(
            &current_user.0,
            order_id,
            OrderStatus::Received,
            state.config.orders.policy(),
        )
        .await?;
    Ok(Json(order))
}
