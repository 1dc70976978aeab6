//! Shopping cart handlers (customers only)

use axum::{
    extract::{Path, State},
    Json,
};
use uuid::Uuid;

use crate::error::AppResult;
use crate::middleware::CurrentUser;
use crate::services::cart::{AddToCartInput, CartView, SetQuantityInput};
use crate::services::CartService;
use crate::AppState;

pub async fn get_cart(
    State(state): State<AppState>,
    current_user: CurrentUser,
) -> AppResult<Json<CartView>> {
    current_user.0.require_customer()?;

    let service = CartService::new(state.db);
    let cart = service.get_cart(current_user.0.user_id).await?;
    Ok(Json(cart))
}

pub async fn add_to_cart(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Json(input): Json<AddToCartInput>,
) -> AppResult<Json<CartView>> {
    current_user.0.require_customer()?;

    let service = CartService::new(state.db);
    let cart = service.add_item(current_user.0.user_id, input).await?;
    Ok(Json(cart))
}

pub async fn set_cart_quantity(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(cart_id): Path<Uuid>,
    Json(input): Json<SetQuantityInput>,
) -> AppResult<Json<CartView>> {
    current_user.0.require_customer()?;

    let service = CartService::new(state.db);
    let cart = service
        .set_quantity(current_user.0.user_id, cart_id, input.quantity)
        .await?;
    Ok(Json(cart))
}

pub async fn remove_from_cart(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(cart_id): Path<Uuid>,
) -> AppResult<Json<CartView>> {
    current_user.0.require_customer()?;

    let service = CartService::new(state.db);
    let cart = service.remove_item(current_user.0.user_id, cart_id).await?;
    Ok(Json(cart))
}
