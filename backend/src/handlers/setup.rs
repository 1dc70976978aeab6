//! Account provisioning: first-run admin setup and admin-created suppliers

use axum::{extract::State, http::StatusCode, Json};
use serde::Serialize;
use shared::Profile;
use uuid::Uuid;

use crate::error::AppResult;
use crate::middleware::CurrentUser;
use crate::services::auth::CreateSupplierInput;
use crate::services::AuthService;
use crate::AppState;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateAdminResponse {
    pub message: String,
    pub email: String,
    pub user_id: Uuid,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateSupplierResponse {
    pub success: bool,
    pub user_id: Uuid,
    pub supplier: Profile,
}

/// Create the admin account from the setup configuration (public, one-shot)
pub async fn create_admin(State(state): State<AppState>) -> AppResult<Json<CreateAdminResponse>> {
    let service = AuthService::new(state.db.clone(), &state.config);
    let profile = service.create_admin(&state.config.setup).await?;

    Ok(Json(CreateAdminResponse {
        message: "Admin user created successfully".to_string(),
        email: profile.email,
        user_id: profile.id,
    }))
}

/// Create a supplier account (admin only)
pub async fn create_supplier(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Json(input): Json<CreateSupplierInput>,
) -> AppResult<(StatusCode, Json<CreateSupplierResponse>)> {
    current_user.0.require_admin()?;

    let service = AuthService::new(state.db.clone(), &state.config);
    let supplier = service.create_supplier(input).await?;

    Ok((
        StatusCode::CREATED,
        Json(CreateSupplierResponse {
            success: true,
            user_id: supplier.id,
            supplier,
        }),
    ))
}
