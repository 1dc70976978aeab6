//! Profile handlers

use axum::{extract::State, Json};
use shared::Profile;

use crate::error::AppResult;
use crate::middleware::CurrentUser;
use crate::services::profile::UpdateProfileInput;
use crate::services::ProfileService;
use crate::AppState;

/// Get the caller's profile
pub async fn get_my_profile(
    State(state): State<AppState>,
    current_user: CurrentUser,
) -> AppResult<Json<Profile>> {
    let service = ProfileService::new(state.db);
    let profile = service.get_profile(current_user.0.user_id).await?;
    Ok(Json(profile))
}

/// Update the caller's contact fields
pub async fn update_my_profile(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Json(input): Json<UpdateProfileInput>,
) -> AppResult<Json<Profile>> {
    let service = ProfileService::new(state.db);
    let profile = service
        .update_profile(current_user.0.user_id, input)
        .await?;
    Ok(Json(profile))
}

/// List supplier profiles (admin only)
pub async fn list_suppliers(
    State(state): State<AppState>,
    current_user: CurrentUser,
) -> AppResult<Json<Vec<Profile>>> {
    current_user.0.require_admin()?;

    let service = ProfileService::new(state.db);
    let suppliers = service.list_suppliers().await?;
    Ok(Json(suppliers))
}
