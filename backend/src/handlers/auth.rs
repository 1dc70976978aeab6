//! Authentication handlers

use axum::{extract::State, http::StatusCode, Json};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use serde::{Deserialize, Serialize};
use shared::Role;

use crate::error::AppError;
use crate::middleware::auth::ACCESS_TOKEN_COOKIE;
use crate::services::auth::{AuthTokens, SignUpInput};
use crate::services::AuthService;
use crate::AppState;

#[derive(Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Serialize)]
pub struct LoginResponse {
    pub access_token: String,
    pub refresh_token: String,
    pub token_type: String,
    pub expires_in: i64,
    pub role: Role,
}

#[derive(Deserialize)]
pub struct RefreshRequest {
    pub refresh_token: String,
}

#[derive(Deserialize)]
pub struct LogoutRequest {
    pub refresh_token: Option<String>,
}

impl From<AuthTokens> for LoginResponse {
    fn from(tokens: AuthTokens) -> Self {
        Self {
            access_token: tokens.access_token,
            refresh_token: tokens.refresh_token,
            token_type: tokens.token_type,
            expires_in: tokens.expires_in,
            role: tokens.role,
        }
    }
}

/// Attach the access token as a session cookie for page requests
fn with_session_cookie(jar: CookieJar, tokens: &AuthTokens) -> CookieJar {
    let cookie = Cookie::build((ACCESS_TOKEN_COOKIE, tokens.access_token.clone()))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax);

    jar.add(cookie)
}

/// Sign-up endpoint handler
pub async fn register(
    State(state): State<AppState>,
    jar: CookieJar,
    Json(body): Json<SignUpInput>,
) -> Result<(StatusCode, CookieJar, Json<LoginResponse>), AppError> {
    let auth_service = AuthService::new(state.db.clone(), &state.config);
    let tokens = auth_service.sign_up(body).await?;

    let jar = with_session_cookie(jar, &tokens);
    Ok((StatusCode::CREATED, jar, Json(tokens.into())))
}

/// Login endpoint handler
pub async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    Json(body): Json<LoginRequest>,
) -> Result<(CookieJar, Json<LoginResponse>), AppError> {
    let auth_service = AuthService::new(state.db.clone(), &state.config);
    let tokens = auth_service.login(&body.email, &body.password).await?;

    let jar = with_session_cookie(jar, &tokens);
    Ok((jar, Json(tokens.into())))
}

/// Refresh token endpoint handler
pub async fn refresh(
    State(state): State<AppState>,
    jar: CookieJar,
    Json(body): Json<RefreshRequest>,
) -> Result<(CookieJar, Json<LoginResponse>), AppError> {
    let auth_service = AuthService::new(state.db.clone(), &state.config);
    let tokens = auth_service.refresh_token(&body.refresh_token).await?;

    let jar = with_session_cookie(jar, &tokens);
    Ok((jar, Json(tokens.into())))
}

/// Revoke the refresh token and clear the session cookie
pub async fn logout(
    State(state): State<AppState>,
    jar: CookieJar,
    Json(body): Json<LogoutRequest>,
) -> Result<(CookieJar, StatusCode), AppError> {
    if let Some(token) = body.refresh_token {
        let auth_service = AuthService::new(state.db.clone(), &state.config);
        auth_service.revoke_refresh_token(&token).await?;
    }

    let jar = jar.remove(Cookie::build(ACCESS_TOKEN_COOKIE).path("/"));
    Ok((jar, StatusCode::NO_CONTENT))
}
