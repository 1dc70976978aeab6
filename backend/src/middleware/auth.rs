//! Authentication middleware
//!
//! Resolves the session once per request (identity and role) and exposes it
//! to handlers through the `CurrentUser` extractor.

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::{IntoResponse, Response},
};
use axum_extra::{
    extract::CookieJar,
    headers::{authorization::Bearer, Authorization},
    TypedHeader,
};
use shared::Role;
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::services::auth::decode_claims;
use crate::AppState;

/// Cookie carrying the access token for browser page requests
pub const ACCESS_TOKEN_COOKIE: &str = "access_token";

/// Authenticated user information extracted from JWT
#[derive(Clone, Debug)]
pub struct AuthUser {
    pub user_id: Uuid,
    pub email: String,
    pub role: Role,
}

impl AuthUser {
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }

    /// Reject the request unless the caller holds one of `roles`
    pub fn require_role(&self, roles: &[Role]) -> AppResult<()> {
        if roles.contains(&self.role) {
            Ok(())
        } else {
            Err(AppError::InsufficientPermissions)
        }
    }

    pub fn require_admin(&self) -> AppResult<()> {
        self.require_role(&[Role::Admin])
    }

    pub fn require_staff(&self) -> AppResult<()> {
        self.require_role(&[Role::Admin, Role::Supplier])
    }

    pub fn require_customer(&self) -> AppResult<()> {
        self.require_role(&[Role::Customer])
    }
}

/// Decode the bearer token or session cookie, if any, into an `AuthUser`.
///
/// Never rejects: requests without a valid session continue anonymously and
/// are turned away by the route guard or `auth_middleware`.
pub async fn session_middleware(
    State(state): State<AppState>,
    bearer: Option<TypedHeader<Authorization<Bearer>>>,
    jar: CookieJar,
    mut request: Request,
    next: Next,
) -> Response {
    let token = bearer.map(|TypedHeader(auth)| auth.token().to_string()).or_else(|| {
        jar.get(ACCESS_TOKEN_COOKIE)
            .map(|cookie| cookie.value().to_string())
    });

    if let Some(token) = token {
        match resolve_user(&token, &state.config.jwt.secret) {
            Ok(user) => {
                request.extensions_mut().insert(user);
            }
            Err(e) => tracing::debug!("Ignoring session token: {}", e),
        }
    }

    next.run(request).await
}

fn resolve_user(token: &str, secret: &str) -> AppResult<AuthUser> {
    let claims = decode_claims(token, secret)?;

    let user_id = Uuid::parse_str(&claims.sub).map_err(|_| AppError::InvalidToken)?;
    let role = claims.role.parse::<Role>().map_err(|_| AppError::InvalidToken)?;

    Ok(AuthUser {
        user_id,
        email: claims.email,
        role,
    })
}

/// Require a resolved session on protected API routes
pub async fn auth_middleware(request: Request, next: Next) -> Response {
    if request.extensions().get::<AuthUser>().is_none() {
        return AppError::Unauthorized("Authentication required".to_string()).into_response();
    }

    next.run(request).await
}

/// Extractor for authenticated user
/// Use this in handlers to get the current user
#[derive(Clone, Debug)]
pub struct CurrentUser(pub AuthUser);

#[axum::async_trait]
impl<S> axum::extract::FromRequestParts<S> for CurrentUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut axum::http::request::Parts,
        _state: &S,
    ) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthUser>()
            .cloned()
            .map(CurrentUser)
            .ok_or_else(|| AppError::Unauthorized("Authentication required".to_string()))
    }
}
