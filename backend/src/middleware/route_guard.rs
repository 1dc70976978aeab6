//! Route protection for every request path
//!
//! Public paths pass through. Anything else needs a resolved session: page
//! requests are redirected to the login page and API calls get a 401.

use axum::{
    extract::Request,
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};

use super::AuthUser;
use crate::error::AppError;

pub const LOGIN_PATH: &str = "/auth/login";

/// Pages reachable without a session; sub-paths included
const PUBLIC_PAGE_PREFIXES: &[&str] = &[
    "/auth",
    "/auth/login",
    "/auth/sign-up",
    "/auth/sign-up-success",
    "/auth/error",
];

/// Bundled scripts and styles from the static directory, needed by the
/// public pages before sign-in
const STATIC_ASSET_PREFIX: &str = "/assets";

/// API endpoints reachable without a session
const PUBLIC_API_PATHS: &[&str] = &[
    "/health",
    "/api/v1/health",
    "/api/v1/auth/register",
    "/api/v1/auth/login",
    "/api/v1/auth/refresh",
    "/api/v1/setup/admin",
];

pub fn is_public_path(path: &str) -> bool {
    if path == "/" || PUBLIC_API_PATHS.contains(&path) {
        return true;
    }

    PUBLIC_PAGE_PREFIXES
        .iter()
        .chain(std::iter::once(&STATIC_ASSET_PREFIX))
        .any(|prefix| {
            path == *prefix
                || path
                    .strip_prefix(prefix)
                    .is_some_and(|rest| rest.starts_with('/'))
        })
}

fn is_api_path(path: &str) -> bool {
    path == "/api" || path.starts_with("/api/")
}

pub async fn route_guard(request: Request, next: Next) -> Response {
    let path = request.uri().path();

    if is_public_path(path) || request.extensions().get::<AuthUser>().is_some() {
        return next.run(request).await;
    }

    if is_api_path(path) {
        return AppError::Unauthorized("Authentication required".to_string()).into_response();
    }

    tracing::debug!(path = %path, "Redirecting anonymous page request to login");
    Redirect::to(LOGIN_PATH).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_public_pages() {
        assert!(is_public_path("/"));
        assert!(is_public_path("/auth"));
        assert!(is_public_path("/auth/login"));
        assert!(is_public_path("/auth/sign-up-success"));
        assert!(is_public_path("/auth/error/expired"));
    }

    #[test]
    fn test_prefix_must_end_at_segment() {
        assert!(!is_public_path("/authority"));
        assert!(!is_public_path("/auth-admin"));
    }

    #[test]
    fn test_protected_paths() {
        assert!(!is_public_path("/dashboard"));
        assert!(!is_public_path("/dashboard/stock"));
        assert!(!is_public_path("/store/orders"));
        assert!(!is_public_path("/api/v1/orders"));
        assert!(is_public_path("/api/v1/auth/login"));
        assert!(is_public_path("/api/v1/setup/admin"));
    }

    #[test]
    fn test_static_assets_are_public() {
        assert!(is_public_path("/assets/login.css"));
        assert!(is_public_path("/assets/js/app.js"));
        assert!(!is_public_path("/assets-private/report.csv"));
        assert!(!PUBLIC_PAGE_PREFIXES.contains(&STATIC_ASSET_PREFIX));
    }

    #[test]
    fn test_api_detection() {
        assert!(is_api_path("/api/v1/orders"));
        assert!(!is_api_path("/apiary"));
    }
}
