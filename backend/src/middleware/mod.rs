//! Request middleware: session resolution and route protection

pub mod auth;
pub mod route_guard;

pub use auth::{auth_middleware, session_middleware, AuthUser, CurrentUser};
pub use route_guard::route_guard;
