//! Route definitions for the Stockline API

use axum::{
    extract::DefaultBodyLimit,
    middleware,
    routing::{get, post, put},
    Router,
};

use crate::{handlers, middleware::auth_middleware, AppState};

/// Create API routes
pub fn api_routes(upload_limit: usize) -> Router<AppState> {
    Router::new()
        // Health check (public)
        .route("/health", get(handlers::health_check))
        // Auth routes (public)
        .nest("/auth", auth_routes())
        // First-run admin provisioning (public)
        .route("/setup/admin", post(handlers::create_admin))
        // Protected routes
        .nest("/admin", admin_routes())
        .nest("/profile", profile_routes())
        .nest("/products", product_routes(upload_limit))
        .nest("/inventory", inventory_routes())
        .nest("/cart", cart_routes())
        .nest("/orders", order_routes())
        .nest("/procurement", procurement_routes())
        .nest("/notifications", notification_routes())
        .nest("/dashboard", dashboard_routes())
}

/// Authentication routes (public)
fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/register", post(handlers::register))
        .route("/login", post(handlers::login))
        .route("/refresh", post(handlers::refresh))
        .route(
            "/logout",
            post(handlers::logout).route_layer(middleware::from_fn(auth_middleware)),
        )
}

/// Admin account management (protected)
fn admin_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/suppliers",
            get(handlers::list_suppliers).post(handlers::create_supplier),
        )
        .route_layer(middleware::from_fn(auth_middleware))
}

/// Own profile (protected)
fn profile_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(handlers::get_my_profile).put(handlers::update_my_profile),
        )
        .route_layer(middleware::from_fn(auth_middleware))
}

/// Product catalog (protected)
fn product_routes(upload_limit: usize) -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::list_products).post(handlers::create_product))
        .route("/catalog", get(handlers::list_catalog))
        .route("/low-stock", get(handlers::list_low_stock))
        .route(
            "/:product_id",
            get(handlers::get_product)
                .put(handlers::update_product)
                .delete(handlers::delete_product),
        )
        .route(
            "/:product_id/image",
            post(handlers::upload_product_image).layer(DefaultBodyLimit::max(upload_limit)),
        )
        .route_layer(middleware::from_fn(auth_middleware))
}

/// Inventory management routes (protected)
fn inventory_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/transactions",
            get(handlers::list_transactions).post(handlers::record_transaction),
        )
        .route("/summary", get(handlers::get_inventory_summary))
        .route_layer(middleware::from_fn(auth_middleware))
}

/// Shopping cart (protected, customers)
fn cart_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::get_cart).post(handlers::add_to_cart))
        .route(
            "/:cart_id",
            put(handlers::set_cart_quantity).delete(handlers::remove_from_cart),
        )
        .route("/checkout", post(handlers::checkout))
        .route_layer(middleware::from_fn(auth_middleware))
}

/// Customer orders (protected)
fn order_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::list_orders))
        .route("/mine", get(handlers::list_my_orders))
        .route("/:order_id", get(handlers::get_order))
        .route("/:order_id/status", put(handlers::update_order_status))
        .route("/:order_id/received", post(handlers::confirm_order_received))
        .route_layer(middleware::from_fn(auth_middleware))
}

/// Procurement orders (protected)
fn procurement_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(handlers::list_procurement_orders).post(handlers::create_procurement_order),
        )
        .route("/:order_id/status", put(handlers::update_delivery_status))
        .route(
            "/:order_id/received",
            post(handlers::confirm_procurement_receipt),
        )
        .route_layer(middleware::from_fn(auth_middleware))
}

/// Notification feed (protected)
fn notification_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::get_notifications))
        .route("/stream", get(handlers::stream_notifications))
        .route_layer(middleware::from_fn(auth_middleware))
}

/// Dashboard (protected)
fn dashboard_routes() -> Router<AppState> {
    Router::new()
        .route("/stats", get(handlers::get_dashboard_stats))
        .route_layer(middleware::from_fn(auth_middleware))
}
