//! Business logic services for the Stockline platform

pub mod auth;
pub mod cart;
pub mod dashboard;
pub mod inventory;
pub mod notification;
pub mod order;
pub mod procurement;
pub mod product;
pub mod profile;

pub use auth::AuthService;
pub use cart::CartService;
pub use dashboard::DashboardService;
pub use inventory::InventoryService;
pub use notification::NotificationService;
pub use order::OrderService;
pub use procurement::ProcurementService;
pub use product::ProductService;
pub use profile::ProfileService;
