//! HTTP handlers for the Stockline API

mod auth;
mod cart;
mod dashboard;
mod health;
mod inventory;
mod notification;
mod order;
mod procurement;
mod product;
mod profile;
mod setup;

pub use auth::*;
pub use cart::*;
pub use dashboard::*;
pub use health::*;
pub use inventory::*;
pub use notification::*;
pub use order::*;
pub use procurement::*;
pub use product::*;
pub use profile::*;
pub use setup::*;
