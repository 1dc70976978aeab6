//! Domain models for the Stockline platform

mod cart;
mod inventory;
mod notification;
mod order;
mod procurement;
mod product;
mod user;

pub use cart::*;
pub use inventory::*;
pub use notification::*;
pub use order::*;
pub use procurement::*;
pub use product::*;
pub use user::*;
