//! Shared types and rules for the Stockline inventory and storefront platform
//!
//! This crate contains the domain models and the pure lifecycle rules used by
//! the backend, the browser (via WASM), and the test suites.

pub mod error;
pub mod models;
pub mod types;
pub mod validation;

pub use error::*;
pub use models::*;
pub use types::*;
pub use validation::*;
