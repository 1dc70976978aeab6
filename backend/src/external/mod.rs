//! External API integrations

pub mod storage;

pub use storage::{ImageUpload, StorageClient};
