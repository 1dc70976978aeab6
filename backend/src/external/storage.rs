//! Object storage client for product images
//!
//! Uploads go to `<base_url>/storage/v1/object/<bucket>/<path>` and are served
//! back from the public object URL.

use reqwest::Client;
use uuid::Uuid;

use crate::config::StorageConfig;
use crate::error::{AppError, AppResult};

const ALLOWED_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "gif", "webp"];

/// Storage API client
#[derive(Clone)]
pub struct StorageClient {
    client: Client,
    base_url: String,
    bucket: String,
    service_key: String,
    max_upload_bytes: usize,
}

/// An uploaded file ready to be stored
pub struct ImageUpload {
    pub file_name: String,
    pub content_type: Option<String>,
    pub bytes: Vec<u8>,
}

impl StorageClient {
    /// Build a client from configuration; errors when storage is not configured
    pub fn from_config(config: &StorageConfig) -> AppResult<Self> {
        let base_url = config
            .base_url
            .clone()
            .ok_or_else(|| AppError::Configuration("Storage base URL is not configured".into()))?;
        let service_key = config
            .service_key
            .clone()
            .ok_or_else(|| AppError::Configuration("Storage service key is not configured".into()))?;

        Ok(Self {
            client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            bucket: config.bucket.clone(),
            service_key,
            max_upload_bytes: config.max_upload_bytes,
        })
    }

    /// Store an image under `<user_id>/<random>.<ext>` and return its public URL
    pub async fn upload_image(&self, user_id: Uuid, upload: ImageUpload) -> AppResult<String> {
        if upload.bytes.is_empty() {
            return Err(AppError::validation("file", "File is empty"));
        }
        if upload.bytes.len() > self.max_upload_bytes {
            return Err(AppError::validation(
                "file",
                format!("File exceeds {} bytes", self.max_upload_bytes),
            ));
        }

        let extension = image_extension(&upload.file_name).ok_or_else(|| {
            AppError::validation("file", "Only jpg, png, gif and webp images are accepted")
        })?;

        let path = object_path(user_id, Uuid::new_v4(), &extension);
        let url = format!(
            "{}/storage/v1/object/{}/{}",
            self.base_url, self.bucket, path
        );

        let content_type = upload
            .content_type
            .unwrap_or_else(|| format!("image/{}", extension));

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.service_key)
            .header(reqwest::header::CONTENT_TYPE, content_type)
            .body(upload.bytes)
            .send()
            .await
            .map_err(|e| AppError::StorageError(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            tracing::error!("Storage upload failed: {} - {}", status, body);
            return Err(AppError::StorageError(format!("Upload rejected with {}", status)));
        }

        tracing::info!(path = %path, "Product image uploaded");

        Ok(self.public_url(&path))
    }

    pub fn public_url(&self, path: &str) -> String {
        format!(
            "{}/storage/v1/object/public/{}/{}",
            self.base_url, self.bucket, path
        )
    }
}

/// Lower-cased extension of an accepted image file name
fn image_extension(file_name: &str) -> Option<String> {
    let (_, ext) = file_name.rsplit_once('.')?;
    let ext = ext.to_ascii_lowercase();
    ALLOWED_EXTENSIONS.contains(&ext.as_str()).then_some(ext)
}

fn object_path(user_id: Uuid, object_id: Uuid, extension: &str) -> String {
    format!("{}/{}.{}", user_id, object_id.simple(), extension)
}
