//! HTTP handlers for the product catalog

use axum::{
    extract::{Multipart, Path, State},
    http::StatusCode,
    Json,
};
use shared::Product;
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::external::{ImageUpload, StorageClient};
use crate::middleware::CurrentUser;
use crate::services::product::{CreateProductInput, UpdateProductInput};
use crate::services::ProductService;
use crate::AppState;

/// Create a product owned by the caller
pub async fn create_product(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Json(input): Json<CreateProductInput>,
) -> AppResult<(StatusCode, Json<Product>)> {
    current_user.0.require_staff()?;

    let service = ProductService::new(state.db);
    let product = service.create_product(&current_user.0, input).await?;
    Ok((StatusCode::CREATED, Json(product)))
}

/// List the caller's products (all products for the admin)
pub async fn list_products(
    State(state): State<AppState>,
    current_user: CurrentUser,
) -> AppResult<Json<Vec<Product>>> {
    current_user.0.require_staff()?;

    let service = ProductService::new(state.db);
    let products = service.list_products(&current_user.0).await?;
    Ok(Json(products))
}

/// Storefront catalog
pub async fn list_catalog(State(state): State<AppState>) -> AppResult<Json<Vec<Product>>> {
    let service = ProductService::new(state.db);
    let products = service.list_catalog().await?;
    Ok(Json(products))
}

/// Products at or below their reorder threshold
pub async fn list_low_stock(
    State(state): State<AppState>,
    current_user: CurrentUser,
) -> AppResult<Json<Vec<Product>>> {
    current_user.0.require_staff()?;

    let service = ProductService::new(state.db);
    let products = service.list_low_stock(&current_user.0).await?;
    Ok(Json(products))
}

pub async fn get_product(
    State(state): State<AppState>,
    _current_user: CurrentUser,
    Path(product_id): Path<Uuid>,
) -> AppResult<Json<Product>> {
    let service = ProductService::new(state.db);
    let product = service.get_product(product_id).await?;
    Ok(Json(product))
}

pub async fn update_product(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(product_id): Path<Uuid>,
    Json(input): Json<UpdateProductInput>,
) -> AppResult<Json<Product>> {
    current_user.0.require_staff()?;

    let service = ProductService::new(state.db);
    let product = service
        .update_product(&current_user.0, product_id, input)
        .await?;
    Ok(Json(product))
}

pub async fn delete_product(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(product_id): Path<Uuid>,
) -> AppResult<StatusCode> {
    current_user.0.require_staff()?;

    let service = ProductService::new(state.db);
    service.delete_product(&current_user.0, product_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Upload a product image (multipart field `file`) and store its URL
pub async fn upload_product_image(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(product_id): Path<Uuid>,
    mut multipart: Multipart,
) -> AppResult<Json<Product>> {
    current_user.0.require_staff()?;

    let mut upload = None;
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::validation("file", e.to_string()))?
    {
        if field.name() != Some("file") {
            continue;
        }
        let file_name = field.file_name().unwrap_or("upload").to_string();
        let content_type = field.content_type().map(str::to_string);
        let bytes = field
            .bytes()
            .await
            .map_err(|e| AppError::validation("file", e.to_string()))?;

        upload = Some(ImageUpload {
            file_name,
            content_type,
            bytes: bytes.to_vec(),
        });
        break;
    }

    let upload = upload.ok_or_else(|| AppError::validation("file", "No file was uploaded"))?;

    let storage = StorageClient::from_config(&state.config.storage)?;
    let image_url = storage.upload_image(current_user.0.user_id, upload).await?;

    let service = ProductService::new(state.db);
    let product = service
        .set_image_url(&current_user.0, product_id, &image_url)
        .await?;
    Ok(Json(product))
}
