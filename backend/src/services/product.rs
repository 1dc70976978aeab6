//! Product catalog service

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Deserialize;
use shared::{
    validate_price, validate_sku, Product, ProductStatus, DEFAULT_MIN_STOCK_LEVEL,
};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use crate::error::{map_unique_violation, AppError, AppResult};
use crate::middleware::AuthUser;

#[derive(Clone)]
pub struct ProductService {
    db: PgPool,
}

#[derive(Debug, FromRow)]
pub struct ProductRow {
    pub id: Uuid,
    pub supplier_id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub sku: String,
    pub category: Option<String>,
    pub price: Decimal,
    pub cost_price: Option<Decimal>,
    pub stock_quantity: i32,
    pub min_stock_level: i32,
    pub status: String,
    pub image_url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ProductRow {
    pub fn into_product(self) -> AppResult<Product> {
        let status = self
            .status
            .parse::<ProductStatus>()
            .map_err(|e| AppError::Internal(e.to_string()))?;

        Ok(Product {
            id: self.id,
            supplier_id: self.supplier_id,
            name: self.name,
            description: self.description,
            sku: self.sku,
            category: self.category,
            price: self.price,
            cost_price: self.cost_price,
            stock_quantity: self.stock_quantity,
            min_stock_level: self.min_stock_level,
            status,
            image_url: self.image_url,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

#[derive(Debug, Deserialize)]
pub struct CreateProductInput {
    pub name: String,
    pub description: Option<String>,
    pub sku: String,
    pub category: Option<String>,
    pub price: Decimal,
    pub cost_price: Option<Decimal>,
    pub stock_quantity: Option<i32>,
    pub min_stock_level: Option<i32>,
    pub status: Option<ProductStatus>,
    pub image_url: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateProductInput {
    pub name: Option<String>,
    pub description: Option<String>,
    pub sku: Option<String>,
    pub category: Option<String>,
    pub price: Option<Decimal>,
    pub cost_price: Option<Decimal>,
    pub min_stock_level: Option<i32>,
    pub status: Option<ProductStatus>,
    pub image_url: Option<String>,
}

const PRODUCT_COLUMNS: &str = "id, supplier_id, name, description, sku, category, price, cost_price, \
     stock_quantity, min_stock_level, status, image_url, created_at, updated_at";

fn into_products(rows: Vec<ProductRow>) -> AppResult<Vec<Product>> {
    rows.into_iter().map(ProductRow::into_product).collect()
}

impl ProductService {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// Create a product owned by the caller
    pub async fn create_product(
        &self,
        user: &AuthUser,
        input: CreateProductInput,
    ) -> AppResult<Product> {
        if input.name.trim().is_empty() {
            return Err(AppError::validation("name", "Product name is required"));
        }
        validate_sku(&input.sku).map_err(|m| AppError::validation("sku", m))?;
        validate_price(input.price).map_err(|m| AppError::validation("price", m))?;

        let stock_quantity = input.stock_quantity.unwrap_or(0);
        if stock_quantity < 0 {
            return Err(AppError::validation(
                "stock_quantity",
                "Stock quantity cannot be negative",
            ));
        }

        let row = sqlx::query_as::<_, ProductRow>(&format!(
            r#"
            INSERT INTO products (supplier_id, name, description, sku, category, price, cost_price,
                                  stock_quantity, min_stock_level, status, image_url)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            RETURNING {}
            "#,
            PRODUCT_COLUMNS
        ))
        .bind(user.user_id)
        .bind(input.name.trim())
        .bind(&input.description)
        .bind(&input.sku)
        .bind(&input.category)
        .bind(input.price)
        .bind(input.cost_price)
        .bind(stock_quantity)
        .bind(input.min_stock_level.unwrap_or(DEFAULT_MIN_STOCK_LEVEL))
        .bind(input.status.unwrap_or_default().as_str())
        .bind(&input.image_url)
        .fetch_one(&self.db)
        .await
        .map_err(|e| map_unique_violation(e, "sku"))?;

        tracing::info!(product_id = %row.id, sku = %row.sku, "Product created");

        row.into_product()
    }

    pub async fn get_product(&self, product_id: Uuid) -> AppResult<Product> {
        sqlx::query_as::<_, ProductRow>(&format!(
            "SELECT {} FROM products WHERE id = $1",
            PRODUCT_COLUMNS
        ))
        .bind(product_id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Product".to_string()))?
        .into_product()
    }

    /// Update a product; suppliers may only touch their own
    pub async fn update_product(
        &self,
        user: &AuthUser,
        product_id: Uuid,
        input: UpdateProductInput,
    ) -> AppResult<Product> {
        if let Some(sku) = &input.sku {
            validate_sku(sku).map_err(|m| AppError::validation("sku", m))?;
        }
        if let Some(price) = input.price {
            validate_price(price).map_err(|m| AppError::validation("price", m))?;
        }

        let row = sqlx::query_as::<_, ProductRow>(&format!(
            r#"
            UPDATE products SET
                name = COALESCE($3, name),
                description = COALESCE($4, description),
                sku = COALESCE($5, sku),
                category = COALESCE($6, category),
                price = COALESCE($7, price),
                cost_price = COALESCE($8, cost_price),
                min_stock_level = COALESCE($9, min_stock_level),
                status = COALESCE($10, status),
                image_url = COALESCE($11, image_url),
                updated_at = NOW()
            WHERE id = $1 AND (supplier_id = $2 OR $12)
            RETURNING {}
            "#,
            PRODUCT_COLUMNS
        ))
        .bind(product_id)
        .bind(user.user_id)
        .bind(&input.name)
        .bind(&input.description)
        .bind(&input.sku)
        .bind(&input.category)
        .bind(input.price)
        .bind(input.cost_price)
        .bind(input.min_stock_level)
        .bind(input.status.map(|s| s.as_str()))
        .bind(&input.image_url)
        .bind(user.is_admin())
        .fetch_optional(&self.db)
        .await
        .map_err(|e| map_unique_violation(e, "sku"))?
        .ok_or_else(|| AppError::NotFound("Product".to_string()))?;

        row.into_product()
    }

    /// Delete a product; products already referenced by orders are kept
    pub async fn delete_product(&self, user: &AuthUser, product_id: Uuid) -> AppResult<()> {
        let result = sqlx::query(
            "DELETE FROM products WHERE id = $1 AND (supplier_id = $2 OR $3)",
        )
        .bind(product_id)
        .bind(user.user_id)
        .bind(user.is_admin())
        .execute(&self.db)
        .await
        .map_err(|e| match &e {
            sqlx::Error::Database(db_err) if db_err.code().as_deref() == Some("23503") => {
                AppError::Conflict {
                    resource: "product".to_string(),
                    message: "Product is referenced by existing orders".to_string(),
                }
            }
            _ => AppError::DatabaseError(e),
        })?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Product".to_string()));
        }

        tracing::info!(product_id = %product_id, "Product deleted");
        Ok(())
    }

    /// Products managed by the caller; the admin sees all
    pub async fn list_products(&self, user: &AuthUser) -> AppResult<Vec<Product>> {
        let rows = sqlx::query_as::<_, ProductRow>(&format!(
            "SELECT {} FROM products WHERE supplier_id = $1 OR $2 ORDER BY created_at DESC",
            PRODUCT_COLUMNS
        ))
        .bind(user.user_id)
        .bind(user.is_admin())
        .fetch_all(&self.db)
        .await?;

        into_products(rows)
    }

    /// Storefront: active products listed by the admin
    pub async fn list_catalog(&self) -> AppResult<Vec<Product>> {
        let rows = sqlx::query_as::<_, ProductRow>(&format!(
            r#"
            SELECT {}
            FROM products
            WHERE status = 'active'
              AND supplier_id IN (SELECT id FROM profiles WHERE role = 'admin')
            ORDER BY created_at DESC
            "#,
            PRODUCT_COLUMNS
        ))
        .fetch_all(&self.db)
        .await?;

        into_products(rows)
    }

    /// Products at or below their reorder threshold
    pub async fn list_low_stock(&self, user: &AuthUser) -> AppResult<Vec<Product>> {
        let rows = sqlx::query_as::<_, ProductRow>(&format!(
            r#"
            SELECT {}
            FROM products
            WHERE stock_quantity <= min_stock_level
              AND (supplier_id = $1 OR $2)
            ORDER BY stock_quantity ASC, name
            "#,
            PRODUCT_COLUMNS
        ))
        .bind(user.user_id)
        .bind(user.is_admin())
        .fetch_all(&self.db)
        .await?;

        into_products(rows)
    }

    pub async fn set_image_url(
        &self,
        user: &AuthUser,
        product_id: Uuid,
        image_url: &str,
    ) -> AppResult<Product> {
        self.update_product(
            user,
            product_id,
            UpdateProductInput {
                name: None,
                description: None,
                sku: None,
                category: None,
                price: None,
                cost_price: None,
                min_stock_level: None,
                status: None,
                image_url: Some(image_url.to_string()),
            },
        )
        .await
    }
}
