//! Inventory service for logging stock movements against products

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use shared::{
    apply_stock_delta, stock_delta, validate_transaction_quantity, InventoryTransaction,
    StockAdjustment, TransactionType,
};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::middleware::AuthUser;

/// Number of transactions shown in the recent history
const RECENT_TRANSACTION_LIMIT: i64 = 50;

/// Inventory service for managing stock transactions
#[derive(Clone)]
pub struct InventoryService {
    db: PgPool,
}

/// Input for recording inventory transaction
#[derive(Debug, Deserialize)]
pub struct RecordTransactionInput {
    pub product_id: Uuid,
    pub transaction_type: TransactionType,
    /// Quantity as entered; sales and returns are always subtracted
    pub quantity: i32,
    pub notes: Option<String>,
}

/// A recorded transaction together with its effect on stock
#[derive(Debug, Serialize)]
pub struct RecordedTransaction {
    pub transaction: InventoryTransaction,
    pub adjustment: StockAdjustment,
}

/// Transaction with the product name, for history views
#[derive(Debug, Clone, Serialize)]
pub struct TransactionListing {
    #[serde(flatten)]
    pub transaction: InventoryTransaction,
    pub product_name: String,
}

/// Stock totals for the caller's products
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct InventorySummary {
    pub total_products: i64,
    pub total_units: i64,
    pub low_stock_count: i64,
    pub out_of_stock_count: i64,
}

#[derive(Debug, FromRow)]
struct TransactionRow {
    id: Uuid,
    product_id: Uuid,
    transaction_type: String,
    quantity: i32,
    notes: Option<String>,
    created_by: Uuid,
    created_at: DateTime<Utc>,
    product_name: String,
}

impl TransactionRow {
    fn into_listing(self) -> AppResult<TransactionListing> {
        let transaction_type = self
            .transaction_type
            .parse::<TransactionType>()
            .map_err(|e| AppError::Internal(e.to_string()))?;

        Ok(TransactionListing {
            transaction: InventoryTransaction {
                id: self.id,
                product_id: self.product_id,
                transaction_type,
                quantity: self.quantity,
                notes: self.notes,
                created_by: self.created_by,
                created_at: self.created_at,
            },
            product_name: self.product_name,
        })
    }
}

#[derive(Debug, FromRow)]
struct LockedProduct {
    supplier_id: Uuid,
    stock_quantity: i32,
}

impl InventoryService {
    /// Create a new InventoryService instance
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// Record a transaction and apply it to the product's stock.
    ///
    /// The ledger row and the stock update commit together, with the product
    /// row locked for the duration.
    pub async fn record_transaction(
        &self,
        user: &AuthUser,
        input: RecordTransactionInput,
    ) -> AppResult<RecordedTransaction> {
        validate_transaction_quantity(input.quantity)
            .map_err(|m| AppError::validation("quantity", m))?;

        let mut tx = self.db.begin().await?;

        let product = sqlx::query_as::<_, LockedProduct>(
            "SELECT supplier_id, stock_quantity FROM products WHERE id = $1 FOR UPDATE",
        )
        .bind(input.product_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| AppError::NotFound("Product".to_string()))?;

        if !user.is_admin() && product.supplier_id != user.user_id {
            return Err(AppError::InsufficientPermissions);
        }

        let delta = stock_delta(input.transaction_type, input.quantity);
        let adjustment = apply_stock_delta(product.stock_quantity, delta);

        let (id, created_at) = sqlx::query_as::<_, (Uuid, DateTime<Utc>)>(
            r#"
            INSERT INTO inventory_transactions (product_id, transaction_type, quantity, notes, created_by)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, created_at
            "#,
        )
        .bind(input.product_id)
        .bind(input.transaction_type.as_str())
        .bind(delta)
        .bind(&input.notes)
        .bind(user.user_id)
        .fetch_one(&mut *tx)
        .await?;

        sqlx::query("UPDATE products SET stock_quantity = $2, updated_at = NOW() WHERE id = $1")
            .bind(input.product_id)
            .bind(adjustment.new_stock)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        if adjustment.clamped > 0 {
            tracing::warn!(
                product_id = %input.product_id,
                previous = adjustment.previous_stock,
                delta = adjustment.delta,
                dropped = adjustment.clamped,
                "Stock floored at zero"
            );
        } else {
            tracing::info!(
                product_id = %input.product_id,
                transaction_type = %input.transaction_type,
                delta = adjustment.delta,
                new_stock = adjustment.new_stock,
                "Inventory transaction recorded"
            );
        }

        Ok(RecordedTransaction {
            transaction: InventoryTransaction {
                id,
                product_id: input.product_id,
                transaction_type: input.transaction_type,
                quantity: delta,
                notes: input.notes,
                created_by: user.user_id,
                created_at,
            },
            adjustment,
        })
    }

    /// Most recent transactions on the caller's products (all for the admin)
    pub async fn list_recent(&self, user: &AuthUser) -> AppResult<Vec<TransactionListing>> {
        let rows = sqlx::query_as::<_, TransactionRow>(
            r#"
            SELECT t.id, t.product_id, t.transaction_type, t.quantity, t.notes,
                   t.created_by, t.created_at, p.name AS product_name
            FROM inventory_transactions t
            JOIN products p ON p.id = t.product_id
            WHERE p.supplier_id = $1 OR $2
            ORDER BY t.created_at DESC
            LIMIT $3
            "#,
        )
        .bind(user.user_id)
        .bind(user.is_admin())
        .bind(RECENT_TRANSACTION_LIMIT)
        .fetch_all(&self.db)
        .await?;

        rows.into_iter().map(TransactionRow::into_listing).collect()
    }

    /// Stock totals over the caller's products
    pub async fn get_summary(&self, user: &AuthUser) -> AppResult<InventorySummary> {
        let summary = sqlx::query_as::<_, InventorySummary>(
            r#"
            SELECT
                COUNT(*) AS total_products,
                COALESCE(SUM(stock_quantity), 0)::BIGINT AS total_units,
                COUNT(*) FILTER (WHERE stock_quantity <= min_stock_level) AS low_stock_count,
                COUNT(*) FILTER (WHERE stock_quantity = 0) AS out_of_stock_count
            FROM products
            WHERE supplier_id = $1 OR $2
            "#,
        )
        .bind(user.user_id)
        .bind(user.is_admin())
        .fetch_one(&self.db)
        .await?;

        Ok(summary)
    }
}
