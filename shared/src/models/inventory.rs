//! Inventory transactions and the stock adjustment rule

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::types::ParseEnumError;

/// A logged stock movement against a product; append-only
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InventoryTransaction {
    pub id: Uuid,
    pub product_id: Uuid,
    pub transaction_type: TransactionType,
    /// Signed quantity as applied to stock
    pub quantity: i32,
    pub notes: Option<String>,
    pub created_by: Uuid,
    pub created_at: DateTime<Utc>,
}

/// Types of inventory transactions
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum TransactionType {
    Purchase,
    Sale,
    Adjustment,
    Return,
}

impl TransactionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionType::Purchase => "purchase",
            TransactionType::Sale => "sale",
            TransactionType::Adjustment => "adjustment",
            TransactionType::Return => "return",
        }
    }

    /// Sales and returns always take stock out
    pub fn is_outbound(&self) -> bool {
        matches!(self, TransactionType::Sale | TransactionType::Return)
    }
}

impl std::fmt::Display for TransactionType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for TransactionType {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "purchase" => Ok(TransactionType::Purchase),
            "sale" => Ok(TransactionType::Sale),
            "adjustment" => Ok(TransactionType::Adjustment),
            "return" => Ok(TransactionType::Return),
            other => Err(ParseEnumError::new("transaction type", other)),
        }
    }
}

/// Signed stock delta for a transaction.
///
/// Sales and returns subtract `|quantity|`; purchases and adjustments apply the
/// quantity with the sign it was entered with.
pub fn stock_delta(transaction_type: TransactionType, quantity: i32) -> i32 {
    if transaction_type.is_outbound() {
        -quantity.saturating_abs()
    } else {
        quantity
    }
}

/// Outcome of applying a delta to a stock count
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StockAdjustment {
    pub previous_stock: i32,
    pub delta: i32,
    pub new_stock: i32,
    /// Units of deficit dropped by the floor at zero
    pub clamped: i64,
}

/// `new_stock = max(0, current + delta)`
pub fn apply_stock_delta(current_stock: i32, delta: i32) -> StockAdjustment {
    let raw = i64::from(current_stock) + i64::from(delta);
    let new_stock = raw.clamp(0, i64::from(i32::MAX)) as i32;
    let clamped = if raw < 0 { -raw } else { 0 };

    StockAdjustment {
        previous_stock: current_stock,
        delta,
        new_stock,
        clamped,
    }
}

/// Stock health relative to the reorder threshold
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StockLevel {
    OutOfStock,
    Low,
    Healthy,
}

pub fn stock_level(stock_quantity: i32, min_stock_level: i32) -> StockLevel {
    if stock_quantity <= 0 {
        StockLevel::OutOfStock
    } else if stock_quantity <= min_stock_level {
        StockLevel::Low
    } else {
        StockLevel::Healthy
    }
}

/// Low-stock check used by the product list and dashboard (`stock <= min`)
pub fn is_low_stock(stock_quantity: i32, min_stock_level: i32) -> bool {
    stock_quantity <= min_stock_level
}
