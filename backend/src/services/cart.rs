//! Shopping cart service

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use shared::{cart_total, CartLine};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use crate::error::{AppError, AppResult};

#[derive(Clone)]
pub struct CartService {
    db: PgPool,
}

#[derive(Debug, Deserialize)]
pub struct AddToCartInput {
    pub product_id: Uuid,
    pub quantity: Option<i32>,
}

#[derive(Debug, Deserialize)]
pub struct SetQuantityInput {
    pub quantity: i32,
}

/// The customer's cart with its running total
#[derive(Debug, Serialize)]
pub struct CartView {
    pub items: Vec<CartLine>,
    pub total: Decimal,
}

#[derive(Debug, FromRow)]
pub(crate) struct CartLineRow {
    id: Uuid,
    product_id: Uuid,
    product_name: String,
    image_url: Option<String>,
    unit_price: Decimal,
    quantity: i32,
}

/// Cart lines of one customer, priced from the product table
pub(crate) const CART_LINES_QUERY: &str = r#"
    SELECT c.id, c.product_id, p.name AS product_name, p.image_url,
           p.price AS unit_price, c.quantity
    FROM shopping_cart c
    JOIN products p ON p.id = c.product_id
    WHERE c.customer_id = $1
    ORDER BY c.created_at
"#;

impl From<CartLineRow> for CartLine {
    fn from(row: CartLineRow) -> Self {
        CartLine {
            id: row.id,
            product_id: row.product_id,
            product_name: row.product_name,
            image_url: row.image_url,
            unit_price: row.unit_price,
            quantity: row.quantity,
        }
    }
}

impl CartService {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// Cart lines joined with current product name and price
    pub async fn get_cart(&self, customer_id: Uuid) -> AppResult<CartView> {
        let items = self.load_lines(customer_id).await?;
        let total = cart_total(&items);
        Ok(CartView { items, total })
    }

    async fn load_lines(&self, customer_id: Uuid) -> AppResult<Vec<CartLine>> {
        let rows = sqlx::query_as::<_, CartLineRow>(CART_LINES_QUERY)
            .bind(customer_id)
            .fetch_all(&self.db)
            .await?;

        Ok(rows.into_iter().map(CartLine::from).collect())
    }

    /// Add a product; an existing line has its quantity increased instead
    pub async fn add_item(&self, customer_id: Uuid, input: AddToCartInput) -> AppResult<CartView> {
        let quantity = input.quantity.unwrap_or(1);
        if quantity <= 0 {
            return Err(AppError::validation("quantity", "Quantity must be positive"));
        }

        let available = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS (SELECT 1 FROM products WHERE id = $1 AND status = 'active')",
        )
        .bind(input.product_id)
        .fetch_one(&self.db)
        .await?;

        if !available {
            return Err(AppError::NotFound("Product".to_string()));
        }

        sqlx::query(
            r#"
            INSERT INTO shopping_cart (customer_id, product_id, quantity)
            VALUES ($1, $2, $3)
            ON CONFLICT (customer_id, product_id)
            DO UPDATE SET quantity = shopping_cart.quantity + EXCLUDED.quantity
            "#,
        )
        .bind(customer_id)
        .bind(input.product_id)
        .bind(quantity)
        .execute(&self.db)
        .await?;

        self.get_cart(customer_id).await
    }

    /// Set a line's quantity; zero or less removes the line
    pub async fn set_quantity(
        &self,
        customer_id: Uuid,
        cart_id: Uuid,
        quantity: i32,
    ) -> AppResult<CartView> {
        if quantity <= 0 {
            return self.remove_item(customer_id, cart_id).await;
        }

        let result = sqlx::query(
            "UPDATE shopping_cart SET quantity = $3 WHERE id = $1 AND customer_id = $2",
        )
        .bind(cart_id)
        .bind(customer_id)
        .bind(quantity)
        .execute(&self.db)
        .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Cart item".to_string()));
        }

        self.get_cart(customer_id).await
    }

    pub async fn remove_item(&self, customer_id: Uuid, cart_id: Uuid) -> AppResult<CartView> {
        let result = sqlx::query("DELETE FROM shopping_cart WHERE id = $1 AND customer_id = $2")
            .bind(cart_id)
            .bind(customer_id)
            .execute(&self.db)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Cart item".to_string()));
        }

        self.get_cart(customer_id).await
    }
}
