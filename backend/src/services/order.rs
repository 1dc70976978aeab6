//! Order service: checkout, order listings and status updates

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use shared::{
    advance, cart_total, generate_order_number, order_tracker, validate_checkout_lines, CartLine,
    CheckoutContact, ListFilter, Order, OrderItem, OrderStatus, OrderTimestamps, Role,
    TrackerView, TransitionPolicy,
};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;
use validator::Validate;

use crate::error::{AppError, AppResult};
use crate::middleware::AuthUser;
use crate::services::cart::{CartLineRow, CART_LINES_QUERY};

/// Prefix of customer order numbers
const ORDER_NUMBER_PREFIX: &str = "ORD";

#[derive(Clone)]
pub struct OrderService {
    db: PgPool,
}

#[derive(Debug, FromRow)]
pub struct OrderRow {
    pub id: Uuid,
    pub order_number: String,
    pub customer_id: Uuid,
    pub supplier_id: Option<Uuid>,
    pub total_amount: Decimal,
    pub order_status: String,
    pub confirmed_at: Option<DateTime<Utc>>,
    pub shipped_at: Option<DateTime<Utc>>,
    pub delivered_at: Option<DateTime<Utc>>,
    pub received_at: Option<DateTime<Utc>>,
    pub customer_phone: Option<String>,
    pub customer_email: Option<String>,
    pub delivery_address: Option<String>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl OrderRow {
    pub fn into_order(self) -> AppResult<Order> {
        let order_status = self
            .order_status
            .parse::<OrderStatus>()
            .map_err(|e| AppError::Internal(e.to_string()))?;

        Ok(Order {
            id: self.id,
            order_number: self.order_number,
            customer_id: self.customer_id,
            supplier_id: self.supplier_id,
            total_amount: self.total_amount,
            order_status,
            timestamps: OrderTimestamps {
                confirmed_at: self.confirmed_at,
                shipped_at: self.shipped_at,
                delivered_at: self.delivered_at,
                received_at: self.received_at,
            },
            customer_phone: self.customer_phone,
            customer_email: self.customer_email,
            delivery_address: self.delivery_address,
            notes: self.notes,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

#[derive(Debug, FromRow)]
struct OrderItemRow {
    id: Uuid,
    order_id: Uuid,
    product_id: Uuid,
    quantity: i32,
    unit_price: Decimal,
    subtotal: Decimal,
    product_name: String,
}

/// Order line with the product name
#[derive(Debug, Serialize)]
pub struct OrderItemView {
    #[serde(flatten)]
    pub item: OrderItem,
    pub product_name: String,
}

/// An order with its lines and progress tracker
#[derive(Debug, Serialize)]
pub struct OrderDetail {
    #[serde(flatten)]
    pub order: Order,
    pub items: Vec<OrderItemView>,
    pub tracker: TrackerView,
}

const ORDER_COLUMNS: &str = "id, order_number, customer_id, supplier_id, total_amount, order_status, \
     confirmed_at, shipped_at, delivered_at, received_at, customer_phone, customer_email, \
     delivery_address, notes, created_at, updated_at";

/// Whether `user` may see `order`: the customer who placed it, the supplier
/// fulfilling it, or any admin
pub fn order_visible_to(order: &Order, user: &AuthUser) -> bool {
    match user.role {
        Role::Admin => true,
        Role::Supplier => order.supplier_id == Some(user.user_id),
        Role::Customer => order.customer_id == user.user_id,
    }
}

fn into_orders(rows: Vec<OrderRow>) -> AppResult<Vec<Order>> {
    rows.into_iter().map(OrderRow::into_order).collect()
}

impl OrderService {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// Turn the customer's cart into an order.
    ///
    /// Order, lines and the cart clear commit in one transaction; a line with
    /// a non-positive price rejects the whole checkout.
    pub async fn checkout(
        &self,
        customer_id: Uuid,
        contact: CheckoutContact,
    ) -> AppResult<OrderDetail> {
        contact.validate()?;

        let mut tx = self.db.begin().await?;

        let lines: Vec<CartLine> = sqlx::query_as::<_, CartLineRow>(CART_LINES_QUERY)
            .bind(customer_id)
            .fetch_all(&mut *tx)
            .await?
            .into_iter()
            .map(CartLine::from)
            .collect();

        validate_checkout_lines(&lines).map_err(|m| AppError::ValidationError(m.to_string()))?;
        let total = cart_total(&lines);

        // Orders are fulfilled by the first admin; without one the customer is recorded
        let supplier_id = sqlx::query_scalar::<_, Uuid>(
            "SELECT id FROM profiles WHERE role = 'admin' ORDER BY created_at LIMIT 1",
        )
        .fetch_optional(&mut *tx)
        .await?
        .unwrap_or(customer_id);

        let order_number = generate_order_number(
            ORDER_NUMBER_PREFIX,
            Utc::now().timestamp_millis(),
            Uuid::new_v4().as_u128(),
        );

        let order = sqlx::query_as::<_, OrderRow>(&format!(
            r#"
            INSERT INTO orders (order_number, customer_id, supplier_id, total_amount, order_status,
                                customer_phone, customer_email, delivery_address, notes)
            VALUES ($1, $2, $3, $4, 'pending', $5, $6, $7, $8)
            RETURNING {}
            "#,
            ORDER_COLUMNS
        ))
        .bind(&order_number)
        .bind(customer_id)
        .bind(supplier_id)
        .bind(total)
        .bind(&contact.phone)
        .bind(&contact.email)
        .bind(&contact.address)
        .bind(&contact.notes)
        .fetch_one(&mut *tx)
        .await?
        .into_order()?;

        let mut items = Vec::with_capacity(lines.len());
        for line in &lines {
            let item_id = sqlx::query_scalar::<_, Uuid>(
                r#"
                INSERT INTO order_items (order_id, product_id, quantity, unit_price, subtotal)
                VALUES ($1, $2, $3, $4, $5)
                RETURNING id
                "#,
            )
            .bind(order.id)
            .bind(line.product_id)
            .bind(line.quantity)
            .bind(line.unit_price)
            .bind(line.subtotal())
            .fetch_one(&mut *tx)
            .await?;

            items.push(OrderItemView {
                item: OrderItem {
                    id: item_id,
                    order_id: order.id,
                    product_id: line.product_id,
                    quantity: line.quantity,
                    unit_price: line.unit_price,
                    subtotal: line.subtotal(),
                },
                product_name: line.product_name.clone(),
            });
        }

        sqlx::query("DELETE FROM shopping_cart WHERE customer_id = $1")
            .bind(customer_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        tracing::info!(
            order_id = %order.id,
            order_number = %order.order_number,
            total = %order.total_amount,
            lines = items.len(),
            "Order placed"
        );

        let tracker = order_tracker(order.order_status, &order.timestamps);
        Ok(OrderDetail {
            order,
            items,
            tracker,
        })
    }

    /// The customer's own orders, newest first
    pub async fn list_customer_orders(&self, customer_id: Uuid) -> AppResult<Vec<Order>> {
        let rows = sqlx::query_as::<_, OrderRow>(&format!(
            "SELECT {} FROM orders WHERE customer_id = $1 ORDER BY created_at DESC",
            ORDER_COLUMNS
        ))
        .bind(customer_id)
        .fetch_all(&self.db)
        .await?;

        into_orders(rows)
    }

    /// Orders to fulfil: all for the admin, the supplier's own otherwise.
    /// Filtered by status and by a search over order number and customer email.
    pub async fn list_staff_orders(
        &self,
        user: &AuthUser,
        filter: &ListFilter,
    ) -> AppResult<Vec<Order>> {
        let status = match filter.status.as_deref().filter(|s| !s.is_empty() && *s != "all") {
            Some(s) => Some(
                s.parse::<OrderStatus>()
                    .map_err(|e| AppError::validation("status", e.to_string()))?,
            ),
            None => None,
        };

        let rows = sqlx::query_as::<_, OrderRow>(&format!(
            r#"
            SELECT {}
            FROM orders
            WHERE ($1 OR supplier_id = $2)
              AND ($3::TEXT IS NULL OR order_status = $3)
            ORDER BY created_at DESC
            "#,
            ORDER_COLUMNS
        ))
        .bind(user.is_admin())
        .bind(user.user_id)
        .bind(status.map(|s| s.as_str()))
        .fetch_all(&self.db)
        .await?;

        Ok(into_orders(rows)?
            .into_iter()
            .filter(|o| {
                filter.matches_search(&[Some(o.order_number.as_str()), o.customer_email.as_deref()])
            })
            .collect())
    }

    /// Order with lines and tracker, if visible to the caller
    pub async fn get_order_detail(&self, user: &AuthUser, order_id: Uuid) -> AppResult<OrderDetail> {
        let order = self.get_visible_order(user, order_id).await?;

        let items = sqlx::query_as::<_, OrderItemRow>(
            r#"
            SELECT i.id, i.order_id, i.product_id, i.quantity, i.unit_price, i.subtotal,
                   p.name AS product_name
            FROM order_items i
            JOIN products p ON p.id = i.product_id
            WHERE i.order_id = $1
            ORDER BY p.name
            "#,
        )
        .bind(order_id)
        .fetch_all(&self.db)
        .await?
        .into_iter()
        .map(|row| OrderItemView {
            item: OrderItem {
                id: row.id,
                order_id: row.order_id,
                product_id: row.product_id,
                quantity: row.quantity,
                unit_price: row.unit_price,
                subtotal: row.subtotal,
            },
            product_name: row.product_name,
        })
        .collect();

        let tracker = order_tracker(order.order_status, &order.timestamps);
        Ok(OrderDetail {
            order,
            items,
            tracker,
        })
    }

    /// Move an order to `requested` on behalf of `user`.
    ///
    /// The write only applies if the stored status is still the one the
    /// decision was made on; otherwise the caller gets a conflict.
    pub async fn update_status(
        &self,
        user: &AuthUser,
        order_id: Uuid,
        requested: OrderStatus,
        policy: TransitionPolicy,
    ) -> AppResult<Order> {
        let order = self.get_visible_order(user, order_id).await?;

        let transition = advance(order.order_status, requested, user.role, policy)?;
        if transition.is_noop() {
            return Ok(order);
        }

        let stamp = transition
            .stamp
            .map(|field| format!(", {} = NOW()", field.column()))
            .unwrap_or_default();

        let updated = sqlx::query_as::<_, OrderRow>(&format!(
            r#"
            UPDATE orders
            SET order_status = $1, updated_at = NOW(){}
            WHERE id = $2 AND order_status = $3
            RETURNING {}
            "#,
            stamp, ORDER_COLUMNS
        ))
        .bind(transition.to.as_str())
        .bind(order_id)
        .bind(transition.from.as_str())
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::Conflict {
            resource: "order".to_string(),
            message: "Order status was changed by someone else; reload and try again"
                .to_string(),
        })?
        .into_order()?;

        tracing::info!(
            order_id = %order_id,
            from = %transition.from,
            to = %transition.to,
            role = %user.role,
            "Order status updated"
        );

        Ok(updated)
    }

    async fn get_visible_order(&self, user: &AuthUser, order_id: Uuid) -> AppResult<Order> {
        let order = sqlx::query_as::<_, OrderRow>(&format!(
            "SELECT {} FROM orders WHERE id = $1",
            ORDER_COLUMNS
        ))
        .bind(order_id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Order".to_string()))?
        .into_order()?;

        if !order_visible_to(&order, user) {
            return Err(AppError::NotFound("Order".to_string()));
        }

        Ok(order)
    }
}
