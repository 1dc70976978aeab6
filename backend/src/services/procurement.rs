//! Procurement service: purchase orders from the admin to suppliers

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use shared::{
    confirm_receipt, generate_order_number, procurement_total, update_delivery_status,
    validate_procurement_line, DeliveryStatus, DeliveryTransition, ListFilter, ProcurementOrder,
    Role, TransitionPolicy,
};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::middleware::AuthUser;

/// Prefix of procurement order numbers
const PROCUREMENT_NUMBER_PREFIX: &str = "PO";

#[derive(Clone)]
pub struct ProcurementService {
    db: PgPool,
}

#[derive(Debug, Deserialize)]
pub struct CreateProcurementInput {
    pub supplier_id: Uuid,
    pub product_name: String,
    pub product_sku: String,
    pub category: Option<String>,
    pub description: Option<String>,
    pub quantity: i32,
    pub unit_price: Decimal,
    pub notes: Option<String>,
}

/// Supplier progress report
#[derive(Debug, Deserialize)]
pub struct UpdateDeliveryInput {
    pub delivery_status: DeliveryStatus,
    /// Left unchanged when omitted
    pub notes: Option<String>,
}

/// Procurement order with the supplier's display name
#[derive(Debug, Serialize)]
pub struct ProcurementListing {
    #[serde(flatten)]
    pub order: ProcurementOrder,
    pub supplier_name: String,
}

#[derive(Debug, FromRow)]
pub struct ProcurementRow {
    pub id: Uuid,
    pub order_number: String,
    pub admin_id: Uuid,
    pub supplier_id: Uuid,
    pub product_name: String,
    pub product_sku: String,
    pub category: Option<String>,
    pub description: Option<String>,
    pub quantity: i32,
    pub unit_price: Decimal,
    pub total_amount: Decimal,
    pub delivery_status: String,
    pub notes: Option<String>,
    pub ordered_at: DateTime<Utc>,
    pub delivered_at: Option<DateTime<Utc>>,
    pub received_at: Option<DateTime<Utc>>,
}

impl ProcurementRow {
    pub fn into_order(self) -> AppResult<ProcurementOrder> {
        let delivery_status = self
            .delivery_status
            .parse::<DeliveryStatus>()
            .map_err(|e| AppError::Internal(e.to_string()))?;

        Ok(ProcurementOrder {
            id: self.id,
            order_number: self.order_number,
            admin_id: self.admin_id,
            supplier_id: self.supplier_id,
            product_name: self.product_name,
            product_sku: self.product_sku,
            category: self.category,
            description: self.description,
            quantity: self.quantity,
            unit_price: self.unit_price,
            total_amount: self.total_amount,
            delivery_status,
            notes: self.notes,
            ordered_at: self.ordered_at,
            delivered_at: self.delivered_at,
            received_at: self.received_at,
        })
    }
}

#[derive(Debug, FromRow)]
struct ListingRow {
    #[sqlx(flatten)]
    order: ProcurementRow,
    supplier_name: Option<String>,
}

const PROCUREMENT_COLUMNS: &str = "id, order_number, admin_id, supplier_id, product_name, product_sku, \
     category, description, quantity, unit_price, total_amount, delivery_status, notes, \
     ordered_at, delivered_at, received_at";

impl ProcurementService {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// Place a procurement order; the total is computed here, not taken from input
    pub async fn create_order(
        &self,
        admin: &AuthUser,
        input: CreateProcurementInput,
    ) -> AppResult<ProcurementOrder> {
        if input.product_name.trim().is_empty() {
            return Err(AppError::validation("product_name", "Product name is required"));
        }
        if input.product_sku.trim().is_empty() {
            return Err(AppError::validation("product_sku", "Product SKU is required"));
        }
        validate_procurement_line(input.quantity, input.unit_price)
            .map_err(|(field, message)| AppError::validation(field, message))?;

        let is_supplier = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS (SELECT 1 FROM profiles WHERE id = $1 AND role = 'supplier')",
        )
        .bind(input.supplier_id)
        .fetch_one(&self.db)
        .await?;

        if !is_supplier {
            return Err(AppError::validation("supplier_id", "Unknown supplier"));
        }

        let total_amount = procurement_total(input.quantity, input.unit_price)
            .ok_or_else(|| AppError::validation("unit_price", "Order total is out of range"))?;
        let order_number = generate_order_number(
            PROCUREMENT_NUMBER_PREFIX,
            Utc::now().timestamp_millis(),
            Uuid::new_v4().as_u128(),
        );

        let order = sqlx::query_as::<_, ProcurementRow>(&format!(
            r#"
            INSERT INTO procurement_orders (order_number, admin_id, supplier_id, product_name,
                product_sku, category, description, quantity, unit_price, total_amount,
                delivery_status, notes)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, 'pending', $11)
            RETURNING {}
            "#,
            PROCUREMENT_COLUMNS
        ))
        .bind(&order_number)
        .bind(admin.user_id)
        .bind(input.supplier_id)
        .bind(input.product_name.trim())
        .bind(input.product_sku.trim())
        .bind(&input.category)
        .bind(&input.description)
        .bind(input.quantity)
        .bind(input.unit_price)
        .bind(total_amount)
        .bind(&input.notes)
        .fetch_one(&self.db)
        .await?
        .into_order()?;

        tracing::info!(
            procurement_id = %order.id,
            order_number = %order.order_number,
            supplier_id = %order.supplier_id,
            total = %order.total_amount,
            "Procurement order created"
        );

        Ok(order)
    }

    /// All procurement orders (admin) or the supplier's own, with search over
    /// product name, SKU and order number
    pub async fn list_orders(
        &self,
        user: &AuthUser,
        filter: &ListFilter,
    ) -> AppResult<Vec<ProcurementListing>> {
        let status = match filter.status.as_deref().filter(|s| !s.is_empty() && *s != "all") {
            Some(s) => Some(
                s.parse::<DeliveryStatus>()
                    .map_err(|e| AppError::validation("status", e.to_string()))?,
            ),
            None => None,
        };

        let rows = sqlx::query_as::<_, ListingRow>(
            r#"
            SELECT o.id, o.order_number, o.admin_id, o.supplier_id, o.product_name, o.product_sku,
                   o.category, o.description, o.quantity, o.unit_price, o.total_amount,
                   o.delivery_status, o.notes, o.ordered_at, o.delivered_at, o.received_at,
                   COALESCE(p.full_name, p.email) AS supplier_name
            FROM procurement_orders o
            LEFT JOIN profiles p ON p.id = o.supplier_id
            WHERE ($1 OR o.supplier_id = $2)
              AND ($3::TEXT IS NULL OR o.delivery_status = $3)
            ORDER BY o.ordered_at DESC
            "#,
        )
        .bind(user.is_admin())
        .bind(user.user_id)
        .bind(status.map(|s| s.as_str()))
        .fetch_all(&self.db)
        .await?;

        let mut listings = Vec::with_capacity(rows.len());
        for row in rows {
            let order = row.order.into_order()?;
            if !filter.matches_search(&[
                Some(order.product_name.as_str()),
                Some(order.product_sku.as_str()),
                Some(order.order_number.as_str()),
            ]) {
                continue;
            }
            listings.push(ProcurementListing {
                order,
                supplier_name: row.supplier_name.unwrap_or_else(|| "Unknown".to_string()),
            });
        }

        Ok(listings)
    }

    /// Supplier status report; notes default to the stored notes
    pub async fn update_delivery(
        &self,
        user: &AuthUser,
        order_id: Uuid,
        input: UpdateDeliveryInput,
        policy: TransitionPolicy,
    ) -> AppResult<ProcurementOrder> {
        let order = self.get_order(order_id).await?;
        if user.role == Role::Supplier && order.supplier_id != user.user_id {
            return Err(AppError::NotFound("Procurement order".to_string()));
        }

        let transition =
            update_delivery_status(order.delivery_status, input.delivery_status, user.role, policy)?;
        let notes = input.notes.or(order.notes);

        self.apply_transition(order_id, transition, notes.as_deref(), user)
            .await
    }

    /// Admin confirmation that a delivered order arrived
    pub async fn confirm_receipt(
        &self,
        user: &AuthUser,
        order_id: Uuid,
    ) -> AppResult<ProcurementOrder> {
        let order = self.get_order(order_id).await?;
        let transition = confirm_receipt(order.delivery_status, user.role)?;

        self.apply_transition(order_id, transition, order.notes.as_deref(), user)
            .await
    }

    async fn get_order(&self, order_id: Uuid) -> AppResult<ProcurementOrder> {
        sqlx::query_as::<_, ProcurementRow>(&format!(
            "SELECT {} FROM procurement_orders WHERE id = $1",
            PROCUREMENT_COLUMNS
        ))
        .bind(order_id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Procurement order".to_string()))?
        .into_order()
    }

    /// Compare-and-set write of an accepted delivery transition
    async fn apply_transition(
        &self,
        order_id: Uuid,
        transition: DeliveryTransition,
        notes: Option<&str>,
        user: &AuthUser,
    ) -> AppResult<ProcurementOrder> {
        let stamp = transition
            .stamp
            .map(|field| format!(", {} = NOW()", field.column()))
            .unwrap_or_default();

        let order = sqlx::query_as::<_, ProcurementRow>(&format!(
            r#"
            UPDATE procurement_orders
            SET delivery_status = $1, notes = $2{}
            WHERE id = $3 AND delivery_status = $4
            RETURNING {}
            "#,
            stamp, PROCUREMENT_COLUMNS
        ))
        .bind(transition.to.as_str())
        .bind(notes)
        .bind(order_id)
        .bind(transition.from.as_str())
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::Conflict {
            resource: "procurement_order".to_string(),
            message: "Delivery status was changed by someone else; reload and try again"
                .to_string(),
        })?
        .into_order()?;

        tracing::info!(
            procurement_id = %order_id,
            from = %transition.from,
            to = %transition.to,
            role = %user.role,
            "Delivery status updated"
        );

        Ok(order)
    }
}
