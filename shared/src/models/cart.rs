//! Shopping cart and checkout models

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

/// A cart line joined with the product it refers to
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CartLine {
    pub id: Uuid,
    pub product_id: Uuid,
    pub product_name: String,
    pub image_url: Option<String>,
    pub unit_price: Decimal,
    pub quantity: i32,
}

impl CartLine {
    pub fn subtotal(&self) -> Decimal {
        self.unit_price * Decimal::from(self.quantity)
    }
}

/// Sum of price x quantity over the cart
pub fn cart_total(lines: &[CartLine]) -> Decimal {
    lines.iter().map(CartLine::subtotal).sum()
}

/// Contact details captured at checkout
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CheckoutContact {
    #[validate(length(min = 5, max = 32, message = "Phone number is required"))]
    pub phone: String,
    #[validate(email(message = "A valid email address is required"))]
    pub email: String,
    #[validate(length(min = 5, message = "Delivery address is required"))]
    pub address: String,
    pub notes: Option<String>,
}

/// Reject a checkout whose lines carry a non-positive price or quantity
pub fn validate_checkout_lines(lines: &[CartLine]) -> Result<(), &'static str> {
    if lines.is_empty() {
        return Err("Cart is empty");
    }
    if lines.iter().any(|line| line.unit_price <= Decimal::ZERO) {
        return Err("Some products have invalid prices");
    }
    if lines.iter().any(|line| line.quantity <= 0) {
        return Err("Cart quantities must be positive");
    }
    Ok(())
}
