//! WebAssembly module for the Stockline storefront and dashboard
//!
//! Provides client-side computation for:
//! - Order tracker rendering
//! - Stock adjustment previews
//! - Procurement totals
//! - Checkout form validation

use rust_decimal::Decimal;
use std::str::FromStr;
use validator::Validate;
use wasm_bindgen::prelude::*;

// Re-export shared types for use in JavaScript
pub use shared::models::*;
pub use shared::types::*;
pub use shared::validation::*;

/// Initialize the WASM module
#[wasm_bindgen(start)]
pub fn init() {
    // Set up panic hook for better error messages in browser console
    #[cfg(feature = "console_error_panic_hook")]
    console_error_panic_hook::set_once();
}

fn log(message: &str) {
    #[cfg(target_arch = "wasm32")]
    web_sys::console::warn_1(&JsValue::from_str(message));
    #[cfg(not(target_arch = "wasm32"))]
    let _ = message;
}

/// Tracker view for an order as JSON.
///
/// `timestamps_json` carries `confirmed_at`, `shipped_at`, `delivered_at` and
/// `received_at`; missing keys are treated as unset.
#[wasm_bindgen]
pub fn order_tracker_view(status: &str, timestamps_json: &str) -> Result<String, JsValue> {
    let status = OrderStatus::from_str(status).map_err(|e| JsValue::from_str(&e.to_string()))?;
    let timestamps: OrderTimestamps = if timestamps_json.trim().is_empty() {
        OrderTimestamps::default()
    } else {
        serde_json::from_str(timestamps_json)
            .map_err(|e| JsValue::from_str(&format!("Invalid timestamps JSON: {}", e)))?
    };

    serde_json::to_string(&order_tracker(status, &timestamps))
        .map_err(|e| JsValue::from_str(&e.to_string()))
}

/// Signed delta the server will apply for a transaction
#[wasm_bindgen]
pub fn preview_stock_delta(transaction_type: &str, quantity: i32) -> Result<i32, JsValue> {
    let kind =
        TransactionType::from_str(transaction_type).map_err(|e| JsValue::from_str(&e.to_string()))?;
    Ok(stock_delta(kind, quantity))
}

/// Stock level after a transaction, floored at zero
#[wasm_bindgen]
pub fn preview_new_stock(current_stock: i32, transaction_type: &str, quantity: i32) -> Result<i32, JsValue> {
    let delta = preview_stock_delta(transaction_type, quantity)?;
    let adjustment = apply_stock_delta(current_stock, delta);
    if adjustment.clamped > 0 {
        log(&format!(
            "Stock floor reached: {} units could not be deducted",
            adjustment.clamped
        ));
    }
    Ok(adjustment.new_stock)
}

/// Procurement order total as a decimal string
#[wasm_bindgen]
pub fn calculate_procurement_total(quantity: i32, unit_price: &str) -> Result<String, JsValue> {
    let price = Decimal::from_str(unit_price)
        .map_err(|e| JsValue::from_str(&format!("Invalid unit price: {}", e)))?;
    validate_procurement_line(quantity, price).map_err(|(_, message)| JsValue::from_str(message))?;
    procurement_total(quantity, price)
        .map(|total| total.to_string())
        .ok_or_else(|| JsValue::from_str("Order total is out of range"))
}

/// Whether a product should be flagged as low on stock
#[wasm_bindgen]
pub fn is_product_low_stock(stock_quantity: i32, min_stock_level: i32) -> bool {
    is_low_stock(stock_quantity, min_stock_level)
}

/// Validate the checkout form; returns the names of invalid fields
#[wasm_bindgen]
pub fn validate_checkout_contact(phone: &str, email: &str, address: &str) -> Vec<String> {
    let contact = CheckoutContact {
        phone: phone.to_string(),
        email: email.to_string(),
        address: address.to_string(),
        notes: None,
    };

    match contact.validate() {
        Ok(()) => Vec::new(),
        Err(errors) => {
            let mut fields: Vec<String> = errors
                .field_errors()
                .keys()
                .map(|field| field.to_string())
                .collect();
            fields.sort();
            fields
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tracker_view_json() {
        let json = order_tracker_view("in_transit", "").unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["kind"], "progress");
        assert_eq!(value["checkpoints"][2]["completed"], true);
        assert_eq!(value["checkpoints"][3]["completed"], false);
    }

    #[test]
    fn test_tracker_view_cancelled() {
        let json = order_tracker_view(
            "cancelled",
            r#"{"confirmed_at":"2024-01-01T00:00:00Z"}"#,
        )
        .unwrap();
        assert!(json.contains("Order Cancelled"));
    }

    #[test]
    fn test_preview_new_stock() {
        assert_eq!(preview_new_stock(10, "sale", 4).unwrap(), 6);
        assert_eq!(preview_new_stock(3, "return", 5).unwrap(), 0);
        assert_eq!(preview_new_stock(3, "adjustment", -1).unwrap(), 2);
        assert_eq!(preview_stock_delta("purchase", 7).unwrap(), 7);
    }

    #[test]
    fn test_procurement_total() {
        assert_eq!(calculate_procurement_total(10, "25.00").unwrap(), "250.00");
    }

    #[test]
    fn test_low_stock() {
        assert!(is_product_low_stock(10, 10));
        assert!(!is_product_low_stock(11, 10));
    }

    #[test]
    fn test_checkout_contact_fields() {
        assert!(validate_checkout_contact("0812345678", "a@b.co", "1 Main Street").is_empty());
        assert_eq!(
            validate_checkout_contact("", "nope", "1 Main Street"),
            vec!["email".to_string(), "phone".to_string()]
        );
    }
}
