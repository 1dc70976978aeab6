//! Validation utilities for the Stockline platform

use rust_decimal::Decimal;

// ============================================================================
// Account Validations
// ============================================================================

/// Validate email format (basic check)
pub fn validate_email(email: &str) -> Result<(), &'static str> {
    if email.contains('@') && email.contains('.') && email.len() >= 5 {
        Ok(())
    } else {
        Err("Invalid email format")
    }
}

/// Validate password strength
pub fn validate_password(password: &str) -> Result<(), &'static str> {
    if password.len() < 8 {
        return Err("Password must be at least 8 characters");
    }
    Ok(())
}

// ============================================================================
// Catalog Validations
// ============================================================================

/// Validate SKU format (1-64 chars of letters, digits, dash, underscore, dot)
pub fn validate_sku(sku: &str) -> Result<(), &'static str> {
    if sku.trim().is_empty() {
        return Err("SKU is required");
    }
    if sku.len() > 64 {
        return Err("SKU must be at most 64 characters");
    }
    if !sku
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'))
    {
        return Err("SKU may only contain letters, digits, '-', '_' and '.'");
    }
    Ok(())
}

/// Validate a catalog price
pub fn validate_price(price: Decimal) -> Result<(), &'static str> {
    if price < Decimal::ZERO {
        return Err("Price cannot be negative");
    }
    Ok(())
}

/// Validate an inventory transaction quantity
pub fn validate_transaction_quantity(quantity: i32) -> Result<(), &'static str> {
    if quantity == 0 {
        return Err("Quantity must not be zero");
    }
    Ok(())
}

/// Largest unit price a `NUMERIC(12, 2)` column holds (9999999999.99)
pub const MAX_UNIT_PRICE: Decimal = Decimal::from_parts(0xD4A5_0FFF, 0xE8, 0, false, 2);

/// Validate a procurement line; errors carry the offending field
pub fn validate_procurement_line(
    quantity: i32,
    unit_price: Decimal,
) -> Result<(), (&'static str, &'static str)> {
    if quantity <= 0 {
        return Err(("quantity", "Quantity must be positive"));
    }
    if unit_price <= Decimal::ZERO {
        return Err(("unit_price", "Unit price must be positive"));
    }
    if unit_price > MAX_UNIT_PRICE {
        return Err(("unit_price", "Unit price is too large"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_validate_email() {
        assert!(validate_email("supplier@example.com").is_ok());
        assert!(validate_email("nope").is_err());
    }

    #[test]
    fn test_validate_password() {
        assert!(validate_password("short").is_err());
        assert!(validate_password("long-enough").is_ok());
    }

    #[test]
    fn test_validate_sku() {
        assert!(validate_sku("ARB-1KG_01").is_ok());
        assert!(validate_sku("").is_err());
        assert!(validate_sku("has space").is_err());
        assert!(validate_sku(&"X".repeat(65)).is_err());
    }

    #[test]
    fn test_validate_quantity() {
        assert!(validate_transaction_quantity(0).is_err());
        assert!(validate_transaction_quantity(-3).is_ok());
    }

    #[test]
    fn test_validate_procurement_line() {
        assert!(validate_procurement_line(10, Decimal::from_str("25.00").unwrap()).is_ok());
        assert!(validate_procurement_line(0, Decimal::ONE).is_err());
        assert!(validate_procurement_line(1, Decimal::ZERO).is_err());
    }

    #[test]
    fn test_procurement_price_upper_bound() {
        assert_eq!(MAX_UNIT_PRICE, Decimal::from_str("9999999999.99").unwrap());
        assert!(validate_procurement_line(1, MAX_UNIT_PRICE).is_ok());
        assert_eq!(
            validate_procurement_line(2, Decimal::MAX),
            Err(("unit_price", "Unit price is too large"))
        );
        assert_eq!(
            validate_procurement_line(0, Decimal::MAX),
            Err(("quantity", "Quantity must be positive"))
        );
    }

    #[test]
    fn test_validate_price() {
        assert!(validate_price(Decimal::ZERO).is_ok());
        assert!(validate_price(Decimal::from(-1)).is_err());
    }
}
