//! Checkout and account validation tests
//!
//! Tests for storefront input rules including:
//! - Cart totals and rejected checkouts
//! - Checkout contact details
//! - Order number format
//! - Account and catalog field validation

use proptest::prelude::*;
use rust_decimal::Decimal;
use shared::{
    cart_total, generate_order_number, validate_checkout_lines, validate_email,
    validate_password, validate_sku, CartLine, CheckoutContact, ListFilter, Profile, Role,
};
use uuid::Uuid;
use validator::Validate;

fn line(cents: i64, quantity: i32) -> CartLine {
    CartLine {
        id: Uuid::new_v4(),
        product_id: Uuid::new_v4(),
        product_name: "Widget".to_string(),
        image_url: None,
        unit_price: Decimal::new(cents, 2),
        quantity,
    }
}

// ============================================================================
// Property Test Strategies
// ============================================================================

fn cart_strategy() -> impl Strategy<Value = Vec<(i64, i32)>> {
    proptest::collection::vec((1i64..=100_000i64, 1i32..=50), 1..10)
}

fn email_strategy() -> impl Strategy<Value = String> {
    "[a-z]{3,10}@[a-z]{3,8}\\.(com|org|net)"
}

// ============================================================================
// Unit Tests
// ============================================================================

#[cfg(test)]
mod unit_tests {
    use super::*;

    #[test]
    fn test_zero_priced_item_rejects_whole_checkout() {
        let lines = vec![line(1999, 1), line(0, 2)];
        assert_eq!(
            validate_checkout_lines(&lines),
            Err("Some products have invalid prices")
        );
    }

    #[test]
    fn test_empty_cart_rejected() {
        assert_eq!(validate_checkout_lines(&[]), Err("Cart is empty"));
    }

    #[test]
    fn test_contact_requires_address() {
        let contact = CheckoutContact {
            phone: "0812345678".to_string(),
            email: "buyer@example.com".to_string(),
            address: String::new(),
            notes: None,
        };
        let errors = contact.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("address"));
    }

    #[test]
    fn test_order_number_prefixes() {
        let order = generate_order_number("ORD", 1_700_000_000_000, 42);
        let procurement = generate_order_number("PO", 1_700_000_000_000, 42);
        assert!(order.starts_with("ORD-1700000000000-"));
        assert!(procurement.starts_with("PO-1700000000000-"));
        assert_eq!(order.len(), "ORD-1700000000000-".len() + 9);
    }

    #[test]
    fn test_profile_fallback_from_identity() {
        let id = Uuid::new_v4();
        let profile = Profile::from_identity(id, "jane@example.com", None, None);
        assert_eq!(profile.role, Role::Customer);
        assert_eq!(profile.display_name(), "jane@example.com");
        assert!(!profile.persisted);

        let supplier =
            Profile::from_identity(id, "s@example.com", Some("Sam Supply"), Some(Role::Supplier));
        assert_eq!(supplier.role, Role::Supplier);
        assert_eq!(supplier.display_name(), "Sam Supply");
    }

    #[test]
    fn test_order_search_filter() {
        let filter = ListFilter {
            status: None,
            search: Some("JANE@".to_string()),
        };
        assert!(filter.matches_search(&[Some("ORD-1-abc"), Some("jane@example.com")]));
        assert!(!filter.matches_search(&[Some("ORD-1-abc"), None]));
    }

    #[test]
    fn test_account_field_validation() {
        assert!(validate_email("owner@stockline.io").is_ok());
        assert!(validate_email("owner").is_err());
        assert!(validate_password("1234567").is_err());
        assert!(validate_sku("SKU-001").is_ok());
        assert!(validate_sku("SKU 001").is_err());
    }
}

// ============================================================================
// Property Tests
// ============================================================================

#[cfg(test)]
mod property_tests {
    use super::*;

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(100))]

        /// Order total = sum of price x quantity
        #[test]
        fn prop_cart_total_is_sum_of_subtotals(items in cart_strategy()) {
            let lines: Vec<_> = items.iter().map(|(cents, qty)| line(*cents, *qty)).collect();
            let expected: i64 = items.iter().map(|(cents, qty)| cents * i64::from(*qty)).sum();

            prop_assert_eq!(cart_total(&lines), Decimal::new(expected, 2));
            prop_assert!(validate_checkout_lines(&lines).is_ok());
        }

        /// Any non-positive price anywhere in the cart rejects the checkout
        #[test]
        fn prop_non_positive_price_rejects(
            items in cart_strategy(),
            bad_cents in -1_000i64..=0,
            position in 0usize..10
        ) {
            let mut lines: Vec<_> = items.iter().map(|(cents, qty)| line(*cents, *qty)).collect();
            let index = position % lines.len();
            lines[index].unit_price = Decimal::new(bad_cents, 2);

            prop_assert!(validate_checkout_lines(&lines).is_err());
        }

        /// Well-formed emails pass both validators
        #[test]
        fn prop_valid_email_accepted(email in email_strategy()) {
            prop_assert!(validate_email(&email).is_ok());
            let contact = CheckoutContact {
                phone: "0812345678".to_string(),
                email,
                address: "99 Harbour Road".to_string(),
                notes: None,
            };
            prop_assert!(contact.validate().is_ok());
        }

        /// Order number suffixes are nine base-36 characters
        #[test]
        fn prop_order_number_suffix(millis in 0i64..=4_000_000_000_000, seed in any::<u128>()) {
            let number = generate_order_number("ORD", millis, seed);
            let suffix = number.rsplit('-').next().unwrap_or_default();
            prop_assert_eq!(suffix.len(), 9);
            prop_assert!(suffix.chars().all(|c| c.is_ascii_digit() || c.is_ascii_lowercase()));
        }
    }
}
