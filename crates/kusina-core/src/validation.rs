//! # Validation Module
//!
//! Input validation for Kusina POS.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: UI shell                                                     │
//! │  ├── Basic format checks (empty, length)                               │
//! │  └── Immediate user feedback                                           │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: THIS MODULE (before any write)                               │
//! │  ├── Business rule validation                                          │
//! │  └── Rejects malformed payloads with typed ValidationErrors            │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Database (SQLite)                                            │
//! │  ├── NOT NULL / CHECK constraints                                      │
//! │  └── Foreign key constraints                                           │
//! │                                                                         │
//! │  Defense in depth: multiple layers catch different errors              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use crate::error::ValidationError;
use crate::types::{
    IngredientUpdate, NewEmployee, NewExpense, NewIngredient, NewProduct, NewRecipe, NewSale,
};

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

/// Longest accepted name for any entity.
pub const MAX_NAME_LEN: usize = 200;

// =============================================================================
// Field Validators
// =============================================================================

/// Validates an entity name: non-empty after trim, bounded length.
pub fn validate_name(name: &str) -> ValidationResult<()> {
    let name = name.trim();

    if name.is_empty() {
        return Err(ValidationError::Required {
            field: "name".to_string(),
        });
    }

    if name.len() > MAX_NAME_LEN {
        return Err(ValidationError::TooLong {
            field: "name".to_string(),
            max: MAX_NAME_LEN,
        });
    }

    Ok(())
}

/// Validates a money amount that must not be negative (prices, costs).
pub fn validate_non_negative_cents(field: &str, cents: i64) -> ValidationResult<()> {
    if cents < 0 {
        return Err(ValidationError::MustBeNonNegative {
            field: field.to_string(),
        });
    }
    Ok(())
}

/// Validates a quantity that must be strictly positive.
pub fn validate_positive_quantity(field: &str, quantity: f64) -> ValidationResult<()> {
    if !quantity.is_finite() || quantity <= 0.0 {
        return Err(ValidationError::MustBePositive {
            field: field.to_string(),
        });
    }
    Ok(())
}

// =============================================================================
// Payload Validators
// =============================================================================

/// Validates an ingredient creation payload.
pub fn validate_new_ingredient(payload: &NewIngredient) -> ValidationResult<()> {
    validate_name(&payload.name)?;
    validate_non_negative_cents("cost_per_unit", payload.cost_per_unit_cents)?;

    if payload.unit_type.trim().is_empty() {
        return Err(ValidationError::Required {
            field: "unit_type".to_string(),
        });
    }

    if payload.low_stock_threshold < 0.0 {
        return Err(ValidationError::MustBeNonNegative {
            field: "low_stock_threshold".to_string(),
        });
    }

    if let Some(opening) = payload.opening_stock {
        validate_positive_quantity("opening_stock", opening)?;
    }

    Ok(())
}

/// Validates an ingredient update payload.
pub fn validate_ingredient_update(payload: &IngredientUpdate) -> ValidationResult<()> {
    validate_name(&payload.name)?;
    validate_non_negative_cents("cost_per_unit", payload.cost_per_unit_cents)?;

    if payload.unit_type.trim().is_empty() {
        return Err(ValidationError::Required {
            field: "unit_type".to_string(),
        });
    }

    if payload.low_stock_threshold < 0.0 {
        return Err(ValidationError::MustBeNonNegative {
            field: "low_stock_threshold".to_string(),
        });
    }

    Ok(())
}

/// Validates a recipe creation payload.
///
/// Servings must be >= 1: cost_per_serving divides by it.
pub fn validate_new_recipe(payload: &NewRecipe) -> ValidationResult<()> {
    validate_name(&payload.name)?;

    if payload.servings < 1 {
        return Err(ValidationError::MustBePositive {
            field: "servings".to_string(),
        });
    }

    for item in &payload.items {
        validate_positive_quantity("quantity", item.quantity)?;
        if item.unit_type.trim().is_empty() {
            return Err(ValidationError::Required {
                field: "unit_type".to_string(),
            });
        }
    }

    Ok(())
}

/// Validates recipe servings on update.
pub fn validate_servings(servings: i64) -> ValidationResult<()> {
    if servings < 1 {
        return Err(ValidationError::MustBePositive {
            field: "servings".to_string(),
        });
    }
    Ok(())
}

/// Validates a product creation/update payload.
pub fn validate_new_product(payload: &NewProduct) -> ValidationResult<()> {
    validate_name(&payload.name)?;
    validate_non_negative_cents("selling_price", payload.selling_price_cents)?;
    Ok(())
}

/// Validates a sale payload before any row is written.
pub fn validate_new_sale(payload: &NewSale) -> ValidationResult<()> {
    if payload.items.is_empty() {
        return Err(ValidationError::Required {
            field: "items".to_string(),
        });
    }

    for item in &payload.items {
        if item.quantity < 1 {
            return Err(ValidationError::MustBePositive {
                field: "quantity".to_string(),
            });
        }
    }

    validate_non_negative_cents("discount_amount", payload.discount_amount_cents)?;
    validate_non_negative_cents("amount_received", payload.amount_received_cents)?;

    if !(0.0..=100.0).contains(&payload.discount_percent) {
        return Err(ValidationError::OutOfRange {
            field: "discount_percent".to_string(),
            min: 0,
            max: 100,
        });
    }

    Ok(())
}

/// Validates an employee payload.
pub fn validate_new_employee(payload: &NewEmployee) -> ValidationResult<()> {
    validate_name(&payload.name)?;
    validate_non_negative_cents("wage_rate", payload.wage_rate_cents)?;
    Ok(())
}

/// Validates an expense payload.
pub fn validate_new_expense(payload: &NewExpense) -> ValidationResult<()> {
    if payload.description.trim().is_empty() {
        return Err(ValidationError::Required {
            field: "description".to_string(),
        });
    }
    validate_non_negative_cents("amount", payload.amount_cents)?;
    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{NewRecipeItem, NewSaleItem, PaymentMethod};

    fn sale(items: Vec<NewSaleItem>) -> NewSale {
        NewSale {
            items,
            discount_amount_cents: 0,
            discount_percent: 0.0,
            payment_method: PaymentMethod::Cash,
            amount_received_cents: 10_000,
        }
    }

    #[test]
    fn test_validate_name() {
        assert!(validate_name("Pandesal").is_ok());
        assert!(validate_name("  ").is_err());
        assert!(validate_name(&"A".repeat(300)).is_err());
    }

    #[test]
    fn test_recipe_servings_must_be_positive() {
        let payload = NewRecipe {
            name: "Bread".to_string(),
            servings: 0,
            items: vec![],
        };
        assert!(matches!(
            validate_new_recipe(&payload),
            Err(ValidationError::MustBePositive { .. })
        ));
    }

    #[test]
    fn test_recipe_item_quantity_checked() {
        let payload = NewRecipe {
            name: "Bread".to_string(),
            servings: 4,
            items: vec![NewRecipeItem {
                ingredient_id: 1,
                quantity: -2.0,
                unit_type: "kg".to_string(),
            }],
        };
        assert!(validate_new_recipe(&payload).is_err());
    }

    #[test]
    fn test_empty_sale_rejected() {
        assert!(matches!(
            validate_new_sale(&sale(vec![])),
            Err(ValidationError::Required { .. })
        ));
    }

    #[test]
    fn test_sale_quantity_positive() {
        let payload = sale(vec![NewSaleItem {
            product_id: 1,
            quantity: 0,
        }]);
        assert!(validate_new_sale(&payload).is_err());
    }

    #[test]
    fn test_discount_percent_range() {
        let mut payload = sale(vec![NewSaleItem {
            product_id: 1,
            quantity: 1,
        }]);
        payload.discount_percent = 150.0;
        assert!(matches!(
            validate_new_sale(&payload),
            Err(ValidationError::OutOfRange { .. })
        ));
    }

    #[test]
    fn test_valid_sale_passes() {
        let payload = sale(vec![NewSaleItem {
            product_id: 1,
            quantity: 3,
        }]);
        assert!(validate_new_sale(&payload).is_ok());
    }
}
