//! # Domain Types
//!
//! Core domain types used throughout Kusina POS.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌──────────────┐    ┌──────────────┐    ┌──────────────────────────┐  │
//! │  │  Ingredient  │◄───┤  RecipeItem  ├───►│         Recipe           │  │
//! │  │  cost/unit   │    │  quantity    │    │  total_cost (derived)    │  │
//! │  │  stock (der.)│    │  unit_type   │    │  cost_per_serving (der.) │  │
//! │  └──────▲───────┘    └──────────────┘    └────────────▲─────────────┘  │
//! │         │                                             │ recipe_id?     │
//! │  ┌──────┴──────────────┐    ┌──────────────┐    ┌─────┴────────┐      │
//! │  │InventoryTransaction │    │   SaleItem   ├───►│   Product    │      │
//! │  │  append-only ledger │    │  qty × price │    │ selling_price│      │
//! │  └─────────────────────┘    └──────┬───────┘    └──────────────┘      │
//! │                                    │ sale_id                           │
//! │                             ┌──────▼───────┐                           │
//! │                             │     Sale     │  immutable after create   │
//! │                             └──────────────┘                           │
//! │                                                                         │
//! │  Employee / Expense: back-office tables feeding break-even analysis    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Conventions
//! - Every entity has an `i64` AUTOINCREMENT id, `created_at`/`updated_at`
//!   local timestamps, and an `is_active` soft-delete flag - except the
//!   append-only ledger rows and sale line items, which are immutable and
//!   live or die with their owner.
//! - Money fields are stored as integer centavos (`*_cents`) with `Money`
//!   accessors; quantities are `f64` (fractional kilos, liters, pieces).

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::ValidationError;
use crate::money::Money;

// =============================================================================
// Enumerated Fields
// =============================================================================
// Each enum mirrors a CHECK constraint in the schema. The snake_case rename
// must match the stored TEXT exactly, or round-tripping through SQLite fails.

macro_rules! impl_enum_str {
    ($ty:ident, $field:literal, { $($variant:ident => $text:literal),+ $(,)? }) => {
        impl $ty {
            /// Returns the canonical stored string for this variant.
            pub const fn as_str(&self) -> &'static str {
                match self {
                    $($ty::$variant => $text),+
                }
            }
        }

        impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $ty {
            type Err = ValidationError;

            /// Parses the stored/boundary string form. Unknown values are a
            /// `ValidationError`, rejected before any write.
            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($text => Ok($ty::$variant),)+
                    _ => Err(ValidationError::NotAllowed {
                        field: $field.to_string(),
                        allowed: vec![$($text.to_string()),+],
                    }),
                }
            }
        }
    };
}

/// Type of an inventory ledger entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "snake_case"))]
#[serde(rename_all = "snake_case")]
pub enum TransactionType {
    /// Operator received stock (delivery, purchase).
    StockIn,
    /// Operator removed stock (spoilage, transfer out).
    StockOut,
    /// Operator correction; the only type that carries its own sign.
    Adjustment,
    /// Generated by the sale-recording flow, never by operators.
    Sale,
}

impl_enum_str!(TransactionType, "transaction_type", {
    StockIn => "stock_in",
    StockOut => "stock_out",
    Adjustment => "adjustment",
    Sale => "sale",
});

/// Product category shown on the register grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "snake_case"))]
#[serde(rename_all = "snake_case")]
pub enum ProductCategory {
    Food,
    Beverage,
    Dessert,
    Snack,
    Other,
}

impl_enum_str!(ProductCategory, "category", {
    Food => "food",
    Beverage => "beverage",
    Dessert => "dessert",
    Snack => "snack",
    Other => "other",
});

/// How the customer paid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "snake_case"))]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    Cash,
    Gcash,
    Maya,
    Card,
    Other,
}

impl_enum_str!(PaymentMethod, "payment_method", {
    Cash => "cash",
    Gcash => "gcash",
    Maya => "maya",
    Card => "card",
    Other => "other",
});

/// Employee role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "snake_case"))]
#[serde(rename_all = "snake_case")]
pub enum EmployeeRole {
    Owner,
    Cashier,
    Staff,
}

impl_enum_str!(EmployeeRole, "role", {
    Owner => "owner",
    Cashier => "cashier",
    Staff => "staff",
});

/// How an employee's wage is quoted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "snake_case"))]
#[serde(rename_all = "snake_case")]
pub enum WageType {
    Hourly,
    Daily,
    Monthly,
}

impl_enum_str!(WageType, "wage_type", {
    Hourly => "hourly",
    Daily => "daily",
    Monthly => "monthly",
});

/// Expense bucket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "snake_case"))]
#[serde(rename_all = "snake_case")]
pub enum ExpenseCategory {
    Rent,
    Utilities,
    Supplies,
    Labor,
    Other,
}

impl_enum_str!(ExpenseCategory, "category", {
    Rent => "rent",
    Utilities => "utilities",
    Supplies => "supplies",
    Labor => "labor",
    Other => "other",
});

/// Recurrence of an expense. One-off expenses store NULL (Option::None).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "snake_case"))]
#[serde(rename_all = "snake_case")]
pub enum RecurrenceType {
    Daily,
    Monthly,
}

impl_enum_str!(RecurrenceType, "recurrence_type", {
    Daily => "daily",
    Monthly => "monthly",
});

// =============================================================================
// Ingredient
// =============================================================================

/// A raw material tracked in inventory and priced per unit.
///
/// `quantity_in_stock` is DERIVED: it always equals the signed sum of the
/// ingredient's ledger rows and is only ever written by the inventory ledger,
/// inside the same transaction as the ledger append.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Ingredient {
    pub id: i64,
    pub name: String,
    /// Cost per unit in centavos. Changing this re-triggers recipe costing.
    pub cost_per_unit_cents: i64,
    /// Unit label: "kg", "g", "L", "pc", ...
    pub unit_type: String,
    /// Derived stock level. Never hand-edited; see module docs.
    pub quantity_in_stock: f64,
    /// Threshold below which the ingredient shows on the low-stock list.
    pub low_stock_threshold: f64,
    pub supplier: Option<String>,
    pub expiration_date: Option<NaiveDate>,
    pub is_active: bool,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl Ingredient {
    /// Returns the unit cost as Money.
    #[inline]
    pub fn cost_per_unit(&self) -> Money {
        Money::from_cents(self.cost_per_unit_cents)
    }

    /// True when stock has fallen to or below the configured threshold.
    #[inline]
    pub fn is_low_stock(&self) -> bool {
        self.quantity_in_stock <= self.low_stock_threshold
    }
}

/// Payload for creating an ingredient.
///
/// `opening_stock`, when present, is recorded through the ledger as a
/// `stock_in` transaction in the same write, so the stock invariant holds
/// from the first row.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewIngredient {
    pub name: String,
    pub cost_per_unit_cents: i64,
    pub unit_type: String,
    pub low_stock_threshold: f64,
    pub supplier: Option<String>,
    pub expiration_date: Option<NaiveDate>,
    pub opening_stock: Option<f64>,
}

/// Payload for updating an ingredient's editable fields.
///
/// Stock is deliberately absent: stock changes only flow through the ledger.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IngredientUpdate {
    pub name: String,
    pub cost_per_unit_cents: i64,
    pub unit_type: String,
    pub low_stock_threshold: f64,
    pub supplier: Option<String>,
    pub expiration_date: Option<NaiveDate>,
}

// =============================================================================
// Inventory Transaction (ledger row)
// =============================================================================

/// One immutable stock movement.
///
/// Ledger rows are append-only: there is no update or delete path anywhere in
/// the API, and the current stock level is always the signed sum of these
/// rows. Rows store the signed delta directly (a `sale` of 6 kg is -6.0).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct InventoryTransaction {
    pub id: i64,
    pub ingredient_id: i64,
    pub transaction_type: TransactionType,
    /// Signed quantity delta in the ingredient's unit.
    pub quantity: f64,
    /// Unit cost snapshot at the time of the movement, when known.
    pub unit_cost_cents: Option<i64>,
    /// Links back to the sale or adjustment that caused this movement.
    pub reference_id: Option<i64>,
    pub created_at: NaiveDateTime,
}

// =============================================================================
// Recipe
// =============================================================================

/// A priced recipe. Both cost fields are DERIVED by the costing engine and
/// never hand-edited.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Recipe {
    pub id: i64,
    pub name: String,
    /// Number of servings the recipe yields. Always >= 1.
    pub servings: i64,
    /// Derived: Σ(item.quantity × ingredient.cost_per_unit), active items only.
    pub total_cost_cents: i64,
    /// Derived: total_cost / servings.
    pub cost_per_serving_cents: i64,
    pub is_active: bool,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl Recipe {
    #[inline]
    pub fn total_cost(&self) -> Money {
        Money::from_cents(self.total_cost_cents)
    }

    #[inline]
    pub fn cost_per_serving(&self) -> Money {
        Money::from_cents(self.cost_per_serving_cents)
    }
}

/// One ingredient line within a recipe. Owned by the recipe: deactivating the
/// recipe deactivates its items in the same transaction.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct RecipeItem {
    pub id: i64,
    pub recipe_id: i64,
    pub ingredient_id: i64,
    /// Quantity of the ingredient consumed per batch, in `unit_type` units.
    pub quantity: f64,
    pub unit_type: String,
    pub is_active: bool,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

/// Payload for creating a recipe together with its items.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewRecipe {
    pub name: String,
    pub servings: i64,
    pub items: Vec<NewRecipeItem>,
}

/// Payload for one recipe line.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewRecipeItem {
    pub ingredient_id: i64,
    pub quantity: f64,
    pub unit_type: String,
}

/// Payload for updating a recipe's own fields (items have their own calls).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecipeUpdate {
    pub name: String,
    pub servings: i64,
}

// =============================================================================
// Product
// =============================================================================

/// Something on the menu with a selling price.
///
/// `recipe_id` is a weak reference: a product may or may not be recipe-backed.
/// Only recipe-backed, inventory-tracked products consume ingredient stock
/// when sold.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Product {
    pub id: i64,
    pub name: String,
    pub category: ProductCategory,
    pub selling_price_cents: i64,
    pub recipe_id: Option<i64>,
    pub is_inventory_tracked: bool,
    pub is_active: bool,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl Product {
    #[inline]
    pub fn selling_price(&self) -> Money {
        Money::from_cents(self.selling_price_cents)
    }

    /// True when selling this product should write `sale` ledger rows.
    #[inline]
    pub fn consumes_stock(&self) -> bool {
        self.is_inventory_tracked && self.recipe_id.is_some()
    }
}

/// Payload for creating or updating a product.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewProduct {
    pub name: String,
    pub category: ProductCategory,
    pub selling_price_cents: i64,
    pub recipe_id: Option<i64>,
    pub is_inventory_tracked: bool,
}

// =============================================================================
// Sale
// =============================================================================

/// A completed sale. Immutable after creation except for soft-delete.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Sale {
    pub id: i64,
    pub subtotal_cents: i64,
    pub discount_amount_cents: i64,
    /// Percent discount the cashier keyed in; 0 when an absolute amount
    /// (or no discount) was used. The amount field is always authoritative.
    pub discount_percent: f64,
    pub total_cents: i64,
    pub payment_method: PaymentMethod,
    pub amount_received_cents: i64,
    pub change_cents: i64,
    pub is_active: bool,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl Sale {
    #[inline]
    pub fn total(&self) -> Money {
        Money::from_cents(self.total_cents)
    }

    #[inline]
    pub fn change(&self) -> Money {
        Money::from_cents(self.change_cents)
    }
}

/// One line of a sale. Owned by the sale, immutable with it.
///
/// `unit_price_cents` is a snapshot of the product's price at sale time, so
/// history survives later price edits.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct SaleItem {
    pub id: i64,
    pub sale_id: i64,
    pub product_id: i64,
    pub quantity: i64,
    pub unit_price_cents: i64,
    /// quantity × unit_price, in centavos.
    pub subtotal_cents: i64,
    pub created_at: NaiveDateTime,
}

/// Payload for recording a sale.
///
/// When `discount_percent` is non-zero the discount amount is derived from it
/// (rounded to centavos); otherwise `discount_amount_cents` is used as given.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewSale {
    pub items: Vec<NewSaleItem>,
    pub discount_amount_cents: i64,
    pub discount_percent: f64,
    pub payment_method: PaymentMethod,
    pub amount_received_cents: i64,
}

/// One requested line of a new sale. Pricing comes from the product row at
/// record time, not from the caller.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewSaleItem {
    pub product_id: i64,
    pub quantity: i64,
}

// =============================================================================
// Employee / Expense (back-office tables, schema version 2)
// =============================================================================

/// A staff member. Labor cost context for reports; no scheduling here.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Employee {
    pub id: i64,
    pub name: String,
    pub role: EmployeeRole,
    pub wage_type: WageType,
    pub wage_rate_cents: i64,
    pub contact_number: Option<String>,
    pub is_active: bool,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

/// Payload for creating or updating an employee.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewEmployee {
    pub name: String,
    pub role: EmployeeRole,
    pub wage_type: WageType,
    pub wage_rate_cents: i64,
    pub contact_number: Option<String>,
}

/// A business expense. Recurring expenses feed break-even fixed costs.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Expense {
    pub id: i64,
    pub description: String,
    pub category: ExpenseCategory,
    pub amount_cents: i64,
    pub recurrence_type: Option<RecurrenceType>,
    pub expense_date: NaiveDate,
    pub is_active: bool,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

/// Payload for creating or updating an expense.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewExpense {
    pub description: String,
    pub category: ExpenseCategory,
    pub amount_cents: i64,
    pub recurrence_type: Option<RecurrenceType>,
    pub expense_date: NaiveDate,
}

// =============================================================================
// Report DTOs
// =============================================================================

/// Sales totals for one local calendar day.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyReport {
    pub date: NaiveDate,
    pub subtotal_cents: i64,
    pub discount_cents: i64,
    pub total_cents: i64,
    pub transaction_count: i64,
}

impl DailyReport {
    /// An all-zero report for a day with no sales. Trend rows for quiet days
    /// are reported as zero, never omitted.
    pub fn empty(date: NaiveDate) -> Self {
        DailyReport {
            date,
            subtotal_cents: 0,
            discount_cents: 0,
            total_cents: 0,
            transaction_count: 0,
        }
    }
}

/// Break-even computation inputs and result.
///
/// `break_even_units` is `None` when average selling price does not exceed
/// average variable cost: the question has no answer, and the sentinel (not a
/// division error) says so.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BreakEvenAnalysis {
    /// Monthly fixed costs derived from recurring expenses.
    pub fixed_costs_cents: i64,
    pub avg_selling_price_cents: i64,
    pub avg_variable_cost_cents: i64,
    pub break_even_units: Option<f64>,
}

impl BreakEvenAnalysis {
    /// Computes break-even units from centavo inputs.
    ///
    /// `fixed / (price − variable)`, or `None` when the denominator is ≤ 0.
    pub fn compute(
        fixed_costs_cents: i64,
        avg_selling_price_cents: i64,
        avg_variable_cost_cents: i64,
    ) -> Self {
        let denominator = avg_selling_price_cents - avg_variable_cost_cents;
        let break_even_units = if denominator > 0 {
            Some(fixed_costs_cents as f64 / denominator as f64)
        } else {
            None
        };

        BreakEvenAnalysis {
            fixed_costs_cents,
            avg_selling_price_cents,
            avg_variable_cost_cents,
            break_even_units,
        }
    }
}

/// One row of the best-sellers ranking.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BestSeller {
    pub product_id: i64,
    pub product_name: String,
    pub quantity_sold: i64,
}

/// Sales count bucketed by hour of day (local time).
///
/// Always exactly 24 slots, zero-filled. Slot 0 is midnight–1am.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PeakHours {
    pub counts: [i64; 24],
}

impl PeakHours {
    /// A zero histogram.
    pub fn empty() -> Self {
        PeakHours { counts: [0; 24] }
    }

    /// The busiest hour (0-23), or None when there are no sales at all.
    pub fn busiest_hour(&self) -> Option<u8> {
        let max = *self.counts.iter().max()?;
        if max == 0 {
            return None;
        }
        self.counts.iter().position(|&c| c == max).map(|h| h as u8)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
