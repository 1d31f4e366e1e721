//! # Repository Module
//!
//! Database repository implementations for Kusina POS.
//!
//! ## Repository Pattern
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Repository Pattern Explained                         │
//! │                                                                         │
//! │  UI shell                                                              │
//! │       │                                                                 │
//! │       │  db.ingredients().search("flour")                              │
//! │       ▼                                                                 │
//! │  IngredientRepository                                                  │
//! │  ├── create / update / soft_delete                                     │
//! │  ├── get_by_id / list / search                                         │
//! │  └── (writes that touch several tables open ONE transaction)           │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  SQLite Database                                                       │
//! │                                                                         │
//! │  Rules enforced here:                                                   │
//! │  • Reads default to is_active = 1; historical reads are explicit       │
//! │  • The costing engine and ledger run INSIDE the triggering write's     │
//! │    transaction, never independently                                    │
//! │  • Sales are immutable after creation except soft-delete               │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Available Repositories
//!
//! - [`ingredient::IngredientRepository`] - Ingredient CRUD, low-stock list
//! - [`inventory::InventoryRepository`] - Operator stock movements, history
//! - [`recipe::RecipeRepository`] - Recipes and their items, cost rollups
//! - [`product::ProductRepository`] - Menu products
//! - [`sale::SaleRepository`] - Atomic sale recording
//! - [`employee::EmployeeRepository`] - Staff records
//! - [`expense::ExpenseRepository`] - Expenses feeding break-even analysis

pub mod employee;
pub mod expense;
pub mod ingredient;
pub mod inventory;
pub mod product;
pub mod recipe;
pub mod sale;
