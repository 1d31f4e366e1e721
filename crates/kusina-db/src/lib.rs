//! # Kusina POS Database Layer
//!
//! SQLite persistence for the Kusina POS system.
//!
//! ## Architecture
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        kusina-db Architecture                           │
//! │                                                                         │
//! │  Database (pool.rs) ── constructed once at startup, migrations first   │
//! │       │                                                                 │
//! │       ├── repository/ ── typed CRUD, one transaction per write         │
//! │       │        │                                                        │
//! │       │        ├── costing.rs ── recipe cost rollups (same tx)         │
//! │       │        └── ledger.rs ── append-only stock movements (same tx)  │
//! │       │                                                                 │
//! │       ├── reports.rs ── read-only aggregates                           │
//! │       │                                                                 │
//! │       └── migrations.rs / schema.rs ── versioned, reversible DDL       │
//! │                                                                         │
//! │  Domain types and validation come from kusina-core.                    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust,ignore
//! use kusina_db::{Database, DbConfig};
//!
//! let db = Database::new(DbConfig::new("kusina.db")).await?;
//! let low = db.ingredients().list_low_stock().await?;
//! ```

pub mod costing;
pub mod error;
pub mod ledger;
pub mod migrations;
pub mod pool;
pub mod reports;
pub mod repository;
pub mod schema;

pub use error::{DbError, DbResult};
pub use pool::{Database, DbConfig};
pub use reports::ReportRepository;
pub use repository::employee::EmployeeRepository;
pub use repository::expense::ExpenseRepository;
pub use repository::ingredient::IngredientRepository;
pub use repository::inventory::InventoryRepository;
pub use repository::product::ProductRepository;
pub use repository::recipe::RecipeRepository;
pub use repository::sale::SaleRepository;
