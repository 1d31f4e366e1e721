//! # kusina-core: Pure Business Logic for Kusina POS
//!
//! This crate is the **heart** of Kusina POS. It contains all business logic
//! as pure functions with zero I/O dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Kusina POS Architecture                          │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                  UI Shell (external collaborator)               │   │
//! │  │    Register ──► Inventory ──► Recipes ──► Reports screens      │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │ repository API                         │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ kusina-core (THIS CRATE) ★                      │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌───────────┐                  │   │
//! │  │   │   types   │  │   money   │  │ validation│                  │   │
//! │  │   │ Ingredient│  │   Money   │  │   rules   │                  │   │
//! │  │   │ Recipe ...│  │ centavos  │  │   checks  │                  │   │
//! │  │   └───────────┘  └───────────┘  └───────────┘                  │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO NETWORK • PURE FUNCTIONS           │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                 kusina-db (persistence core)                    │   │
//! │  │       SQLite, migrations, repositories, costing, ledger         │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain types (Ingredient, Recipe, Product, Sale, ...)
//! - [`money`] - Money type with integer centavo arithmetic
//! - [`error`] - Domain error types
//! - [`validation`] - Business rule validation
//!
//! ## Design Principles
//!
//! 1. **Pure Functions**: Every function is deterministic - same input = same output
//! 2. **No I/O**: Database, network, file system access is FORBIDDEN here
//! 3. **Integer Money**: All monetary values are in centavos (i64); fractional
//!    math runs in full precision and rounds only at the stored boundary
//! 4. **Explicit Errors**: All errors are typed, never strings or panics
//!
//! ## Example Usage
//!
//! ```rust
//! use kusina_core::money::Money;
//!
//! // ₱50.00/kg flour, 2 kg used
//! let per_kg = Money::from_cents(5000);
//! let line_cost = per_kg.multiply_fractional(2.0);
//! assert_eq!(line_cost.cents(), 10000); // ₱100.00
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod money;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================
// These allow users to do `use kusina_core::Money` instead of
// `use kusina_core::money::Money`

pub use error::{CoreError, ValidationError};
pub use money::Money;
pub use types::*;
