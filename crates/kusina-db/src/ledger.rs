//! # Inventory Ledger
//!
//! Append-only stock movements and the derived stock level.
//!
//! ## The Ledger Contract
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Inventory Ledger                                   │
//! │                                                                         │
//! │  record_transaction(...)                                               │
//! │       │                                                                 │
//! │       ├── INSERT inventory_transactions (immutable row, signed delta)  │
//! │       └── UPDATE ingredients.quantity_in_stock += delta                │
//! │            (same transaction - the two can never diverge)              │
//! │                                                                         │
//! │  Invariant: quantity_in_stock == Σ(transaction.quantity)               │
//! │                                                                         │
//! │  No update path. No delete path. Balance is derived, never edited.     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Sign Convention
//! Callers pass positive magnitudes; the ledger applies the sign per type
//! (`stock_in` +, `stock_out`/`sale` -). `adjustment` is the one type that
//! carries its own sign, since operator corrections go both ways.
//!
//! ## Oversell Policy
//! Stock MAY go negative. The ledger records truth and derives the balance;
//! refusing the sale would falsify the record. Callers that want to block
//! oversell can check stock first - here we only `warn!`.

use chrono::Local;
use sqlx::SqliteConnection;
use tracing::{debug, warn};

use crate::error::{DbError, DbResult};
use kusina_core::{InventoryTransaction, TransactionType, ValidationError};

/// A requested stock movement, before sign normalization.
#[derive(Debug, Clone)]
pub struct StockMovement {
    pub ingredient_id: i64,
    pub transaction_type: TransactionType,
    /// Positive magnitude, except `adjustment` which is a signed delta.
    pub quantity: f64,
    /// Unit cost snapshot, when known.
    pub unit_cost_cents: Option<i64>,
    /// Sale or adjustment id that caused the movement.
    pub reference_id: Option<i64>,
}

/// Converts a requested quantity into the signed delta stored on the row.
fn signed_delta(transaction_type: TransactionType, quantity: f64) -> DbResult<f64> {
    match transaction_type {
        TransactionType::Adjustment => {
            if quantity == 0.0 || !quantity.is_finite() {
                return Err(DbError::Validation(ValidationError::Required {
                    field: "quantity".to_string(),
                }));
            }
            Ok(quantity)
        }
        TransactionType::StockIn => {
            require_positive(quantity)?;
            Ok(quantity)
        }
        TransactionType::StockOut | TransactionType::Sale => {
            require_positive(quantity)?;
            Ok(-quantity)
        }
    }
}

fn require_positive(quantity: f64) -> DbResult<()> {
    if !quantity.is_finite() || quantity <= 0.0 {
        return Err(DbError::Validation(ValidationError::MustBePositive {
            field: "quantity".to_string(),
        }));
    }
    Ok(())
}

/// Appends a ledger row and applies the delta to the ingredient's stock.
///
/// Runs on a `SqliteConnection` so the caller decides the transaction scope:
/// operator movements get their own transaction (see
/// [`crate::repository::inventory::InventoryRepository`]), while the
/// sale-recording flow calls this inside the sale's transaction.
pub async fn record_transaction(
    conn: &mut SqliteConnection,
    movement: &StockMovement,
) -> DbResult<InventoryTransaction> {
    let delta = signed_delta(movement.transaction_type, movement.quantity)?;
    let now = Local::now().naive_local();

    debug!(
        ingredient_id = movement.ingredient_id,
        transaction_type = %movement.transaction_type,
        delta,
        "Recording inventory transaction"
    );

    let result = sqlx::query(
        r#"
        INSERT INTO inventory_transactions
            (ingredient_id, transaction_type, quantity, unit_cost_cents, reference_id, created_at)
        VALUES (?1, ?2, ?3, ?4, ?5, ?6)
        "#,
    )
    .bind(movement.ingredient_id)
    .bind(movement.transaction_type)
    .bind(delta)
    .bind(movement.unit_cost_cents)
    .bind(movement.reference_id)
    .bind(now)
    .execute(&mut *conn)
    .await?;

    let id = result.last_insert_rowid();

    let updated = sqlx::query(
        r#"
        UPDATE ingredients
        SET quantity_in_stock = quantity_in_stock + ?2, updated_at = ?3
        WHERE id = ?1
        "#,
    )
    .bind(movement.ingredient_id)
    .bind(delta)
    .bind(now)
    .execute(&mut *conn)
    .await?;

    if updated.rows_affected() == 0 {
        return Err(DbError::not_found("Ingredient", movement.ingredient_id));
    }

    let new_stock: f64 =
        sqlx::query_scalar("SELECT quantity_in_stock FROM ingredients WHERE id = ?1")
            .bind(movement.ingredient_id)
            .fetch_one(&mut *conn)
            .await?;

    if new_stock < 0.0 {
        // Oversell allowed; the caller may surface a warning to the operator.
        warn!(
            ingredient_id = movement.ingredient_id,
            stock = new_stock,
            "Ingredient stock went negative"
        );
    }

    Ok(InventoryTransaction {
        id,
        ingredient_id: movement.ingredient_id,
        transaction_type: movement.transaction_type,
        quantity: delta,
        unit_cost_cents: movement.unit_cost_cents,
        reference_id: movement.reference_id,
        created_at: now,
    })
}

// =============================================================================
// Unit Tests
// =============================================================================
