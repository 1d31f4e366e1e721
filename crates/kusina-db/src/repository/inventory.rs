//! # Inventory Repository
//!
//! Operator-facing surface over the inventory ledger.
//!
//! `stock_in`, `stock_out` and `adjustment` movements enter here, each in
//! its own transaction. `sale` movements have no public entry point: they
//! are generated exclusively by the sale-recording flow inside the sale's
//! transaction. Ledger rows are append-only - this repository has no
//! update or delete methods, by design of the contract rather than
//! omission.

use sqlx::SqlitePool;
use tracing::debug;

use crate::error::DbResult;
use crate::ledger::{self, StockMovement};
use kusina_core::{InventoryTransaction, TransactionType};

/// Repository for operator stock movements and ledger history.
#[derive(Debug, Clone)]
pub struct InventoryRepository {
    pool: SqlitePool,
}

impl InventoryRepository {
    /// Creates a new InventoryRepository.
    pub fn new(pool: SqlitePool) -> Self {
        InventoryRepository { pool }
    }

    /// Records received stock (delivery, purchase).
    ///
    /// `quantity` is a positive magnitude in the ingredient's unit.
    pub async fn record_stock_in(
        &self,
        ingredient_id: i64,
        quantity: f64,
        unit_cost_cents: Option<i64>,
    ) -> DbResult<InventoryTransaction> {
        self.record(StockMovement {
            ingredient_id,
            transaction_type: TransactionType::StockIn,
            quantity,
            unit_cost_cents,
            reference_id: None,
        })
        .await
    }

    /// Records removed stock (spoilage, transfer out).
    ///
    /// `quantity` is a positive magnitude; the ledger stores the negative
    /// delta.
    pub async fn record_stock_out(
        &self,
        ingredient_id: i64,
        quantity: f64,
    ) -> DbResult<InventoryTransaction> {
        self.record(StockMovement {
            ingredient_id,
            transaction_type: TransactionType::StockOut,
            quantity,
            unit_cost_cents: None,
            reference_id: None,
        })
        .await
    }

    /// Records an operator correction. `delta` is signed: positive found
    /// stock, negative missing stock.
    pub async fn record_adjustment(
        &self,
        ingredient_id: i64,
        delta: f64,
        reference_id: Option<i64>,
    ) -> DbResult<InventoryTransaction> {
        self.record(StockMovement {
            ingredient_id,
            transaction_type: TransactionType::Adjustment,
            quantity: delta,
            unit_cost_cents: None,
            reference_id,
        })
        .await
    }

    async fn record(&self, movement: StockMovement) -> DbResult<InventoryTransaction> {
        debug!(
            ingredient_id = movement.ingredient_id,
            transaction_type = %movement.transaction_type,
            "Recording operator stock movement"
        );

        let mut tx = self.pool.begin().await?;
        let row = ledger::record_transaction(&mut tx, &movement).await?;
        tx.commit().await?;
        Ok(row)
    }

    /// Full movement history for one ingredient, oldest first.
    ///
    /// Ledger rows are never filtered by activity: the balance is the sum
    /// of ALL of them.
    pub async fn history(&self, ingredient_id: i64) -> DbResult<Vec<InventoryTransaction>> {
        let rows = sqlx::query_as::<_, InventoryTransaction>(
            r#"
            SELECT id, ingredient_id, transaction_type, quantity,
                   unit_cost_cents, reference_id, created_at
            FROM inventory_transactions
            WHERE ingredient_id = ?1
            ORDER BY id
            "#,
        )
        .bind(ingredient_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    /// The most recent movements across all ingredients, newest first.
    pub async fn recent(&self, limit: u32) -> DbResult<Vec<InventoryTransaction>> {
        let rows = sqlx::query_as::<_, InventoryTransaction>(
            r#"
            SELECT id, ingredient_id, transaction_type, quantity,
                   unit_cost_cents, reference_id, created_at
            FROM inventory_transactions
            ORDER BY id DESC
            LIMIT ?1
            "#,
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::DbError;
    use crate::pool::{Database, DbConfig};
    use kusina_core::NewIngredient;

    async fn db_with_flour() -> (Database, i64) {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let ingredient = db
            .ingredients()
            .create(&NewIngredient {
                name: "Flour".to_string(),
                cost_per_unit_cents: 5000,
                unit_type: "kg".to_string(),
                low_stock_threshold: 5.0,
                supplier: None,
                expiration_date: None,
                opening_stock: Some(10.0),
            })
            .await
            .unwrap();
        (db, ingredient.id)
    }

    #[tokio::test]
    async fn test_stock_level_is_signed_sum_of_ledger() {
        let (db, flour) = db_with_flour().await;
        let inventory = db.inventory();

        inventory.record_stock_in(flour, 5.0, Some(5000)).await.unwrap();
        inventory.record_stock_out(flour, 2.5).await.unwrap();
        inventory.record_adjustment(flour, -0.5, None).await.unwrap();

        let ingredient = db.ingredients().get_by_id(flour).await.unwrap().unwrap();
        assert_eq!(ingredient.quantity_in_stock, 12.0);

        let history = inventory.history(flour).await.unwrap();
        let ledger_sum: f64 = history.iter().map(|t| t.quantity).sum();
        assert_eq!(ledger_sum, ingredient.quantity_in_stock);
    }

    #[tokio::test]
    async fn test_oversell_goes_negative_without_error() {
        let (db, flour) = db_with_flour().await;

        db.inventory().record_stock_out(flour, 25.0).await.unwrap();

        let ingredient = db.ingredients().get_by_id(flour).await.unwrap().unwrap();
        assert_eq!(ingredient.quantity_in_stock, -15.0);
    }

    #[tokio::test]
    async fn test_movement_for_missing_ingredient_fails() {
        let (db, _) = db_with_flour().await;

        let err = db.inventory().record_stock_in(999, 1.0, None).await.unwrap_err();
        // FK enforcement rejects the insert before the stock update runs.
        assert!(matches!(
            err,
            DbError::ConstraintViolation { .. } | DbError::NotFound { .. }
        ));
    }

    #[tokio::test]
    async fn test_history_is_ordered_and_complete() {
        let (db, flour) = db_with_flour().await;
        let inventory = db.inventory();

        inventory.record_stock_in(flour, 1.0, None).await.unwrap();
        inventory.record_stock_out(flour, 1.0).await.unwrap();

        let history = inventory.history(flour).await.unwrap();
        assert_eq!(history.len(), 3); // opening stock + two movements
        assert!(history.windows(2).all(|w| w[0].id < w[1].id));

        let recent = inventory.recent(2).await.unwrap();
        assert_eq!(recent.len(), 2);
        assert!(recent[0].id > recent[1].id);
    }
}
