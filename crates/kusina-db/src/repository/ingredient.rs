//! # Ingredient Repository
//!
//! Database operations for ingredients.
//!
//! Stock is never written here: `quantity_in_stock` belongs to the ledger.
//! What IS handled here is the costing side effect - changing an
//! ingredient's unit cost (or deactivating it) recomputes every active
//! recipe that uses it, inside the same transaction.

use chrono::Local;
use sqlx::SqlitePool;
use tracing::debug;

use crate::costing;
use crate::error::{DbError, DbResult};
use crate::ledger::{self, StockMovement};
use kusina_core::validation::{validate_ingredient_update, validate_new_ingredient};
use kusina_core::{Ingredient, IngredientUpdate, NewIngredient, TransactionType};

const SELECT: &str = r#"
SELECT id, name, cost_per_unit_cents, unit_type, quantity_in_stock,
       low_stock_threshold, supplier, expiration_date, is_active,
       created_at, updated_at
FROM ingredients
"#;

/// Repository for ingredient database operations.
#[derive(Debug, Clone)]
pub struct IngredientRepository {
    pool: SqlitePool,
}

impl IngredientRepository {
    /// Creates a new IngredientRepository.
    pub fn new(pool: SqlitePool) -> Self {
        IngredientRepository { pool }
    }

    /// Creates an ingredient.
    ///
    /// When `opening_stock` is given, a `stock_in` ledger row is recorded in
    /// the same transaction, so the stock invariant (stock == Σ ledger)
    /// holds from the first row.
    pub async fn create(&self, payload: &NewIngredient) -> DbResult<Ingredient> {
        validate_new_ingredient(payload)?;
        let now = Local::now().naive_local();

        debug!(name = %payload.name, "Creating ingredient");

        let mut tx = self.pool.begin().await?;

        let result = sqlx::query(
            r#"
            INSERT INTO ingredients
                (name, cost_per_unit_cents, unit_type, quantity_in_stock,
                 low_stock_threshold, supplier, expiration_date, is_active,
                 created_at, updated_at)
            VALUES (?1, ?2, ?3, 0, ?4, ?5, ?6, 1, ?7, ?7)
            "#,
        )
        .bind(payload.name.trim())
        .bind(payload.cost_per_unit_cents)
        .bind(payload.unit_type.trim())
        .bind(payload.low_stock_threshold)
        .bind(&payload.supplier)
        .bind(payload.expiration_date)
        .bind(now)
        .execute(&mut *tx)
        .await?;

        let id = result.last_insert_rowid();

        if let Some(opening) = payload.opening_stock {
            ledger::record_transaction(
                &mut tx,
                &StockMovement {
                    ingredient_id: id,
                    transaction_type: TransactionType::StockIn,
                    quantity: opening,
                    unit_cost_cents: Some(payload.cost_per_unit_cents),
                    reference_id: None,
                },
            )
            .await?;
        }

        let ingredient = sqlx::query_as::<_, Ingredient>(&format!("{SELECT} WHERE id = ?1"))
            .bind(id)
            .fetch_one(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(ingredient)
    }

    /// Updates an ingredient's editable fields.
    ///
    /// A unit-cost change re-triggers the costing engine for every active
    /// recipe using this ingredient, in this same transaction.
    pub async fn update(&self, id: i64, payload: &IngredientUpdate) -> DbResult<Ingredient> {
        validate_ingredient_update(payload)?;
        let now = Local::now().naive_local();

        let mut tx = self.pool.begin().await?;

        let existing = sqlx::query_as::<_, Ingredient>(&format!(
            "{SELECT} WHERE id = ?1 AND is_active = 1"
        ))
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| DbError::not_found("Ingredient", id))?;

        sqlx::query(
            r#"
            UPDATE ingredients
            SET name = ?2, cost_per_unit_cents = ?3, unit_type = ?4,
                low_stock_threshold = ?5, supplier = ?6, expiration_date = ?7,
                updated_at = ?8
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .bind(payload.name.trim())
        .bind(payload.cost_per_unit_cents)
        .bind(payload.unit_type.trim())
        .bind(payload.low_stock_threshold)
        .bind(&payload.supplier)
        .bind(payload.expiration_date)
        .bind(now)
        .execute(&mut *tx)
        .await?;

        if existing.cost_per_unit_cents != payload.cost_per_unit_cents {
            costing::recompute_recipes_using_ingredient(&mut tx, id).await?;
        }

        let ingredient = sqlx::query_as::<_, Ingredient>(&format!("{SELECT} WHERE id = ?1"))
            .bind(id)
            .fetch_one(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(ingredient)
    }

    /// Soft-deletes an ingredient.
    ///
    /// The row stays referenceable by ledger history and past recipes, but
    /// drops out of default reads and cost rollups - so affected recipes
    /// are recomputed here too.
    pub async fn soft_delete(&self, id: i64) -> DbResult<()> {
        let mut tx = self.pool.begin().await?;

        let result = sqlx::query(
            "UPDATE ingredients SET is_active = 0, updated_at = ?2 WHERE id = ?1 AND is_active = 1",
        )
        .bind(id)
        .bind(Local::now().naive_local())
        .execute(&mut *tx)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Ingredient", id));
        }

        costing::recompute_recipes_using_ingredient(&mut tx, id).await?;

        tx.commit().await?;
        Ok(())
    }

    /// Gets an active ingredient by ID.
    pub async fn get_by_id(&self, id: i64) -> DbResult<Option<Ingredient>> {
        let ingredient = sqlx::query_as::<_, Ingredient>(&format!(
            "{SELECT} WHERE id = ?1 AND is_active = 1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(ingredient)
    }

    /// Gets an ingredient by ID regardless of soft-delete state.
    ///
    /// For historical views; default reads go through [`Self::get_by_id`].
    pub async fn get_by_id_any(&self, id: i64) -> DbResult<Option<Ingredient>> {
        let ingredient = sqlx::query_as::<_, Ingredient>(&format!("{SELECT} WHERE id = ?1"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(ingredient)
    }

    /// Lists active ingredients, sorted by name.
    pub async fn list(&self) -> DbResult<Vec<Ingredient>> {
        let ingredients =
            sqlx::query_as::<_, Ingredient>(&format!("{SELECT} WHERE is_active = 1 ORDER BY name"))
                .fetch_all(&self.pool)
                .await?;
        Ok(ingredients)
    }

    /// Lists every ingredient including soft-deleted ones.
    pub async fn list_all(&self) -> DbResult<Vec<Ingredient>> {
        let ingredients = sqlx::query_as::<_, Ingredient>(&format!("{SELECT} ORDER BY name"))
            .fetch_all(&self.pool)
            .await?;
        Ok(ingredients)
    }

    /// Case-insensitive substring search over the name, active rows only.
    pub async fn search(&self, query: &str) -> DbResult<Vec<Ingredient>> {
        let pattern = format!("%{}%", query.trim());
        let ingredients = sqlx::query_as::<_, Ingredient>(&format!(
            "{SELECT} WHERE is_active = 1 AND name LIKE ?1 ORDER BY name"
        ))
        .bind(pattern)
        .fetch_all(&self.pool)
        .await?;
        Ok(ingredients)
    }

    /// Lists active ingredients at or below their low-stock threshold.
    pub async fn list_low_stock(&self) -> DbResult<Vec<Ingredient>> {
        let ingredients = sqlx::query_as::<_, Ingredient>(&format!(
            "{SELECT} WHERE is_active = 1 AND quantity_in_stock <= low_stock_threshold ORDER BY name"
        ))
        .fetch_all(&self.pool)
        .await?;
        Ok(ingredients)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};

    async fn test_db() -> Database {
        Database::new(DbConfig::in_memory()).await.unwrap()
    }

    fn flour() -> NewIngredient {
        NewIngredient {
            name: "Flour".to_string(),
            cost_per_unit_cents: 5000, // ₱50.00/kg
            unit_type: "kg".to_string(),
            low_stock_threshold: 5.0,
            supplier: Some("Central Milling".to_string()),
            expiration_date: None,
            opening_stock: Some(20.0),
        }
    }

    #[tokio::test]
    async fn test_create_with_opening_stock() {
        let db = test_db().await;
        let repo = db.ingredients();

        let ingredient = repo.create(&flour()).await.unwrap();
        assert_eq!(ingredient.quantity_in_stock, 20.0);

        // The opening stock came through the ledger, not a direct write.
        let history = db.inventory().history(ingredient.id).await.unwrap();
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].transaction_type, TransactionType::StockIn);
        assert_eq!(history[0].quantity, 20.0);
    }

    #[tokio::test]
    async fn test_validation_rejected_before_write() {
        let db = test_db().await;
        let repo = db.ingredients();

        let mut bad = flour();
        bad.name = "  ".to_string();
        assert!(matches!(
            repo.create(&bad).await,
            Err(DbError::Validation(_))
        ));
        assert!(repo.list().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_search_is_case_insensitive() {
        let db = test_db().await;
        let repo = db.ingredients();
        repo.create(&flour()).await.unwrap();

        let found = repo.search("flo").await.unwrap();
        assert_eq!(found.len(), 1);
        let found = repo.search("FLOUR").await.unwrap();
        assert_eq!(found.len(), 1);
        let found = repo.search("sugar").await.unwrap();
        assert!(found.is_empty());
    }

    #[tokio::test]
    async fn test_soft_delete_hides_from_default_reads() {
        let db = test_db().await;
        let repo = db.ingredients();
        let ingredient = repo.create(&flour()).await.unwrap();

        repo.soft_delete(ingredient.id).await.unwrap();

        assert!(repo.get_by_id(ingredient.id).await.unwrap().is_none());
        assert!(repo.list().await.unwrap().is_empty());
        assert!(repo.search("flour").await.unwrap().is_empty());

        // Still reachable for historical views.
        let any = repo.get_by_id_any(ingredient.id).await.unwrap().unwrap();
        assert!(!any.is_active);

        // Deleting twice is NotFound, not a silent no-op.
        assert!(matches!(
            repo.soft_delete(ingredient.id).await,
            Err(DbError::NotFound { .. })
        ));
    }

    #[tokio::test]
    async fn test_low_stock_list() {
        let db = test_db().await;
        let repo = db.ingredients();

        let mut low = flour();
        low.name = "Yeast".to_string();
        low.opening_stock = Some(2.0);
        repo.create(&low).await.unwrap();
        repo.create(&flour()).await.unwrap(); // 20 in stock, threshold 5

        let low_stock = repo.list_low_stock().await.unwrap();
        assert_eq!(low_stock.len(), 1);
        assert_eq!(low_stock[0].name, "Yeast");
    }
}
