//! # Recipe Repository
//!
//! Database operations for recipes and their ingredient lines.
//!
//! ## Ownership
//! A recipe OWNS its items: deactivating the recipe deactivates the items in
//! the same transaction, so nothing is silently orphaned. Every item
//! mutation ends with a cost rollup for the parent recipe before the
//! transaction commits - the stored `total_cost`/`cost_per_serving` can
//! never disagree with the current composition.

use chrono::Local;
use sqlx::{SqliteConnection, SqlitePool};
use tracing::debug;

use crate::costing;
use crate::error::{DbError, DbResult};
use kusina_core::validation::{
    validate_new_recipe, validate_positive_quantity, validate_servings,
};
use kusina_core::{NewRecipe, NewRecipeItem, Recipe, RecipeItem, RecipeUpdate};

const SELECT: &str = r#"
SELECT id, name, servings, total_cost_cents, cost_per_serving_cents,
       is_active, created_at, updated_at
FROM recipes
"#;

const SELECT_ITEM: &str = r#"
SELECT id, recipe_id, ingredient_id, quantity, unit_type, is_active,
       created_at, updated_at
FROM recipe_items
"#;

/// Repository for recipe database operations.
#[derive(Debug, Clone)]
pub struct RecipeRepository {
    pool: SqlitePool,
}

impl RecipeRepository {
    /// Creates a new RecipeRepository.
    pub fn new(pool: SqlitePool) -> Self {
        RecipeRepository { pool }
    }

    /// Creates a recipe with its items and rolls up the initial cost, all in
    /// one transaction.
    pub async fn create(&self, payload: &NewRecipe) -> DbResult<Recipe> {
        validate_new_recipe(payload)?;
        let now = Local::now().naive_local();

        debug!(name = %payload.name, items = payload.items.len(), "Creating recipe");

        let mut tx = self.pool.begin().await?;

        let result = sqlx::query(
            r#"
            INSERT INTO recipes
                (name, servings, total_cost_cents, cost_per_serving_cents,
                 is_active, created_at, updated_at)
            VALUES (?1, ?2, 0, 0, 1, ?3, ?3)
            "#,
        )
        .bind(payload.name.trim())
        .bind(payload.servings)
        .bind(now)
        .execute(&mut *tx)
        .await?;

        let recipe_id = result.last_insert_rowid();

        for item in &payload.items {
            insert_item(&mut tx, recipe_id, item).await?;
        }

        costing::recompute_recipe(&mut tx, recipe_id).await?;

        let recipe = sqlx::query_as::<_, Recipe>(&format!("{SELECT} WHERE id = ?1"))
            .bind(recipe_id)
            .fetch_one(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(recipe)
    }

    /// Updates a recipe's name and servings.
    ///
    /// A servings change moves `cost_per_serving`, so the rollup reruns in
    /// the same transaction.
    pub async fn update(&self, id: i64, payload: &RecipeUpdate) -> DbResult<Recipe> {
        validate_servings(payload.servings)?;

        let mut tx = self.pool.begin().await?;

        let result = sqlx::query(
            "UPDATE recipes SET name = ?2, servings = ?3, updated_at = ?4 WHERE id = ?1 AND is_active = 1",
        )
        .bind(id)
        .bind(payload.name.trim())
        .bind(payload.servings)
        .bind(Local::now().naive_local())
        .execute(&mut *tx)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Recipe", id));
        }

        costing::recompute_recipe(&mut tx, id).await?;

        let recipe = sqlx::query_as::<_, Recipe>(&format!("{SELECT} WHERE id = ?1"))
            .bind(id)
            .fetch_one(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(recipe)
    }

    /// Soft-deletes a recipe AND its items together.
    pub async fn soft_delete(&self, id: i64) -> DbResult<()> {
        let now = Local::now().naive_local();
        let mut tx = self.pool.begin().await?;

        let result = sqlx::query(
            "UPDATE recipes SET is_active = 0, updated_at = ?2 WHERE id = ?1 AND is_active = 1",
        )
        .bind(id)
        .bind(now)
        .execute(&mut *tx)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Recipe", id));
        }

        sqlx::query(
            "UPDATE recipe_items SET is_active = 0, updated_at = ?2 WHERE recipe_id = ?1 AND is_active = 1",
        )
        .bind(id)
        .bind(now)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(())
    }

    /// Gets an active recipe by ID.
    pub async fn get_by_id(&self, id: i64) -> DbResult<Option<Recipe>> {
        let recipe =
            sqlx::query_as::<_, Recipe>(&format!("{SELECT} WHERE id = ?1 AND is_active = 1"))
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;
        Ok(recipe)
    }

    /// Gets a recipe by ID regardless of soft-delete state.
    pub async fn get_by_id_any(&self, id: i64) -> DbResult<Option<Recipe>> {
        let recipe = sqlx::query_as::<_, Recipe>(&format!("{SELECT} WHERE id = ?1"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(recipe)
    }

    /// Lists active recipes, sorted by name.
    pub async fn list(&self) -> DbResult<Vec<Recipe>> {
        let recipes =
            sqlx::query_as::<_, Recipe>(&format!("{SELECT} WHERE is_active = 1 ORDER BY name"))
                .fetch_all(&self.pool)
                .await?;
        Ok(recipes)
    }

    /// Lists every recipe including soft-deleted ones.
    pub async fn list_all(&self) -> DbResult<Vec<Recipe>> {
        let recipes = sqlx::query_as::<_, Recipe>(&format!("{SELECT} ORDER BY name"))
            .fetch_all(&self.pool)
            .await?;
        Ok(recipes)
    }

    /// Case-insensitive substring search over the name, active rows only.
    pub async fn search(&self, query: &str) -> DbResult<Vec<Recipe>> {
        let pattern = format!("%{}%", query.trim());
        let recipes = sqlx::query_as::<_, Recipe>(&format!(
            "{SELECT} WHERE is_active = 1 AND name LIKE ?1 ORDER BY name"
        ))
        .bind(pattern)
        .fetch_all(&self.pool)
        .await?;
        Ok(recipes)
    }

    /// Active items of a recipe, in insertion order.
    pub async fn get_items(&self, recipe_id: i64) -> DbResult<Vec<RecipeItem>> {
        let items = sqlx::query_as::<_, RecipeItem>(&format!(
            "{SELECT_ITEM} WHERE recipe_id = ?1 AND is_active = 1 ORDER BY id"
        ))
        .bind(recipe_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(items)
    }

    /// Adds an item to an active recipe and rolls up the cost.
    pub async fn add_item(&self, recipe_id: i64, item: &NewRecipeItem) -> DbResult<RecipeItem> {
        validate_positive_quantity("quantity", item.quantity)?;

        let mut tx = self.pool.begin().await?;

        ensure_active_recipe(&mut tx, recipe_id).await?;
        let item_id = insert_item(&mut tx, recipe_id, item).await?;
        costing::recompute_recipe(&mut tx, recipe_id).await?;

        let row = sqlx::query_as::<_, RecipeItem>(&format!("{SELECT_ITEM} WHERE id = ?1"))
            .bind(item_id)
            .fetch_one(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(row)
    }

    /// Changes an item's quantity/unit and rolls up the cost.
    pub async fn update_item(
        &self,
        item_id: i64,
        quantity: f64,
        unit_type: &str,
    ) -> DbResult<RecipeItem> {
        validate_positive_quantity("quantity", quantity)?;

        let mut tx = self.pool.begin().await?;

        let result = sqlx::query(
            "UPDATE recipe_items SET quantity = ?2, unit_type = ?3, updated_at = ?4 WHERE id = ?1 AND is_active = 1",
        )
        .bind(item_id)
        .bind(quantity)
        .bind(unit_type)
        .bind(Local::now().naive_local())
        .execute(&mut *tx)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("RecipeItem", item_id));
        }

        let row = sqlx::query_as::<_, RecipeItem>(&format!("{SELECT_ITEM} WHERE id = ?1"))
            .bind(item_id)
            .fetch_one(&mut *tx)
            .await?;

        costing::recompute_recipe(&mut tx, row.recipe_id).await?;

        tx.commit().await?;
        Ok(row)
    }

    /// Deactivates an item and rolls up the cost of its recipe.
    pub async fn remove_item(&self, item_id: i64) -> DbResult<()> {
        let mut tx = self.pool.begin().await?;

        let recipe_id: Option<i64> = sqlx::query_scalar(
            "SELECT recipe_id FROM recipe_items WHERE id = ?1 AND is_active = 1",
        )
        .bind(item_id)
        .fetch_optional(&mut *tx)
        .await?;

        let recipe_id = recipe_id.ok_or_else(|| DbError::not_found("RecipeItem", item_id))?;

        sqlx::query("UPDATE recipe_items SET is_active = 0, updated_at = ?2 WHERE id = ?1")
            .bind(item_id)
            .bind(Local::now().naive_local())
            .execute(&mut *tx)
            .await?;

        costing::recompute_recipe(&mut tx, recipe_id).await?;

        tx.commit().await?;
        Ok(())
    }
}

/// Inserts one item row, rejecting references to missing or inactive
/// ingredients (the FK alone would let an inactive parent through).
async fn insert_item(
    conn: &mut SqliteConnection,
    recipe_id: i64,
    item: &NewRecipeItem,
) -> DbResult<i64> {
    let active: Option<i64> =
        sqlx::query_scalar("SELECT 1 FROM ingredients WHERE id = ?1 AND is_active = 1")
            .bind(item.ingredient_id)
            .fetch_optional(&mut *conn)
            .await?;

    if active.is_none() {
        return Err(DbError::ConstraintViolation {
            message: format!(
                "recipe item references missing or inactive ingredient {}",
                item.ingredient_id
            ),
        });
    }

    let result = sqlx::query(
        r#"
        INSERT INTO recipe_items
            (recipe_id, ingredient_id, quantity, unit_type, is_active, created_at, updated_at)
        VALUES (?1, ?2, ?3, ?4, 1, ?5, ?5)
        "#,
    )
    .bind(recipe_id)
    .bind(item.ingredient_id)
    .bind(item.quantity)
    .bind(item.unit_type.trim())
    .bind(Local::now().naive_local())
    .execute(&mut *conn)
    .await?;

    Ok(result.last_insert_rowid())
}

async fn ensure_active_recipe(conn: &mut SqliteConnection, recipe_id: i64) -> DbResult<()> {
    let active: Option<i64> =
        sqlx::query_scalar("SELECT 1 FROM recipes WHERE id = ?1 AND is_active = 1")
            .bind(recipe_id)
            .fetch_optional(&mut *conn)
            .await?;

    if active.is_none() {
        return Err(DbError::not_found("Recipe", recipe_id));
    }
    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};
    use kusina_core::NewIngredient;

    async fn test_db() -> Database {
        Database::new(DbConfig::in_memory()).await.unwrap()
    }

    async fn add_ingredient(db: &Database, name: &str, cost_cents: i64) -> i64 {
        db.ingredients()
            .create(&NewIngredient {
                name: name.to_string(),
                cost_per_unit_cents: cost_cents,
                unit_type: "kg".to_string(),
                low_stock_threshold: 1.0,
                supplier: None,
                expiration_date: None,
                opening_stock: Some(50.0),
            })
            .await
            .unwrap()
            .id
    }

    fn bread(flour_id: i64) -> NewRecipe {
        NewRecipe {
            name: "Bread".to_string(),
            servings: 4,
            items: vec![NewRecipeItem {
                ingredient_id: flour_id,
                quantity: 2.0,
                unit_type: "kg".to_string(),
            }],
        }
    }

    #[tokio::test]
    async fn test_cost_rollup_on_create() {
        let db = test_db().await;
        let flour = add_ingredient(&db, "Flour", 5000).await;

        // 2 kg × ₱50.00 = ₱100.00 total, ₱25.00 per serving (4 servings)
        let recipe = db.recipes().create(&bread(flour)).await.unwrap();
        assert_eq!(recipe.total_cost_cents, 10000);
        assert_eq!(recipe.cost_per_serving_cents, 2500);
    }

    #[tokio::test]
    async fn test_ingredient_cost_change_recomputes_recipe() {
        let db = test_db().await;
        let flour = add_ingredient(&db, "Flour", 5000).await;
        let recipe = db.recipes().create(&bread(flour)).await.unwrap();

        // ₱50 → ₱60 per kg: recipe must follow in the same write.
        db.ingredients()
            .update(
                flour,
                &kusina_core::IngredientUpdate {
                    name: "Flour".to_string(),
                    cost_per_unit_cents: 6000,
                    unit_type: "kg".to_string(),
                    low_stock_threshold: 1.0,
                    supplier: None,
                    expiration_date: None,
                },
            )
            .await
            .unwrap();

        let recipe = db.recipes().get_by_id(recipe.id).await.unwrap().unwrap();
        assert_eq!(recipe.total_cost_cents, 12000);
        assert_eq!(recipe.cost_per_serving_cents, 3000);
    }

    #[tokio::test]
    async fn test_item_mutations_keep_cost_current() {
        let db = test_db().await;
        let flour = add_ingredient(&db, "Flour", 5000).await;
        let sugar = add_ingredient(&db, "Sugar", 8000).await;
        let recipe = db.recipes().create(&bread(flour)).await.unwrap();

        let sugar_item = db
            .recipes()
            .add_item(
                recipe.id,
                &NewRecipeItem {
                    ingredient_id: sugar,
                    quantity: 0.5,
                    unit_type: "kg".to_string(),
                },
            )
            .await
            .unwrap();

        // 2×50 + 0.5×80 = ₱140.00
        let updated = db.recipes().get_by_id(recipe.id).await.unwrap().unwrap();
        assert_eq!(updated.total_cost_cents, 14000);

        db.recipes().update_item(sugar_item.id, 1.0, "kg").await.unwrap();
        let updated = db.recipes().get_by_id(recipe.id).await.unwrap().unwrap();
        assert_eq!(updated.total_cost_cents, 18000);

        db.recipes().remove_item(sugar_item.id).await.unwrap();
        let updated = db.recipes().get_by_id(recipe.id).await.unwrap().unwrap();
        assert_eq!(updated.total_cost_cents, 10000);
        assert_eq!(db.recipes().get_items(recipe.id).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_servings_change_moves_per_serving_cost() {
        let db = test_db().await;
        let flour = add_ingredient(&db, "Flour", 5000).await;
        let recipe = db.recipes().create(&bread(flour)).await.unwrap();

        let updated = db
            .recipes()
            .update(
                recipe.id,
                &RecipeUpdate {
                    name: "Bread".to_string(),
                    servings: 8,
                },
            )
            .await
            .unwrap();

        assert_eq!(updated.total_cost_cents, 10000);
        assert_eq!(updated.cost_per_serving_cents, 1250);
    }

    #[tokio::test]
    async fn test_soft_delete_deactivates_items_too() {
        let db = test_db().await;
        let flour = add_ingredient(&db, "Flour", 5000).await;
        let recipe = db.recipes().create(&bread(flour)).await.unwrap();

        db.recipes().soft_delete(recipe.id).await.unwrap();

        assert!(db.recipes().get_by_id(recipe.id).await.unwrap().is_none());
        assert!(db.recipes().get_items(recipe.id).await.unwrap().is_empty());
        assert!(db.recipes().list().await.unwrap().is_empty());

        // Still present for history.
        let any = db.recipes().get_by_id_any(recipe.id).await.unwrap().unwrap();
        assert!(!any.is_active);
        let all = db.recipes().list_all().await.unwrap();
        assert_eq!(all.len(), 1);
        assert!(!all[0].is_active);
    }

    #[tokio::test]
    async fn test_inactive_ingredient_rejected() {
        let db = test_db().await;
        let flour = add_ingredient(&db, "Flour", 5000).await;
        db.ingredients().soft_delete(flour).await.unwrap();

        let err = db.recipes().create(&bread(flour)).await.unwrap_err();
        assert!(matches!(err, DbError::ConstraintViolation { .. }));

        // Nothing persisted: the whole create rolled back.
        assert!(db.recipes().list().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_zero_servings_rejected() {
        let db = test_db().await;
        let flour = add_ingredient(&db, "Flour", 5000).await;
        let mut payload = bread(flour);
        payload.servings = 0;

        assert!(matches!(
            db.recipes().create(&payload).await,
            Err(DbError::Validation(_))
        ));
    }
}
