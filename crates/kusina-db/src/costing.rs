//! # Costing Engine
//!
//! Keeps recipe cost rollups consistent with ingredient prices.
//!
//! ## When Costing Runs
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Cost Rollup Triggers                               │
//! │                                                                         │
//! │  RecipeItem created / updated / deactivated ──┐                         │
//! │  Ingredient cost_per_unit changed ────────────┼──► recompute, INSIDE    │
//! │  Ingredient deactivated ──────────────────────┘    the same transaction │
//! │                                                                         │
//! │  total_cost       = Σ(item.quantity × ingredient.cost_per_unit)        │
//! │                     over active items of active ingredients            │
//! │  cost_per_serving = total_cost / servings                              │
//! │                                                                         │
//! │  A committed reader can never observe a recipe whose stored cost       │
//! │  disagrees with its current composition.                               │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Math runs in full f64 precision (REAL quantity × integer centavos) and
//! rounds to centavos only when written back.

use chrono::Local;
use sqlx::SqliteConnection;
use tracing::debug;

use crate::error::{DbError, DbResult};

/// Recomputes and stores `total_cost` and `cost_per_serving` for one recipe.
///
/// Takes a bare connection so it composes into whichever transaction
/// triggered it. Returns the new total in centavos.
pub async fn recompute_recipe(conn: &mut SqliteConnection, recipe_id: i64) -> DbResult<i64> {
    let servings: Option<i64> = sqlx::query_scalar("SELECT servings FROM recipes WHERE id = ?1")
        .bind(recipe_id)
        .fetch_optional(&mut *conn)
        .await?;

    let servings = servings.ok_or_else(|| DbError::not_found("Recipe", recipe_id))?;

    // Full-precision rollup: REAL quantity × INTEGER centavos in SQLite's
    // f64 arithmetic, rounded once at the stored boundary.
    let raw_total: f64 = sqlx::query_scalar(
        r#"
        SELECT COALESCE(SUM(ri.quantity * i.cost_per_unit_cents), 0.0)
        FROM recipe_items ri
        JOIN ingredients i ON i.id = ri.ingredient_id
        WHERE ri.recipe_id = ?1
          AND ri.is_active = 1
          AND i.is_active = 1
        "#,
    )
    .bind(recipe_id)
    .fetch_one(&mut *conn)
    .await?;

    let total_cents = raw_total.round() as i64;
    // servings >= 1 is enforced at creation and by a CHECK constraint
    let per_serving_cents = (raw_total / servings as f64).round() as i64;

    debug!(
        recipe_id,
        total_cents, per_serving_cents, "Recomputed recipe cost"
    );

    sqlx::query(
        r#"
        UPDATE recipes
        SET total_cost_cents = ?2, cost_per_serving_cents = ?3, updated_at = ?4
        WHERE id = ?1
        "#,
    )
    .bind(recipe_id)
    .bind(total_cents)
    .bind(per_serving_cents)
    .bind(Local::now().naive_local())
    .execute(&mut *conn)
    .await?;

    Ok(total_cents)
}

/// Recomputes every active recipe that uses the given ingredient.
///
/// Called when an ingredient's unit cost changes or the ingredient is
/// deactivated, inside that write's transaction.
pub async fn recompute_recipes_using_ingredient(
    conn: &mut SqliteConnection,
    ingredient_id: i64,
) -> DbResult<()> {
    let recipe_ids: Vec<i64> = sqlx::query_scalar(
        r#"
        SELECT DISTINCT ri.recipe_id
        FROM recipe_items ri
        JOIN recipes r ON r.id = ri.recipe_id
        WHERE ri.ingredient_id = ?1
          AND ri.is_active = 1
          AND r.is_active = 1
        "#,
    )
    .bind(ingredient_id)
    .fetch_all(&mut *conn)
    .await?;

    debug!(
        ingredient_id,
        affected = recipe_ids.len(),
        "Recomputing recipes after ingredient change"
    );

    for recipe_id in recipe_ids {
        recompute_recipe(conn, recipe_id).await?;
    }

    Ok(())
}
