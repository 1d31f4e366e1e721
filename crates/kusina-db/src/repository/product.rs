//! # Product Repository
//!
//! Database operations for menu products.
//!
//! A product's `recipe_id` is checked against active recipes on every
//! create/update, but the link stays weak: deactivating a recipe later does
//! not cascade here, it just stops the product from consuming stock.

use chrono::Local;
use sqlx::{SqliteConnection, SqlitePool};
use tracing::debug;

use crate::error::{DbError, DbResult};
use kusina_core::validation::validate_new_product;
use kusina_core::{NewProduct, Product};

const SELECT: &str = r#"
SELECT id, name, category, selling_price_cents, recipe_id,
       is_inventory_tracked, is_active, created_at, updated_at
FROM products
"#;

/// Repository for product database operations.
#[derive(Debug, Clone)]
pub struct ProductRepository {
    pool: SqlitePool,
}

impl ProductRepository {
    /// Creates a new ProductRepository.
    pub fn new(pool: SqlitePool) -> Self {
        ProductRepository { pool }
    }

    /// Creates a product.
    pub async fn create(&self, payload: &NewProduct) -> DbResult<Product> {
        validate_new_product(payload)?;

        debug!(name = %payload.name, "Creating product");

        let mut tx = self.pool.begin().await?;

        if let Some(recipe_id) = payload.recipe_id {
            ensure_active_recipe(&mut tx, recipe_id).await?;
        }

        let result = sqlx::query(
            r#"
            INSERT INTO products
                (name, category, selling_price_cents, recipe_id,
                 is_inventory_tracked, is_active, created_at, updated_at)
            VALUES (?1, ?2, ?3, ?4, ?5, 1, ?6, ?6)
            "#,
        )
        .bind(payload.name.trim())
        .bind(payload.category)
        .bind(payload.selling_price_cents)
        .bind(payload.recipe_id)
        .bind(payload.is_inventory_tracked)
        .bind(Local::now().naive_local())
        .execute(&mut *tx)
        .await?;

        let product = sqlx::query_as::<_, Product>(&format!("{SELECT} WHERE id = ?1"))
            .bind(result.last_insert_rowid())
            .fetch_one(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(product)
    }

    /// Updates a product's fields.
    pub async fn update(&self, id: i64, payload: &NewProduct) -> DbResult<Product> {
        validate_new_product(payload)?;

        let mut tx = self.pool.begin().await?;

        if let Some(recipe_id) = payload.recipe_id {
            ensure_active_recipe(&mut tx, recipe_id).await?;
        }

        let result = sqlx::query(
            r#"
            UPDATE products
            SET name = ?2, category = ?3, selling_price_cents = ?4,
                recipe_id = ?5, is_inventory_tracked = ?6, updated_at = ?7
            WHERE id = ?1 AND is_active = 1
            "#,
        )
        .bind(id)
        .bind(payload.name.trim())
        .bind(payload.category)
        .bind(payload.selling_price_cents)
        .bind(payload.recipe_id)
        .bind(payload.is_inventory_tracked)
        .bind(Local::now().naive_local())
        .execute(&mut *tx)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Product", id));
        }

        let product = sqlx::query_as::<_, Product>(&format!("{SELECT} WHERE id = ?1"))
            .bind(id)
            .fetch_one(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(product)
    }

    /// Soft-deletes a product. Past sale items keep referencing it.
    pub async fn soft_delete(&self, id: i64) -> DbResult<()> {
        let result = sqlx::query(
            "UPDATE products SET is_active = 0, updated_at = ?2 WHERE id = ?1 AND is_active = 1",
        )
        .bind(id)
        .bind(Local::now().naive_local())
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Product", id));
        }
        Ok(())
    }

    /// Gets an active product by ID.
    pub async fn get_by_id(&self, id: i64) -> DbResult<Option<Product>> {
        let product =
            sqlx::query_as::<_, Product>(&format!("{SELECT} WHERE id = ?1 AND is_active = 1"))
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;
        Ok(product)
    }

    /// Gets a product by ID regardless of soft-delete state.
    pub async fn get_by_id_any(&self, id: i64) -> DbResult<Option<Product>> {
        let product = sqlx::query_as::<_, Product>(&format!("{SELECT} WHERE id = ?1"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(product)
    }

    /// Lists active products, sorted by name.
    pub async fn list(&self) -> DbResult<Vec<Product>> {
        let products =
            sqlx::query_as::<_, Product>(&format!("{SELECT} WHERE is_active = 1 ORDER BY name"))
                .fetch_all(&self.pool)
                .await?;
        Ok(products)
    }

    /// Lists every product including soft-deleted ones.
    pub async fn list_all(&self) -> DbResult<Vec<Product>> {
        let products = sqlx::query_as::<_, Product>(&format!("{SELECT} ORDER BY name"))
            .fetch_all(&self.pool)
            .await?;
        Ok(products)
    }

    /// Case-insensitive substring search over the name, active rows only.
    pub async fn search(&self, query: &str) -> DbResult<Vec<Product>> {
        let pattern = format!("%{}%", query.trim());
        let products = sqlx::query_as::<_, Product>(&format!(
            "{SELECT} WHERE is_active = 1 AND name LIKE ?1 ORDER BY name"
        ))
        .bind(pattern)
        .fetch_all(&self.pool)
        .await?;
        Ok(products)
    }
}

async fn ensure_active_recipe(conn: &mut SqliteConnection, recipe_id: i64) -> DbResult<()> {
    let active: Option<i64> =
        sqlx::query_scalar("SELECT 1 FROM recipes WHERE id = ?1 AND is_active = 1")
            .bind(recipe_id)
            .fetch_optional(&mut *conn)
            .await?;

    if active.is_none() {
        return Err(DbError::ConstraintViolation {
            message: format!("product references missing or inactive recipe {recipe_id}"),
        });
    }
    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================
