//! # Sale Repository
//!
//! Atomic sale recording.
//!
//! ## The Sale Transaction
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                   record_sale() - ONE transaction                       │
//! │                                                                         │
//! │  1. Price every line from the CURRENT product row (snapshot)           │
//! │  2. subtotal → discount → total → payment check → change               │
//! │  3. INSERT sales                                                        │
//! │  4. INSERT sale_items (one per line)                                    │
//! │  5. For each recipe-backed, inventory-tracked product:                  │
//! │       one `sale` ledger row per recipe item                             │
//! │       (recipe_item.quantity × line.quantity, reference_id = sale_id)   │
//! │  6. COMMIT - or roll everything back                                    │
//! │                                                                         │
//! │  A failure at ANY step leaves no sale row, no items, no ledger rows,   │
//! │  no stock change. Committed or invisible, never partial.               │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Sales are immutable after creation: there is no update method, only
//! soft-delete for voiding. Totals, snapshots and ledger rows stay frozen.

use chrono::Local;
use sqlx::SqlitePool;
use tracing::{debug, info};

use crate::error::{DbError, DbResult};
use crate::ledger::{self, StockMovement};
use kusina_core::validation::validate_new_sale;
use kusina_core::{
    CoreError, Money, NewSale, PaymentMethod, Product, RecipeItem, Sale, SaleItem,
    TransactionType,
};

const SELECT: &str = r#"
SELECT id, subtotal_cents, discount_amount_cents, discount_percent, total_cents,
       payment_method, amount_received_cents, change_cents, is_active,
       created_at, updated_at
FROM sales
"#;

/// Repository for sale database operations.
#[derive(Debug, Clone)]
pub struct SaleRepository {
    pool: SqlitePool,
}

impl SaleRepository {
    /// Creates a new SaleRepository.
    pub fn new(pool: SqlitePool) -> Self {
        SaleRepository { pool }
    }

    /// Records a complete sale atomically.
    ///
    /// Pricing comes from the current product rows, never from the caller.
    /// When `discount_percent` is non-zero the discount amount is derived
    /// from the subtotal (rounded to centavos); otherwise the absolute
    /// `discount_amount_cents` applies. The discount never exceeds the
    /// subtotal.
    ///
    /// Cash payments must cover the total (`InsufficientPayment` otherwise)
    /// and get change back; digital payments are exact by nature, so change
    /// is zero.
    pub async fn record_sale(&self, payload: &NewSale) -> DbResult<Sale> {
        validate_new_sale(payload)?;
        let now = Local::now().naive_local();

        let mut tx = self.pool.begin().await?;

        // Price the lines. Each line snapshots the product's current price.
        let mut lines: Vec<(Product, i64)> = Vec::with_capacity(payload.items.len());
        let mut subtotal_cents: i64 = 0;

        for item in &payload.items {
            let product = sqlx::query_as::<_, Product>(
                r#"
                SELECT id, name, category, selling_price_cents, recipe_id,
                       is_inventory_tracked, is_active, created_at, updated_at
                FROM products
                WHERE id = ?1 AND is_active = 1
                "#,
            )
            .bind(item.product_id)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or_else(|| DbError::not_found("Product", item.product_id))?;

            subtotal_cents += product.selling_price_cents * item.quantity;
            lines.push((product, item.quantity));
        }

        let discount_cents = if payload.discount_percent > 0.0 {
            Money::from_cents(subtotal_cents)
                .percent_of(payload.discount_percent)
                .cents()
        } else {
            payload.discount_amount_cents
        }
        .min(subtotal_cents);

        let total_cents = subtotal_cents - discount_cents;

        let (amount_received_cents, change_cents) = match payload.payment_method {
            PaymentMethod::Cash => {
                if payload.amount_received_cents < total_cents {
                    return Err(CoreError::InsufficientPayment {
                        received: Money::from_cents(payload.amount_received_cents).to_string(),
                        total: Money::from_cents(total_cents).to_string(),
                    }
                    .into());
                }
                (
                    payload.amount_received_cents,
                    payload.amount_received_cents - total_cents,
                )
            }
            // Digital payments settle the exact total; change is meaningless.
            _ => (total_cents, 0),
        };

        let result = sqlx::query(
            r#"
            INSERT INTO sales
                (subtotal_cents, discount_amount_cents, discount_percent, total_cents,
                 payment_method, amount_received_cents, change_cents, is_active,
                 created_at, updated_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, 1, ?8, ?8)
            "#,
        )
        .bind(subtotal_cents)
        .bind(discount_cents)
        .bind(payload.discount_percent)
        .bind(total_cents)
        .bind(payload.payment_method)
        .bind(amount_received_cents)
        .bind(change_cents)
        .bind(now)
        .execute(&mut *tx)
        .await?;

        let sale_id = result.last_insert_rowid();

        for (product, quantity) in &lines {
            sqlx::query(
                r#"
                INSERT INTO sale_items
                    (sale_id, product_id, quantity, unit_price_cents, subtotal_cents, created_at)
                VALUES (?1, ?2, ?3, ?4, ?5, ?6)
                "#,
            )
            .bind(sale_id)
            .bind(product.id)
            .bind(quantity)
            .bind(product.selling_price_cents)
            .bind(product.selling_price_cents * quantity)
            .bind(now)
            .execute(&mut *tx)
            .await?;

            if product.consumes_stock() {
                // recipe_id is Some by consumes_stock()
                let recipe_id = product.recipe_id.unwrap_or_default();
                let recipe_items = sqlx::query_as::<_, RecipeItem>(
                    r#"
                    SELECT id, recipe_id, ingredient_id, quantity, unit_type, is_active,
                           created_at, updated_at
                    FROM recipe_items
                    WHERE recipe_id = ?1 AND is_active = 1
                    "#,
                )
                .bind(recipe_id)
                .fetch_all(&mut *tx)
                .await?;

                for recipe_item in &recipe_items {
                    ledger::record_transaction(
                        &mut tx,
                        &StockMovement {
                            ingredient_id: recipe_item.ingredient_id,
                            transaction_type: TransactionType::Sale,
                            quantity: recipe_item.quantity * *quantity as f64,
                            unit_cost_cents: None,
                            reference_id: Some(sale_id),
                        },
                    )
                    .await?;
                }

                debug!(
                    sale_id,
                    product_id = product.id,
                    ledger_rows = recipe_items.len(),
                    "Consumed stock for sale line"
                );
            }
        }

        let sale = sqlx::query_as::<_, Sale>(&format!("{SELECT} WHERE id = ?1"))
            .bind(sale_id)
            .fetch_one(&mut *tx)
            .await?;

        tx.commit().await?;

        info!(
            sale_id,
            total = %sale.total(),
            payment_method = %sale.payment_method,
            "Sale recorded"
        );

        Ok(sale)
    }

    /// Gets an active sale by ID.
    pub async fn get_by_id(&self, id: i64) -> DbResult<Option<Sale>> {
        let sale = sqlx::query_as::<_, Sale>(&format!("{SELECT} WHERE id = ?1 AND is_active = 1"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(sale)
    }

    /// Gets a sale by ID regardless of soft-delete state.
    pub async fn get_by_id_any(&self, id: i64) -> DbResult<Option<Sale>> {
        let sale = sqlx::query_as::<_, Sale>(&format!("{SELECT} WHERE id = ?1"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(sale)
    }

    /// Line items of a sale, in insertion order. Items are readable even for
    /// voided sales - history is never hidden.
    pub async fn get_items(&self, sale_id: i64) -> DbResult<Vec<SaleItem>> {
        let items = sqlx::query_as::<_, SaleItem>(
            r#"
            SELECT id, sale_id, product_id, quantity, unit_price_cents,
                   subtotal_cents, created_at
            FROM sale_items
            WHERE sale_id = ?1
            ORDER BY id
            "#,
        )
        .bind(sale_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(items)
    }

    /// The most recent active sales, newest first.
    pub async fn list_recent(&self, limit: u32) -> DbResult<Vec<Sale>> {
        let sales = sqlx::query_as::<_, Sale>(&format!(
            "{SELECT} WHERE is_active = 1 ORDER BY id DESC LIMIT ?1"
        ))
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;
        Ok(sales)
    }

    /// Active sales within a local date-time range, oldest first.
    pub async fn list_between(
        &self,
        from: chrono::NaiveDateTime,
        to: chrono::NaiveDateTime,
    ) -> DbResult<Vec<Sale>> {
        let sales = sqlx::query_as::<_, Sale>(&format!(
            "{SELECT} WHERE is_active = 1 AND created_at >= ?1 AND created_at < ?2 ORDER BY id"
        ))
        .bind(from)
        .bind(to)
        .fetch_all(&self.pool)
        .await?;
        Ok(sales)
    }

    /// Voids a sale.
    ///
    /// The sale drops out of reports but its items and ledger rows remain:
    /// the stock really was consumed, and the ledger is append-only.
    pub async fn soft_delete(&self, id: i64) -> DbResult<()> {
        let result = sqlx::query(
            "UPDATE sales SET is_active = 0, updated_at = ?2 WHERE id = ?1 AND is_active = 1",
        )
        .bind(id)
        .bind(Local::now().naive_local())
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Sale", id));
        }
        Ok(())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};
    use kusina_core::{
        NewIngredient, NewProduct, NewRecipe, NewRecipeItem, NewSaleItem, ProductCategory,
    };

    async fn test_db() -> Database {
        Database::new(DbConfig::in_memory()).await.unwrap()
    }

    /// Flour (₱50/kg, 20 kg) → Bread recipe (2 kg per batch) → Bread product
    /// at ₱25.00, inventory-tracked.
    async fn seed_bread(db: &Database) -> (i64, i64) {
        let flour = db
            .ingredients()
            .create(&NewIngredient {
                name: "Flour".to_string(),
                cost_per_unit_cents: 5000,
                unit_type: "kg".to_string(),
                low_stock_threshold: 5.0,
                supplier: None,
                expiration_date: None,
                opening_stock: Some(20.0),
            })
            .await
            .unwrap();

        let recipe = db
            .recipes()
            .create(&NewRecipe {
                name: "Bread".to_string(),
                servings: 4,
                items: vec![NewRecipeItem {
                    ingredient_id: flour.id,
                    quantity: 2.0,
                    unit_type: "kg".to_string(),
                }],
            })
            .await
            .unwrap();

        let product = db
            .products()
            .create(&NewProduct {
                name: "Bread".to_string(),
                category: ProductCategory::Food,
                selling_price_cents: 2500,
                recipe_id: Some(recipe.id),
                is_inventory_tracked: true,
            })
            .await
            .unwrap();

        (flour.id, product.id)
    }

    fn cash_sale(product_id: i64, quantity: i64, received_cents: i64) -> NewSale {
        NewSale {
            items: vec![NewSaleItem {
                product_id,
                quantity,
            }],
            discount_amount_cents: 0,
            discount_percent: 0.0,
            payment_method: PaymentMethod::Cash,
            amount_received_cents: received_cents,
        }
    }

    #[tokio::test]
    async fn test_sale_consumes_recipe_stock() {
        let db = test_db().await;
        let (flour, bread) = seed_bread(&db).await;

        // 3 loaves × 2 kg flour each = 6 kg consumed
        let sale = db.sales().record_sale(&cash_sale(bread, 3, 10_000)).await.unwrap();
        assert_eq!(sale.subtotal_cents, 7500);
        assert_eq!(sale.total_cents, 7500);
        assert_eq!(sale.change_cents, 2500);

        let ingredient = db.ingredients().get_by_id(flour).await.unwrap().unwrap();
        assert_eq!(ingredient.quantity_in_stock, 14.0);

        // The ledger row links back to the sale.
        let history = db.inventory().history(flour).await.unwrap();
        let sale_row = history.last().unwrap();
        assert_eq!(sale_row.transaction_type, TransactionType::Sale);
        assert_eq!(sale_row.quantity, -6.0);
        assert_eq!(sale_row.reference_id, Some(sale.id));
    }

    #[tokio::test]
    async fn test_failed_sale_leaves_nothing() {
        let db = test_db().await;
        let (flour, bread) = seed_bread(&db).await;

        // Second line references a missing product: whole sale rolls back.
        let payload = NewSale {
            items: vec![
                NewSaleItem {
                    product_id: bread,
                    quantity: 1,
                },
                NewSaleItem {
                    product_id: 999,
                    quantity: 1,
                },
            ],
            discount_amount_cents: 0,
            discount_percent: 0.0,
            payment_method: PaymentMethod::Cash,
            amount_received_cents: 10_000,
        };

        let err = db.sales().record_sale(&payload).await.unwrap_err();
        assert!(matches!(err, DbError::NotFound { .. }));

        assert!(db.sales().list_recent(10).await.unwrap().is_empty());
        let ingredient = db.ingredients().get_by_id(flour).await.unwrap().unwrap();
        assert_eq!(ingredient.quantity_in_stock, 20.0);
        assert_eq!(db.inventory().history(flour).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_insufficient_cash_rejected() {
        let db = test_db().await;
        let (_, bread) = seed_bread(&db).await;

        let err = db
            .sales()
            .record_sale(&cash_sale(bread, 3, 5000)) // total is 7500
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::TransactionFailed(_)));
        assert!(db.sales().list_recent(10).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_percent_discount_derived_from_subtotal() {
        let db = test_db().await;
        let (_, bread) = seed_bread(&db).await;

        let mut payload = cash_sale(bread, 4, 10_000); // subtotal 10000
        payload.discount_percent = 10.0;
        let sale = db.sales().record_sale(&payload).await.unwrap();

        assert_eq!(sale.subtotal_cents, 10_000);
        assert_eq!(sale.discount_amount_cents, 1000);
        assert_eq!(sale.total_cents, 9000);
        assert_eq!(sale.change_cents, 1000);
    }

    #[tokio::test]
    async fn test_absolute_discount_capped_at_subtotal() {
        let db = test_db().await;
        let (_, bread) = seed_bread(&db).await;

        let mut payload = cash_sale(bread, 1, 5000); // subtotal 2500
        payload.discount_amount_cents = 99_999;
        let sale = db.sales().record_sale(&payload).await.unwrap();

        assert_eq!(sale.discount_amount_cents, 2500);
        assert_eq!(sale.total_cents, 0);
    }

    #[tokio::test]
    async fn test_digital_payment_has_no_change() {
        let db = test_db().await;
        let (_, bread) = seed_bread(&db).await;

        let mut payload = cash_sale(bread, 2, 0);
        payload.payment_method = PaymentMethod::Gcash;
        let sale = db.sales().record_sale(&payload).await.unwrap();

        assert_eq!(sale.amount_received_cents, 5000);
        assert_eq!(sale.change_cents, 0);
    }

    #[tokio::test]
    async fn test_item_price_is_a_snapshot() {
        let db = test_db().await;
        let (_, bread) = seed_bread(&db).await;

        let sale = db.sales().record_sale(&cash_sale(bread, 1, 5000)).await.unwrap();

        // Raise the price afterwards; the recorded line must not move.
        db.products()
            .update(
                bread,
                &NewProduct {
                    name: "Bread".to_string(),
                    category: ProductCategory::Food,
                    selling_price_cents: 9900,
                    recipe_id: db.products().get_by_id(bread).await.unwrap().unwrap().recipe_id,
                    is_inventory_tracked: true,
                },
            )
            .await
            .unwrap();

        let items = db.sales().get_items(sale.id).await.unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].unit_price_cents, 2500);
    }

    #[tokio::test]
    async fn test_void_keeps_items_and_ledger() {
        let db = test_db().await;
        let (flour, bread) = seed_bread(&db).await;

        let sale = db.sales().record_sale(&cash_sale(bread, 1, 5000)).await.unwrap();
        db.sales().soft_delete(sale.id).await.unwrap();

        assert!(db.sales().get_by_id(sale.id).await.unwrap().is_none());
        assert_eq!(db.sales().get_items(sale.id).await.unwrap().len(), 1);

        // Stock stays consumed; the ledger is append-only.
        let ingredient = db.ingredients().get_by_id(flour).await.unwrap().unwrap();
        assert_eq!(ingredient.quantity_in_stock, 18.0);
    }
}
