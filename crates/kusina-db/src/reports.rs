//! # Reporting Aggregator
//!
//! Read-only aggregate queries over committed sales and expenses.
//!
//! ## Reports
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Reporting Queries                                │
//! │                                                                         │
//! │  daily_report(date)     totals for one local calendar day              │
//! │  weekly_trend()         last 7 days, quiet days ZERO not missing       │
//! │  best_sellers(limit)    units sold per product, ties by id ASC         │
//! │  peak_hours()           24-slot histogram of sale counts by hour       │
//! │  break_even_analysis()  fixed / (avg price − avg variable cost)        │
//! │                                                                         │
//! │  All reports read active sales only (voided sales drop out) and        │
//! │  never write anything.                                                  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::{Duration, Local, NaiveDate};
use sqlx::SqlitePool;
use tracing::debug;

use crate::error::DbResult;
use kusina_core::{BestSeller, BreakEvenAnalysis, DailyReport, PeakHours};

/// Read-only reporting over sales, products and expenses.
#[derive(Debug, Clone)]
pub struct ReportRepository {
    pool: SqlitePool,
}

impl ReportRepository {
    /// Creates a new ReportRepository.
    pub fn new(pool: SqlitePool) -> Self {
        ReportRepository { pool }
    }

    /// Sales totals for one local calendar day. A day with no sales is the
    /// all-zero report, not an error.
    pub async fn daily_report(&self, date: NaiveDate) -> DbResult<DailyReport> {
        let (subtotal, discount, total, count): (i64, i64, i64, i64) = sqlx::query_as(
            r#"
            SELECT COALESCE(SUM(subtotal_cents), 0),
                   COALESCE(SUM(discount_amount_cents), 0),
                   COALESCE(SUM(total_cents), 0),
                   COUNT(*)
            FROM sales
            WHERE is_active = 1 AND date(created_at) = ?1
            "#,
        )
        .bind(date)
        .fetch_one(&self.pool)
        .await?;

        Ok(DailyReport {
            date,
            subtotal_cents: subtotal,
            discount_cents: discount,
            total_cents: total,
            transaction_count: count,
        })
    }

    /// The last 7 local days ending today, oldest first.
    ///
    /// Always exactly 7 entries; days without sales report zeros so a chart
    /// never has holes.
    pub async fn weekly_trend(&self) -> DbResult<Vec<DailyReport>> {
        let today = Local::now().date_naive();
        let mut trend = Vec::with_capacity(7);

        for offset in (0..7).rev() {
            let date = today - Duration::days(offset);
            trend.push(self.daily_report(date).await?);
        }

        Ok(trend)
    }

    /// Products ranked by units sold, highest first. Ties break by product
    /// id ascending so the ranking is stable across runs.
    pub async fn best_sellers(&self, limit: u32) -> DbResult<Vec<BestSeller>> {
        let rows: Vec<(i64, String, i64)> = sqlx::query_as(
            r#"
            SELECT si.product_id, p.name, SUM(si.quantity) AS quantity_sold
            FROM sale_items si
            JOIN sales s ON s.id = si.sale_id
            JOIN products p ON p.id = si.product_id
            WHERE s.is_active = 1
            GROUP BY si.product_id, p.name
            ORDER BY quantity_sold DESC, si.product_id ASC
            LIMIT ?1
            "#,
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|(product_id, product_name, quantity_sold)| BestSeller {
                product_id,
                product_name,
                quantity_sold,
            })
            .collect())
    }

    /// Sale counts bucketed by local hour of day, all time.
    pub async fn peak_hours(&self) -> DbResult<PeakHours> {
        let rows: Vec<(i64, i64)> = sqlx::query_as(
            r#"
            SELECT CAST(strftime('%H', created_at) AS INTEGER) AS hour, COUNT(*)
            FROM sales
            WHERE is_active = 1
            GROUP BY hour
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        let mut histogram = PeakHours::empty();
        for (hour, count) in rows {
            if (0..24).contains(&hour) {
                histogram.counts[hour as usize] = count;
            }
        }
        Ok(histogram)
    }

    /// Break-even units for the menu as currently priced.
    ///
    /// Fixed costs come from active recurring expenses, normalized to a
    /// month (daily recurrences × 30). Average variable cost is the mean
    /// `cost_per_serving` of active recipe-backed products; average selling
    /// price is the mean over active products. When price does not beat
    /// variable cost, `break_even_units` is `None`.
    pub async fn break_even_analysis(&self) -> DbResult<BreakEvenAnalysis> {
        let (monthly, daily): (i64, i64) = sqlx::query_as(
            r#"
            SELECT
                COALESCE(SUM(CASE WHEN recurrence_type = 'monthly' THEN amount_cents END), 0),
                COALESCE(SUM(CASE WHEN recurrence_type = 'daily' THEN amount_cents END), 0)
            FROM expenses
            WHERE is_active = 1 AND recurrence_type IS NOT NULL
            "#,
        )
        .fetch_one(&self.pool)
        .await?;

        let fixed_costs_cents = monthly + daily * 30;

        let avg_price: Option<f64> = sqlx::query_scalar(
            "SELECT AVG(selling_price_cents) FROM products WHERE is_active = 1",
        )
        .fetch_one(&self.pool)
        .await?;

        let avg_variable: Option<f64> = sqlx::query_scalar(
            r#"
            SELECT AVG(r.cost_per_serving_cents)
            FROM products p
            JOIN recipes r ON r.id = p.recipe_id
            WHERE p.is_active = 1 AND r.is_active = 1
            "#,
        )
        .fetch_one(&self.pool)
        .await?;

        let avg_selling_price_cents = avg_price.unwrap_or(0.0).round() as i64;
        let avg_variable_cost_cents = avg_variable.unwrap_or(0.0).round() as i64;

        debug!(
            fixed_costs_cents,
            avg_selling_price_cents, avg_variable_cost_cents, "Break-even inputs"
        );

        Ok(BreakEvenAnalysis::compute(
            fixed_costs_cents,
            avg_selling_price_cents,
            avg_variable_cost_cents,
        ))
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
        ExpenseCategory, NewExpense, NewIngredient, NewProduct, NewRecipe, NewRecipeItem,
        NewSale, NewSaleItem, PaymentMethod, ProductCategory, RecurrenceType,
    };

    async fn test_db() -> Database {
        Database::new(DbConfig::in_memory()).await.unwrap()
    }

    async fn add_product(db: &Database, name: &str, price_cents: i64) -> i64 {
        db.products()
            .create(&NewProduct {
                name: name.to_string(),
                category: ProductCategory::Food,
                selling_price_cents: price_cents,
                recipe_id: None,
                is_inventory_tracked: false,
            })
            .await
            .unwrap()
            .id
    }

    async fn sell(db: &Database, product_id: i64, quantity: i64) {
        db.sales()
            .record_sale(&NewSale {
                items: vec![NewSaleItem {
                    product_id,
                    quantity,
                }],
                discount_amount_cents: 0,
                discount_percent: 0.0,
                payment_method: PaymentMethod::Gcash,
                amount_received_cents: 0,
            })
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_daily_report_totals() {
        let db = test_db().await;
        let bread = add_product(&db, "Bread", 2500).await;

        sell(&db, bread, 2).await; // 5000
        sell(&db, bread, 1).await; // 2500

        let report = db.reports().daily_report(Local::now().date_naive()).await.unwrap();
        assert_eq!(report.transaction_count, 2);
        assert_eq!(report.total_cents, 7500);

        // Voided sales drop out.
        let sale = db.sales().list_recent(1).await.unwrap().remove(0);
        db.sales().soft_delete(sale.id).await.unwrap();
        let report = db.reports().daily_report(Local::now().date_naive()).await.unwrap();
        assert_eq!(report.transaction_count, 1);
    }

    #[tokio::test]
    async fn test_weekly_trend_zero_fills_quiet_days() {
        let db = test_db().await;
        let bread = add_product(&db, "Bread", 2500).await;
        sell(&db, bread, 1).await;

        let trend = db.reports().weekly_trend().await.unwrap();
        assert_eq!(trend.len(), 7);
        assert!(trend.windows(2).all(|w| w[0].date < w[1].date));

        // Only today has sales; the other six are zero rows, not gaps.
        assert_eq!(trend[6].transaction_count, 1);
        assert!(trend[..6].iter().all(|d| *d == DailyReport::empty(d.date)));
    }

    #[tokio::test]
    async fn test_best_sellers_ranking_and_tie_break() {
        let db = test_db().await;
        let bread = add_product(&db, "Bread", 2500).await;
        let kape = add_product(&db, "Kape", 3500).await;
        let puto = add_product(&db, "Puto", 1000).await;

        sell(&db, kape, 5).await;
        sell(&db, bread, 3).await;
        sell(&db, puto, 3).await;

        let ranking = db.reports().best_sellers(10).await.unwrap();
        assert_eq!(ranking.len(), 3);
        assert_eq!(ranking[0].product_name, "Kape");
        assert_eq!(ranking[0].quantity_sold, 5);
        // Bread and Puto tie at 3; the earlier product id wins.
        assert_eq!(ranking[1].product_id, bread);
        assert_eq!(ranking[2].product_id, puto);

        let top_one = db.reports().best_sellers(1).await.unwrap();
        assert_eq!(top_one.len(), 1);
    }

    #[tokio::test]
    async fn test_peak_hours_counts_every_sale() {
        let db = test_db().await;
        let bread = add_product(&db, "Bread", 2500).await;
        sell(&db, bread, 1).await;
        sell(&db, bread, 1).await;

        let histogram = db.reports().peak_hours().await.unwrap();
        assert_eq!(histogram.counts.iter().sum::<i64>(), 2);
        assert!(histogram.busiest_hour().is_some());
    }

    #[tokio::test]
    async fn test_break_even_from_recurring_expenses() {
        let db = test_db().await;

        // Fixed ₱10,000/month; one product at ₱50 backed by a recipe that
        // costs ₱30 per serving → 10000 / (50 − 30) = 500 units.
        db.expenses()
            .create(&NewExpense {
                description: "Stall rent".to_string(),
                category: ExpenseCategory::Rent,
                amount_cents: 1_000_000,
                recurrence_type: Some(RecurrenceType::Monthly),
                expense_date: Local::now().date_naive(),
            })
            .await
            .unwrap();

        let flour = db
            .ingredients()
            .create(&NewIngredient {
                name: "Flour".to_string(),
                cost_per_unit_cents: 3000,
                unit_type: "kg".to_string(),
                low_stock_threshold: 1.0,
                supplier: None,
                expiration_date: None,
                opening_stock: None,
            })
            .await
            .unwrap();

        let recipe = db
            .recipes()
            .create(&NewRecipe {
                name: "Bread".to_string(),
                servings: 1,
                items: vec![NewRecipeItem {
                    ingredient_id: flour.id,
                    quantity: 1.0,
                    unit_type: "kg".to_string(),
                }],
            })
            .await
            .unwrap();

        db.products()
            .create(&NewProduct {
                name: "Bread".to_string(),
                category: ProductCategory::Food,
                selling_price_cents: 5000,
                recipe_id: Some(recipe.id),
                is_inventory_tracked: true,
            })
            .await
            .unwrap();

        let analysis = db.reports().break_even_analysis().await.unwrap();
        assert_eq!(analysis.fixed_costs_cents, 1_000_000);
        assert_eq!(analysis.avg_selling_price_cents, 5000);
        assert_eq!(analysis.avg_variable_cost_cents, 3000);
        assert_eq!(analysis.break_even_units, Some(500.0));
    }

    #[tokio::test]
    async fn test_break_even_sentinel_when_unprofitable() {
        let db = test_db().await;
        // No products at all: price 0, variable 0 → denominator 0 → None.
        let analysis = db.reports().break_even_analysis().await.unwrap();
        assert_eq!(analysis.break_even_units, None);
    }
}
