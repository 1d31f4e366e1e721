//! # Expense Repository
//!
//! Business expenses. Recurring expenses (daily or monthly) feed the
//! break-even analysis as fixed costs; one-off expenses just sit in the
//! books.

use chrono::{Local, NaiveDate};
use sqlx::SqlitePool;

use crate::error::{DbError, DbResult};
use kusina_core::validation::validate_new_expense;
use kusina_core::{Expense, NewExpense};

const SELECT: &str = r#"
SELECT id, description, category, amount_cents, recurrence_type,
       expense_date, is_active, created_at, updated_at
FROM expenses
"#;

/// Repository for expense database operations.
#[derive(Debug, Clone)]
pub struct ExpenseRepository {
    pool: SqlitePool,
}

impl ExpenseRepository {
    /// Creates a new ExpenseRepository.
    pub fn new(pool: SqlitePool) -> Self {
        ExpenseRepository { pool }
    }

    /// Creates an expense.
    pub async fn create(&self, payload: &NewExpense) -> DbResult<Expense> {
        validate_new_expense(payload)?;

        let result = sqlx::query(
            r#"
            INSERT INTO expenses
                (description, category, amount_cents, recurrence_type,
                 expense_date, is_active, created_at, updated_at)
            VALUES (?1, ?2, ?3, ?4, ?5, 1, ?6, ?6)
            "#,
        )
        .bind(payload.description.trim())
        .bind(payload.category)
        .bind(payload.amount_cents)
        .bind(payload.recurrence_type)
        .bind(payload.expense_date)
        .bind(Local::now().naive_local())
        .execute(&self.pool)
        .await?;

        let expense = sqlx::query_as::<_, Expense>(&format!("{SELECT} WHERE id = ?1"))
            .bind(result.last_insert_rowid())
            .fetch_one(&self.pool)
            .await?;
        Ok(expense)
    }

    /// Updates an expense's fields.
    pub async fn update(&self, id: i64, payload: &NewExpense) -> DbResult<Expense> {
        validate_new_expense(payload)?;

        let result = sqlx::query(
            r#"
            UPDATE expenses
            SET description = ?2, category = ?3, amount_cents = ?4,
                recurrence_type = ?5, expense_date = ?6, updated_at = ?7
            WHERE id = ?1 AND is_active = 1
            "#,
        )
        .bind(id)
        .bind(payload.description.trim())
        .bind(payload.category)
        .bind(payload.amount_cents)
        .bind(payload.recurrence_type)
        .bind(payload.expense_date)
        .bind(Local::now().naive_local())
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Expense", id));
        }

        let expense = sqlx::query_as::<_, Expense>(&format!("{SELECT} WHERE id = ?1"))
            .bind(id)
            .fetch_one(&self.pool)
            .await?;
        Ok(expense)
    }

    /// Soft-deletes an expense.
    pub async fn soft_delete(&self, id: i64) -> DbResult<()> {
        let result = sqlx::query(
            "UPDATE expenses SET is_active = 0, updated_at = ?2 WHERE id = ?1 AND is_active = 1",
        )
        .bind(id)
        .bind(Local::now().naive_local())
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Expense", id));
        }
        Ok(())
    }

    /// Gets an active expense by ID.
    pub async fn get_by_id(&self, id: i64) -> DbResult<Option<Expense>> {
        let expense =
            sqlx::query_as::<_, Expense>(&format!("{SELECT} WHERE id = ?1 AND is_active = 1"))
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;
        Ok(expense)
    }

    /// Lists active expenses, most recent first.
    pub async fn list(&self) -> DbResult<Vec<Expense>> {
        let expenses = sqlx::query_as::<_, Expense>(&format!(
            "{SELECT} WHERE is_active = 1 ORDER BY expense_date DESC, id DESC"
        ))
        .fetch_all(&self.pool)
        .await?;
        Ok(expenses)
    }

    /// Active expenses dated within [from, to], most recent first.
    pub async fn list_between(&self, from: NaiveDate, to: NaiveDate) -> DbResult<Vec<Expense>> {
        let expenses = sqlx::query_as::<_, Expense>(&format!(
            "{SELECT} WHERE is_active = 1 AND expense_date >= ?1 AND expense_date <= ?2 ORDER BY expense_date DESC, id DESC"
        ))
        .bind(from)
        .bind(to)
        .fetch_all(&self.pool)
        .await?;
        Ok(expenses)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};
    use kusina_core::{ExpenseCategory, RecurrenceType};

    fn rent() -> NewExpense {
        NewExpense {
            description: "Stall rent".to_string(),
            category: ExpenseCategory::Rent,
            amount_cents: 1_500_000,
            recurrence_type: Some(RecurrenceType::Monthly),
            expense_date: NaiveDate::from_ymd_opt(2026, 8, 1).unwrap(),
        }
    }

    #[tokio::test]
    async fn test_crud_round_trip() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let repo = db.expenses();

        let expense = repo.create(&rent()).await.unwrap();
        assert_eq!(expense.recurrence_type, Some(RecurrenceType::Monthly));

        let mut payload = rent();
        payload.amount_cents = 1_600_000;
        payload.recurrence_type = None;
        let expense = repo.update(expense.id, &payload).await.unwrap();
        assert_eq!(expense.amount_cents, 1_600_000);
        assert_eq!(expense.recurrence_type, None);

        repo.soft_delete(expense.id).await.unwrap();
        assert!(repo.get_by_id(expense.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_date_range_filter() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let repo = db.expenses();

        repo.create(&rent()).await.unwrap();
        let mut july = rent();
        july.expense_date = NaiveDate::from_ymd_opt(2026, 7, 1).unwrap();
        repo.create(&july).await.unwrap();

        let august = repo
            .list_between(
                NaiveDate::from_ymd_opt(2026, 8, 1).unwrap(),
                NaiveDate::from_ymd_opt(2026, 8, 31).unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(august.len(), 1);
    }

    #[tokio::test]
    async fn test_blank_description_rejected() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();

        let mut payload = rent();
        payload.description = "   ".to_string();
        assert!(matches!(
            db.expenses().create(&payload).await,
            Err(DbError::Validation(_))
        ));
    }
}
