//! # Employee Repository
//!
//! Staff records. Labor cost context for break-even analysis; scheduling and
//! payroll live elsewhere.

use chrono::Local;
use sqlx::SqlitePool;

use crate::error::{DbError, DbResult};
use kusina_core::validation::validate_new_employee;
use kusina_core::{Employee, NewEmployee};

const SELECT: &str = r#"
SELECT id, name, role, wage_type, wage_rate_cents, contact_number,
       is_active, created_at, updated_at
FROM employees
"#;

/// Repository for employee database operations.
#[derive(Debug, Clone)]
pub struct EmployeeRepository {
    pool: SqlitePool,
}

impl EmployeeRepository {
    /// Creates a new EmployeeRepository.
    pub fn new(pool: SqlitePool) -> Self {
        EmployeeRepository { pool }
    }

    /// Creates an employee.
    pub async fn create(&self, payload: &NewEmployee) -> DbResult<Employee> {
        validate_new_employee(payload)?;

        let result = sqlx::query(
            r#"
            INSERT INTO employees
                (name, role, wage_type, wage_rate_cents, contact_number,
                 is_active, created_at, updated_at)
            VALUES (?1, ?2, ?3, ?4, ?5, 1, ?6, ?6)
            "#,
        )
        .bind(payload.name.trim())
        .bind(payload.role)
        .bind(payload.wage_type)
        .bind(payload.wage_rate_cents)
        .bind(&payload.contact_number)
        .bind(Local::now().naive_local())
        .execute(&self.pool)
        .await?;

        let employee = sqlx::query_as::<_, Employee>(&format!("{SELECT} WHERE id = ?1"))
            .bind(result.last_insert_rowid())
            .fetch_one(&self.pool)
            .await?;
        Ok(employee)
    }

    /// Updates an employee's fields.
    pub async fn update(&self, id: i64, payload: &NewEmployee) -> DbResult<Employee> {
        validate_new_employee(payload)?;

        let result = sqlx::query(
            r#"
            UPDATE employees
            SET name = ?2, role = ?3, wage_type = ?4, wage_rate_cents = ?5,
                contact_number = ?6, updated_at = ?7
            WHERE id = ?1 AND is_active = 1
            "#,
        )
        .bind(id)
        .bind(payload.name.trim())
        .bind(payload.role)
        .bind(payload.wage_type)
        .bind(payload.wage_rate_cents)
        .bind(&payload.contact_number)
        .bind(Local::now().naive_local())
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Employee", id));
        }

        let employee = sqlx::query_as::<_, Employee>(&format!("{SELECT} WHERE id = ?1"))
            .bind(id)
            .fetch_one(&self.pool)
            .await?;
        Ok(employee)
    }

    /// Soft-deletes an employee.
    pub async fn soft_delete(&self, id: i64) -> DbResult<()> {
        let result = sqlx::query(
            "UPDATE employees SET is_active = 0, updated_at = ?2 WHERE id = ?1 AND is_active = 1",
        )
        .bind(id)
        .bind(Local::now().naive_local())
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Employee", id));
        }
        Ok(())
    }

    /// Gets an active employee by ID.
    pub async fn get_by_id(&self, id: i64) -> DbResult<Option<Employee>> {
        let employee =
            sqlx::query_as::<_, Employee>(&format!("{SELECT} WHERE id = ?1 AND is_active = 1"))
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;
        Ok(employee)
    }

    /// Lists active employees, sorted by name.
    pub async fn list(&self) -> DbResult<Vec<Employee>> {
        let employees =
            sqlx::query_as::<_, Employee>(&format!("{SELECT} WHERE is_active = 1 ORDER BY name"))
                .fetch_all(&self.pool)
                .await?;
        Ok(employees)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};
    use kusina_core::{EmployeeRole, WageType};

    fn cashier() -> NewEmployee {
        NewEmployee {
            name: "Maria Santos".to_string(),
            role: EmployeeRole::Cashier,
            wage_type: WageType::Daily,
            wage_rate_cents: 61_000,
            contact_number: Some("0917-555-0101".to_string()),
        }
    }

    #[tokio::test]
    async fn test_crud_round_trip() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let repo = db.employees();

        let employee = repo.create(&cashier()).await.unwrap();
        assert_eq!(employee.role, EmployeeRole::Cashier);

        let mut payload = cashier();
        payload.wage_rate_cents = 65_000;
        let employee = repo.update(employee.id, &payload).await.unwrap();
        assert_eq!(employee.wage_rate_cents, 65_000);

        repo.soft_delete(employee.id).await.unwrap();
        assert!(repo.get_by_id(employee.id).await.unwrap().is_none());
        assert!(repo.list().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_negative_wage_rejected() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();

        let mut payload = cashier();
        payload.wage_rate_cents = -1;
        assert!(matches!(
            db.employees().create(&payload).await,
            Err(DbError::Validation(_))
        ));
    }
}
