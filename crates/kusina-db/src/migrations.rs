//! # Migration Engine
//!
//! Applies the versioned schema changes from [`crate::schema`] exactly once
//! each, in ascending order, at process startup.
//!
//! ## How Migrations Work
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Migration Process                                  │
//! │                                                                         │
//! │  App Startup (Database::new)                                           │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  Validate migration set is contiguous (gap = fatal, nothing runs)      │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  Ensure schema_version table exists, read MAX(version)                 │
//! │       │                                                                 │
//! │       ├── v1 initial schema      ✓ (already applied)                   │
//! │       └── v2 employees/expenses  ⬜ (NEW - needs to run)                │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  For each pending migration, in one transaction:                       │
//! │       apply up script + insert schema_version row, then COMMIT         │
//! │       │                                                                 │
//! │       ├── on failure: ROLLBACK, run down script, abort startup         │
//! │       ▼                                                                 │
//! │  Repositories may now read and write                                   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Exclusive access is guaranteed by ordering, not locking: nothing else
//! holds the pool until [`run_migrations`] returns.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;
use tracing::{error, info};

use crate::error::{DbError, DbResult};
use crate::schema::{Migration, BASELINE_VERSION, MIGRATIONS, SCHEMA_VERSION_TABLE};

/// One applied-migration record, as stored in `schema_version`.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct SchemaVersionRow {
    pub version: i64,
    pub description: String,
    pub applied_at: NaiveDateTime,
}

/// Runs all pending migrations against the pool.
///
/// ## Guarantees
/// - The set is validated for contiguity BEFORE any migration runs
/// - Each migration applies atomically (DDL + version row, one transaction)
/// - Idempotent: running the full set twice leaves schema and
///   `schema_version` rows identical to running it once
/// - On failure the migration's down script is executed and the error is
///   returned; the application must treat this as fatal
pub async fn run_migrations(pool: &SqlitePool) -> DbResult<()> {
    validate_contiguity(MIGRATIONS)?;

    sqlx::raw_sql(SCHEMA_VERSION_TABLE).execute(pool).await?;

    let current = current_version(pool).await?;
    info!(current, "Checking for pending migrations");

    for migration in MIGRATIONS.iter().filter(|m| m.version > current) {
        apply_one(pool, migration).await?;
    }

    info!("All migrations applied");
    Ok(())
}

/// Returns the highest applied schema version, or 0 when none is applied.
pub async fn current_version(pool: &SqlitePool) -> DbResult<i64> {
    let version: Option<i64> = sqlx::query_scalar("SELECT MAX(version) FROM schema_version")
        .fetch_one(pool)
        .await?;
    Ok(version.unwrap_or(0))
}

/// Returns every applied migration row, ascending. For diagnostics.
pub async fn applied_versions(pool: &SqlitePool) -> DbResult<Vec<SchemaVersionRow>> {
    let rows = sqlx::query_as::<_, SchemaVersionRow>(
        "SELECT version, description, applied_at FROM schema_version ORDER BY version",
    )
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

/// Rejects migration sets with missing version numbers.
///
/// A gap means a configuration error (a migration file was lost or
/// mis-numbered); running the remainder would leave the schema in a state no
/// version ever described. Detected before anything touches the database.
fn validate_contiguity(migrations: &[Migration]) -> DbResult<()> {
    if migrations.is_empty() {
        return Err(DbError::MigrationFailed(
            "migration set is empty".to_string(),
        ));
    }

    if migrations[0].version != BASELINE_VERSION {
        return Err(DbError::MigrationFailed(format!(
            "migration set must start at version {}, found {}",
            BASELINE_VERSION, migrations[0].version
        )));
    }

    for pair in migrations.windows(2) {
        if pair[1].version != pair[0].version + 1 {
            return Err(DbError::MigrationFailed(format!(
                "gap in migration versions: {} is followed by {}",
                pair[0].version, pair[1].version
            )));
        }
    }

    Ok(())
}

/// Applies a single migration atomically, rolling back on failure.
async fn apply_one(pool: &SqlitePool, migration: &Migration) -> DbResult<()> {
    info!(
        version = migration.version,
        description = migration.description,
        "Applying migration"
    );

    let result: Result<(), sqlx::Error> = async {
        let mut tx = pool.begin().await?;

        sqlx::raw_sql(migration.up).execute(&mut *tx).await?;

        sqlx::query("INSERT INTO schema_version (version, description) VALUES (?1, ?2)")
            .bind(migration.version)
            .bind(migration.description)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(())
    }
    .await;

    if let Err(apply_err) = result {
        error!(
            version = migration.version,
            error = %apply_err,
            "Migration failed, running down script"
        );

        // The transaction already rolled back; the down script clears any
        // residue DDL that escaped it. Down scripts are guarded, so this is
        // safe even when nothing was applied.
        if let Err(down_err) = sqlx::raw_sql(migration.down).execute(pool).await {
            error!(
                version = migration.version,
                error = %down_err,
                "Down script failed"
            );
        }

        return Err(DbError::MigrationFailed(format!(
            "version {}: {}",
            migration.version, apply_err
        )));
    }

    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use sqlx::sqlite::SqlitePoolOptions;

    async fn bare_pool() -> SqlitePool {
        SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_migrations_apply_from_scratch() {
        let pool = bare_pool().await;
        run_migrations(&pool).await.unwrap();

        let version = current_version(&pool).await.unwrap();
        assert_eq!(version, MIGRATIONS.last().unwrap().version);

        // Every schema table exists.
        for table in [
            "ingredients",
            "inventory_transactions",
            "recipes",
            "recipe_items",
            "products",
            "sales",
            "sale_items",
            "schema_version",
            "employees",
            "expenses",
        ] {
            let count: i64 = sqlx::query_scalar(
                "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name = ?1",
            )
            .bind(table)
            .fetch_one(&pool)
            .await
            .unwrap();
            assert_eq!(count, 1, "missing table {table}");
        }
    }

    #[tokio::test]
    async fn test_migrations_are_idempotent() {
        let pool = bare_pool().await;
        run_migrations(&pool).await.unwrap();
        run_migrations(&pool).await.unwrap();

        let rows = applied_versions(&pool).await.unwrap();
        assert_eq!(rows.len(), MIGRATIONS.len());
        for (row, migration) in rows.iter().zip(MIGRATIONS) {
            assert_eq!(row.version, migration.version);
            assert_eq!(row.description, migration.description);
        }
    }

    #[tokio::test]
    async fn test_gap_detected_before_anything_runs() {
        let gapped = [
            Migration {
                version: 1,
                description: "one",
                up: "CREATE TABLE IF NOT EXISTS t1 (id INTEGER PRIMARY KEY);",
                down: "DROP TABLE IF EXISTS t1;",
            },
            Migration {
                version: 3,
                description: "three",
                up: "CREATE TABLE IF NOT EXISTS t3 (id INTEGER PRIMARY KEY);",
                down: "DROP TABLE IF EXISTS t3;",
            },
        ];
        let err = validate_contiguity(&gapped).unwrap_err();
        assert!(matches!(err, DbError::MigrationFailed(_)));
    }

    #[tokio::test]
    async fn test_failed_migration_runs_down_and_aborts() {
        let pool = bare_pool().await;
        sqlx::raw_sql(SCHEMA_VERSION_TABLE)
            .execute(&pool)
            .await
            .unwrap();

        let broken = Migration {
            version: 1,
            description: "broken",
            up: "CREATE TABLE IF NOT EXISTS half (id INTEGER PRIMARY KEY); SELECT * FROM no_such_table;",
            down: "DROP TABLE IF EXISTS half;",
        };

        let err = apply_one(&pool, &broken).await.unwrap_err();
        assert!(matches!(err, DbError::MigrationFailed(_)));

        // No version row, and the down script removed the partial table.
        let version = current_version(&pool).await.unwrap();
        assert_eq!(version, 0);
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name = 'half'",
        )
        .fetch_one(&pool)
        .await
        .unwrap();
        assert_eq!(count, 0);
    }
}
