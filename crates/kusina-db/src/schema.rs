//! # Schema Store
//!
//! Canonical table definitions for Kusina POS, expressed as an ordered list
//! of versioned migration descriptors.
//!
//! ## Rules
//!
//! 1. **NEVER** modify an existing migration - always add a new version
//! 2. Versions are contiguous starting at [`BASELINE_VERSION`]; the engine
//!    refuses to run if a version is missing
//! 3. All DDL is idempotent (`IF NOT EXISTS` / `IF EXISTS` guards) so a
//!    migration that partially succeeded can be retried without erroring
//! 4. Every `up` has a matching `down` that restores the prior schema
//!
//! ## Conventions
//!
//! Every business table carries an INTEGER AUTOINCREMENT primary key,
//! `created_at`/`updated_at` local-time timestamps, and an `is_active`
//! soft-delete flag (default 1). Ledger rows and sale line items are
//! immutable and omit what they cannot use. Money columns are integer
//! centavos (`*_cents`); quantities are REAL.

/// One versioned schema change.
///
/// `up` applies the change, `down` reverses it. Both may contain multiple
/// statements separated by semicolons.
#[derive(Debug, Clone, Copy)]
pub struct Migration {
    /// Monotonically increasing, contiguous from [`BASELINE_VERSION`].
    pub version: i64,
    /// Human-readable summary recorded in `schema_version`.
    pub description: &'static str,
    /// Forward DDL, idempotent.
    pub up: &'static str,
    /// Reverse DDL, idempotent.
    pub down: &'static str,
}

/// First schema version. The migration set must start here.
pub const BASELINE_VERSION: i64 = 1;

/// Bootstrap DDL for the version marker table itself.
///
/// Applied outside the migration list: the engine needs it to exist before
/// it can ask what is applied. One row per applied migration, append-only.
pub const SCHEMA_VERSION_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS schema_version (
    version     INTEGER PRIMARY KEY,
    description TEXT NOT NULL,
    applied_at  TEXT NOT NULL DEFAULT (datetime('now', 'localtime'))
);
"#;

/// The full ordered migration set.
pub static MIGRATIONS: &[Migration] = &[
    Migration {
        version: 1,
        description: "initial schema: ingredients, inventory ledger, recipes, products, sales",
        up: r#"
CREATE TABLE IF NOT EXISTS ingredients (
    id                   INTEGER PRIMARY KEY AUTOINCREMENT,
    name                 TEXT NOT NULL,
    cost_per_unit_cents  INTEGER NOT NULL DEFAULT 0,
    unit_type            TEXT NOT NULL,
    quantity_in_stock    REAL NOT NULL DEFAULT 0,
    low_stock_threshold  REAL NOT NULL DEFAULT 0,
    supplier             TEXT,
    expiration_date      TEXT,
    is_active            INTEGER NOT NULL DEFAULT 1,
    created_at           TEXT NOT NULL DEFAULT (datetime('now', 'localtime')),
    updated_at           TEXT NOT NULL DEFAULT (datetime('now', 'localtime'))
);

CREATE TABLE IF NOT EXISTS inventory_transactions (
    id               INTEGER PRIMARY KEY AUTOINCREMENT,
    ingredient_id    INTEGER NOT NULL REFERENCES ingredients(id),
    transaction_type TEXT NOT NULL
        CHECK (transaction_type IN ('stock_in', 'stock_out', 'adjustment', 'sale')),
    quantity         REAL NOT NULL,
    unit_cost_cents  INTEGER,
    reference_id     INTEGER,
    created_at       TEXT NOT NULL DEFAULT (datetime('now', 'localtime'))
);

CREATE INDEX IF NOT EXISTS idx_inventory_transactions_ingredient
    ON inventory_transactions(ingredient_id);

CREATE TABLE IF NOT EXISTS recipes (
    id                     INTEGER PRIMARY KEY AUTOINCREMENT,
    name                   TEXT NOT NULL,
    servings               INTEGER NOT NULL CHECK (servings >= 1),
    total_cost_cents       INTEGER NOT NULL DEFAULT 0,
    cost_per_serving_cents INTEGER NOT NULL DEFAULT 0,
    is_active              INTEGER NOT NULL DEFAULT 1,
    created_at             TEXT NOT NULL DEFAULT (datetime('now', 'localtime')),
    updated_at             TEXT NOT NULL DEFAULT (datetime('now', 'localtime'))
);

CREATE TABLE IF NOT EXISTS recipe_items (
    id            INTEGER PRIMARY KEY AUTOINCREMENT,
    recipe_id     INTEGER NOT NULL REFERENCES recipes(id),
    ingredient_id INTEGER NOT NULL REFERENCES ingredients(id),
    quantity      REAL NOT NULL,
    unit_type     TEXT NOT NULL,
    is_active     INTEGER NOT NULL DEFAULT 1,
    created_at    TEXT NOT NULL DEFAULT (datetime('now', 'localtime')),
    updated_at    TEXT NOT NULL DEFAULT (datetime('now', 'localtime'))
);

CREATE INDEX IF NOT EXISTS idx_recipe_items_recipe ON recipe_items(recipe_id);
CREATE INDEX IF NOT EXISTS idx_recipe_items_ingredient ON recipe_items(ingredient_id);

CREATE TABLE IF NOT EXISTS products (
    id                   INTEGER PRIMARY KEY AUTOINCREMENT,
    name                 TEXT NOT NULL,
    category             TEXT NOT NULL
        CHECK (category IN ('food', 'beverage', 'dessert', 'snack', 'other')),
    selling_price_cents  INTEGER NOT NULL DEFAULT 0,
    recipe_id            INTEGER REFERENCES recipes(id),
    is_inventory_tracked INTEGER NOT NULL DEFAULT 1,
    is_active            INTEGER NOT NULL DEFAULT 1,
    created_at           TEXT NOT NULL DEFAULT (datetime('now', 'localtime')),
    updated_at           TEXT NOT NULL DEFAULT (datetime('now', 'localtime'))
);

CREATE TABLE IF NOT EXISTS sales (
    id                    INTEGER PRIMARY KEY AUTOINCREMENT,
    subtotal_cents        INTEGER NOT NULL DEFAULT 0,
    discount_amount_cents INTEGER NOT NULL DEFAULT 0,
    discount_percent      REAL NOT NULL DEFAULT 0,
    total_cents           INTEGER NOT NULL DEFAULT 0,
    payment_method        TEXT NOT NULL
        CHECK (payment_method IN ('cash', 'gcash', 'maya', 'card', 'other')),
    amount_received_cents INTEGER NOT NULL DEFAULT 0,
    change_cents          INTEGER NOT NULL DEFAULT 0,
    is_active             INTEGER NOT NULL DEFAULT 1,
    created_at            TEXT NOT NULL DEFAULT (datetime('now', 'localtime')),
    updated_at            TEXT NOT NULL DEFAULT (datetime('now', 'localtime'))
);

CREATE INDEX IF NOT EXISTS idx_sales_created_at ON sales(created_at);

CREATE TABLE IF NOT EXISTS sale_items (
    id               INTEGER PRIMARY KEY AUTOINCREMENT,
    sale_id          INTEGER NOT NULL REFERENCES sales(id),
    product_id       INTEGER NOT NULL REFERENCES products(id),
    quantity         INTEGER NOT NULL,
    unit_price_cents INTEGER NOT NULL,
    subtotal_cents   INTEGER NOT NULL,
    created_at       TEXT NOT NULL DEFAULT (datetime('now', 'localtime'))
);

CREATE INDEX IF NOT EXISTS idx_sale_items_sale ON sale_items(sale_id);
CREATE INDEX IF NOT EXISTS idx_sale_items_product ON sale_items(product_id);
"#,
        down: r#"
DROP INDEX IF EXISTS idx_sale_items_product;
DROP INDEX IF EXISTS idx_sale_items_sale;
DROP TABLE IF EXISTS sale_items;
DROP INDEX IF EXISTS idx_sales_created_at;
DROP TABLE IF EXISTS sales;
DROP TABLE IF EXISTS products;
DROP INDEX IF EXISTS idx_recipe_items_ingredient;
DROP INDEX IF EXISTS idx_recipe_items_recipe;
DROP TABLE IF EXISTS recipe_items;
DROP TABLE IF EXISTS recipes;
DROP INDEX IF EXISTS idx_inventory_transactions_ingredient;
DROP TABLE IF EXISTS inventory_transactions;
DROP TABLE IF EXISTS ingredients;
"#,
    },
    Migration {
        version: 2,
        description: "add employees and expenses tables",
        up: r#"
CREATE TABLE IF NOT EXISTS employees (
    id              INTEGER PRIMARY KEY AUTOINCREMENT,
    name            TEXT NOT NULL,
    role            TEXT NOT NULL CHECK (role IN ('owner', 'cashier', 'staff')),
    wage_type       TEXT NOT NULL CHECK (wage_type IN ('hourly', 'daily', 'monthly')),
    wage_rate_cents INTEGER NOT NULL DEFAULT 0,
    contact_number  TEXT,
    is_active       INTEGER NOT NULL DEFAULT 1,
    created_at      TEXT NOT NULL DEFAULT (datetime('now', 'localtime')),
    updated_at      TEXT NOT NULL DEFAULT (datetime('now', 'localtime'))
);

CREATE TABLE IF NOT EXISTS expenses (
    id              INTEGER PRIMARY KEY AUTOINCREMENT,
    description     TEXT NOT NULL,
    category        TEXT NOT NULL
        CHECK (category IN ('rent', 'utilities', 'supplies', 'labor', 'other')),
    amount_cents    INTEGER NOT NULL DEFAULT 0,
    recurrence_type TEXT CHECK (recurrence_type IN ('daily', 'monthly')),
    expense_date    TEXT NOT NULL,
    is_active       INTEGER NOT NULL DEFAULT 1,
    created_at      TEXT NOT NULL DEFAULT (datetime('now', 'localtime')),
    updated_at      TEXT NOT NULL DEFAULT (datetime('now', 'localtime'))
);

CREATE INDEX IF NOT EXISTS idx_expenses_date ON expenses(expense_date);
"#,
        down: r#"
DROP INDEX IF EXISTS idx_expenses_date;
DROP TABLE IF EXISTS expenses;
DROP TABLE IF EXISTS employees;
"#,
    },
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_migrations_start_at_baseline() {
        assert_eq!(MIGRATIONS[0].version, BASELINE_VERSION);
    }

    #[test]
    fn test_migrations_are_contiguous() {
        for pair in MIGRATIONS.windows(2) {
            assert_eq!(pair[1].version, pair[0].version + 1);
        }
    }

    #[test]
    fn test_every_migration_has_a_down() {
        for migration in MIGRATIONS {
            assert!(!migration.down.trim().is_empty(), "v{}", migration.version);
        }
    }
}
