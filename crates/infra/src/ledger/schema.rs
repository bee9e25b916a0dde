//! Table layout for the SQLite ledger.
//!
//! Every statement is `IF NOT EXISTS`, so applying the schema to a database
//! that already has the tables (including ones created by older builds without
//! the CHECK constraints) is a no-op.

use sqlx::SqlitePool;

use super::sqlite::map_sqlx_error;
use super::LedgerError;

const CREATE_PRODUCTS: &str = r#"
    CREATE TABLE IF NOT EXISTS products (
        id       INTEGER PRIMARY KEY AUTOINCREMENT,
        name     TEXT    NOT NULL,
        price    REAL    NOT NULL CHECK (price >= 0),
        quantity INTEGER NOT NULL CHECK (quantity >= 0)
    )
"#;

const CREATE_SALES: &str = r#"
    CREATE TABLE IF NOT EXISTS sales (
        id         INTEGER PRIMARY KEY AUTOINCREMENT,
        product_id INTEGER NOT NULL,
        quantity   INTEGER NOT NULL CHECK (quantity > 0),
        total      REAL    NOT NULL,
        FOREIGN KEY (product_id) REFERENCES products (id)
    )
"#;

const CREATE_PRODUCTS_NAME_INDEX: &str = r#"
    CREATE INDEX IF NOT EXISTS idx_products_name ON products (name)
"#;

const STATEMENTS: [(&str, &str); 3] = [
    ("create_products", CREATE_PRODUCTS),
    ("create_sales", CREATE_SALES),
    ("create_products_name_index", CREATE_PRODUCTS_NAME_INDEX),
];

/// Create any missing tables and indexes in one transaction.
pub(crate) async fn apply(pool: &SqlitePool) -> Result<(), LedgerError> {
    let mut tx = pool
        .begin()
        .await
        .map_err(|e| map_sqlx_error("begin_transaction", e))?;

    for (operation, statement) in STATEMENTS {
        sqlx::query(statement)
            .execute(&mut *tx)
            .await
            .map_err(|e| map_sqlx_error(operation, e))?;
    }

    tx.commit()
        .await
        .map_err(|e| map_sqlx_error("commit_transaction", e))?;

    Ok(())
}
