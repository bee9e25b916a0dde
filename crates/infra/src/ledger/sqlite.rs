//! SQLite-backed ledger implementation.
//!
//! ## Transactions
//!
//! `upsert_product` and `record_sale` each run inside one sqlx transaction. The
//! transaction is committed only after every write succeeded; any failure on the
//! way rolls it back explicitly, so a sale is never stored without its stock
//! decrement (or the other way round).
//!
//! ## Error Mapping
//!
//! | SQLx Error | LedgerError |
//! |------------|-------------|
//! | Database (unique / foreign key / check / not-null violation) | `InvalidArgument` |
//! | Database (other) | `Storage` |
//! | PoolClosed | `Storage` |
//! | Other (IO, protocol, decode, ...) | `Storage` |

use std::str::FromStr;

use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::{FromRow, Sqlite, SqlitePool, Transaction};
use tracing::{debug, info, instrument, warn};

use shopkeeper_core::{Entity, Price, ProductId, Quantity, SaleId};
use shopkeeper_products::{Product, UpsertOutcome, UpsertProduct};
use shopkeeper_sales::{RecordSale, Sale, SaleEntry};

use super::r#trait::{Ledger, LedgerError};
use super::schema;
use crate::config::LedgerConfig;

/// Ledger persisted in a SQLite database.
///
/// The handle owns a connection pool; clone it freely, every clone shares the
/// pool. Call [`SqliteLedger::close`] at shutdown to release the database.
#[derive(Debug, Clone)]
pub struct SqliteLedger {
    pool: SqlitePool,
}

#[derive(Debug, FromRow)]
struct ProductRow {
    id: i64,
    name: String,
    price: f64,
    quantity: i64,
}

impl From<ProductRow> for Product {
    fn from(row: ProductRow) -> Self {
        let price = stored_price(row.id, row.price);
        let quantity = stored_quantity("products", row.id, row.quantity);
        Product::new(ProductId::new(row.id), row.name, price, quantity)
    }
}

#[derive(Debug, FromRow)]
struct SaleEntryRow {
    id: i64,
    product_id: i64,
    quantity: i64,
    total: f64,
    product_name: String,
}

impl From<SaleEntryRow> for SaleEntry {
    fn from(row: SaleEntryRow) -> Self {
        let quantity = stored_quantity("sales", row.id, row.quantity);
        SaleEntry {
            sale: Sale::new(
                SaleId::new(row.id),
                ProductId::new(row.product_id),
                quantity,
                row.total,
            ),
            product_name: row.product_name,
        }
    }
}

// Tables created without CHECK constraints may hold negative numbers. Such
// values read as zero, so the row stays listable and the next restock
// overwrites it with a valid value.
fn stored_quantity(table: &'static str, row_id: i64, value: i64) -> Quantity {
    Quantity::new(value).unwrap_or_else(|_| {
        warn!(table, row_id, value, "negative stored quantity read as zero");
        Quantity::zero()
    })
}

fn stored_price(row_id: i64, value: f64) -> Price {
    Price::new(value).unwrap_or_else(|_| {
        warn!(row_id, value, "invalid stored price read as zero");
        Price::zero()
    })
}

impl SqliteLedger {
    /// Wrap an existing pool. Foreign keys must be enabled on its connections.
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Open (and create, if configured) the database described by `config`.
    ///
    /// Does not create tables; call `initialize()` for that.
    #[instrument(skip(config), fields(database_url = %config.database_url), err)]
    pub async fn connect(config: &LedgerConfig) -> Result<Self, LedgerError> {
        let options = SqliteConnectOptions::from_str(&config.database_url)
            .map_err(|e| map_sqlx_error("parse_database_url", e))?
            .create_if_missing(config.create_if_missing)
            .foreign_keys(true);

        let mut pool_options = SqlitePoolOptions::new().max_connections(config.max_connections.max(1));
        if config.is_in_memory() {
            // Each connection gets its own in-memory database, which lives only
            // as long as that connection.
            pool_options = pool_options
                .max_connections(1)
                .min_connections(1)
                .idle_timeout(None)
                .max_lifetime(None);
        }

        let pool = pool_options
            .connect_with(options)
            .await
            .map_err(|e| map_sqlx_error("connect", e))?;

        debug!("connected to ledger database");
        Ok(Self::new(pool))
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    #[instrument(skip(self), err)]
    pub async fn initialize(&self) -> Result<(), LedgerError> {
        schema::apply(&self.pool).await?;
        debug!("ledger schema ready");
        Ok(())
    }

    #[instrument(
        skip(self, cmd),
        fields(name = %cmd.name, price = cmd.price, quantity = cmd.quantity),
        err
    )]
    pub async fn upsert_product(&self, cmd: UpsertProduct) -> Result<UpsertOutcome, LedgerError> {
        let upsert = cmd.validate()?;

        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| map_sqlx_error("begin_transaction", e))?;

        let existing = sqlx::query_as::<_, ProductRow>(
            r#"
            SELECT id, name, price, quantity
            FROM products
            WHERE name = ?1
            ORDER BY id ASC
            LIMIT 1
            "#,
        )
        .bind(upsert.name())
        .fetch_optional(&mut *tx)
        .await
        .map_err(|e| map_sqlx_error("find_product_by_name", e))?;

        let outcome = match existing {
            Some(row) => {
                let current = Product::from(row);
                let restocked = match current.restock(&upsert) {
                    Ok(product) => product,
                    Err(err) => return rollback(tx, err.into()).await,
                };

                sqlx::query(
                    r#"
                    UPDATE products
                    SET price = ?1, quantity = ?2
                    WHERE id = ?3
                    "#,
                )
                .bind(restocked.price().get())
                .bind(restocked.quantity().get())
                .bind(current.id().get())
                .execute(&mut *tx)
                .await
                .map_err(|e| map_sqlx_error("update_product", e))?;

                UpsertOutcome::Restocked(restocked)
            }
            None => {
                let inserted = sqlx::query(
                    r#"
                    INSERT INTO products (name, price, quantity)
                    VALUES (?1, ?2, ?3)
                    "#,
                )
                .bind(upsert.name())
                .bind(upsert.price().get())
                .bind(upsert.quantity().get())
                .execute(&mut *tx)
                .await
                .map_err(|e| map_sqlx_error("insert_product", e))?;

                UpsertOutcome::Created(upsert.into_product(ProductId::new(inserted.last_insert_rowid())))
            }
        };

        tx.commit()
            .await
            .map_err(|e| map_sqlx_error("commit_transaction", e))?;

        let product = outcome.product();
        info!(
            product_id = %product.id(),
            created = outcome.is_created(),
            on_hand = product.quantity().get(),
            "product upserted"
        );
        Ok(outcome)
    }

    #[instrument(skip(self), err)]
    pub async fn list_products(&self) -> Result<Vec<Product>, LedgerError> {
        let rows = sqlx::query_as::<_, ProductRow>(
            r#"
            SELECT id, name, price, quantity
            FROM products
            ORDER BY id ASC
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("list_products", e))?;

        Ok(rows.into_iter().map(Product::from).collect())
    }

    #[instrument(skip(self), fields(product_id = %product_id), err)]
    pub async fn get_product(&self, product_id: ProductId) -> Result<Option<Product>, LedgerError> {
        let row = sqlx::query_as::<_, ProductRow>(
            r#"
            SELECT id, name, price, quantity
            FROM products
            WHERE id = ?1
            "#,
        )
        .bind(product_id.get())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("get_product", e))?;

        Ok(row.map(Product::from))
    }

    /// Record a sale and decrement stock in one transaction.
    ///
    /// The decrement is guarded (`quantity >= ?`) in SQL as well as checked by
    /// the domain quote, so a stale read can never drive stock negative.
    #[instrument(
        skip(self, cmd),
        fields(product_id = %cmd.product_id, quantity = cmd.quantity),
        err
    )]
    pub async fn record_sale(&self, cmd: RecordSale) -> Result<Sale, LedgerError> {
        cmd.validate()?;

        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| map_sqlx_error("begin_transaction", e))?;

        let row = sqlx::query_as::<_, ProductRow>(
            r#"
            SELECT id, name, price, quantity
            FROM products
            WHERE id = ?1
            "#,
        )
        .bind(cmd.product_id.get())
        .fetch_optional(&mut *tx)
        .await
        .map_err(|e| map_sqlx_error("load_product", e))?;

        let product = match row.map(Product::from) {
            Some(product) => product,
            None => {
                let err = LedgerError::NotFound {
                    product_id: cmd.product_id,
                };
                return rollback(tx, err).await;
            }
        };

        let quote = match cmd.quote(&product) {
            Ok(quote) => quote,
            Err(err) => {
                warn!(
                    on_hand = product.quantity().get(),
                    "sale rejected: {err}"
                );
                return rollback(tx, err.into()).await;
            }
        };

        let inserted = sqlx::query(
            r#"
            INSERT INTO sales (product_id, quantity, total)
            VALUES (?1, ?2, ?3)
            "#,
        )
        .bind(quote.product_id.get())
        .bind(quote.quantity.get())
        .bind(quote.total)
        .execute(&mut *tx)
        .await
        .map_err(|e| map_sqlx_error("insert_sale", e))?;

        let updated = sqlx::query(
            r#"
            UPDATE products
            SET quantity = quantity - ?1
            WHERE id = ?2 AND quantity >= ?1
            "#,
        )
        .bind(quote.quantity.get())
        .bind(quote.product_id.get())
        .execute(&mut *tx)
        .await
        .map_err(|e| map_sqlx_error("decrement_stock", e))?;

        if updated.rows_affected() != 1 {
            let err = LedgerError::InsufficientStock {
                product_id: quote.product_id,
                requested: quote.quantity.get(),
                available: product.quantity().get(),
            };
            return rollback(tx, err).await;
        }

        tx.commit()
            .await
            .map_err(|e| map_sqlx_error("commit_transaction", e))?;

        let remaining = quote.remaining.get();
        let sale = quote.into_sale(SaleId::new(inserted.last_insert_rowid()));
        info!(
            sale_id = %sale.id(),
            total = sale.total(),
            remaining,
            "sale recorded"
        );
        Ok(sale)
    }

    #[instrument(skip(self), err)]
    pub async fn list_sales(&self) -> Result<Vec<SaleEntry>, LedgerError> {
        let rows = sqlx::query_as::<_, SaleEntryRow>(
            r#"
            SELECT
                s.id,
                s.product_id,
                s.quantity,
                s.total,
                p.name AS product_name
            FROM sales s
            JOIN products p ON s.product_id = p.id
            ORDER BY s.id ASC
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("list_sales", e))?;

        Ok(rows.into_iter().map(SaleEntry::from).collect())
    }

    /// Close the pool, waiting for checked-out connections to return.
    pub async fn close(&self) {
        self.pool.close().await;
        debug!("ledger database closed");
    }
}

#[async_trait::async_trait]
impl Ledger for SqliteLedger {
    async fn initialize(&self) -> Result<(), LedgerError> {
        SqliteLedger::initialize(self).await
    }

    async fn upsert_product(&self, cmd: UpsertProduct) -> Result<UpsertOutcome, LedgerError> {
        SqliteLedger::upsert_product(self, cmd).await
    }

    async fn list_products(&self) -> Result<Vec<Product>, LedgerError> {
        SqliteLedger::list_products(self).await
    }

    async fn get_product(&self, product_id: ProductId) -> Result<Option<Product>, LedgerError> {
        SqliteLedger::get_product(self, product_id).await
    }

    async fn record_sale(&self, cmd: RecordSale) -> Result<Sale, LedgerError> {
        SqliteLedger::record_sale(self, cmd).await
    }

    async fn list_sales(&self) -> Result<Vec<SaleEntry>, LedgerError> {
        SqliteLedger::list_sales(self).await
    }

    async fn close(&self) {
        SqliteLedger::close(self).await
    }
}

/// Roll back `tx` and return `err` to the caller.
///
/// A failed rollback is logged; the original error is what the caller needs.
async fn rollback<T>(tx: Transaction<'_, Sqlite>, err: LedgerError) -> Result<T, LedgerError> {
    if let Err(rollback_err) = tx.rollback().await {
        warn!("rollback failed: {rollback_err}");
    }
    Err(err)
}

/// Map a sqlx error from `operation` onto the ledger taxonomy.
pub(crate) fn map_sqlx_error(operation: &str, err: sqlx::Error) -> LedgerError {
    match err {
        sqlx::Error::Database(db_err) => {
            let msg = format!("database error in {}: {}", operation, db_err.message());
            match db_err.kind() {
                sqlx::error::ErrorKind::UniqueViolation
                | sqlx::error::ErrorKind::ForeignKeyViolation
                | sqlx::error::ErrorKind::NotNullViolation
                | sqlx::error::ErrorKind::CheckViolation => LedgerError::InvalidArgument(msg),
                _ => LedgerError::Storage(msg),
            }
        }
        sqlx::Error::PoolClosed => {
            LedgerError::Storage(format!("connection pool closed in {}", operation))
        }
        _ => LedgerError::Storage(format!("sqlx error in {}: {}", operation, err)),
    }
}
