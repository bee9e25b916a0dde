use std::sync::RwLock;

use tracing::info;

use shopkeeper_core::{Entity, ProductId, SaleId};
use shopkeeper_products::{Product, UpsertOutcome, UpsertProduct};
use shopkeeper_sales::{RecordSale, Sale, SaleEntry};

use super::r#trait::{Ledger, LedgerError};

#[derive(Debug, Default)]
struct State {
    products: Vec<Product>,
    sales: Vec<Sale>,
}

impl State {
    // Rows are never deleted, so the next id is always len + 1.
    fn next_product_id(&self) -> ProductId {
        ProductId::new(self.products.len() as i64 + 1)
    }

    fn next_sale_id(&self) -> SaleId {
        SaleId::new(self.sales.len() as i64 + 1)
    }

    fn product_index(&self, product_id: ProductId) -> Option<usize> {
        self.products.iter().position(|p| p.id() == product_id)
    }
}

/// In-memory ledger.
///
/// Intended for tests/dev. Every operation holds the lock for its whole
/// duration and only mutates state after all checks passed, which gives the
/// same all-or-nothing behavior as the SQLite transactions.
#[derive(Debug, Default)]
pub struct InMemoryLedger {
    state: RwLock<State>,
}

impl InMemoryLedger {
    pub fn new() -> Self {
        Self::default()
    }
}

fn poisoned() -> LedgerError {
    LedgerError::storage("lock poisoned")
}

#[async_trait::async_trait]
impl Ledger for InMemoryLedger {
    async fn initialize(&self) -> Result<(), LedgerError> {
        Ok(())
    }

    async fn upsert_product(&self, cmd: UpsertProduct) -> Result<UpsertOutcome, LedgerError> {
        let upsert = cmd.validate()?;
        let mut state = self.state.write().map_err(|_| poisoned())?;

        let existing = state.products.iter().position(|p| p.name() == upsert.name());
        let outcome = match existing {
            Some(idx) => {
                let restocked = state.products[idx].restock(&upsert)?;
                state.products[idx] = restocked.clone();
                UpsertOutcome::Restocked(restocked)
            }
            None => {
                let product = upsert.into_product(state.next_product_id());
                state.products.push(product.clone());
                UpsertOutcome::Created(product)
            }
        };

        info!(
            product_id = %outcome.product().id(),
            created = outcome.is_created(),
            "product upserted"
        );
        Ok(outcome)
    }

    async fn list_products(&self) -> Result<Vec<Product>, LedgerError> {
        let state = self.state.read().map_err(|_| poisoned())?;
        Ok(state.products.clone())
    }

    async fn get_product(&self, product_id: ProductId) -> Result<Option<Product>, LedgerError> {
        let state = self.state.read().map_err(|_| poisoned())?;
        Ok(state.product_index(product_id).map(|idx| state.products[idx].clone()))
    }

    async fn record_sale(&self, cmd: RecordSale) -> Result<Sale, LedgerError> {
        cmd.validate()?;
        let mut state = self.state.write().map_err(|_| poisoned())?;

        let idx = state
            .product_index(cmd.product_id)
            .ok_or(LedgerError::NotFound {
                product_id: cmd.product_id,
            })?;

        let quote = cmd.quote(&state.products[idx])?;
        let after = state.products[idx].take_stock(quote.quantity)?;

        let sale = quote.into_sale(state.next_sale_id());
        state.products[idx] = after;
        state.sales.push(sale.clone());

        info!(sale_id = %sale.id(), total = sale.total(), "sale recorded");
        Ok(sale)
    }

    async fn list_sales(&self) -> Result<Vec<SaleEntry>, LedgerError> {
        let state = self.state.read().map_err(|_| poisoned())?;

        state
            .sales
            .iter()
            .map(|sale| {
                let idx = state.product_index(sale.product_id()).ok_or_else(|| {
                    LedgerError::storage(format!(
                        "sale {} references missing product {}",
                        sale.id(),
                        sale.product_id()
                    ))
                })?;
                Ok(SaleEntry {
                    sale: sale.clone(),
                    product_name: state.products[idx].name().to_string(),
                })
            })
            .collect()
    }
}
