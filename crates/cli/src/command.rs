//! Typed commands dispatched onto the ledger.

use tracing::warn;

use shopkeeper_core::Entity;
use shopkeeper_infra::{Ledger, LedgerError};
use shopkeeper_products::{Product, UpsertOutcome, UpsertProduct};
use shopkeeper_sales::{RecordSale, Sale, SaleEntry};

/// One operator request.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    AddProduct(UpsertProduct),
    ListProducts,
    MakeSale(RecordSale),
    ListSales,
}

/// Typed result of a [`Command`], ready for rendering.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    Upserted(UpsertOutcome),
    Products(Vec<Product>),
    SaleRecorded {
        sale: Sale,
        /// The product after the sale, if it could be reloaded.
        product: Option<Product>,
    },
    Sales(Vec<SaleEntry>),
}

impl Command {
    pub async fn execute(self, ledger: &dyn Ledger) -> Result<Outcome, LedgerError> {
        match self {
            Command::AddProduct(cmd) => ledger.upsert_product(cmd).await.map(Outcome::Upserted),
            Command::ListProducts => ledger.list_products().await.map(Outcome::Products),
            Command::MakeSale(cmd) => {
                let sale = ledger.record_sale(cmd).await?;
                // The sale is committed at this point; a failed reload only
                // loses the remaining-stock line.
                let product = match ledger.get_product(sale.product_id()).await {
                    Ok(product) => product,
                    Err(err) => {
                        warn!(sale_id = %sale.id(), error = %err, "could not reload product after sale");
                        None
                    }
                };
                Ok(Outcome::SaleRecorded { sale, product })
            }
            Command::ListSales => ledger.list_sales().await.map(Outcome::Sales),
        }
    }
}
