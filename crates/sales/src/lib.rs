//! Sales domain module.
//!
//! Business rules for recording a sale against on-hand stock, implemented as
//! deterministic domain logic (no IO, no storage).

pub mod sale;

pub use sale::{RecordSale, Sale, SaleEntry, SaleQuote};
