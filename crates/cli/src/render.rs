//! Human-readable and JSON rendering of command outcomes.

use std::fmt::Write as _;

use clap::ValueEnum;
use serde_json::json;

use shopkeeper_core::Entity;
use shopkeeper_infra::LedgerError;
use shopkeeper_products::{Product, UpsertOutcome};
use shopkeeper_sales::SaleEntry;

use crate::command::Outcome;

const RULE: &str = "----------------------------------------";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

pub fn render(outcome: &Outcome, format: OutputFormat) -> Result<String, serde_json::Error> {
    match format {
        OutputFormat::Text => Ok(render_text(outcome)),
        OutputFormat::Json => render_json(outcome),
    }
}

fn render_text(outcome: &Outcome) -> String {
    match outcome {
        Outcome::Upserted(upsert) => upsert_message(upsert),
        Outcome::Products(products) => products_table(products),
        Outcome::SaleRecorded { sale, product } => {
            let mut out = format!(
                "Sale {} recorded: {} unit(s), total {:.2}.",
                sale.id(),
                sale.quantity(),
                sale.total()
            );
            if let Some(product) = product {
                let _ = write!(out, " {} left of {}.", product.quantity(), product.name());
            }
            out
        }
        Outcome::Sales(entries) => sales_table(entries),
    }
}

fn render_json(outcome: &Outcome) -> Result<String, serde_json::Error> {
    let value = match outcome {
        Outcome::Upserted(upsert) => serde_json::to_value(upsert)?,
        Outcome::Products(products) => serde_json::to_value(products)?,
        Outcome::SaleRecorded { sale, product } => json!({ "sale": sale, "product": product }),
        Outcome::Sales(entries) => serde_json::to_value(entries)?,
    };
    serde_json::to_string_pretty(&value)
}

pub fn upsert_message(outcome: &UpsertOutcome) -> String {
    match outcome {
        UpsertOutcome::Created(p) => format!("Added new product: {}", p.name()),
        UpsertOutcome::Restocked(p) => {
            format!("Updated {}: new quantity = {}", p.name(), p.quantity())
        }
    }
}

pub fn products_table(products: &[Product]) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "ID | Name            | Price | Quantity");
    let _ = writeln!(out, "{RULE}");
    for p in products {
        let line = format!(
            "{:<2} | {:<15} | {:<5} | {:<8}",
            p.id(),
            p.name(),
            p.price().to_string(),
            p.quantity()
        );
        let _ = writeln!(out, "{}", line.trim_end());
    }
    out
}

pub fn sales_table(entries: &[SaleEntry]) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "ID | Product Name    | Quantity | Total");
    let _ = writeln!(out, "{RULE}");
    for e in entries {
        let line = format!(
            "{:<2} | {:<15} | {:<8} | {:<5.2}",
            e.sale.id(),
            e.product_name,
            e.sale.quantity(),
            e.sale.total()
        );
        let _ = writeln!(out, "{}", line.trim_end());
    }
    out
}

/// Operator-facing message for a recoverable ledger error.
pub fn error_message(err: &LedgerError) -> String {
    match err {
        LedgerError::NotFound { .. } => "Product not found.".to_string(),
        LedgerError::InsufficientStock { available, .. } => {
            format!("Not enough stock (available: {available}).")
        }
        LedgerError::InvalidArgument(msg) => format!("Invalid input: {msg}."),
        LedgerError::Storage(msg) => format!("Storage failure: {msg}."),
    }
}
