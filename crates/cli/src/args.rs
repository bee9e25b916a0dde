//! Command-line arguments.

use clap::{Parser, Subcommand, ValueEnum};

use shopkeeper_core::ProductId;
use shopkeeper_observability::LogFormat;
use shopkeeper_products::UpsertProduct;
use shopkeeper_sales::RecordSale;

use crate::command::Command;
use crate::render::OutputFormat;

#[derive(Parser, Debug)]
#[command(name = "shopkeeper", version, about = "Inventory and sales ledger")]
pub struct Cli {
    /// SQLite database URL or path (overrides SHOPKEEPER_DATABASE_URL)
    #[arg(long, global = true)]
    pub database: Option<String>,

    /// Output format for one-shot commands
    #[arg(long, value_enum, default_value_t = OutputFormat::Text, global = true)]
    pub format: OutputFormat,

    /// Log line format (logs go to stderr; level via RUST_LOG)
    #[arg(long, value_enum, default_value_t = LogFormatArg::Text, global = true)]
    pub log_format: LogFormatArg,

    /// Runs the interactive menu when omitted
    #[command(subcommand)]
    pub command: Option<CliCommand>,
}

#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum CliCommand {
    /// Add a product, or restock it if the name already exists
    AddProduct {
        name: String,
        #[arg(allow_negative_numbers = true)]
        price: f64,
        /// Units to add to what is on hand
        #[arg(allow_negative_numbers = true)]
        quantity: i64,
    },
    /// List products
    Products,
    /// Record a sale
    Sell {
        product_id: i64,
        #[arg(allow_negative_numbers = true)]
        quantity: i64,
    },
    /// List sales
    Sales,
    /// Interactive menu
    Menu,
}

impl CliCommand {
    /// The ledger command to run, or `None` for the interactive menu.
    pub fn into_command(self) -> Option<Command> {
        match self {
            CliCommand::AddProduct {
                name,
                price,
                quantity,
            } => Some(Command::AddProduct(UpsertProduct::new(name, price, quantity))),
            CliCommand::Products => Some(Command::ListProducts),
            CliCommand::Sell {
                product_id,
                quantity,
            } => Some(Command::MakeSale(RecordSale::new(ProductId::new(product_id), quantity))),
            CliCommand::Sales => Some(Command::ListSales),
            CliCommand::Menu => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogFormatArg {
    Text,
    Json,
}

impl From<LogFormatArg> for LogFormat {
    fn from(value: LogFormatArg) -> Self {
        match value {
            LogFormatArg::Text => LogFormat::Text,
            LogFormatArg::Json => LogFormat::Json,
        }
    }
}
