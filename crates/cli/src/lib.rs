//! `shopkeeper-cli`
//!
//! **Responsibility:** the operator-facing surface of the ledger.
//!
//! Raw text (arguments or menu answers) is parsed into a typed [`Command`],
//! executed against a [`shopkeeper_infra::Ledger`], and the typed [`Outcome`]
//! is rendered as a table or JSON. No business rules live here.

pub mod args;
pub mod command;
pub mod menu;
pub mod render;

pub use args::{Cli, CliCommand};
pub use command::{Command, Outcome};
pub use menu::Menu;
pub use render::OutputFormat;
