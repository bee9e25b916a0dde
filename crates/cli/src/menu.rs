//! Interactive numbered menu over any line-oriented input.

use std::io::{BufRead, Write};
use std::str::FromStr;

use anyhow::Context;

use shopkeeper_core::ProductId;
use shopkeeper_infra::Ledger;
use shopkeeper_products::UpsertProduct;
use shopkeeper_sales::RecordSale;

use crate::command::{Command, Outcome};
use crate::render::{error_message, products_table, sales_table, upsert_message};

const MENU: &str = "\nShopkeeper Application
1. Add Product
2. View Products
3. Make Sale
4. View Sales
5. Exit";

pub struct Menu<R, W> {
    input: R,
    output: W,
}

impl<R: BufRead, W: Write> Menu<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }

    pub fn into_output(self) -> W {
        self.output
    }

    /// Runs until the operator picks Exit or input ends.
    ///
    /// Recoverable ledger errors are printed and the loop continues; storage
    /// and I/O failures end the session with an error.
    pub async fn run(&mut self, ledger: &dyn Ledger) -> anyhow::Result<()> {
        loop {
            writeln!(self.output, "{MENU}")?;
            let Some(choice) = self.prompt("Enter your choice: ")? else {
                break;
            };

            let command = match choice.trim() {
                "1" => match self.read_add_product()? {
                    Some(command) => command,
                    None => break,
                },
                "2" => Command::ListProducts,
                "3" => match self.read_sale()? {
                    Some(command) => command,
                    None => break,
                },
                "4" => Command::ListSales,
                "5" => break,
                _ => {
                    writeln!(self.output, "Invalid choice. Please select a valid option.")?;
                    continue;
                }
            };

            self.dispatch(command, ledger).await?;
        }

        writeln!(self.output, "Exiting the application.")?;
        self.output.flush()?;
        Ok(())
    }

    async fn dispatch(&mut self, command: Command, ledger: &dyn Ledger) -> anyhow::Result<()> {
        match command.execute(ledger).await {
            Ok(outcome) => self.show(&outcome)?,
            Err(err) if err.is_recoverable() => {
                tracing::debug!(error = %err, "menu command rejected");
                writeln!(self.output, "{}", error_message(&err))?;
            }
            Err(err) => return Err(err).context("ledger operation failed"),
        }
        Ok(())
    }

    fn show(&mut self, outcome: &Outcome) -> std::io::Result<()> {
        match outcome {
            Outcome::Upserted(upsert) => {
                writeln!(self.output, "{}", upsert_message(upsert))?;
                writeln!(self.output, "Product added successfully.")
            }
            Outcome::Products(products) => {
                writeln!(self.output, "Current Products:")?;
                write!(self.output, "{}", products_table(products))
            }
            Outcome::SaleRecorded { .. } => writeln!(self.output, "Sale recorded successfully."),
            Outcome::Sales(entries) => {
                writeln!(self.output, "Sales Made:")?;
                write!(self.output, "{}", sales_table(entries))
            }
        }
    }

    fn read_add_product(&mut self) -> std::io::Result<Option<Command>> {
        let Some(name) = self.prompt("Enter product name: ")? else {
            return Ok(None);
        };
        let Some(price) = self.read_number::<f64>("Enter product price: ")? else {
            return Ok(None);
        };
        let Some(quantity) = self.read_number::<i64>("Enter product quantity: ")? else {
            return Ok(None);
        };
        Ok(Some(Command::AddProduct(UpsertProduct::new(name, price, quantity))))
    }

    fn read_sale(&mut self) -> std::io::Result<Option<Command>> {
        let Some(product_id) = self.read_number::<ProductId>("Enter product ID: ")? else {
            return Ok(None);
        };
        let Some(quantity) = self.read_number::<i64>("Enter quantity sold: ")? else {
            return Ok(None);
        };
        Ok(Some(Command::MakeSale(RecordSale::new(product_id, quantity))))
    }

    /// Re-prompts until the line parses. `None` at end of input.
    fn read_number<T: FromStr>(&mut self, prompt: &str) -> std::io::Result<Option<T>> {
        loop {
            let Some(line) = self.prompt(prompt)? else {
                return Ok(None);
            };
            match line.trim().parse::<T>() {
                Ok(value) => return Ok(Some(value)),
                Err(_) => writeln!(self.output, "Please enter a valid number.")?,
            }
        }
    }

    /// Line without its terminator. `None` at end of input.
    fn prompt(&mut self, prompt: &str) -> std::io::Result<Option<String>> {
        write!(self.output, "{prompt}")?;
        self.output.flush()?;

        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Ok(None);
        }
        let trimmed = line.trim_end_matches(['\n', '\r']).len();
        line.truncate(trimmed);
        Ok(Some(line))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shopkeeper_infra::InMemoryLedger;

    async fn session(ledger: &InMemoryLedger, input: &str) -> String {
        let mut menu = Menu::new(input.as_bytes(), Vec::new());
        menu.run(ledger).await.unwrap();
        String::from_utf8(menu.into_output()).unwrap()
    }

    #[tokio::test]
    async fn add_sell_and_list() {
        let ledger = InMemoryLedger::new();
        let out = session(&ledger, "1\nWidget\n5.00\n10\n3\n1\n4\n2\n4\n5\n").await;

        assert!(out.contains("Added new product: Widget"));
        assert!(out.contains("Product added successfully."));
        assert!(out.contains("Sale recorded successfully."));
        assert!(out.contains("Current Products:"));
        assert!(out.contains("1  | Widget          | 5.00  | 6"));
        assert!(out.contains("Sales Made:"));
        assert!(out.contains("1  | Widget          | 4        | 20.00"));
        assert!(out.ends_with("Exiting the application.\n"));
    }

    #[tokio::test]
    async fn restock_reports_new_quantity() {
        let ledger = InMemoryLedger::new();
        let out = session(&ledger, "1\nWidget\n5\n10\n1\nWidget\n6\n5\n5\n").await;
        assert!(out.contains("Updated Widget: new quantity = 15"));
    }

    #[tokio::test]
    async fn bad_numbers_are_reprompted() {
        let ledger = InMemoryLedger::new();
        let out = session(&ledger, "1\nWidget\nfive\n5\nten\n10\n5\n").await;

        assert_eq!(out.matches("Please enter a valid number.").count(), 2);
        let products = ledger.list_products().await.unwrap();
        assert_eq!(products.len(), 1);
        assert_eq!(products[0].quantity().get(), 10);
    }

    #[tokio::test]
    async fn ledger_rejections_keep_the_loop_going() {
        let ledger = InMemoryLedger::new();
        let out = session(&ledger, "3\n9\n1\n1\nWidget\n5\n2\n3\n1\n3\n3\n1\n-1\n5\n").await;

        assert!(out.contains("Product not found."));
        assert!(out.contains("Not enough stock (available: 2)."));
        assert!(out.contains("Invalid input:"));
        assert!(ledger.list_sales().await.unwrap().is_empty());
        assert!(out.ends_with("Exiting the application.\n"));
    }

    #[tokio::test]
    async fn unknown_choice_and_end_of_input() {
        let ledger = InMemoryLedger::new();
        let out = session(&ledger, "9\n").await;

        assert!(out.contains("Invalid choice. Please select a valid option."));
        assert!(out.ends_with("Exiting the application.\n"));
    }

    #[tokio::test]
    async fn end_of_input_mid_prompt_exits_cleanly() {
        let ledger = InMemoryLedger::new();
        let out = session(&ledger, "1\nWidget\n").await;

        assert!(out.ends_with("Exiting the application.\n"));
        assert!(ledger.list_products().await.unwrap().is_empty());
    }
}
