use std::io;

use anyhow::Context;
use clap::Parser;

use shopkeeper_cli::render;
use shopkeeper_cli::{Cli, Menu};
use shopkeeper_infra::{LedgerConfig, SqliteLedger};
use shopkeeper_observability::ObservabilityConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    shopkeeper_observability::init(
        &ObservabilityConfig::default().with_format(cli.log_format.into()),
    );

    let mut config = LedgerConfig::from_env().context("invalid ledger configuration")?;
    if let Some(url) = cli.database {
        config = config.with_database_url(url);
    }

    let ledger = SqliteLedger::connect(&config)
        .await
        .with_context(|| format!("failed to open database {}", config.database_url))?;
    ledger
        .initialize()
        .await
        .context("failed to initialize database schema")?;
    tracing::info!(database = %config.database_url, "ledger ready");

    let result = match cli.command.and_then(|c| c.into_command()) {
        Some(command) => match command.execute(&ledger).await {
            Ok(outcome) => render::render(&outcome, cli.format)
                .context("failed to render output")
                .map(|text| println!("{}", text.trim_end())),
            Err(err) => Err(anyhow::Error::new(err).context("command failed")),
        },
        None => {
            let mut menu = Menu::new(io::stdin().lock(), io::stdout().lock());
            menu.run(&ledger).await
        }
    };

    ledger.close().await;
    result
}
