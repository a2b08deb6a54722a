use clap::Parser;
use color_eyre::eyre::{Result, WrapErr};
use faultline_types::{address::parse_address, units::parse_positive_ether};

use crate::{app::App, signal::InterruptGuard};

#[derive(Parser, Debug, Clone, Default, PartialEq)]
pub struct SendCmd {
    /// Sender address; must be a known account (default: the configured signing key)
    #[clap(long)]
    pub from: Option<String>,

    /// Recipient address
    #[clap(long)]
    pub to: String,

    /// Amount in ether, e.g. `0.1`
    #[clap(long)]
    pub amount: String,

    /// Wait for the transaction to be included
    #[clap(long)]
    pub wait: bool,
}

impl SendCmd {
    /// Inputs are validated before any node is contacted.
    pub async fn run(&self, app: &App) -> Result<()> {
        let recipient = parse_address(&self.to)?;
        let amount = parse_positive_ether(&self.amount)?;
        let sender = self.from.as_deref().map(parse_address).transpose()?;

        app.check_chain_id().await?;
        let orchestrator = &app.orchestrator;
        let tx_hash = match sender {
            Some(sender) => orchestrator.submit_from(sender, recipient, amount).await,
            None => orchestrator.submit_default(recipient, amount).await,
        }
        .wrap_err("Failed to submit transaction")?;
        println!("{tx_hash}");

        if self.wait {
            let interrupt = InterruptGuard::new();
            let attempts = app.config.scenario.inclusion_attempts.max(1);
            let receipt = orchestrator.await_inclusion(tx_hash, attempts, interrupt.token()).await?;
            println!(
                "Mined in block {} ({}), gas used {}",
                receipt.block_number,
                receipt.block_hash,
                receipt.gas_used
            );
            if !receipt.success {
                color_eyre::eyre::bail!("Transaction {tx_hash} reverted");
            }
        }
        Ok(())
    }
}
