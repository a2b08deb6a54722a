use clap::Parser;
use color_eyre::eyre::{Result, WrapErr};
use faultline_types::{address::parse_address, units::display_ether};

use crate::app::App;

#[derive(Parser, Debug, Clone, Default, PartialEq)]
pub struct BalanceCmd {
    /// Account address, `0x` followed by 40 hex digits
    pub address: String,

    /// Query a single node instead of every node
    #[clap(long)]
    pub node: Option<String>,
}

impl BalanceCmd {
    pub async fn run(&self, app: &App) -> Result<()> {
        let address = parse_address(&self.address)?;
        match &self.node {
            Some(node) => {
                let wei = app
                    .orchestrator
                    .balance(node, address)
                    .await
                    .wrap_err_with(|| format!("Failed to read balance on {node}"))?;
                println!("{address}: {} ETH on {node}", display_ether(wei));
            }
            None => {
                app.orchestrator.print_balances(address).await?;
            }
        }
        Ok(())
    }
}
