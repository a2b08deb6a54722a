use std::path::Path;

use clap::{Parser, Subcommand};
use color_eyre::eyre::{Result, eyre};
use faultline_types::address::parse_address;

use crate::{
    app::App,
    file::{AccountEntry, load_accounts, save_accounts},
};

#[derive(Parser, Debug, Clone, PartialEq)]
pub struct AccountsCmd {
    #[command(subcommand)]
    pub command: AccountsSubcommand,
}

#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum AccountsSubcommand {
    /// List every known account
    List,

    /// Create a random account and store it under the home directory
    Create {
        /// Display name (default: `Account <address prefix>`)
        #[clap(long)]
        name: Option<String>,
    },

    /// Show one account and its balance on every node
    Show {
        address: String,

        /// Also print the private key
        #[clap(long)]
        reveal_key: bool,
    },
}

impl AccountsCmd {
    pub async fn run(&self, app: &App, accounts_file: &Path) -> Result<()> {
        let store = app.orchestrator.accounts();
        match &self.command {
            AccountsSubcommand::List => {
                for account in store.all() {
                    println!("{}  {}", account.address(), account.name);
                }
            }
            AccountsSubcommand::Create { name } => {
                let account = store.create(name.as_deref());
                let private_key = account.private_key().to_string();

                let mut stored = load_accounts(accounts_file)?;
                stored.entries.push(AccountEntry {
                    name: account.name.clone(),
                    private_key: private_key.clone(),
                });
                save_accounts(accounts_file, &stored)?;

                println!("Address:     {}", account.address());
                println!("Name:        {}", account.name);
                println!("Private key: {private_key}");
            }
            AccountsSubcommand::Show { address, reveal_key } => {
                let address = parse_address(address)?;
                let account =
                    store.get(&address).ok_or_else(|| eyre!("Account not found: {address}"))?;
                println!("Address: {}", account.address());
                println!("Name:    {}", account.name);
                if *reveal_key {
                    println!("Private key: {}", account.private_key());
                }
                app.orchestrator.print_balances(address).await?;
            }
        }
        Ok(())
    }
}
