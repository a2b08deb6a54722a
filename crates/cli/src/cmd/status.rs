use clap::Parser;
use color_eyre::eyre::{Result, WrapErr};

use crate::app::App;

#[derive(Parser, Debug, Clone, Default, PartialEq)]
pub struct StatusCmd {}

impl StatusCmd {
    pub async fn run(&self, app: &App) -> Result<()> {
        app.monitor.print_network_status().await.wrap_err("Failed to read network status")?;
        Ok(())
    }
}
