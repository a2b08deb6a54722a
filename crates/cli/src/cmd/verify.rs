use clap::Parser;
use color_eyre::eyre::{Result, bail};
use faultline_types::Height;

use super::operator_signal;
use crate::app::App;

#[derive(Parser, Debug, Clone, Default, PartialEq)]
pub struct VerifyCmd {
    /// Height to compare (default: current height of the reference node)
    #[clap(long)]
    pub height: Option<u64>,
}

impl VerifyCmd {
    /// Fails when two nodes report different hashes, so scripts can rely on the exit code.
    pub async fn run(&self, app: &App) -> Result<()> {
        let runner = app.runner(operator_signal(true))?;
        let verdict = runner.verify_immutability(self.height.map(Height::new)).await?;
        if !verdict.is_consistent() {
            bail!("Block hashes diverge: {verdict}");
        }
        Ok(())
    }
}
