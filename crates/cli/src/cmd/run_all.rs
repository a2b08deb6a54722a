use clap::Parser;
use color_eyre::eyre::Result;

use super::operator_signal;
use crate::{app::App, signal::InterruptGuard};

#[derive(Parser, Debug, Clone, Default, PartialEq)]
pub struct RunAllCmd {
    /// Do not wait for operator confirmation of manual steps
    #[clap(long)]
    pub assume_yes: bool,
}

impl RunAllCmd {
    pub async fn run(&self, app: &App) -> Result<()> {
        app.check_chain_id().await?;
        let runner = app.runner(operator_signal(self.assume_yes))?;
        let interrupt = InterruptGuard::new();
        runner.run_all(interrupt.token()).await?;
        Ok(())
    }
}
