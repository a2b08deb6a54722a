use clap::Parser;
use color_eyre::eyre::{Result, eyre};
use faultline_scenario::Scenario;

use super::operator_signal;
use crate::{app::App, signal::InterruptGuard};

#[derive(Parser, Debug, Clone, Default, PartialEq)]
pub struct ScenarioCmd {
    /// Scenario number: 1 initial sync, 2 node isolation, 3 transactions while degraded,
    /// 4 recovery
    #[clap(value_parser = clap::value_parser!(u8).range(1..=4))]
    pub number: u8,

    /// Do not wait for operator confirmation of manual steps
    #[clap(long)]
    pub assume_yes: bool,
}

impl ScenarioCmd {
    pub async fn run(&self, app: &App) -> Result<()> {
        let scenario = Scenario::from_number(self.number)
            .ok_or_else(|| eyre!("Unknown scenario {}", self.number))?;
        app.check_chain_id().await?;

        let runner = app.runner(operator_signal(self.assume_yes))?;
        let interrupt = InterruptGuard::new();
        runner.run(scenario, interrupt.token()).await?;
        Ok(())
    }
}
