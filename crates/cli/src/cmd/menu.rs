use std::sync::Arc;

use clap::Parser;
use color_eyre::eyre::{Result, WrapErr};
use faultline_scenario::{AutoProceed, Command, OperatorSignal, ScenarioRunner};
use tracing::{info, warn};

use crate::{
    app::App,
    signal::{InterruptGuard, OperatorInput},
};

#[derive(Parser, Debug, Clone, Default, PartialEq)]
pub struct MenuCmd {
    /// Do not wait for operator confirmation of manual steps
    #[clap(long)]
    pub assume_yes: bool,
}

impl MenuCmd {
    /// Read-dispatch loop over the menu choices. A failed command is reported and the
    /// prompt comes back; only `0`, end of input or Ctrl+C at the prompt leave the loop.
    pub async fn run(&self, app: &App) -> Result<()> {
        print_banner();
        app.check_chain_id().await?;
        app.monitor.print_network_status().await.wrap_err("Failed to read network status")?;

        let input = OperatorInput::stdin();
        let signal: Arc<dyn OperatorSignal> =
            if self.assume_yes { Arc::new(AutoProceed) } else { Arc::new(input.clone()) };
        let runner = app.runner(signal)?;

        loop {
            print_menu();
            let line = tokio::select! {
                line = input.next_line() => line?,
                _ = tokio::signal::ctrl_c() => None,
            };
            let Some(line) = line else {
                info!("Exiting experiment...");
                break;
            };

            match line.parse::<Command>() {
                Ok(Command::Exit) => {
                    info!("Exiting experiment...");
                    break;
                }
                Ok(command) => dispatch(&runner, command).await,
                Err(e) => warn!("{e}. Please try again."),
            }
        }
        Ok(())
    }
}

async fn dispatch(runner: &ScenarioRunner, command: Command) {
    let interrupt = InterruptGuard::new();
    let _ = runner.dispatch(command, interrupt.token()).await;
}

fn print_banner() {
    info!("===============================================");
    info!("  Blockchain Immutability & Fault Tolerance");
    info!("  Private Ethereum Network - 3 Node Topology");
    info!("===============================================");
}

fn print_menu() {
    info!("EXPERIMENT MENU");
    for command in Command::MENU {
        info!("{}. {}", command.choice(), command.label());
    }
    info!("Enter your choice: ");
}
