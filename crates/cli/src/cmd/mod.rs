pub mod accounts;
pub mod balance;
pub mod init;
pub mod menu;
pub mod run_all;
pub mod scenario;
pub mod send;
pub mod status;
pub mod verify;

use std::sync::Arc;

use faultline_scenario::{AutoProceed, OperatorSignal};

use crate::signal::OperatorInput;

/// Operator confirmations come from stdin unless the run is unattended.
pub(crate) fn operator_signal(assume_yes: bool) -> Arc<dyn OperatorSignal> {
    if assume_yes { Arc::new(AutoProceed) } else { Arc::new(OperatorInput::stdin()) }
}
