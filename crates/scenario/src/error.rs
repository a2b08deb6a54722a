use std::time::Duration;

use thiserror::Error;

use crate::signal::SignalError;

/// Reasons a scenario step stops before completing, apart from node and transaction
/// failures.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ScenarioError {
    #[error("Experiment cancelled")]
    Cancelled,

    #[error("No operator confirmation within {} seconds", .0.as_secs())]
    OperatorTimeout(Duration),

    #[error(transparent)]
    Signal(#[from] SignalError),
}
