use async_trait::async_trait;
use thiserror::Error;
use tracing::info;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SignalError {
    /// The operator channel reached end of input.
    #[error("Operator input closed")]
    Closed,

    #[error("Failed to read operator input: {0}")]
    Io(String),
}

/// Explicit acknowledgement from the operator that a manual step was carried out.
#[async_trait]
pub trait OperatorSignal: Send + Sync {
    /// Blocks until the operator confirms `prompt`.
    async fn await_proceed(&self, prompt: &str) -> Result<(), SignalError>;
}

/// Proceeds immediately, for unattended runs where the nodes are driven externally.
#[derive(Debug, Clone, Copy, Default)]
pub struct AutoProceed;

#[async_trait]
impl OperatorSignal for AutoProceed {
    async fn await_proceed(&self, prompt: &str) -> Result<(), SignalError> {
        info!("{prompt} (proceeding without confirmation)");
        Ok(())
    }
}
