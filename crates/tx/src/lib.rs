pub mod accounts;
pub mod error;
pub mod orchestrator;
pub mod tx;

pub use accounts::{Account, AccountStore};
pub use error::TxError;
pub use orchestrator::{BalanceReading, BatchReport, OrchestratorConfig, TransactionOrchestrator};
pub use tx::{FeeParams, TxKindConfig};
