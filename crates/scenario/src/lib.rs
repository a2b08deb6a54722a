pub mod command;
pub mod config;
pub mod error;
pub mod report;
pub mod runner;
pub mod signal;

pub use command::{Command, InvalidChoice, Scenario};
pub use config::ScenarioConfig;
pub use error::ScenarioError;
pub use report::{
    CommandOutcome, DegradedReport, InitialSyncReport, IsolationReport, NodeDelta,
    RecoveryReport, ScenarioReport,
};
pub use runner::ScenarioRunner;
pub use signal::{AutoProceed, OperatorSignal, SignalError};
