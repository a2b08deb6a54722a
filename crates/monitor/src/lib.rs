//! Observes a cluster of nodes under partial failure.
//!
//! Probes are absorbed into `Offline`/`Unavailable` close to the source, so every report
//! covers every registered node even when some of them are down.

pub mod monitor;
pub mod report;
pub mod watch;

pub use monitor::{ConsistencyMonitor, MonitorConfig, StatusSnapshot, SyncWait, log_sync_status};
pub use report::{NetworkStatus, NodeDetails};
pub use watch::{Anomaly, ChainWatch};
