use std::fmt;

use faultline_monitor::{NetworkStatus, SyncWait};
use faultline_tx::BatchReport;
use faultline_types::{
    ConsistencyVerdict, HeightReading, LivenessStatus, NodeName, SyncSnapshot, TransactionReceipt,
    aliases::TxHash,
};

use crate::command::Scenario;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InitialSyncReport {
    pub tx_hash: TxHash,
    pub receipt: TransactionReceipt,
    pub sync: SyncWait,
    pub verdict: ConsistencyVerdict,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IsolationReport {
    pub isolated: NodeName,
    pub before: NetworkStatus,
    pub after: NetworkStatus,
}

impl IsolationReport {
    /// Liveness of the isolated node once the operator confirmed the stop.
    pub fn isolated_status(&self) -> LivenessStatus {
        self.after.status_of(self.isolated.as_str()).unwrap_or(LivenessStatus::Offline)
    }
}

/// Height progress of one node across the degraded batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeDelta {
    pub node: NodeName,
    pub before: HeightReading,
    pub after: HeightReading,
}

impl NodeDelta {
    /// Blocks gained, when both readings are available.
    pub fn delta(&self) -> Option<i128> {
        Some(self.after.height()?.delta_since(self.before.height()?))
    }
}

impl fmt::Display for NodeDelta {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.delta() {
            Some(delta) => write!(
                f,
                "{}: {} -> {} ({delta:+} blocks)",
                self.node.label(),
                self.before,
                self.after
            ),
            None => write!(f, "{}: {} -> {}", self.node.label(), self.before, self.after),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DegradedReport {
    pub isolated: NodeName,
    /// Liveness of the isolated node across both snapshots. Online only if it answered in
    /// either of them.
    pub isolated_status: LivenessStatus,
    pub before: SyncSnapshot,
    pub after: SyncSnapshot,
    pub batch: BatchReport,
    pub sync: SyncWait,
    /// One entry per node except the isolated one, in registry order.
    pub deltas: Vec<NodeDelta>,
}

impl DegradedReport {
    pub fn delta_of(&self, node: &str) -> Option<i128> {
        self.deltas.iter().find(|d| d.node.as_str() == node).and_then(NodeDelta::delta)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecoveryReport {
    pub recovered: NodeName,
    pub before: SyncSnapshot,
    pub status: NetworkStatus,
    pub sync: SyncWait,
    pub verdict: ConsistencyVerdict,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScenarioReport {
    InitialSync(InitialSyncReport),
    Isolation(IsolationReport),
    Degraded(DegradedReport),
    Recovery(RecoveryReport),
}

impl ScenarioReport {
    pub fn scenario(&self) -> Scenario {
        match self {
            Self::InitialSync(_) => Scenario::InitialSync,
            Self::Isolation(_) => Scenario::NodeIsolation,
            Self::Degraded(_) => Scenario::DegradedTransactions,
            Self::Recovery(_) => Scenario::Recovery,
        }
    }
}

/// Result of one successfully executed menu command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandOutcome {
    Scenario(ScenarioReport),
    RunAll(Vec<ScenarioReport>),
    Status(NetworkStatus),
    Verified(ConsistencyVerdict),
    Exit,
}
