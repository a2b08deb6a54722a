use std::time::Duration;

use faultline_types::{
    NodeName,
    aliases::{Address, U256},
};

/// Parameters of the four experiments. Every amount is in wei.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScenarioConfig {
    pub recipient: Address,
    /// Value of the single transfer of the initial sync scenario.
    pub single_amount: U256,
    /// Value of each transfer of the degraded batch.
    pub batch_amount: U256,
    pub batch_size: usize,
    pub inclusion_attempts: usize,
    pub sync_timeout: Duration,
    /// Convergence timeout after the recovery node is restarted.
    pub recovery_sync_timeout: Duration,
    pub isolation_settle: Duration,
    pub recovery_settle: Duration,
    /// Node stopped and restarted by the operator.
    pub recovery_node: NodeName,
    /// Node whose height selects the block compared by consistency checks.
    pub reference_node: NodeName,
    /// Shown to the operator to stop the recovery node.
    pub stop_instruction: String,
    /// Shown to the operator to restart the recovery node.
    pub start_instruction: String,
    /// Upper bound on an operator wait; `None` waits indefinitely.
    pub operator_timeout: Option<Duration>,
}

impl ScenarioConfig {
    pub fn new(recipient: Address, single_amount: U256, batch_amount: U256) -> Self {
        Self {
            recipient,
            single_amount,
            batch_amount,
            batch_size: 5,
            inclusion_attempts: 30,
            sync_timeout: Duration::from_secs(30),
            recovery_sync_timeout: Duration::from_secs(60),
            isolation_settle: Duration::from_secs(2),
            recovery_settle: Duration::from_secs(10),
            recovery_node: NodeName::from("node3"),
            reference_node: NodeName::from("node1"),
            stop_instruction: "docker-compose stop eth-node3-recovery".to_string(),
            start_instruction: "docker-compose start eth-node3-recovery".to_string(),
            operator_timeout: None,
        }
    }
}
