#![allow(dead_code)]

//! Shared helpers for in-process integration tests.
//!
//! Every test owns a [`MockCluster`] and wires the real registry, monitor, orchestrator
//! and scenario runner over it. Only the node RPC surface and the operator are scripted.

pub(crate) mod mocks;

use std::sync::Arc;

use alloy_primitives::address;
use faultline_monitor::{ConsistencyMonitor, MonitorConfig};
use faultline_rpc::NodeRegistry;
use faultline_scenario::{OperatorSignal, ScenarioConfig, ScenarioRunner};
use faultline_test_support::MockCluster;
use faultline_tx::{AccountStore, OrchestratorConfig, TransactionOrchestrator};
use faultline_types::{aliases::Address, units::parse_positive_ether};

pub(crate) const RECIPIENT: Address = address!("70997970C51812dc3A010C7d01b50e0d17dc79C8");

pub(crate) struct Harness {
    pub cluster: MockCluster,
    pub registry: Arc<NodeRegistry>,
    pub monitor: Arc<ConsistencyMonitor>,
    pub orchestrator: Arc<TransactionOrchestrator>,
    pub runner: ScenarioRunner,
}

pub(crate) fn scenario_config() -> ScenarioConfig {
    ScenarioConfig::new(
        RECIPIENT,
        parse_positive_ether("0.1").expect("amount"),
        parse_positive_ether("0.05").expect("amount"),
    )
}

/// Three mock nodes at `height`, submissions through `node1`.
pub(crate) fn harness(height: u64, signal: Arc<dyn OperatorSignal>) -> Harness {
    harness_with(MockCluster::at_height(height), signal, scenario_config())
}

pub(crate) fn harness_with(
    cluster: MockCluster,
    signal: Arc<dyn OperatorSignal>,
    config: ScenarioConfig,
) -> Harness {
    let registry = cluster.registry();
    let accounts = Arc::new(AccountStore::with_genesis_accounts().expect("genesis accounts"));
    let signer = accounts.all()[0].signer().clone();

    let monitor = Arc::new(ConsistencyMonitor::new(registry.clone(), MonitorConfig::default()));
    let orchestrator = Arc::new(TransactionOrchestrator::new(
        registry.clone(),
        accounts,
        signer,
        OrchestratorConfig::default(),
    ));
    let runner = ScenarioRunner::new(monitor.clone(), orchestrator.clone(), signal, config);

    Harness { cluster, registry, monitor, orchestrator, runner }
}
