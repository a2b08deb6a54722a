//! Scenario runner integration tests.
//!
//! Each test drives the real runner over a three-node mock cluster:
//! 1. The operator is scripted so manual stop/start steps toggle mock nodes.
//! 2. Polling intervals and settle delays elapse on paused Tokio time.

mod common;

use std::time::Duration;

use color_eyre::Result;
use common::{
    harness, harness_with,
    mocks::{AbsentOperator, ScriptedOperator},
    scenario_config,
};
use faultline_scenario::{Command, CommandOutcome, Scenario, ScenarioError, ScenarioReport};
use faultline_test_support::MockCluster;
use faultline_types::{Agreement, Height, LivenessStatus, aliases::B256};
use tokio_util::sync::CancellationToken;

#[tokio::test(start_paused = true)]
async fn initial_sync_confirms_and_agrees() -> Result<()> {
    let h = harness(100, ScriptedOperator::new().shared());

    let report = h.runner.initial_sync(&CancellationToken::new()).await?;

    assert_eq!(report.receipt.tx_hash, report.tx_hash);
    assert_eq!(report.receipt.block_number, Height::new(101));
    assert!(report.sync.converged());
    assert_eq!(report.verdict.height, Height::new(101));
    assert_eq!(report.verdict.agreement, Agreement::Agreed { compared: 3 });
    Ok(())
}

#[tokio::test(start_paused = true)]
async fn isolation_waits_for_the_operator() -> Result<()> {
    let cluster = MockCluster::at_height(100);
    let node3 = cluster.node3.clone();
    let operator = ScriptedOperator::new().then(move || node3.set_online(false)).shared();
    let h = harness_with(cluster, operator.clone(), scenario_config());

    let report = h.runner.isolate_node(&CancellationToken::new()).await?;

    assert_eq!(report.before.status_of("node3"), Some(LivenessStatus::Online));
    assert_eq!(report.isolated_status(), LivenessStatus::Offline);
    assert_eq!(report.after.online_count(), 2);
    assert_eq!(operator.prompts().len(), 1);
    assert!(operator.prompts()[0].contains("NODE3"));
    Ok(())
}

#[tokio::test(start_paused = true)]
async fn degraded_batch_reports_per_node_delta() -> Result<()> {
    let h = harness(100, ScriptedOperator::new().shared());
    h.cluster.node3.set_online(false);

    let report = h.runner.degraded_transactions(&CancellationToken::new()).await?;

    assert_eq!(report.batch.attempted(), 5);
    assert_eq!(report.batch.succeeded(), 5);
    assert_eq!(report.delta_of("node1"), Some(5));
    assert_eq!(report.delta_of("node2"), Some(5));
    assert_eq!(report.delta_of("node3"), None);
    assert!(report.deltas.iter().all(|d| d.node.as_str() != "node3"));
    assert_eq!(report.isolated_status, LivenessStatus::Offline);
    assert!(report.sync.converged());
    assert_eq!(h.cluster.node3.height(), 100);
    Ok(())
}

#[tokio::test(start_paused = true)]
async fn degraded_batch_survives_a_rejected_submission() -> Result<()> {
    let h = harness(100, ScriptedOperator::new().shared());
    h.cluster.node3.set_online(false);
    h.cluster.node1.fail_submission(2, "nonce too low");

    let report = h.runner.degraded_transactions(&CancellationToken::new()).await?;

    assert_eq!(report.batch.attempted(), 5);
    assert_eq!(report.batch.failed(), 1);
    assert_eq!(report.delta_of("node1"), Some(4));
    assert_eq!(report.delta_of("node2"), Some(4));
    Ok(())
}

#[tokio::test(start_paused = true)]
async fn recovery_catches_up_and_agrees() -> Result<()> {
    let cluster = MockCluster::at_height(105);
    cluster.node3.set_height(100);
    cluster.node3.set_online(false);
    let node3 = cluster.node3.clone();
    let operator = ScriptedOperator::new()
        .then(move || {
            node3.set_online(true);
            node3.catch_up_to(105, 1);
        })
        .shared();
    let h = harness_with(cluster, operator, scenario_config());

    let report = h.runner.recover_node(&CancellationToken::new()).await?;

    assert_eq!(report.before.height_of(&"node3".into()), None);
    assert_eq!(report.status.status_of("node3"), Some(LivenessStatus::Online));
    assert!(report.sync.converged());
    assert_eq!(report.verdict.height, Height::new(105));
    assert_eq!(report.verdict.agreement, Agreement::Agreed { compared: 3 });
    assert!(h.monitor.anomalies().is_empty());
    Ok(())
}

#[tokio::test(start_paused = true)]
async fn recovery_flags_a_forked_node() -> Result<()> {
    let cluster = MockCluster::at_height(105);
    cluster.node3.set_hash(105, B256::repeat_byte(0xee));
    let h = harness_with(cluster, ScriptedOperator::new().shared(), scenario_config());

    let report = h.runner.recover_node(&CancellationToken::new()).await?;

    assert!(report.sync.converged());
    assert_eq!(report.verdict.agreement, Agreement::Diverged);
    assert!(!report.verdict.is_consistent());
    Ok(())
}

#[tokio::test(start_paused = true)]
async fn run_all_chains_the_four_scenarios() -> Result<()> {
    let cluster = MockCluster::at_height(100);
    let (stop, start) = (cluster.node3.clone(), cluster.node3.clone());
    let operator = ScriptedOperator::new()
        .then(move || stop.set_online(false))
        .then(move || {
            start.set_online(true);
            start.catch_up_to(106, 2);
        })
        .shared();
    let h = harness_with(cluster, operator, scenario_config());

    let reports = h.runner.run_all(&CancellationToken::new()).await?;

    let order: Vec<_> = reports.iter().map(ScenarioReport::scenario).collect();
    assert_eq!(order, Scenario::ALL);
    let ScenarioReport::Degraded(degraded) = &reports[2] else {
        panic!("third report is not the degraded batch");
    };
    assert_eq!(degraded.delta_of("node1"), Some(5));
    let ScenarioReport::Recovery(recovery) = &reports[3] else {
        panic!("fourth report is not the recovery");
    };
    assert_eq!(recovery.verdict.height, Height::new(106));
    assert!(recovery.verdict.is_consistent());
    Ok(())
}

#[tokio::test(start_paused = true)]
async fn operator_timeout_aborts_only_the_step() {
    let mut config = scenario_config();
    config.operator_timeout = Some(Duration::from_secs(30));
    let h = harness_with(MockCluster::at_height(10), std::sync::Arc::new(AbsentOperator), config);
    let cancel = CancellationToken::new();

    let err = h.runner.isolate_node(&cancel).await.unwrap_err();
    assert_eq!(
        err.downcast_ref::<ScenarioError>(),
        Some(&ScenarioError::OperatorTimeout(Duration::from_secs(30)))
    );

    assert!(h.runner.dispatch(Command::Run(Scenario::NodeIsolation), &cancel).await.is_none());
    assert!(matches!(
        h.runner.dispatch(Command::Status, &cancel).await,
        Some(CommandOutcome::Status(_))
    ));
}

#[tokio::test(start_paused = true)]
async fn cancellation_interrupts_an_operator_wait() {
    let h = harness(10, std::sync::Arc::new(AbsentOperator));
    let cancel = CancellationToken::new();

    let waiting = h.runner.recover_node(&cancel);
    let trigger = async {
        tokio::time::sleep(Duration::from_secs(5)).await;
        cancel.cancel();
    };
    let (result, ()) = tokio::join!(waiting, trigger);

    let err = result.unwrap_err();
    assert_eq!(err.downcast_ref::<ScenarioError>(), Some(&ScenarioError::Cancelled));
}

#[tokio::test(start_paused = true)]
async fn failed_command_returns_to_the_loop() {
    let h = harness(10, ScriptedOperator::new().shared());
    h.cluster.node1.set_online(false);
    let cancel = CancellationToken::new();

    let failed = h.runner.dispatch(Command::Run(Scenario::InitialSync), &cancel).await;
    assert!(failed.is_none());

    h.cluster.node1.set_online(true);
    let verified = h.runner.dispatch(Command::VerifyImmutability, &cancel).await;
    let Some(CommandOutcome::Verified(verdict)) = verified else {
        panic!("verification did not complete: {verified:?}");
    };
    assert_eq!(verdict.height, Height::new(10));
    assert!(verdict.is_consistent());
    assert_eq!(h.runner.dispatch(Command::Exit, &cancel).await, Some(CommandOutcome::Exit));
}
