//! Cluster-level properties of the consistency monitor over a full registry.

mod common;

use std::time::Duration;

use color_eyre::Result;
use common::{harness, mocks::ScriptedOperator};
use faultline_monitor::{ConsistencyMonitor, SyncWait};
use faultline_types::{Agreement, Exclusion, Height, HeightReading, SyncSnapshot, aliases::B256};
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

#[test]
fn zero_or_one_available_node_is_synchronized() {
    let none = SyncSnapshot::new()
        .with("node1", HeightReading::Unavailable)
        .with("node2", HeightReading::Unavailable);
    assert!(ConsistencyMonitor::is_synchronized(&none));

    let one = none.with("node3", HeightReading::Available(Height::new(7)));
    assert!(ConsistencyMonitor::is_synchronized(&one));
}

#[test]
fn any_height_mismatch_breaks_synchronization() {
    let equal = SyncSnapshot::new()
        .with("node1", HeightReading::Available(Height::new(42)))
        .with("node2", HeightReading::Available(Height::new(42)));
    assert!(ConsistencyMonitor::is_synchronized(&equal));

    let skewed = equal.with("node3", HeightReading::Available(Height::new(41)));
    assert!(!ConsistencyMonitor::is_synchronized(&skewed));
}

#[tokio::test(start_paused = true)]
async fn single_qualified_node_is_a_degenerate_success() -> Result<()> {
    let h = harness(20, ScriptedOperator::new().shared());
    h.cluster.node1.set_height(25);
    h.cluster.node3.set_online(false);

    let verdict = h.monitor.verify_hash_consistency(Height::new(25)).await?;

    assert_eq!(verdict.agreement, Agreement::Degenerate { compared: 1 });
    assert!(verdict.is_consistent());
    assert_eq!(verdict.excluded.len(), 2);
    let excluded = |node: &str, reason: Exclusion| {
        verdict.excluded.iter().any(|(n, e)| n.as_str() == node && *e == reason)
    };
    assert!(excluded("node2", Exclusion::BlockNotFound));
    assert!(excluded("node3", Exclusion::Offline));
    Ok(())
}

#[tokio::test(start_paused = true)]
async fn two_disagreeing_nodes_fail_verification() -> Result<()> {
    let h = harness(20, ScriptedOperator::new().shared());
    h.cluster.node2.set_hash(20, B256::repeat_byte(0x11));

    let verdict = h.monitor.verify_hash_consistency(Height::new(20)).await?;

    assert_eq!(verdict.agreement, Agreement::Diverged);
    assert_ne!(verdict.hash_of(&"node1".into()), verdict.hash_of(&"node2".into()));
    Ok(())
}

#[tokio::test(start_paused = true)]
async fn sync_wait_is_bounded_when_nodes_never_converge() -> Result<()> {
    let h = harness(20, ScriptedOperator::new().shared());
    h.cluster.node2.set_height(19);
    let timeout = Duration::from_secs(30);

    let started = Instant::now();
    let wait = h.monitor.await_synchronization(timeout, &CancellationToken::new()).await?;

    assert!(matches!(wait, SyncWait::TimedOut(_)));
    assert!(started.elapsed() <= timeout + h.monitor.config().poll_interval);
    Ok(())
}

#[tokio::test(start_paused = true)]
async fn height_regression_is_flagged_not_fatal() -> Result<()> {
    let h = harness(20, ScriptedOperator::new().shared());
    h.monitor.height_snapshot().await?;

    h.cluster.node2.set_height(18);
    h.cluster.node1.set_height(18);
    h.cluster.node3.set_height(18);
    let wait =
        h.monitor.await_synchronization(Duration::from_secs(5), &CancellationToken::new()).await?;

    assert!(wait.converged());
    assert_eq!(h.monitor.anomalies().len(), 3);
    Ok(())
}
