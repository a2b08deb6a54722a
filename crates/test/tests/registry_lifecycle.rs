//! Shutdown semantics of the shared registry as seen by every component.

mod common;

use color_eyre::Result;
use common::{RECIPIENT, harness, mocks::ScriptedOperator};
use faultline_rpc::{NodeError, RegistryError};
use faultline_scenario::Command;
use faultline_tx::TxError;
use faultline_types::aliases::U256;
use tokio_util::sync::CancellationToken;

#[tokio::test]
async fn close_all_is_best_effort_and_idempotent() -> Result<()> {
    let h = harness(1, ScriptedOperator::new().shared());
    h.cluster.node2.fail_close_with(NodeError::Unreachable("socket already gone".into()));

    let first = h.registry.close_all().await;
    assert_eq!(first.failures.len(), 1);
    assert_eq!(first.closed.len(), 2);
    assert_eq!(h.cluster.node3.close_calls(), 1);

    let second = h.registry.close_all().await;
    assert!(second.already_closed);
    assert_eq!(h.cluster.node1.close_calls(), 1);
    Ok(())
}

#[tokio::test]
async fn components_fail_fast_after_shutdown() -> Result<()> {
    let h = harness(1, ScriptedOperator::new().shared());
    h.registry.close_all().await;

    assert_eq!(h.monitor.status_snapshot().await.unwrap_err(), RegistryError::Closed);
    assert_eq!(
        h.orchestrator.submit_default(RECIPIENT, U256::from(1u64)).await.unwrap_err(),
        TxError::Registry(RegistryError::Closed)
    );
    assert!(h.runner.dispatch(Command::Status, &CancellationToken::new()).await.is_none());
    Ok(())
}
