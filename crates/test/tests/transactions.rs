//! Submission and inclusion tracking through the shared registry.

mod common;

use color_eyre::Result;
use common::{RECIPIENT, harness, mocks::ScriptedOperator};
use faultline_tx::TxError;
use faultline_types::{Height, aliases::U256, units::parse_positive_ether};
use tokio_util::sync::CancellationToken;

#[tokio::test(start_paused = true)]
async fn batch_of_five_attempts_all_despite_a_failure() -> Result<()> {
    let h = harness(50, ScriptedOperator::new().shared());
    h.cluster.node1.fail_submission(2, "already known");
    let amount = parse_positive_ether("0.05")?;

    let report = h.orchestrator.submit_batch(5, RECIPIENT, amount, &CancellationToken::new()).await;

    assert_eq!(h.cluster.node1.submission_attempts(), 5);
    assert_eq!(report.outcomes.len(), 5);
    assert!(matches!(
        &report.outcomes[1],
        Err(TxError::Submission { reason, .. }) if reason == "already known"
    ));
    assert!(report.outcomes.iter().enumerate().all(|(i, o)| i == 1 || o.is_ok()));
    Ok(())
}

#[tokio::test(start_paused = true)]
async fn receipt_within_ten_polls_is_returned() -> Result<()> {
    let h = harness(50, ScriptedOperator::new().shared());
    h.cluster.node1.include_after_polls(Some(9));

    let tx_hash = h.orchestrator.submit_default(RECIPIENT, U256::from(1u64)).await?;
    let receipt = h.orchestrator.await_inclusion(tx_hash, 30, &CancellationToken::new()).await?;

    assert_eq!(receipt.block_number, Height::new(51));
    assert_eq!(h.cluster.node1.receipt_polls(), 10);
    Ok(())
}

#[tokio::test(start_paused = true)]
async fn missing_receipt_fails_with_not_mined() -> Result<()> {
    let h = harness(50, ScriptedOperator::new().shared());
    h.cluster.node1.include_after_polls(None);

    let tx_hash = h.orchestrator.submit_default(RECIPIENT, U256::from(1u64)).await?;
    let err = h
        .orchestrator
        .await_inclusion(tx_hash, 30, &CancellationToken::new())
        .await
        .expect_err("never mined");

    assert_eq!(err, TxError::NotMined { tx_hash, attempts: 30 });
    Ok(())
}

#[tokio::test(start_paused = true)]
async fn unreachable_submission_node_costs_attempts() -> Result<()> {
    let h = harness(50, ScriptedOperator::new().shared());
    h.cluster.node1.include_after_polls(None);
    let tx_hash = h.orchestrator.submit_default(RECIPIENT, U256::from(1u64)).await?;
    h.cluster.node1.set_online(false);

    let err = h
        .orchestrator
        .await_inclusion(tx_hash, 3, &CancellationToken::new())
        .await
        .expect_err("node is down");

    assert_eq!(err, TxError::NotMined { tx_hash, attempts: 3 });
    Ok(())
}
