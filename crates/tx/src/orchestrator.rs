use std::{sync::Arc, time::Duration};

use alloy_signer_local::PrivateKeySigner;
use faultline_rpc::{NodeError, NodeHandle, NodeRegistry};
use faultline_types::{
    NodeName, TransactionReceipt,
    aliases::{Address, TxHash, U256},
    constants::{DEFAULT_BATCH_SPACING_MS, DEFAULT_POLL_INTERVAL_MS},
    units::display_ether,
};
use tokio::time::sleep;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

use crate::{
    accounts::AccountStore,
    error::TxError,
    tx::{FeeParams, encode_raw, make_signed_transfer},
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrchestratorConfig {
    /// Node every transaction is submitted through and confirmed against.
    pub submission_node: NodeName,
    pub fees: FeeParams,
    /// Interval between two receipt polls.
    pub poll_interval: Duration,
    /// Minimum spacing between two submissions of a batch.
    pub batch_spacing: Duration,
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            submission_node: NodeName::from("node1"),
            fees: FeeParams::default(),
            poll_interval: Duration::from_millis(DEFAULT_POLL_INTERVAL_MS),
            batch_spacing: Duration::from_millis(DEFAULT_BATCH_SPACING_MS),
        }
    }
}

/// Outcome of [`TransactionOrchestrator::submit_batch`]. One entry per attempt, in
/// submission order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchReport {
    pub requested: usize,
    pub outcomes: Vec<Result<TxHash, TxError>>,
    pub cancelled: bool,
}

impl BatchReport {
    pub fn attempted(&self) -> usize {
        self.outcomes.len()
    }

    pub fn succeeded(&self) -> usize {
        self.outcomes.iter().filter(|o| o.is_ok()).count()
    }

    pub fn failed(&self) -> usize {
        self.attempted() - self.succeeded()
    }
}

/// Balance of one node as shown by a balance report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BalanceReading {
    Wei(U256),
    Offline,
    Failed(String),
}

/// Submits value transfers through one node and tracks their inclusion.
#[derive(Debug)]
pub struct TransactionOrchestrator {
    registry: Arc<NodeRegistry>,
    accounts: Arc<AccountStore>,
    default_signer: PrivateKeySigner,
    config: OrchestratorConfig,
}

impl TransactionOrchestrator {
    pub fn new(
        registry: Arc<NodeRegistry>,
        accounts: Arc<AccountStore>,
        default_signer: PrivateKeySigner,
        config: OrchestratorConfig,
    ) -> Self {
        info!(address = %default_signer.address(), "Transaction orchestrator initialized");
        Self { registry, accounts, default_signer, config }
    }

    pub fn config(&self) -> &OrchestratorConfig {
        &self.config
    }

    pub fn accounts(&self) -> &Arc<AccountStore> {
        &self.accounts
    }

    pub fn sender_address(&self) -> Address {
        self.default_signer.address()
    }

    fn submission_node(&self) -> Result<Arc<NodeHandle>, TxError> {
        Ok(self.registry.resolve(self.config.submission_node.as_str())?)
    }

    /// Signs and submits a transfer of `amount` wei from `sender` to `recipient`.
    ///
    /// The nonce is the submission node's pending-inclusive transaction count, so
    /// sequencing is node-assigned.
    pub async fn submit(
        &self,
        sender: &PrivateKeySigner,
        recipient: Address,
        amount: U256,
    ) -> Result<TxHash, TxError> {
        let node = self.submission_node()?;
        let chain_id = node.chain_id().await?;
        let nonce = node.pending_nonce(sender.address()).await?;

        let envelope =
            make_signed_transfer(sender, nonce, recipient, amount, chain_id, &self.config.fees)
                .await?;

        let tx_hash = node.submit_raw_transaction(encode_raw(&envelope)).await.map_err(|e| {
            match e {
                NodeError::Rpc { message, .. } => {
                    TxError::Submission { node: node.name().clone(), reason: message }
                }
                other => TxError::Node(other),
            }
        })?;

        info!(
            from = %sender.address(),
            to = %recipient,
            amount = %display_ether(amount),
            nonce,
            %tx_hash,
            "Transaction submitted"
        );
        Ok(tx_hash)
    }

    /// Submits from the configured default signer.
    pub async fn submit_default(
        &self,
        recipient: Address,
        amount: U256,
    ) -> Result<TxHash, TxError> {
        let signer = self.default_signer.clone();
        self.submit(&signer, recipient, amount).await
    }

    /// Submits from an account held by the account store.
    pub async fn submit_from(
        &self,
        sender: Address,
        recipient: Address,
        amount: U256,
    ) -> Result<TxHash, TxError> {
        let account = self.accounts.get(&sender).ok_or(TxError::UnknownAccount(sender))?;
        self.submit(account.signer(), recipient, amount).await
    }

    /// Submits `count` independent transfers from the default signer, spaced by the batch
    /// spacing. A failed attempt is recorded and the batch continues; only cancellation
    /// stops it early.
    pub async fn submit_batch(
        &self,
        count: usize,
        recipient: Address,
        amount: U256,
        cancel: &CancellationToken,
    ) -> BatchReport {
        info!("========== Sending {count} Transactions ==========");
        let mut report =
            BatchReport { requested: count, outcomes: Vec::with_capacity(count), cancelled: false };

        for i in 1..=count {
            if cancel.is_cancelled() {
                report.cancelled = true;
                break;
            }
            info!("[Transaction {i}/{count}]");
            let outcome = self.submit_default(recipient, amount).await;
            if let Err(e) = &outcome {
                error!("Failed to send transaction {i}/{count}: {e}");
            }
            report.outcomes.push(outcome);

            if i < count {
                tokio::select! {
                    _ = sleep(self.config.batch_spacing) => {}
                    _ = cancel.cancelled() => {
                        report.cancelled = true;
                        break;
                    }
                }
            }
        }

        info!(
            "========== Completed {} Transactions ({} failed) ==========",
            report.attempted(),
            report.failed()
        );
        report
    }

    /// Polls for the receipt of `tx_hash` up to `max_attempts` times.
    ///
    /// An unreachable node costs an attempt but does not end the wait.
    pub async fn await_inclusion(
        &self,
        tx_hash: TxHash,
        max_attempts: usize,
        cancel: &CancellationToken,
    ) -> Result<TransactionReceipt, TxError> {
        info!(%tx_hash, "Waiting for transaction to be mined");
        let node = self.submission_node()?;

        for attempt in 1..=max_attempts {
            match node.receipt(tx_hash).await {
                Ok(Some(receipt)) => {
                    info!(%tx_hash, block = %receipt.block_number, "Transaction mined");
                    return Ok(receipt);
                }
                Ok(None) => {}
                Err(e) if e.is_unreachable() => {
                    warn!(attempt, "Receipt lookup failed: {e}");
                }
                Err(e) => return Err(e.into()),
            }

            let current = match node.current_height().await {
                Ok(height) => height.to_string(),
                Err(_) => "unknown".to_string(),
            };
            info!("Attempt {attempt}/{max_attempts} - current block: {current} - waiting...");

            if attempt < max_attempts {
                tokio::select! {
                    _ = sleep(self.config.poll_interval) => {}
                    _ = cancel.cancelled() => return Err(TxError::Cancelled),
                }
            }
        }

        Err(TxError::NotMined { tx_hash, attempts: max_attempts })
    }

    /// Balance of `address` on `node`, in wei. A failed read is reported, not retried.
    pub async fn balance(&self, node: &str, address: Address) -> Result<U256, TxError> {
        Ok(self.registry.resolve(node)?.balance(address).await?)
    }

    /// Balance of `address` on every node, logged one line per node.
    pub async fn print_balances(
        &self,
        address: Address,
    ) -> Result<Vec<(NodeName, BalanceReading)>, TxError> {
        info!("========== Account Balance: {address} ==========");
        let mut readings = Vec::new();
        for handle in self.registry.handles()? {
            let reading = if !handle.probe_liveness().await.is_online() {
                info!("{}: OFFLINE", handle.name().label());
                BalanceReading::Offline
            } else {
                match handle.balance(address).await {
                    Ok(wei) => {
                        info!("{}: {} ETH", handle.name().label(), display_ether(wei));
                        BalanceReading::Wei(wei)
                    }
                    Err(e) => {
                        warn!("{}: Unable to fetch balance: {e}", handle.name().label());
                        BalanceReading::Failed(e.to_string())
                    }
                }
            };
            readings.push((handle.name().clone(), reading));
        }
        info!("============================================");
        Ok(readings)
    }
}

#[cfg(test)]
mod tests {
    use alloy_primitives::address;
    use faultline_test_support::MockCluster;
    use faultline_types::units::parse_positive_ether;
    use tokio::time::Instant;

    use super::*;

    const RECIPIENT: Address = address!("70997970C51812dc3A010C7d01b50e0d17dc79C8");

    fn orchestrator(cluster: &MockCluster) -> TransactionOrchestrator {
        let accounts = Arc::new(AccountStore::with_genesis_accounts().expect("genesis accounts"));
        let signer = accounts.all()[0].signer().clone();
        TransactionOrchestrator::new(
            cluster.registry(),
            accounts,
            signer,
            OrchestratorConfig::default(),
        )
    }

    #[tokio::test(start_paused = true)]
    async fn submit_advances_linked_nodes() {
        let cluster = MockCluster::at_height(100);
        let orchestrator = orchestrator(&cluster);
        let amount = parse_positive_ether("0.1").expect("amount");

        let tx_hash = orchestrator.submit_default(RECIPIENT, amount).await.expect("submitted");

        assert_eq!(cluster.node1.submissions().len(), 1);
        assert_eq!(tx_hash, alloy_primitives::keccak256(&cluster.node1.submissions()[0]));
        assert_eq!(cluster.node2.height(), 101);
        assert_eq!(cluster.node3.height(), 101);
    }

    #[tokio::test(start_paused = true)]
    async fn rejected_submission_names_node_and_reason() {
        let cluster = MockCluster::at_height(1);
        cluster.node1.fail_submission(1, "insufficient funds for gas * price + value");
        let orchestrator = orchestrator(&cluster);

        let err = orchestrator.submit_default(RECIPIENT, U256::from(1u64)).await.unwrap_err();
        assert_eq!(
            err,
            TxError::Submission {
                node: NodeName::from("node1"),
                reason: "insufficient funds for gas * price + value".into(),
            }
        );
    }

    #[tokio::test(start_paused = true)]
    async fn submit_from_unknown_account_fails() {
        let cluster = MockCluster::at_height(1);
        let orchestrator = orchestrator(&cluster);
        let stranger = address!("00000000000000000000000000000000000000aa");

        let err =
            orchestrator.submit_from(stranger, RECIPIENT, U256::from(1u64)).await.unwrap_err();
        assert_eq!(err, TxError::UnknownAccount(stranger));
        assert_eq!(cluster.node1.submission_attempts(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn batch_continues_after_a_failure() {
        let cluster = MockCluster::at_height(10);
        cluster.node1.fail_submission(2, "replacement transaction underpriced");
        let orchestrator = orchestrator(&cluster);
        let amount = parse_positive_ether("0.05").expect("amount");

        let started = Instant::now();
        let report =
            orchestrator.submit_batch(5, RECIPIENT, amount, &CancellationToken::new()).await;

        assert_eq!(report.attempted(), 5);
        assert_eq!(report.succeeded(), 4);
        assert!(report.outcomes[1].is_err());
        assert!(!report.cancelled);
        assert_eq!(cluster.node1.submission_attempts(), 5);
        // Four gaps of two seconds between five submissions.
        assert!(started.elapsed() >= Duration::from_secs(8));
    }

    #[tokio::test(start_paused = true)]
    async fn cancelled_batch_stops_early() {
        let cluster = MockCluster::at_height(10);
        let orchestrator = orchestrator(&cluster);
        let cancel = CancellationToken::new();
        cancel.cancel();

        let report = orchestrator.submit_batch(5, RECIPIENT, U256::from(1u64), &cancel).await;
        assert!(report.cancelled);
        assert_eq!(report.attempted(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn receipt_found_within_attempts() {
        let cluster = MockCluster::at_height(1);
        cluster.node1.include_after_polls(Some(9));
        let orchestrator = orchestrator(&cluster);

        let tx_hash =
            orchestrator.submit_default(RECIPIENT, U256::from(1u64)).await.expect("submitted");
        let receipt = orchestrator
            .await_inclusion(tx_hash, 30, &CancellationToken::new())
            .await
            .expect("mined");

        assert_eq!(receipt.tx_hash, tx_hash);
        assert_eq!(receipt.block_number.as_u64(), 2);
        assert_eq!(cluster.node1.receipt_polls(), 10);
    }

    #[tokio::test(start_paused = true)]
    async fn never_included_reports_not_mined() {
        let cluster = MockCluster::at_height(1);
        cluster.node1.include_after_polls(None);
        let orchestrator = orchestrator(&cluster);

        let tx_hash =
            orchestrator.submit_default(RECIPIENT, U256::from(1u64)).await.expect("submitted");
        let err = orchestrator
            .await_inclusion(tx_hash, 30, &CancellationToken::new())
            .await
            .unwrap_err();

        assert_eq!(err, TxError::NotMined { tx_hash, attempts: 30 });
        assert_eq!(cluster.node1.receipt_polls(), 30);
    }

    #[tokio::test(start_paused = true)]
    async fn balances_mark_offline_nodes() {
        let cluster = MockCluster::at_height(1);
        let orchestrator = orchestrator(&cluster);
        let address = orchestrator.sender_address();
        cluster.node1.set_balance(address, U256::from(7u64));
        cluster.node3.set_online(false);

        let readings = orchestrator.print_balances(address).await.expect("registry open");
        assert_eq!(readings[0].1, BalanceReading::Wei(U256::from(7u64)));
        assert_eq!(readings[1].1, BalanceReading::Wei(U256::ZERO));
        assert_eq!(readings[2].1, BalanceReading::Offline);
    }
}
