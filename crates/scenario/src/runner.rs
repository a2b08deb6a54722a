use std::{sync::Arc, time::Duration};

use color_eyre::eyre::{Result, WrapErr};
use faultline_monitor::{ConsistencyMonitor, SyncWait, log_sync_status};
use faultline_tx::{TransactionOrchestrator, TxError};
use faultline_types::{ConsistencyVerdict, Height, HeightReading, LivenessStatus};
use tokio::time::{sleep, timeout};
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

use crate::{
    command::{Command, Scenario},
    config::ScenarioConfig,
    error::ScenarioError,
    report::{
        CommandOutcome, DegradedReport, InitialSyncReport, IsolationReport, NodeDelta,
        RecoveryReport, ScenarioReport,
    },
    signal::OperatorSignal,
};

/// Drives the experiments over a monitor and an orchestrator sharing one registry.
pub struct ScenarioRunner {
    monitor: Arc<ConsistencyMonitor>,
    orchestrator: Arc<TransactionOrchestrator>,
    signal: Arc<dyn OperatorSignal>,
    config: ScenarioConfig,
}

impl ScenarioRunner {
    pub fn new(
        monitor: Arc<ConsistencyMonitor>,
        orchestrator: Arc<TransactionOrchestrator>,
        signal: Arc<dyn OperatorSignal>,
        config: ScenarioConfig,
    ) -> Self {
        Self { monitor, orchestrator, signal, config }
    }

    pub fn monitor(&self) -> &Arc<ConsistencyMonitor> {
        &self.monitor
    }

    pub fn orchestrator(&self) -> &Arc<TransactionOrchestrator> {
        &self.orchestrator
    }

    pub fn config(&self) -> &ScenarioConfig {
        &self.config
    }

    /// Runs one menu command. Failures are logged and swallowed so the caller's command
    /// loop keeps going; `None` means the command did not complete.
    pub async fn dispatch(
        &self,
        command: Command,
        cancel: &CancellationToken,
    ) -> Option<CommandOutcome> {
        match self.execute(command, cancel).await {
            Ok(outcome) => Some(outcome),
            Err(e) if is_cancellation(&e) => {
                warn!("{} interrupted: {e}", command.label());
                None
            }
            Err(e) => {
                error!("{} failed: {e:?}", command.label());
                None
            }
        }
    }

    /// Runs one menu command, propagating its failure.
    pub async fn execute(
        &self,
        command: Command,
        cancel: &CancellationToken,
    ) -> Result<CommandOutcome> {
        match command {
            Command::Run(scenario) => {
                Ok(CommandOutcome::Scenario(self.run(scenario, cancel).await?))
            }
            Command::RunAll => Ok(CommandOutcome::RunAll(self.run_all(cancel).await?)),
            Command::Status => Ok(CommandOutcome::Status(
                self.monitor
                    .print_network_status()
                    .await
                    .wrap_err("Failed to read network status")?,
            )),
            Command::VerifyImmutability => {
                Ok(CommandOutcome::Verified(self.verify_immutability(None).await?))
            }
            Command::Exit => Ok(CommandOutcome::Exit),
        }
    }

    pub async fn run(
        &self,
        scenario: Scenario,
        cancel: &CancellationToken,
    ) -> Result<ScenarioReport> {
        info!("========== {scenario} ==========");
        let report = match scenario {
            Scenario::InitialSync => ScenarioReport::InitialSync(self.initial_sync(cancel).await?),
            Scenario::NodeIsolation => ScenarioReport::Isolation(self.isolate_node(cancel).await?),
            Scenario::DegradedTransactions => {
                ScenarioReport::Degraded(self.degraded_transactions(cancel).await?)
            }
            Scenario::Recovery => ScenarioReport::Recovery(self.recover_node(cancel).await?),
        };
        info!("========== {scenario} completed ==========");
        Ok(report)
    }

    /// Runs the four scenarios back to back. The sequence stops at the first failed
    /// scenario since each one starts from the cluster state the previous one left.
    pub async fn run_all(&self, cancel: &CancellationToken) -> Result<Vec<ScenarioReport>> {
        info!("Running full experiment...");
        let mut reports = Vec::with_capacity(Scenario::ALL.len());
        for scenario in Scenario::ALL {
            let report =
                self.run(scenario, cancel).await.wrap_err_with(|| format!("{scenario} failed"))?;
            reports.push(report);
        }
        info!("Full experiment completed.");
        Ok(reports)
    }

    /// Submit one transfer, wait for its inclusion and for the cluster to converge, then
    /// compare block hashes.
    pub async fn initial_sync(&self, cancel: &CancellationToken) -> Result<InitialSyncReport> {
        info!("Step 1: Checking initial network status...");
        self.monitor.print_network_status().await?;

        info!("Step 2: Submitting test transaction...");
        let tx_hash = self
            .orchestrator
            .submit_default(self.config.recipient, self.config.single_amount)
            .await
            .wrap_err("Failed to submit test transaction")?;

        info!("Step 3: Waiting for transaction to be mined...");
        let receipt = self
            .orchestrator
            .await_inclusion(tx_hash, self.config.inclusion_attempts, cancel)
            .await
            .wrap_err_with(|| format!("Transaction {tx_hash} was not confirmed"))?;

        info!("Step 4: Waiting for all nodes to synchronize...");
        let sync = self.await_sync(self.config.sync_timeout, cancel).await?;

        info!("Step 5: Verifying block hash consistency...");
        let verdict = self.verify_immutability(None).await?;

        Ok(InitialSyncReport { tx_hash, receipt, sync, verdict })
    }

    /// Ask the operator to stop the recovery node and confirm it is gone.
    pub async fn isolate_node(&self, cancel: &CancellationToken) -> Result<IsolationReport> {
        let isolated = self.config.recovery_node.clone();
        let before = self.monitor.print_network_status().await?;

        info!("INSTRUCTIONS:");
        info!("1. Open a new terminal");
        info!("2. Navigate to the cluster's compose directory");
        info!("3. Run: {}", self.config.stop_instruction);
        let prompt = format!("Press ENTER when {} is shut down...", isolated.label());
        self.await_operator(&prompt, cancel).await?;
        self.pause(self.config.isolation_settle, cancel).await?;

        info!("Verifying {} is offline...", isolated.label());
        let after = self.monitor.print_network_status().await?;
        let report = IsolationReport { isolated, before, after };
        if report.isolated_status().is_online() {
            warn!(
                "{} is still online; later scenarios assume it is stopped",
                report.isolated.label()
            );
        }
        Ok(report)
    }

    /// Submit a batch with the recovery node stopped and measure how far every remaining
    /// node advanced.
    pub async fn degraded_transactions(
        &self,
        cancel: &CancellationToken,
    ) -> Result<DegradedReport> {
        let isolated = self.config.recovery_node.clone();
        let before = self.monitor.height_snapshot().await?;
        for (name, reading) in before.iter().filter(|(name, _)| **name != isolated) {
            info!("{} Block: {reading}", name.label());
        }

        info!(
            "Submitting {} transactions while {} is offline...",
            self.config.batch_size,
            isolated.label()
        );
        let batch = self
            .orchestrator
            .submit_batch(
                self.config.batch_size,
                self.config.recipient,
                self.config.batch_amount,
                cancel,
            )
            .await;
        if batch.cancelled {
            return Err(ScenarioError::Cancelled.into());
        }

        info!("Waiting for the remaining nodes to synchronize...");
        let sync = self.await_sync(self.config.sync_timeout, cancel).await?;
        let after = self.monitor.height_snapshot().await?;

        let deltas: Vec<NodeDelta> = before
            .iter()
            .filter(|(name, _)| **name != isolated)
            .map(|(name, reading)| NodeDelta {
                node: name.clone(),
                before: *reading,
                after: after.get(name).unwrap_or(HeightReading::Unavailable),
            })
            .collect();

        let answered =
            before.height_of(&isolated).is_some() || after.height_of(&isolated).is_some();
        let isolated_status =
            if answered { LivenessStatus::Online } else { LivenessStatus::Offline };

        info!("========== Results ==========");
        for delta in &deltas {
            info!("{delta}");
        }
        info!("{}: {isolated_status}", isolated.label());
        info!("=============================");
        if isolated_status.is_online() {
            warn!("{} answered during the degraded batch", isolated.label());
        }

        Ok(DegradedReport { isolated, isolated_status, before, after, batch, sync, deltas })
    }

    /// Ask the operator to restart the recovery node, wait for it to catch up and compare
    /// block hashes.
    pub async fn recover_node(&self, cancel: &CancellationToken) -> Result<RecoveryReport> {
        let recovered = self.config.recovery_node.clone();
        info!("Current blockchain state:");
        let before = self.monitor.height_snapshot().await?;
        log_sync_status(&before);

        info!("INSTRUCTIONS:");
        info!("1. Open a new terminal");
        info!("2. Navigate to the cluster's compose directory");
        info!("3. Run: {}", self.config.start_instruction);
        let prompt = format!("Press ENTER when {} is restarted...", recovered.label());
        self.await_operator(&prompt, cancel).await?;
        self.pause(self.config.recovery_settle, cancel).await?;

        info!("Checking network status after restart...");
        let status = self.monitor.print_network_status().await?;

        info!("Waiting for full synchronization...");
        let sync = self.await_sync(self.config.recovery_sync_timeout, cancel).await?;

        info!("Verifying blockchain consistency...");
        let verdict = self.verify_immutability(None).await?;

        Ok(RecoveryReport { recovered, before, status, sync, verdict })
    }

    /// Hash consistency at `height`, or at the reference node's current height.
    pub async fn verify_immutability(&self, height: Option<Height>) -> Result<ConsistencyVerdict> {
        let height = match height {
            Some(height) => height,
            None => {
                let reference = self.config.reference_node.as_str();
                self.monitor
                    .registry()
                    .resolve(reference)?
                    .current_height()
                    .await
                    .wrap_err_with(|| format!("Failed to read the height of {reference}"))?
            }
        };
        Ok(self.monitor.verify_hash_consistency(height).await?)
    }

    async fn await_sync(&self, limit: Duration, cancel: &CancellationToken) -> Result<SyncWait> {
        match self.monitor.await_synchronization(limit, cancel).await? {
            SyncWait::Cancelled => Err(ScenarioError::Cancelled.into()),
            wait => Ok(wait),
        }
    }

    async fn await_operator(
        &self,
        prompt: &str,
        cancel: &CancellationToken,
    ) -> Result<(), ScenarioError> {
        let wait = async {
            match self.config.operator_timeout {
                Some(limit) => match timeout(limit, self.signal.await_proceed(prompt)).await {
                    Ok(result) => result.map_err(ScenarioError::from),
                    Err(_) => Err(ScenarioError::OperatorTimeout(limit)),
                },
                None => self.signal.await_proceed(prompt).await.map_err(ScenarioError::from),
            }
        };
        tokio::select! {
            result = wait => result,
            _ = cancel.cancelled() => Err(ScenarioError::Cancelled),
        }
    }

    async fn pause(
        &self,
        duration: Duration,
        cancel: &CancellationToken,
    ) -> Result<(), ScenarioError> {
        tokio::select! {
            _ = sleep(duration) => Ok(()),
            _ = cancel.cancelled() => Err(ScenarioError::Cancelled),
        }
    }
}

fn is_cancellation(report: &color_eyre::eyre::Report) -> bool {
    report.chain().any(|cause| {
        matches!(cause.downcast_ref::<ScenarioError>(), Some(ScenarioError::Cancelled)) ||
            matches!(cause.downcast_ref::<TxError>(), Some(TxError::Cancelled))
    })
}

impl std::fmt::Debug for ScenarioRunner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScenarioRunner").field("config", &self.config).finish_non_exhaustive()
    }
}

