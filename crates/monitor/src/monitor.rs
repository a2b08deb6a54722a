use std::{
    future::Future,
    sync::{Arc, Mutex},
    time::Duration,
};

use faultline_rpc::{NodeError, NodeHandle, NodeRegistry, RegistryError};
use faultline_types::{
    ConsistencyVerdict, Exclusion, Height, HeightReading, LivenessStatus, NodeName, SyncSnapshot,
    constants::DEFAULT_POLL_INTERVAL_MS,
};
use tokio::time::{Instant, sleep, sleep_until};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crate::watch::{Anomaly, ChainWatch};

/// Liveness of every registered node, in registry order.
pub type StatusSnapshot = Vec<(NodeName, LivenessStatus)>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MonitorConfig {
    /// Interval between two convergence polls.
    pub poll_interval: Duration,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self { poll_interval: Duration::from_millis(DEFAULT_POLL_INTERVAL_MS) }
    }
}

/// How [`ConsistencyMonitor::await_synchronization`] ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncWait {
    Converged(SyncSnapshot),
    /// The timeout elapsed. Not an error: the caller decides whether it is fatal.
    TimedOut(SyncSnapshot),
    Cancelled,
}

impl SyncWait {
    pub fn converged(&self) -> bool {
        matches!(self, Self::Converged(_))
    }

    /// Last snapshot taken, if the wait was not cancelled.
    pub fn snapshot(&self) -> Option<&SyncSnapshot> {
        match self {
            Self::Converged(s) | Self::TimedOut(s) => Some(s),
            Self::Cancelled => None,
        }
    }
}

/// Polls the registry for heights and hashes and classifies the cluster.
#[derive(Debug)]
pub struct ConsistencyMonitor {
    registry: Arc<NodeRegistry>,
    config: MonitorConfig,
    watch: Mutex<ChainWatch>,
    anomalies: Mutex<Vec<Anomaly>>,
}

impl ConsistencyMonitor {
    pub fn new(registry: Arc<NodeRegistry>, config: MonitorConfig) -> Self {
        Self {
            registry,
            config,
            watch: Mutex::new(ChainWatch::new()),
            anomalies: Mutex::new(Vec::new()),
        }
    }

    pub fn registry(&self) -> &Arc<NodeRegistry> {
        &self.registry
    }

    pub fn config(&self) -> &MonitorConfig {
        &self.config
    }

    /// Probes every node independently and concurrently; a slow node delays only its own
    /// entry.
    pub async fn status_snapshot(&self) -> Result<StatusSnapshot, RegistryError> {
        let handles = self.registry.handles()?;
        Ok(probe_all(
            handles,
            |handle| async move { handle.probe_liveness().await },
            |_, _| LivenessStatus::Offline,
        )
        .await)
    }

    /// Heights of every node. A failed height fetch after a positive probe counts as
    /// unavailable for this snapshot.
    pub async fn height_snapshot(&self) -> Result<SyncSnapshot, RegistryError> {
        let handles = self.registry.handles()?;
        let readings = probe_all(handles, read_height, |_, _| HeightReading::Unavailable).await;

        let mut snapshot = SyncSnapshot::new();
        for (name, reading) in readings {
            snapshot.record(name, reading);
        }
        self.record_anomalies(|watch| watch.observe_snapshot(&snapshot));
        Ok(snapshot)
    }

    /// `true` iff every available height is equal. Vacuously true below two available
    /// nodes.
    pub fn is_synchronized(snapshot: &SyncSnapshot) -> bool {
        let mut available = snapshot.available();
        let Some((reference_node, reference)) = available.next() else {
            return true;
        };
        for (node, height) in available {
            if height != reference {
                warn!(
                    node = %node,
                    %height,
                    reference_node = %reference_node,
                    expected = %reference,
                    "Sync mismatch"
                );
                return false;
            }
        }
        true
    }

    /// Polls until every online node reports the same height, the timeout elapses, or
    /// `cancel` fires.
    ///
    /// Returns no later than `timeout` plus one poll interval, even while a snapshot is in
    /// flight. An interrupted snapshot is discarded in favour of the last completed one.
    pub async fn await_synchronization(
        &self,
        timeout: Duration,
        cancel: &CancellationToken,
    ) -> Result<SyncWait, RegistryError> {
        info!("Waiting for nodes to synchronize (max {} seconds)...", timeout.as_secs());
        let deadline = Instant::now() + timeout;
        let hard_stop = deadline + self.config.poll_interval;
        let mut last = None;

        loop {
            let snapshot = tokio::select! {
                biased;
                _ = cancel.cancelled() => {
                    warn!("Synchronization wait cancelled");
                    return Ok(SyncWait::Cancelled);
                }
                _ = sleep_until(hard_stop) => {
                    warn!("Nodes did not synchronize within {} seconds", timeout.as_secs());
                    let snapshot = match last {
                        Some(snapshot) => snapshot,
                        None => self.unavailable_snapshot(),
                    };
                    log_sync_status(&snapshot);
                    return Ok(SyncWait::TimedOut(snapshot));
                }
                snapshot = self.height_snapshot() => snapshot?,
            };

            if Self::is_synchronized(&snapshot) {
                info!("All online nodes are synchronized");
                log_sync_status(&snapshot);
                return Ok(SyncWait::Converged(snapshot));
            }

            let now = Instant::now();
            if now >= deadline {
                warn!("Nodes did not synchronize within {} seconds", timeout.as_secs());
                log_sync_status(&snapshot);
                return Ok(SyncWait::TimedOut(snapshot));
            }
            last = Some(snapshot);

            let pause = self.config.poll_interval.min(deadline - now);
            tokio::select! {
                _ = sleep(pause) => {}
                _ = cancel.cancelled() => {
                    warn!("Synchronization wait cancelled");
                    return Ok(SyncWait::Cancelled);
                }
            }
        }
    }

    /// Every registered node marked unavailable.
    fn unavailable_snapshot(&self) -> SyncSnapshot {
        self.registry.names().into_iter().fold(SyncSnapshot::new(), |snapshot, name| {
            snapshot.with(name, HeightReading::Unavailable)
        })
    }

    /// Compares the hashes of block `height` across online nodes that have it.
    ///
    /// Offline nodes and nodes that have not reached `height` are excluded rather than
    /// counted as mismatches.
    pub async fn verify_hash_consistency(
        &self,
        height: Height,
    ) -> Result<ConsistencyVerdict, RegistryError> {
        info!("========== Verifying Block #{height} Hash Consistency ==========");
        let handles = self.registry.handles()?;
        let observations = probe_all(
            handles,
            move |handle| async move { fetch_hash(&handle, height).await },
            |_, e| Err(Exclusion::Failed(e)),
        )
        .await;

        let mut hashes = Vec::new();
        let mut excluded = Vec::new();
        for (name, observation) in observations {
            match observation {
                Ok(hash) => {
                    info!("{}: {hash}", name.label());
                    hashes.push((name, hash));
                }
                Err(exclusion) => {
                    match &exclusion {
                        Exclusion::Offline => info!("{}: OFFLINE", name.label()),
                        Exclusion::BlockNotFound => warn!("{}: Block not found", name.label()),
                        Exclusion::Failed(reason) => {
                            error!("Failed to get block from {name}: {reason}")
                        }
                    }
                    excluded.push((name, exclusion));
                }
            }
        }

        let verdict = ConsistencyVerdict::evaluate(height, hashes, excluded);
        if !verdict.is_consistent() {
            error!("Inconsistency detected in block hashes");
        } else if verdict.is_degenerate() {
            warn!("Fewer than two nodes could be compared; {verdict}");
        } else {
            info!("All block hashes are consistent");
        }
        self.record_anomalies(|watch| watch.observe_verdict(&verdict));
        Ok(verdict)
    }

    /// Logs the current height of every node.
    pub async fn print_sync_status(&self) -> Result<SyncSnapshot, RegistryError> {
        let snapshot = self.height_snapshot().await?;
        log_sync_status(&snapshot);
        Ok(snapshot)
    }

    /// Every anomaly flagged since construction.
    pub fn anomalies(&self) -> Vec<Anomaly> {
        self.anomalies.lock().map(|a| a.clone()).unwrap_or_default()
    }

    fn record_anomalies(&self, observe: impl FnOnce(&mut ChainWatch) -> Vec<Anomaly>) {
        let Ok(mut watch) = self.watch.lock() else {
            return;
        };
        let found = observe(&mut watch);
        for anomaly in &found {
            match anomaly {
                Anomaly::HeightRegressed { node, previous, current } => {
                    warn!(node = %node, %previous, %current, "Node height went backwards");
                }
                Anomaly::HashChanged { node, height, agreed, reported } => {
                    warn!(node = %node, %height, %agreed, %reported, "Agreed block hash changed");
                }
            }
        }
        if !found.is_empty() &&
            let Ok(mut anomalies) = self.anomalies.lock()
        {
            anomalies.extend(found);
        }
    }
}

/// Logs a sync snapshot as one line per node.
pub fn log_sync_status(snapshot: &SyncSnapshot) {
    info!("========== Blockchain Synchronization Status ==========");
    for (name, reading) in snapshot.iter() {
        info!("{}: {reading}", name.label());
    }
    info!("=======================================================");
}

async fn read_height(handle: Arc<NodeHandle>) -> HeightReading {
    if !handle.probe_liveness().await.is_online() {
        return HeightReading::Unavailable;
    }
    match handle.current_height().await {
        Ok(height) => HeightReading::Available(height),
        Err(e) => {
            warn!(node = %handle.name(), "Failed to get block number: {e}");
            HeightReading::Unavailable
        }
    }
}

async fn fetch_hash(
    handle: &NodeHandle,
    height: Height,
) -> Result<faultline_types::aliases::BlockHash, Exclusion> {
    if !handle.probe_liveness().await.is_online() {
        return Err(Exclusion::Offline);
    }
    handle.block_hash(height).await.map_err(|e| match e {
        NodeError::NotFound(_) => Exclusion::BlockNotFound,
        other => Exclusion::Failed(other.to_string()),
    })
}

/// Runs `probe` against every handle on its own task and collects the results in
/// registry order. A task that dies yields `on_panic`.
pub(crate) async fn probe_all<T, F, Fut>(
    handles: Vec<Arc<NodeHandle>>,
    probe: F,
    on_panic: impl Fn(&NodeHandle, String) -> T,
) -> Vec<(NodeName, T)>
where
    T: Send + 'static,
    F: Fn(Arc<NodeHandle>) -> Fut,
    Fut: Future<Output = T> + Send + 'static,
{
    let tasks: Vec<_> = handles
        .into_iter()
        .map(|handle| (handle.clone(), tokio::spawn(probe(handle))))
        .collect();

    let mut results = Vec::with_capacity(tasks.len());
    for (handle, task) in tasks {
        let result = match task.await {
            Ok(value) => value,
            Err(e) => {
                debug!(node = %handle.name(), "Probe task failed: {e}");
                on_panic(&handle, e.to_string())
            }
        };
        results.push((handle.name().clone(), result));
    }
    results
}
