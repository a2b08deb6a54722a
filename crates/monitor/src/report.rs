use std::sync::Arc;

use faultline_rpc::{NodeError, NodeHandle, RegistryError};
use faultline_types::{Height, LivenessStatus, NodeName, NodeRole};
use tracing::{info, warn};

use crate::monitor::{ConsistencyMonitor, log_sync_status, probe_all};

/// Connection details of one node at the time of the report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeDetails {
    pub name: NodeName,
    pub role: NodeRole,
    pub status: LivenessStatus,
    pub height: Option<Height>,
    pub peers: Option<u64>,
    /// Why height or peers are missing although the node is online.
    pub detail_error: Option<String>,
}

impl NodeDetails {
    fn offline(handle: &NodeHandle) -> Self {
        Self {
            name: handle.name().clone(),
            role: handle.role(),
            status: LivenessStatus::Offline,
            height: None,
            peers: None,
            detail_error: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NetworkStatus {
    pub nodes: Vec<NodeDetails>,
}

impl NetworkStatus {
    pub fn online_count(&self) -> usize {
        self.nodes.iter().filter(|n| n.status.is_online()).count()
    }

    pub fn status_of(&self, name: &str) -> Option<LivenessStatus> {
        self.nodes.iter().find(|n| n.name.as_str() == name).map(|n| n.status)
    }
}

impl ConsistencyMonitor {
    /// Per node: liveness, and for online nodes their height and peer count.
    ///
    /// Nodes are queried concurrently; a slow node delays only its own row.
    pub async fn network_status(&self) -> Result<NetworkStatus, RegistryError> {
        let handles = self.registry().handles()?;
        let nodes = probe_all(handles, node_details, |handle, reason| NodeDetails {
            detail_error: Some(reason),
            ..NodeDetails::offline(handle)
        })
        .await;
        Ok(NetworkStatus { nodes: nodes.into_iter().map(|(_, details)| details).collect() })
    }

    /// Logs the connection table followed by the synchronization table.
    pub async fn print_network_status(&self) -> Result<NetworkStatus, RegistryError> {
        let status = self.network_status().await?;
        info!("========== Node Connection Status ==========");
        for node in &status.nodes {
            info!("{} ({}): {}", node.name.label(), node.role, node.status);
            match (&node.height, &node.peers, &node.detail_error) {
                (Some(height), Some(peers), _) => {
                    info!("  Block Number: {height}");
                    info!("  Peer Count: {peers}");
                }
                (_, _, Some(reason)) => warn!("  Unable to fetch details: {reason}"),
                _ => {}
            }
        }
        info!("============================================");

        let snapshot = self.height_snapshot().await?;
        log_sync_status(&snapshot);
        Ok(status)
    }
}

async fn node_details(handle: Arc<NodeHandle>) -> NodeDetails {
    let status = handle.probe_liveness().await;
    let mut details = NodeDetails { status, ..NodeDetails::offline(&handle) };
    if !status.is_online() {
        return details;
    }
    let fetched = async {
        let height = handle.current_height().await?;
        let peers = handle.peer_count().await?;
        Ok::<_, NodeError>((height, peers))
    };
    match fetched.await {
        Ok((height, peers)) => {
            details.height = Some(height);
            details.peers = Some(peers);
        }
        Err(e) => details.detail_error = Some(e.to_string()),
    }
    details
}
