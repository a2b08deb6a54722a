use std::{
    fmt,
    sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
    },
};

use faultline_types::{
    Height, LivenessStatus, NodeName, NodeRole, TransactionReceipt,
    aliases::{Address, BlockHash, Bytes, ChainId, TxHash, U256},
};
use tracing::{debug, warn};

use crate::{
    client::RpcClient,
    config::{NodeConfig, NodeEndpoint},
    error::NodeError,
    eth_rpc::EthRpc,
};

/// Capability over one node's RPC endpoint.
///
/// Shared read-only by every component; only [`NodeHandle::close`] changes its state, after
/// which every fallible call returns [`NodeError::Closed`].
pub struct NodeHandle {
    name: NodeName,
    role: NodeRole,
    endpoint: Option<NodeEndpoint>,
    rpc: Arc<dyn EthRpc>,
    closed: AtomicBool,
}

impl NodeHandle {
    pub fn new(name: impl Into<NodeName>, role: NodeRole, rpc: Arc<dyn EthRpc>) -> Self {
        Self { name: name.into(), role, endpoint: None, rpc, closed: AtomicBool::new(false) }
    }

    /// Opens the transport described by `config`. No request is sent.
    pub fn open(config: &NodeConfig) -> Result<Self, NodeError> {
        let rpc = RpcClient::connect(config)?;
        Ok(Self {
            name: config.name.clone(),
            role: config.role,
            endpoint: Some(config.endpoint.clone()),
            rpc: Arc::new(rpc),
            closed: AtomicBool::new(false),
        })
    }

    pub fn name(&self) -> &NodeName {
        &self.name
    }

    pub fn role(&self) -> NodeRole {
        self.role
    }

    pub fn endpoint(&self) -> Option<&NodeEndpoint> {
        self.endpoint.as_ref()
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }

    fn rpc(&self) -> Result<&dyn EthRpc, NodeError> {
        if self.is_closed() {
            return Err(NodeError::Closed);
        }
        Ok(self.rpc.as_ref())
    }

    /// Probes the node with `web3_clientVersion`.
    ///
    /// Never fails: any error, including a closed handle, maps to `Offline`.
    pub async fn probe_liveness(&self) -> LivenessStatus {
        let rpc = match self.rpc() {
            Ok(rpc) => rpc,
            Err(_) => return LivenessStatus::Offline,
        };
        match rpc.client_version().await {
            Ok(version) if !version.is_empty() => LivenessStatus::Online,
            Ok(_) => {
                warn!(node = %self.name, "Node returned an empty client version");
                LivenessStatus::Offline
            }
            Err(e) => {
                warn!(node = %self.name, "Node is not responsive: {e}");
                LivenessStatus::Offline
            }
        }
    }

    pub async fn current_height(&self) -> Result<Height, NodeError> {
        self.rpc()?.block_number().await
    }

    /// Hash of the block at `height`; [`NodeError::NotFound`] if the node has not reached it.
    pub async fn block_hash(&self, height: Height) -> Result<BlockHash, NodeError> {
        match self.rpc()?.block_by_number(height).await? {
            Some(header) => Ok(header.hash),
            None => Err(NodeError::NotFound(format!("block #{height} on {}", self.name))),
        }
    }

    pub async fn peer_count(&self) -> Result<u64, NodeError> {
        self.rpc()?.peer_count().await
    }

    /// Chain identifier. Unobtainable means the topology is misconfigured.
    pub async fn chain_id(&self) -> Result<ChainId, NodeError> {
        self.rpc()?.chain_id().await.map_err(|e| match e {
            NodeError::Closed => NodeError::Closed,
            other => NodeError::Configuration(format!(
                "unable to fetch chain id from {}: {other}",
                self.name
            )),
        })
    }

    /// Next sequence number of `address`, counting transactions still in the pool.
    pub async fn pending_nonce(&self, address: Address) -> Result<u64, NodeError> {
        self.rpc()?.pending_transaction_count(address).await
    }

    /// Balance in wei at the latest block.
    pub async fn balance(&self, address: Address) -> Result<U256, NodeError> {
        self.rpc()?.balance(address).await
    }

    pub async fn submit_raw_transaction(&self, payload: Bytes) -> Result<TxHash, NodeError> {
        self.rpc()?.send_raw_transaction(payload).await
    }

    /// `None` while the transaction is pending.
    pub async fn receipt(&self, tx_hash: TxHash) -> Result<Option<TransactionReceipt>, NodeError> {
        self.rpc()?.transaction_receipt(tx_hash).await
    }

    /// Releases the transport. Only the first call reaches it; later calls are no-ops.
    pub async fn close(&self) -> Result<(), NodeError> {
        if self.closed.swap(true, Ordering::AcqRel) {
            debug!(node = %self.name, "Connection already closed");
            return Ok(());
        }
        self.rpc.close().await
    }
}

impl fmt::Debug for NodeHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NodeHandle")
            .field("name", &self.name)
            .field("role", &self.role)
            .field("endpoint", &self.endpoint)
            .field("closed", &self.is_closed())
            .finish_non_exhaustive()
    }
}
