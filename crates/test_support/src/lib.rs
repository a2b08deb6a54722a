//! Shared helpers used by faultline's integration and unit tests.
//!
//! [`MockNode`] stands in for a live node process: heights, hashes, receipts and failures
//! are scripted by the test, and every [`EthRpc`] call is answered from that script.

use std::{
    collections::{BTreeMap, HashMap},
    sync::{Arc, Mutex, MutexGuard},
    time::Duration,
};

use alloy_primitives::{B256, keccak256};
use async_trait::async_trait;
use faultline_rpc::{EthRpc, NodeError, NodeHandle, NodeRegistry};
use faultline_types::{
    Height, NodeRole, TransactionReceipt,
    aliases::{Address, BlockHash, Bytes, ChainId, TxHash, U256},
    block::BlockHeader,
};

pub const MOCK_CHAIN_ID: ChainId = 2025;

/// Deterministic hash of the canonical block at `height`.
pub fn canonical_hash(height: u64) -> BlockHash {
    B256::left_padding_from(&height.to_be_bytes())
}

#[derive(Debug)]
struct PendingReceipt {
    receipt: TransactionReceipt,
    polls_left: usize,
}

#[derive(Debug)]
struct State {
    online: bool,
    height: u64,
    forked_hashes: BTreeMap<u64, BlockHash>,
    peer_count: u64,
    chain_id: Option<ChainId>,
    next_nonce: u64,
    balances: HashMap<Address, U256>,
    // Each read of the height advances toward the target by `step`.
    catch_up: Option<(u64, u64)>,
    height_read_failures: usize,
    height_latency: Option<Duration>,
    height_reads: usize,
    blocks_per_submission: u64,
    submissions: Vec<Bytes>,
    submission_attempts: usize,
    failing_attempts: HashMap<usize, String>,
    receipt_delay: Option<usize>,
    receipts: HashMap<TxHash, PendingReceipt>,
    receipt_polls: usize,
    followers: Vec<MockNode>,
    close_calls: usize,
    close_failure: Option<NodeError>,
}

impl Default for State {
    fn default() -> Self {
        Self {
            online: true,
            height: 0,
            forked_hashes: BTreeMap::new(),
            peer_count: 2,
            chain_id: Some(MOCK_CHAIN_ID),
            next_nonce: 0,
            balances: HashMap::new(),
            catch_up: None,
            height_read_failures: 0,
            height_latency: None,
            height_reads: 0,
            blocks_per_submission: 1,
            submissions: Vec::new(),
            submission_attempts: 0,
            failing_attempts: HashMap::new(),
            receipt_delay: Some(0),
            receipts: HashMap::new(),
            receipt_polls: 0,
            followers: Vec::new(),
            close_calls: 0,
            close_failure: None,
        }
    }
}

/// Scriptable stand-in for one node. Clones share state.
#[derive(Debug, Clone, Default)]
pub struct MockNode {
    state: Arc<Mutex<State>>,
}

impl MockNode {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn at_height(height: u64) -> Self {
        let node = Self::new();
        node.set_height(height);
        node
    }

    fn state(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap()
    }

    pub fn set_online(&self, online: bool) {
        self.state().online = online;
    }

    pub fn is_online(&self) -> bool {
        self.state().online
    }

    pub fn set_height(&self, height: u64) {
        self.state().height = height;
    }

    pub fn height(&self) -> u64 {
        self.state().height
    }

    /// Reports `hash` instead of the canonical hash at `height`.
    pub fn set_hash(&self, height: u64, hash: BlockHash) {
        self.state().forked_hashes.insert(height, hash);
    }

    pub fn set_peer_count(&self, peers: u64) {
        self.state().peer_count = peers;
    }

    /// `None` makes `eth_chainId` fail.
    pub fn set_chain_id(&self, chain_id: Option<ChainId>) {
        self.state().chain_id = chain_id;
    }

    pub fn set_balance(&self, address: Address, wei: U256) {
        self.state().balances.insert(address, wei);
    }

    pub fn set_next_nonce(&self, nonce: u64) {
        self.state().next_nonce = nonce;
    }

    /// Every height read moves `step` blocks closer to `target`.
    pub fn catch_up_to(&self, target: u64, step: u64) {
        self.state().catch_up = Some((target, step.max(1)));
    }

    /// The next `count` height reads fail although the node still answers probes.
    pub fn fail_height_reads(&self, count: usize) {
        self.state().height_read_failures = count;
    }

    /// `eth_blockNumber` answers only after `latency`, while liveness checks stay instant.
    pub fn set_height_latency(&self, latency: Option<Duration>) {
        self.state().height_latency = latency;
    }

    pub fn height_reads(&self) -> usize {
        self.state().height_reads
    }

    pub fn set_blocks_per_submission(&self, blocks: u64) {
        self.state().blocks_per_submission = blocks;
    }

    /// Rejects the `attempt`-th submission (1-based) with `message`.
    pub fn fail_submission(&self, attempt: usize, message: &str) {
        self.state().failing_attempts.insert(attempt, message.to_string());
    }

    pub fn submissions(&self) -> Vec<Bytes> {
        self.state().submissions.clone()
    }

    pub fn submission_attempts(&self) -> usize {
        self.state().submission_attempts
    }

    /// Receipts appear after `polls` unsuccessful lookups; `None` never includes anything.
    pub fn include_after_polls(&self, polls: Option<usize>) {
        self.state().receipt_delay = polls;
    }

    pub fn receipt_polls(&self) -> usize {
        self.state().receipt_polls
    }

    /// Nodes whose height advances with this node's submissions while they are online.
    pub fn link(&self, followers: &[MockNode]) {
        self.state().followers.extend(followers.iter().cloned());
    }

    pub fn fail_close_with(&self, error: NodeError) {
        self.state().close_failure = Some(error);
    }

    pub fn close_calls(&self) -> usize {
        self.state().close_calls
    }

    pub fn handle(&self, name: &str, role: NodeRole) -> NodeHandle {
        NodeHandle::new(name, role, Arc::new(self.clone()))
    }

    fn ensure_online(&self) -> Result<(), NodeError> {
        if self.state().online {
            Ok(())
        } else {
            Err(NodeError::Unreachable("connection refused".into()))
        }
    }

    fn hash_at(state: &State, height: u64) -> BlockHash {
        state.forked_hashes.get(&height).copied().unwrap_or_else(|| canonical_hash(height))
    }
}

#[async_trait]
impl EthRpc for MockNode {
    async fn client_version(&self) -> Result<String, NodeError> {
        self.ensure_online()?;
        Ok("MockGeth/v1.13.15-stable/linux-amd64".to_string())
    }

    async fn block_number(&self) -> Result<Height, NodeError> {
        self.ensure_online()?;
        let latency = self.state().height_latency;
        if let Some(latency) = latency {
            tokio::time::sleep(latency).await;
        }
        let mut state = self.state();
        state.height_reads += 1;
        if state.height_read_failures > 0 {
            state.height_read_failures -= 1;
            return Err(NodeError::Unreachable("read timed out".into()));
        }
        if let Some((target, step)) = state.catch_up {
            state.height = (state.height + step).min(target);
            if state.height >= target {
                state.catch_up = None;
            }
        }
        Ok(Height::new(state.height))
    }

    async fn block_by_number(&self, height: Height) -> Result<Option<BlockHeader>, NodeError> {
        self.ensure_online()?;
        let state = self.state();
        if height.as_u64() > state.height {
            return Ok(None);
        }
        Ok(Some(BlockHeader { number: height, hash: Self::hash_at(&state, height.as_u64()) }))
    }

    async fn peer_count(&self) -> Result<u64, NodeError> {
        self.ensure_online()?;
        Ok(self.state().peer_count)
    }

    async fn chain_id(&self) -> Result<ChainId, NodeError> {
        self.ensure_online()?;
        self.state().chain_id.ok_or_else(|| NodeError::Rpc {
            code: -32601,
            message: "the method eth_chainId does not exist/is not available".into(),
        })
    }

    async fn pending_transaction_count(&self, _address: Address) -> Result<u64, NodeError> {
        self.ensure_online()?;
        Ok(self.state().next_nonce)
    }

    async fn balance(&self, address: Address) -> Result<U256, NodeError> {
        self.ensure_online()?;
        Ok(self.state().balances.get(&address).copied().unwrap_or_default())
    }

    async fn send_raw_transaction(&self, payload: Bytes) -> Result<TxHash, NodeError> {
        self.ensure_online()?;
        let (tx_hash, blocks, followers) = {
            let mut state = self.state();
            state.submission_attempts += 1;
            let attempt = state.submission_attempts;
            if let Some(message) = state.failing_attempts.remove(&attempt) {
                return Err(NodeError::Rpc { code: -32000, message });
            }

            let tx_hash = keccak256(&payload);
            state.submissions.push(payload);
            state.next_nonce += 1;
            let blocks = state.blocks_per_submission;
            state.height += blocks;
            let block_number = state.height;
            if let Some(polls_left) = state.receipt_delay {
                let receipt = TransactionReceipt {
                    tx_hash,
                    block_number: Height::new(block_number),
                    block_hash: Self::hash_at(&state, block_number),
                    success: true,
                    gas_used: 21_000,
                };
                state.receipts.insert(tx_hash, PendingReceipt { receipt, polls_left });
            }
            (tx_hash, blocks, state.followers.clone())
        };

        for follower in followers {
            let mut state = follower.state();
            if state.online {
                state.height += blocks;
            }
        }
        Ok(tx_hash)
    }

    async fn transaction_receipt(
        &self,
        tx_hash: TxHash,
    ) -> Result<Option<TransactionReceipt>, NodeError> {
        self.ensure_online()?;
        let mut state = self.state();
        state.receipt_polls += 1;
        match state.receipts.get_mut(&tx_hash) {
            Some(pending) if pending.polls_left == 0 => Ok(Some(pending.receipt.clone())),
            Some(pending) => {
                pending.polls_left -= 1;
                Ok(None)
            }
            None => Ok(None),
        }
    }

    async fn close(&self) -> Result<(), NodeError> {
        let mut state = self.state();
        state.close_calls += 1;
        match state.close_failure.take() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}

/// The reference three-node topology backed by mocks: `node1` validator, `node2` full,
/// `node3` recovery. Submissions through `node1` advance every online node.
#[derive(Debug, Clone)]
pub struct MockCluster {
    pub node1: MockNode,
    pub node2: MockNode,
    pub node3: MockNode,
}

impl MockCluster {
    pub fn at_height(height: u64) -> Self {
        let cluster = Self {
            node1: MockNode::at_height(height),
            node2: MockNode::at_height(height),
            node3: MockNode::at_height(height),
        };
        cluster.node1.link(&[cluster.node2.clone(), cluster.node3.clone()]);
        cluster
    }

    pub fn nodes(&self) -> [(&'static str, NodeRole, &MockNode); 3] {
        [
            ("node1", NodeRole::Validator, &self.node1),
            ("node2", NodeRole::Full, &self.node2),
            ("node3", NodeRole::Recovery, &self.node3),
        ]
    }

    pub fn registry(&self) -> Arc<NodeRegistry> {
        let handles =
            self.nodes().iter().map(|(name, role, node)| node.handle(name, *role)).collect();
        Arc::new(NodeRegistry::new(handles).unwrap())
    }

    pub fn node(&self, name: &str) -> &MockNode {
        match name {
            "node1" => &self.node1,
            "node2" => &self.node2,
            "node3" => &self.node3,
            other => panic!("no mock node named {other}"),
        }
    }
}
