use async_trait::async_trait;
use faultline_types::{
    Height, TransactionReceipt,
    aliases::{Address, Bytes, ChainId, TxHash, U256},
    block::BlockHeader,
};

use crate::error::NodeError;

/// The standard Ethereum JSON-RPC calls the harness issues against one node.
///
/// Each call is an independent request/response, independently fallible.
#[async_trait]
pub trait EthRpc: Send + Sync {
    /// Corresponds to the `web3_clientVersion` RPC method.
    async fn client_version(&self) -> Result<String, NodeError>;

    /// Corresponds to the `eth_blockNumber` RPC method.
    async fn block_number(&self) -> Result<Height, NodeError>;

    /// Corresponds to the `eth_getBlockByNumber` RPC method.
    /// `None` when the node has no block at `height`.
    async fn block_by_number(&self, height: Height) -> Result<Option<BlockHeader>, NodeError>;

    /// Corresponds to the `net_peerCount` RPC method.
    async fn peer_count(&self) -> Result<u64, NodeError>;

    /// Corresponds to the `eth_chainId` RPC method.
    async fn chain_id(&self) -> Result<ChainId, NodeError>;

    /// Corresponds to `eth_getTransactionCount` at the `pending` tag.
    async fn pending_transaction_count(&self, address: Address) -> Result<u64, NodeError>;

    /// Corresponds to `eth_getBalance` at the `latest` tag, in wei.
    async fn balance(&self, address: Address) -> Result<U256, NodeError>;

    /// Corresponds to the `eth_sendRawTransaction` RPC method.
    async fn send_raw_transaction(&self, payload: Bytes) -> Result<TxHash, NodeError>;

    /// Corresponds to the `eth_getTransactionReceipt` RPC method.
    /// `None` while the transaction is pending.
    async fn transaction_receipt(
        &self,
        tx_hash: TxHash,
    ) -> Result<Option<TransactionReceipt>, NodeError>;

    /// Releases the connection. Calls made afterwards are undefined for the implementor;
    /// [`crate::NodeHandle`] guards against them.
    async fn close(&self) -> Result<(), NodeError> {
        Ok(())
    }
}
