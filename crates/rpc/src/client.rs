#![allow(missing_docs)]
use std::{fmt, sync::Arc};

use alloy_primitives::U64;
use async_trait::async_trait;
use faultline_types::{
    Height, TransactionReceipt,
    aliases::{Address, BlockHash, Bytes, ChainId, TxHash, U256},
    block::BlockHeader,
};
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use serde_json::json;
use tracing::trace;

use crate::{
    config::{NodeConfig, NodeEndpoint},
    error::NodeError,
    eth_rpc::EthRpc,
    transport::{JsonRpcRequest, Transport, http::HttpTransport, ipc::IpcTransport},
};

pub const WEB3_CLIENT_VERSION: &str = "web3_clientVersion";
pub const ETH_BLOCK_NUMBER: &str = "eth_blockNumber";
pub const ETH_GET_BLOCK_BY_NUMBER: &str = "eth_getBlockByNumber";
pub const NET_PEER_COUNT: &str = "net_peerCount";
pub const ETH_CHAIN_ID: &str = "eth_chainId";
pub const ETH_GET_TRANSACTION_COUNT: &str = "eth_getTransactionCount";
pub const ETH_GET_BALANCE: &str = "eth_getBalance";
pub const ETH_SEND_RAW_TRANSACTION: &str = "eth_sendRawTransaction";
pub const ETH_GET_TRANSACTION_RECEIPT: &str = "eth_getTransactionReceipt";

/// [`EthRpc`] over any [`Transport`].
pub struct RpcClient {
    transport: Arc<dyn Transport>,
}

impl RpcClient {
    pub fn new(transport: impl Transport + 'static) -> Self {
        Self { transport: Arc::new(transport) }
    }

    pub fn from_shared(transport: Arc<dyn Transport>) -> Self {
        Self { transport }
    }

    /// Builds the transport selected by the node's endpoint.
    pub fn connect(config: &NodeConfig) -> Result<Self, NodeError> {
        let client = match &config.endpoint {
            NodeEndpoint::Http(url) => {
                Self::new(HttpTransport::new(url.clone(), config.request_timeout())?)
            }
            NodeEndpoint::Ipc(path) => Self::new(IpcTransport::new(path, config.request_timeout())),
        };
        Ok(client)
    }

    async fn request<P, R>(&self, method: &str, params: P) -> Result<R, NodeError>
    where
        P: Serialize + Send,
        R: DeserializeOwned,
    {
        let req = JsonRpcRequest::new(method, serde_json::to_value(params)?);

        let resp = self.transport.send(&req).await?;
        trace!(method, result = %resp.result, "rpc response");

        if let Some(err) = resp.error {
            return Err(NodeError::Rpc { code: err.code, message: err.message });
        }

        serde_json::from_value(resp.result)
            .map_err(|e| NodeError::InvalidResponse(format!("{method}: {e}")))
    }
}

impl fmt::Debug for RpcClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RpcClient").field("transport", &"<dyn Transport>").finish()
    }
}

/// Block fields read from `eth_getBlockByNumber`. Both are null for pending blocks.
#[derive(Debug, Deserialize)]
struct RpcBlock {
    #[serde(default)]
    number: Option<U64>,
    #[serde(default)]
    hash: Option<BlockHash>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RpcReceipt {
    transaction_hash: TxHash,
    #[serde(default)]
    block_number: Option<U64>,
    #[serde(default)]
    block_hash: Option<BlockHash>,
    #[serde(default)]
    status: Option<U64>,
    #[serde(default)]
    gas_used: Option<U64>,
}

impl RpcReceipt {
    /// Some clients return a receipt skeleton without a block while the transaction is
    /// still pending; that counts as no receipt.
    fn into_receipt(self) -> Option<TransactionReceipt> {
        let block_number = self.block_number?;
        Some(TransactionReceipt {
            tx_hash: self.transaction_hash,
            block_number: Height::new(block_number.to()),
            block_hash: self.block_hash.unwrap_or_default(),
            // Pre-Byzantium receipts carry no status; treat them as successful.
            success: self.status.is_none_or(|s| s == U64::from(1)),
            gas_used: self.gas_used.map(|g| g.to()).unwrap_or_default(),
        })
    }
}

#[async_trait]
impl EthRpc for RpcClient {
    async fn client_version(&self) -> Result<String, NodeError> {
        self.request(WEB3_CLIENT_VERSION, json!([])).await
    }

    async fn block_number(&self) -> Result<Height, NodeError> {
        let number: U64 = self.request(ETH_BLOCK_NUMBER, json!([])).await?;
        Ok(Height::new(number.to()))
    }

    async fn block_by_number(&self, height: Height) -> Result<Option<BlockHeader>, NodeError> {
        let return_full_transaction_objects = false;
        let params = json!([U64::from(height.as_u64()), return_full_transaction_objects]);
        let block: Option<RpcBlock> = self.request(ETH_GET_BLOCK_BY_NUMBER, params).await?;

        Ok(block.and_then(|b| match (b.number, b.hash) {
            (Some(number), Some(hash)) => {
                Some(BlockHeader { number: Height::new(number.to()), hash })
            }
            _ => None,
        }))
    }

    async fn peer_count(&self) -> Result<u64, NodeError> {
        let count: U64 = self.request(NET_PEER_COUNT, json!([])).await?;
        Ok(count.to())
    }

    async fn chain_id(&self) -> Result<ChainId, NodeError> {
        let chain_id: U64 = self.request(ETH_CHAIN_ID, json!([])).await?;
        Ok(chain_id.to())
    }

    async fn pending_transaction_count(&self, address: Address) -> Result<u64, NodeError> {
        let count: U64 =
            self.request(ETH_GET_TRANSACTION_COUNT, json!([address, "pending"])).await?;
        Ok(count.to())
    }

    async fn balance(&self, address: Address) -> Result<U256, NodeError> {
        self.request(ETH_GET_BALANCE, json!([address, "latest"])).await
    }

    async fn send_raw_transaction(&self, payload: Bytes) -> Result<TxHash, NodeError> {
        self.request(ETH_SEND_RAW_TRANSACTION, json!([payload])).await
    }

    async fn transaction_receipt(
        &self,
        tx_hash: TxHash,
    ) -> Result<Option<TransactionReceipt>, NodeError> {
        let receipt: Option<RpcReceipt> =
            self.request(ETH_GET_TRANSACTION_RECEIPT, json!([tx_hash])).await?;
        Ok(receipt.and_then(RpcReceipt::into_receipt))
    }

    async fn close(&self) -> Result<(), NodeError> {
        self.transport.close().await
    }
}
