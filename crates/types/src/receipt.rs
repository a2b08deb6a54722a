use serde::{Deserialize, Serialize};

use crate::{
    aliases::{BlockHash, TxHash},
    height::Height,
};

/// Confirmation that a submitted transaction was included in a block.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionReceipt {
    pub tx_hash: TxHash,
    /// Inclusion height.
    pub block_number: Height,
    pub block_hash: BlockHash,
    /// `false` when the transaction was included but reverted.
    pub success: bool,
    pub gas_used: u64,
}
