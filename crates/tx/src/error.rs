use faultline_rpc::{NodeError, RegistryError};
use faultline_types::{
    NodeName,
    address::AddressError,
    aliases::{Address, TxHash},
    units::AmountError,
};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TxError {
    /// The node rejected the transaction; `reason` is the node's message.
    #[error("Transaction rejected by {node}: {reason}")]
    Submission { node: NodeName, reason: String },

    #[error("Transaction {tx_hash} not mined after {attempts} attempts")]
    NotMined { tx_hash: TxHash, attempts: usize },

    #[error("Operation cancelled")]
    Cancelled,

    #[error("Failed to sign transaction: {0}")]
    Signing(String),

    #[error("Invalid private key: {0}")]
    InvalidKey(String),

    #[error("Sender account not found: {0}")]
    UnknownAccount(Address),

    #[error(transparent)]
    Address(#[from] AddressError),

    #[error(transparent)]
    Amount(#[from] AmountError),

    #[error(transparent)]
    Node(#[from] NodeError),

    #[error(transparent)]
    Registry(#[from] RegistryError),
}
