#![allow(missing_docs)]

use faultline_types::NodeName;
use thiserror::Error;

/// Classifies every failure a node capability can report.
///
/// Probes absorb `Unreachable` into `Offline`; everything else propagates to the caller.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NodeError {
    /// The node did not respond (connection refused, timeout, broken pipe).
    #[error("Node unreachable: {0}")]
    Unreachable(String),

    /// The node answered with a JSON-RPC error object.
    #[error("JSON-RPC error (code {code}): {message}")]
    Rpc { code: i64, message: String },

    /// The queried block, hash or receipt does not exist (yet).
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// The handle was released by a registry shutdown.
    #[error("Node connection closed")]
    Closed,

    /// Endpoint or chain identifier unobtainable; fatal at startup.
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl NodeError {
    pub fn is_unreachable(&self) -> bool {
        matches!(self, Self::Unreachable(_))
    }
}

impl From<serde_json::Error> for NodeError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    #[error("Unknown node: {0}")]
    UnknownNode(String),

    #[error("Duplicate node name: {0}")]
    Duplicate(NodeName),

    #[error("No nodes configured")]
    Empty,

    #[error("Node registry is closed")]
    Closed,

    #[error("Failed to open node {name}: {source}")]
    Open {
        name: NodeName,
        #[source]
        source: NodeError,
    },
}
