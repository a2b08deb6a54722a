// crates/rpc/src/transport/mod.rs
#![allow(missing_docs)]

pub mod http;
pub mod ipc;
pub mod mock;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::NodeError;

/// A generic transport for sending JSON-RPC requests.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Sends a JSON-RPC request and returns the response.
    ///
    /// Any failure to obtain a response maps to [`NodeError::Unreachable`].
    async fn send(&self, req: &JsonRpcRequest) -> Result<JsonRpcResponse, NodeError>;

    /// Releases the underlying connection resources.
    async fn close(&self) -> Result<(), NodeError> {
        Ok(())
    }
}

/// Represents a JSON-RPC request object.
#[derive(Debug, Clone, Serialize)]
pub struct JsonRpcRequest {
    pub jsonrpc: &'static str,
    pub method: String,
    pub params: serde_json::Value,
    pub id: u64,
}

impl JsonRpcRequest {
    pub fn new(method: impl Into<String>, params: serde_json::Value) -> Self {
        Self { jsonrpc: "2.0", method: method.into(), params, id: 1 }
    }
}

/// Represents a JSON-RPC response object.
///
/// A `null` result stays distinguishable from an error: `result` defaults to
/// `Value::Null` and `error` is only set when the node rejected the call.
#[derive(Debug, Deserialize)]
pub struct JsonRpcResponse {
    pub jsonrpc: String,
    #[serde(default)]
    pub result: serde_json::Value,
    #[serde(default)]
    pub error: Option<JsonRpcError>,
    pub id: serde_json::Value,
}

/// Represents a JSON-RPC error object.
#[derive(Debug, Deserialize)]
pub struct JsonRpcError {
    pub code: i64,
    pub message: String,
}
