//! A mock transport for testing the JSON-RPC client without a live node.

use std::{
    collections::{HashMap, VecDeque},
    sync::Mutex,
};

use async_trait::async_trait;
use serde_json::Value;

use super::{JsonRpcError, JsonRpcRequest, JsonRpcResponse, Transport};
use crate::error::NodeError;

/// What the mock answers for one call.
#[derive(Debug, Clone)]
pub enum MockReply {
    /// A successful response carrying this `result`.
    Result(Value),
    /// A JSON-RPC error object.
    RpcError { code: i64, message: String },
    /// No response at all.
    Fail(NodeError),
}

/// A mock transport that can be programmed with expected responses for testing.
#[derive(Debug, Default)]
pub struct MockTransport {
    // Replies are consumed in order; the last reply for a method is sticky.
    responses: Mutex<HashMap<String, VecDeque<MockReply>>>,
    calls: Mutex<Vec<JsonRpcRequest>>,
    close_error: Mutex<Option<NodeError>>,
}

impl MockTransport {
    /// Creates a new, empty mock transport.
    pub fn new() -> Self {
        Self::default()
    }

    /// Queues a reply for `method`.
    pub fn push(&self, method: &str, reply: MockReply) {
        self.responses
            .lock()
            .expect("mock lock poisoned")
            .entry(method.to_string())
            .or_default()
            .push_back(reply);
    }

    pub fn push_result(&self, method: &str, result: Value) {
        self.push(method, MockReply::Result(result));
    }

    /// Makes the next `close` fail with `error`.
    pub fn fail_close_with(&self, error: NodeError) {
        *self.close_error.lock().expect("mock lock poisoned") = Some(error);
    }

    /// Requests received so far.
    pub fn calls(&self) -> Vec<JsonRpcRequest> {
        self.calls.lock().expect("mock lock poisoned").clone()
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn send(&self, request: &JsonRpcRequest) -> Result<JsonRpcResponse, NodeError> {
        self.calls.lock().expect("mock lock poisoned").push(request.clone());

        let reply = {
            let mut responses = self.responses.lock().expect("mock lock poisoned");
            match responses.get_mut(&request.method) {
                Some(queue) if queue.len() > 1 => queue.pop_front(),
                Some(queue) => queue.front().cloned(),
                None => None,
            }
        };

        let response = |result, error| JsonRpcResponse {
            jsonrpc: "2.0".to_string(),
            id: Value::from(request.id),
            result,
            error,
        };

        match reply {
            Some(MockReply::Result(result)) => Ok(response(result, None)),
            Some(MockReply::RpcError { code, message }) => {
                Ok(response(Value::Null, Some(JsonRpcError { code, message })))
            }
            Some(MockReply::Fail(err)) => Err(err),
            // If no response was programmed for this method, it's an unexpected call.
            None => Err(NodeError::Unreachable(format!(
                "MockTransport: received unexpected call to method '{}'",
                request.method
            ))),
        }
    }

    async fn close(&self) -> Result<(), NodeError> {
        match self.close_error.lock().expect("mock lock poisoned").take() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}
