// crates/rpc/src/transport/http.rs

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, header::CONTENT_TYPE};
use url::Url;

use super::{JsonRpcRequest, JsonRpcResponse, Transport};
use crate::error::NodeError;

pub struct HttpTransport {
    client: Client,
    url: Url,
    timeout: Duration,
}

impl HttpTransport {
    pub fn new(url: Url, timeout: Duration) -> Result<Self, NodeError> {
        let client = Client::builder()
            .pool_idle_timeout(Duration::from_secs(90))
            .build()
            .map_err(|e| NodeError::Configuration(format!("failed to build HTTP client: {e}")))?;
        Ok(Self { client, url, timeout })
    }

    pub fn url(&self) -> &Url {
        &self.url
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn send(&self, req: &JsonRpcRequest) -> Result<JsonRpcResponse, NodeError> {
        let response = self
            .client
            .post(self.url.clone())
            .timeout(self.timeout)
            .header(CONTENT_TYPE, "application/json")
            .json(req)
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(|e| NodeError::Unreachable(e.to_string()))?;

        let bytes = response.bytes().await.map_err(|e| NodeError::Unreachable(e.to_string()))?;
        serde_json::from_slice(&bytes).map_err(|e| NodeError::InvalidResponse(e.to_string()))
    }
}
