#![allow(missing_docs)]
use std::{
    path::{Path, PathBuf},
    time::Duration,
};

use async_trait::async_trait;
use tokio::{
    io::{AsyncReadExt, AsyncWriteExt},
    net::UnixStream,
};

use super::{JsonRpcRequest, JsonRpcResponse, Transport};
use crate::error::NodeError;

pub struct IpcTransport {
    path: PathBuf,
    timeout: Duration,
}

impl IpcTransport {
    pub fn new(path: impl AsRef<Path>, timeout: Duration) -> Self {
        Self { path: path.as_ref().to_path_buf(), timeout }
    }

    async fn connect(&self) -> Result<UnixStream, NodeError> {
        tokio::time::timeout(self.timeout, UnixStream::connect(&self.path))
            .await
            .map_err(|_| unreachable_timeout(&self.path))?
            .map_err(|e| NodeError::Unreachable(e.to_string()))
    }
}

fn unreachable_timeout(path: &Path) -> NodeError {
    NodeError::Unreachable(format!("IPC request to {} timed out", path.display()))
}

#[async_trait]
impl Transport for IpcTransport {
    async fn send(&self, req: &JsonRpcRequest) -> Result<JsonRpcResponse, NodeError> {
        // Fresh connection per request; half-close after write so the server ends its side
        // and the response can be read to EOF.
        let mut stream = self.connect().await?;

        let req_bytes = serde_json::to_vec(req)?;
        let io = async {
            stream.write_all(&req_bytes).await?;
            stream.shutdown().await?;
            let mut resp_bytes = Vec::new();
            stream.read_to_end(&mut resp_bytes).await?;
            Ok::<_, std::io::Error>(resp_bytes)
        };
        let resp_bytes = tokio::time::timeout(self.timeout, io)
            .await
            .map_err(|_| unreachable_timeout(&self.path))?
            .map_err(|e| NodeError::Unreachable(e.to_string()))?;

        serde_json::from_slice(&resp_bytes).map_err(|e| NodeError::InvalidResponse(e.to_string()))
    }
}
