#![allow(missing_docs)]
use std::{fmt, path::PathBuf, str::FromStr, time::Duration};

use faultline_types::{NodeName, NodeRole, constants::DEFAULT_REQUEST_TIMEOUT_MS};
use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::NodeError;

/// Where a node's JSON-RPC interface listens: HTTP or a local IPC socket.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum NodeEndpoint {
    Http(Url),
    Ipc(PathBuf),
}

impl FromStr for NodeEndpoint {
    type Err = NodeError;

    /// `http://` and `https://` URLs select HTTP; `ipc:<path>` or a path ending in `.ipc`
    /// selects IPC.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if let Some(path) = s.strip_prefix("ipc:") {
            return Ok(Self::Ipc(PathBuf::from(path.trim_start_matches("//"))));
        }
        if s.ends_with(".ipc") {
            return Ok(Self::Ipc(PathBuf::from(s)));
        }
        let url = Url::parse(s)
            .map_err(|e| NodeError::Configuration(format!("invalid endpoint '{s}': {e}")))?;
        match url.scheme() {
            "http" | "https" => Ok(Self::Http(url)),
            other => Err(NodeError::Configuration(format!(
                "unsupported endpoint scheme '{other}' in '{s}'"
            ))),
        }
    }
}

impl TryFrom<String> for NodeEndpoint {
    type Error = NodeError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<NodeEndpoint> for String {
    fn from(endpoint: NodeEndpoint) -> Self {
        endpoint.to_string()
    }
}

impl fmt::Display for NodeEndpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Http(url) => write!(f, "{url}"),
            Self::Ipc(path) => write!(f, "ipc:{}", path.display()),
        }
    }
}

/// Connection parameters of one node of the topology.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeConfig {
    pub name: NodeName,
    #[serde(default)]
    pub role: NodeRole,
    pub endpoint: NodeEndpoint,
    /// Per-request timeout. Every RPC call is independently timeoutable.
    #[serde(default = "default_request_timeout_ms")]
    pub request_timeout_ms: u64,
}

impl NodeConfig {
    pub fn new(name: impl Into<NodeName>, role: NodeRole, endpoint: NodeEndpoint) -> Self {
        Self {
            name: name.into(),
            role,
            endpoint,
            request_timeout_ms: DEFAULT_REQUEST_TIMEOUT_MS,
        }
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }
}

fn default_request_timeout_ms() -> u64 {
    DEFAULT_REQUEST_TIMEOUT_MS
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_http_and_ipc_endpoints() {
        assert_eq!(
            "http://localhost:8545".parse::<NodeEndpoint>().unwrap(),
            NodeEndpoint::Http(Url::parse("http://localhost:8545").unwrap())
        );
        assert_eq!(
            "ipc:/tmp/geth.ipc".parse::<NodeEndpoint>().unwrap(),
            NodeEndpoint::Ipc(PathBuf::from("/tmp/geth.ipc"))
        );
        assert_eq!(
            "/data/node3/geth.ipc".parse::<NodeEndpoint>().unwrap(),
            NodeEndpoint::Ipc(PathBuf::from("/data/node3/geth.ipc"))
        );
    }

    #[test]
    fn rejects_unsupported_scheme() {
        let err = "ws://localhost:8546".parse::<NodeEndpoint>().unwrap_err();
        assert!(matches!(err, NodeError::Configuration(_)));
    }

    #[test]
    fn endpoint_display_round_trips() {
        let endpoint: NodeEndpoint = "ipc:/tmp/geth.ipc".parse().unwrap();
        assert_eq!(endpoint.to_string().parse::<NodeEndpoint>().unwrap(), endpoint);
    }
}
