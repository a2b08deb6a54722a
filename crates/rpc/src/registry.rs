use std::{
    collections::HashSet,
    sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
    },
};

use faultline_types::NodeName;
use tracing::{error, info};

use crate::{
    config::NodeConfig,
    error::{NodeError, RegistryError},
    handle::NodeHandle,
};

/// Fixed, named collection of node handles, in construction order.
///
/// Built once at startup and passed to every component that needs node access.
/// [`NodeRegistry::close_all`] is the only mutation.
#[derive(Debug)]
pub struct NodeRegistry {
    handles: Vec<Arc<NodeHandle>>,
    closed: AtomicBool,
}

/// Outcome of a registry shutdown. Failures are collected, never raised.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct CloseReport {
    pub closed: Vec<NodeName>,
    pub failures: Vec<(NodeName, NodeError)>,
    /// Set when the registry had already been closed by an earlier call.
    pub already_closed: bool,
}

impl CloseReport {
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }
}

impl NodeRegistry {
    pub fn new(handles: Vec<NodeHandle>) -> Result<Self, RegistryError> {
        if handles.is_empty() {
            return Err(RegistryError::Empty);
        }
        let mut seen = HashSet::new();
        for handle in &handles {
            if !seen.insert(handle.name().clone()) {
                return Err(RegistryError::Duplicate(handle.name().clone()));
            }
        }
        Ok(Self {
            handles: handles.into_iter().map(Arc::new).collect(),
            closed: AtomicBool::new(false),
        })
    }

    /// Opens a handle per configured node.
    pub fn open(configs: &[NodeConfig]) -> Result<Self, RegistryError> {
        info!("Initializing connections to nodes...");
        let handles = configs
            .iter()
            .map(|config| {
                let handle = NodeHandle::open(config)
                    .map_err(|source| RegistryError::Open { name: config.name.clone(), source })?;
                info!(
                    node = %config.name,
                    role = %config.role,
                    endpoint = %config.endpoint,
                    "Connected to node"
                );
                Ok(handle)
            })
            .collect::<Result<Vec<_>, RegistryError>>()?;
        Self::new(handles)
    }

    pub fn resolve(&self, name: &str) -> Result<Arc<NodeHandle>, RegistryError> {
        if self.is_closed() {
            return Err(RegistryError::Closed);
        }
        self.handles
            .iter()
            .find(|h| h.name().as_str() == name)
            .cloned()
            .ok_or_else(|| RegistryError::UnknownNode(name.to_string()))
    }

    /// Registered names in construction order.
    pub fn names(&self) -> Vec<NodeName> {
        self.handles.iter().map(|h| h.name().clone()).collect()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.handles.iter().any(|h| h.name().as_str() == name)
    }

    /// Every handle in construction order.
    pub fn handles(&self) -> Result<Vec<Arc<NodeHandle>>, RegistryError> {
        if self.is_closed() {
            return Err(RegistryError::Closed);
        }
        Ok(self.handles.clone())
    }

    pub fn len(&self) -> usize {
        self.handles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handles.is_empty()
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }

    /// Releases every transport exactly once. A failing close does not stop the others.
    pub async fn close_all(&self) -> CloseReport {
        if self.closed.swap(true, Ordering::AcqRel) {
            return CloseReport { already_closed: true, ..Default::default() };
        }

        info!("Shutting down node connections...");
        let mut report = CloseReport::default();
        for handle in &self.handles {
            match handle.close().await {
                Ok(()) => {
                    info!(node = %handle.name(), "Closed connection");
                    report.closed.push(handle.name().clone());
                }
                Err(e) => {
                    error!(node = %handle.name(), "Failed to close connection: {e}");
                    report.failures.push((handle.name().clone(), e));
                }
            }
        }
        report
    }
}

#[cfg(test)]
mod tests {
    use faultline_types::NodeRole;

    use super::*;
    use crate::{
        client::RpcClient,
        transport::mock::MockTransport,
    };

    fn mock_handle(name: &str) -> (NodeHandle, Arc<MockTransport>) {
        let mock = Arc::new(MockTransport::new());
        let rpc = Arc::new(RpcClient::from_shared(mock.clone()));
        (NodeHandle::new(name, NodeRole::Full, rpc), mock)
    }

    fn registry(names: &[&str]) -> (NodeRegistry, Vec<Arc<MockTransport>>) {
        let (handles, mocks): (Vec<_>, Vec<_>) = names.iter().map(|n| mock_handle(n)).unzip();
        (NodeRegistry::new(handles).unwrap(), mocks)
    }

    #[test]
    fn names_keep_construction_order() {
        let (registry, _) = registry(&["node1", "node2", "node3"]);
        let names: Vec<_> = registry.names().iter().map(|n| n.to_string()).collect();
        assert_eq!(names, ["node1", "node2", "node3"]);
    }

    #[test]
    fn unknown_name_fails() {
        let (registry, _) = registry(&["node1"]);
        assert_eq!(
            registry.resolve("node9").unwrap_err(),
            RegistryError::UnknownNode("node9".into())
        );
    }

    #[test]
    fn duplicate_and_empty_are_rejected() {
        let (a, _) = mock_handle("node1");
        let (b, _) = mock_handle("node1");
        assert!(matches!(NodeRegistry::new(vec![a, b]), Err(RegistryError::Duplicate(_))));
        assert!(matches!(NodeRegistry::new(vec![]), Err(RegistryError::Empty)));
    }

    #[tokio::test]
    async fn close_all_collects_failures_and_is_idempotent() {
        let (registry, mocks) = registry(&["node1", "node2", "node3"]);
        mocks[1].fail_close_with(NodeError::Unreachable("broken pipe".into()));

        let report = registry.close_all().await;
        assert_eq!(report.closed, vec![NodeName::from("node1"), NodeName::from("node3")]);
        assert_eq!(report.failures.len(), 1);
        assert_eq!(report.failures[0].0, NodeName::from("node2"));

        let again = registry.close_all().await;
        assert!(again.already_closed);
        assert!(again.closed.is_empty());

        assert_eq!(registry.resolve("node1").unwrap_err(), RegistryError::Closed);
        assert!(matches!(registry.handles(), Err(RegistryError::Closed)));
    }
}
