use std::{path::Path, sync::Arc};

use color_eyre::eyre::{Result, WrapErr};
use faultline_monitor::ConsistencyMonitor;
use faultline_rpc::NodeRegistry;
use faultline_scenario::{OperatorSignal, ScenarioRunner};
use faultline_tx::{AccountStore, TransactionOrchestrator, accounts::signer_from_hex};
use faultline_types::aliases::ChainId;
use tracing::{info, warn};

use crate::{config::Config, file};

/// Every component of the harness wired over one shared node registry.
#[derive(Debug)]
pub struct App {
    pub config: Config,
    pub registry: Arc<NodeRegistry>,
    pub monitor: Arc<ConsistencyMonitor>,
    pub orchestrator: Arc<TransactionOrchestrator>,
}

impl App {
    /// Opens a handle per configured node. No node is contacted yet.
    pub fn connect(config: Config, accounts_file: &Path) -> Result<Self> {
        config.validate()?;
        let registry = Arc::new(
            NodeRegistry::open(&config.nodes).wrap_err("Failed to open node connections")?,
        );

        let accounts = Arc::new(AccountStore::with_genesis_accounts()?);
        for entry in file::load_accounts(accounts_file)?.entries {
            match accounts.import(&entry.name, &entry.private_key) {
                Ok(account) => {
                    info!(address = %account.address(), name = %account.name, "Loaded account")
                }
                Err(e) => warn!(name = %entry.name, "Skipping stored account: {e}"),
            }
        }

        let default_signer = signer_from_hex(&config.transactions.default_private_key)
            .wrap_err("Invalid transactions.default_private_key")?;

        let monitor = Arc::new(ConsistencyMonitor::new(registry.clone(), config.monitor_config()));
        let orchestrator = Arc::new(TransactionOrchestrator::new(
            registry.clone(),
            accounts,
            default_signer,
            config.orchestrator_config(),
        ));

        Ok(Self { config, registry, monitor, orchestrator })
    }

    pub fn runner(&self, signal: Arc<dyn OperatorSignal>) -> Result<ScenarioRunner> {
        Ok(ScenarioRunner::new(
            self.monitor.clone(),
            self.orchestrator.clone(),
            signal,
            self.config.scenario_config()?,
        ))
    }

    /// Reads the chain identifier from the submission node. Without it no transaction can
    /// be signed, so commands that submit call this before doing anything else.
    pub async fn check_chain_id(&self) -> Result<ChainId> {
        let node = &self.config.transactions.submission_node;
        let handle = self.registry.resolve(node.as_str())?;
        let chain_id = handle
            .chain_id()
            .await
            .wrap_err_with(|| format!("Chain id of submission node {node} is unobtainable"))?;
        info!(%node, chain_id, "Connected to submission node");
        Ok(chain_id)
    }

    /// Closes every node connection. Close failures are logged, never returned.
    pub async fn shutdown(&self) {
        let report = self.registry.close_all().await;
        if !report.is_clean() {
            warn!(failures = report.failures.len(), "Some node connections did not close cleanly");
        }
        info!("Cleanup complete");
    }
}
