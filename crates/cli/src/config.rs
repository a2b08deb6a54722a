use std::{fmt, time::Duration};

use clap::ValueEnum;
use faultline_monitor::MonitorConfig;
use faultline_rpc::{NodeConfig, NodeEndpoint};
use faultline_scenario::ScenarioConfig;
use faultline_tx::{FeeParams, OrchestratorConfig, TxKindConfig};
use faultline_types::{
    NodeName, NodeRole,
    address::parse_address,
    constants::{
        DEFAULT_BATCH_SPACING_MS, DEFAULT_GAS_LIMIT, DEFAULT_GAS_PRICE_WEI,
        DEFAULT_POLL_INTERVAL_MS,
    },
    units::parse_positive_ether,
};
use serde::{Deserialize, Serialize};
use tracing::warn;

pub use crate::file::load_config;
use crate::error::Error;

/// First pre-funded key of the development genesis.
pub const DEFAULT_PRIVATE_KEY: &str =
    "0xac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80";

/// Recipient of every experiment transfer.
pub const DEFAULT_RECIPIENT: &str = "0x70997970C51812dc3A010C7d01b50e0d17dc79C8";

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    pub nodes: Vec<NodeConfig>,
    #[serde(default)]
    pub transactions: TransactionsConfig,
    #[serde(default)]
    pub monitor: MonitorSection,
    #[serde(default)]
    pub scenario: ScenarioSection,
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub runtime: RuntimeConfig,
}

impl Default for Config {
    /// The three-node reference topology on localhost.
    fn default() -> Self {
        let node = |name: &str, role, port: u16| {
            NodeConfig::new(
                name,
                role,
                NodeEndpoint::Http(
                    url::Url::parse(&format!("http://localhost:{port}"))
                        .expect("static URL is valid"),
                ),
            )
        };
        Self {
            nodes: vec![
                node("node1", NodeRole::Validator, 8545),
                node("node2", NodeRole::Full, 8547),
                node("node3", NodeRole::Recovery, 8549),
            ],
            transactions: TransactionsConfig::default(),
            monitor: MonitorSection::default(),
            scenario: ScenarioSection::default(),
            logging: LoggingConfig::default(),
            runtime: RuntimeConfig::default(),
        }
    }
}

impl Config {
    /// Apply environment variable overrides for node endpoints.
    ///
    /// `FAULTLINE_NODE_<NAME>_URL` replaces the endpoint of the node named `<name>`
    /// (case-insensitive). Invalid values are ignored.
    pub fn apply_env_overrides(&mut self) {
        fn get(key: &str) -> Option<String> {
            std::env::var(key).ok().map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
        }

        for node in &mut self.nodes {
            let key = format!("FAULTLINE_NODE_{}_URL", node.name.label());
            if let Some(v) = get(&key) {
                match v.parse::<NodeEndpoint>() {
                    Ok(endpoint) => node.endpoint = endpoint,
                    Err(e) => warn!(%key, value = %v, "Invalid endpoint override, ignoring: {e}"),
                }
            }
        }
    }

    /// Rejects topologies the components cannot run against.
    pub fn validate(&self) -> Result<(), Error> {
        if self.nodes.is_empty() {
            return Err(Error::Invalid("at least one node must be configured".into()));
        }
        let has = |name: &NodeName| self.nodes.iter().any(|n| n.name == *name);
        for (field, name) in [
            ("transactions.submission_node", &self.transactions.submission_node),
            ("scenario.recovery_node", &self.scenario.recovery_node),
            ("scenario.reference_node", &self.scenario.reference_node),
        ] {
            if !has(name) {
                return Err(Error::Invalid(format!("{field} refers to unknown node '{name}'")));
            }
        }
        for (field, interval_ms) in [
            ("monitor.poll_interval_ms", self.monitor.poll_interval_ms),
            ("transactions.poll_interval_ms", self.transactions.poll_interval_ms),
        ] {
            if interval_ms == 0 {
                return Err(Error::Invalid(format!("{field} must be greater than zero")));
            }
        }
        Ok(())
    }

    pub fn monitor_config(&self) -> MonitorConfig {
        MonitorConfig { poll_interval: Duration::from_millis(self.monitor.poll_interval_ms) }
    }

    pub fn orchestrator_config(&self) -> OrchestratorConfig {
        let tx = &self.transactions;
        OrchestratorConfig {
            submission_node: tx.submission_node.clone(),
            fees: FeeParams {
                gas_price: u128::from(tx.gas_price_wei),
                gas_limit: tx.gas_limit,
                kind: tx.kind,
            },
            poll_interval: Duration::from_millis(tx.poll_interval_ms),
            batch_spacing: Duration::from_millis(tx.batch_spacing_ms),
        }
    }

    pub fn scenario_config(&self) -> Result<ScenarioConfig, Error> {
        let s = &self.scenario;
        let mut config = ScenarioConfig::new(
            parse_address(&s.recipient)?,
            parse_positive_ether(&s.single_amount_ether)?,
            parse_positive_ether(&s.batch_amount_ether)?,
        );
        config.batch_size = s.batch_size;
        config.inclusion_attempts = s.inclusion_attempts.max(1);
        config.sync_timeout = Duration::from_secs(s.sync_timeout_secs);
        config.recovery_sync_timeout = Duration::from_secs(s.recovery_sync_timeout_secs);
        config.isolation_settle = Duration::from_secs(s.isolation_settle_secs);
        config.recovery_settle = Duration::from_secs(s.recovery_settle_secs);
        config.recovery_node = s.recovery_node.clone();
        config.reference_node = s.reference_node.clone();
        config.stop_instruction = s.stop_instruction.clone();
        config.start_instruction = s.start_instruction.clone();
        config.operator_timeout = s.operator_timeout_secs.map(Duration::from_secs);
        Ok(config)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TransactionsConfig {
    pub submission_node: NodeName,
    /// Legacy gas price, or max fee per gas for EIP-1559 transfers.
    pub gas_price_wei: u64,
    pub gas_limit: u64,
    pub kind: TxKindConfig,
    pub default_private_key: String,
    pub poll_interval_ms: u64,
    pub batch_spacing_ms: u64,
}

impl Default for TransactionsConfig {
    fn default() -> Self {
        Self {
            submission_node: NodeName::from("node1"),
            gas_price_wei: DEFAULT_GAS_PRICE_WEI,
            gas_limit: DEFAULT_GAS_LIMIT,
            kind: TxKindConfig::default(),
            default_private_key: DEFAULT_PRIVATE_KEY.to_string(),
            poll_interval_ms: DEFAULT_POLL_INTERVAL_MS,
            batch_spacing_ms: DEFAULT_BATCH_SPACING_MS,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MonitorSection {
    pub poll_interval_ms: u64,
}

impl Default for MonitorSection {
    fn default() -> Self {
        Self { poll_interval_ms: DEFAULT_POLL_INTERVAL_MS }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScenarioSection {
    pub recipient: String,
    pub single_amount_ether: String,
    pub batch_amount_ether: String,
    pub batch_size: usize,
    pub inclusion_attempts: usize,
    pub sync_timeout_secs: u64,
    pub recovery_sync_timeout_secs: u64,
    pub isolation_settle_secs: u64,
    pub recovery_settle_secs: u64,
    pub recovery_node: NodeName,
    pub reference_node: NodeName,
    pub stop_instruction: String,
    pub start_instruction: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub operator_timeout_secs: Option<u64>,
}

impl Default for ScenarioSection {
    fn default() -> Self {
        Self {
            recipient: DEFAULT_RECIPIENT.to_string(),
            single_amount_ether: "0.1".to_string(),
            batch_amount_ether: "0.05".to_string(),
            batch_size: 5,
            inclusion_attempts: 30,
            sync_timeout_secs: 30,
            recovery_sync_timeout_secs: 60,
            isolation_settle_secs: 2,
            recovery_settle_secs: 10,
            recovery_node: NodeName::from("node3"),
            reference_node: NodeName::from("node1"),
            stop_instruction: "docker-compose stop eth-node3-recovery".to_string(),
            start_instruction: "docker-compose start eth-node3-recovery".to_string(),
            operator_timeout_secs: None,
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub log_level: LogLevel,
    pub log_format: LogFormat,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Trace,
    Debug,
    #[default]
    Info,
    Warn,
    Error,
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let level = match self {
            Self::Trace => "trace",
            Self::Debug => "debug",
            Self::Info => "info",
            Self::Warn => "warn",
            Self::Error => "error",
        };
        f.write_str(level)
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Plaintext,
    Json,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "flavor", rename_all = "snake_case")]
pub enum RuntimeConfig {
    SingleThreaded,
    /// `worker_threads = 0` uses one worker per core.
    MultiThreaded { worker_threads: usize },
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self::MultiThreaded { worker_threads: 0 }
    }
}
