// crates/rpc/src/lib.rs

pub mod client;
pub mod config;
pub mod error;
pub mod eth_rpc;
pub mod handle;
pub mod registry;
pub mod transport;

pub use client::RpcClient;
pub use config::{NodeConfig, NodeEndpoint};
pub use error::{NodeError, RegistryError};
pub use eth_rpc::EthRpc;
pub use handle::NodeHandle;
pub use registry::{CloseReport, NodeRegistry};
