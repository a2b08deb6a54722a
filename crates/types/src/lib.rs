#![forbid(unsafe_code)]
#![deny(trivial_casts, trivial_numeric_casts)]
#![allow(missing_docs)]

pub mod address;
pub mod aliases;
pub mod block;
pub mod constants;
pub mod height;
pub mod node;
pub mod receipt;
pub mod status;
pub mod units;
pub mod verdict;

pub use height::Height;
pub use node::{NodeName, NodeRole};
pub use receipt::TransactionReceipt;
pub use status::{HeightReading, LivenessStatus, SyncSnapshot};
pub use verdict::{Agreement, ConsistencyVerdict, Exclusion};
