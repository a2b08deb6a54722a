//! Defaults of the reference experiment topology.
//!
//! Components never read these directly; they seed the configuration file and
//! are injected at construction.

/// Legacy gas price used for every value transfer (20 gwei).
pub const DEFAULT_GAS_PRICE_WEI: u64 = 20_000_000_000;

/// Gas limit of a plain value transfer.
pub const DEFAULT_GAS_LIMIT: u64 = 21_000;

/// Interval between two polls of a convergence or inclusion loop.
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 2_000;

/// Minimum spacing between two submissions of a batch.
pub const DEFAULT_BATCH_SPACING_MS: u64 = 2_000;

/// Per-request timeout for node RPC calls.
pub const DEFAULT_REQUEST_TIMEOUT_MS: u64 = 5_000;

/// Number of decimals of the display unit (ether) relative to the base unit (wei).
pub const ETHER_DECIMALS: u8 = 18;
