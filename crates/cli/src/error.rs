use std::path::PathBuf;

use faultline_types::{address::AddressError, units::AmountError};
use thiserror::Error;

/// Errors of the configuration layer.
#[derive(Error, Debug)]
pub enum Error {
    #[error("Error creating parent directory: {}", .0.display())]
    ParentDir(PathBuf),

    #[error("Error opening file: {}", .0.display())]
    OpenFile(PathBuf),

    #[error("Error writing file: {}", .0.display())]
    WriteFile(PathBuf),

    #[error("Error parsing file {}: {reason}", .path.display())]
    Parse { path: PathBuf, reason: String },

    #[error("Error converting to TOML: {0}")]
    ToToml(String),

    #[error("Error determining home directory path")]
    DirPath,

    #[error("Configuration file already exists: {}", .0.display())]
    AlreadyExists(PathBuf),

    #[error("Invalid configuration: {0}")]
    Invalid(String),

    #[error("Invalid address in configuration: {0}")]
    Address(#[from] AddressError),

    #[error("Invalid amount in configuration: {0}")]
    Amount(#[from] AmountError),
}
