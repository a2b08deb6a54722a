//! Conversion between the base unit (wei) and the display unit (ether), 18-decimal fixed
//! point.

use alloy_primitives::utils::{format_ether, parse_ether};
use thiserror::Error;

use crate::aliases::U256;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AmountError {
    #[error("Invalid amount '{0}'")]
    Malformed(String),

    #[error("Amount must be greater than 0")]
    NotPositive,
}

/// Parses a decimal ether amount into wei, rejecting zero.
pub fn parse_positive_ether(input: &str) -> Result<U256, AmountError> {
    let input = input.trim();
    if input.starts_with('-') {
        return Err(AmountError::NotPositive);
    }
    let wei = parse_ether(input).map_err(|_| AmountError::Malformed(input.to_string()))?;
    if wei.is_zero() {
        return Err(AmountError::NotPositive);
    }
    Ok(wei)
}

/// Formats wei as ether without trailing zeros, e.g. `0.1` or `15000`.
pub fn display_ether(wei: U256) -> String {
    let formatted = format_ether(wei);
    match formatted.split_once('.') {
        Some((whole, fraction)) => {
            let fraction = fraction.trim_end_matches('0');
            if fraction.is_empty() { whole.to_string() } else { format!("{whole}.{fraction}") }
        }
        None => formatted,
    }
}
