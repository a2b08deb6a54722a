use core::str::FromStr;

use thiserror::Error;

use crate::aliases::Address;

const HEX_LENGTH: usize = 40;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AddressError {
    #[error("Invalid Ethereum address: {0}")]
    Malformed(String),
}

/// Parses an account address of the form `0x` followed by exactly 40 hex digits.
///
/// Mixed case is accepted without checksum validation.
pub fn parse_address(input: &str) -> Result<Address, AddressError> {
    let input = input.trim();
    let digits = input.strip_prefix("0x").ok_or_else(|| AddressError::Malformed(input.into()))?;
    if digits.len() != HEX_LENGTH || !digits.bytes().all(|b| b.is_ascii_hexdigit()) {
        return Err(AddressError::Malformed(input.into()));
    }
    Address::from_str(input).map_err(|_| AddressError::Malformed(input.into()))
}

pub fn is_valid_address(input: &str) -> bool {
    parse_address(input).is_ok()
}
