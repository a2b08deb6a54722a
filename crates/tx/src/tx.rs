use alloy_consensus::{SignableTransaction, TxEip1559, TxEnvelope, TxLegacy};
use alloy_network::{TxSigner, eip2718::Encodable2718};
use alloy_primitives::TxKind;
use alloy_signer_local::PrivateKeySigner;
use faultline_types::{
    aliases::{Address, Bytes, ChainId, U256},
    constants::{DEFAULT_GAS_LIMIT, DEFAULT_GAS_PRICE_WEI},
};
use serde::{Deserialize, Serialize};

use crate::error::TxError;

/// Envelope used for value transfers.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TxKindConfig {
    /// EIP-155 legacy transaction with a fixed gas price.
    #[default]
    Legacy,
    /// EIP-1559 transaction whose max fee and priority fee both equal the gas price.
    Eip1559,
}

/// Fixed fee parameters. Not negotiated with the node so experiments stay reproducible.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeeParams {
    pub gas_price: u128,
    pub gas_limit: u64,
    #[serde(default)]
    pub kind: TxKindConfig,
}

impl Default for FeeParams {
    fn default() -> Self {
        Self {
            gas_price: u128::from(DEFAULT_GAS_PRICE_WEI),
            gas_limit: DEFAULT_GAS_LIMIT,
            kind: TxKindConfig::Legacy,
        }
    }
}

pub(crate) fn make_legacy_tx(
    nonce: u64,
    to: Address,
    value: U256,
    chain_id: ChainId,
    fees: &FeeParams,
) -> TxLegacy {
    TxLegacy {
        chain_id: Some(chain_id),
        nonce,
        gas_price: fees.gas_price,
        gas_limit: fees.gas_limit,
        to: TxKind::Call(to),
        value,
        input: Bytes::default(),
    }
}

pub(crate) fn make_eip1559_tx(
    nonce: u64,
    to: Address,
    value: U256,
    chain_id: ChainId,
    fees: &FeeParams,
) -> TxEip1559 {
    TxEip1559 {
        chain_id,
        nonce,
        max_priority_fee_per_gas: fees.gas_price,
        max_fee_per_gas: fees.gas_price,
        gas_limit: fees.gas_limit,
        to: TxKind::Call(to),
        value,
        input: Bytes::default(),
        access_list: Default::default(),
    }
}

/// Builds and signs a value transfer of `value` wei to `to`.
pub async fn make_signed_transfer(
    signer: &PrivateKeySigner,
    nonce: u64,
    to: Address,
    value: U256,
    chain_id: ChainId,
    fees: &FeeParams,
) -> Result<TxEnvelope, TxError> {
    let envelope = match fees.kind {
        TxKindConfig::Legacy => {
            let mut tx = make_legacy_tx(nonce, to, value, chain_id, fees);
            let signature = signer
                .sign_transaction(&mut tx)
                .await
                .map_err(|e| TxError::Signing(e.to_string()))?;
            tx.into_signed(signature).into()
        }
        TxKindConfig::Eip1559 => {
            let mut tx = make_eip1559_tx(nonce, to, value, chain_id, fees);
            let signature = signer
                .sign_transaction(&mut tx)
                .await
                .map_err(|e| TxError::Signing(e.to_string()))?;
            tx.into_signed(signature).into()
        }
    };
    Ok(envelope)
}

/// Raw bytes accepted by `eth_sendRawTransaction`.
pub fn encode_raw(envelope: &TxEnvelope) -> Bytes {
    Bytes::from(envelope.encoded_2718())
}
