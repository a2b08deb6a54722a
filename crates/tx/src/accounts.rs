//! In-memory keyed store of signing accounts.

use std::sync::RwLock;

use alloy_primitives::B256;
use alloy_signer_local::PrivateKeySigner;
use faultline_types::aliases::Address;
use hex::FromHex;
use tracing::info;

use crate::error::TxError;

/// Pre-funded genesis keys of the reference network, with their labels.
pub const GENESIS_ACCOUNTS: [(&str, &str); 3] = [
    (
        "0xac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80",
        "Genesis Account 1 (Validator)",
    ),
    ("0x59c6995e998f97a5a0044966f0945389dc9e86dae88c7a8412f4603b6b78690d", "Genesis Account 2"),
    ("0x5de4111afa1a4b94908f83103eb1f1706367c2e68ca870fc3fb9a804cdab365a", "Genesis Account 3"),
];

/// Parses a 0x-prefixed (or bare) 32-byte hex private key.
pub fn signer_from_hex(private_key: &str) -> Result<PrivateKeySigner, TxError> {
    let pk = private_key.trim();
    let pk = pk.strip_prefix("0x").unwrap_or(pk);
    let bytes = <[u8; 32]>::from_hex(pk)
        .map_err(|e| TxError::InvalidKey(format!("expected 32-byte hex: {e}")))?;
    PrivateKeySigner::from_slice(&bytes).map_err(|e| TxError::InvalidKey(e.to_string()))
}

/// A named signing capability. The key never leaves the signer except through
/// [`Account::private_key`].
#[derive(Clone, Debug)]
pub struct Account {
    pub name: String,
    signer: PrivateKeySigner,
}

impl Account {
    pub fn new(name: impl Into<String>, signer: PrivateKeySigner) -> Self {
        Self { name: name.into(), signer }
    }

    pub fn address(&self) -> Address {
        self.signer.address()
    }

    pub fn signer(&self) -> &PrivateKeySigner {
        &self.signer
    }

    pub fn private_key(&self) -> B256 {
        self.signer.to_bytes()
    }
}

/// Accounts in insertion order, keyed by address.
#[derive(Debug, Default)]
pub struct AccountStore {
    accounts: RwLock<Vec<Account>>,
}

impl AccountStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// A store pre-loaded with [`GENESIS_ACCOUNTS`].
    pub fn with_genesis_accounts() -> Result<Self, TxError> {
        let store = Self::new();
        for (key, name) in GENESIS_ACCOUNTS {
            let account = store.insert(Account::new(name, signer_from_hex(key)?));
            info!(address = %account.address(), name, "Pre-loaded genesis account");
        }
        Ok(store)
    }

    /// Inserts or replaces the account with the same address.
    pub fn insert(&self, account: Account) -> Account {
        let mut accounts = self.accounts.write().unwrap_or_else(|e| e.into_inner());
        match accounts.iter_mut().find(|a| a.address() == account.address()) {
            Some(existing) => *existing = account.clone(),
            None => accounts.push(account.clone()),
        }
        account
    }

    /// Creates a fresh random account. Blank names default to `Account <address prefix>`.
    pub fn create(&self, name: Option<&str>) -> Account {
        let signer = PrivateKeySigner::random();
        let name = match name.map(str::trim) {
            Some(name) if !name.is_empty() => name.to_string(),
            _ => {
                let address = signer.address().to_string();
                format!("Account {}", &address[..8])
            }
        };
        let account = self.insert(Account::new(name, signer));
        info!(address = %account.address(), name = %account.name, "New account created");
        account
    }

    pub fn import(&self, name: &str, private_key: &str) -> Result<Account, TxError> {
        Ok(self.insert(Account::new(name, signer_from_hex(private_key)?)))
    }

    pub fn get(&self, address: &Address) -> Option<Account> {
        let accounts = self.accounts.read().unwrap_or_else(|e| e.into_inner());
        accounts.iter().find(|a| a.address() == *address).cloned()
    }

    pub fn all(&self) -> Vec<Account> {
        self.accounts.read().unwrap_or_else(|e| e.into_inner()).clone()
    }

    pub fn len(&self) -> usize {
        self.accounts.read().unwrap_or_else(|e| e.into_inner()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use alloy_primitives::address;

    use super::*;

    #[test]
    fn genesis_accounts_derive_known_addresses() {
        let store = AccountStore::with_genesis_accounts().unwrap();
        let addresses: Vec<_> = store.all().iter().map(Account::address).collect();
        assert_eq!(
            addresses,
            [
                address!("f39Fd6e51aad88F6F4ce6aB8827279cffFb92266"),
                address!("70997970C51812dc3A010C7d01b50e0d17dc79C8"),
                address!("3C44CdDdB6a900fa2b585dd299e03d12FA4293BC"),
            ]
        );
    }

    #[test]
    fn created_accounts_get_default_name_and_are_retrievable() {
        let store = AccountStore::new();
        let account = store.create(Some("   "));
        assert!(account.name.starts_with("Account 0x"));
        assert_eq!(account.name.len(), "Account ".len() + 8);

        let found = store.get(&account.address()).unwrap();
        assert_eq!(found.private_key(), account.private_key());
    }

    #[test]
    fn rejects_malformed_private_key() {
        assert!(matches!(signer_from_hex("0x1234"), Err(TxError::InvalidKey(_))));
    }
}
