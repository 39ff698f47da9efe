//! Plain key-value persistence for non-secret wallet fields.
//!
//! One flat namespace of fixed keys. Only the lifecycle manager and the
//! credential store's plain fallback tier write here, which keeps the
//! "secret never in plain storage except via the explicit fallback"
//! invariant auditable.

use std::sync::Arc;

use ethwallet_store::{KeyValueStore, StoreResult};
use tracing::warn;

/// Key holding the wallet's public address.
pub const WALLET_ADDRESS_KEY: &str = "walletAddress";
/// Key holding the cached native balance.
pub const WALLET_BALANCE_KEY: &str = "walletBalance";
/// Key holding the cached token list.
pub const WALLET_TOKENS_KEY: &str = "walletTokens";
/// Key holding the cached transaction history.
pub const WALLET_TRANSACTIONS_KEY: &str = "walletTransactions";
/// Key holding the selected network.
pub const WALLET_NETWORK_KEY: &str = "walletNetwork";
/// Key the plain fallback tier stores the private-key record under. Owned
/// by the credential store's tertiary tier; enumerated here so bulk clears
/// cover it.
pub const WALLET_PRIVATE_KEY_FALLBACK_KEY: &str = "walletPrivateKey_fallback";

/// Every key in the wallet namespace.
pub const WALLET_KEYS: [&str; 6] = [
    WALLET_ADDRESS_KEY,
    WALLET_BALANCE_KEY,
    WALLET_TOKENS_KEY,
    WALLET_TRANSACTIONS_KEY,
    WALLET_NETWORK_KEY,
    WALLET_PRIVATE_KEY_FALLBACK_KEY,
];

/// Non-secret wallet fields cached from the blockchain-data provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CachedField {
    /// Native balance for the active address.
    Balance,
    /// Token metadata and balances.
    Tokens,
    /// Recent transaction history.
    Transactions,
    /// The selected network.
    Network,
}

impl CachedField {
    /// The storage key backing this field.
    #[must_use]
    pub const fn key(self) -> &'static str {
        match self {
            Self::Balance => WALLET_BALANCE_KEY,
            Self::Tokens => WALLET_TOKENS_KEY,
            Self::Transactions => WALLET_TRANSACTIONS_KEY,
            Self::Network => WALLET_NETWORK_KEY,
        }
    }
}

/// Typed access to the wallet metadata namespace.
#[derive(Clone)]
pub struct MetadataStore {
    kv: Arc<dyn KeyValueStore>,
}

impl MetadataStore {
    /// Creates a store over the given plain key-value backend.
    #[must_use]
    pub fn new(kv: Arc<dyn KeyValueStore>) -> Self {
        Self { kv }
    }

    /// Records the wallet address.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend cannot persist the value.
    pub fn set_address(&self, address: &str) -> StoreResult<()> {
        self.kv.set(WALLET_ADDRESS_KEY, address)
    }

    /// Returns the stored wallet address, if any.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend fails while reading.
    pub fn address(&self) -> StoreResult<Option<String>> {
        self.kv.get(WALLET_ADDRESS_KEY)
    }

    /// Removes the stored wallet address.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend fails while removing.
    pub fn clear_address(&self) -> StoreResult<()> {
        self.kv.remove(WALLET_ADDRESS_KEY)
    }

    /// Stores a cached field value.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend cannot persist the value.
    pub fn set_cached(&self, field: CachedField, value: &str) -> StoreResult<()> {
        self.kv.set(field.key(), value)
    }

    /// Returns a cached field value, if present.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend fails while reading.
    pub fn cached(&self, field: CachedField) -> StoreResult<Option<String>> {
        self.kv.get(field.key())
    }

    /// Clears every key in the wallet namespace, best effort.
    ///
    /// Each key is attempted independently; failures on keys other than
    /// the address are logged and skipped. The address key is the
    /// user-visible "a wallet exists" signal, so only its failure is
    /// surfaced.
    ///
    /// # Errors
    ///
    /// Returns an error only if the address key could not be removed.
    pub fn clear_wallet_keys(&self) -> StoreResult<()> {
        let mut address_failure = None;
        for key in WALLET_KEYS {
            if let Err(err) = self.kv.remove(key) {
                if key == WALLET_ADDRESS_KEY {
                    address_failure = Some(err);
                } else {
                    warn!(key, error = %err, "failed to clear wallet metadata key");
                }
            }
        }
        address_failure.map_or(Ok(()), Err)
    }

    /// Clears the entire backing namespace, wallet keys and anything else.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend fails while clearing.
    pub fn clear_all(&self) -> StoreResult<()> {
        self.kv.remove_all()
    }
}
