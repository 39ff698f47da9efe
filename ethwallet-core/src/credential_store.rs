//! Tiered secure storage for the wallet private key.
//!
//! Three backends are attempted in strict order: the OS credential manager,
//! a secondary credential API variant, and a plain key-value fallback with
//! deliberately weaker protection. A later tier is only tried when the
//! previous one errored; an empty slot is an answer, not a failure.

use std::sync::Arc;

use ethwallet_store::{Credential, KeyValueStore, SecureCredentialStore, StoreError, StoreResult};
use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use tracing::warn;
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::error::{WalletError, WalletResult};

/// Identifier for the wallet's credential slot across all tiers.
pub const CREDENTIAL_IDENTIFIER: &str = "walletPrivateKey";

/// Suffix appended to the identifier for the plain-tier storage key.
const FALLBACK_KEY_SUFFIX: &str = "_fallback";

/// The storage tiers, strongest first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display)]
#[strum(serialize_all = "snake_case")]
pub enum StorageTier {
    /// OS credential manager.
    Primary,
    /// Secondary credential API variant.
    Secondary,
    /// Plain key-value storage. Weaker protection; every write landing
    /// here is logged.
    PlainFallback,
}

/// On-disk record for the plain fallback tier.
///
/// Keeps the username next to the secret so the address consistency check
/// works on every tier. Zeroized on drop.
#[derive(Serialize, Deserialize, Zeroize, ZeroizeOnDrop)]
struct FallbackRecord {
    username: String,
    secret: String,
}

/// Adapts a plain [`KeyValueStore`] into the weakest credential tier.
pub struct PlainFallbackTier {
    kv: Arc<dyn KeyValueStore>,
}

impl PlainFallbackTier {
    /// Creates the tier over the given plain backend.
    #[must_use]
    pub fn new(kv: Arc<dyn KeyValueStore>) -> Self {
        Self { kv }
    }

    fn storage_key(identifier: &str) -> String {
        format!("{identifier}{FALLBACK_KEY_SUFFIX}")
    }
}

impl SecureCredentialStore for PlainFallbackTier {
    fn set_credential(&self, identifier: &str, username: &str, secret: &str) -> StoreResult<()> {
        let record = FallbackRecord {
            username: username.to_string(),
            secret: secret.to_string(),
        };
        let json = serde_json::to_string(&record)
            .map_err(|err| StoreError::Serialization(err.to_string()))?;
        self.kv.set(&Self::storage_key(identifier), &json)
    }

    fn get_credential(&self, identifier: &str) -> StoreResult<Option<Credential>> {
        let Some(json) = self.kv.get(&Self::storage_key(identifier))? else {
            return Ok(None);
        };
        let record: FallbackRecord = serde_json::from_str(&json)
            .map_err(|err| StoreError::corrupted(format!("fallback credential record: {err}")))?;
        Ok(Some(Credential {
            username: record.username.clone(),
            secret: SecretString::from(record.secret.clone()),
        }))
    }

    fn clear_credential(&self, identifier: &str) -> StoreResult<()> {
        self.kv.remove(&Self::storage_key(identifier))
    }
}

/// The private-key store: an ordered chain of credential tiers.
///
/// Writes and reads walk the chain in order, moving on only when a tier
/// errors. Clear walks every tier regardless of individual failures, as
/// defense against partial state left behind by an earlier partial write.
pub struct TieredCredentialStore {
    tiers: Vec<(StorageTier, Arc<dyn SecureCredentialStore>)>,
}

impl TieredCredentialStore {
    /// Builds the standard three-tier chain.
    #[must_use]
    pub fn new(
        primary: Arc<dyn SecureCredentialStore>,
        secondary: Arc<dyn SecureCredentialStore>,
        fallback_kv: Arc<dyn KeyValueStore>,
    ) -> Self {
        Self::with_tiers(vec![
            (StorageTier::Primary, primary),
            (StorageTier::Secondary, secondary),
            (
                StorageTier::PlainFallback,
                Arc::new(PlainFallbackTier::new(fallback_kv)),
            ),
        ])
    }

    /// Builds a chain from an explicit tier list, strongest first.
    #[must_use]
    pub fn with_tiers(tiers: Vec<(StorageTier, Arc<dyn SecureCredentialStore>)>) -> Self {
        Self { tiers }
    }

    /// Writes the credential to the first tier that accepts it.
    ///
    /// Returns the tier that satisfied the write. A write landing below
    /// [`StorageTier::Primary`] is logged, since the secret then sits
    /// under weaker protection than intended.
    ///
    /// # Errors
    ///
    /// Returns [`WalletError::StorageUnavailable`] if every tier fails.
    pub fn store(&self, username: &str, secret: &str) -> WalletResult<StorageTier> {
        for (tier, backend) in &self.tiers {
            match backend.set_credential(CREDENTIAL_IDENTIFIER, username, secret) {
                Ok(()) => {
                    if *tier != StorageTier::Primary {
                        warn!(%tier, "private key stored on a weaker tier");
                    }
                    return Ok(*tier);
                }
                Err(err) => {
                    warn!(%tier, error = %err, "credential write failed, trying next tier");
                }
            }
        }
        Err(WalletError::StorageUnavailable)
    }

    /// Reads the credential from the first tier holding one, together with
    /// the tier that answered.
    ///
    /// Tier errors are logged and skipped. `None` means no tier holds a
    /// credential; an absent wallet is a normal state, not an error.
    #[must_use]
    pub fn fetch(&self) -> Option<(Credential, StorageTier)> {
        for (tier, backend) in &self.tiers {
            match backend.get_credential(CREDENTIAL_IDENTIFIER) {
                Ok(Some(credential)) => return Some((credential, *tier)),
                Ok(None) => {}
                Err(err) => {
                    warn!(%tier, error = %err, "credential read failed, trying next tier");
                }
            }
        }
        None
    }

    /// Clears every tier, unconditionally and independently.
    ///
    /// Returns the per-tier failures; the caller decides how loudly to
    /// report them.
    #[must_use]
    pub fn clear(&self) -> Vec<(StorageTier, StoreError)> {
        let mut failures = Vec::new();
        for (tier, backend) in &self.tiers {
            if let Err(err) = backend.clear_credential(CREDENTIAL_IDENTIFIER) {
                failures.push((*tier, err));
            }
        }
        failures
    }
}
