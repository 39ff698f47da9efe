//! The wallet lifecycle state machine.
//!
//! At most one wallet is resident at a time. Mutating operations are
//! serialized behind a write lock so interleaved storage writes can never
//! produce the address-present/secret-absent state. Within
//! `create`/`import`, the metadata write strictly precedes the credential
//! write, and rollback is only entered once the metadata write has
//! succeeded, so it is always clear which write to undo.

use alloy_primitives::Address;
use secrecy::{ExposeSecret, SecretString};
use tokio::sync::RwLock;
use tracing::{error, info, warn};

use crate::credential_store::{StorageTier, TieredCredentialStore};
use crate::error::{WalletError, WalletResult};
use crate::identity::{self, WalletIdentity};
use crate::metadata::{CachedField, MetadataStore};
use crate::Network;

/// Whether a wallet is currently resident.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WalletState {
    /// No wallet is stored.
    Absent,
    /// A wallet is stored under the given address.
    Present {
        /// The resident wallet's address.
        address: Address,
    },
}

impl WalletState {
    /// Returns the resident address, if any.
    #[must_use]
    pub const fn address(&self) -> Option<Address> {
        match self {
            Self::Absent => None,
            Self::Present { address } => Some(*address),
        }
    }
}

/// How an existing wallet is brought in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImportMethod {
    /// Raw `0x`-prefixed private key.
    PrivateKey,
    /// BIP-39 seed phrase.
    SeedPhrase,
}

/// Coordinates key material, the metadata namespace, and the credential
/// tiers behind the single-wallet state machine.
pub struct WalletManager {
    metadata: MetadataStore,
    credentials: TieredCredentialStore,
    state: RwLock<WalletState>,
}

impl WalletManager {
    /// Creates a manager over the given stores.
    ///
    /// The in-memory state starts [`WalletState::Absent`]; call
    /// [`Self::startup`] to populate it from storage.
    #[must_use]
    pub fn new(metadata: MetadataStore, credentials: TieredCredentialStore) -> Self {
        Self {
            metadata,
            credentials,
            state: RwLock::new(WalletState::Absent),
        }
    }

    /// The current in-memory wallet state.
    pub async fn current_state(&self) -> WalletState {
        *self.state.read().await
    }

    /// Cold-start entry point: runs the development wipe when compiled in,
    /// then loads persisted state.
    ///
    /// Inconsistent persisted state is mapped to [`WalletState::Absent`]
    /// here so a damaged install asks for re-import instead of failing to
    /// start.
    ///
    /// # Errors
    ///
    /// Returns an error if the metadata backend fails while reading.
    pub async fn startup(&self) -> WalletResult<WalletState> {
        #[cfg(feature = "dev-reset")]
        self.dev_wipe_on_start().await;

        match self.load().await {
            Ok(state) => Ok(state),
            Err(WalletError::InconsistentState(_)) => Ok(WalletState::Absent),
            Err(err) => Err(err),
        }
    }

    /// Refreshes the in-memory state from storage.
    ///
    /// # Errors
    ///
    /// Returns [`WalletError::InconsistentState`] if an address is
    /// recorded without a matching secret (the in-memory state is set to
    /// absent so re-import can proceed), or a storage error if the
    /// metadata backend fails while reading.
    pub async fn load(&self) -> WalletResult<WalletState> {
        let mut state = self.state.write().await;

        let Some(stored) = self.metadata.address()? else {
            *state = WalletState::Absent;
            return Ok(WalletState::Absent);
        };

        let Ok(address) = stored.parse::<Address>() else {
            error!(address = %stored, "stored wallet address does not parse, treating wallet as absent");
            *state = WalletState::Absent;
            return Err(WalletError::InconsistentState(
                "stored wallet address is malformed".into(),
            ));
        };

        match self.credentials.fetch() {
            Some((credential, tier)) if credential.username == stored => {
                info!(address = %stored, %tier, "wallet loaded");
                *state = WalletState::Present { address };
                Ok(*state)
            }
            Some((credential, tier)) => {
                error!(
                    address = %stored,
                    stored_username = %credential.username,
                    %tier,
                    "stored secret belongs to a different address, treating wallet as absent"
                );
                *state = WalletState::Absent;
                Err(WalletError::InconsistentState(
                    "stored secret does not match the recorded address".into(),
                ))
            }
            None => {
                error!(
                    address = %stored,
                    "wallet address recorded but no secret found in any tier, treating wallet as absent"
                );
                *state = WalletState::Absent;
                Err(WalletError::InconsistentState(
                    "wallet address recorded but no secret is stored".into(),
                ))
            }
        }
    }

    /// Creates a fresh wallet. Fails if one is already resident.
    ///
    /// The returned identity carries the recovery phrase for one-time
    /// display; it is not retrievable later.
    ///
    /// # Errors
    ///
    /// Returns [`WalletError::WalletAlreadyExists`] if a healthy wallet is
    /// already stored, [`WalletError::KeyGeneration`] if entropy or
    /// derivation fails, or [`WalletError::StorageUnavailable`] if no tier
    /// accepted the secret.
    pub async fn create(&self) -> WalletResult<WalletIdentity> {
        let mut state = self.state.write().await;
        self.ensure_no_wallet(&state)?;

        let wallet = identity::generate_new()?;
        let tier = self.persist(&wallet)?;
        *state = WalletState::Present {
            address: wallet.address(),
        };
        info!(address = %wallet.address(), %tier, "wallet created");
        Ok(wallet)
    }

    /// Imports a wallet from a private key or seed phrase.
    ///
    /// Validation failures leave both storage and the in-memory state
    /// untouched.
    ///
    /// # Errors
    ///
    /// Returns the validation errors of [`identity::from_private_key`] or
    /// [`identity::from_seed_phrase`], [`WalletError::WalletAlreadyExists`]
    /// if a healthy wallet is already stored, or
    /// [`WalletError::StorageUnavailable`] if no tier accepted the secret.
    pub async fn import(&self, method: ImportMethod, input: &str) -> WalletResult<WalletIdentity> {
        let mut state = self.state.write().await;
        self.ensure_no_wallet(&state)?;

        let wallet = match method {
            ImportMethod::PrivateKey => identity::from_private_key(input)?,
            ImportMethod::SeedPhrase => identity::from_seed_phrase(input)?,
        };
        let tier = self.persist(&wallet)?;
        *state = WalletState::Present {
            address: wallet.address(),
        };
        info!(address = %wallet.address(), %tier, "wallet imported");
        Ok(wallet)
    }

    /// Returns the persisted private key for the export flow.
    ///
    /// Re-authorization is the caller's gate, layered above this call. The
    /// secret is returned as a [`SecretString`] that zeroizes on drop; the
    /// manager holds no copy beyond this call.
    ///
    /// # Errors
    ///
    /// Returns [`WalletError::WalletNotFound`] if no wallet is stored, or
    /// [`WalletError::InconsistentState`] if the stored secret is missing
    /// or recorded for a different address.
    pub async fn export_private_key(&self) -> WalletResult<SecretString> {
        let _guard = self.state.read().await;

        let Some(address) = self.metadata.address()? else {
            return Err(WalletError::WalletNotFound);
        };
        match self.credentials.fetch() {
            Some((credential, _)) if credential.username == address => Ok(credential.secret),
            Some((credential, tier)) => {
                error!(
                    address = %address,
                    stored_username = %credential.username,
                    %tier,
                    "stored secret belongs to a different address"
                );
                Err(WalletError::InconsistentState(
                    "stored secret does not match the recorded address".into(),
                ))
            }
            None => {
                error!(address = %address, "no secret found in any tier for the recorded address");
                Err(WalletError::InconsistentState(
                    "wallet address recorded but no secret is stored".into(),
                ))
            }
        }
    }

    /// Removes the resident wallet: clears the metadata namespace and
    /// every credential tier, best effort across the board.
    ///
    /// Secret-tier clear failures are logged but do not fail the
    /// operation; the address key is the user-visible "a wallet exists"
    /// signal, so only its failure is surfaced.
    ///
    /// # Errors
    ///
    /// Returns an error only if the metadata address key could not be
    /// cleared.
    pub async fn remove(&self) -> WalletResult<()> {
        let mut state = self.state.write().await;

        for (tier, err) in self.credentials.clear() {
            warn!(%tier, error = %err, "failed to clear credential tier during removal");
        }
        self.metadata.clear_wallet_keys()?;

        *state = WalletState::Absent;
        info!("wallet removed");
        Ok(())
    }

    /// Caches a non-secret field value fetched from the data provider.
    ///
    /// # Errors
    ///
    /// Returns an error if the metadata backend cannot persist the value.
    pub fn set_cached(&self, field: CachedField, value: &str) -> WalletResult<()> {
        Ok(self.metadata.set_cached(field, value)?)
    }

    /// Returns a cached field value, if present.
    ///
    /// # Errors
    ///
    /// Returns an error if the metadata backend fails while reading.
    pub fn cached(&self, field: CachedField) -> WalletResult<Option<String>> {
        Ok(self.metadata.cached(field)?)
    }

    /// Persists the selected network.
    ///
    /// # Errors
    ///
    /// Returns an error if the metadata backend cannot persist the value.
    pub fn set_network(&self, network: Network) -> WalletResult<()> {
        Ok(self
            .metadata
            .set_cached(CachedField::Network, &network.to_string())?)
    }

    /// Returns the selected network, or `None` when unset or unreadable.
    ///
    /// # Errors
    ///
    /// Returns an error if the metadata backend fails while reading.
    pub fn network(&self) -> WalletResult<Option<Network>> {
        let Some(stored) = self.metadata.cached(CachedField::Network)? else {
            return Ok(None);
        };
        match stored.parse::<Network>() {
            Ok(network) => Ok(Some(network)),
            Err(_) => {
                warn!(value = %stored, "unrecognized stored network value");
                Ok(None)
            }
        }
    }

    /// Guard for `create`/`import`: refuses while a wallet is resident.
    ///
    /// A dangling address with no retrievable secret does not count as
    /// resident; overwriting it is the recovery path after an earlier
    /// interrupted write.
    fn ensure_no_wallet(&self, state: &WalletState) -> WalletResult<()> {
        if matches!(state, WalletState::Present { .. }) {
            return Err(WalletError::WalletAlreadyExists);
        }
        if let Some(address) = self.metadata.address()? {
            if self.credentials.fetch().is_some() {
                return Err(WalletError::WalletAlreadyExists);
            }
            warn!(address = %address, "dangling wallet address with no stored secret, allowing overwrite");
        }
        Ok(())
    }

    /// Writes the identity out: metadata address first, then the secret.
    ///
    /// The credential is read back after the write to confirm the slot
    /// holds exactly what was written. On a failed or unverifiable secret
    /// write, the metadata write is rolled back so no address is left
    /// pointing at an unretrievable key.
    fn persist(&self, wallet: &WalletIdentity) -> WalletResult<StorageTier> {
        let address = wallet.checksummed_address();
        self.metadata.set_address(&address)?;

        match self
            .credentials
            .store(&address, wallet.private_key().expose_secret())
        {
            Ok(tier) => {
                if self.verify_written(&address, wallet.private_key()) {
                    Ok(tier)
                } else {
                    error!(address = %address, "credential readback mismatch after write");
                    for (tier, err) in self.credentials.clear() {
                        warn!(%tier, error = %err, "failed to clear credential tier during rollback");
                    }
                    self.rollback_address(&address);
                    Err(WalletError::StorageUnavailable)
                }
            }
            Err(err) => {
                self.rollback_address(&address);
                Err(err)
            }
        }
    }

    /// Confirms the credential slot reads back exactly what was written.
    fn verify_written(&self, address: &str, secret: &SecretString) -> bool {
        self.credentials.fetch().is_some_and(|(credential, _)| {
            credential.username == address
                && credential.secret.expose_secret() == secret.expose_secret()
        })
    }

    fn rollback_address(&self, address: &str) {
        if let Err(err) = self.metadata.clear_address() {
            error!(
                address = %address,
                error = %err,
                "failed to roll back wallet address after secret write failure"
            );
        }
    }
}

#[cfg(feature = "dev-reset")]
impl WalletManager {
    /// Development-only wipe executed on every cold start.
    ///
    /// Unconditionally clears the wallet namespace and every credential
    /// tier. Failures are logged and swallowed so a broken backend cannot
    /// block startup. This function does not exist in builds without the
    /// `dev-reset` feature.
    pub async fn dev_wipe_on_start(&self) {
        let mut state = self.state.write().await;
        warn!("dev-reset: auto-clearing wallet data on start");
        for (tier, err) in self.credentials.clear() {
            warn!(%tier, error = %err, "dev-reset: failed to clear credential tier");
        }
        if let Err(err) = self.metadata.clear_wallet_keys() {
            warn!(error = %err, "dev-reset: failed to clear wallet metadata");
        }
        *state = WalletState::Absent;
    }

    /// Development-only full wipe: the entire metadata namespace (wallet
    /// keys and anything else) plus every credential tier.
    ///
    /// # Errors
    ///
    /// Returns an error if the metadata namespace could not be cleared.
    pub async fn debug_clear_all_data(&self) -> WalletResult<()> {
        let mut state = self.state.write().await;
        warn!("dev-reset: clearing all app data");
        for (tier, err) in self.credentials.clear() {
            warn!(%tier, error = %err, "dev-reset: failed to clear credential tier");
        }
        self.metadata.clear_all()?;
        *state = WalletState::Absent;
        Ok(())
    }
}
