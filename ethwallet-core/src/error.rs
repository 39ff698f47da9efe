//! Error taxonomy for wallet operations.
//!
//! Validation errors are precise by construction: format and length checks
//! run before any key derivation, so malformed input can never surface as a
//! generic derivation failure. UI layers pick display text by matching on
//! the error kind via [`WalletError::user_message`], never by parsing
//! message strings.

use ethwallet_store::StoreError;
use thiserror::Error;

/// Error outputs from wallet operations.
#[derive(Debug, Error)]
pub enum WalletError {
    /// The private key input is not `0x` followed by 64 hex digits.
    #[error("invalid_private_key_format")]
    InvalidPrivateKeyFormat,
    /// The seed phrase input does not split into 12 or 24 words.
    #[error("invalid_seed_phrase_length: got {0} words")]
    InvalidSeedPhraseLength(usize),
    /// The key library rejected a well-formed private key scalar.
    #[error("invalid_private_key")]
    InvalidPrivateKey,
    /// The key library rejected a well-formed seed phrase (wordlist or
    /// checksum failure).
    #[error("invalid_seed_phrase")]
    InvalidSeedPhrase,
    /// Fresh key generation failed. Unexpected and not user-correctable.
    #[error("key_generation_failed: {0}")]
    KeyGeneration(String),
    /// A wallet is already stored; it must be removed before another one
    /// can be created or imported.
    #[error("wallet_already_exists")]
    WalletAlreadyExists,
    /// No wallet is stored.
    #[error("wallet_not_found")]
    WalletNotFound,
    /// Persisted wallet state is half-present: an address without a
    /// retrievable secret, or a secret recorded for a different address.
    #[error("inconsistent_state: {0}")]
    InconsistentState(String),
    /// Every storage tier failed during a write.
    #[error("storage_unavailable")]
    StorageUnavailable,
    /// A storage backend failed outside the tiered write path.
    #[error(transparent)]
    Storage(#[from] StoreError),
}

impl WalletError {
    /// Returns the human-readable message the UI shows for this error kind.
    #[must_use]
    pub const fn user_message(&self) -> &'static str {
        match self {
            Self::InvalidPrivateKeyFormat => {
                "Private key must be 64 hex characters starting with 0x."
            }
            Self::InvalidSeedPhraseLength(_) => "Seed phrase must be 12 or 24 words long.",
            Self::InvalidPrivateKey => "Invalid private key. Please check and try again.",
            Self::InvalidSeedPhrase => "Invalid seed phrase. Please check your words and try again.",
            Self::WalletAlreadyExists => "A wallet already exists on this device. Remove it first.",
            Self::WalletNotFound => "No wallet found on this device.",
            Self::InconsistentState(_) => {
                "Stored wallet data is incomplete. Please re-import your wallet."
            }
            Self::StorageUnavailable => "Failed to store wallet data securely. Please try again.",
            Self::KeyGeneration(_) | Self::Storage(_) => {
                "Something went wrong. Please try again."
            }
        }
    }
}

/// Result type alias for wallet operations.
pub type WalletResult<T> = Result<T, WalletError>;
