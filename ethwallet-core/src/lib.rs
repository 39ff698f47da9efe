//! Wallet credential lifecycle engine.
//!
//! This crate owns the life of a single wallet account on one device:
//!
//! - [`identity`] validates and constructs key material from fresh
//!   entropy, a seed phrase, or a raw private key.
//! - [`metadata`] persists the non-secret wallet fields in a plain
//!   key-value namespace.
//! - [`TieredCredentialStore`] keeps the private key behind a three-tier
//!   storage chain that degrades from the OS credential manager down to a
//!   logged plain-storage fallback.
//! - [`WalletManager`] drives the absent/present state machine with
//!   serialized mutations, write-then-verify persistence, and rollback on
//!   partial failure.
//!
//! Screens, the blockchain-data provider, and the elliptic-curve math are
//! external collaborators; the key derivation itself is delegated to the
//! `alloy` signer stack.

use strum::{Display, EnumString};

/// Networks the wallet can point its data queries at.
///
/// The wire identifier is the lowercase variant name; display names for
/// UI use come from [`Self::display_name`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, EnumString, Display)]
#[strum(serialize_all = "lowercase")]
pub enum Network {
    /// Ethereum mainnet.
    #[default]
    Ethereum,
    /// Sepolia test network.
    Sepolia,
}

impl Network {
    /// Human-readable network name.
    #[must_use]
    pub const fn display_name(self) -> &'static str {
        match self {
            Self::Ethereum => "Ethereum Mainnet",
            Self::Sepolia => "Sepolia Testnet",
        }
    }
}

mod credential_store;
pub use credential_store::*;

mod error;
pub use error::*;

pub mod identity;
pub use identity::WalletIdentity;

mod manager;
pub use manager::*;

pub mod metadata;
pub use metadata::{CachedField, MetadataStore};
