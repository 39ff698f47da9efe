//! On-device storage primitives for the wallet core.
//!
//! This crate defines the storage capabilities the wallet engine depends on,
//! kept deliberately platform-agnostic:
//!
//! - [`KeyValueStore`]: a flat, plain (unprotected) string namespace for
//!   non-secret wallet metadata.
//! - [`SecureCredentialStore`]: a single protected credential slot, the
//!   shape of an OS credential manager entry (username + secret under one
//!   identifier).
//!
//! Platform shells provide the real implementations:
//!
//! - **iOS**: Keychain Services (`kSecClassInternetPassword` /
//!   `kSecClassGenericPassword`) for the secure slots, a property-list file
//!   for the plain namespace.
//! - **Android**: Android Keystore-backed encrypted preferences for the
//!   secure slots, `SharedPreferences` for the plain namespace.
//!
//! Two implementations ship in-crate: [`FileKeyValueStore`], a small
//! JSON-backed plain store with atomic replace semantics, and the
//! [`memory`] backends used throughout the test suites.

mod error;
pub mod file;
mod kv;
pub mod memory;
mod secure;

pub use error::{StoreError, StoreResult};
pub use file::FileKeyValueStore;
pub use kv::KeyValueStore;
pub use secure::{Credential, SecureCredentialStore};
