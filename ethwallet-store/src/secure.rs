//! Secure credential slot trait.

use secrecy::SecretString;

use crate::error::StoreResult;

/// A username/secret pair read back from a secure slot.
///
/// The secret is wrapped in [`SecretString`] so it is redacted from `Debug`
/// output and zeroized on drop.
#[derive(Debug)]
pub struct Credential {
    /// The username recorded alongside the secret (the wallet address).
    pub username: String,
    /// The protected secret value.
    pub secret: SecretString,
}

/// A single protected credential slot with OS-level protection semantics.
///
/// Platform implementations should back this with a hardware-protected
/// credential manager where available:
///
/// - iOS: Keychain Services with `kSecAttrAccessibleWhenUnlockedThisDeviceOnly`
/// - Android: Android Keystore-encrypted preferences
///
/// One `identifier` addresses one logical slot holding at most one
/// `(username, secret)` pair; setting a slot replaces its previous content.
pub trait SecureCredentialStore: Send + Sync {
    /// Stores `(username, secret)` under `identifier`, replacing any
    /// existing entry.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend cannot persist the credential.
    fn set_credential(&self, identifier: &str, username: &str, secret: &str) -> StoreResult<()>;

    /// Returns the credential stored under `identifier`, or `None` if the
    /// slot is empty.
    ///
    /// # Errors
    ///
    /// Returns an error only for backend failures, never for an empty slot.
    fn get_credential(&self, identifier: &str) -> StoreResult<Option<Credential>>;

    /// Clears the slot under `identifier`. An already-empty slot is not an
    /// error.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend fails while clearing.
    fn clear_credential(&self, identifier: &str) -> StoreResult<()>;
}
