//! Plain key-value storage trait.

use crate::error::StoreResult;

/// A flat, plain string namespace for non-secret data.
///
/// This is the shape of `AsyncStorage`/`SharedPreferences`-style device
/// storage: string keys, string values, no protection beyond file
/// permissions. Secret material MUST NOT be written here except through an
/// explicitly designated fallback path that the caller logs and tracks.
///
/// # Semantics
///
/// - `set` replaces any existing value.
/// - `get` returns `Ok(None)` for a missing key; errors are reserved for
///   backend failures.
/// - `remove` is a no-op for a missing key and returns `Ok(())`.
pub trait KeyValueStore: Send + Sync {
    /// Stores `value` under `key`, replacing any existing value.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend cannot persist the value.
    fn set(&self, key: &str, value: &str) -> StoreResult<()>;

    /// Returns the value stored under `key`, or `None` if absent.
    ///
    /// # Errors
    ///
    /// Returns an error only for backend failures, never for a missing key.
    fn get(&self, key: &str) -> StoreResult<Option<String>>;

    /// Removes the value stored under `key`. Missing keys are not an error.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend fails while removing.
    fn remove(&self, key: &str) -> StoreResult<()>;

    /// Removes every key in `keys`, stopping at the first backend failure.
    ///
    /// # Errors
    ///
    /// Returns the first backend error encountered.
    fn remove_many(&self, keys: &[&str]) -> StoreResult<()> {
        for key in keys {
            self.remove(key)?;
        }
        Ok(())
    }

    /// Removes every key in the namespace.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend fails while clearing.
    fn remove_all(&self) -> StoreResult<()>;
}
