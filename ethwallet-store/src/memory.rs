//! In-memory implementations of the storage traits for testing.
//!
//! These implementations are NOT secure for production use. They exist so
//! the wallet engine's fallback and rollback paths can be exercised without
//! a device, including injected backend failures.

// Allow certain clippy lints for test-only code
#![allow(clippy::missing_panics_doc)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::RwLock;

use secrecy::SecretString;

use crate::error::{StoreError, StoreResult};
use crate::kv::KeyValueStore;
use crate::secure::{Credential, SecureCredentialStore};

// =============================================================================
// Memory Key-Value Store
// =============================================================================

/// In-memory plain key-value store backed by a `HashMap`.
///
/// Thread-safe, with toggles to inject backend failures on the write, read,
/// and clear paths.
#[derive(Default)]
pub struct MemoryKeyValueStore {
    /// Stored entries, keyed by name.
    entries: RwLock<HashMap<String, String>>,
    fail_writes: AtomicBool,
    fail_reads: AtomicBool,
    fail_removes: AtomicBool,
}

impl MemoryKeyValueStore {
    /// Creates a new empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every subsequent `set` fail when `fail` is `true`.
    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// Makes every subsequent `get` fail when `fail` is `true`.
    pub fn set_fail_reads(&self, fail: bool) {
        self.fail_reads.store(fail, Ordering::SeqCst);
    }

    /// Makes every subsequent `remove`/`remove_all` fail when `fail` is
    /// `true`.
    pub fn set_fail_removes(&self, fail: bool) {
        self.fail_removes.store(fail, Ordering::SeqCst);
    }

    /// Returns the number of stored entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.read().unwrap().len()
    }

    /// Returns `true` if no entries are stored.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.read().unwrap().is_empty()
    }

    /// Returns a list of all stored keys.
    #[must_use]
    pub fn keys(&self) -> Vec<String> {
        self.entries.read().unwrap().keys().cloned().collect()
    }
}

impl KeyValueStore for MemoryKeyValueStore {
    fn set(&self, key: &str, value: &str) -> StoreResult<()> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(StoreError::unavailable("injected write failure"));
        }
        self.entries
            .write()
            .unwrap()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn get(&self, key: &str) -> StoreResult<Option<String>> {
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(StoreError::unavailable("injected read failure"));
        }
        Ok(self.entries.read().unwrap().get(key).cloned())
    }

    fn remove(&self, key: &str) -> StoreResult<()> {
        if self.fail_removes.load(Ordering::SeqCst) {
            return Err(StoreError::unavailable("injected remove failure"));
        }
        self.entries.write().unwrap().remove(key);
        Ok(())
    }

    fn remove_all(&self) -> StoreResult<()> {
        if self.fail_removes.load(Ordering::SeqCst) {
            return Err(StoreError::unavailable("injected remove failure"));
        }
        self.entries.write().unwrap().clear();
        Ok(())
    }
}

// =============================================================================
// Memory Secure Store
// =============================================================================

/// In-memory secure credential store backed by a `HashMap`.
///
/// Offers no real protection; the value of this type is that each call path
/// can be made to fail on demand, which is how the tier-fallback logic is
/// tested.
#[derive(Default)]
pub struct MemorySecureStore {
    /// Slots keyed by identifier, holding `(username, secret)`.
    slots: RwLock<HashMap<String, (String, String)>>,
    fail_writes: AtomicBool,
    fail_reads: AtomicBool,
    fail_clears: AtomicBool,
}

impl MemorySecureStore {
    /// Creates a new empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every subsequent `set_credential` fail when `fail` is `true`.
    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// Makes every subsequent `get_credential` fail when `fail` is `true`.
    pub fn set_fail_reads(&self, fail: bool) {
        self.fail_reads.store(fail, Ordering::SeqCst);
    }

    /// Makes every subsequent `clear_credential` fail when `fail` is `true`.
    pub fn set_fail_clears(&self, fail: bool) {
        self.fail_clears.store(fail, Ordering::SeqCst);
    }

    /// Returns `true` if a slot exists under `identifier`.
    #[must_use]
    pub fn contains(&self, identifier: &str) -> bool {
        self.slots.read().unwrap().contains_key(identifier)
    }

    /// Returns the number of occupied slots.
    #[must_use]
    pub fn len(&self) -> usize {
        self.slots.read().unwrap().len()
    }

    /// Returns `true` if no slots are occupied.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.slots.read().unwrap().is_empty()
    }
}

impl SecureCredentialStore for MemorySecureStore {
    fn set_credential(&self, identifier: &str, username: &str, secret: &str) -> StoreResult<()> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(StoreError::unavailable("injected write failure"));
        }
        self.slots.write().unwrap().insert(
            identifier.to_string(),
            (username.to_string(), secret.to_string()),
        );
        Ok(())
    }

    fn get_credential(&self, identifier: &str) -> StoreResult<Option<Credential>> {
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(StoreError::unavailable("injected read failure"));
        }
        Ok(self
            .slots
            .read()
            .unwrap()
            .get(identifier)
            .map(|(username, secret)| Credential {
                username: username.clone(),
                secret: SecretString::from(secret.clone()),
            }))
    }

    fn clear_credential(&self, identifier: &str) -> StoreResult<()> {
        if self.fail_clears.load(Ordering::SeqCst) {
            return Err(StoreError::unavailable("injected clear failure"));
        }
        self.slots.write().unwrap().remove(identifier);
        Ok(())
    }
}

// =============================================================================
// Tests
// =============================================================================
