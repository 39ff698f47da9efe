//! End-to-end wallet lifecycle tests over in-memory storage backends.

use std::sync::Arc;

use ethwallet_core::{
    identity, CachedField, ImportMethod, MetadataStore, Network, StorageTier,
    TieredCredentialStore, WalletError, WalletManager, WalletState, CREDENTIAL_IDENTIFIER,
};
use ethwallet_core::metadata::{WALLET_ADDRESS_KEY, WALLET_PRIVATE_KEY_FALLBACK_KEY};
use ethwallet_store::memory::{MemoryKeyValueStore, MemorySecureStore};
use ethwallet_store::{FileKeyValueStore, KeyValueStore, SecureCredentialStore};
use secrecy::ExposeSecret;

struct Harness {
    metadata_kv: Arc<MemoryKeyValueStore>,
    primary: Arc<MemorySecureStore>,
    secondary: Arc<MemorySecureStore>,
    fallback_kv: Arc<MemoryKeyValueStore>,
    manager: Arc<WalletManager>,
}

fn harness() -> Harness {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();

    let metadata_kv = Arc::new(MemoryKeyValueStore::new());
    let primary = Arc::new(MemorySecureStore::new());
    let secondary = Arc::new(MemorySecureStore::new());
    let fallback_kv = Arc::new(MemoryKeyValueStore::new());

    let manager = Arc::new(WalletManager::new(
        MetadataStore::new(metadata_kv.clone()),
        TieredCredentialStore::new(primary.clone(), secondary.clone(), fallback_kv.clone()),
    ));

    Harness {
        metadata_kv,
        primary,
        secondary,
        fallback_kv,
        manager,
    }
}

#[tokio::test]
async fn test_create_then_export_round_trips_secret() {
    let h = harness();
    assert_eq!(
        h.manager.startup().await.expect("startup"),
        WalletState::Absent
    );

    let wallet = h.manager.create().await.expect("create");
    assert_eq!(
        h.manager.current_state().await,
        WalletState::Present {
            address: wallet.address()
        }
    );
    assert_eq!(
        wallet
            .mnemonic()
            .expect("fresh wallet has a recovery phrase")
            .expose_secret()
            .split_whitespace()
            .count(),
        12
    );

    // The secret landed on the primary tier, not in plain storage.
    assert!(h.primary.contains(CREDENTIAL_IDENTIFIER));
    assert!(h.fallback_kv.is_empty());
    assert_eq!(
        h.metadata_kv.get(WALLET_ADDRESS_KEY).unwrap().as_deref(),
        Some(wallet.checksummed_address().as_str())
    );

    let exported = h.manager.export_private_key().await.expect("export");
    assert_eq!(
        exported.expose_secret(),
        wallet.private_key().expose_secret()
    );
}

#[tokio::test]
async fn test_wallet_survives_manager_restart() {
    let h = harness();
    let wallet = h.manager.create().await.expect("create");

    // A fresh manager over the same stores simulates a cold start.
    let restarted = WalletManager::new(
        MetadataStore::new(h.metadata_kv.clone()),
        TieredCredentialStore::new(
            h.primary.clone(),
            h.secondary.clone(),
            h.fallback_kv.clone(),
        ),
    );
    assert_eq!(
        restarted.startup().await.expect("startup"),
        WalletState::Present {
            address: wallet.address()
        }
    );
}

#[tokio::test]
async fn test_create_twice_fails() {
    let h = harness();
    h.manager.create().await.expect("create");
    match h.manager.create().await {
        Err(WalletError::WalletAlreadyExists) => {}
        other => panic!("expected wallet already exists, got {other:?}"),
    }
}

#[tokio::test]
async fn test_import_private_key_is_deterministic() {
    let h = harness();
    let key = format!("0x{}", "11".repeat(32));

    let first = h
        .manager
        .import(ImportMethod::PrivateKey, &key)
        .await
        .expect("import");
    assert!(first.mnemonic().is_none());

    h.manager.remove().await.expect("remove");
    let second = h
        .manager
        .import(ImportMethod::PrivateKey, &key)
        .await
        .expect("re-import");
    assert_eq!(first.address(), second.address());

    let exported = h.manager.export_private_key().await.expect("export");
    assert_eq!(exported.expose_secret(), key);
}

#[tokio::test]
async fn test_import_seed_phrase_known_vector() {
    let h = harness();
    let phrase = "test test test test test test test test test test test junk";

    let wallet = h
        .manager
        .import(ImportMethod::SeedPhrase, phrase)
        .await
        .expect("import");
    assert_eq!(
        wallet.checksummed_address(),
        "0xf39Fd6e51aad88F6F4ce6aB8827279cffFb92266"
    );
    assert_eq!(wallet.mnemonic().expect("mnemonic").expose_secret(), phrase);
}

#[tokio::test]
async fn test_import_validation_failures_leave_no_trace() {
    let h = harness();

    match h.manager.import(ImportMethod::PrivateKey, "0x1234").await {
        Err(WalletError::InvalidPrivateKeyFormat) => {}
        other => panic!("expected format error, got {other:?}"),
    }

    let thirteen = vec!["zoo"; 13].join(" ");
    match h.manager.import(ImportMethod::SeedPhrase, &thirteen).await {
        Err(WalletError::InvalidSeedPhraseLength(13)) => {}
        other => panic!("expected length error, got {other:?}"),
    }

    let bad_word = format!("{} notaword", vec!["zoo"; 11].join(" "));
    match h.manager.import(ImportMethod::SeedPhrase, &bad_word).await {
        Err(WalletError::InvalidSeedPhrase) => {}
        other => panic!("expected invalid seed phrase, got {other:?}"),
    }

    assert_eq!(h.manager.current_state().await, WalletState::Absent);
    assert!(h.metadata_kv.is_empty());
    assert!(h.primary.is_empty());
}

#[tokio::test]
async fn test_remove_clears_every_tier() {
    let h = harness();
    h.manager.create().await.expect("create");

    // Seed the weaker tiers as if earlier writes had fallen through.
    h.secondary
        .set_credential(CREDENTIAL_IDENTIFIER, "0xstale", "stale")
        .unwrap();
    h.fallback_kv
        .set(
            WALLET_PRIVATE_KEY_FALLBACK_KEY,
            r#"{"username":"0xstale","secret":"stale"}"#,
        )
        .unwrap();

    h.manager.remove().await.expect("remove");

    assert!(h.metadata_kv.get(WALLET_ADDRESS_KEY).unwrap().is_none());
    assert!(h.primary.is_empty());
    assert!(h.secondary.is_empty());
    assert!(h
        .fallback_kv
        .get(WALLET_PRIVATE_KEY_FALLBACK_KEY)
        .unwrap()
        .is_none());
    assert_eq!(h.manager.load().await.expect("load"), WalletState::Absent);
}

#[tokio::test]
async fn test_remove_succeeds_despite_tier_clear_failure() {
    let h = harness();
    h.manager.create().await.expect("create");

    h.primary.set_fail_clears(true);
    h.manager
        .remove()
        .await
        .expect("remove succeeds when only a secret tier fails to clear");

    assert!(h.metadata_kv.get(WALLET_ADDRESS_KEY).unwrap().is_none());
    assert_eq!(h.manager.current_state().await, WalletState::Absent);
}

#[tokio::test]
async fn test_failed_secret_write_rolls_back_address() {
    let h = harness();
    h.primary.set_fail_writes(true);
    h.secondary.set_fail_writes(true);
    h.fallback_kv.set_fail_writes(true);

    match h.manager.create().await {
        Err(WalletError::StorageUnavailable) => {}
        other => panic!("expected storage unavailable, got {other:?}"),
    }

    // The metadata write happened first and must have been rolled back.
    assert!(h.metadata_kv.get(WALLET_ADDRESS_KEY).unwrap().is_none());
    assert_eq!(h.manager.current_state().await, WalletState::Absent);
    assert_eq!(h.manager.load().await.expect("load"), WalletState::Absent);
}

#[tokio::test]
async fn test_create_falls_back_to_weaker_tiers() {
    let h = harness();
    h.primary.set_fail_writes(true);
    h.primary.set_fail_reads(true);
    h.secondary.set_fail_writes(true);

    let wallet = h.manager.create().await.expect("create");

    // The secret record landed under the distinctly-named plain key and
    // kept the address alongside it.
    let record = h
        .fallback_kv
        .get(WALLET_PRIVATE_KEY_FALLBACK_KEY)
        .unwrap()
        .expect("fallback record");
    assert!(record.contains(&wallet.checksummed_address()));

    let exported = h.manager.export_private_key().await.expect("export");
    assert_eq!(
        exported.expose_secret(),
        wallet.private_key().expose_secret()
    );
}

#[tokio::test]
async fn test_dangling_address_is_inconsistent_and_recoverable() {
    let h = harness();
    let wallet = h.manager.create().await.expect("create");

    // The secret vanishes (say, an OS keychain wipe) while the address
    // pointer stays behind.
    h.primary.clear_credential(CREDENTIAL_IDENTIFIER).unwrap();

    match h.manager.load().await {
        Err(WalletError::InconsistentState(_)) => {}
        other => panic!("expected inconsistent state, got {other:?}"),
    }
    assert_eq!(h.manager.current_state().await, WalletState::Absent);

    // A cold start maps the same condition to an absent wallet.
    assert_eq!(
        h.manager.startup().await.expect("startup"),
        WalletState::Absent
    );

    match h.manager.export_private_key().await {
        Err(WalletError::InconsistentState(_)) => {}
        other => panic!("expected inconsistent state, got {other:?}"),
    }

    // Re-import over the dangling address is the recovery path.
    let key = format!("0x{}", "22".repeat(32));
    let imported = h
        .manager
        .import(ImportMethod::PrivateKey, &key)
        .await
        .expect("import over dangling address");
    assert_ne!(imported.address(), wallet.address());
    assert_eq!(
        h.manager.load().await.expect("load"),
        WalletState::Present {
            address: imported.address()
        }
    );
}

#[tokio::test]
async fn test_secret_for_wrong_address_is_inconsistent() {
    let h = harness();
    h.manager.create().await.expect("create");

    // Overwrite the stored credential with one for a different account.
    h.primary
        .set_credential(CREDENTIAL_IDENTIFIER, "0xsomeone-else", "secret")
        .unwrap();

    match h.manager.load().await {
        Err(WalletError::InconsistentState(_)) => {}
        other => panic!("expected inconsistent state, got {other:?}"),
    }
    match h.manager.export_private_key().await {
        Err(WalletError::InconsistentState(_)) => {}
        other => panic!("expected inconsistent state, got {other:?}"),
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_creates_persist_exactly_one_wallet() {
    let h = harness();

    let first = tokio::spawn({
        let manager = h.manager.clone();
        async move { manager.create().await }
    });
    let second = tokio::spawn({
        let manager = h.manager.clone();
        async move { manager.create().await }
    });
    let results = [first.await.expect("join"), second.await.expect("join")];

    let winners: Vec<_> = results.iter().filter_map(|r| r.as_ref().ok()).collect();
    assert_eq!(winners.len(), 1, "exactly one create must win");
    match results.iter().find(|r| r.is_err()).expect("one loser") {
        Err(WalletError::WalletAlreadyExists) => {}
        other => panic!("expected wallet already exists, got {other:?}"),
    }

    // Exactly one identity persisted, and it is the winner's.
    assert_eq!(h.primary.len(), 1);
    assert_eq!(
        h.metadata_kv.get(WALLET_ADDRESS_KEY).unwrap().as_deref(),
        Some(winners[0].checksummed_address().as_str())
    );
}

#[tokio::test]
async fn test_cached_fields_are_wiped_with_the_wallet() {
    let h = harness();
    h.manager.set_network(Network::Sepolia).expect("set network");
    h.manager
        .set_cached(CachedField::Balance, "1.5")
        .expect("set balance");
    assert_eq!(
        h.manager
            .cached(CachedField::Balance)
            .expect("read")
            .as_deref(),
        Some("1.5")
    );

    h.manager.create().await.expect("create");
    h.manager.remove().await.expect("remove");

    assert!(h.manager.cached(CachedField::Balance).expect("read").is_none());
    assert!(h.manager.network().expect("read").is_none());
}

#[tokio::test]
async fn test_lifecycle_over_file_backed_metadata() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("metadata.json");
    let primary = Arc::new(MemorySecureStore::new());
    let secondary = Arc::new(MemorySecureStore::new());
    let fallback_kv = Arc::new(MemoryKeyValueStore::new());

    let metadata_kv = Arc::new(FileKeyValueStore::open(&path).expect("open"));
    let manager = WalletManager::new(
        MetadataStore::new(metadata_kv),
        TieredCredentialStore::new(primary.clone(), secondary.clone(), fallback_kv.clone()),
    );
    let wallet = manager.create().await.expect("create");
    drop(manager);

    // Reopen the metadata file as a cold start would.
    let metadata_kv = Arc::new(FileKeyValueStore::open(&path).expect("reopen"));
    let manager = WalletManager::new(
        MetadataStore::new(metadata_kv),
        TieredCredentialStore::new(primary, secondary, fallback_kv),
    );
    assert_eq!(
        manager.startup().await.expect("startup"),
        WalletState::Present {
            address: wallet.address()
        }
    );
}

#[tokio::test]
async fn test_factory_matches_manager_import() {
    let h = harness();
    let key = format!("0x{}", "33".repeat(32));

    let direct = identity::from_private_key(&key).expect("derive");
    let imported = h
        .manager
        .import(ImportMethod::PrivateKey, &key)
        .await
        .expect("import");
    assert_eq!(direct.address(), imported.address());
}

#[test]
fn test_tier_constants_line_up_with_metadata_namespace() {
    // The plain tier's storage key must be the one the metadata bulk
    // clear covers.
    assert_eq!(
        format!("{CREDENTIAL_IDENTIFIER}_fallback"),
        WALLET_PRIVATE_KEY_FALLBACK_KEY
    );
    assert_eq!(StorageTier::PlainFallback.to_string(), "plain_fallback");
}
