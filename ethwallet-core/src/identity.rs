//! Key material construction and validation.
//!
//! Three construction paths produce a [`WalletIdentity`]: fresh generation,
//! seed-phrase import, and raw private-key import. Import paths check the
//! input shape first and only then hand it to the key library, so every
//! failure maps to a distinct [`WalletError`] kind.

use alloy_primitives::Address;
use alloy_signer_local::{
    coins_bip39::{English, Mnemonic},
    LocalSignerError, MnemonicBuilder, PrivateKeySigner,
};
use secrecy::SecretString;

use crate::error::{WalletError, WalletResult};

/// Word count for freshly generated recovery phrases.
const GENERATED_WORD_COUNT: usize = 12;

/// Seed-phrase lengths accepted for import.
const ACCEPTED_WORD_COUNTS: [usize; 2] = [12, 24];

/// One wallet account: address, private key, and optional recovery phrase.
///
/// At most one of these is ever persisted at a time. The secret fields are
/// wrapped in [`SecretString`] so they are redacted from `Debug` output and
/// zeroized on drop; the private key leaves this type only through the
/// export flow.
#[derive(Debug)]
pub struct WalletIdentity {
    address: Address,
    private_key: SecretString,
    mnemonic: Option<SecretString>,
}

impl WalletIdentity {
    /// The derived public account address.
    #[must_use]
    pub const fn address(&self) -> Address {
        self.address
    }

    /// The EIP-55 checksummed display form of the address.
    #[must_use]
    pub fn checksummed_address(&self) -> String {
        self.address.to_string()
    }

    /// Shortened display form of the address, e.g. `0xf39F...2266`.
    #[must_use]
    pub fn short_address(&self) -> String {
        let full = self.address.to_string();
        format!("{}...{}", &full[..6], &full[full.len() - 4..])
    }

    /// The private key as `0x` followed by 64 hex digits.
    #[must_use]
    pub const fn private_key(&self) -> &SecretString {
        &self.private_key
    }

    /// The recovery phrase, present when the identity was freshly generated
    /// or imported from a phrase; absent for raw-key imports.
    #[must_use]
    pub const fn mnemonic(&self) -> Option<&SecretString> {
        self.mnemonic.as_ref()
    }
}

/// Generates a fresh identity with a new 12-word recovery phrase.
///
/// Entropy comes from the OS RNG.
///
/// # Errors
///
/// Returns [`WalletError::KeyGeneration`] if phrase generation or key
/// derivation fails. Neither is user-correctable.
pub fn generate_new() -> WalletResult<WalletIdentity> {
    let mnemonic =
        Mnemonic::<English>::new_with_count(&mut rand::thread_rng(), GENERATED_WORD_COUNT)
            .map_err(|err| WalletError::KeyGeneration(err.to_string()))?;
    let phrase = mnemonic.to_phrase();
    let signer =
        derive_from_phrase(&phrase).map_err(|err| WalletError::KeyGeneration(err.to_string()))?;
    Ok(identity_from_signer(&signer, Some(phrase)))
}

/// Constructs an identity from a raw private key.
///
/// The trimmed input must be `0x` followed by exactly 64 hex digits; the
/// shape is checked before the key library sees the input.
///
/// # Errors
///
/// Returns [`WalletError::InvalidPrivateKeyFormat`] if the input shape is
/// wrong, or [`WalletError::InvalidPrivateKey`] if the key library rejects
/// the scalar.
pub fn from_private_key(input: &str) -> WalletResult<WalletIdentity> {
    let trimmed = input.trim();
    if !is_hex_private_key(trimmed) {
        return Err(WalletError::InvalidPrivateKeyFormat);
    }
    let signer: PrivateKeySigner = trimmed
        .parse()
        .map_err(|_| WalletError::InvalidPrivateKey)?;
    Ok(WalletIdentity {
        address: signer.address(),
        private_key: SecretString::from(trimmed.to_string()),
        mnemonic: None,
    })
}

/// Constructs an identity from a BIP-39 seed phrase.
///
/// The trimmed input must split into exactly 12 or 24 words; wordlist
/// membership and the checksum are validated by the key library afterwards.
///
/// # Errors
///
/// Returns [`WalletError::InvalidSeedPhraseLength`] if the word count is
/// wrong, or [`WalletError::InvalidSeedPhrase`] if the key library rejects
/// the phrase.
pub fn from_seed_phrase(input: &str) -> WalletResult<WalletIdentity> {
    let words: Vec<&str> = input.split_whitespace().collect();
    if !ACCEPTED_WORD_COUNTS.contains(&words.len()) {
        return Err(WalletError::InvalidSeedPhraseLength(words.len()));
    }
    let phrase = words.join(" ");
    let signer = derive_from_phrase(&phrase).map_err(|_| WalletError::InvalidSeedPhrase)?;
    Ok(identity_from_signer(&signer, Some(phrase)))
}

/// Derives the account at `m/44'/60'/0'/0/0` from a phrase.
fn derive_from_phrase(phrase: &str) -> Result<PrivateKeySigner, LocalSignerError> {
    MnemonicBuilder::<English>::default()
        .phrase(phrase)
        .index(0)?
        .build()
}

fn identity_from_signer(signer: &PrivateKeySigner, phrase: Option<String>) -> WalletIdentity {
    WalletIdentity {
        address: signer.address(),
        private_key: SecretString::from(format!("0x{}", hex::encode(signer.to_bytes()))),
        mnemonic: phrase.map(SecretString::from),
    }
}

fn is_hex_private_key(input: &str) -> bool {
    input.len() == 66
        && input.starts_with("0x")
        && input[2..].bytes().all(|byte| byte.is_ascii_hexdigit())
}
