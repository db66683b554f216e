//! BIP-39 mnemonics and BIP-32 key derivation.
//!
//! Derivation:
//! ```text
//! seed   = BIP-39 seed(phrase, passphrase)               (PBKDF2-HMAC-SHA512, 2048 rounds)
//! xprv   = BIP-32 master(seed) / m/44'/1024'/0'/0/0
//! secret = xprv.private_key (32 bytes) → ECDSA P-256 private key
//! ```
//!
//! Only the English word list is exposed for now; the type allows future locales.

use super::keys::{KeyPair, KeyParameters, KeyType, PrivateKey};
use crate::error::{Error, Result};
use bitcoin::bip32::{DerivationPath, Xpriv};
use bitcoin::secp256k1::Secp256k1;
use bitcoin::NetworkKind;
use std::str::FromStr;
use zeroize::Zeroizing;

/// Public dependency re-exports (useful for downstream tooling/tests).
pub use bip39::{Language, Mnemonic as Bip39Mnemonic, MnemonicType, Seed};

/// BIP-44 path with this chain's coin type.
pub const DERIVATION_PATH: &str = "m/44'/1024'/0'/0/0";

/// Supported mnemonic languages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MnemonicLang {
    English,
}

impl MnemonicLang {
    fn to_bip39(self) -> Language {
        match self {
            MnemonicLang::English => Language::English,
        }
    }
}

/// A validated mnemonic phrase. Seeds are never cached.
#[derive(Clone)]
pub struct Mnemonic {
    inner: Bip39Mnemonic,
    lang: MnemonicLang,
}

impl core::fmt::Debug for Mnemonic {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Mnemonic")
            .field("lang", &self.lang)
            .field("words", &self.word_count())
            .finish()
    }
}

impl Mnemonic {
    /// Generate a new random phrase. Valid counts: 12, 15, 18, 21, 24.
    pub fn generate(lang: MnemonicLang, words: usize) -> Result<Self> {
        let ty = MnemonicType::for_word_count(words)
            .map_err(|_| Error::InvalidMnemonic(format!("invalid word count {words} (12/15/18/21/24)")))?;
        Ok(Self { inner: Bip39Mnemonic::new(ty, lang.to_bip39()), lang })
    }

    /// Parse and validate a phrase (checksum verified).
    pub fn from_phrase(lang: MnemonicLang, phrase: &str) -> Result<Self> {
        let normalized = phrase.split_whitespace().collect::<Vec<_>>().join(" ");
        let inner = Bip39Mnemonic::from_phrase(&normalized, lang.to_bip39())
            .map_err(|e| Error::InvalidMnemonic(e.to_string()))?;
        Ok(Self { inner, lang })
    }

    pub fn phrase(&self) -> &str {
        self.inner.phrase()
    }

    pub fn language(&self) -> MnemonicLang {
        self.lang
    }

    pub fn word_count(&self) -> usize {
        self.phrase().split(' ').count()
    }

    /// 64-byte BIP-39 seed.
    pub fn to_seed(&self, passphrase: &str) -> Zeroizing<Vec<u8>> {
        Zeroizing::new(Seed::new(&self.inner, passphrase).as_bytes().to_vec())
    }

    /// Private key at [`DERIVATION_PATH`].
    pub fn derive_private_key(&self, passphrase: &str) -> Result<PrivateKey> {
        self.derive_private_key_at(passphrase, DERIVATION_PATH)
    }

    /// Key pair at [`DERIVATION_PATH`].
    pub fn derive_key_pair(&self, passphrase: &str) -> Result<KeyPair> {
        KeyPair::from_private(self.derive_private_key(passphrase)?)
    }

    /// Private key at an arbitrary BIP-32 path.
    pub fn derive_private_key_at(&self, passphrase: &str, path: &str) -> Result<PrivateKey> {
        let seed = self.to_seed(passphrase);
        let path = DerivationPath::from_str(path)
            .map_err(|e| Error::InvalidMnemonic(format!("derivation path: {e}")))?;
        let secp = Secp256k1::new();
        let master = Xpriv::new_master(NetworkKind::Main, seed.as_slice())
            .map_err(|e| Error::InvalidKey(format!("bip32 master: {e}")))?;
        let child = master
            .derive_priv(&secp, &path)
            .map_err(|e| Error::InvalidKey(format!("bip32 derive: {e}")))?;
        let secret = Zeroizing::new(child.private_key.secret_bytes());
        PrivateKey::new(secret.as_slice(), KeyType::Ecdsa, KeyParameters::default())
    }
}

impl From<Mnemonic> for String {
    fn from(m: Mnemonic) -> Self {
        m.phrase().to_string()
    }
}

//
// --------------------------------- Tests -------------------------------------
//

#[cfg(test)]
mod tests {
    use super::*;

    const PHRASE: &str = "melody snake text depend please copper best flower cushion open marriage cool";

    #[test]
    fn parse_and_normalize() {
        let m = Mnemonic::from_phrase(MnemonicLang::English, &format!("  {}  ", PHRASE.replace(' ', "   "))).unwrap();
        assert_eq!(m.phrase(), PHRASE);
        assert_eq!(m.word_count(), 12);
        assert_eq!(String::from(m), PHRASE);
    }

    #[test]
    fn bad_checksum_or_word() {
        let bad_checksum = vec!["abandon"; 12].join(" ");
        assert!(matches!(
            Mnemonic::from_phrase(MnemonicLang::English, &bad_checksum),
            Err(Error::InvalidMnemonic(_))
        ));
        assert!(Mnemonic::from_phrase(MnemonicLang::English, "not a real phrase").is_err());
    }

    #[test]
    fn derivation_is_deterministic_and_passphrase_sensitive() {
        let m = Mnemonic::from_phrase(MnemonicLang::English, PHRASE).unwrap();
        let a = m.derive_private_key("").unwrap();
        let b = m.derive_private_key("").unwrap();
        let c = m.derive_private_key("TREZOR").unwrap();
        assert_eq!(a, b);
        assert_ne!(a, c);
        assert_eq!(a.key_type(), KeyType::Ecdsa);
        assert_eq!(m.derive_key_pair("").unwrap().private_key, a);
        assert_ne!(a, m.derive_private_key_at("", "m/44'/1024'/0'/0/1").unwrap());
        assert!(m.derive_private_key_at("", "not/a/path").is_err());
    }

    #[test]
    fn bip39_seed_vector() {
        // Trezor vector: all-"abandon" entropy, passphrase "TREZOR".
        let m = Mnemonic::from_phrase(
            MnemonicLang::English,
            "abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon about",
        )
        .unwrap();
        assert_eq!(
            hex::encode(m.to_seed("TREZOR").as_slice()),
            "c55257c360c07c72029aebc1b53c05ed0362ada38ead3e3e9efa3708e53495531f09a6987599d18264c1e1c92f2cf141630c7a3c4ab7c81b2f001698e7463b04"
        );
    }

    #[test]
    fn generate_supported_counts() {
        for wc in [12, 15, 18, 21, 24] {
            let m = Mnemonic::generate(MnemonicLang::English, wc).unwrap();
            assert_eq!(m.word_count(), wc);
        }
        assert!(Mnemonic::generate(MnemonicLang::English, 13).is_err());
    }
}
