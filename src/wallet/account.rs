//! Accounts: a key pair's encrypted form, address and metadata.
//!
//! Persisted form (one entry of a wallet file):
//! ```jsonc
//! {
//!   "address": "AJkkLbouowk6teTaxz1F2DYKfJh24PVk3r",
//!   "label": "test",
//!   "lock": false,
//!   "algorithm": "ECDSA",
//!   "parameters": { "curve": "P-256" },
//!   "key": "<base64 ciphertext>",
//!   "enc-alg": "aes-256-gcm",
//!   "salt": "<base64, 16 bytes>",
//!   "isDefault": false,
//!   "publicKey": "03fb37...",
//!   "signatureScheme": "SHA256withECDSA",
//!   "hash": "sha256",
//!   "scrypt": { "n": 4096, "r": 8, "p": 8, "dkLen": 64 }
//! }
//! ```
//!
//! The plaintext private key is never stored here; [`Account::export_private_key`]
//! is the only way back to it.

use super::keys::{KeyParameters, KeyType, PrivateKey, PublicKey};
use super::keystore::{generate_salt, EncryptedKey, ENC_ALG, SALT_LEN};
use super::signature::SignatureScheme;
use crate::address::Address;
use crate::config::ScryptParams;
use crate::error::{Error, Result};
use base64::{engine::general_purpose::STANDARD as B64, Engine as _};
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

const HASH_ALG: &str = "sha256";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Account {
    pub label: String,
    pub address: Address,
    pub lock: bool,
    pub is_default: bool,
    pub encrypted_key: EncryptedKey,
    pub salt: [u8; SALT_LEN],
    pub public_key: PublicKey,
    pub signature_scheme: SignatureScheme,
    pub scrypt: ScryptParams,
}

impl Account {
    /// Create an account for `private_key`, encrypting it under `password`
    /// with a fresh salt and the default scrypt cost.
    pub fn create(private_key: &PrivateKey, password: &str, label: &str) -> Result<Self> {
        Self::create_with_params(private_key, password, label, &ScryptParams::default())
    }

    #[instrument(skip_all, fields(label = %label, key_type = private_key.key_type().label()))]
    pub fn create_with_params(
        private_key: &PrivateKey,
        password: &str,
        label: &str,
        scrypt: &ScryptParams,
    ) -> Result<Self> {
        let public_key = private_key.public_key()?;
        let address = Address::from_public_key(&public_key);
        let salt = generate_salt();
        let encrypted_key = private_key.encrypt(password, &address, &salt, scrypt)?;
        debug!(%address, "account created");
        Ok(Self {
            label: label.to_string(),
            address,
            lock: false,
            is_default: false,
            encrypted_key,
            salt,
            signature_scheme: private_key.default_scheme()?,
            public_key,
            scrypt: *scrypt,
        })
    }

    /// Rebuild an account from its encrypted key. Fails with
    /// [`Error::Decryption`] on a wrong password or if the key does not belong
    /// to `address`.
    pub fn import_account(
        label: &str,
        encrypted_key: &EncryptedKey,
        password: &str,
        address: &Address,
        salt: &[u8],
    ) -> Result<Self> {
        Self::import_account_with_params(label, encrypted_key, password, address, salt, &ScryptParams::default())
    }

    #[instrument(skip_all, fields(label = %label, address = %address))]
    pub fn import_account_with_params(
        label: &str,
        encrypted_key: &EncryptedKey,
        password: &str,
        address: &Address,
        salt: &[u8],
        scrypt: &ScryptParams,
    ) -> Result<Self> {
        let salt: [u8; SALT_LEN] = salt
            .try_into()
            .map_err(|_| Error::Keystore(format!("salt must be {SALT_LEN} bytes, got {}", salt.len())))?;
        let private_key = encrypted_key.decrypt(password, address, &salt, scrypt)?;
        let public_key = private_key.public_key()?;
        debug!("account imported");
        Ok(Self {
            label: label.to_string(),
            address: *address,
            lock: false,
            is_default: false,
            encrypted_key: encrypted_key.clone(),
            salt,
            signature_scheme: private_key.default_scheme()?,
            public_key,
            scrypt: *scrypt,
        })
    }

    /// Create an account from a BIP-39 phrase (empty BIP-39 passphrase),
    /// encrypted under `password`.
    #[cfg(feature = "mnemonic")]
    pub fn import_with_mnemonic(label: &str, phrase: &str, password: &str) -> Result<Self> {
        Self::import_with_mnemonic_params(label, phrase, password, &ScryptParams::default())
    }

    #[cfg(feature = "mnemonic")]
    #[instrument(skip_all, fields(label = %label))]
    pub fn import_with_mnemonic_params(
        label: &str,
        phrase: &str,
        password: &str,
        scrypt: &ScryptParams,
    ) -> Result<Self> {
        use super::mnemonic::{Mnemonic, MnemonicLang};
        let mnemonic = Mnemonic::from_phrase(MnemonicLang::English, phrase)?;
        let private_key = mnemonic.derive_private_key("")?;
        Self::create_with_params(&private_key, password, label, scrypt)
    }

    /// Decrypt and return the plaintext private key.
    pub fn export_private_key(&self, password: &str) -> Result<PrivateKey> {
        self.encrypted_key.decrypt(password, &self.address, &self.salt, &self.scrypt)
    }

    pub fn key_type(&self) -> KeyType {
        self.public_key.key_type()
    }

    // ---- JSON ---------------------------------------------------------------

    pub fn to_json_value(&self) -> AccountJson {
        AccountJson {
            address: self.address.to_base58(),
            label: self.label.clone(),
            lock: self.lock,
            algorithm: self.encrypted_key.key_type(),
            parameters: self.encrypted_key.parameters(),
            key: self.encrypted_key.key().to_string(),
            enc_alg: ENC_ALG.to_string(),
            salt: B64.encode(self.salt),
            is_default: self.is_default,
            public_key: self.public_key.serialize_hex(),
            signature_scheme: self.signature_scheme,
            hash: HASH_ALG.to_string(),
            scrypt: self.scrypt,
        }
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(&self.to_json_value())?)
    }

    /// Parse a persisted account, checking it is internally consistent.
    pub fn from_json(s: &str) -> Result<Self> {
        let raw: AccountJson = serde_json::from_str(s)?;
        Self::try_from(raw)
    }
}

/// Serialized account record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountJson {
    pub address: String,
    #[serde(default)]
    pub label: String,
    #[serde(default)]
    pub lock: bool,
    pub algorithm: KeyType,
    pub parameters: KeyParameters,
    pub key: String,
    #[serde(rename = "enc-alg")]
    pub enc_alg: String,
    pub salt: String,
    #[serde(default)]
    pub is_default: bool,
    pub public_key: String,
    pub signature_scheme: SignatureScheme,
    #[serde(default = "default_hash")]
    pub hash: String,
    #[serde(default)]
    pub scrypt: ScryptParams,
}

fn default_hash() -> String {
    HASH_ALG.to_string()
}

impl TryFrom<AccountJson> for Account {
    type Error = Error;

    fn try_from(raw: AccountJson) -> Result<Self> {
        if raw.enc_alg != ENC_ALG {
            return Err(Error::Keystore(format!("unsupported enc-alg '{}'", raw.enc_alg)));
        }
        raw.scrypt.validate()?;
        let salt_vec = B64.decode(raw.salt.as_bytes())?;
        let salt: [u8; SALT_LEN] = salt_vec
            .as_slice()
            .try_into()
            .map_err(|_| Error::Keystore(format!("salt must be {SALT_LEN} bytes, got {}", salt_vec.len())))?;
        let address = Address::from_base58(&raw.address)?;
        let public_key = PublicKey::deserialize_hex(&raw.public_key)?;
        if public_key.key_type() != raw.algorithm || public_key.parameters() != raw.parameters {
            return Err(Error::Keystore("publicKey does not match algorithm/parameters".into()));
        }
        if Address::from_public_key(&public_key) != address {
            return Err(Error::Keystore("address does not match publicKey".into()));
        }
        if raw.signature_scheme.key_type() != raw.algorithm {
            return Err(Error::UnsupportedScheme(raw.signature_scheme.label().to_string()));
        }
        Ok(Self {
            label: raw.label,
            address,
            lock: raw.lock,
            is_default: raw.is_default,
            encrypted_key: EncryptedKey::new(raw.key, raw.algorithm, raw.parameters),
            salt,
            public_key,
            signature_scheme: raw.signature_scheme,
            scrypt: raw.scrypt,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "7c47df9664e7db85c1308c080f398400cb24283f5d922e76b478b5429e821b93";

    fn light() -> ScryptParams {
        ScryptParams::new(16, 8, 1)
    }

    #[test]
    fn json_shape() {
        let key = PrivateKey::from_hex(SECRET).unwrap();
        let acc = Account::create_with_params(&key, "123456", "test", &light()).unwrap();
        let v: serde_json::Value = serde_json::from_str(&acc.to_json().unwrap()).unwrap();
        assert_eq!(v["address"], "AJkkLbouowk6teTaxz1F2DYKfJh24PVk3r");
        assert_eq!(v["label"], "test");
        assert_eq!(v["algorithm"], "ECDSA");
        assert_eq!(v["parameters"]["curve"], "P-256");
        assert_eq!(v["enc-alg"], "aes-256-gcm");
        assert_eq!(v["signatureScheme"], "SHA256withECDSA");
        assert_eq!(v["publicKey"], "03fb3793c14e2233f01db2145307d179f0aa21ad239de61452cda4cc9278cbad2b");
        assert_eq!(v["isDefault"], false);
        assert_eq!(v["scrypt"]["n"], 16);
        assert_eq!(B64.decode(v["salt"].as_str().unwrap()).unwrap().len(), 16);
    }

    #[test]
    fn json_roundtrip_and_export() {
        let key = PrivateKey::from_hex(SECRET).unwrap();
        let acc = Account::create_with_params(&key, "pw", "me", &light()).unwrap();
        let back = Account::from_json(&acc.to_json().unwrap()).unwrap();
        assert_eq!(back, acc);
        assert_eq!(back.export_private_key("pw").unwrap(), key);
        assert!(back.export_private_key("nope").unwrap_err().is_decryption());
    }

    #[test]
    fn from_json_rejects_inconsistent_records() {
        let key = PrivateKey::from_hex(SECRET).unwrap();
        let acc = Account::create_with_params(&key, "pw", "me", &light()).unwrap();
        let good = acc.to_json_value();

        let mut bad = good.clone();
        bad.enc_alg = "aes-128-ctr".into();
        assert!(matches!(Account::try_from(bad), Err(Error::Keystore(_))));

        let mut bad = good.clone();
        bad.address = Address::new([1u8; 20]).to_base58();
        assert!(matches!(Account::try_from(bad), Err(Error::Keystore(_))));

        let mut bad = good.clone();
        bad.salt = B64.encode([0u8; 8]);
        assert!(matches!(Account::try_from(bad), Err(Error::Keystore(_))));

        let mut bad = good;
        bad.signature_scheme = SignatureScheme::Sm3WithSm2;
        assert!(matches!(Account::try_from(bad), Err(Error::UnsupportedScheme(_))));
    }

    #[test]
    fn from_json_rejects_oversized_scrypt_cost() {
        let key = PrivateKey::from_hex(SECRET).unwrap();
        let acc = Account::create_with_params(&key, "pw", "me", &light()).unwrap();
        let mut v: serde_json::Value = serde_json::from_str(&acc.to_json().unwrap()).unwrap();
        v["scrypt"]["n"] = serde_json::json!(1u64 << 31);
        v["scrypt"]["r"] = serde_json::json!(1024);
        assert!(matches!(Account::from_json(&v.to_string()), Err(Error::Keystore(_))));
    }

    #[test]
    fn import_checks_salt_length() {
        let key = PrivateKey::from_hex(SECRET).unwrap();
        let acc = Account::create_with_params(&key, "pw", "me", &light()).unwrap();
        let err = Account::import_account_with_params("me", &acc.encrypted_key, "pw", &acc.address, &[0u8; 4], &light())
            .unwrap_err();
        assert!(matches!(err, Error::Keystore(_)));
    }
}
