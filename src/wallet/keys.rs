//! Key material: algorithm/curve tags, private keys, public keys.
//!
//! Public key wire form:
//! ```text
//! ECDSA        33-byte compressed SEC1 point
//! SM2, EdDSA   key_type (u8) || curve (u8) || key
//! ```
//! The tagged form is also accepted for ECDSA on input.

use super::keystore::{self, EncryptedKey};
use super::signature::{Signature, SignatureScheme};
use super::signer::{backend_for, CurveBackend, Signer};
use crate::address::Address;
use crate::config::ScryptParams;
use crate::error::{Error, Result};
use crate::utils::bytes::{hex_decode, hex_encode};
use crate::utils::hash::checksum4;
use rand::RngCore;
use serde::{Deserialize, Serialize};
use zeroize::Zeroizing;

/// WIF prefix and compression flag for ECDSA keys.
const WIF_PREFIX: u8 = 0x80;
const WIF_COMPRESSED: u8 = 0x01;

// ---- Tags -------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum KeyType {
    #[serde(rename = "ECDSA")]
    Ecdsa,
    #[serde(rename = "SM2")]
    Sm2,
    #[serde(rename = "EDDSA")]
    EdDsa,
}

impl KeyType {
    pub fn code(self) -> u8 {
        match self {
            KeyType::Ecdsa => 0x12,
            KeyType::Sm2 => 0x13,
            KeyType::EdDsa => 0x14,
        }
    }

    pub fn from_code(code: u8) -> Result<Self> {
        match code {
            0x12 => Ok(KeyType::Ecdsa),
            0x13 => Ok(KeyType::Sm2),
            0x14 => Ok(KeyType::EdDsa),
            other => Err(Error::InvalidKey(format!("unknown key type 0x{other:02x}"))),
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            KeyType::Ecdsa => "ECDSA",
            KeyType::Sm2 => "SM2",
            KeyType::EdDsa => "EDDSA",
        }
    }

    pub fn from_label(label: &str) -> Result<Self> {
        match label {
            "ECDSA" => Ok(KeyType::Ecdsa),
            "SM2" => Ok(KeyType::Sm2),
            "EDDSA" => Ok(KeyType::EdDsa),
            other => Err(Error::InvalidKey(format!("unknown key type '{other}'"))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CurveLabel {
    #[serde(rename = "P-224")]
    P224,
    #[serde(rename = "P-256")]
    P256,
    #[serde(rename = "P-384")]
    P384,
    #[serde(rename = "P-521")]
    P521,
    #[serde(rename = "sm2p256v1")]
    Sm2P256V1,
    #[serde(rename = "ed25519")]
    Ed25519,
}

impl CurveLabel {
    pub fn code(self) -> u8 {
        match self {
            CurveLabel::P224 => 1,
            CurveLabel::P256 => 2,
            CurveLabel::P384 => 3,
            CurveLabel::P521 => 4,
            CurveLabel::Sm2P256V1 => 20,
            CurveLabel::Ed25519 => 25,
        }
    }

    pub fn from_code(code: u8) -> Result<Self> {
        match code {
            1 => Ok(CurveLabel::P224),
            2 => Ok(CurveLabel::P256),
            3 => Ok(CurveLabel::P384),
            4 => Ok(CurveLabel::P521),
            20 => Ok(CurveLabel::Sm2P256V1),
            25 => Ok(CurveLabel::Ed25519),
            other => Err(Error::InvalidKey(format!("unknown curve {other}"))),
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            CurveLabel::P224 => "P-224",
            CurveLabel::P256 => "P-256",
            CurveLabel::P384 => "P-384",
            CurveLabel::P521 => "P-521",
            CurveLabel::Sm2P256V1 => "sm2p256v1",
            CurveLabel::Ed25519 => "ed25519",
        }
    }
}

/// Curve parameters attached to a key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct KeyParameters {
    pub curve: CurveLabel,
}

impl KeyParameters {
    pub fn new(curve: CurveLabel) -> Self {
        Self { curve }
    }

    /// The one curve supported for `key_type`.
    pub fn default_for(key_type: KeyType) -> Self {
        let curve = match key_type {
            KeyType::Ecdsa => CurveLabel::P256,
            KeyType::Sm2 => CurveLabel::Sm2P256V1,
            KeyType::EdDsa => CurveLabel::Ed25519,
        };
        Self { curve }
    }
}

impl Default for KeyParameters {
    fn default() -> Self {
        Self::default_for(KeyType::Ecdsa)
    }
}

// ---- Private key ------------------------------------------------------------

/// A private key with its algorithm tag. The secret is wiped on drop.
#[derive(Clone)]
pub struct PrivateKey {
    key: Zeroizing<Vec<u8>>,
    key_type: KeyType,
    parameters: KeyParameters,
}

impl core::fmt::Debug for PrivateKey {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("PrivateKey")
            .field("key_type", &self.key_type)
            .field("curve", &self.parameters.curve)
            .field("key", &"<redacted>")
            .finish()
    }
}

impl PartialEq for PrivateKey {
    fn eq(&self, other: &Self) -> bool {
        use subtle::ConstantTimeEq;
        self.key_type == other.key_type
            && self.parameters == other.parameters
            && bool::from(self.key.as_slice().ct_eq(other.key.as_slice()))
    }
}

impl Eq for PrivateKey {}

impl PrivateKey {
    /// Wrap raw secret bytes, checking them against the curve.
    pub fn new(key: &[u8], key_type: KeyType, parameters: KeyParameters) -> Result<Self> {
        backend_for(key_type, parameters.curve)?.check_secret(key)?;
        Ok(Self { key: Zeroizing::new(key.to_vec()), key_type, parameters })
    }

    /// ECDSA P-256 key from hex.
    pub fn from_hex(hex: &str) -> Result<Self> {
        Self::from_hex_with(hex, KeyType::Ecdsa, KeyParameters::default())
    }

    pub fn from_hex_with(hex: &str, key_type: KeyType, parameters: KeyParameters) -> Result<Self> {
        let raw = Zeroizing::new(hex_decode(hex)?);
        Self::new(&raw, key_type, parameters)
    }

    /// Fresh random ECDSA P-256 key.
    pub fn random() -> Result<Self> {
        Self::random_with(KeyType::Ecdsa, KeyParameters::default())
    }

    /// Fresh random key for `key_type` on `parameters.curve`.
    pub fn random_with(key_type: KeyType, parameters: KeyParameters) -> Result<Self> {
        let backend = backend_for(key_type, parameters.curve)?;
        let mut buf = Zeroizing::new([0u8; 32]);
        // Rejection sampling; an out-of-range scalar is astronomically rare.
        for _ in 0..16 {
            rand::thread_rng().fill_bytes(&mut buf[..]);
            if backend.check_secret(&buf[..]).is_ok() {
                return Ok(Self { key: Zeroizing::new(buf.to_vec()), key_type, parameters });
            }
        }
        Err(Error::InvalidKey("could not sample a valid scalar".into()))
    }

    pub fn key_type(&self) -> KeyType {
        self.key_type
    }

    pub fn parameters(&self) -> KeyParameters {
        self.parameters
    }

    /// Raw secret bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.key
    }

    pub fn to_hex(&self) -> Zeroizing<String> {
        Zeroizing::new(hex_encode(self.key.as_slice()))
    }

    fn backend(&self) -> Result<&'static dyn CurveBackend> {
        backend_for(self.key_type, self.parameters.curve)
    }

    /// Derive the matching public key.
    pub fn public_key(&self) -> Result<PublicKey> {
        let key = self.backend()?.derive_public(&self.key)?;
        Ok(PublicKey { key, key_type: self.key_type, parameters: self.parameters })
    }

    /// Default signature scheme for this key.
    pub fn default_scheme(&self) -> Result<SignatureScheme> {
        Ok(self.backend()?.default_scheme())
    }

    /// Sign `message` with `scheme`, or the key's default scheme.
    pub fn sign_with(&self, message: &[u8], scheme: Option<SignatureScheme>) -> Result<Signature> {
        let backend = self.backend()?;
        let scheme = scheme.unwrap_or_else(|| backend.default_scheme());
        let value = backend.sign(&self.key, message, scheme)?;
        Signature::new(scheme, value)
    }

    /// Encrypt under `password`. `address` must be this key's address.
    pub fn encrypt(
        &self,
        password: &str,
        address: &Address,
        salt: &[u8],
        scrypt: &ScryptParams,
    ) -> Result<EncryptedKey> {
        keystore::encrypt_private_key(self, password, address, salt, scrypt)
    }

    // ---- WIF ----------------------------------------------------------------

    /// Wallet import format; ECDSA keys only.
    pub fn to_wif(&self) -> Result<Zeroizing<String>> {
        if self.key_type != KeyType::Ecdsa {
            return Err(Error::InvalidKey("WIF is only defined for ECDSA keys".into()));
        }
        let mut data = Zeroizing::new(Vec::with_capacity(38));
        data.push(WIF_PREFIX);
        data.extend_from_slice(&self.key);
        data.push(WIF_COMPRESSED);
        let check = checksum4(data.as_slice());
        data.extend_from_slice(&check);
        Ok(Zeroizing::new(bs58::encode(data.as_slice()).into_string()))
    }

    pub fn from_wif(wif: &str) -> Result<Self> {
        let data = Zeroizing::new(
            bs58::decode(wif.trim())
                .into_vec()
                .map_err(|e| Error::InvalidKey(format!("WIF base58: {e}")))?,
        );
        if data.len() != 38 || data[0] != WIF_PREFIX || data[33] != WIF_COMPRESSED {
            return Err(Error::InvalidKey("malformed WIF".into()));
        }
        if checksum4(&data[..34])[..] != data[34..] {
            return Err(Error::InvalidChecksum);
        }
        Self::new(&data[1..33], KeyType::Ecdsa, KeyParameters::default())
    }
}

impl Signer for PrivateKey {
    fn public_key(&self) -> Result<PublicKey> {
        PrivateKey::public_key(self)
    }

    fn sign(&self, message: &[u8]) -> Result<Signature> {
        self.sign_with(message, None)
    }
}

// ---- Public key -------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PublicKey {
    key: Vec<u8>,
    key_type: KeyType,
    parameters: KeyParameters,
}

impl PublicKey {
    /// Validate and canonicalize a raw key for the given algorithm.
    pub fn new(key: &[u8], key_type: KeyType, parameters: KeyParameters) -> Result<Self> {
        let key = backend_for(key_type, parameters.curve)?.normalize_public(key)?;
        Ok(Self { key, key_type, parameters })
    }

    pub fn key_type(&self) -> KeyType {
        self.key_type
    }

    pub fn parameters(&self) -> KeyParameters {
        self.parameters
    }

    /// Raw key bytes without the algorithm tag.
    pub fn as_bytes(&self) -> &[u8] {
        &self.key
    }

    pub fn serialize(&self) -> Vec<u8> {
        match self.key_type {
            KeyType::Ecdsa => self.key.clone(),
            _ => {
                let mut out = Vec::with_capacity(2 + self.key.len());
                out.push(self.key_type.code());
                out.push(self.parameters.curve.code());
                out.extend_from_slice(&self.key);
                out
            }
        }
    }

    pub fn serialize_hex(&self) -> String {
        hex_encode(self.serialize())
    }

    pub fn deserialize(bytes: &[u8]) -> Result<Self> {
        match bytes.first() {
            Some(0x02 | 0x03 | 0x04) => Self::new(bytes, KeyType::Ecdsa, KeyParameters::default()),
            Some(&code) if bytes.len() > 2 => {
                let key_type = KeyType::from_code(code)?;
                let curve = CurveLabel::from_code(bytes[1])?;
                Self::new(&bytes[2..], key_type, KeyParameters::new(curve))
            }
            _ => Err(Error::InvalidKey(format!("unrecognized public key encoding ({} bytes)", bytes.len()))),
        }
    }

    pub fn deserialize_hex(hex: &str) -> Result<Self> {
        Self::deserialize(&hex_decode(hex)?)
    }

    /// Check `signature` over `message`. A scheme from another algorithm is an
    /// error; a bad signature is `Ok(false)`.
    pub fn verify(&self, message: &[u8], signature: &Signature) -> Result<bool> {
        let backend = backend_for(self.key_type, self.parameters.curve)?;
        backend.check_scheme(signature.scheme)?;
        Ok(backend.verify(&self.key, message, signature.scheme, &signature.value))
    }
}

// ---- Key pair ---------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct KeyPair {
    pub private_key: PrivateKey,
    pub public_key: PublicKey,
}

impl KeyPair {
    /// Generate a random pair; unsupported combinations fail with `UnsupportedCurve`.
    pub fn generate(key_type: KeyType, parameters: KeyParameters) -> Result<Self> {
        Self::from_private(PrivateKey::random_with(key_type, parameters)?)
    }

    pub fn from_private(private_key: PrivateKey) -> Result<Self> {
        let public_key = private_key.public_key()?;
        Ok(Self { private_key, public_key })
    }

    pub fn address(&self) -> Address {
        Address::from_public_key(&self.public_key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "7c47df9664e7db85c1308c080f398400cb24283f5d922e76b478b5429e821b93";

    #[test]
    fn pinned_key_and_address() {
        let pair = KeyPair::from_private(PrivateKey::from_hex(SECRET).unwrap()).unwrap();
        assert_eq!(
            pair.public_key.serialize_hex(),
            "03fb3793c14e2233f01db2145307d179f0aa21ad239de61452cda4cc9278cbad2b"
        );
        assert_eq!(pair.address().to_base58(), "AJkkLbouowk6teTaxz1F2DYKfJh24PVk3r");
    }

    #[test]
    fn generate_each_supported_curve() {
        for kt in [KeyType::Ecdsa, KeyType::Sm2, KeyType::EdDsa] {
            let pair = KeyPair::generate(kt, KeyParameters::default_for(kt)).unwrap();
            let sig = Signer::sign(&pair.private_key, b"payload").unwrap();
            assert_eq!(sig.scheme.key_type(), kt);
            assert!(pair.public_key.verify(b"payload", &sig).unwrap());
            let back = PublicKey::deserialize(&pair.public_key.serialize()).unwrap();
            assert_eq!(back, pair.public_key);
        }
    }

    #[test]
    fn unsupported_combination_is_rejected() {
        let err = KeyPair::generate(KeyType::Ecdsa, KeyParameters::new(CurveLabel::P384)).unwrap_err();
        assert!(matches!(err, Error::UnsupportedCurve { .. }));
        let err = PrivateKey::from_hex_with(SECRET, KeyType::Sm2, KeyParameters::new(CurveLabel::P256)).unwrap_err();
        assert!(matches!(err, Error::UnsupportedCurve { .. }));
    }

    #[test]
    fn sm2_public_key_is_tagged() {
        let pk = PrivateKey::from_hex_with(SECRET, KeyType::Sm2, KeyParameters::default_for(KeyType::Sm2))
            .unwrap()
            .public_key()
            .unwrap();
        let bytes = pk.serialize();
        assert_eq!(&bytes[..2], &[0x13, 20]);
        assert_eq!(bytes.len(), 35);
    }

    #[test]
    fn cross_scheme_verify_is_an_error() {
        let key = PrivateKey::from_hex(SECRET).unwrap();
        let sig = key.sign_with(b"m", Some(SignatureScheme::Sha3_256WithEcdsa)).unwrap();
        assert!(key.public_key().unwrap().verify(b"m", &sig).unwrap());
        let ed = KeyPair::generate(KeyType::EdDsa, KeyParameters::default_for(KeyType::EdDsa)).unwrap();
        assert!(matches!(ed.public_key.verify(b"m", &sig), Err(Error::UnsupportedScheme(_))));
        assert!(matches!(key.sign_with(b"m", Some(SignatureScheme::Sm3WithSm2)), Err(Error::UnsupportedScheme(_))));
    }

    #[test]
    fn wif_roundtrip() {
        let key = PrivateKey::from_hex(SECRET).unwrap();
        let wif = key.to_wif().unwrap();
        assert_eq!(wif.as_str(), "L1PJ9ScWP3EzhtG9tRJPpZL7mwtmCWfKM8RtsszHXU34yax64DvF");
        assert_eq!(PrivateKey::from_wif(&wif).unwrap(), key);
        let mut broken: Vec<char> = wif.chars().collect();
        broken[5] = if broken[5] == 'a' { 'b' } else { 'a' };
        let broken: String = broken.into_iter().collect();
        assert!(PrivateKey::from_wif(&broken).is_err());
    }

    #[test]
    fn debug_does_not_leak_secret() {
        let key = PrivateKey::from_hex(SECRET).unwrap();
        let dbg = format!("{key:?}");
        assert!(!dbg.contains("7c47df"));
        assert_eq!(key.to_hex().as_str(), SECRET);
    }

    #[test]
    fn tag_codes() {
        assert_eq!(KeyType::from_code(0x13).unwrap(), KeyType::Sm2);
        assert_eq!(KeyType::from_label("EDDSA").unwrap(), KeyType::EdDsa);
        assert_eq!(CurveLabel::from_code(25).unwrap(), CurveLabel::Ed25519);
        assert_eq!(serde_json::to_value(KeyParameters::default()).unwrap(), serde_json::json!({"curve": "P-256"}));
    }
}
