//! Signing seam and per-curve backends.
//!
//! ```text
//! (KeyType, CurveLabel) ──backend_for──▶ &'static dyn CurveBackend
//!   ECDSA / P-256      SHA256withECDSA (default), SHA3-256withECDSA
//!   SM2 / sm2p256v1    SM3withSM2 (user id 1234567812345678)
//!   EdDSA / Ed25519    SHA512withEdDSA
//! ```
//!
//! ECDSA signatures use RFC 6979 deterministic nonces. Every signature value
//! is 64 bytes (`r || s`, or the raw Ed25519 signature).

use super::keys::{CurveLabel, KeyType, PublicKey};
use super::signature::{Signature, SignatureScheme, SM2_DIST_ID};
use crate::error::{Error, Result};
use crate::utils::hash::sha3_256;

/// Minimal trait a transaction signer should satisfy.
///
/// [`PrivateKey`](super::PrivateKey) implements it; hardware or remote
/// signers can plug in the same way.
pub trait Signer {
    /// Public key matching the signatures this signer produces.
    fn public_key(&self) -> Result<PublicKey>;

    /// Sign `message` with the signer's default scheme.
    fn sign(&self, message: &[u8]) -> Result<Signature>;
}

/// Per-curve key operations. One implementation per supported
/// (key type, curve) pair; look them up with [`backend_for`].
pub trait CurveBackend: Send + Sync {
    fn key_type(&self) -> KeyType;

    fn curve(&self) -> CurveLabel;

    /// Schemes this backend can sign with; the first is the default.
    fn schemes(&self) -> &'static [SignatureScheme];

    /// Reject secrets that are not a valid scalar for the curve.
    fn check_secret(&self, secret: &[u8]) -> Result<()>;

    /// Encoded public key for `secret` (compressed point, or raw for Ed25519).
    fn derive_public(&self, secret: &[u8]) -> Result<Vec<u8>>;

    /// Parse any accepted public key encoding and return the canonical one.
    fn normalize_public(&self, public: &[u8]) -> Result<Vec<u8>>;

    /// 64-byte signature value over `message`.
    fn sign(&self, secret: &[u8], message: &[u8], scheme: SignatureScheme) -> Result<Vec<u8>>;

    fn verify(&self, public: &[u8], message: &[u8], scheme: SignatureScheme, value: &[u8]) -> bool;

    fn default_scheme(&self) -> SignatureScheme {
        self.schemes()[0]
    }

    fn check_scheme(&self, scheme: SignatureScheme) -> Result<()> {
        if self.schemes().contains(&scheme) {
            Ok(())
        } else {
            Err(Error::UnsupportedScheme(format!(
                "{} cannot be used with {} keys",
                scheme.label(),
                self.key_type().label()
            )))
        }
    }
}

static P256: P256Backend = P256Backend;
static SM2: Sm2Backend = Sm2Backend;
static ED25519: Ed25519Backend = Ed25519Backend;

/// Backend for a key type / curve pair, or `UnsupportedCurve`.
pub fn backend_for(key_type: KeyType, curve: CurveLabel) -> Result<&'static dyn CurveBackend> {
    match (key_type, curve) {
        (KeyType::Ecdsa, CurveLabel::P256) => Ok(&P256),
        (KeyType::Sm2, CurveLabel::Sm2P256V1) => Ok(&SM2),
        (KeyType::EdDsa, CurveLabel::Ed25519) => Ok(&ED25519),
        _ => Err(Error::UnsupportedCurve {
            key_type: key_type.label().to_string(),
            curve: curve.label().to_string(),
        }),
    }
}

fn key_err<E: core::fmt::Display>(what: &'static str) -> impl FnOnce(E) -> Error {
    move |e| Error::InvalidKey(format!("{what}: {e}"))
}

fn sign_err<E: core::fmt::Display>(e: E) -> Error {
    Error::Signer(e.to_string())
}

// ---- ECDSA / P-256 ----------------------------------------------------------

#[derive(Debug)]
pub struct P256Backend;

impl CurveBackend for P256Backend {
    fn key_type(&self) -> KeyType {
        KeyType::Ecdsa
    }

    fn curve(&self) -> CurveLabel {
        CurveLabel::P256
    }

    fn schemes(&self) -> &'static [SignatureScheme] {
        &[SignatureScheme::Sha256WithEcdsa, SignatureScheme::Sha3_256WithEcdsa]
    }

    fn check_secret(&self, secret: &[u8]) -> Result<()> {
        p256::ecdsa::SigningKey::from_slice(secret).map_err(key_err("p256 secret"))?;
        Ok(())
    }

    fn derive_public(&self, secret: &[u8]) -> Result<Vec<u8>> {
        let sk = p256::ecdsa::SigningKey::from_slice(secret).map_err(key_err("p256 secret"))?;
        Ok(sk.verifying_key().to_encoded_point(true).as_bytes().to_vec())
    }

    fn normalize_public(&self, public: &[u8]) -> Result<Vec<u8>> {
        let vk = p256::ecdsa::VerifyingKey::from_sec1_bytes(public).map_err(key_err("p256 public key"))?;
        Ok(vk.to_encoded_point(true).as_bytes().to_vec())
    }

    fn sign(&self, secret: &[u8], message: &[u8], scheme: SignatureScheme) -> Result<Vec<u8>> {
        use ::signature::{hazmat::PrehashSigner, Signer as _};
        self.check_scheme(scheme)?;
        let sk = p256::ecdsa::SigningKey::from_slice(secret).map_err(key_err("p256 secret"))?;
        let sig: p256::ecdsa::Signature = match scheme {
            SignatureScheme::Sha3_256WithEcdsa => sk.sign_prehash(&sha3_256(message)).map_err(sign_err)?,
            _ => sk.try_sign(message).map_err(sign_err)?,
        };
        Ok(sig.to_bytes().to_vec())
    }

    fn verify(&self, public: &[u8], message: &[u8], scheme: SignatureScheme, value: &[u8]) -> bool {
        use ::signature::{hazmat::PrehashVerifier, Verifier as _};
        let (Ok(vk), Ok(sig)) = (
            p256::ecdsa::VerifyingKey::from_sec1_bytes(public),
            p256::ecdsa::Signature::from_slice(value),
        ) else {
            return false;
        };
        match scheme {
            SignatureScheme::Sha256WithEcdsa => vk.verify(message, &sig).is_ok(),
            SignatureScheme::Sha3_256WithEcdsa => vk.verify_prehash(&sha3_256(message), &sig).is_ok(),
            _ => false,
        }
    }
}

// ---- SM2 / sm2p256v1 --------------------------------------------------------

#[derive(Debug)]
pub struct Sm2Backend;

impl CurveBackend for Sm2Backend {
    fn key_type(&self) -> KeyType {
        KeyType::Sm2
    }

    fn curve(&self) -> CurveLabel {
        CurveLabel::Sm2P256V1
    }

    fn schemes(&self) -> &'static [SignatureScheme] {
        &[SignatureScheme::Sm3WithSm2]
    }

    fn check_secret(&self, secret: &[u8]) -> Result<()> {
        sm2::SecretKey::from_slice(secret).map_err(key_err("sm2 secret"))?;
        Ok(())
    }

    fn derive_public(&self, secret: &[u8]) -> Result<Vec<u8>> {
        use sm2::elliptic_curve::sec1::ToEncodedPoint;
        let sk = sm2::SecretKey::from_slice(secret).map_err(key_err("sm2 secret"))?;
        Ok(sk.public_key().to_encoded_point(true).as_bytes().to_vec())
    }

    fn normalize_public(&self, public: &[u8]) -> Result<Vec<u8>> {
        use sm2::elliptic_curve::sec1::ToEncodedPoint;
        let pk = sm2::PublicKey::from_sec1_bytes(public).map_err(key_err("sm2 public key"))?;
        Ok(pk.to_encoded_point(true).as_bytes().to_vec())
    }

    fn sign(&self, secret: &[u8], message: &[u8], scheme: SignatureScheme) -> Result<Vec<u8>> {
        use ::signature::Signer as _;
        self.check_scheme(scheme)?;
        let sk = sm2::SecretKey::from_slice(secret).map_err(key_err("sm2 secret"))?;
        let signing = sm2::dsa::SigningKey::new(SM2_DIST_ID, &sk).map_err(sign_err)?;
        let sig: sm2::dsa::Signature = signing.try_sign(message).map_err(sign_err)?;
        Ok(sig.to_bytes().to_vec())
    }

    fn verify(&self, public: &[u8], message: &[u8], scheme: SignatureScheme, value: &[u8]) -> bool {
        use ::signature::Verifier as _;
        if scheme != SignatureScheme::Sm3WithSm2 {
            return false;
        }
        let Ok(pk) = sm2::PublicKey::from_sec1_bytes(public) else {
            return false;
        };
        let (Ok(vk), Ok(sig)) = (
            sm2::dsa::VerifyingKey::new(SM2_DIST_ID, pk),
            sm2::dsa::Signature::from_slice(value),
        ) else {
            return false;
        };
        vk.verify(message, &sig).is_ok()
    }
}

// ---- EdDSA / Ed25519 --------------------------------------------------------

#[derive(Debug)]
pub struct Ed25519Backend;

fn ed_secret(secret: &[u8]) -> Result<ed25519_dalek::SigningKey> {
    let raw: [u8; 32] = secret
        .try_into()
        .map_err(|_| Error::InvalidKey(format!("ed25519 secret must be 32 bytes, got {}", secret.len())))?;
    Ok(ed25519_dalek::SigningKey::from_bytes(&raw))
}

fn ed_public(public: &[u8]) -> Result<ed25519_dalek::VerifyingKey> {
    let raw: [u8; 32] = public
        .try_into()
        .map_err(|_| Error::InvalidKey(format!("ed25519 public key must be 32 bytes, got {}", public.len())))?;
    ed25519_dalek::VerifyingKey::from_bytes(&raw).map_err(key_err("ed25519 public key"))
}

impl CurveBackend for Ed25519Backend {
    fn key_type(&self) -> KeyType {
        KeyType::EdDsa
    }

    fn curve(&self) -> CurveLabel {
        CurveLabel::Ed25519
    }

    fn schemes(&self) -> &'static [SignatureScheme] {
        &[SignatureScheme::Sha512WithEdDsa]
    }

    fn check_secret(&self, secret: &[u8]) -> Result<()> {
        ed_secret(secret).map(|_| ())
    }

    fn derive_public(&self, secret: &[u8]) -> Result<Vec<u8>> {
        Ok(ed_secret(secret)?.verifying_key().to_bytes().to_vec())
    }

    fn normalize_public(&self, public: &[u8]) -> Result<Vec<u8>> {
        Ok(ed_public(public)?.to_bytes().to_vec())
    }

    fn sign(&self, secret: &[u8], message: &[u8], scheme: SignatureScheme) -> Result<Vec<u8>> {
        use ed25519_dalek::Signer as _;
        self.check_scheme(scheme)?;
        Ok(ed_secret(secret)?.sign(message).to_bytes().to_vec())
    }

    fn verify(&self, public: &[u8], message: &[u8], scheme: SignatureScheme, value: &[u8]) -> bool {
        use ed25519_dalek::Verifier as _;
        if scheme != SignatureScheme::Sha512WithEdDsa {
            return false;
        }
        let (Ok(vk), Ok(sig)) = (ed_public(public), ed25519_dalek::Signature::from_slice(value)) else {
            return false;
        };
        vk.verify(message, &sig).is_ok()
    }
}
