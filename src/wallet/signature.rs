//! Signature schemes and the signature wire form.
//!
//! ```text
//! signature = scheme (u8) || [SM2 only: user id || 0x00] || value (64 bytes, r || s)
//! ```

use super::keys::KeyType;
use crate::error::{Error, Result};
use crate::utils::bytes::{hex_decode, hex_encode};
use serde::{Deserialize, Serialize};

/// SM2 user id used when signing and verifying.
pub const SM2_DIST_ID: &str = "1234567812345678";

/// Length of the raw signature value for every supported scheme.
pub const SIGNATURE_VALUE_LEN: usize = 64;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SignatureScheme {
    #[serde(rename = "SHA256withECDSA")]
    Sha256WithEcdsa,
    #[serde(rename = "SHA3-256withECDSA")]
    Sha3_256WithEcdsa,
    #[serde(rename = "SM3withSM2")]
    Sm3WithSm2,
    #[serde(rename = "SHA512withEdDSA")]
    Sha512WithEdDsa,
}

impl SignatureScheme {
    pub fn code(self) -> u8 {
        match self {
            SignatureScheme::Sha256WithEcdsa => 0x01,
            SignatureScheme::Sha3_256WithEcdsa => 0x05,
            SignatureScheme::Sm3WithSm2 => 0x09,
            SignatureScheme::Sha512WithEdDsa => 0x0a,
        }
    }

    pub fn from_code(code: u8) -> Result<Self> {
        match code {
            0x01 => Ok(SignatureScheme::Sha256WithEcdsa),
            0x05 => Ok(SignatureScheme::Sha3_256WithEcdsa),
            0x09 => Ok(SignatureScheme::Sm3WithSm2),
            0x0a => Ok(SignatureScheme::Sha512WithEdDsa),
            other => Err(Error::UnsupportedScheme(format!("0x{other:02x}"))),
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            SignatureScheme::Sha256WithEcdsa => "SHA256withECDSA",
            SignatureScheme::Sha3_256WithEcdsa => "SHA3-256withECDSA",
            SignatureScheme::Sm3WithSm2 => "SM3withSM2",
            SignatureScheme::Sha512WithEdDsa => "SHA512withEdDSA",
        }
    }

    pub fn from_label(label: &str) -> Result<Self> {
        [
            SignatureScheme::Sha256WithEcdsa,
            SignatureScheme::Sha3_256WithEcdsa,
            SignatureScheme::Sm3WithSm2,
            SignatureScheme::Sha512WithEdDsa,
        ]
        .into_iter()
        .find(|s| s.label() == label)
        .ok_or_else(|| Error::UnsupportedScheme(label.to_string()))
    }

    /// Key algorithm this scheme belongs to.
    pub fn key_type(self) -> KeyType {
        match self {
            SignatureScheme::Sha256WithEcdsa | SignatureScheme::Sha3_256WithEcdsa => KeyType::Ecdsa,
            SignatureScheme::Sm3WithSm2 => KeyType::Sm2,
            SignatureScheme::Sha512WithEdDsa => KeyType::EdDsa,
        }
    }
}

/// A signature together with the scheme that produced it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Signature {
    pub scheme: SignatureScheme,
    pub value: Vec<u8>,
}

impl Signature {
    pub fn new(scheme: SignatureScheme, value: Vec<u8>) -> Result<Self> {
        if value.len() != SIGNATURE_VALUE_LEN {
            return Err(Error::InvalidKey(format!(
                "signature value must be {SIGNATURE_VALUE_LEN} bytes, got {}",
                value.len()
            )));
        }
        Ok(Self { scheme, value })
    }

    pub fn serialize(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(1 + SM2_DIST_ID.len() + 1 + self.value.len());
        out.push(self.scheme.code());
        if self.scheme == SignatureScheme::Sm3WithSm2 {
            out.extend_from_slice(SM2_DIST_ID.as_bytes());
            out.push(0);
        }
        out.extend_from_slice(&self.value);
        out
    }

    pub fn serialize_hex(&self) -> String {
        hex_encode(self.serialize())
    }

    pub fn deserialize(bytes: &[u8]) -> Result<Self> {
        let (&code, mut rest) = bytes
            .split_first()
            .ok_or_else(|| Error::InvalidKey("empty signature".into()))?;
        let scheme = SignatureScheme::from_code(code)?;
        if scheme == SignatureScheme::Sm3WithSm2 {
            let nul = rest
                .iter()
                .position(|&b| b == 0)
                .ok_or_else(|| Error::InvalidKey("SM2 signature without user id".into()))?;
            if &rest[..nul] != SM2_DIST_ID.as_bytes() {
                return Err(Error::InvalidKey("unsupported SM2 user id".into()));
            }
            rest = &rest[nul + 1..];
        }
        Self::new(scheme, rest.to_vec())
    }

    pub fn deserialize_hex(hex: &str) -> Result<Self> {
        Self::deserialize(&hex_decode(hex)?)
    }
}
