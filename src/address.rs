//! Account and contract addresses (Base58Check `A...` strings).
//!
//! Format:
//!   u160    = RIPEMD160(SHA256(program))           program = push(pubkey) || CHECKSIG
//!   payload = 0x17 || u160                          => 21 bytes
//!   address = base58(payload || sha256d(payload)[..4])
//!
//! Byte order:
//! - The *internal* order is the raw u160; that is what goes into scripts and
//!   transactions, and what [`Address::to_hex`] / [`Address::from_hex`] use.
//! - Contract hashes are conventionally *displayed* byte-reversed; use
//!   [`Address::to_display_hex`] / [`Address::from_display_hex`] for those.

use crate::error::{Error, Result};
use crate::script::builder::program_from_pub_key;
use crate::utils::bytes::{hex_decode, hex_encode};
use crate::utils::hash::{checksum4, hash160};
use crate::wallet::keys::PublicKey;
use core::fmt::{Display, Formatter};
use core::str::FromStr;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Base58Check version byte for account addresses.
pub const ADDR_VERSION: u8 = 0x17;

/// Raw address length.
pub const ADDRESS_LEN: usize = 20;

/// A 20-byte account/contract identifier, stored in internal byte order.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct Address([u8; ADDRESS_LEN]);

impl core::fmt::Debug for Address {
    fn fmt(&self, f: &mut Formatter<'_>) -> core::fmt::Result {
        write!(f, "Address({})", self.to_base58())
    }
}

impl Address {
    /// The all-zero address (used as the payer of unsigned transactions).
    pub const ZERO: Address = Address([0u8; ADDRESS_LEN]);

    pub const fn new(raw: [u8; ADDRESS_LEN]) -> Self {
        Self(raw)
    }

    /// Build from exactly 20 raw bytes (internal order).
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let raw: [u8; ADDRESS_LEN] = bytes.try_into().map_err(|_| {
            Error::InvalidAddressFormat(format!("address must be {ADDRESS_LEN} bytes, got {}", bytes.len()))
        })?;
        Ok(Self(raw))
    }

    /// Derive the address controlled by a single public key.
    pub fn from_public_key(pk: &PublicKey) -> Self {
        Self::from_verification_script(&program_from_pub_key(pk))
    }

    /// Address of a verification script (`hash160(program)`).
    pub fn from_verification_script(program: &[u8]) -> Self {
        Self(hash160(program))
    }

    /// Address of a deployed contract, computed from its code.
    pub fn from_vm_code(code: &[u8]) -> Self {
        Self(hash160(code))
    }

    #[inline]
    pub fn as_bytes(&self) -> &[u8; ADDRESS_LEN] {
        &self.0
    }

    #[inline]
    pub fn is_zero(&self) -> bool {
        self.0 == [0u8; ADDRESS_LEN]
    }

    // ---- Base58Check --------------------------------------------------------

    /// Encode to the human-readable Base58Check form.
    pub fn to_base58(&self) -> String {
        let mut data = Vec::with_capacity(1 + ADDRESS_LEN + 4);
        data.push(ADDR_VERSION);
        data.extend_from_slice(&self.0);
        let check = checksum4(&data);
        data.extend_from_slice(&check);
        bs58::encode(data).into_string()
    }

    /// Decode a Base58Check address, validating version, length and checksum.
    pub fn from_base58(s: &str) -> Result<Self> {
        let data = bs58::decode(s.trim())
            .into_vec()
            .map_err(|e| Error::InvalidAddressFormat(format!("base58: {e}")))?;
        if data.len() != 1 + ADDRESS_LEN + 4 {
            return Err(Error::InvalidAddressFormat(format!(
                "decoded address must be 25 bytes, got {}",
                data.len()
            )));
        }
        let (body, check) = data.split_at(1 + ADDRESS_LEN);
        if checksum4(body)[..] != check[..] {
            return Err(Error::InvalidChecksum);
        }
        if body[0] != ADDR_VERSION {
            return Err(Error::InvalidAddressFormat(format!(
                "unexpected version byte 0x{:02x}",
                body[0]
            )));
        }
        Self::from_bytes(&body[1..])
    }

    /// Quick boolean validator for a candidate address string.
    pub fn is_valid(s: &str) -> bool {
        Self::from_base58(s).is_ok()
    }

    // ---- Hex ---------------------------------------------------------------

    /// Internal-order hex (no prefix).
    pub fn to_hex(&self) -> String {
        hex_encode(self.0)
    }

    /// Parse internal-order hex.
    pub fn from_hex(s: &str) -> Result<Self> {
        Self::from_bytes(&hex_decode(s)?)
    }

    /// Display-order (byte-reversed) hex, as contract hashes are usually shown.
    pub fn to_display_hex(&self) -> String {
        let mut r = self.0;
        r.reverse();
        hex_encode(r)
    }

    /// Parse display-order (byte-reversed) hex.
    pub fn from_display_hex(s: &str) -> Result<Self> {
        let mut a = Self::from_hex(s)?;
        a.0.reverse();
        Ok(a)
    }
}

impl AsRef<[u8]> for Address {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl Display for Address {
    fn fmt(&self, f: &mut Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.to_base58())
    }
}

impl FromStr for Address {
    type Err = Error;
    fn from_str(s: &str) -> Result<Self> {
        Self::from_base58(s)
    }
}

impl Serialize for Address {
    fn serialize<S: Serializer>(&self, s: S) -> core::result::Result<S::Ok, S::Error> {
        s.serialize_str(&self.to_base58())
    }
}

impl<'de> Deserialize<'de> for Address {
    fn deserialize<D: Deserializer<'de>>(d: D) -> core::result::Result<Self, D::Error> {
        let s = String::deserialize(d)?;
        Address::from_base58(&s).map_err(serde::de::Error::custom)
    }
}
