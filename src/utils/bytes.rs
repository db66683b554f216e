//! Byte/hex helpers used across the SDK.
//!
//! Conventions:
//! - Hex strings are **lowercase** and unprefixed in canonical form (the node's
//!   REST/RPC interfaces expect bare hex).
//! - Decoders accept an optional `0x` prefix and both cases.
//! - Hashes and contract addresses are *displayed* byte-reversed relative to
//!   the order they are serialized in; [`reverse_hex`] converts between the two.

use crate::error::Error;

/// Whether the string starts with `0x` or `0X`.
#[inline]
pub fn has_0x(s: &str) -> bool {
    s.starts_with("0x") || s.starts_with("0X")
}

/// Strip a leading `0x`/`0X` prefix; return the original if absent.
#[inline]
pub fn strip_0x(s: &str) -> &str {
    if has_0x(s) { &s[2..] } else { s }
}

/// Encode bytes to canonical lowercase hex (no prefix).
#[inline]
pub fn hex_encode<B: AsRef<[u8]>>(bytes: B) -> String {
    hex::encode(bytes.as_ref())
}

/// Decode hex into bytes. Accepts with/without `0x`; odd length is rejected.
pub fn hex_decode(s: &str) -> Result<Vec<u8>, Error> {
    let hex = strip_0x(s.trim());
    if hex.is_empty() {
        return Ok(Vec::new());
    }
    Ok(hex::decode(hex)?)
}

/// Decode hex into a fixed-size array, requiring the exact length.
pub fn hex_to_fixed<const N: usize>(s: &str) -> Result<[u8; N], Error> {
    let bytes = hex_decode(s)?;
    if bytes.len() != N {
        return Err(Error::InvalidParams("hex has wrong length for target array"));
    }
    let mut out = [0u8; N];
    out.copy_from_slice(&bytes);
    Ok(out)
}

/// Return a reversed copy of `bytes`.
#[inline]
pub fn reverse_bytes(bytes: &[u8]) -> Vec<u8> {
    bytes.iter().rev().copied().collect()
}

/// Reverse the byte order of a hex string (`"0a0b"` → `"0b0a"`).
pub fn reverse_hex(s: &str) -> Result<String, Error> {
    let bytes = hex_decode(s)?;
    Ok(hex_encode(reverse_bytes(&bytes)))
}

/// Hex of the UTF-8 bytes of `s`.
#[inline]
pub fn str_to_hex(s: &str) -> String {
    hex_encode(s.as_bytes())
}

/// Decode hex and interpret the bytes as UTF-8.
pub fn hex_to_str(s: &str) -> Result<String, Error> {
    let bytes = hex_decode(s)?;
    String::from_utf8(bytes).map_err(|_| Error::InvalidParams("hex is not valid utf-8"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hex_roundtrip_and_prefix() {
        let b = [0x01u8, 0xAB, 0x00, 0xFF];
        let h = hex_encode(b);
        assert_eq!(h, "01ab00ff");
        assert_eq!(hex_decode(&h).unwrap(), b);
        assert_eq!(hex_decode("0x01AB00FF").unwrap(), b);
        assert!(hex_decode("abc").is_err());
        assert!(hex_decode("").unwrap().is_empty());
    }

    #[test]
    fn reversal() {
        assert_eq!(reverse_hex("0a0b0c").unwrap(), "0c0b0a");
        assert_eq!(
            reverse_hex("ab01641c418af066402075c78dc8cb8279a7c074").unwrap(),
            "74c0a77982cbc88dc775204066f08a411c6401ab"
        );
        assert_eq!(reverse_bytes(&[1, 2, 3]), vec![3, 2, 1]);
    }

    #[test]
    fn fixed_and_strings() {
        assert_eq!(hex_to_fixed::<2>("0x1234").unwrap(), [0x12, 0x34]);
        assert!(hex_to_fixed::<4>("1234").is_err());
        assert_eq!(str_to_hex("key"), "6b6579");
        assert_eq!(hex_to_str("68656c6c6f").unwrap(), "hello");
        assert!(hex_to_str("ff").is_err());
    }
}
