//! Big integer ↔ bytes, in the VM's numeric representation.
//!
//! Integers are minimal little-endian two's complement; zero is the empty
//! byte string.

use crate::error::{Error, Result};
use num_bigint::BigInt;
use num_traits::Zero;

/// Encode `value` as minimal little-endian two's complement (`0` → empty).
pub fn bigint_to_bytes(value: &BigInt) -> Vec<u8> {
    if value.is_zero() {
        return Vec::new();
    }
    value.to_signed_bytes_le()
}

/// Decode little-endian two's complement. Accepts non-minimal input.
pub fn bigint_from_bytes(bytes: &[u8]) -> BigInt {
    if bytes.is_empty() {
        return BigInt::zero();
    }
    BigInt::from_signed_bytes_le(bytes)
}

/// Parse a decimal string (optionally signed) into a `BigInt`.
pub fn parse_bigint(s: &str) -> Result<BigInt> {
    s.trim()
        .parse::<BigInt>()
        .map_err(|e| Error::InvalidParameter(format!("not a decimal integer '{s}': {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hex_of(v: i64) -> String {
        hex::encode(bigint_to_bytes(&BigInt::from(v)))
    }

    #[test]
    fn canonical_encodings() {
        assert_eq!(hex_of(0), "");
        assert_eq!(hex_of(100), "64");
        assert_eq!(hex_of(-1), "ff");
        assert_eq!(hex_of(127), "7f");
        assert_eq!(hex_of(128), "8000");
        assert_eq!(hex_of(-128), "80");
        assert_eq!(hex_of(-129), "7fff");
        assert_eq!(hex_of(255), "ff00");
        assert_eq!(hex_of(2500), "c409");
    }

    #[test]
    fn decode_inverts_encode() {
        for v in [0i64, 1, -1, 100, 127, 128, -128, -129, 1 << 40, i64::MIN, i64::MAX] {
            let b = BigInt::from(v);
            assert_eq!(bigint_from_bytes(&bigint_to_bytes(&b)), b);
        }
        let big = parse_bigint("-32778036993815411123456789").unwrap();
        assert_eq!(bigint_from_bytes(&bigint_to_bytes(&big)), big);
    }

    #[test]
    fn non_minimal_input_is_accepted() {
        assert_eq!(bigint_from_bytes(&[0x64, 0x00, 0x00]), BigInt::from(100));
        assert_eq!(bigint_from_bytes(&[0xff, 0xff]), BigInt::from(-1));
    }

    #[test]
    fn parse_rejects_garbage() {
        assert!(parse_bigint("12a").is_err());
        assert_eq!(parse_bigint(" 14978884054759223 ").unwrap(), BigInt::from(14978884054759223i64));
    }
}
