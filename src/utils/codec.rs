//! Writers for the chain's length-prefixed primitives.
//!
//! ```text
//! value < 0xfd          → 1 byte
//! value ≤ 0xffff        → 0xfd || u16 LE
//! value ≤ 0xffff_ffff   → 0xfe || u32 LE
//! otherwise             → 0xff || u64 LE
//! ```
//!
//! Output is always the canonical (shortest) form. The matching readers live
//! on [`StringReader`](crate::utils::StringReader).

/// Append the canonical varint encoding of `value`.
pub fn write_var_uint(buf: &mut Vec<u8>, value: u64) {
    if value < 0xfd {
        buf.push(value as u8);
    } else if value <= 0xffff {
        buf.push(0xfd);
        buf.extend_from_slice(&(value as u16).to_le_bytes());
    } else if value <= 0xffff_ffff {
        buf.push(0xfe);
        buf.extend_from_slice(&(value as u32).to_le_bytes());
    } else {
        buf.push(0xff);
        buf.extend_from_slice(&value.to_le_bytes());
    }
}

/// Size in bytes of the canonical varint encoding of `value`.
pub fn var_uint_size(value: u64) -> usize {
    match value {
        0..=0xfc => 1,
        0xfd..=0xffff => 3,
        0x1_0000..=0xffff_ffff => 5,
        _ => 9,
    }
}

/// Append `varint(len) || bytes`.
pub fn write_var_bytes(buf: &mut Vec<u8>, bytes: &[u8]) {
    write_var_uint(buf, bytes.len() as u64);
    buf.extend_from_slice(bytes);
}

/// Append `varint(len) || utf8(s)`.
pub fn write_var_str(buf: &mut Vec<u8>, s: &str) {
    write_var_bytes(buf, s.as_bytes());
}

/// Append a boolean as a single byte.
#[inline]
pub fn write_bool(buf: &mut Vec<u8>, value: bool) {
    buf.push(u8::from(value));
}

#[cfg(test)]
mod tests {
    use super::*;

    fn enc(v: u64) -> Vec<u8> {
        let mut b = Vec::new();
        write_var_uint(&mut b, v);
        b
    }

    #[test]
    fn varint_boundaries() {
        assert_eq!(enc(0), vec![0x00]);
        assert_eq!(enc(0xfc), vec![0xfc]);
        assert_eq!(enc(0xfd), vec![0xfd, 0xfd, 0x00]);
        assert_eq!(enc(0xffff), vec![0xfd, 0xff, 0xff]);
        assert_eq!(enc(0x1_0000), vec![0xfe, 0x00, 0x00, 0x01, 0x00]);
        assert_eq!(enc(0x1_0000_0000), vec![0xff, 0, 0, 0, 0, 1, 0, 0, 0]);
        for v in [0u64, 0xfc, 0xfd, 0xffff, 0x1_0000, u32::MAX as u64, u64::MAX] {
            assert_eq!(enc(v).len(), var_uint_size(v));
        }
    }

    #[test]
    fn var_bytes_and_str() {
        let mut b = Vec::new();
        write_var_str(&mut b, "key");
        write_var_bytes(&mut b, &[0xaa, 0xbb]);
        write_bool(&mut b, true);
        assert_eq!(hex::encode(&b), "036b657902aabb01");
    }
}
