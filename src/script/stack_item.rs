//! Decoded VM values and the typed stack-item format nodes return.
//!
//! Stack-item wire format (one type byte, then the payload):
//!
//! ```text
//! 0x00 ByteArray   var_bytes
//! 0x01 Boolean     1 byte
//! 0x02 Integer     var_bytes (LE two's complement)
//! 0x80 Array       varint count, items
//! 0x81 Struct      varint count, items
//! 0x82 Map         varint count, (key item, value item) pairs; keys are ByteArray
//! ```
//!
//! Both directions are iterative, so nesting depth is bounded only by memory.

use crate::error::{CodecError, Result};
use crate::utils::bigint::{bigint_from_bytes, bigint_to_bytes};
use crate::utils::codec::{write_var_bytes, write_var_uint};
use crate::utils::reader::StringReader;
use num_bigint::BigInt;
use std::collections::BTreeMap;

pub const TYPE_BYTE_ARRAY: u8 = 0x00;
pub const TYPE_BOOLEAN: u8 = 0x01;
pub const TYPE_INTEGER: u8 = 0x02;
pub const TYPE_ARRAY: u8 = 0x80;
pub const TYPE_STRUCT: u8 = 0x81;
pub const TYPE_MAP: u8 = 0x82;

/// Deepest container nesting either decoder accepts. Decoded values are
/// dropped, cloned and compared recursively, so depth must stay bounded.
pub const MAX_NESTING_DEPTH: usize = 1024;

/// A decoded VM value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StackItem {
    ByteArray(Vec<u8>),
    Boolean(bool),
    Integer(BigInt),
    Array(Vec<StackItem>),
    Struct(Vec<StackItem>),
    Map(BTreeMap<String, StackItem>),
}

impl StackItem {
    /// Raw bytes of a scalar the way the VM would see them.
    ///
    /// Integers use the minimal encoding, booleans are `[1]`/`[0]`.
    pub fn as_bytes(&self) -> Option<Vec<u8>> {
        match self {
            StackItem::ByteArray(b) => Some(b.clone()),
            StackItem::Boolean(b) => Some(vec![u8::from(*b)]),
            StackItem::Integer(i) => Some(bigint_to_bytes(i)),
            _ => None,
        }
    }

    pub fn as_integer(&self) -> Option<BigInt> {
        match self {
            StackItem::Integer(i) => Some(i.clone()),
            StackItem::ByteArray(b) => Some(bigint_from_bytes(b)),
            StackItem::Boolean(b) => Some(BigInt::from(u8::from(*b))),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            StackItem::Boolean(b) => Some(*b),
            StackItem::Integer(i) => Some(*i != BigInt::from(0)),
            StackItem::ByteArray(b) => Some(b.iter().any(|&x| x != 0)),
            _ => None,
        }
    }

    pub fn as_string(&self) -> Option<String> {
        match self {
            StackItem::ByteArray(b) => String::from_utf8(b.clone()).ok(),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&[StackItem]> {
        match self {
            StackItem::Array(v) | StackItem::Struct(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_map(&self) -> Option<&BTreeMap<String, StackItem>> {
        match self {
            StackItem::Map(m) => Some(m),
            _ => None,
        }
    }

    /// Map lookup; `None` for non-maps.
    pub fn get(&self, key: &str) -> Option<&StackItem> {
        self.as_map().and_then(|m| m.get(key))
    }

    /// Element count of a container (0 for scalars).
    pub fn len(&self) -> usize {
        match self {
            StackItem::Array(v) | StackItem::Struct(v) => v.len(),
            StackItem::Map(m) => m.len(),
            _ => 0,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Compare by value and shape, ignoring how scalars happen to be tagged
    /// (`Integer(100)` equals `ByteArray([0x64])`). Arrays and structs match
    /// each other.
    pub fn same_value(&self, other: &StackItem) -> bool {
        let mut todo = vec![(self, other)];
        while let Some((a, b)) = todo.pop() {
            match (a.as_array(), b.as_array()) {
                (Some(x), Some(y)) => {
                    if x.len() != y.len() {
                        return false;
                    }
                    todo.extend(x.iter().zip(y));
                    continue;
                }
                (Some(_), None) | (None, Some(_)) => return false,
                (None, None) => {}
            }
            match (a.as_map(), b.as_map()) {
                (Some(x), Some(y)) => {
                    if x.len() != y.len() || !x.keys().eq(y.keys()) {
                        return false;
                    }
                    todo.extend(x.values().zip(y.values()));
                }
                (None, None) => {
                    if a.as_bytes() != b.as_bytes() {
                        return false;
                    }
                }
                _ => return false,
            }
        }
        true
    }

    // ---- Binary form ------------------------------------------------------

    /// Encode in the stack-item format. Map keys come out sorted.
    pub fn serialize(&self) -> Vec<u8> {
        let mut out = Vec::new();
        let mut todo: Vec<Emit<'_>> = vec![Emit::Item(self)];
        while let Some(next) = todo.pop() {
            match next {
                Emit::Key(k) => {
                    out.push(TYPE_BYTE_ARRAY);
                    write_var_bytes(&mut out, k.as_bytes());
                }
                Emit::Item(item) => match item {
                    StackItem::ByteArray(b) => {
                        out.push(TYPE_BYTE_ARRAY);
                        write_var_bytes(&mut out, b);
                    }
                    StackItem::Boolean(b) => {
                        out.push(TYPE_BOOLEAN);
                        out.push(u8::from(*b));
                    }
                    StackItem::Integer(i) => {
                        out.push(TYPE_INTEGER);
                        write_var_bytes(&mut out, &bigint_to_bytes(i));
                    }
                    StackItem::Array(v) | StackItem::Struct(v) => {
                        out.push(if matches!(item, StackItem::Array(_)) { TYPE_ARRAY } else { TYPE_STRUCT });
                        write_var_uint(&mut out, v.len() as u64);
                        todo.extend(v.iter().rev().map(Emit::Item));
                    }
                    StackItem::Map(m) => {
                        out.push(TYPE_MAP);
                        write_var_uint(&mut out, m.len() as u64);
                        for (k, v) in m.iter().rev() {
                            todo.push(Emit::Item(v));
                            todo.push(Emit::Key(k));
                        }
                    }
                },
            }
        }
        out
    }

    /// Hex of [`StackItem::serialize`].
    pub fn serialize_hex(&self) -> String {
        hex::encode(self.serialize())
    }
}

enum Emit<'a> {
    Item(&'a StackItem),
    Key(&'a str),
}

// ---- Decoding ---------------------------------------------------------------

enum Frame {
    List { is_struct: bool, remaining: usize, items: Vec<StackItem> },
    Map { remaining: usize, pending_key: Option<String>, entries: BTreeMap<String, StackItem> },
}

impl Frame {
    fn remaining(&self) -> usize {
        match self {
            Frame::List { remaining, .. } | Frame::Map { remaining, .. } => *remaining,
        }
    }

    fn finish(self) -> StackItem {
        match self {
            Frame::List { is_struct: true, items, .. } => StackItem::Struct(items),
            Frame::List { items, .. } => StackItem::Array(items),
            Frame::Map { entries, .. } => StackItem::Map(entries),
        }
    }
}

/// Decode one stack item from `sr`. Trailing bytes are left unread.
pub fn deserialize_item(sr: &mut StringReader) -> Result<StackItem> {
    let mut frames: Vec<Frame> = Vec::new();
    loop {
        let offset = sr.position();
        let ty = sr.read_u8()?;
        let mut value = match ty {
            TYPE_BYTE_ARRAY => Some(StackItem::ByteArray(sr.read_var_bytes()?.to_vec())),
            TYPE_BOOLEAN => Some(StackItem::Boolean(sr.read_bool()?)),
            TYPE_INTEGER => Some(StackItem::Integer(bigint_from_bytes(sr.read_var_bytes()?))),
            TYPE_ARRAY | TYPE_STRUCT | TYPE_MAP => {
                let count = sr.read_len()?;
                // Every item takes at least one byte.
                if count > sr.remaining() {
                    return Err(CodecError::Malformed(format!(
                        "container at offset {offset} claims {count} items, only {} bytes left",
                        sr.remaining()
                    ))
                    .into());
                }
                let frame = if ty == TYPE_MAP {
                    Frame::Map { remaining: count, pending_key: None, entries: BTreeMap::new() }
                } else {
                    Frame::List { is_struct: ty == TYPE_STRUCT, remaining: count, items: Vec::with_capacity(count) }
                };
                if count == 0 {
                    Some(frame.finish())
                } else {
                    if frames.len() >= MAX_NESTING_DEPTH {
                        return Err(CodecError::Malformed(format!(
                            "container at offset {offset} nests deeper than {MAX_NESTING_DEPTH}"
                        ))
                        .into());
                    }
                    frames.push(frame);
                    None
                }
            }
            other => return Err(CodecError::UnknownItemType(other).into()),
        };

        // Feed completed values into their parents, closing frames as they fill.
        while let Some(item) = value.take() {
            let Some(top) = frames.last_mut() else {
                return Ok(item);
            };
            match top {
                Frame::List { remaining, items, .. } => {
                    items.push(item);
                    *remaining -= 1;
                }
                Frame::Map { remaining, pending_key, entries } => match pending_key.take() {
                    None => {
                        let key = match item {
                            StackItem::ByteArray(b) => String::from_utf8(b).map_err(|_| {
                                CodecError::Malformed("map key is not utf-8".into())
                            })?,
                            _ => return Err(CodecError::Malformed("map key must be a byte array".into()).into()),
                        };
                        if entries.contains_key(&key) {
                            return Err(CodecError::Malformed(format!("duplicate map key {key:?}")).into());
                        }
                        *pending_key = Some(key);
                    }
                    Some(k) => {
                        entries.insert(k, item);
                        *remaining -= 1;
                    }
                },
            }
            if top.remaining() == 0 {
                if let Some(done) = frames.pop() {
                    value = Some(done.finish());
                }
            }
        }
    }
}

/// Decode a stack item from hex.
pub fn deserialize_item_hex(hex: &str) -> Result<StackItem> {
    let mut sr = StringReader::new(hex)?;
    deserialize_item(&mut sr)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;

    const NESTED: &str = "820600036b6579000668656c6c6f3200046b6579320002aabb00046b65793302016400046b657934010100046b6579358002000568656c6c6f02016400046b657936820300036b6579000668656c6c6f3200046b657931010100046b657933020164";

    #[test]
    fn nested_map_fixture() {
        let item = deserialize_item_hex(NESTED).unwrap();
        assert_eq!(item.len(), 6);
        let key5 = item.get("key5").unwrap();
        assert_eq!(key5.len(), 2);
        assert_eq!(key5.as_array().unwrap()[0].as_string().unwrap(), "hello");
        assert_eq!(key5.as_array().unwrap()[1].as_integer().unwrap(), BigInt::from(100));
        assert_eq!(item.get("key").unwrap().as_string().unwrap(), "hello2");
        assert_eq!(item.get("key2").unwrap().as_bytes().unwrap(), vec![0xaa, 0xbb]);
        assert_eq!(item.get("key4").unwrap().as_bool(), Some(true));
        let key6 = item.get("key6").unwrap();
        assert_eq!(key6.len(), 3);
        assert_eq!(key6.get("key1"), Some(&StackItem::Boolean(true)));
        // Sorted-key re-encoding reproduces the input exactly.
        assert_eq!(item.serialize_hex(), NESTED);
    }

    #[test]
    fn empty_containers() {
        assert_eq!(deserialize_item_hex("8000").unwrap(), StackItem::Array(vec![]));
        assert_eq!(deserialize_item_hex("8200").unwrap(), StackItem::Map(BTreeMap::new()));
        assert!(matches!(
            deserialize_item_hex("810100"),
            Err(Error::Codec(CodecError::UnexpectedEof { offset: 3, needed: 1, remaining: 0 }))
        ));
    }

    #[test]
    fn struct_and_integer() {
        let s = StackItem::Struct(vec![StackItem::Integer(BigInt::from(-1)), StackItem::Integer(BigInt::from(0))]);
        let hex = s.serialize_hex();
        assert_eq!(hex, "81020201ff0200");
        assert_eq!(deserialize_item_hex(&hex).unwrap(), s);
    }

    #[test]
    fn truncated_and_unknown() {
        assert!(matches!(
            deserialize_item_hex("8002000161"),
            Err(Error::Codec(CodecError::UnexpectedEof { .. }))
        ));
        assert!(matches!(deserialize_item_hex("40"), Err(Error::Codec(CodecError::UnknownItemType(0x40)))));
        assert!(matches!(deserialize_item_hex("80fd0001"), Err(Error::Codec(CodecError::Malformed(_)))));
        // Integer used as a map key.
        assert!(matches!(deserialize_item_hex("8201020101000100"), Err(Error::Codec(CodecError::Malformed(_)))));
    }

    #[test]
    fn deep_nesting_is_iterative() {
        let depth = 1_000;
        let mut hex = "8001".repeat(depth);
        hex.push_str("0100");
        let item = deserialize_item_hex(&hex).unwrap();
        let mut cur = &item;
        let mut seen = 0;
        while let Some(inner) = cur.as_array() {
            cur = &inner[0];
            seen += 1;
        }
        assert_eq!(seen, depth);
        assert_eq!(cur, &StackItem::Boolean(false));
        assert_eq!(item.serialize_hex(), hex);
    }

    #[test]
    fn nesting_past_the_limit_is_rejected() {
        let mut hex = "8001".repeat(MAX_NESTING_DEPTH);
        hex.push_str("0100");
        assert!(deserialize_item_hex(&hex).is_ok());

        let mut hex = "8001".repeat(200_000);
        hex.push_str("0100");
        assert!(matches!(deserialize_item_hex(&hex), Err(Error::Codec(CodecError::Malformed(_)))));
    }

    #[test]
    fn duplicate_map_keys_are_rejected() {
        // {"k": 1, "k": 2}
        let hex = "820200016b02010100016b020102";
        assert!(matches!(deserialize_item_hex(hex), Err(Error::Codec(CodecError::Malformed(_)))));
    }

    #[test]
    fn same_value_on_deep_trees() {
        let mut a = StackItem::Integer(BigInt::from(5));
        let mut b = StackItem::ByteArray(vec![5]);
        for _ in 0..MAX_NESTING_DEPTH {
            a = StackItem::Array(vec![a]);
            b = StackItem::Struct(vec![b]);
        }
        assert!(a.same_value(&b));
        assert!(!a.same_value(&StackItem::Array(vec![])));
    }

    #[test]
    fn same_value_ignores_scalar_tags() {
        let a = StackItem::Array(vec![StackItem::Integer(BigInt::from(100)), StackItem::Boolean(true)]);
        let b = StackItem::Array(vec![StackItem::ByteArray(vec![0x64]), StackItem::ByteArray(vec![1])]);
        assert!(a.same_value(&b));
        assert!(!a.same_value(&StackItem::Array(vec![])));
        assert!(StackItem::Struct(vec![]).same_value(&StackItem::Array(vec![])));
    }
}
