//! VM bytecode → [`StackItem`].
//!
//! Composite markers (`PACK`, `PACK NEWMAP`) follow their children, so the
//! decoder is a linear scan that keeps an explicit stack of decoded values:
//!
//! - push opcodes push a `ByteArray` (`PUSHM1`/`PUSH1..16` push an `Integer`)
//! - `PACK` pops a count `n`, then `n` items into an `Array`
//! - `PACK NEWMAP` pops a count `n`, then `n` key/value pairs into a `Map`
//!
//! Type tags of scalars are not recoverable from the bytecode; a decoded
//! `ByteArray([0x64])` is what both `Integer(100)` and `ByteArray("64")`
//! produce.

use super::opcode::*;
use super::stack_item::{StackItem, MAX_NESTING_DEPTH};
use crate::address::{Address, ADDRESS_LEN};
use crate::error::{CodecError, Result};
use crate::utils::reader::StringReader;
use num_bigint::BigInt;
use num_traits::ToPrimitive;
use std::collections::BTreeMap;

/// Stack machine over one script.
#[derive(Debug, Default)]
pub struct ScriptDecoder {
    stack: Vec<StackItem>,
    // Container nesting of each stack entry; scalars are 0.
    depths: Vec<usize>,
    app_call: Option<Address>,
}

impl ScriptDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Run until `sr` is exhausted or an `APPCALL` has been consumed.
    pub fn run(&mut self, sr: &mut StringReader) -> Result<()> {
        while !sr.is_eof() {
            let offset = sr.position();
            let op = sr.read_u8()?;
            match op {
                PUSH0 => self.push_scalar(StackItem::ByteArray(Vec::new())),
                PUSHBYTES1..=PUSHBYTES75 => {
                    let data = sr.read(op as usize)?.to_vec();
                    self.push_scalar(StackItem::ByteArray(data));
                }
                PUSHDATA1 => {
                    let len = sr.read_u8()? as usize;
                    self.push_scalar(StackItem::ByteArray(sr.read(len)?.to_vec()));
                }
                PUSHDATA2 => {
                    let len = sr.read_u16_le()? as usize;
                    self.push_scalar(StackItem::ByteArray(sr.read(len)?.to_vec()));
                }
                PUSHDATA4 => {
                    let len = sr.read_u32_le()? as usize;
                    self.push_scalar(StackItem::ByteArray(sr.read(len)?.to_vec()));
                }
                PUSHM1 => self.push_scalar(StackItem::Integer(BigInt::from(-1))),
                PUSH1..=PUSH16 => {
                    self.push_scalar(StackItem::Integer(BigInt::from(op - PUSH1 + 1)))
                }
                PACK => {
                    let is_map = sr.peek() == Some(NEWMAP);
                    if is_map {
                        sr.read_u8()?;
                    }
                    self.pack(is_map)?;
                }
                APPCALL => {
                    let raw = sr.read_array::<ADDRESS_LEN>()?;
                    self.app_call = Some(Address::new(raw));
                    return Ok(());
                }
                other => {
                    return Err(CodecError::UnknownOpcode { opcode: other, offset }.into());
                }
            }
        }
        Ok(())
    }

    fn push_scalar(&mut self, item: StackItem) {
        self.stack.push(item);
        self.depths.push(0);
    }

    fn pop(&mut self) -> Result<(StackItem, usize), CodecError> {
        match (self.stack.pop(), self.depths.pop()) {
            (Some(item), Some(depth)) => Ok((item, depth)),
            _ => Err(CodecError::PackOverflow { count: 1, available: 0 }),
        }
    }

    fn pack(&mut self, is_map: bool) -> Result<(), CodecError> {
        let (count_item, _) = self.pop()?;
        let count = count_item
            .as_integer()
            .and_then(|n| n.to_usize())
            .ok_or_else(|| CodecError::Malformed("pack count is not a non-negative integer".into()))?;
        let needed = if is_map { count.saturating_mul(2) } else { count };
        if needed > self.stack.len() {
            return Err(CodecError::PackOverflow { count: needed, available: self.stack.len() });
        }
        let mut depth = 0;
        let item = if is_map {
            let mut entries = BTreeMap::new();
            for _ in 0..count {
                let (key, _) = self.pop()?;
                let (value, value_depth) = self.pop()?;
                let key = match key {
                    StackItem::ByteArray(b) => String::from_utf8(b)
                        .map_err(|_| CodecError::Malformed("map key is not utf-8".into()))?,
                    _ => return Err(CodecError::Malformed("map key must be a byte string".into())),
                };
                if entries.contains_key(&key) {
                    return Err(CodecError::Malformed(format!("duplicate map key {key:?}")));
                }
                depth = depth.max(value_depth);
                entries.insert(key, value);
            }
            StackItem::Map(entries)
        } else {
            let mut items = Vec::with_capacity(count);
            for _ in 0..count {
                let (item, item_depth) = self.pop()?;
                depth = depth.max(item_depth);
                items.push(item);
            }
            StackItem::Array(items)
        };
        if depth >= MAX_NESTING_DEPTH {
            return Err(CodecError::Malformed(format!("containers nest deeper than {MAX_NESTING_DEPTH}")));
        }
        self.stack.push(item);
        self.depths.push(depth + 1);
        Ok(())
    }

    /// Contract named by a consumed `APPCALL`, if any.
    pub fn app_call(&self) -> Option<&Address> {
        self.app_call.as_ref()
    }

    pub fn stack(&self) -> &[StackItem] {
        &self.stack
    }

    pub fn into_stack(self) -> Vec<StackItem> {
        self.stack
    }
}

/// Decode a complete script into the resulting stack (bottom first).
///
/// Errors if the script contains an `APPCALL`; use [`decode_invoke_code`] for
/// invocation code.
pub fn decode_script(code: &[u8]) -> Result<Vec<StackItem>> {
    let mut sr = StringReader::from_bytes(code);
    let mut dec = ScriptDecoder::new();
    dec.run(&mut sr)?;
    if dec.app_call().is_some() {
        return Err(CodecError::Malformed("unexpected APPCALL in data script".into()).into());
    }
    Ok(dec.into_stack())
}

/// Decode the bytecode of one serialized parameter from `sr`.
///
/// Consumes the rest of the reader and requires exactly one resulting value.
pub fn deserialize_parameter(sr: &mut StringReader) -> Result<StackItem> {
    let mut dec = ScriptDecoder::new();
    dec.run(sr)?;
    if dec.app_call().is_some() || !sr.is_eof() {
        return Err(CodecError::Malformed("unexpected APPCALL in parameter script".into()).into());
    }
    let mut stack = dec.into_stack();
    match (stack.pop(), stack.is_empty()) {
        (Some(item), true) => Ok(item),
        (None, _) => Err(CodecError::Malformed("script pushes no value".into()).into()),
        (Some(_), false) => Err(CodecError::Malformed(format!(
            "script leaves {} values on the stack, expected 1",
            stack.len() + 1
        ))
        .into()),
    }
}

/// A decoded contract invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvokeCall {
    pub contract: Address,
    pub method: String,
    pub args: Vec<StackItem>,
}

/// Split invocation code back into contract, method name and arguments.
pub fn decode_invoke_code(code: &[u8]) -> Result<InvokeCall> {
    let mut sr = StringReader::from_bytes(code);
    let mut dec = ScriptDecoder::new();
    dec.run(&mut sr)?;
    let contract = *dec
        .app_call()
        .ok_or_else(|| CodecError::Malformed("invocation code has no APPCALL".into()))?;
    if !sr.is_eof() {
        return Err(CodecError::Malformed(format!("{} trailing bytes after APPCALL", sr.remaining())).into());
    }
    let mut stack = dec.into_stack();
    let method = stack
        .pop()
        .and_then(|m| m.as_string())
        .ok_or_else(|| CodecError::Malformed("method name missing or not utf-8".into()))?;
    let args = match stack.pop() {
        Some(StackItem::Array(items)) => items,
        _ => return Err(CodecError::Malformed("argument array missing".into()).into()),
    };
    if !stack.is_empty() {
        return Err(CodecError::Malformed("extra values before argument array".into()).into());
    }
    Ok(InvokeCall { contract, method, args })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::abi::Parameter;
    use crate::error::Error;
    use crate::script::builder::{build_invoke_code, serialize_parameter};

    fn roundtrip(p: &Parameter) -> StackItem {
        let bytes = serialize_parameter(p);
        deserialize_parameter(&mut StringReader::from_bytes(bytes)).unwrap()
    }

    #[test]
    fn integers_decode_to_their_bytes() {
        for v in [0i64, 100, -1, 128, -129, 1 << 40] {
            let got = roundtrip(&Parameter::integer("", v));
            assert_eq!(got.as_integer().unwrap(), BigInt::from(v));
        }
        assert_eq!(roundtrip(&Parameter::integer("", 0)), StackItem::ByteArray(vec![]));
    }

    #[test]
    fn empty_containers() {
        assert_eq!(roundtrip(&Parameter::array("", vec![])), StackItem::Array(vec![]));
        assert_eq!(roundtrip(&Parameter::map::<&str>("", [])), StackItem::Map(BTreeMap::new()));
    }

    #[test]
    fn map_in_array_in_map() {
        let p = Parameter::map(
            "",
            [
                (
                    "outer",
                    Parameter::array(
                        "",
                        vec![
                            Parameter::map("", [("deep", Parameter::integer("", 7))]),
                            Parameter::string("", "x"),
                        ],
                    ),
                ),
                ("flag", Parameter::boolean("", false)),
            ],
        );
        let got = roundtrip(&p);
        assert!(got.same_value(&p.to_stack_item()));
        let deep = &got.get("outer").unwrap().as_array().unwrap()[0];
        assert_eq!(deep.get("deep").unwrap().as_integer().unwrap(), BigInt::from(7));
    }

    #[test]
    fn array_of_equal_length_is_not_a_map() {
        // Two items vs one pair: both pop two values, the marker decides.
        let arr = roundtrip(&Parameter::array("", vec![Parameter::string("", "k"), Parameter::string("", "v")]));
        let map = roundtrip(&Parameter::map("", [("k", Parameter::string("", "v"))]));
        assert!(matches!(arr, StackItem::Array(_)));
        assert!(matches!(map, StackItem::Map(_)));
    }

    #[test]
    fn small_int_opcodes_are_accepted() {
        // PUSH3 PUSH1 PUSHM1 PUSH3 PACK
        let items = decode_script(&[0x53, 0x51, 0x4f, 0x53, PACK]).unwrap();
        assert_eq!(items.len(), 1);
        let arr = items[0].as_array().unwrap();
        assert_eq!(arr[0].as_integer().unwrap(), BigInt::from(-1));
        assert_eq!(arr[2].as_integer().unwrap(), BigInt::from(3));
    }

    #[test]
    fn pack_overflow() {
        // push("a") push(3) PACK
        let err = decode_script(&[0x01, 0x61, 0x01, 0x03, PACK]).unwrap_err();
        assert!(matches!(err, Error::Codec(CodecError::PackOverflow { count: 3, available: 1 })));
        // Map of 1 pair needs 2 items.
        let err = decode_script(&[0x01, 0x61, 0x51, PACK, NEWMAP]).unwrap_err();
        assert!(matches!(err, Error::Codec(CodecError::PackOverflow { count: 2, available: 1 })));
        // PACK on an empty stack.
        assert!(matches!(decode_script(&[PACK]), Err(Error::Codec(CodecError::PackOverflow { .. }))));
    }

    #[test]
    fn duplicate_map_keys_are_rejected() {
        // push(2) push("k") push(1) push("k") push(2) PACK NEWMAP
        let code = [0x01, 0x02, 0x01, b'k', 0x01, 0x01, 0x01, b'k', 0x01, 0x02, PACK, NEWMAP];
        assert!(matches!(decode_script(&code), Err(Error::Codec(CodecError::Malformed(_)))));
    }

    #[test]
    fn nesting_depth_is_bounded() {
        // PUSH0 then (PUSH1 PACK) n times wraps the value n arrays deep.
        let nested = |n: usize| {
            let mut code = vec![PUSH0];
            for _ in 0..n {
                code.extend_from_slice(&[PUSH1, PACK]);
            }
            code
        };
        let items = decode_script(&nested(MAX_NESTING_DEPTH)).unwrap();
        assert_eq!(items.len(), 1);

        let deep = nested(200_000);
        assert!(matches!(decode_script(&deep), Err(Error::Codec(CodecError::Malformed(_)))));
        assert!(matches!(
            deserialize_parameter(&mut StringReader::from_bytes(deep)),
            Err(Error::Codec(CodecError::Malformed(_)))
        ));
    }

    #[test]
    fn truncated_and_unknown() {
        assert!(matches!(
            decode_script(&[0x05, 0x01, 0x02]),
            Err(Error::Codec(CodecError::UnexpectedEof { offset: 1, needed: 5, remaining: 2 }))
        ));
        assert!(matches!(decode_script(&[PUSHDATA2, 0x01]), Err(Error::Codec(CodecError::UnexpectedEof { .. }))));
        assert!(matches!(
            decode_script(&[0x00, 0xf0]),
            Err(Error::Codec(CodecError::UnknownOpcode { opcode: 0xf0, offset: 1 }))
        ));
    }

    #[test]
    fn deserialize_parameter_wants_one_value() {
        let mut sr = StringReader::from_bytes(vec![0x00, 0x00]);
        assert!(deserialize_parameter(&mut sr).is_err());
        let mut sr = StringReader::from_bytes(Vec::new());
        assert!(deserialize_parameter(&mut sr).is_err());
    }

    #[test]
    fn invoke_code_roundtrip() {
        let contract = Address::from_display_hex("ab01641c418af066402075c78dc8cb8279a7c074").unwrap();
        let params = vec![
            Parameter::string("op", "test"),
            Parameter::array("args", vec![Parameter::boolean("", false), Parameter::integer("", 3)]),
        ];
        let code = build_invoke_code(&contract, "testHello", &params);
        let call = decode_invoke_code(&code).unwrap();
        assert_eq!(call.contract, contract);
        assert_eq!(call.method, "testHello");
        assert_eq!(call.args.len(), 2);
        assert!(StackItem::Array(call.args).same_value(&Parameter::array("", params).to_stack_item()));

        let mut trailing = code.clone();
        trailing.push(0x00);
        assert!(decode_invoke_code(&trailing).is_err());
        assert!(decode_invoke_code(&code[..code.len() - 21]).is_err());
        assert!(decode_script(&code).is_err());
    }
}
