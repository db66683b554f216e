//! Smart-contract invocation parameters.
//!
//! A [`Parameter`] is a named, recursively typed value. Its JSON form mirrors
//! what the other SDKs exchange:
//!
//! ```json
//! {"name": "args", "type": "Array", "value": [
//!     {"name": "arg1", "type": "Boolean", "value": false},
//!     {"name": "arg2", "type": "Integer", "value": 3},
//!     {"name": "arg3", "type": "Address", "value": "AJkkLbouowk6teTaxz1F2DYKfJh24PVk3r"},
//!     {"name": "amount", "type": "Long", "value": "1000000000000000000"},
//!     {"name": "data", "type": "ByteArray", "value": "aabb"},
//!     {"name": "opts", "type": "Map", "value": {"k": {"name": "", "type": "String", "value": "v"}}}
//! ]}
//! ```
//!
//! Value shapes per type:
//! - `String` → JSON string; `Boolean` → JSON bool
//! - `Integer` → JSON number (a decimal string is also accepted)
//! - `Long` → decimal string (a JSON number is also accepted)
//! - `ByteArray` / `H256` → hex string (`0x` optional); `H256` is in display order
//! - `Address` → Base58 address
//! - `Array` → list of parameters; `Map` → object of string key → parameter
//!
//! Encoding to VM bytecode lives in [`crate::script`].

use crate::address::Address;
use crate::error::{Error, Result};
use crate::script::stack_item::StackItem;
use crate::utils::bigint::parse_bigint;
use crate::utils::bytes::{hex_decode, hex_encode, hex_to_fixed};
use num_bigint::BigInt;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// Declared parameter type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ParameterType {
    String,
    Integer,
    Long,
    Boolean,
    ByteArray,
    Address,
    H256,
    Array,
    Map,
}

/// Typed parameter payload. The variant *is* the type, so a value can never
/// disagree with its declared type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParameterValue {
    String(String),
    Integer(i64),
    Long(BigInt),
    Boolean(bool),
    ByteArray(Vec<u8>),
    Address(Address),
    /// 32-byte hash in display order.
    H256([u8; 32]),
    Array(Vec<Parameter>),
    /// Keys are kept sorted; insertion order is not meaningful on the wire.
    Map(BTreeMap<String, Parameter>),
}

impl ParameterValue {
    pub fn ty(&self) -> ParameterType {
        match self {
            ParameterValue::String(_) => ParameterType::String,
            ParameterValue::Integer(_) => ParameterType::Integer,
            ParameterValue::Long(_) => ParameterType::Long,
            ParameterValue::Boolean(_) => ParameterType::Boolean,
            ParameterValue::ByteArray(_) => ParameterType::ByteArray,
            ParameterValue::Address(_) => ParameterType::Address,
            ParameterValue::H256(_) => ParameterType::H256,
            ParameterValue::Array(_) => ParameterType::Array,
            ParameterValue::Map(_) => ParameterType::Map,
        }
    }
}

/// A named contract parameter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawParameter", into = "RawParameter")]
pub struct Parameter {
    pub name: String,
    pub value: ParameterValue,
}

impl Parameter {
    pub fn new(name: impl Into<String>, value: ParameterValue) -> Self {
        Self { name: name.into(), value }
    }

    pub fn string(name: impl Into<String>, v: impl Into<String>) -> Self {
        Self::new(name, ParameterValue::String(v.into()))
    }

    pub fn integer(name: impl Into<String>, v: i64) -> Self {
        Self::new(name, ParameterValue::Integer(v))
    }

    pub fn long(name: impl Into<String>, v: impl Into<BigInt>) -> Self {
        Self::new(name, ParameterValue::Long(v.into()))
    }

    pub fn boolean(name: impl Into<String>, v: bool) -> Self {
        Self::new(name, ParameterValue::Boolean(v))
    }

    pub fn byte_array(name: impl Into<String>, v: impl Into<Vec<u8>>) -> Self {
        Self::new(name, ParameterValue::ByteArray(v.into()))
    }

    pub fn address(name: impl Into<String>, v: Address) -> Self {
        Self::new(name, ParameterValue::Address(v))
    }

    pub fn h256(name: impl Into<String>, v: [u8; 32]) -> Self {
        Self::new(name, ParameterValue::H256(v))
    }

    /// `H256` from display-order hex.
    pub fn h256_hex(name: impl Into<String>, hex: &str) -> Result<Self> {
        Ok(Self::h256(name, hex_to_fixed::<32>(hex)?))
    }

    pub fn array(name: impl Into<String>, items: Vec<Parameter>) -> Self {
        Self::new(name, ParameterValue::Array(items))
    }

    pub fn map<K: Into<String>>(
        name: impl Into<String>,
        entries: impl IntoIterator<Item = (K, Parameter)>,
    ) -> Self {
        let map = entries.into_iter().map(|(k, v)| (k.into(), v)).collect();
        Self::new(name, ParameterValue::Map(map))
    }

    /// Declared type of this parameter.
    pub fn ty(&self) -> ParameterType {
        self.value.ty()
    }

    /// The value as the VM will see it once pushed (names and scalar tags drop
    /// away; only value and shape remain).
    pub fn to_stack_item(&self) -> StackItem {
        match &self.value {
            ParameterValue::String(s) => StackItem::ByteArray(s.as_bytes().to_vec()),
            ParameterValue::Integer(i) => StackItem::Integer(BigInt::from(*i)),
            ParameterValue::Long(b) => StackItem::Integer(b.clone()),
            ParameterValue::Boolean(b) => StackItem::Boolean(*b),
            ParameterValue::ByteArray(b) => StackItem::ByteArray(b.clone()),
            ParameterValue::Address(a) => StackItem::ByteArray(a.as_bytes().to_vec()),
            ParameterValue::H256(h) => {
                let mut r = *h;
                r.reverse();
                StackItem::ByteArray(r.to_vec())
            }
            ParameterValue::Array(items) => {
                StackItem::Array(items.iter().map(Parameter::to_stack_item).collect())
            }
            ParameterValue::Map(m) => StackItem::Map(
                m.iter().map(|(k, v)| (k.clone(), v.to_stack_item())).collect(),
            ),
        }
    }
}

// ---- JSON form ------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
struct RawParameter {
    #[serde(default)]
    name: String,
    #[serde(rename = "type")]
    ty: ParameterType,
    value: Value,
}

fn shape_err(name: &str, ty: ParameterType, want: &str) -> Error {
    Error::InvalidParameter(format!("parameter '{name}' of type {ty:?} expects {want}"))
}

impl TryFrom<RawParameter> for Parameter {
    type Error = Error;

    fn try_from(raw: RawParameter) -> Result<Self> {
        let RawParameter { name, ty, value } = raw;
        let value = match (ty, value) {
            (ParameterType::String, Value::String(s)) => ParameterValue::String(s),
            (ParameterType::Boolean, Value::Bool(b)) => ParameterValue::Boolean(b),
            (ParameterType::Integer, Value::Number(n)) => ParameterValue::Integer(
                n.as_i64().ok_or_else(|| shape_err(&name, ty, "an i64 number"))?,
            ),
            (ParameterType::Integer, Value::String(s)) => ParameterValue::Integer(
                s.trim().parse().map_err(|_| shape_err(&name, ty, "an i64 number"))?,
            ),
            (ParameterType::Long, Value::String(s)) => ParameterValue::Long(parse_bigint(&s)?),
            (ParameterType::Long, Value::Number(n)) => ParameterValue::Long(parse_bigint(&n.to_string())?),
            (ParameterType::ByteArray, Value::String(s)) => ParameterValue::ByteArray(hex_decode(&s)?),
            (ParameterType::H256, Value::String(s)) => ParameterValue::H256(hex_to_fixed::<32>(&s)?),
            (ParameterType::Address, Value::String(s)) => ParameterValue::Address(Address::from_base58(&s)?),
            (ParameterType::Array, v @ Value::Array(_)) => {
                ParameterValue::Array(serde_json::from_value::<Vec<Parameter>>(v)?)
            }
            (ParameterType::Map, v @ Value::Object(_)) => {
                ParameterValue::Map(serde_json::from_value::<BTreeMap<String, Parameter>>(v)?)
            }
            (ty, _) => {
                let want = match ty {
                    ParameterType::String | ParameterType::Long => "a string",
                    ParameterType::Integer => "a number",
                    ParameterType::Boolean => "a boolean",
                    ParameterType::ByteArray | ParameterType::H256 => "a hex string",
                    ParameterType::Address => "a base58 address",
                    ParameterType::Array => "an array of parameters",
                    ParameterType::Map => "an object of parameters",
                };
                return Err(shape_err(&name, ty, want));
            }
        };
        Ok(Parameter { name, value })
    }
}

impl From<Parameter> for RawParameter {
    fn from(p: Parameter) -> Self {
        let ty = p.ty();
        let value = match p.value {
            ParameterValue::String(s) => Value::String(s),
            ParameterValue::Integer(i) => Value::from(i),
            ParameterValue::Long(b) => Value::String(b.to_string()),
            ParameterValue::Boolean(b) => Value::Bool(b),
            ParameterValue::ByteArray(b) => Value::String(hex_encode(b)),
            ParameterValue::Address(a) => Value::String(a.to_base58()),
            ParameterValue::H256(h) => Value::String(hex_encode(h)),
            ParameterValue::Array(items) => {
                Value::Array(items.into_iter().map(|p| raw_to_value(p.into())).collect())
            }
            ParameterValue::Map(m) => Value::Object(
                m.into_iter().map(|(k, v)| (k, raw_to_value(v.into()))).collect(),
            ),
        };
        RawParameter { name: p.name, ty, value }
    }
}

fn raw_to_value(raw: RawParameter) -> Value {
    let mut obj = serde_json::Map::new();
    obj.insert("name".into(), Value::String(raw.name));
    // ParameterType serializes to a plain string.
    obj.insert("type".into(), Value::String(format!("{:?}", raw.ty)));
    obj.insert("value".into(), raw.value);
    Value::Object(obj)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn types_follow_values() {
        assert_eq!(Parameter::string("a", "x").ty(), ParameterType::String);
        assert_eq!(Parameter::long("a", 5u8).ty(), ParameterType::Long);
        assert_eq!(Parameter::array("a", vec![]).ty(), ParameterType::Array);
        assert_eq!(Parameter::map::<&str>("a", []).ty(), ParameterType::Map);
    }

    #[test]
    fn json_roundtrip_nested() {
        let addr = Address::from_base58("AJkkLbouowk6teTaxz1F2DYKfJh24PVk3r").unwrap();
        let p = Parameter::array(
            "args",
            vec![
                Parameter::boolean("arg1", false),
                Parameter::integer("arg2", 3),
                Parameter::address("arg3", addr),
                Parameter::long("amount", BigInt::parse_bytes(b"1000000000000000000", 10).unwrap()),
                Parameter::byte_array("data", vec![0xaa, 0xbb]),
                Parameter::map("opts", [("k", Parameter::string("", "v"))]),
            ],
        );
        let v = serde_json::to_value(&p).unwrap();
        assert_eq!(v["type"], "Array");
        assert_eq!(v["value"][2]["value"], "AJkkLbouowk6teTaxz1F2DYKfJh24PVk3r");
        assert_eq!(v["value"][3]["value"], "1000000000000000000");
        assert_eq!(v["value"][4]["value"], "aabb");
        assert_eq!(v["value"][5]["value"]["k"]["type"], "String");
        let back: Parameter = serde_json::from_value(v).unwrap();
        assert_eq!(back, p);
    }

    #[test]
    fn json_shape_mismatch_is_rejected() {
        let bad = json!({"name": "x", "type": "Boolean", "value": "true"});
        assert!(serde_json::from_value::<Parameter>(bad).is_err());
        let bad = json!({"name": "x", "type": "H256", "value": "aabb"});
        assert!(serde_json::from_value::<Parameter>(bad).is_err());
        let bad = json!({"name": "x", "type": "Array", "value": [{"type": "Integer", "value": 1.5}]});
        assert!(serde_json::from_value::<Parameter>(bad).is_err());
    }

    #[test]
    fn lenient_numeric_forms() {
        let p: Parameter = serde_json::from_value(json!({"type": "Integer", "value": "42"})).unwrap();
        assert_eq!(p.value, ParameterValue::Integer(42));
        assert_eq!(p.name, "");
        let p: Parameter = serde_json::from_value(json!({"type": "Long", "value": 7})).unwrap();
        assert_eq!(p.value, ParameterValue::Long(BigInt::from(7)));
    }

    #[test]
    fn stack_item_view() {
        let h = Parameter::h256_hex("h", &format!("{}{}", "00".repeat(31), "01")).unwrap();
        let mut expect = vec![0u8; 32];
        expect[0] = 1;
        assert_eq!(h.to_stack_item(), StackItem::ByteArray(expect));
        assert_eq!(Parameter::string("", "hi").to_stack_item(), StackItem::ByteArray(b"hi".to_vec()));
    }
}
