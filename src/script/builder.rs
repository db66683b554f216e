//! Parameter → VM bytecode.
//!
//! Layout produced for each parameter kind:
//!
//! ```text
//! String/ByteArray/Address/H256   push(bytes)
//! Integer/Long                    push(minimal LE two's complement)   0 → PUSH0
//! Boolean                         push([1]) / push([0])
//! Array [a0..an]                  an .. a0, push(n+1), PACK
//! Map {k0:v0..kn:vn}              vn kn .. v0 k0, push(n+1), PACK, NEWMAP
//! ```
//!
//! Composite children are emitted last-to-first so that the first item a
//! decoder pops is element 0. Map keys are emitted in sorted order.

use super::opcode::*;
use crate::abi::{Parameter, ParameterValue};
use crate::address::Address;
use crate::utils::bigint::bigint_to_bytes;
use crate::wallet::keys::PublicKey;
use num_bigint::BigInt;

/// Append-only bytecode writer.
#[derive(Debug, Clone, Default)]
pub struct ScriptBuilder {
    buf: Vec<u8>,
}

impl ScriptBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Raw opcode.
    pub fn emit(&mut self, op: u8) -> &mut Self {
        self.buf.push(op);
        self
    }

    /// Push a byte string using the shortest push form.
    pub fn push_bytes(&mut self, data: &[u8]) -> &mut Self {
        let len = data.len();
        if len == 0 {
            self.buf.push(PUSH0);
            return self;
        }
        if len <= PUSHBYTES75 as usize {
            self.buf.push(len as u8);
        } else if len <= 0xff {
            self.buf.push(PUSHDATA1);
            self.buf.push(len as u8);
        } else if len <= 0xffff {
            self.buf.push(PUSHDATA2);
            self.buf.extend_from_slice(&(len as u16).to_le_bytes());
        } else {
            self.buf.push(PUSHDATA4);
            self.buf.extend_from_slice(&(len as u32).to_le_bytes());
        }
        self.buf.extend_from_slice(data);
        self
    }

    /// Push an integer as its minimal byte form.
    pub fn push_int(&mut self, value: &BigInt) -> &mut Self {
        let bytes = bigint_to_bytes(value);
        self.push_bytes(&bytes)
    }

    pub fn push_i64(&mut self, value: i64) -> &mut Self {
        self.push_int(&BigInt::from(value))
    }

    pub fn push_bool(&mut self, value: bool) -> &mut Self {
        self.push_bytes(&[u8::from(value)])
    }

    pub fn push_address(&mut self, addr: &Address) -> &mut Self {
        self.push_bytes(addr.as_bytes())
    }

    /// Push a whole parameter tree.
    pub fn push_param(&mut self, p: &Parameter) -> &mut Self {
        match &p.value {
            ParameterValue::String(s) => self.push_bytes(s.as_bytes()),
            ParameterValue::Integer(i) => self.push_i64(*i),
            ParameterValue::Long(b) => self.push_int(b),
            ParameterValue::Boolean(b) => self.push_bool(*b),
            ParameterValue::ByteArray(b) => self.push_bytes(b),
            ParameterValue::Address(a) => self.push_address(a),
            ParameterValue::H256(h) => {
                let mut r = *h;
                r.reverse();
                self.push_bytes(&r)
            }
            ParameterValue::Array(items) => self.push_array(items),
            ParameterValue::Map(m) => {
                for (k, v) in m.iter().rev() {
                    self.push_param(v);
                    self.push_bytes(k.as_bytes());
                }
                self.push_i64(m.len() as i64);
                self.emit(PACK).emit(NEWMAP)
            }
        }
    }

    /// Push a list of parameters packed into one array.
    pub fn push_array(&mut self, items: &[Parameter]) -> &mut Self {
        for item in items.iter().rev() {
            self.push_param(item);
        }
        self.push_i64(items.len() as i64);
        self.emit(PACK)
    }

    /// `APPCALL <contract>`; the address is written in internal order.
    pub fn app_call(&mut self, contract: &Address) -> &mut Self {
        self.emit(APPCALL);
        self.buf.extend_from_slice(contract.as_bytes());
        self
    }

    pub fn len(&self) -> usize {
        self.buf.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.buf
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.buf
    }
}

/// Bytecode that pushes a single parameter.
pub fn serialize_parameter(p: &Parameter) -> Vec<u8> {
    let mut sb = ScriptBuilder::new();
    sb.push_param(p);
    sb.into_bytes()
}

/// Invocation code for `method(params)` on `contract`.
pub fn build_invoke_code(contract: &Address, method: &str, params: &[Parameter]) -> Vec<u8> {
    let mut sb = ScriptBuilder::new();
    sb.push_array(params)
        .push_bytes(method.as_bytes())
        .app_call(contract);
    sb.into_bytes()
}

/// Single-key verification script: `push(pubkey) CHECKSIG`.
pub fn program_from_pub_key(pk: &PublicKey) -> Vec<u8> {
    let mut sb = ScriptBuilder::new();
    sb.push_bytes(&pk.serialize()).emit(CHECKSIG);
    sb.into_bytes()
}
