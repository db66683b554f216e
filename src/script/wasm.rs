//! Argument encoding for WebAssembly contracts.
//!
//! Wasm contracts take a flat byte buffer instead of a VM stack. The method
//! name travels as the first argument:
//!
//! ```text
//! code        contract(20 bytes) var_bytes(args)
//! args        var_str(method) param*
//!
//! String      var_str
//! ByteArray   var_bytes
//! Integer     i64 LE (8 bytes)
//! Long        i128 LE (16 bytes)
//! Boolean     1 byte
//! Address     20 bytes
//! H256        32 bytes, internal (reversed display) order
//! Array       varint(count) param*
//! ```
//!
//! Maps have no wasm encoding and are rejected.

use crate::abi::{Parameter, ParameterValue};
use crate::address::Address;
use crate::error::{Error, Result};
use crate::utils::codec::{write_bool, write_var_bytes, write_var_str, write_var_uint};
use num_traits::ToPrimitive;

/// Append the wasm encoding of one parameter.
pub fn write_wasm_param(buf: &mut Vec<u8>, p: &Parameter) -> Result<()> {
    match &p.value {
        ParameterValue::String(s) => write_var_str(buf, s),
        ParameterValue::ByteArray(b) => write_var_bytes(buf, b),
        ParameterValue::Integer(i) => buf.extend_from_slice(&i.to_le_bytes()),
        ParameterValue::Long(b) => {
            let v = b.to_i128().ok_or_else(|| {
                Error::InvalidParameter(format!("parameter '{}' does not fit in 128 bits", p.name))
            })?;
            buf.extend_from_slice(&v.to_le_bytes());
        }
        ParameterValue::Boolean(b) => write_bool(buf, *b),
        ParameterValue::Address(a) => buf.extend_from_slice(a.as_bytes()),
        ParameterValue::H256(h) => {
            let mut r = *h;
            r.reverse();
            buf.extend_from_slice(&r);
        }
        ParameterValue::Array(items) => {
            write_var_uint(buf, items.len() as u64);
            for item in items {
                write_wasm_param(buf, item)?;
            }
        }
        ParameterValue::Map(_) => {
            return Err(Error::InvalidParameter(format!(
                "parameter '{}': Map is not supported by wasm contracts",
                p.name
            )))
        }
    }
    Ok(())
}

/// Concatenated wasm encoding of `params`.
pub fn serialize_wasm_params(params: &[Parameter]) -> Result<Vec<u8>> {
    let mut buf = Vec::new();
    for p in params {
        write_wasm_param(&mut buf, p)?;
    }
    Ok(buf)
}

/// Invocation code for `method(params)` on a wasm `contract`.
pub fn build_wasm_vm_invoke_code(contract: &Address, method: &str, params: &[Parameter]) -> Result<Vec<u8>> {
    let mut args = Vec::new();
    write_var_str(&mut args, method);
    for p in params {
        write_wasm_param(&mut args, p)?;
    }
    let mut code = Vec::with_capacity(contract.as_bytes().len() + args.len() + 3);
    code.extend_from_slice(contract.as_bytes());
    write_var_bytes(&mut code, &args);
    Ok(code)
}
