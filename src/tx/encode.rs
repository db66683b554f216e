//! Transaction wire encoding.
//!
//! ## Layout
//! ```text
//! version      u8           (0)
//! type         u8           (0xd1 invoke, 0xd2 wasm invoke, 0xd0 deploy)
//! nonce        u32 LE
//! gas_price    u64 LE
//! gas_limit    u64 LE
//! payer        20 bytes
//! payload      invoke, wasm invoke: var_bytes(code)
//!              deploy: var_bytes(code) need_storage(u8) var_str(name, version, author, email, description)
//! attributes   varint (always 0)
//! ---------------------------------------- end of unsigned form
//! sig_count    varint
//! per sig      var_bytes(push(signature)) var_bytes(push(pubkey) CHECKSIG)
//! ```
//!
//! **Sign content** is `SHA256(SHA256(unsigned form))`. The transaction hash is
//! the same digest, displayed byte-reversed.

use crate::error::{CodecError, Result};
use crate::script::builder::{program_from_pub_key, ScriptBuilder};
use crate::script::decode::decode_script;
use crate::script::opcode::CHECKSIG;
use crate::script::stack_item::StackItem;
use crate::types::{DeployCode, InvokeCode, Payload, Transaction, TxSignature, TxType};
use crate::address::{Address, ADDRESS_LEN};
use crate::utils::bytes::{hex_decode, hex_encode};
use crate::utils::codec::{write_bool, write_var_bytes, write_var_str, write_var_uint};
use crate::utils::hash::sha256d;
use crate::utils::reader::StringReader;
use crate::wallet::{PublicKey, Signature};

impl Transaction {
    /// Bytes covered by signatures.
    pub fn serialize_unsigned(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(128);
        out.push(self.version);
        out.push(self.tx_type().code());
        out.extend_from_slice(&self.nonce.to_le_bytes());
        out.extend_from_slice(&self.gas_price.to_le_bytes());
        out.extend_from_slice(&self.gas_limit.to_le_bytes());
        out.extend_from_slice(self.payer.as_bytes());
        match &self.payload {
            Payload::Invoke(p) | Payload::InvokeWasm(p) => write_var_bytes(&mut out, &p.code),
            Payload::Deploy(d) => {
                write_var_bytes(&mut out, &d.code);
                write_bool(&mut out, d.need_storage);
                write_var_str(&mut out, &d.name);
                write_var_str(&mut out, &d.version);
                write_var_str(&mut out, &d.author);
                write_var_str(&mut out, &d.email);
                write_var_str(&mut out, &d.description);
            }
        }
        // No transaction attributes are defined.
        write_var_uint(&mut out, 0);
        out
    }

    /// Full wire form, signatures included. Deterministic.
    pub fn serialize(&self) -> Vec<u8> {
        let mut out = self.serialize_unsigned();
        write_var_uint(&mut out, self.sigs.len() as u64);
        for sig in &self.sigs {
            let mut invocation = ScriptBuilder::new();
            invocation.push_bytes(&sig.signature.serialize());
            write_var_bytes(&mut out, invocation.as_bytes());
            write_var_bytes(&mut out, &program_from_pub_key(&sig.public_key));
        }
        out
    }

    /// Hex of [`Transaction::serialize`], as handed to node clients.
    pub fn serialize_hex(&self) -> String {
        hex_encode(self.serialize())
    }

    /// Digest that signers sign.
    pub fn sign_content(&self) -> [u8; 32] {
        sha256d(self.serialize_unsigned())
    }

    /// Transaction hash in display (byte-reversed) hex.
    pub fn hash(&self) -> String {
        let mut h = self.sign_content();
        h.reverse();
        hex_encode(h)
    }

    /// Parse the signed (or unsigned, zero signatures) wire form.
    pub fn deserialize(bytes: &[u8]) -> Result<Self> {
        let mut sr = StringReader::from_bytes(bytes);
        let tx = read_transaction(&mut sr)?;
        if !sr.is_eof() {
            return Err(CodecError::Malformed(format!("{} trailing bytes after transaction", sr.remaining())).into());
        }
        Ok(tx)
    }

    pub fn deserialize_hex(hex: &str) -> Result<Self> {
        Self::deserialize(&hex_decode(hex)?)
    }
}

fn read_transaction(sr: &mut StringReader) -> Result<Transaction> {
    let version = sr.read_u8()?;
    let ty_code = sr.read_u8()?;
    let tx_type = TxType::from_code(ty_code)
        .ok_or_else(|| CodecError::Malformed(format!("unknown transaction type 0x{ty_code:02x}")))?;
    let nonce = sr.read_u32_le()?;
    let gas_price = sr.read_u64_le()?;
    let gas_limit = sr.read_u64_le()?;
    let payer = Address::new(sr.read_array::<ADDRESS_LEN>()?);
    let payload = match tx_type {
        TxType::Invoke => Payload::Invoke(InvokeCode { code: sr.read_var_bytes()?.to_vec() }),
        TxType::InvokeWasm => Payload::InvokeWasm(InvokeCode { code: sr.read_var_bytes()?.to_vec() }),
        TxType::Deploy => Payload::Deploy(DeployCode {
            code: sr.read_var_bytes()?.to_vec(),
            need_storage: sr.read_bool()?,
            name: sr.read_var_str()?,
            version: sr.read_var_str()?,
            author: sr.read_var_str()?,
            email: sr.read_var_str()?,
            description: sr.read_var_str()?,
        }),
    };
    let attrs = sr.read_var_uint()?;
    if attrs != 0 {
        return Err(CodecError::Malformed(format!("{attrs} transaction attributes, none supported")).into());
    }

    let mut sigs = Vec::new();
    // An unsigned serialization simply ends here.
    if !sr.is_eof() {
        let count = sr.read_len()?;
        if count > sr.remaining() {
            return Err(CodecError::Malformed(format!("{count} signatures declared, input too short")).into());
        }
        for _ in 0..count {
            let invocation = sr.read_var_bytes()?.to_vec();
            let verification = sr.read_var_bytes()?.to_vec();
            sigs.push(read_signature(&invocation, &verification)?);
        }
    }

    Ok(Transaction { version, nonce, gas_price, gas_limit, payer, payload, sigs })
}

fn single_push(script: &[u8], what: &str) -> Result<Vec<u8>> {
    let mut items = decode_script(script)?;
    match (items.pop(), items.is_empty()) {
        (Some(StackItem::ByteArray(b)), true) => Ok(b),
        _ => Err(CodecError::Malformed(format!("{what} script must push exactly one byte string")).into()),
    }
}

fn read_signature(invocation: &[u8], verification: &[u8]) -> Result<TxSignature> {
    let signature = Signature::deserialize(&single_push(invocation, "invocation")?)?;
    let program = match verification.split_last() {
        Some((&CHECKSIG, program)) => program,
        _ => {
            return Err(CodecError::Malformed("only single-key verification scripts are supported".into()).into())
        }
    };
    let public_key = PublicKey::deserialize(&single_push(program, "verification")?)?;
    Ok(TxSignature { public_key, signature })
}
