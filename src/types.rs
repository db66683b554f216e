//! Core transaction types.
//!
//! Wire encoding lives in [`crate::tx::encode`]; builders in
//! [`crate::tx::build`]; signing in [`crate::tx::sign`].

use crate::address::Address;
use crate::wallet::{PublicKey, Signature};
use serde::{Deserialize, Serialize};

/// Current transaction format version.
pub const TX_VERSION: u8 = 0;

/// Transaction kind (wire-level tag).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TxType {
    Deploy,
    Invoke,
    /// Invocation of a WebAssembly contract.
    InvokeWasm,
}

impl TxType {
    pub fn code(self) -> u8 {
        match self {
            TxType::Deploy => 0xd0,
            TxType::Invoke => 0xd1,
            TxType::InvokeWasm => 0xd2,
        }
    }

    pub fn from_code(code: u8) -> Option<Self> {
        match code {
            0xd0 => Some(TxType::Deploy),
            0xd1 => Some(TxType::Invoke),
            0xd2 => Some(TxType::InvokeWasm),
            _ => None,
        }
    }
}

/// Invocation bytecode (see [`crate::script::build_invoke_code`], or
/// [`crate::script::build_wasm_vm_invoke_code`] for WebAssembly contracts).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvokeCode {
    pub code: Vec<u8>,
}

/// Contract deployment payload.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DeployCode {
    pub code: Vec<u8>,
    pub need_storage: bool,
    pub name: String,
    pub version: String,
    pub author: String,
    pub email: String,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Payload {
    Invoke(InvokeCode),
    InvokeWasm(InvokeCode),
    Deploy(DeployCode),
}

impl Payload {
    pub fn tx_type(&self) -> TxType {
        match self {
            Payload::Invoke(_) => TxType::Invoke,
            Payload::InvokeWasm(_) => TxType::InvokeWasm,
            Payload::Deploy(_) => TxType::Deploy,
        }
    }
}

/// One attached signature: the signer's public key and its signature over
/// the transaction's sign content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TxSignature {
    pub public_key: PublicKey,
    pub signature: Signature,
}

/// A transaction, unsigned or signed.
///
/// Signatures cover every field except `sigs`; changing any other field after
/// signing invalidates them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transaction {
    pub version: u8,
    pub nonce: u32,
    pub gas_price: u64,
    pub gas_limit: u64,
    /// Account paying for gas; [`Address::ZERO`] when not set.
    pub payer: Address,
    pub payload: Payload,
    pub sigs: Vec<TxSignature>,
}

impl Transaction {
    pub fn tx_type(&self) -> TxType {
        self.payload.tx_type()
    }

    pub fn is_signed(&self) -> bool {
        !self.sigs.is_empty()
    }
}
