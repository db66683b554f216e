//! Transaction builders for the kinds the chain accepts: **invoke** (NeoVM
//! or wasm contracts) and **deploy**.
//!
//! Builders return unsigned [`Transaction`]s with a fresh random nonce. Sign
//! them with [`crate::tx::sign::sign_transaction`] and serialize with
//! [`Transaction::serialize_hex`].
//!
//! ### Example
//! ```ignore
//! use ontology_sdk::{tx::build::make_invoke_transaction, Address, Parameter};
//! let contract = Address::from_display_hex("...")?;
//! let tx = make_invoke_transaction(
//!     "transfer",
//!     &[Parameter::address("from", from), Parameter::integer("amount", 10)],
//!     &contract,
//!     /*gas_price=*/2500,
//!     /*gas_limit=*/20000,
//!     Some(&from),
//! );
//! ```

use rand::Rng;
use tracing::debug;

use crate::abi::Parameter;
use crate::address::Address;
use crate::config::Config;
use crate::error::Result;
use crate::script::builder::build_invoke_code;
use crate::script::wasm::build_wasm_vm_invoke_code;
use crate::types::{DeployCode, InvokeCode, Payload, Transaction, TX_VERSION};

fn new_transaction(payload: Payload, gas_price: u64, gas_limit: u64, payer: Option<&Address>) -> Transaction {
    Transaction {
        version: TX_VERSION,
        nonce: rand::thread_rng().gen(),
        gas_price,
        gas_limit,
        payer: payer.copied().unwrap_or(Address::ZERO),
        payload,
        sigs: Vec::new(),
    }
}

/// Build an **invoke** transaction calling `method` on `contract`.
///
/// `params` are serialized as the method's argument list. The signature list
/// is left empty.
pub fn make_invoke_transaction(
    method: &str,
    params: &[Parameter],
    contract: &Address,
    gas_price: u64,
    gas_limit: u64,
    payer: Option<&Address>,
) -> Transaction {
    let code = build_invoke_code(contract, method, params);
    debug!(method, contract = %contract.to_display_hex(), code_len = code.len(), "built invoke code");
    new_transaction(Payload::Invoke(InvokeCode { code }), gas_price, gas_limit, payer)
}

/// Build an invoke transaction for a WebAssembly contract.
///
/// Fails when a parameter has no wasm encoding (maps, or longs past 128 bits).
pub fn make_wasm_vm_invoke_transaction(
    method: &str,
    params: &[Parameter],
    contract: &Address,
    gas_price: u64,
    gas_limit: u64,
    payer: Option<&Address>,
) -> Result<Transaction> {
    let code = build_wasm_vm_invoke_code(contract, method, params)?;
    debug!(method, contract = %contract.to_display_hex(), code_len = code.len(), "built wasm invoke code");
    Ok(new_transaction(Payload::InvokeWasm(InvokeCode { code }), gas_price, gas_limit, payer))
}

/// Build a **deploy** transaction carrying contract code and metadata.
pub fn make_deploy_transaction(
    deploy: DeployCode,
    gas_price: u64,
    gas_limit: u64,
    payer: Option<&Address>,
) -> Transaction {
    new_transaction(Payload::Deploy(deploy), gas_price, gas_limit, payer)
}

/// [`make_invoke_transaction`] with gas price and limit taken from `config`.
pub fn make_invoke_transaction_with(
    config: &Config,
    method: &str,
    params: &[Parameter],
    contract: &Address,
    payer: Option<&Address>,
) -> Transaction {
    make_invoke_transaction(method, params, contract, config.gas_price, config.gas_limit, payer)
}

// ------------------------------ Tests ----------------------------------------
