//! Ontology SDK for Rust.
//!
//! Smart-contract parameter codec, accounts and key management, and
//! transaction building/signing for the Ontology chain.
//!
//! ```text
//! Parameter ──script::builder──▶ invoke code ──tx::build──▶ Transaction
//!     ▲                                                       │
//!     └──script::decode / StackItem◀── node results           ├─tx::sign(Account/PrivateKey)
//!                                                             └─serialize_hex() ──▶ node
//! ```
//!
//! Node clients, wallet-file management and multi-signature scripts are out
//! of scope; this crate produces and consumes bytes.

pub mod abi;
pub mod address;
pub mod config;
pub mod error;
pub mod script;
pub mod tx;
pub mod types;
pub mod utils;
pub mod wallet;

//
// ------------------------------ Re-exports -----------------------------------
//

pub use abi::{Parameter, ParameterType, ParameterValue};
pub use address::Address;
pub use config::{Config, ScryptParams};
pub use error::{CodecError, Error, Result};
pub use script::{StackItem, ScriptBuilder};
pub use tx::{
    make_deploy_transaction, make_invoke_transaction, make_wasm_vm_invoke_transaction, sign_transaction,
    verify_transaction,
};
pub use types::{DeployCode, Payload, Transaction, TxSignature, TxType};
pub use wallet::{Account, KeyPair, KeyType, PrivateKey, PublicKey, Signature, SignatureScheme, Signer};
#[cfg(feature = "mnemonic")]
pub use wallet::Mnemonic;
