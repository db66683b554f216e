//! Transactions: build, encode, sign.
//!
//! ```text
//! make_invoke_transaction ──▶ Transaction ──sign_transaction(signer)──▶ signed
//!                                   │                                      │
//!                                   └── sign_content() = sha256d(unsigned) └── serialize_hex()
//! ```

pub mod build;
pub mod encode;
pub mod sign;

pub use build::{
    make_deploy_transaction, make_invoke_transaction, make_invoke_transaction_with, make_wasm_vm_invoke_transaction,
};
pub use sign::{sign_transaction, verify_transaction};
