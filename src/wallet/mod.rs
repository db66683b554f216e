//! Wallet module: keys, signatures, key encryption, mnemonics, accounts.
//!
//! ```text
//! PrivateKey ──public_key()──▶ PublicKey ──Address::from_public_key──▶ Address
//!     │
//!     └─encrypt(password, address, salt)──▶ EncryptedKey ──▶ Account (persisted JSON)
//! ```
//!
//! Supported algorithms are a closed set (ECDSA/P-256, SM2/sm2p256v1,
//! EdDSA/Ed25519), dispatched through [`signer::CurveBackend`].

pub mod account;
pub mod keys;
pub mod keystore;
#[cfg(feature = "mnemonic")]
pub mod mnemonic;
pub mod signature;
pub mod signer;

//
// ------------------------------ Re-exports -----------------------------------
//

pub use account::{Account, AccountJson};
pub use keys::{CurveLabel, KeyPair, KeyParameters, KeyType, PrivateKey, PublicKey};
pub use keystore::{generate_salt, EncryptedKey};
#[cfg(feature = "mnemonic")]
pub use mnemonic::{Mnemonic, MnemonicLang};
pub use signature::{Signature, SignatureScheme};
pub use signer::Signer;
