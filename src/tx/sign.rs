//! Attach and check transaction signatures.
//!
//! Each signer signs [`Transaction::sign_content`] and the signature is
//! appended together with the signer's public key. Call
//! [`sign_transaction`] once per signer, before the final serialization.

use tracing::{debug, instrument};

use crate::error::Result;
use crate::types::{Transaction, TxSignature};
use crate::wallet::Signer;

/// Sign `tx` in place with `signer`, appending one [`TxSignature`].
#[instrument(skip_all, fields(nonce = tx.nonce))]
pub fn sign_transaction<S: Signer + ?Sized>(tx: &mut Transaction, signer: &S) -> Result<()> {
    let content = tx.sign_content();
    let public_key = signer.public_key()?;
    let signature = signer.sign(&content)?;
    tx.sigs.push(TxSignature { public_key, signature });
    debug!(hash = %tx.hash(), sigs = tx.sigs.len(), "signed transaction");
    Ok(())
}

/// True when the transaction carries at least one signature and every
/// attached signature verifies against the sign content.
pub fn verify_transaction(tx: &Transaction) -> Result<bool> {
    if tx.sigs.is_empty() {
        return Ok(false);
    }
    let content = tx.sign_content();
    for s in &tx.sigs {
        if !s.public_key.verify(&content, &s.signature)? {
            return Ok(false);
        }
    }
    Ok(true)
}

// ------------------------------ Tests ----------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::abi::Parameter;
    use crate::address::Address;
    use crate::tx::build::make_invoke_transaction;
    use crate::wallet::{KeyParameters, KeyType, PrivateKey};

    fn invoke_tx() -> Transaction {
        make_invoke_transaction(
            "transfer",
            &[Parameter::integer("amount", 10)],
            &Address::new([1u8; 20]),
            2500,
            20000,
            None,
        )
    }

    #[test]
    fn sign_then_verify() {
        let sk = PrivateKey::random().unwrap();
        let mut tx = invoke_tx();
        assert!(!verify_transaction(&tx).unwrap());

        sign_transaction(&mut tx, &sk).unwrap();
        assert_eq!(tx.sigs.len(), 1);
        assert_eq!(tx.sigs[0].public_key, sk.public_key().unwrap());
        assert!(verify_transaction(&tx).unwrap());

        let back = Transaction::deserialize(&tx.serialize()).unwrap();
        assert_eq!(back, tx);
        assert!(verify_transaction(&back).unwrap());
    }

    #[test]
    fn multiple_signers_across_curves() {
        let a = PrivateKey::random().unwrap();
        let b = PrivateKey::random_with(KeyType::Sm2, KeyParameters::default_for(KeyType::Sm2)).unwrap();
        let c = PrivateKey::random_with(KeyType::EdDsa, KeyParameters::default_for(KeyType::EdDsa)).unwrap();
        let mut tx = invoke_tx();
        sign_transaction(&mut tx, &a).unwrap();
        sign_transaction(&mut tx, &b).unwrap();
        sign_transaction(&mut tx, &c).unwrap();
        assert!(verify_transaction(&tx).unwrap());

        let back = Transaction::deserialize_hex(&tx.serialize_hex()).unwrap();
        assert_eq!(back.sigs.len(), 3);
        assert!(verify_transaction(&back).unwrap());
    }

    #[test]
    fn tampering_breaks_verification() {
        let sk = PrivateKey::random().unwrap();
        let mut tx = invoke_tx();
        sign_transaction(&mut tx, &sk).unwrap();
        tx.gas_price += 1;
        assert!(!verify_transaction(&tx).unwrap());
    }
}
