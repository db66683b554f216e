//! Password-based private-key encryption (scrypt → AES-256-GCM).
//!
//! ```text
//! dk    = scrypt(password, salt, n, r, p, dkLen = 64)
//! iv    = dk[0..12]
//! key   = dk[32..64]
//! ct    = AES-256-GCM(key, iv, aad = base58(address), secret)   // ciphertext || tag
//! out   = base64(ct)
//! ```
//!
//! The salt is 16 random bytes per account and is stored next to the
//! ciphertext. Decryption re-derives the address from the recovered key and
//! compares it in constant time; wrong password, corrupted ciphertext and
//! address mismatch all surface as the same [`Error::Decryption`].

use super::keys::{KeyParameters, KeyType, PrivateKey};
use crate::address::Address;
use crate::config::ScryptParams;
use crate::error::{Error, Result};
use base64::{engine::general_purpose::STANDARD as B64, Engine as _};
use rand::RngCore;
use ring::aead::{self, Aad, LessSafeKey, Nonce, UnboundKey};
use subtle::ConstantTimeEq;
use zeroize::Zeroizing;

/// Value of the `enc-alg` field in persisted accounts.
pub const ENC_ALG: &str = "aes-256-gcm";

pub const SALT_LEN: usize = 16;

/// Encrypted private key: base64 ciphertext plus the algorithm tag needed to
/// rebuild the key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncryptedKey {
    key: String,
    key_type: KeyType,
    parameters: KeyParameters,
}

/// Random per-account salt.
pub fn generate_salt() -> [u8; SALT_LEN] {
    let mut salt = [0u8; SALT_LEN];
    rand::thread_rng().fill_bytes(&mut salt);
    salt
}

pub(crate) fn encrypt_private_key(
    private_key: &PrivateKey,
    password: &str,
    address: &Address,
    salt: &[u8],
    scrypt: &ScryptParams,
) -> Result<EncryptedKey> {
    let dk = derive_key(password, salt, scrypt)?;
    let sealed = aead_seal(&dk, address, private_key.as_bytes())?;
    Ok(EncryptedKey {
        key: B64.encode(sealed),
        key_type: private_key.key_type(),
        parameters: private_key.parameters(),
    })
}

impl EncryptedKey {
    /// Wrap a base64 ciphertext read from storage.
    pub fn new(key: impl Into<String>, key_type: KeyType, parameters: KeyParameters) -> Self {
        Self { key: key.into(), key_type, parameters }
    }

    /// Base64 ciphertext.
    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn key_type(&self) -> KeyType {
        self.key_type
    }

    pub fn parameters(&self) -> KeyParameters {
        self.parameters
    }

    /// Recover the private key; `address` must be the one it was sealed for.
    pub fn decrypt(
        &self,
        password: &str,
        address: &Address,
        salt: &[u8],
        scrypt: &ScryptParams,
    ) -> Result<PrivateKey> {
        let ct = B64.decode(self.key.as_bytes())?;
        if ct.len() <= aead::AES_256_GCM.tag_len() {
            return Err(Error::Keystore("ciphertext too short".into()));
        }
        let dk = derive_key(password, salt, scrypt)?;
        let secret = aead_open(&dk, address, &ct)?;

        let key = PrivateKey::new(&secret, self.key_type, self.parameters).map_err(|_| Error::Decryption)?;
        let derived = Address::from_public_key(&key.public_key().map_err(|_| Error::Decryption)?);
        if !bool::from(derived.as_bytes().ct_eq(address.as_bytes())) {
            return Err(Error::Decryption);
        }
        Ok(key)
    }
}

// ------------------------------ Crypto ---------------------------------------

fn derive_key(password: &str, salt: &[u8], params: &ScryptParams) -> Result<Zeroizing<[u8; 64]>> {
    if salt.len() != SALT_LEN {
        return Err(Error::Keystore(format!("salt must be {SALT_LEN} bytes, got {}", salt.len())));
    }
    params.validate()?;
    let p = scrypt::Params::new(params.log_n(), params.r, params.p, params.dk_len as usize)
        .map_err(|e| Error::Keystore(format!("scrypt params: {e}")))?;
    let mut out = Zeroizing::new([0u8; 64]);
    scrypt::scrypt(password.as_bytes(), salt, &p, out.as_mut_slice())
        .map_err(|e| Error::Keystore(format!("scrypt: {e}")))?;
    Ok(out)
}

fn split_dk(dk: &[u8; 64]) -> Result<(LessSafeKey, Nonce)> {
    let mut iv = [0u8; 12];
    iv.copy_from_slice(&dk[..12]);
    let unbound = UnboundKey::new(&aead::AES_256_GCM, &dk[32..])
        .map_err(|_| Error::Keystore("bad aes key".into()))?;
    Ok((LessSafeKey::new(unbound), Nonce::assume_unique_for_key(iv)))
}

fn aead_seal(dk: &[u8; 64], address: &Address, pt: &[u8]) -> Result<Vec<u8>> {
    let (key, nonce) = split_dk(dk)?;
    let aad = address.to_base58();
    let mut buf = Vec::with_capacity(pt.len() + aead::AES_256_GCM.tag_len());
    buf.extend_from_slice(pt);
    key.seal_in_place_append_tag(nonce, Aad::from(aad.as_bytes()), &mut buf)
        .map_err(|_| Error::Keystore("aead seal".into()))?;
    Ok(buf)
}

fn aead_open(dk: &[u8; 64], address: &Address, ct: &[u8]) -> Result<Zeroizing<Vec<u8>>> {
    let (key, nonce) = split_dk(dk)?;
    let aad = address.to_base58();
    let mut buf = Zeroizing::new(ct.to_vec());
    let len = key
        .open_in_place(nonce, Aad::from(aad.as_bytes()), buf.as_mut_slice())
        .map_err(|_| Error::Decryption)?
        .len();
    buf.truncate(len);
    Ok(buf)
}

// ---------------------------------- Tests ------------------------------------
