//! Hash helpers.
//!
//! - `sha256`, `sha256d` (double SHA-256: transaction hashes, Base58Check)
//! - `hash160` = RIPEMD160(SHA256(x)) (addresses)
//! - `sha3_256` (SHA3-256withECDSA pre-hash)
use ripemd::Ripemd160;
use sha2::{Digest, Sha256};
use sha3::Sha3_256;

/// SHA-256 digest.
#[inline]
pub fn sha256<B: AsRef<[u8]>>(bytes: B) -> [u8; 32] {
    let mut hasher = Sha256::new();
    hasher.update(bytes.as_ref());
    hasher.finalize().into()
}

/// SHA-256 applied twice.
#[inline]
pub fn sha256d<B: AsRef<[u8]>>(bytes: B) -> [u8; 32] {
    sha256(sha256(bytes))
}

/// RIPEMD160(SHA256(bytes)).
#[inline]
pub fn hash160<B: AsRef<[u8]>>(bytes: B) -> [u8; 20] {
    let mut hasher = Ripemd160::new();
    hasher.update(sha256(bytes));
    hasher.finalize().into()
}

/// SHA3-256 digest.
#[inline]
pub fn sha3_256<B: AsRef<[u8]>>(bytes: B) -> [u8; 32] {
    let mut hasher = Sha3_256::new();
    hasher.update(bytes.as_ref());
    hasher.finalize().into()
}

/// First four bytes of `sha256d(bytes)`, the Base58Check checksum.
#[inline]
pub fn checksum4<B: AsRef<[u8]>>(bytes: B) -> [u8; 4] {
    let h = sha256d(bytes);
    [h[0], h[1], h[2], h[3]]
}
