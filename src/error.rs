use thiserror::Error;

/// Common result alias for the SDK.
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Failures raised while reading binary scripts, stack items or transactions.
///
/// Every decoder in the crate reports through this enum; none of them index
/// past the end of their input.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CodecError {
    /// Input ended before a read could complete.
    #[error("unexpected end of input at offset {offset}: needed {needed} bytes, {remaining} remaining")]
    UnexpectedEof {
        offset: usize,
        needed: usize,
        remaining: usize,
    },

    /// Opcode not understood by the script decoder.
    #[error("unknown opcode 0x{opcode:02x} at offset {offset}")]
    UnknownOpcode { opcode: u8, offset: usize },

    /// A pack instruction asked for more items than the decode stack holds.
    #[error("pack of {count} items but only {available} on the stack")]
    PackOverflow { count: usize, available: usize },

    /// Unknown type tag in the stack-item format.
    #[error("unknown stack item type 0x{0:02x}")]
    UnknownItemType(u8),

    /// Structurally invalid data (bad count, trailing bytes, wrong shape).
    #[error("malformed data: {0}")]
    Malformed(String),
}

/// Top-level SDK error.
///
/// Variants are intentionally broad and stable. Submodules with richer failure
/// detail (the codecs) expose their own enum and convert into this one.
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum Error {
    // ---- Encoding / Decoding ----------------------------------------------
    /// Binary codec failure (truncated input, unknown opcode, pack overflow).
    #[error("codec error: {0}")]
    Codec(#[from] CodecError),

    /// JSON (de)serialization error.
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    /// Hex decoding error.
    #[error("hex decode error: {0}")]
    Hex(#[from] hex::FromHexError),

    /// Base64 decoding error.
    #[error("base64 decode error: {0}")]
    Base64(#[from] base64::DecodeError),

    // ---- Address -----------------------------------------------------------
    /// Base58Check checksum did not validate.
    #[error("invalid checksum")]
    InvalidChecksum,

    /// Address (or WIF) string/bytes have the wrong length, version or alphabet.
    #[error("invalid address format: {0}")]
    InvalidAddressFormat(String),

    // ---- Keys / Crypto -----------------------------------------------------
    /// Key type and curve combination is not supported.
    #[error("unsupported curve {curve} for key type {key_type}")]
    UnsupportedCurve { key_type: String, curve: String },

    /// Signature scheme does not belong to the key's algorithm.
    #[error("unsupported signature scheme: {0}")]
    UnsupportedScheme(String),

    /// Malformed private/public key or signature bytes.
    #[error("invalid key: {0}")]
    InvalidKey(String),

    /// Signing backend failure.
    #[error("signer error: {0}")]
    Signer(String),

    /// Wrong password, corrupted ciphertext or address mismatch.
    ///
    /// These causes are deliberately folded into one kind.
    #[error("decryption failed")]
    Decryption,

    /// Mnemonic phrase failed to parse or its checksum is wrong.
    #[error("invalid mnemonic: {0}")]
    InvalidMnemonic(String),

    // ---- Wallet ------------------------------------------------------------
    /// Keystore problem (KDF parameters, salt, unsupported envelope fields).
    #[error("keystore error: {0}")]
    Keystore(String),

    /// Configuration value could not be parsed.
    #[error("config error: {0}")]
    Config(String),

    // ---- Parameters --------------------------------------------------------
    /// Parameter value does not match its declared type.
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    /// Invalid parameters for a call.
    #[error("invalid parameters: {0}")]
    InvalidParams(&'static str),
}

impl Error {
    /// Whether this error came from the password/ciphertext check.
    pub fn is_decryption(&self) -> bool {
        matches!(self, Error::Decryption)
    }
}
