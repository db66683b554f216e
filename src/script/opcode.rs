//! Opcodes used when building and reading invocation scripts.

pub const PUSH0: u8 = 0x00;
/// First direct-length push (`PUSHBYTES1`).
pub const PUSHBYTES1: u8 = 0x01;
/// Last direct-length push (`PUSHBYTES75`).
pub const PUSHBYTES75: u8 = 0x4b;
pub const PUSHDATA1: u8 = 0x4c;
pub const PUSHDATA2: u8 = 0x4d;
pub const PUSHDATA4: u8 = 0x4e;
pub const PUSHM1: u8 = 0x4f;
pub const PUSH1: u8 = 0x51;
pub const PUSH16: u8 = 0x60;

pub const APPCALL: u8 = 0x67;
pub const CHECKSIG: u8 = 0xac;
pub const PACK: u8 = 0xc1;
pub const NEWMAP: u8 = 0xc7;

/// Human-readable name for logs and errors.
pub fn name(op: u8) -> &'static str {
    match op {
        PUSH0 => "PUSH0",
        PUSHBYTES1..=PUSHBYTES75 => "PUSHBYTES",
        PUSHDATA1 => "PUSHDATA1",
        PUSHDATA2 => "PUSHDATA2",
        PUSHDATA4 => "PUSHDATA4",
        PUSHM1 => "PUSHM1",
        PUSH1..=PUSH16 => "PUSHN",
        APPCALL => "APPCALL",
        CHECKSIG => "CHECKSIG",
        PACK => "PACK",
        NEWMAP => "NEWMAP",
        _ => "UNKNOWN",
    }
}
