//! Shared helpers: hex/bytes, hashing, varint writers, the `StringReader`
//! cursor and big-integer conversion.

pub mod bigint;
pub mod bytes;
pub mod codec;
pub mod hash;
pub mod reader;

pub use reader::StringReader;
