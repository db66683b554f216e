//! VM script encoding for contract invocations.
//!
//! - [`builder`]: `ScriptBuilder`, parameter serialization, invoke code.
//! - [`decode`]: the inverse, as a linear stack machine over the opcodes.
//! - [`stack_item`]: the decoded value type and the typed stack-item format
//!   nodes use for return values.
//! - [`wasm`]: argument buffers for WebAssembly contracts.

pub mod builder;
pub mod decode;
pub mod opcode;
pub mod stack_item;
pub mod wasm;

pub use builder::{build_invoke_code, program_from_pub_key, serialize_parameter, ScriptBuilder};
pub use decode::{decode_invoke_code, decode_script, deserialize_parameter, InvokeCall, ScriptDecoder};
pub use stack_item::StackItem;
pub use wasm::{build_wasm_vm_invoke_code, serialize_wasm_params};
