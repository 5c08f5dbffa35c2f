//! CIL instruction classification and token scanning.
//!
//! The trim engine does not disassemble: reachability needs only the
//! metadata tokens a body references, so this module classifies opcodes by
//! operand shape and walks the byte stream linearly.

pub mod opcodes;

mod scanner;

pub use scanner::{operand_kind, operand_kind_fe, scan_tokens, OperandKind, TokenScan};
