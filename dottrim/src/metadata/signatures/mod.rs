//! Blob signature parsing and the signature type tree.
//!
//! Signatures are the second reference graph of a CLI image, next to IL:
//! method and field signatures name the types a member touches, and the
//! trim engine walks them to expand the invoked-type set. The tokens inside
//! signatures use the compressed TypeDefOrRef encoding, not plain metadata
//! tokens.

mod parser;
mod types;

pub use parser::SignatureParser;
pub use types::{
    element_type, ArrayShape, SignatureField, SignatureLocal, SignatureMethod, SignatureParam,
    TypeSignature,
};
