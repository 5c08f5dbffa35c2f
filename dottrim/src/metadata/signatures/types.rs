//! Signature type trees and the ELEMENT_TYPE constants (ECMA-335 II.23.1.16).

use crate::metadata::token::Token;

/// The `ELEMENT_TYPE` tag values that discriminate signature elements.
#[allow(missing_docs)]
pub mod element_type {
    pub const VOID: u8 = 0x01;
    pub const BOOLEAN: u8 = 0x02;
    pub const CHAR: u8 = 0x03;
    pub const I1: u8 = 0x04;
    pub const U1: u8 = 0x05;
    pub const I2: u8 = 0x06;
    pub const U2: u8 = 0x07;
    pub const I4: u8 = 0x08;
    pub const U4: u8 = 0x09;
    pub const I8: u8 = 0x0A;
    pub const U8: u8 = 0x0B;
    pub const R4: u8 = 0x0C;
    pub const R8: u8 = 0x0D;
    pub const STRING: u8 = 0x0E;
    pub const PTR: u8 = 0x0F;
    pub const BYREF: u8 = 0x10;
    pub const VALUETYPE: u8 = 0x11;
    pub const CLASS: u8 = 0x12;
    pub const VAR: u8 = 0x13;
    pub const ARRAY: u8 = 0x14;
    pub const GENERICINST: u8 = 0x15;
    pub const TYPEDBYREF: u8 = 0x16;
    pub const I: u8 = 0x18;
    pub const U: u8 = 0x19;
    pub const FNPTR: u8 = 0x1B;
    pub const OBJECT: u8 = 0x1C;
    pub const SZARRAY: u8 = 0x1D;
    pub const MVAR: u8 = 0x1E;
    pub const CMOD_REQD: u8 = 0x1F;
    pub const CMOD_OPT: u8 = 0x20;
    pub const INTERNAL: u8 = 0x21;
    pub const SENTINEL: u8 = 0x41;
    pub const PINNED: u8 = 0x45;
}

/// Shape of a general (multi-dimensional) array.
#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub struct ArrayShape {
    /// Number of dimensions
    pub rank: u32,
    /// Declared sizes, one per leading dimension that has one
    pub sizes: Vec<u32>,
    /// Declared lower bounds, one per leading dimension that has one
    pub lower_bounds: Vec<u32>,
}

/// A parsed signature type tree.
///
/// Only the structure the trim engine consumes is retained: enough to walk
/// every `TypeDefOrRef` token a signature can reach. Primitive leaves carry
/// no payload.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TypeSignature {
    /// `void`
    Void,
    /// `bool`
    Boolean,
    /// `char`
    Char,
    /// `i8`
    I1,
    /// `u8`
    U1,
    /// `i16`
    I2,
    /// `u16`
    U2,
    /// `i32`
    I4,
    /// `u32`
    U4,
    /// `i64`
    I8,
    /// `u64`
    U8,
    /// `f32`
    R4,
    /// `f64`
    R8,
    /// `System.String`
    String,
    /// `System.Object`
    Object,
    /// native int
    I,
    /// native unsigned int
    U,
    /// `System.TypedReference`
    TypedByRef,
    /// Unmanaged pointer
    Ptr(Box<TypeSignature>),
    /// Managed reference
    ByRef(Box<TypeSignature>),
    /// Value type with its TypeDefOrRef token
    ValueType(Token),
    /// Class with its TypeDefOrRef token
    Class(Token),
    /// Generic parameter of the enclosing type
    Var(u32),
    /// Generic parameter of the enclosing method
    MVar(u32),
    /// Single-dimensional zero-based array
    SzArray(Box<TypeSignature>),
    /// General array with shape
    Array(Box<TypeSignature>, ArrayShape),
    /// Generic instantiation: the open type and its arguments
    GenericInst(Box<TypeSignature>, Vec<TypeSignature>),
    /// Custom modifier (required or optional) wrapping the modified type
    Modified(Token, Box<TypeSignature>),
    /// Pinned local
    Pinned(Box<TypeSignature>),
    /// Function pointer; the nested signature is kept whole
    FnPtr(Box<SignatureMethod>),
    /// Vararg boundary marker
    Sentinel,
}

/// One parameter (or the return slot) of a method signature.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SignatureParam {
    /// Custom modifier tokens preceding the type
    pub modifiers: Vec<Token>,
    /// True when the parameter is passed by reference
    pub by_ref: bool,
    /// The parameter type
    pub base: TypeSignature,
}

/// A parsed MethodDefSig / MethodRefSig / StandAloneMethodSig.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SignatureMethod {
    /// HASTHIS flag
    pub has_this: bool,
    /// EXPLICITTHIS flag
    pub explicit_this: bool,
    /// VARARG calling convention
    pub vararg: bool,
    /// Generic parameter count, 0 unless the GENERIC flag was set
    pub generic_param_count: u32,
    /// The return slot
    pub return_type: SignatureParam,
    /// Declared parameters
    pub params: Vec<SignatureParam>,
    /// Parameters after the vararg sentinel
    pub varargs: Vec<SignatureParam>,
}

/// A parsed FieldSig (II.23.2.4).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SignatureField {
    /// Custom modifier tokens preceding the type
    pub modifiers: Vec<Token>,
    /// The field type
    pub base: TypeSignature,
}

/// One local of a LocalVarSig (II.23.2.6).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SignatureLocal {
    /// Custom modifier tokens preceding the type
    pub modifiers: Vec<Token>,
    /// True for byref locals
    pub by_ref: bool,
    /// True for pinned locals
    pub pinned: bool,
    /// The local's type
    pub base: TypeSignature,
}

impl TypeSignature {
    /// Collect every `TypeDefOrRef` token reachable through this tree.
    ///
    /// This is what drives signature-based reachability: every
    /// VALUETYPE/CLASS token, generic instantiation argument, array element,
    /// pointer target and custom modifier joins the output.
    pub fn collect_tokens(&self, out: &mut Vec<Token>) {
        match self {
            TypeSignature::ValueType(token) | TypeSignature::Class(token) => out.push(*token),
            TypeSignature::Ptr(inner)
            | TypeSignature::ByRef(inner)
            | TypeSignature::SzArray(inner)
            | TypeSignature::Pinned(inner)
            | TypeSignature::Array(inner, _) => inner.collect_tokens(out),
            TypeSignature::GenericInst(base, args) => {
                base.collect_tokens(out);
                for arg in args {
                    arg.collect_tokens(out);
                }
            }
            TypeSignature::Modified(token, inner) => {
                out.push(*token);
                inner.collect_tokens(out);
            }
            TypeSignature::FnPtr(method) => method.collect_tokens(out),
            _ => {}
        }
    }
}

impl SignatureMethod {
    /// Collect every `TypeDefOrRef` token reachable through the return type
    /// and all parameters.
    pub fn collect_tokens(&self, out: &mut Vec<Token>) {
        self.return_type.collect_tokens(out);
        for param in self.params.iter().chain(self.varargs.iter()) {
            param.collect_tokens(out);
        }
    }
}

impl SignatureParam {
    /// Collect every `TypeDefOrRef` token reachable through this parameter.
    pub fn collect_tokens(&self, out: &mut Vec<Token>) {
        out.extend_from_slice(&self.modifiers);
        self.base.collect_tokens(out);
    }
}

impl SignatureField {
    /// Collect every `TypeDefOrRef` token reachable through this field type.
    pub fn collect_tokens(&self, out: &mut Vec<Token>) {
        out.extend_from_slice(&self.modifiers);
        self.base.collect_tokens(out);
    }
}
