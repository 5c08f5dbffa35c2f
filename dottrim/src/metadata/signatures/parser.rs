//! Blob signature parsing (ECMA-335 II.23.2).
//!
//! A [`SignatureParser`] consumes one signature from a `#Blob` entry (the
//! compressed length prefix has already been stripped by the heap view).
//! Instances are single-use; create a fresh parser per signature.

use crate::{
    file::parser::Parser,
    metadata::signatures::{
        element_type, ArrayShape, SignatureField, SignatureLocal, SignatureMethod, SignatureParam,
        TypeSignature,
    },
    Error::RecursionLimit,
    Result,
};

/// Maximum recursion depth for signature parsing
const MAX_RECURSION_DEPTH: usize = 50;

/// Parser over a single signature blob.
pub struct SignatureParser<'a> {
    parser: Parser<'a>,
    depth: usize,
}

impl<'a> SignatureParser<'a> {
    /// Create a new `SignatureParser` over a blob entry's data bytes.
    #[must_use]
    pub fn new(data: &'a [u8]) -> Self {
        SignatureParser {
            parser: Parser::new(data),
            depth: 0,
        }
    }

    fn parse_type(&mut self) -> Result<TypeSignature> {
        self.depth += 1;
        if self.depth >= MAX_RECURSION_DEPTH {
            return Err(RecursionLimit(MAX_RECURSION_DEPTH));
        }

        let result = self.parse_type_inner();
        self.depth -= 1;
        result
    }

    fn parse_type_inner(&mut self) -> Result<TypeSignature> {
        let current_byte = self.parser.read_le::<u8>()?;
        match current_byte {
            element_type::VOID => Ok(TypeSignature::Void),
            element_type::BOOLEAN => Ok(TypeSignature::Boolean),
            element_type::CHAR => Ok(TypeSignature::Char),
            element_type::I1 => Ok(TypeSignature::I1),
            element_type::U1 => Ok(TypeSignature::U1),
            element_type::I2 => Ok(TypeSignature::I2),
            element_type::U2 => Ok(TypeSignature::U2),
            element_type::I4 => Ok(TypeSignature::I4),
            element_type::U4 => Ok(TypeSignature::U4),
            element_type::I8 => Ok(TypeSignature::I8),
            element_type::U8 => Ok(TypeSignature::U8),
            element_type::R4 => Ok(TypeSignature::R4),
            element_type::R8 => Ok(TypeSignature::R8),
            element_type::STRING => Ok(TypeSignature::String),
            element_type::OBJECT => Ok(TypeSignature::Object),
            element_type::I => Ok(TypeSignature::I),
            element_type::U => Ok(TypeSignature::U),
            element_type::TYPEDBYREF => Ok(TypeSignature::TypedByRef),
            element_type::PTR => Ok(TypeSignature::Ptr(Box::new(self.parse_type()?))),
            element_type::BYREF => Ok(TypeSignature::ByRef(Box::new(self.parse_type()?))),
            element_type::VALUETYPE => Ok(TypeSignature::ValueType(
                self.parser.read_compressed_token()?,
            )),
            element_type::CLASS => Ok(TypeSignature::Class(self.parser.read_compressed_token()?)),
            element_type::VAR => Ok(TypeSignature::Var(self.parser.read_compressed_uint()?)),
            element_type::MVAR => Ok(TypeSignature::MVar(self.parser.read_compressed_uint()?)),
            element_type::SZARRAY => Ok(TypeSignature::SzArray(Box::new(self.parse_type()?))),
            element_type::ARRAY => {
                let elem_type = self.parse_type()?;

                let mut shape = ArrayShape {
                    rank: self.parser.read_compressed_uint()?,
                    sizes: Vec::new(),
                    lower_bounds: Vec::new(),
                };

                let num_sizes = self.parser.read_compressed_uint()?;
                for _ in 0..num_sizes {
                    shape.sizes.push(self.parser.read_compressed_uint()?);
                }

                let num_lo_bounds = self.parser.read_compressed_uint()?;
                for _ in 0..num_lo_bounds {
                    shape.lower_bounds.push(self.parser.read_compressed_uint()?);
                }

                Ok(TypeSignature::Array(Box::new(elem_type), shape))
            }
            element_type::GENERICINST => {
                let peek_byte = self.parser.peek_byte()?;
                if peek_byte != element_type::CLASS && peek_byte != element_type::VALUETYPE {
                    return Err(malformed_error!(
                        "GENERICINST - next byte is not CLASS or VALUETYPE - {}",
                        peek_byte
                    ));
                }

                let base_type = self.parse_type()?;
                let arg_count = self.parser.read_compressed_uint()?;

                let mut type_args = Vec::with_capacity(arg_count as usize);
                for _ in 0..arg_count {
                    type_args.push(self.parse_type()?);
                }

                Ok(TypeSignature::GenericInst(Box::new(base_type), type_args))
            }
            element_type::CMOD_REQD | element_type::CMOD_OPT => {
                let modifier = self.parser.read_compressed_token()?;
                Ok(TypeSignature::Modified(
                    modifier,
                    Box::new(self.parse_type()?),
                ))
            }
            element_type::PINNED => Ok(TypeSignature::Pinned(Box::new(self.parse_type()?))),
            element_type::FNPTR => Ok(TypeSignature::FnPtr(Box::new(
                self.parse_method_signature()?,
            ))),
            element_type::SENTINEL => Ok(TypeSignature::Sentinel),
            _ => Err(malformed_error!(
                "Unsupported ELEMENT_TYPE - {:#04x}",
                current_byte
            )),
        }
    }

    /// Collect custom modifiers (`CMOD_OPT` / `CMOD_REQD`) at the cursor.
    fn parse_custom_mods(&mut self) -> Result<Vec<crate::metadata::token::Token>> {
        let mut mods = Vec::new();

        while self.parser.has_more_data() {
            let next_byte = self.parser.peek_byte()?;
            if next_byte != element_type::CMOD_OPT && next_byte != element_type::CMOD_REQD {
                break;
            }

            self.parser.advance()?;
            mods.push(self.parser.read_compressed_token()?);
        }

        Ok(mods)
    }

    /// Parse a parameter or the return slot.
    fn parse_param(&mut self) -> Result<SignatureParam> {
        let modifiers = self.parse_custom_mods()?;

        let mut by_ref = false;
        if self.parser.peek_byte()? == element_type::BYREF {
            self.parser.advance()?;
            by_ref = true;
        }

        Ok(SignatureParam {
            modifiers,
            by_ref,
            base: self.parse_type()?,
        })
    }

    /// Parse a method signature - MethodDefSig, MethodRefSig or
    /// StandAloneMethodSig (II.23.2.1-3).
    ///
    /// # Errors
    /// Returns an error if the signature is malformed or truncated.
    pub fn parse_method_signature(&mut self) -> Result<SignatureMethod> {
        let convention = self.parser.read_le::<u8>()?;

        let generic_param_count = if convention & 0x10 != 0 {
            self.parser.read_compressed_uint()?
        } else {
            0
        };
        let param_count = self.parser.read_compressed_uint()?;

        let mut method = SignatureMethod {
            has_this: convention & 0x20 != 0,
            explicit_this: convention & 0x40 != 0,
            vararg: convention & 0x0F == 0x05,
            generic_param_count,
            return_type: self.parse_param()?,
            params: Vec::new(),
            varargs: Vec::new(),
        };

        for _ in 0..param_count {
            if self.parser.has_more_data() && self.parser.peek_byte()? == element_type::SENTINEL {
                self.parser.advance()?;
                break;
            }

            method.params.push(self.parse_param()?);
        }

        if method.vararg && method.params.len() < param_count as usize {
            for _ in method.params.len()..param_count as usize {
                method.varargs.push(self.parse_param()?);
            }
        }

        Ok(method)
    }

    /// Parse a field signature (II.23.2.4).
    ///
    /// # Errors
    /// Returns an error if the FIELD marker is missing or the type is
    /// malformed.
    pub fn parse_field_signature(&mut self) -> Result<SignatureField> {
        let head_byte = self.parser.read_le::<u8>()?;
        if head_byte & 0x0F != 0x06 {
            return Err(malformed_error!(
                "Field signature has invalid start - {}",
                head_byte
            ));
        }

        Ok(SignatureField {
            modifiers: self.parse_custom_mods()?,
            base: self.parse_type()?,
        })
    }

    /// Parse a local variable signature (II.23.2.6).
    ///
    /// # Errors
    /// Returns an error if the LOCAL_SIG marker is missing or a local's type
    /// is malformed.
    pub fn parse_local_var_signature(&mut self) -> Result<Vec<SignatureLocal>> {
        let head_byte = self.parser.read_le::<u8>()?;
        if head_byte != 0x07 {
            return Err(malformed_error!(
                "LocalVar signature has invalid start - {}",
                head_byte
            ));
        }

        let count = self.parser.read_compressed_uint()?;
        let mut locals = Vec::with_capacity(count as usize);

        for _ in 0..count {
            if self.parser.peek_byte()? == element_type::TYPEDBYREF {
                self.parser.advance()?;
                locals.push(SignatureLocal {
                    modifiers: Vec::new(),
                    by_ref: false,
                    pinned: false,
                    base: TypeSignature::TypedByRef,
                });
                continue;
            }

            let mut modifiers = Vec::new();
            let mut pinned = false;

            // Modifiers and the PINNED constraint interleave before the type
            while self.parser.has_more_data() {
                match self.parser.peek_byte()? {
                    b if b == element_type::CMOD_OPT || b == element_type::CMOD_REQD => {
                        self.parser.advance()?;
                        modifiers.push(self.parser.read_compressed_token()?);
                    }
                    b if b == element_type::PINNED => {
                        self.parser.advance()?;
                        pinned = true;
                    }
                    _ => break,
                }
            }

            let by_ref = if self.parser.peek_byte()? == element_type::BYREF {
                self.parser.advance()?;
                true
            } else {
                false
            };

            locals.push(SignatureLocal {
                modifiers,
                by_ref,
                pinned,
                base: self.parse_type()?,
            });
        }

        Ok(locals)
    }

    /// Parse a type specification signature (II.23.2.14).
    ///
    /// # Errors
    /// Returns an error if the type is malformed.
    pub fn parse_type_spec_signature(&mut self) -> Result<TypeSignature> {
        self.parse_type()
    }

    /// Parse a method specification signature (II.23.2.15).
    ///
    /// # Errors
    /// Returns an error if the GENRICINST marker is missing or an argument
    /// type is malformed.
    pub fn parse_method_spec_signature(&mut self) -> Result<Vec<TypeSignature>> {
        let head_byte = self.parser.read_le::<u8>()?;
        if head_byte != 0x0A {
            return Err(malformed_error!(
                "MethodSpec signature has invalid start - {}",
                head_byte
            ));
        }

        let arg_count = self.parser.read_compressed_uint()?;
        let mut generic_args = Vec::with_capacity(arg_count as usize);
        for _ in 0..arg_count {
            generic_args.push(self.parse_type()?);
        }

        Ok(generic_args)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metadata::token::Token;

    #[test]
    fn primitive_types() {
        let cases = [
            (0x01_u8, TypeSignature::Void),
            (0x08, TypeSignature::I4),
            (0x0E, TypeSignature::String),
            (0x1C, TypeSignature::Object),
            (0x18, TypeSignature::I),
        ];

        for (byte, expected) in cases {
            let data = [byte];
            let mut parser = SignatureParser::new(&data);
            assert_eq!(parser.parse_type().unwrap(), expected);
        }
    }

    #[test]
    fn class_and_valuetype() {
        // 0x42 = (0x10 << 2) | 2 -> TypeSpec row 0x10
        let mut parser = SignatureParser::new(&[0x12, 0x42]);
        assert_eq!(
            parser.parse_type().unwrap(),
            TypeSignature::Class(Token::new(0x1B00_0010))
        );

        // 0x35 = (0x0D << 2) | 1 -> TypeRef row 0x0D
        let mut parser = SignatureParser::new(&[0x11, 0x35]);
        assert_eq!(
            parser.parse_type().unwrap(),
            TypeSignature::ValueType(Token::new(0x0100_000D))
        );
    }

    #[test]
    fn arrays() {
        let mut parser = SignatureParser::new(&[0x1D, 0x08]);
        let result = parser.parse_type().unwrap();
        assert_eq!(result, TypeSignature::SzArray(Box::new(TypeSignature::I4)));

        let mut parser = SignatureParser::new(&[
            0x14, // ARRAY
            0x08, // I4
            0x02, // rank 2
            0x02, // two sizes
            0x02, 0x03, // sizes 2, 3
            0x00, // no lower bounds
        ]);
        let result = parser.parse_type().unwrap();
        let TypeSignature::Array(base, shape) = result else {
            panic!("expected array")
        };
        assert_eq!(*base, TypeSignature::I4);
        assert_eq!(shape.rank, 2);
        assert_eq!(shape.sizes, vec![2, 3]);
        assert!(shape.lower_bounds.is_empty());
    }

    #[test]
    fn generic_inst() {
        // List<int> with List = TypeRef row 0x12
        let mut parser = SignatureParser::new(&[
            0x15, // GENERICINST
            0x12, 0x49, // CLASS, (0x12 << 2) | 1
            0x01, // one argument
            0x08, // I4
        ]);

        let result = parser.parse_type().unwrap();
        let TypeSignature::GenericInst(base, args) = result else {
            panic!("expected generic inst")
        };
        assert_eq!(*base, TypeSignature::Class(Token::new(0x0100_0012)));
        assert_eq!(args, vec![TypeSignature::I4]);
    }

    #[test]
    fn method_signature() {
        // instance void M(int32, string)
        let mut parser = SignatureParser::new(&[0x20, 0x02, 0x01, 0x08, 0x0E]);
        let method = parser.parse_method_signature().unwrap();

        assert!(method.has_this);
        assert!(!method.vararg);
        assert_eq!(method.generic_param_count, 0);
        assert_eq!(method.return_type.base, TypeSignature::Void);
        assert_eq!(method.params.len(), 2);
        assert_eq!(method.params[0].base, TypeSignature::I4);
        assert_eq!(method.params[1].base, TypeSignature::String);
    }

    #[test]
    fn generic_method_signature() {
        // generic, 1 type param, one parameter of type !!0, returns !0
        let mut parser = SignatureParser::new(&[0x10, 0x01, 0x01, 0x13, 0x00, 0x1E, 0x00]);
        let method = parser.parse_method_signature().unwrap();

        assert_eq!(method.generic_param_count, 1);
        assert_eq!(method.return_type.base, TypeSignature::Var(0));
        assert_eq!(method.params[0].base, TypeSignature::MVar(0));
    }

    #[test]
    fn field_signature() {
        let mut parser = SignatureParser::new(&[0x06, 0x11, 0x35]);
        let field = parser.parse_field_signature().unwrap();
        assert_eq!(field.base, TypeSignature::ValueType(Token::new(0x0100_000D)));

        let mut parser = SignatureParser::new(&[0x07, 0x08]);
        assert!(parser.parse_field_signature().is_err());
    }

    #[test]
    fn token_collection() {
        // Dictionary<List<int>, B[]> where Dictionary, List, B are TypeRefs
        let mut parser = SignatureParser::new(&[
            0x15, 0x12, 0x05, // GENERICINST Class TypeRef#1
            0x02, // two args
            0x15, 0x12, 0x09, // GENERICINST Class TypeRef#2
            0x01, 0x08, // one arg: I4
            0x1D, 0x11, 0x0D, // SZARRAY ValueType TypeRef#3
        ]);

        let sig = parser.parse_type().unwrap();
        let mut tokens = Vec::new();
        sig.collect_tokens(&mut tokens);

        assert_eq!(
            tokens,
            vec![
                Token::new(0x0100_0001),
                Token::new(0x0100_0002),
                Token::new(0x0100_0003),
            ]
        );
    }

    #[test]
    fn recursion_limit() {
        // A long chain of SZARRAY prefixes overflows the depth cap
        let mut data = vec![0x1D; 64];
        data.push(0x08);

        let mut parser = SignatureParser::new(&data);
        assert!(matches!(parser.parse_type(), Err(RecursionLimit(_))));
    }
}
