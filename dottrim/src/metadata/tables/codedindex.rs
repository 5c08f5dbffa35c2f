//! Coded index decoding (ECMA-335 II.24.2.6).
//!
//! A coded index packs a tag selecting one of several candidate tables into
//! its low bits and a 1-based row index into the rest. Its on-disk width (2
//! or 4 bytes) depends on the largest row count among the candidates, so
//! decoding requires the [`TableInfo`] built from the tables-stream header.
//!
//! Two fields look like coded indices but are raw heap pointers and must
//! never be run through this codec: the `Constant` row's value (a `#Blob`
//! offset) and the `ldstr` operand (`0x70` high byte, a `#US` offset).

use strum::{EnumCount, EnumIter};

use crate::{
    file::io::read_le_at,
    metadata::{
        tables::{TableId, TableInfo},
        token::Token,
    },
    Result,
};

/// The coded index encodings, each with its fixed candidate-table list.
#[derive(Debug, Hash, Eq, PartialEq, Clone, Copy, EnumIter, EnumCount)]
#[repr(usize)]
pub enum CodedIndexType {
    /// `TypeDef`, `TypeRef`, `TypeSpec`
    TypeDefOrRef,
    /// `Field`, `Param`, `Property`
    HasConstant,
    /// 22 candidate tables; anything that can carry a custom attribute
    HasCustomAttribute,
    /// `Field`, `Param`
    HasFieldMarshal,
    /// `TypeDef`, `MethodDef`, `Assembly`
    HasDeclSecurity,
    /// `TypeDef`, `TypeRef`, `ModuleRef`, `MethodDef`, `TypeSpec`
    MemberRefParent,
    /// `Event`, `Property`
    HasSemantics,
    /// `MethodDef`, `MemberRef`
    MethodDefOrRef,
    /// `Field`, `MethodDef`
    MemberForwarded,
    /// `File`, `AssemblyRef`, `ExportedType`
    Implementation,
    /// `MethodDef`, `MemberRef` (tags 0,1 unused)
    CustomAttributeType,
    /// `Module`, `ModuleRef`, `AssemblyRef`, `TypeRef`
    ResolutionScope,
    /// `TypeDef`, `MethodDef`
    TypeOrMethodDef,
}

impl CodedIndexType {
    /// The tag-to-table lookup for this encoding.
    #[must_use]
    pub fn tables(&self) -> &'static [TableId] {
        match self {
            CodedIndexType::TypeDefOrRef => {
                &[TableId::TypeDef, TableId::TypeRef, TableId::TypeSpec]
            }
            CodedIndexType::HasConstant => &[TableId::Field, TableId::Param, TableId::Property],
            CodedIndexType::HasCustomAttribute => &[
                TableId::MethodDef,
                TableId::Field,
                TableId::TypeRef,
                TableId::TypeDef,
                TableId::Param,
                TableId::InterfaceImpl,
                TableId::MemberRef,
                TableId::Module,
                TableId::DeclSecurity, // labeled 'Permission' in the standard PDF
                TableId::Property,
                TableId::Event,
                TableId::StandAloneSig,
                TableId::ModuleRef,
                TableId::TypeSpec,
                TableId::Assembly,
                TableId::AssemblyRef,
                TableId::File,
                TableId::ExportedType,
                TableId::ManifestResource,
                TableId::GenericParam,
                TableId::GenericParamConstraint,
                TableId::MethodSpec,
            ],
            CodedIndexType::HasFieldMarshal => &[TableId::Field, TableId::Param],
            CodedIndexType::HasDeclSecurity => {
                &[TableId::TypeDef, TableId::MethodDef, TableId::Assembly]
            }
            CodedIndexType::MemberRefParent => &[
                TableId::TypeDef,
                TableId::TypeRef,
                TableId::ModuleRef,
                TableId::MethodDef,
                TableId::TypeSpec,
            ],
            CodedIndexType::HasSemantics => &[TableId::Event, TableId::Property],
            CodedIndexType::MethodDefOrRef => &[TableId::MethodDef, TableId::MemberRef],
            CodedIndexType::MemberForwarded => &[TableId::Field, TableId::MethodDef],
            CodedIndexType::Implementation => {
                &[TableId::File, TableId::AssemblyRef, TableId::ExportedType]
            }
            // Tags 0, 1 and 4 are 'not used' per the standard; mapping them
            // to the nearest real table keeps decoding total
            CodedIndexType::CustomAttributeType => &[
                TableId::MethodDef,
                TableId::MethodDef,
                TableId::MethodDef,
                TableId::MemberRef,
                TableId::MemberRef,
            ],
            CodedIndexType::ResolutionScope => &[
                TableId::Module,
                TableId::ModuleRef,
                TableId::AssemblyRef,
                TableId::TypeRef,
            ],
            CodedIndexType::TypeOrMethodDef => &[TableId::TypeDef, TableId::MethodDef],
        }
    }

    /// Number of tag bits this encoding needs.
    #[must_use]
    pub fn tag_bits(&self) -> u8 {
        let len = self.tables().len() as u32;
        // ceil(log2(len)) without touching floats
        (32 - (len - 1).leading_zeros()) as u8
    }
}

/// The decoded form of a coded index.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CodedIndex {
    /// The table this index refers to
    pub tag: TableId,
    /// The 1-based row in that table (0 means "no row")
    pub row: u32,
    /// The same reference as a metadata token
    pub token: Token,
}

impl CodedIndex {
    /// Create a new `CodedIndex` from a table and a 1-based row.
    #[must_use]
    pub fn new(tag: TableId, row: u32) -> CodedIndex {
        CodedIndex {
            tag,
            row,
            token: Token::from_parts(tag as u8, row),
        }
    }

    /// Read a coded index from a buffer, advancing the offset.
    ///
    /// The width (2 or 4 bytes) comes from the cached value in `info`.
    ///
    /// # Errors
    /// Returns an error if the buffer is too small or the tag value does not
    /// select a candidate table.
    pub fn read(
        data: &[u8],
        offset: &mut usize,
        info: &TableInfo,
        ci_type: CodedIndexType,
    ) -> Result<Self> {
        let value = if info.coded_index_bits(ci_type) > 16 {
            read_le_at::<u32>(data, offset)?
        } else {
            u32::from(read_le_at::<u16>(data, offset)?)
        };

        let tables = ci_type.tables();
        let tag_bits = ci_type.tag_bits();
        let tag = (value & ((1 << tag_bits) - 1)) as usize;
        let row = value >> tag_bits;

        let Some(&table) = tables.get(tag) else {
            return Err(malformed_error!(
                "Coded index tag {} out of range for {:?}",
                tag,
                ci_type
            ));
        };

        Ok(CodedIndex::new(table, row))
    }

    /// Returns true if this index points at no row.
    #[must_use]
    pub fn is_null(&self) -> bool {
        self.row == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tag_bits() {
        assert_eq!(CodedIndexType::TypeDefOrRef.tag_bits(), 2);
        assert_eq!(CodedIndexType::HasConstant.tag_bits(), 2);
        assert_eq!(CodedIndexType::HasCustomAttribute.tag_bits(), 5);
        assert_eq!(CodedIndexType::MemberRefParent.tag_bits(), 3);
        assert_eq!(CodedIndexType::MethodDefOrRef.tag_bits(), 1);
        assert_eq!(CodedIndexType::CustomAttributeType.tag_bits(), 3);
        assert_eq!(CodedIndexType::ResolutionScope.tag_bits(), 2);
    }

    #[test]
    fn new_builds_token() {
        let index = CodedIndex::new(TableId::TypeRef, 0x10);
        assert_eq!(index.token, Token::new(0x0100_0010));
        assert!(!index.is_null());

        let null = CodedIndex::new(TableId::TypeDef, 0);
        assert!(null.is_null());
    }

    #[test]
    fn read_small() {
        let info = TableInfo::new_test(
            &[(TableId::TypeDef, 10), (TableId::TypeRef, 10)],
            false,
            false,
            false,
        );

        // value 0x0009 = (2 << 2) | 1 -> TypeRef row 2
        let data = [0x09, 0x00];
        let mut offset = 0;
        let index =
            CodedIndex::read(&data, &mut offset, &info, CodedIndexType::TypeDefOrRef).unwrap();

        assert_eq!(offset, 2);
        assert_eq!(index.tag, TableId::TypeRef);
        assert_eq!(index.row, 2);
    }

    #[test]
    fn read_large() {
        // 0x40000 TypeSpec rows force TypeDefOrRef to 4 bytes
        let info = TableInfo::new_test(&[(TableId::TypeSpec, 0x40000)], false, false, false);

        // value = (5 << 2) | 2 -> TypeSpec row 5
        let data = [0x16, 0x00, 0x00, 0x00];
        let mut offset = 0;
        let index =
            CodedIndex::read(&data, &mut offset, &info, CodedIndexType::TypeDefOrRef).unwrap();

        assert_eq!(offset, 4);
        assert_eq!(index.tag, TableId::TypeSpec);
        assert_eq!(index.row, 5);
    }
}
