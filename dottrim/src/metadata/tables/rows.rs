//! Row types for every metadata table (ECMA-335 II.22).
//!
//! Each struct mirrors one on-disk row. The `row_size` implementations are
//! the single source of truth for table geometry: the byte offset of any row
//! in the file is derived from these sizes and the row counts, so a size
//! that disagrees with `read_row` corrupts every offset after it.
//!
//! Rows are plain owned data; indices into heaps and other tables are kept
//! as numbers (or decoded [`CodedIndex`] values) exactly as read. The trim
//! engine never writes through these records.

use crate::{
    file::io::{read_le_at, read_le_at_dyn},
    metadata::{
        tables::{CodedIndex, CodedIndexType, RowRead, TableId, TableInfo},
        token::Token,
    },
    Result,
};

/// The `Module` table (0x00): the current module. Always one row.
#[derive(Clone, Debug)]
pub struct ModuleRow {
    /// 1-based row id
    pub rid: u32,
    /// Token for this row
    pub token: Token,
    /// Reserved, always 0
    pub generation: u16,
    /// Index into `#Strings`
    pub name: u32,
    /// Index into `#GUID`
    pub mvid: u32,
    /// Index into `#GUID`, reserved
    pub enc_id: u32,
    /// Index into `#GUID`, reserved
    pub enc_base_id: u32,
}

impl RowRead for ModuleRow {
    #[rustfmt::skip]
    fn row_size(info: &TableInfo) -> u32 {
        u32::from(
            /* generation */   2 +
            /* name */         info.str_bytes() +
            /* mvid */         info.guid_bytes() +
            /* enc_id */       info.guid_bytes() +
            /* enc_base_id */  info.guid_bytes()
        )
    }

    fn read_row(data: &[u8], offset: &mut usize, rid: u32, info: &TableInfo) -> Result<Self> {
        Ok(ModuleRow {
            rid,
            token: Token::from_parts(TableId::Module as u8, rid),
            generation: read_le_at::<u16>(data, offset)?,
            name: read_le_at_dyn(data, offset, info.is_large_str())?,
            mvid: read_le_at_dyn(data, offset, info.is_large_guid())?,
            enc_id: read_le_at_dyn(data, offset, info.is_large_guid())?,
            enc_base_id: read_le_at_dyn(data, offset, info.is_large_guid())?,
        })
    }
}

/// The `TypeRef` table (0x01): types resolved in another scope.
#[derive(Clone, Debug)]
pub struct TypeRefRow {
    /// 1-based row id
    pub rid: u32,
    /// Token for this row
    pub token: Token,
    /// A `ResolutionScope` coded index
    pub resolution_scope: CodedIndex,
    /// Index into `#Strings`
    pub type_name: u32,
    /// Index into `#Strings`
    pub type_namespace: u32,
}

impl RowRead for TypeRefRow {
    #[rustfmt::skip]
    fn row_size(info: &TableInfo) -> u32 {
        u32::from(
            /* resolution_scope */ info.coded_index_bytes(CodedIndexType::ResolutionScope) +
            /* type_name */        info.str_bytes() +
            /* type_namespace */   info.str_bytes()
        )
    }

    fn read_row(data: &[u8], offset: &mut usize, rid: u32, info: &TableInfo) -> Result<Self> {
        Ok(TypeRefRow {
            rid,
            token: Token::from_parts(TableId::TypeRef as u8, rid),
            resolution_scope: CodedIndex::read(
                data,
                offset,
                info,
                CodedIndexType::ResolutionScope,
            )?,
            type_name: read_le_at_dyn(data, offset, info.is_large_str())?,
            type_namespace: read_le_at_dyn(data, offset, info.is_large_str())?,
        })
    }
}

/// The `TypeDef` table (0x02): types defined in this module.
///
/// `field_list` / `method_list` mark the start of this type's contiguous runs
/// in the Field and MethodDef tables; the run ends where the next row's list
/// begins (or at the end of the member table for the last row). The trimmers
/// deliberately never clear these two fields so that run arithmetic stays
/// valid in the output image.
#[derive(Clone, Debug)]
pub struct TypeDefRow {
    /// 1-based row id
    pub rid: u32,
    /// Token for this row
    pub token: Token,
    /// A 4-byte `TypeAttributes` bitmask
    pub flags: u32,
    /// Index into `#Strings`
    pub type_name: u32,
    /// Index into `#Strings`
    pub type_namespace: u32,
    /// A `TypeDefOrRef` coded index
    pub extends: CodedIndex,
    /// Index into the Field table, first field owned by this type
    pub field_list: u32,
    /// Index into the MethodDef table, first method owned by this type
    pub method_list: u32,
}

impl TypeDefRow {
    /// Size of the row prefix the class-level trimmer clears: Flags +
    /// TypeName + TypeNamespace + Extends, excluding the member list indices.
    #[rustfmt::skip]
    #[must_use]
    pub fn payload_size(info: &TableInfo) -> u32 {
        u32::from(
            /* flags */          4 +
            /* type_name */      info.str_bytes() +
            /* type_namespace */ info.str_bytes() +
            /* extends */        info.coded_index_bytes(CodedIndexType::TypeDefOrRef)
        )
    }
}

impl RowRead for TypeDefRow {
    #[rustfmt::skip]
    fn row_size(info: &TableInfo) -> u32 {
        Self::payload_size(info) + u32::from(
            /* field_list */  info.table_index_bytes(TableId::Field) +
            /* method_list */ info.table_index_bytes(TableId::MethodDef)
        )
    }

    fn read_row(data: &[u8], offset: &mut usize, rid: u32, info: &TableInfo) -> Result<Self> {
        Ok(TypeDefRow {
            rid,
            token: Token::from_parts(TableId::TypeDef as u8, rid),
            flags: read_le_at::<u32>(data, offset)?,
            type_name: read_le_at_dyn(data, offset, info.is_large_str())?,
            type_namespace: read_le_at_dyn(data, offset, info.is_large_str())?,
            extends: CodedIndex::read(data, offset, info, CodedIndexType::TypeDefOrRef)?,
            field_list: read_le_at_dyn(data, offset, info.is_large(TableId::Field))?,
            method_list: read_le_at_dyn(data, offset, info.is_large(TableId::MethodDef))?,
        })
    }
}

/// The `FieldPtr` table (0x03): field indirection.
#[derive(Clone, Debug)]
pub struct FieldPtrRow {
    /// 1-based row id
    pub rid: u32,
    /// Index into the Field table
    pub field: u32,
}

impl RowRead for FieldPtrRow {
    fn row_size(info: &TableInfo) -> u32 {
        u32::from(info.table_index_bytes(TableId::Field))
    }

    fn read_row(data: &[u8], offset: &mut usize, rid: u32, info: &TableInfo) -> Result<Self> {
        Ok(FieldPtrRow {
            rid,
            field: read_le_at_dyn(data, offset, info.is_large(TableId::Field))?,
        })
    }
}

/// The `Field` table (0x04): field definitions.
#[derive(Clone, Debug)]
pub struct FieldRow {
    /// 1-based row id
    pub rid: u32,
    /// Token for this row
    pub token: Token,
    /// A 2-byte `FieldAttributes` bitmask
    pub flags: u16,
    /// Index into `#Strings`
    pub name: u32,
    /// Index into `#Blob`
    pub signature: u32,
}

impl RowRead for FieldRow {
    #[rustfmt::skip]
    fn row_size(info: &TableInfo) -> u32 {
        u32::from(
            /* flags */     2 +
            /* name */      info.str_bytes() +
            /* signature */ info.blob_bytes()
        )
    }

    fn read_row(data: &[u8], offset: &mut usize, rid: u32, info: &TableInfo) -> Result<Self> {
        Ok(FieldRow {
            rid,
            token: Token::from_parts(TableId::Field as u8, rid),
            flags: read_le_at::<u16>(data, offset)?,
            name: read_le_at_dyn(data, offset, info.is_large_str())?,
            signature: read_le_at_dyn(data, offset, info.is_large_blob())?,
        })
    }
}

/// The `MethodPtr` table (0x05): method indirection.
#[derive(Clone, Debug)]
pub struct MethodPtrRow {
    /// 1-based row id
    pub rid: u32,
    /// Index into the MethodDef table
    pub method: u32,
}

impl RowRead for MethodPtrRow {
    fn row_size(info: &TableInfo) -> u32 {
        u32::from(info.table_index_bytes(TableId::MethodDef))
    }

    fn read_row(data: &[u8], offset: &mut usize, rid: u32, info: &TableInfo) -> Result<Self> {
        Ok(MethodPtrRow {
            rid,
            method: read_le_at_dyn(data, offset, info.is_large(TableId::MethodDef))?,
        })
    }
}

/// The `MethodDef` table (0x06): method definitions.
#[derive(Clone, Debug)]
pub struct MethodDefRow {
    /// 1-based row id
    pub rid: u32,
    /// Token for this row
    pub token: Token,
    /// RVA of the method body; 0 for abstract and extern methods
    pub rva: u32,
    /// A 2-byte `MethodImplAttributes` bitmask
    pub impl_flags: u16,
    /// A 2-byte `MethodAttributes` bitmask
    pub flags: u16,
    /// Index into `#Strings`
    pub name: u32,
    /// Index into `#Blob`
    pub signature: u32,
    /// Index into the Param table, first parameter of this method
    pub param_list: u32,
}

impl MethodDefRow {
    /// Size of the row prefix the trimmers clear: everything up to but
    /// excluding the ParamList index.
    #[rustfmt::skip]
    #[must_use]
    pub fn payload_size(info: &TableInfo) -> u32 {
        u32::from(
            /* rva */        4_u8 +
            /* impl_flags */ 2 +
            /* flags */      2
        ) + u32::from(
            /* name */       info.str_bytes() +
            /* signature */  info.blob_bytes()
        )
    }
}

impl RowRead for MethodDefRow {
    #[rustfmt::skip]
    fn row_size(info: &TableInfo) -> u32 {
        Self::payload_size(info) + u32::from(
            /* param_list */ info.table_index_bytes(TableId::Param)
        )
    }

    fn read_row(data: &[u8], offset: &mut usize, rid: u32, info: &TableInfo) -> Result<Self> {
        Ok(MethodDefRow {
            rid,
            token: Token::from_parts(TableId::MethodDef as u8, rid),
            rva: read_le_at::<u32>(data, offset)?,
            impl_flags: read_le_at::<u16>(data, offset)?,
            flags: read_le_at::<u16>(data, offset)?,
            name: read_le_at_dyn(data, offset, info.is_large_str())?,
            signature: read_le_at_dyn(data, offset, info.is_large_blob())?,
            param_list: read_le_at_dyn(data, offset, info.is_large(TableId::Param))?,
        })
    }
}

/// The `ParamPtr` table (0x07): parameter indirection.
#[derive(Clone, Debug)]
pub struct ParamPtrRow {
    /// 1-based row id
    pub rid: u32,
    /// Index into the Param table
    pub param: u32,
}

impl RowRead for ParamPtrRow {
    fn row_size(info: &TableInfo) -> u32 {
        u32::from(info.table_index_bytes(TableId::Param))
    }

    fn read_row(data: &[u8], offset: &mut usize, rid: u32, info: &TableInfo) -> Result<Self> {
        Ok(ParamPtrRow {
            rid,
            param: read_le_at_dyn(data, offset, info.is_large(TableId::Param))?,
        })
    }
}

/// The `Param` table (0x08): method parameter definitions.
#[derive(Clone, Debug)]
pub struct ParamRow {
    /// 1-based row id
    pub rid: u32,
    /// Token for this row
    pub token: Token,
    /// A 2-byte `ParamAttributes` bitmask
    pub flags: u16,
    /// Parameter position, 0 for the return value
    pub sequence: u16,
    /// Index into `#Strings`
    pub name: u32,
}

impl RowRead for ParamRow {
    #[rustfmt::skip]
    fn row_size(info: &TableInfo) -> u32 {
        u32::from(
            /* flags */    2 +
            /* sequence */ 2 +
            /* name */     info.str_bytes()
        )
    }

    fn read_row(data: &[u8], offset: &mut usize, rid: u32, info: &TableInfo) -> Result<Self> {
        Ok(ParamRow {
            rid,
            token: Token::from_parts(TableId::Param as u8, rid),
            flags: read_le_at::<u16>(data, offset)?,
            sequence: read_le_at::<u16>(data, offset)?,
            name: read_le_at_dyn(data, offset, info.is_large_str())?,
        })
    }
}

/// The `InterfaceImpl` table (0x09): interfaces implemented by types.
#[derive(Clone, Debug)]
pub struct InterfaceImplRow {
    /// 1-based row id
    pub rid: u32,
    /// Token for this row
    pub token: Token,
    /// Index into the TypeDef table
    pub class: u32,
    /// A `TypeDefOrRef` coded index
    pub interface: CodedIndex,
}

impl RowRead for InterfaceImplRow {
    #[rustfmt::skip]
    fn row_size(info: &TableInfo) -> u32 {
        u32::from(
            /* class */     info.table_index_bytes(TableId::TypeDef) +
            /* interface */ info.coded_index_bytes(CodedIndexType::TypeDefOrRef)
        )
    }

    fn read_row(data: &[u8], offset: &mut usize, rid: u32, info: &TableInfo) -> Result<Self> {
        Ok(InterfaceImplRow {
            rid,
            token: Token::from_parts(TableId::InterfaceImpl as u8, rid),
            class: read_le_at_dyn(data, offset, info.is_large(TableId::TypeDef))?,
            interface: CodedIndex::read(data, offset, info, CodedIndexType::TypeDefOrRef)?,
        })
    }
}

/// The `MemberRef` table (0x0A): references to members of other scopes.
#[derive(Clone, Debug)]
pub struct MemberRefRow {
    /// 1-based row id
    pub rid: u32,
    /// Token for this row
    pub token: Token,
    /// A `MemberRefParent` coded index
    pub class: CodedIndex,
    /// Index into `#Strings`
    pub name: u32,
    /// Index into `#Blob`
    pub signature: u32,
}

impl RowRead for MemberRefRow {
    #[rustfmt::skip]
    fn row_size(info: &TableInfo) -> u32 {
        u32::from(
            /* class */     info.coded_index_bytes(CodedIndexType::MemberRefParent) +
            /* name */      info.str_bytes() +
            /* signature */ info.blob_bytes()
        )
    }

    fn read_row(data: &[u8], offset: &mut usize, rid: u32, info: &TableInfo) -> Result<Self> {
        Ok(MemberRefRow {
            rid,
            token: Token::from_parts(TableId::MemberRef as u8, rid),
            class: CodedIndex::read(data, offset, info, CodedIndexType::MemberRefParent)?,
            name: read_le_at_dyn(data, offset, info.is_large_str())?,
            signature: read_le_at_dyn(data, offset, info.is_large_blob())?,
        })
    }
}

/// The `Constant` table (0x0B): compile-time constants.
///
/// `value` is a raw `#Blob` offset, not a coded index.
#[derive(Clone, Debug)]
pub struct ConstantRow {
    /// 1-based row id
    pub rid: u32,
    /// Token for this row
    pub token: Token,
    /// An `ELEMENT_TYPE` value
    pub base_type: u8,
    /// A `HasConstant` coded index
    pub parent: CodedIndex,
    /// Index into `#Blob`
    pub value: u32,
}

impl RowRead for ConstantRow {
    #[rustfmt::skip]
    fn row_size(info: &TableInfo) -> u32 {
        u32::from(
            /* base_type + padding */ 2 +
            /* parent */              info.coded_index_bytes(CodedIndexType::HasConstant) +
            /* value */               info.blob_bytes()
        )
    }

    fn read_row(data: &[u8], offset: &mut usize, rid: u32, info: &TableInfo) -> Result<Self> {
        let base_type = read_le_at::<u8>(data, offset)?;
        let _padding = read_le_at::<u8>(data, offset)?;

        Ok(ConstantRow {
            rid,
            token: Token::from_parts(TableId::Constant as u8, rid),
            base_type,
            parent: CodedIndex::read(data, offset, info, CodedIndexType::HasConstant)?,
            value: read_le_at_dyn(data, offset, info.is_large_blob())?,
        })
    }
}

/// The `CustomAttribute` table (0x0C): attribute applications.
#[derive(Clone, Debug)]
pub struct CustomAttributeRow {
    /// 1-based row id
    pub rid: u32,
    /// Token for this row
    pub token: Token,
    /// A `HasCustomAttribute` coded index
    pub parent: CodedIndex,
    /// A `CustomAttributeType` coded index (the attribute constructor)
    pub attr_type: CodedIndex,
    /// Index into `#Blob`
    pub value: u32,
}

impl RowRead for CustomAttributeRow {
    #[rustfmt::skip]
    fn row_size(info: &TableInfo) -> u32 {
        u32::from(
            /* parent */    info.coded_index_bytes(CodedIndexType::HasCustomAttribute) +
            /* attr_type */ info.coded_index_bytes(CodedIndexType::CustomAttributeType) +
            /* value */     info.blob_bytes()
        )
    }

    fn read_row(data: &[u8], offset: &mut usize, rid: u32, info: &TableInfo) -> Result<Self> {
        Ok(CustomAttributeRow {
            rid,
            token: Token::from_parts(TableId::CustomAttribute as u8, rid),
            parent: CodedIndex::read(data, offset, info, CodedIndexType::HasCustomAttribute)?,
            attr_type: CodedIndex::read(data, offset, info, CodedIndexType::CustomAttributeType)?,
            value: read_le_at_dyn(data, offset, info.is_large_blob())?,
        })
    }
}

/// The `FieldMarshal` table (0x0D).
#[derive(Clone, Debug)]
pub struct FieldMarshalRow {
    /// 1-based row id
    pub rid: u32,
    /// A `HasFieldMarshal` coded index
    pub parent: CodedIndex,
    /// Index into `#Blob`
    pub native_type: u32,
}

impl RowRead for FieldMarshalRow {
    #[rustfmt::skip]
    fn row_size(info: &TableInfo) -> u32 {
        u32::from(
            /* parent */      info.coded_index_bytes(CodedIndexType::HasFieldMarshal) +
            /* native_type */ info.blob_bytes()
        )
    }

    fn read_row(data: &[u8], offset: &mut usize, rid: u32, info: &TableInfo) -> Result<Self> {
        Ok(FieldMarshalRow {
            rid,
            parent: CodedIndex::read(data, offset, info, CodedIndexType::HasFieldMarshal)?,
            native_type: read_le_at_dyn(data, offset, info.is_large_blob())?,
        })
    }
}

/// The `DeclSecurity` table (0x0E).
#[derive(Clone, Debug)]
pub struct DeclSecurityRow {
    /// 1-based row id
    pub rid: u32,
    /// Security action code
    pub action: u16,
    /// A `HasDeclSecurity` coded index
    pub parent: CodedIndex,
    /// Index into `#Blob`
    pub permission_set: u32,
}

impl RowRead for DeclSecurityRow {
    #[rustfmt::skip]
    fn row_size(info: &TableInfo) -> u32 {
        u32::from(
            /* action */         2 +
            /* parent */         info.coded_index_bytes(CodedIndexType::HasDeclSecurity) +
            /* permission_set */ info.blob_bytes()
        )
    }

    fn read_row(data: &[u8], offset: &mut usize, rid: u32, info: &TableInfo) -> Result<Self> {
        Ok(DeclSecurityRow {
            rid,
            action: read_le_at::<u16>(data, offset)?,
            parent: CodedIndex::read(data, offset, info, CodedIndexType::HasDeclSecurity)?,
            permission_set: read_le_at_dyn(data, offset, info.is_large_blob())?,
        })
    }
}

/// The `ClassLayout` table (0x0F).
#[derive(Clone, Debug)]
pub struct ClassLayoutRow {
    /// 1-based row id
    pub rid: u32,
    /// Packing alignment
    pub packing_size: u16,
    /// Explicit type size
    pub class_size: u32,
    /// Index into the TypeDef table
    pub parent: u32,
}

impl RowRead for ClassLayoutRow {
    #[rustfmt::skip]
    fn row_size(info: &TableInfo) -> u32 {
        u32::from(
            /* packing_size */ 2_u8 +
            /* class_size */   4
        ) + u32::from(
            /* parent */       info.table_index_bytes(TableId::TypeDef)
        )
    }

    fn read_row(data: &[u8], offset: &mut usize, rid: u32, info: &TableInfo) -> Result<Self> {
        Ok(ClassLayoutRow {
            rid,
            packing_size: read_le_at::<u16>(data, offset)?,
            class_size: read_le_at::<u32>(data, offset)?,
            parent: read_le_at_dyn(data, offset, info.is_large(TableId::TypeDef))?,
        })
    }
}

/// The `FieldLayout` table (0x10).
#[derive(Clone, Debug)]
pub struct FieldLayoutRow {
    /// 1-based row id
    pub rid: u32,
    /// Byte offset of the field within its type
    pub field_offset: u32,
    /// Index into the Field table
    pub field: u32,
}

impl RowRead for FieldLayoutRow {
    #[rustfmt::skip]
    fn row_size(info: &TableInfo) -> u32 {
        /* field_offset */ 4 + u32::from(
            /* field */    info.table_index_bytes(TableId::Field)
        )
    }

    fn read_row(data: &[u8], offset: &mut usize, rid: u32, info: &TableInfo) -> Result<Self> {
        Ok(FieldLayoutRow {
            rid,
            field_offset: read_le_at::<u32>(data, offset)?,
            field: read_le_at_dyn(data, offset, info.is_large(TableId::Field))?,
        })
    }
}

/// The `StandAloneSig` table (0x11): standalone signatures (locals, calli).
#[derive(Clone, Debug)]
pub struct StandAloneSigRow {
    /// 1-based row id
    pub rid: u32,
    /// Token for this row
    pub token: Token,
    /// Index into `#Blob`
    pub signature: u32,
}

impl RowRead for StandAloneSigRow {
    fn row_size(info: &TableInfo) -> u32 {
        u32::from(/* signature */ info.blob_bytes())
    }

    fn read_row(data: &[u8], offset: &mut usize, rid: u32, info: &TableInfo) -> Result<Self> {
        Ok(StandAloneSigRow {
            rid,
            token: Token::from_parts(TableId::StandAloneSig as u8, rid),
            signature: read_le_at_dyn(data, offset, info.is_large_blob())?,
        })
    }
}

/// The `EventMap` table (0x12): type-to-event ranges.
#[derive(Clone, Debug)]
pub struct EventMapRow {
    /// 1-based row id
    pub rid: u32,
    /// Index into the TypeDef table
    pub parent: u32,
    /// Index into the Event table, first event of this type
    pub event_list: u32,
}

impl RowRead for EventMapRow {
    #[rustfmt::skip]
    fn row_size(info: &TableInfo) -> u32 {
        u32::from(
            /* parent */     info.table_index_bytes(TableId::TypeDef) +
            /* event_list */ info.table_index_bytes(TableId::Event)
        )
    }

    fn read_row(data: &[u8], offset: &mut usize, rid: u32, info: &TableInfo) -> Result<Self> {
        Ok(EventMapRow {
            rid,
            parent: read_le_at_dyn(data, offset, info.is_large(TableId::TypeDef))?,
            event_list: read_le_at_dyn(data, offset, info.is_large(TableId::Event))?,
        })
    }
}

/// The `EventPtr` table (0x13): event indirection.
#[derive(Clone, Debug)]
pub struct EventPtrRow {
    /// 1-based row id
    pub rid: u32,
    /// Index into the Event table
    pub event: u32,
}

impl RowRead for EventPtrRow {
    fn row_size(info: &TableInfo) -> u32 {
        u32::from(info.table_index_bytes(TableId::Event))
    }

    fn read_row(data: &[u8], offset: &mut usize, rid: u32, info: &TableInfo) -> Result<Self> {
        Ok(EventPtrRow {
            rid,
            event: read_le_at_dyn(data, offset, info.is_large(TableId::Event))?,
        })
    }
}

/// The `Event` table (0x14): event definitions.
#[derive(Clone, Debug)]
pub struct EventRow {
    /// 1-based row id
    pub rid: u32,
    /// A 2-byte `EventAttributes` bitmask
    pub event_flags: u16,
    /// Index into `#Strings`
    pub name: u32,
    /// A `TypeDefOrRef` coded index
    pub event_type: CodedIndex,
}

impl RowRead for EventRow {
    #[rustfmt::skip]
    fn row_size(info: &TableInfo) -> u32 {
        u32::from(
            /* event_flags */ 2 +
            /* name */        info.str_bytes() +
            /* event_type */  info.coded_index_bytes(CodedIndexType::TypeDefOrRef)
        )
    }

    fn read_row(data: &[u8], offset: &mut usize, rid: u32, info: &TableInfo) -> Result<Self> {
        Ok(EventRow {
            rid,
            event_flags: read_le_at::<u16>(data, offset)?,
            name: read_le_at_dyn(data, offset, info.is_large_str())?,
            event_type: CodedIndex::read(data, offset, info, CodedIndexType::TypeDefOrRef)?,
        })
    }
}

/// The `PropertyMap` table (0x15): type-to-property ranges.
#[derive(Clone, Debug)]
pub struct PropertyMapRow {
    /// 1-based row id
    pub rid: u32,
    /// Index into the TypeDef table
    pub parent: u32,
    /// Index into the Property table, first property of this type
    pub property_list: u32,
}

impl RowRead for PropertyMapRow {
    #[rustfmt::skip]
    fn row_size(info: &TableInfo) -> u32 {
        u32::from(
            /* parent */        info.table_index_bytes(TableId::TypeDef) +
            /* property_list */ info.table_index_bytes(TableId::Property)
        )
    }

    fn read_row(data: &[u8], offset: &mut usize, rid: u32, info: &TableInfo) -> Result<Self> {
        Ok(PropertyMapRow {
            rid,
            parent: read_le_at_dyn(data, offset, info.is_large(TableId::TypeDef))?,
            property_list: read_le_at_dyn(data, offset, info.is_large(TableId::Property))?,
        })
    }
}

/// The `PropertyPtr` table (0x16): property indirection.
#[derive(Clone, Debug)]
pub struct PropertyPtrRow {
    /// 1-based row id
    pub rid: u32,
    /// Index into the Property table
    pub property: u32,
}

impl RowRead for PropertyPtrRow {
    fn row_size(info: &TableInfo) -> u32 {
        u32::from(info.table_index_bytes(TableId::Property))
    }

    fn read_row(data: &[u8], offset: &mut usize, rid: u32, info: &TableInfo) -> Result<Self> {
        Ok(PropertyPtrRow {
            rid,
            property: read_le_at_dyn(data, offset, info.is_large(TableId::Property))?,
        })
    }
}

/// The `Property` table (0x17): property definitions.
#[derive(Clone, Debug)]
pub struct PropertyRow {
    /// 1-based row id
    pub rid: u32,
    /// A 2-byte `PropertyAttributes` bitmask
    pub flags: u16,
    /// Index into `#Strings`
    pub name: u32,
    /// Index into `#Blob`
    pub property_type: u32,
}

impl RowRead for PropertyRow {
    #[rustfmt::skip]
    fn row_size(info: &TableInfo) -> u32 {
        u32::from(
            /* flags */         2 +
            /* name */          info.str_bytes() +
            /* property_type */ info.blob_bytes()
        )
    }

    fn read_row(data: &[u8], offset: &mut usize, rid: u32, info: &TableInfo) -> Result<Self> {
        Ok(PropertyRow {
            rid,
            flags: read_le_at::<u16>(data, offset)?,
            name: read_le_at_dyn(data, offset, info.is_large_str())?,
            property_type: read_le_at_dyn(data, offset, info.is_large_blob())?,
        })
    }
}

/// The `MethodSemantics` table (0x18): accessor associations.
#[derive(Clone, Debug)]
pub struct MethodSemanticsRow {
    /// 1-based row id
    pub rid: u32,
    /// A 2-byte `MethodSemanticsAttributes` bitmask
    pub semantics: u16,
    /// Index into the MethodDef table
    pub method: u32,
    /// A `HasSemantics` coded index
    pub association: CodedIndex,
}

impl RowRead for MethodSemanticsRow {
    #[rustfmt::skip]
    fn row_size(info: &TableInfo) -> u32 {
        u32::from(
            /* semantics */   2 +
            /* method */      info.table_index_bytes(TableId::MethodDef) +
            /* association */ info.coded_index_bytes(CodedIndexType::HasSemantics)
        )
    }

    fn read_row(data: &[u8], offset: &mut usize, rid: u32, info: &TableInfo) -> Result<Self> {
        Ok(MethodSemanticsRow {
            rid,
            semantics: read_le_at::<u16>(data, offset)?,
            method: read_le_at_dyn(data, offset, info.is_large(TableId::MethodDef))?,
            association: CodedIndex::read(data, offset, info, CodedIndexType::HasSemantics)?,
        })
    }
}

/// The `MethodImpl` table (0x19): explicit implementations.
#[derive(Clone, Debug)]
pub struct MethodImplRow {
    /// 1-based row id
    pub rid: u32,
    /// Index into the TypeDef table
    pub class: u32,
    /// A `MethodDefOrRef` coded index
    pub method_body: CodedIndex,
    /// A `MethodDefOrRef` coded index
    pub method_declaration: CodedIndex,
}

impl RowRead for MethodImplRow {
    #[rustfmt::skip]
    fn row_size(info: &TableInfo) -> u32 {
        u32::from(
            /* class */              info.table_index_bytes(TableId::TypeDef) +
            /* method_body */        info.coded_index_bytes(CodedIndexType::MethodDefOrRef) +
            /* method_declaration */ info.coded_index_bytes(CodedIndexType::MethodDefOrRef)
        )
    }

    fn read_row(data: &[u8], offset: &mut usize, rid: u32, info: &TableInfo) -> Result<Self> {
        Ok(MethodImplRow {
            rid,
            class: read_le_at_dyn(data, offset, info.is_large(TableId::TypeDef))?,
            method_body: CodedIndex::read(data, offset, info, CodedIndexType::MethodDefOrRef)?,
            method_declaration: CodedIndex::read(
                data,
                offset,
                info,
                CodedIndexType::MethodDefOrRef,
            )?,
        })
    }
}

/// The `ModuleRef` table (0x1A): external module references.
#[derive(Clone, Debug)]
pub struct ModuleRefRow {
    /// 1-based row id
    pub rid: u32,
    /// Index into `#Strings`
    pub name: u32,
}

impl RowRead for ModuleRefRow {
    fn row_size(info: &TableInfo) -> u32 {
        u32::from(/* name */ info.str_bytes())
    }

    fn read_row(data: &[u8], offset: &mut usize, rid: u32, info: &TableInfo) -> Result<Self> {
        Ok(ModuleRefRow {
            rid,
            name: read_le_at_dyn(data, offset, info.is_large_str())?,
        })
    }
}

/// The `TypeSpec` table (0x1B): type specifications.
#[derive(Clone, Debug)]
pub struct TypeSpecRow {
    /// 1-based row id
    pub rid: u32,
    /// Token for this row
    pub token: Token,
    /// Index into `#Blob`
    pub signature: u32,
}

impl RowRead for TypeSpecRow {
    fn row_size(info: &TableInfo) -> u32 {
        u32::from(/* signature */ info.blob_bytes())
    }

    fn read_row(data: &[u8], offset: &mut usize, rid: u32, info: &TableInfo) -> Result<Self> {
        Ok(TypeSpecRow {
            rid,
            token: Token::from_parts(TableId::TypeSpec as u8, rid),
            signature: read_le_at_dyn(data, offset, info.is_large_blob())?,
        })
    }
}

/// The `ImplMap` table (0x1C): P/Invoke mappings.
#[derive(Clone, Debug)]
pub struct ImplMapRow {
    /// 1-based row id
    pub rid: u32,
    /// A 2-byte `PInvokeAttributes` bitmask
    pub mapping_flags: u16,
    /// A `MemberForwarded` coded index
    pub member_forwarded: CodedIndex,
    /// Index into `#Strings`
    pub import_name: u32,
    /// Index into the ModuleRef table
    pub import_scope: u32,
}

impl RowRead for ImplMapRow {
    #[rustfmt::skip]
    fn row_size(info: &TableInfo) -> u32 {
        u32::from(
            /* mapping_flags */    2 +
            /* member_forwarded */ info.coded_index_bytes(CodedIndexType::MemberForwarded) +
            /* import_name */      info.str_bytes() +
            /* import_scope */     info.table_index_bytes(TableId::ModuleRef)
        )
    }

    fn read_row(data: &[u8], offset: &mut usize, rid: u32, info: &TableInfo) -> Result<Self> {
        Ok(ImplMapRow {
            rid,
            mapping_flags: read_le_at::<u16>(data, offset)?,
            member_forwarded: CodedIndex::read(data, offset, info, CodedIndexType::MemberForwarded)?,
            import_name: read_le_at_dyn(data, offset, info.is_large_str())?,
            import_scope: read_le_at_dyn(data, offset, info.is_large(TableId::ModuleRef))?,
        })
    }
}

/// The `FieldRVA` table (0x1D): initial data for mapped fields.
#[derive(Clone, Debug)]
pub struct FieldRvaRow {
    /// 1-based row id
    pub rid: u32,
    /// RVA of the field's initial data
    pub rva: u32,
    /// Index into the Field table
    pub field: u32,
}

impl RowRead for FieldRvaRow {
    #[rustfmt::skip]
    fn row_size(info: &TableInfo) -> u32 {
        /* rva */       4 + u32::from(
            /* field */ info.table_index_bytes(TableId::Field)
        )
    }

    fn read_row(data: &[u8], offset: &mut usize, rid: u32, info: &TableInfo) -> Result<Self> {
        Ok(FieldRvaRow {
            rid,
            rva: read_le_at::<u32>(data, offset)?,
            field: read_le_at_dyn(data, offset, info.is_large(TableId::Field))?,
        })
    }
}

/// The `Assembly` table (0x20): this assembly's identity.
#[derive(Clone, Debug)]
pub struct AssemblyRow {
    /// 1-based row id
    pub rid: u32,
    /// Token for this row
    pub token: Token,
    /// Hash algorithm id
    pub hash_alg_id: u32,
    /// Major version
    pub major_version: u16,
    /// Minor version
    pub minor_version: u16,
    /// Build number
    pub build_number: u16,
    /// Revision number
    pub revision_number: u16,
    /// A 4-byte `AssemblyFlags` bitmask
    pub flags: u32,
    /// Index into `#Blob`
    pub public_key: u32,
    /// Index into `#Strings`
    pub name: u32,
    /// Index into `#Strings`
    pub culture: u32,
}

impl RowRead for AssemblyRow {
    #[rustfmt::skip]
    fn row_size(info: &TableInfo) -> u32 {
        u32::from(
            /* hash_alg_id */     4_u8 +
            /* version (4x u16) */ 8 +
            /* flags */           4
        ) + u32::from(
            /* public_key */      info.blob_bytes() +
            /* name */            info.str_bytes() +
            /* culture */         info.str_bytes()
        )
    }

    fn read_row(data: &[u8], offset: &mut usize, rid: u32, info: &TableInfo) -> Result<Self> {
        Ok(AssemblyRow {
            rid,
            token: Token::from_parts(TableId::Assembly as u8, rid),
            hash_alg_id: read_le_at::<u32>(data, offset)?,
            major_version: read_le_at::<u16>(data, offset)?,
            minor_version: read_le_at::<u16>(data, offset)?,
            build_number: read_le_at::<u16>(data, offset)?,
            revision_number: read_le_at::<u16>(data, offset)?,
            flags: read_le_at::<u32>(data, offset)?,
            public_key: read_le_at_dyn(data, offset, info.is_large_blob())?,
            name: read_le_at_dyn(data, offset, info.is_large_str())?,
            culture: read_le_at_dyn(data, offset, info.is_large_str())?,
        })
    }
}

/// The `AssemblyProcessor` table (0x21).
#[derive(Clone, Debug)]
pub struct AssemblyProcessorRow {
    /// 1-based row id
    pub rid: u32,
    /// Processor architecture
    pub processor: u32,
}

impl RowRead for AssemblyProcessorRow {
    fn row_size(_info: &TableInfo) -> u32 {
        /* processor */ 4
    }

    fn read_row(data: &[u8], offset: &mut usize, rid: u32, _info: &TableInfo) -> Result<Self> {
        Ok(AssemblyProcessorRow {
            rid,
            processor: read_le_at::<u32>(data, offset)?,
        })
    }
}

/// The `AssemblyOS` table (0x22).
#[derive(Clone, Debug)]
pub struct AssemblyOsRow {
    /// 1-based row id
    pub rid: u32,
    /// Platform id
    pub os_platform_id: u32,
    /// OS major version
    pub os_major_version: u32,
    /// OS minor version
    pub os_minor_version: u32,
}

impl RowRead for AssemblyOsRow {
    fn row_size(_info: &TableInfo) -> u32 {
        /* platform + major + minor */ 12
    }

    fn read_row(data: &[u8], offset: &mut usize, rid: u32, _info: &TableInfo) -> Result<Self> {
        Ok(AssemblyOsRow {
            rid,
            os_platform_id: read_le_at::<u32>(data, offset)?,
            os_major_version: read_le_at::<u32>(data, offset)?,
            os_minor_version: read_le_at::<u32>(data, offset)?,
        })
    }
}

/// The `AssemblyRef` table (0x23): referenced assemblies.
#[derive(Clone, Debug)]
pub struct AssemblyRefRow {
    /// 1-based row id
    pub rid: u32,
    /// Token for this row
    pub token: Token,
    /// Major version
    pub major_version: u16,
    /// Minor version
    pub minor_version: u16,
    /// Build number
    pub build_number: u16,
    /// Revision number
    pub revision_number: u16,
    /// A 4-byte `AssemblyFlags` bitmask
    pub flags: u32,
    /// Index into `#Blob`
    pub public_key_or_token: u32,
    /// Index into `#Strings`
    pub name: u32,
    /// Index into `#Strings`
    pub culture: u32,
    /// Index into `#Blob`
    pub hash_value: u32,
}

impl RowRead for AssemblyRefRow {
    #[rustfmt::skip]
    fn row_size(info: &TableInfo) -> u32 {
        u32::from(
            /* version (4x u16) */    8_u8 +
            /* flags */               4
        ) + u32::from(
            /* public_key_or_token */ info.blob_bytes() +
            /* name */                info.str_bytes() +
            /* culture */             info.str_bytes() +
            /* hash_value */          info.blob_bytes()
        )
    }

    fn read_row(data: &[u8], offset: &mut usize, rid: u32, info: &TableInfo) -> Result<Self> {
        Ok(AssemblyRefRow {
            rid,
            token: Token::from_parts(TableId::AssemblyRef as u8, rid),
            major_version: read_le_at::<u16>(data, offset)?,
            minor_version: read_le_at::<u16>(data, offset)?,
            build_number: read_le_at::<u16>(data, offset)?,
            revision_number: read_le_at::<u16>(data, offset)?,
            flags: read_le_at::<u32>(data, offset)?,
            public_key_or_token: read_le_at_dyn(data, offset, info.is_large_blob())?,
            name: read_le_at_dyn(data, offset, info.is_large_str())?,
            culture: read_le_at_dyn(data, offset, info.is_large_str())?,
            hash_value: read_le_at_dyn(data, offset, info.is_large_blob())?,
        })
    }
}

/// The `AssemblyRefProcessor` table (0x24).
#[derive(Clone, Debug)]
pub struct AssemblyRefProcessorRow {
    /// 1-based row id
    pub rid: u32,
    /// Processor architecture
    pub processor: u32,
    /// Index into the AssemblyRef table
    pub assembly_ref: u32,
}

impl RowRead for AssemblyRefProcessorRow {
    #[rustfmt::skip]
    fn row_size(info: &TableInfo) -> u32 {
        /* processor */        4 + u32::from(
            /* assembly_ref */ info.table_index_bytes(TableId::AssemblyRef)
        )
    }

    fn read_row(data: &[u8], offset: &mut usize, rid: u32, info: &TableInfo) -> Result<Self> {
        Ok(AssemblyRefProcessorRow {
            rid,
            processor: read_le_at::<u32>(data, offset)?,
            assembly_ref: read_le_at_dyn(data, offset, info.is_large(TableId::AssemblyRef))?,
        })
    }
}

/// The `AssemblyRefOS` table (0x25).
#[derive(Clone, Debug)]
pub struct AssemblyRefOsRow {
    /// 1-based row id
    pub rid: u32,
    /// Platform id
    pub os_platform_id: u32,
    /// OS major version
    pub os_major_version: u32,
    /// OS minor version
    pub os_minor_version: u32,
    /// Index into the AssemblyRef table
    pub assembly_ref: u32,
}

impl RowRead for AssemblyRefOsRow {
    #[rustfmt::skip]
    fn row_size(info: &TableInfo) -> u32 {
        /* platform + major + minor */ 12 + u32::from(
            /* assembly_ref */         info.table_index_bytes(TableId::AssemblyRef)
        )
    }

    fn read_row(data: &[u8], offset: &mut usize, rid: u32, info: &TableInfo) -> Result<Self> {
        Ok(AssemblyRefOsRow {
            rid,
            os_platform_id: read_le_at::<u32>(data, offset)?,
            os_major_version: read_le_at::<u32>(data, offset)?,
            os_minor_version: read_le_at::<u32>(data, offset)?,
            assembly_ref: read_le_at_dyn(data, offset, info.is_large(TableId::AssemblyRef))?,
        })
    }
}

/// The `File` table (0x26): files in a multi-file assembly.
#[derive(Clone, Debug)]
pub struct FileRow {
    /// 1-based row id
    pub rid: u32,
    /// A 4-byte `FileAttributes` bitmask
    pub flags: u32,
    /// Index into `#Strings`
    pub name: u32,
    /// Index into `#Blob`
    pub hash_value: u32,
}

impl RowRead for FileRow {
    #[rustfmt::skip]
    fn row_size(info: &TableInfo) -> u32 {
        /* flags */           4 + u32::from(
            /* name */        info.str_bytes() +
            /* hash_value */  info.blob_bytes()
        )
    }

    fn read_row(data: &[u8], offset: &mut usize, rid: u32, info: &TableInfo) -> Result<Self> {
        Ok(FileRow {
            rid,
            flags: read_le_at::<u32>(data, offset)?,
            name: read_le_at_dyn(data, offset, info.is_large_str())?,
            hash_value: read_le_at_dyn(data, offset, info.is_large_blob())?,
        })
    }
}

/// The `ExportedType` table (0x27): forwarded and exported types.
#[derive(Clone, Debug)]
pub struct ExportedTypeRow {
    /// 1-based row id
    pub rid: u32,
    /// A 4-byte `TypeAttributes` bitmask
    pub flags: u32,
    /// Hint into the target file's TypeDef table
    pub type_def_id: u32,
    /// Index into `#Strings`
    pub type_name: u32,
    /// Index into `#Strings`
    pub type_namespace: u32,
    /// An `Implementation` coded index
    pub implementation: CodedIndex,
}

impl RowRead for ExportedTypeRow {
    #[rustfmt::skip]
    fn row_size(info: &TableInfo) -> u32 {
        u32::from(
            /* flags */              4_u8 +
            /* type_def_id */        4
        ) + u32::from(
            /* type_name */          info.str_bytes() +
            /* type_namespace */     info.str_bytes() +
            /* implementation */     info.coded_index_bytes(CodedIndexType::Implementation)
        )
    }

    fn read_row(data: &[u8], offset: &mut usize, rid: u32, info: &TableInfo) -> Result<Self> {
        Ok(ExportedTypeRow {
            rid,
            flags: read_le_at::<u32>(data, offset)?,
            type_def_id: read_le_at::<u32>(data, offset)?,
            type_name: read_le_at_dyn(data, offset, info.is_large_str())?,
            type_namespace: read_le_at_dyn(data, offset, info.is_large_str())?,
            implementation: CodedIndex::read(data, offset, info, CodedIndexType::Implementation)?,
        })
    }
}

/// The `ManifestResource` table (0x28): embedded or linked resources.
#[derive(Clone, Debug)]
pub struct ManifestResourceRow {
    /// 1-based row id
    pub rid: u32,
    /// Byte offset within the resource block
    pub data_offset: u32,
    /// A 4-byte `ManifestResourceAttributes` bitmask
    pub flags: u32,
    /// Index into `#Strings`
    pub name: u32,
    /// An `Implementation` coded index, 0 for embedded resources
    pub implementation: CodedIndex,
}

impl RowRead for ManifestResourceRow {
    #[rustfmt::skip]
    fn row_size(info: &TableInfo) -> u32 {
        u32::from(
            /* data_offset */    4_u8 +
            /* flags */          4
        ) + u32::from(
            /* name */           info.str_bytes() +
            /* implementation */ info.coded_index_bytes(CodedIndexType::Implementation)
        )
    }

    fn read_row(data: &[u8], offset: &mut usize, rid: u32, info: &TableInfo) -> Result<Self> {
        Ok(ManifestResourceRow {
            rid,
            data_offset: read_le_at::<u32>(data, offset)?,
            flags: read_le_at::<u32>(data, offset)?,
            name: read_le_at_dyn(data, offset, info.is_large_str())?,
            implementation: CodedIndex::read(data, offset, info, CodedIndexType::Implementation)?,
        })
    }
}

/// The `NestedClass` table (0x29): nesting relationships.
#[derive(Clone, Debug)]
pub struct NestedClassRow {
    /// 1-based row id
    pub rid: u32,
    /// Index into the TypeDef table: the nested type
    pub nested_class: u32,
    /// Index into the TypeDef table: the enclosing type
    pub enclosing_class: u32,
}

impl RowRead for NestedClassRow {
    #[rustfmt::skip]
    fn row_size(info: &TableInfo) -> u32 {
        u32::from(
            /* nested_class */    info.table_index_bytes(TableId::TypeDef) +
            /* enclosing_class */ info.table_index_bytes(TableId::TypeDef)
        )
    }

    fn read_row(data: &[u8], offset: &mut usize, rid: u32, info: &TableInfo) -> Result<Self> {
        Ok(NestedClassRow {
            rid,
            nested_class: read_le_at_dyn(data, offset, info.is_large(TableId::TypeDef))?,
            enclosing_class: read_le_at_dyn(data, offset, info.is_large(TableId::TypeDef))?,
        })
    }
}

/// The `GenericParam` table (0x2A): generic parameter definitions.
#[derive(Clone, Debug)]
pub struct GenericParamRow {
    /// 1-based row id
    pub rid: u32,
    /// Ordinal of the parameter
    pub number: u16,
    /// A 2-byte `GenericParamAttributes` bitmask
    pub flags: u16,
    /// A `TypeOrMethodDef` coded index
    pub owner: CodedIndex,
    /// Index into `#Strings`
    pub name: u32,
}

impl RowRead for GenericParamRow {
    #[rustfmt::skip]
    fn row_size(info: &TableInfo) -> u32 {
        u32::from(
            /* number */ 2 +
            /* flags */  2 +
            /* owner */  info.coded_index_bytes(CodedIndexType::TypeOrMethodDef) +
            /* name */   info.str_bytes()
        )
    }

    fn read_row(data: &[u8], offset: &mut usize, rid: u32, info: &TableInfo) -> Result<Self> {
        Ok(GenericParamRow {
            rid,
            number: read_le_at::<u16>(data, offset)?,
            flags: read_le_at::<u16>(data, offset)?,
            owner: CodedIndex::read(data, offset, info, CodedIndexType::TypeOrMethodDef)?,
            name: read_le_at_dyn(data, offset, info.is_large_str())?,
        })
    }
}

/// The `MethodSpec` table (0x2B): generic method instantiations.
#[derive(Clone, Debug)]
pub struct MethodSpecRow {
    /// 1-based row id
    pub rid: u32,
    /// Token for this row
    pub token: Token,
    /// A `MethodDefOrRef` coded index
    pub method: CodedIndex,
    /// Index into `#Blob`
    pub instantiation: u32,
}

impl RowRead for MethodSpecRow {
    #[rustfmt::skip]
    fn row_size(info: &TableInfo) -> u32 {
        u32::from(
            /* method */        info.coded_index_bytes(CodedIndexType::MethodDefOrRef) +
            /* instantiation */ info.blob_bytes()
        )
    }

    fn read_row(data: &[u8], offset: &mut usize, rid: u32, info: &TableInfo) -> Result<Self> {
        Ok(MethodSpecRow {
            rid,
            token: Token::from_parts(TableId::MethodSpec as u8, rid),
            method: CodedIndex::read(data, offset, info, CodedIndexType::MethodDefOrRef)?,
            instantiation: read_le_at_dyn(data, offset, info.is_large_blob())?,
        })
    }
}

/// The `GenericParamConstraint` table (0x2C).
#[derive(Clone, Debug)]
pub struct GenericParamConstraintRow {
    /// 1-based row id
    pub rid: u32,
    /// Index into the GenericParam table
    pub owner: u32,
    /// A `TypeDefOrRef` coded index
    pub constraint: CodedIndex,
}

impl RowRead for GenericParamConstraintRow {
    #[rustfmt::skip]
    fn row_size(info: &TableInfo) -> u32 {
        u32::from(
            /* owner */      info.table_index_bytes(TableId::GenericParam) +
            /* constraint */ info.coded_index_bytes(CodedIndexType::TypeDefOrRef)
        )
    }

    fn read_row(data: &[u8], offset: &mut usize, rid: u32, info: &TableInfo) -> Result<Self> {
        Ok(GenericParamConstraintRow {
            rid,
            owner: read_le_at_dyn(data, offset, info.is_large(TableId::GenericParam))?,
            constraint: CodedIndex::read(data, offset, info, CodedIndexType::TypeDefOrRef)?,
        })
    }
}

/// Row size of any table under the given index widths.
///
/// The running sum of these sizes over the present tables, in `TableId`
/// order, is the tables-stream geometry.
#[must_use]
pub fn row_size_of(table: TableId, info: &TableInfo) -> u32 {
    match table {
        TableId::Module => ModuleRow::row_size(info),
        TableId::TypeRef => TypeRefRow::row_size(info),
        TableId::TypeDef => TypeDefRow::row_size(info),
        TableId::FieldPtr => FieldPtrRow::row_size(info),
        TableId::Field => FieldRow::row_size(info),
        TableId::MethodPtr => MethodPtrRow::row_size(info),
        TableId::MethodDef => MethodDefRow::row_size(info),
        TableId::ParamPtr => ParamPtrRow::row_size(info),
        TableId::Param => ParamRow::row_size(info),
        TableId::InterfaceImpl => InterfaceImplRow::row_size(info),
        TableId::MemberRef => MemberRefRow::row_size(info),
        TableId::Constant => ConstantRow::row_size(info),
        TableId::CustomAttribute => CustomAttributeRow::row_size(info),
        TableId::FieldMarshal => FieldMarshalRow::row_size(info),
        TableId::DeclSecurity => DeclSecurityRow::row_size(info),
        TableId::ClassLayout => ClassLayoutRow::row_size(info),
        TableId::FieldLayout => FieldLayoutRow::row_size(info),
        TableId::StandAloneSig => StandAloneSigRow::row_size(info),
        TableId::EventMap => EventMapRow::row_size(info),
        TableId::EventPtr => EventPtrRow::row_size(info),
        TableId::Event => EventRow::row_size(info),
        TableId::PropertyMap => PropertyMapRow::row_size(info),
        TableId::PropertyPtr => PropertyPtrRow::row_size(info),
        TableId::Property => PropertyRow::row_size(info),
        TableId::MethodSemantics => MethodSemanticsRow::row_size(info),
        TableId::MethodImpl => MethodImplRow::row_size(info),
        TableId::ModuleRef => ModuleRefRow::row_size(info),
        TableId::TypeSpec => TypeSpecRow::row_size(info),
        TableId::ImplMap => ImplMapRow::row_size(info),
        TableId::FieldRVA => FieldRvaRow::row_size(info),
        TableId::Assembly => AssemblyRow::row_size(info),
        TableId::AssemblyProcessor => AssemblyProcessorRow::row_size(info),
        TableId::AssemblyOS => AssemblyOsRow::row_size(info),
        TableId::AssemblyRef => AssemblyRefRow::row_size(info),
        TableId::AssemblyRefProcessor => AssemblyRefProcessorRow::row_size(info),
        TableId::AssemblyRefOS => AssemblyRefOsRow::row_size(info),
        TableId::File => FileRow::row_size(info),
        TableId::ExportedType => ExportedTypeRow::row_size(info),
        TableId::ManifestResource => ManifestResourceRow::row_size(info),
        TableId::NestedClass => NestedClassRow::row_size(info),
        TableId::GenericParam => GenericParamRow::row_size(info),
        TableId::MethodSpec => MethodSpecRow::row_size(info),
        TableId::GenericParamConstraint => GenericParamConstraintRow::row_size(info),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn typedef_row_size_small() {
        let info = TableInfo::new_test(
            &[(TableId::Field, 1), (TableId::MethodDef, 1)],
            false,
            false,
            false,
        );

        // flags(4) + name(2) + namespace(2) + extends(2) + field_list(2) + method_list(2)
        assert_eq!(TypeDefRow::row_size(&info), 14);
        assert_eq!(TypeDefRow::payload_size(&info), 10);
    }

    #[test]
    fn typedef_row_read() {
        let data = [
            0x01, 0x00, 0x00, 0x00, // flags
            0x42, 0x00, // type_name
            0x43, 0x00, // type_namespace
            0x05, 0x00, // extends: (1 << 2) | 1 -> TypeRef row 1
            0x01, 0x00, // field_list
            0x02, 0x00, // method_list
        ];

        let info = TableInfo::new_test(
            &[
                (TableId::TypeDef, 2),
                (TableId::TypeRef, 2),
                (TableId::Field, 1),
                (TableId::MethodDef, 3),
            ],
            false,
            false,
            false,
        );

        let mut offset = 0;
        let row = TypeDefRow::read_row(&data, &mut offset, 1, &info).unwrap();

        assert_eq!(offset, TypeDefRow::row_size(&info) as usize);
        assert_eq!(row.token, Token::new(0x0200_0001));
        assert_eq!(row.flags, 1);
        assert_eq!(row.type_name, 0x42);
        assert_eq!(row.type_namespace, 0x43);
        assert_eq!(row.extends.tag, TableId::TypeRef);
        assert_eq!(row.extends.row, 1);
        assert_eq!(row.field_list, 1);
        assert_eq!(row.method_list, 2);
    }

    #[test]
    fn methoddef_row_read() {
        let data = [
            0x50, 0x20, 0x00, 0x00, // rva
            0x00, 0x00, // impl_flags
            0x96, 0x00, // flags
            0x10, 0x00, // name
            0x0A, 0x00, // signature
            0x01, 0x00, // param_list
        ];

        let info = TableInfo::new_test(
            &[(TableId::MethodDef, 2), (TableId::Param, 1)],
            false,
            false,
            false,
        );

        let mut offset = 0;
        let row = MethodDefRow::read_row(&data, &mut offset, 2, &info).unwrap();

        assert_eq!(offset, MethodDefRow::row_size(&info) as usize);
        assert_eq!(row.token, Token::new(0x0600_0002));
        assert_eq!(row.rva, 0x2050);
        assert_eq!(row.flags, 0x96);
        assert_eq!(row.name, 0x10);
        assert_eq!(row.signature, 0x0A);
        assert_eq!(MethodDefRow::payload_size(&info), 12);
    }

    #[test]
    fn constant_parent_is_coded_value_is_raw() {
        let data = [
            0x08, 0x00, // base_type I4 + padding
            0x04, 0x00, // parent: (1 << 2) | 0 -> Field row 1
            0x2A, 0x00, // value: raw #Blob offset 0x2A
        ];

        let info = TableInfo::new_test(
            &[(TableId::Field, 3), (TableId::Constant, 1)],
            false,
            false,
            false,
        );

        let mut offset = 0;
        let row = ConstantRow::read_row(&data, &mut offset, 1, &info).unwrap();

        assert_eq!(row.base_type, 0x08);
        assert_eq!(row.parent.tag, TableId::Field);
        assert_eq!(row.parent.row, 1);
        assert_eq!(row.value, 0x2A);
    }

    #[test]
    fn row_size_of_covers_fixed_tables() {
        let info = TableInfo::new_test(&[], false, false, false);

        assert_eq!(row_size_of(TableId::AssemblyProcessor, &info), 4);
        assert_eq!(row_size_of(TableId::AssemblyOS, &info), 12);
        assert_eq!(row_size_of(TableId::StandAloneSig, &info), 2);
        assert_eq!(row_size_of(TableId::ModuleRef, &info), 2);
    }
}
