//! The tables stream (`#~` / `#-`): header, geometry, and parsed rows.
//!
//! Layout: a 24-byte header (reserved, versions, HeapSizes, `Valid` and
//! `Sorted` bit vectors), one 4-byte row count per present table, then the
//! tables themselves concatenated in id order. [`TablesHeader::from`] parses
//! the header, derives every index width, records the byte offset at which
//! each table's data begins, and eagerly parses all rows into owned records.
//!
//! Eager parsing matters here: the trim engine mutates the image these rows
//! came from, so nothing may keep borrowing it after load. The recorded
//! offsets (relative to the stream start) are what the trimmers use to
//! address original row bytes.
//!
//! # Reference
//! - [ECMA-335 II.24.2.6](https://ecma-international.org/wp-content/uploads/ECMA-335_6th_edition_june_2012.pdf)

use strum::IntoEnumIterator;

use crate::{
    file::io::read_le,
    metadata::tables::{
        row_size_of, AssemblyOsRow, AssemblyProcessorRow, AssemblyRefOsRow,
        AssemblyRefProcessorRow, AssemblyRefRow, AssemblyRow, ClassLayoutRow, ConstantRow,
        CustomAttributeRow, DeclSecurityRow, EventMapRow, EventPtrRow, EventRow, ExportedTypeRow,
        FieldLayoutRow, FieldMarshalRow, FieldPtrRow, FieldRow, FieldRvaRow, FileRow,
        GenericParamConstraintRow, GenericParamRow, ImplMapRow, InterfaceImplRow,
        ManifestResourceRow, MemberRefRow, MetadataTable, MethodDefRow, MethodImplRow,
        MethodPtrRow, MethodSemanticsRow, MethodSpecRow, ModuleRefRow, ModuleRow, NestedClassRow,
        ParamPtrRow, ParamRow, PropertyMapRow, PropertyPtrRow, PropertyRow, StandAloneSigRow,
        TableId, TableInfo, TypeDefRow, TypeRefRow, TypeSpecRow,
    },
    Error::OutOfBounds,
    Result,
};

/// Every parsed table, one field per ECMA-335 table. Absent tables are
/// empty, which makes all walks over them no-ops.
#[derive(Default)]
#[allow(missing_docs)]
pub struct TableRows {
    pub module: MetadataTable<ModuleRow>,
    pub type_ref: MetadataTable<TypeRefRow>,
    pub type_def: MetadataTable<TypeDefRow>,
    pub field_ptr: MetadataTable<FieldPtrRow>,
    pub field: MetadataTable<FieldRow>,
    pub method_ptr: MetadataTable<MethodPtrRow>,
    pub method_def: MetadataTable<MethodDefRow>,
    pub param_ptr: MetadataTable<ParamPtrRow>,
    pub param: MetadataTable<ParamRow>,
    pub interface_impl: MetadataTable<InterfaceImplRow>,
    pub member_ref: MetadataTable<MemberRefRow>,
    pub constant: MetadataTable<ConstantRow>,
    pub custom_attribute: MetadataTable<CustomAttributeRow>,
    pub field_marshal: MetadataTable<FieldMarshalRow>,
    pub decl_security: MetadataTable<DeclSecurityRow>,
    pub class_layout: MetadataTable<ClassLayoutRow>,
    pub field_layout: MetadataTable<FieldLayoutRow>,
    pub stand_alone_sig: MetadataTable<StandAloneSigRow>,
    pub event_map: MetadataTable<EventMapRow>,
    pub event_ptr: MetadataTable<EventPtrRow>,
    pub event: MetadataTable<EventRow>,
    pub property_map: MetadataTable<PropertyMapRow>,
    pub property_ptr: MetadataTable<PropertyPtrRow>,
    pub property: MetadataTable<PropertyRow>,
    pub method_semantics: MetadataTable<MethodSemanticsRow>,
    pub method_impl: MetadataTable<MethodImplRow>,
    pub module_ref: MetadataTable<ModuleRefRow>,
    pub type_spec: MetadataTable<TypeSpecRow>,
    pub impl_map: MetadataTable<ImplMapRow>,
    pub field_rva: MetadataTable<FieldRvaRow>,
    pub assembly: MetadataTable<AssemblyRow>,
    pub assembly_processor: MetadataTable<AssemblyProcessorRow>,
    pub assembly_os: MetadataTable<AssemblyOsRow>,
    pub assembly_ref: MetadataTable<AssemblyRefRow>,
    pub assembly_ref_processor: MetadataTable<AssemblyRefProcessorRow>,
    pub assembly_ref_os: MetadataTable<AssemblyRefOsRow>,
    pub file: MetadataTable<FileRow>,
    pub exported_type: MetadataTable<ExportedTypeRow>,
    pub manifest_resource: MetadataTable<ManifestResourceRow>,
    pub nested_class: MetadataTable<NestedClassRow>,
    pub generic_param: MetadataTable<GenericParamRow>,
    pub method_spec: MetadataTable<MethodSpecRow>,
    pub generic_param_constraint: MetadataTable<GenericParamConstraintRow>,
}

/// The parsed tables stream.
pub struct TablesHeader {
    /// Major version of the table schemata, shall be 2
    pub major_version: u8,
    /// Minor version of the table schemata, shall be 0
    pub minor_version: u8,
    /// The raw HeapSizes byte
    pub heap_sizes: u8,
    /// Bit vector of present tables
    pub valid: u64,
    /// Bit vector of sorted tables
    pub sorted: u64,
    /// Row counts and index widths
    pub info: TableInfo,
    /// All parsed rows
    pub tables: TableRows,
    /// Byte offset of each table's data relative to the stream start;
    /// `usize::MAX` for absent tables
    offsets: [usize; TableId::GenericParamConstraint as usize + 1],
}

impl TablesHeader {
    /// Parse a tables stream.
    ///
    /// # Arguments
    /// * 'data' - The stream bytes, starting at the 24-byte header
    ///
    /// # Errors
    /// Returns an error if the header is truncated, no table is marked
    /// valid, or the declared rows overrun the stream.
    pub fn from(data: &[u8]) -> Result<TablesHeader> {
        if data.len() < 24 {
            return Err(OutOfBounds);
        }

        let valid = read_le::<u64>(&data[8..])?;
        if valid == 0 {
            return Err(malformed_error!("No valid rows in any of the tables"));
        }

        let info = TableInfo::new(data, valid)?;

        let mut header = TablesHeader {
            major_version: read_le::<u8>(&data[4..])?,
            minor_version: read_le::<u8>(&data[5..])?,
            heap_sizes: read_le::<u8>(&data[6..])?,
            valid,
            sorted: read_le::<u64>(&data[16..])?,
            info,
            tables: TableRows::default(),
            offsets: [usize::MAX; TableId::GenericParamConstraint as usize + 1],
        };

        let mut offset = (24 + valid.count_ones() * 4) as usize;
        for table_id in TableId::iter() {
            let rows = header.info.rows(table_id);
            if rows == 0 {
                continue;
            }

            header.offsets[table_id as usize] = offset;
            header.parse_table(data, &mut offset, table_id, rows)?;
        }

        Ok(header)
    }

    fn parse_table(
        &mut self,
        data: &[u8],
        offset: &mut usize,
        table_id: TableId,
        rows: u32,
    ) -> Result<()> {
        let info = &self.info;
        let t = &mut self.tables;

        match table_id {
            TableId::Module => t.module = MetadataTable::parse(data, offset, rows, info)?,
            TableId::TypeRef => t.type_ref = MetadataTable::parse(data, offset, rows, info)?,
            TableId::TypeDef => t.type_def = MetadataTable::parse(data, offset, rows, info)?,
            TableId::FieldPtr => t.field_ptr = MetadataTable::parse(data, offset, rows, info)?,
            TableId::Field => t.field = MetadataTable::parse(data, offset, rows, info)?,
            TableId::MethodPtr => t.method_ptr = MetadataTable::parse(data, offset, rows, info)?,
            TableId::MethodDef => t.method_def = MetadataTable::parse(data, offset, rows, info)?,
            TableId::ParamPtr => t.param_ptr = MetadataTable::parse(data, offset, rows, info)?,
            TableId::Param => t.param = MetadataTable::parse(data, offset, rows, info)?,
            TableId::InterfaceImpl => {
                t.interface_impl = MetadataTable::parse(data, offset, rows, info)?;
            }
            TableId::MemberRef => t.member_ref = MetadataTable::parse(data, offset, rows, info)?,
            TableId::Constant => t.constant = MetadataTable::parse(data, offset, rows, info)?,
            TableId::CustomAttribute => {
                t.custom_attribute = MetadataTable::parse(data, offset, rows, info)?;
            }
            TableId::FieldMarshal => {
                t.field_marshal = MetadataTable::parse(data, offset, rows, info)?;
            }
            TableId::DeclSecurity => {
                t.decl_security = MetadataTable::parse(data, offset, rows, info)?;
            }
            TableId::ClassLayout => t.class_layout = MetadataTable::parse(data, offset, rows, info)?,
            TableId::FieldLayout => t.field_layout = MetadataTable::parse(data, offset, rows, info)?,
            TableId::StandAloneSig => {
                t.stand_alone_sig = MetadataTable::parse(data, offset, rows, info)?;
            }
            TableId::EventMap => t.event_map = MetadataTable::parse(data, offset, rows, info)?,
            TableId::EventPtr => t.event_ptr = MetadataTable::parse(data, offset, rows, info)?,
            TableId::Event => t.event = MetadataTable::parse(data, offset, rows, info)?,
            TableId::PropertyMap => t.property_map = MetadataTable::parse(data, offset, rows, info)?,
            TableId::PropertyPtr => t.property_ptr = MetadataTable::parse(data, offset, rows, info)?,
            TableId::Property => t.property = MetadataTable::parse(data, offset, rows, info)?,
            TableId::MethodSemantics => {
                t.method_semantics = MetadataTable::parse(data, offset, rows, info)?;
            }
            TableId::MethodImpl => t.method_impl = MetadataTable::parse(data, offset, rows, info)?,
            TableId::ModuleRef => t.module_ref = MetadataTable::parse(data, offset, rows, info)?,
            TableId::TypeSpec => t.type_spec = MetadataTable::parse(data, offset, rows, info)?,
            TableId::ImplMap => t.impl_map = MetadataTable::parse(data, offset, rows, info)?,
            TableId::FieldRVA => t.field_rva = MetadataTable::parse(data, offset, rows, info)?,
            TableId::Assembly => t.assembly = MetadataTable::parse(data, offset, rows, info)?,
            TableId::AssemblyProcessor => {
                t.assembly_processor = MetadataTable::parse(data, offset, rows, info)?;
            }
            TableId::AssemblyOS => t.assembly_os = MetadataTable::parse(data, offset, rows, info)?,
            TableId::AssemblyRef => t.assembly_ref = MetadataTable::parse(data, offset, rows, info)?,
            TableId::AssemblyRefProcessor => {
                t.assembly_ref_processor = MetadataTable::parse(data, offset, rows, info)?;
            }
            TableId::AssemblyRefOS => {
                t.assembly_ref_os = MetadataTable::parse(data, offset, rows, info)?;
            }
            TableId::File => t.file = MetadataTable::parse(data, offset, rows, info)?,
            TableId::ExportedType => {
                t.exported_type = MetadataTable::parse(data, offset, rows, info)?;
            }
            TableId::ManifestResource => {
                t.manifest_resource = MetadataTable::parse(data, offset, rows, info)?;
            }
            TableId::NestedClass => t.nested_class = MetadataTable::parse(data, offset, rows, info)?,
            TableId::GenericParam => {
                t.generic_param = MetadataTable::parse(data, offset, rows, info)?;
            }
            TableId::MethodSpec => t.method_spec = MetadataTable::parse(data, offset, rows, info)?,
            TableId::GenericParamConstraint => {
                t.generic_param_constraint = MetadataTable::parse(data, offset, rows, info)?;
            }
        }

        Ok(())
    }

    /// Check if a specific table is present.
    #[must_use]
    pub fn has_table(&self, table_id: TableId) -> bool {
        (self.valid & (1u64 << (table_id as u8))) != 0
    }

    /// Number of present tables.
    #[must_use]
    pub fn table_count(&self) -> u32 {
        self.valid.count_ones()
    }

    /// Row count of a table (0 when absent).
    #[must_use]
    pub fn row_count(&self, table_id: TableId) -> u32 {
        self.info.rows(table_id)
    }

    /// Byte offset of a table's data relative to the stream start.
    #[must_use]
    pub fn table_offset(&self, table_id: TableId) -> Option<usize> {
        let offset = self.offsets[table_id as usize];
        (offset != usize::MAX).then_some(offset)
    }

    /// Byte offset of row `rid` (1-based) of a table relative to the
    /// stream start.
    #[must_use]
    pub fn row_offset(&self, table_id: TableId, rid: u32) -> Option<usize> {
        if rid == 0 || rid > self.info.rows(table_id) {
            return None;
        }

        let table_offset = self.table_offset(table_id)?;
        let row_size = row_size_of(table_id, &self.info) as usize;
        Some(table_offset + row_size * (rid as usize - 1))
    }

    /// Iterator over the present tables.
    pub fn present_tables(&self) -> impl Iterator<Item = TableId> + '_ {
        TableId::iter().filter(|&table_id| self.has_table(table_id))
    }
}
