use strum::{EnumCount, EnumIter};

/// Identifiers for the metadata tables defined in ECMA-335 II.22.
///
/// The numeric values are the table ids as they appear in the high byte of a
/// metadata token and as bit positions in the tables-stream `Valid` vector.
/// The `*Ptr` tables are the indirection tables emitted by edit-and-continue
/// aware compilers; they are parsed for geometry but carry no payload the
/// trim engine acts on.
#[derive(Clone, Copy, PartialEq, Debug, EnumIter, EnumCount, Eq, Hash)]
pub enum TableId {
    /// `Module` (0x00) - the current module, exactly one row.
    Module = 0x00,
    /// `TypeRef` (0x01) - references to types in external scopes.
    TypeRef = 0x01,
    /// `TypeDef` (0x02) - types defined in this module.
    TypeDef = 0x02,
    /// `FieldPtr` (0x03) - field indirection.
    FieldPtr = 0x03,
    /// `Field` (0x04) - field definitions.
    Field = 0x04,
    /// `MethodPtr` (0x05) - method indirection.
    MethodPtr = 0x05,
    /// `MethodDef` (0x06) - method definitions.
    MethodDef = 0x06,
    /// `ParamPtr` (0x07) - parameter indirection.
    ParamPtr = 0x07,
    /// `Param` (0x08) - method parameter definitions.
    Param = 0x08,
    /// `InterfaceImpl` (0x09) - interfaces implemented by types.
    InterfaceImpl = 0x09,
    /// `MemberRef` (0x0A) - references to external methods and fields.
    MemberRef = 0x0A,
    /// `Constant` (0x0B) - compile-time constant values.
    Constant = 0x0B,
    /// `CustomAttribute` (0x0C) - custom attribute applications.
    CustomAttribute = 0x0C,
    /// `FieldMarshal` (0x0D) - marshalling descriptors.
    FieldMarshal = 0x0D,
    /// `DeclSecurity` (0x0E) - declarative security permissions.
    DeclSecurity = 0x0E,
    /// `ClassLayout` (0x0F) - explicit type layout.
    ClassLayout = 0x0F,
    /// `FieldLayout` (0x10) - explicit field offsets.
    FieldLayout = 0x10,
    /// `StandAloneSig` (0x11) - standalone signatures (locals, calli).
    StandAloneSig = 0x11,
    /// `EventMap` (0x12) - type-to-event ranges.
    EventMap = 0x12,
    /// `EventPtr` (0x13) - event indirection.
    EventPtr = 0x13,
    /// `Event` (0x14) - event definitions.
    Event = 0x14,
    /// `PropertyMap` (0x15) - type-to-property ranges.
    PropertyMap = 0x15,
    /// `PropertyPtr` (0x16) - property indirection.
    PropertyPtr = 0x16,
    /// `Property` (0x17) - property definitions.
    Property = 0x17,
    /// `MethodSemantics` (0x18) - accessor associations.
    MethodSemantics = 0x18,
    /// `MethodImpl` (0x19) - explicit method implementations.
    MethodImpl = 0x19,
    /// `ModuleRef` (0x1A) - external module references.
    ModuleRef = 0x1A,
    /// `TypeSpec` (0x1B) - type specifications (generic instantiations).
    TypeSpec = 0x1B,
    /// `ImplMap` (0x1C) - P/Invoke mappings.
    ImplMap = 0x1C,
    /// `FieldRVA` (0x1D) - initial data for mapped fields.
    FieldRVA = 0x1D,
    /// `Assembly` (0x20) - this assembly's identity.
    Assembly = 0x20,
    /// `AssemblyProcessor` (0x21) - rarely used.
    AssemblyProcessor = 0x21,
    /// `AssemblyOS` (0x22) - rarely used.
    AssemblyOS = 0x22,
    /// `AssemblyRef` (0x23) - referenced assemblies.
    AssemblyRef = 0x23,
    /// `AssemblyRefProcessor` (0x24) - rarely used.
    AssemblyRefProcessor = 0x24,
    /// `AssemblyRefOS` (0x25) - rarely used.
    AssemblyRefOS = 0x25,
    /// `File` (0x26) - files in a multi-file assembly.
    File = 0x26,
    /// `ExportedType` (0x27) - forwarded/exported types.
    ExportedType = 0x27,
    /// `ManifestResource` (0x28) - embedded or linked resources.
    ManifestResource = 0x28,
    /// `NestedClass` (0x29) - nesting relationships between types.
    NestedClass = 0x29,
    /// `GenericParam` (0x2A) - generic parameter definitions.
    GenericParam = 0x2A,
    /// `MethodSpec` (0x2B) - generic method instantiations.
    MethodSpec = 0x2B,
    /// `GenericParamConstraint` (0x2C) - generic parameter constraints.
    GenericParamConstraint = 0x2C,
}

impl TableId {
    /// The table id a metadata token's high byte maps to, if it is a table.
    #[must_use]
    pub fn from_token_table(table: u8) -> Option<TableId> {
        use strum::IntoEnumIterator;
        TableId::iter().find(|id| *id as u8 == table)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use strum::IntoEnumIterator;

    #[test]
    fn discriminants_match_token_tables() {
        assert_eq!(TableId::Module as u8, 0x00);
        assert_eq!(TableId::TypeDef as u8, 0x02);
        assert_eq!(TableId::MethodDef as u8, 0x06);
        assert_eq!(TableId::FieldRVA as u8, 0x1D);
        assert_eq!(TableId::Assembly as u8, 0x20);
        assert_eq!(TableId::GenericParamConstraint as u8, 0x2C);
    }

    #[test]
    fn from_token_table() {
        assert_eq!(TableId::from_token_table(0x06), Some(TableId::MethodDef));
        assert_eq!(TableId::from_token_table(0x1B), Some(TableId::TypeSpec));
        // 0x1E/0x1F and the #US tag 0x70 are not tables
        assert_eq!(TableId::from_token_table(0x1E), None);
        assert_eq!(TableId::from_token_table(0x70), None);
    }

    #[test]
    fn iteration_is_ascending() {
        let ids: Vec<u8> = TableId::iter().map(|id| id as u8).collect();
        let mut sorted = ids.clone();
        sorted.sort_unstable();
        assert_eq!(ids, sorted);
    }
}
