//! Crafted CLI image builder for integration tests.
//!
//! Assembles a minimal but structurally valid PE32 image: DOS/COFF/optional
//! headers, one `.text` section, a COR20 header, method bodies, and a
//! metadata block with `#~`, `#Strings`, `#US`, `#GUID` and `#Blob`
//! streams. All heap and table indices are 2 bytes (row counts stay tiny),
//! which keeps the encoded rows easy to write by hand.
//!
//! Layout within `.text` (RVA 0x1000, file offset 0x200):
//! COR20 header first, then the method bodies 4-byte aligned, then the
//! metadata root.
#![allow(dead_code)]

use std::collections::BTreeMap;

const FILE_ALIGNMENT: u32 = 0x200;
const SECTION_ALIGNMENT: u32 = 0x1000;
const SIZE_OF_HEADERS: u32 = 0x200;
const TEXT_RVA: u32 = 0x1000;
const COR20_SIZE: u32 = 72;
const BODIES_RVA: u32 = TEXT_RVA + COR20_SIZE;

// Table ids used by the builder
pub const T_MODULE: u8 = 0x00;
pub const T_TYPEREF: u8 = 0x01;
pub const T_TYPEDEF: u8 = 0x02;
pub const T_FIELD: u8 = 0x04;
pub const T_METHODDEF: u8 = 0x06;
pub const T_PARAM: u8 = 0x08;
pub const T_INTERFACEIMPL: u8 = 0x09;
pub const T_MEMBERREF: u8 = 0x0A;
pub const T_CUSTOMATTRIBUTE: u8 = 0x0C;
pub const T_STANDALONESIG: u8 = 0x11;
pub const T_TYPESPEC: u8 = 0x1B;
pub const T_ASSEMBLY: u8 = 0x20;
pub const T_ASSEMBLYREF: u8 = 0x23;
pub const T_NESTEDCLASS: u8 = 0x29;

/// Builder over heaps, encoded table rows and method bodies.
pub struct ImageBuilder {
    strings: Vec<u8>,
    blob: Vec<u8>,
    us: Vec<u8>,
    guid: Vec<u8>,
    /// Encoded rows per table id
    tables: BTreeMap<u8, Vec<Vec<u8>>>,
    /// Raw method bodies, placed after the COR20 header in add order
    bodies: Vec<Vec<u8>>,
    /// (table id, row index, byte offset in row) -> body index, patched to
    /// the body's RVA once the layout is known
    rva_patches: Vec<(usize, usize, usize)>,
}

impl ImageBuilder {
    pub fn new() -> ImageBuilder {
        ImageBuilder {
            strings: vec![0],
            blob: vec![0],
            us: vec![0],
            guid: vec![0x11; 16],
            tables: BTreeMap::new(),
            bodies: Vec::new(),
            rva_patches: Vec::new(),
        }
    }

    // ── Heaps ──────────────────────────────────────────────────────────

    /// Add a NUL-terminated string, returning its heap offset.
    pub fn add_string(&mut self, value: &str) -> u32 {
        let offset = self.strings.len() as u32;
        self.strings.extend_from_slice(value.as_bytes());
        self.strings.push(0);
        offset
    }

    /// Add a blob entry (single-byte length prefix), returning its offset.
    pub fn add_blob(&mut self, data: &[u8]) -> u32 {
        assert!(data.len() < 0x80, "test blobs use the 1-byte length form");
        let offset = self.blob.len() as u32;
        self.blob.push(data.len() as u8);
        self.blob.extend_from_slice(data);
        offset
    }

    /// Add a user string (UTF-16 plus kind byte), returning its offset.
    pub fn add_user_string(&mut self, value: &str) -> u32 {
        let offset = self.us.len() as u32;
        let mut data: Vec<u8> = value
            .encode_utf16()
            .flat_map(|unit| unit.to_le_bytes())
            .collect();
        data.push(0); // kind byte
        assert!(data.len() < 0x80);
        self.us.push(data.len() as u8);
        self.us.extend_from_slice(&data);
        offset
    }

    /// Add a raw method body, returning its body index for `add_method`.
    pub fn add_body(&mut self, body: Vec<u8>) -> usize {
        self.bodies.push(body);
        self.bodies.len() - 1
    }

    // ── Rows ───────────────────────────────────────────────────────────

    fn push_row(&mut self, table: u8, row: Vec<u8>) -> u32 {
        let rows = self.tables.entry(table).or_default();
        rows.push(row);
        rows.len() as u32
    }

    pub fn add_module(&mut self, name: &str) {
        let name = self.add_string(name);
        let mut row = Vec::new();
        row.extend_from_slice(&0u16.to_le_bytes()); // generation
        row.extend_from_slice(&(name as u16).to_le_bytes());
        row.extend_from_slice(&1u16.to_le_bytes()); // mvid
        row.extend_from_slice(&0u16.to_le_bytes()); // encid
        row.extend_from_slice(&0u16.to_le_bytes()); // encbaseid
        self.push_row(T_MODULE, row);
    }

    pub fn add_assembly(&mut self, name: &str) {
        let name = self.add_string(name);
        let mut row = Vec::new();
        row.extend_from_slice(&0x8004u32.to_le_bytes()); // hash alg (SHA1)
        row.extend_from_slice(&1u16.to_le_bytes()); // major
        row.extend_from_slice(&0u16.to_le_bytes()); // minor
        row.extend_from_slice(&0u16.to_le_bytes()); // build
        row.extend_from_slice(&0u16.to_le_bytes()); // revision
        row.extend_from_slice(&0u32.to_le_bytes()); // flags
        row.extend_from_slice(&0u16.to_le_bytes()); // public key
        row.extend_from_slice(&(name as u16).to_le_bytes());
        row.extend_from_slice(&0u16.to_le_bytes()); // culture
        self.push_row(T_ASSEMBLY, row);
    }

    pub fn add_assembly_ref(&mut self, name: &str) -> u32 {
        let name = self.add_string(name);
        let mut row = Vec::new();
        row.extend_from_slice(&4u16.to_le_bytes()); // major
        row.extend_from_slice(&0u16.to_le_bytes());
        row.extend_from_slice(&0u16.to_le_bytes());
        row.extend_from_slice(&0u16.to_le_bytes());
        row.extend_from_slice(&0u32.to_le_bytes()); // flags
        row.extend_from_slice(&0u16.to_le_bytes()); // public key or token
        row.extend_from_slice(&(name as u16).to_le_bytes());
        row.extend_from_slice(&0u16.to_le_bytes()); // culture
        row.extend_from_slice(&0u16.to_le_bytes()); // hash value
        self.push_row(T_ASSEMBLYREF, row)
    }

    pub fn add_type_ref(&mut self, assembly_ref_rid: u32, namespace: &str, name: &str) -> u32 {
        let name = self.add_string(name);
        let namespace = if namespace.is_empty() {
            0
        } else {
            self.add_string(namespace)
        };

        let mut row = Vec::new();
        // ResolutionScope: AssemblyRef is tag 2 of 4
        row.extend_from_slice(&(((assembly_ref_rid as u16) << 2) | 2).to_le_bytes());
        row.extend_from_slice(&(name as u16).to_le_bytes());
        row.extend_from_slice(&(namespace as u16).to_le_bytes());
        self.push_row(T_TYPEREF, row)
    }

    /// Add a TypeDef row. `extends` is an already-encoded TypeDefOrRef
    /// value (see [`typedef_or_ref`]); `field_list` / `method_list` are
    /// 1-based indices into the Field / MethodDef tables.
    pub fn add_type_def(
        &mut self,
        namespace: &str,
        name: &str,
        extends: u16,
        field_list: u32,
        method_list: u32,
    ) -> u32 {
        let name = self.add_string(name);
        let namespace = if namespace.is_empty() {
            0
        } else {
            self.add_string(namespace)
        };

        let mut row = Vec::new();
        row.extend_from_slice(&0u32.to_le_bytes()); // flags
        row.extend_from_slice(&(name as u16).to_le_bytes());
        row.extend_from_slice(&(namespace as u16).to_le_bytes());
        row.extend_from_slice(&extends.to_le_bytes());
        row.extend_from_slice(&(field_list as u16).to_le_bytes());
        row.extend_from_slice(&(method_list as u16).to_le_bytes());
        self.push_row(T_TYPEDEF, row)
    }

    /// Add a MethodDef row. The RVA is patched to the placed body's RVA at
    /// build time; `None` encodes an abstract/extern method (RVA 0).
    pub fn add_method(
        &mut self,
        name: &str,
        body: Option<usize>,
        signature: &[u8],
        param_list: u32,
    ) -> u32 {
        let name = self.add_string(name);
        let signature = self.add_blob(signature);

        let mut row = Vec::new();
        row.extend_from_slice(&0u32.to_le_bytes()); // rva, patched below
        row.extend_from_slice(&0u16.to_le_bytes()); // impl_flags
        row.extend_from_slice(&0x0006u16.to_le_bytes()); // flags: public
        row.extend_from_slice(&(name as u16).to_le_bytes());
        row.extend_from_slice(&(signature as u16).to_le_bytes());
        row.extend_from_slice(&(param_list as u16).to_le_bytes());
        let rid = self.push_row(T_METHODDEF, row);

        if let Some(body_index) = body {
            self.rva_patches
                .push((T_METHODDEF as usize, rid as usize - 1, body_index));
        }
        rid
    }

    pub fn add_field(&mut self, name: &str, signature: &[u8]) -> u32 {
        let name = self.add_string(name);
        let signature = self.add_blob(signature);

        let mut row = Vec::new();
        row.extend_from_slice(&0x0006u16.to_le_bytes()); // flags: public
        row.extend_from_slice(&(name as u16).to_le_bytes());
        row.extend_from_slice(&(signature as u16).to_le_bytes());
        self.push_row(T_FIELD, row)
    }

    pub fn add_param(&mut self, sequence: u16, name: &str) -> u32 {
        let name = self.add_string(name);
        let mut row = Vec::new();
        row.extend_from_slice(&0u16.to_le_bytes()); // flags
        row.extend_from_slice(&sequence.to_le_bytes());
        row.extend_from_slice(&(name as u16).to_le_bytes());
        self.push_row(T_PARAM, row)
    }

    pub fn add_member_ref(&mut self, type_ref_rid: u32, name: &str, signature: &[u8]) -> u32 {
        let name = self.add_string(name);
        let signature = self.add_blob(signature);

        let mut row = Vec::new();
        // MemberRefParent: TypeRef is tag 1 of 5 (3 tag bits)
        row.extend_from_slice(&(((type_ref_rid as u16) << 3) | 1).to_le_bytes());
        row.extend_from_slice(&(name as u16).to_le_bytes());
        row.extend_from_slice(&(signature as u16).to_le_bytes());
        self.push_row(T_MEMBERREF, row)
    }

    /// Add a CustomAttribute row. `parent` is an already-encoded
    /// HasCustomAttribute value (see the `ca_parent_*` helpers); the
    /// constructor is a MemberRef.
    pub fn add_custom_attribute(&mut self, parent: u16, ctor_member_ref: u32, value: &[u8]) -> u32 {
        let value = self.add_blob(value);

        let mut row = Vec::new();
        row.extend_from_slice(&parent.to_le_bytes());
        // CustomAttributeType: MemberRef is tag 3 (3 tag bits)
        row.extend_from_slice(&(((ctor_member_ref as u16) << 3) | 3).to_le_bytes());
        row.extend_from_slice(&(value as u16).to_le_bytes());
        self.push_row(T_CUSTOMATTRIBUTE, row)
    }

    pub fn add_type_spec(&mut self, signature: &[u8]) -> u32 {
        let signature = self.add_blob(signature);
        let mut row = Vec::new();
        row.extend_from_slice(&(signature as u16).to_le_bytes());
        self.push_row(T_TYPESPEC, row)
    }

    pub fn add_stand_alone_sig(&mut self, signature: &[u8]) -> u32 {
        let signature = self.add_blob(signature);
        let mut row = Vec::new();
        row.extend_from_slice(&(signature as u16).to_le_bytes());
        self.push_row(T_STANDALONESIG, row)
    }

    pub fn add_nested_class(&mut self, nested_rid: u32, enclosing_rid: u32) {
        let mut row = Vec::new();
        row.extend_from_slice(&(nested_rid as u16).to_le_bytes());
        row.extend_from_slice(&(enclosing_rid as u16).to_le_bytes());
        self.push_row(T_NESTEDCLASS, row);
    }

    pub fn add_interface_impl(&mut self, class_rid: u32, interface: u16) -> u32 {
        let mut row = Vec::new();
        row.extend_from_slice(&(class_rid as u16).to_le_bytes());
        row.extend_from_slice(&interface.to_le_bytes());
        self.push_row(T_INTERFACEIMPL, row)
    }

    // ── Assembly ───────────────────────────────────────────────────────

    /// Produce the finished PE image.
    pub fn build(mut self) -> Vec<u8> {
        // Place the bodies and patch MethodDef RVAs
        let mut body_rvas = Vec::with_capacity(self.bodies.len());
        let mut body_block: Vec<u8> = Vec::new();
        for body in &self.bodies {
            while body_block.len() % 4 != 0 {
                body_block.push(0);
            }
            body_rvas.push(BODIES_RVA + body_block.len() as u32);
            body_block.extend_from_slice(body);
        }

        for &(table, row_index, body_index) in &self.rva_patches {
            let row = &mut self.tables.get_mut(&(table as u8)).unwrap()[row_index];
            row[0..4].copy_from_slice(&body_rvas[body_index].to_le_bytes());
        }

        let metadata = self.build_metadata();
        let metadata_rva = align4(BODIES_RVA as usize + body_block.len()) as u32;

        build_pe(&body_block, &metadata, metadata_rva)
    }

    fn build_metadata(&self) -> Vec<u8> {
        let tables_stream = self.build_tables_stream();

        let streams: [(&str, &[u8]); 5] = [
            ("#~", &tables_stream),
            ("#Strings", &self.strings),
            ("#US", &self.us),
            ("#GUID", &self.guid),
            ("#Blob", &self.blob),
        ];

        // Root header: signature .. version, flags, count, directory
        let version = b"v4.0.30319\0\0"; // 12 bytes, already 4-aligned
        let mut directory_size = 0;
        for (name, _) in &streams {
            directory_size += 8 + align4(name.len() + 1);
        }
        let header_size = 16 + version.len() + 4 + directory_size;

        let mut root = Vec::new();
        root.extend_from_slice(&0x424A_5342u32.to_le_bytes());
        root.extend_from_slice(&1u16.to_le_bytes()); // major
        root.extend_from_slice(&1u16.to_le_bytes()); // minor
        root.extend_from_slice(&0u32.to_le_bytes()); // reserved
        root.extend_from_slice(&(version.len() as u32).to_le_bytes());
        root.extend_from_slice(version);
        root.extend_from_slice(&0u16.to_le_bytes()); // flags
        root.extend_from_slice(&(streams.len() as u16).to_le_bytes());

        let mut stream_offset = align4(header_size);
        for (name, data) in &streams {
            root.extend_from_slice(&(stream_offset as u32).to_le_bytes());
            root.extend_from_slice(&(data.len() as u32).to_le_bytes());
            root.extend_from_slice(name.as_bytes());
            root.push(0);
            while root.len() % 4 != 0 {
                root.push(0);
            }
            stream_offset += align4(data.len());
        }

        assert_eq!(root.len(), header_size);

        let mut metadata = root;
        for (_, data) in &streams {
            while metadata.len() % 4 != 0 {
                metadata.push(0);
            }
            metadata.extend_from_slice(data);
        }
        while metadata.len() % 4 != 0 {
            metadata.push(0);
        }

        metadata
    }

    fn build_tables_stream(&self) -> Vec<u8> {
        let mut valid = 0u64;
        for &table in self.tables.keys() {
            valid |= 1 << table;
        }

        let mut stream = Vec::new();
        stream.extend_from_slice(&0u32.to_le_bytes()); // reserved
        stream.push(2); // major
        stream.push(0); // minor
        stream.push(0); // heap sizes: everything small
        stream.push(1); // reserved
        stream.extend_from_slice(&valid.to_le_bytes());
        stream.extend_from_slice(&0u64.to_le_bytes()); // sorted

        for rows in self.tables.values() {
            stream.extend_from_slice(&(rows.len() as u32).to_le_bytes());
        }
        for rows in self.tables.values() {
            for row in rows {
                stream.extend_from_slice(row);
            }
        }

        stream
    }
}

/// Encode a TypeDefOrRef coded index: tag 0 = TypeDef, 1 = TypeRef,
/// 2 = TypeSpec.
pub fn typedef_or_ref(tag: u16, rid: u32) -> u16 {
    ((rid as u16) << 2) | tag
}

/// HasCustomAttribute value for a MethodDef parent (tag 0 of 22).
pub fn ca_parent_method(rid: u32) -> u16 {
    (rid as u16) << 5
}

/// HasCustomAttribute value for a TypeDef parent (tag 3 of 22).
pub fn ca_parent_type(rid: u32) -> u16 {
    ((rid as u16) << 5) | 3
}

/// A tiny-format body wrapping the given code bytes.
pub fn tiny_body(code: &[u8]) -> Vec<u8> {
    assert!(code.len() < 64, "tiny bodies hold at most 63 code bytes");
    let mut body = vec![((code.len() as u8) << 2) | 0b10];
    body.extend_from_slice(code);
    body
}

/// `ldstr <us_offset>; ret`
pub fn ldstr_ret_body(us_offset: u32) -> Vec<u8> {
    let token = 0x7000_0000 | us_offset;
    let mut code = vec![0x72];
    code.extend_from_slice(&token.to_le_bytes());
    code.push(0x2A);
    tiny_body(&code)
}

/// `call <token>; ret`
pub fn call_ret_body(token: u32) -> Vec<u8> {
    let mut code = vec![0x28];
    code.extend_from_slice(&token.to_le_bytes());
    code.push(0x2A);
    tiny_body(&code)
}

/// Default method signature blob: `default, 0 params, returns void`.
pub const SIG_VOID_NOARGS: &[u8] = &[0x00, 0x00, 0x01];

fn align4(value: usize) -> usize {
    (value + 3) & !3
}

/// Wrap a body block and metadata into a single-section PE32 image; the
/// layout mirrors a minimal managed executable with `.text` at RVA 0x1000
/// mapping to file offset 0x200.
fn build_pe(bodies: &[u8], metadata: &[u8], metadata_rva: u32) -> Vec<u8> {
    let metadata_size = metadata.len() as u32;
    let text_virtual_size = metadata_rva - TEXT_RVA + metadata_size;
    let text_raw_size = (text_virtual_size + FILE_ALIGNMENT - 1) & !(FILE_ALIGNMENT - 1);
    let size_of_image =
        TEXT_RVA + ((text_virtual_size + SECTION_ALIGNMENT - 1) & !(SECTION_ALIGNMENT - 1));

    let total_size = SIZE_OF_HEADERS as usize + text_raw_size as usize;
    let mut pe = vec![0u8; total_size];

    // DOS header
    pe[0] = 0x4D;
    pe[1] = 0x5A;
    pe[0x3C..0x40].copy_from_slice(&0x80u32.to_le_bytes());

    // PE signature
    pe[0x80..0x84].copy_from_slice(b"PE\0\0");

    // COFF header
    pe[0x84..0x86].copy_from_slice(&0x014Cu16.to_le_bytes()); // i386
    pe[0x86..0x88].copy_from_slice(&1u16.to_le_bytes()); // one section
    pe[0x94..0x96].copy_from_slice(&224u16.to_le_bytes()); // optional header size
    pe[0x96..0x98].copy_from_slice(&0x2102u16.to_le_bytes()); // EXE | DLL | 32BIT

    // Optional header (PE32)
    let opt = 0x98;
    pe[opt..opt + 2].copy_from_slice(&0x10Bu16.to_le_bytes());
    pe[opt + 2] = 14; // linker major
    pe[opt + 4..opt + 8].copy_from_slice(&text_raw_size.to_le_bytes()); // SizeOfCode
    pe[opt + 20..opt + 24].copy_from_slice(&TEXT_RVA.to_le_bytes()); // BaseOfCode
    pe[opt + 28..opt + 32].copy_from_slice(&0x0040_0000u32.to_le_bytes()); // ImageBase
    pe[opt + 32..opt + 36].copy_from_slice(&SECTION_ALIGNMENT.to_le_bytes());
    pe[opt + 36..opt + 40].copy_from_slice(&FILE_ALIGNMENT.to_le_bytes());
    pe[opt + 40..opt + 42].copy_from_slice(&6u16.to_le_bytes()); // OS major
    pe[opt + 48..opt + 50].copy_from_slice(&6u16.to_le_bytes()); // subsystem major
    pe[opt + 56..opt + 60].copy_from_slice(&size_of_image.to_le_bytes());
    pe[opt + 60..opt + 64].copy_from_slice(&SIZE_OF_HEADERS.to_le_bytes());
    pe[opt + 68..opt + 70].copy_from_slice(&3u16.to_le_bytes()); // console subsystem
    pe[opt + 72..opt + 76].copy_from_slice(&0x10_0000u32.to_le_bytes()); // stack reserve
    pe[opt + 76..opt + 80].copy_from_slice(&0x1000u32.to_le_bytes());
    pe[opt + 80..opt + 84].copy_from_slice(&0x10_0000u32.to_le_bytes()); // heap reserve
    pe[opt + 84..opt + 88].copy_from_slice(&0x1000u32.to_le_bytes());
    pe[opt + 92..opt + 96].copy_from_slice(&16u32.to_le_bytes()); // dir count

    // CLR runtime header directory (index 14)
    let clr_dir = opt + 96 + 14 * 8;
    pe[clr_dir..clr_dir + 4].copy_from_slice(&TEXT_RVA.to_le_bytes());
    pe[clr_dir + 4..clr_dir + 8].copy_from_slice(&COR20_SIZE.to_le_bytes());

    // Section header
    let section = opt + 224;
    pe[section..section + 5].copy_from_slice(b".text");
    pe[section + 8..section + 12].copy_from_slice(&text_virtual_size.to_le_bytes());
    pe[section + 12..section + 16].copy_from_slice(&TEXT_RVA.to_le_bytes());
    pe[section + 16..section + 20].copy_from_slice(&text_raw_size.to_le_bytes());
    pe[section + 20..section + 24].copy_from_slice(&SIZE_OF_HEADERS.to_le_bytes());
    pe[section + 36..section + 40].copy_from_slice(&0x6000_0020u32.to_le_bytes()); // code|exec|read

    // COR20 header at the section start
    let cor20 = SIZE_OF_HEADERS as usize;
    pe[cor20..cor20 + 4].copy_from_slice(&COR20_SIZE.to_le_bytes());
    pe[cor20 + 4..cor20 + 6].copy_from_slice(&2u16.to_le_bytes());
    pe[cor20 + 6..cor20 + 8].copy_from_slice(&5u16.to_le_bytes());
    pe[cor20 + 8..cor20 + 12].copy_from_slice(&metadata_rva.to_le_bytes());
    pe[cor20 + 12..cor20 + 16].copy_from_slice(&metadata_size.to_le_bytes());
    pe[cor20 + 16..cor20 + 20].copy_from_slice(&1u32.to_le_bytes()); // ILONLY

    // Bodies, then metadata, at their RVAs
    let bodies_offset = cor20 + COR20_SIZE as usize;
    pe[bodies_offset..bodies_offset + bodies.len()].copy_from_slice(bodies);

    let metadata_offset = SIZE_OF_HEADERS as usize + (metadata_rva - TEXT_RVA) as usize;
    pe[metadata_offset..metadata_offset + metadata.len()].copy_from_slice(metadata);

    pe
}
