//! Raw assembly view: the parsed shape of one image plus an owned copy of
//! its bytes.
//!
//! [`CilView`] is what the trim engine operates on. At load it parses the
//! CLI header, metadata root, stream directory, heaps and all table rows,
//! and records the *absolute file offset* of every structure it will later
//! address. The byte buffer is an owned clone of the input, so the caller's
//! bytes are never mutated; the parsed records are read-only after load and
//! all editing goes through the buffer.

use std::path::Path;

use crate::{
    file::{File, Section},
    metadata::{
        cor20header::Cor20Header,
        root::Root,
        streams::{Blob, Guid, Strings, TablesHeader, UserStrings},
        tables::TableId,
    },
    Result,
};

/// Absolute file offset and size of one metadata stream.
#[derive(Clone, Copy, Debug, Default)]
pub struct StreamSpan {
    /// File offset of the stream's first byte
    pub offset: usize,
    /// Stream size in bytes
    pub size: usize,
}

impl StreamSpan {
    /// The stream's byte range within the file.
    #[must_use]
    pub fn range(&self) -> std::ops::Range<usize> {
        self.offset..self.offset + self.size
    }
}

/// A fully parsed CLI image with an owned, editable byte buffer.
pub struct CilView {
    data: Vec<u8>,
    sections: Vec<Section>,
    /// The CLR 2.0 header
    pub cor20: Cor20Header,
    /// The metadata root and stream directory
    pub root: Root,
    /// The parsed tables stream
    pub tables: TablesHeader,
    /// Absolute span of the tables stream
    pub tables_span: StreamSpan,
    /// Absolute span of `#Strings`, if present
    pub strings_span: Option<StreamSpan>,
    /// Absolute span of `#US`, if present
    pub us_span: Option<StreamSpan>,
    /// Absolute span of `#Blob`, if present
    pub blob_span: Option<StreamSpan>,
    /// Absolute span of `#GUID`, if present
    pub guid_span: Option<StreamSpan>,
}

impl CilView {
    /// Load and parse an image from a file on disk.
    ///
    /// # Errors
    /// Returns an error if the file is not a CLI image or its metadata is
    /// structurally malformed.
    pub fn from_path(path: &Path) -> Result<CilView> {
        Self::from_pe(File::from_file(path)?)
    }

    /// Parse an image from caller-supplied bytes. The bytes are cloned; the
    /// input is left untouched.
    ///
    /// # Errors
    /// Returns an error if the bytes are not a CLI image or the metadata is
    /// structurally malformed.
    pub fn from_bytes(data: &[u8]) -> Result<CilView> {
        Self::from_pe(File::from_mem(data.to_vec())?)
    }

    fn from_pe(file: File) -> Result<CilView> {
        let sections = file.sections();
        let (clr_rva, clr_size) = file.clr();
        let data = file.data().to_vec();
        drop(file);

        let clr_offset = resolve_rva(&sections, clr_rva as u32)?;
        let clr_len = clr_size.max(72);
        if clr_offset + clr_len > data.len() {
            return Err(crate::Error::OutOfBounds);
        }
        let cor20 = Cor20Header::read(&data[clr_offset..clr_offset + clr_len])?;

        let meta_offset = resolve_rva(&sections, cor20.meta_data_rva)?;
        let meta_size = cor20.meta_data_size as usize;
        if meta_offset + meta_size > data.len() {
            return Err(crate::Error::OutOfBounds);
        }
        let meta_slice = &data[meta_offset..meta_offset + meta_size];
        let root = Root::read(meta_slice)?;

        let span_of = |name: &str| -> Option<StreamSpan> {
            root.stream(name).map(|header| StreamSpan {
                offset: meta_offset + header.offset as usize,
                size: header.size as usize,
            })
        };

        let strings_span = span_of("#Strings");
        let us_span = span_of("#US");
        let blob_span = span_of("#Blob");
        let guid_span = span_of("#GUID");

        let Some(tables_header) = root.tables_stream() else {
            return Err(malformed_error!("Image carries no #~ or #- stream"));
        };
        let tables_span = StreamSpan {
            offset: meta_offset + tables_header.offset as usize,
            size: tables_header.size as usize,
        };

        let tables = TablesHeader::from(&data[tables_span.range()])?;

        Ok(CilView {
            data,
            sections,
            cor20,
            root,
            tables,
            tables_span,
            strings_span,
            us_span,
            blob_span,
            guid_span,
        })
    }

    /// The image bytes.
    #[must_use]
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Mutable access to the image bytes for the trim engine.
    #[must_use]
    pub fn data_mut(&mut self) -> &mut Vec<u8> {
        &mut self.data
    }

    /// Consume the view, returning the (possibly edited) image bytes.
    #[must_use]
    pub fn into_data(self) -> Vec<u8> {
        self.data
    }

    /// The section map.
    #[must_use]
    pub fn sections(&self) -> &[Section] {
        &self.sections
    }

    /// Resolve an RVA to a file offset through the section map.
    ///
    /// # Errors
    /// Returns an error if no section contains the RVA.
    pub fn rva_to_offset(&self, rva: u32) -> Result<usize> {
        resolve_rva(&self.sections, rva)
    }

    /// Absolute file offset of row `rid` (1-based) of a table.
    #[must_use]
    pub fn row_file_offset(&self, table: TableId, rid: u32) -> Option<usize> {
        self.tables
            .row_offset(table, rid)
            .map(|offset| self.tables_span.offset + offset)
    }

    /// A `#Strings` view over the current image bytes.
    #[must_use]
    pub fn strings(&self) -> Option<Strings<'_>> {
        let span = self.strings_span?;
        Strings::from(&self.data[span.range()]).ok()
    }

    /// A `#Blob` view over the current image bytes.
    #[must_use]
    pub fn blob(&self) -> Option<Blob<'_>> {
        let span = self.blob_span?;
        Blob::from(&self.data[span.range()]).ok()
    }

    /// A `#US` view over the current image bytes.
    #[must_use]
    pub fn user_strings(&self) -> Option<UserStrings<'_>> {
        let span = self.us_span?;
        UserStrings::from(&self.data[span.range()]).ok()
    }

    /// A `#GUID` view over the current image bytes.
    #[must_use]
    pub fn guids(&self) -> Option<Guid<'_>> {
        let span = self.guid_span?;
        Guid::from(&self.data[span.range()]).ok()
    }
}

fn resolve_rva(sections: &[Section], rva: u32) -> Result<usize> {
    for section in sections {
        if let Some(offset) = section.resolve_rva(rva) {
            return Ok(offset);
        }
    }

    Err(malformed_error!(
        "RVA could not be converted to offset - {:#x}",
        rva
    ))
}
