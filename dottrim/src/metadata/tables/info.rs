//! Row counts and index widths for the tables stream.
//!
//! Index widths are a global property of the image: a table index is 2 bytes
//! unless the target table has 2^16 rows or more, a heap index is 2 bytes
//! unless the HeapSizes bit for that heap is set, and a coded index is 2
//! bytes unless the widest candidate row count shifted by the tag bits
//! overflows 16 bits. All widths are computed once from the header, before
//! any byte of the image is mutated, and are never recomputed.

use strum::{EnumCount, IntoEnumIterator};

use crate::{
    file::io::{read_le, read_le_at},
    metadata::tables::{CodedIndexType, TableId},
    Error::OutOfBounds,
    Result,
};

/// Row count and derived index width for one table.
#[derive(Clone, Copy, Default, PartialEq, Debug)]
pub struct TableRowInfo {
    /// The count of rows in this table
    pub rows: u32,
    /// Number of bits required to represent any valid row index
    pub bits: u8,
    /// True when indexes into this table take 4 bytes instead of 2
    pub is_large: bool,
}

impl TableRowInfo {
    /// Derive the index width information for a table with `rows` rows.
    #[must_use]
    pub fn new(rows: u32) -> Self {
        let bits = if rows == 0 {
            1
        } else {
            (32 - rows.leading_zeros()) as u8
        };

        Self {
            rows,
            bits,
            is_large: rows > u32::from(u16::MAX),
        }
    }
}

/// Row counts and index widths for every table, plus the heap width flags.
#[derive(Clone, Default)]
pub struct TableInfo {
    rows: Vec<TableRowInfo>,
    coded_indexes: Vec<u8>,
    is_large_index_str: bool,
    is_large_index_guid: bool,
    is_large_index_blob: bool,
}

impl TableInfo {
    /// Build a `TableInfo` from the tables-stream header bytes.
    ///
    /// ## Arguments
    /// * 'data' - The tables stream, starting at its 24-byte header
    /// * '`valid_bitvec`' - The `Valid` vector naming the present tables
    ///
    /// # Errors
    /// Returns an error if the header is truncated.
    pub fn new(data: &[u8], valid_bitvec: u64) -> Result<Self> {
        let mut rows = vec![TableRowInfo::default(); TableId::GenericParamConstraint as usize + 1];
        let mut next_row_offset = 24;

        for table_id in TableId::iter() {
            if (valid_bitvec & (1 << table_id as usize)) == 0 {
                continue;
            }

            if data.len() < next_row_offset + 4 {
                return Err(OutOfBounds);
            }

            let row_count = read_le_at::<u32>(data, &mut next_row_offset)?;
            rows[table_id as usize] = TableRowInfo::new(row_count);
        }

        let heap_size_flags = read_le::<u8>(&data[6..])?;
        let mut info = TableInfo {
            rows,
            coded_indexes: vec![0; CodedIndexType::COUNT],
            is_large_index_str: heap_size_flags & 1 != 0,
            is_large_index_guid: heap_size_flags & 2 != 0,
            is_large_index_blob: heap_size_flags & 4 != 0,
        };

        info.calculate_coded_index_bits();

        Ok(info)
    }

    /// Construct a `TableInfo` directly from (table, row count) pairs.
    ///
    /// Used by unit tests and the crafted-image test builder.
    #[must_use]
    pub fn new_test(
        valid_tables: &[(TableId, u32)],
        large_str: bool,
        large_blob: bool,
        large_guid: bool,
    ) -> Self {
        let mut info = TableInfo {
            rows: vec![TableRowInfo::default(); TableId::GenericParamConstraint as usize + 1],
            coded_indexes: vec![0; CodedIndexType::COUNT],
            is_large_index_str: large_str,
            is_large_index_guid: large_guid,
            is_large_index_blob: large_blob,
        };

        for (table, count) in valid_tables {
            info.rows[*table as usize] = TableRowInfo::new(*count);
        }

        info.calculate_coded_index_bits();
        info
    }

    /// Returns true when indexes into the given table take 4 bytes.
    #[must_use]
    pub fn is_large(&self, id: TableId) -> bool {
        self.rows[id as usize].is_large
    }

    /// Width of `#Strings` heap indexes: true means 4 bytes.
    #[must_use]
    pub fn is_large_str(&self) -> bool {
        self.is_large_index_str
    }

    /// Width of `#GUID` heap indexes: true means 4 bytes.
    #[must_use]
    pub fn is_large_guid(&self) -> bool {
        self.is_large_index_guid
    }

    /// Width of `#Blob` heap indexes: true means 4 bytes.
    #[must_use]
    pub fn is_large_blob(&self) -> bool {
        self.is_large_index_blob
    }

    /// Byte width of a `#Strings` heap index.
    #[must_use]
    pub fn str_bytes(&self) -> u8 {
        if self.is_large_index_str {
            4
        } else {
            2
        }
    }

    /// Byte width of a `#GUID` heap index.
    #[must_use]
    pub fn guid_bytes(&self) -> u8 {
        if self.is_large_index_guid {
            4
        } else {
            2
        }
    }

    /// Byte width of a `#Blob` heap index.
    #[must_use]
    pub fn blob_bytes(&self) -> u8 {
        if self.is_large_index_blob {
            4
        } else {
            2
        }
    }

    /// Row count and width information for a specific table.
    #[must_use]
    pub fn get(&self, table: TableId) -> &TableRowInfo {
        &self.rows[table as usize]
    }

    /// Row count of a specific table (0 when absent).
    #[must_use]
    pub fn rows(&self, table: TableId) -> u32 {
        self.rows[table as usize].rows
    }

    /// Byte width of an index into a specific table.
    #[must_use]
    pub fn table_index_bytes(&self, table_id: TableId) -> u8 {
        if self.rows[table_id as usize].is_large {
            4
        } else {
            2
        }
    }

    /// Cached bit width of a coded index encoding.
    #[must_use]
    pub fn coded_index_bits(&self, coded_index_type: CodedIndexType) -> u8 {
        self.coded_indexes[coded_index_type as usize]
    }

    /// Cached byte width of a coded index encoding.
    #[must_use]
    pub fn coded_index_bytes(&self, coded_index_type: CodedIndexType) -> u8 {
        if self.coded_indexes[coded_index_type as usize] > 16 {
            4
        } else {
            2
        }
    }

    fn calculate_coded_index_bits(&mut self) {
        for coded_index in CodedIndexType::iter() {
            let max_bits = coded_index
                .tables()
                .iter()
                .map(|table| self.rows[*table as usize].bits)
                .max()
                .unwrap_or(1);

            self.coded_indexes[coded_index as usize] = max_bits + coded_index.tag_bits();
        }
    }
}
