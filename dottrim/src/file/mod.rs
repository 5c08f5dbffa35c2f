//! PE file abstraction for .NET binaries.
//!
//! [`File`] wraps a goblin-parsed PE image loaded either from disk
//! (memory-mapped via [`Physical`]) or from a caller-supplied buffer
//! ([`Memory`]). It validates the presence of the CLR runtime header (data
//! directory index 14) at load time and provides the address translation the
//! metadata layer is built on: RVA to file offset through the section table.
//!
//! The trim engine does not mutate through this type. It copies the bytes
//! into its own buffer and keeps an owned [`Section`] map, so the image
//! under edit never aliases the input.

pub mod io;
pub mod parser;

mod memory;
mod physical;

use std::path::Path;

use crate::{
    Error::{Empty, GoblinErr},
    Result,
};
use goblin::pe::PE;
use memory::Memory;
use ouroboros::self_referencing;
use physical::Physical;

/// Backend trait for image data sources.
///
/// Abstracts over the source of PE bytes, allowing both on-disk and in-memory
/// representations behind one interface.
pub trait Backend: Send + Sync {
    /// Returns a bounds-checked slice of the data at the given offset and length.
    ///
    /// # Errors
    /// Returns an error if the requested range is out of bounds.
    fn data_slice(&self, offset: usize, len: usize) -> Result<&[u8]>;

    /// Returns the entire data buffer.
    fn data(&self) -> &[u8];

    /// Returns the total length of the data buffer.
    fn len(&self) -> usize;
}

/// One entry of the section map, owned and independent of the input bytes.
///
/// `virtual_address` / `virtual_size` describe the in-memory span,
/// `pointer_to_raw_data` / `size_of_raw_data` the on-disk span. An RVA inside
/// `[virtual_address, virtual_address + virtual_size)` resolves to
/// `pointer_to_raw_data + (rva - virtual_address)`.
#[derive(Debug, Clone)]
pub struct Section {
    /// Section name, NUL-padded to 8 bytes in the image
    pub name: [u8; 8],
    /// RVA at which the section is mapped
    pub virtual_address: u32,
    /// Size of the section in memory
    pub virtual_size: u32,
    /// File offset of the section's raw data
    pub pointer_to_raw_data: u32,
    /// Size of the section's raw data on disk
    pub size_of_raw_data: u32,
}

impl Section {
    /// Resolve an RVA to a file offset if it falls inside this section.
    #[must_use]
    pub fn resolve_rva(&self, rva: u32) -> Option<usize> {
        let end = self.virtual_address.checked_add(self.virtual_size)?;
        if rva >= self.virtual_address && rva < end {
            Some((rva - self.virtual_address) as usize + self.pointer_to_raw_data as usize)
        } else {
            None
        }
    }
}

#[self_referencing]
/// A loaded PE file carrying a CLR runtime header.
///
/// The parsed [`goblin::pe::PE`] borrows from the backend; `ouroboros` ties
/// the two lifetimes together so the file can be moved as one value.
pub struct File {
    /// Holds the input data, either as memory buffer or memory-mapped file
    data: Box<dyn Backend>,
    /// The parsed PE structure, referencing the data
    #[borrows(data)]
    #[not_covariant]
    pe: PE<'this>,
}

impl File {
    /// Loads a PE file from the given path.
    ///
    /// # Errors
    /// Returns an error if the file cannot be read, is not valid PE, or does
    /// not carry a CLR runtime header.
    pub fn from_file(file: &Path) -> Result<File> {
        Self::load(Physical::new(file)?)
    }

    /// Loads a PE file from a memory buffer.
    ///
    /// # Errors
    /// Returns an error if the buffer is empty, not valid PE, or the image
    /// does not carry a CLR runtime header.
    pub fn from_mem(data: Vec<u8>) -> Result<File> {
        Self::load(Memory::new(data))
    }

    fn load<T: Backend + 'static>(data: T) -> Result<File> {
        if data.len() == 0 {
            return Err(Empty);
        }

        let data = Box::new(data);

        File::try_new(data, |data| {
            let data = data.as_ref();
            match PE::parse(data.data()) {
                Ok(pe) => match pe.header.optional_header {
                    Some(optional_header) => {
                        if optional_header
                            .data_directories
                            .get_clr_runtime_header()
                            .is_none()
                        {
                            Err(malformed_error!(
                                "File does not have a CLR runtime header directory"
                            ))
                        } else {
                            Ok(pe)
                        }
                    }
                    None => Err(malformed_error!("File does not have an OptionalHeader")),
                },
                Err(error) => Err(GoblinErr(error)),
            }
        })
    }

    /// Returns the total size of the loaded file in bytes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.borrow_data().len()
    }

    /// Returns `true` if the file has a length of zero.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns the entire file contents.
    #[must_use]
    pub fn data(&self) -> &[u8] {
        self.borrow_data().data()
    }

    /// Returns the RVA and size of the CLR runtime header.
    #[must_use]
    pub fn clr(&self) -> (usize, usize) {
        self.with_pe(|pe| {
            // Presence was validated during load
            match pe.header.optional_header {
                Some(optional_header) => {
                    match optional_header.data_directories.get_clr_runtime_header() {
                        Some(clr) => (clr.virtual_address as usize, clr.size as usize),
                        None => (0, 0),
                    }
                }
                None => (0, 0),
            }
        })
    }

    /// Returns the section map as owned entries.
    #[must_use]
    pub fn sections(&self) -> Vec<Section> {
        self.with_pe(|pe| {
            pe.sections
                .iter()
                .map(|section| Section {
                    name: section.name,
                    virtual_address: section.virtual_address,
                    virtual_size: section.virtual_size,
                    pointer_to_raw_data: section.pointer_to_raw_data,
                    size_of_raw_data: section.size_of_raw_data,
                })
                .collect()
        })
    }

    /// Converts a relative virtual address to a file offset.
    ///
    /// # Errors
    /// Returns an error if no section contains the RVA.
    pub fn rva_to_offset(&self, rva: usize) -> Result<usize> {
        let rva = u32::try_from(rva)
            .map_err(|_| malformed_error!("RVA too large to fit in u32: {}", rva))?;

        self.with_pe(|pe| {
            for section in &pe.sections {
                let Some(section_end) = section.virtual_address.checked_add(section.virtual_size)
                else {
                    return Err(malformed_error!(
                        "Section malformed, causing integer overflow - {} + {}",
                        section.virtual_address,
                        section.virtual_size
                    ));
                };

                if rva >= section.virtual_address && rva < section_end {
                    return Ok((rva - section.virtual_address) as usize
                        + section.pointer_to_raw_data as usize);
                }
            }

            Err(malformed_error!(
                "RVA could not be converted to offset - {}",
                rva
            ))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn load_empty() {
        assert!(matches!(File::from_mem(Vec::new()), Err(Empty)));
    }

    #[test]
    fn load_invalid() {
        assert!(File::from_mem(vec![0x4D, 0x5A, 0x00, 0x00]).is_err());
    }

    #[test]
    fn section_resolve() {
        let section = Section {
            name: *b".text\0\0\0",
            virtual_address: 0x1000,
            virtual_size: 0x800,
            pointer_to_raw_data: 0x200,
            size_of_raw_data: 0x800,
        };

        assert_eq!(section.resolve_rva(0x1000), Some(0x200));
        assert_eq!(section.resolve_rva(0x1048), Some(0x248));
        assert_eq!(section.resolve_rva(0x17FF), Some(0x9FF));
        assert_eq!(section.resolve_rva(0x1800), None);
        assert_eq!(section.resolve_rva(0x0FFF), None);
    }
}
