//! Stream header entries of the metadata root's stream directory.
//!
//! # Reference
//! - [ECMA-335 II.24.2.2](https://ecma-international.org/wp-content/uploads/ECMA-335_6th_edition_june_2012.pdf)

use crate::{file::io::read_le, Error::OutOfBounds, Result};

/// One entry of the stream directory: the stream's offset (relative to the
/// metadata root), its size, and its NUL-terminated name padded to a 4-byte
/// boundary.
pub struct StreamHeader {
    /// Offset of the stream relative to the metadata root
    pub offset: u32,
    /// Size of the stream in bytes
    pub size: u32,
    /// Name of the stream
    pub name: String,
}

impl StreamHeader {
    /// Read a `StreamHeader` from a byte slice.
    ///
    /// # Arguments
    /// * 'data' - The byte slice, positioned at the start of the header
    ///
    /// # Errors
    /// Returns an error if the data is too short or the name is not one of
    /// the defined stream names.
    pub fn from(data: &[u8]) -> Result<StreamHeader> {
        if data.len() < 9 {
            return Err(OutOfBounds);
        }

        let mut name = String::with_capacity(16);
        for counter in 0..std::cmp::min(32, data.len() - 8) {
            let name_char = data[8 + counter];
            if name_char == 0 {
                break;
            }

            name.push(char::from(name_char));
        }

        if !["#Strings", "#US", "#Blob", "#GUID", "#~", "#-"]
            .iter()
            .any(|valid_name| name == *valid_name)
        {
            return Err(malformed_error!("Invalid stream header name - {}", name));
        }

        Ok(StreamHeader {
            offset: read_le::<u32>(data)?,
            size: read_le::<u32>(&data[4..])?,
            name,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn crafted() {
        #[rustfmt::skip]
        let header_bytes = [
            0x6C, 0x00, 0x00, 0x00,
            0xA4, 0x45, 0x00, 0x00,
            0x23, 0x7E, 0x00,
        ];

        let header = StreamHeader::from(&header_bytes).unwrap();

        assert_eq!(header.offset, 0x6C);
        assert_eq!(header.size, 0x45A4);
        assert_eq!(header.name, "#~");
    }

    #[test]
    fn unknown_name() {
        #[rustfmt::skip]
        let header_bytes = [
            0x6C, 0x00, 0x00, 0x00,
            0xA4, 0x45, 0x00, 0x00,
            0x24, 0x7E, 0x00,
        ];

        assert!(StreamHeader::from(&header_bytes).is_err());
    }
}
