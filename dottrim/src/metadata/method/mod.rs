//! CIL method body headers (ECMA-335 II.25.4).
//!
//! Two encodings exist, discriminated by the low two bits of the first byte:
//! tiny (`0b10`, a single header byte with the code size packed into the
//! high six bits) and fat (`0b11`, a 12-byte header that can be followed by
//! 4-byte-aligned extra sections carrying exception handler tables).
//!
//! The trim engine does not need decoded exception handlers. What it needs
//! is the body's *total footprint*: the byte span from the header through
//! the aligned end of the last EH section, because that whole span is what
//! gets zeroed or counted for an unreachable method.

use bitflags::bitflags;

use crate::{
    file::io::{read_le, read_le_at},
    Error::OutOfBounds,
    Result,
};

bitflags! {
    /// Header flags of a fat method body (low 12 bits of the first u16).
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct MethodBodyFlags: u16 {
        /// Tiny header format
        const TINY_FORMAT = 0x0002;
        /// Fat header format
        const FAT_FORMAT = 0x0003;
        /// Extra sections follow the code
        const MORE_SECTS = 0x0008;
        /// Locals are zero-initialised
        const INIT_LOCALS = 0x0010;
    }
}

bitflags! {
    /// Flags of an extra data section header (II.25.4.5).
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct SectionFlags: u8 {
        /// The section is an exception handling table
        const EHTABLE = 0x01;
        /// Reserved
        const OPT_IL_TABLE = 0x02;
        /// The section uses the fat (24-bit size) layout
        const FAT_FORMAT = 0x40;
        /// Another section follows this one
        const MORE_SECTS = 0x80;
    }
}

/// The parsed shape of one method body.
pub struct MethodBody {
    /// Size of the header in bytes: 1 (tiny) or 12 (fat)
    pub size_header: usize,
    /// Size of the IL code in bytes
    pub size_code: usize,
    /// Total footprint: header + code + aligned EH sections
    pub size_total: usize,
    /// Maximum operand stack depth (0 for tiny bodies)
    pub max_stack: usize,
    /// StandAloneSig token describing the locals, 0 when there are none
    pub local_var_sig_token: u32,
    /// True for the fat header format
    pub is_fat: bool,
    /// True when locals are zero-initialised
    pub is_init_local: bool,
    /// True when the body carries exception handler sections
    pub has_exception_data: bool,
}

impl MethodBody {
    /// Parse a method body header at the start of `data`.
    ///
    /// `data` should extend from the body start to (at least) the end of the
    /// body; in practice the caller hands in the remainder of the image from
    /// the resolved RVA.
    ///
    /// # Errors
    /// Returns an error if the data is empty, the format bits are invalid,
    /// or the declared sizes overrun the buffer.
    pub fn read(data: &[u8]) -> Result<MethodBody> {
        if data.is_empty() {
            return Err(malformed_error!("Provided data for body parsing is empty"));
        }

        let first_byte = read_le::<u8>(data)?;
        match first_byte & 0b11 {
            0b10 => {
                let size_code = (first_byte >> 2) as usize;
                if size_code + 1 > data.len() {
                    return Err(OutOfBounds);
                }

                Ok(MethodBody {
                    size_header: 1,
                    size_code,
                    size_total: 1 + size_code,
                    max_stack: 8,
                    local_var_sig_token: 0,
                    is_fat: false,
                    is_init_local: false,
                    has_exception_data: false,
                })
            }
            0b11 => {
                if data.len() < 12 {
                    return Err(OutOfBounds);
                }

                let first_duo = read_le::<u16>(data)?;
                let flags = MethodBodyFlags::from_bits_truncate(first_duo & 0x0FFF);
                let size_header = ((first_duo >> 12) * 4) as usize;
                let max_stack = read_le::<u16>(&data[2..])? as usize;
                let size_code = read_le::<u32>(&data[4..])? as usize;
                let local_var_sig_token = read_le::<u32>(&data[8..])?;

                let Some(body_end) = size_header.checked_add(size_code) else {
                    return Err(OutOfBounds);
                };
                if data.len() < body_end {
                    return Err(OutOfBounds);
                }

                let mut size_total = body_end;
                let mut has_exception_data = false;

                if flags.contains(MethodBodyFlags::MORE_SECTS) {
                    // Sections start at the next 4-byte boundary after the code
                    let mut cursor = (body_end + 3) & !3;

                    while data.len() >= cursor + 4 {
                        let section_flags =
                            SectionFlags::from_bits_truncate(read_le::<u8>(&data[cursor..])?);
                        if !section_flags.contains(SectionFlags::EHTABLE) {
                            break;
                        }

                        let section_size = if section_flags.contains(SectionFlags::FAT_FORMAT) {
                            let mut size_offset = cursor;
                            (read_le_at::<u32>(data, &mut size_offset)? >> 8) as usize
                        } else {
                            read_le::<u8>(&data[cursor + 1..])? as usize
                        };

                        // The declared size includes the 4-byte section header
                        if section_size < 4 || data.len() < cursor + section_size {
                            break;
                        }

                        has_exception_data = true;
                        cursor = (cursor + section_size + 3) & !3;
                        size_total = cursor;

                        if !section_flags.contains(SectionFlags::MORE_SECTS) {
                            break;
                        }
                    }
                }

                Ok(MethodBody {
                    size_header,
                    size_code,
                    size_total,
                    max_stack,
                    local_var_sig_token,
                    is_fat: true,
                    is_init_local: flags.contains(MethodBodyFlags::INIT_LOCALS),
                    has_exception_data,
                })
            }
            _ => Err(malformed_error!(
                "Method header is neither FAT nor TINY - {}",
                first_byte
            )),
        }
    }

    /// The code bytes of this body within the buffer it was read from.
    #[must_use]
    pub fn code_range(&self) -> std::ops::Range<usize> {
        self.size_header..self.size_header + self.size_code
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tiny() {
        // (2 << 2) | 0b10: two code bytes
        let data = [0x0A, 0x00, 0x2A];
        let body = MethodBody::read(&data).unwrap();

        assert!(!body.is_fat);
        assert_eq!(body.size_header, 1);
        assert_eq!(body.size_code, 2);
        assert_eq!(body.size_total, 3);
        assert_eq!(body.local_var_sig_token, 0);
        assert_eq!(body.code_range(), 1..3);
    }

    #[test]
    fn fat_plain() {
        #[rustfmt::skip]
        let data = [
            0x13, 0x30,             // flags: FAT | INIT_LOCALS, header 3*4 bytes
            0x04, 0x00,             // max_stack = 4
            0x03, 0x00, 0x00, 0x00, // code size = 3
            0x01, 0x00, 0x00, 0x11, // local var sig token
            0x00, 0x00, 0x2A,       // code
        ];

        let body = MethodBody::read(&data).unwrap();

        assert!(body.is_fat);
        assert!(body.is_init_local);
        assert!(!body.has_exception_data);
        assert_eq!(body.size_header, 12);
        assert_eq!(body.size_code, 3);
        assert_eq!(body.size_total, 15);
        assert_eq!(body.max_stack, 4);
        assert_eq!(body.local_var_sig_token, 0x1100_0001);
    }

    #[test]
    fn fat_with_small_eh_section() {
        #[rustfmt::skip]
        let mut data = vec![
            0x1B, 0x30,             // flags: FAT | MORE_SECTS, header 12 bytes
            0x02, 0x00,             // max_stack
            0x06, 0x00, 0x00, 0x00, // code size = 6
            0x00, 0x00, 0x00, 0x00, // no locals
            0x00, 0x00, 0x00, 0x00, 0x00, 0x2A, // code (ends at 18)
        ];
        // Pad to the 4-byte boundary (20), then a small EH section:
        // one clause, declared size 4 + 12 = 16
        data.extend_from_slice(&[0x00, 0x00]);
        data.push(0x01); // EHTABLE, small
        data.push(16); // section size
        data.extend_from_slice(&[0x00, 0x00]); // reserved
        data.extend_from_slice(&[0x00; 12]); // one small clause

        let body = MethodBody::read(&data).unwrap();

        assert!(body.has_exception_data);
        assert_eq!(body.size_code, 6);
        // 20 (aligned body end) + 16 (section) = 36
        assert_eq!(body.size_total, 36);
    }

    #[test]
    fn fat_with_fat_eh_section() {
        #[rustfmt::skip]
        let mut data = vec![
            0x1B, 0x30,
            0x02, 0x00,
            0x04, 0x00, 0x00, 0x00, // code size = 4 -> body ends at 16, already aligned
            0x00, 0x00, 0x00, 0x00,
            0x00, 0x00, 0x00, 0x2A,
        ];
        // Fat EH section: flags | 24-bit size (4 + 24 = 28)
        data.push(0x41); // EHTABLE | FAT_FORMAT
        data.extend_from_slice(&[28, 0x00, 0x00]); // size, little-endian 24-bit
        data.extend_from_slice(&[0x00; 24]); // one fat clause

        let body = MethodBody::read(&data).unwrap();

        assert!(body.has_exception_data);
        assert_eq!(body.size_total, 16 + 28);
    }

    #[test]
    fn invalid_format() {
        // Low bits 0b00 are not a valid body format
        assert!(MethodBody::read(&[0x00, 0x00]).is_err());
        assert!(MethodBody::read(&[]).is_err());
    }

    #[test]
    fn truncated_tiny() {
        // Declares 10 code bytes but only 2 are present
        let data = [0x2A, 0x00, 0x00];
        assert!(matches!(MethodBody::read(&data), Err(OutOfBounds)));
    }
}
