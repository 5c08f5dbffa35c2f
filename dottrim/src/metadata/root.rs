//! Metadata root header and stream directory.
//!
//! The metadata root is the entry point for reading CLI metadata: the BSJB
//! signature, the 4-byte-aligned length-prefixed version string, and the
//! stream directory locating `#~`/`#-`, `#Strings`, `#US`, `#GUID` and
//! `#Blob` within the metadata block.
//!
//! # Reference
//! - [ECMA-335 II.24.2.1](https://ecma-international.org/wp-content/uploads/ECMA-335_6th_edition_june_2012.pdf)

use crate::{
    file::io::{read_le, read_le_at},
    metadata::streams::StreamHeader,
    Error::OutOfBounds,
    Result,
};

/// The MAGIC value indicating the CIL metadata root ("BSJB")
pub const CIL_HEADER_MAGIC: u32 = 0x424A_5342;

/// The parsed metadata root: version info plus the stream directory.
///
/// Stream offsets in the directory are relative to the start of the metadata
/// root within the file.
pub struct Root {
    /// Magic signature for physical metadata: 0x424A5342
    pub signature: u32,
    /// `MajorVersion`
    pub major_version: u16,
    /// `MinorVersion`
    pub minor_version: u16,
    /// Number of bytes allocated to hold the version string (4-byte aligned)
    pub length: u32,
    /// Version string with trailing NUL padding stripped
    pub version: String,
    /// Reserved, always 0
    pub flags: u16,
    /// Stream directory
    pub stream_headers: Vec<StreamHeader>,
}

impl Root {
    /// Read a [`Root`] metadata header from a byte slice.
    ///
    /// # Arguments
    /// * `data` - The metadata block, starting at the BSJB signature
    ///
    /// # Errors
    /// Returns an error if the data is too short, the signature is invalid,
    /// or the stream directory is malformed.
    pub fn read(data: &[u8]) -> Result<Root> {
        if data.len() < 20 {
            return Err(OutOfBounds);
        }

        let signature = read_le::<u32>(data)?;
        if signature != CIL_HEADER_MAGIC {
            return Err(malformed_error!(
                "CIL_HEADER_MAGIC does not match - {:#010x}",
                signature
            ));
        }

        let length = read_le_at::<u32>(data, &mut 12_usize)?;
        let Some(version_end) = (length as usize).checked_add(16) else {
            return Err(malformed_error!(
                "Version string length causes integer overflow - {}",
                length
            ));
        };
        if length > 255 || version_end + 4 > data.len() {
            return Err(OutOfBounds);
        }

        let version_bytes = &data[16..version_end];
        let version = match std::str::from_utf8(version_bytes) {
            Ok(version) => version.trim_end_matches('\0').to_string(),
            Err(_) => return Err(malformed_error!("Version string is not valid UTF-8")),
        };

        let mut offset = version_end;
        let flags = read_le_at::<u16>(data, &mut offset)?;
        let stream_count = read_le_at::<u16>(data, &mut offset)?;
        if stream_count == 0 || stream_count > 6 {
            // At most one of #~/#- plus the four heaps
            return Err(malformed_error!("Invalid stream count - {}", stream_count));
        }

        let mut streams = Vec::with_capacity(stream_count as usize);
        let mut streams_seen = [false; 6];

        for _ in 0..stream_count {
            if offset > data.len() {
                return Err(OutOfBounds);
            }

            let stream = StreamHeader::from(&data[offset..])?;

            match u32::checked_add(stream.offset, stream.size) {
                Some(range) => {
                    if range as usize > data.len() {
                        return Err(OutOfBounds);
                    }
                }
                None => {
                    return Err(malformed_error!(
                        "Stream offset and size cause integer overflow - {} + {}",
                        stream.offset,
                        stream.size
                    ))
                }
            }

            // #~ and #- are two encodings of the same tables stream and
            // share a slot: at most one of them may be present
            let stream_index = match stream.name.as_str() {
                "#Strings" => 0,
                "#US" => 1,
                "#Blob" => 2,
                "#GUID" => 3,
                "#~" | "#-" => 4,
                _ => unreachable!("StreamHeader::from() validates the name"),
            };

            if streams_seen[stream_index] {
                return Err(malformed_error!(
                    "Duplicate stream name found: '{}'",
                    stream.name
                ));
            }
            streams_seen[stream_index] = true;

            let name_aligned = ((stream.name.len() + 1) + 3) & !3;
            offset += 8 + name_aligned;

            streams.push(stream);
        }

        Ok(Root {
            signature,
            major_version: read_le::<u16>(&data[4..])?,
            minor_version: read_le::<u16>(&data[6..])?,
            length,
            version,
            flags,
            stream_headers: streams,
        })
    }

    /// Find a stream header by name.
    #[must_use]
    pub fn stream(&self, name: &str) -> Option<&StreamHeader> {
        self.stream_headers
            .iter()
            .find(|header| header.name == name)
    }

    /// The tables stream header, whichever of `#~` or `#-` is present.
    #[must_use]
    pub fn tables_stream(&self) -> Option<&StreamHeader> {
        self.stream_headers
            .iter()
            .find(|header| header.name == "#~" || header.name == "#-")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn crafted() {
        #[rustfmt::skip]
        let header_bytes = [
            0x42, 0x53, 0x4A, 0x42,             // BSJB
            0x01, 0x00,                         // major = 1
            0x01, 0x00,                         // minor = 1
            0x00, 0x00, 0x00, 0x00,             // reserved
            0x08, 0x00, 0x00, 0x00,             // length = 8
            b'v', b'4', b'.', b'0', 0x00, 0x00, 0x00, 0x00,
            0x00, 0x00,                         // flags
            0x01, 0x00,                         // stream count

            0x24, 0x00, 0x00, 0x00,             // stream offset = 0x24
            0x08, 0x00, 0x00, 0x00,             // stream size = 8
            0x23, 0x7E, 0x00, 0x00,             // "#~\0" + pad

            0xAA, 0xAA, 0xAA, 0xAA, 0xAA, 0xAA, 0xAA, 0xAA,
        ];

        let root = Root::read(&header_bytes).unwrap();

        assert_eq!(root.signature, CIL_HEADER_MAGIC);
        assert_eq!(root.major_version, 1);
        assert_eq!(root.minor_version, 1);
        assert_eq!(root.length, 8);
        assert_eq!(root.version, "v4.0");
        assert_eq!(root.stream_headers.len(), 1);
        assert_eq!(root.tables_stream().unwrap().offset, 0x24);
        assert!(root.stream("#Blob").is_none());
    }

    #[test]
    fn bad_signature() {
        let header_bytes = [0u8; 64];
        assert!(Root::read(&header_bytes).is_err());
    }

    #[test]
    fn duplicate_stream() {
        #[rustfmt::skip]
        let header_bytes = [
            0x42, 0x53, 0x4A, 0x42,
            0x01, 0x00,
            0x01, 0x00,
            0x00, 0x00, 0x00, 0x00,
            0x04, 0x00, 0x00, 0x00,             // length = 4
            b'v', b'4', 0x00, 0x00,
            0x00, 0x00,
            0x02, 0x00,                         // two streams, both #~

            0x2C, 0x00, 0x00, 0x00,
            0x04, 0x00, 0x00, 0x00,
            0x23, 0x7E, 0x00, 0x00,

            0x30, 0x00, 0x00, 0x00,
            0x04, 0x00, 0x00, 0x00,
            0x23, 0x7E, 0x00, 0x00,

            0xAA, 0xAA, 0xAA, 0xAA, 0xAA, 0xAA, 0xAA, 0xAA,
        ];

        assert!(Root::read(&header_bytes).is_err());
    }
}
