//! CLR 2.0 (Cor20) header parsing.
//!
//! The [`Cor20Header`] sits at the start of the `IMAGE_DIRECTORY_ENTRY_COM_DESCRIPTOR`
//! data directory and locates the metadata root within the image.
//!
//! # Reference
//! - [ECMA-335 II.25.3.3](https://ecma-international.org/wp-content/uploads/ECMA-335_6th_edition_june_2012.pdf)

use crate::{file::parser::Parser, Error::OutOfBounds, Result};

/// The main CLI header, 72 bytes at the start of the CLR data directory.
pub struct Cor20Header {
    /// Size of the header in bytes, always 72
    pub cb: u32,
    /// The minimum major runtime version required to run this program
    pub major_runtime_version: u16,
    /// The minor portion of the version
    pub minor_runtime_version: u16,
    /// RVA of the metadata root
    pub meta_data_rva: u32,
    /// Size of the metadata
    pub meta_data_size: u32,
    /// Flags describing this image (ILONLY etc.)
    pub flags: u32,
    /// Token of the entry point method, or 0
    pub entry_point_token: u32,
    /// RVA of implementation specific resources
    pub resource_rva: u32,
    /// Size of implementation specific resources
    pub resource_size: u32,
    /// RVA of the strong name signature hash
    pub strong_name_signature_rva: u32,
    /// Size of the strong name signature hash
    pub strong_name_signature_size: u32,
}

impl Cor20Header {
    /// Read a `Cor20Header` from a byte slice.
    ///
    /// # Arguments
    /// * `data` - The byte slice from which this object shall be created
    ///
    /// # Errors
    /// Returns an error if the data is too short or the header fields are
    /// outside what ECMA-335 II.25.3.3 allows.
    pub fn read(data: &[u8]) -> Result<Cor20Header> {
        if data.len() < 72 {
            return Err(OutOfBounds);
        }

        let mut parser = Parser::new(data);

        let cb = parser.read_le::<u32>()?;
        if cb != 72 {
            return Err(malformed_error!(
                "Invalid CLR header size: expected 72, got {}",
                cb
            ));
        }

        let major_runtime_version = parser.read_le::<u16>()?;
        let minor_runtime_version = parser.read_le::<u16>()?;

        let meta_data_rva = parser.read_le::<u32>()?;
        if meta_data_rva == 0 {
            return Err(malformed_error!("Metadata RVA cannot be zero"));
        }

        let meta_data_size = parser.read_le::<u32>()?;
        if meta_data_size == 0 {
            return Err(malformed_error!("Metadata size cannot be zero"));
        }

        let flags = parser.read_le::<u32>()?;
        let entry_point_token = parser.read_le::<u32>()?;
        let resource_rva = parser.read_le::<u32>()?;
        let resource_size = parser.read_le::<u32>()?;
        let strong_name_signature_rva = parser.read_le::<u32>()?;
        let strong_name_signature_size = parser.read_le::<u32>()?;

        Ok(Cor20Header {
            cb,
            major_runtime_version,
            minor_runtime_version,
            meta_data_rva,
            meta_data_size,
            flags,
            entry_point_token,
            resource_rva,
            resource_size,
            strong_name_signature_rva,
            strong_name_signature_size,
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
            0x48, 0x00, 0x00, 0x00, // cb = 72
            0x02, 0x00,             // major_runtime_version = 2
            0x05, 0x00,             // minor_runtime_version = 5
            0x48, 0x10, 0x00, 0x00, // meta_data_rva = 0x1048
            0x00, 0x20, 0x00, 0x00, // meta_data_size = 0x2000
            0x01, 0x00, 0x00, 0x00, // flags = ILONLY
            0x01, 0x00, 0x00, 0x06, // entry_point_token = 0x06000001
            0x00, 0x00, 0x00, 0x00, // resource_rva
            0x00, 0x00, 0x00, 0x00, // resource_size
            0x00, 0x00, 0x00, 0x00, // strong_name_signature_rva
            0x00, 0x00, 0x00, 0x00, // strong_name_signature_size
            0x00, 0x00, 0x00, 0x00, // code_manager_table_rva
            0x00, 0x00, 0x00, 0x00, // code_manager_table_size
            0x00, 0x00, 0x00, 0x00, // vtable_fixups_rva
            0x00, 0x00, 0x00, 0x00, // vtable_fixups_size
            0x00, 0x00, 0x00, 0x00, // export_address_table_jmp_rva
            0x00, 0x00, 0x00, 0x00, // export_address_table_jmp_size
            0x00, 0x00, 0x00, 0x00, // managed_native_header_rva
            0x00, 0x00, 0x00, 0x00, // managed_native_header_size
        ];

        let header = Cor20Header::read(&header_bytes).unwrap();

        assert_eq!(header.cb, 72);
        assert_eq!(header.major_runtime_version, 2);
        assert_eq!(header.minor_runtime_version, 5);
        assert_eq!(header.meta_data_rva, 0x1048);
        assert_eq!(header.meta_data_size, 0x2000);
        assert_eq!(header.flags, 1);
        assert_eq!(header.entry_point_token, 0x0600_0001);
    }

    #[test]
    fn invalid_size() {
        let mut header_bytes = [0u8; 72];
        header_bytes[0] = 0x40; // cb = 64

        assert!(Cor20Header::read(&header_bytes).is_err());
    }

    #[test]
    fn too_short() {
        assert!(matches!(Cor20Header::read(&[0u8; 16]), Err(OutOfBounds)));
    }
}
