//! Safe little-endian readers for PE and metadata parsing.
//!
//! Every multibyte integer in a CLI image is little-endian. The helpers here
//! bounds-check each read and advance a caller-held offset, which keeps the
//! row and header parsers free of index arithmetic.

use crate::{Error::OutOfBounds, Result};

/// Trait for primitive types that can be read from a byte buffer.
pub trait LeRead: Sized {
    #[allow(missing_docs)]
    type Bytes: Sized + for<'a> TryFrom<&'a [u8]>;

    /// Construct Self from a little-endian byte array
    fn from_le_bytes(bytes: Self::Bytes) -> Self;
}

macro_rules! impl_le_read {
    ($($t:ty),*) => {
        $(impl LeRead for $t {
            type Bytes = [u8; std::mem::size_of::<$t>()];

            fn from_le_bytes(bytes: Self::Bytes) -> Self {
                <$t>::from_le_bytes(bytes)
            }
        })*
    };
}

impl_le_read!(u8, i8, u16, i16, u32, i32, u64, i64);

/// Read a T in little-endian from the start of a data stream.
///
/// # Errors
/// Returns [`OutOfBounds`] if the buffer is shorter than T.
pub fn read_le<T: LeRead>(data: &[u8]) -> Result<T> {
    let mut offset = 0_usize;
    read_le_at(data, &mut offset)
}

/// Read a T in little-endian from an offset, advancing the offset.
///
/// # Errors
/// Returns [`OutOfBounds`] if reading would exceed the data length.
pub fn read_le_at<T: LeRead>(data: &[u8], offset: &mut usize) -> Result<T> {
    let type_len = std::mem::size_of::<T>();
    if (type_len + *offset) > data.len() {
        return Err(OutOfBounds);
    }

    let Ok(read) = data[*offset..*offset + type_len].try_into() else {
        return Err(OutOfBounds);
    };

    *offset += type_len;

    Ok(T::from_le_bytes(read))
}

/// Read a 2- or 4-byte little-endian index, widened to u32.
///
/// Metadata table rows mix fixed-width fields with heap and table indices
/// whose width depends on heap sizes and row counts; `is_large` selects
/// between the two encodings.
///
/// # Errors
/// Returns [`OutOfBounds`] if reading would exceed the data length.
pub fn read_le_at_dyn(data: &[u8], offset: &mut usize, is_large: bool) -> Result<u32> {
    let res = if is_large {
        read_le_at::<u32>(data, offset)?
    } else {
        u32::from(read_le_at::<u16>(data, offset)?)
    };

    Ok(res)
}
