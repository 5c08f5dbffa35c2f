//! GUID heap (`#GUID`): a concatenation of 16-byte GUIDs.
//!
//! Unlike the other heaps, indexes into `#GUID` are 1-based ordinals, not
//! byte offsets: index `n` names bytes `[(n-1)*16, n*16)`.
//!
//! # Reference
//! - [ECMA-335 II.24.2.5](https://ecma-international.org/wp-content/uploads/ECMA-335_6th_edition_june_2012.pdf)

use crate::{Error::OutOfBounds, Result};

/// Read-only view over a `#GUID` heap.
pub struct Guid<'a> {
    data: &'a [u8],
}

impl<'a> Guid<'a> {
    /// Create a `Guid` view from the heap bytes.
    ///
    /// # Errors
    /// Returns an error if the heap size is not a multiple of 16.
    pub fn from(data: &'a [u8]) -> Result<Guid<'a>> {
        if data.len() % 16 != 0 {
            return Err(malformed_error!(
                "#GUID heap size {} is not a multiple of 16",
                data.len()
            ));
        }

        Ok(Guid { data })
    }

    /// Fetch a GUID by its 1-based index.
    ///
    /// # Errors
    /// Returns an error if the index is 0 or past the heap end.
    pub fn get(&self, index: usize) -> Result<&'a [u8]> {
        if index == 0 {
            return Err(OutOfBounds);
        }

        let start = (index - 1) * 16;
        let end = start + 16;
        if end > self.data.len() {
            return Err(OutOfBounds);
        }

        Ok(&self.data[start..end])
    }

    /// Number of GUIDs in the heap.
    #[must_use]
    pub fn count(&self) -> usize {
        self.data.len() / 16
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn crafted() {
        let mut data = vec![0x11; 16];
        data.extend_from_slice(&[0x22; 16]);

        let guids = Guid::from(&data).unwrap();

        assert_eq!(guids.count(), 2);
        assert_eq!(guids.get(1).unwrap(), &[0x11; 16]);
        assert_eq!(guids.get(2).unwrap(), &[0x22; 16]);
        assert!(guids.get(0).is_err());
        assert!(guids.get(3).is_err());
    }

    #[test]
    fn invalid_size() {
        assert!(Guid::from(&[0x00; 17]).is_err());
    }
}
