//! User string heap (`#US`): length-prefixed UTF-16 string literals.
//!
//! Entries use the same compressed length prefix as `#Blob`; the data is
//! UTF-16 code units followed by a trailing kind byte. `ldstr` operands
//! carry a `0x70`-tagged token whose low 24 bits are an offset into this
//! heap. The trim engine never decodes the character data; it only needs
//! entry spans, so this view shares the blob representation.
//!
//! # Reference
//! - [ECMA-335 II.24.2.4](https://ecma-international.org/wp-content/uploads/ECMA-335_6th_edition_june_2012.pdf)

use crate::{metadata::streams::Blob, Result};

/// Read-only view over a `#US` heap.
pub struct UserStrings<'a> {
    data: Blob<'a>,
}

impl<'a> UserStrings<'a> {
    /// Create a `UserStrings` view from the heap bytes.
    ///
    /// # Errors
    /// Returns an error if the heap is empty or does not begin with NUL.
    pub fn from(data: &'a [u8]) -> Result<UserStrings<'a>> {
        Ok(UserStrings {
            data: Blob::from(data)?,
        })
    }

    /// Decode the compressed length prefix at `index`, returning
    /// `(prefix_len, data_len)`.
    ///
    /// # Errors
    /// Returns an error on an invalid offset or length prefix.
    pub fn entry_span(&self, index: usize) -> Result<(usize, usize)> {
        self.data.entry_span(index)
    }

    /// Fetch the raw entry bytes (UTF-16 code units plus kind byte).
    ///
    /// # Errors
    /// Returns an error on an invalid offset or length prefix.
    pub fn get(&self, index: usize) -> Result<&'a [u8]> {
        self.data.get(index)
    }

    /// Total heap size in bytes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// True when the heap holds only the canonical empty entry.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn crafted() {
        // "Hi" as UTF-16 plus the trailing kind byte
        let data = [0x00, 0x05, 0x48, 0x00, 0x69, 0x00, 0x00];
        let us = UserStrings::from(&data).unwrap();

        assert_eq!(us.entry_span(1).unwrap(), (1, 5));
        assert_eq!(us.get(1).unwrap(), &[0x48, 0x00, 0x69, 0x00, 0x00]);
    }

    #[test]
    fn invalid() {
        assert!(UserStrings::from(&[]).is_err());
        assert!(UserStrings::from(&[0x22, 0x00]).is_err());
    }
}
