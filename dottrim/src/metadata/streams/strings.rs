//! String heap (`#Strings`): NUL-separated UTF-8 identifier strings.
//!
//! Offset 0 is the canonical empty string; real entries start at offset 1.
//! Rows may legally reference the interior of an entry (compilers share
//! string suffixes), so consumers that clear entries must treat any
//! referenced offset inside an entry's span as keeping that entry alive.
//!
//! # Reference
//! - [ECMA-335 II.24.2.3](https://ecma-international.org/wp-content/uploads/ECMA-335_6th_edition_june_2012.pdf)

use std::{ffi::CStr, str};

use crate::{Error::OutOfBounds, Result};

/// Read-only view over a `#Strings` heap.
pub struct Strings<'a> {
    data: &'a [u8],
}

impl<'a> Strings<'a> {
    /// Create a `Strings` view from the heap bytes.
    ///
    /// # Arguments
    /// * 'data' - The stream bytes, starting with the mandatory leading NUL
    ///
    /// # Errors
    /// Returns an error if the heap is empty or does not begin with NUL.
    pub fn from(data: &'a [u8]) -> Result<Strings<'a>> {
        if data.is_empty() || data[0] != 0 {
            return Err(malformed_error!("Provided #Strings heap is invalid"));
        }

        Ok(Strings { data })
    }

    /// Fetch the string starting at a heap offset.
    ///
    /// # Errors
    /// Returns an error if the offset is out of bounds, the entry is not
    /// NUL-terminated, or the bytes are not valid UTF-8.
    pub fn get(&self, index: usize) -> Result<&'a str> {
        if index >= self.data.len() {
            return Err(OutOfBounds);
        }

        match CStr::from_bytes_until_nul(&self.data[index..]) {
            Ok(result) => result
                .to_str()
                .map_err(|_| malformed_error!("Invalid string at index - {}", index)),
            Err(_) => Err(malformed_error!("Invalid string at index - {}", index)),
        }
    }

    /// Iterate the heap as `(offset, raw bytes)` entries, starting at
    /// offset 1. Entries that are not valid UTF-8 are still yielded; the
    /// byte span is what trimming operates on.
    #[must_use]
    pub fn entries(&self) -> StringEntries<'a> {
        StringEntries {
            data: self.data,
            position: 1,
        }
    }

    /// Total heap size in bytes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// True when the heap holds only the canonical empty string.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.data.len() <= 1
    }
}

/// Iterator over `(offset, bytes)` of each NUL-separated heap entry.
pub struct StringEntries<'a> {
    data: &'a [u8],
    position: usize,
}

impl<'a> Iterator for StringEntries<'a> {
    type Item = (usize, &'a [u8]);

    fn next(&mut self) -> Option<Self::Item> {
        if self.position >= self.data.len() {
            return None;
        }

        let start = self.position;
        let mut end = start;
        while end < self.data.len() && self.data[end] != 0 {
            end += 1;
        }

        // Step past the terminator; a missing final NUL ends the heap
        self.position = end + 1;

        Some((start, &self.data[start..end]))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn crafted() {
        let data = b"\0Hello\0World\0";

        let strings = Strings::from(data).unwrap();

        assert_eq!(strings.get(0).unwrap(), "");
        assert_eq!(strings.get(1).unwrap(), "Hello");
        assert_eq!(strings.get(7).unwrap(), "World");
        // Interior offset resolves to a suffix
        assert_eq!(strings.get(3).unwrap(), "llo");
        assert!(strings.get(64).is_err());
    }

    #[test]
    fn entries() {
        let data = b"\0Hello\0World\0";
        let strings = Strings::from(data).unwrap();

        let entries: Vec<(usize, &[u8])> = strings.entries().collect();
        assert_eq!(entries, vec![(1, &b"Hello"[..]), (7, &b"World"[..])]);
    }

    #[test]
    fn invalid_heap() {
        assert!(Strings::from(&[]).is_err());
        assert!(Strings::from(b"Hello\0").is_err());
    }
}
