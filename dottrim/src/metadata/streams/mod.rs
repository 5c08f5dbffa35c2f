//! Metadata streams: the tables stream and the four heaps.
//!
//! The metadata root's stream directory names at most one tables stream
//! (`#~` compressed or `#-` uncompressed layout) and the `#Strings`, `#US`,
//! `#GUID` and `#Blob` heaps. Heap views here are read-only; in-place
//! clearing happens through the trim engine against its own image buffer,
//! using the spans these views compute.

mod blob;
mod guid;
mod streamheader;
mod strings;
mod tablesheader;
mod userstrings;

pub use blob::Blob;
pub use guid::Guid;
pub use streamheader::StreamHeader;
pub use strings::{StringEntries, Strings};
pub use tablesheader::{TableRows, TablesHeader};
pub use userstrings::UserStrings;
