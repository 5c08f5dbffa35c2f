//! Metadata table infrastructure: identifiers, index widths, coded indices,
//! and the typed row containers.
//!
//! The tables stream (`#~`/`#-`) concatenates all present tables in id
//! order, each as `row_count` fixed-size rows. Row sizes vary per image
//! because heap and table indices widen from 2 to 4 bytes past certain
//! thresholds; [`TableInfo`] captures those widths once at load.
//!
//! # Reference
//! - [ECMA-335 II.22, II.24.2.6](https://ecma-international.org/wp-content/uploads/ECMA-335_6th_edition_june_2012.pdf)

mod codedindex;
mod id;
mod info;
mod rows;
mod table;

pub use codedindex::{CodedIndex, CodedIndexType};
pub use id::TableId;
pub use info::{TableInfo, TableRowInfo};
pub use rows::*;
pub use table::{MetadataTable, RowRead};
