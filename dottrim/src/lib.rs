#![deny(missing_docs)]

//! # dottrim
//!
//! Trace-driven trimming of .NET (ECMA-335) assembly images.
//!
//! `dottrim` reads a managed PE/COFF executable and produces a byte-for-byte
//! identical image in which the payload of everything a given execution trace
//! does not need has been overwritten with zero bytes. Section layout, stream
//! offsets, table row counts, heap sizes, RVAs and every index value are left
//! exactly as they were; only payload bytes are cleared. The result is not
//! runnable — it is meant to compress well and to show downstream analysis
//! which code and metadata a trace actually reaches.
//!
//! # Architecture
//!
//! - **File layer** ([`crate::file`]): memory-mapped or in-memory PE access,
//!   RVA translation, low-level byte readers.
//! - **Metadata layer** ([`crate::metadata`]): CLI header, metadata root,
//!   streams and heaps, the forty-five ECMA-335 tables with their
//!   variable-width and coded indices, blob signatures, method bodies.
//! - **Assembly layer** ([`crate::assembly`]): CIL opcode classification and
//!   the token scanner used for reachability.
//! - **Trim layer** ([`crate::trim`]): the class-level (S0) and method-level
//!   (S1) trimmers, the string-heap trimmer, and the optional deep
//!   reference-closure trim.
//!
//! # Usage
//!
//! ```rust,no_run
//! use dottrim::trim::{trim_class_level, InvokedMethods};
//!
//! let image = std::fs::read("App.dll")?;
//! let invoked = InvokedMethods::from_names(["MyApp.Program.Main"]);
//! let outcome = trim_class_level(&image, &invoked, false)?;
//! assert_eq!(outcome.image.len(), image.len());
//! std::fs::write("App.dll.s0", &outcome.image)?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! # Standards
//!
//! All binary formats follow ECMA-335 (6th edition): metadata root
//! (II.24.2.1), stream headers (II.24.2.2), heaps (II.24.2.3/4), tables
//! stream (II.24.2.6, II.22), compressed integers and signatures (II.23.2),
//! method bodies (II.25.4).

#[macro_use]
pub(crate) mod error;

pub mod assembly;
pub mod file;
pub mod metadata;
pub mod trim;

/// `dottrim` Result type, used by every fallible operation in the crate.
pub type Result<T> = std::result::Result<T, Error>;

/// `dottrim` Error type.
pub use error::Error;

pub use file::File;
pub use metadata::view::CilView;
pub use trim::{
    trim_class_level, trim_method_level, InvokedMethods, TrimLevel, TrimOutcome, TrimStats,
};
