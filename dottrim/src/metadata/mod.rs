//! ECMA-335 metadata parsing: headers, streams, tables, signatures and
//! method bodies.
//!
//! The layering mirrors the on-disk format: the CLI header
//! ([`cor20header`]) locates the metadata [`root`], whose stream directory
//! locates the [`streams`] (the tables stream and the four heaps); the
//! tables stream yields the typed [`tables`] rows; [`signatures`] and
//! [`method`] decode the blob and body payloads those rows point at.
//! [`view::CilView`] assembles all of it over one owned byte buffer.

pub mod cor20header;
pub mod method;
pub mod root;
pub mod signatures;
pub mod streams;
pub mod tables;
pub mod token;
pub mod view;
