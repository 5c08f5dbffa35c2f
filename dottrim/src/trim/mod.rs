//! The trim engine: class-level (S0) and method-level (S1) trimming, the
//! string-heap trim, and the optional deep reference-closure trim.
//!
//! Trimming never moves a byte. The image keeps its exact length, section
//! layout, stream offsets, row counts and index values; the only change is
//! that payload bytes of entities the invoked set cannot reach become zero.
//! The output is deliberately not runnable — it exists to compress well and
//! to show what a trace actually needs.
//!
//! A run is strictly ordered: parse, resolve the invoked sets, run S0 or
//! S1, trim the string heap, optionally run the deep closure, hand back the
//! buffer. Everything is single-threaded and synchronous; per-entity
//! failures after parsing are logged and skipped, never fatal.

mod closure;
mod engine;
mod invoked;
mod strings;

pub use invoked::{canonicalize_name, InvokedMethods};

pub(crate) use invoked::{field_range, method_range, param_range, resolve, ResolvedInvocations};

use crate::{metadata::view::CilView, Result};
use engine::TrimEngine;

/// Which granularity a run trims at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrimLevel {
    /// S0: whole types; anything on a preserved type stays
    Class,
    /// S1: S0 plus per-method trimming on preserved types
    Method,
}

/// How a walker touches the ranges it visits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum WalkMode {
    /// Overwrite the range with zero bytes
    Zero,
    /// Only account for the range, leaving bytes untouched
    Count,
}

/// Per-run accounting. A fresh engine starts with every counter at zero;
/// two runs never share state.
#[derive(Debug, Default, Clone)]
pub struct TrimStats {
    /// Total bytes overwritten with zeros
    pub bytes_zeroed: usize,
    /// Total bytes visited by counting walks (retained payload)
    pub bytes_retained: usize,
    /// TypeDef rows trimmed in full
    pub types_zeroed: usize,
    /// Method bodies zeroed
    pub method_bodies_zeroed: usize,
    /// Methods preserved by the method-level pass
    pub methods_retained: usize,
    /// `#Strings` entries cleared
    pub strings_zeroed: usize,
    /// Auxiliary table rows cleared by the deep closure
    pub aux_rows_zeroed: usize,
    /// `#Blob` entries cleared by the deep closure
    pub blob_entries_zeroed: usize,
    /// `#US` entries cleared by the deep closure
    pub us_entries_zeroed: usize,
}

/// The result of one trim run.
pub struct TrimOutcome {
    /// The trimmed image, same length as the input
    pub image: Vec<u8>,
    /// Accounting for the run
    pub stats: TrimStats,
}

/// Trim at class granularity: every type not reachable from the invoked
/// method set is zeroed in full, then the string heap is trimmed, then —
/// when `deep` is set — the reference closure clears unreachable auxiliary
/// rows, blobs and user strings.
///
/// # Errors
/// Returns an error if `image` is not a structurally valid CLI image; the
/// input bytes are never modified.
pub fn trim_class_level(
    image: &[u8],
    invoked: &InvokedMethods,
    deep: bool,
) -> Result<TrimOutcome> {
    trim(image, invoked, TrimLevel::Class, deep)
}

/// Trim at method granularity: class-level trimming plus per-method zeroing
/// of unreferenced methods on preserved types.
///
/// # Errors
/// Returns an error if `image` is not a structurally valid CLI image; the
/// input bytes are never modified.
pub fn trim_method_level(
    image: &[u8],
    invoked: &InvokedMethods,
    deep: bool,
) -> Result<TrimOutcome> {
    trim(image, invoked, TrimLevel::Method, deep)
}

/// One full trim run at the chosen level.
///
/// # Errors
/// Returns an error if `image` is not a structurally valid CLI image.
pub fn trim(
    image: &[u8],
    invoked: &InvokedMethods,
    level: TrimLevel,
    deep: bool,
) -> Result<TrimOutcome> {
    let view = CilView::from_bytes(image)?;
    let resolved = resolve(&view, invoked)?;

    let mut engine = TrimEngine::new(view, resolved);

    match level {
        TrimLevel::Class => engine.run_class_level(),
        TrimLevel::Method => engine.run_method_level(),
    }

    engine.trim_strings();

    if deep {
        engine.run_closure();
    }

    Ok(engine.into_outcome())
}
