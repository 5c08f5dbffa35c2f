//! The trim engine's state and the S0/S1 walkers.
//!
//! Every walker ends in one of two range primitives: `zero` overwrites and
//! accounts, `count` only accounts. [`WalkMode`] selects between them, so
//! the same traversal serves both the mutating pass and the statistics pass
//! over preserved entities.
//!
//! Sub-walk order within a type is fixed: methods, fields, properties,
//! events, then the TypeDef row payload. Property and event row payloads are
//! never zeroed (their member ranges cannot be computed reliably; the
//! string trimmer protects their names instead), and FieldRVA static data
//! is left in place. Member-list indices (FieldList, MethodList, ParamList)
//! always survive so that run arithmetic over the output stays valid.

use log::warn;
use rustc_hash::FxHashSet;

use crate::{
    metadata::{
        method::MethodBody,
        tables::{MethodDefRow, TableId, TypeDefRow},
        view::CilView,
    },
    trim::{
        field_range, method_range, param_range, ResolvedInvocations, TrimOutcome, TrimStats,
        WalkMode,
    },
};

pub(crate) struct TrimEngine {
    view: CilView,
    resolved: ResolvedInvocations,
    /// MethodDef rids that survive the structural pass; input to the string
    /// trimmer and the deep closure
    preserved_methods: FxHashSet<u32>,
    stats: TrimStats,
}

impl TrimEngine {
    pub(crate) fn new(view: CilView, resolved: ResolvedInvocations) -> TrimEngine {
        TrimEngine {
            view,
            resolved,
            preserved_methods: FxHashSet::default(),
            stats: TrimStats::default(),
        }
    }

    pub(crate) fn view(&self) -> &CilView {
        &self.view
    }

    pub(crate) fn resolved(&self) -> &ResolvedInvocations {
        &self.resolved
    }

    pub(crate) fn preserved_methods(&self) -> &FxHashSet<u32> {
        &self.preserved_methods
    }

    pub(crate) fn stats_mut(&mut self) -> &mut TrimStats {
        &mut self.stats
    }

    pub(crate) fn into_outcome(self) -> TrimOutcome {
        TrimOutcome {
            image: self.view.into_data(),
            stats: self.stats,
        }
    }

    /// S0: zero every type the invoked set does not reach; walk nothing on
    /// preserved types.
    pub(crate) fn run_class_level(&mut self) {
        for type_rid in 1..=self.view.tables.tables.type_def.row_count() {
            if self.resolved.type_invoked(type_rid) {
                if let Some((start, end)) = method_range(&self.view, type_rid) {
                    self.preserved_methods.extend(start..end);
                }
            } else {
                self.walk_type(type_rid, WalkMode::Zero);
                self.stats.types_zeroed += 1;
            }
        }
    }

    /// S1: S0, then per-method trimming over the methods of preserved
    /// types. Preserved methods run the counting walker.
    pub(crate) fn run_method_level(&mut self) {
        for type_rid in 1..=self.view.tables.tables.type_def.row_count() {
            if !self.resolved.type_invoked(type_rid) {
                self.walk_type(type_rid, WalkMode::Zero);
                self.stats.types_zeroed += 1;
                continue;
            }

            let Some((start, end)) = method_range(&self.view, type_rid) else {
                continue;
            };

            for method_rid in start..end {
                if self.resolved.methods.contains(&method_rid) {
                    self.preserved_methods.insert(method_rid);
                    self.stats.methods_retained += 1;
                    self.walk_method(method_rid, WalkMode::Count);
                } else {
                    self.walk_method(method_rid, WalkMode::Zero);
                }
            }
        }
    }

    /// Apply a mode to a byte range of the image. Zeroing clamps to the
    /// buffer end; a range fully outside the buffer is ignored.
    pub(crate) fn apply(&mut self, mode: WalkMode, offset: usize, len: usize) {
        match mode {
            WalkMode::Zero => {
                let data = self.view.data_mut();
                if offset >= data.len() {
                    return;
                }

                let end = offset.saturating_add(len).min(data.len());
                data[offset..end].fill(0);
                self.stats.bytes_zeroed += end - offset;
            }
            WalkMode::Count => {
                self.stats.bytes_retained += len;
            }
        }
    }

    /// Apply a mode to the data bytes of a `#Blob` entry, keeping its
    /// length prefix so the heap still walks.
    pub(crate) fn apply_blob_payload(&mut self, mode: WalkMode, blob_index: u32) {
        if blob_index == 0 {
            return;
        }

        let Some(span) = self.view.blob_span else {
            return;
        };

        let entry = self
            .view
            .blob()
            .and_then(|blob| blob.entry_span(blob_index as usize).ok());
        let Some((prefix, len)) = entry else {
            warn!("skipping unreadable #Blob entry at {blob_index:#x}");
            return;
        };

        self.apply(mode, span.offset + blob_index as usize + prefix, len);
    }

    /// Absolute file span `(offset, size)` of one table row.
    pub(crate) fn row_span(&self, table: TableId, rid: u32) -> Option<(usize, usize)> {
        let offset = self.view.row_file_offset(table, rid)?;
        let size = crate::metadata::tables::row_size_of(table, &self.view.tables.info) as usize;
        Some((offset, size))
    }

    /// Full sub-walk of one type: methods, fields, then the TypeDef row
    /// payload (Flags + TypeName + TypeNamespace + Extends).
    pub(crate) fn walk_type(&mut self, type_rid: u32, mode: WalkMode) {
        if let Some((start, end)) = method_range(&self.view, type_rid) {
            for method_rid in start..end {
                self.walk_method(method_rid, mode);
            }
        }

        if let Some((start, end)) = field_range(&self.view, type_rid) {
            for field_rid in start..end {
                self.walk_field(field_rid, mode);
            }
        }

        if let Some(offset) = self.view.row_file_offset(TableId::TypeDef, type_rid) {
            let payload = TypeDefRow::payload_size(&self.view.tables.info) as usize;
            self.apply(mode, offset, payload);
        }
    }

    /// Sub-walk of one method: body footprint, signature blob payload,
    /// Param rows, then the MethodDef row payload excluding ParamList.
    pub(crate) fn walk_method(&mut self, method_rid: u32, mode: WalkMode) {
        let Some(method) = self.view.tables.tables.method_def.get(method_rid) else {
            return;
        };
        let (rva, signature, token) = (method.rva, method.signature, method.token);

        if rva != 0 {
            match self.method_body_span(rva) {
                Ok((offset, total)) => {
                    self.apply(mode, offset, total);
                    if mode == WalkMode::Zero {
                        self.stats.method_bodies_zeroed += 1;
                    }
                }
                Err(error) => {
                    warn!("skipping body of method {:#010x}: {error}", token.value());
                }
            }
        }

        self.apply_blob_payload(mode, signature);

        if let Some((start, end)) = param_range(&self.view, method_rid) {
            for param_rid in start..end {
                if let Some((offset, size)) = self.row_span(TableId::Param, param_rid) {
                    self.apply(mode, offset, size);
                }
            }
        }

        if let Some(offset) = self.view.row_file_offset(TableId::MethodDef, method_rid) {
            let payload = MethodDefRow::payload_size(&self.view.tables.info) as usize;
            self.apply(mode, offset, payload);
        }
    }

    /// Sub-walk of one field: signature blob payload plus the Field row.
    /// FieldRVA static data stays in place; its size is not derivable from
    /// metadata alone.
    pub(crate) fn walk_field(&mut self, field_rid: u32, mode: WalkMode) {
        let Some(field) = self.view.tables.tables.field.get(field_rid) else {
            return;
        };
        let signature = field.signature;

        self.apply_blob_payload(mode, signature);

        if let Some((offset, size)) = self.row_span(TableId::Field, field_rid) {
            self.apply(mode, offset, size);
        }
    }

    /// Resolve a method body's file offset and total footprint (header,
    /// code, aligned exception sections).
    pub(crate) fn method_body_span(&self, rva: u32) -> crate::Result<(usize, usize)> {
        let offset = self.view.rva_to_offset(rva)?;
        if offset >= self.view.data().len() {
            return Err(crate::Error::OutOfBounds);
        }

        let body = MethodBody::read(&self.view.data()[offset..])?;
        Ok((offset, body.size_total))
    }
}
