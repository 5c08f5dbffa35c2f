//! The deep reference closure.
//!
//! Runs over the already-trimmed image and computes the set of auxiliary
//! metadata a preserved entity can still reach: tokens referenced by IL
//! bodies, parent links of MemberRef/MethodSpec rows, signature and value
//! blobs, interface implementations, custom attributes, and `ldstr` user
//! strings. Everything outside that closure gets its payload cleared — row
//! slots stay (row counts are invariant), blob and user-string length
//! prefixes stay, only value bytes become zero.
//!
//! Blob reachability is tracked in the same token set as table rows, using
//! a high-nibble pseudo-token tag that cannot collide with real table ids
//! (0x00-0x2C) or with the `0x70` `ldstr` tag. `#US` offsets live in their
//! own set; they are never tokens.
//!
//! Failure is local everywhere: a malformed body or blob is logged and
//! skipped, and a bounded iteration count caps the fixed point on
//! pathological inputs.

use log::warn;
use rustc_hash::FxHashSet;

use crate::{
    assembly::scan_tokens,
    metadata::{method::MethodBody, tables::TableId, token::Token},
    trim::{engine::TrimEngine, field_range, WalkMode},
};

/// High-nibble tag marking a `#Blob` offset inside the used-token set.
const BLOB_TAG: u32 = 0xF000_0000;

/// Upper bound on fixed-point iterations; real images settle in a handful.
const MAX_CLOSURE_ITERATIONS: usize = 100;

/// Tables whose unreferenced rows are cleared by the final sweep.
const SWEPT_TABLES: [TableId; 8] = [
    TableId::TypeRef,
    TableId::MemberRef,
    TableId::Constant,
    TableId::CustomAttribute,
    TableId::StandAloneSig,
    TableId::TypeSpec,
    TableId::MethodSpec,
    TableId::InterfaceImpl,
];

fn blob_key(blob_index: u32) -> u32 {
    BLOB_TAG | blob_index
}

impl TrimEngine {
    /// Run the deep trim: seed, fixed point, attribute sweep, then the row,
    /// blob and user-string payload sweeps.
    pub(crate) fn run_closure(&mut self) {
        let mut used: FxHashSet<u32> = FxHashSet::default();
        let mut us_used: FxHashSet<u32> = FxHashSet::default();

        self.seed_closure(&mut used, &mut us_used);
        self.close_over_references(&mut used);
        self.sweep_custom_attributes(&mut used);

        self.clear_unreferenced_rows(&used);
        self.clear_unreferenced_blobs(&used);
        self.clear_unreferenced_user_strings(&us_used);
    }

    /// Seed the set from everything the structural pass preserved.
    fn seed_closure(&self, used: &mut FxHashSet<u32>, us_used: &mut FxHashSet<u32>) {
        let view = self.view();
        let tables = &view.tables.tables;

        // The module and assembly identities always stay, so their custom
        // attributes survive the parent sweep
        if !tables.module.is_empty() {
            used.insert(Token::from_parts(TableId::Module as u8, 1).value());
        }
        if !tables.assembly.is_empty() {
            used.insert(Token::from_parts(TableId::Assembly as u8, 1).value());
        }

        for type_rid in 1..=view.tables.tables.type_def.row_count() {
            if !self.resolved().type_invoked(type_rid) {
                continue;
            }

            let Some(row) = tables.type_def.get(type_rid) else {
                continue;
            };
            used.insert(row.token.value());
            if !row.extends.is_null() {
                used.insert(row.extends.token.value());
            }

            if let Some((start, end)) = field_range(view, type_rid) {
                for field_rid in start..end {
                    if let Some(field) = tables.field.get(field_rid) {
                        used.insert(field.token.value());
                        if field.signature != 0 {
                            used.insert(blob_key(field.signature));
                        }
                    }
                }
            }
        }

        for row in tables.interface_impl.iter() {
            if self.resolved().type_invoked(row.class) {
                used.insert(row.token.value());
                if !row.interface.is_null() {
                    used.insert(row.interface.token.value());
                }
            }
        }

        let preserved: Vec<u32> = self.preserved_methods().iter().copied().collect();
        for method_rid in preserved {
            self.seed_method(method_rid, used, us_used);
        }
    }

    /// Seed one preserved method: its token, signature blob, and everything
    /// its IL body references.
    fn seed_method(
        &self,
        method_rid: u32,
        used: &mut FxHashSet<u32>,
        us_used: &mut FxHashSet<u32>,
    ) {
        let Some(method) = self.view().tables.tables.method_def.get(method_rid) else {
            return;
        };
        let (rva, signature, token) = (method.rva, method.signature, method.token);

        used.insert(token.value());
        if signature != 0 {
            used.insert(blob_key(signature));
        }

        if rva == 0 {
            return;
        }

        let offset = match self.view().rva_to_offset(rva) {
            Ok(offset) if offset < self.view().data().len() => offset,
            _ => {
                warn!("skipping body of method {:#010x}: bad RVA", token.value());
                return;
            }
        };

        let body = match MethodBody::read(&self.view().data()[offset..]) {
            Ok(body) => body,
            Err(error) => {
                warn!("skipping body of method {:#010x}: {error}", token.value());
                return;
            }
        };

        if body.is_init_local && body.local_var_sig_token != 0 {
            used.insert(body.local_var_sig_token);
        }

        let code_start = offset + body.size_header;
        let code_end = code_start + body.size_code;
        if code_end > self.view().data().len() {
            warn!("skipping body of method {:#010x}: truncated", token.value());
            return;
        }

        let scan = scan_tokens(&self.view().data()[code_start..code_end]);
        if scan.degenerate {
            warn!("degenerate IL in method {:#010x}", token.value());
        }

        for il_token in scan.tokens {
            used.insert(il_token.value());
        }
        us_used.extend(scan.user_strings);
    }

    /// Propagate through MemberRef, TypeSpec, MethodSpec, StandAloneSig and
    /// Constant rows until nothing new joins the set.
    fn close_over_references(&self, used: &mut FxHashSet<u32>) {
        let tables = &self.view().tables.tables;

        for iteration in 0..MAX_CLOSURE_ITERATIONS {
            let mut changed = false;

            for row in tables.member_ref.iter() {
                if used.contains(&row.token.value()) {
                    changed |= used.insert(row.class.token.value());
                    if row.signature != 0 {
                        changed |= used.insert(blob_key(row.signature));
                    }
                }
            }

            for row in tables.type_spec.iter() {
                if used.contains(&row.token.value()) && row.signature != 0 {
                    changed |= used.insert(blob_key(row.signature));
                }
            }

            for row in tables.method_spec.iter() {
                if used.contains(&row.token.value()) {
                    changed |= used.insert(row.method.token.value());
                    if row.instantiation != 0 {
                        changed |= used.insert(blob_key(row.instantiation));
                    }
                }
            }

            for row in tables.stand_alone_sig.iter() {
                if used.contains(&row.token.value()) && row.signature != 0 {
                    changed |= used.insert(blob_key(row.signature));
                }
            }

            for row in tables.constant.iter() {
                if used.contains(&row.parent.token.value()) {
                    changed |= used.insert(row.token.value());
                    if row.value != 0 {
                        changed |= used.insert(blob_key(row.value));
                    }
                }
            }

            if !changed {
                return;
            }

            if iteration + 1 == MAX_CLOSURE_ITERATIONS {
                warn!("reference closure did not settle within {MAX_CLOSURE_ITERATIONS} rounds");
            }
        }
    }

    /// Keep every custom attribute whose parent survived, together with its
    /// constructor reference and value blob.
    fn sweep_custom_attributes(&self, used: &mut FxHashSet<u32>) {
        for row in self.view().tables.tables.custom_attribute.iter() {
            if used.contains(&row.parent.token.value()) {
                used.insert(row.token.value());
                used.insert(row.attr_type.token.value());
                if row.value != 0 {
                    used.insert(blob_key(row.value));
                }
            }
        }
    }

    /// Zero the payload of every swept-table row outside the closure. Row
    /// slots stay in place; only value bytes are cleared.
    fn clear_unreferenced_rows(&mut self, used: &FxHashSet<u32>) {
        for table in SWEPT_TABLES {
            for rid in 1..=self.view().tables.row_count(table) {
                let token = Token::from_parts(table as u8, rid);
                if used.contains(&token.value()) {
                    continue;
                }

                if let Some((offset, size)) = self.row_span(table, rid) {
                    self.apply(WalkMode::Zero, offset, size);
                    self.stats_mut().aux_rows_zeroed += 1;
                }
            }
        }
    }

    /// Walk `#Blob` as (length, data) entries and zero the data bytes of
    /// every entry outside the closure, keeping the length prefixes.
    fn clear_unreferenced_blobs(&mut self, used: &FxHashSet<u32>) {
        let Some(span) = self.view().blob_span else {
            return;
        };

        // (heap offset, prefix length, data length)
        let mut entries: Vec<(usize, usize, usize)> = Vec::new();
        {
            let Some(blob) = self.view().blob() else {
                return;
            };

            let mut position = 1_usize;
            while position < span.size {
                match blob.entry_span(position) {
                    Ok((prefix, len)) => {
                        entries.push((position, prefix, len));
                        position += prefix + len;
                    }
                    Err(error) => {
                        warn!("#Blob walk stopped at {position:#x}: {error}");
                        break;
                    }
                }
            }
        }

        for (position, prefix, len) in entries {
            if len == 0 || used.contains(&blob_key(position as u32)) {
                continue;
            }

            self.apply(WalkMode::Zero, span.offset + position + prefix, len);
            self.stats_mut().blob_entries_zeroed += 1;
        }
    }

    /// Same walk over `#US` against the collected `ldstr` offsets.
    fn clear_unreferenced_user_strings(&mut self, us_used: &FxHashSet<u32>) {
        let Some(span) = self.view().us_span else {
            return;
        };

        let mut entries: Vec<(usize, usize, usize)> = Vec::new();
        {
            let Some(us) = self.view().user_strings() else {
                return;
            };

            let mut position = 1_usize;
            while position < span.size {
                match us.entry_span(position) {
                    Ok((prefix, len)) => {
                        entries.push((position, prefix, len));
                        position += prefix + len;
                    }
                    Err(error) => {
                        warn!("#US walk stopped at {position:#x}: {error}");
                        break;
                    }
                }
            }
        }

        for (position, prefix, len) in entries {
            if len == 0 || us_used.contains(&(position as u32)) {
                continue;
            }

            self.apply(WalkMode::Zero, span.offset + position + prefix, len);
            self.stats_mut().us_entries_zeroed += 1;
        }
    }
}
