//! The `#Strings` heap trimmer.
//!
//! After the structural pass, many identifier strings are referenced only
//! by rows that are now zero. This pass collects every `#Strings` offset
//! still referenced by a preserved row, then clears the character bytes of
//! every other entry. NUL separators are left in place so the heap still
//! parses, and the heap size never changes.
//!
//! Two classes of referencing rows count as preserved:
//!
//! * rows the structural pass kept — TypeDef, MethodDef, Field and Param
//!   rows of preserved types/methods;
//! * rows the engine never trims at all — TypeRef, MemberRef, Module,
//!   Assembly, AssemblyRef, ModuleRef, File, and every Property and Event
//!   row (property/event payloads are never zeroed, so their names stay
//!   referenced too).
//!
//! Compilers share string suffixes, so a referenced offset may point into
//! the middle of an entry; an entry stays whenever any kept offset lands
//! inside its span.

use crate::trim::{engine::TrimEngine, field_range, param_range, WalkMode};

impl TrimEngine {
    /// Clear every `#Strings` entry no preserved row references.
    pub(crate) fn trim_strings(&mut self) {
        let Some(span) = self.view().strings_span else {
            return;
        };

        let mut kept = self.collect_kept_offsets();
        kept.sort_unstable();
        kept.dedup();

        // Entry spans have to be collected before mutation starts
        let entries: Vec<(usize, usize)> = match self.view().strings() {
            Some(strings) => strings
                .entries()
                .map(|(offset, bytes)| (offset, bytes.len()))
                .collect(),
            None => return,
        };

        for (offset, len) in entries {
            if len == 0 {
                continue;
            }

            // Keep the entry if any referenced offset points into it
            let first_inside = kept.partition_point(|&k| (k as usize) < offset);
            let referenced = kept
                .get(first_inside)
                .is_some_and(|&k| (k as usize) < offset + len);

            if referenced {
                self.apply(WalkMode::Count, span.offset + offset, len);
            } else {
                self.apply(WalkMode::Zero, span.offset + offset, len);
                self.stats_mut().strings_zeroed += 1;
            }
        }
    }

    /// Every `#Strings` offset a preserved row references.
    fn collect_kept_offsets(&self) -> Vec<u32> {
        let view = self.view();
        let tables = &view.tables.tables;
        let mut kept = Vec::new();

        for type_rid in 1..=view.tables.tables.type_def.row_count() {
            if !self.resolved().type_invoked(type_rid) {
                continue;
            }

            let Some(row) = tables.type_def.get(type_rid) else {
                continue;
            };
            kept.push(row.type_name);
            kept.push(row.type_namespace);

            if let Some((start, end)) = field_range(view, type_rid) {
                for field_rid in start..end {
                    if let Some(field) = tables.field.get(field_rid) {
                        kept.push(field.name);
                    }
                }
            }
        }

        for &method_rid in self.preserved_methods() {
            let Some(method) = tables.method_def.get(method_rid) else {
                continue;
            };
            kept.push(method.name);

            if let Some((start, end)) = param_range(view, method_rid) {
                for param_rid in start..end {
                    if let Some(param) = tables.param.get(param_rid) {
                        kept.push(param.name);
                    }
                }
            }
        }

        // Rows the engine never clears keep their names unconditionally
        for row in tables.type_ref.iter() {
            kept.push(row.type_name);
            kept.push(row.type_namespace);
        }
        for row in tables.member_ref.iter() {
            kept.push(row.name);
        }
        for row in tables.module.iter() {
            kept.push(row.name);
        }
        for row in tables.assembly.iter() {
            kept.push(row.name);
            kept.push(row.culture);
        }
        for row in tables.assembly_ref.iter() {
            kept.push(row.name);
            kept.push(row.culture);
        }
        for row in tables.module_ref.iter() {
            kept.push(row.name);
        }
        for row in tables.file.iter() {
            kept.push(row.name);
        }
        for row in tables.property.iter() {
            kept.push(row.name);
        }
        for row in tables.event.iter() {
            kept.push(row.name);
        }

        kept.retain(|&offset| offset != 0);
        kept
    }
}
