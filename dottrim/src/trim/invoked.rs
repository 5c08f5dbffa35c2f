//! Invoked method names and the invoked-type resolution.
//!
//! Callers hand the engine a set of fully-qualified method names
//! (`Namespace.Type.Method`). Matching is case-insensitive and constructor
//! spellings are unified: `T..ctor` and `T._ctor` denote the same member
//! (likewise `..cctor`/`._cctor`), and a trailing `<T,U>` generic parameter
//! list is folded to the metadata arity form `` Name`2 ``. Every name —
//! caller-supplied or metadata-derived — passes through the same
//! canonicalisation, so a lookup on either spelling matches.
//!
//! Resolution expands names into row indices: the owning TypeDef of every
//! invoked method, every type named by those methods' signatures
//! (recursively through generic instantiations, arrays, pointers and
//! modifiers), the `<Module>` pseudo-type, and the compiler-private literal
//! holders (`<PrivateImplementationDetails>` and friends) that IL references
//! without naming.

use log::warn;
use rustc_hash::FxHashSet;

use crate::{
    metadata::{signatures::SignatureParser, tables::TableId, token::Token, view::CilView},
    Result,
};

/// Compiler-emitted types that always stay, whatever the trace says.
const PRIVATE_IMPL_PREFIX: &str = "<privateimplementationdetails>";
const STATIC_ARRAY_INIT_PREFIX: &str = "__staticarrayinittypesize=";

/// The caller-supplied set of invoked method names, canonicalised.
#[derive(Debug, Default, Clone)]
pub struct InvokedMethods {
    names: FxHashSet<String>,
}

impl InvokedMethods {
    /// Build a set from an iterator of fully-qualified method names.
    pub fn from_names<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut set = InvokedMethods::default();
        for name in names {
            set.insert(name.as_ref());
        }
        set
    }

    /// Add one fully-qualified method name.
    pub fn insert(&mut self, name: &str) {
        self.names.insert(canonicalize_name(name));
    }

    /// Membership test for an already-canonical name.
    #[must_use]
    pub fn contains_canonical(&self, canonical: &str) -> bool {
        self.names.contains(canonical)
    }

    /// Number of distinct names in the set.
    #[must_use]
    pub fn len(&self) -> usize {
        self.names.len()
    }

    /// True when no method was named.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

/// Canonical form of a (possibly fully-qualified) name: lower-case,
/// constructor dots unified to underscores, generic parameter lists folded
/// to arity form.
#[must_use]
pub fn canonicalize_name(name: &str) -> String {
    let mut canonical = fold_generic_params(name.trim());
    canonical.make_ascii_lowercase();

    if let Some(stripped) = canonical.strip_suffix("..cctor") {
        canonical = format!("{stripped}._cctor");
    } else if let Some(stripped) = canonical.strip_suffix("..ctor") {
        canonical = format!("{stripped}._ctor");
    }

    canonical
}

/// Rewrite every `<T,U,...>` parameter list to the ``  `N  `` arity suffix
/// the metadata uses. Nested lists count only their own top-level commas.
///
/// A `<` only opens a parameter list when it follows an identifier
/// character; compiler-emitted names such as `<Module>`,
/// `<PrivateImplementationDetails>` or `<>c__DisplayClass` keep their
/// angle brackets verbatim.
fn fold_generic_params(name: &str) -> String {
    let mut result = String::with_capacity(name.len());
    let mut chars = name.chars();

    while let Some(current) = chars.next() {
        let after_identifier = result
            .chars()
            .last()
            .is_some_and(|last| last.is_alphanumeric() || last == '_' || last == '`');
        if current != '<' || !after_identifier {
            result.push(current);
            continue;
        }

        let mut depth = 1_u32;
        let mut arity = 1_u32;
        for inner in chars.by_ref() {
            match inner {
                '<' => depth += 1,
                '>' => {
                    depth -= 1;
                    if depth == 0 {
                        break;
                    }
                }
                ',' if depth == 1 => arity += 1,
                _ => {}
            }
        }

        result.push('`');
        result.push_str(&arity.to_string());
    }

    result
}

/// The outcome of resolving an [`InvokedMethods`] set against one image.
pub struct ResolvedInvocations {
    /// 0-based TypeDef row indices of invoked (preserved) types
    pub types: FxHashSet<u32>,
    /// 1-based MethodDef row ids whose name is in the invoked set
    pub methods: FxHashSet<u32>,
}

impl ResolvedInvocations {
    /// True when the 1-based TypeDef row id is invoked.
    #[must_use]
    pub fn type_invoked(&self, rid: u32) -> bool {
        rid >= 1 && self.types.contains(&(rid - 1))
    }
}

/// Resolve the invoked method names against the parsed image.
///
/// # Errors
/// Fails only on a missing `#Strings` heap; individual unresolvable names
/// or signatures are skipped.
pub fn resolve(view: &CilView, invoked: &InvokedMethods) -> Result<ResolvedInvocations> {
    let strings = view
        .strings()
        .ok_or_else(|| malformed_error!("Image carries no #Strings heap"))?;

    let type_def = &view.tables.tables.type_def;
    let type_count = type_def.row_count();

    // Full name of every TypeDef, canonical form, indexed by rid - 1
    let mut type_names = Vec::with_capacity(type_count as usize);
    for row in type_def.iter() {
        let name = strings.get(row.type_name as usize).unwrap_or_default();
        let namespace = strings.get(row.type_namespace as usize).unwrap_or_default();

        let full = if namespace.is_empty() {
            name.to_string()
        } else {
            format!("{namespace}.{name}")
        };
        type_names.push(canonicalize_name(&full));
    }

    // Type names the caller reached by naming one of their methods
    let mut wanted_types: FxHashSet<String> = FxHashSet::default();
    for canonical in &invoked.names {
        if let Some(split) = canonical.rfind('.') {
            wanted_types.insert(canonical[..split].to_string());
        }
    }

    let mut types: FxHashSet<u32> = FxHashSet::default();

    // Row 0 is the <Module> pseudo-type and always stays
    if type_count > 0 {
        types.insert(0);
    }

    for (index, full_name) in type_names.iter().enumerate() {
        if wanted_types.contains(full_name) || is_compiler_private(full_name) {
            types.insert(index as u32);
        }
    }

    // Children of compiler-private types hold their literal payloads
    let mut changed = true;
    while changed {
        changed = false;
        for nested in view.tables.tables.nested_class.iter() {
            let parent_index = nested.enclosing_class.wrapping_sub(1);
            let child_index = nested.nested_class.wrapping_sub(1);

            if types.contains(&parent_index)
                && parent_is_private(&type_names, parent_index)
                && types.insert(child_index)
            {
                changed = true;
            }
        }
    }

    // Match every method's canonical full name against the invoked set
    let mut methods: FxHashSet<u32> = FxHashSet::default();

    for type_rid in 1..=type_count {
        let Some((start, end)) = method_range(view, type_rid) else {
            continue;
        };
        let type_name = &type_names[type_rid as usize - 1];

        for method_rid in start..end {
            let Some(method) = view.tables.tables.method_def.get(method_rid) else {
                continue;
            };

            let name = strings.get(method.name as usize).unwrap_or_default();
            let full = canonicalize_name(&format!("{type_name}.{name}"));

            if invoked.contains_canonical(&full) {
                methods.insert(method_rid);
            }
        }
    }

    // Expand by the invoked methods' signatures: every type a signature
    // names joins the set, TypeRefs via their name, TypeDefs directly
    let mut extra_names: FxHashSet<String> = FxHashSet::default();
    for &method_rid in &methods {
        let Some(method) = view.tables.tables.method_def.get(method_rid) else {
            continue;
        };

        let Some(blob) = view.blob() else { break };
        let Ok(data) = blob.get(method.signature as usize) else {
            warn!(
                "skipping unreadable signature of method {:#010x}",
                method.token.value()
            );
            continue;
        };

        let mut parser = SignatureParser::new(data);
        let signature = match parser.parse_method_signature() {
            Ok(signature) => signature,
            Err(error) => {
                warn!(
                    "skipping malformed signature of method {:#010x}: {error}",
                    method.token.value()
                );
                continue;
            }
        };

        let mut tokens = Vec::new();
        signature.collect_tokens(&mut tokens);

        for token in tokens {
            collect_signature_type(view, &strings, token, &mut types, &mut extra_names);
        }
    }

    if !extra_names.is_empty() {
        for (index, full_name) in type_names.iter().enumerate() {
            if extra_names.contains(full_name) {
                types.insert(index as u32);
            }
        }
    }

    Ok(ResolvedInvocations { types, methods })
}

fn is_compiler_private(canonical_name: &str) -> bool {
    canonical_name.starts_with(PRIVATE_IMPL_PREFIX)
        || canonical_name.starts_with(STATIC_ARRAY_INIT_PREFIX)
}

fn parent_is_private(type_names: &[String], parent_index: u32) -> bool {
    type_names
        .get(parent_index as usize)
        .is_some_and(|name| name.starts_with(PRIVATE_IMPL_PREFIX))
}

/// Record a type named by a signature: TypeDefs join by index, TypeRefs by
/// their resolved name. Anything else (TypeSpec, out-of-range rows) is
/// silently omitted.
fn collect_signature_type(
    view: &CilView,
    strings: &crate::metadata::streams::Strings<'_>,
    token: Token,
    types: &mut FxHashSet<u32>,
    extra_names: &mut FxHashSet<String>,
) {
    match TableId::from_token_table(token.table()) {
        Some(TableId::TypeDef) if token.row() >= 1 => {
            if token.row() <= view.tables.tables.type_def.row_count() {
                types.insert(token.row() - 1);
            }
        }
        Some(TableId::TypeRef) => {
            let Some(type_ref) = view.tables.tables.type_ref.get(token.row()) else {
                return;
            };

            let name = strings.get(type_ref.type_name as usize).unwrap_or_default();
            let namespace = strings
                .get(type_ref.type_namespace as usize)
                .unwrap_or_default();

            let full = if namespace.is_empty() {
                name.to_string()
            } else {
                format!("{namespace}.{name}")
            };
            extra_names.insert(canonicalize_name(&full));
        }
        _ => {}
    }
}

/// The half-open MethodDef rid range `[start, end)` owned by a TypeDef row.
pub fn method_range(view: &CilView, type_rid: u32) -> Option<(u32, u32)> {
    member_range(
        view.tables.tables.type_def.get(type_rid)?.method_list,
        view.tables
            .tables
            .type_def
            .get(type_rid + 1)
            .map(|next| next.method_list),
        view.tables.tables.method_def.row_count(),
    )
}

/// The half-open Field rid range `[start, end)` owned by a TypeDef row.
pub fn field_range(view: &CilView, type_rid: u32) -> Option<(u32, u32)> {
    member_range(
        view.tables.tables.type_def.get(type_rid)?.field_list,
        view.tables
            .tables
            .type_def
            .get(type_rid + 1)
            .map(|next| next.field_list),
        view.tables.tables.field.row_count(),
    )
}

/// The half-open Param rid range `[start, end)` owned by a MethodDef row.
pub fn param_range(view: &CilView, method_rid: u32) -> Option<(u32, u32)> {
    member_range(
        view.tables.tables.method_def.get(method_rid)?.param_list,
        view.tables
            .tables
            .method_def
            .get(method_rid + 1)
            .map(|next| next.param_list),
        view.tables.tables.param.row_count(),
    )
}

/// Resolve a member-list run: `start` from this row, `end` from the next
/// row's list index or the member table length. Malformed indices degrade to
/// an empty range rather than an error.
fn member_range(start: u32, next_start: Option<u32>, member_count: u32) -> Option<(u32, u32)> {
    if start == 0 || member_count == 0 {
        return None;
    }

    let end = next_start.unwrap_or(member_count + 1);
    let start = start.min(member_count + 1);
    let end = end.min(member_count + 1);

    (start < end).then_some((start, end))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn constructor_aliasing() {
        assert_eq!(canonicalize_name("T..ctor"), "t._ctor");
        assert_eq!(canonicalize_name("T._ctor"), "t._ctor");
        assert_eq!(canonicalize_name("Ns.T..cctor"), "ns.t._cctor");
        assert_eq!(canonicalize_name("Ns.T._cctor"), "ns.t._cctor");
    }

    #[test]
    fn case_insensitive() {
        assert_eq!(canonicalize_name("MyApp.Program.Main"), "myapp.program.main");
    }

    #[test]
    fn generic_arity_folding() {
        assert_eq!(canonicalize_name("List<T>.Add"), "list`1.add");
        assert_eq!(
            canonicalize_name("System.Collections.Dictionary<K,V>.TryGetValue"),
            "system.collections.dictionary`2.trygetvalue"
        );
        // Nested lists do not inflate the outer arity
        assert_eq!(
            canonicalize_name("Outer<Dictionary<K,V>,T>.M"),
            "outer`2.m"
        );
    }

    #[test]
    fn compiler_names_keep_their_brackets() {
        assert_eq!(canonicalize_name("<Module>"), "<module>");
        assert_eq!(
            canonicalize_name("<PrivateImplementationDetails>"),
            "<privateimplementationdetails>"
        );
        assert_eq!(
            canonicalize_name("<>c__DisplayClass0_0.M"),
            "<>c__displayclass0_0.m"
        );
    }

    #[test]
    fn invoked_set_matches_either_spelling() {
        let set = InvokedMethods::from_names(["N.T..ctor"]);
        assert!(set.contains_canonical(&canonicalize_name("N.T._ctor")));
        assert!(set.contains_canonical(&canonicalize_name("n.t..CTOR")));
    }

    #[test]
    fn member_ranges() {
        // start 1, next row starts at 3, table has 4 members
        assert_eq!(member_range(1, Some(3), 4), Some((1, 3)));
        // last row runs to the end of the table
        assert_eq!(member_range(3, None, 4), Some((3, 5)));
        // empty run
        assert_eq!(member_range(3, Some(3), 4), None);
        // no member table at all
        assert_eq!(member_range(1, None, 0), None);
        // zero list index means no members
        assert_eq!(member_range(0, Some(2), 4), None);
    }
}
