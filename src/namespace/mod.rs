//! Namespace string utilities and the per-file alias table.
//!
//! Closure namespaces are dot-separated identifiers (`goog.events.EventType`).
//! All comparisons and set memberships happen on the normalized form, which
//! contains no whitespace (multi-line call expressions otherwise leak their
//! line breaks into the extracted text).

use std::collections::HashMap;

/// Roots that never denote a Closure namespace, even when followed by a
/// dotted path (browser globals and jQuery-style markers).
const EXCLUDED_ROOTS: [&str; 5] = ["document.", "window.", "location.", "this.", "$"];

/// The declaration keyword itself; `goog.module.declareLegacyNamespace()`
/// must not register `goog.module` as a dependency.
const MODULE_KEYWORD: &str = "goog.module";

/// Removes all whitespace (including newlines) from a namespace string.
///
/// Idempotent: `normalize(normalize(s)) == normalize(s)`.
pub fn normalize(s: &str) -> String {
    s.chars().filter(|c| !c.is_whitespace()).collect()
}

/// Returns true if `namespace` cannot be a valid Closure dependency.
///
/// A valid dependent namespace contains at least one dot, is not rooted in a
/// browser global, contains no call or index markers, and does not reference
/// a prototype member.
pub fn is_invalid_dependency(namespace: &str) -> bool {
    !namespace.contains('.')
        || EXCLUDED_ROOTS.iter().any(|root| namespace.starts_with(root))
        || namespace.contains('(')
        || namespace.contains('[')
        || namespace.contains(".prototype.")
        || namespace.ends_with(".prototype")
        || namespace == MODULE_KEYWORD
}

/// File-scoped mapping between full namespaces and the short local names
/// bound at their require site, e.g. `const dom = goog.require('goog.dom')`.
///
/// The first require of a namespace wins; duplicate requires never update
/// the table, so the alias in effect is always the one from the declaration
/// that validation keeps.
#[derive(Debug, Default)]
pub struct AliasTable {
    short_to_full: HashMap<String, String>,
    full_to_short: HashMap<String, String>,
}

impl AliasTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a binding of `full` namespace to the local `short` name.
    /// A name that is already bound keeps its first binding.
    pub fn insert(&mut self, full: &str, short: &str) {
        let full = normalize(full);
        let short = normalize(short);
        if self.full_to_short.contains_key(&full) || self.short_to_full.contains_key(&short) {
            return;
        }
        self.short_to_full.insert(short.clone(), full.clone());
        self.full_to_short.insert(full, short);
    }

    /// Resolves a reference back to its full namespace.
    ///
    /// Matches the whole name first, then the leading segment of a dotted
    /// path (`dom.TagName` resolves to `goog.dom.TagName` when `dom` is an
    /// alias for `goog.dom`). Unresolved names are returned normalized.
    pub fn resolve(&self, name: &str) -> String {
        let normalized = normalize(name);
        if let Some(full) = self.short_to_full.get(&normalized) {
            return full.clone();
        }
        if let Some((head, tail)) = normalized.split_once('.') {
            if let Some(full) = self.short_to_full.get(head) {
                return format!("{full}.{tail}");
            }
        }
        normalized
    }

    /// The short name bound for a full namespace, if any.
    pub fn short_for(&self, full: &str) -> Option<&str> {
        self.full_to_short.get(full).map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.short_to_full.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // ===== Normalization =====

    #[test]
    fn test_normalize_strips_whitespace_and_newlines() {
        assert_eq!(normalize("goog .\n  events.EventType"), "goog.events.EventType");
        assert_eq!(normalize("a.b.C"), "a.b.C");
    }

    #[test]
    fn test_normalize_idempotent() {
        let once = normalize("ts. commons .\tConstants");
        assert_eq!(normalize(&once), once);
    }

    // ===== Invalid dependency filter =====

    #[test]
    fn test_invalid_without_separator() {
        assert!(is_invalid_dependency("setTimeout"));
        assert!(is_invalid_dependency("goog"));
    }

    #[test]
    fn test_invalid_excluded_roots() {
        assert!(is_invalid_dependency("document.body"));
        assert!(is_invalid_dependency("window.location"));
        assert!(is_invalid_dependency("this.handler"));
        assert!(is_invalid_dependency("$element.find"));
    }

    #[test]
    fn test_invalid_call_index_and_prototype_markers() {
        assert!(is_invalid_dependency("a.b.getCurrent()"));
        assert!(is_invalid_dependency("a.b[0].c"));
        assert!(is_invalid_dependency("a.b.prototype"));
        assert!(is_invalid_dependency("a.b.prototype.method"));
    }

    #[test]
    fn test_invalid_module_keyword() {
        assert!(is_invalid_dependency("goog.module"));
    }

    #[test]
    fn test_valid_namespaces() {
        assert!(!is_invalid_dependency("goog.array"));
        assert!(!is_invalid_dependency("ts.commons.Constants"));
        assert!(!is_invalid_dependency("goog.module.ModuleManager"));
    }

    // ===== Alias table =====

    #[test]
    fn test_alias_resolves_exact_name() {
        let mut table = AliasTable::new();
        table.insert("a.b.LongName", "short");
        assert_eq!(table.resolve("short"), "a.b.LongName");
        assert_eq!(table.short_for("a.b.LongName"), Some("short"));
    }

    #[test]
    fn test_alias_resolves_leading_segment() {
        let mut table = AliasTable::new();
        table.insert("goog.dom", "dom");
        assert_eq!(table.resolve("dom.TagName"), "goog.dom.TagName");
    }

    #[test]
    fn test_unknown_name_is_normalized_only() {
        let table = AliasTable::new();
        assert_eq!(table.resolve("x .y. Z"), "x.y.Z");
    }

    #[test]
    fn test_first_binding_wins() {
        let mut table = AliasTable::new();
        table.insert("a.b.C", "first");
        table.insert("a.b.C", "second");
        assert_eq!(table.resolve("first"), "a.b.C");
        assert_eq!(table.short_for("a.b.C"), Some("first"));
        // The losing short name stays unbound.
        assert_eq!(table.resolve("second"), "second");
    }
}
