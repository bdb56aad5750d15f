//! Support data for external quick-fix rewriters.
//!
//! The core never edits source text; diagnostics carry
//! [`crate::validate::FixAction`] descriptors, and rewriters that insert
//! alias-bound requires into `goog.module` files can ask
//! [`find_safe_reference`] for a local binding name that does not collide
//! with anything already referenced in the document.

use regex::Regex;

/// Names that must not be shadowed by a require binding.
const RESERVED_KEYWORDS: [&str; 8] = [
    "document",
    "Array",
    "localStorage",
    "Map",
    "Set",
    "string",
    "number",
    "Object",
];

/// Conventional plural bindings for the reserved primitive namespaces
/// (`goog.string` imports as `strings`).
fn default_replacement(name: &str) -> Option<&'static str> {
    match name {
        "string" => Some("strings"),
        "number" => Some("numbers"),
        _ => None,
    }
}

/// Proposes a local binding name for a required namespace.
///
/// Starts from the last namespace segment and disambiguates while the
/// candidate is a reserved name or already referenced in `document_text`:
/// earlier namespace segments are prepended, a plural `s` or leading `_`
/// serve as last resorts. The initial capitalization of the last segment is
/// preserved.
pub fn find_safe_reference(document_text: &str, required_namespace: &str) -> String {
    let parts: Vec<&str> = required_namespace.split('.').collect();
    let mut short = parts[parts.len() - 1].to_string();
    let needs_uppercase = short.chars().next().is_some_and(|c| c.is_uppercase());

    let mut part_index = parts.len() as isize - 1;

    while RESERVED_KEYWORDS.contains(&short.as_str()) {
        if let Some(replacement) = default_replacement(&short) {
            short = replacement.to_string();
            continue;
        }
        part_index -= 1;
        if part_index >= 0 {
            short = format!("{}{}", parts[part_index as usize], short);
        } else {
            short = format!("_{short}");
        }
    }

    while is_referenced_in_document(document_text, &short) {
        part_index -= 1;
        if part_index >= 0 {
            short = format!("{}_{}", parts[part_index as usize], short);
        } else if !short.ends_with('s') {
            short.push('s');
        } else {
            short = format!("_{short}");
        }
    }

    if needs_uppercase {
        let mut chars = short.chars();
        if let Some(first) = chars.next() {
            short = first.to_uppercase().collect::<String>() + chars.as_str();
        }
    }
    short
}

/// True when `name` already appears as a dotted reference in the document.
fn is_referenced_in_document(document_text: &str, name: &str) -> bool {
    match Regex::new(&format!(r"[^.\w]{}\.", regex::escape(name))) {
        Ok(re) => re.is_match(document_text),
        Err(_) => false,
    }
}
