//! Raw type collection from documentation comments.
//!
//! Closure type annotations live in JSDoc tags, e.g. `@param {x.y.Thing} p`.
//! The collector stores the brace-wrapped type text verbatim (normalized,
//! braces stripped), which can carry extra symbols like `!` or
//! `Array<ts.my.Namespace>`. That is enough to recognize requires that only
//! back comment types, without building a full Closure type parser.

use std::collections::HashSet;

use crate::extract::{ParamTypeIssue, Span};
use crate::namespace::normalize;

/// Tags whose value may carry a type annotation.
const RELEVANT_TAG_NAMES: [&str; 5] = ["param", "return", "type", "typedef", "implements"];

/// Collects the `{...}`-wrapped type strings of all relevant tags in a
/// documentation comment into `raw_types`. Non-doc comments and malformed
/// annotations are silently skipped.
pub fn collect_comment_types(comment_text: &str, raw_types: &mut HashSet<String>) {
    if !comment_text.starts_with("/**") {
        // All relevant comments in Closure are JSDoc comments.
        return;
    }

    let bytes = comment_text.as_bytes();
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] != b'@' {
            i += 1;
            continue;
        }
        let tag_start = i + 1;
        let mut tag_end = tag_start;
        while tag_end < bytes.len() && (bytes[tag_end] as char).is_ascii_alphanumeric() {
            tag_end += 1;
        }
        let tag = &comment_text[tag_start..tag_end];
        i = tag_end;
        if !RELEVANT_TAG_NAMES.contains(&tag) {
            continue;
        }

        // Closure type annotations are always embraced in { }.
        let mut j = tag_end;
        while j < bytes.len() && (bytes[j] as char).is_whitespace() {
            j += 1;
        }
        if j >= bytes.len() || bytes[j] != b'{' {
            continue;
        }
        if let Some(inner) = read_balanced_braces(comment_text, j) {
            raw_types.insert(normalize(inner));
            i = j + inner.len() + 2;
        }
    }
}

/// Checks the `@param` tags of a documentation comment for annotations whose
/// type is absent or trails the parameter name (`@param name {type}` instead
/// of `@param {type} name`). A tag with no value at all on its line is left
/// alone; the annotation may legitimately continue elsewhere.
pub fn check_param_annotations(
    comment_text: &str,
    comment_span: &Span,
    issues: &mut Vec<ParamTypeIssue>,
) {
    if !comment_text.starts_with("/**") {
        return;
    }

    let bytes = comment_text.as_bytes();
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] != b'@' {
            i += 1;
            continue;
        }
        let at_pos = i;
        let tag_start = i + 1;
        let mut tag_end = tag_start;
        while tag_end < bytes.len() && bytes[tag_end].is_ascii_alphanumeric() {
            tag_end += 1;
        }
        i = tag_end;
        if &comment_text[tag_start..tag_end] != "param" {
            continue;
        }

        // Only look within the tag's own line.
        let mut j = tag_end;
        while j < bytes.len() && (bytes[j] == b' ' || bytes[j] == b'\t') {
            j += 1;
        }
        if j >= bytes.len() || bytes[j] == b'\n' {
            continue;
        }
        if bytes[j] == b'{' {
            // Type annotation leads, as it should.
            continue;
        }

        let name_start = j;
        while j < bytes.len() && !bytes[j].is_ascii_whitespace() {
            j += 1;
        }
        let name_end = j;
        let name = comment_text[name_start..name_end].to_string();
        if name.starts_with('*') {
            // Continuation star or comment close; no value on this line.
            continue;
        }

        while j < bytes.len() && (bytes[j] == b' ' || bytes[j] == b'\t') {
            j += 1;
        }
        let swapped = j < bytes.len() && bytes[j] == b'{';

        let (line, column) = position_in_comment(comment_text, at_pos, comment_span);
        issues.push(ParamTypeIssue {
            name,
            swapped,
            span: Span {
                start_byte: comment_span.start_byte + at_pos,
                end_byte: comment_span.start_byte + name_end,
                line,
                column,
            },
        });
        i = j;
    }
}

/// Line and column of a byte offset inside a comment, relative to where the
/// comment itself starts.
fn position_in_comment(comment_text: &str, offset: usize, comment: &Span) -> (usize, usize) {
    let before = &comment_text[..offset];
    match before.rfind('\n') {
        Some(newline) => (
            comment.line + before.matches('\n').count(),
            offset - newline,
        ),
        None => (comment.line, comment.column + offset),
    }
}

/// The text between the brace at `open` and its matching closing brace.
/// Returns None for unbalanced annotations (record types may nest braces).
fn read_balanced_braces(text: &str, open: usize) -> Option<&str> {
    let mut depth = 0usize;
    for (offset, c) in text[open..].char_indices() {
        match c {
            '{' => depth += 1,
            '}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(&text[open + 1..open + offset]);
                }
            }
            _ => {}
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    fn collect(comment: &str) -> HashSet<String> {
        let mut types = HashSet::new();
        collect_comment_types(comment, &mut types);
        types
    }

    #[test]
    fn test_param_type_collected() {
        let types = collect("/**\n * @param {x.y.Thing} thing the thing\n */");
        assert!(types.contains("x.y.Thing"));
        assert_eq!(types.len(), 1);
    }

    #[test]
    fn test_all_relevant_tags() {
        let types = collect(
            "/**\n * @param {a.b.P} p\n * @return {a.b.R}\n * @type {a.b.T}\n * @typedef {a.b.D}\n * @implements {a.b.I}\n */",
        );
        for t in ["a.b.P", "a.b.R", "a.b.T", "a.b.D", "a.b.I"] {
            assert!(types.contains(t), "missing {t}");
        }
    }

    #[test]
    fn test_irrelevant_tags_skipped() {
        let types = collect("/**\n * @see {x.y.Ref}\n * @deprecated {x.y.Old}\n */");
        assert!(types.is_empty());
    }

    #[test]
    fn test_generic_type_kept_verbatim() {
        let types = collect("/** @type {Array<Object<ts.my.Namespace>>} */");
        assert!(types.contains("Array<Object<ts.my.Namespace>>"));
    }

    #[test]
    fn test_record_type_braces_balanced() {
        let types = collect("/** @param {{name: string, id: a.b.Id}} rec */");
        assert!(types.contains("{name:string,id:a.b.Id}"));
    }

    #[test]
    fn test_malformed_annotation_skipped() {
        let types = collect("/** @param missingBraces p\n * @type {unclosed */");
        assert!(types.is_empty());
    }

    #[test]
    fn test_line_comment_ignored() {
        let types = collect("// @type {x.y.Z}");
        assert!(types.is_empty());
    }

    #[test]
    fn test_plain_block_comment_ignored() {
        let types = collect("/* @type {x.y.Z} */");
        assert!(types.is_empty());
    }

    #[test]
    fn test_whitespace_inside_type_normalized() {
        let types = collect("/** @type {Object<string,\n *   x.y.Z>} */");
        assert!(types.iter().any(|t| t.contains("x.y.Z")));
    }

    // ===== @param annotation positions =====

    fn check_params(comment: &str) -> Vec<ParamTypeIssue> {
        let span = Span {
            start_byte: 0,
            end_byte: comment.len(),
            line: 1,
            column: 1,
        };
        let mut issues = Vec::new();
        check_param_annotations(comment, &span, &mut issues);
        issues
    }

    #[test]
    fn test_leading_type_annotation_is_fine() {
        assert!(check_params("/** @param {number} count */").is_empty());
    }

    #[test]
    fn test_trailing_type_is_swappable() {
        let issues = check_params("/** @param count {number} */");
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].name, "count");
        assert!(issues[0].swapped);
    }

    #[test]
    fn test_absent_type_is_not_swappable() {
        let issues = check_params("/** @param count the element count */");
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].name, "count");
        assert!(!issues[0].swapped);
    }

    #[test]
    fn test_bare_param_tag_left_alone() {
        assert!(check_params("/** @param\n * {number} count */").is_empty());
    }

    #[test]
    fn test_issue_span_points_at_the_tag() {
        let issues = check_params("/**\n * @param count {number}\n */");
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].span.line, 2);
        assert_eq!(issues[0].span.column, 4);
    }

    #[test]
    fn test_non_doc_comment_params_ignored() {
        assert!(check_params("/* @param count {number} */").is_empty());
        assert!(check_params("// @param count {number}").is_empty());
    }

    #[test]
    fn test_other_tags_not_checked() {
        assert!(check_params("/** @return count {number} */").is_empty());
    }
}
