//! Type-safety style checks on the syntax tree.
//!
//! Two constructs defeat the Closure compiler's type checking: bracket
//! access with a constant string key (`myVar['field']` instead of
//! `myVar.field`) and class methods without a documentation comment. Both
//! are collected during the same traversal that gathers dependencies.

use once_cell::sync::Lazy;
use regex::Regex;
use tree_sitter::Node;

use crate::extract::{BracketAccess, ExtractionResult, Span, UndocumentedMethod};

/// A quoted plain word, e.g. `'fieldName'`. Computed keys and keys that are
/// not valid identifiers stay in bracket notation.
static CONSTANT_STRING_KEY: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"^["']\w+['"]$"#).unwrap());

/// Records a bracket access whose index is a constant string key.
pub(crate) fn check_bracket_access(node: &Node, source: &str, result: &mut ExtractionResult) {
    let Some(index) = node.child_by_field_name("index") else {
        return;
    };
    if index.kind() != "string" {
        return;
    }
    let Some(key_text) = node_text(&index, source) else {
        return;
    };
    if !CONSTANT_STRING_KEY.is_match(key_text) {
        return;
    }
    let property = key_text[1..key_text.len() - 1].to_string();
    result.record_bracket_access(BracketAccess {
        property,
        span: Span::from_node(node),
    });
}

/// Records a class method that has no documentation comment attached.
/// Parameter-less constructors are exempt; there is nothing to document.
pub(crate) fn check_method_documentation(node: &Node, source: &str, result: &mut ExtractionResult) {
    if node.parent().map(|p| p.kind()) != Some("class_body") {
        return;
    }
    let Some(name_node) = node.child_by_field_name("name") else {
        return;
    };
    let Some(name) = node_text(&name_node, source) else {
        return;
    };
    let parameters = method_parameters(node, source);
    if name == "constructor" && parameters.is_empty() {
        return;
    }
    if node
        .prev_named_sibling()
        .is_some_and(|sibling| sibling.kind() == "comment")
    {
        return;
    }
    result.record_undocumented_method(UndocumentedMethod {
        name: name.to_string(),
        parameters,
        span: Span::from_node(&name_node),
    });
}

/// The parameter texts of a method definition, in order.
fn method_parameters(node: &Node, source: &str) -> Vec<String> {
    let Some(params) = node.child_by_field_name("parameters") else {
        return Vec::new();
    };
    let mut cursor = params.walk();
    params
        .named_children(&mut cursor)
        .filter_map(|param| node_text(&param, source).map(str::to_string))
        .collect()
}

fn node_text<'a>(node: &Node, source: &'a str) -> Option<&'a str> {
    source.get(node.start_byte()..node.end_byte())
}
