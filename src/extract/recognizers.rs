//! The dependency recognizer chain.
//!
//! Each recognizer interprets one syntactic pattern that constitutes a
//! reference to another namespace. They run in a fixed order per visited
//! node and the first one that claims the node stops the chain; a node
//! represents at most one dependency-producing construct. A shape that does
//! not match is an ordinary non-match, never an error, so a single odd node
//! cannot abort the traversal of a file.

use std::path::Path;

use once_cell::sync::Lazy;
use regex::Regex;
use tree_sitter::Node;

use crate::extract::{DeclarationKind, ExtractionResult, Span};
use crate::namespace::{is_invalid_dependency, normalize};

/// Namespace tail that is an ALL-CAPS constant, e.g. `a.b.MY_CONSTANT`.
static CONSTANT_TAIL: Lazy<Regex> = Lazy::new(|| Regex::new(r"\.[A-Z_]+$").unwrap());

/// Dotted path ending in an ALL-CAPS constant segment, with an optional
/// suffix behind it, e.g. `ts.Constants.MY_CONSTANT.length`.
static CONSTANT_WITH_SUFFIX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(\w+\.)+[A-Z_]{2,}(\..*)?$").unwrap());

/// Dotted path ending in a lower-case member, e.g. `myObj.length`. Under
/// Closure naming conventions this is a field access, not a namespace.
static LOWERCASE_MEMBER: Lazy<Regex> = Lazy::new(|| Regex::new(r"^(\w+\.)+[a-z]\w*$").unwrap());

/// Exactly three dotted segments; used to narrow a use-site anchor down to
/// the reference that names the namespace itself.
static THREE_SEGMENTS: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\w+\.\w+\.\w+$").unwrap());

/// Ubiquitous method names (string/array utilities, event helpers) that a
/// qualified call may end in without implying a namespace dependency.
const ALLOWED_METHODS: [&str; 17] = [
    "substring",
    "toString",
    "toLowerCase",
    "toUpperCase",
    "split",
    "slice",
    "splice",
    "toLocaleString",
    "push",
    "getBBox",
    "getBrowserEvent",
    "preventDefault",
    "concat",
    "localeCompare",
    "apply",
    "forEach",
    "map",
];

/// Runs the chain on one node. Returns true when a recognizer claimed it.
pub(crate) fn run_chain(
    node: &Node,
    source: &str,
    path: &Path,
    result: &mut ExtractionResult,
) -> bool {
    recognize_declaration(node, source, path, result)
        || recognize_inheritance(node, source, result)
        || recognize_constructor(node, source, result)
        || recognize_static_call(node, source, result)
        || recognize_member(node, source, result)
}

/// Recognizer 1: `goog.require` / `goog.provide` / `goog.module` calls with
/// exactly one string-literal argument. Runs before all dependency
/// recognizers because it seeds the alias table they resolve through.
fn recognize_declaration(
    node: &Node,
    source: &str,
    path: &Path,
    result: &mut ExtractionResult,
) -> bool {
    if node.kind() != "call_expression" {
        return false;
    }
    let Some(callee) = node.child_by_field_name("function") else {
        return false;
    };
    if callee.kind() != "member_expression" {
        return false;
    }
    let Some(callee_text) = node_text(&callee, source) else {
        return false;
    };
    let method = result.aliases.resolve(&normalize(callee_text));
    let kind = match method.as_str() {
        "goog.require" => DeclarationKind::Require,
        "goog.provide" => DeclarationKind::Provide,
        "goog.module" => DeclarationKind::Module,
        _ => return false,
    };

    // Exactly one string-literal argument; anything else is not a
    // declaration (not an error either).
    let Some(args) = node.child_by_field_name("arguments") else {
        return false;
    };
    if args.named_child_count() != 1 {
        return false;
    }
    let arg = args.named_child(0).expect("named child checked above");
    if arg.kind() != "string" {
        return false;
    }
    let Some(namespace) = string_value(&arg, source) else {
        return false;
    };

    let Some(span) = enclosing_statement_span(node, source, path) else {
        return false;
    };

    let first_seen = result.record_declaration(kind, &namespace, span);

    // `const short = goog.require('full.ns')` binds a local alias. Only the
    // first require of a namespace seeds the table; duplicates never do.
    if first_seen && kind == DeclarationKind::Require {
        if let Some(short) = binding_name(node, source) {
            result.record_alias(&namespace, &short);
        }
    }
    true
}

/// Recognizer 2: inheritance, either via the `goog.inherits` helper (the
/// second reference argument is the base class) or an ES6 `extends` clause.
fn recognize_inheritance(node: &Node, source: &str, result: &mut ExtractionResult) -> bool {
    match node.kind() {
        "call_expression" => recognize_inherits_call(node, source, result),
        "class_declaration" | "class" => recognize_class_heritage(node, source, result),
        _ => false,
    }
}

fn recognize_inherits_call(node: &Node, source: &str, result: &mut ExtractionResult) -> bool {
    if !is_static_method_call(node, source) {
        return false;
    }
    let Some(callee) = node.child_by_field_name("function") else {
        return false;
    };
    let Some(callee_text) = node_text(&callee, source) else {
        return false;
    };
    if result.aliases.resolve(&normalize(callee_text)) != "goog.inherits" {
        return false;
    }
    let Some(args) = node.child_by_field_name("arguments") else {
        return false;
    };

    // The second reference argument names the base class.
    let mut cursor = args.walk();
    let mut saw_first_reference = false;
    for arg in args.named_children(&mut cursor) {
        if !matches!(arg.kind(), "member_expression" | "identifier") {
            continue;
        }
        if !saw_first_reference {
            saw_first_reference = true;
            continue;
        }
        let Some(text) = node_text(&arg, source) else {
            return false;
        };
        let namespace = result.aliases.resolve(text);
        if is_invalid_dependency(&namespace) {
            return false;
        }
        result.record_dependency(&namespace, Span::from_node(&arg));
        return true;
    }
    false
}

fn recognize_class_heritage(node: &Node, source: &str, result: &mut ExtractionResult) -> bool {
    let mut cursor = node.walk();
    for child in node.children(&mut cursor) {
        if child.kind() != "class_heritage" {
            continue;
        }
        let Some(base) = child.named_child(0) else {
            continue;
        };
        let Some(text) = node_text(&base, source) else {
            continue;
        };
        let namespace = result.aliases.resolve(text);
        if is_invalid_dependency(&namespace) {
            continue;
        }
        result.record_dependency(&namespace, Span::from_node(&base));
        return true;
    }
    false
}

/// Recognizer 3: constructor calls, e.g. `new x.y.MyType()`.
fn recognize_constructor(node: &Node, source: &str, result: &mut ExtractionResult) -> bool {
    if node.kind() != "new_expression" {
        return false;
    }
    let Some(constructor) = node.child_by_field_name("constructor") else {
        return false;
    };
    if !matches!(constructor.kind(), "member_expression" | "identifier") {
        return false;
    }
    let Some(text) = node_text(&constructor, source) else {
        return false;
    };
    let namespace = result.aliases.resolve(text);
    if is_invalid_dependency(&namespace) {
        return false;
    }
    result.record_dependency(&namespace, Span::from_node(&constructor));
    true
}

/// Recognizer 4: static method or constant calls on a qualified reference,
/// e.g. `goog.array.contains(xs, x)` or `a.b.SomeType.FLAG.toString()`.
fn recognize_static_call(node: &Node, source: &str, result: &mut ExtractionResult) -> bool {
    if !is_static_method_call(node, source) {
        return false;
    }
    let Some(callee) = node.child_by_field_name("function") else {
        return false;
    };
    let Some(callee_text) = node_text(&callee, source) else {
        return false;
    };
    let mut qualified = normalize(callee_text);

    // 'Double' call, e.g. `my.namespace.getCurrent().get(...)`: the actual
    // namespace ends before the first call.
    if let Some(paren) = qualified.find('(') {
        qualified.truncate(paren);
    }

    // e.g. `setTimeout(...)`: no qualification, no Closure dependency.
    let Some(last_dot) = qualified.rfind('.') else {
        return false;
    };
    let method = qualified[last_dot + 1..].to_string();
    let mut namespace = qualified[..last_dot].to_string();

    if CONSTANT_TAIL.is_match(&namespace) {
        // The call is on a constant; the namespace ends one segment earlier.
        match namespace.rfind('.') {
            Some(dot) => namespace.truncate(dot),
            None => return false,
        }
    } else if ALLOWED_METHODS.contains(&method.as_str()) {
        return false;
    }

    let namespace = result.aliases.resolve(&namespace);
    if is_invalid_dependency(&namespace) {
        return false;
    }

    // Anchor on the deepest reference that still names the namespace, not
    // on appended method segments.
    let mut marker = callee;
    loop {
        let descend = marker.child(0).is_some_and(|first| {
            matches!(first.kind(), "member_expression" | "identifier")
        }) && node_text(&marker, source)
            .is_some_and(|text| THREE_SEGMENTS.is_match(&normalize(text)));
        if !descend {
            break;
        }
        marker = marker.child(0).expect("child checked above");
    }

    result.record_dependency(&namespace, Span::from_node(&marker));
    true
}

/// Recognizer 5: plain qualified references. ALL-CAPS constant accesses keep
/// their leading dot-path as the namespace; ordinary lower-case member
/// accesses are field reads, not dependencies.
fn recognize_member(node: &Node, source: &str, result: &mut ExtractionResult) -> bool {
    if node.kind() != "member_expression" {
        return false;
    }
    // Only outermost references; `new`-targets and require/provide callees
    // are handled by the earlier recognizers.
    let Some(parent) = node.parent() else {
        return false;
    };
    if matches!(parent.kind(), "new_expression" | "member_expression") {
        return false;
    }
    let Some(object) = node.child_by_field_name("object") else {
        return false;
    };
    if !matches!(object.kind(), "identifier" | "member_expression") {
        return false;
    }
    let Some(full_text) = node_text(node, source) else {
        return false;
    };
    let full = normalize(full_text);
    if full.starts_with("this.") {
        return false;
    }
    if is_part_of_class_definition(node) {
        return false;
    }

    let Some(object_text) = node_text(&object, source) else {
        return false;
    };
    let mut namespace = normalize(object_text);
    if CONSTANT_WITH_SUFFIX.is_match(&full) {
        namespace = full;
    }

    if namespace == "goog.provide" || namespace == "goog.require" {
        return false;
    }

    // Cut off constants (and anything behind them) appended to the namespace.
    let mut removed_constant = false;
    while CONSTANT_WITH_SUFFIX.is_match(&namespace) {
        match namespace.rfind('.') {
            Some(dot) => namespace.truncate(dot),
            None => return false,
        }
        removed_constant = true;
    }

    if !removed_constant && LOWERCASE_MEMBER.is_match(&namespace) {
        // e.g. `myvar.length`: a field access under Closure naming
        // conventions, not a namespace reference.
        return false;
    }

    let namespace = result.aliases.resolve(&namespace);
    if is_invalid_dependency(&namespace) {
        return false;
    }
    result.record_dependency(&namespace, Span::from_node(node));
    true
}

/// A call on a qualified reference that is neither jQuery-style (`$...`),
/// a call on `this`, nor part of a `new ...` chain.
fn is_static_method_call(node: &Node, source: &str) -> bool {
    if node.kind() != "call_expression" {
        return false;
    }
    let Some(callee) = node.child_by_field_name("function") else {
        return false;
    };
    if callee.kind() != "member_expression" || node.child_by_field_name("arguments").is_none() {
        return false;
    }
    let Some(text) = node_text(node, source) else {
        return false;
    };
    !text.starts_with('$') && !text.starts_with("this.") && !is_constructor_rooted(node)
}

/// Walks the leading children to detect call chains that start with a
/// constructor, e.g. `new Foo().bar()`.
fn is_constructor_rooted(node: &Node) -> bool {
    let mut current = Some(*node);
    while let Some(n) = current {
        if n.kind() == "new_expression" {
            return true;
        }
        current = n.child(0);
    }
    false
}

/// References inside a class's own heritage clause are reported by the
/// inheritance recognizer; a short bounded walk up avoids double-reporting.
fn is_part_of_class_definition(node: &Node) -> bool {
    let mut parent = node.parent();
    for _ in 0..3 {
        match parent {
            None => return true,
            Some(p) => {
                if matches!(p.kind(), "class_declaration" | "class" | "class_heritage") {
                    return true;
                }
                parent = p.parent();
            }
        }
    }
    false
}

/// The local name a require call is bound to, e.g. `x` in
/// `const x = goog.require('...')`. Destructuring patterns carry no single
/// alias and are skipped.
fn binding_name(call_node: &Node, source: &str) -> Option<String> {
    let parent = call_node.parent()?;
    if parent.kind() != "variable_declarator" {
        return None;
    }
    let name = parent.child_by_field_name("name")?;
    if name.kind() != "identifier" {
        return None;
    }
    node_text(&name, source).map(str::to_string)
}

/// Span of the statement a declaration call belongs to. Declarations outside
/// any statement only occur in malformed trees; those degrade to non-match.
fn enclosing_statement_span(node: &Node, source: &str, path: &Path) -> Option<Span> {
    let mut current = node.parent();
    while let Some(n) = current {
        if n.kind().ends_with("statement")
            || matches!(n.kind(), "lexical_declaration" | "variable_declaration")
        {
            return Some(Span::from_node(&n));
        }
        current = n.parent();
    }
    tracing::warn!(
        file = %path.display(),
        node = node_text(node, source).unwrap_or("<invalid range>"),
        line = node.start_position().row + 1,
        "no enclosing statement found for declaration call"
    );
    None
}

/// The raw source text of a node.
fn node_text<'a>(node: &Node, source: &'a str) -> Option<&'a str> {
    source.get(node.start_byte()..node.end_byte())
}

/// String literal content with the quotes removed.
fn string_value(node: &Node, source: &str) -> Option<String> {
    let text = node_text(node, source)?;
    let trimmed = text
        .trim_start_matches(['"', '\'', '`'])
        .trim_end_matches(['"', '\'', '`']);
    Some(normalize(trimmed))
}

#[cfg(test)]
mod tests {
    use crate::extract::{DependencyExtractor, ExtractionResult};
    use std::path::Path;

    fn extract(source: &str) -> ExtractionResult {
        let mut extractor = DependencyExtractor::new().unwrap();
        extractor
            .extract_source(source, Path::new("test.js"))
            .unwrap()
    }

    fn used(result: &ExtractionResult) -> Vec<&str> {
        result.dependencies.keys().map(String::as_str).collect()
    }

    // ===== Constructor recognizer =====

    #[test]
    fn test_constructor_dependency() {
        let result = extract("var instance = new ts.commons.Widget('test');");
        assert_eq!(used(&result), vec!["ts.commons.Widget"]);
        let span = &result.dependencies["ts.commons.Widget"][0];
        assert_eq!(span.line, 1);
    }

    #[test]
    fn test_unqualified_constructor_is_not_a_dependency() {
        let result = extract("var x = new Widget();");
        assert!(result.dependencies.is_empty());
    }

    #[test]
    fn test_aliased_constructor_resolves() {
        let result = extract(
            "const Widget = goog.require('ts.commons.Widget');\nnew Widget();\n",
        );
        assert_eq!(used(&result), vec!["ts.commons.Widget"]);
    }

    // ===== Static method/constant recognizer =====

    #[test]
    fn test_static_method_call() {
        let result = extract("goog.array.contains(list, element);");
        assert_eq!(used(&result), vec!["goog.array"]);
    }

    #[test]
    fn test_constant_before_method_strips_two_segments() {
        // The tail before the method is an ALL-CAPS constant, so the
        // namespace ends one segment earlier.
        let result = extract("ts.commons.EVENTS.toString();");
        assert_eq!(used(&result), vec!["ts.commons"]);
    }

    #[test]
    fn test_allowed_methods_produce_no_dependency() {
        let result = extract(
            "myString.substring(1);\nitems.forEach(fn);\nparts.map(fn);\nevent.preventDefault();\n",
        );
        assert!(result.dependencies.is_empty());
    }

    #[test]
    fn test_unqualified_call_is_not_a_dependency() {
        let result = extract("setTimeout(callback, 100);");
        assert!(result.dependencies.is_empty());
    }

    #[test]
    fn test_this_and_jquery_rooted_calls_excluded() {
        let result = extract("this.handler.process(x);\n$element.find('.cls').show();\n");
        assert!(result.dependencies.is_empty());
    }

    #[test]
    fn test_constructor_rooted_chain_excluded() {
        let result = extract("new ts.ui.Builder().withTitle('x').build();");
        // Only the constructor itself is a dependency, not the chained calls.
        assert_eq!(used(&result), vec!["ts.ui.Builder"]);
    }

    #[test]
    fn test_double_call_uses_namespace_before_first_call() {
        let result = extract("ts.context.Registry.getCurrent().get('key');");
        assert_eq!(used(&result), vec!["ts.context.Registry"]);
    }

    #[test]
    fn test_legacy_namespace_call_is_not_a_dependency() {
        let result = extract("goog.module('a.b');\ngoog.module.declareLegacyNamespace();\n");
        assert!(result.dependencies.is_empty());
        assert!(result.modules.contains_key("a.b"));
    }

    #[test]
    fn test_aliased_static_call_resolves() {
        let result = extract(
            "const short = goog.require('a.b.LongName');\nshort.method();\n",
        );
        assert_eq!(used(&result), vec!["a.b.LongName"]);
    }

    // ===== Member/constant recognizer =====

    #[test]
    fn test_constant_access_keeps_leading_path() {
        let result = extract("var limit = ts.commons.Constants.MY_CONSTANT;");
        assert_eq!(used(&result), vec!["ts.commons.Constants"]);
    }

    #[test]
    fn test_constant_with_trailing_suffix() {
        let result = extract("var n = ts.commons.Constants.MY_CONSTANT.length;");
        assert_eq!(used(&result), vec!["ts.commons.Constants"]);
    }

    #[test]
    fn test_lowercase_member_access_is_not_a_dependency() {
        let result = extract("var n = myObj.length;");
        assert!(result.dependencies.is_empty());
    }

    #[test]
    fn test_plain_reference_argument_is_not_a_dependency() {
        // References following lower-case namespace conventions are only
        // dependencies when constructed, called, or read as constants.
        let result = extract("callback(ts.test.SimpleFile);");
        assert!(result.dependencies.is_empty());
    }

    #[test]
    fn test_this_rooted_member_excluded() {
        let result = extract("var h = this.events.HANDLER_FLAG;");
        assert!(result.dependencies.is_empty());
    }

    #[test]
    fn test_aliased_constant_access_resolves() {
        let result = extract(
            "const Constants = goog.require('ts.commons.Constants');\nvar x = Constants.MY_FLAG;\n",
        );
        assert_eq!(used(&result), vec!["ts.commons.Constants"]);
    }

    // ===== Inheritance recognizer =====

    #[test]
    fn test_goog_inherits_records_base_class() {
        let result = extract("goog.inherits(ts.test.SimpleFile, ts.test.BaseClass);");
        assert_eq!(used(&result), vec!["ts.test.BaseClass"]);
    }

    #[test]
    fn test_es6_extends_records_base_class() {
        let result = extract("class Widget extends ts.ui.Component {}");
        assert_eq!(used(&result), vec!["ts.ui.Component"]);
    }

    #[test]
    fn test_es6_extends_resolves_alias() {
        let result = extract(
            "const Component = goog.require('ts.ui.Component');\nclass Widget extends Component {}\n",
        );
        assert_eq!(used(&result), vec!["ts.ui.Component"]);
    }

    #[test]
    fn test_extends_local_name_is_not_a_dependency() {
        let result = extract("class Widget extends LocalBase {}");
        assert!(result.dependencies.is_empty());
    }

    #[test]
    fn test_heritage_reference_not_double_reported() {
        let result = extract("class Widget extends ts.ui.NS.Component {}");
        let spans = &result.dependencies["ts.ui.NS.Component"];
        assert_eq!(spans.len(), 1);
        assert_eq!(result.dependencies.len(), 1);
    }

    // ===== Chain exclusivity =====

    #[test]
    fn test_declaration_call_produces_no_dependency() {
        let result = extract("goog.require('goog.array');");
        assert!(result.dependencies.is_empty());
        assert!(result.requires.contains_key("goog.array"));
    }

    #[test]
    fn test_multiline_call_is_normalized() {
        let result = extract("goog\n  .array\n  .contains(list, element);");
        assert_eq!(used(&result), vec!["goog.array"]);
    }
}
