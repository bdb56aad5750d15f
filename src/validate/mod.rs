//! Validation of an extraction result into diagnostics.
//!
//! The require checks run over one [`ExtractionResult`]: duplicate
//! declarations, missing requires (used but never declared) and obsolete
//! requires (declared but never used). The type-safety findings gathered
//! during extraction (bracket accesses, malformed `@param` annotations,
//! undocumented methods) are turned into diagnostics here as well.
//! Validation only reads the result; all facts were gathered in the single
//! extraction pass.

use serde::Serialize;

use crate::extract::{ExtractionResult, Span};

/// Stable category tag carried by every diagnostic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum DiagnosticKind {
    DuplicateRequire,
    DuplicateProvide,
    MissingRequire,
    ObsoleteRequire,
    BracketNotation,
    MisplacedType,
    MissingMethodComment,
}

impl DiagnosticKind {
    /// The stable tag string, as used in reports.
    pub fn as_str(&self) -> &'static str {
        match self {
            DiagnosticKind::DuplicateRequire => "duplicate-require",
            DiagnosticKind::DuplicateProvide => "duplicate-provide",
            DiagnosticKind::MissingRequire => "missing-require",
            DiagnosticKind::ObsoleteRequire => "obsolete-require",
            DiagnosticKind::BracketNotation => "bracket-notation",
            DiagnosticKind::MisplacedType => "misplaced-type",
            DiagnosticKind::MissingMethodComment => "missing-method-comment",
        }
    }
}

/// Data for an external text rewriter to synthesize a source edit. The core
/// itself never mutates source text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "action", rename_all = "kebab-case")]
pub enum FixAction {
    /// Insert `goog.require('<namespace>')` after the given statement (or at
    /// the top of the file when there is none). In `goog.module` files the
    /// rewriter should bind the require to a local name; see
    /// [`crate::fix::find_safe_reference`].
    AddRequire {
        namespace: String,
        insert_after: Option<Span>,
        bind_to_alias: bool,
    },
    /// Remove the declaration at the diagnostic's anchor; with `remove_all`
    /// set, every require of the namespace in the file goes.
    RemoveDeclaration { namespace: String, remove_all: bool },
    /// Replace the bracket access at the anchor with `.property`.
    UseDotNotation { property: String },
    /// Reorder the annotation at the anchor from `@param name {type}` to
    /// `@param {type} name`.
    SwapTypeAndName,
    /// Insert a documentation comment stub above the method at the anchor,
    /// with one `@param` line per parameter.
    InsertMethodComment { parameters: Vec<String> },
}

/// A single finding for one file.
#[derive(Debug, Clone, Serialize)]
pub struct Diagnostic {
    pub kind: DiagnosticKind,
    /// The namespace the finding is about; for type-safety findings, the
    /// property, parameter or method name instead.
    pub namespace: String,
    /// One or more source locations this diagnostic points at.
    pub anchors: Vec<Span>,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fix: Option<FixAction>,
}

/// Runs all checks over one file's extraction result.
pub fn validate(result: &ExtractionResult) -> Vec<Diagnostic> {
    let mut diagnostics = Vec::new();
    mark_duplicates(result, &mut diagnostics);
    mark_missing_requires(result, &mut diagnostics);
    mark_obsolete_requires(result, &mut diagnostics);
    mark_bracket_accesses(result, &mut diagnostics);
    mark_param_type_issues(result, &mut diagnostics);
    mark_undocumented_methods(result, &mut diagnostics);
    diagnostics
}

/// One diagnostic per extra declaration of an already-declared namespace.
fn mark_duplicates(result: &ExtractionResult, diagnostics: &mut Vec<Diagnostic>) {
    let duplicates = [
        (DiagnosticKind::DuplicateRequire, &result.duplicate_requires, "Duplicate require"),
        (DiagnosticKind::DuplicateProvide, &result.duplicate_provides, "Duplicate provide"),
    ];
    for (kind, map, message) in duplicates {
        for (namespace, spans) in map {
            for span in spans {
                diagnostics.push(Diagnostic {
                    kind,
                    namespace: namespace.clone(),
                    anchors: vec![span.clone()],
                    message: message.to_string(),
                    fix: Some(FixAction::RemoveDeclaration {
                        namespace: namespace.clone(),
                        remove_all: false,
                    }),
                });
            }
        }
    }
}

/// Used namespaces with no matching declaration. A namespace that is a
/// strict prefix of a provided one counts as declared: the file provides a
/// deeper sub-namespace than what it references.
fn mark_missing_requires(result: &ExtractionResult, diagnostics: &mut Vec<Diagnostic>) {
    let insert_after = require_insertion_anchor(result);
    for (namespace, occurrences) in &result.dependencies {
        if result.provides.contains_key(namespace)
            || result.requires.contains_key(namespace)
            || is_prefix_of_provide(result, namespace)
        {
            continue;
        }
        diagnostics.push(Diagnostic {
            kind: DiagnosticKind::MissingRequire,
            namespace: namespace.clone(),
            anchors: occurrences.clone(),
            message: format!("No require for '{namespace}'"),
            fix: Some(FixAction::AddRequire {
                namespace: namespace.clone(),
                insert_after: insert_after.clone(),
                bind_to_alias: result.is_module_file(),
            }),
        });
    }
}

/// Declared requires without any recorded use. A namespace appearing in a
/// comment type is an optional dependency: the Closure compiler neither
/// demands nor flags it, so removing the require would just trade one
/// warning for another.
fn mark_obsolete_requires(result: &ExtractionResult, diagnostics: &mut Vec<Diagnostic>) {
    for (namespace, span) in &result.requires {
        if result.dependencies.contains_key(namespace) {
            continue;
        }
        if result
            .raw_comment_types
            .iter()
            .any(|raw| raw.contains(namespace.as_str()))
        {
            continue;
        }
        diagnostics.push(Diagnostic {
            kind: DiagnosticKind::ObsoleteRequire,
            namespace: namespace.clone(),
            anchors: vec![span.clone()],
            message: format!("Obsolete require: {namespace}"),
            fix: Some(FixAction::RemoveDeclaration {
                namespace: namespace.clone(),
                remove_all: true,
            }),
        });
    }
}

/// Bracket accesses with a constant string key cannot be type-checked by the
/// Closure compiler; dot access can.
fn mark_bracket_accesses(result: &ExtractionResult, diagnostics: &mut Vec<Diagnostic>) {
    for access in &result.bracket_accesses {
        diagnostics.push(Diagnostic {
            kind: DiagnosticKind::BracketNotation,
            namespace: access.property.clone(),
            anchors: vec![access.span.clone()],
            message: format!(
                "Access of property '{}' cannot be type-checked (bracket notation)",
                access.property
            ),
            fix: Some(FixAction::UseDotNotation {
                property: access.property.clone(),
            }),
        });
    }
}

/// `@param` annotations whose type trails the name can be swapped into
/// place; annotations with no type at all are only reported.
fn mark_param_type_issues(result: &ExtractionResult, diagnostics: &mut Vec<Diagnostic>) {
    for issue in &result.param_type_issues {
        let (message, fix) = if issue.swapped {
            (
                "Type and parameter name are in wrong order".to_string(),
                Some(FixAction::SwapTypeAndName),
            )
        } else {
            ("Missing type after @param".to_string(), None)
        };
        diagnostics.push(Diagnostic {
            kind: DiagnosticKind::MisplacedType,
            namespace: issue.name.clone(),
            anchors: vec![issue.span.clone()],
            message,
            fix,
        });
    }
}

fn mark_undocumented_methods(result: &ExtractionResult, diagnostics: &mut Vec<Diagnostic>) {
    for method in &result.undocumented_methods {
        diagnostics.push(Diagnostic {
            kind: DiagnosticKind::MissingMethodComment,
            namespace: method.name.clone(),
            anchors: vec![method.span.clone()],
            message: "Method has no JSDoc comment".to_string(),
            fix: Some(FixAction::InsertMethodComment {
                parameters: method.parameters.clone(),
            }),
        });
    }
}

fn is_prefix_of_provide(result: &ExtractionResult, namespace: &str) -> bool {
    result
        .provides
        .keys()
        .any(|provided| provided.starts_with(namespace))
}

/// Where a new require should go: after the last `goog.module` statement if
/// the file has one, otherwise after the last `goog.provide`.
fn require_insertion_anchor(result: &ExtractionResult) -> Option<Span> {
    let declarations = if result.is_module_file() {
        &result.modules
    } else {
        &result.provides
    };
    declarations
        .values()
        .max_by_key(|span| span.start_byte)
        .cloned()
}
