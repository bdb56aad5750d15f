//! Per-file dependency extraction using tree-sitter for JavaScript.
//!
//! One [`DependencyExtractor`] drives a single pre-order traversal of a
//! parsed file and fills an [`ExtractionResult`]: declared provides,
//! requires and modules, the alias table seeded at require sites, every
//! namespace use found by the recognizer chain, the raw types collected
//! from documentation comments, and the type-safety findings (bracket
//! accesses, malformed `@param` annotations, undocumented methods). The
//! result is built once per file, read-only afterwards, and carries no
//! cross-file state.

pub mod comments;
pub mod recognizers;
pub mod style;

use std::collections::{BTreeMap, HashSet};
use std::fs;
use std::path::Path;

use serde::Serialize;
use thiserror::Error;
use tree_sitter::{Node, Parser};

use crate::namespace::AliasTable;

/// Errors that can occur during dependency extraction.
#[derive(Error, Debug)]
pub enum ExtractError {
    #[error("Failed to read file: {0}")]
    FileRead(#[from] std::io::Error),

    #[error("Failed to parse file: {path}")]
    ParseError { path: String },

    #[error("Unsupported file type: {0}")]
    UnsupportedFileType(String),

    #[error("Tree-sitter JavaScript grammar failed to load")]
    LanguageInit,
}

/// Result type for extraction operations.
pub type ExtractResult<T> = Result<T, ExtractError>;

/// A source location captured from a tree-sitter node.
///
/// Diagnostics anchor on spans instead of borrowed nodes so that an
/// [`ExtractionResult`] can outlive the parse tree it was built from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Span {
    pub start_byte: usize,
    pub end_byte: usize,
    /// 1-indexed line of the start position.
    pub line: usize,
    /// 1-indexed column of the start position.
    pub column: usize,
}

impl Span {
    /// Capture the location of a node.
    pub fn from_node(node: &Node) -> Self {
        let pos = node.start_position();
        Self {
            start_byte: node.start_byte(),
            end_byte: node.end_byte(),
            line: pos.row + 1,
            column: pos.column + 1,
        }
    }
}

/// A bracket access with a constant string key, e.g. `myVar['field']`.
/// The Closure compiler cannot type-check these; dot access can.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BracketAccess {
    pub property: String,
    pub span: Span,
}

/// A `@param` annotation without a leading `{...}` type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParamTypeIssue {
    /// The parameter name found after the tag.
    pub name: String,
    /// True when the type trails the parameter name and the two can be
    /// swapped into place.
    pub swapped: bool,
    pub span: Span,
}

/// A class method without an attached documentation comment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UndocumentedMethod {
    pub name: String,
    pub parameters: Vec<String>,
    pub span: Span,
}

/// The kind of namespace declaration statement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeclarationKind {
    /// `goog.provide('ns')` - the file defines the namespace.
    Provide,
    /// `goog.require('ns')` - the file depends on the namespace.
    Require,
    /// `goog.module('ns')` - the file is an encapsulated namespace owner.
    Module,
}

/// Everything extracted from one file.
///
/// Recognizers only append through the narrow `record_*` methods; the
/// validation engine reads the public maps afterwards.
#[derive(Debug, Default)]
pub struct ExtractionResult {
    /// Namespaces provided by this file, with the span of the first
    /// `goog.provide` statement seen for each.
    pub provides: BTreeMap<String, Span>,
    /// Namespaces required by this file, first statement span per namespace.
    pub requires: BTreeMap<String, Span>,
    /// Namespaces declared via `goog.module`.
    pub modules: BTreeMap<String, Span>,
    /// Extra `goog.require` statements for already-required namespaces.
    pub duplicate_requires: BTreeMap<String, Vec<Span>>,
    /// Extra `goog.provide` statements for already-provided namespaces.
    pub duplicate_provides: BTreeMap<String, Vec<Span>>,
    /// Short local names bound at require sites.
    pub aliases: AliasTable,
    /// Actual namespace uses found in the code, every occurrence per
    /// namespace in insertion order.
    pub dependencies: BTreeMap<String, Vec<Span>>,
    /// Raw type strings from documentation comments, e.g.
    /// `Array<ts.my.Namespace>` or `string`. Kept to identify requires that
    /// are optional: the Closure compiler neither demands nor flags them.
    pub raw_comment_types: HashSet<String>,
    /// Bracket accesses with a constant string key.
    pub bracket_accesses: Vec<BracketAccess>,
    /// `@param` annotations with a missing or trailing type.
    pub param_type_issues: Vec<ParamTypeIssue>,
    /// Class methods without a documentation comment.
    pub undocumented_methods: Vec<UndocumentedMethod>,
}

impl ExtractionResult {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a namespace use at the given location.
    pub fn record_dependency(&mut self, namespace: &str, span: Span) {
        self.dependencies
            .entry(namespace.to_string())
            .or_default()
            .push(span);
    }

    /// Records a declaration statement. The first provide or require of a
    /// namespace wins and later ones land in the duplicate map; a repeated
    /// `goog.module` statement overwrites, the last one wins.
    /// Returns true when this was the first occurrence.
    pub fn record_declaration(
        &mut self,
        kind: DeclarationKind,
        namespace: &str,
        span: Span,
    ) -> bool {
        let (map, duplicates) = match kind {
            DeclarationKind::Provide => (&mut self.provides, &mut self.duplicate_provides),
            DeclarationKind::Require => (&mut self.requires, &mut self.duplicate_requires),
            DeclarationKind::Module => {
                self.modules.insert(namespace.to_string(), span);
                return true;
            }
        };
        if map.contains_key(namespace) {
            duplicates
                .entry(namespace.to_string())
                .or_default()
                .push(span);
            return false;
        }
        map.insert(namespace.to_string(), span);
        true
    }

    /// Records a short local name bound to a required namespace.
    pub fn record_alias(&mut self, full: &str, short: &str) {
        self.aliases.insert(full, short);
    }

    /// Records a bracket access with a constant string key.
    pub fn record_bracket_access(&mut self, access: BracketAccess) {
        self.bracket_accesses.push(access);
    }

    /// Records a class method without a documentation comment.
    pub fn record_undocumented_method(&mut self, method: UndocumentedMethod) {
        self.undocumented_methods.push(method);
    }

    /// True if the file declares any namespace via `goog.module`.
    pub fn is_module_file(&self) -> bool {
        !self.modules.is_empty()
    }
}

/// Extractor for Closure namespace dependencies in JavaScript files.
pub struct DependencyExtractor {
    parser: Parser,
}

impl DependencyExtractor {
    /// Create a new extractor.
    ///
    /// Fails with [`ExtractError::LanguageInit`] when the JavaScript grammar
    /// is not available; this is fatal for the whole run, not per-file.
    pub fn new() -> ExtractResult<Self> {
        let mut parser = Parser::new();
        parser
            .set_language(&tree_sitter_javascript::LANGUAGE.into())
            .map_err(|_| ExtractError::LanguageInit)?;
        Ok(Self { parser })
    }

    /// Extract dependencies from a single file on disk.
    pub fn extract_file(&mut self, path: &Path) -> ExtractResult<ExtractionResult> {
        let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("");
        if !is_javascript_extension(ext) {
            return Err(ExtractError::UnsupportedFileType(ext.to_string()));
        }
        let content = fs::read_to_string(path)?;
        self.extract_source(&content, path)
    }

    /// Extract dependencies from source code directly.
    pub fn extract_source(&mut self, source: &str, path: &Path) -> ExtractResult<ExtractionResult> {
        let tree = self
            .parser
            .parse(source, None)
            .ok_or_else(|| ExtractError::ParseError {
                path: path.display().to_string(),
            })?;

        let mut result = ExtractionResult::new();
        let mut cursor = tree.root_node().walk();
        Self::visit_node(&mut cursor, source, path, &mut result);
        Ok(result)
    }

    /// Pre-order traversal. Comment nodes feed the type collector and the
    /// `@param` annotation check, bracket accesses and class methods go to
    /// the style checks, every other node runs through the recognizer chain,
    /// first claim wins.
    fn visit_node(
        cursor: &mut tree_sitter::TreeCursor,
        source: &str,
        path: &Path,
        result: &mut ExtractionResult,
    ) {
        let node = cursor.node();

        match node.kind() {
            "comment" => {
                if let Some(text) = source.get(node.start_byte()..node.end_byte()) {
                    comments::collect_comment_types(text, &mut result.raw_comment_types);
                    comments::check_param_annotations(
                        text,
                        &Span::from_node(&node),
                        &mut result.param_type_issues,
                    );
                }
            }
            "subscript_expression" => style::check_bracket_access(&node, source, result),
            "method_definition" => style::check_method_documentation(&node, source, result),
            _ => {
                recognizers::run_chain(&node, source, path, result);
            }
        }

        if cursor.goto_first_child() {
            loop {
                Self::visit_node(cursor, source, path, result);
                if !cursor.goto_next_sibling() {
                    break;
                }
            }
            cursor.goto_parent();
        }
    }
}

/// JavaScript extensions accepted by the extractor. Closure namespace files
/// are plain JavaScript; everything else is skipped.
pub fn is_javascript_extension(ext: &str) -> bool {
    matches!(ext.to_lowercase().as_str(), "js" | "mjs" | "cjs")
}
