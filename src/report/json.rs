//! JSON export implementation.
//!
//! Exports validation results in JSON format for machine-readable output.

use super::{Exporter, ProjectReport};
use crate::validate::{Diagnostic, DiagnosticKind};
use serde::Serialize;
use std::io::{self, Write};

/// JSON exporter implementation.
pub struct JsonExporter;

/// Summary statistics for JSON output.
#[derive(Serialize)]
struct JsonSummary {
    files_analyzed: usize,
    files_with_findings: usize,
    total_diagnostics: usize,
    missing_requires: usize,
    obsolete_requires: usize,
    duplicate_requires: usize,
    duplicate_provides: usize,
    bracket_accesses: usize,
    misplaced_types: usize,
    missing_method_comments: usize,
}

/// Per-file entry for JSON output.
#[derive(Serialize)]
struct JsonFile<'a> {
    file: &'a str,
    diagnostics: &'a [Diagnostic],
}

/// Root JSON export structure.
#[derive(Serialize)]
struct JsonExport<'a> {
    summary: JsonSummary,
    files: Vec<JsonFile<'a>>,
}

impl Exporter for JsonExporter {
    fn export<W: Write>(&self, report: &ProjectReport, writer: &mut W) -> io::Result<()> {
        let export = JsonExport {
            summary: JsonSummary {
                files_analyzed: report.files_analyzed,
                files_with_findings: report.reports.len(),
                total_diagnostics: report.diagnostic_count(),
                missing_requires: report.count_of(DiagnosticKind::MissingRequire),
                obsolete_requires: report.count_of(DiagnosticKind::ObsoleteRequire),
                duplicate_requires: report.count_of(DiagnosticKind::DuplicateRequire),
                duplicate_provides: report.count_of(DiagnosticKind::DuplicateProvide),
                bracket_accesses: report.count_of(DiagnosticKind::BracketNotation),
                misplaced_types: report.count_of(DiagnosticKind::MisplacedType),
                missing_method_comments: report.count_of(DiagnosticKind::MissingMethodComment),
            },
            files: report
                .reports
                .iter()
                .map(|r| JsonFile {
                    file: &r.file,
                    diagnostics: &r.diagnostics,
                })
                .collect(),
        };

        serde_json::to_writer_pretty(&mut *writer, &export)?;
        writeln!(writer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extract::DependencyExtractor;
    use crate::report::{export_to_string, ExportFormat, FileReport};
    use crate::validate::validate;
    use std::path::Path;

    fn sample_report() -> ProjectReport {
        let mut extractor = DependencyExtractor::new().unwrap();
        let result = extractor
            .extract_source(
                "goog.require('unused.ns');\nnew x.y.Z();\n",
                Path::new("sample.js"),
            )
            .unwrap();
        let mut project = ProjectReport::new();
        project.add(FileReport::new("sample.js", validate(&result)));
        project
    }

    #[test]
    fn test_json_export_structure() {
        let output = export_to_string(ExportFormat::Json, &sample_report()).unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&output).unwrap();

        assert_eq!(parsed["summary"]["files_analyzed"], 1);
        assert_eq!(parsed["summary"]["total_diagnostics"], 2);
        assert_eq!(parsed["summary"]["missing_requires"], 1);
        assert_eq!(parsed["summary"]["obsolete_requires"], 1);
        assert_eq!(parsed["summary"]["bracket_accesses"], 0);
        assert_eq!(parsed["files"][0]["file"], "sample.js");
    }

    #[test]
    fn test_json_diagnostic_carries_stable_kind_tag() {
        let output = export_to_string(ExportFormat::Json, &sample_report()).unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&output).unwrap();

        let kinds: Vec<&str> = parsed["files"][0]["diagnostics"]
            .as_array()
            .unwrap()
            .iter()
            .map(|d| d["kind"].as_str().unwrap())
            .collect();
        assert!(kinds.contains(&"missing-require"));
        assert!(kinds.contains(&"obsolete-require"));
    }

    #[test]
    fn test_json_anchors_have_positions() {
        let output = export_to_string(ExportFormat::Json, &sample_report()).unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&output).unwrap();

        let anchor = &parsed["files"][0]["diagnostics"][0]["anchors"][0];
        assert!(anchor["line"].as_u64().unwrap() >= 1);
        assert!(anchor["column"].as_u64().unwrap() >= 1);
    }
}
