//! Report types and exporters for validation results.
//!
//! Diagnostics are grouped per file into a [`FileReport`] and per run into a
//! [`ProjectReport`], exportable as JSON (machine-readable) or plain text
//! (one row per anchor location).

pub mod json;
pub mod text;

use std::io::{self, Write};

use crate::validate::{Diagnostic, DiagnosticKind};

/// Export format options.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    /// JSON format - machine-readable, full data
    Json,
    /// Plain text - one row per diagnostic anchor
    Text,
}

impl std::str::FromStr for ExportFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "json" => Ok(ExportFormat::Json),
            "text" | "txt" => Ok(ExportFormat::Text),
            _ => Err(format!(
                "Unknown export format: '{}'. Valid formats: json, text",
                s
            )),
        }
    }
}

impl std::fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ExportFormat::Json => write!(f, "json"),
            ExportFormat::Text => write!(f, "text"),
        }
    }
}

/// All diagnostics for one analyzed file.
#[derive(Debug, Clone)]
pub struct FileReport {
    /// Path of the analyzed file.
    pub file: String,
    pub diagnostics: Vec<Diagnostic>,
}

impl FileReport {
    pub fn new(file: impl Into<String>, diagnostics: Vec<Diagnostic>) -> Self {
        Self {
            file: file.into(),
            diagnostics,
        }
    }

    pub fn has_findings(&self) -> bool {
        !self.diagnostics.is_empty()
    }
}

/// Aggregated results of one analysis run.
#[derive(Debug, Clone, Default)]
pub struct ProjectReport {
    /// Number of files analyzed, including clean ones.
    pub files_analyzed: usize,
    /// Reports of files with at least one finding.
    pub reports: Vec<FileReport>,
}

impl ProjectReport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records one analyzed file; clean reports only bump the counter.
    pub fn add(&mut self, report: FileReport) {
        self.files_analyzed += 1;
        if report.has_findings() {
            self.reports.push(report);
        }
    }

    /// Total number of diagnostics across all files.
    pub fn diagnostic_count(&self) -> usize {
        self.reports.iter().map(|r| r.diagnostics.len()).sum()
    }

    /// Number of diagnostics of one kind across all files.
    pub fn count_of(&self, kind: DiagnosticKind) -> usize {
        self.reports
            .iter()
            .flat_map(|r| &r.diagnostics)
            .filter(|d| d.kind == kind)
            .count()
    }

    pub fn is_clean(&self) -> bool {
        self.reports.is_empty()
    }
}

/// Trait for exporters.
pub trait Exporter {
    /// Export the report to the given writer.
    fn export<W: Write>(&self, report: &ProjectReport, writer: &mut W) -> io::Result<()>;
}

/// Export a report in the specified format.
pub fn export<W: Write>(
    format: ExportFormat,
    report: &ProjectReport,
    writer: &mut W,
) -> io::Result<()> {
    match format {
        ExportFormat::Json => json::JsonExporter.export(report, writer),
        ExportFormat::Text => text::TextExporter.export(report, writer),
    }
}

/// Export a report to a string.
pub fn export_to_string(format: ExportFormat, report: &ProjectReport) -> io::Result<String> {
    let mut buffer = Vec::new();
    export(format, report, &mut buffer)?;
    String::from_utf8(buffer).map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_export_format_from_str() {
        assert_eq!("json".parse::<ExportFormat>().unwrap(), ExportFormat::Json);
        assert_eq!("JSON".parse::<ExportFormat>().unwrap(), ExportFormat::Json);
        assert_eq!("text".parse::<ExportFormat>().unwrap(), ExportFormat::Text);
        assert_eq!("txt".parse::<ExportFormat>().unwrap(), ExportFormat::Text);
        assert!("yaml".parse::<ExportFormat>().is_err());
    }

    #[test]
    fn test_export_format_display() {
        assert_eq!(format!("{}", ExportFormat::Json), "json");
        assert_eq!(format!("{}", ExportFormat::Text), "text");
    }

    #[test]
    fn test_clean_reports_only_bump_counter() {
        let mut project = ProjectReport::new();
        project.add(FileReport::new("clean.js", Vec::new()));
        assert_eq!(project.files_analyzed, 1);
        assert!(project.is_clean());
        assert_eq!(project.diagnostic_count(), 0);
    }
}
