//! Plain text export implementation.
//!
//! One row per diagnostic anchor in `file:line:column` form, followed by a
//! summary line. Suitable for terminals and editor jump-to-location.

use super::{Exporter, ProjectReport};
use std::io::{self, Write};

/// Plain text exporter implementation.
pub struct TextExporter;

impl Exporter for TextExporter {
    fn export<W: Write>(&self, report: &ProjectReport, writer: &mut W) -> io::Result<()> {
        for file_report in &report.reports {
            for diagnostic in &file_report.diagnostics {
                for anchor in &diagnostic.anchors {
                    writeln!(
                        writer,
                        "{}:{}:{}: {}: {}",
                        file_report.file,
                        anchor.line,
                        anchor.column,
                        diagnostic.kind.as_str(),
                        diagnostic.message
                    )?;
                }
            }
        }

        if report.is_clean() {
            writeln!(
                writer,
                "No problems found in {} file(s)",
                report.files_analyzed
            )
        } else {
            writeln!(
                writer,
                "{} problem(s) in {} of {} file(s)",
                report.diagnostic_count(),
                report.reports.len(),
                report.files_analyzed
            )
        }
    }
}
