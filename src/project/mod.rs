//! Batch analysis over a directory tree.
//!
//! Files are processed independently: each one gets its own extraction
//! result and validation pass, and a failure in one file is logged and
//! skipped without aborting the run. Only grammar initialization is fatal.

use std::path::Path;

use walkdir::WalkDir;

use crate::extract::{is_javascript_extension, DependencyExtractor, ExtractResult};
use crate::report::{FileReport, ProjectReport};
use crate::validate::validate;

/// Analyze a single JavaScript file.
pub fn analyze_file(path: &Path) -> ExtractResult<FileReport> {
    let mut extractor = DependencyExtractor::new()?;
    let result = extractor.extract_file(path)?;
    Ok(FileReport::new(path.display().to_string(), validate(&result)))
}

/// Analyze all JavaScript files under a directory root.
pub fn analyze_project(root: &Path) -> ExtractResult<ProjectReport> {
    let mut extractor = DependencyExtractor::new()?;
    let mut project = ProjectReport::new();

    for entry in WalkDir::new(root)
        .into_iter()
        .filter_entry(|e| !is_ignored_dir(e))
        .filter_map(|e| e.ok())
    {
        let path = entry.path();
        if path.is_dir() {
            continue;
        }

        // Non-JavaScript files are skipped entirely.
        let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("");
        if !is_javascript_extension(ext) {
            continue;
        }

        match extractor.extract_file(path) {
            Ok(result) => {
                project.add(FileReport::new(
                    path.display().to_string(),
                    validate(&result),
                ));
            }
            Err(e) => {
                tracing::warn!(file = %path.display(), error = %e, "failed to analyze file");
            }
        }
    }

    Ok(project)
}

/// Check if a directory should be ignored during traversal.
fn is_ignored_dir(entry: &walkdir::DirEntry) -> bool {
    if !entry.file_type().is_dir() {
        return false;
    }

    let name = entry.file_name().to_string_lossy();
    matches!(
        name.as_ref(),
        "node_modules" | ".git" | "dist" | "build" | "coverage"
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_analyze_project_walks_and_validates() {
        let dir = std::env::temp_dir().join("googscope-project-test");
        let nested = dir.join("ui");
        fs::create_dir_all(&nested).unwrap();
        fs::write(dir.join("clean.js"), "goog.require('x.y.Z');\nnew x.y.Z();\n").unwrap();
        fs::write(nested.join("dirty.js"), "goog.require('unused.ns');\n").unwrap();
        fs::write(dir.join("ignored.ts"), "goog.require('not.js');\n").unwrap();

        let report = analyze_project(&dir).unwrap();
        assert_eq!(report.files_analyzed, 2);
        assert_eq!(report.reports.len(), 1);
        assert!(report.reports[0].file.ends_with("dirty.js"));
        assert_eq!(report.diagnostic_count(), 1);

        fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_analyze_file_reports_findings() {
        let dir = std::env::temp_dir().join("googscope-file-test");
        fs::create_dir_all(&dir).unwrap();
        let path = dir.join("single.js");
        fs::write(&path, "new a.b.Widget();\n").unwrap();

        let report = analyze_file(&path).unwrap();
        assert!(report.has_findings());
        assert_eq!(report.diagnostics[0].namespace, "a.b.Widget");

        fs::remove_dir_all(&dir).unwrap();
    }
}
