//! Report document and side-report writing.
//!
//! Writes the final report document as pretty-printed JSON into the run's
//! output directory, plus one CSV side-report per non-empty diagnostic
//! class. Side-reports for empty diagnostics are not created, so their
//! presence alone signals that a run had anomalies.

use crate::app::models::ReportDocument;
use crate::app::services::row_normalizer::Diagnostics;
use crate::constants::{
    NO_COLUMN_REPORT_FILENAME, NO_LIMIT_REPORT_FILENAME, REPEATED_CONDITIONS_REPORT_FILENAME,
};
use crate::{Error, Result};
use std::fmt::Write as _;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Writes one conversion run's outputs into a single directory
#[derive(Debug, Clone)]
pub struct ReportWriter {
    output_dir: PathBuf,
}

impl ReportWriter {
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
        }
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Create the output directory if it does not exist yet
    pub fn prepare(&self) -> Result<()> {
        fs::create_dir_all(&self.output_dir).map_err(|e| {
            Error::io(
                format!(
                    "couldn't create output directory: {}",
                    self.output_dir.display()
                ),
                e,
            )
        })
    }

    /// Serialize the report document to `<report_name>.json`
    pub fn write_document(
        &self,
        document: &ReportDocument,
        report_name: &str,
    ) -> Result<PathBuf> {
        let path = self.output_dir.join(format!("{}.json", report_name));
        let json = serde_json::to_string_pretty(document).map_err(|e| {
            Error::json_serialization("couldn't serialize report document", e)
        })?;
        fs::write(&path, json).map_err(|e| {
            Error::io(format!("couldn't write report: {}", path.display()), e)
        })?;

        info!(
            "Wrote report with {} data objects: {}",
            document.data_objects.len(),
            path.display()
        );
        Ok(path)
    }

    /// Write one CSV side-report per non-empty diagnostic class; returns
    /// the paths actually written
    pub fn write_side_reports(&self, diagnostics: &Diagnostics) -> Result<Vec<PathBuf>> {
        let mut written = Vec::new();

        if diagnostics.has_no_limit_entries() {
            let mut contents = String::from("parameter\n");
            for parameter in diagnostics.no_limit_parameters() {
                let _ = writeln!(contents, "{}", parameter);
            }
            written.push(self.write_side_report(NO_LIMIT_REPORT_FILENAME, &contents)?);
            warn!(
                "{} parameter(s) had no limits-table match, see {}",
                diagnostics.no_limit_parameters().len(),
                NO_LIMIT_REPORT_FILENAME
            );
        }

        if diagnostics.has_no_column_entries() {
            let mut contents = String::from("file;line\n");
            for (file, lines) in diagnostics.no_column_lines() {
                for line in lines {
                    let _ = writeln!(contents, "{};{}", file.display(), line);
                }
            }
            written.push(self.write_side_report(NO_COLUMN_REPORT_FILENAME, &contents)?);
            warn!(
                "Rows with values beyond the header width, see {}",
                NO_COLUMN_REPORT_FILENAME
            );
        }

        if diagnostics.has_repeated_conditions() {
            let mut contents = String::from("file;lines\n");
            for (file, lines) in diagnostics.repeated_conditions() {
                let joined: Vec<String> = lines.iter().map(usize::to_string).collect();
                let _ = writeln!(contents, "{};{}", file.display(), joined.join(" "));
            }
            written.push(
                self.write_side_report(REPEATED_CONDITIONS_REPORT_FILENAME, &contents)?,
            );
            warn!(
                "Repeated condition combinations (last occurrence kept), see {}",
                REPEATED_CONDITIONS_REPORT_FILENAME
            );
        }

        Ok(written)
    }

    /// Write the repeated-conditions side-report of one EFF conversion as
    /// `<report_name>_repeated_conditions.csv`; nothing is written when the
    /// file had no repeats
    pub fn write_repeated_conditions(
        &self,
        report_name: &str,
        diagnostics: &Diagnostics,
    ) -> Result<Option<PathBuf>> {
        if !diagnostics.has_repeated_conditions() {
            return Ok(None);
        }
        let mut contents = String::from("file;lines\n");
        for (file, lines) in diagnostics.repeated_conditions() {
            let joined: Vec<String> = lines.iter().map(usize::to_string).collect();
            let _ = writeln!(contents, "{};{}", file.display(), joined.join(" "));
        }
        let name = format!("{}_repeated_conditions.csv", report_name);
        let path = self.write_side_report(&name, &contents)?;
        warn!(
            "Repeated condition combinations (last occurrence kept), see {}",
            name
        );
        Ok(Some(path))
    }

    fn write_side_report(&self, name: &str, contents: &str) -> Result<PathBuf> {
        let path = self.output_dir.join(name);
        fs::write(&path, contents).map_err(|e| {
            Error::io(
                format!("couldn't write side-report: {}", path.display()),
                e,
            )
        })?;
        Ok(path)
    }
}
