//! Diagnostic accumulators for a conversion run.
//!
//! Three anomaly classes are collected throughout a run and emitted as
//! side-reports at the end: parameters with no limits-table match, rows
//! whose column count exceeds the known column-type count, and condition
//! signatures seen more than once for the same parameter set. Diagnostics
//! are never consulted for control flow.

use indexmap::IndexMap;
use std::path::{Path, PathBuf};

/// Accumulated anomalies of one conversion run
#[derive(Debug, Clone, Default)]
pub struct Diagnostics {
    /// Parameters that received an empty-bound fallback limit
    no_limit_match: Vec<String>,
    /// Per-file 1-based line numbers of values beyond the header width
    no_column_match: IndexMap<PathBuf, Vec<usize>>,
    /// Per-condition-signature occurrence locations
    condition_occurrences: IndexMap<String, IndexMap<PathBuf, Vec<usize>>>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a parameter that fell back to an empty-bound limit
    pub fn record_no_limit(&mut self, parameter: &str) {
        self.no_limit_match.push(parameter.to_string());
    }

    /// Record a data value with no corresponding column header
    pub fn record_no_column(&mut self, file: &Path, line_number: usize) {
        self.no_column_match
            .entry(file.to_path_buf())
            .or_default()
            .push(line_number);
    }

    /// Record one occurrence of a condition signature
    pub fn record_condition(&mut self, cond_str: &str, file: &Path, line_number: usize) {
        self.condition_occurrences
            .entry(cond_str.to_string())
            .or_default()
            .entry(file.to_path_buf())
            .or_default()
            .push(line_number);
    }

    pub fn no_limit_parameters(&self) -> &[String] {
        &self.no_limit_match
    }

    pub fn no_column_lines(&self) -> &IndexMap<PathBuf, Vec<usize>> {
        &self.no_column_match
    }

    /// Condition signatures seen more than once, with their per-file line
    /// numbers. Only repeated entries are reported.
    pub fn repeated_conditions(&self) -> impl Iterator<Item = (&PathBuf, &Vec<usize>)> {
        self.condition_occurrences
            .values()
            .flat_map(|by_file| by_file.iter())
            .filter(|(_, lines)| lines.len() > 1)
    }

    pub fn has_no_limit_entries(&self) -> bool {
        !self.no_limit_match.is_empty()
    }

    pub fn has_no_column_entries(&self) -> bool {
        !self.no_column_match.is_empty()
    }

    pub fn has_repeated_conditions(&self) -> bool {
        self.repeated_conditions().next().is_some()
    }
}
