//! Per-file header parsing context.
//!
//! The header rows of a measurement export (column types, variable names,
//! units, per-row limits) arrive as separate interleaved lines. Instead of
//! indexing parallel arrays positionally, the raw rows are folded into one
//! ordered sequence of per-column descriptors, rebuilt whenever a header
//! row changes. The descriptor count always equals the column-type row
//! length; shorter sibling rows pad with empty strings, so a descriptor
//! lookup can never misalign.

use crate::config::ReportConfig;
use crate::constants::spreadsheet_column_label;
use tracing::warn;

/// All header attributes of one data column
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ColumnDescriptor {
    /// Column type ("param", "out", comment variants, ...)
    pub column_type: String,
    /// Variable name; an empty name disables the column
    pub variable: String,
    /// Unit string for value scaling
    pub unit: String,
    /// Per-row lower specification limit, empty if absent
    pub lsl: String,
    /// Per-row upper specification limit, empty if absent
    pub usl: String,
}

/// Accumulated meta fields for the rows that follow
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MetaFields {
    pub user_name: String,
    pub basic_type: String,
    pub product_sales_code: String,
    pub product_design_step: String,
    pub package: String,
    pub dut_id: String,
    pub api_id: String,
    pub global_id: String,
    pub testunit_version: String,
}

impl MetaFields {
    /// Seed meta fields from configuration overrides; empty config values
    /// leave the field to be filled from `#meta` lines
    pub fn seeded_from(config: &ReportConfig) -> Self {
        Self {
            user_name: config.user_name.clone(),
            basic_type: config.basic_type.clone(),
            product_sales_code: config.product_sales_code.clone(),
            product_design_step: config.product_design_step.clone(),
            package: config.package.clone(),
            dut_id: config.dut_id.clone(),
            api_id: config.api_id.clone(),
            global_id: config.global_id.clone(),
            testunit_version: config.testunit_version.clone(),
        }
    }

    /// Whether the three product identity fields required for the common
    /// metadata block are all known
    pub fn identity_complete(&self) -> bool {
        !self.basic_type.is_empty()
            && !self.product_sales_code.is_empty()
            && !self.product_design_step.is_empty()
    }
}

/// Mutable per-file parsing context: header rows, derived descriptors,
/// and accumulated meta fields. Reset per source file, not per row.
#[derive(Debug, Clone, Default)]
pub struct HeaderState {
    column_types: Vec<String>,
    variables: Vec<String>,
    units: Vec<String>,
    lsl: Vec<String>,
    usl: Vec<String>,
    descriptors: Vec<ColumnDescriptor>,
    pub meta: MetaFields,
}

impl HeaderState {
    pub fn new(config: &ReportConfig) -> Self {
        Self {
            meta: MetaFields::seeded_from(config),
            ..Default::default()
        }
    }

    /// Overwrite the column-type row; empty entries are reported with the
    /// 1-based spreadsheet-style column label and skipped later
    pub fn set_column_types(&mut self, fields: Vec<String>, line_number: usize) {
        for (i, column_type) in fields.iter().enumerate() {
            if column_type.is_empty() {
                let label = spreadsheet_column_label(i + 1);
                warn!(
                    "Empty entry for Columns type at {}{}. Column {} will be skipped!",
                    line_number, label, label
                );
            }
        }
        self.column_types = fields;
        self.rebuild_descriptors();
    }

    /// Overwrite the variable-name row; empty entries are reported with
    /// the 1-based spreadsheet-style column label and skipped later
    pub fn set_variables(&mut self, fields: Vec<String>, line_number: usize) {
        for (i, variable) in fields.iter().enumerate() {
            if variable.is_empty() {
                let label = spreadsheet_column_label(i + 1);
                warn!(
                    "Empty entry for Variables at {}{}. Column {} will be skipped!",
                    line_number, label, label
                );
            }
        }
        self.variables = fields;
        self.rebuild_descriptors();
    }

    pub fn set_units(&mut self, fields: Vec<String>) {
        self.units = fields;
        self.rebuild_descriptors();
    }

    pub fn set_lsl(&mut self, fields: Vec<String>) {
        self.lsl = fields;
        self.rebuild_descriptors();
    }

    pub fn set_usl(&mut self, fields: Vec<String>) {
        self.usl = fields;
        self.rebuild_descriptors();
    }

    /// Ordered per-column descriptors; length equals the column-type row
    pub fn descriptors(&self) -> &[ColumnDescriptor] {
        &self.descriptors
    }

    /// Whether the file carries per-row limit rows at all
    pub fn has_row_limit_rows(&self) -> bool {
        !self.lsl.is_empty() && !self.usl.is_empty()
    }

    /// Per-row bounds for a column, present only when both bounds exist
    /// and are non-empty
    pub fn row_bounds(&self, column: usize) -> Option<(&str, &str)> {
        let lsl = self.lsl.get(column)?;
        let usl = self.usl.get(column)?;
        if lsl.is_empty() || usl.is_empty() {
            return None;
        }
        Some((lsl.as_str(), usl.as_str()))
    }

    fn rebuild_descriptors(&mut self) {
        let empty = String::new();
        self.descriptors = (0..self.column_types.len())
            .map(|i| ColumnDescriptor {
                column_type: self.column_types[i].clone(),
                variable: self.variables.get(i).unwrap_or(&empty).clone(),
                unit: self.units.get(i).unwrap_or(&empty).clone(),
                lsl: self.lsl.get(i).unwrap_or(&empty).clone(),
                usl: self.usl.get(i).unwrap_or(&empty).clone(),
            })
            .collect();
    }
}
