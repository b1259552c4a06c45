//! Comprehensive tests for the row normalizer module
//!
//! This module provides unit and integration tests for all row
//! normalization components, plus shared fixtures.

pub mod normalizer_tests;

use crate::app::models::DataObject;
use crate::app::services::row_normalizer::HeaderState;
use crate::config::ReportConfig;
use std::collections::BTreeMap;
use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

/// Create a test configuration carrying only the reporter's email
pub fn create_test_config() -> ReportConfig {
    ReportConfig {
        email: "jane.roe@example.com".to_string(),
        ..Default::default()
    }
}

/// Turn a literal row into owned field values
pub fn to_fields(values: &[&str]) -> Vec<String> {
    values.iter().map(|v| v.to_string()).collect()
}

/// Build a header state from column-type, variable, and unit rows.
/// Field 0 of each row is the row marker, exactly as in a real export.
pub fn create_test_header(
    column_types: &[&str],
    variables: &[&str],
    units: &[&str],
) -> HeaderState {
    let mut state = HeaderState::new(&create_test_config());
    state.set_column_types(to_fields(column_types), 2);
    state.set_variables(to_fields(variables), 3);
    state.set_units(to_fields(units));
    state
}

/// Write a source export fixture under the given directory
pub fn write_source_file(dir: &TempDir, name: &str, contents: &str) -> PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, contents).expect("failed to write test fixture");
    path
}

/// Create a minimal value record for store tests
pub fn create_test_record(name: &str) -> DataObject {
    let mut payload = BTreeMap::new();
    payload.insert(name.to_string(), "1".to_string());
    let mut meta = BTreeMap::new();
    meta.insert("test_name".to_string(), name.to_string());
    DataObject::new(payload, meta)
}

/// A minimal single-sample export: one condition column, one output
/// column, one comment column
pub const SAMPLE_EXPORT: &str = "\
#meta, user, Jane Roe, basic_type, S1234, product_sales_code, SC-77, product_design_step, A1, dut_id, 7, package, PG-TQFP-48, testunit_version, 2.1
Columns type;param;out;comment
Variables;vio;ibat;remark
Units;V;mA;
;3;1.2345;all good
";
