//! Application constants for the bench report processor
//!
//! This module contains the line markers, column-type vocabulary, limit
//! attribute names, and file naming conventions used throughout the
//! conversion pipeline.

// =============================================================================
// Report Document
// =============================================================================

/// Version stamp written into the report header block
pub const REPORT_FORMAT_VERSION: &str = "1.0.1";

/// Data object type for measured values
pub const OBJECT_TYPE_VALUE: &str = "value";

/// Data object type for specification limits
pub const OBJECT_TYPE_LIMIT: &str = "limit";

// =============================================================================
// Source File Line Markers
// =============================================================================

/// Marker token identifying a metadata line
pub const META_LINE_MARKER: &str = "#meta";

/// Marker substring identifying the column-type header row
pub const COLUMN_TYPE_MARKER: &str = "Columns type";

/// Marker substring identifying the variable-name header row
pub const VARIABLES_MARKER: &str = "Variables";

/// Marker substring identifying the unit header row
pub const UNITS_MARKER: &str = "Units";

/// Marker substring identifying the per-row lower-limit header row
pub const LSL_MARKER: &str = "LSL";

/// Marker substring identifying the per-row upper-limit header row
pub const USL_MARKER: &str = "USL";

/// Comment marker for skipped lines
pub const COMMENT_MARKER: char = '#';

/// Minimum number of delimited fields for a line to carry data
pub const MIN_DATA_FIELDS: usize = 3;

/// Placeholder for absent per-row limit bounds
pub const NO_BOUND_TOKEN: &str = "NaN";

// =============================================================================
// Column Types and Condition Keys
// =============================================================================

/// Column type for test-condition columns
pub const COLUMN_TYPE_PARAM: &str = "param";

/// Column type for measured output columns
pub const COLUMN_TYPE_OUTPUT: &str = "out";

/// Case-insensitive fragment identifying comment columns
pub const COMMENT_TYPE_FRAGMENT: &str = "comment";

/// Variable name excluded from comment collection
pub const PICTURE_PATH_VARIABLE: &str = "PicturePath";

/// Prefix for condition metadata keys
pub const CONDITION_KEY_PREFIX: &str = "cond_";

/// Alias target for temperature-named condition variables
pub const CONDITION_KEY_TAMBIENT: &str = "cond_tambient";

/// Neutral value substituted for empty temperature conditions
pub const EMPTY_TEMPERATURE_VALUE: &str = "0";

// =============================================================================
// EFF Export Line Markers
// =============================================================================

/// Marker identifying the preamble line of an EFF export
pub const EFF_FILE_MARKER: &str = "<<EFF:1.00>>";

/// Marker identifying the condition-name row (test numbers follow the
/// named columns)
pub const EFF_CONDITIONS_MARKER: &str = "<+EFF:1.00>";

/// Marker identifying the parameter-name row
pub const EFF_PARAMS_MARKER: &str = "<+PName>";

/// Marker identifying the unit row
pub const EFF_UNITS_MARKER: &str = "<Unit>";

/// Marker identifying the per-column upper-limit row
pub const EFF_USL_MARKER: &str = "<USL>";

/// Marker identifying the per-column lower-limit row
pub const EFF_LSL_MARKER: &str = "<LSL>";

/// Prefix of the die identifier that marks EFF data rows
pub const EFF_DATA_MARKER: &str = "05_Die";

/// Preamble field carrying the operator reference
pub const EFF_REF_TOKEN: &str = "Ref";

/// Condition column carrying the combined product identity
pub const EFF_DESIGN_CONDITION: &str = "design";

/// Condition column carrying the sample identifier
pub const EFF_DUT_CONDITION: &str = "dut";

/// Prefix for global identifiers synthesized from the test-number row
pub const EFF_GLOBAL_ID_PREFIX: &str = "GID-";

/// Placeholder for test-unit fields when a Perl-API identifier is set
pub const EFF_DUMMY_FIELD: &str = "dummy";

// =============================================================================
// Limits Table
// =============================================================================

/// Token identifying the limits-file header line
pub const LIMITS_HEADER_TOKEN: &str = "key";

/// Tokens whose presence causes a limits-file line to be skipped
pub const LIMITS_SKIP_TOKENS: &[&str] = &["#", "standby"];

/// Fragment that truncates the synthesized description (encoding safety)
pub const LIMITS_HREF_FRAGMENT: &str = "href";

/// Limit attribute names as defined by the limits-file header row
pub mod limit_attributes {
    pub const LSL: &str = "LSL";
    pub const USL: &str = "USL";
    pub const UNIT: &str = "Unit";
    pub const TEST_NUMBER: &str = "TestNr";
    pub const REQUIREMENT_ID: &str = "ReqID";
    pub const DESCRIPTION: &str = "Description";
    pub const TYPICAL: &str = "Typ";
}

// =============================================================================
// Artifact Matching
// =============================================================================

/// Artifact-class token for visual captures
pub const PICTURE_CLASS_TOKEN: &str = "Report-Picture";

/// Artifact-class token for waveform captures
pub const WAVEFORM_CLASS_TOKEN: &str = "Report-waveform";

/// Fixed offset added to the `=` count of a candidate filename: one
/// mandatory parent-folder token plus one mandatory artifact-class token
pub const MATCH_CONDITION_OFFSET: usize = 2;

// =============================================================================
// File and Directory Constants
// =============================================================================

/// Specification-limits file name searched in the test-flow directory
pub const LIMITS_FILENAME: &str = "testlimits.txt";

/// Conversion configuration file name
pub const CONFIG_FILENAME: &str = "Config_Tembo.txt";

/// Source data file extension
pub const SOURCE_DATA_EXTENSION: &str = "csv";

/// EFF export file extension
pub const EFF_EXTENSION: &str = "eff";

/// Visual capture artifact extension
pub const PICTURE_EXTENSION: &str = "png";

/// Waveform capture artifact extension
pub const WAVEFORM_EXTENSION: &str = "mat";

/// Side-report listing parameters without a limits-table match
pub const NO_LIMIT_REPORT_FILENAME: &str = "No_Limit_Match.csv";

/// Side-report listing rows with columns beyond the known header width
pub const NO_COLUMN_REPORT_FILENAME: &str = "No_Col_Match.csv";

/// Side-report listing repeated condition signatures
pub const REPEATED_CONDITIONS_REPORT_FILENAME: &str = "Repeated_Conditions.csv";

/// Timestamp format for the generated output directory name
pub const OUTPUT_DIR_TIMESTAMP_FORMAT: &str = "%Y%m%dT%H%M%S";

// =============================================================================
// Test Numbering
// =============================================================================

/// Counter start value for synthesized test numbers
pub const FIRST_TEST_NUMBER: u32 = 1;

// =============================================================================
// Helper Functions
// =============================================================================

/// Convert a 1-based column index into its spreadsheet-style label
/// (1 -> "A", 26 -> "Z", 27 -> "AA"), used in header warnings
pub fn spreadsheet_column_label(mut index: usize) -> String {
    let mut label = String::new();
    while index > 0 {
        let rem = (index - 1) % 26;
        label.insert(0, (b'A' + rem as u8) as char);
        index = (index - 1) / 26;
    }
    label
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_spreadsheet_column_label() {
        assert_eq!(spreadsheet_column_label(1), "A");
        assert_eq!(spreadsheet_column_label(2), "B");
        assert_eq!(spreadsheet_column_label(26), "Z");
        assert_eq!(spreadsheet_column_label(27), "AA");
        assert_eq!(spreadsheet_column_label(52), "AZ");
        assert_eq!(spreadsheet_column_label(53), "BA");
        assert_eq!(spreadsheet_column_label(702), "ZZ");
        assert_eq!(spreadsheet_column_label(703), "AAA");
    }

    #[test]
    fn test_spreadsheet_column_label_zero() {
        assert_eq!(spreadsheet_column_label(0), "");
    }
}
