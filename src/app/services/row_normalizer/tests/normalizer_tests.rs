//! Tests for the row normalization engine

use super::{SAMPLE_EXPORT, create_test_config, write_source_file};
use crate::Error;
use crate::app::services::limits_table::LimitsTable;
use crate::app::services::row_normalizer::{NormalizedOutput, RowNormalizer};
use std::path::{Path, PathBuf};
use tempfile::TempDir;

fn run_with(
    contents: &str,
    limits: &LimitsTable,
    pictures: &[PathBuf],
) -> (TempDir, PathBuf, NormalizedOutput) {
    let dir = TempDir::new().unwrap();
    let source = write_source_file(&dir, "sample.csv", contents);
    let config = create_test_config();
    let waveforms: Vec<PathBuf> = Vec::new();

    let mut normalizer = RowNormalizer::new(limits, &config, pictures, &waveforms);
    normalizer.normalize_file(&source).unwrap();
    let output = normalizer.finish();
    (dir, source, output)
}

#[test]
fn test_produces_one_value_and_one_limit_record() {
    let limits = LimitsTable::parse("");
    let (_dir, _source, output) = run_with(SAMPLE_EXPORT, &limits, &[]);

    assert_eq!(output.data_objects.len(), 2);
    // the limit record is emitted at first sighting, before the file's
    // value records are flushed
    assert!(output.data_objects[0].is_limit());
    assert!(output.data_objects[1].is_value());
}

#[test]
fn test_value_record_contents() {
    let limits = LimitsTable::parse("");
    let (dir, _source, output) = run_with(SAMPLE_EXPORT, &limits, &[]);

    let value = &output.data_objects[1];
    assert_eq!(
        value.payload.get("ibat").map(String::as_str),
        Some("0.0012345")
    );
    assert_eq!(
        value.payload.get("comment___0").map(String::as_str),
        Some("all good")
    );

    let meta = &value.meta_data;
    assert_eq!(meta.get("cond_VIO").map(String::as_str), Some("3"));
    assert_eq!(meta.get("test_name").map(String::as_str), Some("ibat"));
    assert_eq!(meta.get("data_object_type").map(String::as_str), Some("value"));
    assert_eq!(meta.get("dut_id").map(String::as_str), Some("7"));
    assert_eq!(meta.get("package").map(String::as_str), Some("PG-TQFP-48"));
    assert_eq!(meta.get("user_name").map(String::as_str), Some("Jane Roe"));
    assert_eq!(meta.get("test_program_revision").map(String::as_str), Some("2.1"));
    assert_eq!(meta.get("test_number").map(String::as_str), Some("1"));
    // source links point at the file's directory
    let expected_dir = dir.path().to_string_lossy().replace('\\', "/");
    let link = meta.get("cond_link_raw_data").unwrap();
    assert!(link.starts_with("file:///"));
    assert!(link.ends_with(expected_dir.trim_start_matches('/')));
    // no api/global identifiers in the fixture
    assert!(!meta.contains_key("rddf_tc_id"));
}

#[test]
fn test_fallback_limit_record_and_diagnostic() {
    let limits = LimitsTable::parse("");
    let (_dir, _source, output) = run_with(SAMPLE_EXPORT, &limits, &[]);

    let limit = &output.data_objects[0];
    assert_eq!(limit.payload.get("scale").map(String::as_str), Some("NA"));
    assert_eq!(limit.payload.get("unit").map(String::as_str), Some("A"));
    assert_eq!(limit.payload.get("lower_limit").map(String::as_str), Some(""));
    assert_eq!(limit.payload.get("upper_limit").map(String::as_str), Some(""));
    assert_eq!(
        limit.meta_data.get("test_number").map(String::as_str),
        Some("1")
    );

    assert_eq!(output.diagnostics.no_limit_parameters(), ["ibat".to_string()]);
}

#[test]
fn test_common_meta_data_from_meta_line() {
    let limits = LimitsTable::parse("");
    let (_dir, _source, output) = run_with(SAMPLE_EXPORT, &limits, &[]);

    let common = &output.common_meta_data;
    assert_eq!(common.get("basic_type").map(String::as_str), Some("S1234"));
    assert_eq!(
        common.get("product_sales_code").map(String::as_str),
        Some("SC-77")
    );
    assert_eq!(
        common.get("product_design_step").map(String::as_str),
        Some("A1")
    );
    assert_eq!(common.get("user_name").map(String::as_str), Some("Jane Roe"));
    assert_eq!(
        common.get("email").map(String::as_str),
        Some("jane.roe@example.com")
    );
}

#[test]
fn test_incomplete_identity_leaves_common_meta_empty() {
    let export = "\
Columns type;param;out
Variables;vio;ibat
Units;V;mA
;3;1.2345
";
    let limits = LimitsTable::parse("");
    let (_dir, _source, output) = run_with(export, &limits, &[]);
    assert!(output.common_meta_data.is_empty());
    assert_eq!(output.data_objects.len(), 2);
}

#[test]
fn test_limits_table_entry_supplies_numbers_and_bounds() {
    let limits = LimitsTable::parse(
        "key LSL USL Unit TestNr ReqID Typ Description\n\
         ibat 1 3 mA 101 REQ-9 2 battery current\n",
    );
    let (_dir, _source, output) = run_with(SAMPLE_EXPORT, &limits, &[]);

    let limit = &output.data_objects[0];
    assert_eq!(limit.payload.get("lower_limit").map(String::as_str), Some("0.001"));
    assert_eq!(limit.payload.get("upper_limit").map(String::as_str), Some("0.003"));
    assert_eq!(limit.payload.get("unit").map(String::as_str), Some("A"));
    let meta = &limit.meta_data;
    assert_eq!(meta.get("test_number").map(String::as_str), Some("101"));
    assert_eq!(meta.get("requirement_id").map(String::as_str), Some("REQ-9"));
    assert_eq!(meta.get("typical").map(String::as_str), Some("2"));
    assert_eq!(
        meta.get("description").map(String::as_str),
        Some("battery current")
    );

    // the value record carries the table's number too
    let value = &output.data_objects[1];
    assert_eq!(
        value.meta_data.get("test_number").map(String::as_str),
        Some("101")
    );
    assert!(output.diagnostics.no_limit_parameters().is_empty());
}

#[test]
fn test_per_row_bounds_win_over_limits_table() {
    let export = "\
#meta, user, Jane Roe, basic_type, S1234, product_sales_code, SC-77, product_design_step, A1, dut_id, 7
Columns type;param;out
Variables;vio;ibat
Units;V;mA
LSL;;0.5
USL;;2.5
;3;1.2345
";
    let limits = LimitsTable::parse(
        "key LSL USL Unit TestNr\n\
         ibat 1 3 mA 101\n",
    );
    let (_dir, _source, output) = run_with(export, &limits, &[]);

    let limit = &output.data_objects[0];
    assert_eq!(limit.payload.get("lower_limit").map(String::as_str), Some("0.0005"));
    assert_eq!(limit.payload.get("upper_limit").map(String::as_str), Some("0.0025"));
    // per-row limits get a synthesized number, while the value record
    // still resolves through the table
    assert_eq!(
        limit.meta_data.get("test_number").map(String::as_str),
        Some("1")
    );
    assert_eq!(
        output.data_objects[1]
            .meta_data
            .get("test_number")
            .map(String::as_str),
        Some("101")
    );
}

#[test]
fn test_no_bound_token_becomes_empty_bound() {
    let export = "\
Columns type;param;out
Variables;vio;ibat
Units;V;mA
LSL;;NaN
USL;;2.5
;3;1.2345
";
    let limits = LimitsTable::parse("");
    let (_dir, _source, output) = run_with(export, &limits, &[]);

    let limit = &output.data_objects[0];
    assert_eq!(limit.payload.get("lower_limit").map(String::as_str), Some(""));
    assert_eq!(limit.payload.get("upper_limit").map(String::as_str), Some("0.0025"));
}

#[test]
fn test_repeated_condition_keeps_last_row() {
    let export = "\
#meta, user, Jane Roe, basic_type, S1234, product_sales_code, SC-77, product_design_step, A1, dut_id, 7
Columns type;param;out
Variables;vio;ibat
Units;V;mA
;3;1.2345
;3;2
";
    let limits = LimitsTable::parse("");
    let (_dir, source, output) = run_with(export, &limits, &[]);

    // one limit plus one surviving value record
    assert_eq!(output.data_objects.len(), 2);
    assert_eq!(
        output.data_objects[1].payload.get("ibat").map(String::as_str),
        Some("0.002")
    );

    assert!(output.diagnostics.has_repeated_conditions());
    let repeated: Vec<_> = output.diagnostics.repeated_conditions().collect();
    assert_eq!(repeated, vec![(&source, &vec![5, 6])]);
}

#[test]
fn test_values_beyond_header_width_are_diagnosed() {
    let export = "\
Columns type;param;out
Variables;vio;ibat
Units;V;mA
;3;1.2345;stray;stray
";
    let limits = LimitsTable::parse("");
    let (_dir, source, output) = run_with(export, &limits, &[]);

    // the in-range part of the row is processed normally
    assert_eq!(output.data_objects.len(), 2);
    let lines = output.diagnostics.no_column_lines().get(&source).unwrap();
    assert_eq!(lines, &vec![4, 4]);
}

#[test]
fn test_matching_picture_lands_in_payload() {
    let dir = TempDir::new().unwrap();
    let source = write_source_file(&dir, "sample.csv", SAMPLE_EXPORT);
    let picture = dir.path().join("Report-Picture_sample=7_vio=3[V].png");
    std::fs::write(&picture, b"png").unwrap();

    let limits = LimitsTable::parse("");
    let config = create_test_config();
    let pictures = vec![picture];
    let waveforms: Vec<PathBuf> = Vec::new();

    let mut normalizer = RowNormalizer::new(&limits, &config, &pictures, &waveforms);
    normalizer.normalize_file(&source).unwrap();
    let output = normalizer.finish();

    let value = &output.data_objects[1];
    assert_eq!(
        value.payload.get("png_filename___0").map(String::as_str),
        Some("Report-Picture_sample=7_vio=3[V].png")
    );
}

#[test]
fn test_records_do_not_deduplicate_across_files() {
    let dir = TempDir::new().unwrap();
    let first = write_source_file(&dir, "run_a.csv", SAMPLE_EXPORT);
    let second = write_source_file(&dir, "run_b.csv", SAMPLE_EXPORT);

    let limits = LimitsTable::parse("");
    let config = create_test_config();
    let pictures: Vec<PathBuf> = Vec::new();
    let waveforms: Vec<PathBuf> = Vec::new();

    let mut normalizer = RowNormalizer::new(&limits, &config, &pictures, &waveforms);
    normalizer
        .normalize_files(&[first, second], None)
        .unwrap();
    let output = normalizer.finish();

    // one limit for the parameter's first sighting, one value per file
    assert_eq!(output.data_objects.len(), 3);
    assert_eq!(
        output
            .data_objects
            .iter()
            .filter(|o| o.is_value())
            .count(),
        2
    );
    // same condition in different files is not a repetition
    assert!(!output.diagnostics.has_repeated_conditions());
}

#[test]
fn test_unreadable_source_file_is_fatal() {
    let limits = LimitsTable::parse("");
    let config = create_test_config();
    let pictures: Vec<PathBuf> = Vec::new();
    let waveforms: Vec<PathBuf> = Vec::new();

    let mut normalizer = RowNormalizer::new(&limits, &config, &pictures, &waveforms);
    let err = normalizer
        .normalize_file(Path::new("/nonexistent/sample.csv"))
        .unwrap_err();
    assert!(matches!(err, Error::Io { .. }));
}
