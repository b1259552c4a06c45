//! Row normalization engine.
//!
//! Consumes raw source-file lines one by one, maintaining the per-file
//! header state, and produces the ordered sequence of value and limit
//! records. Every anomaly short of an unreadable file is recovered
//! locally and captured in the diagnostics; no error propagates out of
//! the row-processing loop.

use crate::app::models::DataObject;
use crate::app::services::artifact_matcher::matching_files;
use crate::app::services::limits_table::LimitsTable;
use crate::app::services::unit_scaler::{scale_value, unit_scale};
use crate::config::ReportConfig;
use crate::constants::{
    COLUMN_TYPE_OUTPUT, COLUMN_TYPE_MARKER, COMMENT_MARKER, COMMENT_TYPE_FRAGMENT,
    LSL_MARKER, META_LINE_MARKER, MIN_DATA_FIELDS, NO_BOUND_TOKEN, OBJECT_TYPE_LIMIT,
    OBJECT_TYPE_VALUE, PICTURE_CLASS_TOKEN, PICTURE_PATH_VARIABLE, UNITS_MARKER, USL_MARKER,
    VARIABLES_MARKER, WAVEFORM_CLASS_TOKEN,
};
use crate::{Error, Result};
use indicatif::ProgressBar;
use regex::Regex;
use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};
use std::sync::LazyLock;
use tracing::{debug, info};

use super::condition::{ConditionSignature, build_signature};
use super::diagnostics::Diagnostics;
use super::header_state::{ColumnDescriptor, HeaderState};
use super::record_store::RecordStore;
use super::allocator::TestNumberAllocator;

/// Characters allowed in a parameter name used as a JSON payload key
static PARAM_NAME_INVALID: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^A-Za-z0-9_.\-]+").expect("valid regex"));

/// Final output of a conversion run
#[derive(Debug)]
pub struct NormalizedOutput {
    /// Ordered record sequence (limit records interleaved with flushed
    /// value records, in emission order)
    pub data_objects: Vec<DataObject>,
    /// Shared metadata block, empty when the product identity never
    /// became complete
    pub common_meta_data: BTreeMap<String, String>,
    /// Accumulated diagnostics for the side-reports
    pub diagnostics: Diagnostics,
}

/// Per-file context derived from the source file path
struct FileContext {
    path: PathBuf,
    /// Parent directory text, the first artifact match token
    parent_folder: String,
    /// Name of the directory containing the source file
    test_program_name: String,
    /// file:/// link to the source file's directory
    source_link: String,
    /// file:/// link to the directory of the correlated waveform capture
    waveform_link: Option<String>,
}

/// The orchestrating engine: consumes raw rows plus accumulated header
/// state, produces value records and at most one limit record per
/// newly-seen parameter.
pub struct RowNormalizer<'a> {
    limits: &'a LimitsTable,
    config: &'a ReportConfig,
    pictures: &'a [PathBuf],
    waveforms: &'a [PathBuf],
    allocator: TestNumberAllocator,
    diagnostics: Diagnostics,
    common_meta: Option<BTreeMap<String, String>>,
    data_objects: Vec<DataObject>,
}

impl<'a> RowNormalizer<'a> {
    pub fn new(
        limits: &'a LimitsTable,
        config: &'a ReportConfig,
        pictures: &'a [PathBuf],
        waveforms: &'a [PathBuf],
    ) -> Self {
        Self {
            limits,
            config,
            pictures,
            waveforms,
            allocator: TestNumberAllocator::new(),
            diagnostics: Diagnostics::new(),
            common_meta: None,
            data_objects: Vec::new(),
        }
    }

    /// Normalize all source files into one combined output sequence, in
    /// the given order. Stops at the first unreadable file.
    pub fn normalize_files(
        &mut self,
        files: &[PathBuf],
        progress: Option<&ProgressBar>,
    ) -> Result<()> {
        for file in files {
            self.normalize_file(file)?;
            if let Some(pb) = progress {
                pb.inc(1);
            }
        }
        Ok(())
    }

    /// Normalize one source file start-to-finish; its surviving records
    /// are flushed to the output sequence before returning
    pub fn normalize_file(&mut self, path: &Path) -> Result<()> {
        let file = File::open(path).map_err(|e| {
            Error::io(
                format!("couldn't read source data file: {}", path.display()),
                e,
            )
        })?;
        info!("Reading source file: {}", path.display());

        let context = self.file_context(path);
        let mut state = HeaderState::new(self.config);
        let mut store = RecordStore::new();
        self.try_create_common_meta(&state);

        for (index, line) in BufReader::new(file).lines().enumerate() {
            let line = line.map_err(|e| {
                Error::io(format!("read failed in {}", path.display()), e)
            })?;
            let line = line.trim_end_matches('\r');
            self.process_line(&mut state, &mut store, &context, line, index + 1);
        }

        // The next file cannot repeat this file's condition combinations,
        // so everything still held moves to the output now.
        debug!(
            "Flushing {} records from {}",
            store.len(),
            path.display()
        );
        store.flush_into(&mut self.data_objects);
        Ok(())
    }

    /// Consume the engine and hand over the run's output
    pub fn finish(self) -> NormalizedOutput {
        NormalizedOutput {
            data_objects: self.data_objects,
            common_meta_data: self.common_meta.unwrap_or_default(),
            diagnostics: self.diagnostics,
        }
    }

    fn process_line(
        &mut self,
        state: &mut HeaderState,
        store: &mut RecordStore,
        context: &FileContext,
        line: &str,
        line_number: usize,
    ) {
        if line.contains(META_LINE_MARKER) {
            self.handle_meta_line(state, line);
            return;
        }

        // Some exports delimit with ',', some with ';'; normalize to one.
        let normalized = line.replace(',', ";");
        let fields: Vec<String> = normalized.split(';').map(str::to_string).collect();
        if fields.len() < MIN_DATA_FIELDS {
            return;
        }

        if line.contains(COLUMN_TYPE_MARKER) {
            state.set_column_types(fields, line_number);
        } else if line.contains(VARIABLES_MARKER) {
            state.set_variables(fields, line_number);
        } else if line.contains(UNITS_MARKER) {
            state.set_units(fields);
        } else if line.contains(LSL_MARKER) {
            state.set_lsl(fields);
        } else if line.contains(USL_MARKER) {
            state.set_usl(fields);
        } else if line.starts_with(COMMENT_MARKER) || fields.iter().all(String::is_empty) {
            // comment rows and all-empty rows carry nothing
        } else {
            self.handle_data_row(state, store, context, &fields, line_number);
        }
    }

    /// Scan a meta line for recognized key tokens; the value of a key is
    /// the token following it
    fn handle_meta_line(&mut self, state: &mut HeaderState, line: &str) {
        // Exports disagree on the meta delimiter ("key : value" vs
        // "key, value" vs "key; value"); normalize all forms to ','.
        let normalized = line.replace(':', ",").replace(';', ",");
        let tokens: Vec<&str> = normalized.split(',').map(str::trim).collect();

        for (i, token) in tokens.iter().enumerate() {
            let value = match tokens.get(i + 1) {
                Some(next) => next.to_string(),
                None => continue,
            };
            let meta = &mut state.meta;
            if token.contains("user") && !token.contains("email") {
                // A configured user name wins over the one in the data
                meta.user_name = if self.config.user_name.is_empty() {
                    value
                } else {
                    self.config.user_name.clone()
                };
            } else if token.contains("product_sales_code") {
                meta.product_sales_code = value;
            } else if token.contains("basic_type") {
                meta.basic_type = value;
            } else if token.contains("product_design_step") {
                meta.product_design_step = value;
            } else if token.contains("package") {
                meta.package = value;
            } else if token.contains("dut_id") {
                meta.dut_id = value;
            } else if token.contains("api_id") {
                meta.api_id = value;
            } else if token.contains("global_id") {
                meta.global_id = value;
            } else if token.contains("testunit_version") {
                meta.testunit_version = value;
            }
        }

        self.try_create_common_meta(state);
    }

    /// One-time construction of the shared metadata block, the first time
    /// the full product identity is known
    fn try_create_common_meta(&mut self, state: &HeaderState) {
        if self.common_meta.is_some() || !state.meta.identity_complete() {
            return;
        }
        let mut common = BTreeMap::new();
        common.insert("basic_type".to_string(), state.meta.basic_type.clone());
        common.insert(
            "product_design_step".to_string(),
            state.meta.product_design_step.clone(),
        );
        common.insert(
            "product_sales_code".to_string(),
            state.meta.product_sales_code.clone(),
        );
        common.insert("user_name".to_string(), state.meta.user_name.clone());
        common.insert("email".to_string(), self.config.email.clone());
        debug!("Common metadata created for {}", state.meta.basic_type);
        self.common_meta = Some(common);
    }

    fn handle_data_row(
        &mut self,
        state: &HeaderState,
        store: &mut RecordStore,
        context: &FileContext,
        fields: &[String],
        line_number: usize,
    ) {
        let descriptor_count = state.descriptors().len();

        // Values beyond the known header width are diagnosed and dropped;
        // the rest of the row is processed normally.
        for column in 0..fields.len() {
            if column >= descriptor_count {
                self.diagnostics.record_no_column(&context.path, line_number);
            }
        }

        let comments = collect_comments(state.descriptors(), fields);
        let signature = build_signature(state, fields, &context.parent_folder);
        self.diagnostics
            .record_condition(&signature.cond_str, &context.path, line_number);

        let base_meta = self.base_row_meta(&signature, context);

        for (column, descriptor) in state.descriptors().iter().enumerate() {
            if descriptor.variable.is_empty()
                || descriptor.column_type != COLUMN_TYPE_OUTPUT
            {
                continue;
            }
            let Some(value) = fields.get(column) else {
                continue;
            };
            if value.is_empty() {
                continue;
            }
            self.emit_value_record(
                state,
                store,
                context,
                &signature,
                &base_meta,
                &comments,
                column,
                descriptor,
                value,
                line_number,
            );
        }
    }

    /// Row metadata shared by all output columns of one data row
    fn base_row_meta(
        &self,
        signature: &ConditionSignature,
        context: &FileContext,
    ) -> BTreeMap<String, String> {
        let mut meta: BTreeMap<String, String> =
            signature.meta_entries.iter().cloned().collect();
        meta.insert(
            "cond_link_screenshots".to_string(),
            context.source_link.clone(),
        );
        meta.insert("cond_link_raw_data".to_string(), context.source_link.clone());
        if let Some(link) = &context.waveform_link {
            meta.insert("cond_link_waveforms".to_string(), link.clone());
        }
        meta
    }

    #[allow(clippy::too_many_arguments)]
    fn emit_value_record(
        &mut self,
        state: &HeaderState,
        store: &mut RecordStore,
        context: &FileContext,
        signature: &ConditionSignature,
        base_meta: &BTreeMap<String, String>,
        comments: &[String],
        column: usize,
        descriptor: &ColumnDescriptor,
        value: &str,
        line_number: usize,
    ) {
        let key_name = validate_param_name(&descriptor.variable);
        if key_name.is_empty() {
            return;
        }
        let key_cond_str = format!("{}{}", key_name, signature.cond_str);

        let first_seen = !self.allocator.is_registered(&key_name);

        let (exponent, _) = unit_scale(&descriptor.unit);
        let mut payload = BTreeMap::new();
        payload.insert(key_name.clone(), scale_value(exponent, value));

        // Correlated artifact files become indexed payload entries
        let mut tokens = signature.match_tokens.clone();
        tokens.push(PICTURE_CLASS_TOKEN.to_string());
        for (i, file) in matching_files(&tokens, self.pictures).iter().enumerate() {
            payload.insert(format!("png_filename___{}", i), file.clone());
        }
        tokens.pop();
        tokens.push(WAVEFORM_CLASS_TOKEN.to_string());
        for (i, file) in matching_files(&tokens, self.waveforms).iter().enumerate() {
            payload.insert(format!("mat_filename___{}", i), file.clone());
        }
        for (i, comment) in comments.iter().enumerate() {
            payload.insert(format!("comment___{}", i), comment.clone());
        }

        let mut meta = base_meta.clone();
        meta.insert("test_name".to_string(), key_name.clone());
        meta.insert("data_object_type".to_string(), OBJECT_TYPE_VALUE.to_string());
        meta.insert("dut_id".to_string(), state.meta.dut_id.clone());
        meta.insert("package".to_string(), state.meta.package.clone());
        meta.insert("user_name".to_string(), state.meta.user_name.clone());
        if !state.meta.api_id.is_empty() && !state.meta.global_id.is_empty() {
            meta.insert(
                "rddf_tc_id".to_string(),
                format!("{}:{}", state.meta.api_id, state.meta.global_id),
            );
        }
        meta.insert(
            "test_program_name".to_string(),
            context.test_program_name.clone(),
        );
        meta.insert(
            "test_program_revision".to_string(),
            state.meta.testunit_version.clone(),
        );

        let test_number = match self.limits.get(&key_name) {
            Some(entry) => entry.test_number().to_string(),
            None => self.allocator.allocate(&key_name).to_string(),
        };
        meta.insert("test_number".to_string(), test_number);

        if store.insert(key_cond_str, DataObject::new(payload, meta)) {
            debug!(
                "Repeated condition for {} at {}:{} (keeping last occurrence)",
                key_name,
                context.path.display(),
                line_number
            );
        }

        // Exactly one limit record is ever emitted per unique parameter
        if first_seen {
            self.emit_limit_record(state, column, descriptor, &key_name);
        }
    }

    /// Synthesize the one limit record of a newly-seen parameter:
    /// per-row bounds win, then the limits table, then an empty-bound
    /// fallback that is logged into the no-limit diagnostic
    fn emit_limit_record(
        &mut self,
        state: &HeaderState,
        column: usize,
        descriptor: &ColumnDescriptor,
        key_name: &str,
    ) {
        let mut payload = BTreeMap::new();
        // Scale is left for the intake system's auto conversion
        payload.insert("scale".to_string(), "NA".to_string());

        let requirement_id;
        let description;
        let typical;
        let test_number;

        if let Some((lsl, usl)) = state.row_bounds(column) {
            let (exponent, unit) = unit_scale(&descriptor.unit);
            payload.insert("unit".to_string(), unit);
            payload.insert(
                "lower_limit".to_string(),
                scale_bound(exponent, lsl),
            );
            payload.insert(
                "upper_limit".to_string(),
                scale_bound(exponent, usl),
            );
            requirement_id = String::new();
            description = String::new();
            typical = String::new();
            test_number = self.allocator.allocate(key_name).to_string();
        } else if let Some(entry) = self.limits.get(key_name) {
            let (exponent, unit) = unit_scale(entry.unit());
            payload.insert("unit".to_string(), unit);
            payload.insert(
                "lower_limit".to_string(),
                scale_value(exponent, entry.lower_limit()),
            );
            payload.insert(
                "upper_limit".to_string(),
                scale_value(exponent, entry.upper_limit()),
            );
            requirement_id = entry.requirement_id().to_string();
            description = entry.description().to_string();
            typical = entry.typical().to_string();
            test_number = entry.test_number().to_string();

            // The table's own number is reserved so synthesized numbers
            // never collide with it; when per-row limit rows exist the
            // parameter falls back to a synthesized number instead.
            if !state.has_row_limit_rows() {
                match entry.test_number().parse::<u32>() {
                    Ok(number) => self.allocator.reserve(key_name, number),
                    Err(_) => {
                        self.allocator.allocate(key_name);
                    }
                }
            } else {
                self.allocator.allocate(key_name);
            }
        } else {
            let (_, unit) = unit_scale(&descriptor.unit);
            payload.insert("unit".to_string(), unit);
            payload.insert("lower_limit".to_string(), String::new());
            payload.insert("upper_limit".to_string(), String::new());
            requirement_id = String::new();
            description = String::new();
            typical = String::new();
            test_number = self.allocator.allocate(key_name).to_string();
            self.diagnostics.record_no_limit(key_name);
        }

        let mut meta = self.common_meta.clone().unwrap_or_default();
        meta.insert("test_name".to_string(), key_name.to_string());
        meta.insert("data_object_type".to_string(), OBJECT_TYPE_LIMIT.to_string());
        meta.insert("requirement_id".to_string(), requirement_id);
        meta.insert("description".to_string(), description);
        meta.insert("typical".to_string(), typical);
        meta.insert("test_number".to_string(), test_number);

        self.data_objects.push(DataObject::new(payload, meta));
    }

    /// Derive the per-file context used for links and artifact matching
    fn file_context(&self, path: &Path) -> FileContext {
        let parent = path.parent().unwrap_or_else(|| Path::new(""));
        let parent_folder = parent.to_string_lossy().to_string();
        let test_program_name = parent
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default();
        let source_link = file_url(&parent_folder);

        let waveform_link = self
            .waveforms
            .iter()
            .find(|w| w.to_string_lossy().contains(&parent_folder))
            .and_then(|w| w.parent())
            .map(|dir| file_url(&dir.to_string_lossy()));

        FileContext {
            path: path.to_path_buf(),
            parent_folder,
            test_program_name,
            source_link,
            waveform_link,
        }
    }
}

/// Scale one per-row bound; the no-bound token becomes an explicit empty
/// bound rather than a number
fn scale_bound(exponent: i32, bound: &str) -> String {
    if bound.starts_with(NO_BOUND_TOKEN) {
        String::new()
    } else {
        scale_value(exponent, bound)
    }
}

/// Collect the row's comment-column values, excluding picture paths
fn collect_comments(descriptors: &[ColumnDescriptor], fields: &[String]) -> Vec<String> {
    let mut comments = Vec::new();
    for (column, descriptor) in descriptors.iter().enumerate() {
        if descriptor.variable.is_empty() {
            continue;
        }
        if !descriptor
            .column_type
            .to_lowercase()
            .contains(COMMENT_TYPE_FRAGMENT)
            || descriptor.variable == PICTURE_PATH_VARIABLE
        {
            continue;
        }
        if let Some(value) = fields.get(column) {
            if !value.is_empty() {
                comments.push(value.clone());
            }
        }
    }
    comments
}

/// Sanitize a variable name into a JSON-safe payload key
pub fn validate_param_name(variable: &str) -> String {
    let trimmed = variable.trim();
    PARAM_NAME_INVALID.replace_all(trimmed, "_").to_string()
}

/// Build a file:/// link with forward slashes
fn file_url(path: &str) -> String {
    let normalized = path.replace('\\', "/");
    format!("file:///{}", normalized.trim_start_matches('/'))
}
