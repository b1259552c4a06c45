//! EFF export conversion.
//!
//! EFF exports are the second source format: a fixed preamble line, a
//! condition-name row whose trailing cells are test numbers, parameter,
//! unit and bound rows, then one data row per die. Unlike the CSV path
//! there is no limits-table lookup; bounds come from the per-column
//! `<LSL>`/`<USL>` rows only, and every EFF file yields its own report
//! document named after the file stem.

use crate::app::models::DataObject;
use crate::app::services::row_normalizer::{Diagnostics, RecordStore, validate_param_name};
use crate::app::services::unit_scaler::{scale_value, unit_scale};
use crate::config::ReportConfig;
use crate::constants::{
    CONDITION_KEY_PREFIX, CONDITION_KEY_TAMBIENT, EFF_CONDITIONS_MARKER, EFF_DATA_MARKER,
    EFF_DESIGN_CONDITION, EFF_DUMMY_FIELD, EFF_DUT_CONDITION, EFF_FILE_MARKER,
    EFF_GLOBAL_ID_PREFIX, EFF_LSL_MARKER, EFF_PARAMS_MARKER, EFF_REF_TOKEN, EFF_UNITS_MARKER,
    EFF_USL_MARKER, EMPTY_TEMPERATURE_VALUE, OBJECT_TYPE_LIMIT, OBJECT_TYPE_VALUE,
};
use crate::{Error, Result};
use std::collections::{BTreeMap, BTreeSet};
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use tracing::{debug, info};

/// Output of converting one EFF file
#[derive(Debug)]
pub struct EffOutcome {
    /// Report name derived from the source file stem
    pub report_name: String,
    /// Ordered record sequence (limit records first, then the surviving
    /// value records in insertion order)
    pub data_objects: Vec<DataObject>,
    /// Shared metadata block, empty when the design identity never
    /// became complete
    pub common_meta_data: BTreeMap<String, String>,
    /// Repeated-condition occurrences of this file
    pub diagnostics: Diagnostics,
}

/// Converts EFF exports, one report document per source file
pub struct EffNormalizer<'a> {
    config: &'a ReportConfig,
}

impl<'a> EffNormalizer<'a> {
    pub fn new(config: &'a ReportConfig) -> Self {
        Self { config }
    }

    /// Convert one EFF file start-to-finish
    pub fn normalize_file(&self, path: &Path) -> Result<EffOutcome> {
        let file = File::open(path).map_err(|e| {
            Error::io(format!("couldn't read EFF file: {}", path.display()), e)
        })?;
        info!("Reading EFF file: {}", path.display());

        let mut run = EffConversion::new(self.config);
        for (index, line) in BufReader::new(file).lines().enumerate() {
            let line = line.map_err(|e| {
                Error::io(format!("read failed in {}", path.display()), e)
            })?;
            // Quote characters break the downstream JSON encoding
            let line = line.trim_end_matches('\r').replace(['"', '\''], "");
            run.process_line(path, &line, index + 1);
        }

        Ok(run.finish(path))
    }
}

/// Mutable state of one EFF file conversion
struct EffConversion<'a> {
    config: &'a ReportConfig,
    user_name: String,
    basic_type: String,
    product_sales_code: String,
    product_design_step: String,
    dut_id: String,
    /// Condition-name row; trailing cells carry the test numbers
    conditions: Vec<String>,
    params: Vec<String>,
    units: Vec<String>,
    lsl: Vec<String>,
    usl: Vec<String>,
    /// Column index where the test-value columns begin
    value_columns_from: usize,
    store: RecordStore,
    diagnostics: Diagnostics,
    common_meta: Option<BTreeMap<String, String>>,
    seen_params: BTreeSet<String>,
    data_objects: Vec<DataObject>,
}

impl<'a> EffConversion<'a> {
    fn new(config: &'a ReportConfig) -> Self {
        Self {
            config,
            user_name: String::new(),
            basic_type: String::new(),
            product_sales_code: String::new(),
            product_design_step: String::new(),
            dut_id: String::new(),
            conditions: Vec::new(),
            params: Vec::new(),
            units: Vec::new(),
            lsl: Vec::new(),
            usl: Vec::new(),
            value_columns_from: 0,
            store: RecordStore::new(),
            diagnostics: Diagnostics::new(),
            common_meta: None,
            seen_params: BTreeSet::new(),
            data_objects: Vec::new(),
        }
    }

    fn process_line(&mut self, path: &Path, line: &str, line_number: usize) {
        let fields: Vec<String> = line.split(';').map(str::to_string).collect();

        if line.contains(EFF_FILE_MARKER) {
            self.user_name = self.resolve_user_name(&fields);
        } else if line.contains(EFF_CONDITIONS_MARKER) {
            self.set_conditions(fields);
        } else if line.contains(EFF_PARAMS_MARKER) {
            self.params = fields;
        } else if line.contains(EFF_UNITS_MARKER) {
            self.units = fields;
        } else if line.contains(EFF_USL_MARKER) {
            self.usl = fields;
        } else if line.contains(EFF_LSL_MARKER) {
            self.lsl = fields;
        } else if line.contains(EFF_DATA_MARKER) {
            self.handle_data_row(path, &fields, line_number);
        }
    }

    /// The operator name comes from configuration when set, otherwise
    /// from the preamble's reference field
    fn resolve_user_name(&self, fields: &[String]) -> String {
        if !self.config.user_name.is_empty() {
            return self.config.user_name.clone();
        }
        fields
            .iter()
            .filter(|field| field.contains(EFF_REF_TOKEN))
            .next_back()
            .and_then(|field| field.split('=').nth(1))
            .map(str::to_string)
            .unwrap_or_default()
    }

    /// Condition names come first; the first numeric cell starts the
    /// test-number columns
    fn set_conditions(&mut self, fields: Vec<String>) {
        self.value_columns_from = fields
            .iter()
            .position(|field| field.parse::<f64>().is_ok())
            .unwrap_or(fields.len());
        self.conditions = fields;
    }

    fn handle_data_row(&mut self, path: &Path, fields: &[String], line_number: usize) {
        let mut cond_str = String::new();
        let mut cond_entries: Vec<(String, String)> = Vec::new();

        // Cell 0 is the die identifier; the named condition columns end
        // where the test numbers begin.
        let meta_end = self.value_columns_from.min(fields.len());
        for col in 1..meta_end {
            let value = fields[col].replace(',', "");
            let Some(name) = self.conditions.get(col) else {
                continue;
            };
            if name == EFF_DESIGN_CONDITION {
                self.apply_design_identity(&value);
            } else if name == EFF_DUT_CONDITION {
                self.dut_id = value;
            } else {
                let mut key = format!("{}{}", CONDITION_KEY_PREFIX, name);
                let mut value = value;
                if key.to_lowercase() == "cond_temp" {
                    key = CONDITION_KEY_TAMBIENT.to_string();
                    if value.is_empty() {
                        value = EMPTY_TEMPERATURE_VALUE.to_string();
                    }
                } else if key == "cond_vio" {
                    key = "cond_VIO".to_string();
                } else if value.is_empty() {
                    // Missing conditions become explicit zeroes so report
                    // columns stay defined
                    value = "0".to_string();
                }
                cond_str.push('_');
                cond_str.push_str(&value);
                cond_entries.push((key, value));
            }
        }
        cond_str.push_str(&self.user_name);

        self.diagnostics.record_condition(&cond_str, path, line_number);
        self.try_create_common_meta();

        for col in self.value_columns_from..fields.len() {
            let raw = fields[col].replace(',', "");
            if raw.is_empty() {
                continue;
            }
            let key_name =
                validate_param_name(self.params.get(col).map(String::as_str).unwrap_or(""));
            if key_name.is_empty() {
                continue;
            }
            self.emit_value_record(path, &cond_str, &cond_entries, col, &key_name, &raw, line_number);
        }
    }

    /// The design cell carries `basic-type_design-step[_sales-code]`;
    /// an absent sales code falls back to the basic type
    fn apply_design_identity(&mut self, value: &str) {
        let mut tokens = value.split('_');
        self.basic_type = tokens.next().unwrap_or_default().to_string();
        self.product_design_step = tokens.next().unwrap_or_default().to_string();
        self.product_sales_code = tokens
            .next()
            .map(str::to_string)
            .unwrap_or_else(|| self.basic_type.clone());
    }

    /// One-time construction of the shared metadata block, the first time
    /// the design identity is complete
    fn try_create_common_meta(&mut self) {
        if self.common_meta.is_some()
            || self.basic_type.is_empty()
            || self.product_sales_code.is_empty()
            || self.product_design_step.is_empty()
        {
            return;
        }
        let mut common = BTreeMap::new();
        common.insert("basic_type".to_string(), self.basic_type.clone());
        common.insert(
            "product_design_step".to_string(),
            self.product_design_step.clone(),
        );
        common.insert(
            "product_sales_code".to_string(),
            self.product_sales_code.clone(),
        );
        common.insert("user_name".to_string(), self.user_name.clone());
        common.insert("email".to_string(), self.config.email.clone());
        debug!("Common metadata created for {}", self.basic_type);
        self.common_meta = Some(common);
    }

    #[allow(clippy::too_many_arguments)]
    fn emit_value_record(
        &mut self,
        path: &Path,
        cond_str: &str,
        cond_entries: &[(String, String)],
        col: usize,
        key_name: &str,
        raw: &str,
        line_number: usize,
    ) {
        let first_seen = self.seen_params.insert(key_name.to_string());
        let key_cond_str = format!("{}{}", key_name, cond_str);

        let (exponent, _) =
            unit_scale(self.units.get(col).map(String::as_str).unwrap_or(""));
        let mut payload = BTreeMap::new();
        payload.insert(key_name.to_string(), scale_value(exponent, raw));

        let mut meta: BTreeMap<String, String> = cond_entries.iter().cloned().collect();
        meta.insert("test_name".to_string(), key_name.to_string());
        meta.insert("data_object_type".to_string(), OBJECT_TYPE_VALUE.to_string());
        meta.insert("dut_id".to_string(), self.dut_id.clone());
        meta.insert("user_name".to_string(), self.user_name.clone());

        // The condition row carries the test number for value columns;
        // with a Perl-API identifier set the number degrades to the
        // column index and a synthesized rddf_tc_id takes over.
        let number_cell = self.conditions.get(col).cloned().unwrap_or_default();
        let test_number = if self.config.api_id_perl.is_empty() {
            if number_cell.is_empty() {
                col.to_string()
            } else {
                number_cell
            }
        } else {
            meta.insert(
                "rddf_tc_id".to_string(),
                format!(
                    "{}:{}{}",
                    self.config.api_id_perl, EFF_GLOBAL_ID_PREFIX, number_cell
                ),
            );
            meta.insert("testunit_name".to_string(), EFF_DUMMY_FIELD.to_string());
            meta.insert("testunit_version".to_string(), EFF_DUMMY_FIELD.to_string());
            col.to_string()
        };
        meta.insert("test_number".to_string(), test_number.clone());

        if self.store.insert(key_cond_str, DataObject::new(payload, meta)) {
            debug!(
                "Repeated condition for {} at {}:{} (keeping last occurrence)",
                key_name,
                path.display(),
                line_number
            );
        }

        if first_seen {
            self.emit_limit_record(col, key_name, &test_number);
        }
    }

    /// Synthesize the one limit record of a newly-seen parameter from the
    /// per-column bound rows; absent bounds stay empty
    fn emit_limit_record(&mut self, col: usize, key_name: &str, test_number: &str) {
        let (exponent, unit) =
            unit_scale(self.units.get(col).map(String::as_str).unwrap_or(""));
        let mut payload = BTreeMap::new();
        // No scale entry: the intake system's auto conversion handles it
        payload.insert("unit".to_string(), unit);
        payload.insert(
            "lower_limit".to_string(),
            scale_optional_bound(exponent, self.lsl.get(col)),
        );
        payload.insert(
            "upper_limit".to_string(),
            scale_optional_bound(exponent, self.usl.get(col)),
        );

        let mut meta = self.common_meta.clone().unwrap_or_default();
        meta.insert("test_name".to_string(), key_name.to_string());
        meta.insert("data_object_type".to_string(), OBJECT_TYPE_LIMIT.to_string());
        meta.insert("requirement_id".to_string(), String::new());
        meta.insert("description".to_string(), String::new());
        meta.insert("typical".to_string(), String::new());
        meta.insert("test_number".to_string(), test_number.to_string());

        self.data_objects.push(DataObject::new(payload, meta));
    }

    fn finish(self, path: &Path) -> EffOutcome {
        let EffConversion {
            mut store,
            mut data_objects,
            common_meta,
            diagnostics,
            ..
        } = self;
        store.flush_into(&mut data_objects);
        EffOutcome {
            report_name: report_name(path),
            data_objects,
            common_meta_data: common_meta.unwrap_or_default(),
            diagnostics,
        }
    }
}

/// Report name derived from the source file stem
fn report_name(path: &Path) -> String {
    path.file_stem()
        .map(|stem| stem.to_string_lossy().to_string())
        .unwrap_or_else(|| "report".to_string())
}

fn scale_optional_bound(exponent: i32, bound: Option<&String>) -> String {
    match bound {
        Some(bound) if !bound.is_empty() => scale_value(exponent, bound),
        _ => String::new(),
    }
}
