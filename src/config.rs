//! Conversion-run configuration.
//!
//! Provides an explicit, typed configuration structure for a conversion run,
//! loaded from the optional `Config_Tembo.txt` key/value file found next to
//! the test-flow data. Every recognized option has a named field; unknown
//! keys are logged and ignored instead of silently accumulating in a
//! string-keyed table.

use crate::constants::CONFIG_FILENAME;
use crate::{Error, Result};
use std::fs;
use std::path::Path;
use tracing::{debug, warn};

/// Recognized configuration keys, including historical aliases
pub const RECOGNIZED_KEYS: &[&str] = &[
    "user",
    "Username",
    "Email",
    "Project",
    "ReportName",
    "ReportTemplate",
    "basic_type",
    "product_sales_code",
    "product_design_step",
    "package",
    "dut_id",
    "api_id",
    "api_id_perl",
    "global_id",
    "testunit_version",
];

/// Typed configuration for one conversion run.
///
/// All fields default to the empty string; an empty field means "derive the
/// value from the data files themselves". The presence of `basic_type` in
/// the configuration file marks a manual-measurement dataset, whose meta
/// fields come entirely from configuration instead of `#meta` lines.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReportConfig {
    /// Operator name, overrides the user name found in `#meta` lines
    pub user_name: String,
    /// Operator e-mail, carried into the common metadata block
    pub email: String,
    /// Project identifier used in the recipe block
    pub project: String,
    /// Report name; the output document is written as `<report_name>.json`
    pub report_name: String,
    /// Report template identifier used in the recipe block
    pub report_template: String,
    /// Product basic type override
    pub basic_type: String,
    /// Product sales code override
    pub product_sales_code: String,
    /// Product design step override
    pub product_design_step: String,
    /// Package override
    pub package: String,
    /// Sample/DUT identifier override
    pub dut_id: String,
    /// API identifier, combined with `global_id` into the rddf_tc_id field
    pub api_id: String,
    /// Perl-API identifier; when present, EFF test numbers are replaced
    /// with column indices and rddf_tc_id entries are synthesized
    pub api_id_perl: String,
    /// Global identifier, combined with `api_id` into the rddf_tc_id field
    pub global_id: String,
    /// Test program revision override
    pub testunit_version: String,
}

impl ReportConfig {
    /// Load configuration from a key/value file.
    ///
    /// Each non-comment line holds one `key = value` pair; `:` and `,` are
    /// accepted as historical separators. Unrecognized keys are logged at
    /// debug level and dropped.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path).map_err(|e| {
            Error::io(
                format!("couldn't read config file: {}", path.display()),
                e,
            )
        })?;

        let mut config = Self::default();
        for line in contents.lines() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let Some((key, value)) = split_pair(line) else {
                warn!("Ignoring malformed config line: {}", line);
                continue;
            };
            config.apply(key, value);
        }

        debug!("Loaded configuration from {}", path.display());
        Ok(config)
    }

    /// Apply one key/value pair, resolving historical key aliases
    fn apply(&mut self, key: &str, value: &str) {
        let value = value.trim().to_string();
        match key {
            "user" | "Username" => self.user_name = value,
            "Email" => self.email = value,
            "Project" => self.project = value,
            "ReportName" => self.report_name = value,
            "ReportTemplate" => self.report_template = value,
            "basic_type" => self.basic_type = value,
            "product_sales_code" => self.product_sales_code = value,
            "product_design_step" => self.product_design_step = value,
            "package" => self.package = value,
            "dut_id" => self.dut_id = value,
            "api_id" => self.api_id = value,
            "api_id_perl" => self.api_id_perl = value,
            "global_id" => self.global_id = value,
            "testunit_version" => self.testunit_version = value,
            other => debug!("Ignoring unrecognized config key: {}", other),
        }
    }

    /// Whether this dataset is a manual measurement export.
    ///
    /// Manual measurement data carries its product identity in the
    /// configuration file instead of `#meta` lines.
    pub fn is_manual_measurement(&self) -> bool {
        !self.basic_type.is_empty()
    }

    /// Report name, falling back to a name derived from the input directory
    pub fn report_name_or_default(&self, input_dir: &Path) -> String {
        if !self.report_name.is_empty() {
            return self.report_name.clone();
        }
        input_dir
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| "report".to_string())
    }

    /// Expected configuration file name
    pub fn file_name() -> &'static str {
        CONFIG_FILENAME
    }
}

/// Split a config line into key and value on the first recognized separator
fn split_pair(line: &str) -> Option<(&str, &str)> {
    for sep in ['=', ':', ','] {
        if let Some((key, value)) = line.split_once(sep) {
            return Some((key.trim(), value));
        }
    }
    None
}
