//! Report document model.
//!
//! The output of a conversion run is one structured document per logical
//! report: a version header, a shared metadata block, the ordered sequence
//! of data objects (value records and limit records share one shape), and
//! a trailing recipe block naming the report template and project.

use crate::constants::{OBJECT_TYPE_LIMIT, OBJECT_TYPE_VALUE, REPORT_FORMAT_VERSION};
use serde::Serialize;
use std::collections::BTreeMap;

/// One record in the output sequence.
///
/// Value records carry a scaled measurement plus artifact links in their
/// payload; limit records carry bounds, unit, and scale. Both share the
/// `{payload, metaData}` shape and are immutable once created.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DataObject {
    pub payload: BTreeMap<String, String>,
    #[serde(rename = "metaData")]
    pub meta_data: BTreeMap<String, String>,
}

impl DataObject {
    pub fn new(payload: BTreeMap<String, String>, meta_data: BTreeMap<String, String>) -> Self {
        Self { payload, meta_data }
    }

    /// Whether this record is a measured-value record
    pub fn is_value(&self) -> bool {
        self.meta_data.get("data_object_type").map(String::as_str) == Some(OBJECT_TYPE_VALUE)
    }

    /// Whether this record is a specification-limit record
    pub fn is_limit(&self) -> bool {
        self.meta_data.get("data_object_type").map(String::as_str) == Some(OBJECT_TYPE_LIMIT)
    }
}

/// Document header block
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReportHeader {
    pub version: String,
}

impl Default for ReportHeader {
    fn default() -> Self {
        Self {
            version: REPORT_FORMAT_VERSION.to_string(),
        }
    }
}

/// Trailing recipe block naming template, report, and project
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Recipe {
    #[serde(rename = "reportTemplate")]
    pub report_template: String,
    #[serde(rename = "reportName")]
    pub report_name: String,
    pub project: String,
}

/// Complete report document handed to the JSON serializer
#[derive(Debug, Clone, Serialize)]
pub struct ReportDocument {
    pub header: ReportHeader,
    #[serde(rename = "commonMetaData")]
    pub common_meta_data: BTreeMap<String, String>,
    #[serde(rename = "dataObjects")]
    pub data_objects: Vec<DataObject>,
    pub recipe: Recipe,
}

impl ReportDocument {
    pub fn new(
        common_meta_data: BTreeMap<String, String>,
        data_objects: Vec<DataObject>,
        recipe: Recipe,
    ) -> Self {
        Self {
            header: ReportHeader::default(),
            common_meta_data,
            data_objects,
            recipe,
        }
    }
}
