//! Condition signature construction.
//!
//! Each data row gets a fresh condition signature built as a pure function
//! of the current header state and the row's fields: the concatenated
//! dedup string, the ordered token list used for artifact matching, and
//! the `cond_*` metadata entries. Nothing here mutates shared state, so
//! the signature cannot depend on the order previous rows were processed.

use super::header_state::HeaderState;
use crate::constants::{
    COLUMN_TYPE_PARAM, CONDITION_KEY_PREFIX, CONDITION_KEY_TAMBIENT, EMPTY_TEMPERATURE_VALUE,
};

/// Ordered representation of one row's active test conditions
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConditionSignature {
    /// Concatenated condition values plus meta suffix, used as the
    /// deduplication key component
    pub cond_str: String,
    /// Ordered tokens for artifact-file matching, seeded with the
    /// parent-folder token and, once the sample is known, the sample
    /// identifier
    pub match_tokens: Vec<String>,
    /// `cond_*` metadata entries in column order
    pub meta_entries: Vec<(String, String)>,
}

/// Build the condition signature for one data row.
///
/// Only columns marked "param" with a non-empty variable name contribute.
/// Two aliasing rules apply: a temperature-named variable becomes
/// `cond_tambient` and defaults empty values to `0`; a VIO-named variable
/// is re-cased to `cond_VIO`.
pub fn build_signature(
    header: &HeaderState,
    fields: &[String],
    parent_folder: &str,
) -> ConditionSignature {
    let mut signature = ConditionSignature {
        match_tokens: vec![parent_folder.to_string()],
        ..Default::default()
    };
    // A bare "sample=" token would substring-match every artifact name
    // carrying a sample fragment, so it only appears once the id is known.
    if !header.meta.dut_id.is_empty() {
        signature
            .match_tokens
            .push(format!("sample={}", header.meta.dut_id));
    }

    for (column, descriptor) in header.descriptors().iter().enumerate() {
        if descriptor.variable.is_empty() || descriptor.column_type != COLUMN_TYPE_PARAM {
            continue;
        }
        let Some(raw_value) = fields.get(column) else {
            continue;
        };

        let mut key = format!("{}{}", CONDITION_KEY_PREFIX, descriptor.variable);
        let mut value = raw_value.clone();
        if key.to_lowercase() == "cond_temp" {
            key = CONDITION_KEY_TAMBIENT.to_string();
            if value.is_empty() {
                value = EMPTY_TEMPERATURE_VALUE.to_string();
            }
        } else if key == "cond_vio" {
            key = "cond_VIO".to_string();
        }

        signature.cond_str.push('_');
        signature.cond_str.push_str(&value);
        signature
            .match_tokens
            .push(format!("{}={}[", descriptor.variable, value));
        signature.meta_entries.push((key, value));
    }

    // The meta suffix distinguishes otherwise-identical condition value
    // combinations measured on different samples or products.
    let meta = &header.meta;
    signature.cond_str.push_str(&format!(
        "{}_{}_{}_{}_{}_{}",
        meta.user_name,
        meta.basic_type,
        meta.product_sales_code,
        meta.product_design_step,
        meta.package,
        meta.dut_id
    ));

    signature
}
