//! Specification-limits table loading.
//!
//! The limits file is a whitespace/tab-delimited table mapping each output
//! parameter to its limit attributes (bounds, unit, test number,
//! requirement id, description, typical value). The attribute order is
//! defined by the file's own header row; trailing description words are
//! re-joined since the description may contain spaces.

use crate::constants::{
    LIMITS_HEADER_TOKEN, LIMITS_HREF_FRAGMENT, LIMITS_SKIP_TOKENS, MIN_DATA_FIELDS,
    limit_attributes,
};
use crate::{Error, Result};
use indexmap::IndexMap;
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use tracing::debug;

/// Limit attributes for one parameter, keyed by the header-row names
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LimitEntry {
    attributes: BTreeMap<String, String>,
}

impl LimitEntry {
    /// Attribute lookup with empty-string default for missing attributes
    pub fn get(&self, attribute: &str) -> &str {
        self.attributes.get(attribute).map(String::as_str).unwrap_or("")
    }

    pub fn lower_limit(&self) -> &str {
        self.get(limit_attributes::LSL)
    }

    pub fn upper_limit(&self) -> &str {
        self.get(limit_attributes::USL)
    }

    pub fn unit(&self) -> &str {
        self.get(limit_attributes::UNIT)
    }

    pub fn test_number(&self) -> &str {
        self.get(limit_attributes::TEST_NUMBER)
    }

    pub fn requirement_id(&self) -> &str {
        self.get(limit_attributes::REQUIREMENT_ID)
    }

    pub fn description(&self) -> &str {
        self.get(limit_attributes::DESCRIPTION)
    }

    pub fn typical(&self) -> &str {
        self.get(limit_attributes::TYPICAL)
    }
}

/// Parameter-name to limit-attributes mapping, built once per conversion
/// run and read-only thereafter
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LimitsTable {
    entries: IndexMap<String, LimitEntry>,
}

impl LimitsTable {
    /// Load a limits table from a whitespace/tab-delimited file.
    ///
    /// An unreadable file is fatal for the whole run; every structural
    /// anomaly inside the file is recovered by skipping the line.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path).map_err(|e| {
            Error::io(
                format!("couldn't read limits file: {}", path.display()),
                e,
            )
        })?;

        let table = Self::parse(&contents);
        debug!(
            "Loaded {} limit entries from {}",
            table.len(),
            path.display()
        );
        Ok(table)
    }

    /// Parse limits-table content line by line
    pub fn parse(contents: &str) -> Self {
        let mut header: Vec<String> = Vec::new();
        let mut entries = IndexMap::new();

        for line in contents.lines() {
            // Lines containing the key token define the attribute order.
            // The leading '#' marker (written as its own token or fused
            // with the key token) and the symbolic key column are both
            // discarded; data tokens then align with the remaining names
            // offset by one, since a data line's first token is the
            // parameter name itself.
            if line.contains(LIMITS_HEADER_TOKEN) {
                header = line
                    .split_whitespace()
                    .filter(|token| *token != "#")
                    .skip(1)
                    .map(str::to_string)
                    .collect();
                continue;
            }
            if LIMITS_SKIP_TOKENS.iter().any(|t| line.contains(t)) {
                continue;
            }
            if line.len() < 2 {
                continue;
            }

            // Double quotes would break the downstream JSON encoding
            let line = line.replace('"', "'");
            let tokens: Vec<&str> = line.split_whitespace().collect();
            if tokens.len() < MIN_DATA_FIELDS {
                continue;
            }

            let mut attributes = BTreeMap::new();
            for (i, name) in header.iter().enumerate() {
                let value = tokens.get(i + 1).copied().unwrap_or("");
                attributes.insert(name.clone(), value.to_string());
            }

            // Leftover tokens are the multi-word description, truncated at
            // the first token containing an href (inclusive).
            for token in &tokens[(header.len() + 1).min(tokens.len())..] {
                let description = attributes
                    .entry(limit_attributes::DESCRIPTION.to_string())
                    .or_default();
                description.push(' ');
                description.push_str(token);
                if token.contains(LIMITS_HREF_FRAGMENT) {
                    break;
                }
            }

            // A later line with the same parameter name overwrites the
            // earlier entry.
            entries.insert(tokens[0].to_string(), LimitEntry { attributes });
        }

        Self { entries }
    }

    /// Look up the limit entry for a parameter name
    pub fn get(&self, parameter: &str) -> Option<&LimitEntry> {
        self.entries.get(parameter)
    }

    pub fn contains(&self, parameter: &str) -> bool {
        self.entries.contains_key(parameter)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate entries in file order
    pub fn iter(&self) -> impl Iterator<Item = (&String, &LimitEntry)> {
        self.entries.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    const BASIC_TABLE: &str = "\
key LSL USL Unit TestNr Description
ibat_rom 1 3 mA 101 leakage current
";

    #[test]
    fn test_basic_entry() {
        let table = LimitsTable::parse(BASIC_TABLE);
        let entry = table.get("ibat_rom").expect("entry present");
        assert_eq!(entry.lower_limit(), "1");
        assert_eq!(entry.upper_limit(), "3");
        assert_eq!(entry.unit(), "mA");
        assert_eq!(entry.test_number(), "101");
        assert_eq!(entry.description(), "leakage current");
    }

    #[test]
    fn test_hash_prefixed_header_keeps_attribute_alignment() {
        // Real limits files mark the header with a leading '#' token
        let table = LimitsTable::parse(
            "# key LSL USL Unit TestNr Description\n\
             ibat_rom 1 3 mA 101 leakage current\n",
        );
        let entry = table.get("ibat_rom").expect("entry present");
        assert_eq!(entry.lower_limit(), "1");
        assert_eq!(entry.upper_limit(), "3");
        assert_eq!(entry.unit(), "mA");
        assert_eq!(entry.test_number(), "101");
        assert_eq!(entry.description(), "leakage current");

        // The fused form appears too
        let fused = LimitsTable::parse(
            "#key LSL USL Unit TestNr\n\
             vout 4.5 5.5 V 11\n",
        );
        assert_eq!(fused.get("vout").unwrap().lower_limit(), "4.5");
        assert_eq!(fused.get("vout").unwrap().test_number(), "11");
    }

    #[test]
    fn test_load_is_deterministic() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "{}", BASIC_TABLE).unwrap();
        writeln!(file, "vout_reg 4.5 5.5 V 102 regulator output").unwrap();

        let first = LimitsTable::load(file.path()).unwrap();
        let second = LimitsTable::load(file.path()).unwrap();
        assert_eq!(first, second);
        assert_eq!(first.len(), 2);
    }

    #[test]
    fn test_missing_trailing_attributes_default_empty() {
        let table = LimitsTable::parse(
            "key LSL USL Unit TestNr Description\n\
             vdd_min 1.7 1.9 V\n",
        );
        let entry = table.get("vdd_min").unwrap();
        assert_eq!(entry.test_number(), "");
        assert_eq!(entry.description(), "");
    }

    #[test]
    fn test_description_join_and_href_truncation() {
        let table = LimitsTable::parse(
            "key LSL USL Unit TestNr\n\
             ibat 1 3 mA 7 battery current at standstill href=doc ignored tail\n",
        );
        let entry = table.get("ibat").unwrap();
        assert_eq!(
            entry.description(),
            " battery current at standstill href=doc"
        );
    }

    #[test]
    fn test_skip_and_noise_lines() {
        let table = LimitsTable::parse(
            "key LSL USL Unit TestNr\n\
             # a comment line with words\n\
             ibat_standby 0 1 uA 9\n\
             x\n\
             one two\n\
             vout 4.5 5.5 V 11\n",
        );
        // '#' lines, standby lines, short lines, and <3-token lines vanish
        assert!(table.get("ibat_standby").is_none());
        assert!(table.get("one").is_none());
        assert_eq!(table.len(), 1);
        assert!(table.contains("vout"));
    }

    #[test]
    fn test_duplicate_key_last_write_wins() {
        let table = LimitsTable::parse(
            "key LSL USL Unit TestNr\n\
             vout 4.5 5.5 V 11\n\
             vout 4.0 6.0 V 12\n",
        );
        assert_eq!(table.len(), 1);
        assert_eq!(table.get("vout").unwrap().test_number(), "12");
    }

    #[test]
    fn test_quote_rewrite() {
        let table = LimitsTable::parse(
            "key LSL USL Unit TestNr Description\n\
             vout 4.5 5.5 V 11 \"quoted\"\n",
        );
        assert_eq!(table.get("vout").unwrap().description(), "'quoted'");
    }

    #[test]
    fn test_unreadable_file_is_fatal() {
        assert!(LimitsTable::load(Path::new("/nonexistent/testlimits.txt")).is_err());
    }
}
