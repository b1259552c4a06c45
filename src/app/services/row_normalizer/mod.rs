//! Row normalization module for measurement exports
//!
//! This module turns the raw row stream of a measurement export into the
//! ordered sequence of value and limit records that make up a report.
//!
//! # Architecture
//!
//! The module is organized into logical components:
//! - [`normalizer`] - Main RowNormalizer struct and per-file orchestration
//! - [`header_state`] - Per-file header context and column descriptors
//! - [`condition`] - Condition signature construction per data row
//! - [`allocator`] - Collision-free test number allocation
//! - [`record_store`] - Last-write-wins deduplication within one file
//! - [`diagnostics`] - Anomaly accumulation for the side-reports
//!
//! # Processing Pipeline
//!
//! Every line of a source file is classified exactly once: meta line,
//! header row, skippable row, or data row. Data rows produce one value
//! record per populated output column, deduplicated by parameter name plus
//! condition string, and the first sighting of a parameter additionally
//! emits its limit record. Records surviving deduplication are flushed to
//! the output sequence when the file ends.
//!
//! # Example Usage
//!
//! ```rust,no_run
//! use bench_report_processor::app::services::limits_table::LimitsTable;
//! use bench_report_processor::app::services::row_normalizer::RowNormalizer;
//! use bench_report_processor::config::ReportConfig;
//! use std::path::PathBuf;
//!
//! # fn example(sources: Vec<PathBuf>) -> bench_report_processor::Result<()> {
//! let limits = LimitsTable::load(&PathBuf::from("testlimits.txt"))?;
//! let config = ReportConfig::default();
//! let pictures: Vec<PathBuf> = Vec::new();
//! let waveforms: Vec<PathBuf> = Vec::new();
//!
//! let mut normalizer = RowNormalizer::new(&limits, &config, &pictures, &waveforms);
//! normalizer.normalize_files(&sources, None)?;
//!
//! let output = normalizer.finish();
//! println!("Produced {} records", output.data_objects.len());
//! # Ok(())
//! # }
//! ```

pub mod allocator;
pub mod condition;
pub mod diagnostics;
pub mod header_state;
pub mod normalizer;
pub mod record_store;

#[cfg(test)]
pub mod tests;

// Re-export main types for easy access
pub use allocator::TestNumberAllocator;
pub use condition::{ConditionSignature, build_signature};
pub use diagnostics::Diagnostics;
pub use header_state::{ColumnDescriptor, HeaderState, MetaFields};
pub use normalizer::{NormalizedOutput, RowNormalizer, validate_param_name};
pub use record_store::RecordStore;
