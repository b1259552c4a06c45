//! Bench Report Processor Library
//!
//! A Rust library for normalizing raw bench test-measurement exports
//! (tabular text files with embedded metadata headers) into a canonical
//! sequence of structured test-result records.
//!
//! This library provides tools for:
//! - Parsing measurement CSV exports with interleaved header/meta lines
//! - Converting EFF exports into standalone report documents
//! - Loading specification-limits tables and resolving per-parameter limits
//! - Scaling raw values by SI unit prefixes
//! - Deduplicating repeated condition combinations
//! - Linking correlated artifact files (screenshots, waveform captures)
//! - Assembling the final JSON report document plus diagnostic side-reports

pub mod config;
pub mod constants;

// Core application modules
pub mod app {
    pub mod models;
    pub mod services {
        pub mod artifact_matcher;
        pub mod eff_normalizer;
        pub mod limits_table;
        pub mod report_writer;
        pub mod row_normalizer;
        pub mod unit_scaler;
    }
    pub mod adapters {
        pub mod filesystem;
    }
}

// CLI modules
pub mod cli {
    pub mod args;
    pub mod commands;
}

// Re-export commonly used types
pub use app::models::{DataObject, ReportDocument};
pub use config::ReportConfig;

/// Result type alias for the bench report processor
pub type Result<T> = std::result::Result<T, Error>;

/// Comprehensive error types for report processing operations
#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// I/O operation failed
    #[error("I/O error: {message}")]
    Io {
        message: String,
        #[source]
        source: std::io::Error,
    },

    /// Configuration error
    #[error("Configuration error: {message}")]
    Configuration { message: String },

    /// Data validation error
    #[error("Data validation error: {message}")]
    DataValidation { message: String },

    /// Directory traversal error
    #[error("Directory traversal error: {message}")]
    DirectoryTraversal {
        message: String,
        #[source]
        source: walkdir::Error,
    },

    /// JSON serialization error
    #[error("JSON serialization error: {message}")]
    JsonSerialization {
        message: String,
        #[source]
        source: serde_json::Error,
    },
}

impl Error {
    /// Create an I/O error with context
    pub fn io(message: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            message: message.into(),
            source,
        }
    }

    /// Create a configuration error
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    /// Create a data validation error
    pub fn data_validation(message: impl Into<String>) -> Self {
        Self::DataValidation {
            message: message.into(),
        }
    }

    /// Create a directory traversal error
    pub fn directory_traversal(message: impl Into<String>, source: walkdir::Error) -> Self {
        Self::DirectoryTraversal {
            message: message.into(),
            source,
        }
    }

    /// Create a JSON serialization error
    pub fn json_serialization(message: impl Into<String>, source: serde_json::Error) -> Self {
        Self::JsonSerialization {
            message: message.into(),
            source,
        }
    }
}

// Automatic conversions from common error types
impl From<std::io::Error> for Error {
    fn from(error: std::io::Error) -> Self {
        Self::Io {
            message: "I/O operation failed".to_string(),
            source: error,
        }
    }
}

impl From<walkdir::Error> for Error {
    fn from(error: walkdir::Error) -> Self {
        Self::DirectoryTraversal {
            message: "Directory traversal failed".to_string(),
            source: error,
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(error: serde_json::Error) -> Self {
        Self::JsonSerialization {
            message: "JSON serialization failed".to_string(),
            source: error,
        }
    }
}
