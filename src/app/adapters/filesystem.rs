//! Filesystem adapter for input discovery.
//!
//! One recursive walk of the test-flow directory yields everything a
//! conversion run needs: the source data files, the artifact candidates
//! for linking, and the optional limits and configuration files. Paths
//! are sorted so a run processes files in a stable order regardless of
//! directory enumeration order.

use crate::constants::{
    CONFIG_FILENAME, EFF_EXTENSION, LIMITS_FILENAME, PICTURE_EXTENSION,
    SOURCE_DATA_EXTENSION, WAVEFORM_EXTENSION,
};
use crate::{Error, Result};
use std::path::{Path, PathBuf};
use tracing::{debug, info};
use walkdir::WalkDir;

/// Everything discovered under one test-flow directory
#[derive(Debug, Clone, Default)]
pub struct DiscoveredInputs {
    /// Source measurement exports, sorted by path
    pub sources: Vec<PathBuf>,
    /// EFF exports, each converted into its own report document
    pub effs: Vec<PathBuf>,
    /// Visual capture candidates for artifact linking
    pub pictures: Vec<PathBuf>,
    /// Waveform capture candidates for artifact linking
    pub waveforms: Vec<PathBuf>,
    /// Specification-limits file, when present
    pub limits_file: Option<PathBuf>,
    /// Conversion configuration file, when present
    pub config_file: Option<PathBuf>,
}

impl DiscoveredInputs {
    pub fn has_sources(&self) -> bool {
        !self.sources.is_empty()
    }

    pub fn has_effs(&self) -> bool {
        !self.effs.is_empty()
    }
}

/// Walk the test-flow directory once and classify every file
pub fn discover_inputs(root: &Path) -> Result<DiscoveredInputs> {
    let mut inputs = DiscoveredInputs::default();

    for entry in WalkDir::new(root) {
        let entry = entry.map_err(|e| {
            Error::directory_traversal(
                format!("failed to scan input directory: {}", root.display()),
                e,
            )
        })?;
        if !entry.file_type().is_file() {
            continue;
        }
        let path = entry.into_path();

        if file_name_is(&path, LIMITS_FILENAME) {
            inputs.limits_file.get_or_insert(path);
        } else if file_name_is(&path, CONFIG_FILENAME) {
            inputs.config_file.get_or_insert(path);
        } else if has_extension(&path, SOURCE_DATA_EXTENSION) {
            inputs.sources.push(path);
        } else if has_extension(&path, EFF_EXTENSION) {
            inputs.effs.push(path);
        } else if has_extension(&path, PICTURE_EXTENSION) {
            inputs.pictures.push(path);
        } else if has_extension(&path, WAVEFORM_EXTENSION) {
            inputs.waveforms.push(path);
        }
    }

    inputs.sources.sort();
    inputs.effs.sort();
    inputs.pictures.sort();
    inputs.waveforms.sort();

    info!(
        "Discovered {} source files, {} EFF exports, {} pictures, {} waveforms under {}",
        inputs.sources.len(),
        inputs.effs.len(),
        inputs.pictures.len(),
        inputs.waveforms.len(),
        root.display()
    );
    debug!(
        "Limits file: {:?}, config file: {:?}",
        inputs.limits_file, inputs.config_file
    );

    Ok(inputs)
}

fn has_extension(path: &Path, extension: &str) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| e.eq_ignore_ascii_case(extension))
        .unwrap_or(false)
}

fn file_name_is(path: &Path, name: &str) -> bool {
    path.file_name()
        .map(|n| n.to_string_lossy() == name)
        .unwrap_or(false)
}
