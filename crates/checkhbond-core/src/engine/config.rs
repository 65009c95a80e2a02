use crate::engine::builder::BuildMode;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Default cutoff distance (A) for off-cell grid matching.
pub const DEFAULT_CUTOFF: f64 = 0.5;
/// Default maximum crystallographic resolution (A) for corpus structures.
pub const DEFAULT_MAX_RESOLUTION: f64 = 2.5;

#[derive(Debug, Error, PartialEq, Eq, Clone)]
pub enum ConfigError {
    #[error("Missing required parameter: {0}")]
    MissingParameter(&'static str),
}

#[derive(Debug, Error)]
pub enum ConfigLoadError {
    #[error("File I/O error for '{path}': {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },
    #[error("TOML parsing error for '{path}': {source}")]
    Toml {
        path: String,
        source: toml::de::Error,
    },
}

/// Settings for the query workflow.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CheckConfig {
    /// Path to the persisted grid table.
    pub matrix_path: PathBuf,
    /// Off-cell matching cutoff in Angstroms; 0 demands exact cell hits.
    #[serde(default = "default_cutoff")]
    pub cutoff: f64,
}

fn default_cutoff() -> f64 {
    DEFAULT_CUTOFF
}

impl CheckConfig {
    pub fn load(path: &Path) -> Result<Self, ConfigLoadError> {
        load_toml(path)
    }
}

/// Settings for the corpus-accumulation workflow.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BuildConfig {
    /// Which donor/acceptor geometry the pass accumulates.
    pub mode: BuildMode,
    /// Corpus entries above this resolution are skipped.
    #[serde(default = "default_max_resolution")]
    pub max_resolution: f64,
    /// Restrict the pass to these residue types; `None` means every type the
    /// mode covers.
    #[serde(default)]
    pub residue_types: Option<Vec<String>>,
}

fn default_max_resolution() -> f64 {
    DEFAULT_MAX_RESOLUTION
}

impl BuildConfig {
    pub fn load(path: &Path) -> Result<Self, ConfigLoadError> {
        load_toml(path)
    }
}

fn load_toml<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T, ConfigLoadError> {
    let content = std::fs::read_to_string(path).map_err(|e| ConfigLoadError::Io {
        path: path.to_string_lossy().to_string(),
        source: e,
    })?;
    toml::from_str(&content).map_err(|e| ConfigLoadError::Toml {
        path: path.to_string_lossy().to_string(),
        source: e,
    })
}

#[derive(Default)]
pub struct CheckConfigBuilder {
    matrix_path: Option<PathBuf>,
    cutoff: Option<f64>,
}

impl CheckConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn matrix_path(mut self, path: PathBuf) -> Self {
        self.matrix_path = Some(path);
        self
    }

    pub fn cutoff(mut self, cutoff: f64) -> Self {
        self.cutoff = Some(cutoff);
        self
    }

    pub fn build(self) -> Result<CheckConfig, ConfigError> {
        Ok(CheckConfig {
            matrix_path: self
                .matrix_path
                .ok_or(ConfigError::MissingParameter("matrix_path"))?,
            cutoff: self.cutoff.unwrap_or(DEFAULT_CUTOFF),
        })
    }
}

#[derive(Default)]
pub struct BuildConfigBuilder {
    mode: Option<BuildMode>,
    max_resolution: Option<f64>,
    residue_types: Option<Vec<String>>,
}

impl BuildConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn mode(mut self, mode: BuildMode) -> Self {
        self.mode = Some(mode);
        self
    }

    pub fn max_resolution(mut self, resolution: f64) -> Self {
        self.max_resolution = Some(resolution);
        self
    }

    pub fn residue_types(mut self, types: Vec<String>) -> Self {
        self.residue_types = Some(types);
        self
    }

    pub fn build(self) -> Result<BuildConfig, ConfigError> {
        Ok(BuildConfig {
            mode: self.mode.ok_or(ConfigError::MissingParameter("mode"))?,
            max_resolution: self.max_resolution.unwrap_or(DEFAULT_MAX_RESOLUTION),
            residue_types: self.residue_types,
        })
    }
}
