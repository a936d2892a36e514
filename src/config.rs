//! Application configuration management.
//!
//! Settings are layered with `figment`, later sources overriding earlier ones:
//!
//! 1. built-in defaults ([`Config::default`])
//! 2. the TOML file at [`Config::config_path`] (or an explicit `--config` path)
//! 3. environment variables prefixed `ROWDUPE_` (e.g. `ROWDUPE_MAX_DUPLICATES=3`)
//! 4. command-line flags ([`Config::apply_cli`])

use anyhow::{Context, Result};
use directories::ProjectDirs;
use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::cli::AnalyzeArgs;
use crate::duplicates::{
    AnalyzerConfig, NullEquality, DEFAULT_MAX_DUPLICATES, DEFAULT_PARALLEL_THRESHOLD,
};
use crate::table::{ReaderOptions, DEFAULT_NULL_VALUES};

/// Environment variable prefix for configuration overrides.
pub const ENV_PREFIX: &str = "ROWDUPE_";

/// Default export file name.
pub const DEFAULT_OUTPUT: &str = "duplicates_and_singles.csv";

/// Invalid configuration values.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    /// The exemplar cap is zero.
    #[error("max_duplicates must be at least 1")]
    ZeroMaxDuplicates,

    /// The delimiter is not a single-byte character.
    #[error("delimiter must be a single ASCII character, got {0:?}")]
    InvalidDelimiter(char),

    /// The debug sample size is zero.
    #[error("debug_sample_rows must be at least 1")]
    ZeroSampleRows,
}

/// Application configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Maximum rows exported per duplicate pattern.
    pub max_duplicates: usize,
    /// Key columns; empty compares all columns.
    pub columns: Vec<String>,
    /// Export destination.
    pub output: PathBuf,
    /// Field delimiter for input and output.
    pub delimiter: char,
    /// Cell contents read as missing values.
    pub null_values: Vec<String>,
    /// Whether two missing values are considered equal.
    pub nulls_equal: bool,
    /// Rows shown in the debug sample.
    pub debug_sample_rows: usize,
    /// Tables with at least this many rows extract patterns in parallel.
    pub parallel_threshold: usize,
    /// Show progress bars.
    pub progress: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            max_duplicates: DEFAULT_MAX_DUPLICATES,
            columns: Vec::new(),
            output: PathBuf::from(DEFAULT_OUTPUT),
            delimiter: ',',
            null_values: DEFAULT_NULL_VALUES.iter().map(|s| s.to_string()).collect(),
            nulls_equal: true,
            debug_sample_rows: 5,
            parallel_threshold: DEFAULT_PARALLEL_THRESHOLD,
            progress: true,
        }
    }
}

impl Config {
    /// Load the configuration from the default platform-specific path,
    /// reporting any error.
    ///
    /// Without a config directory only defaults and environment overrides apply.
    ///
    /// # Errors
    ///
    /// Same as [`Config::try_load_from_path`].
    pub fn try_load() -> Result<Self> {
        match Self::config_path() {
            Ok(path) => Self::try_load_from_path(&path),
            Err(e) => {
                log::debug!("No config directory available: {}", e);
                let config: Config = Self::figment(None)
                    .extract()
                    .context("Invalid configuration in environment")?;
                config.validate()?;
                Ok(config)
            }
        }
    }

    /// Load the configuration from `path`, falling back to defaults on error.
    pub fn load_from_path(path: PathBuf) -> Self {
        match Self::try_load_from_path(&path) {
            Ok(config) => config,
            Err(e) => {
                log::warn!(
                    "Failed to load config from {}, using defaults: {}",
                    path.display(),
                    e
                );
                Self::default()
            }
        }
    }

    /// Load the configuration from `path`, reporting any error.
    ///
    /// A missing file is not an error; defaults and environment overrides apply.
    ///
    /// # Errors
    ///
    /// Returns an error if the file is not valid TOML, a value has the wrong
    /// type, or the merged configuration fails [`Config::validate`].
    pub fn try_load_from_path(path: &Path) -> Result<Self> {
        let config: Config = Self::figment(Some(path))
            .extract()
            .with_context(|| format!("Invalid configuration in {}", path.display()))?;
        config.validate()?;
        log::debug!("Loaded configuration: {:?}", config);
        Ok(config)
    }

    fn figment(path: Option<&Path>) -> Figment {
        let mut figment = Figment::from(Serialized::defaults(Config::default()));
        if let Some(path) = path {
            figment = figment.merge(Toml::file(path));
        }
        figment.merge(Env::prefixed(ENV_PREFIX).split("__"))
    }

    /// Check value ranges that the type system does not cover.
    ///
    /// # Errors
    ///
    /// Returns the first [`ConfigError`] found.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_duplicates == 0 {
            return Err(ConfigError::ZeroMaxDuplicates);
        }
        if !self.delimiter.is_ascii() {
            return Err(ConfigError::InvalidDelimiter(self.delimiter));
        }
        if self.debug_sample_rows == 0 {
            return Err(ConfigError::ZeroSampleRows);
        }
        Ok(())
    }

    /// Override settings with command-line flags.
    pub fn apply_cli(&mut self, args: &AnalyzeArgs) {
        if !args.columns.is_empty() {
            self.columns = args.columns.clone();
        }
        if let Some(max) = args.max_duplicates {
            self.max_duplicates = usize::try_from(max).unwrap_or(usize::MAX);
        }
        if let Some(ref output) = args.output {
            self.output = output.clone();
        }
        if let Some(delimiter) = args.delimiter {
            self.delimiter = delimiter;
        }
        if args.null_distinct {
            self.nulls_equal = false;
        }
        if args.no_progress {
            self.progress = false;
        }
    }

    /// The delimiter as a byte for the CSV reader and writer.
    #[must_use]
    pub fn delimiter_byte(&self) -> u8 {
        u8::try_from(self.delimiter).unwrap_or(b',')
    }

    /// Null equality mode for the analyzer.
    #[must_use]
    pub fn null_equality(&self) -> NullEquality {
        if self.nulls_equal {
            NullEquality::Equal
        } else {
            NullEquality::Distinct
        }
    }

    /// Build analyzer settings from this configuration.
    #[must_use]
    pub fn analyzer_config(&self) -> AnalyzerConfig {
        let mut config = AnalyzerConfig::default()
            .with_max_duplicates(self.max_duplicates)
            .with_null_equality(self.null_equality())
            .with_parallel_threshold(self.parallel_threshold);
        if !self.columns.is_empty() {
            config = config.with_columns(self.columns.iter().cloned());
        }
        config
    }

    /// Build CSV reader options from this configuration.
    #[must_use]
    pub fn reader_options(&self) -> ReaderOptions {
        ReaderOptions::default()
            .with_delimiter(self.delimiter_byte())
            .with_null_values(self.null_values.clone())
    }

    /// Render the configuration as TOML.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_toml_string(&self) -> Result<String> {
        toml::to_string_pretty(self).context("Failed to serialize configuration")
    }

    /// Save the configuration to the default platform-specific path.
    ///
    /// # Errors
    ///
    /// Returns an error if the path cannot be determined or written.
    pub fn save(&self) -> Result<PathBuf> {
        let path = Self::config_path()?;
        self.save_to(&path)?;
        Ok(path)
    }

    /// Save the configuration to `path`, creating parent directories.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written.
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)
                    .with_context(|| format!("Failed to create {}", parent.display()))?;
            }
        }
        fs::write(path, self.to_toml_string()?)
            .with_context(|| format!("Failed to write {}", path.display()))?;
        Ok(())
    }

    /// Get the default platform-specific configuration path.
    ///
    /// # Errors
    ///
    /// Returns an error if no home directory can be determined.
    pub fn config_path() -> Result<PathBuf> {
        let project_dirs = ProjectDirs::from("com", "rowdupe", "rowdupe")
            .ok_or_else(|| anyhow::anyhow!("Failed to determine project directories"))?;
        Ok(project_dirs.config_dir().join("config.toml"))
    }
}
