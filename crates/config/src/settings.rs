// Application settings
// Loaded from <config dir>/supsum/settings.toml

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use supsum_pipeline::HeaderLabels;

#[derive(Debug)]
pub enum ConfigError {
    Read { path: String, message: String },
    Parse { path: String, message: String },
    Write { path: String, message: String },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Read { path, message } => write!(f, "cannot read config {path}: {message}"),
            Self::Parse { path, message } => write!(f, "config parse error in {path}: {message}"),
            Self::Write { path, message } => write!(f, "cannot write config {path}: {message}"),
        }
    }
}

impl std::error::Error for ConfigError {}

/// Header labels searched for in uploads.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LabelSettings {
    pub supplier_name: String,
    pub tax_id: String,
    pub total_amount: String,
}

impl Default for LabelSettings {
    fn default() -> Self {
        let labels = HeaderLabels::default();
        Self {
            supplier_name: labels.supplier_name,
            tax_id: labels.tax_id,
            total_amount: labels.total_amount,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportSettings {
    /// Default output file name for `supsum export`.
    pub file_name: String,
}

impl Default for ExportSettings {
    fn default() -> Self {
        Self { file_name: "Supplier_Summary.xlsx".into() }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub labels: LabelSettings,
    /// Treat a missing TIN column as ambiguous instead of leaving it unmapped.
    pub require_tax_id: bool,
    pub export: ExportSettings,
}

const DEFAULT_CONFIG: &str = r#"# supsum settings

# Treat a missing TIN column as ambiguous (asks for --tin-col)
require_tax_id = false

# Header labels, compared trimmed and case-insensitively
[labels]
supplier_name = "NAME OF SUPPLIERS"
tax_id = "TIN"
total_amount = "TOTAL AMOUNT PAID"

[export]
file_name = "Supplier_Summary.xlsx"
"#;

impl Settings {
    /// Get the settings file path
    pub fn config_path() -> PathBuf {
        let config_dir = dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("supsum");
        config_dir.join("settings.toml")
    }

    /// Load from `path`, or from the default location.
    ///
    /// An explicit path must exist; a missing default file means defaults.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        match path {
            Some(p) => Self::load_from(p),
            None => {
                let p = Self::config_path();
                if p.exists() {
                    Self::load_from(&p)
                } else {
                    log::debug!("no settings at {}, using defaults", p.display());
                    Ok(Self::default())
                }
            }
        }
    }

    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path).map_err(|e| ConfigError::Read {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        let settings = Self::from_toml(&contents).map_err(|message| ConfigError::Parse {
            path: path.display().to_string(),
            message,
        })?;
        log::debug!("loaded settings from {}", path.display());
        Ok(settings)
    }

    pub fn from_toml(input: &str) -> Result<Self, String> {
        toml::from_str(input).map_err(|e| e.to_string())
    }

    /// Write the commented default settings file, creating parent directories.
    pub fn write_default_file(path: &Path) -> Result<(), ConfigError> {
        let write_err = |e: std::io::Error| ConfigError::Write {
            path: path.display().to_string(),
            message: e.to_string(),
        };
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(write_err)?;
        }
        fs::write(path, DEFAULT_CONFIG).map_err(write_err)
    }

    /// Labels in the form the pipeline consumes.
    pub fn header_labels(&self) -> HeaderLabels {
        HeaderLabels {
            supplier_name: self.labels.supplier_name.clone(),
            tax_id: self.labels.tax_id.clone(),
            total_amount: self.labels.total_amount.clone(),
            require_tax_id: self.require_tax_id,
        }
    }
}
