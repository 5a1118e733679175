// Configuration loading

pub mod settings;

pub use settings::{ConfigError, ExportSettings, LabelSettings, Settings};
