use std::fs::{self, File};
use std::io::Read;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::debug;

use crate::eval::{BUILTIN_CONSTANTS, ConstantTable};
use crate::types::{BUILTIN_PREFIXES, BUILTIN_UNITS, TableError, UnitTable};

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Config error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Table error: {0}")]
    Table(#[from] TableError),
}

/// How results are printed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputMode {
    #[default]
    Text,
    Json,
}

/// Settings read from `physicalc.toml`. Every field is optional.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct Config {
    pub prompt: String,

    /// `tracing` filter used when `RUST_LOG` is unset
    pub log_level: String,
    pub output: OutputMode,

    /// CSV tables replacing the built-in ones
    pub units_path: Option<PathBuf>,
    pub prefixes_path: Option<PathBuf>,
    pub constants_path: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            prompt: ">>>: ".to_string(),
            log_level: "warn".to_string(),
            output: OutputMode::Text,
            units_path: None,
            prefixes_path: None,
            constants_path: None,
        }
    }
}

impl Config {
    pub const DEFAULT_FILE: &'static str = "physicalc.toml";

    pub fn from_toml(text: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(text)?)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path.as_ref())?;
        Self::from_toml(&text)
    }

    /// Load `explicit` if given (it must exist), otherwise
    /// [`Config::DEFAULT_FILE`] if present, otherwise the defaults.
    pub fn load(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        match explicit {
            Some(path) => Self::from_file(path),
            None if Path::new(Self::DEFAULT_FILE).exists() => Self::from_file(Self::DEFAULT_FILE),
            None => Ok(Self::default()),
        }
    }

    pub fn unit_table(&self) -> Result<UnitTable, ConfigError> {
        let units = open_or_builtin(self.units_path.as_deref(), BUILTIN_UNITS)?;
        let prefixes = open_or_builtin(self.prefixes_path.as_deref(), BUILTIN_PREFIXES)?;
        Ok(UnitTable::from_readers(units, prefixes)?)
    }

    pub fn constant_table(&self, units: &UnitTable) -> Result<ConstantTable, ConfigError> {
        let constants = open_or_builtin(self.constants_path.as_deref(), BUILTIN_CONSTANTS)?;
        Ok(ConstantTable::from_reader(constants, units)?)
    }
}

fn open_or_builtin(path: Option<&Path>, builtin: &'static str) -> Result<Box<dyn Read>, ConfigError> {
    match path {
        Some(path) => {
            debug!(path = %path.display(), "reading table");
            Ok(Box::new(File::open(path)?))
        }
        None => Ok(Box::new(builtin.as_bytes())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config = Config::from_toml("").unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.prompt, ">>>: ");
        assert_eq!(config.output, OutputMode::Text);
    }

    #[test]
    fn test_missing_default_file_uses_defaults() {
        assert!(!Path::new(Config::DEFAULT_FILE).exists());
        assert_eq!(Config::load(None).unwrap(), Config::default());
    }

    #[test]
    fn test_partial_file() {
        let config = Config::from_toml("output = \"json\"\nlog_level = \"debug\"").unwrap();
        assert_eq!(config.output, OutputMode::Json);
        assert_eq!(config.log_level, "debug");
        assert_eq!(config.prompt, ">>>: ");
    }

    #[test]
    fn test_invalid_toml() {
        assert!(matches!(Config::from_toml("output = \"xml\""), Err(ConfigError::Toml(_))));
        assert!(matches!(
            Config::load(Some(Path::new("/nonexistent/physicalc.toml"))),
            Err(ConfigError::Io(_))
        ));
    }

    #[test]
    fn test_table_overrides() {
        let dir = tempfile::tempdir().unwrap();
        let constants_path = dir.path().join("constants.csv");
        let mut file = File::create(&constants_path).unwrap();
        writeln!(file, "abbrev,name,description,value,uncertainty,unit").unwrap();
        writeln!(file, "g_moon,Lunar gravity,Surface gravity of the Moon,1.62,0,m/s2").unwrap();

        let config_path = dir.path().join("physicalc.toml");
        fs::write(
            &config_path,
            format!("constants_path = {:?}\n", constants_path.display().to_string()),
        )
        .unwrap();

        let config = Config::load(Some(&config_path)).unwrap();
        let units = config.unit_table().unwrap();
        let constants = config.constant_table(&units).unwrap();
        assert_eq!(constants.len(), 1);
        assert!(constants.contains("g_moon"));
        assert!(!constants.contains("c"));
        assert!(units.get("Pa").is_some());
    }
}
