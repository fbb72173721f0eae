//! Config file discovery, parsing, and schema validation.
//!
//! Lookup order: an explicit path (must exist), then `laser-combine.toml` in
//! the working directory, then the path named by `LASER_COMBINE_CONFIG`.
//! Finding nothing is not an error.

use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::effective::ConfigError;
use super::merge::{ConfigLayer, LayerSection};
use super::schema::{self, GLOBAL_SECTION};

/// File name looked up in the working directory
pub const CONFIG_FILE_NAME: &str = "laser-combine.toml";

/// Environment variable naming a fallback config file
pub const CONFIG_ENV_VAR: &str = "LASER_COMBINE_CONFIG";

/// How a config file was found
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ConfigOrigin {
    Explicit,
    WorkingDirectory,
    Environment,
}

impl ConfigOrigin {
    pub fn as_str(&self) -> &'static str {
        match self {
            ConfigOrigin::Explicit => "explicit path",
            ConfigOrigin::WorkingDirectory => "working directory",
            ConfigOrigin::Environment => CONFIG_ENV_VAR,
        }
    }
}

/// A located config file with provenance
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ConfigSource {
    pub origin: ConfigOrigin,
    pub path: PathBuf,
}

/// Finds the config file. The working directory and environment value are
/// injected so lookup never depends on process state in tests.
#[derive(Debug, Clone)]
pub struct ConfigLocator {
    working_dir: PathBuf,
    env_path: Option<PathBuf>,
}

impl ConfigLocator {
    pub fn new(working_dir: impl Into<PathBuf>) -> Self {
        Self {
            working_dir: working_dir.into(),
            env_path: None,
        }
    }

    /// Set the path the environment variable would name
    pub fn with_env_path(mut self, path: Option<PathBuf>) -> Self {
        self.env_path = path;
        self
    }

    /// Locator for the current process: current directory + `LASER_COMBINE_CONFIG`
    pub fn from_process() -> io::Result<Self> {
        let env_path = std::env::var_os(CONFIG_ENV_VAR)
            .filter(|v| !v.is_empty())
            .map(PathBuf::from);
        Ok(Self::new(std::env::current_dir()?).with_env_path(env_path))
    }

    /// Find the config file to use, if any
    pub fn locate(&self, explicit: Option<&Path>) -> Result<Option<ConfigSource>, ConfigError> {
        if let Some(path) = explicit {
            let path = self.working_dir.join(path);
            if !path.is_file() {
                return Err(ConfigError::NotFound(path));
            }
            return Ok(Some(ConfigSource {
                origin: ConfigOrigin::Explicit,
                path,
            }));
        }

        let local = self.working_dir.join(CONFIG_FILE_NAME);
        if local.is_file() {
            return Ok(Some(ConfigSource {
                origin: ConfigOrigin::WorkingDirectory,
                path: local,
            }));
        }

        if let Some(ref env_path) = self.env_path {
            let path = self.working_dir.join(env_path);
            if path.is_file() {
                return Ok(Some(ConfigSource {
                    origin: ConfigOrigin::Environment,
                    path,
                }));
            }
            warn!(
                path = %path.display(),
                "{} names a config file that does not exist, ignoring",
                CONFIG_ENV_VAR
            );
        }

        Ok(None)
    }

    /// Locate and parse the config file (without validating it)
    pub fn load(&self, explicit: Option<&Path>) -> Result<Option<ParsedConfig>, ConfigError> {
        match self.locate(explicit)? {
            Some(source) => {
                debug!(path = %source.path.display(), origin = source.origin.as_str(), "loading config file");
                ParsedConfig::read(source).map(Some)
            }
            None => {
                debug!("no config file found, using defaults and CLI values");
                Ok(None)
            }
        }
    }
}

/// A parsed but not yet validated config document
#[derive(Debug, Clone)]
pub struct ParsedConfig {
    pub source: Option<ConfigSource>,
    pub table: toml::Table,
}

impl ParsedConfig {
    /// Read and parse the file behind `source`
    pub fn read(source: ConfigSource) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(&source.path).map_err(|e| ConfigError::Io {
            path: source.path.clone(),
            source: e,
        })?;

        let table: toml::Table = toml::from_str(&contents).map_err(|e| {
            ConfigError::Parse(format!("{}: {}", source.path.display(), e))
        })?;

        Ok(Self {
            source: Some(source),
            table,
        })
    }

    /// Parse config from a TOML string
    pub fn parse(s: &str) -> Result<Self, ConfigError> {
        let table: toml::Table =
            toml::from_str(s).map_err(|e| ConfigError::Parse(e.to_string()))?;
        Ok(Self {
            source: None,
            table,
        })
    }

    /// Check the document against the schema and build the typed tiers.
    pub fn validate(&self) -> Result<ConfigFile, ConfigError> {
        let global_table = match self.table.get(GLOBAL_SECTION) {
            Some(toml::Value::Table(t)) => t,
            Some(_) => {
                return Err(ConfigError::Invalid {
                    key: GLOBAL_SECTION.to_string(),
                    reason: "must be a table".to_string(),
                })
            }
            None => {
                return Err(ConfigError::Invalid {
                    key: GLOBAL_SECTION.to_string(),
                    reason: "missing required [global] section".to_string(),
                })
            }
        };

        for (key, value) in global_table {
            match schema::global_domain(key) {
                Some(domain) => {
                    schema::check_value(&format!("{}.{}", GLOBAL_SECTION, key), value, domain)?
                }
                None => warn!(key = %key, "ignoring unrecognized key in [global]"),
            }
        }
        let global: ConfigLayer = typed(GLOBAL_SECTION, global_table)?;

        let mut layers = BTreeMap::new();
        for (name, value) in &self.table {
            if name == GLOBAL_SECTION {
                continue;
            }

            let section = value.as_table().ok_or_else(|| ConfigError::Invalid {
                key: name.clone(),
                reason: "layer section must be a table".to_string(),
            })?;

            for (key, value) in section {
                match schema::layer_domain(key) {
                    Some(domain) => schema::check_value(&format!("{}.{}", name, key), value, domain)?,
                    None => warn!(
                        layer = %name,
                        key = %key,
                        "ignoring unrecognized key in layer section (only cutting_speed and power are per-layer)"
                    ),
                }
            }

            layers.insert(name.clone(), typed::<LayerSection>(name, section)?);
        }

        Ok(ConfigFile {
            source: self.source.clone(),
            global,
            layers,
        })
    }
}

/// Deserialize a validated table into its typed tier
fn typed<T: for<'de> Deserialize<'de>>(key: &str, table: &toml::Table) -> Result<T, ConfigError> {
    toml::Value::Table(table.clone())
        .try_into()
        .map_err(|e| ConfigError::Invalid {
            key: key.to_string(),
            reason: e.to_string(),
        })
}

/// A validated config file: the global tier plus per-layer sections
#[derive(Debug, Clone, Default)]
pub struct ConfigFile {
    pub source: Option<ConfigSource>,
    pub global: ConfigLayer,
    pub layers: BTreeMap<String, LayerSection>,
}

impl ConfigFile {
    /// Parse and validate config from a TOML string
    pub fn parse(s: &str) -> Result<Self, ConfigError> {
        ParsedConfig::parse(s)?.validate()
    }

    /// Read, parse, and validate a config file at a known path
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        ParsedConfig::read(ConfigSource {
            origin: ConfigOrigin::Explicit,
            path: path.to_path_buf(),
        })?
        .validate()
    }

    /// The section for a layer name, if the file has one
    pub fn layer(&self, name: &str) -> Option<&LayerSection> {
        self.layers.get(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::options::Unit;
    use tempfile::TempDir;

    #[test]
    fn test_parse_minimal_config() {
        let config = ConfigFile::parse("[global]\n").unwrap();
        assert_eq!(config.global, ConfigLayer::default());
        assert!(config.layers.is_empty());
    }

    #[test]
    fn test_parse_full_config() {
        let toml = r#"
            [global]
            travel_speed = 2500
            unit = "in"
            passes = 2
            header = ["G90", "G21"]

            [cut]
            cutting_speed = 300.5
            power = 200

            [engrave]
            power = 40
        "#;

        let config = ConfigFile::parse(toml).unwrap();
        assert_eq!(config.global.travel_speed, Some(2500.0));
        assert_eq!(config.global.unit, Some(Unit::In));
        assert_eq!(config.global.passes, Some(2));
        assert_eq!(config.global.header.as_ref().map(Vec::len), Some(2));

        let cut = config.layer("cut").unwrap();
        assert_eq!(cut.cutting_speed, Some(300.5));
        assert_eq!(cut.power, Some(200));

        let engrave = config.layer("engrave").unwrap();
        assert_eq!(engrave.cutting_speed, None);
        assert_eq!(engrave.power, Some(40));
    }

    #[test]
    fn test_missing_global_section() {
        let err = ConfigFile::parse("[cut]\npower = 10\n").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { ref key, .. } if key == "global"));
    }

    #[test]
    fn test_global_not_a_table() {
        let err = ConfigFile::parse("global = 3\n").unwrap_err();
        assert!(err.to_string().contains("global"));
    }

    #[test]
    fn test_invalid_global_value_names_key() {
        let err = ConfigFile::parse("[global]\nbed_width = -5\n").unwrap_err();
        assert!(err.to_string().contains("global.bed_width"));

        let err = ConfigFile::parse("[global]\nmachine_origin = \"middle\"\n").unwrap_err();
        assert!(err.to_string().contains("global.machine_origin"));
    }

    #[test]
    fn test_layer_section_must_be_table() {
        let err = ConfigFile::parse("cut = 5\n\n[global]\n").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { ref key, .. } if key == "cut"));
    }

    #[test]
    fn test_layer_power_out_of_range() {
        let err = ConfigFile::parse("[global]\n\n[Outline]\npower = 300\n").unwrap_err();
        assert!(err.to_string().contains("Outline.power"));
    }

    #[test]
    fn test_layer_speed_must_be_positive() {
        let err = ConfigFile::parse("[global]\n\n[cut]\ncutting_speed = 0\n").unwrap_err();
        assert!(err.to_string().contains("cut.cutting_speed"));
    }

    #[test]
    fn test_unknown_keys_ignored() {
        let toml = r#"
            [global]
            laser_model = "K40"

            [cut]
            unit = "in"
            power = 10
        "#;
        let config = ConfigFile::parse(toml).unwrap();
        assert_eq!(config.layer("cut").unwrap().power, Some(10));
    }

    #[test]
    fn test_toml_syntax_error() {
        let err = ConfigFile::parse("[global\n").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_locate_explicit_missing() {
        let dir = TempDir::new().unwrap();
        let locator = ConfigLocator::new(dir.path());

        let err = locator.locate(Some(Path::new("nope.toml"))).unwrap_err();
        assert!(matches!(err, ConfigError::NotFound(_)));
    }

    #[test]
    fn test_locate_precedence() {
        let dir = TempDir::new().unwrap();
        let explicit = dir.path().join("explicit.toml");
        let env = dir.path().join("env.toml");
        let local = dir.path().join(CONFIG_FILE_NAME);
        for path in [&explicit, &env, &local] {
            fs::write(path, "[global]\n").unwrap();
        }

        let locator = ConfigLocator::new(dir.path()).with_env_path(Some(env.clone()));

        let found = locator.locate(Some(&explicit)).unwrap().unwrap();
        assert_eq!(found.origin, ConfigOrigin::Explicit);

        let found = locator.locate(None).unwrap().unwrap();
        assert_eq!(found.origin, ConfigOrigin::WorkingDirectory);
        assert_eq!(found.path, local);

        fs::remove_file(&local).unwrap();
        let found = locator.locate(None).unwrap().unwrap();
        assert_eq!(found.origin, ConfigOrigin::Environment);
        assert_eq!(found.path, env);

        fs::remove_file(&env).unwrap();
        assert!(locator.locate(None).unwrap().is_none());
    }

    #[test]
    fn test_load_reads_and_records_source() {
        let dir = TempDir::new().unwrap();
        fs::write(
            dir.path().join(CONFIG_FILE_NAME),
            "[global]\ntravel_speed = 1200\n",
        )
        .unwrap();

        let parsed = ConfigLocator::new(dir.path()).load(None).unwrap().unwrap();
        let source = parsed.source.as_ref().unwrap();
        assert_eq!(source.origin, ConfigOrigin::WorkingDirectory);

        let config = parsed.validate().unwrap();
        assert_eq!(config.global.travel_speed, Some(1200.0));
        assert!(config.source.is_some());
    }

    #[test]
    fn test_load_none() {
        let dir = TempDir::new().unwrap();
        assert!(ConfigLocator::new(dir.path()).load(None).unwrap().is_none());
    }
}
