//! Configuration resolution
//!
//! Implements the 4-tier configuration merge:
//! 1. Built-in defaults
//! 2. Config file `[global]` table
//! 3. Config file layer sections (`cutting_speed`, `power` only)
//! 4. CLI flags

mod defaults;
mod effective;
mod file;
mod merge;
mod options;
pub mod schema;
mod template;

pub use defaults::BuiltinDefaults;
pub use effective::{CombineConfig, ConfigError, LayerSettings};
pub use file::{
    ConfigFile, ConfigLocator, ConfigOrigin, ConfigSource, ParsedConfig, CONFIG_ENV_VAR,
    CONFIG_FILE_NAME,
};
pub use merge::{merge_layers, ConfigLayer, LayerSection};
pub use options::{LayerRole, MachineOrigin, Unit};
pub use template::config_template;
