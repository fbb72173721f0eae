//! Effective (resolved) configuration
//!
//! [`CombineConfig`] is the immutable result of folding every tier. It is
//! validated against the same domain table as the file, so out-of-range CLI
//! values are caught here.

use std::io;
use std::path::PathBuf;

use serde::Serialize;
use tracing::debug;

use super::defaults::BuiltinDefaults;
use super::file::{ConfigFile, ConfigSource};
use super::merge::{merge_layers, ConfigLayer};
use super::options::{LayerRole, MachineOrigin, Unit};
use super::schema::{check_number, Domain};

/// Resolved settings for one layer
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LayerSettings {
    /// Layer name in the drawing
    pub name: String,
    pub cutting_speed: f64,
    pub power: u8,
}

impl LayerSettings {
    /// Power as a whole percentage of full scale (255)
    pub fn power_percent(&self) -> u32 {
        u32::from(self.power) * 100 / 255
    }
}

/// Fully resolved configuration for a combine run
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CombineConfig {
    pub travel_speed: f64,
    pub engrave: LayerSettings,
    pub cut: LayerSettings,
    pub unit: Unit,
    pub passes: u32,
    pub pass_depth: f64,
    pub dwell_time: f64,
    pub approximation_tolerance: f64,
    pub tool_off_command: String,
    pub machine_origin: MachineOrigin,
    pub zero_machine: bool,
    pub invert_y_axis: bool,
    pub use_document_size: bool,
    pub bed_width: f64,
    pub bed_height: f64,
    pub horizontal_offset: f64,
    pub vertical_offset: f64,
    pub scaling_factor: f64,
    pub z_axis_start: f64,
    pub do_z_axis_start: bool,
    pub move_to_origin_end: bool,
    pub do_laser_off_start: bool,
    pub do_laser_off_end: bool,
    pub header: Vec<String>,
    pub footer: Vec<String>,

    /// Config file that contributed, if any
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<ConfigSource>,
}

impl CombineConfig {
    /// Resolve the four tiers: defaults < file global < file layer section < CLI.
    pub fn resolve(file: Option<&ConfigFile>, cli: &ConfigLayer) -> Result<Self, ConfigError> {
        let defaults = BuiltinDefaults::default().to_layer();
        let global = file.map(|f| f.global.clone()).unwrap_or_default();

        // Layer names decide which sections apply, so settle them first
        let names = merge_layers(vec![defaults.clone(), global.clone(), cli.clone()]);
        let engrave_name = required(names.engrave_layer, "engrave_layer")?;
        let cut_name = required(names.cut_layer, "cut_layer")?;

        let mut tiers = vec![defaults, global];
        if let Some(file) = file {
            for (role, name) in [(LayerRole::Engrave, &engrave_name), (LayerRole::Cut, &cut_name)] {
                if let Some(section) = file.layer(name) {
                    debug!(layer = %name, role = %role, "applying layer section");
                    tiers.push(section.to_layer(role));
                }
            }
        }
        tiers.push(cli.clone());

        let mut config = Self::from_merged(merge_layers(tiers))?;
        config.source = file.and_then(|f| f.source.clone());
        config.validate()?;
        Ok(config)
    }

    /// Build from a merged tier in which every field is set.
    fn from_merged(merged: ConfigLayer) -> Result<Self, ConfigError> {
        Ok(Self {
            travel_speed: required(merged.travel_speed, "travel_speed")?,
            engrave: LayerSettings {
                name: required(merged.engrave_layer, "engrave_layer")?,
                cutting_speed: required(merged.engrave_cutting_speed, "engrave_cutting_speed")?,
                power: required(merged.engrave_power, "engrave_power")?,
            },
            cut: LayerSettings {
                name: required(merged.cut_layer, "cut_layer")?,
                cutting_speed: required(merged.cut_cutting_speed, "cut_cutting_speed")?,
                power: required(merged.cut_power, "cut_power")?,
            },
            unit: required(merged.unit, "unit")?,
            passes: required(merged.passes, "passes")?,
            pass_depth: required(merged.pass_depth, "pass_depth")?,
            dwell_time: required(merged.dwell_time, "dwell_time")?,
            approximation_tolerance: required(
                merged.approximation_tolerance,
                "approximation_tolerance",
            )?,
            tool_off_command: required(merged.tool_off_command, "tool_off_command")?,
            machine_origin: required(merged.machine_origin, "machine_origin")?,
            zero_machine: required(merged.zero_machine, "zero_machine")?,
            invert_y_axis: required(merged.invert_y_axis, "invert_y_axis")?,
            use_document_size: required(merged.use_document_size, "use_document_size")?,
            bed_width: required(merged.bed_width, "bed_width")?,
            bed_height: required(merged.bed_height, "bed_height")?,
            horizontal_offset: required(merged.horizontal_offset, "horizontal_offset")?,
            vertical_offset: required(merged.vertical_offset, "vertical_offset")?,
            scaling_factor: required(merged.scaling_factor, "scaling_factor")?,
            z_axis_start: required(merged.z_axis_start, "z_axis_start")?,
            do_z_axis_start: required(merged.do_z_axis_start, "do_z_axis_start")?,
            move_to_origin_end: required(merged.move_to_origin_end, "move_to_origin_end")?,
            do_laser_off_start: required(merged.do_laser_off_start, "do_laser_off_start")?,
            do_laser_off_end: required(merged.do_laser_off_end, "do_laser_off_end")?,
            header: merged.header.unwrap_or_default(),
            footer: merged.footer.unwrap_or_default(),
            source: None,
        })
    }

    /// Check resolved values against their domains
    pub fn validate(&self) -> Result<(), ConfigError> {
        let numbers = [
            ("travel_speed", self.travel_speed, Domain::Positive),
            ("engrave_cutting_speed", self.engrave.cutting_speed, Domain::Positive),
            ("cut_cutting_speed", self.cut.cutting_speed, Domain::Positive),
            ("passes", f64::from(self.passes), Domain::PassCount),
            ("pass_depth", self.pass_depth, Domain::Positive),
            ("dwell_time", self.dwell_time, Domain::NonNegative),
            ("approximation_tolerance", self.approximation_tolerance, Domain::Positive),
            ("bed_width", self.bed_width, Domain::Positive),
            ("bed_height", self.bed_height, Domain::Positive),
            ("horizontal_offset", self.horizontal_offset, Domain::Finite),
            ("vertical_offset", self.vertical_offset, Domain::Finite),
            ("scaling_factor", self.scaling_factor, Domain::Positive),
            ("z_axis_start", self.z_axis_start, Domain::Finite),
        ];
        for (key, value, domain) in numbers {
            check_number(key, value, domain)?;
        }

        for (key, layer) in [("engrave_layer", &self.engrave), ("cut_layer", &self.cut)] {
            if layer.name.trim().is_empty() {
                return Err(ConfigError::Invalid {
                    key: key.to_string(),
                    reason: Domain::Name.describe(),
                });
            }
        }

        if self.engrave.name == self.cut.name {
            return Err(ConfigError::Invalid {
                key: "cut_layer".to_string(),
                reason: format!(
                    "engrave and cut layers must differ (both are '{}')",
                    self.cut.name
                ),
            });
        }

        Ok(())
    }

    /// Settings for the given pass
    pub fn layer(&self, role: LayerRole) -> &LayerSettings {
        match role {
            LayerRole::Engrave => &self.engrave,
            LayerRole::Cut => &self.cut,
        }
    }
}

impl From<BuiltinDefaults> for CombineConfig {
    fn from(d: BuiltinDefaults) -> Self {
        Self {
            travel_speed: d.travel_speed,
            engrave: LayerSettings {
                name: d.engrave_layer,
                cutting_speed: d.engrave_cutting_speed,
                power: d.engrave_power,
            },
            cut: LayerSettings {
                name: d.cut_layer,
                cutting_speed: d.cut_cutting_speed,
                power: d.cut_power,
            },
            unit: d.unit,
            passes: d.passes,
            pass_depth: d.pass_depth,
            dwell_time: d.dwell_time,
            approximation_tolerance: d.approximation_tolerance,
            tool_off_command: d.tool_off_command,
            machine_origin: d.machine_origin,
            zero_machine: d.zero_machine,
            invert_y_axis: d.invert_y_axis,
            use_document_size: d.use_document_size,
            bed_width: d.bed_width,
            bed_height: d.bed_height,
            horizontal_offset: d.horizontal_offset,
            vertical_offset: d.vertical_offset,
            scaling_factor: d.scaling_factor,
            z_axis_start: d.z_axis_start,
            do_z_axis_start: d.do_z_axis_start,
            move_to_origin_end: d.move_to_origin_end,
            do_laser_off_start: d.do_laser_off_start,
            do_laser_off_end: d.do_laser_off_end,
            header: Vec::new(),
            footer: Vec::new(),
            source: None,
        }
    }
}

impl Default for CombineConfig {
    fn default() -> Self {
        BuiltinDefaults::default().into()
    }
}

fn required<T>(value: Option<T>, key: &str) -> Result<T, ConfigError> {
    value.ok_or_else(|| ConfigError::Invalid {
        key: key.to_string(),
        reason: "no value in any configuration tier".to_string(),
    })
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("config file not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("failed to read config file {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("TOML parse error: {0}")]
    Parse(String),

    #[error("invalid value for '{key}': {reason}")]
    Invalid { key: String, reason: String },
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::file::ConfigFile;

    const FILE: &str = r#"
        [global]
        travel_speed = 2000
        cut_cutting_speed = 300
        cut_power = 180
        engrave_power = 60
        unit = "in"
        header = ["G90"]

        [cut]
        power = 220

        [engrave]
        cutting_speed = 1500
    "#;

    #[test]
    fn test_defaults_only() {
        let config = CombineConfig::resolve(None, &ConfigLayer::default()).unwrap();

        assert_eq!(config, CombineConfig::default());
        assert_eq!(config.travel_speed, 3000.0);
        assert_eq!(config.engrave.name, "engrave");
        assert_eq!(config.engrave.power, 75);
        assert_eq!(config.cut.cutting_speed, 250.0);
        assert_eq!(config.cut.power, 255);
        assert!(config.header.is_empty());
        assert!(config.source.is_none());
    }

    #[test]
    fn test_global_overrides_defaults() {
        let file = ConfigFile::parse(FILE).unwrap();
        let config = CombineConfig::resolve(Some(&file), &ConfigLayer::default()).unwrap();

        assert_eq!(config.travel_speed, 2000.0);
        assert_eq!(config.unit, Unit::In);
        assert_eq!(config.cut.cutting_speed, 300.0);
        assert_eq!(config.engrave.power, 60);
        assert_eq!(config.header, vec!["G90".to_string()]);
    }

    #[test]
    fn test_layer_section_beats_global() {
        let file = ConfigFile::parse(FILE).unwrap();
        let config = CombineConfig::resolve(Some(&file), &ConfigLayer::default()).unwrap();

        assert_eq!(config.cut.power, 220);
        assert_eq!(config.engrave.cutting_speed, 1500.0);
    }

    #[test]
    fn test_cli_beats_layer_section() {
        let file = ConfigFile::parse(FILE).unwrap();
        let cli = ConfigLayer {
            cut_power: Some(90),
            travel_speed: Some(1000.0),
            ..Default::default()
        };
        let config = CombineConfig::resolve(Some(&file), &cli).unwrap();

        assert_eq!(config.cut.power, 90);
        assert_eq!(config.travel_speed, 1000.0);
        // Untouched by CLI
        assert_eq!(config.engrave.cutting_speed, 1500.0);
    }

    #[test]
    fn test_cli_empty_header_keeps_file_header() {
        let file = ConfigFile::parse(FILE).unwrap();
        let cli = ConfigLayer {
            header: Some(Vec::new()),
            ..Default::default()
        };
        let config = CombineConfig::resolve(Some(&file), &cli).unwrap();
        assert_eq!(config.header, vec!["G90".to_string()]);

        let cli = ConfigLayer {
            header: Some(vec!["G91".to_string(), "G21".to_string()]),
            ..Default::default()
        };
        let config = CombineConfig::resolve(Some(&file), &cli).unwrap();
        assert_eq!(config.header, vec!["G91".to_string(), "G21".to_string()]);
    }

    #[test]
    fn test_renamed_layer_picks_its_section() {
        let toml = r#"
            [global]
            cut_layer = "Outline"

            [cut]
            power = 10

            [Outline]
            power = 240
        "#;
        let file = ConfigFile::parse(toml).unwrap();
        let config = CombineConfig::resolve(Some(&file), &ConfigLayer::default()).unwrap();

        assert_eq!(config.cut.name, "Outline");
        assert_eq!(config.cut.power, 240);
    }

    #[test]
    fn test_cli_layer_rename_selects_section() {
        let toml = "[global]\n\n[Score]\ncutting_speed = 900\n";
        let file = ConfigFile::parse(toml).unwrap();
        let cli = ConfigLayer {
            engrave_layer: Some("Score".to_string()),
            ..Default::default()
        };
        let config = CombineConfig::resolve(Some(&file), &cli).unwrap();

        assert_eq!(config.engrave.name, "Score");
        assert_eq!(config.engrave.cutting_speed, 900.0);
    }

    #[test]
    fn test_invalid_cli_value_rejected() {
        let cli = ConfigLayer {
            scaling_factor: Some(0.0),
            ..Default::default()
        };
        let err = CombineConfig::resolve(None, &cli).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { ref key, .. } if key == "scaling_factor"));

        let cli = ConfigLayer {
            passes: Some(0),
            ..Default::default()
        };
        assert!(CombineConfig::resolve(None, &cli).is_err());
    }

    #[test]
    fn test_same_layer_names_rejected() {
        let cli = ConfigLayer {
            engrave_layer: Some("cut".to_string()),
            ..Default::default()
        };
        let err = CombineConfig::resolve(None, &cli).unwrap_err();
        assert!(err.to_string().contains("must differ"));
    }

    #[test]
    fn test_empty_layer_name_rejected() {
        let cli = ConfigLayer {
            cut_layer: Some("  ".to_string()),
            ..Default::default()
        };
        let err = CombineConfig::resolve(None, &cli).unwrap_err();
        assert!(err.to_string().contains("cut_layer"));
    }

    #[test]
    fn test_power_percent() {
        let config = CombineConfig::default();
        assert_eq!(config.engrave.power_percent(), 29);
        assert_eq!(config.cut.power_percent(), 100);
    }
}
