//! Config schema: the (type, domain) table every recognized key is checked
//! against, both in the file and after resolution.

use super::effective::ConfigError;
use super::options::{MachineOrigin, Unit};

/// Allowed type and value range for a key
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Domain {
    /// Number > 0
    Positive,
    /// Number >= 0
    NonNegative,
    /// Any finite number
    Finite,
    /// Integer in 0..=255
    Power,
    /// Integer >= 1
    PassCount,
    Flag,
    Text,
    /// Non-empty string
    Name,
    /// Array of strings
    Lines,
    OneOf(&'static [&'static str]),
}

impl Domain {
    pub fn describe(&self) -> String {
        match self {
            Domain::Positive => "must be a number greater than 0".to_string(),
            Domain::NonNegative => "must be a number greater than or equal to 0".to_string(),
            Domain::Finite => "must be a finite number".to_string(),
            Domain::Power => "must be an integer between 0 and 255".to_string(),
            Domain::PassCount => "must be an integer of at least 1".to_string(),
            Domain::Flag => "must be a boolean".to_string(),
            Domain::Text => "must be a string".to_string(),
            Domain::Name => "must be a non-empty string".to_string(),
            Domain::Lines => "must be an array of strings".to_string(),
            Domain::OneOf(values) => format!("must be one of: {}", values.join(", ")),
        }
    }
}

/// Recognized keys of the `[global]` table
pub const GLOBAL_KEYS: &[(&str, Domain)] = &[
    ("travel_speed", Domain::Positive),
    ("engrave_layer", Domain::Name),
    ("engrave_cutting_speed", Domain::Positive),
    ("engrave_power", Domain::Power),
    ("cut_layer", Domain::Name),
    ("cut_cutting_speed", Domain::Positive),
    ("cut_power", Domain::Power),
    ("unit", Domain::OneOf(Unit::VALUES)),
    ("passes", Domain::PassCount),
    ("pass_depth", Domain::Positive),
    ("dwell_time", Domain::NonNegative),
    ("approximation_tolerance", Domain::Positive),
    ("tool_off_command", Domain::Text),
    ("machine_origin", Domain::OneOf(MachineOrigin::VALUES)),
    ("zero_machine", Domain::Flag),
    ("invert_y_axis", Domain::Flag),
    ("use_document_size", Domain::Flag),
    ("bed_width", Domain::Positive),
    ("bed_height", Domain::Positive),
    ("horizontal_offset", Domain::Finite),
    ("vertical_offset", Domain::Finite),
    ("scaling_factor", Domain::Positive),
    ("z_axis_start", Domain::Finite),
    ("do_z_axis_start", Domain::Flag),
    ("move_to_origin_end", Domain::Flag),
    ("do_laser_off_start", Domain::Flag),
    ("do_laser_off_end", Domain::Flag),
    ("header", Domain::Lines),
    ("footer", Domain::Lines),
];

/// Recognized keys of a layer section
pub const LAYER_KEYS: &[(&str, Domain)] = &[
    ("cutting_speed", Domain::Positive),
    ("power", Domain::Power),
];

/// Name of the mandatory global table
pub const GLOBAL_SECTION: &str = "global";

pub fn global_domain(key: &str) -> Option<Domain> {
    lookup(GLOBAL_KEYS, key)
}

pub fn layer_domain(key: &str) -> Option<Domain> {
    lookup(LAYER_KEYS, key)
}

fn lookup(table: &[(&str, Domain)], key: &str) -> Option<Domain> {
    table.iter().find(|(k, _)| *k == key).map(|(_, d)| *d)
}

fn invalid(key: &str, domain: Domain) -> ConfigError {
    ConfigError::Invalid {
        key: key.to_string(),
        reason: domain.describe(),
    }
}

/// Check a raw TOML value against its domain. `key` is the dotted path used
/// in the error.
pub fn check_value(key: &str, value: &toml::Value, domain: Domain) -> Result<(), ConfigError> {
    let ok = match domain {
        Domain::Positive | Domain::NonNegative | Domain::Finite => match value {
            toml::Value::Integer(i) => number_in_domain(*i as f64, domain),
            toml::Value::Float(f) => number_in_domain(*f, domain),
            _ => false,
        },
        Domain::Power => matches!(value, toml::Value::Integer(i) if (0..=255).contains(i)),
        Domain::PassCount => {
            matches!(value, toml::Value::Integer(i) if *i >= 1 && *i <= u32::MAX as i64)
        }
        Domain::Flag => value.is_bool(),
        Domain::Text => value.is_str(),
        Domain::Name => matches!(value, toml::Value::String(s) if !s.trim().is_empty()),
        Domain::Lines => match value {
            toml::Value::Array(items) => items.iter().all(toml::Value::is_str),
            _ => false,
        },
        Domain::OneOf(values) => {
            matches!(value, toml::Value::String(s) if values.contains(&s.as_str()))
        }
    };

    if ok {
        Ok(())
    } else {
        Err(invalid(key, domain))
    }
}

/// Check an already-typed number against a numeric domain.
pub fn check_number(key: &str, value: f64, domain: Domain) -> Result<(), ConfigError> {
    if number_in_domain(value, domain) {
        Ok(())
    } else {
        Err(invalid(key, domain))
    }
}

fn number_in_domain(value: f64, domain: Domain) -> bool {
    if !value.is_finite() {
        return false;
    }
    match domain {
        Domain::Positive => value > 0.0,
        Domain::NonNegative => value >= 0.0,
        Domain::Finite => true,
        Domain::Power => value.fract() == 0.0 && (0.0..=255.0).contains(&value),
        Domain::PassCount => value.fract() == 0.0 && value >= 1.0,
        _ => false,
    }
}
