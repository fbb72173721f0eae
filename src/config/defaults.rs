//! Built-in defaults (lowest tier)
//!
//! Hardcoded defaults for all configuration values.

use serde::{Deserialize, Serialize};

use super::merge::ConfigLayer;
use super::options::{MachineOrigin, Unit};

/// Built-in default configuration values
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BuiltinDefaults {
    /// Travel speed for both layers in unit/min (default: 3000)
    pub travel_speed: f64,

    /// Name of the engrave layer in the drawing (default: "engrave")
    pub engrave_layer: String,

    /// Engrave cutting speed in unit/min (default: 1000)
    pub engrave_cutting_speed: f64,

    /// Engrave power, 0-255 (default: 75)
    pub engrave_power: u8,

    /// Name of the cut layer in the drawing (default: "cut")
    pub cut_layer: String,

    /// Cut cutting speed in unit/min (default: 250)
    pub cut_cutting_speed: f64,

    /// Cut power, 0-255 (default: 255)
    pub cut_power: u8,

    pub unit: Unit,
    pub passes: u32,
    pub pass_depth: f64,

    /// Dwell before moving, in milliseconds
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
}

impl Default for BuiltinDefaults {
    fn default() -> Self {
        Self {
            travel_speed: 3000.0,
            engrave_layer: "engrave".to_string(),
            engrave_cutting_speed: 1000.0,
            engrave_power: 75,
            cut_layer: "cut".to_string(),
            cut_cutting_speed: 250.0,
            cut_power: 255,
            unit: Unit::Mm,
            passes: 1,
            pass_depth: 1.0,
            dwell_time: 0.0,
            approximation_tolerance: 0.01,
            tool_off_command: "M5;".to_string(),
            machine_origin: MachineOrigin::BottomLeft,
            zero_machine: false,
            invert_y_axis: false,
            use_document_size: true,
            bed_width: 200.0,
            bed_height: 200.0,
            horizontal_offset: 0.0,
            vertical_offset: 0.0,
            scaling_factor: 1.0,
            z_axis_start: 0.0,
            do_z_axis_start: false,
            move_to_origin_end: false,
            do_laser_off_start: true,
            do_laser_off_end: true,
        }
    }
}

impl BuiltinDefaults {
    /// Convert to a fully populated tier, the base of every merge
    pub fn to_layer(&self) -> ConfigLayer {
        ConfigLayer {
            travel_speed: Some(self.travel_speed),
            engrave_layer: Some(self.engrave_layer.clone()),
            engrave_cutting_speed: Some(self.engrave_cutting_speed),
            engrave_power: Some(self.engrave_power),
            cut_layer: Some(self.cut_layer.clone()),
            cut_cutting_speed: Some(self.cut_cutting_speed),
            cut_power: Some(self.cut_power),
            unit: Some(self.unit),
            passes: Some(self.passes),
            pass_depth: Some(self.pass_depth),
            dwell_time: Some(self.dwell_time),
            approximation_tolerance: Some(self.approximation_tolerance),
            tool_off_command: Some(self.tool_off_command.clone()),
            machine_origin: Some(self.machine_origin),
            zero_machine: Some(self.zero_machine),
            invert_y_axis: Some(self.invert_y_axis),
            use_document_size: Some(self.use_document_size),
            bed_width: Some(self.bed_width),
            bed_height: Some(self.bed_height),
            horizontal_offset: Some(self.horizontal_offset),
            vertical_offset: Some(self.vertical_offset),
            scaling_factor: Some(self.scaling_factor),
            z_axis_start: Some(self.z_axis_start),
            do_z_axis_start: Some(self.do_z_axis_start),
            move_to_origin_end: Some(self.move_to_origin_end),
            do_laser_off_start: Some(self.do_laser_off_start),
            do_laser_off_end: Some(self.do_laser_off_end),
            header: Some(Vec::new()),
            footer: Some(Vec::new()),
        }
    }
}
