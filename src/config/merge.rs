//! Configuration merge logic
//!
//! Every tier is a [`ConfigLayer`] of optional fields. Tiers are folded in
//! precedence order (defaults, global section, layer sections, CLI):
//! - Scalars: a set value in the higher tier wins
//! - Line lists: a non-empty list in the higher tier replaces the lower list;
//!   an empty list never overrides

use serde::{Deserialize, Serialize};

use super::options::{LayerRole, MachineOrigin, Unit};

/// One configuration tier. `None` means "not set in this tier".
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ConfigLayer {
    pub travel_speed: Option<f64>,
    pub engrave_layer: Option<String>,
    pub engrave_cutting_speed: Option<f64>,
    pub engrave_power: Option<u8>,
    pub cut_layer: Option<String>,
    pub cut_cutting_speed: Option<f64>,
    pub cut_power: Option<u8>,
    pub unit: Option<Unit>,
    pub passes: Option<u32>,
    pub pass_depth: Option<f64>,
    pub dwell_time: Option<f64>,
    pub approximation_tolerance: Option<f64>,
    pub tool_off_command: Option<String>,
    pub machine_origin: Option<MachineOrigin>,
    pub zero_machine: Option<bool>,
    pub invert_y_axis: Option<bool>,
    pub use_document_size: Option<bool>,
    pub bed_width: Option<f64>,
    pub bed_height: Option<f64>,
    pub horizontal_offset: Option<f64>,
    pub vertical_offset: Option<f64>,
    pub scaling_factor: Option<f64>,
    pub z_axis_start: Option<f64>,
    pub do_z_axis_start: Option<bool>,
    pub move_to_origin_end: Option<bool>,
    pub do_laser_off_start: Option<bool>,
    pub do_laser_off_end: Option<bool>,
    pub header: Option<Vec<String>>,
    pub footer: Option<Vec<String>>,
}

impl ConfigLayer {
    /// Lay `top` over `self`, returning the merged tier.
    pub fn overlay(self, top: ConfigLayer) -> ConfigLayer {
        ConfigLayer {
            travel_speed: top.travel_speed.or(self.travel_speed),
            engrave_layer: top.engrave_layer.or(self.engrave_layer),
            engrave_cutting_speed: top.engrave_cutting_speed.or(self.engrave_cutting_speed),
            engrave_power: top.engrave_power.or(self.engrave_power),
            cut_layer: top.cut_layer.or(self.cut_layer),
            cut_cutting_speed: top.cut_cutting_speed.or(self.cut_cutting_speed),
            cut_power: top.cut_power.or(self.cut_power),
            unit: top.unit.or(self.unit),
            passes: top.passes.or(self.passes),
            pass_depth: top.pass_depth.or(self.pass_depth),
            dwell_time: top.dwell_time.or(self.dwell_time),
            approximation_tolerance: top.approximation_tolerance.or(self.approximation_tolerance),
            tool_off_command: top.tool_off_command.or(self.tool_off_command),
            machine_origin: top.machine_origin.or(self.machine_origin),
            zero_machine: top.zero_machine.or(self.zero_machine),
            invert_y_axis: top.invert_y_axis.or(self.invert_y_axis),
            use_document_size: top.use_document_size.or(self.use_document_size),
            bed_width: top.bed_width.or(self.bed_width),
            bed_height: top.bed_height.or(self.bed_height),
            horizontal_offset: top.horizontal_offset.or(self.horizontal_offset),
            vertical_offset: top.vertical_offset.or(self.vertical_offset),
            scaling_factor: top.scaling_factor.or(self.scaling_factor),
            z_axis_start: top.z_axis_start.or(self.z_axis_start),
            do_z_axis_start: top.do_z_axis_start.or(self.do_z_axis_start),
            move_to_origin_end: top.move_to_origin_end.or(self.move_to_origin_end),
            do_laser_off_start: top.do_laser_off_start.or(self.do_laser_off_start),
            do_laser_off_end: top.do_laser_off_end.or(self.do_laser_off_end),
            header: overlay_lines(self.header, top.header),
            footer: overlay_lines(self.footer, top.footer),
        }
    }
}

fn overlay_lines(base: Option<Vec<String>>, top: Option<Vec<String>>) -> Option<Vec<String>> {
    match top {
        Some(lines) if !lines.is_empty() => Some(lines),
        _ => base,
    }
}

/// Per-layer section of the config file (e.g. `[cut]`).
///
/// Only speed and power may vary between layers.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LayerSection {
    pub cutting_speed: Option<f64>,
    pub power: Option<u8>,
}

impl LayerSection {
    /// Express this section as a tier addressing the given role's fields.
    pub fn to_layer(&self, role: LayerRole) -> ConfigLayer {
        match role {
            LayerRole::Engrave => ConfigLayer {
                engrave_cutting_speed: self.cutting_speed,
                engrave_power: self.power,
                ..ConfigLayer::default()
            },
            LayerRole::Cut => ConfigLayer {
                cut_cutting_speed: self.cutting_speed,
                cut_power: self.power,
                ..ConfigLayer::default()
            },
        }
    }
}

/// Merge tiers in order (first is base, last has highest precedence)
pub fn merge_layers(layers: Vec<ConfigLayer>) -> ConfigLayer {
    layers.into_iter().fold(ConfigLayer::default(), ConfigLayer::overlay)
}
