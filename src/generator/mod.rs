//! Layer artifact generation
//!
//! Converting one drawing layer into G-code is delegated to a
//! [`LayerGenerator`]. The combiner treats it as opaque: it either writes an
//! artifact to the requested path or fails.
//!
//! - [`CommandGenerator`]: runs an external converter program
//! - [`MockGenerator`]: scripted in-process generator for tests

mod command;
mod mock;

use std::io;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::config::{CombineConfig, LayerRole, MachineOrigin, Unit};

pub use command::{CommandGenerator, DEFAULT_GENERATOR, GENERATOR_ENV_VAR, LAYER_ABSENT_EXIT_CODE};
pub use mock::{MockGenerator, MockLayer};

/// Produces the G-code artifact for a single layer
pub trait LayerGenerator: Send + Sync {
    /// Convert the layer named in `settings` from `drawing`, writing G-code
    /// text to `artifact`.
    fn generate(
        &self,
        drawing: &Path,
        settings: &ConversionSettings,
        artifact: &Path,
    ) -> Result<(), GeneratorError>;
}

/// Generator errors
#[derive(Debug, thiserror::Error)]
pub enum GeneratorError {
    #[error("layer '{0}' not found in drawing")]
    LayerAbsent(String),

    #[error("conversion of layer '{layer}' failed: {message}")]
    GeometryInvalid { layer: String, message: String },

    #[error("failed to run generator '{program}': {source}")]
    Spawn {
        program: String,
        #[source]
        source: io::Error,
    },

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("failed to encode conversion settings: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Everything the generator needs to convert one layer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConversionSettings {
    pub layer_name: String,
    pub unit: Unit,
    pub travel_speed: f64,
    pub cutting_speed: f64,
    pub passes: u32,
    pub pass_depth: f64,
    pub dwell_time: f64,
    pub approximation_tolerance: f64,

    /// Laser on at this layer's power, e.g. `M3 S255;`
    pub tool_power_command: String,

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
    pub do_z_axis_start: bool,
    pub z_axis_start: f64,
    pub move_to_origin_end: bool,
    pub do_laser_off_start: bool,
    pub do_laser_off_end: bool,
    pub header: Vec<String>,
    pub footer: Vec<String>,
}

impl ConversionSettings {
    /// Settings for one pass of a resolved configuration
    pub fn for_layer(config: &CombineConfig, role: LayerRole) -> Self {
        let layer = config.layer(role);

        Self {
            layer_name: layer.name.clone(),
            unit: config.unit,
            travel_speed: config.travel_speed,
            cutting_speed: layer.cutting_speed,
            passes: config.passes,
            pass_depth: config.pass_depth,
            dwell_time: config.dwell_time,
            approximation_tolerance: config.approximation_tolerance,
            tool_power_command: format!("M3 S{};", layer.power),
            tool_off_command: config.tool_off_command.clone(),
            machine_origin: config.machine_origin,
            zero_machine: config.zero_machine,
            invert_y_axis: config.invert_y_axis,
            use_document_size: config.use_document_size,
            bed_width: config.bed_width,
            bed_height: config.bed_height,
            horizontal_offset: config.horizontal_offset,
            vertical_offset: config.vertical_offset,
            scaling_factor: config.scaling_factor,
            do_z_axis_start: config.do_z_axis_start,
            z_axis_start: config.z_axis_start,
            move_to_origin_end: config.move_to_origin_end,
            do_laser_off_start: config.do_laser_off_start,
            do_laser_off_end: config.do_laser_off_end,
            header: config.header.clone(),
            footer: config.footer.clone(),
        }
    }
}
