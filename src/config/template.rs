//! Starter config file written by `laser-combine config-template`.

use super::defaults::BuiltinDefaults;

/// Render a commented config file listing every key at its default.
pub fn config_template() -> String {
    let d = BuiltinDefaults::default();

    format!(
        r#"# laser-combine configuration
#
# Precedence (lowest to highest): built-in defaults < [global] < layer
# section < command-line flags. Only cutting_speed and power may be set per
# layer; everything else belongs in [global].

[global]
# Travel speed for both layers (unit/min)
travel_speed = {travel_speed:?}

# Layer names in the drawing (case-sensitive)
engrave_layer = {engrave_layer:?}
cut_layer = {cut_layer:?}

# Per-layer fallbacks, overridden by the layer sections below
engrave_cutting_speed = {engrave_cutting_speed:?}
engrave_power = {engrave_power}
cut_cutting_speed = {cut_cutting_speed:?}
cut_power = {cut_power}

# "mm" or "in"
unit = {unit:?}
passes = {passes}
pass_depth = {pass_depth:?}
# Dwell before moving (ms)
dwell_time = {dwell_time:?}
approximation_tolerance = {approximation_tolerance:?}
tool_off_command = {tool_off_command:?}

# "bottom-left", "center" or "top-left"
machine_origin = {machine_origin:?}
zero_machine = {zero_machine}
invert_y_axis = {invert_y_axis}
use_document_size = {use_document_size}
bed_width = {bed_width:?}
bed_height = {bed_height:?}
horizontal_offset = {horizontal_offset:?}
vertical_offset = {vertical_offset:?}
scaling_factor = {scaling_factor:?}
z_axis_start = {z_axis_start:?}
do_z_axis_start = {do_z_axis_start}
move_to_origin_end = {move_to_origin_end}
do_laser_off_start = {do_laser_off_start}
do_laser_off_end = {do_laser_off_end}

# Extra G-code lines passed to the generator for every layer
header = []
footer = []

# Layer sections: keyed by layer name, cutting_speed (unit/min) and power (0-255)
[{engrave_layer}]
cutting_speed = {engrave_cutting_speed:?}
power = {engrave_power}

[{cut_layer}]
cutting_speed = {cut_cutting_speed:?}
power = {cut_power}
"#,
        travel_speed = d.travel_speed,
        engrave_layer = d.engrave_layer,
        cut_layer = d.cut_layer,
        engrave_cutting_speed = d.engrave_cutting_speed,
        engrave_power = d.engrave_power,
        cut_cutting_speed = d.cut_cutting_speed,
        cut_power = d.cut_power,
        unit = d.unit.as_str(),
        passes = d.passes,
        pass_depth = d.pass_depth,
        dwell_time = d.dwell_time,
        approximation_tolerance = d.approximation_tolerance,
        tool_off_command = d.tool_off_command,
        machine_origin = d.machine_origin.as_str(),
        zero_machine = d.zero_machine,
        invert_y_axis = d.invert_y_axis,
        use_document_size = d.use_document_size,
        bed_width = d.bed_width,
        bed_height = d.bed_height,
        horizontal_offset = d.horizontal_offset,
        vertical_offset = d.vertical_offset,
        scaling_factor = d.scaling_factor,
        z_axis_start = d.z_axis_start,
        do_z_axis_start = d.do_z_axis_start,
        move_to_origin_end = d.move_to_origin_end,
        do_laser_off_start = d.do_laser_off_start,
        do_laser_off_end = d.do_laser_off_end,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{CombineConfig, ConfigFile, ConfigLayer};

    #[test]
    fn test_template_validates() {
        let file = ConfigFile::parse(&config_template()).unwrap();
        assert!(file.layer("engrave").is_some());
        assert!(file.layer("cut").is_some());
    }

    #[test]
    fn test_template_resolves_to_defaults() {
        let file = ConfigFile::parse(&config_template()).unwrap();
        let config = CombineConfig::resolve(Some(&file), &ConfigLayer::default()).unwrap();
        assert_eq!(config, CombineConfig::default());
    }

    #[test]
    fn test_template_lists_every_global_key() {
        let template = config_template();
        for (key, _) in crate::config::schema::GLOBAL_KEYS {
            assert!(
                template.contains(&format!("\n{} = ", key)),
                "template is missing {}",
                key
            );
        }
    }
}
