//! Shared fixtures: layer artifacts shaped like real converter output, and a
//! script-backed generator for end-to-end runs.

#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};

use laser_combine::CommandGenerator;

/// Engrave artifact with a laser-off footer and return to origin
pub const ENGRAVE: &str = "\
M5;
G90;
G21;
G0 X10 Y10;
M3 S75;
G1 X40 Y10 F1000;
G1 X40 Y40;
G1 X10 Y40;
M5;
G0 X0 Y0;
";

/// Cut artifact; its footer must survive into the combined output
pub const CUT: &str = "\
M5;
G90;
G21;
G0 X5 Y5;
M3 S255;
G1 X95 Y5 F250;
G2 X95 Y95 I0 J45;
G1 X5 Y95;
M5;

G0 X0 Y0;
";

/// What the converter emits for a layer holding only an unconverted shape
pub const BOILERPLATE_ONLY: &str = "\
M5;
G90;
G21;
G1 F1000;
M5;
G0 X0 Y0;
";

/// Drawing path that exists on disk
pub fn drawing(dir: &Path) -> PathBuf {
    let path = dir.join("drawing.svg");
    fs::write(&path, "<svg xmlns=\"http://www.w3.org/2000/svg\"/>\n").unwrap();
    path
}

/// Temporary artifacts left behind in `dir`
pub fn leftover_artifacts(dir: &Path) -> Vec<String> {
    fs::read_dir(dir)
        .unwrap()
        .map(|entry| entry.unwrap().file_name().to_string_lossy().into_owned())
        .filter(|name| name.starts_with('.') && name.ends_with(".gcode"))
        .collect()
}

/// A `sh` generator that copies `<layers_dir>/<layer>.gcode` to the artifact
/// path, exiting 3 when the layer file does not exist.
#[cfg(unix)]
pub fn script_generator(layers_dir: &Path, layers: &[(&str, &str)]) -> CommandGenerator {
    fs::create_dir_all(layers_dir).unwrap();
    for (name, text) in layers {
        fs::write(layers_dir.join(format!("{}.gcode", name)), text).unwrap();
    }
    CommandGenerator::new("sh").with_args(script_args(layers_dir))
}

/// Arguments that turn `sh` into the fixture generator
#[cfg(unix)]
pub fn script_args(layers_dir: &Path) -> Vec<String> {
    // $1=--layer $2=name $3=--output $4=artifact $5=drawing
    let script = format!(
        "f='{}'/\"$2\".gcode; [ -f \"$f\" ] || exit 3; cat \"$f\" > \"$4\"",
        layers_dir.display()
    );
    vec!["-c".to_string(), script, "sh".to_string()]
}
