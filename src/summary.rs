//! Combine report
//!
//! What a successful run produced: which layers made it into the output,
//! line counts, and the recovered conditions worth telling the user about.

use std::fmt::{self, Write as _};
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::config::{LayerSettings, Unit};

/// What happened to the optional engrave layer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum EngraveOutcome {
    /// Engrave artifact is part of the output
    Included,
    /// Generation failed (layer missing or not convertible)
    Unavailable { reason: String },
    /// Layer converted to nothing but boilerplate
    Empty,
}

/// A recovered condition reported alongside a successful run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Warning {
    /// Engrave generation failed; output is cut only
    EngraveLayerUnavailable { layer: String, reason: String },
    /// Engrave layer produced no work; output is cut only
    EngraveLayerEmpty { layer: String },
}

impl fmt::Display for Warning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Warning::EngraveLayerUnavailable { layer, reason } => write!(
                f,
                "Engrave layer '{}' could not be generated ({}); continuing with cut only",
                layer, reason
            ),
            Warning::EngraveLayerEmpty { layer } => write!(
                f,
                "Engrave layer '{}' found but contains no paths to process; make sure its \
                 objects are converted to paths (in Inkscape: Path > Object to Path). \
                 Continuing with cut only",
                layer
            ),
        }
    }
}

/// Per-layer figures for the summary
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayerSummary {
    pub name: String,
    pub cutting_speed: f64,
    pub power: u8,

    /// Lines in the generated artifact
    pub lines: usize,

    /// Lines that cut or switch the laser on
    pub work_lines: usize,
}

impl LayerSummary {
    pub fn new(settings: &LayerSettings, artifact: &str) -> Self {
        Self {
            name: settings.name.clone(),
            cutting_speed: settings.cutting_speed,
            power: settings.power,
            lines: artifact.lines().count(),
            work_lines: laser_gcode::count_work_lines(artifact),
        }
    }
}

/// Result of a successful combine run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CombineReport {
    /// Where the combined program was written
    pub output: PathBuf,

    pub unit: Unit,

    pub engrave_outcome: EngraveOutcome,

    /// Present only when the engrave layer is in the output
    #[serde(skip_serializing_if = "Option::is_none")]
    pub engrave: Option<LayerSummary>,

    pub cut: LayerSummary,

    /// Lines in the combined output
    pub total_lines: usize,

    /// Recovered conditions, in the order they occurred
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<Warning>,
}

impl CombineReport {
    /// Whether the output contains the engrave section and separator banner
    pub fn has_engrave(&self) -> bool {
        self.engrave.is_some()
    }

    /// Serialize to JSON
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Human-readable summary
    pub fn to_human(&self) -> String {
        let rule = "==========================================";
        let mut out = String::new();

        let _ = writeln!(out, "{}", rule);
        let _ = writeln!(out, "Summary");
        let _ = writeln!(out, "{}", rule);
        let _ = writeln!(out, "Output file: {}", self.output.display());

        if let Some(ref engrave) = self.engrave {
            let _ = writeln!(
                out,
                "Engrave layer: {} lines (speed: {} {}/min, power: S{})",
                engrave.lines, engrave.cutting_speed, self.unit, engrave.power
            );
        }
        let _ = writeln!(
            out,
            "Cut layer:    {} lines (speed: {} {}/min, power: S{})",
            self.cut.lines, self.cut.cutting_speed, self.unit, self.cut.power
        );
        let _ = writeln!(out, "Total:        {} lines", self.total_lines);

        if !self.warnings.is_empty() {
            let _ = writeln!(out);
            let _ = writeln!(out, "Warnings:");
            for warning in &self.warnings {
                let _ = writeln!(out, "  - {}", warning);
            }
        }

        let _ = writeln!(out);
        let _ = write!(out, "The G-code file is ready for use with your laser cutter!");
        out
    }
}
