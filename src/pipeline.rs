//! Combine pipeline
//!
//! Generates the engrave and cut artifacts for a drawing, inspects them, and
//! writes the combined program:
//! - Engrave is optional: any failure is recovered and recorded as a warning
//! - Cut is mandatory: a failed or empty cut layer aborts the run
//! - Temporary artifacts live next to the output and are removed on every
//!   exit path

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use tempfile::TempPath;
use thiserror::Error;
use tracing::{debug, info, warn};

use laser_gcode::{assemble, classify};

use crate::config::{CombineConfig, ConfigError, LayerRole};
use crate::generator::{ConversionSettings, GeneratorError, LayerGenerator};
use crate::summary::{CombineReport, EngraveOutcome, LayerSummary, Warning};

/// Pipeline errors
#[derive(Debug, Error)]
pub enum CombineError {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("failed to create temporary artifact in {}: {source}", dir.display())]
    TempFile {
        dir: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to generate cut layer '{layer}': {source}")]
    CutGenerationFailed {
        layer: String,
        #[source]
        source: GeneratorError,
    },

    #[error(
        "cut layer '{layer}' contains no paths to process\n\
         Make sure:\n  \
         1. The layer '{layer}' exists in the drawing\n  \
         2. Objects are converted to paths (in Inkscape: Path > Object to Path)\n  \
         3. Layer names match exactly (they are case-sensitive)\n  \
         4. The layer contains path elements, not only shapes or text"
    )]
    EmptyCutLayer { layer: String },

    #[error("failed to {action} {}: {source}", path.display())]
    Io {
        action: &'static str,
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl CombineError {
    /// Get the exit code for this error
    pub fn exit_code(&self) -> i32 {
        match self {
            CombineError::Config(_) => 1,
            CombineError::TempFile { .. } => 1,
            CombineError::CutGenerationFailed { .. } => 1,
            CombineError::EmptyCutLayer { .. } => 1,
            CombineError::Io { .. } => 1,
        }
    }
}

/// Result type for pipeline operations
pub type CombineResult<T> = Result<T, CombineError>;

/// Runs one combine over a resolved configuration
pub struct Combiner<'a> {
    config: &'a CombineConfig,
    generator: &'a dyn LayerGenerator,
}

impl<'a> Combiner<'a> {
    pub fn new(config: &'a CombineConfig, generator: &'a dyn LayerGenerator) -> Self {
        Self { config, generator }
    }

    /// Generate both layers from `drawing` and write the combined program to
    /// `output`.
    pub fn run(&self, drawing: &Path, output: &Path) -> CombineResult<CombineReport> {
        let dir = artifact_dir(output);
        let mut warnings = Vec::new();

        // Step 1: engrave (optional)
        let engrave = self.config.layer(LayerRole::Engrave);
        info!(
            "[1/3] Generating engrave layer '{}' (speed: {} {}/min, power: {}%)",
            engrave.name,
            engrave.cutting_speed,
            self.config.unit,
            engrave.power_percent()
        );
        let engrave_artifact = temp_artifact(&dir, LayerRole::Engrave)?;
        let (engrave_text, engrave_outcome) =
            match self.generate(drawing, LayerRole::Engrave, &engrave_artifact) {
                Ok(text) if classify(&text).is_empty() => (None, EngraveOutcome::Empty),
                Ok(text) => (Some(text), EngraveOutcome::Included),
                Err(reason) => (None, EngraveOutcome::Unavailable { reason }),
            };
        match engrave_outcome {
            EngraveOutcome::Included => {}
            EngraveOutcome::Empty => warnings.push(Warning::EngraveLayerEmpty {
                layer: engrave.name.clone(),
            }),
            EngraveOutcome::Unavailable { ref reason } => {
                warnings.push(Warning::EngraveLayerUnavailable {
                    layer: engrave.name.clone(),
                    reason: reason.clone(),
                })
            }
        }
        if let Some(warning) = warnings.last() {
            warn!("{}", warning);
        }
        drop(engrave_artifact);

        // Step 2: cut (mandatory)
        let cut = self.config.layer(LayerRole::Cut);
        info!(
            "[2/3] Generating cut layer '{}' (speed: {} {}/min, power: {}%)",
            cut.name,
            cut.cutting_speed,
            self.config.unit,
            cut.power_percent()
        );
        let cut_artifact = temp_artifact(&dir, LayerRole::Cut)?;
        let settings = ConversionSettings::for_layer(self.config, LayerRole::Cut);
        self.generator
            .generate(drawing, &settings, &cut_artifact)
            .map_err(|source| CombineError::CutGenerationFailed {
                layer: cut.name.clone(),
                source,
            })?;
        let cut_text = fs::read_to_string(&cut_artifact).map_err(|source| CombineError::Io {
            action: "read cut artifact",
            path: cut_artifact.to_path_buf(),
            source,
        })?;
        if classify(&cut_text).is_empty() {
            return Err(CombineError::EmptyCutLayer {
                layer: cut.name.clone(),
            });
        }

        // Step 3: assemble and write
        info!("[3/3] Combining layers into {}", output.display());
        let program = assemble(engrave_text.as_deref(), &cut_text);
        fs::write(output, program.render()).map_err(|source| CombineError::Io {
            action: "write output",
            path: output.to_path_buf(),
            source,
        })?;
        debug!(lines = program.line_count(), "combined program written");

        Ok(CombineReport {
            output: output.to_path_buf(),
            unit: self.config.unit,
            engrave_outcome,
            engrave: engrave_text
                .as_deref()
                .map(|text| LayerSummary::new(engrave, text)),
            cut: LayerSummary::new(cut, &cut_text),
            total_lines: program.line_count(),
            warnings,
        })
    }

    /// Generate one layer and read the artifact back. Errors are flattened to
    /// a message, since only the engrave pass recovers from them.
    fn generate(&self, drawing: &Path, role: LayerRole, artifact: &Path) -> Result<String, String> {
        let settings = ConversionSettings::for_layer(self.config, role);
        debug!(layer = %settings.layer_name, artifact = %artifact.display(), "invoking generator");

        self.generator
            .generate(drawing, &settings, artifact)
            .map_err(|e| e.to_string())?;
        fs::read_to_string(artifact)
            .map_err(|e| format!("failed to read {} artifact: {}", role, e))
    }
}

/// Combine `drawing` into `output` with the given configuration and generator
pub fn combine(
    drawing: &Path,
    output: &Path,
    config: &CombineConfig,
    generator: &dyn LayerGenerator,
) -> CombineResult<CombineReport> {
    Combiner::new(config, generator).run(drawing, output)
}

/// Default output path: the drawing with a `.gcode` extension
pub fn default_output(drawing: &Path) -> PathBuf {
    drawing.with_extension("gcode")
}

/// Directory the temporary artifacts are created in
fn artifact_dir(output: &Path) -> PathBuf {
    match output.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    }
}

/// Create a uniquely named, self-deleting artifact file
fn temp_artifact(dir: &Path, role: LayerRole) -> CombineResult<TempPath> {
    let prefix = format!(".{}-", role);
    tempfile::Builder::new()
        .prefix(&prefix)
        .suffix(".gcode")
        .tempfile_in(dir)
        .map(|file| file.into_temp_path())
        .map_err(|source| CombineError::TempFile {
            dir: dir.to_path_buf(),
            source,
        })
}
