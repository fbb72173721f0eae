//! External converter process
//!
//! Invocation: `<program> [args...] --layer <name> --output <artifact> <drawing>`
//! with the [`ConversionSettings`] as a single JSON line on stdin.
//!
//! Exit status 0 means the artifact was written. Exit status 3 means the
//! layer does not exist in the drawing. Any other failure is a conversion
//! error described on stderr.

use std::ffi::OsString;
use std::io::{self, Write};
use std::path::Path;
use std::process::{Command, Stdio};

use tracing::debug;

use super::{ConversionSettings, GeneratorError, LayerGenerator};

/// Exit status reserved for "layer not found"
pub const LAYER_ABSENT_EXIT_CODE: i32 = 3;

/// Program used when none is configured
pub const DEFAULT_GENERATOR: &str = "svg2gcode";

/// Environment variable naming the generator program
pub const GENERATOR_ENV_VAR: &str = "LASER_COMBINE_GENERATOR";

/// Runs an external program to convert each layer
#[derive(Debug, Clone)]
pub struct CommandGenerator {
    program: String,
    args: Vec<String>,
}

impl CommandGenerator {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
        }
    }

    /// Extra arguments placed before the standard ones
    pub fn with_args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    fn build_args(&self, drawing: &Path, layer: &str, artifact: &Path) -> Vec<OsString> {
        let mut args: Vec<OsString> = self.args.iter().map(OsString::from).collect();
        args.push("--layer".into());
        args.push(layer.into());
        args.push("--output".into());
        args.push(artifact.as_os_str().to_owned());
        args.push(drawing.as_os_str().to_owned());
        args
    }
}

impl Default for CommandGenerator {
    fn default() -> Self {
        Self::new(DEFAULT_GENERATOR)
    }
}

impl LayerGenerator for CommandGenerator {
    fn generate(
        &self,
        drawing: &Path,
        settings: &ConversionSettings,
        artifact: &Path,
    ) -> Result<(), GeneratorError> {
        let layer = settings.layer_name.as_str();
        let request = serde_json::to_string(settings)?;

        debug!(program = %self.program, layer, artifact = %artifact.display(), "running layer generator");

        let mut child = Command::new(&self.program)
            .args(self.build_args(drawing, layer, artifact))
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| GeneratorError::Spawn {
                program: self.program.clone(),
                source: e,
            })?;

        // The program may exit without reading its settings
        if let Some(mut stdin) = child.stdin.take() {
            if let Err(e) = writeln!(stdin, "{}", request) {
                if e.kind() != io::ErrorKind::BrokenPipe {
                    return Err(e.into());
                }
            }
        }

        let output = child.wait_with_output()?;
        if output.status.success() {
            return Ok(());
        }

        let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
        debug!(layer, status = %output.status, stderr = %stderr, "layer generator failed");

        match output.status.code() {
            Some(LAYER_ABSENT_EXIT_CODE) => Err(GeneratorError::LayerAbsent(layer.to_string())),
            _ => Err(GeneratorError::GeometryInvalid {
                layer: layer.to_string(),
                message: if stderr.is_empty() {
                    format!("generator exited with {}", output.status)
                } else {
                    stderr
                },
            }),
        }
    }
}
