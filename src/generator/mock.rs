//! Mock layer generator
//!
//! Scripted per layer name: a canned artifact, an absent layer, or a
//! conversion failure. Every call is recorded so tests can check what was
//! requested and in which order.

use std::collections::HashMap;
use std::fs;
use std::path::Path;
use std::sync::Mutex;

use super::{ConversionSettings, GeneratorError, LayerGenerator};

/// Scripted outcome for one layer
#[derive(Debug, Clone, PartialEq)]
pub enum MockLayer {
    /// Write this text as the artifact
    Artifact(String),
    /// Fail as if the layer were not in the drawing
    Absent,
    /// Fail with a conversion error
    Invalid(String),
}

/// In-process generator for tests
#[derive(Debug, Default)]
pub struct MockGenerator {
    layers: HashMap<String, MockLayer>,
    calls: Mutex<Vec<ConversionSettings>>,
}

impl MockGenerator {
    /// A generator for a drawing with no layers at all
    pub fn new() -> Self {
        Self::default()
    }

    /// Script a layer that converts to the given G-code text
    pub fn with_layer(mut self, name: impl Into<String>, artifact: impl Into<String>) -> Self {
        self.layers
            .insert(name.into(), MockLayer::Artifact(artifact.into()));
        self
    }

    /// Script a layer whose conversion fails
    pub fn with_invalid_layer(mut self, name: impl Into<String>, message: impl Into<String>) -> Self {
        self.layers
            .insert(name.into(), MockLayer::Invalid(message.into()));
        self
    }

    /// Settings of every call so far, in call order
    pub fn calls(&self) -> Vec<ConversionSettings> {
        self.calls
            .lock()
            .map(|calls| calls.clone())
            .unwrap_or_default()
    }

    /// Layer names requested so far, in call order
    pub fn requested_layers(&self) -> Vec<String> {
        self.calls().into_iter().map(|s| s.layer_name).collect()
    }
}

impl LayerGenerator for MockGenerator {
    fn generate(
        &self,
        _drawing: &Path,
        settings: &ConversionSettings,
        artifact: &Path,
    ) -> Result<(), GeneratorError> {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push(settings.clone());
        }

        let layer = settings.layer_name.as_str();
        match self.layers.get(layer).unwrap_or(&MockLayer::Absent) {
            MockLayer::Artifact(text) => {
                fs::write(artifact, text)?;
                Ok(())
            }
            MockLayer::Absent => Err(GeneratorError::LayerAbsent(layer.to_string())),
            MockLayer::Invalid(message) => Err(GeneratorError::GeometryInvalid {
                layer: layer.to_string(),
                message: message.clone(),
            }),
        }
    }
}
