//! laser-combine - engrave + cut in one laser program
//!
//! This crate turns a layered drawing into a single G-code program for a
//! laser cutter: the engrave layer runs first, the cut layer last, with a
//! separator banner between them. Layer conversion is delegated to an
//! external generator; settings come from a four-tier configuration
//! (built-in defaults, config file global table, config file layer sections,
//! command-line flags).

pub mod config;
pub mod generator;
pub mod pipeline;
pub mod summary;

pub use config::{CombineConfig, ConfigError, ConfigFile, ConfigLayer, ConfigLocator};
pub use generator::{CommandGenerator, ConversionSettings, GeneratorError, LayerGenerator, MockGenerator};
pub use pipeline::{combine, default_output, CombineError, CombineResult, Combiner};
pub use summary::{CombineReport, EngraveOutcome, LayerSummary, Warning};
