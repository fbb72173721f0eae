//! laser-combine CLI
//!
//! Entry point for the `laser-combine` command-line tool.

use clap::{Args, Parser, Subcommand};
use laser_combine::config::schema::Domain;
use laser_combine::config::{
    config_template, ConfigError, ConfigLayer, ConfigLocator, MachineOrigin, Unit,
};
use laser_combine::{combine, default_output, CombineConfig, CombineError, CommandGenerator};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::process;
use std::str::FromStr;
use tracing::debug;

#[derive(Parser)]
#[command(name = "laser-combine")]
#[command(about = "Combine engrave and cut layers into one laser G-code program", version)]
struct Cli {
    /// Show debug output
    #[arg(long, short = 'v', global = true, conflicts_with = "quiet")]
    verbose: bool,

    /// Only show warnings and errors
    #[arg(long, short = 'q', global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Convert a drawing into a combined engrave + cut program
    Combine(CombineArgs),

    /// Print a starter config file listing every key at its default
    ConfigTemplate {
        /// Write to this path instead of stdout
        #[arg(long, short = 'o')]
        output: Option<PathBuf>,

        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },

    /// Locate, parse, and validate a config file
    ValidateConfig {
        /// Config file (default: ./laser-combine.toml, then $LASER_COMBINE_CONFIG)
        path: Option<PathBuf>,
    },
}

#[derive(Args)]
struct CombineArgs {
    /// Input drawing (SVG)
    drawing: PathBuf,

    /// Output G-code file (default: drawing with .gcode extension)
    #[arg(long, short = 'o')]
    output: Option<PathBuf>,

    /// Config file (default: ./laser-combine.toml, then $LASER_COMBINE_CONFIG)
    #[arg(long, short = 'c')]
    config: Option<PathBuf>,

    /// Layer converter program
    #[arg(long, env = "LASER_COMBINE_GENERATOR", default_value = laser_combine::generator::DEFAULT_GENERATOR)]
    generator: String,

    /// Extra argument passed to the converter (repeatable)
    #[arg(long = "generator-arg", allow_hyphen_values = true)]
    generator_args: Vec<String>,

    /// Print the report as JSON
    #[arg(long)]
    json: bool,

    /// Engrave layer name in the drawing (case-sensitive)
    #[arg(long)]
    engrave_layer: Option<String>,

    /// Cut layer name in the drawing (case-sensitive)
    #[arg(long)]
    cut_layer: Option<String>,

    /// Travel speed for both layers (unit/min)
    #[arg(long)]
    travel_speed: Option<f64>,

    /// Engrave layer cutting speed (unit/min)
    #[arg(long)]
    engrave_cutting_speed: Option<f64>,

    /// Engrave layer power (0-255)
    #[arg(long, allow_hyphen_values = true)]
    engrave_power: Option<i64>,

    /// Cut layer cutting speed (unit/min)
    #[arg(long)]
    cut_cutting_speed: Option<f64>,

    /// Cut layer power (0-255)
    #[arg(long, allow_hyphen_values = true)]
    cut_power: Option<i64>,

    /// Unit of measurement (mm, in)
    #[arg(long)]
    unit: Option<String>,

    /// Number of passes
    #[arg(long, short = 'p', allow_hyphen_values = true)]
    passes: Option<i64>,

    /// Depth per pass (unit)
    #[arg(long)]
    pass_depth: Option<f64>,

    /// Dwell time before moving (ms)
    #[arg(long)]
    dwell_time: Option<f64>,

    /// Curve approximation tolerance
    #[arg(long)]
    approximation_tolerance: Option<f64>,

    /// Laser off command
    #[arg(long)]
    tool_off_command: Option<String>,

    /// Machine origin (bottom-left, center, top-left)
    #[arg(long)]
    machine_origin: Option<String>,

    /// Bed width (unit)
    #[arg(long)]
    bed_width: Option<f64>,

    /// Bed height (unit)
    #[arg(long)]
    bed_height: Option<f64>,

    /// X offset (unit)
    #[arg(long, allow_hyphen_values = true)]
    horizontal_offset: Option<f64>,

    /// Y offset (unit)
    #[arg(long, allow_hyphen_values = true)]
    vertical_offset: Option<f64>,

    /// Scaling factor
    #[arg(long)]
    scaling_factor: Option<f64>,

    /// Absolute Z-axis start position (unit)
    #[arg(long, allow_hyphen_values = true)]
    z_axis_start: Option<f64>,

    /// File with custom G-code header lines
    #[arg(long)]
    header_file: Option<PathBuf>,

    /// File with custom G-code footer lines
    #[arg(long)]
    footer_file: Option<PathBuf>,

    /// Zero machine coordinates (G92)
    #[arg(long, overrides_with = "no_zero_machine")]
    zero_machine: bool,
    #[arg(long, overrides_with = "zero_machine", hide = true)]
    no_zero_machine: bool,

    /// Invert the Y axis
    #[arg(long, overrides_with = "no_invert_y_axis")]
    invert_y_axis: bool,
    #[arg(long, overrides_with = "invert_y_axis", hide = true)]
    no_invert_y_axis: bool,

    /// Use the document size as bed size (--no-use-document-size to disable)
    #[arg(long, overrides_with = "no_use_document_size")]
    use_document_size: bool,
    #[arg(long, overrides_with = "use_document_size", hide = true)]
    no_use_document_size: bool,

    /// Set the Z-axis start position
    #[arg(long, overrides_with = "no_do_z_axis_start")]
    do_z_axis_start: bool,
    #[arg(long, overrides_with = "do_z_axis_start", hide = true)]
    no_do_z_axis_start: bool,

    /// Move to origin when done
    #[arg(long, overrides_with = "no_move_to_origin_end")]
    move_to_origin_end: bool,
    #[arg(long, overrides_with = "move_to_origin_end", hide = true)]
    no_move_to_origin_end: bool,

    /// Turn the laser off before the job (--no-do-laser-off-start to disable)
    #[arg(long, overrides_with = "no_do_laser_off_start")]
    do_laser_off_start: bool,
    #[arg(long, overrides_with = "do_laser_off_start", hide = true)]
    no_do_laser_off_start: bool,

    /// Turn the laser off after the job (--no-do-laser-off-end to disable)
    #[arg(long, overrides_with = "no_do_laser_off_end")]
    do_laser_off_end: bool,
    #[arg(long, overrides_with = "do_laser_off_end", hide = true)]
    no_do_laser_off_end: bool,
}

impl CombineArgs {
    /// The CLI tier: only flags actually passed are set.
    fn to_layer(&self) -> Result<ConfigLayer, CombineError> {
        Ok(ConfigLayer {
            travel_speed: self.travel_speed,
            engrave_layer: self.engrave_layer.clone(),
            engrave_cutting_speed: self.engrave_cutting_speed,
            engrave_power: power("engrave_power", self.engrave_power)?,
            cut_layer: self.cut_layer.clone(),
            cut_cutting_speed: self.cut_cutting_speed,
            cut_power: power("cut_power", self.cut_power)?,
            unit: choice("unit", self.unit.as_deref(), Domain::OneOf(Unit::VALUES))?,
            passes: pass_count(self.passes)?,
            pass_depth: self.pass_depth,
            dwell_time: self.dwell_time,
            approximation_tolerance: self.approximation_tolerance,
            tool_off_command: self.tool_off_command.clone(),
            machine_origin: choice(
                "machine_origin",
                self.machine_origin.as_deref(),
                Domain::OneOf(MachineOrigin::VALUES),
            )?,
            zero_machine: flag(self.zero_machine, self.no_zero_machine),
            invert_y_axis: flag(self.invert_y_axis, self.no_invert_y_axis),
            use_document_size: flag(self.use_document_size, self.no_use_document_size),
            bed_width: self.bed_width,
            bed_height: self.bed_height,
            horizontal_offset: self.horizontal_offset,
            vertical_offset: self.vertical_offset,
            scaling_factor: self.scaling_factor,
            z_axis_start: self.z_axis_start,
            do_z_axis_start: flag(self.do_z_axis_start, self.no_do_z_axis_start),
            move_to_origin_end: flag(self.move_to_origin_end, self.no_move_to_origin_end),
            do_laser_off_start: flag(self.do_laser_off_start, self.no_do_laser_off_start),
            do_laser_off_end: flag(self.do_laser_off_end, self.no_do_laser_off_end),
            header: self.header_file.as_deref().map(read_lines).transpose()?,
            footer: self.footer_file.as_deref().map(read_lines).transpose()?,
        })
    }
}

/// `--x` / `--no-x` pair to a tri-state
fn flag(on: bool, off: bool) -> Option<bool> {
    match (on, off) {
        (true, _) => Some(true),
        (_, true) => Some(false),
        _ => None,
    }
}

fn invalid(key: &str, domain: Domain) -> ConfigError {
    ConfigError::Invalid {
        key: key.to_string(),
        reason: domain.describe(),
    }
}

fn power(key: &str, value: Option<i64>) -> Result<Option<u8>, ConfigError> {
    value
        .map(|v| u8::try_from(v).map_err(|_| invalid(key, Domain::Power)))
        .transpose()
}

fn pass_count(value: Option<i64>) -> Result<Option<u32>, ConfigError> {
    value
        .map(|v| {
            u32::try_from(v)
                .ok()
                .filter(|passes| *passes >= 1)
                .ok_or_else(|| invalid("passes", Domain::PassCount))
        })
        .transpose()
}

fn choice<T: FromStr>(key: &str, value: Option<&str>, domain: Domain) -> Result<Option<T>, ConfigError> {
    value
        .map(|v| v.parse().map_err(|_| invalid(key, domain)))
        .transpose()
}

fn read_lines(path: &Path) -> Result<Vec<String>, CombineError> {
    let contents = fs::read_to_string(path).map_err(|source| CombineError::Io {
        action: "read",
        path: path.to_path_buf(),
        source,
    })?;
    Ok(contents.lines().map(str::to_string).collect())
}

fn main() {
    // Usage errors are fatal like any other; only help and version succeed
    let cli = Cli::try_parse().unwrap_or_else(|e| {
        let _ = e.print();
        process::exit(if e.use_stderr() { 1 } else { 0 });
    });
    init_tracing(cli.verbose, cli.quiet);

    match cli.command {
        Commands::Combine(args) => run_combine(args),
        Commands::ConfigTemplate { output, force } => run_config_template(output, force),
        Commands::ValidateConfig { path } => run_validate_config(path),
    }
}

fn init_tracing(verbose: bool, quiet: bool) {
    let filter = if verbose {
        "debug"
    } else if quiet {
        "warn"
    } else {
        "info"
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(filter)),
        )
        .with_target(false)
        .with_writer(io::stderr)
        .init();
}

fn run_combine(args: CombineArgs) {
    let report = match combine_drawing(&args) {
        Ok(report) => report,
        Err(e) => {
            eprintln!("Error: {}", e);
            process::exit(e.exit_code());
        }
    };

    if args.json {
        match report.to_json() {
            Ok(json) => println!("{}", json),
            Err(e) => {
                eprintln!("Error serializing output: {}", e);
                process::exit(1);
            }
        }
    } else {
        println!("{}", report.to_human());
    }
}

fn combine_drawing(args: &CombineArgs) -> Result<laser_combine::CombineReport, CombineError> {
    if !args.drawing.is_file() {
        return Err(CombineError::Io {
            action: "read drawing",
            path: args.drawing.clone(),
            source: io::Error::new(io::ErrorKind::NotFound, "no such file"),
        });
    }

    let locator = ConfigLocator::from_process().map_err(|source| CombineError::Io {
        action: "determine working directory",
        path: PathBuf::from("."),
        source,
    })?;
    let file = locator
        .load(args.config.as_deref())?
        .map(|parsed| parsed.validate())
        .transpose()?;
    let config = CombineConfig::resolve(file.as_ref(), &args.to_layer()?)?;
    if let Some(ref source) = config.source {
        debug!(path = %source.path.display(), origin = source.origin.as_str(), "using config file");
    }

    let output = args
        .output
        .clone()
        .unwrap_or_else(|| default_output(&args.drawing));
    let generator = CommandGenerator::new(args.generator.clone()).with_args(args.generator_args.iter().cloned());

    combine(&args.drawing, &output, &config, &generator)
}

fn run_config_template(output: Option<PathBuf>, force: bool) {
    let template = config_template();

    let Some(path) = output else {
        print!("{}", template);
        return;
    };

    if path.exists() && !force {
        eprintln!(
            "Error: {} already exists (use --force to overwrite)",
            path.display()
        );
        process::exit(1);
    }
    if let Err(e) = fs::write(&path, template) {
        eprintln!("Error writing {}: {}", path.display(), e);
        process::exit(1);
    }
    eprintln!("Wrote: {}", path.display());
}

fn run_validate_config(path: Option<PathBuf>) {
    let result = ConfigLocator::from_process()
        .map_err(|e| e.to_string())
        .and_then(|locator| locator.load(path.as_deref()).map_err(|e| e.to_string()))
        .and_then(|parsed| match parsed {
            Some(parsed) => parsed.validate().map(Some).map_err(|e| e.to_string()),
            None => Ok(None),
        });

    let file = match result {
        Ok(Some(file)) => file,
        Ok(None) => {
            println!("No config file found; built-in defaults apply");
            return;
        }
        Err(e) => {
            eprintln!("Config invalid: {}", e);
            process::exit(1);
        }
    };

    if let Some(ref source) = file.source {
        println!("Config: {} ({})", source.path.display(), source.origin.as_str());
    }
    if file.layers.is_empty() {
        println!("Layer sections: none");
    } else {
        println!("Layer sections:");
        for (name, section) in &file.layers {
            let speed = section
                .cutting_speed
                .map(|s| s.to_string())
                .unwrap_or_else(|| "-".to_string());
            let power = section
                .power
                .map(|p| p.to_string())
                .unwrap_or_else(|| "-".to_string());
            println!("  [{}] cutting_speed: {}, power: {}", name, speed, power);
        }
    }

    // Resolution also checks cross-field rules such as distinct layer names
    match CombineConfig::resolve(Some(&file), &ConfigLayer::default()) {
        Ok(config) => println!(
            "Config valid (engrave: '{}', cut: '{}')",
            config.engrave.name, config.cut.name
        ),
        Err(e) => {
            eprintln!("Config invalid: {}", e);
            process::exit(1);
        }
    }
}
