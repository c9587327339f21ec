//! Runtime configuration for the CLI binary.
//!
//! A JSON config file can name the input image, the output artifacts, and
//! the full router parameter set; a handful of command-line flags override
//! the common knobs. Errors in this layer are plain strings surfaced by the
//! binary; the engine's typed errors are converted at the boundary.

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::export::PhysicalScale;
use crate::prep::PrepOptions;
use crate::router::RouterParams;

/// Artifact paths; `None` skips that artifact.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct OutputConfig {
    pub instructions_csv: Option<PathBuf>,
    pub instructions_txt: Option<PathBuf>,
    pub scheme_png: Option<PathBuf>,
    pub simulation_png: Option<PathBuf>,
    pub report_json: Option<PathBuf>,
    pub residual_png: Option<PathBuf>,
}

impl OutputConfig {
    /// Standard artifact set rooted in `dir`.
    pub fn default_artifacts(dir: &Path) -> Self {
        Self {
            instructions_csv: Some(dir.join("instructions.csv")),
            instructions_txt: None,
            scheme_png: Some(dir.join("nails_scheme.png")),
            simulation_png: Some(dir.join("drawing_simulation.png")),
            report_json: Some(dir.join("report.json")),
            residual_png: None,
        }
    }
}

/// Everything the binary needs for one run.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RuntimeConfig {
    pub input_path: PathBuf,
    #[serde(default)]
    pub prep: PrepOptions,
    #[serde(default)]
    pub router: RouterParams,
    #[serde(default)]
    pub scale: PhysicalScale,
    #[serde(default)]
    pub output: OutputConfig,
}

impl RuntimeConfig {
    fn for_input(input_path: PathBuf) -> Self {
        Self {
            input_path,
            prep: PrepOptions::default(),
            router: RouterParams::default(),
            scale: PhysicalScale::default(),
            output: OutputConfig::default_artifacts(Path::new(".")),
        }
    }
}

/// Load a JSON runtime configuration from disk.
pub fn load_config(path: &Path) -> Result<RuntimeConfig, String> {
    let contents = fs::read_to_string(path)
        .map_err(|e| format!("Failed to read config {}: {e}", path.display()))?;
    let config: RuntimeConfig = serde_json::from_str(&contents)
        .map_err(|e| format!("Failed to parse config {}: {e}", path.display()))?;
    Ok(config)
}

/// Parse the process arguments into a runtime configuration.
pub fn parse_cli(program: &str) -> Result<RuntimeConfig, String> {
    let args: Vec<String> = env::args().skip(1).collect();
    parse_args(program, &args)
}

/// Argument parsing proper, separated from `env::args` for tests.
pub fn parse_args(program: &str, args: &[String]) -> Result<RuntimeConfig, String> {
    let mut input: Option<PathBuf> = None;
    let mut config_path: Option<PathBuf> = None;
    let mut out_dir: Option<PathBuf> = None;
    let mut nails: Option<usize> = None;
    let mut steps: Option<usize> = None;
    let mut no_invert = false;

    let mut iter = args.iter();
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "-h" | "--help" => return Err(usage(program)),
            "--config" => {
                let value = iter.next().ok_or_else(|| usage(program))?;
                config_path = Some(PathBuf::from(value));
            }
            "--out-dir" => {
                let value = iter.next().ok_or_else(|| usage(program))?;
                out_dir = Some(PathBuf::from(value));
            }
            "--nails" => {
                let value = iter.next().ok_or_else(|| usage(program))?;
                nails = Some(
                    value
                        .parse()
                        .map_err(|_| format!("--nails expects an integer, got {value}"))?,
                );
            }
            "--steps" => {
                let value = iter.next().ok_or_else(|| usage(program))?;
                steps = Some(
                    value
                        .parse()
                        .map_err(|_| format!("--steps expects an integer, got {value}"))?,
                );
            }
            "--no-invert" => no_invert = true,
            other if other.starts_with('-') => {
                return Err(format!("Unknown flag {other}\n{}", usage(program)));
            }
            other => {
                if input.is_some() {
                    return Err(format!("Unexpected argument {other}\n{}", usage(program)));
                }
                input = Some(PathBuf::from(other));
            }
        }
    }

    let mut config = match config_path {
        Some(path) => load_config(&path)?,
        None => {
            let input = input.clone().ok_or_else(|| usage(program))?;
            RuntimeConfig::for_input(input)
        }
    };

    if let Some(input) = input {
        config.input_path = input;
    }
    if let Some(dir) = out_dir {
        config.output = OutputConfig::default_artifacts(&dir);
    }
    if let Some(n) = nails {
        config.router.layout.num_nails = n;
    }
    if let Some(n) = steps {
        config.router.max_steps = n;
    }
    if no_invert {
        config.prep.invert = false;
    }
    Ok(config)
}

fn usage(program: &str) -> String {
    format!(
        "Usage: {program} <input-image> [--config FILE] [--out-dir DIR] \
         [--nails N] [--steps N] [--no-invert]"
    )
}
