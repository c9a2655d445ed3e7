use anyhow::{ensure, Context, Result};
use clap::{ArgAction, Parser, ValueEnum};
use config::{Config, Environment, File};
use nalgebra::Complex;
use ndarray::Array1;
use serde::Deserialize;
use std::env;
use std::fmt;
use std::path::{Path, PathBuf};

use crate::ellipsometer::{angle_sweep, Ellipsometer};
use crate::result::Sweep;
use crate::stack::{Film, Stack};


/// Inclusive, evenly spaced samples from `start` to `stop`.
#[derive(Debug, Clone, Copy, Deserialize, PartialEq)]
pub struct Range {
    pub start: f64,
    pub stop: f64,
    pub step: f64,
}

impl Range {
    pub fn samples(&self) -> Array1<f64> {
        // tolerate rounding in the division so that `stop` itself is kept
        let count = ((self.stop - self.start) / self.step + 1e-9).floor() as usize + 1;
        Array1::from_iter((0..count).map(|i| self.start + i as f64 * self.step))
    }

    fn validate(&self, name: &str) -> Result<()> {
        ensure!(
            self.start.is_finite() && self.stop.is_finite(),
            "{} range must be finite",
            name
        );
        ensure!(self.step > 0.0, "{} step must be greater than 0", name);
        ensure!(
            self.stop >= self.start,
            "{} stop must not be less than start",
            name
        );
        Ok(())
    }
}

/// One film as given in the configuration: complex index and thickness.
#[derive(Debug, Clone, Copy, Deserialize, PartialEq)]
pub struct FilmSettings {
    pub refr_index: Complex<f64>,
    pub thickness: f64,
}

impl FilmSettings {
    pub fn new(refr_index: Complex<f64>, thickness: f64) -> Self {
        Self {
            refr_index,
            thickness,
        }
    }
}

/// Incidence-angle scan at a single wavelength. Angles in degrees.
#[derive(Debug, Clone, Copy, Deserialize, PartialEq)]
pub struct AngleScan {
    pub angles: Range,
    pub wavelength: f64,
}

#[derive(Debug, Clone, Copy, Default, Deserialize, PartialEq, Eq, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Format {
    #[default]
    Table,
    Json,
}

/// Runtime configuration for the application.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct Settings {
    pub wavelengths: Range,
    /// Angle of incidence in the cover, in degrees
    pub incident_angle: f64,
    #[serde(default = "default_cover_refr_index")]
    pub cover_refr_index: Complex<f64>,
    #[serde(default)]
    pub films: Vec<FilmSettings>,
    pub substrate_refr_index: Complex<f64>,
    #[serde(default)]
    pub angle_scan: Option<AngleScan>,
    #[serde(default)]
    pub format: Format,
}

fn default_cover_refr_index() -> Complex<f64> {
    Complex::new(1.0, 0.0)
}

impl Settings {
    pub fn stack(&self) -> Result<Stack> {
        let films = self
            .films
            .iter()
            .map(|film| Film::new(film.refr_index, film.thickness))
            .collect();
        Ok(Stack::new(
            self.cover_refr_index,
            films,
            self.substrate_refr_index,
        )?)
    }

    /// Evaluates the configured stack, over incidence angle if an angle scan
    /// is configured and over wavelength otherwise.
    pub fn run(&self) -> Result<Sweep> {
        let stack = self.stack()?;
        let sweep = match &self.angle_scan {
            Some(scan) => {
                let angles = scan.angles.samples().mapv(f64::to_radians);
                angle_sweep(&stack, scan.wavelength, &angles)?
            }
            None => Ellipsometer::new(&stack, self.incident_angle.to_radians())
                .sweep(&self.wavelengths.samples())?,
        };
        Ok(sweep)
    }
}

/// Loads `config/default.toml` alone, without local, environment or command-line overrides.
pub fn load_default_config() -> Result<Settings> {
    let root = retrieve_project_root()?;
    let default_config_file = root.join("config/default.toml");

    let config: Settings = Config::builder()
        .add_source(File::from(default_config_file).required(true))
        .build()
        .context("Error loading configuration")?
        .try_deserialize()
        .context("Error deserializing configuration")?;

    validate_config(&config)?;

    Ok(config)
}

/// Loads the configuration in layers: `config/local.toml` if present (else
/// `config/default.toml`), then the file given with `--config`, then
/// `THINFILM_*` environment variables, then the command-line flags.
pub fn load_config_from(args: &CliArgs) -> Result<Settings> {
    let root = retrieve_project_root()?;

    let default_config_file = root.join("config/default.toml");
    let local_config = root.join("config/local.toml");

    let config_file = if local_config.exists() {
        tracing::info!("Using local configuration: {:?}", local_config);
        local_config
    } else {
        tracing::info!("Using default configuration: {:?}", default_config_file);
        default_config_file
    };

    let mut builder = Config::builder().add_source(File::from(config_file).required(true));
    if let Some(path) = &args.config {
        tracing::info!("Using configuration overrides: {:?}", path);
        builder = builder.add_source(File::from(path.as_path()).required(true));
    }

    let mut config: Settings = builder
        .add_source(Environment::with_prefix("thinfilm"))
        .build()
        .context("Error loading configuration")?
        .try_deserialize()
        .context("Error deserializing configuration")?;

    args.apply(&mut config);

    validate_config(&config)?;

    tracing::debug!("{:#?}", config);

    Ok(config)
}

/// Retrieve the project root directory.
/// This function tries to find the project root directory in different ways:
/// 1. If the CARGO_MANIFEST_DIR environment variable is set, use it.
/// 2. If the THINFILM_ROOT_DIR environment variable is set, use it.
/// 3. If the "config" subdirectory is found in the executable directory or any of its parents, use it.
pub fn retrieve_project_root() -> Result<PathBuf> {
    if let Ok(manifest_dir) = env::var("CARGO_MANIFEST_DIR") {
        return Ok(PathBuf::from(manifest_dir));
    }
    if let Ok(path) = env::var("THINFILM_ROOT_DIR") {
        return Ok(PathBuf::from(path));
    }

    let exe_path = env::current_exe().context("Failed to get current executable path")?;
    exe_path
        .ancestors()
        .skip(1)
        .find(|dir| dir.join("config").is_dir())
        .map(Path::to_path_buf)
        .context("Could not find project root directory")
}

fn validate_config(config: &Settings) -> Result<()> {
    config.wavelengths.validate("Wavelength")?;
    ensure!(
        config.wavelengths.start > 0.0,
        "Wavelengths must be greater than 0"
    );
    ensure!(
        (0.0..90.0).contains(&config.incident_angle),
        "Incident angle must be in [0, 90) degrees"
    );
    ensure!(
        config.cover_refr_index.im == 0.0 && config.cover_refr_index.re > 0.0,
        "Cover refractive index must be real and positive"
    );

    let indices = config
        .films
        .iter()
        .map(|film| film.refr_index)
        .chain(std::iter::once(config.substrate_refr_index));
    for n in indices {
        ensure!(
            n.re > 0.0 && n.im >= 0.0,
            "Refractive index {} must have a positive real part and a non-negative extinction coefficient",
            n
        );
    }
    for (i, film) in config.films.iter().enumerate() {
        ensure!(
            film.thickness.is_finite() && film.thickness >= 0.0,
            "Film {} thickness must be non-negative, got {}",
            i,
            film.thickness
        );
    }

    if let Some(scan) = &config.angle_scan {
        scan.angles.validate("Angle")?;
        ensure!(
            scan.angles.start >= 0.0 && scan.angles.stop < 90.0,
            "Scanned incident angles must be in [0, 90) degrees"
        );
        ensure!(
            scan.wavelength.is_finite() && scan.wavelength > 0.0,
            "Scan wavelength must be greater than 0"
        );
    }
    Ok(())
}

#[derive(Parser, Debug)]
#[command(version, about = "thinfilm - ellipsometry of stratified thin-film stacks")]
pub struct CliArgs {
    /// Additional configuration file, layered over the default or local configuration.
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Wavelength range in the length unit of the film thicknesses.
    /// Format: start stop step
    #[arg(short, long, num_args = 3, value_delimiter = ' ')]
    wavelengths: Option<Vec<f64>>,

    /// Angle of incidence in the cover, in degrees.
    #[arg(short, long)]
    aoi: Option<f64>,

    /// Refractive index of the cover medium.
    #[arg(long)]
    cover: Option<Complex<f64>>,

    /// Refractive index of the substrate, e.g. 3.8 or 3.8+0.01i.
    #[arg(long)]
    substrate: Option<Complex<f64>>,

    /// Films from the cover side down, separated by spaces.
    /// Format: n1,d1 n2,d2 ...
    #[arg(long, value_parser = parse_film, num_args = 1.., value_delimiter = ' ')]
    film: Option<Vec<FilmSettings>>,

    /// Scan the incidence angle instead of the wavelength (in degrees).
    /// Format: start stop step
    #[arg(long, num_args = 3, value_delimiter = ' ', requires = "at")]
    angles: Option<Vec<f64>>,

    /// Wavelength for the incidence-angle scan (must be used with --angles)
    #[arg(long, requires = "angles")]
    at: Option<f64>,

    /// Output format written to standard output.
    #[arg(long, value_enum)]
    format: Option<Format>,

    /// Increase log verbosity (-v debug, -vv trace).
    #[arg(short, long, action = ArgAction::Count)]
    pub verbose: u8,
}

impl CliArgs {
    /// Overrides the values in `config` with any flags that were given.
    pub fn apply(&self, config: &mut Settings) {
        if let Some(range) = self.wavelengths.as_deref().and_then(range_from) {
            config.wavelengths = range;
        }
        if let Some(aoi) = self.aoi {
            config.incident_angle = aoi;
        }
        if let Some(cover) = self.cover {
            config.cover_refr_index = cover;
        }
        if let Some(substrate) = self.substrate {
            config.substrate_refr_index = substrate;
        }
        if let Some(films) = &self.film {
            config.films = films.clone();
        }
        if let (Some(angles), Some(wavelength)) = (self.angles.as_deref().and_then(range_from), self.at) {
            config.angle_scan = Some(AngleScan { angles, wavelength });
        }
        if let Some(format) = self.format {
            config.format = format;
        }
    }
}

fn range_from(values: &[f64]) -> Option<Range> {
    match values {
        &[start, stop, step] => Some(Range { start, stop, step }),
        _ => None,
    }
}

/// Parse a film in the format "n,d", where n may be complex (e.g. "1.5+0.01i,100")
fn parse_film(s: &str) -> Result<FilmSettings, String> {
    let (n, d) = s
        .rsplit_once(',')
        .ok_or_else(|| format!("Invalid film format: '{}'. Expected 'n,d'", s))?;

    let refr_index = n
        .trim()
        .parse::<Complex<f64>>()
        .map_err(|_| format!("Failed to parse refractive index: {}", n))?;
    let thickness = d
        .trim()
        .parse::<f64>()
        .map_err(|_| format!("Failed to parse thickness: {}", d))?;

    Ok(FilmSettings::new(refr_index, thickness))
}

impl fmt::Display for Settings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Settings:
  - Wavelengths: {:.6} to {:.6} step {:.6}
  - Incident Angle: {:.6} deg
  - Cover Refractive Index: {:.6} + {:.6}i
  - Films: {}
  - Substrate Refractive Index: {:.6} + {:.6}i
  ",
            self.wavelengths.start,
            self.wavelengths.stop,
            self.wavelengths.step,
            self.incident_angle,
            self.cover_refr_index.re,
            self.cover_refr_index.im,
            self.films.len(),
            self.substrate_refr_index.re,
            self.substrate_refr_index.im,
        )
    }
}
