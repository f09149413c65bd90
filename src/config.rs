//! Run configuration
//!
//! A run is described by a TOML file:
//!
//! ```toml
//! [settings]
//! nSteps = 500
//! tStart = 0.0
//! tEnd = 0.5
//!
//! [geometry]
//! meshName = "meshes/bay.msh"
//! borders = [[0.0, 0.45], [0.0, 0.2]]
//! oilSpillCenter = [0.35, 0.45]
//!
//! [IO]
//! logName = "log"
//! writeFrequency = 10
//! restartFile = "input/solution.txt"
//! ```

use crate::solver::SimulationOptions;
use crate::types::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Time stepping settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Settings {
    /// Number of timesteps
    pub n_steps: usize,
    /// Start time
    #[serde(default)]
    pub t_start: f64,
    /// End time
    pub t_end: f64,
}

/// Mesh and region settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Geometry {
    /// Path of the Gmsh mesh file
    pub mesh_name: PathBuf,
    /// The region of interest, as an x range and a y range
    pub borders: [[f64; 2]; 2],
    /// Centre of the initial oil distribution
    #[serde(default = "default_oil_spill_center")]
    pub oil_spill_center: [f64; 2],
}

fn default_oil_spill_center() -> [f64; 2] {
    [0.35, 0.45]
}

/// Input and output settings
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InputOutput {
    /// Name of the log file, without extension
    #[serde(default)]
    pub log_name: Option<String>,
    /// A snapshot is written every `write_frequency` steps; 0 disables them
    #[serde(default)]
    pub write_frequency: usize,
    /// Checkpoint to restart from
    #[serde(default)]
    pub restart_file: Option<PathBuf>,
}

/// A complete run configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Time stepping
    pub settings: Settings,
    /// Mesh and region
    pub geometry: Geometry,
    /// Input and output
    #[serde(rename = "IO", default)]
    pub io: InputOutput,
}

impl Config {
    /// Parse and validate a configuration from TOML text
    pub fn from_toml(text: &str) -> Result<Self> {
        let config: Self = toml::from_str(text).map_err(|e| Error::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a configuration file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_toml(&text)
    }

    /// Check that the configuration describes a run that can be carried out
    pub fn validate(&self) -> Result<()> {
        if self.settings.n_steps == 0 {
            return Err(Error::Config(String::from("nSteps must be positive")));
        }
        if self.settings.t_end <= self.settings.t_start {
            return Err(Error::Config(format!(
                "tEnd ({}) must be greater than tStart ({})",
                self.settings.t_end, self.settings.t_start
            )));
        }
        for (axis, range) in ["x", "y"].iter().zip(&self.geometry.borders) {
            if range[0] >= range[1] {
                return Err(Error::Config(format!(
                    "the {axis} range of borders [{}, {}] is empty",
                    range[0], range[1]
                )));
            }
        }
        if self.settings.t_start > 0.0 && self.io.restart_file.is_none() {
            return Err(Error::Config(String::from(
                "a restartFile must be given when tStart is not 0",
            )));
        }
        Ok(())
    }

    /// Simulation options for this configuration
    pub fn simulation_options(&self, checkpoint_path: Option<PathBuf>) -> SimulationOptions {
        SimulationOptions {
            start_time: self.settings.t_start,
            end_time: self.settings.t_end,
            intervals: self.settings.n_steps,
            write_frequency: self.io.write_frequency,
            fish_area: (self.geometry.borders[0], self.geometry.borders[1]),
            checkpoint_path,
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    const EXAMPLE: &str = r#"
[settings]
nSteps = 500
tStart = 0.1
tEnd = 0.2

[geometry]
meshName = "meshes/bay.msh"
borders = [[0.0, 0.45], [0.0, 0.2]]

[IO]
logName = "log"
writeFrequency = 10
restartFile = "input/solution.txt"
"#;

    #[test]
    fn test_parse() {
        let config = Config::from_toml(EXAMPLE).unwrap();
        assert_eq!(config.settings.n_steps, 500);
        assert_eq!(config.settings.t_start, 0.1);
        assert_eq!(config.geometry.mesh_name, PathBuf::from("meshes/bay.msh"));
        assert_eq!(config.geometry.borders, [[0.0, 0.45], [0.0, 0.2]]);
        assert_eq!(config.geometry.oil_spill_center, [0.35, 0.45]);
        assert_eq!(config.io.log_name.as_deref(), Some("log"));
        assert_eq!(
            config.io.restart_file,
            Some(PathBuf::from("input/solution.txt"))
        );
    }

    #[test]
    fn test_io_table_is_optional() {
        let config = Config::from_toml(
            r#"
[settings]
nSteps = 10
tEnd = 1.0
[geometry]
meshName = "square.msh"
borders = [[0.0, 1.0], [0.0, 1.0]]
oilSpillCenter = [0.5, 0.5]
"#,
        )
        .unwrap();
        assert_eq!(config.io, InputOutput::default());
        assert_eq!(config.settings.t_start, 0.0);

        let options = config.simulation_options(None);
        assert_eq!(options.intervals, 10);
        assert_eq!(options.fish_area, ([0.0, 1.0], [0.0, 1.0]));
        assert_eq!(options.write_frequency, 0);
    }

    #[test]
    fn test_validation() {
        let bad = [
            EXAMPLE.replace("nSteps = 500", "nSteps = 0"),
            EXAMPLE.replace("tEnd = 0.2", "tEnd = 0.1"),
            EXAMPLE.replace("[0.0, 0.45]", "[0.45, 0.0]"),
            EXAMPLE.replace("restartFile = \"input/solution.txt\"", ""),
        ];
        for text in bad {
            assert!(matches!(Config::from_toml(&text), Err(Error::Config(_))));
        }
    }

    #[test]
    fn test_syntax_error() {
        assert!(matches!(
            Config::from_toml("[settings\nnSteps = 1"),
            Err(Error::Config(_))
        ));
    }

    #[test]
    fn test_from_file() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(EXAMPLE.as_bytes()).unwrap();
        let config = Config::from_file(file.path()).unwrap();
        assert_eq!(config.settings.t_end, 0.2);
    }
}
