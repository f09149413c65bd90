//! Command line front end
//!
//! Reads a TOML configuration, loads the Gmsh mesh it names, runs the simulation and writes the
//! results to `<output>/<config name>/`.

use anyhow::Context;
use clap::Parser;
use env_logger::{Builder, Target};
use glam::DVec2;
use log::{info, LevelFilter};
use oilflow::config::Config;
use oilflow::grid::{CellFactory, Mesh};
use oilflow::io::{GmshReader, VtkWriter};
use oilflow::solver::Simulation;
use std::fs::{create_dir_all, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

/// Simulate the spreading of oil over a triangular mesh
#[derive(Parser)]
#[command(name = "oilflow")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Finite volume oil advection on triangular meshes", long_about = None)]
struct Cli {
    /// Configuration file
    #[arg(short, long, default_value = "input.toml")]
    config: PathBuf,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, default_value = "info", value_parser = clap::value_parser!(LevelFilter))]
    log_level: LevelFilter,

    /// Directory that results are written to
    #[arg(short, long, default_value = "results")]
    output: PathBuf,
}

fn init_logging(level: LevelFilter, log_file: Option<&Path>) -> anyhow::Result<()> {
    let mut builder = Builder::new();
    builder.filter_level(level);
    if let Some(path) = log_file {
        if let Some(dir) = path.parent() {
            create_dir_all(dir)?;
        }
        let file = File::create(path)
            .with_context(|| format!("Cannot create log file {}", path.display()))?;
        builder.target(Target::Pipe(Box::new(file)));
    }
    builder.try_init()?;
    Ok(())
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = Config::from_file(&cli.config)
        .with_context(|| format!("Cannot read configuration {}", cli.config.display()))?;
    let log_file = config
        .io
        .log_name
        .as_ref()
        .map(|name| Path::new("logs").join(format!("{name}.log")));
    init_logging(cli.log_level, log_file.as_deref())?;

    let name = cli
        .config
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| String::from("default_experiment"));
    let experiment = cli.output.join(&name);
    create_dir_all(&experiment)
        .with_context(|| format!("Cannot create {}", experiment.display()))?;
    info!("Writing results to {}", experiment.display());

    let reader = GmshReader::new(&config.geometry.mesh_name);
    let mesh = Mesh::from_source(&reader, &CellFactory::default())
        .with_context(|| format!("Cannot read mesh {}", reader.path().display()))?;

    let checkpoint = experiment.join(format!("{name}_restart.txt"));
    let mut simulation = Simulation::new(mesh, config.simulation_options(Some(checkpoint)))?;
    simulation.compute_geometry()?;
    match &config.io.restart_file {
        Some(path) => simulation
            .restore(path)
            .with_context(|| format!("Cannot restart from {}", path.display()))?,
        None => simulation.seed(DVec2::from(config.geometry.oil_spill_center))?,
    }

    let mut writer = VtkWriter::new(experiment.join("images"))?;
    let history = simulation.run(&mut writer)?;

    let csv = experiment.join("region_history.csv");
    let mut out = BufWriter::new(File::create(&csv)?);
    history.write_csv(&mut out)?;
    out.flush()?;
    info!(
        "Finished at time {}; wrote {} snapshots and {}",
        simulation.current_time(),
        writer.written().len(),
        csv.display()
    );
    Ok(())
}
