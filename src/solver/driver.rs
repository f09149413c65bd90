//! Simulation driver

use crate::grid::Mesh;
use crate::solver::{initial_oil_distribution, Checkpoint, FluxEngine, OilField};
use crate::traits::{ShearFlow, Snapshot, SnapshotWriter, VelocityField};
use crate::types::{round_to, Error, Result};
use glam::DVec2;
use log::{debug, info, warn};
use std::collections::BTreeSet;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::Instant;

/// Decimal places that the timestep is rounded to
const DT_DECIMALS: i32 = 6;
/// Decimal places that the simulation time is rounded to after every step
const TIME_DECIMALS: i32 = 4;

/// The state of a [Simulation]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SimulationState {
    /// The mesh is loaded
    MeshLoaded,
    /// The geometry of every triangle has been computed
    GeometryComputed,
    /// The initial distribution has been seeded
    OilSeeded,
    /// The oil field has been restored from a checkpoint
    RestoredFromCheckpoint,
    /// Timesteps are being taken
    Stepping,
    /// The run is complete
    Finished,
}

/// Parameters of a simulation run
#[derive(Debug, Clone, PartialEq)]
pub struct SimulationOptions {
    /// Time at the start of the run
    pub start_time: f64,
    /// Time at the end of the run
    pub end_time: f64,
    /// Number of timesteps
    pub intervals: usize,
    /// A snapshot is written every `write_frequency` steps; 0 disables intermediate snapshots
    pub write_frequency: usize,
    /// The region of interest, as an x range and a y range
    pub fish_area: ([f64; 2], [f64; 2]),
    /// File the final checkpoint is written to
    pub checkpoint_path: Option<PathBuf>,
}

impl SimulationOptions {
    /// The length of a timestep
    pub fn dt(&self) -> f64 {
        round_to(
            (self.end_time - self.start_time) / self.intervals as f64,
            DT_DECIMALS,
        )
    }

    fn validate(&self) -> Result<()> {
        if self.intervals == 0 {
            return Err(Error::Config(String::from(
                "the number of intervals must be positive",
            )));
        }
        if self.end_time <= self.start_time {
            return Err(Error::Config(format!(
                "end time {} must be after start time {}",
                self.end_time, self.start_time
            )));
        }
        Ok(())
    }
}

/// Times closer than this are the same entry of a [RegionHistory]
const TIME_TOLERANCE: f64 = 1e-9;

/// Oil mass inside the region of interest, recorded after every step
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RegionHistory {
    entries: Vec<(f64, f64)>,
}

impl RegionHistory {
    /// Record the mass at a time
    ///
    /// Times are recorded in increasing order. Recording the latest time again replaces its mass.
    pub fn record(&mut self, time: f64, mass: f64) {
        match self.entries.last_mut() {
            Some(last) if (last.0 - time).abs() < TIME_TOLERANCE => last.1 = mass,
            _ => self.entries.push((time, mass)),
        }
    }

    /// The mass recorded at `time`
    pub fn get(&self, time: f64) -> Option<f64> {
        self.entries
            .iter()
            .find(|(t, _)| (t - time).abs() < TIME_TOLERANCE)
            .map(|(_, m)| *m)
    }

    /// All recorded `(time, mass)` pairs, in the order they were recorded
    pub fn entries(&self) -> &[(f64, f64)] {
        &self.entries
    }

    /// Number of recorded times
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if nothing has been recorded
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Write the history as CSV with the columns `time` and `oil_in_area`
    pub fn write_csv<W: Write>(&self, writer: &mut W) -> Result<()> {
        writeln!(writer, "time,oil_in_area")?;
        for (time, mass) in &self.entries {
            writeln!(writer, "{time},{mass}")?;
        }
        Ok(())
    }
}

/// An oil advection simulation on a mesh
///
/// The simulation moves through the states of [SimulationState]: the geometry is computed,
/// then the oil field is either seeded or restored, then [Simulation::run] takes every
/// timestep. Calling a method in the wrong state gives [Error::InvalidState].
pub struct Simulation {
    mesh: Mesh,
    options: SimulationOptions,
    field: OilField,
    region: BTreeSet<usize>,
    engine: Option<FluxEngine>,
    current_time: f64,
    state: SimulationState,
}

impl Simulation {
    /// Create a simulation on a loaded mesh
    pub fn new(mesh: Mesh, options: SimulationOptions) -> Result<Self> {
        options.validate()?;
        let field = OilField::new(mesh.cells().len());
        let current_time = options.start_time;
        info!(
            "Loaded mesh with {} points and {} cells",
            mesh.points().len(),
            mesh.cells().len()
        );
        Ok(Self {
            mesh,
            options,
            field,
            region: BTreeSet::new(),
            engine: None,
            current_time,
            state: SimulationState::MeshLoaded,
        })
    }

    /// The current state
    pub fn state(&self) -> SimulationState {
        self.state
    }

    /// The mesh
    pub fn mesh(&self) -> &Mesh {
        &self.mesh
    }

    /// The options
    pub fn options(&self) -> &SimulationOptions {
        &self.options
    }

    /// The oil field
    pub fn field(&self) -> &OilField {
        &self.field
    }

    /// Cells in the region of interest
    pub fn region(&self) -> &BTreeSet<usize> {
        &self.region
    }

    /// The simulation time
    pub fn current_time(&self) -> f64 {
        self.current_time
    }

    fn expect_state(&self, allowed: &[SimulationState], expected: &'static str) -> Result<()> {
        if allowed.contains(&self.state) {
            Ok(())
        } else {
            Err(Error::InvalidState {
                expected,
                found: self.state,
            })
        }
    }

    /// Compute the geometry of every triangle with the default [ShearFlow] velocity field
    pub fn compute_geometry(&mut self) -> Result<()> {
        self.compute_geometry_with(&ShearFlow)
    }

    /// Compute the geometry of every triangle, sampling velocities from `velocity`
    pub fn compute_geometry_with<V: VelocityField + ?Sized>(&mut self, velocity: &V) -> Result<()> {
        self.expect_state(&[SimulationState::MeshLoaded], "MeshLoaded")?;
        let ntriangles = self.mesh.calculate_all_with(velocity)?;
        self.engine = Some(FluxEngine::new(&self.mesh));
        let (x_range, y_range) = self.options.fish_area;
        self.region = self.mesh.cells_within_area(x_range, y_range);
        info!(
            "Computed geometry of {ntriangles} triangles; {} cells in the region of interest",
            self.region.len()
        );
        self.state = SimulationState::GeometryComputed;
        Ok(())
    }

    /// Seed the oil field with a Gaussian bump centred at `start_point`
    ///
    /// Fails with [Error::PointNotInMesh] if no triangle contains `start_point`.
    pub fn seed(&mut self, start_point: DVec2) -> Result<()> {
        self.expect_state(&[SimulationState::GeometryComputed], "GeometryComputed")?;
        if self.mesh.locate_point(start_point).is_none() {
            return Err(Error::PointNotInMesh { point: start_point });
        }
        initial_oil_distribution(&self.mesh, &mut self.field, start_point);
        info!(
            "Seeded oil at ({}, {}), total amount {}",
            start_point.x,
            start_point.y,
            self.field.total()
        );
        self.state = SimulationState::OilSeeded;
        Ok(())
    }

    /// Restore the oil field from a checkpoint file
    pub fn restore(&mut self, path: &Path) -> Result<()> {
        self.expect_state(&[SimulationState::GeometryComputed], "GeometryComputed")?;
        let checkpoint = Checkpoint::read_from_file(path)?;
        self.restore_from(&checkpoint)?;
        info!("Restarting from {} ({})", checkpoint.time, path.display());
        Ok(())
    }

    /// Restore the oil field from a parsed checkpoint
    ///
    /// Fails with [Error::InvalidCheckpoint] if the checkpoint was written after the end time of
    /// this run or lists a cell that does not exist. On failure the oil field is unchanged.
    pub fn restore_from(&mut self, checkpoint: &Checkpoint) -> Result<()> {
        self.expect_state(&[SimulationState::GeometryComputed], "GeometryComputed")?;
        if checkpoint.time > self.options.end_time {
            return Err(Error::InvalidCheckpoint {
                line: 1,
                message: format!(
                    "checkpoint time {} is after the end time {}",
                    checkpoint.time, self.options.end_time
                ),
            });
        }
        if (checkpoint.time - self.options.start_time).abs() > TIME_TOLERANCE {
            warn!(
                "Checkpoint was written at time {} but the run starts at {}",
                checkpoint.time, self.options.start_time
            );
        }
        checkpoint.apply(&mut self.field)?;
        self.state = SimulationState::RestoredFromCheckpoint;
        Ok(())
    }

    fn snapshot<W: SnapshotWriter + ?Sized>(&self, writer: &mut W, step: usize) -> Result<()> {
        debug!("Writing snapshot {step} at time {}", self.current_time);
        writer.write_snapshot(&Snapshot {
            mesh: &self.mesh,
            oil_amount: self.field.amount(),
            step,
            time: self.current_time,
            region: &self.region,
        })
    }

    /// Take every timestep and return the oil mass in the region of interest over time
    ///
    /// After the last step a final snapshot is written and, if a checkpoint path is set, a
    /// checkpoint with the end time.
    pub fn run<W: SnapshotWriter + ?Sized>(&mut self, writer: &mut W) -> Result<RegionHistory> {
        self.expect_state(
            &[
                SimulationState::OilSeeded,
                SimulationState::RestoredFromCheckpoint,
            ],
            "OilSeeded or RestoredFromCheckpoint",
        )?;
        let engine = self.engine.take().ok_or(Error::InvalidState {
            expected: "GeometryComputed",
            found: self.state,
        })?;
        self.state = SimulationState::Stepping;

        let dt = self.options.dt();
        let intervals = self.options.intervals;
        let write_frequency = self.options.write_frequency;
        info!("Running {intervals} steps with dt = {dt}");
        let start = Instant::now();

        let mut history = RegionHistory::default();
        for step in 0..intervals {
            if write_frequency > 0 && step % write_frequency == 0 {
                self.snapshot(writer, step)?;
            }
            engine.step(&self.mesh, &mut self.field, dt)?;
            self.current_time = round_to(self.current_time + dt, TIME_DECIMALS);
            history.record(self.current_time, self.field.region_total(&self.region));
        }
        self.engine = Some(engine);
        debug!("Took {intervals} steps in {:?}", start.elapsed());

        self.snapshot(writer, intervals)?;
        if let Some(path) = &self.options.checkpoint_path {
            Checkpoint::from_field(self.options.end_time, &self.field).write_to_file(path)?;
            info!("Wrote checkpoint to {}", path.display());
        }
        self.state = SimulationState::Finished;
        Ok(history)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::grid::shapes::{screen_triangles, unit_square_fan};
    use approx::assert_relative_eq;
    use tempfile::tempdir;

    fn options(intervals: usize) -> SimulationOptions {
        SimulationOptions {
            start_time: 0.0,
            end_time: 1.0,
            intervals,
            write_frequency: 0,
            fish_area: ([0.0, 0.5], [0.0, 0.5]),
            checkpoint_path: None,
        }
    }

    #[derive(Default)]
    struct RecordSteps(Vec<(usize, f64)>);

    impl SnapshotWriter for RecordSteps {
        fn write_snapshot(&mut self, snapshot: &Snapshot<'_>) -> Result<()> {
            self.0.push((snapshot.step, snapshot.time));
            Ok(())
        }
    }

    #[test]
    fn test_dt_is_rounded() {
        let mut o = options(3);
        assert_eq!(o.dt(), 0.333333);
        o.intervals = 4;
        assert_eq!(o.dt(), 0.25);
    }

    #[test]
    fn test_invalid_options() {
        assert!(matches!(
            Simulation::new(unit_square_fan(), options(0)),
            Err(Error::Config(_))
        ));
        let mut o = options(1);
        o.end_time = 0.0;
        assert!(Simulation::new(unit_square_fan(), o).is_err());
    }

    #[test]
    fn test_state_transitions() {
        let mut sim = Simulation::new(unit_square_fan(), options(2)).unwrap();
        assert_eq!(sim.state(), SimulationState::MeshLoaded);
        sim.compute_geometry().unwrap();
        assert_eq!(sim.state(), SimulationState::GeometryComputed);
        sim.seed(DVec2::new(0.5, 0.5)).unwrap();
        assert_eq!(sim.state(), SimulationState::OilSeeded);
        sim.run(&mut crate::traits::NoSnapshots).unwrap();
        assert_eq!(sim.state(), SimulationState::Finished);
    }

    #[test]
    fn test_out_of_order_calls() {
        let mut sim = Simulation::new(unit_square_fan(), options(1)).unwrap();
        assert!(matches!(
            sim.seed(DVec2::new(0.5, 0.5)),
            Err(Error::InvalidState {
                found: SimulationState::MeshLoaded,
                ..
            })
        ));
        assert!(sim.run(&mut crate::traits::NoSnapshots).is_err());
        sim.compute_geometry().unwrap();
        assert!(matches!(
            sim.compute_geometry(),
            Err(Error::InvalidState {
                found: SimulationState::GeometryComputed,
                ..
            })
        ));
        assert!(sim.run(&mut crate::traits::NoSnapshots).is_err());
        sim.seed(DVec2::new(0.5, 0.5)).unwrap();
        sim.run(&mut crate::traits::NoSnapshots).unwrap();
        assert!(matches!(
            sim.run(&mut crate::traits::NoSnapshots),
            Err(Error::InvalidState {
                found: SimulationState::Finished,
                ..
            })
        ));
    }

    #[test]
    fn test_seed_outside_mesh() {
        let mut sim = Simulation::new(unit_square_fan(), options(1)).unwrap();
        sim.compute_geometry().unwrap();
        match sim.seed(DVec2::new(5.0, 5.0)) {
            Err(Error::PointNotInMesh { point }) => assert_eq!(point, DVec2::splat(5.0)),
            _ => panic!("Expected PointNotInMesh"),
        }
        assert_eq!(sim.state(), SimulationState::GeometryComputed);
    }

    #[test]
    fn test_history_times() {
        let mut sim = Simulation::new(screen_triangles(4), options(10)).unwrap();
        sim.compute_geometry().unwrap();
        sim.seed(DVec2::new(0.3, 0.3)).unwrap();
        let history = sim.run(&mut crate::traits::NoSnapshots).unwrap();
        assert_eq!(history.len(), 10);
        let times = history.entries().iter().map(|(t, _)| *t).collect::<Vec<_>>();
        assert_eq!(
            times,
            vec![0.1, 0.2, 0.3, 0.4, 0.5, 0.6, 0.7, 0.8, 0.9, 1.0]
        );
        assert_eq!(sim.current_time(), 1.0);
        assert!(history.get(0.3).is_some());
        assert!(history.get(1.1).is_none());
    }

    #[test]
    fn test_snapshot_steps() {
        let mut o = options(10);
        o.write_frequency = 3;
        let mut sim = Simulation::new(screen_triangles(2), o).unwrap();
        sim.compute_geometry().unwrap();
        sim.seed(DVec2::new(0.5, 0.5)).unwrap();
        let mut writer = RecordSteps::default();
        sim.run(&mut writer).unwrap();
        let steps = writer.0.iter().map(|(s, _)| *s).collect::<Vec<_>>();
        assert_eq!(steps, vec![0, 3, 6, 9, 10]);
        assert_eq!(writer.0[0].1, 0.0);
        assert_eq!(writer.0[4].1, 1.0);
    }

    #[test]
    fn test_region_history_matches_field() {
        let mut sim = Simulation::new(screen_triangles(4), options(5)).unwrap();
        sim.compute_geometry().unwrap();
        sim.seed(DVec2::new(0.25, 0.25)).unwrap();
        let history = sim.run(&mut crate::traits::NoSnapshots).unwrap();
        let (_, last) = history.entries()[4];
        assert_relative_eq!(last, sim.field().region_total(sim.region()), epsilon = 1e-14);
        assert!(!sim.region().is_empty());
    }

    #[test]
    fn test_restore_after_end_time() {
        let mut sim = Simulation::new(unit_square_fan(), options(1)).unwrap();
        sim.compute_geometry().unwrap();
        let checkpoint = Checkpoint {
            time: 2.0,
            amounts: vec![(2, 1.0)],
        };
        assert!(matches!(
            sim.restore_from(&checkpoint),
            Err(Error::InvalidCheckpoint { line: 1, .. })
        ));
        assert_eq!(sim.state(), SimulationState::GeometryComputed);
    }

    #[test]
    fn test_failed_restore_leaves_field_unchanged() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("restart.txt");
        let mut o = options(1);
        o.checkpoint_path = Some(path.clone());
        let mut sim = Simulation::new(unit_square_fan(), o).unwrap();
        sim.compute_geometry().unwrap();
        let checkpoint = Checkpoint {
            time: 0.0,
            amounts: vec![(0, 7.0), (99, 1.0)],
        };
        assert!(matches!(
            sim.restore_from(&checkpoint),
            Err(Error::InvalidCheckpoint { line: 3, .. })
        ));
        assert_eq!(sim.state(), SimulationState::GeometryComputed);
        assert_eq!(sim.field().total(), 0.0);

        sim.seed(DVec2::splat(0.5)).unwrap();
        sim.run(&mut crate::traits::NoSnapshots).unwrap();
        assert_eq!(sim.field().amount()[0], 0.0);
        assert_eq!(sim.field().amount()[1], 0.0);
        let written = Checkpoint::read_from_file(&path).unwrap();
        assert_eq!(written.amounts[0], (0, 0.0));
        assert_eq!(written.amounts[1], (1, 0.0));
    }

    #[test]
    fn test_region_history_appends_in_order() {
        let mut history = RegionHistory::default();
        for step in 1..=1000 {
            history.record(round_to(step as f64 * 0.001, TIME_DECIMALS), step as f64);
        }
        assert_eq!(history.len(), 1000);
        assert_eq!(history.get(0.5), Some(500.0));
        assert_eq!(history.entries()[999], (1.0, 1000.0));
    }

    #[test]
    fn test_restore_skips_seeding() {
        let mut sim = Simulation::new(unit_square_fan(), options(1)).unwrap();
        sim.compute_geometry().unwrap();
        let checkpoint = Checkpoint {
            time: 0.0,
            amounts: vec![(0, 0.0), (1, 0.0), (2, 1.0), (3, 0.0), (4, 0.0), (5, 0.0)],
        };
        sim.restore_from(&checkpoint).unwrap();
        assert_eq!(sim.state(), SimulationState::RestoredFromCheckpoint);
        assert_eq!(sim.field().amount()[2], 1.0);
        assert_eq!(sim.field().total(), 1.0);
        assert!(sim.seed(DVec2::new(0.5, 0.5)).is_err());
    }

    #[test]
    fn test_checkpoint_written_at_end() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("restart.txt");
        let mut o = options(4);
        o.checkpoint_path = Some(path.clone());
        let mut sim = Simulation::new(unit_square_fan(), o).unwrap();
        sim.compute_geometry().unwrap();
        sim.seed(DVec2::new(0.5, 0.5)).unwrap();
        sim.run(&mut crate::traits::NoSnapshots).unwrap();

        let checkpoint = Checkpoint::read_from_file(&path).unwrap();
        assert_eq!(checkpoint.time, 1.0);
        assert_eq!(checkpoint.amounts.len(), 6);
        for (i, (index, amount)) in checkpoint.amounts.iter().enumerate() {
            assert_eq!(*index, i);
            assert_eq!(*amount, sim.field().amount()[i]);
        }
    }

    #[test]
    fn test_region_history_csv() {
        let mut history = RegionHistory::default();
        history.record(0.1, 0.5);
        history.record(0.2, 0.25);
        history.record(0.2 + 1e-12, 0.75);
        let mut out = vec![];
        history.write_csv(&mut out).unwrap();
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "time,oil_in_area\n0.1,0.5\n0.2,0.75\n"
        );
    }
}
