//! Visualisation snapshots

use crate::grid::Mesh;
use crate::types::Result;
use std::collections::BTreeSet;

/// The state of a simulation at one output step
pub struct Snapshot<'a> {
    /// The mesh
    pub mesh: &'a Mesh,
    /// Oil amount of every cell, indexed by cell index
    pub oil_amount: &'a [f64],
    /// Step number this snapshot was taken at
    pub step: usize,
    /// Simulation time
    pub time: f64,
    /// Cells in the region of interest
    pub region: &'a BTreeSet<usize>,
}

/// Consumer of snapshots, e.g. an image or VTK writer
pub trait SnapshotWriter {
    /// Write one snapshot
    fn write_snapshot(&mut self, snapshot: &Snapshot<'_>) -> Result<()>;
}

/// A snapshot writer that discards everything
#[derive(Debug, Default, Clone, Copy)]
pub struct NoSnapshots;

impl SnapshotWriter for NoSnapshots {
    fn write_snapshot(&mut self, _snapshot: &Snapshot<'_>) -> Result<()> {
        Ok(())
    }
}
