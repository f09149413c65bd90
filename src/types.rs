//! Types specific to oilflow

use crate::grid::CellKind;
use glam::DVec2;

/// Error type
#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// A connectivity tuple has a length with no registered cell kind
    #[error("Unknown cell kind with {npoints} points")]
    UnknownCellKind {
        /// Length of the offending tuple
        npoints: usize,
    },
    /// A connectivity tuple references a point that does not exist
    #[error("Point index {index} out of range for a mesh with {npoints} points")]
    PointIndexOutOfRange {
        /// Referenced point index
        index: usize,
        /// Number of points in the mesh
        npoints: usize,
    },
    /// A triangle-only operation was requested on another kind of cell
    #[error("Operation not supported on cell {cell} of kind {kind:?}")]
    UnsupportedCellKind {
        /// Cell index
        cell: usize,
        /// Kind of the cell
        kind: CellKind,
    },
    /// The initial distribution centre is not inside any triangle
    #[error("Point ({}, {}) is not inside the mesh", .point.x, .point.y)]
    PointNotInMesh {
        /// The requested point
        point: DVec2,
    },
    /// A checkpoint file could not be used
    #[error("Invalid checkpoint (line {line}): {message}")]
    InvalidCheckpoint {
        /// Line number, starting at 1
        line: usize,
        /// Description
        message: String,
    },
    /// Zero length edge or zero area cell
    #[error("Degenerate geometry in cell {cell}: {message}")]
    DegenerateGeometry {
        /// Cell index
        cell: usize,
        /// Description
        message: String,
    },
    /// A simulation step was called out of order
    #[error("Simulation is in state {found:?}, expected {expected}")]
    InvalidState {
        /// Description of the states that would have been valid
        expected: &'static str,
        /// Current state
        found: crate::solver::SimulationState,
    },
    /// A mesh file could not be parsed
    #[error("Mesh format error (line {line}): {message}")]
    MeshFormat {
        /// Line number, starting at 1
        line: usize,
        /// Description
        message: String,
    },
    /// Invalid configuration
    #[error("Configuration error: {0}")]
    Config(String),
    /// A VTK file could not be written or read
    #[error("VTK error: {0}")]
    Vtk(#[from] vtkio::Error),
    /// IO error
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Result type
pub type Result<T> = std::result::Result<T, Error>;

/// Round `value` to `decimals` decimal places.
///
/// Simulation times are rounded after every step so that they can be used as keys.
pub fn round_to(value: f64, decimals: i32) -> f64 {
    let scale = 10f64.powi(decimals);
    (value * scale).round() / scale
}
