//! Upwind flux computation and the two phase update

use crate::grid::{CellKind, Mesh};
use crate::types::{Error, Result};
use glam::DVec2;
use itertools::izip;
use std::collections::BTreeSet;

/// Oil amounts and per step changes, indexed by cell index
#[derive(Debug, Clone, PartialEq)]
pub struct OilField {
    amount: Vec<f64>,
    change: Vec<f64>,
}

impl OilField {
    /// Create a field with no oil for a mesh with `ncells` cells
    pub fn new(ncells: usize) -> Self {
        Self {
            amount: vec![0.0; ncells],
            change: vec![0.0; ncells],
        }
    }

    /// Create a field from given amounts
    pub fn from_amounts(amount: Vec<f64>) -> Self {
        let change = vec![0.0; amount.len()];
        Self { amount, change }
    }

    /// Number of cells
    pub fn len(&self) -> usize {
        self.amount.len()
    }

    /// Check if the field has no cells
    pub fn is_empty(&self) -> bool {
        self.amount.is_empty()
    }

    /// Oil amount of every cell
    pub fn amount(&self) -> &[f64] {
        &self.amount
    }

    /// Mutable oil amount of every cell
    pub fn amount_mut(&mut self) -> &mut [f64] {
        &mut self.amount
    }

    /// Pending change of every cell
    pub fn change(&self) -> &[f64] {
        &self.change
    }

    /// Sum of the amounts of all cells
    pub fn total(&self) -> f64 {
        self.amount.iter().sum()
    }

    /// Sum of the amounts of the given cells
    pub fn region_total(&self, region: &BTreeSet<usize>) -> f64 {
        region.iter().map(|i| self.amount[*i]).sum()
    }

    /// Total mass: the amounts of the triangles weighted by their areas
    ///
    /// This is the quantity the flux update conserves on a closed mesh.
    pub fn mass(&self, mesh: &Mesh) -> f64 {
        mesh.cells()
            .iter()
            .filter_map(|c| c.geometry().map(|g| g.area * self.amount[c.index()]))
            .sum()
    }
}

/// Upwind flux weight
///
/// If `v . w` is positive, flow leaves the cell and the cell's own amount `a` is used,
/// otherwise the neighbour's amount `b` is used.
pub fn flux_weight(a: f64, b: f64, v: DVec2, w: DVec2) -> f64 {
    let d = v.dot(w);
    if d > 0.0 {
        a * d
    } else {
        b * d
    }
}

/// The outgoing flux through each edge that `cell` shares with a neighbour
///
/// The fluxes are in the order of the cell's neighbours. The flux through an edge computed
/// from either side of it differs only in sign.
pub fn edge_fluxes(mesh: &Mesh, cell: usize, amount: &[f64]) -> Result<Vec<f64>> {
    let c = mesh.cell(cell);
    let geometry = c
        .geometry()
        .filter(|_| c.kind() == CellKind::Triangle)
        .ok_or(Error::UnsupportedCellKind {
            cell,
            kind: c.kind(),
        })?;

    let mut fluxes = Vec::with_capacity(geometry.neighbors.len());
    for (neighbor, normal) in izip!(&geometry.neighbors, &geometry.scaled_normals) {
        let n = mesh.cell(*neighbor);
        let other = n.geometry().ok_or(Error::UnsupportedCellKind {
            cell: *neighbor,
            kind: n.kind(),
        })?;
        let v_mid = 0.5 * (geometry.velocity + other.velocity);
        fluxes.push(flux_weight(amount[cell], amount[*neighbor], *normal, v_mid));
    }
    Ok(fluxes)
}

/// The change of the oil amount of `cell` over a timestep `dt`
///
/// `amount` must hold the amounts from before the step for every cell.
pub fn calculate_change(mesh: &Mesh, cell: usize, amount: &[f64], dt: f64) -> Result<f64> {
    let area = mesh
        .cell(cell)
        .geometry()
        .map(|g| g.area)
        .ok_or(Error::UnsupportedCellKind {
            cell,
            kind: mesh.cell(cell).kind(),
        })?;
    Ok(edge_fluxes(mesh, cell, amount)?
        .iter()
        .map(|flux| -(dt / area) * flux)
        .sum())
}

/// Applies explicit timesteps to an [OilField]
#[derive(Debug, Clone)]
pub struct FluxEngine {
    cells: Vec<usize>,
}

impl FluxEngine {
    /// Create an engine for the triangles of `mesh`
    pub fn new(mesh: &Mesh) -> Self {
        Self {
            cells: mesh.triangle_indices(),
        }
    }

    /// The cells that the engine updates
    pub fn cells(&self) -> &[usize] {
        &self.cells
    }

    /// Advance `field` by one timestep of length `dt`
    ///
    /// All changes are computed from the amounts before the step, and only then applied.
    pub fn step(&self, mesh: &Mesh, field: &mut OilField, dt: f64) -> Result<()> {
        for &cell in &self.cells {
            field.change[cell] = calculate_change(mesh, cell, &field.amount, dt)?;
        }
        for &cell in &self.cells {
            field.amount[cell] += field.change[cell];
            field.change[cell] = 0.0;
        }
        Ok(())
    }
}
