//! Initial oil distribution

use crate::grid::Mesh;
use crate::solver::OilField;
use glam::DVec2;

/// Decay constant of the Gaussian initial distribution
pub const DECAY: f64 = 0.01;

/// Seed `field` with a Gaussian bump centred at `start_point`
///
/// Every cell with computed geometry gets `exp(-|midpoint - start_point|^2 / DECAY)`. Other
/// cells and the pending changes are not touched.
pub fn initial_oil_distribution(mesh: &Mesh, field: &mut OilField, start_point: DVec2) {
    let amount = field.amount_mut();
    for cell in mesh.cells() {
        if let Some(g) = cell.geometry() {
            let d = g.midpoint - start_point;
            amount[cell.index()] = (-d.length_squared() / DECAY).exp();
        }
    }
}
