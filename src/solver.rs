//! Finite volume solver
//!
//! The solver advects an oil field over the triangles of a [Mesh](crate::grid::Mesh) with an
//! explicit first order upwind scheme. The [Simulation] driver seeds or restores the field,
//! steps it in time and records how much oil is inside a region of interest.

pub mod checkpoint;
mod distribution;
mod driver;
mod flux;

pub use checkpoint::Checkpoint;
pub use distribution::{initial_oil_distribution, DECAY};
pub use driver::{RegionHistory, Simulation, SimulationOptions, SimulationState};
pub use flux::{calculate_change, edge_fluxes, flux_weight, FluxEngine, OilField};
