//! Mesh creation and storage
//!
//! A [Mesh] owns all points and cells of an unstructured 2D mesh. Cells are built from raw
//! connectivity by a [CellFactory], and triangles get their finite volume geometry (area,
//! midpoint, velocity, neighbours and scaled edge normals) from [Mesh::calculate].

pub mod adjacency;
mod cell;
mod factory;
pub mod geometry;
mod mesh;
mod point;
pub mod shapes;

pub use adjacency::{find_neighbors, PointCellIndex};
pub use cell::{Cell, CellGeometry, CellKind};
pub use factory::CellFactory;
pub use mesh::{CellBlock, Mesh, RawMesh};
pub use point::Point;
