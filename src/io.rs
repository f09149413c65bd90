//! Reading meshes and writing results
//!
//! [gmsh::GmshReader] reads Gmsh `.msh` files into [RawMesh](crate::grid::RawMesh) data, and
//! [vtk::VtkWriter] writes snapshots of a simulation as legacy VTK files.

pub mod gmsh;
pub mod vtk;

pub use gmsh::GmshReader;
pub use vtk::VtkWriter;
