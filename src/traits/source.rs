//! Sources of raw mesh data

use crate::grid::RawMesh;
use crate::types::Result;

/// Something that can supply the points and per-kind connectivity of a mesh
///
/// The core does not care which file format is behind an implementation.
pub trait MeshSource {
    /// Read the raw mesh
    fn read_raw(&self) -> Result<RawMesh>;
}

impl MeshSource for RawMesh {
    fn read_raw(&self) -> Result<RawMesh> {
        Ok(self.clone())
    }
}
