//! Points

use glam::DVec2;

/// A point of the mesh
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point {
    index: usize,
    coords: DVec2,
}

impl Point {
    /// Create a point
    pub fn new(index: usize, coords: DVec2) -> Self {
        Self { index, coords }
    }

    /// The index of the point, equal to its position in the mesh's point list
    pub fn index(&self) -> usize {
        self.index
    }

    /// The coordinates of the point
    pub fn coords(&self) -> DVec2 {
        self.coords
    }
}
