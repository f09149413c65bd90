//! Mesh cells

use glam::DVec2;

/// The topological kind of a cell
///
/// The kind is decided once, from the number of points of the cell, when the cell is created.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CellKind {
    /// A single point
    Vertex,
    /// An edge between two points
    Line,
    /// A triangle
    Triangle,
}

impl CellKind {
    /// The number of points of a cell of this kind
    pub fn npoints(&self) -> usize {
        match self {
            CellKind::Vertex => 1,
            CellKind::Line => 2,
            CellKind::Triangle => 3,
        }
    }

    /// Whether cells of this kind take part in the finite volume computation
    pub fn supports_flux(&self) -> bool {
        matches!(self, CellKind::Triangle)
    }
}

/// Derived finite volume data of a triangle
///
/// `neighbors` and `scaled_normals` are parallel: `scaled_normals[i]` is the outward normal of
/// the edge shared with `neighbors[i]`, scaled by the length of that edge.
#[derive(Debug, Clone, PartialEq)]
pub struct CellGeometry {
    /// Area of the cell
    pub area: f64,
    /// Centroid of the cell's points
    pub midpoint: DVec2,
    /// Velocity sampled at the midpoint
    pub velocity: DVec2,
    /// Indices of cells sharing exactly two points with this cell, in ascending order
    pub neighbors: Vec<usize>,
    /// Outward edge normals scaled by edge length, one per neighbour
    pub scaled_normals: Vec<DVec2>,
}

/// A cell of a mesh
#[derive(Debug, Clone, PartialEq)]
pub struct Cell {
    index: usize,
    points: Vec<usize>,
    kind: CellKind,
    geometry: Option<CellGeometry>,
}

impl Cell {
    /// Create a cell
    ///
    /// `points` are indices into the point list of the mesh that owns the cell.
    pub fn new(index: usize, points: Vec<usize>, kind: CellKind) -> Self {
        Self {
            index,
            points,
            kind,
            geometry: None,
        }
    }

    /// The index of the cell, equal to its position in the mesh's cell list
    pub fn index(&self) -> usize {
        self.index
    }

    /// Indices of the points of the cell
    pub fn points(&self) -> &[usize] {
        &self.points
    }

    /// The kind of the cell
    pub fn kind(&self) -> CellKind {
        self.kind
    }

    /// Finite volume geometry, if it has been computed
    pub fn geometry(&self) -> Option<&CellGeometry> {
        self.geometry.as_ref()
    }

    pub(crate) fn set_geometry(&mut self, geometry: CellGeometry) {
        self.geometry = Some(geometry);
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_kind_npoints() {
        assert_eq!(CellKind::Vertex.npoints(), 1);
        assert_eq!(CellKind::Line.npoints(), 2);
        assert_eq!(CellKind::Triangle.npoints(), 3);
    }

    #[test]
    fn test_only_triangles_support_flux() {
        assert!(!CellKind::Vertex.supports_flux());
        assert!(!CellKind::Line.supports_flux());
        assert!(CellKind::Triangle.supports_flux());
    }

    #[test]
    fn test_new_cell_has_no_geometry() {
        let c = Cell::new(7, vec![0, 1, 2], CellKind::Triangle);
        assert_eq!(c.index(), 7);
        assert_eq!(c.points(), &[0, 1, 2]);
        assert!(c.geometry().is_none());
    }
}
