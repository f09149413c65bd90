//! Cell adjacency
//!
//! Two cells are neighbours if they share exactly two points. For triangles this means they
//! share an edge.

use crate::grid::Mesh;
use itertools::Itertools;

/// The points shared by two cells, in ascending order of point index
pub fn shared_points(a: &[usize], b: &[usize]) -> Vec<usize> {
    a.iter()
        .filter(|p| b.contains(p))
        .copied()
        .sorted_unstable()
        .dedup()
        .collect()
}

/// Find every other cell of the mesh that shares exactly two points with `cell`
///
/// This compares `cell` against every cell of the mesh. The neighbours are returned in
/// ascending order of cell index.
pub fn find_neighbors(mesh: &Mesh, cell: usize) -> Vec<usize> {
    let points = mesh.cell(cell).points();
    mesh.cells()
        .iter()
        .filter(|other| other.index() != cell)
        .filter(|other| shared_points(points, other.points()).len() == 2)
        .map(|other| other.index())
        .collect()
}

/// Index from each point to the cells that contain it
///
/// Building the index once makes neighbour queries independent of the size of the mesh.
#[derive(Debug, Clone)]
pub struct PointCellIndex {
    point_to_cells: Vec<Vec<usize>>,
}

impl PointCellIndex {
    /// Build the index for a mesh
    pub fn new(mesh: &Mesh) -> Self {
        let mut point_to_cells = vec![vec![]; mesh.points().len()];
        for cell in mesh.cells() {
            for p in cell.points().iter().unique() {
                point_to_cells[*p].push(cell.index());
            }
        }
        Self { point_to_cells }
    }

    /// The cells containing a point, in ascending order
    pub fn cells_of_point(&self, point: usize) -> &[usize] {
        &self.point_to_cells[point]
    }

    /// The neighbours of `cell`
    ///
    /// Gives the same result, in the same order, as [find_neighbors].
    pub fn neighbors(&self, mesh: &Mesh, cell: usize) -> Vec<usize> {
        mesh.cell(cell)
            .points()
            .iter()
            .unique()
            .flat_map(|p| self.point_to_cells[*p].iter().copied())
            .filter(|other| *other != cell)
            .counts()
            .into_iter()
            .filter(|(_, shared)| *shared == 2)
            .map(|(other, _)| other)
            .sorted_unstable()
            .collect()
    }
}
