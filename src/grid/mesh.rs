//! Mesh storage and spatial queries

use crate::grid::geometry::point_in_triangle;
use crate::grid::{Cell, CellFactory, CellKind, Point};
use crate::traits::MeshSource;
use crate::types::{Error, Result};
use glam::DVec2;
use log::{debug, warn};
use std::collections::BTreeSet;

/// A block of raw connectivity tuples that share a kind name
#[derive(Debug, Clone, PartialEq, Default)]
pub struct CellBlock {
    /// Name of the kind, such as "vertex", "line" or "triangle"
    pub kind_name: String,
    /// Tuples of indices into the point list
    pub connectivity: Vec<Vec<usize>>,
}

/// Raw mesh data, as supplied by a mesh reader
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RawMesh {
    /// Point coordinates
    pub points: Vec<[f64; 2]>,
    /// Connectivity blocks, in the order they are encountered
    pub blocks: Vec<CellBlock>,
}

impl RawMesh {
    /// Create raw mesh data with no cells
    pub fn new(points: Vec<[f64; 2]>) -> Self {
        Self {
            points,
            blocks: vec![],
        }
    }

    /// Append a block of connectivity tuples
    pub fn add_block(&mut self, kind_name: &str, connectivity: Vec<Vec<usize>>) {
        self.blocks.push(CellBlock {
            kind_name: kind_name.to_string(),
            connectivity,
        });
    }
}

/// An unstructured 2D mesh
///
/// The mesh owns its points and cells. The index of every point and cell is equal to its
/// position in [Mesh::points] and [Mesh::cells]. Topology is fixed once the mesh is created.
#[derive(Debug, Clone)]
pub struct Mesh {
    points: Vec<Point>,
    cells: Vec<Cell>,
}

impl Mesh {
    /// Create a mesh from raw data
    ///
    /// Tuples that the factory cannot turn into a cell, or that reference missing points, are
    /// skipped with a warning. Skipped tuples do not take up a cell index.
    pub fn new(raw: RawMesh, factory: &CellFactory) -> Self {
        let points = raw
            .points
            .iter()
            .enumerate()
            .map(|(i, c)| Point::new(i, DVec2::from(*c)))
            .collect::<Vec<_>>();

        let mut cells = vec![];
        let mut skipped = 0;
        for block in &raw.blocks {
            for tuple in &block.connectivity {
                match Self::create_cell(factory, cells.len(), tuple, points.len()) {
                    Ok(cell) => cells.push(cell),
                    Err(e) => {
                        warn!("Skipping {} element {:?}: {e}", block.kind_name, tuple);
                        skipped += 1;
                    }
                }
            }
        }
        debug!(
            "Created mesh with {} points and {} cells ({skipped} skipped)",
            points.len(),
            cells.len()
        );
        Self { points, cells }
    }

    /// Read raw data from a source and create a mesh
    pub fn from_source<S: MeshSource + ?Sized>(source: &S, factory: &CellFactory) -> Result<Self> {
        Ok(Self::new(source.read_raw()?, factory))
    }

    fn create_cell(
        factory: &CellFactory,
        index: usize,
        tuple: &[usize],
        npoints: usize,
    ) -> Result<Cell> {
        if let Some(p) = tuple.iter().find(|p| **p >= npoints) {
            return Err(Error::PointIndexOutOfRange { index: *p, npoints });
        }
        factory.create(index, tuple)
    }

    /// The cells of the mesh
    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    /// The points of the mesh
    pub fn points(&self) -> &[Point] {
        &self.points
    }

    /// The cell with index `index`
    pub fn cell(&self, index: usize) -> &Cell {
        &self.cells[index]
    }

    pub(crate) fn cell_mut(&mut self, index: usize) -> &mut Cell {
        &mut self.cells[index]
    }

    /// The point with index `index`
    pub fn point(&self, index: usize) -> &Point {
        &self.points[index]
    }

    /// The coordinates of the points of a cell
    pub fn cell_coordinates(&self, index: usize) -> Vec<DVec2> {
        self.cells[index]
            .points()
            .iter()
            .map(|p| self.points[*p].coords())
            .collect()
    }

    /// Indices of all triangle cells, in ascending order
    pub fn triangle_indices(&self) -> Vec<usize> {
        self.cells
            .iter()
            .filter(|c| c.kind() == CellKind::Triangle)
            .map(|c| c.index())
            .collect()
    }

    /// Lower left and upper right corners of the box containing every point
    ///
    /// Returns `None` for a mesh with no points.
    pub fn bounding_box(&self) -> Option<(DVec2, DVec2)> {
        let first = self.points.first()?.coords();
        Some(self.points.iter().fold((first, first), |(lo, hi), p| {
            (lo.min(p.coords()), hi.max(p.coords()))
        }))
    }

    /// Cells that have at least one point strictly inside the rectangle `x_range` by `y_range`
    pub fn cells_within_area(&self, x_range: [f64; 2], y_range: [f64; 2]) -> BTreeSet<usize> {
        let inside = |c: DVec2| {
            x_range[0] < c.x && c.x < x_range[1] && y_range[0] < c.y && c.y < y_range[1]
        };
        self.cells
            .iter()
            .filter(|cell| cell.points().iter().any(|p| inside(self.points[*p].coords())))
            .map(|cell| cell.index())
            .collect()
    }

    /// The first triangle that contains `point`, including its boundary
    pub fn locate_point(&self, point: DVec2) -> Option<usize> {
        self.cells
            .iter()
            .filter(|c| c.kind() == CellKind::Triangle)
            .find(|c| point_in_triangle(point, &self.cell_coordinates(c.index())))
            .map(|c| c.index())
    }
}
