//! Finite volume geometry of triangle cells
//!
//! For every triangle the calculator computes, in this order: the neighbouring triangles, the
//! midpoint, the area, the velocity at the midpoint and the scaled outward normal of every edge
//! shared with a neighbour. Normals depend on both the neighbours and the midpoint.

use crate::grid::adjacency::{find_neighbors, shared_points, PointCellIndex};
use crate::grid::{CellGeometry, CellKind, Mesh};
use crate::traits::{ShearFlow, VelocityField};
use crate::types::{Error, Result};
use glam::DVec2;
use log::debug;
use std::time::Instant;

/// Compute the midpoint (centroid) of a set of points
pub fn midpoint(coords: &[DVec2]) -> DVec2 {
    coords.iter().fold(DVec2::ZERO, |acc, c| acc + *c) / coords.len() as f64
}

/// Compute the area of a triangle
///
/// Returns `None` if `coords` does not contain exactly three points.
pub fn triangle_area(coords: &[DVec2]) -> Option<f64> {
    if let [a, b, c] = coords {
        Some(0.5 * (*b - *a).perp_dot(*c - *a).abs())
    } else {
        None
    }
}

/// Compute the normal of the edge from `start` to `end`, scaled by the edge length
///
/// The normal is oriented to point away from `cell_midpoint`. Returns `None` for an edge of
/// zero length.
pub fn scaled_normal(start: DVec2, end: DVec2, cell_midpoint: DVec2) -> Option<DVec2> {
    let edge = end - start;
    if edge.length() == 0.0 {
        return None;
    }
    // The perpendicular of the edge already has the length of the edge.
    let normal = edge.perp();
    let edge_midpoint = 0.5 * (start + end);
    if (edge_midpoint - cell_midpoint).dot(normal) < 0.0 {
        Some(-normal)
    } else {
        Some(normal)
    }
}

/// Check if `point` lies in the closed triangle with vertices `coords`
///
/// The tolerance for points on an edge is relative to the size of the triangle.
pub fn point_in_triangle(point: DVec2, coords: &[DVec2]) -> bool {
    let [a, b, c] = match coords {
        [a, b, c] => [*a, *b, *c],
        _ => return false,
    };
    let d0 = (b - a).perp_dot(point - a);
    let d1 = (c - b).perp_dot(point - b);
    let d2 = (a - c).perp_dot(point - c);
    let eps = 1e-12 * (b - a).perp_dot(c - a).abs();
    let has_negative = d0 < -eps || d1 < -eps || d2 < -eps;
    let has_positive = d0 > eps || d1 > eps || d2 > eps;
    !(has_negative && has_positive)
}

impl Mesh {
    /// The area of a triangle cell
    pub fn area(&self, cell: usize) -> Result<f64> {
        let kind = self.cell(cell).kind();
        let area = triangle_area(&self.cell_coordinates(cell))
            .filter(|_| kind == CellKind::Triangle)
            .ok_or(Error::UnsupportedCellKind { cell, kind })?;
        if area == 0.0 {
            return Err(Error::DegenerateGeometry {
                cell,
                message: String::from("triangle has zero area"),
            });
        }
        Ok(area)
    }

    /// Compute the geometry of a triangle cell with the default [ShearFlow] velocity field
    pub fn calculate(&mut self, cell: usize) -> Result<()> {
        self.calculate_with(cell, &ShearFlow)
    }

    /// Compute the geometry of a triangle cell, sampling velocities from `field`
    ///
    /// Calling this again with unchanged topology yields identical results.
    pub fn calculate_with<V: VelocityField + ?Sized>(&mut self, cell: usize, field: &V) -> Result<()> {
        let neighbors = find_neighbors(self, cell);
        let geometry = self.cell_geometry(cell, neighbors, field)?;
        self.cell_mut(cell).set_geometry(geometry);
        Ok(())
    }

    /// Compute the geometry of every triangle with the default [ShearFlow] velocity field
    ///
    /// Returns the number of triangles.
    pub fn calculate_all(&mut self) -> Result<usize> {
        self.calculate_all_with(&ShearFlow)
    }

    /// Compute the geometry of every triangle, sampling velocities from `field`
    ///
    /// Uses a point to cell index, so the cost is linear in the number of cells.
    pub fn calculate_all_with<V: VelocityField + ?Sized>(&mut self, field: &V) -> Result<usize> {
        let start = Instant::now();
        let index = PointCellIndex::new(self);
        let triangles = self.triangle_indices();
        let mut geometries = Vec::with_capacity(triangles.len());
        for &cell in &triangles {
            let neighbors = index.neighbors(self, cell);
            geometries.push(self.cell_geometry(cell, neighbors, field)?);
        }
        for (&cell, geometry) in triangles.iter().zip(geometries) {
            self.cell_mut(cell).set_geometry(geometry);
        }
        debug!(
            "Computed geometry of {} triangles in {:?}",
            triangles.len(),
            start.elapsed()
        );
        Ok(triangles.len())
    }

    fn cell_geometry<V: VelocityField + ?Sized>(
        &self,
        cell: usize,
        neighbors: Vec<usize>,
        field: &V,
    ) -> Result<CellGeometry> {
        let kind = self.cell(cell).kind();
        if kind != CellKind::Triangle {
            return Err(Error::UnsupportedCellKind { cell, kind });
        }

        // Only triangles exchange oil; edges shared with line cells act as closed walls.
        let neighbors = neighbors
            .into_iter()
            .filter(|n| self.cell(*n).kind().supports_flux())
            .collect::<Vec<_>>();

        let midpoint = midpoint(&self.cell_coordinates(cell));
        let area = self.area(cell)?;
        let velocity = field.velocity(midpoint);

        let mut scaled_normals = Vec::with_capacity(neighbors.len());
        for n in &neighbors {
            let shared = shared_points(self.cell(cell).points(), self.cell(*n).points());
            let start = self.point(shared[0]).coords();
            let end = self.point(shared[1]).coords();
            scaled_normals.push(scaled_normal(start, end, midpoint).ok_or_else(|| {
                Error::DegenerateGeometry {
                    cell,
                    message: format!("zero length edge shared with cell {n}"),
                }
            })?);
        }

        Ok(CellGeometry {
            area,
            midpoint,
            velocity,
            neighbors,
            scaled_normals,
        })
    }
}
