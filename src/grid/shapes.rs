//! Small meshes of simple shapes

use crate::grid::{CellFactory, Mesh, RawMesh};

/// Create a mesh containing the single triangle (0, 0), (1, 0), (0, 1)
pub fn single_triangle() -> Mesh {
    let mut raw = RawMesh::new(vec![[0.0, 0.0], [1.0, 0.0], [0.0, 1.0]]);
    raw.add_block("triangle", vec![vec![0, 1, 2]]);
    Mesh::new(raw, &CellFactory::default())
}

/// Create a mesh of the unit square split into four triangles around its centre
///
/// The points are the corners (0, 0), (1, 0), (1, 1), (0, 1) and the centre. Cells 0 and 1 are
/// the boundary lines along the bottom and top of the square, cells 2 to 5 are the triangles,
/// starting from the bottom one and going anticlockwise.
pub fn unit_square_fan() -> Mesh {
    let mut raw = RawMesh::new(vec![
        [0.0, 0.0],
        [1.0, 0.0],
        [1.0, 1.0],
        [0.0, 1.0],
        [0.5, 0.5],
    ]);
    raw.add_block("line", vec![vec![0, 1], vec![2, 3]]);
    raw.add_block(
        "triangle",
        vec![vec![0, 1, 4], vec![1, 2, 4], vec![2, 3, 4], vec![3, 0, 4]],
    );
    Mesh::new(raw, &CellFactory::default())
}

/// Create a mesh whose only cell is a triangle with collinear points
pub fn degenerate_triangle() -> Mesh {
    let mut raw = RawMesh::new(vec![[0.0, 0.0], [1.0, 0.0], [2.0, 0.0]]);
    raw.add_block("triangle", vec![vec![0, 1, 2]]);
    Mesh::new(raw, &CellFactory::default())
}

/// Create a square mesh with triangle cells
///
/// Create a mesh of the square \[0,1\]^2 with triangle cells. The input ncells is the number of
/// cells along each side of the square.
pub fn screen_triangles(ncells: usize) -> Mesh {
    if ncells == 0 {
        panic!("Cannot create a grid with 0 cells");
    }
    let n = ncells as f64;
    let mut points = Vec::with_capacity((ncells + 1) * (ncells + 1));
    for y in 0..ncells + 1 {
        for x in 0..ncells + 1 {
            points.push([x as f64 / n, y as f64 / n]);
        }
    }
    let mut triangles = Vec::with_capacity(2 * ncells * ncells);
    for y in 0..ncells {
        for x in 0..ncells {
            let origin = y * (ncells + 1) + x;
            triangles.push(vec![origin, origin + 1, origin + ncells + 2]);
            triangles.push(vec![origin, origin + ncells + 2, origin + ncells + 1]);
        }
    }
    let mut raw = RawMesh::new(points);
    raw.add_block("triangle", triangles);
    Mesh::new(raw, &CellFactory::default())
}

#[cfg(test)]
mod test {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_screen_triangles() {
        let mut mesh = screen_triangles(3);
        assert_eq!(mesh.points().len(), 16);
        assert_eq!(mesh.cells().len(), 18);
        mesh.calculate_all().unwrap();
        let total = mesh
            .cells()
            .iter()
            .map(|c| c.geometry().unwrap().area)
            .sum::<f64>();
        assert_relative_eq!(total, 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_unit_square_fan() {
        let mesh = unit_square_fan();
        assert_eq!(mesh.cells().len(), 6);
        assert_eq!(mesh.triangle_indices(), vec![2, 3, 4, 5]);
    }

    #[test]
    #[should_panic]
    fn test_screen_triangles_empty() {
        screen_triangles(0);
    }
}
