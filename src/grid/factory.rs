//! Creation of cells from raw connectivity

use crate::grid::{Cell, CellKind};
use crate::types::{Error, Result};
use std::collections::HashMap;

/// Maps the length of a connectivity tuple to the kind of cell it describes
#[derive(Debug, Clone)]
pub struct CellFactory {
    kinds: HashMap<usize, CellKind>,
}

impl CellFactory {
    /// Create a factory with no registered kinds
    pub fn new() -> Self {
        Self {
            kinds: HashMap::new(),
        }
    }

    /// Register `kind` for tuples with `npoints` points
    ///
    /// Registering the same length again replaces the previous kind.
    pub fn register(&mut self, npoints: usize, kind: CellKind) {
        self.kinds.insert(npoints, kind);
    }

    /// The kind registered for `npoints`, if any
    pub fn kind(&self, npoints: usize) -> Option<CellKind> {
        self.kinds.get(&npoints).copied()
    }

    /// Create the cell with index `index` from a tuple of point indices
    pub fn create(&self, index: usize, points: &[usize]) -> Result<Cell> {
        let kind = self.kind(points.len()).ok_or(Error::UnknownCellKind {
            npoints: points.len(),
        })?;
        Ok(Cell::new(index, points.to_vec(), kind))
    }
}

impl Default for CellFactory {
    /// A factory with vertices, lines and triangles registered
    fn default() -> Self {
        let mut f = Self::new();
        f.register(1, CellKind::Vertex);
        f.register(2, CellKind::Line);
        f.register(3, CellKind::Triangle);
        f
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use paste::paste;

    macro_rules! test_register {
        ($($kind:ident: $npoints:expr),+) => {
        $(
            paste! {
                #[test]
                fn [<test_register_ $kind:lower>]() {
                    let mut f = CellFactory::new();
                    f.register($npoints, CellKind::$kind);
                    assert_eq!(f.kind($npoints), Some(CellKind::$kind));

                    let points = (0..$npoints).collect::<Vec<_>>();
                    let c = f.create(4, &points).unwrap();
                    assert_eq!(c.kind(), CellKind::$kind);
                    assert_eq!(c.points().len(), $npoints);
                    assert_eq!(c.index(), 4);
                }
            }
        )*
        };
    }

    test_register!(Vertex: 1, Line: 2, Triangle: 3);

    #[test]
    fn test_unknown_kind() {
        let f = CellFactory::default();
        match f.create(0, &[0, 1, 2, 3]) {
            Err(Error::UnknownCellKind { npoints }) => assert_eq!(npoints, 4),
            _ => panic!("Expected UnknownCellKind"),
        }
    }

    #[test]
    fn test_empty_factory_rejects_triangles() {
        let f = CellFactory::new();
        assert!(f.create(0, &[0, 1, 2]).is_err());
    }
}
