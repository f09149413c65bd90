//! Legacy VTK output
//!
//! Every snapshot is written as an ASCII unstructured grid with the cell data `oil_amount` and
//! `in_region`, which can be opened in ParaView or VisIt.

use crate::grid::CellKind;
use crate::traits::{Snapshot, SnapshotWriter};
use crate::types::Result;
use std::fs::create_dir_all;
use std::io::Write;
use std::path::{Path, PathBuf};
use vtkio::model::{
    Attribute, Attributes, ByteOrder, CellType, Cells, DataArray, DataSet, ElementType, IOBuffer,
    Piece, UnstructuredGridPiece, Version, VertexNumbers, Vtk,
};

/// VTK cell type of a cell kind
fn vtk_cell_type(kind: CellKind) -> CellType {
    match kind {
        CellKind::Vertex => CellType::Vertex,
        CellKind::Line => CellType::Line,
        CellKind::Triangle => CellType::Triangle,
    }
}

fn scalars(name: &str, data: IOBuffer) -> Attribute {
    Attribute::DataArray(DataArray {
        name: name.to_string(),
        elem: ElementType::Scalars {
            num_comp: 1,
            lookup_table: None,
        },
        data,
    })
}

/// Build the VTK data set of a snapshot
pub fn snapshot_vtk(snapshot: &Snapshot<'_>) -> Vtk {
    let mesh = snapshot.mesh;
    let points = mesh
        .points()
        .iter()
        .flat_map(|p| [p.coords().x, p.coords().y, 0.0])
        .collect::<Vec<_>>();

    let mut vertices = vec![];
    for c in mesh.cells() {
        vertices.push(c.points().len() as u32);
        vertices.extend(c.points().iter().map(|p| *p as u32));
    }
    let cells = Cells {
        cell_verts: VertexNumbers::Legacy {
            num_cells: mesh.cells().len() as u32,
            vertices,
        },
        types: mesh.cells().iter().map(|c| vtk_cell_type(c.kind())).collect(),
    };

    let in_region = mesh
        .cells()
        .iter()
        .map(|c| i32::from(snapshot.region.contains(&c.index())))
        .collect::<Vec<_>>();
    let data = Attributes {
        point: vec![],
        cell: vec![
            scalars("oil_amount", IOBuffer::F64(snapshot.oil_amount.to_vec())),
            scalars("in_region", IOBuffer::I32(in_region)),
        ],
    };

    Vtk {
        version: Version { major: 4, minor: 2 },
        title: format!(
            "oil amount at step {} (time {})",
            snapshot.step, snapshot.time
        ),
        byte_order: ByteOrder::BigEndian,
        file_path: None,
        data: DataSet::UnstructuredGrid {
            meta: None,
            pieces: vec![Piece::Inline(Box::new(UnstructuredGridPiece {
                points: IOBuffer::F64(points),
                cells,
                data,
            }))],
        },
    }
}

/// Write a snapshot in the legacy ASCII VTK format
pub fn write_vtk<W: Write>(writer: &mut W, snapshot: &Snapshot<'_>) -> Result<()> {
    let mut text = String::new();
    snapshot_vtk(snapshot).write_legacy_ascii(&mut text)?;
    writer.write_all(text.as_bytes())?;
    Ok(())
}

/// Writes every snapshot to `<directory>/oil_<step>.vtk`
#[derive(Debug, Clone)]
pub struct VtkWriter {
    directory: PathBuf,
    written: Vec<PathBuf>,
}

impl VtkWriter {
    /// Create a writer, creating `directory` if it does not exist
    pub fn new(directory: impl AsRef<Path>) -> Result<Self> {
        let directory = directory.as_ref().to_path_buf();
        create_dir_all(&directory)?;
        Ok(Self {
            directory,
            written: vec![],
        })
    }

    /// The files written so far
    pub fn written(&self) -> &[PathBuf] {
        &self.written
    }
}

impl SnapshotWriter for VtkWriter {
    fn write_snapshot(&mut self, snapshot: &Snapshot<'_>) -> Result<()> {
        let path = self.directory.join(format!("oil_{}.vtk", snapshot.step));
        snapshot_vtk(snapshot).export_ascii(&path)?;
        self.written.push(path);
        Ok(())
    }
}
