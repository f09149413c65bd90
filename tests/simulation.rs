use approx::assert_relative_eq;
use glam::DVec2;
use oilflow::grid::shapes::{screen_triangles, unit_square_fan};
use oilflow::grid::{CellFactory, Mesh};
use oilflow::io::{GmshReader, VtkWriter};
use oilflow::solver::{Checkpoint, Simulation, SimulationOptions, SimulationState};
use oilflow::traits::NoSnapshots;
use oilflow::types::Error;
use std::fs::read_to_string;
use std::path::PathBuf;
use tempfile::tempdir;
use vtkio::model::{DataSet, Vtk};

fn options(start_time: f64, end_time: f64, intervals: usize) -> SimulationOptions {
    SimulationOptions {
        start_time,
        end_time,
        intervals,
        write_frequency: 0,
        fish_area: ([0.0, 0.45], [0.0, 0.45]),
        checkpoint_path: None,
    }
}

#[test]
fn test_unit_square_single_step() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("unit_square_restart.txt");
    let mut o = options(0.0, 1.0, 1);
    o.checkpoint_path = Some(path.clone());

    let mut sim = Simulation::new(unit_square_fan(), o).unwrap();
    sim.compute_geometry().unwrap();
    sim.seed(DVec2::new(0.5, 0.5)).unwrap();
    let before = sim.field().total();
    assert!(before > 0.0);

    let history = sim.run(&mut NoSnapshots).unwrap();
    assert_relative_eq!(sim.field().total(), before, epsilon = 1e-9);
    assert_eq!(history.entries().len(), 1);
    assert_eq!(history.entries()[0].0, 1.0);

    let text = read_to_string(&path).unwrap();
    let lines = text.lines().collect::<Vec<_>>();
    assert_eq!(lines.len(), sim.mesh().cells().len() + 1);
    assert_eq!(lines[0], "1");
    for (i, line) in lines[1..].iter().enumerate() {
        assert!(line.starts_with(&format!("{i};")));
    }
}

#[test]
fn test_mass_is_conserved_over_many_steps() {
    let mut sim = Simulation::new(screen_triangles(8), options(0.0, 0.5, 50)).unwrap();
    sim.compute_geometry().unwrap();
    sim.seed(DVec2::new(0.5, 0.5)).unwrap();
    let before = sim.field().mass(sim.mesh());
    sim.run(&mut NoSnapshots).unwrap();
    assert_relative_eq!(sim.field().mass(sim.mesh()), before, epsilon = 1e-10);
    assert!(sim.field().amount().iter().all(|a| *a > -1e-12));
}

#[test]
fn test_seed_outside_mesh_fails() {
    let mut sim = Simulation::new(unit_square_fan(), options(0.0, 1.0, 1)).unwrap();
    sim.compute_geometry().unwrap();
    assert!(matches!(
        sim.seed(DVec2::new(10.0, 10.0)),
        Err(Error::PointNotInMesh { .. })
    ));
}

#[test]
fn test_restart_continues_a_run() {
    let dir = tempdir().unwrap();
    let first_half = dir.path().join("first.txt");

    let mut full = Simulation::new(screen_triangles(6), options(0.0, 1.0, 10)).unwrap();
    full.compute_geometry().unwrap();
    full.seed(DVec2::new(0.3, 0.6)).unwrap();
    let full_history = full.run(&mut NoSnapshots).unwrap();

    let mut o = options(0.0, 0.5, 5);
    o.checkpoint_path = Some(first_half.clone());
    let mut first = Simulation::new(screen_triangles(6), o).unwrap();
    first.compute_geometry().unwrap();
    first.seed(DVec2::new(0.3, 0.6)).unwrap();
    first.run(&mut NoSnapshots).unwrap();

    let mut second = Simulation::new(screen_triangles(6), options(0.5, 1.0, 5)).unwrap();
    second.compute_geometry().unwrap();
    second.restore(&first_half).unwrap();
    assert_eq!(second.state(), SimulationState::RestoredFromCheckpoint);
    let second_history = second.run(&mut NoSnapshots).unwrap();

    for (a, b) in full.field().amount().iter().zip(second.field().amount()) {
        assert_relative_eq!(*a, *b, epsilon = 1e-14);
    }
    for (time, mass) in second_history.entries() {
        assert_relative_eq!(full_history.get(*time).unwrap(), *mass, epsilon = 1e-14);
    }
}

#[test]
fn test_restart_after_end_time_fails() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("late.txt");
    let mesh = unit_square_fan();
    let field = oilflow::solver::OilField::new(mesh.cells().len());
    Checkpoint::from_field(2.0, &field).write_to_file(&path).unwrap();

    let mut sim = Simulation::new(mesh, options(0.0, 1.0, 1)).unwrap();
    sim.compute_geometry().unwrap();
    assert!(matches!(
        sim.restore(&path),
        Err(Error::InvalidCheckpoint { line: 1, .. })
    ));
}

#[test]
fn test_gmsh_mesh_to_vtk_snapshots() {
    let dir = tempdir().unwrap();
    let mesh_path = dir.path().join("square.msh");
    std::fs::write(
        &mesh_path,
        "$MeshFormat
2.2 0 8
$EndMeshFormat
$Nodes
5
1 0 0 0
2 1 0 0
3 1 1 0
4 0 1 0
5 0.5 0.5 0
$EndNodes
$Elements
6
1 1 2 0 1 1 2
2 1 2 0 3 3 4
3 2 2 0 1 1 2 5
4 2 2 0 1 2 3 5
5 2 2 0 1 3 4 5
6 2 2 0 1 4 1 5
$EndElements
",
    )
    .unwrap();

    let mesh = Mesh::from_source(&GmshReader::new(&mesh_path), &CellFactory::default()).unwrap();
    assert_eq!(mesh.cells().len(), 6);

    let mut o = options(0.0, 0.1, 4);
    o.write_frequency = 2;
    let mut sim = Simulation::new(mesh, o).unwrap();
    sim.compute_geometry().unwrap();
    sim.seed(DVec2::new(0.5, 0.5)).unwrap();
    let mut writer = VtkWriter::new(dir.path().join("images")).unwrap();
    sim.run(&mut writer).unwrap();

    let names = writer
        .written()
        .iter()
        .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
        .collect::<Vec<_>>();
    assert_eq!(names, vec!["oil_0.vtk", "oil_2.vtk", "oil_4.vtk"]);
    let last: PathBuf = dir.path().join("images").join("oil_4.vtk");
    let vtk = Vtk::import(last).unwrap();
    assert!(vtk.title.contains("step 4"));
    assert!(matches!(vtk.data, DataSet::UnstructuredGrid { .. }));
}
