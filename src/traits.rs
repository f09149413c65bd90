//! Trait definitions

mod snapshot;
mod source;
mod velocity;

pub use snapshot::{NoSnapshots, Snapshot, SnapshotWriter};
pub use source::MeshSource;
pub use velocity::{ShearFlow, UniformFlow, VelocityField};
