//! Oilflow
//!
//! First order finite volume advection of a scalar ("oil") over unstructured triangle meshes,
//! with tracking of how much of it reaches a region of interest.
#![cfg_attr(feature = "strict", deny(warnings))]
#![warn(missing_docs)]

pub mod config;
pub mod grid;
pub mod io;
pub mod solver;
pub mod traits;
pub mod types;
