//! Velocity fields

use glam::DVec2;

/// A velocity field that can be sampled at a point
pub trait VelocityField {
    /// The velocity at `point`
    fn velocity(&self, point: DVec2) -> DVec2;
}

/// The rotational shear flow `v = (y - 0.2 x, -x)`
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ShearFlow;

impl VelocityField for ShearFlow {
    fn velocity(&self, point: DVec2) -> DVec2 {
        DVec2::new(point.y - 0.2 * point.x, -point.x)
    }
}

/// A spatially constant velocity field
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct UniformFlow(pub DVec2);

impl VelocityField for UniformFlow {
    fn velocity(&self, _point: DVec2) -> DVec2 {
        self.0
    }
}
