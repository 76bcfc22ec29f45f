//! Glint math - the value types shared by the renderer.
//!
//! Vectors and matrices are glam's double precision types; everything else
//! (colours, rays, boxes) is defined here.

// Re-export glam for convenience
pub use glam;

mod aabb;
mod colour;
mod ray;

pub use aabb::Aabb;
pub use colour::Colour;
pub use ray::Ray;

/// 3D vector of `f64` components.
pub type Vec3 = glam::DVec3;

/// 3x3 matrix of `f64` components, column major.
pub type Mat3 = glam::DMat3;

/// Tolerance used when checking that a direction has unit magnitude.
pub const UNIT_TOLERANCE: f64 = 1.0e-6;

/// Returns true if `v` has unit magnitude within [`UNIT_TOLERANCE`].
#[inline]
pub fn is_unit(v: Vec3) -> bool {
    (v.length() - 1.0).abs() < UNIT_TOLERANCE
}
