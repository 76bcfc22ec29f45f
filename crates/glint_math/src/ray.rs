use crate::{is_unit, Vec3};

/// A ray in 3D space with an origin and a unit-length direction.
///
/// The unit direction is an invariant: every intersection routine relies on
/// it, so constructing a ray with a non-unit direction is a caller bug and is
/// caught by a debug assertion.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Ray {
    pub origin: Vec3,
    pub direction: Vec3,
}

impl Ray {
    /// Create a new ray. `direction` must already be normalized.
    #[inline]
    pub fn new(origin: Vec3, direction: Vec3) -> Self {
        debug_assert!(
            is_unit(direction),
            "ray direction {direction:?} is not unit length"
        );
        Self { origin, direction }
    }

    /// Create a ray pointing from `origin` towards `target`.
    #[inline]
    pub fn towards(origin: Vec3, target: Vec3) -> Self {
        Self::new(origin, (target - origin).normalize())
    }

    /// Get the point along the ray at parameter t.
    ///
    /// Returns: origin + t * direction
    #[inline]
    pub fn at(&self, t: f64) -> Vec3 {
        self.origin + self.direction * t
    }
}
