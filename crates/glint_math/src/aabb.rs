use crate::{Ray, Vec3};

/// Axis-Aligned Bounding Box for spatial acceleration structures (BVH).
///
/// Only ever used as a conservative test, never as exact geometry.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Aabb {
    pub min: Vec3,
    pub max: Vec3,
}

impl Aabb {
    /// A box that contains nothing; the identity of [`Aabb::union`].
    pub const EMPTY: Aabb = Aabb {
        min: Vec3::INFINITY,
        max: Vec3::NEG_INFINITY,
    };

    /// Create an AABB from its corners.
    pub fn new(min: Vec3, max: Vec3) -> Self {
        Self { min, max }
    }

    /// Componentwise min/max merge of two boxes.
    pub fn union(&self, other: &Aabb) -> Aabb {
        Aabb {
            min: self.min.min(other.min),
            max: self.max.max(other.max),
        }
    }

    /// Get the minimum coordinate on an axis (0=X, 1=Y, 2=Z).
    pub fn axis_min(&self, axis: usize) -> f64 {
        self.min[axis]
    }

    /// Slab test: does the ray spend any non-negative parameter range
    /// inside the box?
    ///
    /// Divisions use the reciprocal of each direction component, so axis
    /// aligned rays are handled through signed infinities. Misses when the
    /// range is empty or lies entirely behind the ray origin.
    pub fn hit(&self, ray: &Ray) -> bool {
        let inverse = ray.direction.recip();
        let t0 = (self.min - ray.origin) * inverse;
        let t1 = (self.max - ray.origin) * inverse;

        let near = t0.min(t1).max_element();
        let far = t0.max(t1).min_element();

        near <= far && far >= 0.0
    }
}
