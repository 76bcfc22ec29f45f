//! Primitive trait shared by the geometry families the BVH indexes.

use glint_math::{Aabb, Ray, Vec3};

/// Geometry that can be stored in a [`Bvh`](crate::Bvh).
///
/// The BVH is generic over this trait so each geometry family gets its own
/// statically dispatched traversal.
pub trait Primitive: Send + Sync {
    /// Get the axis-aligned bounding box of this primitive.
    fn bounding_box(&self) -> Aabb;

    /// Distance along `ray` to the nearest accepted intersection, if any.
    fn hit_distance(&self, ray: &Ray) -> Option<f64>;

    /// Unit surface normal at a point known to lie on the primitive.
    fn unit_normal(&self, point: Vec3) -> Vec3;
}

/// Record of a ray-primitive intersection: which primitive, and how far.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Hit {
    /// Index of the primitive in its family's array
    pub index: usize,
    /// Parameter t where the intersection occurs
    pub distance: f64,
}
