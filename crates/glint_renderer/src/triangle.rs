//! Triangle primitive for ray tracing.
//!
//! Uses the Möller-Trumbore algorithm for ray-triangle intersection.

use crate::Primitive;
use bytemuck::{Pod, Zeroable};
use glint_math::{Aabb, Mat3, Ray, Vec3};

/// Smallest accepted hit distance, also the relative parallel-ray cutoff.
pub const TRIANGLE_EPSILON: f64 = 1.0e-6;

/// A triangle primitive.
///
/// The layout is three packed `f64` triples, which is also the record format
/// of triangle files (see [`crate::model`]). The normal is not stored; it is
/// derived from the edges whenever it is needed.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct Triangle {
    pub a: Vec3,
    pub b: Vec3,
    pub c: Vec3,
}

/// A hit inside a triangle: distance along the ray plus the barycentric
/// weights of `b` and `c`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TriangleIntersection {
    pub distance: f64,
    pub u: f64,
    pub v: f64,
}

impl Triangle {
    /// Create a new triangle from three vertices.
    pub fn new(a: Vec3, b: Vec3, c: Vec3) -> Self {
        Self { a, b, c }
    }

    /// Apply a linear transform followed by a translation to every vertex.
    pub fn transformed(&self, transform: &Mat3, offset: Vec3) -> Triangle {
        Triangle::new(
            *transform * self.a + offset,
            *transform * self.b + offset,
            *transform * self.c + offset,
        )
    }

    /// Möller-Trumbore ray-triangle intersection.
    ///
    /// Misses when the ray is parallel to the plane, passes outside the
    /// triangle, or meets it closer than [`TRIANGLE_EPSILON`]. Parallelism
    /// is judged against the edge lengths, so tiny and huge triangles are
    /// treated alike. Degenerate triangles never hit.
    pub fn intersect(&self, ray: &Ray) -> Option<TriangleIntersection> {
        let edge1 = self.b - self.a;
        let edge2 = self.c - self.a;

        let h = ray.direction.cross(edge2);
        let det = edge1.dot(h);

        // Ray is parallel to triangle; |det| is at most |edge1| |edge2|
        if det.abs() <= TRIANGLE_EPSILON * edge1.length() * edge2.length() {
            return None;
        }

        let f = 1.0 / det;
        let s = ray.origin - self.a;
        let u = f * s.dot(h);
        if !(0.0..=1.0).contains(&u) {
            return None;
        }

        let q = s.cross(edge1);
        let v = f * ray.direction.dot(q);
        if v < 0.0 || u + v > 1.0 {
            return None;
        }

        let distance = f * edge2.dot(q);
        if distance < TRIANGLE_EPSILON {
            return None;
        }

        Some(TriangleIntersection { distance, u, v })
    }
}

impl Primitive for Triangle {
    fn bounding_box(&self) -> Aabb {
        Aabb::new(
            self.a.min(self.b).min(self.c),
            self.a.max(self.b).max(self.c),
        )
    }

    fn hit_distance(&self, ray: &Ray) -> Option<f64> {
        self.intersect(ray).map(|hit| hit.distance)
    }

    fn unit_normal(&self, _point: Vec3) -> Vec3 {
        (self.b - self.a).cross(self.c - self.a).normalize()
    }
}
