//! Sphere primitive for ray tracing.

use crate::Primitive;
use glint_math::{Aabb, Ray, Vec3};

/// A sphere primitive.
///
/// The radius is signed: a negative radius turns the normal inwards, which
/// models the inner wall of a hollow glass shell without the scattering code
/// having to know about it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sphere {
    pub centre: Vec3,
    pub radius: f64,
}

/// Both roots of a ray-sphere intersection, `min_distance <= max_distance`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SphereIntersections {
    pub min_distance: f64,
    pub max_distance: f64,
}

impl Sphere {
    /// Create a new sphere.
    pub fn new(centre: Vec3, radius: f64) -> Self {
        Self { centre, radius }
    }

    /// Intersect the line of `ray` with the sphere, including roots behind
    /// the origin. `None` when the line misses.
    pub fn intersect(&self, ray: &Ray) -> Option<SphereIntersections> {
        debug_assert!(glint_math::is_unit(ray.direction));

        let to_centre = self.centre - ray.origin;
        let mid_point_distance = to_centre.dot(ray.direction);

        let centre_to_mid_point_squared =
            to_centre.length_squared() - mid_point_distance * mid_point_distance;
        let half_chord_squared = self.radius * self.radius - centre_to_mid_point_squared;
        if half_chord_squared < 0.0 {
            return None;
        }

        let half_chord = half_chord_squared.sqrt();
        Some(SphereIntersections {
            min_distance: mid_point_distance - half_chord,
            max_distance: mid_point_distance + half_chord,
        })
    }
}

impl Primitive for Sphere {
    fn bounding_box(&self) -> Aabb {
        let extent = Vec3::splat(self.radius.abs());
        Aabb::new(self.centre - extent, self.centre + extent)
    }

    /// Nearest root in front of the ray. Rays starting inside the sphere
    /// (refracted rays, for instance) hit the far root.
    fn hit_distance(&self, ray: &Ray) -> Option<f64> {
        let roots = self.intersect(ray)?;
        if roots.min_distance > 0.0 {
            Some(roots.min_distance)
        } else if roots.max_distance > 0.0 {
            Some(roots.max_distance)
        } else {
            None
        }
    }

    fn unit_normal(&self, point: Vec3) -> Vec3 {
        let sign = if self.radius < 0.0 { -1.0 } else { 1.0 };
        sign * (point - self.centre).normalize()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    #[test]
    fn test_sphere_hit() {
        let sphere = Sphere::new(Vec3::new(0.0, 0.0, -1.0), 0.5);
        let ray = Ray::new(Vec3::ZERO, -Vec3::Z);

        let roots = sphere.intersect(&ray).unwrap();
        assert!((roots.min_distance - 0.5).abs() < 1e-12);
        assert!((roots.max_distance - 1.5).abs() < 1e-12);
        assert!((sphere.hit_distance(&ray).unwrap() - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_sphere_miss() {
        let sphere = Sphere::new(Vec3::new(0.0, 0.0, -1.0), 0.5);

        // Ray pointing away from sphere
        let ray = Ray::new(Vec3::ZERO, Vec3::Y);
        assert!(sphere.intersect(&ray).is_none());
        assert!(sphere.hit_distance(&ray).is_none());

        // The line hits, but only behind the origin
        let ray = Ray::new(Vec3::ZERO, Vec3::Z);
        assert!(sphere.intersect(&ray).is_some());
        assert!(sphere.hit_distance(&ray).is_none());
    }

    #[test]
    fn test_hit_from_inside_takes_far_root() {
        let sphere = Sphere::new(Vec3::ZERO, 2.0);
        let ray = Ray::new(Vec3::ZERO, Vec3::X);
        assert!((sphere.hit_distance(&ray).unwrap() - 2.0).abs() < 1e-12);
    }

    #[test]
    fn test_roots_lie_on_surface() {
        let mut rng = StdRng::seed_from_u64(7);
        let mut checked = 0;

        for _ in 0..2000 {
            let sphere = Sphere::new(
                Vec3::new(rng.gen_range(-5.0..5.0), rng.gen_range(-5.0..5.0), rng.gen_range(-5.0..5.0)),
                rng.gen_range(0.1..3.0),
            );
            let origin = Vec3::new(rng.gen_range(-8.0..8.0), rng.gen_range(-8.0..8.0), rng.gen_range(-8.0..8.0));
            // Aim near the sphere so a good share of rays hit
            let aim = sphere.centre
                + Vec3::new(rng.gen_range(-3.0..3.0), rng.gen_range(-3.0..3.0), rng.gen_range(-3.0..3.0));
            if (aim - origin).length() < 1e-3 {
                continue;
            }
            let ray = Ray::towards(origin, aim);

            if let Some(roots) = sphere.intersect(&ray) {
                assert!(roots.min_distance <= roots.max_distance);
                for d in [roots.min_distance, roots.max_distance] {
                    let distance_to_centre = (ray.at(d) - sphere.centre).length();
                    assert!((distance_to_centre - sphere.radius).abs() < 1e-6);
                }
                checked += 1;
            }
        }

        assert!(checked > 100, "only {checked} rays hit");
    }

    #[test]
    fn test_bounding_box() {
        let sphere = Sphere::new(Vec3::new(1.0, 2.0, 3.0), 0.5);
        let aabb = sphere.bounding_box();
        assert_eq!(aabb.min, Vec3::new(0.5, 1.5, 2.5));
        assert_eq!(aabb.max, Vec3::new(1.5, 2.5, 3.5));
    }

    #[test]
    fn test_negative_radius_flips_normal() {
        let solid = Sphere::new(Vec3::ZERO, 1.0);
        let hollow = Sphere::new(Vec3::ZERO, -1.0);
        let p = Vec3::new(0.0, 1.0, 0.0);

        assert_eq!(solid.unit_normal(p), Vec3::Y);
        assert_eq!(hollow.unit_normal(p), -Vec3::Y);

        // Same box and same hits, only the normal differs
        assert_eq!(solid.bounding_box(), hollow.bounding_box());
        let ray = Ray::new(Vec3::new(0.0, 5.0, 0.0), -Vec3::Y);
        assert_eq!(solid.hit_distance(&ray), hollow.hit_distance(&ray));
    }
}
