//! Surface materials and scattering.
//!
//! Materials are a closed enum matched once per scattering event. All
//! randomness comes from [`crate::noise`], keyed on the hit point and a
//! per-path salt, so scattering is a pure function of its inputs.

use crate::noise::{noise_1d, quantize, random_unit_vector, unit_real};
use glint_math::{Colour, Ray, Vec3};

/// Distance a continuation ray is moved off the surface it leaves.
pub const NUDGE: f64 = 0.001;

/// How light interacts with a surface.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Material {
    /// Ideal diffuse reflector.
    Lambertian { albedo: Colour },
    /// Specular reflector; `fuzziness` 0.0 is a perfect mirror.
    Metal { albedo: Colour, fuzziness: f64 },
    /// Clear refractive material such as glass (1.5) or water (1.33).
    Dielectric { refraction_index: f64 },
    /// Emitter that absorbs everything it is hit by.
    DiffuseLight {
        emission_colour: Colour,
        emission_power: f64,
    },
}

impl Material {
    pub fn lambertian(albedo: Colour) -> Self {
        Material::Lambertian { albedo }
    }

    pub fn metal(albedo: Colour, fuzziness: f64) -> Self {
        Material::Metal { albedo, fuzziness }
    }

    pub fn dielectric(refraction_index: f64) -> Self {
        Material::Dielectric { refraction_index }
    }

    pub fn diffuse_light(emission_colour: Colour, emission_power: f64) -> Self {
        Material::DiffuseLight {
            emission_colour,
            emission_power,
        }
    }

    /// Factor applied to the path throughput after a scatter.
    pub fn colour(&self) -> Colour {
        match *self {
            Material::Lambertian { albedo } | Material::Metal { albedo, .. } => albedo,
            Material::Dielectric { .. } => Colour::WHITE,
            Material::DiffuseLight { .. } => Colour::BLACK,
        }
    }

    /// Light emitted by the surface.
    pub fn emission(&self) -> Colour {
        match *self {
            Material::DiffuseLight {
                emission_colour,
                emission_power,
            } => emission_power * emission_colour,
            _ => Colour::BLACK,
        }
    }

    /// Scatter `ray` at `point`, where the surface has unit normal `normal`.
    ///
    /// Returns the continuation ray, or `None` when the path is absorbed.
    /// `salt` separates paths that reach the same point.
    pub fn scatter(&self, ray: &Ray, point: Vec3, normal: Vec3, salt: u32) -> Option<Ray> {
        debug_assert!(glint_math::is_unit(normal), "surface normal {normal:?} is not unit length");

        match *self {
            Material::Lambertian { .. } => {
                let direction = (normal + random_unit_vector(point, salt))
                    .try_normalize()
                    .unwrap_or(normal);
                Some(Ray::new(point + NUDGE * normal, direction))
            }

            Material::Metal { fuzziness, .. } => {
                let fuzz = fuzziness * random_unit_vector(point, salt);
                let direction = (reflect(ray.direction, normal) + fuzz).try_normalize()?;

                // Fuzz pushed the reflection below the surface
                if direction.dot(normal) <= 0.0 {
                    return None;
                }
                Some(Ray::new(point + NUDGE * normal, direction))
            }

            Material::Dielectric { refraction_index } => {
                let front_face = ray.direction.dot(normal) < 0.0;
                let (ratio, normal) = if front_face {
                    (1.0 / refraction_index, normal)
                } else {
                    (refraction_index, -normal)
                };

                let cos_theta = (-ray.direction).dot(normal).min(1.0);
                let sin_theta = (1.0 - cos_theta * cos_theta).max(0.0).sqrt();
                let threshold = unit_real(noise_1d(quantize(sin_theta)) ^ noise_1d(salt as i32));

                let cannot_refract = ratio * sin_theta > 1.0;
                if cannot_refract || reflectance(cos_theta, ratio) > threshold {
                    Some(Ray::new(point + NUDGE * normal, reflect(ray.direction, normal)))
                } else {
                    Some(Ray::new(point - NUDGE * normal, refract(ray.direction, normal, ratio)))
                }
            }

            Material::DiffuseLight { .. } => None,
        }
    }
}

/// Mirror `direction` about `normal`.
#[inline]
pub fn reflect(direction: Vec3, normal: Vec3) -> Vec3 {
    direction - 2.0 * direction.dot(normal) * normal
}

/// Refract a unit `direction` through a surface whose `normal` faces it.
///
/// `ratio` is the incident index over the transmitted index. The result is
/// renormalised to absorb rounding.
#[inline]
pub fn refract(direction: Vec3, normal: Vec3, ratio: f64) -> Vec3 {
    let cos_theta = (-direction).dot(normal).min(1.0);
    let perpendicular = ratio * (direction + cos_theta * normal);
    let parallel = -(1.0 - perpendicular.length_squared()).abs().sqrt() * normal;
    (perpendicular + parallel).normalize()
}

/// Schlick's approximation for reflectance.
///
/// Matched indices reflect nothing.
fn reflectance(cosine: f64, ratio: f64) -> f64 {
    if ratio == 1.0 {
        return 0.0;
    }
    let r0 = ((1.0 - ratio) / (1.0 + ratio)).powi(2);
    r0 + (1.0 - r0) * (1.0 - cosine).powi(5)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    fn random_unit(rng: &mut StdRng) -> Vec3 {
        loop {
            let v = Vec3::new(
                rng.gen_range(-1.0..1.0),
                rng.gen_range(-1.0..1.0),
                rng.gen_range(-1.0..1.0),
            );
            if let Some(unit) = v.try_normalize() {
                return unit;
            }
        }
    }

    #[test]
    fn test_reflect_identities() {
        let mut rng = StdRng::seed_from_u64(5);
        for _ in 0..1000 {
            let d = random_unit(&mut rng);
            let n = random_unit(&mut rng);
            let r = reflect(d, n);

            assert!((r.normalize().length() - 1.0).abs() < 1e-12);
            assert!((r.dot(n) + d.dot(n)).abs() < 1e-12);
        }
    }

    #[test]
    fn test_reflect_mirror() {
        let d = Vec3::new(1.0, -1.0, 0.0).normalize();
        let r = reflect(d, Vec3::Y);
        assert!((r - Vec3::new(1.0, 1.0, 0.0).normalize()).length() < 1e-12);
    }

    #[test]
    fn test_matched_index_passes_straight_through() {
        let glass = Material::dielectric(1.0);
        let mut rng = StdRng::seed_from_u64(17);

        for salt in 0..500 {
            let d = random_unit(&mut rng);
            let n = random_unit(&mut rng);
            let point = Vec3::new(rng.gen_range(-1.0..1.0), 0.0, rng.gen_range(-1.0..1.0));
            if d.dot(n).abs() < 1e-3 {
                continue;
            }

            let out = glass.scatter(&Ray::new(point, d), point, n, salt).unwrap();
            assert!((out.direction - d).length() < 1e-9, "{d:?} bent to {:?}", out.direction);
        }
    }

    #[test]
    fn test_total_internal_reflection() {
        // Leaving glass at a grazing angle cannot refract
        let glass = Material::dielectric(1.5);
        let normal = Vec3::Y;
        let d = Vec3::new(1.0, 0.2, 0.0).normalize();

        for salt in 0..100 {
            let out = glass.scatter(&Ray::new(Vec3::ZERO, d), Vec3::ZERO, normal, salt).unwrap();
            assert!((out.direction - reflect(d, -normal)).length() < 1e-12);
            // Reflected back inside, so nudged along the flipped normal
            assert!(out.origin.y < 0.0);
        }
    }

    #[test]
    fn test_refraction_bends_towards_normal() {
        let glass = Material::dielectric(1.5);
        let d = Vec3::new(0.1, -1.0, 0.0).normalize();
        let mut refracted = 0;

        for salt in 0..200 {
            let out = glass.scatter(&Ray::new(Vec3::ZERO, d), Vec3::ZERO, Vec3::Y, salt).unwrap();
            assert!(glint_math::is_unit(out.direction));
            if out.direction.y < 0.0 {
                // Entering the denser medium the ray leans closer to -normal
                assert!(out.direction.x < d.x);
                assert!(out.origin.y < 0.0);
                refracted += 1;
            }
        }

        // Near-normal incidence on glass reflects only a few percent
        assert!(refracted > 150, "only {refracted} of 200 refracted");
    }

    #[test]
    fn test_lambertian_leaves_surface() {
        let diffuse = Material::lambertian(Colour::splat(0.5));
        let mut rng = StdRng::seed_from_u64(23);

        for salt in 0..1000 {
            let point = Vec3::new(rng.gen_range(-5.0..5.0), rng.gen_range(-5.0..5.0), 0.0);
            let incoming = Ray::new(point + Vec3::Z, -Vec3::Z);
            let out = diffuse.scatter(&incoming, point, Vec3::Z, salt).unwrap();

            assert!(glint_math::is_unit(out.direction));
            assert!(out.direction.z >= 0.0);
            assert_eq!(out.origin, point + NUDGE * Vec3::Z);
        }
    }

    #[test]
    fn test_scatter_is_deterministic() {
        let diffuse = Material::lambertian(Colour::splat(0.5));
        let ray = Ray::new(Vec3::Z, -Vec3::Z);
        let a = diffuse.scatter(&ray, Vec3::new(0.3, 0.1, 0.0), Vec3::Z, 9);
        let b = diffuse.scatter(&ray, Vec3::new(0.3, 0.1, 0.0), Vec3::Z, 9);
        assert_eq!(a, b);
    }

    #[test]
    fn test_mirror_reflects_exactly() {
        let mirror = Material::metal(Colour::splat(0.8), 0.0);
        let d = Vec3::new(1.0, -1.0, 0.0).normalize();
        let out = mirror.scatter(&Ray::new(Vec3::ZERO, d), Vec3::ZERO, Vec3::Y, 0).unwrap();
        assert!((out.direction - reflect(d, Vec3::Y)).length() < 1e-12);
    }

    #[test]
    fn test_fuzzy_metal_can_absorb() {
        // Grazing hits on a very rough metal are pushed under the surface
        let rough = Material::metal(Colour::splat(0.8), 1.0);
        let d = Vec3::new(1.0, -0.01, 0.0).normalize();
        let mut absorbed = 0;

        for salt in 0..1000 {
            match rough.scatter(&Ray::new(Vec3::ZERO, d), Vec3::ZERO, Vec3::Y, salt) {
                Some(out) => assert!(out.direction.dot(Vec3::Y) > 0.0),
                None => absorbed += 1,
            }
        }

        assert!(absorbed > 0);
    }

    #[test]
    fn test_light_never_scatters() {
        let light = Material::diffuse_light(Colour::WHITE, 4.0);
        let ray = Ray::new(Vec3::Z, -Vec3::Z);
        assert!(light.scatter(&ray, Vec3::ZERO, Vec3::Z, 0).is_none());
    }

    #[test]
    fn test_colour_and_emission() {
        let albedo = Colour::new(0.2, 0.4, 0.6);

        assert_eq!(Material::lambertian(albedo).colour(), albedo);
        assert_eq!(Material::metal(albedo, 0.3).colour(), albedo);
        assert_eq!(Material::dielectric(1.5).colour(), Colour::WHITE);
        assert_eq!(Material::diffuse_light(albedo, 2.0).colour(), Colour::BLACK);

        assert_eq!(Material::lambertian(albedo).emission(), Colour::BLACK);
        assert_eq!(Material::dielectric(1.5).emission(), Colour::BLACK);
        assert_eq!(
            Material::diffuse_light(albedo, 2.0).emission(),
            Colour::new(0.4, 0.8, 1.2)
        );
    }
}
