//! Iterative path integrator.

use crate::noise::noise_3d;
use crate::Scene;
use glint_math::{Colour, Ray};

/// Default limit on surface interactions per path.
pub const MAX_BOUNCES: u32 = 50;

/// Estimate the radiance arriving along `ray`.
///
/// Follows the path for at most `max_bounces` surface interactions. A path
/// that runs out of bounces returns what it gathered so far, with no Russian
/// roulette compensation. `seed` identifies the path; together with the hit
/// points it determines every scattering decision.
pub fn radiance(ray: Ray, scene: &Scene, max_bounces: u32, seed: u32) -> Colour {
    let mut ray = ray;
    let mut colour = Colour::BLACK;
    let mut attenuation = Colour::WHITE;

    for bounce in 0..max_bounces {
        let Some(hit) = scene.closest_hit(&ray) else {
            colour += attenuation * scene.background(ray.direction.y);
            return colour;
        };

        colour += attenuation * hit.material.emission();

        let salt = bounce_salt(seed, bounce);
        match hit.material.scatter(&ray, hit.point, hit.normal, salt) {
            Some(scattered) => {
                ray = scattered;
                attenuation *= hit.material.colour();
            }
            // Absorbed
            None => return colour,
        }
    }

    colour
}

fn bounce_salt(seed: u32, bounce: u32) -> u32 {
    noise_3d(seed as i32, bounce as i32, 0)
}
