//! Built-in demo scenes.
//!
//! Each demo comes with the camera and image settings it is meant to be
//! viewed with; the settings file and command line can override both.

use clap::ValueEnum;
use glint_math::{Colour, Mat3, Vec3};
use glint_renderer::noise::NoiseStream;
use glint_renderer::{
    CameraSettings, Material, RenderSettings, Scene, SceneBuilder, Sphere, Triangle,
};
use std::f64::consts::PI;

/// Scene selector
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum DemoScene {
    /// Random field of small spheres around three large ones
    #[default]
    Spheres,
    /// Cornell box with a glass sphere and an area light
    Cornell,
    /// Triangle model loaded with `--model`, lit by a glowing sphere
    Model,
}

/// A scene plus the view it was composed for.
pub struct Demo {
    pub scene: Scene,
    pub camera: CameraSettings,
    pub settings: RenderSettings,
}

/// Seed of the sphere field layout.
const SPHERE_FIELD_SEED: u32 = 479_001_599;

fn random_colour(rng: &mut NoiseStream) -> Colour {
    Colour::new(rng.next_real(), rng.next_real(), rng.next_real())
}

pub fn spheres() -> Demo {
    let mut builder = SceneBuilder::new();

    let ground = builder.add_material(Material::lambertian(Colour::splat(0.5)));
    builder.add_sphere(Sphere::new(Vec3::new(0.0, -1000.0, 0.0), 1000.0), ground);

    let mut rng = NoiseStream::new(SPHERE_FIELD_SEED);

    for a in -11..11 {
        for b in -11..11 {
            let choice = rng.next_real();
            let centre = Vec3::new(
                a as f64 + 0.9 * rng.next_real(),
                0.2,
                b as f64 + 0.9 * rng.next_real(),
            );

            let material = if choice < 0.8 {
                let albedo = random_colour(&mut rng) * random_colour(&mut rng);
                Material::lambertian(albedo)
            } else if choice < 0.95 {
                let albedo = Colour::new(
                    0.5 * rng.next_real() + 0.5,
                    0.5 * rng.next_real() + 0.5,
                    0.5 * rng.next_real() + 0.5,
                );
                Material::metal(albedo, rng.next_real())
            } else {
                Material::dielectric(1.5)
            };

            let index = builder.add_material(material);
            builder.add_sphere(Sphere::new(centre, 0.2), index);
        }
    }

    let glass = builder.add_material(Material::dielectric(1.5));
    builder.add_sphere(Sphere::new(Vec3::new(0.0, 1.0, 0.0), 1.0), glass);

    let brown = builder.add_material(Material::lambertian(Colour::new(0.4, 0.2, 0.1)));
    builder.add_sphere(Sphere::new(Vec3::new(-4.0, 1.0, 0.0), 1.0), brown);

    let bronze = builder.add_material(Material::metal(Colour::new(0.7, 0.6, 0.5), 0.0));
    builder.add_sphere(Sphere::new(Vec3::new(4.0, 1.0, 0.0), 1.0), bronze);

    Demo {
        scene: builder.build(),
        camera: CameraSettings {
            position: Vec3::new(13.0, 2.0, 3.0),
            target: Vec3::ZERO,
            up: Vec3::Y,
            vfov: 20.0,
            aperture: 0.1,
            focus_distance: Some(10.0),
        },
        settings: RenderSettings {
            width: 600,
            height: 400,
            ..RenderSettings::default()
        },
    }
}

/// Two triangles per face of the unit cube, wound outwards.
const UNIT_BOX: [[Vec3; 3]; 12] = {
    const fn v(x: f64, y: f64, z: f64) -> Vec3 {
        Vec3::new(x, y, z)
    }
    [
        // +z
        [v(0.0, 1.0, 1.0), v(0.0, 0.0, 1.0), v(1.0, 0.0, 1.0)],
        [v(1.0, 0.0, 1.0), v(1.0, 1.0, 1.0), v(0.0, 1.0, 1.0)],
        // +x
        [v(1.0, 1.0, 1.0), v(1.0, 0.0, 1.0), v(1.0, 0.0, 0.0)],
        [v(1.0, 0.0, 0.0), v(1.0, 1.0, 0.0), v(1.0, 1.0, 1.0)],
        // -z
        [v(1.0, 1.0, 0.0), v(1.0, 0.0, 0.0), v(0.0, 0.0, 0.0)],
        [v(0.0, 0.0, 0.0), v(0.0, 1.0, 0.0), v(1.0, 1.0, 0.0)],
        // -x
        [v(0.0, 1.0, 0.0), v(0.0, 0.0, 0.0), v(0.0, 0.0, 1.0)],
        [v(0.0, 0.0, 1.0), v(0.0, 1.0, 1.0), v(0.0, 1.0, 0.0)],
        // +y
        [v(1.0, 1.0, 1.0), v(1.0, 1.0, 0.0), v(0.0, 1.0, 0.0)],
        [v(0.0, 1.0, 0.0), v(0.0, 1.0, 1.0), v(1.0, 1.0, 1.0)],
        // -y
        [v(0.0, 0.0, 1.0), v(0.0, 0.0, 0.0), v(1.0, 0.0, 0.0)],
        [v(1.0, 0.0, 0.0), v(1.0, 0.0, 1.0), v(0.0, 0.0, 1.0)],
    ]
};

/// The unit cube scaled, turned about y, then moved into place.
fn unit_box(scale: Vec3, angle: f64, offset: Vec3) -> impl Iterator<Item = Triangle> {
    let transform = Mat3::from_diagonal(scale) * Mat3::from_rotation_y(angle);
    UNIT_BOX
        .into_iter()
        .map(move |[a, b, c]| Triangle::new(a, b, c).transformed(&transform, offset))
}

/// Axis-aligned quad as two triangles, corners in winding order.
fn quad(corners: [Vec3; 4]) -> [Triangle; 2] {
    let [a, b, c, d] = corners;
    [Triangle::new(a, b, c), Triangle::new(c, d, a)]
}

pub fn cornell_box() -> Demo {
    let mut builder = SceneBuilder::new();
    builder.with_background(Colour::BLACK, Colour::BLACK);

    let red = builder.add_material(Material::lambertian(Colour::new(0.65, 0.05, 0.05)));
    let white = builder.add_material(Material::lambertian(Colour::splat(0.73)));
    let green = builder.add_material(Material::lambertian(Colour::new(0.12, 0.45, 0.15)));
    let light = builder.add_material(Material::diffuse_light(Colour::WHITE, 15.0));
    let glass = builder.add_material(Material::dielectric(1.5));

    let v = Vec3::new;
    let walls = [
        (quad([v(555.0, 0.0, 0.0), v(555.0, 0.0, 555.0), v(555.0, 555.0, 555.0), v(555.0, 555.0, 0.0)]), green),
        (quad([v(0.0, 0.0, 0.0), v(0.0, 555.0, 0.0), v(0.0, 555.0, 555.0), v(0.0, 0.0, 555.0)]), red),
        (quad([v(0.0, 0.0, 0.0), v(0.0, 0.0, 555.0), v(555.0, 0.0, 555.0), v(555.0, 0.0, 0.0)]), white),
        (quad([v(0.0, 555.0, 0.0), v(555.0, 555.0, 0.0), v(555.0, 555.0, 555.0), v(0.0, 555.0, 555.0)]), white),
        (quad([v(0.0, 0.0, 555.0), v(0.0, 555.0, 555.0), v(555.0, 555.0, 555.0), v(555.0, 0.0, 555.0)]), white),
        (quad([v(213.0, 554.0, 227.0), v(343.0, 554.0, 227.0), v(343.0, 554.0, 332.0), v(213.0, 554.0, 332.0)]), light),
    ];
    for (triangles, material) in walls {
        builder.add_triangles(triangles, material);
    }

    builder.add_triangles(
        unit_box(Vec3::splat(165.0), -PI / 10.0, v(130.0, 0.0, 65.0)),
        white,
    );
    builder.add_triangles(
        unit_box(v(165.0, 330.0, 165.0), PI / 12.0, v(265.0, 0.0, 295.0)),
        white,
    );

    builder.add_sphere(Sphere::new(v(183.0, 240.0, 169.0), 75.0), glass);

    Demo {
        scene: builder.build(),
        camera: CameraSettings {
            position: v(278.0, 278.0, -800.0),
            target: v(278.0, 278.0, 0.0),
            up: Vec3::Y,
            vfov: 40.0,
            aperture: 0.0,
            focus_distance: None,
        },
        settings: RenderSettings {
            width: 600,
            height: 600,
            ..RenderSettings::default()
        },
    }
}

/// A loaded mesh stood upright and lit by a single warm sphere light.
pub fn model(triangles: &[Triangle]) -> Demo {
    let mut builder = SceneBuilder::new();
    builder.with_background(Colour::BLACK, Colour::BLACK);

    let surface = builder.add_material(Material::lambertian(Colour::splat(0.1)));
    let lamp = builder.add_material(Material::diffuse_light(Colour::new(0.85, 0.7, 0.1), 5.0));

    // Meshes are stored z-up
    let upright = Mat3::from_rotation_x(-PI / 2.0);
    builder.add_triangles(
        triangles
            .iter()
            .map(|triangle| triangle.transformed(&upright, Vec3::ZERO)),
        surface,
    );
    builder.add_sphere(Sphere::new(Vec3::new(20.0, 80.0, 10.0), 10.0), lamp);

    Demo {
        scene: builder.build(),
        camera: CameraSettings {
            position: Vec3::new(0.0, 150.0, 150.0),
            target: Vec3::ZERO,
            up: Vec3::Y,
            vfov: 40.0,
            aperture: 0.1,
            focus_distance: None,
        },
        settings: RenderSettings {
            width: 600,
            height: 600,
            ..RenderSettings::default()
        },
    }
}
