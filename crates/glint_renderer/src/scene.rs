//! Read-only scene aggregate: materials, geometry families and background.

use crate::{Bvh, Material, Primitive, Sphere, Triangle};
use glint_math::{Colour, Ray, Vec3};

/// Background colour for rays pointing straight down.
pub const DEFAULT_HORIZON: Colour = Colour::new(1.0, 1.0, 1.0);
/// Background colour for rays pointing straight up.
pub const DEFAULT_SKY: Colour = Colour::new(0.5, 0.7, 1.0);

/// One family of primitives with its BVH and per-primitive material indices.
#[derive(Debug, Clone)]
pub struct Geometry<P> {
    primitives: Vec<P>,
    material_indices: Vec<usize>,
    bvh: Bvh,
}

impl<P: Primitive> Geometry<P> {
    /// Build the BVH for a family. Returns `None` for an empty family.
    pub fn new(primitives: Vec<P>, material_indices: Vec<usize>) -> Option<Self> {
        assert_eq!(
            primitives.len(),
            material_indices.len(),
            "every primitive needs a material index"
        );
        let bvh = Bvh::new(&primitives)?;
        Some(Self {
            primitives,
            material_indices,
            bvh,
        })
    }

    pub fn primitives(&self) -> &[P] {
        &self.primitives
    }

    pub fn material_indices(&self) -> &[usize] {
        &self.material_indices
    }

    pub fn bvh(&self) -> &Bvh {
        &self.bvh
    }

    /// Distance, unit normal and material index of the nearest hit.
    fn closest_hit(&self, ray: &Ray) -> Option<(f64, Vec3, usize)> {
        let hit = self.bvh.closest_hit(ray, &self.primitives)?;
        let normal = self.primitives[hit.index].unit_normal(ray.at(hit.distance));
        Some((hit.distance, normal, self.material_indices[hit.index]))
    }
}

/// A resolved surface hit.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SurfaceHit {
    pub distance: f64,
    pub point: Vec3,
    /// Unit normal as the primitive defines it; not flipped towards the ray.
    pub normal: Vec3,
    pub material: Material,
}

/// Everything a render needs to know about the world.
///
/// Built once through [`SceneBuilder`] and never mutated afterwards, so it is
/// shared across render threads behind an `Arc` without locking.
#[derive(Debug, Clone)]
pub struct Scene {
    materials: Vec<Material>,
    spheres: Option<Geometry<Sphere>>,
    triangles: Option<Geometry<Triangle>>,
    horizon: Colour,
    sky: Colour,
}

impl Scene {
    pub fn materials(&self) -> &[Material] {
        &self.materials
    }

    pub fn spheres(&self) -> Option<&Geometry<Sphere>> {
        self.spheres.as_ref()
    }

    pub fn triangles(&self) -> Option<&Geometry<Triangle>> {
        self.triangles.as_ref()
    }

    /// Nearest surface along `ray` across both geometry families.
    pub fn closest_hit(&self, ray: &Ray) -> Option<SurfaceHit> {
        let sphere_hit = self.spheres.as_ref().and_then(|g| g.closest_hit(ray));
        let triangle_hit = self.triangles.as_ref().and_then(|g| g.closest_hit(ray));

        let (distance, normal, material) = match (sphere_hit, triangle_hit) {
            (Some(s), Some(t)) => {
                if t.0 < s.0 {
                    t
                } else {
                    s
                }
            }
            (hit, None) | (None, hit) => hit?,
        };

        Some(SurfaceHit {
            distance,
            point: ray.at(distance),
            normal,
            material: self.materials[material],
        })
    }

    /// Background seen along a direction whose y component is `direction_y`.
    ///
    /// Blends linearly from the horizon colour at `y = -1` to the sky colour
    /// at `y = 1`.
    pub fn background(&self, direction_y: f64) -> Colour {
        let t = 0.5 * (direction_y + 1.0);
        self.horizon.lerp(self.sky, t)
    }
}

/// Assembles a [`Scene`] and builds its acceleration structures.
#[derive(Debug, Clone)]
pub struct SceneBuilder {
    materials: Vec<Material>,
    spheres: Vec<Sphere>,
    sphere_materials: Vec<usize>,
    triangles: Vec<Triangle>,
    triangle_materials: Vec<usize>,
    horizon: Colour,
    sky: Colour,
}

impl Default for SceneBuilder {
    fn default() -> Self {
        Self {
            materials: Vec::new(),
            spheres: Vec::new(),
            sphere_materials: Vec::new(),
            triangles: Vec::new(),
            triangle_materials: Vec::new(),
            horizon: DEFAULT_HORIZON,
            sky: DEFAULT_SKY,
        }
    }
}

impl SceneBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a material and return its index.
    pub fn add_material(&mut self, material: Material) -> usize {
        self.materials.push(material);
        self.materials.len() - 1
    }

    pub fn add_sphere(&mut self, sphere: Sphere, material: usize) -> &mut Self {
        self.spheres.push(sphere);
        self.sphere_materials.push(material);
        self
    }

    pub fn add_triangle(&mut self, triangle: Triangle, material: usize) -> &mut Self {
        self.triangles.push(triangle);
        self.triangle_materials.push(material);
        self
    }

    /// Add a batch of triangles sharing one material.
    pub fn add_triangles<I>(&mut self, triangles: I, material: usize) -> &mut Self
    where
        I: IntoIterator<Item = Triangle>,
    {
        for triangle in triangles {
            self.add_triangle(triangle, material);
        }
        self
    }

    /// Set the background gradient colours.
    pub fn with_background(&mut self, horizon: Colour, sky: Colour) -> &mut Self {
        self.horizon = horizon;
        self.sky = sky;
        self
    }

    /// Validate material indices and build both BVHs.
    ///
    /// # Panics
    ///
    /// Panics if any primitive refers to a material that was never added.
    pub fn build(self) -> Scene {
        let material_count = self.materials.len();
        for &index in self.sphere_materials.iter().chain(&self.triangle_materials) {
            assert!(
                index < material_count,
                "material index {index} out of range ({material_count} materials)"
            );
        }

        let sphere_count = self.spheres.len();
        let triangle_count = self.triangles.len();
        let (spheres, triangles) = rayon::join(
            || Geometry::new(self.spheres, self.sphere_materials),
            || Geometry::new(self.triangles, self.triangle_materials),
        );

        log::info!(
            "Built scene: {} materials, {} spheres, {} triangles",
            material_count,
            sphere_count,
            triangle_count
        );

        Scene {
            materials: self.materials,
            spheres,
            triangles,
            horizon: self.horizon,
            sky: self.sky,
        }
    }
}
