//! Glint - CPU Monte Carlo path tracer.
//!
//! Scenes are built once from spheres and triangles, each family indexed by
//! its own BVH, then rendered progressively: every pass adds samples to an
//! accumulation film, one scanline job per row, spread over a fixed pool of
//! worker threads. All randomness is hashed from pixel, sample and hit point
//! coordinates, so a render is bit-reproducible regardless of thread count.

pub mod noise;
mod primitive;
mod sphere;
mod triangle;
mod bvh;
mod material;
mod scene;
mod camera;
mod integrator;
mod film;
pub mod work_queue;
mod renderer;
pub mod model;

pub use primitive::{Hit, Primitive};
pub use sphere::{Sphere, SphereIntersections};
pub use triangle::{Triangle, TriangleIntersection, TRIANGLE_EPSILON};
pub use bvh::{Bvh, BvhNode};
pub use material::{reflect, refract, Material, NUDGE};
pub use scene::{Geometry, Scene, SceneBuilder, SurfaceHit, DEFAULT_HORIZON, DEFAULT_SKY};
pub use camera::{Camera, CameraError, CameraFrame, CameraResult, CameraSettings};
pub use integrator::{radiance, MAX_BOUNCES};
pub use film::{Film, FilmRow, Texel};
pub use work_queue::WorkerPool;
pub use renderer::{render_scanline, RenderError, RenderSettings, Renderer, ScanlineJob};
pub use model::{load_triangles, save_triangles, triangles_from_bytes, ModelError};

/// Re-export math types from glint_math
pub use glint_math::{Aabb, Colour, Mat3, Ray, Vec3};
