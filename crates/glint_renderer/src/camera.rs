//! Thin-lens camera and per-sample ray generation.

use crate::noise::{pixel_seed, NoiseStream};
use glint_math::{Mat3, Ray, Vec3};
use serde::{Deserialize, Serialize};
use std::f64::consts::TAU;
use thiserror::Error;

/// Camera placements that have no well-defined view basis.
#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum CameraError {
    #[error("camera position and target coincide at {0}")]
    CoincidentEyeAndTarget(Vec3),

    #[error("camera up vector {up} is parallel to the view direction {view}")]
    UpParallelToView { up: Vec3, view: Vec3 },
}

/// Result type for camera construction.
pub type CameraResult<T> = Result<T, CameraError>;

/// Camera placement and lens.
///
/// The eye sits at `distance` along the back axis from `target`. Comparing
/// two cameras with `==` is how the renderer notices that the view moved.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Camera {
    /// Orthonormal basis; columns are the right, up and back axes.
    pub orientation: Mat3,
    pub target: Vec3,
    pub distance: f64,
    /// Vertical field of view in degrees
    pub vfov: f64,
    /// Lens diameter; 0.0 is a pinhole
    pub aperture: f64,
    /// Distance from the eye to the plane of perfect focus
    pub focus_distance: f64,
}

impl Camera {
    /// Place a pinhole camera at `eye` looking towards `target`.
    ///
    /// Focus defaults to the target distance. Fails when `eye` and `target`
    /// coincide or `vup` is parallel to the view direction.
    pub fn looking_at(eye: Vec3, target: Vec3, vup: Vec3) -> CameraResult<Self> {
        let offset = eye - target;
        let distance = offset.length();
        let back = offset
            .try_normalize()
            .ok_or(CameraError::CoincidentEyeAndTarget(eye))?;
        let right = vup
            .cross(back)
            .try_normalize()
            .ok_or(CameraError::UpParallelToView { up: vup, view: -back })?;
        let up = back.cross(right);

        Ok(Self {
            orientation: Mat3::from_cols(right, up, back),
            target,
            distance,
            vfov: 40.0,
            aperture: 0.0,
            focus_distance: distance,
        })
    }

    /// Set lens settings.
    pub fn with_lens(mut self, vfov: f64, aperture: f64, focus_distance: f64) -> Self {
        self.vfov = vfov;
        self.aperture = aperture;
        self.focus_distance = focus_distance;
        self
    }

    pub fn eye(&self) -> Vec3 {
        self.target + self.orientation * Vec3::new(0.0, 0.0, self.distance)
    }

    pub fn right(&self) -> Vec3 {
        self.orientation.x_axis
    }

    pub fn up(&self) -> Vec3 {
        self.orientation.y_axis
    }

    pub fn back(&self) -> Vec3 {
        self.orientation.z_axis
    }

    /// Precompute the view for an image of the given size.
    pub fn frame(&self, width: u32, height: u32) -> CameraFrame {
        assert!(width > 0 && height > 0, "image must not be empty");

        let viewport_height = 2.0 * (0.5 * self.vfov.to_radians()).tan();
        let viewport_width = viewport_height * width as f64 / height as f64;

        let eye = self.eye();
        let horizontal = self.focus_distance * viewport_width * self.right();
        let vertical = self.focus_distance * viewport_height * self.up();
        let lower_left =
            eye - 0.5 * horizontal - 0.5 * vertical - self.focus_distance * self.back();

        CameraFrame {
            eye,
            right: self.right(),
            up: self.up(),
            lower_left,
            horizontal,
            vertical,
            lens_radius: 0.5 * self.aperture,
            width,
            height,
        }
    }
}

/// A camera resolved against an image size.
///
/// Small and `Copy`, so every scanline job carries its own.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraFrame {
    pub eye: Vec3,
    pub right: Vec3,
    pub up: Vec3,
    /// Lower-left corner of the viewport on the focal plane
    pub lower_left: Vec3,
    pub horizontal: Vec3,
    pub vertical: Vec3,
    pub lens_radius: f64,
    pub width: u32,
    pub height: u32,
}

impl CameraFrame {
    /// Ray for one sample of the pixel at (`row`, `column`), row 0 at the top.
    ///
    /// Also returns the seed for the path the ray starts. Both are pure
    /// functions of the pixel and sample index.
    pub fn sample_ray(&self, row: u32, column: u32, sample: u32) -> (Ray, u32) {
        debug_assert!(row < self.height && column < self.width);

        let mut stream = NoiseStream::new(pixel_seed(row, column, sample));

        let u = (column as f64 + stream.next_real()) / self.width as f64;
        let v = ((self.height - 1 - row) as f64 + stream.next_real()) / self.height as f64;

        // Uniform point on the lens disk
        let radius = self.lens_radius * stream.next_real().sqrt();
        let angle = TAU * stream.next_real();
        let lens_offset = radius * (angle.cos() * self.right + angle.sin() * self.up);

        let origin = self.eye + lens_offset;
        let focal_point = self.lower_left + u * self.horizontal + v * self.vertical;

        (Ray::towards(origin, focal_point), stream.next_u32())
    }
}

/// Serializable camera description.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraSettings {
    pub position: Vec3,
    pub target: Vec3,
    pub up: Vec3,
    /// Vertical field of view in degrees
    pub vfov: f64,
    pub aperture: f64,
    /// Defaults to the distance between position and target
    pub focus_distance: Option<f64>,
}

impl Default for CameraSettings {
    fn default() -> Self {
        Self {
            position: Vec3::new(0.0, 0.0, 3.0),
            target: Vec3::ZERO,
            up: Vec3::Y,
            vfov: 40.0,
            aperture: 0.0,
            focus_distance: None,
        }
    }
}

impl TryFrom<CameraSettings> for Camera {
    type Error = CameraError;

    fn try_from(settings: CameraSettings) -> CameraResult<Self> {
        let camera = Camera::looking_at(settings.position, settings.target, settings.up)?;
        let focus_distance = settings.focus_distance.unwrap_or(camera.distance);
        Ok(camera.with_lens(settings.vfov, settings.aperture, focus_distance))
    }
}
