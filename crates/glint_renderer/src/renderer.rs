//! Progressive multi-threaded renderer.
//!
//! Work is split into one job per scanline per pass. Jobs run on a
//! [`WorkerPool`] and fold their samples into a shared [`Film`]. Successive
//! passes keep accumulating while the camera stays put; moving the camera
//! clears the film and restarts the sample count.

use crate::integrator::{radiance, MAX_BOUNCES};
use crate::work_queue::{default_worker_count, WorkerPool};
use crate::{Camera, CameraFrame, Film, Scene};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use thiserror::Error;

/// Render configuration.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderSettings {
    /// Image width in pixels
    pub width: u32,
    /// Image height in pixels
    pub height: u32,
    /// Total samples per pixel
    pub samples: u32,
    /// Samples per pixel added by each pass
    pub samples_per_pass: u32,
    /// Maximum surface interactions per path
    pub max_bounces: u32,
    /// Worker threads besides the caller; `None` uses one per core minus one
    pub threads: Option<usize>,
}

impl Default for RenderSettings {
    fn default() -> Self {
        Self {
            width: 600,
            height: 400,
            samples: 100,
            samples_per_pass: 1,
            max_bounces: MAX_BOUNCES,
            threads: None,
        }
    }
}

/// Errors that can occur when setting up a render.
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("image size {width}x{height} has no pixels")]
    EmptyImage { width: u32, height: u32 },

    #[error("samples per pass must be at least 1")]
    NoSamplesPerPass,

    #[error("failed to start render worker threads: {0}")]
    Spawn(#[from] std::io::Error),
}

/// One scanline of one pass.
#[derive(Debug, Clone)]
pub struct ScanlineJob {
    pub row: u32,
    pub first_sample: u32,
    pub sample_count: u32,
    pub max_bounces: u32,
    pub frame: CameraFrame,
    pub scene: Arc<Scene>,
    pub film: Arc<Film>,
}

/// Render every pixel of one row for the job's sample range.
///
/// Samples are folded in one at a time, in sample order, so the film holds
/// the same sums however the samples were split into passes.
pub fn render_scanline(job: ScanlineJob) {
    let mut row = job.film.row(job.row);
    let samples = job.first_sample..job.first_sample + job.sample_count;

    for column in 0..job.frame.width {
        for sample in samples.clone() {
            let (ray, seed) = job.frame.sample_ray(job.row, column, sample);
            row.accumulate(column, radiance(ray, &job.scene, job.max_bounces, seed));
        }
    }
}

/// Progressive renderer for one scene.
pub struct Renderer {
    settings: RenderSettings,
    scene: Arc<Scene>,
    film: Arc<Film>,
    pool: WorkerPool<ScanlineJob>,
    camera: Option<Camera>,
    sample_index: u32,
}

impl Renderer {
    /// Create the film and start the worker threads.
    pub fn new(scene: Arc<Scene>, settings: RenderSettings) -> Result<Self, RenderError> {
        if settings.width == 0 || settings.height == 0 {
            return Err(RenderError::EmptyImage {
                width: settings.width,
                height: settings.height,
            });
        }
        if settings.samples_per_pass == 0 {
            return Err(RenderError::NoSamplesPerPass);
        }

        let workers = settings.threads.unwrap_or_else(default_worker_count);
        let pool = WorkerPool::new(settings.height as usize, workers, render_scanline)?;

        Ok(Self {
            film: Arc::new(Film::new(settings.width, settings.height)),
            settings,
            scene,
            pool,
            camera: None,
            sample_index: 0,
        })
    }

    pub fn film(&self) -> &Film {
        &self.film
    }

    /// Samples per pixel accumulated since the last reset.
    pub fn sample_index(&self) -> u32 {
        self.sample_index
    }

    /// True once the configured number of samples is accumulated.
    pub fn is_complete(&self) -> bool {
        self.sample_index >= self.settings.samples
    }

    /// Add `samples_per_pass` samples to every pixel.
    pub fn render_pass(&mut self, camera: &Camera) -> u32 {
        self.render_samples(camera, self.settings.samples_per_pass)
    }

    /// Run passes until the configured sample count is reached.
    pub fn render(&mut self, camera: &Camera) -> &Film {
        self.watch_camera(camera);
        while !self.is_complete() {
            let remaining = self.settings.samples - self.sample_index;
            self.render_samples(camera, remaining.min(self.settings.samples_per_pass));
        }
        &self.film
    }

    /// Add `count` samples to every pixel and return the new total.
    pub fn render_samples(&mut self, camera: &Camera, count: u32) -> u32 {
        self.watch_camera(camera);

        let frame = camera.frame(self.settings.width, self.settings.height);
        let first_sample = self.sample_index;
        let jobs = (0..self.settings.height).map(|row| ScanlineJob {
            row,
            first_sample,
            sample_count: count,
            max_bounces: self.settings.max_bounces,
            frame,
            scene: Arc::clone(&self.scene),
            film: Arc::clone(&self.film),
        });
        self.pool.run_pass(jobs);

        self.sample_index += count;
        log::debug!(
            "Pass done: samples {}..{}",
            first_sample,
            self.sample_index
        );
        self.sample_index
    }

    /// Discard the accumulated estimate if the view changed.
    fn watch_camera(&mut self, camera: &Camera) {
        if self.camera.as_ref() == Some(camera) {
            return;
        }
        if self.camera.is_some() {
            log::info!("Camera moved after {} samples; restarting", self.sample_index);
        }
        self.film.clear();
        self.sample_index = 0;
        self.camera = Some(*camera);
    }
}
