//! Settings file handling.
//!
//! A settings file is JSON with optional `render` and `camera` sections.
//! Only the fields present override the scene's own defaults.

use anyhow::{Context, Result};
use glint_math::Vec3;
use glint_renderer::{CameraSettings, RenderSettings};
use serde::Deserialize;
use std::fs;
use std::path::Path;

#[derive(Debug, Default, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ConfigFile {
    pub render: RenderOverrides,
    pub camera: CameraOverrides,
}

/// Image and sampling overrides.
#[derive(Debug, Default, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RenderOverrides {
    pub width: Option<u32>,
    pub height: Option<u32>,
    pub samples: Option<u32>,
    pub samples_per_pass: Option<u32>,
    pub max_bounces: Option<u32>,
    pub threads: Option<usize>,
}

impl RenderOverrides {
    pub fn apply(&self, settings: &mut RenderSettings) {
        if let Some(width) = self.width {
            settings.width = width;
        }
        if let Some(height) = self.height {
            settings.height = height;
        }
        if let Some(samples) = self.samples {
            settings.samples = samples;
        }
        if let Some(samples_per_pass) = self.samples_per_pass {
            settings.samples_per_pass = samples_per_pass;
        }
        if let Some(max_bounces) = self.max_bounces {
            settings.max_bounces = max_bounces;
        }
        if self.threads.is_some() {
            settings.threads = self.threads;
        }
    }
}

/// Camera overrides.
#[derive(Debug, Default, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CameraOverrides {
    pub position: Option<Vec3>,
    pub target: Option<Vec3>,
    pub up: Option<Vec3>,
    pub vfov: Option<f64>,
    pub aperture: Option<f64>,
    pub focus_distance: Option<f64>,
}

impl CameraOverrides {
    pub fn apply(&self, camera: &mut CameraSettings) {
        if let Some(position) = self.position {
            camera.position = position;
        }
        if let Some(target) = self.target {
            camera.target = target;
        }
        if let Some(up) = self.up {
            camera.up = up;
        }
        if let Some(vfov) = self.vfov {
            camera.vfov = vfov;
        }
        if let Some(aperture) = self.aperture {
            camera.aperture = aperture;
        }
        if self.focus_distance.is_some() {
            camera.focus_distance = self.focus_distance;
        }
    }
}

impl ConfigFile {
    pub fn from_json(text: &str) -> Result<Self> {
        serde_json::from_str(text).context("Invalid settings file")
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path)
            .with_context(|| format!("Failed to read settings file {}", path.display()))?;
        let config = Self::from_json(&text)
            .with_context(|| format!("Failed to parse settings file {}", path.display()))?;
        log::info!("Loaded settings from {}", path.display());
        Ok(config)
    }

    pub fn apply(&self, settings: &mut RenderSettings, camera: &mut CameraSettings) {
        self.render.apply(settings);
        self.camera.apply(camera);
    }
}
