//! Run settings
//!
//! Loaded from and saved to JSON files. Every field has a default, so a
//! settings file only needs to name what it changes.

use std::fs;
use std::path::Path;

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::consts::{BASE_RADIUS, FRAME_DT, MAX_CONTACT_EVENTS};
use crate::error::SimError;
use crate::sim::{EnclosureBounds, PhysicalConstants, SphereState};

/// Initial conditions of the sphere
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LaunchSettings {
    /// Center position
    pub position: Vec3,
    pub velocity: Vec3,
    pub angular_velocity: Vec3,
}

impl Default for LaunchSettings {
    fn default() -> Self {
        Self {
            position: Vec3::new(-400.0, 0.0, 600.0),
            velocity: Vec3::new(600.0, 300.0, 0.0),
            angular_velocity: Vec3::ZERO,
        }
    }
}

/// Everything needed to start a run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Radius of the unscaled sphere mesh
    pub base_radius: f32,
    /// Uniform scale applied to the sphere
    pub scale: f32,
    pub bounds: EnclosureBounds,
    pub constants: PhysicalConstants,
    pub launch: LaunchSettings,
    /// Contacts resolved per frame before falling back to plain integration
    pub max_contact_events: u32,
    /// Frame length used by the demo driver, seconds
    pub frame_dt: f32,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            base_radius: BASE_RADIUS,
            scale: 1.0,
            bounds: EnclosureBounds::default(),
            constants: PhysicalConstants::default(),
            launch: LaunchSettings::default(),
            max_contact_events: MAX_CONTACT_EVENTS,
            frame_dt: FRAME_DT,
        }
    }
}

impl Settings {
    /// Sphere radius after scaling
    pub fn radius(&self) -> f32 {
        self.scale * self.base_radius
    }

    /// The sphere as described by `launch`
    pub fn initial_state(&self) -> Result<SphereState, SimError> {
        let mut state = SphereState::with_scale(self.launch.position, self.scale, self.base_radius)?;
        state.velocity = self.launch.velocity;
        state.angular_velocity = self.launch.angular_velocity;
        Ok(state)
    }

    /// Check every field, including that the launch state fits in the box
    pub fn validate(&self) -> Result<(), SimError> {
        if !self.base_radius.is_finite() || self.base_radius <= 0.0 {
            return Err(SimError::InvalidConstant {
                name: "base_radius",
                reason: "must be > 0",
            });
        }
        if !self.scale.is_finite() || self.scale <= 0.0 {
            return Err(SimError::InvalidConstant {
                name: "scale",
                reason: "must be > 0",
            });
        }
        if self.max_contact_events == 0 {
            return Err(SimError::InvalidConstant {
                name: "max_contact_events",
                reason: "must be > 0",
            });
        }
        if !self.frame_dt.is_finite() || self.frame_dt <= 0.0 {
            return Err(SimError::InvalidConstant {
                name: "frame_dt",
                reason: "must be > 0",
            });
        }
        self.bounds.validate()?;
        self.constants.validate()?;
        self.bounds.check_state(&self.initial_state()?)
    }

    /// Parse and validate settings from JSON text
    pub fn from_json(json: &str) -> Result<Self, SimError> {
        let settings: Settings = serde_json::from_str(json)?;
        settings.validate()?;
        Ok(settings)
    }

    /// Load settings from a JSON file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, SimError> {
        let path = path.as_ref();
        let json = fs::read_to_string(path)?;
        let settings = Self::from_json(&json)?;
        log::info!("Loaded settings from {}", path.display());
        Ok(settings)
    }

    /// Save settings as pretty JSON
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), SimError> {
        let path = path.as_ref();
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json)?;
        log::info!("Settings saved to {}", path.display());
        Ok(())
    }
}
