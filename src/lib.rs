//! Ballbox - a sphere bouncing and rolling inside a box
//!
//! Core modules:
//! - `sim`: Deterministic simulation (contact prediction, impulses, rolling)
//! - `settings`: Serializable configuration (enclosure, constants, launch)
//! - `error`: Construction-time validation errors

pub mod error;
pub mod settings;
pub mod sim;

pub use error::SimError;
pub use settings::{LaunchSettings, Settings};

use glam::Vec3;

/// Simulation constants (centimetre / gram / second units)
pub mod consts {
    /// Radius of the sphere mesh at scale 1.0
    pub const BASE_RADIUS: f32 = 50.0;

    /// Coulomb friction coefficient
    pub const FRICTION_MU: f32 = 0.5;
    /// Gravitational acceleration magnitude (applied along -Z)
    pub const GRAVITY: f32 = 980.0;
    /// Sphere mass in grams
    pub const MASS: f32 = 245.0;
    /// Moment of inertia about a diameter, g*cm^2
    pub const INERTIA: f32 = 63300.0;
    /// Fraction of linear and angular speed kept after an impact
    pub const RESTITUTION: f32 = 0.9;
    /// Impacts closer than this (seconds) count as already touching
    pub const COLLISION_EPSILON: f32 = 0.0005;

    /// Squared vertical speed below which a floor impact lands instead of bouncing
    pub const LANDING_SPEED_SQ: f32 = 12100.0;
    /// Squared normal speed below which a wall impact stops the sphere on that axis
    pub const WALL_STOP_SPEED_SQ: f32 = 25.0;
    /// Contact-point speed below which the sphere counts as not slipping
    pub const SLIP_EPSILON: f32 = 0.01;
    /// Speed (linear and angular) below which the sphere counts as still
    pub const REST_EPSILON: f32 = 1.0e-4;

    /// Maximum contact events resolved in one frame before falling back
    pub const MAX_CONTACT_EVENTS: u32 = 32;
    /// Default demo frame delta
    pub const FRAME_DT: f32 = 1.0 / 60.0;
}

/// Distance above the resting height still treated as touching the floor
pub const FLOOR_SLOP: f32 = 1.0e-3;

/// Squared length below which a vector has no usable direction
pub const DIRECTION_EPSILON_SQ: f32 = 1.0e-8;

/// Unit vector of `v`, or zero when `v` is too short to have a direction
#[inline]
pub fn safe_normal(v: Vec3) -> Vec3 {
    if v.length_squared() < DIRECTION_EPSILON_SQ {
        Vec3::ZERO
    } else {
        v.normalize()
    }
}

/// Component of `v` perpendicular to `normal`
#[inline]
pub fn tangential_part(v: Vec3, normal: Vec3) -> Vec3 {
    v - v.dot(normal) * normal
}

/// Velocity of the material point at `contact` (center to surface vector):
/// tangential translation plus the spin contribution `angular x contact`.
#[inline]
pub fn contact_point_velocity(velocity: Vec3, angular_velocity: Vec3, contact: Vec3) -> Vec3 {
    let normal = safe_normal(contact);
    tangential_part(velocity, normal) + angular_velocity.cross(contact)
}
