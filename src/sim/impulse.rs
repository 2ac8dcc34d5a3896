//! Impact response for the floor and the walls
//!
//! All three boundaries share one law: reflect the normal velocity, then apply
//! a Coulomb friction impulse against the slip of the contact point, capped by
//! the boundary's [`FrictionClamp`], and finally scale linear and angular
//! velocity by the restitution factor.
//!
//! With contact vector `c = -r n` (center to contact, `n` pointing from the
//! boundary into the box), a linear change of `-k u` along the slip direction
//! `u` comes with a spin change of `k r (m / I) (n x u)`.

use glam::Vec3;

use super::state::{Axis, ContactKind, EnclosureBounds, FrictionClamp, PhysicalConstants, SphereState};
use crate::{contact_point_velocity, safe_normal};

/// What an impact did to the sphere
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Response {
    /// Already moving away from the boundary; velocities untouched
    Receding,
    /// Too slow to bounce: normal velocity zeroed, the rest scaled
    Stopped,
    /// Normal velocity reflected, `friction` is the tangential velocity change
    Bounced { friction: f32 },
}

impl Response {
    /// Whether the velocities changed
    pub fn is_contact(&self) -> bool {
        !matches!(self, Response::Receding)
    }
}

/// Resolve the contact of `kind` happening `happen_time` after the sub-step start
pub fn resolve(
    kind: ContactKind,
    state: &mut SphereState,
    bounds: &EnclosureBounds,
    constants: &PhysicalConstants,
    happen_time: f32,
) -> Response {
    match kind {
        ContactKind::Floor => resolve_floor(state, bounds, constants, happen_time),
        ContactKind::WallX => resolve_wall(Axis::X, state, bounds, constants, happen_time),
        ContactKind::WallY => resolve_wall(Axis::Y, state, bounds, constants, happen_time),
    }
}

pub fn resolve_floor(
    state: &mut SphereState,
    bounds: &EnclosureBounds,
    constants: &PhysicalConstants,
    happen_time: f32,
) -> Response {
    state.position += happen_time * state.velocity;
    let rest = bounds.rest_height(state.radius);
    if state.position.z < rest {
        state.position.z = rest;
    }

    let vz = state.velocity.z;
    if vz >= 0.0 {
        return Response::Receding;
    }

    if vz * vz < constants.landing_speed_sq {
        state.velocity.z = 0.0;
        state.position.z = rest;
        scale(state, constants.restitution);
        return Response::Stopped;
    }

    state.velocity.z = -vz;
    let friction = friction_impulse(state, Vec3::Z, vz, constants.floor_clamp, constants);
    Response::Bounced { friction }
}

pub fn resolve_wall(
    axis: Axis,
    state: &mut SphereState,
    bounds: &EnclosureBounds,
    constants: &PhysicalConstants,
    happen_time: f32,
) -> Response {
    state.position += happen_time * state.velocity;

    // Whichever wall is closer is the one that was struck
    let (lo, hi) = bounds.walls(axis);
    let r = state.radius;
    let p = axis.of(state.position);
    let hit_max = (hi - r - p).abs() < (lo + r - p).abs();
    axis.set(&mut state.position, if hit_max { hi - r } else { lo + r });

    let policy = constants.wall_policy(axis);
    let v = axis.of(state.velocity);
    if policy.low_speed_stop && v * v < constants.wall_stop_speed_sq {
        axis.set(&mut state.velocity, 0.0);
        scale(state, constants.restitution);
        return Response::Stopped;
    }

    if (hit_max && v < 0.0) || (!hit_max && v > 0.0) {
        return Response::Receding;
    }

    axis.set(&mut state.velocity, -v);
    let normal = if hit_max { -axis.unit() } else { axis.unit() };
    let friction = friction_impulse(state, normal, v, policy.clamp, constants);
    Response::Bounced { friction }
}

/// Friction impulse at the contact opposite `normal`, then restitution.
/// Returns the tangential velocity change.
fn friction_impulse(
    state: &mut SphereState,
    normal: Vec3,
    normal_speed: f32,
    clamp: FrictionClamp,
    constants: &PhysicalConstants,
) -> f32 {
    let r = state.radius;
    let contact = -normal * r;
    let touch = contact_point_velocity(state.velocity, state.angular_velocity, contact);
    let direction = safe_normal(touch);
    if direction == Vec3::ZERO {
        scale(state, constants.restitution);
        return 0.0;
    }

    let k = clamp.coefficient(normal_speed, touch.length(), r, constants);
    state.velocity -= k * direction;
    state.angular_velocity += k * r * constants.mass_ratio() * normal.cross(direction);
    scale(state, constants.restitution);
    k
}

#[inline]
fn scale(state: &mut SphereState, factor: f32) {
    state.velocity *= factor;
    state.angular_velocity *= factor;
}
