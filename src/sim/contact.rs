//! Continuous contact prediction against the floor and walls
//!
//! Within one sub-step the sphere follows an exact free-flight parabola:
//! constant horizontal velocity and constant downward acceleration. Walls
//! therefore have a linear time of impact and the floor a quadratic one. A
//! sphere already touching (or overlapping) a boundary reports an immediate
//! contact at time zero whatever its velocity; the resolver decides whether
//! anything happens.

use glam::Vec3;

use super::state::{Axis, ContactEvent, ContactKind, EnclosureBounds, SphereState};

/// Displacement after `t` seconds of free flight under `gravity` (along -Z)
///
/// Prediction and integration both go through here, so a sphere the
/// predictor lets drift stays exactly where the predictor said it would.
#[inline]
pub fn ballistic_offset(velocity: Vec3, gravity: f32, t: f32) -> Vec3 {
    t * velocity - Vec3::Z * (0.5 * gravity * t * t)
}

/// Positive time for a body `height` above a plane, moving at `vz`, to fall onto it
fn fall_time(height: f32, vz: f32, gravity: f32) -> f32 {
    let s = (vz * vz + 2.0 * gravity * height).sqrt();
    // Two forms of the same root, each free of cancellation on its side
    if vz > 0.0 {
        (vz + s) / gravity
    } else {
        2.0 * height / (s - vz)
    }
}

/// Time until the sphere reaches the floor within `dt`, if it does
pub fn floor_contact(state: &SphereState, bounds: &EnclosureBounds, gravity: f32, dt: f32) -> Option<f32> {
    let rest = bounds.rest_height(state.radius);
    let z = state.position.z;
    if z <= rest {
        return Some(0.0);
    }

    let vz = state.velocity.z;
    if z + ballistic_offset(state.velocity, gravity, dt).z > rest {
        return None;
    }
    finite_time(fall_time(z - rest, vz, gravity))
}

/// Time until a sphere that was just resolved against the floor comes back
/// down to it. The touch it is leaving is ignored.
pub fn floor_contact_leaving(state: &SphereState, bounds: &EnclosureBounds, gravity: f32, dt: f32) -> Option<f32> {
    let vz = state.velocity.z;
    if vz <= 0.0 || gravity <= 0.0 {
        return None;
    }
    let rest = bounds.rest_height(state.radius);
    let z = state.position.z;
    if z + ballistic_offset(state.velocity, gravity, dt).z > rest {
        return None;
    }
    finite_time(fall_time((z - rest).max(0.0), vz, gravity))
}

/// Time until the sphere reaches either wall perpendicular to `axis` within `dt`
pub fn wall_contact(axis: Axis, state: &SphereState, bounds: &EnclosureBounds, dt: f32) -> Option<f32> {
    let (lo, hi) = bounds.walls(axis);
    let r = state.radius;
    let p = axis.of(state.position);
    if p <= lo + r || p >= hi - r {
        return Some(0.0);
    }

    let v = axis.of(state.velocity);
    let next = p + v * dt;
    if next > lo + r && next < hi - r {
        return None;
    }

    // Heading toward the min wall means v < 0, so both quotients are positive
    let t = if next <= lo + r {
        (lo + r - p) / v
    } else {
        (hi - r - p) / v
    };
    finite_time(t)
}

/// Time until a sphere that was just resolved against an `axis` wall reaches
/// the far wall. The wall it is touching is ignored.
pub fn wall_contact_leaving(axis: Axis, state: &SphereState, bounds: &EnclosureBounds, dt: f32) -> Option<f32> {
    let (lo, hi) = bounds.walls(axis);
    let r = state.radius;
    let p = axis.of(state.position);
    let v = axis.of(state.velocity);
    let next = p + v * dt;
    let t = if v < 0.0 && next <= lo + r {
        (lo + r - p) / v
    } else if v > 0.0 && next >= hi - r {
        (hi - r - p) / v
    } else {
        return None;
    };
    finite_time(t)
}

/// Time of impact for one boundary family
pub fn predict(
    kind: ContactKind,
    state: &SphereState,
    bounds: &EnclosureBounds,
    gravity: f32,
    dt: f32,
) -> Option<f32> {
    match kind {
        ContactKind::Floor => floor_contact(state, bounds, gravity, dt),
        ContactKind::WallX => wall_contact(Axis::X, state, bounds, dt),
        ContactKind::WallY => wall_contact(Axis::Y, state, bounds, dt),
    }
}

/// Time of impact for a family resolved earlier in the same sub-step
pub fn predict_leaving(
    kind: ContactKind,
    state: &SphereState,
    bounds: &EnclosureBounds,
    gravity: f32,
    dt: f32,
) -> Option<f32> {
    match kind {
        ContactKind::Floor => floor_contact_leaving(state, bounds, gravity, dt),
        ContactKind::WallX => wall_contact_leaving(Axis::X, state, bounds, dt),
        ContactKind::WallY => wall_contact_leaving(Axis::Y, state, bounds, dt),
    }
}

fn finite_time(t: f32) -> Option<f32> {
    if t.is_finite() && t >= 0.0 { Some(t) } else { None }
}

/// Boundary families whose current touch was already resolved
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ContactMask(u8);

impl ContactMask {
    fn bit(kind: ContactKind) -> u8 {
        match kind {
            ContactKind::Floor => 1,
            ContactKind::WallX => 2,
            ContactKind::WallY => 4,
        }
    }

    pub fn only(kind: ContactKind) -> Self {
        Self(Self::bit(kind))
    }

    pub fn insert(&mut self, kind: ContactKind) {
        self.0 |= Self::bit(kind);
    }

    pub fn contains(&self, kind: ContactKind) -> bool {
        self.0 & Self::bit(kind) != 0
    }

    pub fn clear(&mut self) {
        self.0 = 0;
    }
}

/// Earliest contact within `dt` for a sphere falling under `gravity`
///
/// Families in `mask` only report a new approach, never the touch they were
/// resolved at, and their times are kept exact. Other times below `epsilon`
/// snap to zero. Ties go to the family listed first in [`ContactKind::ALL`].
pub fn earliest_contact(
    state: &SphereState,
    bounds: &EnclosureBounds,
    gravity: f32,
    dt: f32,
    epsilon: f32,
    mask: ContactMask,
) -> Option<ContactEvent> {
    let mut best: Option<ContactEvent> = None;
    for kind in ContactKind::ALL {
        let t = if mask.contains(kind) {
            predict_leaving(kind, state, bounds, gravity, dt)
        } else {
            predict(kind, state, bounds, gravity, dt).map(|t| if t < epsilon { 0.0 } else { t })
        };
        let Some(t) = t else {
            continue;
        };
        if t > dt {
            continue;
        }
        if best.is_none_or(|b| t < b.time) {
            best = Some(ContactEvent { kind, time: t });
        }
    }
    best
}
