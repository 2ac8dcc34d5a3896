//! Simulation state and configuration types
//!
//! `SphereState` is the only thing that changes from frame to frame; the
//! enclosure and the physical constants are fixed once a run starts.

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::consts::*;
use crate::error::SimError;

/// Motion regime of the sphere
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Phase {
    /// In flight or sliding against a wall: ballistic motion plus contact events
    Airborne,
    /// On the floor, driven by rolling friction only
    Rolling,
    /// On the floor and still. Terminal until the run is re-armed
    Resting,
}

/// Boundary family a contact belongs to
///
/// Declaration order is the tie-break precedence: Floor > WallX > WallY.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ContactKind {
    Floor,
    WallX,
    WallY,
}

impl ContactKind {
    /// All kinds, in precedence order
    pub const ALL: [ContactKind; 3] = [ContactKind::Floor, ContactKind::WallX, ContactKind::WallY];

    pub fn as_str(&self) -> &'static str {
        match self {
            ContactKind::Floor => "floor",
            ContactKind::WallX => "wall-x",
            ContactKind::WallY => "wall-y",
        }
    }
}

/// A predicted or resolved contact
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ContactEvent {
    pub kind: ContactKind,
    /// Seconds from the start of the sub-step (prediction) or frame (log)
    pub time: f32,
}

/// Horizontal axis a pair of walls is perpendicular to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    X,
    Y,
}

impl Axis {
    #[inline]
    pub fn of(&self, v: Vec3) -> f32 {
        match self {
            Axis::X => v.x,
            Axis::Y => v.y,
        }
    }

    #[inline]
    pub fn set(&self, v: &mut Vec3, value: f32) {
        match self {
            Axis::X => v.x = value,
            Axis::Y => v.y = value,
        }
    }

    #[inline]
    pub fn unit(&self) -> Vec3 {
        match self {
            Axis::X => Vec3::X,
            Axis::Y => Vec3::Y,
        }
    }
}

/// Mutable state of the simulated sphere
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SphereState {
    /// Center position
    pub position: Vec3,
    /// Linear velocity
    pub velocity: Vec3,
    /// Spin, right-handed
    pub angular_velocity: Vec3,
    pub radius: f32,
}

impl SphereState {
    /// A still sphere at `position`
    pub fn new(position: Vec3, radius: f32) -> Self {
        Self {
            position,
            velocity: Vec3::ZERO,
            angular_velocity: Vec3::ZERO,
            radius,
        }
    }

    /// A still sphere whose radius is `scale` times the base mesh radius
    pub fn with_scale(position: Vec3, scale: f32, base_radius: f32) -> Result<Self, SimError> {
        let radius = scale * base_radius;
        if !radius.is_finite() || radius <= 0.0 {
            return Err(SimError::InvalidRadius { radius });
        }
        Ok(Self::new(position, radius))
    }

    /// Vector from the center to the floor contact point
    #[inline]
    pub fn floor_contact(&self) -> Vec3 {
        Vec3::new(0.0, 0.0, -self.radius)
    }

    /// Linear plus rotational kinetic energy
    pub fn kinetic_energy(&self, mass: f32, inertia: f32) -> f32 {
        0.5 * mass * self.velocity.length_squared()
            + 0.5 * inertia * self.angular_velocity.length_squared()
    }

    /// Both velocities below `epsilon`
    pub fn is_still(&self, epsilon: f32) -> bool {
        let eps_sq = epsilon * epsilon;
        self.velocity.length_squared() <= eps_sq && self.angular_velocity.length_squared() <= eps_sq
    }

    pub fn is_finite(&self) -> bool {
        self.position.is_finite()
            && self.velocity.is_finite()
            && self.angular_velocity.is_finite()
            && self.radius.is_finite()
    }
}

/// Axis-aligned box: four vertical walls and a floor, open on top
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EnclosureBounds {
    pub x_min: f32,
    pub x_max: f32,
    pub y_min: f32,
    pub y_max: f32,
    /// Floor plane height
    pub z_floor: f32,
}

impl Default for EnclosureBounds {
    fn default() -> Self {
        // Reference arena: a sphere of base radius rests with its center at z = 130
        Self {
            x_min: -1874.0,
            x_max: 1075.0,
            y_min: -1474.0,
            y_max: 1475.0,
            z_floor: 80.0,
        }
    }
}

impl EnclosureBounds {
    /// Validated enclosure
    pub fn new(x_min: f32, x_max: f32, y_min: f32, y_max: f32, z_floor: f32) -> Result<Self, SimError> {
        let bounds = Self {
            x_min,
            x_max,
            y_min,
            y_max,
            z_floor,
        };
        bounds.validate()?;
        Ok(bounds)
    }

    pub fn validate(&self) -> Result<(), SimError> {
        let planes = [self.x_min, self.x_max, self.y_min, self.y_max, self.z_floor];
        if planes.iter().any(|p| !p.is_finite()) {
            return Err(SimError::InvalidBounds {
                reason: "planes must be finite",
            });
        }
        if self.x_min >= self.x_max {
            return Err(SimError::InvalidBounds {
                reason: "x_min must be below x_max",
            });
        }
        if self.y_min >= self.y_max {
            return Err(SimError::InvalidBounds {
                reason: "y_min must be below y_max",
            });
        }
        Ok(())
    }

    /// Reject a radius that would let the sphere touch two opposite walls at once
    pub fn check_radius(&self, radius: f32) -> Result<(), SimError> {
        if !radius.is_finite() || radius <= 0.0 {
            return Err(SimError::InvalidRadius { radius });
        }
        let limit = 0.5 * (self.x_max - self.x_min).min(self.y_max - self.y_min);
        if radius >= limit {
            return Err(SimError::RadiusTooLarge { radius, limit });
        }
        Ok(())
    }

    /// Reject a starting state outside the box
    pub fn check_state(&self, state: &SphereState) -> Result<(), SimError> {
        self.check_radius(state.radius)?;
        if !state.is_finite() {
            return Err(SimError::InvalidState {
                reason: "state must be finite",
            });
        }
        let r = state.radius;
        let p = state.position;
        if p.x < self.x_min + r || p.x > self.x_max - r {
            return Err(SimError::InvalidState {
                reason: "sphere overlaps an X wall",
            });
        }
        if p.y < self.y_min + r || p.y > self.y_max - r {
            return Err(SimError::InvalidState {
                reason: "sphere overlaps a Y wall",
            });
        }
        if p.z < self.rest_height(r) {
            return Err(SimError::InvalidState {
                reason: "sphere is below the floor",
            });
        }
        Ok(())
    }

    /// Center height of a sphere of `radius` sitting on the floor
    #[inline]
    pub fn rest_height(&self, radius: f32) -> f32 {
        self.z_floor + radius
    }

    /// Wall planes perpendicular to `axis` as (min, max)
    #[inline]
    pub fn walls(&self, axis: Axis) -> (f32, f32) {
        match axis {
            Axis::X => (self.x_min, self.x_max),
            Axis::Y => (self.y_min, self.y_max),
        }
    }

    /// Move a center back inside the region a sphere of `radius` may occupy
    pub fn clamp_center(&self, position: Vec3, radius: f32) -> Vec3 {
        Vec3::new(
            position.x.clamp(self.x_min + radius, self.x_max - radius),
            position.y.clamp(self.y_min + radius, self.y_max - radius),
            position.z.max(self.rest_height(radius)),
        )
    }
}

/// How large a friction impulse an impact may deliver
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FrictionClamp {
    /// `min(2 mu |vn|, |touch| I / (I + r^2 m))`: stops exactly when slip vanishes
    SlipVanishing,
    /// `min(2 mu |vn|, |touch|)`: may reverse the slip of a heavy-spin impact
    TouchSpeed,
}

impl FrictionClamp {
    /// Velocity change delivered along the slip direction
    pub fn coefficient(
        &self,
        normal_speed: f32,
        touch_speed: f32,
        radius: f32,
        constants: &PhysicalConstants,
    ) -> f32 {
        let coulomb = 2.0 * constants.mu * normal_speed.abs();
        let limit = match self {
            FrictionClamp::SlipVanishing => {
                touch_speed * constants.inertia
                    / (constants.inertia + radius * radius * constants.mass)
            }
            FrictionClamp::TouchSpeed => touch_speed,
        };
        coulomb.min(limit)
    }
}

/// When sliding friction counts as having arrested the slip within a step
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SlipArrest {
    /// Slip shrinks by `mu g dt (1 + r^2 m / I)`: friction slows the center
    /// and spins the sphere up at the same time
    Coupled,
    /// Slip shrinks by `mu g dt`, the center deceleration alone. Overshoots,
    /// so a slowly sliding sphere may flip its slip direction between steps
    CenterOnly,
}

impl SlipArrest {
    /// Slip speed friction removes in `dt`
    pub fn slip_drop(&self, radius: f32, dt: f32, constants: &PhysicalConstants) -> f32 {
        let delta_v = constants.mu * constants.gravity * dt;
        match self {
            SlipArrest::Coupled => delta_v * (1.0 + radius * radius * constants.mass_ratio()),
            SlipArrest::CenterOnly => delta_v,
        }
    }
}

/// Impact model for one pair of walls
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WallPolicy {
    pub clamp: FrictionClamp,
    /// Zero the normal velocity of slow impacts instead of bouncing
    pub low_speed_stop: bool,
}

/// Fixed physical parameters of a run
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PhysicalConstants {
    pub mu: f32,
    /// Gravity magnitude, pulls along -Z
    pub gravity: f32,
    pub mass: f32,
    /// Moment of inertia about any diameter
    pub inertia: f32,
    /// Fraction of speed kept after an impact
    pub restitution: f32,
    /// Times of impact below this count as immediate contact
    pub collision_epsilon: f32,
    pub landing_speed_sq: f32,
    pub wall_stop_speed_sq: f32,
    pub slip_epsilon: f32,
    pub rest_epsilon: f32,
    pub floor_clamp: FrictionClamp,
    pub slip_arrest: SlipArrest,
    pub wall_x: WallPolicy,
    pub wall_y: WallPolicy,
}

impl Default for PhysicalConstants {
    fn default() -> Self {
        Self {
            mu: FRICTION_MU,
            gravity: GRAVITY,
            mass: MASS,
            inertia: INERTIA,
            restitution: RESTITUTION,
            collision_epsilon: COLLISION_EPSILON,
            landing_speed_sq: LANDING_SPEED_SQ,
            wall_stop_speed_sq: WALL_STOP_SPEED_SQ,
            slip_epsilon: SLIP_EPSILON,
            rest_epsilon: REST_EPSILON,
            floor_clamp: FrictionClamp::SlipVanishing,
            slip_arrest: SlipArrest::Coupled,
            wall_x: WallPolicy {
                clamp: FrictionClamp::TouchSpeed,
                low_speed_stop: true,
            },
            // Y walls have never had the slow-impact stop
            wall_y: WallPolicy {
                clamp: FrictionClamp::TouchSpeed,
                low_speed_stop: false,
            },
        }
    }
}

impl PhysicalConstants {
    pub fn validate(&self) -> Result<(), SimError> {
        fn check(name: &'static str, ok: bool, reason: &'static str) -> Result<(), SimError> {
            if ok { Ok(()) } else { Err(SimError::InvalidConstant { name, reason }) }
        }
        check("mu", self.mu.is_finite() && self.mu >= 0.0, "must be >= 0")?;
        check("gravity", self.gravity.is_finite() && self.gravity > 0.0, "must be > 0")?;
        check("mass", self.mass.is_finite() && self.mass > 0.0, "must be > 0")?;
        check("inertia", self.inertia.is_finite() && self.inertia > 0.0, "must be > 0")?;
        check(
            "restitution",
            (0.0..=1.0).contains(&self.restitution),
            "must be within [0, 1]",
        )?;
        let thresholds = [
            ("collision_epsilon", self.collision_epsilon),
            ("landing_speed_sq", self.landing_speed_sq),
            ("wall_stop_speed_sq", self.wall_stop_speed_sq),
            ("slip_epsilon", self.slip_epsilon),
            ("rest_epsilon", self.rest_epsilon),
        ];
        for (name, value) in thresholds {
            check(name, value.is_finite() && value >= 0.0, "must be >= 0")?;
        }
        Ok(())
    }

    /// Mass over inertia, converts a linear impulse at the rim into spin
    #[inline]
    pub fn mass_ratio(&self) -> f32 {
        self.mass / self.inertia
    }

    pub fn wall_policy(&self, axis: Axis) -> WallPolicy {
        match axis {
            Axis::X => self.wall_x,
            Axis::Y => self.wall_y,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bounds_reject_inverted_axes() {
        assert!(matches!(
            EnclosureBounds::new(10.0, -10.0, -10.0, 10.0, 0.0),
            Err(SimError::InvalidBounds { .. })
        ));
        assert!(matches!(
            EnclosureBounds::new(-10.0, 10.0, 5.0, 5.0, 0.0),
            Err(SimError::InvalidBounds { .. })
        ));
    }

    #[test]
    fn test_radius_must_fit_between_walls() {
        let bounds = EnclosureBounds::new(-100.0, 100.0, -60.0, 60.0, 0.0).unwrap();
        assert!(bounds.check_radius(59.0).is_ok());
        assert_eq!(
            bounds.check_radius(60.0),
            Err(SimError::RadiusTooLarge {
                radius: 60.0,
                limit: 60.0
            })
        );
        assert!(matches!(bounds.check_radius(0.0), Err(SimError::InvalidRadius { .. })));
    }

    #[test]
    fn test_with_scale() {
        let s = SphereState::with_scale(Vec3::ZERO, 2.0, BASE_RADIUS).unwrap();
        assert_eq!(s.radius, 100.0);
        assert!(SphereState::with_scale(Vec3::ZERO, -1.0, BASE_RADIUS).is_err());
    }

    #[test]
    fn test_check_state_rejects_wall_overlap() {
        let bounds = EnclosureBounds::new(-1000.0, 1000.0, -1000.0, 1000.0, 100.0).unwrap();
        let ok = SphereState::new(Vec3::new(0.0, 0.0, 150.0), 50.0);
        assert!(bounds.check_state(&ok).is_ok());
        let bad = SphereState::new(Vec3::new(980.0, 0.0, 300.0), 50.0);
        assert!(matches!(bounds.check_state(&bad), Err(SimError::InvalidState { .. })));
        let sunk = SphereState::new(Vec3::new(0.0, 0.0, 120.0), 50.0);
        assert!(bounds.check_state(&sunk).is_err());
    }

    #[test]
    fn test_default_constants_validate() {
        assert!(PhysicalConstants::default().validate().is_ok());
        let bad = PhysicalConstants {
            restitution: 1.5,
            ..Default::default()
        };
        assert!(matches!(
            bad.validate(),
            Err(SimError::InvalidConstant { name: "restitution", .. })
        ));
    }

    #[test]
    fn test_friction_clamps() {
        let c = PhysicalConstants::default();
        let r = 50.0;
        // Coulomb limit wins when the impact is slow
        assert_eq!(FrictionClamp::TouchSpeed.coefficient(10.0, 500.0, r, &c), 10.0);
        // Slip-vanishing limit is the touch speed scaled by I / (I + r^2 m)
        let k = FrictionClamp::SlipVanishing.coefficient(1000.0, 200.0, r, &c);
        let expected = 200.0 * c.inertia / (c.inertia + r * r * c.mass);
        assert!((k - expected).abs() < 1e-3);
        assert!(k < FrictionClamp::TouchSpeed.coefficient(1000.0, 200.0, r, &c));
    }

    #[test]
    fn test_slip_arrest_policies() {
        let c = PhysicalConstants::default();
        let center = SlipArrest::CenterOnly.slip_drop(50.0, 0.01, &c);
        assert!((center - 4.9).abs() < 1e-4);
        let coupled = SlipArrest::Coupled.slip_drop(50.0, 0.01, &c);
        let expected = 4.9 * (1.0 + 2500.0 * c.mass_ratio());
        assert!((coupled - expected).abs() < 1e-3);
    }

    #[test]
    fn test_clamp_center() {
        let bounds = EnclosureBounds::new(-100.0, 100.0, -100.0, 100.0, 0.0).unwrap();
        let p = bounds.clamp_center(Vec3::new(200.0, -200.0, -5.0), 10.0);
        assert_eq!(p, Vec3::new(90.0, -90.0, 10.0));
    }
}
