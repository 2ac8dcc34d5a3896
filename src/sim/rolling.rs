//! Rolling friction for a sphere sitting on the floor
//!
//! While the contact point slips, sliding friction `mu g` decelerates the
//! center and spins the sphere up until the contact point comes to rest.
//! From then on linear velocity follows the no-slip relation
//! `v = -(omega x c)` and rolling resistance slows the spin.

use glam::Vec3;

use super::state::{PhysicalConstants, SphereState};
use crate::{contact_point_velocity, safe_normal};

/// Angular deceleration magnitude produced by floor friction, rad/s^2
#[inline]
pub fn spin_deceleration(radius: f32, constants: &PhysicalConstants) -> f32 {
    radius * constants.mu * constants.gravity * constants.mass_ratio()
}

/// Advance the velocities of a sphere on the floor by `dt`
///
/// `pure_roll` skips the slip test and treats the sphere as rolling.
pub fn roll(state: &mut SphereState, constants: &PhysicalConstants, dt: f32, pure_roll: bool) {
    state.velocity.z = 0.0;
    if dt <= 0.0 {
        return;
    }

    let contact = state.floor_contact();
    let slip = contact_point_velocity(state.velocity, state.angular_velocity, contact);
    if pure_roll || slip.length() < constants.slip_epsilon {
        roll_without_slip(state, constants, dt);
        return;
    }

    let r = state.radius;
    let direction = safe_normal(slip);
    let spin_rate = spin_deceleration(r, constants);
    let delta_v = constants.mu * constants.gravity * dt;
    let slip_drop = constants.slip_arrest.slip_drop(r, dt, constants);
    let slip_speed = slip.length();

    if slip_speed * slip_speed < slip_drop * slip_drop {
        let t = dt * slip_speed / slip_drop;
        state.angular_velocity += spin_rate * t * Vec3::Z.cross(direction);
        state.velocity = -state.angular_velocity.cross(contact);
        roll_without_slip(state, constants, dt - t);
        return;
    }

    state.angular_velocity += spin_rate * dt * Vec3::Z.cross(direction);
    state.velocity -= delta_v * direction;
}

fn roll_without_slip(state: &mut SphereState, constants: &PhysicalConstants, dt: f32) {
    let contact = state.floor_contact();
    if dt > 0.0 {
        let spin_velocity = state.angular_velocity.cross(contact);
        let diff = spin_deceleration(state.radius, constants)
            * dt
            * Vec3::Z.cross(safe_normal(spin_velocity));

        // Resistance acts on the horizontal spin; once that would reverse,
        // the sphere stops turning altogether
        let rolling = Vec3::new(state.angular_velocity.x, state.angular_velocity.y, 0.0);
        if rolling.dot(rolling + diff) <= 0.0 {
            state.angular_velocity = Vec3::ZERO;
        } else {
            state.angular_velocity += diff;
        }
    }
    state.velocity = -state.angular_velocity.cross(contact);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::state::SlipArrest;

    fn on_floor(velocity: Vec3, angular_velocity: Vec3) -> SphereState {
        SphereState {
            position: Vec3::new(0.0, 0.0, 150.0),
            velocity,
            angular_velocity,
            radius: 50.0,
        }
    }

    fn slip_of(s: &SphereState) -> Vec3 {
        contact_point_velocity(s.velocity, s.angular_velocity, s.floor_contact())
    }

    #[test]
    fn test_fast_slide_stays_slipping() {
        let c = PhysicalConstants::default();
        let mut s = on_floor(Vec3::new(300.0, 0.0, -4.0), Vec3::ZERO);
        roll(&mut s, &c, 0.01, false);
        assert_eq!(s.velocity.z, 0.0);
        assert!((s.velocity.x - (300.0 - 4.9)).abs() < 1e-3);
        let expected_spin = spin_deceleration(50.0, &c) * 0.01;
        assert!((s.angular_velocity.y - expected_spin).abs() < 1e-4);
        assert!(slip_of(&s).length() > 1.0);
    }

    #[test]
    fn test_slow_slide_becomes_rolling_within_step() {
        let c = PhysicalConstants::default();
        // Slip of 10 dies after ~1.9 ms, leaving a sliver of the step to roll
        let mut s = on_floor(Vec3::new(10.0, 0.0, 0.0), Vec3::ZERO);
        roll(&mut s, &c, 0.002, false);
        assert!(s.velocity.x > 0.0);
        assert!(s.angular_velocity.y > 0.0);
        assert!(slip_of(&s).length() < 1e-3);
    }

    #[test]
    fn test_pure_roll_decelerates_spin() {
        let c = PhysicalConstants::default();
        // Rolling toward +X: spin about +Y, v = omega * r
        let mut s = on_floor(Vec3::new(200.0, 0.0, 0.0), Vec3::new(0.0, 4.0, 0.0));
        roll(&mut s, &c, 0.01, true);
        let expected = 4.0 - spin_deceleration(50.0, &c) * 0.01;
        assert!((s.angular_velocity.y - expected).abs() < 1e-4);
        assert!((s.velocity.x - expected * 50.0).abs() < 1e-2);
        assert!(slip_of(&s).length() < 1e-3);
    }

    #[test]
    fn test_pure_roll_clamps_to_zero() {
        let c = PhysicalConstants::default();
        let mut s = on_floor(Vec3::new(25.0, 0.0, 0.0), Vec3::new(0.0, 0.5, 0.0));
        roll(&mut s, &c, 0.01, false);
        assert_eq!(s.angular_velocity, Vec3::ZERO);
        assert_eq!(s.velocity, Vec3::ZERO);
    }

    #[test]
    fn test_rolling_stop_clears_vertical_spin() {
        let c = PhysicalConstants::default();
        let mut s = on_floor(Vec3::new(25.0, 0.0, 0.0), Vec3::new(0.0, 0.5, 3.0));
        roll(&mut s, &c, 0.01, true);
        assert_eq!(s.angular_velocity, Vec3::ZERO);
        assert_eq!(s.velocity, Vec3::ZERO);
    }

    #[test]
    fn test_spin_in_place_stops() {
        let c = PhysicalConstants::default();
        let mut s = on_floor(Vec3::ZERO, Vec3::new(0.0, 0.0, 4.0));
        roll(&mut s, &c, 0.01, false);
        assert_eq!(s.angular_velocity, Vec3::ZERO);
        assert_eq!(s.velocity, Vec3::ZERO);
    }

    #[test]
    fn test_center_only_arrest_overshoots() {
        // Slip of 10: coupled arrest ends it within 2 ms; center-only keeps
        // sliding the whole step and spins past the no-slip point
        let coupled = PhysicalConstants::default();
        let center_only = PhysicalConstants {
            slip_arrest: SlipArrest::CenterOnly,
            ..Default::default()
        };
        let mut a = on_floor(Vec3::new(10.0, 0.0, 0.0), Vec3::ZERO);
        let mut b = a;
        roll(&mut a, &coupled, 0.002, false);
        roll(&mut b, &center_only, 0.002, false);
        assert!(slip_of(&a).length() < 1e-3);
        assert!((b.velocity.x - (10.0 - 0.98)).abs() < 1e-4);
        assert!(slip_of(&b).x < -0.1);
    }

    #[test]
    fn test_diagonal_roll_keeps_direction() {
        let c = PhysicalConstants::default();
        // v = -(omega x c) with c = (0, 0, -50): omega (-2, 2, 0) rolls along (100, 100, 0)
        let mut s = on_floor(Vec3::new(100.0, 100.0, 0.0), Vec3::new(-2.0, 2.0, 0.0));
        roll(&mut s, &c, 0.005, false);
        assert!(s.velocity.x > 0.0 && s.velocity.x < 100.0);
        assert!((s.velocity.x - s.velocity.y).abs() < 1e-3);
    }
}
