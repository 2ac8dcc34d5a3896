//! Per-frame stepping
//!
//! `advance` consumes a frame's time budget as a sequence of sub-steps: each
//! sub-step asks for the earliest contact, drifts the sphere up to it, resolves
//! the impact and carries on with what is left of the budget. A sphere on the
//! floor is handed to the rolling integrator instead and only glides between
//! the walls.

use glam::Vec3;
use serde::{Deserialize, Serialize};

use super::contact::{ContactMask, ballistic_offset, earliest_contact};
use super::impulse::{self, Response};
use super::rolling;
use super::state::{ContactEvent, ContactKind, EnclosureBounds, Phase, PhysicalConstants, SphereState};
use crate::FLOOR_SLOP;
use crate::consts::MAX_CONTACT_EVENTS;
use crate::error::SimError;
use crate::settings::Settings;

/// What happened during one call to [`advance`]
#[derive(Debug, Clone, PartialEq)]
pub struct StepReport {
    /// Phase at the end of the frame
    pub phase: Phase,
    /// Contacts that changed the sphere's velocity, timed from the frame start
    pub events: Vec<ContactEvent>,
    /// The event cap was hit and the rest of the frame ran without contacts
    pub capped: bool,
}

/// Motion regime of `state`
pub fn classify(state: &SphereState, bounds: &EnclosureBounds, constants: &PhysicalConstants) -> Phase {
    let on_floor = state.position.z <= bounds.rest_height(state.radius) + FLOOR_SLOP
        && state.velocity.z.abs() <= constants.rest_epsilon;
    if !on_floor {
        Phase::Airborne
    } else if state.is_still(constants.rest_epsilon) {
        Phase::Resting
    } else {
        Phase::Rolling
    }
}

/// Advance the sphere by `dt` seconds with the default event cap
pub fn advance(
    state: &mut SphereState,
    bounds: &EnclosureBounds,
    constants: &PhysicalConstants,
    dt: f32,
) -> StepReport {
    advance_capped(state, bounds, constants, dt, MAX_CONTACT_EVENTS)
}

/// Advance the sphere by `dt` seconds, resolving at most `max_events` contacts
pub fn advance_capped(
    state: &mut SphereState,
    bounds: &EnclosureBounds,
    constants: &PhysicalConstants,
    dt: f32,
    max_events: u32,
) -> StepReport {
    let mut report = StepReport {
        phase: classify(state, bounds, constants),
        events: Vec::new(),
        capped: false,
    };

    let mut remaining = dt;
    let mut elapsed = 0.0;
    // Families just resolved: they stay touching until the sphere moves again
    let mut resolved = ContactMask::default();
    let mut rolled = false;
    let mut dispatched = 0;

    while remaining > 0.0 {
        let on_floor = match classify(state, bounds, constants) {
            Phase::Resting => {
                state.velocity = Vec3::ZERO;
                state.angular_velocity = Vec3::ZERO;
                break;
            }
            Phase::Rolling => {
                if !rolled {
                    rolling::roll(state, constants, remaining, false);
                    rolled = true;
                }
                true
            }
            Phase::Airborne => false,
        };
        let gravity = if on_floor { 0.0 } else { constants.gravity };

        let mut mask = resolved;
        if on_floor {
            mask.insert(ContactKind::Floor);
        }
        let Some(event) = earliest_contact(
            state,
            bounds,
            gravity,
            remaining,
            constants.collision_epsilon,
            mask,
        ) else {
            drift(state, remaining, gravity);
            break;
        };

        if dispatched >= max_events {
            log::warn!(
                "contact event cap ({}) reached with {:.5}s left, integrating without contacts",
                max_events,
                remaining
            );
            drift(state, remaining, gravity);
            state.position = bounds.clamp_center(state.position, state.radius);
            report.capped = true;
            break;
        }
        dispatched += 1;

        if event.time > 0.0 {
            drift(state, event.time, gravity);
            remaining -= event.time;
            elapsed += event.time;
            resolved.clear();
        }

        // The drift above already carried the sphere to the contact
        let response = impulse::resolve(event.kind, state, bounds, constants, 0.0);
        resolved.insert(event.kind);
        if response.is_contact() {
            log::debug!(
                "{} contact at {:.5}s: {:?}, velocity {}",
                event.kind.as_str(),
                elapsed,
                response,
                state.velocity
            );
            report.events.push(ContactEvent {
                kind: event.kind,
                time: elapsed,
            });
        }
        if matches!(response, Response::Stopped) && event.kind == ContactKind::Floor {
            log::debug!("landed at {}", state.position);
        }
    }

    report.phase = classify(state, bounds, constants);
    report
}

/// Exact free flight for `t` seconds
#[inline]
fn drift(state: &mut SphereState, t: f32, gravity: f32) {
    state.position += ballistic_offset(state.velocity, gravity, t);
    state.velocity.z -= gravity * t;
}

/// External commands for a single frame
#[derive(Debug, Clone, Default)]
pub struct TickInput {
    /// Arm the simulation (start moving)
    pub start: bool,
    /// Disarm the simulation (freeze in place)
    pub stop: bool,
}

/// A gated simulation run: the sphere, its box, and the start/stop switch
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Simulation {
    state: SphereState,
    bounds: EnclosureBounds,
    constants: PhysicalConstants,
    phase: Phase,
    running: bool,
    max_contact_events: u32,
    frames: u64,
    elapsed: f64,
    /// Contacts of the last frame (not persisted)
    #[serde(skip)]
    events: Vec<ContactEvent>,
}

impl Simulation {
    /// Build a stopped simulation from validated settings
    pub fn new(settings: &Settings) -> Result<Self, SimError> {
        settings.validate()?;
        let state = settings.initial_state()?;
        Self::with_state(settings.bounds, settings.constants, state, settings.max_contact_events)
    }

    /// Build a stopped simulation from parts
    pub fn with_state(
        bounds: EnclosureBounds,
        constants: PhysicalConstants,
        state: SphereState,
        max_contact_events: u32,
    ) -> Result<Self, SimError> {
        bounds.validate()?;
        constants.validate()?;
        bounds.check_state(&state)?;
        if max_contact_events == 0 {
            return Err(SimError::InvalidConstant {
                name: "max_contact_events",
                reason: "must be > 0",
            });
        }
        Ok(Self {
            phase: classify(&state, &bounds, &constants),
            state,
            bounds,
            constants,
            running: false,
            max_contact_events,
            frames: 0,
            elapsed: 0.0,
            events: Vec::new(),
        })
    }

    /// Advance one frame if the run is armed
    pub fn tick(&mut self, input: &TickInput, dt: f32) {
        if input.stop && self.running {
            self.running = false;
            log::info!("Simulation stopped at frame {}", self.frames);
        }
        if input.start && !self.running {
            self.running = true;
            log::info!("Simulation started at frame {}", self.frames);
        }

        self.events.clear();
        if !self.running {
            return;
        }
        if !dt.is_finite() || dt < 0.0 {
            log::warn!("Ignoring frame with invalid dt {}", dt);
            return;
        }

        let report = advance_capped(
            &mut self.state,
            &self.bounds,
            &self.constants,
            dt,
            self.max_contact_events,
        );
        self.frames += 1;
        self.elapsed += f64::from(dt);

        if report.phase != self.phase {
            log::info!("Phase {:?} -> {:?} at {:.3}s", self.phase, report.phase, self.elapsed);
        }
        self.phase = report.phase;
        self.events = report.events;

        if self.phase == Phase::Resting {
            self.running = false;
            log::info!(
                "Sphere at rest at {} after {} frames",
                self.state.position,
                self.frames
            );
        }
    }

    /// Give the sphere new velocities and arm the run
    pub fn launch(&mut self, velocity: Vec3, angular_velocity: Vec3) {
        self.state.velocity = velocity;
        self.state.angular_velocity = angular_velocity;
        self.phase = classify(&self.state, &self.bounds, &self.constants);
        self.running = true;
        log::info!("Launched with velocity {} spin {}", velocity, angular_velocity);
    }

    pub fn state(&self) -> &SphereState {
        &self.state
    }

    pub fn bounds(&self) -> &EnclosureBounds {
        &self.bounds
    }

    pub fn constants(&self) -> &PhysicalConstants {
        &self.constants
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Contacts resolved during the last frame
    pub fn events(&self) -> &[ContactEvent] {
        &self.events
    }

    pub fn frames(&self) -> u64 {
        self.frames
    }

    /// Simulated seconds
    pub fn elapsed(&self) -> f64 {
        self.elapsed
    }
}
