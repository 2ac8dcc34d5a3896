//! Deterministic simulation module
//!
//! All physics lives here. Stepping is pure: the same state, settings and
//! frame deltas always produce the same trajectory, and nothing in here
//! touches the filesystem or a clock.

pub mod contact;
pub mod impulse;
pub mod rolling;
pub mod state;
pub mod tick;

pub use contact::{ContactMask, earliest_contact};
pub use impulse::{Response, resolve};
pub use rolling::roll;
pub use state::{
    Axis, ContactEvent, ContactKind, EnclosureBounds, FrictionClamp, Phase, PhysicalConstants,
    SlipArrest, SphereState, WallPolicy,
};
pub use tick::{Simulation, StepReport, TickInput, advance, advance_capped, classify};
