//! Simulation error types
//!
//! Every failure is a construction-time problem: a degenerate enclosure, an
//! oversized sphere, nonsense constants or an unreadable settings file.
//! Stepping the simulation itself never fails.

use std::fmt;

/// Unified error type for configuring a simulation.
#[derive(Clone, Debug, PartialEq)]
pub enum SimError {
    /// Wall or floor planes are inverted, coincident or not finite.
    InvalidBounds {
        /// Which rule was broken
        reason: &'static str,
    },
    /// The sphere cannot fit between two opposite walls.
    RadiusTooLarge {
        /// Sphere radius
        radius: f32,
        /// Half of the smaller horizontal span
        limit: f32,
    },
    /// Radius (scale times base radius) is not a positive finite number.
    InvalidRadius {
        /// The rejected radius
        radius: f32,
    },
    /// A physical constant or threshold is out of range.
    InvalidConstant {
        /// Field name
        name: &'static str,
        /// Which rule was broken
        reason: &'static str,
    },
    /// The starting sphere state lies outside the enclosure.
    InvalidState {
        /// Which rule was broken
        reason: &'static str,
    },
    /// Settings file could not be read or written.
    Io {
        /// Underlying error text
        message: String,
    },
    /// Settings JSON could not be decoded.
    Parse {
        /// Underlying error text
        message: String,
    },
}

impl fmt::Display for SimError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidBounds { reason } => write!(f, "invalid enclosure bounds: {reason}"),
            Self::RadiusTooLarge { radius, limit } => {
                write!(f, "sphere radius {radius} must be below {limit}")
            }
            Self::InvalidRadius { radius } => write!(f, "sphere radius {radius} is not positive"),
            Self::InvalidConstant { name, reason } => write!(f, "invalid {name}: {reason}"),
            Self::InvalidState { reason } => write!(f, "invalid sphere state: {reason}"),
            Self::Io { message } => write!(f, "I/O error: {message}"),
            Self::Parse { message } => write!(f, "settings parse error: {message}"),
        }
    }
}

impl std::error::Error for SimError {}

impl From<std::io::Error> for SimError {
    fn from(e: std::io::Error) -> Self {
        Self::Io {
            message: e.to_string(),
        }
    }
}

impl From<serde_json::Error> for SimError {
    fn from(e: serde_json::Error) -> Self {
        Self::Parse {
            message: e.to_string(),
        }
    }
}
