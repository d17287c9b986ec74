//! Bodies that live on the table.
//!
//! A [`Ball`] is a circle wrapped around a [`MassPoint`]: the mass point
//! carries the kinematic state and the force buffer, the ball adds the
//! geometry and the color used to draw it.

use serde::{Deserialize, Serialize};

use crate::config::BallConfig;
use crate::types::{Rgb, Vec2};

// =============================================================================
// MassPoint
// =============================================================================

/// Kinematic state of a point mass.
///
/// `force` accumulates every force applied since the last step. The
/// integrator consumes it and resets it to zero at the end of each step.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MassPoint {
    pub pos: Vec2,
    pub vel: Vec2,
    /// Mass in kg, must be > 0
    pub mass: f64,
    pub force: Vec2,
}

impl MassPoint {
    pub fn new(pos: Vec2, mass: f64) -> Self {
        debug_assert!(mass > 0.0, "mass must be positive, got {}", mass);
        Self {
            pos,
            vel: Vec2::ZERO,
            mass,
            force: Vec2::ZERO,
        }
    }

    /// Add `f` to the force buffer for the next step.
    pub fn apply_force(&mut self, f: Vec2) {
        self.force += f;
    }

    pub fn reset_force(&mut self) {
        self.force.set_zero();
    }

    /// Replace the velocity outright (launch impulses, not forces).
    pub fn set_velocity(&mut self, vel: Vec2) {
        self.vel = vel;
    }

    pub fn is_at_rest(&self) -> bool {
        self.vel == Vec2::ZERO
    }

    /// Translational kinetic energy (J)
    pub fn kinetic_energy(&self) -> f64 {
        0.5 * self.mass * self.vel.length_squared()
    }

    /// Linear momentum (kg·m/s)
    pub fn momentum(&self) -> Vec2 {
        self.vel * self.mass
    }
}

// =============================================================================
// Ball
// =============================================================================

/// A billiard ball.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Ball {
    pub point: MassPoint,
    /// Radius in meters, must be > 0
    pub radius: f64,
    pub color: Rgb,
}

impl Ball {
    pub fn new(pos: Vec2, color: Rgb, mass: f64, radius: f64) -> Self {
        debug_assert!(radius > 0.0, "radius must be positive, got {}", radius);
        Self {
            point: MassPoint::new(pos, mass),
            radius,
            color,
        }
    }

    /// Ball at rest with the configured default mass and radius.
    pub fn with_defaults(pos: Vec2, color: Rgb, defaults: &BallConfig) -> Self {
        Self::new(pos, color, defaults.mass, defaults.radius)
    }

    pub fn pos(&self) -> Vec2 {
        self.point.pos
    }

    pub fn vel(&self) -> Vec2 {
        self.point.vel
    }

    pub fn mass(&self) -> f64 {
        self.point.mass
    }

    pub fn apply_force(&mut self, f: Vec2) {
        self.point.apply_force(f);
    }

    pub fn reset_force(&mut self) {
        self.point.reset_force();
    }

    pub fn set_velocity(&mut self, vel: Vec2) {
        self.point.set_velocity(vel);
    }

    /// True when the two circles overlap or touch.
    pub fn is_contacted(&self, other: &Ball) -> bool {
        let reach = self.radius + other.radius;
        (self.point.pos - other.point.pos).length_squared() <= reach * reach
    }
}

// =============================================================================
// Tests
// =============================================================================
