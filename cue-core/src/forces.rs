//! Resistive forces acting on a ball rolling over the cloth.
//!
//! The only force the table itself exerts is kinetic friction:
//!
//! ```text
//! F_friction = -v̂ * (u * m * g)
//! ```
//!
//! It has constant magnitude while the ball moves and vanishes when the
//! velocity is exactly zero (v̂ of the zero vector is the zero vector).
//! Applied forces from input come in through the ball's force buffer.

use crate::body::MassPoint;
use crate::config::SimConfig;
use crate::types::Vec2;

/// Trait for forces that depend only on a body's own state.
pub trait ForceModel {
    /// Force acting on `point` this step (N).
    fn force(&self, point: &MassPoint) -> Vec2;
}

/// Coulomb kinetic friction against the table cloth.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct KineticFriction {
    /// Friction coefficient u
    pub coefficient: f64,
    /// Gravitational acceleration g (m/s²)
    pub gravity: f64,
}

impl KineticFriction {
    pub fn new(coefficient: f64, gravity: f64) -> Self {
        Self {
            coefficient,
            gravity,
        }
    }

    pub fn from_config(config: &SimConfig) -> Self {
        Self::new(config.friction, config.gravity)
    }

    /// Frictionless cloth (for testing).
    pub fn none() -> Self {
        Self::new(0.0, 0.0)
    }

    /// Magnitude of the friction force on a moving body of `mass` kg.
    pub fn magnitude(&self, mass: f64) -> f64 {
        self.coefficient * mass * self.gravity
    }
}

impl ForceModel for KineticFriction {
    fn force(&self, point: &MassPoint) -> Vec2 {
        -(point.vel.normalized() * self.magnitude(point.mass))
    }
}
