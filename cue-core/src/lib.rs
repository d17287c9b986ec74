//! # Cue Core
//!
//! A fixed-step physics engine for billiard balls on a rectangular table.
//!
//! ## Architecture
//!
//! - `types`: Core value types (Vec2, Rgb)
//! - `units`: Centimeter / meter conversions
//! - `config`: Immutable simulation parameters, YAML loader
//! - `body`: Mass points and balls
//! - `forces`: Kinetic friction against the cloth
//! - `integrator`: Semi-implicit Euler with cushion bounces and friction stop
//! - `collision`: Ball-ball and ball-cushion detection and resolution
//! - `render`: Drawing surface adapter and backends
//! - `world`: The simulator, its step loop and hook registry

pub mod body;
pub mod collision;
pub mod config;
pub mod forces;
pub mod integrator;
pub mod render;
pub mod types;
pub mod units;
pub mod world;

pub use body::{Ball, MassPoint};
pub use config::{ConfigError, ConfigLoader, SimConfig};
pub use render::{DrawSurface, RasterSurface, RecordingSurface, Renderer};
pub use types::{Rgb, Vec2};
pub use world::{BallId, HookError, SimError, Simulator};
