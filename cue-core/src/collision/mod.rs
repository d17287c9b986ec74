//! Collision detection and resolution for balls on a rectangular table.
//!
//! This module handles:
//! - **Detection**: overlap tests between ball pairs and against cushions
//! - **Resolution**: positional correction plus elastic velocity response
//!
//! ## Positional Correction
//!
//! Detection runs after integration, so contacts are found already
//! overlapping. Before exchanging velocities, both balls are pushed apart
//! along the line of centers until they just touch:
//!
//! ```text
//!   before          after
//!    ( i (▓) j )    ( i )( j )
//!        └ penetration, split half/half
//! ```

pub mod detection;
pub mod resolution;

pub use detection::*;
pub use resolution::*;
