//! Core value types for the simulation.
//!
//! All physics quantities are SI:
//! - Position: meters (m)
//! - Velocity: meters per second (m/s)
//! - Mass: kilograms (kg)
//! - Force: Newtons (N)
//!
//! Render coordinates are centimeters; see [`crate::render`].

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, AddAssign, Div, Mul, Neg, Sub, SubAssign};
use std::str::FromStr;

// =============================================================================
// Vec2 - 2D Vector
// =============================================================================

/// A 2D vector used for positions, velocities and forces.
///
/// `Vec2` is a plain `Copy` value: every method returns a new vector.
/// The compound-assignment operators (`+=`, `-=`) are the only in-place
/// updates, and they are spelled as operators so the two disciplines never
/// share a name.
///
/// Coordinate system (screen space, matches the raster surface):
/// - X: along the table width, positive to the right
/// - Y: along the table height, positive downward
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Vec2 {
    pub x: f64,
    pub y: f64,
}

impl Vec2 {
    pub const ZERO: Vec2 = Vec2 { x: 0.0, y: 0.0 };
    pub const UNIT_X: Vec2 = Vec2 { x: 1.0, y: 0.0 };

    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Squared length (avoids sqrt for comparisons)
    pub fn length_squared(&self) -> f64 {
        self.x * self.x + self.y * self.y
    }

    /// Euclidean length of the vector
    pub fn length(&self) -> f64 {
        self.length_squared().sqrt()
    }

    /// Returns a unit vector in the same direction.
    ///
    /// A vector whose length is exactly zero normalizes to [`Vec2::ZERO`].
    pub fn normalized(&self) -> Self {
        let len = self.length();
        if len != 0.0 {
            *self * (1.0 / len)
        } else {
            Self::ZERO
        }
    }

    /// Dot product
    pub fn dot(&self, other: &Self) -> f64 {
        self.x * other.x + self.y * other.y
    }

    /// Quarter turn clockwise: `(x, y) -> (y, -x)`
    pub fn rotated_cw(&self) -> Self {
        Self {
            x: self.y,
            y: -self.x,
        }
    }

    /// Quarter turn counter-clockwise: `(x, y) -> (-y, x)`
    pub fn rotated_ccw(&self) -> Self {
        Self {
            x: -self.y,
            y: self.x,
        }
    }

    /// Component of this vector along `axis`, returned as a vector.
    ///
    /// `axis` must already be a unit vector; no renormalization happens here.
    pub fn project_onto(&self, axis: &Self) -> Self {
        *axis * self.dot(axis)
    }

    /// Resets both components to zero.
    pub fn set_zero(&mut self) {
        *self = Self::ZERO;
    }
}

// Operator overloads for Vec2
impl Add for Vec2 {
    type Output = Self;
    fn add(self, other: Self) -> Self {
        Self {
            x: self.x + other.x,
            y: self.y + other.y,
        }
    }
}

impl AddAssign for Vec2 {
    fn add_assign(&mut self, other: Self) {
        self.x += other.x;
        self.y += other.y;
    }
}

impl Sub for Vec2 {
    type Output = Self;
    fn sub(self, other: Self) -> Self {
        Self {
            x: self.x - other.x,
            y: self.y - other.y,
        }
    }
}

impl SubAssign for Vec2 {
    fn sub_assign(&mut self, other: Self) {
        self.x -= other.x;
        self.y -= other.y;
    }
}

impl Mul<f64> for Vec2 {
    type Output = Self;
    fn mul(self, scalar: f64) -> Self {
        Self {
            x: self.x * scalar,
            y: self.y * scalar,
        }
    }
}

impl Div<f64> for Vec2 {
    type Output = Self;
    fn div(self, scalar: f64) -> Self {
        Self {
            x: self.x / scalar,
            y: self.y / scalar,
        }
    }
}

impl Neg for Vec2 {
    type Output = Self;
    fn neg(self) -> Self {
        Self {
            x: -self.x,
            y: -self.y,
        }
    }
}

impl Default for Vec2 {
    fn default() -> Self {
        Self::ZERO
    }
}

impl fmt::Display for Vec2 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Vec2[{}, {}]", self.x, self.y)
    }
}

// =============================================================================
// Rgb - 8-bit color
// =============================================================================

/// An 8-bit-per-channel color.
///
/// Formats as `#rrggbb` (lowercase, zero padded) and parses from the same
/// form, which is also how it appears in config files.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const WHITE: Rgb = Rgb::new(255, 255, 255);
    pub const BLACK: Rgb = Rgb::new(0, 0, 0);
    /// Felt green used for the table background
    pub const FELT: Rgb = Rgb::new(0x00, 0xb1, 0x59);

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

/// Error returned when a string is not a `#rrggbb` color.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseRgbError(pub String);

impl fmt::Display for ParseRgbError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid color '{}', expected #rrggbb", self.0)
    }
}

impl std::error::Error for ParseRgbError {}

impl FromStr for Rgb {
    type Err = ParseRgbError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = || ParseRgbError(s.to_string());
        let hex = s.strip_prefix('#').ok_or_else(err)?;
        if hex.len() != 6 || !hex.is_ascii() {
            return Err(err());
        }
        let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).map_err(|_| err());
        Ok(Self::new(channel(0)?, channel(2)?, channel(4)?))
    }
}

impl TryFrom<String> for Rgb {
    type Error = ParseRgbError;
    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Rgb> for String {
    fn from(color: Rgb) -> Self {
        color.to_string()
    }
}

// =============================================================================
// Tests
// =============================================================================
