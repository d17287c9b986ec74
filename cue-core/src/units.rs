//! Unit helpers.
//!
//! The simulator works in meters and meters per second. Scenario code
//! usually thinks in centimeters, so these convert at the boundary.

/// Centimeters to meters.
pub fn cm(cm: f64) -> f64 {
    cm / 100.0
}

/// Meters (identity, for symmetry at call sites).
pub fn m(m: f64) -> f64 {
    m
}

/// Centimeters per second to meters per second.
pub fn cmps(cmps: f64) -> f64 {
    cmps / 100.0
}

/// Meters per second (identity).
pub fn mps(mps: f64) -> f64 {
    mps
}

/// Meters to centimeters. Render coordinates use this scale.
pub fn m_to_cm(m: f64) -> f64 {
    m * 100.0
}

/// Meters per second to centimeters per second.
pub fn mps_to_cmps(mps: f64) -> f64 {
    mps * 100.0
}
