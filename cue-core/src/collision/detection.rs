//! Overlap tests against other balls and the table cushions.
//!
//! Detection is discrete: it looks at positions after integration and
//! reports what overlaps right now. Nothing is swept, so a ball fast enough
//! to cross another within one step can tunnel through it.

use crate::body::Ball;
use crate::config::TableConfig;
use crate::types::Vec2;

/// Contact between two balls `i` and `j`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Contact {
    /// Unit normal pointing from ball `i` toward ball `j`
    pub normal: Vec2,
    /// Sum of radii minus center distance (>= 0)
    pub penetration: f64,
}

/// Unit vector from `a`'s center to `b`'s center.
///
/// Coincident centers have no defined direction; they fall back to
/// [`Vec2::UNIT_X`] so the pair still separates deterministically.
pub fn contact_normal(a: &Ball, b: &Ball) -> Vec2 {
    let n = (b.pos() - a.pos()).normalized();
    if n == Vec2::ZERO {
        Vec2::UNIT_X
    } else {
        n
    }
}

/// Returns the contact between `a` and `b`, or `None` if they are apart.
///
/// Touching balls (distance exactly equal to the sum of radii) count as a
/// contact with zero penetration.
pub fn detect_pair(a: &Ball, b: &Ball) -> Option<Contact> {
    if !a.is_contacted(b) {
        return None;
    }
    let dist = (b.pos() - a.pos()).length();
    Some(Contact {
        normal: contact_normal(a, b),
        penetration: a.radius + b.radius - dist,
    })
}

/// A table cushion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Wall {
    Left,
    Right,
    Top,
    Bottom,
}

/// Cushions a ball is pushing into, at most one per axis.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WallContacts {
    pub x: Option<Wall>,
    pub y: Option<Wall>,
}

impl WallContacts {
    pub fn any(&self) -> bool {
        self.x.is_some() || self.y.is_some()
    }
}

/// Check whether the ball's edge has crossed any cushion.
pub fn detect_walls(ball: &Ball, table: &TableConfig) -> WallContacts {
    let pos = ball.pos();
    let r = ball.radius;

    let x = if pos.x < r {
        Some(Wall::Left)
    } else if table.width - r < pos.x {
        Some(Wall::Right)
    } else {
        None
    };

    let y = if pos.y < r {
        Some(Wall::Top)
    } else if table.height - r < pos.y {
        Some(Wall::Bottom)
    } else {
        None
    };

    WallContacts { x, y }
}
