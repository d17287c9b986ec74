//! Collision response for cushions and ball pairs.
//!
//! ## Model Assumptions
//!
//! - **Perfectly elastic cushions**: a ball that crosses a cushion is put
//!   back against it and the velocity component along that axis flips.
//!   Each axis is handled on its own, so a corner flips both.
//! - **Frictionless ball contact**: only the component along the contact
//!   normal is exchanged; the tangential component passes through.
//! - **Single pass**: each pair is resolved at most once per step in index
//!   order. A ball touching two others at once is corrected against each
//!   in turn and never revisited, so heavy pile-ups can keep some overlap.
//!
//! ## Pair Exchange
//!
//! ```text
//!   before                      after
//!   (i)→   ←(j)                 ←(i)   (j)→
//!
//!   n   : unit normal from i to j
//!   nᵢ  : vᵢ projected on n      tᵢ : vᵢ projected on n rotated CCW
//!
//!   nⱼ' = (mᵢnᵢ + mⱼnⱼ + mᵢ(nᵢ - nⱼ)) / (mᵢ + mⱼ)
//!   nᵢ' = nⱼ' - (nᵢ - nⱼ)
//!   vᵢ' = tᵢ + nᵢ'      vⱼ' = tⱼ + nⱼ'
//! ```

use tracing::{debug, trace};

use super::detection::{contact_normal, detect_pair, detect_walls, Contact, Wall, WallContacts};
use crate::body::Ball;
use crate::config::TableConfig;

/// Push a ball that crossed a cushion back onto the table and reflect it.
///
/// Returns the cushions that were hit.
pub fn resolve_walls(ball: &mut Ball, table: &TableConfig) -> WallContacts {
    let hits = detect_walls(ball, table);
    let r = ball.radius;
    let point = &mut ball.point;

    match hits.y {
        Some(Wall::Top) => {
            point.pos.y = r;
            point.vel.y = -point.vel.y;
        }
        Some(Wall::Bottom) => {
            point.pos.y = table.height - r;
            point.vel.y = -point.vel.y;
        }
        _ => {}
    }

    match hits.x {
        Some(Wall::Left) => {
            point.pos.x = r;
            point.vel.x = -point.vel.x;
        }
        Some(Wall::Right) => {
            point.pos.x = table.width - r;
            point.vel.x = -point.vel.x;
        }
        _ => {}
    }

    if hits.any() {
        trace!(?hits, pos = %point.pos, "cushion bounce");
    }
    hits
}

/// Move both balls apart along the contact normal, half the penetration
/// each, so they end up exactly touching.
pub fn separate(a: &mut Ball, b: &mut Ball, contact: &Contact) {
    let half = contact.normal * (0.5 * contact.penetration);
    a.point.pos -= half;
    b.point.pos += half;
}

/// Elastic exchange of the normal velocity components of two balls.
///
/// The normal is re-derived from the current centers, so call this after
/// [`separate`].
pub fn exchange_velocities(a: &mut Ball, b: &mut Ball) {
    let n = contact_normal(a, b);
    let t = n.rotated_ccw();

    let n_a = a.vel().project_onto(&n);
    let t_a = a.vel().project_onto(&t);
    let n_b = b.vel().project_onto(&n);
    let t_b = b.vel().project_onto(&t);

    let (m_a, m_b) = (a.mass(), b.mass());
    let momentum = n_a * m_a + n_b * m_b;
    let relative = n_a - n_b;

    let n_b_after = (momentum + relative * m_a) / (m_a + m_b);
    let n_a_after = n_b_after - relative;

    a.point.vel = t_a + n_a_after;
    b.point.vel = t_b + n_b_after;
}

/// Resolve one pair if it is in contact. Returns the contact that was
/// resolved.
pub fn resolve_pair(a: &mut Ball, b: &mut Ball) -> Option<Contact> {
    let contact = detect_pair(a, b)?;
    separate(a, b, &contact);
    exchange_velocities(a, b);
    Some(contact)
}

/// Resolve every contacting pair `(i, j)` with `i < j`, once, in index order.
///
/// Returns the number of pairs resolved.
pub fn resolve_all_pairs(balls: &mut [Ball]) -> usize {
    let mut resolved = 0;
    for j in 1..balls.len() {
        let (head, tail) = balls.split_at_mut(j);
        let b = &mut tail[0];
        for (i, a) in head.iter_mut().enumerate() {
            if let Some(contact) = resolve_pair(a, b) {
                debug!(i, j, penetration = contact.penetration, "ball collision");
                resolved += 1;
            }
        }
    }
    resolved
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Rgb, Vec2};

    fn ball(x: f64, y: f64, vx: f64, vy: f64) -> Ball {
        let mut b = Ball::new(Vec2::new(x, y), Rgb::WHITE, 0.5, 0.1);
        b.set_velocity(Vec2::new(vx, vy));
        b
    }

    fn table() -> TableConfig {
        TableConfig {
            width: 2.0,
            height: 1.0,
        }
    }

    fn close(a: Vec2, b: Vec2) -> bool {
        (a - b).length() < 1e-12
    }

    #[test]
    fn test_left_wall_clamps_and_reflects() {
        let mut b = ball(0.05, 0.5, -1.0, 0.3);
        let hits = resolve_walls(&mut b, &table());
        assert_eq!(hits.x, Some(Wall::Left));
        assert_eq!(b.pos().x, 0.1);
        assert_eq!(b.vel(), Vec2::new(1.0, 0.3));

        // already back on the table: no second flip
        let again = resolve_walls(&mut b, &table());
        assert!(!again.any());
        assert_eq!(b.vel().x, 1.0);
    }

    #[test]
    fn test_corner_reflects_both_axes() {
        let mut b = ball(1.95, 0.97, 2.0, 1.0);
        resolve_walls(&mut b, &table());
        assert!(close(b.pos(), Vec2::new(1.9, 0.9)));
        assert_eq!(b.vel(), Vec2::new(-2.0, -1.0));
    }

    #[test]
    fn test_head_on_equal_mass_exchange() {
        let mut a = ball(1.0, 0.5, 2.0, 0.0);
        let mut b = ball(1.2, 0.5, -2.0, 0.0);
        exchange_velocities(&mut a, &mut b);
        assert!(close(a.vel(), Vec2::new(-2.0, 0.0)), "got {}", a.vel());
        assert!(close(b.vel(), Vec2::new(2.0, 0.0)), "got {}", b.vel());
    }

    #[test]
    fn test_moving_into_resting_ball_stops_cue() {
        let mut cue = ball(1.0, 0.5, 3.0, 0.0);
        let mut object = ball(1.2, 0.5, 0.0, 0.0);
        exchange_velocities(&mut cue, &mut object);
        assert!(close(cue.vel(), Vec2::ZERO));
        assert!(close(object.vel(), Vec2::new(3.0, 0.0)));
    }

    #[test]
    fn test_tangential_component_passes_through() {
        // contact normal is the x axis; y velocities are tangential
        let mut a = ball(1.0, 0.5, 1.0, 0.7);
        let mut b = ball(1.2, 0.5, 0.0, -0.4);
        exchange_velocities(&mut a, &mut b);
        assert!(close(a.vel(), Vec2::new(0.0, 0.7)));
        assert!(close(b.vel(), Vec2::new(1.0, -0.4)));
    }

    #[test]
    fn test_unequal_mass_conserves_momentum_and_energy() {
        let mut a = ball(1.0, 0.5, 1.5, 0.5);
        let mut b = Ball::new(Vec2::new(1.15, 0.62), Rgb::BLACK, 1.7, 0.1);
        b.set_velocity(Vec2::new(-0.4, 0.2));

        let p_before = a.point.momentum() + b.point.momentum();
        let e_before = a.point.kinetic_energy() + b.point.kinetic_energy();
        exchange_velocities(&mut a, &mut b);
        let p_after = a.point.momentum() + b.point.momentum();
        let e_after = a.point.kinetic_energy() + b.point.kinetic_energy();

        assert!(close(p_before, p_after), "{} vs {}", p_before, p_after);
        assert!((e_before - e_after).abs() < 1e-12);
    }

    #[test]
    fn test_separation_is_symmetric() {
        let mut a = ball(1.0, 0.5, 0.0, 0.0);
        let mut b = ball(1.15, 0.5, 0.0, 0.0);
        let contact = resolve_pair(&mut a, &mut b).expect("overlapping");

        assert!((contact.penetration - 0.05).abs() < 1e-12);
        assert!((a.pos().x - 0.975).abs() < 1e-12);
        assert!((b.pos().x - 1.175).abs() < 1e-12);
        assert!(((b.pos() - a.pos()).length() - 0.2).abs() < 1e-12);
    }

    #[test]
    fn test_coincident_centers_separate_along_x() {
        let mut a = ball(1.0, 0.5, 0.0, 1.0);
        let mut b = ball(1.0, 0.5, 0.0, 0.0);
        resolve_pair(&mut a, &mut b).expect("coincident balls overlap");

        assert!(close(a.pos(), Vec2::new(0.9, 0.5)));
        assert!(close(b.pos(), Vec2::new(1.1, 0.5)));
        // motion is purely tangential to the fallback normal
        assert!(close(a.vel(), Vec2::new(0.0, 1.0)));
        assert!(close(b.vel(), Vec2::ZERO));
    }

    #[test]
    fn test_resolve_all_pairs_skips_separated() {
        let mut balls = vec![
            ball(0.5, 0.5, 1.0, 0.0),
            ball(0.65, 0.5, 0.0, 0.0),
            ball(1.5, 0.5, 0.0, 0.0),
        ];
        assert_eq!(resolve_all_pairs(&mut balls), 1);
        assert_eq!(balls[2].pos(), Vec2::new(1.5, 0.5));
        assert!(close(balls[1].vel(), Vec2::new(1.0, 0.0)));
    }
}
