//! Per-ball time integration.
//!
//! Each ball advances with semi-implicit (symplectic) Euler: velocity is
//! updated first and the new velocity moves the position.
//!
//! ## Algorithm
//!
//! Given applied force F, friction f and fixed step dt:
//!
//! ```text
//! 1. a     = (F + f) / m
//! 2. v_new = v + a*dt
//! 3. x_new = x + v_new*dt
//! 4. reflect off cushions
//! 5. if |v_new|² <= |f*dt/m|²  then v_new = 0
//! 6. F = 0
//! ```
//!
//! Step 5 is the friction stop: once the ball is slower than what friction
//! alone removes in one step, friction would overshoot and flip the
//! direction every step, so the ball is brought to rest instead.

use tracing::trace;

use crate::body::Ball;
use crate::collision::{resolve_walls, WallContacts};
use crate::config::TableConfig;
use crate::forces::{ForceModel, KineticFriction};
use crate::types::Vec2;

/// Outcome of integrating one ball for one step.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct IntegrationResult {
    /// Acceleration used this step
    pub acceleration: Vec2,
    /// Cushions hit during this step
    pub walls: WallContacts,
    /// True if the friction stop brought the ball to rest
    pub stopped: bool,
}

/// Semi-implicit Euler integrator for balls on a table with friction.
pub struct SemiImplicitEuler;

impl SemiImplicitEuler {
    /// Advance one ball by `dt` seconds.
    ///
    /// Consumes and clears the ball's force buffer.
    pub fn step(
        ball: &mut Ball,
        friction: &KineticFriction,
        table: &TableConfig,
        dt: f64,
    ) -> IntegrationResult {
        let friction_force = friction.force(&ball.point);

        let point = &mut ball.point;
        let acceleration = (point.force + friction_force) / point.mass;
        point.vel += acceleration * dt;
        point.pos += point.vel * dt;

        let walls = resolve_walls(ball, table);

        let point = &mut ball.point;
        let friction_dv = friction_force * (dt / point.mass);
        let mut stopped = false;
        if point.vel.length_squared() <= friction_dv.length_squared() {
            stopped = !point.is_at_rest();
            point.vel.set_zero();
        }
        if stopped {
            trace!(pos = %point.pos, "friction stop");
        }

        point.reset_force();

        IntegrationResult {
            acceleration,
            walls,
            stopped,
        }
    }

    /// Advance every ball by `dt`. Balls do not interact here, so the
    /// order does not matter.
    pub fn step_all(
        balls: &mut [Ball],
        friction: &KineticFriction,
        table: &TableConfig,
        dt: f64,
    ) -> usize {
        balls
            .iter_mut()
            .map(|ball| Self::step(ball, friction, table, dt))
            .filter(|result| result.stopped)
            .count()
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SimConfig;
    use crate::types::Rgb;

    const DT: f64 = 1.0 / 120.0;

    fn table() -> TableConfig {
        TableConfig::default()
    }

    fn ball_at(x: f64, y: f64) -> Ball {
        Ball::new(Vec2::new(x, y), Rgb::WHITE, 0.5, 0.032)
    }

    fn default_friction() -> KineticFriction {
        KineticFriction::from_config(&SimConfig::default())
    }

    #[test]
    fn test_rest_stays_at_rest() {
        let mut ball = ball_at(1.0, 0.6);
        for _ in 0..10 {
            let result = SemiImplicitEuler::step(&mut ball, &default_friction(), &table(), DT);
            assert!(!result.stopped);
        }
        assert_eq!(ball.vel(), Vec2::ZERO);
        assert_eq!(ball.pos(), Vec2::new(1.0, 0.6));
    }

    #[test]
    fn test_slow_ball_stops_in_one_step() {
        let friction = default_friction();
        // friction removes u*g*dt ≈ 0.0572 m/s per step
        let mut ball = ball_at(1.0, 0.6);
        ball.set_velocity(Vec2::new(0.03, -0.02));

        let result = SemiImplicitEuler::step(&mut ball, &friction, &table(), DT);
        assert!(result.stopped);
        assert_eq!(ball.vel(), Vec2::ZERO);

        // idempotent once at rest
        let result = SemiImplicitEuler::step(&mut ball, &friction, &table(), DT);
        assert!(!result.stopped);
        assert_eq!(ball.vel(), Vec2::ZERO);
    }

    #[test]
    fn test_friction_decelerates() {
        let friction = default_friction();
        let mut ball = ball_at(1.0, 0.6);
        ball.set_velocity(Vec2::new(2.0, 0.0));

        let result = SemiImplicitEuler::step(&mut ball, &friction, &table(), DT);
        let expected_dv = 0.7 * 9.80665 * DT;
        assert!((ball.vel().x - (2.0 - expected_dv)).abs() < 1e-12);
        assert!((result.acceleration.x + 0.7 * 9.80665).abs() < 1e-12);
        // position moves with the updated velocity
        assert!((ball.pos().x - (1.0 + ball.vel().x * DT)).abs() < 1e-12);
    }

    #[test]
    fn test_ball_eventually_rests() {
        let friction = default_friction();
        let mut ball = ball_at(1.0, 0.6);
        ball.set_velocity(Vec2::new(1.0, 0.5));

        let mut steps = 0;
        while !ball.point.is_at_rest() {
            SemiImplicitEuler::step(&mut ball, &friction, &table(), DT);
            steps += 1;
            assert!(steps < 1000, "ball never came to rest");
        }
        // |v| / (u g dt) ≈ 19.5 steps
        assert!((19..=21).contains(&steps), "took {} steps", steps);
    }

    #[test]
    fn test_applied_force_consumed_once() {
        let mut ball = ball_at(1.0, 0.6);
        ball.apply_force(Vec2::new(60.0, 0.0));

        SemiImplicitEuler::step(&mut ball, &KineticFriction::none(), &table(), DT);
        assert_eq!(ball.point.force, Vec2::ZERO);
        let v_after_push = ball.vel();
        assert!((v_after_push.x - 60.0 / 0.5 * DT).abs() < 1e-12);

        SemiImplicitEuler::step(&mut ball, &KineticFriction::none(), &table(), DT);
        assert_eq!(ball.vel(), v_after_push);
    }

    #[test]
    fn test_push_from_rest_overcomes_friction() {
        let friction = default_friction();
        let mut ball = ball_at(1.0, 0.6);
        // 1000 m/s² for one step, as the aim push does
        ball.apply_force(Vec2::new(1000.0 * 0.5, 0.0));

        let result = SemiImplicitEuler::step(&mut ball, &friction, &table(), DT);
        assert!(!result.stopped);
        assert!((ball.vel().x - 1000.0 * DT).abs() < 1e-9);
    }

    #[test]
    fn test_wall_bounce_frictionless() {
        let table = table();
        let mut ball = Ball::new(Vec2::new(0.05, 0.6), Rgb::WHITE, 0.5, 0.1);
        ball.set_velocity(Vec2::new(-1.0, 0.0));

        let result = SemiImplicitEuler::step(&mut ball, &KineticFriction::none(), &table, DT);
        assert!(result.walls.any());
        assert_eq!(ball.pos().x, 0.1);
        assert_eq!(ball.vel().x, 1.0);

        // next step moves away from the cushion without flipping again
        let result = SemiImplicitEuler::step(&mut ball, &KineticFriction::none(), &table, DT);
        assert!(!result.walls.any());
        assert_eq!(ball.vel().x, 1.0);
        assert!(ball.pos().x > 0.1);
    }

    #[test]
    fn test_step_all_counts_stops() {
        let friction = default_friction();
        let mut balls = vec![ball_at(0.5, 0.5), ball_at(1.0, 0.5), ball_at(1.5, 0.5)];
        balls[0].set_velocity(Vec2::new(0.01, 0.0));
        balls[1].set_velocity(Vec2::new(3.0, 0.0));

        let stopped = SemiImplicitEuler::step_all(&mut balls, &friction, &table(), DT);
        assert_eq!(stopped, 1);
        assert!(balls[0].point.is_at_rest());
        assert!(!balls[1].point.is_at_rest());
        assert!(balls[2].point.is_at_rest());
    }
}
