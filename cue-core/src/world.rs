//! The simulator: owns the balls and runs the fixed-step loop.
//!
//! ## Step
//!
//! One call to [`Simulator::step`] is one frame:
//!
//! ```text
//! update hooks (in registration order)
//!   [0] physics: integrate every ball, then resolve ball pairs
//!   [1..] user hooks
//! render hooks (in registration order)
//!   [0] background
//!   [1] balls
//!   [2..] user hooks
//! ```
//!
//! Logical time always advances by the configured `dt`, however much wall
//! time passed between calls.
//!
//! ## Hook contract
//!
//! - An [`UpdateHook`] gets `(dt, &mut [Ball])` and may change any ball:
//!   apply forces, set velocities, move them.
//! - A [`RenderHook`] gets `(&mut Renderer, &[Ball])` and may issue draw
//!   calls; the balls are read-only while rendering.
//! - A hook that returns `Err` stops the phase: later hooks in the same
//!   phase do not run and the error is returned to the caller of
//!   `update`/`render`/`step`. Work done by earlier hooks is kept.
//! - Balls and hooks can only be added between steps; the borrow checker
//!   enforces it.

use std::fmt;

use tracing::{debug, info};

use crate::body::Ball;
use crate::collision::resolve_all_pairs;
use crate::config::{SimConfig, TableConfig};
use crate::forces::KineticFriction;
use crate::integrator::SemiImplicitEuler;
use crate::render::{DrawSurface, Render, Renderer};
use crate::types::Rgb;
use crate::units::m_to_cm;

/// Error returned by a hook.
pub type HookError = Box<dyn std::error::Error + Send + Sync>;

/// Index of a ball in its simulator, stable for the simulator's lifetime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BallId(pub usize);

/// Error surfaced from a failed step.
#[derive(Debug)]
pub enum SimError {
    UpdateHook { index: usize, source: HookError },
    RenderHook { index: usize, source: HookError },
}

impl fmt::Display for SimError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SimError::UpdateHook { index, source } => {
                write!(f, "update hook #{} failed: {}", index, source)
            }
            SimError::RenderHook { index, source } => {
                write!(f, "render hook #{} failed: {}", index, source)
            }
        }
    }
}

impl std::error::Error for SimError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SimError::UpdateHook { source, .. } | SimError::RenderHook { source, .. } => {
                Some(source.as_ref())
            }
        }
    }
}

// =============================================================================
// Hooks
// =============================================================================

/// Runs once per step during the update phase.
pub trait UpdateHook {
    fn update(&mut self, dt: f64, balls: &mut [Ball]) -> Result<(), HookError>;
}

impl<F> UpdateHook for F
where
    F: FnMut(f64, &mut [Ball]) -> Result<(), HookError>,
{
    fn update(&mut self, dt: f64, balls: &mut [Ball]) -> Result<(), HookError> {
        self(dt, balls)
    }
}

/// Runs once per step during the render phase.
pub trait RenderHook<S> {
    fn render(&mut self, renderer: &mut Renderer<S>, balls: &[Ball]) -> Result<(), HookError>;
}

impl<S, F> RenderHook<S> for F
where
    F: FnMut(&mut Renderer<S>, &[Ball]) -> Result<(), HookError>,
{
    fn render(&mut self, renderer: &mut Renderer<S>, balls: &[Ball]) -> Result<(), HookError> {
        self(renderer, balls)
    }
}

/// Default update hook: integration followed by pairwise collisions.
pub struct PhysicsHook {
    friction: KineticFriction,
    table: TableConfig,
}

impl PhysicsHook {
    pub fn new(config: &SimConfig) -> Self {
        Self {
            friction: KineticFriction::from_config(config),
            table: config.table,
        }
    }
}

impl UpdateHook for PhysicsHook {
    fn update(&mut self, dt: f64, balls: &mut [Ball]) -> Result<(), HookError> {
        SemiImplicitEuler::step_all(balls, &self.friction, &self.table, dt);
        resolve_all_pairs(balls);
        Ok(())
    }
}

/// Default render hook: paints the whole table in the cloth color.
pub struct BackgroundHook {
    table: TableConfig,
    color: Rgb,
}

impl BackgroundHook {
    pub fn new(config: &SimConfig) -> Self {
        Self {
            table: config.table,
            color: config.background,
        }
    }
}

impl<S: DrawSurface> RenderHook<S> for BackgroundHook {
    fn render(&mut self, renderer: &mut Renderer<S>, _balls: &[Ball]) -> Result<(), HookError> {
        renderer.rect(
            0.0,
            0.0,
            m_to_cm(self.table.width),
            m_to_cm(self.table.height),
            self.color,
        );
        Ok(())
    }
}

/// Default render hook: draws every ball in insertion order.
pub struct BallsHook;

impl<S: DrawSurface> RenderHook<S> for BallsHook {
    fn render(&mut self, renderer: &mut Renderer<S>, balls: &[Ball]) -> Result<(), HookError> {
        for ball in balls {
            ball.render(renderer);
        }
        Ok(())
    }
}

// =============================================================================
// Simulator
// =============================================================================

/// A billiard table simulation drawing onto `S`.
pub struct Simulator<S> {
    config: SimConfig,
    balls: Vec<Ball>,
    renderer: Renderer<S>,
    update_hooks: Vec<Box<dyn UpdateHook>>,
    render_hooks: Vec<Box<dyn RenderHook<S>>>,
    frame: u64,
}

impl<S: DrawSurface + 'static> Simulator<S> {
    /// Create a simulator with the default physics and render hooks
    /// installed.
    pub fn new(config: SimConfig, surface: S) -> Self {
        let renderer = Renderer::new(surface, config.render_scale);
        let update_hooks: Vec<Box<dyn UpdateHook>> = vec![Box::new(PhysicsHook::new(&config))];
        let render_hooks: Vec<Box<dyn RenderHook<S>>> =
            vec![Box::new(BackgroundHook::new(&config)), Box::new(BallsHook)];

        info!(
            width = config.table.width,
            height = config.table.height,
            dt = config.dt,
            "simulator initialized"
        );

        Self {
            config,
            balls: Vec::new(),
            renderer,
            update_hooks,
            render_hooks,
            frame: 0,
        }
    }

    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    /// Add a ball. Balls are drawn in insertion order.
    pub fn add_ball(&mut self, ball: Ball) -> BallId {
        let id = BallId(self.balls.len());
        debug!(id = id.0, pos = %ball.pos(), color = %ball.color, "ball added");
        self.balls.push(ball);
        id
    }

    pub fn balls(&self) -> &[Ball] {
        &self.balls
    }

    pub fn ball(&self, id: BallId) -> Option<&Ball> {
        self.balls.get(id.0)
    }

    pub fn ball_mut(&mut self, id: BallId) -> Option<&mut Ball> {
        self.balls.get_mut(id.0)
    }

    /// Append an update hook. It runs after every hook already registered.
    pub fn register_update_hook<H: UpdateHook + 'static>(&mut self, hook: H) {
        self.update_hooks.push(Box::new(hook));
    }

    /// Append a render hook. It runs after every hook already registered.
    pub fn register_render_hook<H: RenderHook<S> + 'static>(&mut self, hook: H) {
        self.render_hooks.push(Box::new(hook));
    }

    /// Run every update hook with the fixed `dt`.
    pub fn update(&mut self) -> Result<(), SimError> {
        let dt = self.config.dt;
        for (index, hook) in self.update_hooks.iter_mut().enumerate() {
            hook.update(dt, &mut self.balls)
                .map_err(|source| SimError::UpdateHook { index, source })?;
        }
        self.frame += 1;
        Ok(())
    }

    /// Run every render hook against the drawing surface.
    pub fn render(&mut self) -> Result<(), SimError> {
        for (index, hook) in self.render_hooks.iter_mut().enumerate() {
            hook.render(&mut self.renderer, &self.balls)
                .map_err(|source| SimError::RenderHook { index, source })?;
        }
        Ok(())
    }

    /// One frame: update, then render. Rendering is skipped if the update
    /// phase failed.
    pub fn step(&mut self) -> Result<(), SimError> {
        self.update()?;
        self.render()
    }

    /// Drive `frames` consecutive steps, stopping at the first failure.
    pub fn run_frames(&mut self, frames: u64) -> Result<(), SimError> {
        for _ in 0..frames {
            self.step()?;
        }
        Ok(())
    }

    /// Completed update phases since construction.
    pub fn frame(&self) -> u64 {
        self.frame
    }

    /// Simulated seconds elapsed.
    pub fn time(&self) -> f64 {
        self.frame as f64 * self.config.dt
    }

    /// True when no ball is moving.
    pub fn is_settled(&self) -> bool {
        self.balls.iter().all(|b| b.point.is_at_rest())
    }

    pub fn renderer(&self) -> &Renderer<S> {
        &self.renderer
    }

    pub fn surface(&self) -> &S {
        self.renderer.surface()
    }

    pub fn surface_mut(&mut self) -> &mut S {
        self.renderer.surface_mut()
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::{DrawCall, RecordingSurface};
    use crate::types::Vec2;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn sim() -> Simulator<RecordingSurface> {
        Simulator::new(SimConfig::default(), RecordingSurface::new())
    }

    fn ball_at(x: f64, y: f64) -> Ball {
        Ball::with_defaults(Vec2::new(x, y), Rgb::WHITE, &SimConfig::default().ball)
    }

    #[test]
    fn test_add_ball_ids_follow_insertion() {
        let mut sim = sim();
        let a = sim.add_ball(ball_at(0.5, 0.5));
        let b = sim.add_ball(ball_at(1.0, 0.5));
        assert_eq!(a, BallId(0));
        assert_eq!(b, BallId(1));
        assert_eq!(sim.ball(b).map(|ball| ball.pos()), Some(Vec2::new(1.0, 0.5)));
        assert!(sim.ball(BallId(2)).is_none());
    }

    #[test]
    fn test_default_render_draws_background_then_balls() {
        let mut sim = sim();
        sim.add_ball(Ball::new(Vec2::new(0.5, 0.25), Rgb::new(255, 0, 0), 0.5, 0.125));
        sim.render().unwrap();

        let calls = sim.surface().calls();
        assert_eq!(calls.len(), 2);
        assert_eq!(
            calls[0],
            DrawCall::Rect {
                x: 0,
                y: 0,
                w: 1016,
                h: 508,
                color: Rgb::FELT
            }
        );
        assert_eq!(
            calls[1],
            DrawCall::Circle {
                x: 200,
                y: 100,
                r: 50,
                color: Rgb::new(255, 0, 0)
            }
        );
    }

    #[test]
    fn test_update_hooks_run_after_physics_in_order() {
        let mut sim = sim();
        sim.add_ball(ball_at(1.0, 0.6));
        let log = Rc::new(RefCell::new(Vec::new()));

        for name in ["first", "second"] {
            let log = Rc::clone(&log);
            sim.register_update_hook(move |dt: f64, balls: &mut [Ball]| -> Result<(), HookError> {
                // physics already ran: the ball is still at rest and unmoved
                assert_eq!(balls[0].pos(), Vec2::new(1.0, 0.6));
                log.borrow_mut().push((name, dt));
                Ok(())
            });
        }

        sim.update().unwrap();
        assert_eq!(
            *log.borrow(),
            vec![("first", 1.0 / 120.0), ("second", 1.0 / 120.0)]
        );
    }

    #[test]
    fn test_hook_applied_force_is_used_next_step() {
        let mut sim = sim();
        let id = sim.add_ball(ball_at(1.0, 0.6));
        sim.register_update_hook(|_dt: f64, balls: &mut [Ball]| -> Result<(), HookError> {
            balls[0].apply_force(Vec2::new(500.0, 0.0));
            Ok(())
        });

        sim.update().unwrap();
        // physics ran before the hook pushed
        assert!(sim.ball(id).unwrap().point.is_at_rest());
        sim.update().unwrap();
        assert!(sim.ball(id).unwrap().vel().x > 0.0);
    }

    #[test]
    fn test_failing_update_hook_aborts_step() {
        let mut sim = sim();
        let ran_after = Rc::new(RefCell::new(false));

        sim.register_update_hook(|_dt: f64, _balls: &mut [Ball]| -> Result<(), HookError> {
            Err("input device unplugged".into())
        });
        let flag = Rc::clone(&ran_after);
        sim.register_update_hook(move |_dt: f64, _balls: &mut [Ball]| -> Result<(), HookError> {
            *flag.borrow_mut() = true;
            Ok(())
        });

        let err = sim.step().unwrap_err();
        match &err {
            SimError::UpdateHook { index, .. } => assert_eq!(*index, 1),
            other => panic!("Expected UpdateHook error, got {:?}", other),
        }
        assert!(err.to_string().contains("input device unplugged"));
        assert!(!*ran_after.borrow());
        // render phase never ran
        assert!(sim.surface().calls().is_empty());
        assert_eq!(sim.frame(), 0);
    }

    #[test]
    fn test_failing_render_hook_reports_index() {
        let mut sim = sim();
        sim.register_render_hook(
            |_r: &mut Renderer<RecordingSurface>, _balls: &[Ball]| -> Result<(), HookError> {
                Err("out of ink".into())
            },
        );
        match sim.step() {
            Err(SimError::RenderHook { index, .. }) => assert_eq!(index, 2),
            other => panic!("Expected RenderHook error, got {:?}", other),
        }
        // the default hooks drew before the failure
        assert_eq!(sim.surface().calls().len(), 1);
    }

    #[test]
    fn test_render_hook_draws_overlay() {
        let mut sim = sim();
        sim.add_ball(ball_at(0.4, 0.62));
        sim.register_render_hook(
            |r: &mut Renderer<RecordingSurface>, balls: &[Ball]| -> Result<(), HookError> {
                let p = balls[0].pos();
                r.line(m_to_cm(p.x), m_to_cm(p.y), 100.0, 50.0, Rgb::WHITE);
                Ok(())
            },
        );
        sim.step().unwrap();
        let calls = sim.surface().calls();
        assert_eq!(calls.len(), 3);
        assert!(matches!(calls[2], DrawCall::Line { x2: 400, y2: 200, .. }));
    }

    #[test]
    fn test_time_advances_by_fixed_dt() {
        let mut sim = sim();
        sim.run_frames(120).unwrap();
        assert_eq!(sim.frame(), 120);
        assert!((sim.time() - 1.0).abs() < 1e-12);
        assert!(sim.is_settled());
    }
}
