//! The break: a five-ball diamond, a cue ball launched into it, and an
//! optional aim point that nudges the cue ball toward it on chosen frames.

use cue_core::units::{cm, cmps, m_to_cm};
use cue_core::world::{HookError, RenderHook, UpdateHook};
use cue_core::{Ball, BallId, DrawSurface, Renderer, Rgb, Simulator, Vec2};
use rand::Rng;
use tracing::{debug, info};

/// Object balls as `(x_cm, y_cm, color)`.
const RACK: [(f64, f64, Rgb); 5] = [
    (160.0, 53.0, Rgb::new(255, 0, 0)),
    (151.0, 62.0, Rgb::new(0, 0, 255)),
    (160.0, 62.0, Rgb::new(0, 0, 0)),
    (169.0, 62.0, Rgb::new(150, 50, 50)),
    (160.0, 71.0, Rgb::new(255, 0, 255)),
];

const CUE_START_CM: (f64, f64) = (40.0, 62.0);
const CUE_SPEED_CMPS: f64 = 800.0;
const CUE_SPREAD_CMPS: f64 = 75.0;

/// Acceleration the aim push gives the cue ball for one step (m/s²).
pub const PUSH_ACCELERATION: f64 = 1000.0;

/// Place the object balls.
pub fn setup_rack<S: DrawSurface + 'static>(sim: &mut Simulator<S>) {
    let defaults = sim.config().ball;
    for (x, y, color) in RACK {
        sim.add_ball(Ball::with_defaults(Vec2::new(cm(x), cm(y)), color, &defaults));
    }
}

/// Add the cue ball and shoot it toward the rack with a random lateral
/// component in `[-75, 75)` cm/s.
pub fn launch_cue<S: DrawSurface + 'static, R: Rng>(sim: &mut Simulator<S>, rng: &mut R) -> BallId {
    let defaults = sim.config().ball;
    let (x, y) = CUE_START_CM;
    let mut cue = Ball::with_defaults(Vec2::new(cm(x), cm(y)), Rgb::WHITE, &defaults);

    let lateral = rng.gen_range(-CUE_SPREAD_CMPS..CUE_SPREAD_CMPS);
    let velocity = Vec2::new(cmps(CUE_SPEED_CMPS), cmps(lateral));
    cue.set_velocity(velocity);
    info!(%velocity, "cue ball launched");

    sim.add_ball(cue)
}

/// Scripted stand-in for the mouse: on each listed frame, push the cue ball
/// toward `target`.
pub struct AimInput {
    pub cue: BallId,
    /// Aim point in meters
    pub target: Vec2,
    pub push_frames: Vec<u64>,
    frame: u64,
}

impl AimInput {
    pub fn new(cue: BallId, target: Vec2, mut push_frames: Vec<u64>) -> Self {
        push_frames.sort_unstable();
        Self {
            cue,
            target,
            push_frames,
            frame: 0,
        }
    }
}

impl UpdateHook for AimInput {
    fn update(&mut self, _dt: f64, balls: &mut [Ball]) -> Result<(), HookError> {
        let frame = self.frame;
        self.frame += 1;
        if self.push_frames.binary_search(&frame).is_err() {
            return Ok(());
        }

        let cue = balls
            .get_mut(self.cue.0)
            .ok_or_else(|| format!("cue ball {:?} does not exist", self.cue))?;
        let direction = (self.target - cue.pos()).normalized();
        let force = direction * (PUSH_ACCELERATION * cue.mass());
        cue.apply_force(force);
        debug!(frame, %force, "aim push");
        Ok(())
    }
}

/// Draws a line from the cue ball to the aim point and a small marker on it.
pub struct AimOverlay {
    pub cue: BallId,
    pub target: Vec2,
}

impl<S: DrawSurface> RenderHook<S> for AimOverlay {
    fn render(&mut self, renderer: &mut Renderer<S>, balls: &[Ball]) -> Result<(), HookError> {
        let cue = balls
            .get(self.cue.0)
            .ok_or_else(|| format!("cue ball {:?} does not exist", self.cue))?;
        let (tx, ty) = (m_to_cm(self.target.x), m_to_cm(self.target.y));
        let marker = 6.0 / renderer.render_scale();

        renderer.line(m_to_cm(cue.pos().x), m_to_cm(cue.pos().y), tx, ty, Rgb::WHITE);
        renderer.circle(tx, ty, marker, Rgb::WHITE);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cue_core::render::DrawCall;
    use cue_core::{RecordingSurface, SimConfig};
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn sim() -> Simulator<RecordingSurface> {
        Simulator::new(SimConfig::default(), RecordingSurface::new())
    }

    #[test]
    fn test_rack_and_cue() {
        let mut sim = sim();
        setup_rack(&mut sim);
        let cue = launch_cue(&mut sim, &mut StdRng::seed_from_u64(7));

        assert_eq!(sim.balls().len(), 6);
        assert_eq!(cue, BallId(5));
        let v = sim.ball(cue).unwrap().vel();
        assert!((v.x - 8.0).abs() < 1e-12);
        assert!(v.y >= -0.75 && v.y < 0.75);
        assert!(sim.balls()[..5].iter().all(|b| b.point.is_at_rest()));
    }

    #[test]
    fn test_aim_push_only_on_listed_frames() {
        let mut sim = sim();
        let cue = sim.add_ball(Ball::new(Vec2::new(0.4, 0.62), Rgb::WHITE, 0.5, 0.032));
        sim.register_update_hook(AimInput::new(cue, Vec2::new(1.4, 0.62), vec![1]));

        sim.update().unwrap();
        sim.update().unwrap();
        assert!(sim.ball(cue).unwrap().point.is_at_rest());
        // the push from frame 1 is consumed by physics on frame 2
        sim.update().unwrap();
        let v = sim.ball(cue).unwrap().vel();
        assert!((v.x - PUSH_ACCELERATION / 120.0).abs() < 1e-9);
        assert!(v.y.abs() < 1e-12);
    }

    #[test]
    fn test_aim_input_missing_ball_fails_step() {
        let mut sim = sim();
        sim.register_update_hook(AimInput::new(BallId(3), Vec2::ZERO, vec![0]));
        assert!(sim.step().is_err());
    }

    #[test]
    fn test_overlay_draws_line_and_marker() {
        let mut sim = sim();
        let cue = sim.add_ball(Ball::new(Vec2::new(0.4, 0.62), Rgb::WHITE, 0.5, 0.032));
        sim.register_render_hook(AimOverlay {
            cue,
            target: Vec2::new(1.0, 0.5),
        });
        sim.render().unwrap();

        let calls = sim.surface().calls();
        assert_eq!(calls.len(), 4);
        assert!(matches!(calls[2], DrawCall::Line { x1: 160, x2: 400, y2: 200, .. }));
        assert!(matches!(calls[3], DrawCall::Circle { x: 400, y: 200, r: 6, .. }));
    }
}
