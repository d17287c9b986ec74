//! Python bindings for the cue-core billiards engine.
//!
//! Provides a simple Python API:
//!
//! ```python
//! from cue_physics import Simulation, Vec2
//!
//! sim = Simulation()
//! cue = sim.add_ball(40.0, 62.0, "#ffffff")      # centimeters
//! sim.add_ball(160.0, 62.0, "#000000")
//! sim.set_ball_velocity_cmps(cue, 800.0, 0.0)
//!
//! for _ in range(240):
//!     sim.step()
//!     pos = sim.ball_position(cue)
//!     print(f"Cue ball at ({pos.x}, {pos.y})")
//!
//! sim.save_png("break.png")
//! ```

use pyo3::exceptions::{PyIndexError, PyIOError, PyRuntimeError, PyValueError};
use pyo3::prelude::*;

use cue_core::config::BallConfig;
use cue_core::units::{cm, cmps, m_to_cm, mps_to_cmps};
use cue_core::{
    Ball, BallId, ConfigLoader, RasterSurface, Rgb, SimConfig, Simulator, Vec2 as CoreVec2,
};

/// 2D vector in meters or meters per second.
#[pyclass]
#[derive(Clone, Copy)]
pub struct Vec2 {
    #[pyo3(get, set)]
    pub x: f64,
    #[pyo3(get, set)]
    pub y: f64,
}

#[pymethods]
impl Vec2 {
    #[new]
    fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    fn __repr__(&self) -> String {
        format!("Vec2({:.4}, {:.4})", self.x, self.y)
    }

    fn length(&self) -> f64 {
        CoreVec2::from(*self).length()
    }

    fn to_tuple(&self) -> (f64, f64) {
        (self.x, self.y)
    }
}

impl From<CoreVec2> for Vec2 {
    fn from(v: CoreVec2) -> Self {
        Self { x: v.x, y: v.y }
    }
}

impl From<Vec2> for CoreVec2 {
    fn from(v: Vec2) -> Self {
        CoreVec2::new(v.x, v.y)
    }
}

/// Billiard table simulation rendering into an in-memory image.
///
/// Balls are addressed by the integer index returned from `add_ball`.
#[pyclass(unsendable)]
pub struct Simulation {
    sim: Simulator<RasterSurface>,
}

impl Simulation {
    fn ball_mut(&mut self, index: usize) -> PyResult<&mut Ball> {
        self.sim
            .ball_mut(BallId(index))
            .ok_or_else(|| PyIndexError::new_err(format!("no ball with index {}", index)))
    }

    fn ball(&self, index: usize) -> PyResult<&Ball> {
        self.sim
            .ball(BallId(index))
            .ok_or_else(|| PyIndexError::new_err(format!("no ball with index {}", index)))
    }

    fn with_config(config: SimConfig) -> Self {
        let surface = RasterSurface::for_config(&config);
        Self {
            sim: Simulator::new(config, surface),
        }
    }
}

#[pymethods]
impl Simulation {
    /// Create a new simulation with default table settings.
    #[new]
    fn new() -> Self {
        Self::with_config(SimConfig::default())
    }

    /// Create a simulation from a named YAML config in `config_dir`.
    #[staticmethod]
    fn from_preset(config_dir: &str, name: &str) -> PyResult<Self> {
        let config = ConfigLoader::new(config_dir)
            .load(name)
            .map_err(|e| PyValueError::new_err(e.to_string()))?;
        Ok(Self::with_config(config))
    }

    /// Current simulation time in seconds.
    #[getter]
    fn time(&self) -> f64 {
        self.sim.time()
    }

    /// Number of completed steps.
    #[getter]
    fn frame(&self) -> u64 {
        self.sim.frame()
    }

    /// Number of balls on the table.
    fn ball_count(&self) -> usize {
        self.sim.balls().len()
    }

    /// Add a ball at `(x_cm, y_cm)` with a `#rrggbb` color.
    ///
    /// Returns the ball index.
    #[pyo3(signature = (x_cm, y_cm, color, mass=None, radius_cm=None))]
    fn add_ball(
        &mut self,
        x_cm: f64,
        y_cm: f64,
        color: &str,
        mass: Option<f64>,
        radius_cm: Option<f64>,
    ) -> PyResult<usize> {
        let color: Rgb = color
            .parse()
            .map_err(|e: cue_core::types::ParseRgbError| PyValueError::new_err(e.to_string()))?;
        let defaults = self.sim.config().ball;
        let dims = BallConfig {
            mass: mass.unwrap_or(defaults.mass),
            radius: radius_cm.map(cm).unwrap_or(defaults.radius),
        };
        dims.validate().map_err(|e| PyValueError::new_err(e.to_string()))?;
        let ball = Ball::with_defaults(CoreVec2::new(cm(x_cm), cm(y_cm)), color, &dims);
        Ok(self.sim.add_ball(ball).0)
    }

    /// Get ball position in meters.
    fn ball_position(&self, index: usize) -> PyResult<Vec2> {
        Ok(self.ball(index)?.pos().into())
    }

    /// Get ball velocity in m/s.
    fn ball_velocity(&self, index: usize) -> PyResult<Vec2> {
        Ok(self.ball(index)?.vel().into())
    }

    /// Get ball speed in cm/s.
    fn ball_speed_cmps(&self, index: usize) -> PyResult<f64> {
        Ok(mps_to_cmps(self.ball(index)?.vel().length()))
    }

    /// Get ball position in centimeters as a tuple.
    fn ball_position_cm(&self, index: usize) -> PyResult<(f64, f64)> {
        let pos = self.ball(index)?.pos();
        Ok((m_to_cm(pos.x), m_to_cm(pos.y)))
    }

    /// Set ball velocity in m/s.
    fn set_ball_velocity(&mut self, index: usize, vx: f64, vy: f64) -> PyResult<()> {
        self.ball_mut(index)?.set_velocity(CoreVec2::new(vx, vy));
        Ok(())
    }

    /// Set ball velocity in cm/s.
    fn set_ball_velocity_cmps(&mut self, index: usize, vx: f64, vy: f64) -> PyResult<()> {
        self.ball_mut(index)?
            .set_velocity(CoreVec2::new(cmps(vx), cmps(vy)));
        Ok(())
    }

    /// Apply a force (N) to a ball for the next step.
    fn apply_force(&mut self, index: usize, fx: f64, fy: f64) -> PyResult<()> {
        self.ball_mut(index)?.apply_force(CoreVec2::new(fx, fy));
        Ok(())
    }

    /// Push a ball toward `(x_cm, y_cm)` with the given acceleration (m/s²)
    /// for one step.
    #[pyo3(signature = (index, x_cm, y_cm, acceleration=1000.0))]
    fn push_toward(&mut self, index: usize, x_cm: f64, y_cm: f64, acceleration: f64) -> PyResult<()> {
        let ball = self.ball_mut(index)?;
        let direction = (CoreVec2::new(cm(x_cm), cm(y_cm)) - ball.pos()).normalized();
        let force = direction * (acceleration * ball.mass());
        ball.apply_force(force);
        Ok(())
    }

    /// True when no ball is moving.
    fn is_settled(&self) -> bool {
        self.sim.is_settled()
    }

    /// Advance one frame (physics + render).
    fn step(&mut self) -> PyResult<()> {
        self.sim
            .step()
            .map_err(|e| PyRuntimeError::new_err(e.to_string()))
    }

    /// Run multiple frames at once.
    fn step_n(&mut self, steps: u64) -> PyResult<()> {
        self.sim
            .run_frames(steps)
            .map_err(|e| PyRuntimeError::new_err(e.to_string()))
    }

    /// Size of the rendered frame in pixels, as (width, height).
    fn frame_size(&self) -> (u32, u32) {
        self.sim.surface().image().dimensions()
    }

    /// Save the last rendered frame as PNG.
    fn save_png(&self, path: &str) -> PyResult<()> {
        self.sim
            .surface()
            .save(path)
            .map_err(|e| PyIOError::new_err(e.to_string()))
    }
}

/// Python module definition.
#[pymodule]
fn cue_physics(m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add_class::<Vec2>()?;
    m.add_class::<Simulation>()?;
    Ok(())
}
