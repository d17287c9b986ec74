mod scenario;

use std::fs;
use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::Parser;
use cue_core::units::cm;
use cue_core::{ConfigLoader, RasterSurface, SimConfig, Simulator, Vec2};
use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::info;

use crate::scenario::{launch_cue, setup_rack, AimInput, AimOverlay};

/// Headless billiard break: simulate and dump PNG frames.
#[derive(Parser, Debug)]
#[command(name = "cue-sim", version)]
struct Args {
    /// YAML config file; overrides --preset
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Named config from the config directory
    #[arg(long, default_value = "default")]
    preset: String,

    /// Directory holding named configs
    #[arg(long, default_value = "config")]
    config_dir: PathBuf,

    /// Number of frames to simulate
    #[arg(short, long, default_value_t = 600)]
    frames: u64,

    /// Stop early once every ball is at rest
    #[arg(long)]
    until_settled: bool,

    /// Write every Nth frame as PNG into --out
    #[arg(long, default_value_t = 1)]
    every: u64,

    /// Output directory for frames; no images are written without it
    #[arg(short, long)]
    out: Option<PathBuf>,

    /// Seed for the cue ball's lateral launch speed
    #[arg(long)]
    seed: Option<u64>,

    /// Aim point in centimeters, as X,Y
    #[arg(long, value_parser = parse_point)]
    aim: Option<(f64, f64)>,

    /// Frames on which the cue ball is pushed toward the aim point
    #[arg(long, value_delimiter = ',')]
    push: Vec<u64>,
}

fn parse_point(s: &str) -> Result<(f64, f64), String> {
    let (x, y) = s
        .split_once(',')
        .ok_or_else(|| format!("expected X,Y, got '{}'", s))?;
    let x: f64 = x.trim().parse().map_err(|e| format!("bad X '{}': {}", x, e))?;
    let y: f64 = y.trim().parse().map_err(|e| format!("bad Y '{}': {}", y, e))?;
    if !(x.is_finite() && y.is_finite()) {
        return Err(format!("aim point must be finite, got '{}'", s));
    }
    Ok((x, y))
}

fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));

    let json = matches!(std::env::var("LOG_FORMAT").as_deref(), Ok("json"));
    if json {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .json()
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .compact()
            .init();
    }
}

fn load_config(args: &Args) -> Result<SimConfig> {
    match &args.config {
        Some(path) => SimConfig::from_file(path)
            .with_context(|| format!("loading config {}", path.display())),
        None => ConfigLoader::new(&args.config_dir)
            .load(&args.preset)
            .with_context(|| format!("loading preset '{}'", args.preset)),
    }
}

fn main() -> Result<()> {
    init_tracing();
    let args = Args::parse();
    if args.every == 0 {
        bail!("--every must be at least 1");
    }

    let config = load_config(&args)?;
    let surface = RasterSurface::for_config(&config);
    let mut sim = Simulator::new(config, surface);

    let mut rng = match args.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    setup_rack(&mut sim);
    let cue = launch_cue(&mut sim, &mut rng);

    if let Some((x, y)) = args.aim {
        let target = Vec2::new(cm(x), cm(y));
        sim.register_update_hook(AimInput::new(cue, target, args.push.clone()));
        sim.register_render_hook(AimOverlay { cue, target });
    }

    if let Some(dir) = &args.out {
        fs::create_dir_all(dir).with_context(|| format!("creating {}", dir.display()))?;
    }

    for frame in 0..args.frames {
        sim.step().with_context(|| format!("frame {}", frame))?;

        if let Some(dir) = &args.out {
            if frame % args.every == 0 {
                let path = dir.join(format!("frame_{:05}.png", frame));
                sim.surface()
                    .save(&path)
                    .with_context(|| format!("writing {}", path.display()))?;
            }
        }

        if args.until_settled && sim.is_settled() {
            info!(frame, "all balls at rest");
            break;
        }
    }

    info!(frames = sim.frame(), seconds = sim.time(), "simulation finished");
    for (i, ball) in sim.balls().iter().enumerate() {
        info!(ball = i, color = %ball.color, pos = %ball.pos(), vel = %ball.vel(), "final state");
    }
    Ok(())
}
