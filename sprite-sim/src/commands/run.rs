//! Headless emitter simulation

use anyhow::{Context, Result};
use clap::Args;
use serde::Serialize;
use sprite_particles::{EmitterConfig, Particle, ParticleEmitter};
use std::cell::Cell;
use std::path::PathBuf;
use std::rc::Rc;

use crate::utils::{add_table_row, create_table, format_bytes, format_ratio};

#[derive(Args, Debug, Clone)]
pub struct RunArgs {
    /// Emitter configuration (.yaml, .yml or .json); defaults when omitted
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Number of frames to simulate
    #[arg(short, long, default_value = "120")]
    pub frames: u32,

    /// Frame time in milliseconds
    #[arg(short, long, default_value = "16.0")]
    pub delta: f32,

    /// Particles emitted per frame
    #[arg(short, long, default_value = "4")]
    pub rate: usize,

    /// Particles to pre-allocate before the first frame
    #[arg(long, default_value = "0")]
    pub reserve: usize,

    /// RNG seed, overriding the config file
    #[arg(long)]
    pub seed: Option<u64>,

    /// Print a table row every N frames
    #[arg(short, long, default_value = "10")]
    pub every: u32,

    /// Print a JSON report instead of tables
    #[arg(long)]
    pub json: bool,
}

/// Pool state after one frame
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FrameStats {
    pub frame: u32,
    pub alive: usize,
    pub dead: usize,
    pub total: usize,
    pub expired: usize,
}

/// Outcome of a simulation run
#[derive(Debug, Clone, Serialize)]
pub struct SimulationReport {
    pub frames: u32,
    pub delta_ms: f32,
    pub emitted: usize,
    pub expired: usize,
    pub reserved: usize,
    pub allocated: usize,
    pub peak_alive: usize,
    pub final_alive: usize,
    pub final_dead: usize,
    pub pool_bytes: u64,
    pub samples: Vec<FrameStats>,
}

pub fn execute(args: &RunArgs) -> Result<()> {
    let config = match &args.config {
        Some(path) => EmitterConfig::load(path)
            .with_context(|| format!("Failed to load emitter config {}", path.display()))?,
        None => EmitterConfig::default(),
    };

    let mut emitter = ParticleEmitter::with_config(config);
    if let Some(seed) = args.seed {
        emitter.reseed(seed);
    }

    let report = simulate(&mut emitter, args);

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_report(&report);
    }

    Ok(())
}

/// Drive `emitter` for `args.frames` frames, emitting `args.rate` per frame
pub fn simulate(emitter: &mut ParticleEmitter, args: &RunArgs) -> SimulationReport {
    let expired = Rc::new(Cell::new(0usize));
    let counter = Rc::clone(&expired);
    emitter.on_particle_death(move |_| counter.set(counter.get() + 1));

    emitter.reserve(args.reserve);
    let every = args.every.max(1);
    let mut time = 0.0f64;
    let mut peak_alive = 0;
    let mut samples = Vec::new();
    let mut last_expired = 0;

    log::info!(
        "Simulating {} frames at {}ms, {} particles per frame",
        args.frames,
        args.delta,
        args.rate
    );

    for frame in 1..=args.frames {
        emitter.emit_particles(args.rate);
        emitter.update(time, args.delta);
        time += f64::from(args.delta);
        peak_alive = peak_alive.max(emitter.alive_count());

        if frame % every == 0 || frame == args.frames {
            samples.push(FrameStats {
                frame,
                alive: emitter.alive_count(),
                dead: emitter.dead_count(),
                total: emitter.particle_count(),
                expired: expired.get() - last_expired,
            });
            last_expired = expired.get();
        }
    }

    emitter.clear_particle_death();

    let total = emitter.particle_count();
    SimulationReport {
        frames: args.frames,
        delta_ms: args.delta,
        emitted: emitted_total(args.rate, args.frames),
        expired: expired.get(),
        reserved: args.reserve,
        allocated: total.saturating_sub(args.reserve),
        peak_alive,
        final_alive: emitter.alive_count(),
        final_dead: emitter.dead_count(),
        pool_bytes: (total * std::mem::size_of::<Particle>()) as u64,
        samples,
    }
}

fn emitted_total(rate: usize, frames: u32) -> usize {
    usize::try_from(frames).map_or(usize::MAX, |frames| rate.saturating_mul(frames))
}

fn print_report(report: &SimulationReport) {
    let mut table = create_table(&["Frame", "Alive", "Dead", "Total", "Expired"]);
    for sample in &report.samples {
        add_table_row(
            &mut table,
            vec![
                sample.frame.to_string(),
                sample.alive.to_string(),
                sample.dead.to_string(),
                sample.total.to_string(),
                sample.expired.to_string(),
            ],
        );
    }
    table.printstd();

    println!();
    let mut summary = create_table(&["Metric", "Value"]);
    let simulated_ms = f64::from(report.delta_ms) * f64::from(report.frames);
    let rows = [
        ("Frames", report.frames.to_string()),
        ("Simulated time", format!("{simulated_ms:.0}ms")),
        ("Emitted", report.emitted.to_string()),
        ("Expired", report.expired.to_string()),
        ("Peak alive", report.peak_alive.to_string()),
        (
            "Pool reuse",
            format_ratio(
                report.emitted.saturating_sub(report.allocated),
                report.emitted,
            ),
        ),
        ("Fresh allocations", report.allocated.to_string()),
        ("Pool memory", format_bytes(report.pool_bytes)),
    ];
    for (name, value) in rows {
        add_table_row(&mut summary, vec![name.to_string(), value]);
    }
    summary.printstd();
}
