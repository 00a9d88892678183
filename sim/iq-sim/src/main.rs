//! Simulator shell.
//!
//! The windowing/GL front end is a separate layer; this binary runs the
//! simulation loop headless at a fixed 60 Hz step, which is what CI and
//! scripted robot-program runs use. Exit code 0 on a clean quit, 1 when
//! initialization fails.

use std::path::PathBuf;
use std::time::{Duration, Instant};

use clap::Parser;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use iq_sim::{FallbackMeshSource, Launcher, OperatorInput, Simulator};

const FRAME_DT: f64 = 1.0 / 60.0;

#[derive(Debug, Parser)]
#[command(name = "iq-sim", about = "VEX IQ field simulator", version)]
struct Args {
    /// Scene file to load.
    #[arg(default_value = "../scenes/default.scene")]
    scene: PathBuf,

    /// Stop after this many simulated seconds.
    #[arg(long)]
    duration: Option<f64>,

    /// Log filter directives (e.g. `info`, `iq_physics=debug`).
    #[arg(long, default_value = "info")]
    log_level: String,
}

fn main() {
    let args = Args::parse();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(&args.log_level))
        .init();

    if let Err(e) = run(&args) {
        error!(%e, "initialization failed");
        std::process::exit(1);
    }
}

fn run(args: &Args) -> iq_sim::Result<()> {
    let mut meshes = FallbackMeshSource;
    let launcher = Launcher::default();
    let mut sim = Simulator::from_scene_file(&args.scene, &mut meshes, Some(&launcher))?;
    info!(scene = sim.scene_name(), "simulation running");

    let input = OperatorInput::default();
    let frame_budget = Duration::from_secs_f64(FRAME_DT);

    loop {
        let frame_start = Instant::now();

        sim.step(FRAME_DT, &input);
        // Headless: the frame is produced and dropped; a windowed shell
        // hands it to the renderer instead.
        let _frame = sim.render_frame();

        if let Some(limit) = args.duration {
            if sim.time() >= limit {
                info!(seconds = sim.time(), "duration reached");
                break;
            }
        }
        if sim.any_program_spawned() && !sim.any_program_connected() {
            info!("all robot programs exited");
            break;
        }

        if let Some(remaining) = frame_budget.checked_sub(frame_start.elapsed()) {
            std::thread::sleep(remaining);
        }
    }

    sim.shutdown();
    Ok(())
}
