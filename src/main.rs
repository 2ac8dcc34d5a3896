//! Ballbox demo driver
//!
//! Runs one launch to rest (or to a frame limit) and prints the final
//! snapshot as JSON.
//!
//! Usage: `ballbox [settings.json] [--seed N] [--frames N]`

use std::path::PathBuf;
use std::process::ExitCode;

use ballbox::Settings;
use ballbox::sim::{Simulation, TickInput};
use clap::Parser;
use glam::Vec3;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

#[derive(Parser, Debug)]
#[command(name = "ballbox", version, about = "Drop a sphere into a box and run it to rest")]
struct Opts {
    /// Settings JSON (defaults when omitted)
    settings: Option<PathBuf>,

    /// Seed for a random launch velocity and spin
    #[arg(long)]
    seed: Option<u64>,

    /// Frame limit: ten simulated minutes at 60 Hz by default
    #[arg(long, default_value_t = 36_000)]
    frames: u64,
}

/// Random launch velocity and spin, reproducible from `seed`
fn random_launch(seed: u64) -> (Vec3, Vec3) {
    let mut rng = Pcg32::seed_from_u64(seed);
    let velocity = Vec3::new(
        rng.random_range(-1200.0..1200.0),
        rng.random_range(-1200.0..1200.0),
        rng.random_range(0.0..800.0),
    );
    let angular_velocity = Vec3::new(
        rng.random_range(-5.0..5.0),
        rng.random_range(-5.0..5.0),
        rng.random_range(-5.0..5.0),
    );
    (velocity, angular_velocity)
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let opts = Opts::parse();
    let settings = match &opts.settings {
        Some(path) => Settings::load(path)?,
        None => Settings::default(),
    };

    let mut sim = Simulation::new(&settings)?;
    if let Some(seed) = opts.seed {
        let (velocity, angular_velocity) = random_launch(seed);
        log::info!("Seed {} picked launch {} spin {}", seed, velocity, angular_velocity);
        sim.launch(velocity, angular_velocity);
    }

    let mut input = TickInput {
        start: true,
        ..Default::default()
    };
    for _ in 0..opts.frames {
        sim.tick(&input, settings.frame_dt);
        input.start = false;
        for event in sim.events() {
            log::debug!("frame {}: {} at +{:.5}s", sim.frames(), event.kind.as_str(), event.time);
        }
        if !sim.is_running() {
            break;
        }
    }

    if sim.is_running() {
        log::warn!("Frame limit {} reached before the sphere came to rest", opts.frames);
    }
    println!("{}", serde_json::to_string_pretty(&sim)?);
    Ok(())
}

fn main() -> ExitCode {
    env_logger::init();
    log::info!("Ballbox starting...");

    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("{e}");
            eprintln!("ballbox: {e}");
            ExitCode::FAILURE
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_opts_definition() {
        Opts::command().debug_assert();
    }

    #[test]
    fn test_opts_defaults_and_flags() {
        let opts = Opts::try_parse_from(["ballbox"]).unwrap();
        assert!(opts.settings.is_none());
        assert_eq!(opts.seed, None);
        assert_eq!(opts.frames, 36_000);

        let opts = Opts::try_parse_from(["ballbox", "scene.json", "--seed", "7", "--frames", "120"]).unwrap();
        assert_eq!(opts.settings, Some(PathBuf::from("scene.json")));
        assert_eq!(opts.seed, Some(7));
        assert_eq!(opts.frames, 120);
    }

    #[test]
    fn test_opts_reject_bad_input() {
        assert!(Opts::try_parse_from(["ballbox", "--seed"]).is_err());
        assert!(Opts::try_parse_from(["ballbox", "--frames", "lots"]).is_err());
        assert!(Opts::try_parse_from(["ballbox", "--bogus"]).is_err());
    }

    #[test]
    fn test_random_launch_is_reproducible() {
        assert_eq!(random_launch(42), random_launch(42));
        assert_ne!(random_launch(42), random_launch(43));
    }
}
