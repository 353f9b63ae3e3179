use anyhow::{Context, Result};
use clap::Parser;
use murmuration_core::{Flock, FlockConfig, DEFAULT_BOID_COUNT};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};

#[derive(Parser, Debug)]
#[command(author, version, about = "Headless flocking simulation runner", long_about = None)]
struct Args {
    /// Simulation area width in pixels
    #[arg(long, default_value_t = 800.0)]
    width: f64,

    /// Simulation area height in pixels
    #[arg(long, default_value_t = 600.0)]
    height: f64,

    /// Population size
    #[arg(short = 'n', long, default_value_t = DEFAULT_BOID_COUNT)]
    boids: usize,

    /// Number of frames to simulate
    #[arg(short, long, default_value_t = 600)]
    steps: u32,

    /// RNG seed; the same seed reproduces the same run
    #[arg(long)]
    seed: Option<u64>,

    /// Write the final poses to this file as JSON
    #[arg(long)]
    snapshot: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long)]
    debug: bool,
}

struct Runner {
    flock: Flock,
    steps: u32,
}

impl Runner {
    fn new(args: &Args) -> Self {
        let config = FlockConfig::sized(args.width, args.height);
        let flock = match args.seed {
            Some(seed) => {
                log::info!("Seeding RNG with {}", seed);
                let mut rng = StdRng::seed_from_u64(seed);
                Flock::with_rng(config, args.boids, &mut rng)
            }
            None => Flock::new(config, args.boids),
        };

        Self {
            flock,
            steps: args.steps,
        }
    }

    fn run(&mut self) {
        log::info!(
            "Simulating {} boids for {} steps...",
            self.flock.len(),
            self.steps
        );

        for step in 0..self.steps {
            self.flock.step();
            if step % 60 == 0 {
                log::debug!("step {:4} avg speed {:.2}", step, self.average_speed());
            }
        }

        log::info!("Done. Final avg speed {:.2}", self.average_speed());
    }

    fn average_speed(&self) -> f64 {
        if self.flock.is_empty() {
            return 0.0;
        }
        let total: f64 = self
            .flock
            .boids
            .iter()
            .map(|boid| boid.velocity.magnitude())
            .sum();
        total / self.flock.len() as f64
    }

    fn write_snapshot(&self, path: &Path) -> Result<()> {
        let file = File::create(path)
            .with_context(|| format!("Failed to create snapshot file {}", path.display()))?;
        serde_json::to_writer_pretty(BufWriter::new(file), &self.flock.poses())
            .context("Failed to serialize poses")?;
        Ok(())
    }
}

fn main() -> Result<()> {
    let args = Args::parse();

    if args.debug {
        env_logger::Builder::from_default_env()
            .filter_level(log::LevelFilter::Debug)
            .init();
    } else {
        env_logger::Builder::from_default_env()
            .filter_level(log::LevelFilter::Info)
            .init();
    }

    let mut runner = Runner::new(&args);
    runner.run();

    if let Some(path) = &args.snapshot {
        runner.write_snapshot(path)?;
        log::info!("Wrote poses to {}", path.display());
    }

    Ok(())
}
