use anyhow::{bail, Result};
use clap::Parser;
use log::info;
use std::io;
use std::path::PathBuf;

use traffic_sim::shell::Shell;
use traffic_sim::simulation::scenario::{build_demo_world, DemoConfig};
use traffic_sim::simulation::SimWorld;

#[derive(Parser)]
#[command(name = "traffic_sim")]
#[command(about = "Discrete-time street traffic simulation")]
struct Cli {
    /// Graph directory with crossings.sim, streets.sim and cars.sim
    #[arg(long, value_name = "DIR")]
    load: Option<PathBuf>,

    /// Start from a generated demo world instead of a graph directory
    #[arg(long, conflicts_with = "load")]
    demo: bool,

    /// Seed for the demo world
    #[arg(long, default_value = "0")]
    seed: u64,

    /// Number of intersections in the demo world
    #[arg(long, default_value = "8")]
    intersections: u32,

    /// Run a fixed number of ticks and print a summary instead of reading commands
    #[arg(long)]
    headless: bool,

    /// Number of simulation ticks to run in headless mode
    #[arg(long, default_value = "100")]
    ticks: u64,
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    let cli = Cli::parse();

    let result = if cli.headless {
        run_headless(&cli)
    } else {
        run_interactive(&cli)
    };

    if let Err(err) = result {
        eprintln!("Error: {err:#}");
        std::process::exit(1);
    }
}

fn initial_world(cli: &Cli) -> Result<Option<SimWorld>> {
    if let Some(dir) = &cli.load {
        return traffic_sim::loader::load_world(dir).map(Some);
    }
    if cli.demo {
        let config = DemoConfig {
            intersections: cli.intersections,
            ..DemoConfig::default()
        };
        let world = build_demo_world(cli.seed, config)?;
        info!("Generated demo world from seed {}", cli.seed);
        return Ok(Some(world));
    }
    Ok(None)
}

/// Run the simulation without reading commands
fn run_headless(cli: &Cli) -> Result<()> {
    let Some(mut world) = initial_world(cli)? else {
        bail!("Headless mode needs --load <DIR> or --demo");
    };

    println!("Initial state:");
    print!("{}", world.summary());
    println!();

    world.simulate(cli.ticks);

    println!("=== Final State ===");
    print!("{}", world.summary());
    Ok(())
}

/// Read commands from stdin until `quit`
fn run_interactive(cli: &Cli) -> Result<()> {
    let mut shell = match initial_world(cli)? {
        Some(world) => Shell::with_world(world),
        None => Shell::new(),
    };
    let stdin = io::stdin();
    shell.run(stdin.lock(), &mut io::stdout(), &mut io::stderr())
}
