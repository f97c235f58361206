use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use kiss3d::light::Light;
use kiss3d::window::Window;
use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use solar_orrery::config::Settings;
use solar_orrery::gui::Simulation;
use solar_orrery::model::{Command, SceneLayout};

#[derive(Debug, Parser)]
#[command(name = "simulator")]
#[command(about = "Animated orrery of the solar system")]
#[command(version)]
struct Args {
    /// Path to a TOML settings file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Seed for the starting positions and the starfield
    #[arg(short, long)]
    seed: Option<u64>,

    /// Start with the animation paused
    #[arg(long)]
    paused: bool,

    /// Starting speed for one body, as NAME=SPEED (repeatable)
    #[arg(long = "speed", value_name = "NAME=SPEED")]
    speeds: Vec<String>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, default_value = "info")]
    log_level: String,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let level = match args.log_level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(true)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let settings = match &args.config {
        Some(path) => Settings::load(path)
            .with_context(|| format!("Could not load settings from {}", path.display()))?,
        None => Settings::default(),
    };
    let registry = settings.registry()?;

    let mut rng = match args.seed.or(settings.scene.seed) {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    let (layout, mut system) = SceneLayout::build(&registry, settings.scene.star_count, &mut rng);
    for text in args.speeds.iter() {
        let command = system
            .speed_command(text)
            .with_context(|| format!("Bad --speed value {:?}", text))?;
        system.apply(command)?;
    }
    if args.paused || settings.scene.start_paused {
        system.apply(Command::TogglePause)?;
    }

    let mut window = Window::new_with_size(
        &settings.window.title,
        settings.window.width,
        settings.window.height,
    );
    window.set_light(Light::StickToCamera);
    window.set_framerate_limit(Some(60));

    info!(
        bodies = registry.len(),
        paused = system.is_paused(),
        "Starting simulation"
    );
    let simulation = Simulation::new(layout, system, &mut window);
    window.render_loop(simulation);

    Ok(())
}
