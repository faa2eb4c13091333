//! Binary entrypoint for name-drill.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{ArgAction, Parser};
use tracing::{Level, error, info};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::filter::LevelFilter;

use name_drill::config::{LaunchOptions, Settings};
use name_drill::image_source::FsImageSource;
use name_drill::presenter::{Presenter, PresenterOptions};
use name_drill::{Catalog, Session, ui};

const AFTER_HELP: &str = "\
Photos must be named Family,Given.<ext>, for example Smith,Anna.png.
Supported file types: JPEG (.jpg, .jpeg) and PNG (.png); extensions are not case sensitive.

SCALE_FACTOR is a positive number: 2.0 doubles the size of the photos, 0.5 halves it
(default 1.0). PHOTO_FOLDER defaults to the current directory.
An argument that is not a positive number, such as -2, is taken as the folder.
Other arguments starting with '-' must be one of the options above.";

#[derive(Debug, Parser)]
#[command(
    name = "name-drill",
    version,
    about = "Learn people's names from a folder of photos",
    after_help = AFTER_HELP
)]
struct Cli {
    /// Enable quiz mode (pick among four names; needs at least 4 photos)
    #[arg(short, long)]
    quiz: bool,

    /// Path to a YAML settings file
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Increase log verbosity (repeatable)
    #[arg(short = 'v', long = "verbose", action = ArgAction::Count)]
    verbose: u8,

    /// Optional scale factor and photo folder, in either order
    #[arg(value_name = "SCALE_FACTOR | PHOTO_FOLDER", allow_negative_numbers = true)]
    args: Vec<String>,
}

fn init_tracing(verbosity: u8) -> Result<()> {
    // map -v to log level
    let level = match verbosity {
        0 => Level::INFO,
        1 => Level::DEBUG,
        _ => Level::TRACE,
    };
    let filter = EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy()
        .add_directive(format!("name_drill={level}").parse()?)
        .add_directive("winit=warn".parse()?)
        .add_directive("softbuffer=warn".parse()?);
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(verbosity > 0)
        .with_writer(std::io::stderr)
        .init();
    Ok(())
}

fn main() {
    let cli = Cli::parse();
    if let Err(err) = init_tracing(cli.verbose) {
        eprintln!("failed to set up logging: {err:#}");
        std::process::exit(1);
    }
    if let Err(err) = try_main(cli) {
        error!("{err:#}");
        std::process::exit(1);
    }
}

fn try_main(cli: Cli) -> Result<()> {
    let settings = match &cli.config {
        Some(path) => Settings::from_yaml_file(path)?,
        None => Settings::default(),
    }
    .validated()
    .context("invalid settings")?;
    let launch = LaunchOptions::resolve(cli.quiz, &cli.args)?;
    info!(
        folder = %launch.folder.display(),
        mode = %launch.mode,
        scale_factor = launch.scale_factor,
        "starting"
    );

    // Everything that can fail on bad input happens before a window exists.
    let catalog = Catalog::load(&launch.folder, launch.mode, &settings.extensions)?;
    let session = Session::new(catalog, launch.mode, rand::rng())?;
    let font = ui::draw::load_font()?;

    let presenter = Presenter::new(
        session,
        FsImageSource,
        PresenterOptions {
            scale_factor: launch.scale_factor,
            sizing: settings.sizing,
            decode_attempts: settings.decode_attempts,
        },
    );
    let [screen_w, screen_h] = settings.fallback_screen;
    ui::run(presenter, font, (screen_w, screen_h))?;
    info!("window closed");
    Ok(())
}
