use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;
use vblank_machines::registry;

mod config;
mod emulator;
mod error;
mod rom_path;
mod video;

use config::{FileConfig, Overrides, Settings};
use error::FrontendError;

#[derive(Parser, Debug)]
#[command(name = "vblank", version, about = "Arcade 8080 board emulator")]
struct Args {
    /// Machine to run (e.g. `invaders`).
    machine: String,

    /// ZIP archive, rompath directory, directory of ROM files, or a single
    /// program image.
    rom_path: PathBuf,

    /// Integer window scale factor.
    #[arg(long)]
    scale: Option<u32>,

    /// Milliseconds between interrupt points (two per frame).
    #[arg(long)]
    frame_ms: Option<u64>,

    /// Accept ROMs whose CRC-32 does not match the known dump.
    #[arg(long)]
    skip_checksums: bool,

    /// Settings file to use instead of the default location.
    #[arg(long)]
    config: Option<PathBuf>,
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();
    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e}");
            ExitCode::from(e.exit_code())
        }
    }
}

fn run(args: &Args) -> Result<(), FrontendError> {
    let file = FileConfig::load(args.config.as_deref())?;
    let overrides = Overrides {
        scale: args.scale,
        frame_ms: args.frame_ms,
        skip_checksums: args.skip_checksums,
    };
    let settings = Settings::resolve(&overrides, &file)?;

    let entry = registry::find(&args.machine).ok_or_else(|| FrontendError::UnknownMachine {
        name: args.machine.clone(),
        available: registry::all().iter().map(|e| e.name).collect(),
    })?;

    let rom_set = rom_path::load_rom_set(entry.rom_name, &args.rom_path)?;
    let mut machine = (entry.create)(&rom_set, settings.checksums)?;
    machine.reset();

    info!(machine = entry.name, "{}", entry.description);
    let title = format!("vblank - {}", entry.description);
    emulator::run(machine.as_mut(), &title, &settings)?;
    Ok(())
}
