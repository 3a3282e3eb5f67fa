mod adapters;
mod controller;
mod definitions;

use std::{
    fs::{self, File},
    path::{Path, PathBuf},
};

use anyhow::Context;
use chip::{chip8::ChipSet, definitions::cpu, Config, Runner};
use clap::Parser;

use crate::controller::Controller;

/// Runs a chip8 program in the terminal.
#[derive(Parser, Debug)]
#[command(version, about)]
struct Args {
    /// The rom to run
    #[arg(value_name = "ROM")]
    rom: PathBuf,
    /// Instructions per second
    #[arg(
        value_name = "RATE",
        default_value_t = cpu::HERTZ,
        value_parser = clap::value_parser!(u32).range(1..)
    )]
    rate: u32,
    /// Write the log into this file
    #[arg(long, value_name = "PATH")]
    log: Option<PathBuf>,
    /// Print the machine state after quitting
    #[arg(long, default_value_t = false)]
    dump: bool,
}

/// The terminal belongs to the screen, so the log can only go into a file.
fn setup_logging(path: Option<&Path>) -> anyhow::Result<()> {
    if let Some(path) = path {
        let file = File::create(path)
            .with_context(|| format!("Unable to create the log file {}", path.display()))?;
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
            .target(env_logger::Target::Pipe(Box::new(file)))
            .try_init()?;
    }
    Ok(())
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    setup_logging(args.log.as_deref())?;

    let rom = fs::read(&args.rom)
        .with_context(|| format!("Unable to read the rom {}", args.rom.display()))?;
    let config = Config::new(args.rate)?;
    let chip = ChipSet::with_rom(&rom)?;

    let mut controller = Controller::new(Runner::new(chip, config))?;
    let result = controller.run();
    let chip = controller.shutdown()?;

    if args.dump {
        println!("{}", chip);
    }
    if let Err(err) = &result {
        log::error!("{:#}", err);
    }
    result
}
