//! memprog - Multi-protocol memory chip programmer
//!
//! One controller speaking three storage-device protocols - parallel-bus
//! NAND flash, serial (SPI) NOR flash, and I2C EEPROM - behind one
//! uniform operation contract: identify, read, write, erase, read-status.
//!
//! # Architecture
//!
//! The CLI holds no protocol logic. It parses arguments, opens a
//! `MemoryDevice` (a simulated session or a Linux bus backend) and
//! forwards operations to the protocol engines in `memprog-core`.

mod cli;
mod commands;
mod target;

use clap::Parser;
use cli::{Cli, Commands};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    match cli.verbose {
        0 => {} // default (info)
        1 => log::set_max_level(log::LevelFilter::Debug),
        _ => log::set_max_level(log::LevelFilter::Trace),
    }

    match cli.command {
        Commands::Identify { target } | Commands::Scan { target } => {
            let mut device = target::open_device(&target)?;
            commands::identify::run(device.as_mut())
        }
        Commands::Read {
            target,
            address,
            length,
            output,
            no_limit,
        } => {
            let mut device = target::open_device(&target)?;
            commands::read::run(
                device.as_mut(),
                address,
                length,
                output.as_deref(),
                no_limit,
            )
        }
        Commands::Write {
            target,
            address,
            data,
            input,
        } => {
            let mut device = target::open_device(&target)?;
            commands::write::run(device.as_mut(), address, data.as_deref(), input.as_deref())
        }
        Commands::Erase {
            target,
            scope,
            address,
            yes,
        } => {
            let mut device = target::open_device(&target)?;
            commands::erase::run(device.as_mut(), scope.into(), address, yes)
        }
        Commands::Status { target } => {
            let mut device = target::open_device(&target)?;
            commands::status::run(device.as_mut())
        }
    }
}
