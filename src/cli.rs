//! CLI argument parsing

use clap::{Args, Parser, Subcommand, ValueEnum};
use memprog_core::device::{EraseScope, Technology};
use std::path::PathBuf;

/// Parse a string as a hex or decimal u32
pub fn parse_hex_u32(s: &str) -> Result<u32, String> {
    if let Some(hex) = s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
        u32::from_str_radix(hex, 16).map_err(|e| format!("Invalid hex value: {}", e))
    } else {
        s.parse::<u32>().map_err(|e| format!("Invalid number: {}", e))
    }
}

#[derive(Parser)]
#[command(name = "memprog")]
#[command(author, version, about = "Multi-protocol memory chip programmer", long_about = None)]
pub struct Cli {
    /// Verbosity level (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

/// Memory technology selector
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum TechnologyArg {
    /// Parallel-bus NAND flash
    Nand,
    /// Serial (SPI) NOR flash
    Spi,
    /// I2C EEPROM
    Eeprom,
}

impl From<TechnologyArg> for Technology {
    fn from(arg: TechnologyArg) -> Self {
        match arg {
            TechnologyArg::Nand => Technology::ParallelNand,
            TechnologyArg::Spi => Technology::SerialFlash,
            TechnologyArg::Eeprom => Technology::AddressedEeprom,
        }
    }
}

/// Erase scope selector
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScopeArg {
    /// Smallest erase unit (4 KiB on SPI flash)
    Sector,
    /// Larger erase unit (64 KiB on SPI flash, one NAND block)
    Block,
    /// Entire chip
    Chip,
}

impl From<ScopeArg> for EraseScope {
    fn from(arg: ScopeArg) -> Self {
        match arg {
            ScopeArg::Sector => EraseScope::Sector,
            ScopeArg::Block => EraseScope::Block,
            ScopeArg::Chip => EraseScope::Chip,
        }
    }
}

/// Technology and target selection shared across commands
#[derive(Args, Debug, Clone)]
pub struct TargetArgs {
    /// Memory technology to drive
    #[arg(short, long, value_enum)]
    pub technology: TechnologyArg,

    /// Target to use: sim, linux-spi:dev=/dev/spidevX.Y[,speed=HZ],
    /// linux-i2c:dev=/dev/i2c-N[,addr=0x50][,width=auto|1|2]
    #[arg(short = 'p', long, default_value = "sim")]
    pub target: String,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Read device identity (ID bytes, JEDEC decode or bus scan)
    Identify {
        #[command(flatten)]
        target: TargetArgs,
    },

    /// Read memory and hex-dump it (or save to a file)
    Read {
        #[command(flatten)]
        target: TargetArgs,

        /// Start address (hex or decimal)
        #[arg(short, long, value_parser = parse_hex_u32)]
        address: u32,

        /// Number of bytes to read
        #[arg(short, long, value_parser = parse_hex_u32)]
        length: u32,

        /// Write raw bytes to this file instead of dumping to stdout
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Lift the interactive dump size cap
        #[arg(long)]
        no_limit: bool,
    },

    /// Write bytes to memory
    Write {
        #[command(flatten)]
        target: TargetArgs,

        /// Start address (hex or decimal)
        #[arg(short, long, value_parser = parse_hex_u32)]
        address: u32,

        /// Hex bytes to write, e.g. "DE AD BE EF"
        #[arg(short, long, conflicts_with = "input")]
        data: Option<String>,

        /// Read the payload from this file
        #[arg(short, long)]
        input: Option<PathBuf>,
    },

    /// Erase at sector, block or chip scope
    Erase {
        #[command(flatten)]
        target: TargetArgs,

        /// Erase scope
        #[arg(short, long, value_enum)]
        scope: ScopeArg,

        /// Sector/block address (ignored for chip scope)
        #[arg(short, long, value_parser = parse_hex_u32, default_value = "0")]
        address: u32,

        /// Skip the chip-erase confirmation prompt
        #[arg(long)]
        yes: bool,
    },

    /// Read and decode the device status
    Status {
        #[command(flatten)]
        target: TargetArgs,
    },

    /// Scan the two-wire bus for responding addresses (EEPROM only)
    Scan {
        #[command(flatten)]
        target: TargetArgs,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_hex_u32() {
        assert_eq!(parse_hex_u32("0x1000"), Ok(0x1000));
        assert_eq!(parse_hex_u32("0XFF"), Ok(255));
        assert_eq!(parse_hex_u32("4096"), Ok(4096));
        assert!(parse_hex_u32("0xZZ").is_err());
        assert!(parse_hex_u32("nope").is_err());
    }
}
