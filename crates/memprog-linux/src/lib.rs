//! memprog-linux - Linux userspace bus backends
//!
//! This crate provides real-hardware implementations of the
//! `memprog-core` bus traits using standard Linux interfaces:
//!
//! - [`LinuxSpiBus`] - serial flash over `/dev/spidevX.Y`
//! - [`LinuxI2cBus`] - addressed EEPROM over `/dev/i2c-N`
//!
//! There is no portable Linux userspace interface for a raw parallel
//! NAND bus; the NAND engine runs against `memprog-sim` or an external
//! `NandBus` implementation.
//!
//! # Example
//!
//! ```no_run
//! use memprog_core::spi::SpiFlashDriver;
//! use memprog_linux::{LinuxSpiBus, LinuxSpiConfig};
//!
//! let bus = LinuxSpiBus::open(&LinuxSpiConfig::new("/dev/spidev0.0"))?;
//! let mut flash = SpiFlashDriver::new(bus);
//! let id = flash.read_id()?;
//! println!("JEDEC ID: {:02X} {:04X}", id.manufacturer, id.device);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod error;
pub mod i2c;
pub mod spi;

pub use error::{LinuxBusError, Result};
pub use i2c::{LinuxI2cBus, LinuxI2cConfig};
pub use spi::{LinuxSpiBus, LinuxSpiConfig};
