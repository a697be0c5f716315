//! memprog-core - Core library for multi-protocol memory chip programming
//!
//! This crate provides the protocol engines for three storage-device
//! families behind one uniform operation contract (identify, read, write,
//! erase, read-status):
//!
//! - Parallel-bus NAND flash ([`nand`])
//! - Serial-command NOR flash ([`spi`])
//! - Addressed EEPROM on a two-wire bus ([`i2c`])
//!
//! Each engine drives an abstract bus trait ([`nand::NandBus`],
//! [`spi::SpiBus`], [`i2c::I2cBus`]) so the same sequencing logic runs
//! against real hardware backends or in-memory chip models. The crate is
//! `no_std` compatible and allocation-free in every protocol path.
//!
//! # Features
//!
//! - `std` - Enable standard library support (`std::error::Error` impls)
//!
//! # Example
//!
//! ```ignore
//! use memprog_core::{MemorySession, Technology};
//!
//! let mut session = MemorySession::new(nand_bus, spi_bus, i2c_bus);
//! session.select_technology(Technology::SerialFlash);
//! let identity = session.identify()?;
//! ```

#![no_std]
#![warn(missing_docs)]
#![warn(rust_2018_idioms)]

#[cfg(any(test, feature = "std"))]
extern crate std;

pub mod device;
pub mod error;
pub mod hexdump;
pub mod i2c;
pub mod nand;
pub mod session;
pub mod spi;
pub mod status;

pub use device::{DeviceIdentity, EraseScope, MemoryDevice, StatusReport, Technology};
pub use error::{Error, Result};
pub use session::MemorySession;
