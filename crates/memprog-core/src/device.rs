//! Uniform device contract
//!
//! This module provides the `MemoryDevice` trait that abstracts over the
//! three protocol engines. Callers (sessions, CLIs, tests) program every
//! technology through the same capability set: identify, read, write,
//! erase, read-status.

use crate::error::Result;
use crate::i2c::BusScan;
use crate::spi::JedecId;
use crate::status::{EepromStatus, NandStatus, SpiStatus};

/// Memory technologies the programmer can drive
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Technology {
    /// No technology selected; every operation fails
    #[default]
    None,
    /// Parallel-bus NAND flash
    ParallelNand,
    /// Serial-command NOR flash
    SerialFlash,
    /// Addressed EEPROM on a two-wire bus
    AddressedEeprom,
}

impl Technology {
    /// Human-readable technology name
    pub fn name(&self) -> &'static str {
        match self {
            Technology::None => "none",
            Technology::ParallelNand => "NAND flash",
            Technology::SerialFlash => "SPI flash",
            Technology::AddressedEeprom => "I2C EEPROM",
        }
    }
}

/// Erase granularity for [`MemoryDevice::erase`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EraseScope {
    /// Smallest erase unit (4 KiB on serial flash)
    Sector,
    /// Larger erase unit (64 KiB on serial flash, 16 KiB on NAND)
    Block,
    /// Entire device
    Chip,
}

/// Identity information, per technology
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeviceIdentity {
    /// Five raw ID bytes clocked off a NAND part
    Nand([u8; 5]),
    /// JEDEC manufacturer/device identity of a serial flash
    Jedec(JedecId),
    /// Two-wire bus scan result
    BusScan(BusScan),
}

/// Decoded status fields for the active technology
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusReport {
    /// NAND status register
    Nand(NandStatus),
    /// Serial flash status register
    Spi(SpiStatus),
    /// EEPROM acknowledgment-based status
    Eeprom(EepromStatus),
}

/// Capability set shared by all three protocol engines
///
/// Addresses are flat `u32` values; their interpretation (page/column
/// split, 24-bit linear, address-phase width) is the engine's business.
/// The core enforces no upper bound on read lengths - request capping is
/// caller policy.
pub trait MemoryDevice {
    /// The technology this device speaks
    fn technology(&self) -> Technology;

    /// Read device identity (ID bytes, JEDEC identity or bus scan)
    fn identify(&mut self) -> Result<DeviceIdentity>;

    /// Read `buf.len()` bytes starting at `addr` into `buf`
    fn read(&mut self, addr: u32, buf: &mut [u8]) -> Result<()>;

    /// Write `data` starting at `addr`
    ///
    /// Page boundary policy is technology specific: NAND rejects
    /// cross-page spans, serial flash splits at 256-byte pages, EEPROM
    /// chunks at its page size.
    fn write(&mut self, addr: u32, data: &[u8]) -> Result<()>;

    /// Erase at the given scope
    ///
    /// `addr` selects the sector/block; it is ignored for chip scope.
    fn erase(&mut self, scope: EraseScope, addr: u32) -> Result<()>;

    /// Read and decode the device status
    fn read_status(&mut self) -> Result<StatusReport>;
}
