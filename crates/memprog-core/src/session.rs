//! Memory programming session
//!
//! A [`MemorySession`] owns the three protocol engines and forwards the
//! uniform operation contract to whichever technology is active. The
//! session replaces the ambient "current mode + current bus address"
//! globals of classic programmer firmware with an explicit value the
//! caller threads through every call.

use crate::device::{DeviceIdentity, EraseScope, MemoryDevice, StatusReport, Technology};
use crate::error::{Error, Result};
use crate::i2c::{AddressMode, EepromGeometry, I2cBus, I2cEepromDriver};
use crate::nand::{NandBus, NandDriver};
use crate::spi::{SpiBus, SpiFlashDriver};

/// Multi-technology programming session
///
/// Exactly one technology is active at a time (initially
/// [`Technology::None`], in which state every operation fails with
/// [`Error::NoTechnologySelected`]). The physical buses are treated as
/// exclusively owned by the active technology.
pub struct MemorySession<N: NandBus, S: SpiBus, I: I2cBus> {
    nand: NandDriver<N>,
    spi: SpiFlashDriver<S>,
    eeprom: I2cEepromDriver<I>,
    active: Technology,
}

impl<N: NandBus, S: SpiBus, I: I2cBus> MemorySession<N, S, I> {
    /// Create a session over the three buses; no technology is selected
    pub fn new(nand_bus: N, spi_bus: S, i2c_bus: I) -> Self {
        Self {
            nand: NandDriver::new(nand_bus),
            spi: SpiFlashDriver::new(spi_bus),
            eeprom: I2cEepromDriver::new(i2c_bus),
            active: Technology::None,
        }
    }

    /// Currently active technology
    pub fn technology(&self) -> Technology {
        self.active
    }

    /// Activate a technology
    ///
    /// Technology-local session state is reset: the EEPROM engine
    /// returns to its default address, width policy and geometry.
    /// Selecting NAND issues a protocol reset before any other
    /// operation is valid; a reset timeout is soft (logged by the
    /// driver, selection proceeds).
    pub fn select_technology(&mut self, tech: Technology) {
        match tech {
            Technology::ParallelNand => self.nand.reset(),
            Technology::AddressedEeprom => self.eeprom.reset_session(),
            Technology::SerialFlash | Technology::None => {}
        }
        self.active = tech;
        log::info!("session: {} selected", tech.name());
    }

    /// Retarget the EEPROM engine; valid only while it is active
    ///
    /// Out-of-range addresses are rejected with
    /// [`Error::InvalidBusAddress`] and the prior address stays in
    /// effect.
    pub fn set_bus_address(&mut self, addr: u8) -> Result<()> {
        self.require_eeprom()?;
        self.eeprom.set_bus_address(addr)
    }

    /// Currently targeted EEPROM bus address
    pub fn bus_address(&self) -> u8 {
        self.eeprom.bus_address()
    }

    /// Pin the EEPROM address-phase width; valid only while it is active
    pub fn set_address_mode(&mut self, mode: AddressMode) -> Result<()> {
        self.require_eeprom()?;
        self.eeprom.set_address_mode(mode);
        Ok(())
    }

    /// Override the EEPROM erase-fill geometry; valid only while it is
    /// active
    pub fn set_eeprom_geometry(&mut self, geometry: EepromGeometry) -> Result<()> {
        self.require_eeprom()?;
        self.eeprom.set_geometry(geometry);
        Ok(())
    }

    /// Read device identity for the active technology
    pub fn identify(&mut self) -> Result<DeviceIdentity> {
        self.active_device()?.identify()
    }

    /// Read `buf.len()` bytes starting at `addr`
    pub fn read(&mut self, addr: u32, buf: &mut [u8]) -> Result<()> {
        self.active_device()?.read(addr, buf)
    }

    /// Write `data` starting at `addr`
    pub fn write(&mut self, addr: u32, data: &[u8]) -> Result<()> {
        self.active_device()?.write(addr, data)
    }

    /// Erase at the given scope
    pub fn erase(&mut self, scope: EraseScope, addr: u32) -> Result<()> {
        self.active_device()?.erase(scope, addr)
    }

    /// Read decoded status for the active technology
    pub fn read_status(&mut self) -> Result<StatusReport> {
        self.active_device()?.read_status()
    }

    fn active_device(&mut self) -> Result<&mut dyn MemoryDevice> {
        match self.active {
            Technology::None => Err(Error::NoTechnologySelected),
            Technology::ParallelNand => Ok(&mut self.nand),
            Technology::SerialFlash => Ok(&mut self.spi),
            Technology::AddressedEeprom => Ok(&mut self.eeprom),
        }
    }

    fn require_eeprom(&self) -> Result<()> {
        match self.active {
            Technology::AddressedEeprom => Ok(()),
            Technology::None => Err(Error::NoTechnologySelected),
            _ => Err(Error::TechnologyMismatch),
        }
    }
}

impl<N: NandBus, S: SpiBus, I: I2cBus> MemoryDevice for MemorySession<N, S, I> {
    fn technology(&self) -> Technology {
        self.active
    }

    fn identify(&mut self) -> Result<DeviceIdentity> {
        MemorySession::identify(self)
    }

    fn read(&mut self, addr: u32, buf: &mut [u8]) -> Result<()> {
        MemorySession::read(self, addr, buf)
    }

    fn write(&mut self, addr: u32, data: &[u8]) -> Result<()> {
        MemorySession::write(self, addr, data)
    }

    fn erase(&mut self, scope: EraseScope, addr: u32) -> Result<()> {
        MemorySession::erase(self, scope, addr)
    }

    fn read_status(&mut self) -> Result<StatusReport> {
        MemorySession::read_status(self)
    }
}
