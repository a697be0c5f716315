//! Addressed EEPROM engine (two-wire bus)
//!
//! Address-phase based reader/writer with page-wrap-safe chunking and
//! bus presence probing. The target device address is session state
//! (default 0x50, legal range [0x08, 0x77]).
//!
//! EEPROMs have no status register: success is inferred from bus
//! acknowledgment, and a part mid write-cycle simply stops
//! acknowledging until the cycle completes.

pub mod bus;

pub use bus::I2cBus;

use crate::device::{DeviceIdentity, EraseScope, MemoryDevice, StatusReport, Technology};
use crate::error::{Error, Result};
use crate::status::EepromStatus;

/// Default target address (where serial EEPROMs conventionally live)
pub const DEFAULT_BUS_ADDRESS: u8 = 0x50;
/// Lowest legal 7-bit device address
pub const BUS_ADDRESS_MIN: u8 = 0x08;
/// Highest legal 7-bit device address
pub const BUS_ADDRESS_MAX: u8 = 0x77;

/// Read transfer chunk size (classic two-wire master buffer limit)
pub const READ_CHUNK: usize = 16;

/// Largest page size the write path supports
pub const MAX_PAGE_SIZE: u32 = 256;

/// Write transaction buffer bound: 2 address bytes + one full page
const MAX_WRITE_TXN: usize = 2 + MAX_PAGE_SIZE as usize;

/// Fixed settle time after each write transaction
const WRITE_CYCLE_MS: u32 = 5;

/// Address-phase width policy
///
/// `Auto` reproduces the per-call heuristic of classic EEPROM tooling:
/// addresses above 0xFF get a 2-byte phase, everything else 1 byte. Real
/// parts have a fixed width, so sessions talking to a known device
/// should pin `OneByte` or `TwoByte`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AddressMode {
    /// Decide per call from the address magnitude
    #[default]
    Auto,
    /// Always a single address byte
    OneByte,
    /// Always two address bytes, MSB first
    TwoByte,
}

/// Erase-fill geometry
///
/// EEPROMs erase by writing 0xFF. These sizes are configurable defaults,
/// not device-derived truth; override them when the real capacity is
/// known.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EepromGeometry {
    /// Write page size in bytes (clamped to [`MAX_PAGE_SIZE`])
    pub page_size: u32,
    /// Bytes filled from address 0 for chip scope
    pub chip_fill: u32,
    /// Bytes filled from the given address for sector scope
    pub sector_fill: u32,
    /// Bytes filled from the given address for block scope
    pub block_fill: u32,
}

impl Default for EepromGeometry {
    fn default() -> Self {
        Self {
            page_size: 8,
            chip_fill: 32 * 1024,
            sector_fill: 256,
            block_fill: 4 * 1024,
        }
    }
}

/// One responding address found by [`I2cEepromDriver::scan`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScanHit {
    /// The 7-bit address that acknowledged
    pub addr: u8,
    /// Within the conventional EEPROM window [0x50, 0x57]
    pub likely_eeprom: bool,
}

/// Result of probing every address in [0x08, 0x78)
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct BusScan {
    /// Responding addresses, ascending
    pub hits: heapless::Vec<ScanHit, 112>,
}

impl BusScan {
    /// True if nothing on the bus acknowledged
    pub fn is_empty(&self) -> bool {
        self.hits.is_empty()
    }

    /// Number of responding addresses
    pub fn len(&self) -> usize {
        self.hits.len()
    }
}

/// Addressed EEPROM reader/writer
pub struct I2cEepromDriver<B: I2cBus> {
    bus: B,
    address: u8,
    mode: AddressMode,
    geometry: EepromGeometry,
}

impl<B: I2cBus> I2cEepromDriver<B> {
    /// Create a driver over the given bus, targeting the default address
    pub fn new(bus: B) -> Self {
        Self {
            bus,
            address: DEFAULT_BUS_ADDRESS,
            mode: AddressMode::default(),
            geometry: EepromGeometry::default(),
        }
    }

    /// Consume the driver and return the bus
    pub fn release(self) -> B {
        self.bus
    }

    /// Currently targeted bus address
    pub fn bus_address(&self) -> u8 {
        self.address
    }

    /// Retarget the driver within [0x08, 0x77]
    ///
    /// Out-of-range values are rejected and the prior address is kept.
    pub fn set_bus_address(&mut self, addr: u8) -> Result<()> {
        if !(BUS_ADDRESS_MIN..=BUS_ADDRESS_MAX).contains(&addr) {
            return Err(Error::InvalidBusAddress { addr });
        }
        self.address = addr;
        Ok(())
    }

    /// Pin or unpin the address-phase width
    pub fn set_address_mode(&mut self, mode: AddressMode) {
        self.mode = mode;
    }

    /// Current address-phase policy
    pub fn address_mode(&self) -> AddressMode {
        self.mode
    }

    /// Override the erase-fill geometry; page size is clamped to
    /// [1, [`MAX_PAGE_SIZE`]]
    pub fn set_geometry(&mut self, geometry: EepromGeometry) {
        let mut geometry = geometry;
        geometry.page_size = geometry.page_size.clamp(1, MAX_PAGE_SIZE);
        self.geometry = geometry;
    }

    /// Current erase-fill geometry
    pub fn geometry(&self) -> EepromGeometry {
        self.geometry
    }

    /// Reset session state (address, width policy, geometry) to defaults
    pub fn reset_session(&mut self) {
        self.address = DEFAULT_BUS_ADDRESS;
        self.mode = AddressMode::default();
        self.geometry = EepromGeometry::default();
    }

    /// Probe every address in [0x08, 0x78) for an acknowledgment
    pub fn scan(&mut self) -> BusScan {
        let mut scan = BusScan::default();
        for addr in BUS_ADDRESS_MIN..BUS_ADDRESS_MAX + 1 {
            if self.bus.write(addr, &[]).is_ok() {
                // Capacity covers the whole probe range.
                let _ = scan.hits.push(ScanHit {
                    addr,
                    likely_eeprom: (0x50..=0x57).contains(&addr),
                });
            }
        }
        scan
    }

    /// Probe the configured target for presence
    pub fn probe(&mut self) -> Result<()> {
        self.bus.write(self.address, &[])
    }

    /// Encode the address phase for `addr` into `out`
    fn encode_address(&self, addr: u32, out: &mut [u8; 2]) -> usize {
        let wide = match self.mode {
            AddressMode::Auto => addr > 0xFF,
            AddressMode::OneByte => false,
            AddressMode::TwoByte => true,
        };
        if wide {
            out[0] = (addr >> 8) as u8;
            out[1] = addr as u8;
            2
        } else {
            out[0] = addr as u8;
            1
        }
    }

    /// Read `buf.len()` bytes starting at `addr`
    ///
    /// Each chunk first writes a bare address phase to set the device's
    /// internal pointer, then issues a bus read of the chunk length.
    pub fn read(&mut self, addr: u32, buf: &mut [u8]) -> Result<()> {
        self.probe()?;

        let mut offset = 0usize;
        while offset < buf.len() {
            let chunk = READ_CHUNK.min(buf.len() - offset);
            let current = addr + offset as u32;
            let mut phase = [0u8; 2];
            let phase_len = self.encode_address(current, &mut phase);
            self.bus.write(self.address, &phase[..phase_len])?;
            self.bus.read(self.address, &mut buf[offset..offset + chunk])?;
            offset += chunk;
        }
        Ok(())
    }

    /// Write `data` starting at `addr` in page-safe chunks
    ///
    /// Chunk length is capped so no transaction crosses a page boundary;
    /// each transaction is followed by a fixed 5 ms write-cycle settle.
    pub fn write(&mut self, addr: u32, data: &[u8]) -> Result<()> {
        self.probe()?;

        let page_size = self.geometry.page_size;
        let mut written = 0usize;
        while written < data.len() {
            let current = addr + written as u32;
            let page_offset = current % page_size;
            let chunk = ((page_size - page_offset) as usize).min(data.len() - written);

            let mut txn: heapless::Vec<u8, MAX_WRITE_TXN> = heapless::Vec::new();
            let mut phase = [0u8; 2];
            let phase_len = self.encode_address(current, &mut phase);
            if txn.extend_from_slice(&phase[..phase_len]).is_err()
                || txn.extend_from_slice(&data[written..written + chunk]).is_err()
            {
                // Unreachable with page_size clamped to MAX_PAGE_SIZE.
                return Err(Error::BusFault);
            }
            self.bus.write(self.address, &txn)?;
            self.bus.delay_ms(WRITE_CYCLE_MS);
            written += chunk;
        }
        Ok(())
    }

    /// Erase by filling with 0xFF at the configured geometry
    ///
    /// Chip scope fills from address 0; sector and block scopes fill
    /// from `addr`.
    pub fn erase(&mut self, scope: EraseScope, addr: u32) -> Result<()> {
        let (start, fill_len) = match scope {
            EraseScope::Chip => (0, self.geometry.chip_fill),
            EraseScope::Sector => (addr, self.geometry.sector_fill),
            EraseScope::Block => (addr, self.geometry.block_fill),
        };

        let blank = [0xFFu8; MAX_PAGE_SIZE as usize];
        let page_size = self.geometry.page_size;
        let mut done = 0u32;
        while done < fill_len {
            let chunk = page_size.min(fill_len - done);
            self.write(start + done, &blank[..chunk as usize])?;
            done += chunk;
            if done % 1024 == 0 {
                log::debug!("eeprom: erase fill {} / {} bytes", done, fill_len);
            }
        }
        Ok(())
    }

    /// Acknowledgment-based status: presence, then readiness
    ///
    /// A part that is busy with an internal write cycle acknowledges
    /// neither probe nor address phase.
    pub fn read_status(&mut self) -> EepromStatus {
        let present = self.probe().is_ok();
        let ready = present && self.bus.write(self.address, &[0x00]).is_ok();
        EepromStatus { present, ready }
    }
}

impl<B: I2cBus> MemoryDevice for I2cEepromDriver<B> {
    fn technology(&self) -> Technology {
        Technology::AddressedEeprom
    }

    fn identify(&mut self) -> Result<DeviceIdentity> {
        Ok(DeviceIdentity::BusScan(self.scan()))
    }

    fn read(&mut self, addr: u32, buf: &mut [u8]) -> Result<()> {
        I2cEepromDriver::read(self, addr, buf)
    }

    fn write(&mut self, addr: u32, data: &[u8]) -> Result<()> {
        I2cEepromDriver::write(self, addr, data)
    }

    fn erase(&mut self, scope: EraseScope, addr: u32) -> Result<()> {
        I2cEepromDriver::erase(self, scope, addr)
    }

    fn read_status(&mut self) -> Result<StatusReport> {
        Ok(StatusReport::Eeprom(I2cEepromDriver::read_status(self)))
    }
}
