//! Serial-command NOR flash engine
//!
//! Implements the common JEDEC command sequences over a [`SpiBus`]:
//! identify, fast read, page program with WREN and boundary splitting,
//! scoped erase, status decode.
//!
//! All busy polling is bounded; a device that never clears its
//! write-in-progress bit yields [`Error::Timeout`] instead of hanging
//! the caller. During long erase waits a progress marker is logged
//! every 500 ms.

pub mod bus;
pub mod opcodes;
pub mod vendor;

pub use bus::{SpiBus, SpiTransaction};
pub use vendor::{lookup_part, JedecId, Part, PartMatch, Vendor};

use crate::device::{DeviceIdentity, EraseScope, MemoryDevice, StatusReport, Technology};
use crate::error::{Error, Result};
use crate::status::SpiStatus;

/// Page program granularity in bytes
pub const PAGE_SIZE: u32 = 256;
/// Sector erase size in bytes
pub const SECTOR_SIZE: u32 = 4 * 1024;
/// Block erase size in bytes
pub const BLOCK_SIZE: u32 = 64 * 1024;

/// Interval between logged progress markers while waiting on an erase
const PROGRESS_MARKER_US: u32 = 500_000;

/// Page program: poll every 10 us, give up after 10 ms
const PROGRAM_POLL_US: u32 = 10;
const PROGRAM_TIMEOUT_US: u32 = 10_000;

/// Erase budgets per scope (poll interval, timeout), microseconds
const SECTOR_ERASE_WAIT_US: (u32, u32) = (10_000, 1_000_000);
const BLOCK_ERASE_WAIT_US: (u32, u32) = (100_000, 4_000_000);
const CHIP_ERASE_WAIT_US: (u32, u32) = (500_000, 200_000_000);

/// Serial NOR flash command sequencer
pub struct SpiFlashDriver<B: SpiBus> {
    bus: B,
}

impl<B: SpiBus> SpiFlashDriver<B> {
    /// Create a driver over the given bus
    pub fn new(bus: B) -> Self {
        Self { bus }
    }

    /// Consume the driver and return the bus
    pub fn release(self) -> B {
        self.bus
    }

    /// Read the JEDEC identity (manufacturer byte + 2 device bytes)
    pub fn read_id(&mut self) -> Result<JedecId> {
        let mut buf = [0u8; 3];
        let mut txn = SpiTransaction::read_reg(opcodes::RDID, &mut buf);
        self.bus.execute(&mut txn)?;
        Ok(JedecId {
            manufacturer: buf[0],
            device: ((buf[1] as u16) << 8) | buf[2] as u16,
        })
    }

    /// Fast-read `buf.len()` bytes starting at `addr`
    pub fn read(&mut self, addr: u32, buf: &mut [u8]) -> Result<()> {
        let mut txn =
            SpiTransaction::read_at(opcodes::FAST_READ, addr, buf).with_dummy_bytes(1);
        self.bus.execute(&mut txn)
    }

    /// Program `data` starting at `addr`, splitting at the page boundary
    ///
    /// A span crossing a 256-byte boundary becomes exactly two page
    /// programs. The split is single-level: callers must not submit more
    /// than two pages worth of data in one call.
    pub fn write(&mut self, addr: u32, data: &[u8]) -> Result<()> {
        let offset = addr % PAGE_SIZE;
        if offset as usize + data.len() > PAGE_SIZE as usize {
            log::warn!(
                "spi: write of {} bytes at 0x{:06X} crosses a page boundary, splitting",
                data.len(),
                addr
            );
            let first = (PAGE_SIZE - offset) as usize;
            self.program_page(addr, &data[..first])?;
            self.program_page(addr + first as u32, &data[first..])?;
        } else {
            self.program_page(addr, data)?;
        }
        Ok(())
    }

    /// One page-program transaction: WREN, PP, wait for WIP to clear
    fn program_page(&mut self, addr: u32, data: &[u8]) -> Result<()> {
        self.write_enable()?;
        let mut txn = SpiTransaction::program_at(opcodes::PP, addr, data);
        self.bus.execute(&mut txn)?;
        self.wait_ready(PROGRAM_POLL_US, PROGRAM_TIMEOUT_US)
    }

    /// Erase at the given scope
    ///
    /// `addr` selects the sector/block; chip erase has no address phase.
    pub fn erase(&mut self, scope: EraseScope, addr: u32) -> Result<()> {
        self.write_enable()?;
        let (mut txn, (poll_us, timeout_us)) = match scope {
            EraseScope::Sector => (
                SpiTransaction::erase_at(opcodes::SE, addr),
                SECTOR_ERASE_WAIT_US,
            ),
            EraseScope::Block => (
                SpiTransaction::erase_at(opcodes::BE_64K, addr),
                BLOCK_ERASE_WAIT_US,
            ),
            EraseScope::Chip => (SpiTransaction::command(opcodes::CE), CHIP_ERASE_WAIT_US),
        };
        self.bus.execute(&mut txn)?;
        self.wait_ready(poll_us, timeout_us)
    }

    /// Read and decode the status register
    pub fn read_status(&mut self) -> Result<SpiStatus> {
        let mut buf = [0u8; 1];
        let mut txn = SpiTransaction::read_reg(opcodes::RDSR, &mut buf);
        self.bus.execute(&mut txn)?;
        Ok(SpiStatus::from_raw(buf[0]))
    }

    /// Send Write Enable
    fn write_enable(&mut self) -> Result<()> {
        let mut txn = SpiTransaction::command(opcodes::WREN);
        self.bus.execute(&mut txn)
    }

    /// Poll WIP until clear, bounded by `timeout_us`
    fn wait_ready(&mut self, poll_delay_us: u32, timeout_us: u32) -> Result<()> {
        let mut waited_us = 0u32;
        let mut since_marker_us = 0u32;
        loop {
            let status = self.read_status()?;
            if !status.write_in_progress {
                return Ok(());
            }
            if waited_us >= timeout_us {
                log::warn!(
                    "spi: device still busy after {} ms, giving up",
                    waited_us / 1000
                );
                return Err(Error::Timeout);
            }
            self.bus.delay_us(poll_delay_us);
            waited_us = waited_us.saturating_add(poll_delay_us);
            since_marker_us += poll_delay_us;
            if since_marker_us >= PROGRESS_MARKER_US {
                log::info!("spi: still busy after {} ms", waited_us / 1000);
                since_marker_us = 0;
            }
        }
    }
}

impl<B: SpiBus> MemoryDevice for SpiFlashDriver<B> {
    fn technology(&self) -> Technology {
        Technology::SerialFlash
    }

    fn identify(&mut self) -> Result<DeviceIdentity> {
        Ok(DeviceIdentity::Jedec(self.read_id()?))
    }

    fn read(&mut self, addr: u32, buf: &mut [u8]) -> Result<()> {
        SpiFlashDriver::read(self, addr, buf)
    }

    fn write(&mut self, addr: u32, data: &[u8]) -> Result<()> {
        SpiFlashDriver::write(self, addr, data)
    }

    fn erase(&mut self, scope: EraseScope, addr: u32) -> Result<()> {
        SpiFlashDriver::erase(self, scope, addr)
    }

    fn read_status(&mut self) -> Result<StatusReport> {
        Ok(StatusReport::Spi(SpiFlashDriver::read_status(self)?))
    }
}
