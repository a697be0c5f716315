//! Parallel-bus NAND flash engine
//!
//! Sequences command, address and data cycles over a [`NandBus`] for
//! small-page (512-byte) NAND parts. Every operation selects the chip,
//! runs its latch phases, waits on the ready/busy line where the part
//! goes busy, and deselects before returning.
//!
//! The ready wait is bounded at 1000 ms. For [`NandDriver::reset`] a
//! timeout is soft (logged, the caller may proceed); for data operations
//! it surfaces as [`Error::Timeout`].

pub mod bus;
pub mod commands;

pub use bus::NandBus;

use crate::device::{DeviceIdentity, EraseScope, MemoryDevice, StatusReport, Technology};
use crate::error::{Error, Result};
use crate::status::NandStatus;

/// Page size in bytes (program granularity and column divisor)
pub const PAGE_SIZE: u32 = 512;
/// Erase block size in bytes
pub const BLOCK_SIZE: u32 = 16 * 1024;
/// Number of ID bytes clocked out after READ_ID
pub const ID_LEN: usize = 5;

/// Ready/busy wait bound
const READY_TIMEOUT_MS: u32 = 1000;

/// Parallel NAND command/address/data sequencer
pub struct NandDriver<B: NandBus> {
    bus: B,
}

impl<B: NandBus> NandDriver<B> {
    /// Create a driver over the given bus
    pub fn new(bus: B) -> Self {
        Self { bus }
    }

    /// Consume the driver and return the bus
    pub fn release(self) -> B {
        self.bus
    }

    /// Latch a command byte
    fn command(&mut self, cmd: u8) {
        self.bus.set_command_latch(true);
        self.bus.write_byte(cmd);
        self.bus.set_command_latch(false);
    }

    /// Latch a run of address cycles
    fn address_cycles(&mut self, bytes: &[u8]) {
        self.bus.set_address_latch(true);
        for &byte in bytes {
            self.bus.write_byte(byte);
        }
        self.bus.set_address_latch(false);
    }

    /// Latch the 5-cycle data address for `addr`
    ///
    /// Column high is sent even for parts whose page fits in one byte;
    /// the extra cycle is part of the generic address phase.
    fn data_address(&mut self, addr: u32) {
        let page = addr / PAGE_SIZE;
        let column = addr % PAGE_SIZE;
        self.address_cycles(&[
            column as u8,
            (column >> 8) as u8,
            page as u8,
            (page >> 8) as u8,
            (page >> 16) as u8,
        ]);
    }

    /// Poll the ready/busy line, bounded at 1000 ms
    fn wait_ready(&mut self) -> Result<()> {
        for _ in 0..READY_TIMEOUT_MS {
            if !self.bus.busy() {
                return Ok(());
            }
            self.bus.delay_us(1000);
        }
        log::warn!("nand: ready/busy still busy after {} ms", READY_TIMEOUT_MS);
        Err(Error::Timeout)
    }

    /// Issue a device reset
    ///
    /// A ready-wait timeout here is soft: it is logged and the driver
    /// proceeds, leaving the decision to the caller.
    pub fn reset(&mut self) {
        self.bus.set_chip_enable(true);
        self.command(commands::RESET);
        let _ = self.wait_ready();
        self.bus.set_chip_enable(false);
        log::debug!("nand: reset issued");
    }

    /// Clock the 5 ID bytes off the bus
    ///
    /// There is no validation that a device is present; with nothing
    /// wired the returned bytes are whatever the bus floats to.
    pub fn read_id(&mut self) -> [u8; ID_LEN] {
        self.bus.set_chip_enable(true);
        self.command(commands::READ_ID);
        self.address_cycles(&[0x00]);
        let mut id = [0u8; ID_LEN];
        for byte in id.iter_mut() {
            *byte = self.bus.read_byte();
        }
        self.bus.set_chip_enable(false);
        id
    }

    /// Read `buf.len()` sequential bytes starting at `addr`
    pub fn read(&mut self, addr: u32, buf: &mut [u8]) -> Result<()> {
        self.bus.set_chip_enable(true);
        self.command(commands::READ);
        self.data_address(addr);
        self.command(commands::READ_CONFIRM);
        if let Err(e) = self.wait_ready() {
            self.bus.set_chip_enable(false);
            return Err(e);
        }
        for byte in buf.iter_mut() {
            *byte = self.bus.read_byte();
        }
        self.bus.set_chip_enable(false);
        Ok(())
    }

    /// Program `data` starting at `addr` within a single page
    ///
    /// Writes spanning more than one page are rejected outright with
    /// [`Error::BoundaryViolation`]; no partial program is attempted.
    pub fn write(&mut self, addr: u32, data: &[u8]) -> Result<()> {
        let column = addr % PAGE_SIZE;
        if column as usize + data.len() > PAGE_SIZE as usize {
            return Err(Error::BoundaryViolation {
                addr,
                len: data.len(),
            });
        }

        self.bus.set_chip_enable(true);
        self.command(commands::PROGRAM);
        self.data_address(addr);
        for &byte in data {
            self.bus.write_byte(byte);
        }
        self.command(commands::PROGRAM_CONFIRM);
        if let Err(e) = self.wait_ready() {
            self.bus.set_chip_enable(false);
            return Err(e);
        }
        self.finish_with_status()
    }

    /// Erase the block containing `addr`
    ///
    /// The address phase carries the block index (3 cycles, LSB first).
    pub fn erase_block(&mut self, addr: u32) -> Result<()> {
        let block = addr / BLOCK_SIZE;

        self.bus.set_chip_enable(true);
        self.command(commands::ERASE);
        self.address_cycles(&[block as u8, (block >> 8) as u8, (block >> 16) as u8]);
        self.command(commands::ERASE_CONFIRM);
        if let Err(e) = self.wait_ready() {
            self.bus.set_chip_enable(false);
            return Err(e);
        }
        self.finish_with_status()
    }

    /// Read and decode the status register
    pub fn read_status(&mut self) -> NandStatus {
        self.bus.set_chip_enable(true);
        self.command(commands::READ_STATUS);
        let raw = self.bus.read_byte();
        self.bus.set_chip_enable(false);
        NandStatus::from_raw(raw)
    }

    /// Post-operation status check: fail bit set means the program/erase
    /// did not take
    fn finish_with_status(&mut self) -> Result<()> {
        self.command(commands::READ_STATUS);
        let status = NandStatus::from_raw(self.bus.read_byte());
        self.bus.set_chip_enable(false);
        if status.failed {
            return Err(Error::OperationFailed);
        }
        Ok(())
    }
}

impl<B: NandBus> MemoryDevice for NandDriver<B> {
    fn technology(&self) -> Technology {
        Technology::ParallelNand
    }

    fn identify(&mut self) -> Result<DeviceIdentity> {
        Ok(DeviceIdentity::Nand(self.read_id()))
    }

    fn read(&mut self, addr: u32, buf: &mut [u8]) -> Result<()> {
        NandDriver::read(self, addr, buf)
    }

    fn write(&mut self, addr: u32, data: &[u8]) -> Result<()> {
        NandDriver::write(self, addr, data)
    }

    fn erase(&mut self, scope: EraseScope, addr: u32) -> Result<()> {
        match scope {
            // NAND has one erase unit; sector requests land on the block
            // containing the address.
            EraseScope::Sector | EraseScope::Block => self.erase_block(addr),
            EraseScope::Chip => Err(Error::UnsupportedEraseScope),
        }
    }

    fn read_status(&mut self) -> Result<StatusReport> {
        Ok(StatusReport::Nand(NandDriver::read_status(self)))
    }
}
