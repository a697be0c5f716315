//! Serial NOR flash model
//!
//! Emulates a JEDEC-style part behind the `SpiBus` trait: identity,
//! status register with WIP/WEL, page programming that only clears bits
//! and wraps within the page, scoped erases back to 0xFF. Programs and
//! erases hold WIP set for a few status polls.

use memprog_core::error::{Error, Result};
use memprog_core::spi::{opcodes, SpiBus, SpiTransaction};
use memprog_core::status::SpiStatusReg;

/// Configuration for the simulated flash
#[derive(Debug, Clone)]
pub struct SimSpiConfig {
    /// JEDEC manufacturer byte
    pub manufacturer_id: u8,
    /// JEDEC device ID (family byte high)
    pub device_id: u16,
    /// Flash size in bytes
    pub size: usize,
    /// Program page size
    pub page_size: usize,
}

impl Default for SimSpiConfig {
    fn default() -> Self {
        Self {
            manufacturer_id: 0xEF, // Winbond
            device_id: 0x4018,     // W25Q128
            size: 16 * 1024 * 1024,
            page_size: 256,
        }
    }
}

/// One recorded page-program transaction
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageProgram {
    /// Address sent in the transaction
    pub addr: u32,
    /// Payload of the transaction
    pub data: Vec<u8>,
}

/// Simulated serial NOR flash
pub struct SimSpiFlash {
    config: SimSpiConfig,
    data: Vec<u8>,
    write_enabled: bool,
    wip_polls: u32,
    stuck_busy: bool,
    page_program_log: Vec<PageProgram>,
}

impl SimSpiFlash {
    /// Create a fresh (erased) simulated flash
    pub fn new(config: SimSpiConfig) -> Self {
        let data = vec![0xFF; config.size];
        Self {
            config,
            data,
            write_enabled: false,
            wip_polls: 0,
            stuck_busy: false,
            page_program_log: Vec::new(),
        }
    }

    /// Raw flash contents
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Every page-program transaction seen, in order
    pub fn page_program_log(&self) -> &[PageProgram] {
        &self.page_program_log
    }

    /// Keep WIP asserted forever
    pub fn set_stuck_busy(&mut self, stuck: bool) {
        self.stuck_busy = stuck;
    }

    fn status(&mut self) -> u8 {
        let mut bits = SpiStatusReg::empty();
        if self.stuck_busy || self.wip_polls > 0 {
            bits |= SpiStatusReg::WIP;
        }
        if self.write_enabled {
            bits |= SpiStatusReg::WEL;
        }
        if self.wip_polls > 0 {
            self.wip_polls -= 1;
        }
        bits.bits()
    }

    fn handle_read(&mut self, txn: &mut SpiTransaction<'_>) {
        let addr = txn.address.unwrap_or(0) as usize;
        for (i, byte) in txn.read_buf.iter_mut().enumerate() {
            *byte = self.data[(addr + i) % self.config.size];
        }
    }

    fn handle_page_program(&mut self, txn: &SpiTransaction<'_>) {
        if !self.write_enabled {
            // Without WEL the part ignores the program outright.
            log::debug!("sim spi: page program without WREN ignored");
            return;
        }
        let addr = txn.address.unwrap_or(0) as usize % self.config.size;
        self.page_program_log.push(PageProgram {
            addr: addr as u32,
            data: txn.write_data.to_vec(),
        });

        let page_size = self.config.page_size;
        let page_base = addr - addr % page_size;
        for (i, &byte) in txn.write_data.iter().enumerate() {
            // Programming wraps within the page and only clears bits.
            let offset = (addr - page_base + i) % page_size;
            self.data[page_base + offset] &= byte;
        }
        self.write_enabled = false;
        self.wip_polls = 2;
    }

    fn handle_erase(&mut self, txn: &SpiTransaction<'_>, erase_size: usize) {
        if !self.write_enabled {
            log::debug!("sim spi: erase without WREN ignored");
            return;
        }
        let addr = txn.address.unwrap_or(0) as usize % self.config.size;
        let start = addr - addr % erase_size;
        for byte in &mut self.data[start..start + erase_size] {
            *byte = 0xFF;
        }
        self.write_enabled = false;
        self.wip_polls = 3;
    }

    fn handle_chip_erase(&mut self) {
        if !self.write_enabled {
            log::debug!("sim spi: chip erase without WREN ignored");
            return;
        }
        self.data.fill(0xFF);
        self.write_enabled = false;
        self.wip_polls = 5;
    }
}

impl SpiBus for SimSpiFlash {
    fn execute(&mut self, txn: &mut SpiTransaction<'_>) -> Result<()> {
        match txn.opcode {
            opcodes::RDID => {
                if txn.read_buf.len() >= 3 {
                    txn.read_buf[0] = self.config.manufacturer_id;
                    txn.read_buf[1] = (self.config.device_id >> 8) as u8;
                    txn.read_buf[2] = self.config.device_id as u8;
                }
                Ok(())
            }
            opcodes::RDSR => {
                let status = self.status();
                if let Some(first) = txn.read_buf.first_mut() {
                    *first = status;
                }
                Ok(())
            }
            opcodes::WREN => {
                self.write_enabled = true;
                Ok(())
            }
            opcodes::WRDI => {
                self.write_enabled = false;
                Ok(())
            }
            opcodes::READ | opcodes::FAST_READ => {
                self.handle_read(txn);
                Ok(())
            }
            opcodes::PP => {
                self.handle_page_program(txn);
                Ok(())
            }
            opcodes::SE => {
                self.handle_erase(txn, 4 * 1024);
                Ok(())
            }
            opcodes::BE_32K => {
                self.handle_erase(txn, 32 * 1024);
                Ok(())
            }
            opcodes::BE_64K => {
                self.handle_erase(txn, 64 * 1024);
                Ok(())
            }
            opcodes::CE => {
                self.handle_chip_erase();
                Ok(())
            }
            other => {
                log::debug!("sim spi: unsupported opcode 0x{:02X}", other);
                Err(Error::BusFault)
            }
        }
    }

    fn delay_us(&mut self, _us: u32) {}
}

#[cfg(test)]
mod tests {
    use super::*;
    use memprog_core::device::{DeviceIdentity, EraseScope, MemoryDevice};
    use memprog_core::spi::{lookup_part, PartMatch, SpiFlashDriver};
    use memprog_core::Error;

    fn driver() -> SpiFlashDriver<SimSpiFlash> {
        SpiFlashDriver::new(SimSpiFlash::new(SimSpiConfig::default()))
    }

    #[test]
    fn test_identify_decodes_winbond_part() {
        let mut drv = driver();
        let id = match drv.identify().unwrap() {
            DeviceIdentity::Jedec(id) => id,
            other => panic!("unexpected identity {:?}", other),
        };
        assert_eq!(id.manufacturer, 0xEF);
        assert_eq!(id.device, 0x4018);
        match lookup_part(&id) {
            PartMatch::Exact(part) => assert_eq!(part.density_mbit, 128),
            other => panic!("unexpected match {:?}", other),
        }
    }

    #[test]
    fn test_write_within_page_round_trip() {
        let mut drv = driver();
        let data: Vec<u8> = (0..64).collect();
        drv.write(0x1080, &data).unwrap();
        let mut back = vec![0u8; data.len()];
        drv.read(0x1080, &mut back).unwrap();
        assert_eq!(back, data);

        let bus = drv.release();
        assert_eq!(bus.page_program_log().len(), 1);
    }

    #[test]
    fn test_boundary_crossing_write_splits_in_two() {
        let mut drv = driver();
        // 0x10F0 + 32 crosses the 256-byte boundary at 0x1100:
        // 16 bytes land in the first page, 16 in the next.
        let data: Vec<u8> = (0..32).collect();
        drv.write(0x10F0, &data).unwrap();

        let mut back = vec![0u8; data.len()];
        drv.read(0x10F0, &mut back).unwrap();
        assert_eq!(back, data);

        let bus = drv.release();
        let log = bus.page_program_log();
        assert_eq!(log.len(), 2);
        assert_eq!(log[0].addr, 0x10F0);
        assert_eq!(log[0].data.len(), 16);
        assert_eq!(log[1].addr, 0x1100);
        assert_eq!(log[1].data.len(), 16);

        // Concatenated in order, the transactions reconstruct the payload.
        let mut joined = log[0].data.clone();
        joined.extend_from_slice(&log[1].data);
        assert_eq!(joined, data);
    }

    #[test]
    fn test_page_aligned_full_page_is_single_transaction() {
        let mut drv = driver();
        let data = vec![0xA5; 256];
        drv.write(0x2000, &data).unwrap();
        let bus = drv.release();
        assert_eq!(bus.page_program_log().len(), 1);
    }

    #[test]
    fn test_sector_erase_scope() {
        let mut drv = driver();
        drv.write(0x1000, &[0x00; 16]).unwrap();
        drv.erase(EraseScope::Sector, 0x1234).unwrap();
        let mut back = [0u8; 16];
        drv.read(0x1000, &mut back).unwrap();
        assert_eq!(back, [0xFF; 16]);
    }

    #[test]
    fn test_chip_erase_scope() {
        let mut drv = driver();
        drv.write(0x7000, &[0x00; 8]).unwrap();
        drv.erase(EraseScope::Chip, 0).unwrap();
        let bus = drv.release();
        assert!(bus.data()[0x7000..0x7008].iter().all(|&b| b == 0xFF));
    }

    #[test]
    fn test_stuck_busy_write_times_out() {
        let mut bus = SimSpiFlash::new(SimSpiConfig::default());
        bus.set_stuck_busy(true);
        let mut drv = SpiFlashDriver::new(bus);
        assert_eq!(drv.write(0, &[0x55]), Err(Error::Timeout));
    }

    #[test]
    fn test_stuck_busy_erase_times_out() {
        let mut bus = SimSpiFlash::new(SimSpiConfig::default());
        bus.set_stuck_busy(true);
        let mut drv = SpiFlashDriver::new(bus);
        assert_eq!(drv.erase(EraseScope::Sector, 0), Err(Error::Timeout));
    }

    #[test]
    fn test_status_reflects_write_enable_latch() {
        let mut drv = driver();
        let status = drv.read_status().unwrap();
        assert!(!status.write_in_progress);
        assert!(!status.write_enable_latch);
        assert_eq!(status.block_protect, 0);
    }
}
