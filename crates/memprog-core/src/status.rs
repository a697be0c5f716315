//! Status register decoding
//!
//! Pure mappings from raw status bytes to named fields, one variant per
//! technology. The EEPROM family has no status register; its "status" is
//! bus-acknowledgment based and decoded in [`crate::i2c`].

use bitflags::bitflags;

bitflags! {
    /// Raw NAND status register bits (READ STATUS, 0x70)
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct NandStatusReg: u8 {
        /// Last program/erase operation failed
        const FAIL = 1 << 0;
        /// Device is ready for a new operation
        const READY = 1 << 6;
        /// Write protection reported active
        const WRITE_PROTECTED = 1 << 7;
    }
}

bitflags! {
    /// Raw serial-flash status register bits (RDSR, 0x05)
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct SpiStatusReg: u8 {
        /// Write in progress (busy)
        const WIP = 1 << 0;
        /// Write enable latch
        const WEL = 1 << 1;
        /// Block protect bit 0
        const BP0 = 1 << 2;
        /// Block protect bit 1
        const BP1 = 1 << 3;
        /// Block protect bit 2
        const BP2 = 1 << 4;
        /// Block protect bit 3
        const BP3 = 1 << 5;
        /// Status register write disable
        const SRWD = 1 << 7;
    }
}

/// Decoded NAND status register
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NandStatus {
    /// Raw register value
    pub raw: u8,
    /// Last program/erase operation failed
    pub failed: bool,
    /// Device is ready (not mid-operation)
    pub ready: bool,
    /// Write protection reported active
    pub write_protected: bool,
}

impl NandStatus {
    /// Decode a raw NAND status byte
    pub fn from_raw(raw: u8) -> Self {
        let bits = NandStatusReg::from_bits_retain(raw);
        Self {
            raw,
            failed: bits.contains(NandStatusReg::FAIL),
            ready: bits.contains(NandStatusReg::READY),
            write_protected: bits.contains(NandStatusReg::WRITE_PROTECTED),
        }
    }
}

/// Decoded serial-flash status register
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SpiStatus {
    /// Raw register value
    pub raw: u8,
    /// Write in progress
    pub write_in_progress: bool,
    /// Write enable latch set
    pub write_enable_latch: bool,
    /// Block-protect nibble (BP3..BP0)
    pub block_protect: u8,
    /// Status register write disabled
    pub register_locked: bool,
}

impl SpiStatus {
    /// Decode a raw RDSR byte
    pub fn from_raw(raw: u8) -> Self {
        let bits = SpiStatusReg::from_bits_retain(raw);
        Self {
            raw,
            write_in_progress: bits.contains(SpiStatusReg::WIP),
            write_enable_latch: bits.contains(SpiStatusReg::WEL),
            block_protect: (raw >> 2) & 0x0F,
            register_locked: bits.contains(SpiStatusReg::SRWD),
        }
    }
}

/// EEPROM "status": presence and readiness inferred from acknowledgment
///
/// A part that is mid write-cycle does not acknowledge its address phase,
/// so `present && !ready` reads as "busy".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EepromStatus {
    /// The target bus address acknowledged a probe
    pub present: bool,
    /// The target accepted an address phase (not in a write cycle)
    pub ready: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_nand_status_decode() {
        let status = NandStatus::from_raw(0xC1);
        assert!(status.failed);
        assert!(status.ready);
        assert!(status.write_protected);

        let status = NandStatus::from_raw(0x40);
        assert!(!status.failed);
        assert!(status.ready);
        assert!(!status.write_protected);
    }

    #[test]
    fn test_spi_status_decode() {
        // WIP + WEL + BP = 0b0101 + SRWD
        let status = SpiStatus::from_raw(0b1001_0111);
        assert!(status.write_in_progress);
        assert!(status.write_enable_latch);
        assert_eq!(status.block_protect, 0b0101);
        assert!(status.register_locked);
    }

    #[test]
    fn test_spi_status_idle() {
        let status = SpiStatus::from_raw(0x00);
        assert!(!status.write_in_progress);
        assert!(!status.write_enable_latch);
        assert_eq!(status.block_protect, 0);
        assert!(!status.register_locked);
    }
}
