//! memprog-sim - In-memory chip models for testing
//!
//! This crate provides simulated chips behind the three bus traits of
//! `memprog-core`, so the protocol engines (and anything built on them)
//! can run without hardware:
//!
//! - [`SimNandBus`] - a bus-level small-page NAND model that tracks
//!   latch lines and replays the command state machine
//! - [`SimSpiFlash`] - a serial NOR flash honoring WREN/WIP semantics
//! - [`SimI2cBus`] - a two-wire bus hosting EEPROMs and other responders
//!
//! Each model supports fault injection (stuck busy, program fail bit,
//! missing acknowledgment) to drive the error paths.

pub mod i2c;
pub mod nand;
pub mod spi;

pub use i2c::{SimEeprom, SimI2cBus};
pub use nand::{SimNandBus, SimNandConfig};
pub use spi::{SimSpiConfig, SimSpiFlash};

#[cfg(test)]
mod session_tests {
    use super::*;
    use memprog_core::device::{EraseScope, StatusReport};
    use memprog_core::i2c::AddressMode;
    use memprog_core::{Error, MemorySession, Technology};

    fn session_parts() -> (SimNandBus, SimSpiFlash, SimI2cBus) {
        let nand = SimNandBus::new(SimNandConfig::default());
        let spi = SimSpiFlash::new(SimSpiConfig::default());
        let i2c = SimI2cBus::new().with_eeprom(0x50, SimEeprom::small());
        (nand, spi, i2c)
    }

    #[test]
    fn test_operations_require_technology() {
        let (mut nand, mut spi, mut i2c) = session_parts();
        let mut session = MemorySession::new(&mut nand, &mut spi, &mut i2c);

        let mut buf = [0u8; 4];
        assert_eq!(session.read(0, &mut buf), Err(Error::NoTechnologySelected));
        assert_eq!(session.write(0, &[1]), Err(Error::NoTechnologySelected));
        assert_eq!(
            session.erase(EraseScope::Sector, 0),
            Err(Error::NoTechnologySelected)
        );
        assert_eq!(session.read_status().unwrap_err(), Error::NoTechnologySelected);
        assert_eq!(session.identify().unwrap_err(), Error::NoTechnologySelected);
    }

    #[test]
    fn test_selecting_nand_issues_reset() {
        let (mut nand, mut spi, mut i2c) = session_parts();
        {
            let mut session = MemorySession::new(&mut nand, &mut spi, &mut i2c);
            session.select_technology(Technology::ParallelNand);
            assert_eq!(session.technology(), Technology::ParallelNand);
        }
        assert_eq!(nand.reset_count(), 1);
    }

    #[test]
    fn test_bus_address_is_session_state() {
        let (mut nand, mut spi, mut i2c) = session_parts();
        i2c.add_responder(0x61);
        let mut session = MemorySession::new(&mut nand, &mut spi, &mut i2c);

        // Not valid before the EEPROM technology is active.
        assert_eq!(
            session.set_bus_address(0x61),
            Err(Error::NoTechnologySelected)
        );
        session.select_technology(Technology::SerialFlash);
        assert_eq!(session.set_bus_address(0x61), Err(Error::TechnologyMismatch));

        session.select_technology(Technology::AddressedEeprom);
        assert_eq!(session.set_bus_address(0x61), Ok(()));
        assert_eq!(session.bus_address(), 0x61);

        // Out-of-range addresses are rejected and 0x61 stays in effect.
        assert_eq!(
            session.set_bus_address(0x05),
            Err(Error::InvalidBusAddress { addr: 0x05 })
        );
        assert_eq!(session.bus_address(), 0x61);

        // Subsequent operations target 0x61 (a bare responder, so the
        // presence probe passes while 0x50 would have).
        match session.read_status().unwrap() {
            StatusReport::Eeprom(status) => assert!(status.present),
            other => panic!("unexpected report {:?}", other),
        }
    }

    #[test]
    fn test_switching_technology_resets_eeprom_state() {
        let (mut nand, mut spi, mut i2c) = session_parts();
        i2c.add_responder(0x61);
        let mut session = MemorySession::new(&mut nand, &mut spi, &mut i2c);

        session.select_technology(Technology::AddressedEeprom);
        session.set_bus_address(0x61).unwrap();
        session.set_address_mode(AddressMode::TwoByte).unwrap();

        session.select_technology(Technology::SerialFlash);
        session.select_technology(Technology::AddressedEeprom);
        assert_eq!(session.bus_address(), memprog_core::i2c::DEFAULT_BUS_ADDRESS);
    }

    #[test]
    fn test_uniform_contract_per_technology() {
        let (mut nand, mut spi, mut i2c) = session_parts();
        let mut session = MemorySession::new(&mut nand, &mut spi, &mut i2c);

        session.select_technology(Technology::SerialFlash);
        session.write(0x1000, &[0xAA, 0xBB]).unwrap();
        let mut buf = [0u8; 2];
        session.read(0x1000, &mut buf).unwrap();
        assert_eq!(buf, [0xAA, 0xBB]);

        session.select_technology(Technology::ParallelNand);
        session.write(0x200, &[0x11, 0x22]).unwrap();
        session.read(0x200, &mut buf).unwrap();
        assert_eq!(buf, [0x11, 0x22]);

        session.select_technology(Technology::AddressedEeprom);
        session.write(0x10, &[0x33, 0x44]).unwrap();
        session.read(0x10, &mut buf).unwrap();
        assert_eq!(buf, [0x33, 0x44]);
    }
}
