//! Target selection
//!
//! Opens a `MemoryDevice` from a target spec string of the form
//! `name[:key=value,...]`, the way flash tools name their programmers.
//! The `sim` target carries a full simulated session (all three
//! technologies); the Linux targets drive one real bus each.

use crate::cli::TargetArgs;
use memprog_core::device::{MemoryDevice, Technology};
use memprog_core::MemorySession;
use memprog_sim::{SimEeprom, SimI2cBus, SimNandBus, SimNandConfig, SimSpiConfig, SimSpiFlash};

/// Split a target spec into its name and key=value parameters
fn parse_target_spec(spec: &str) -> Result<(&str, Vec<(&str, &str)>), String> {
    let (name, rest) = match spec.split_once(':') {
        Some((name, rest)) => (name, rest),
        None => (spec, ""),
    };

    let mut params = Vec::new();
    for pair in rest.split(',').filter(|p| !p.is_empty()) {
        let (key, value) = pair
            .split_once('=')
            .ok_or_else(|| format!("Malformed target parameter '{}' (expected key=value)", pair))?;
        params.push((key, value));
    }
    Ok((name, params))
}

/// Open the device described by `args`
pub fn open_device(args: &TargetArgs) -> Result<Box<dyn MemoryDevice>, Box<dyn std::error::Error>> {
    let technology = Technology::from(args.technology);
    let (name, params) = parse_target_spec(&args.target)?;

    match name {
        "sim" => open_sim(technology),
        #[cfg(feature = "linux")]
        "linux-spi" => open_linux_spi(technology, &params),
        #[cfg(feature = "linux")]
        "linux-i2c" => open_linux_i2c(technology, &params),
        other => Err(format!("Unknown target '{}' [available: sim, linux-spi, linux-i2c]", other).into()),
    }
}

/// Simulated session: one chip of every technology
fn open_sim(technology: Technology) -> Result<Box<dyn MemoryDevice>, Box<dyn std::error::Error>> {
    let nand = SimNandBus::new(SimNandConfig::default());
    let spi = SimSpiFlash::new(SimSpiConfig::default());
    let i2c = SimI2cBus::new().with_eeprom(0x50, SimEeprom::small());

    let mut session = MemorySession::new(nand, spi, i2c);
    session.select_technology(technology);
    Ok(Box::new(session))
}

#[cfg(feature = "linux")]
fn open_linux_spi(
    technology: Technology,
    params: &[(&str, &str)],
) -> Result<Box<dyn MemoryDevice>, Box<dyn std::error::Error>> {
    use memprog_core::spi::SpiFlashDriver;
    use memprog_linux::{LinuxSpiBus, LinuxSpiConfig};

    if technology != Technology::SerialFlash {
        return Err("Target linux-spi only drives the SPI flash technology".into());
    }

    let mut config = LinuxSpiConfig::new("");
    for (key, value) in params {
        match *key {
            "dev" => config.device = (*value).into(),
            "speed" => {
                config.speed_hz = value
                    .parse()
                    .map_err(|_| format!("Invalid SPI speed '{}'", value))?
            }
            other => return Err(format!("Unknown linux-spi parameter '{}'", other).into()),
        }
    }

    let bus = LinuxSpiBus::open(&config)?;
    Ok(Box::new(SpiFlashDriver::new(bus)))
}

#[cfg(feature = "linux")]
fn open_linux_i2c(
    technology: Technology,
    params: &[(&str, &str)],
) -> Result<Box<dyn MemoryDevice>, Box<dyn std::error::Error>> {
    use crate::cli::parse_hex_u32;
    use memprog_core::i2c::{AddressMode, I2cEepromDriver};
    use memprog_linux::{LinuxI2cBus, LinuxI2cConfig};

    if technology != Technology::AddressedEeprom {
        return Err("Target linux-i2c only drives the EEPROM technology".into());
    }

    let mut device = String::new();
    let mut bus_addr: Option<u8> = None;
    let mut mode = AddressMode::Auto;
    for (key, value) in params {
        match *key {
            "dev" => device = (*value).into(),
            "addr" => {
                let addr = parse_hex_u32(value).map_err(|e| format!("Invalid addr: {}", e))?;
                bus_addr = Some(addr as u8);
            }
            "width" => {
                mode = match *value {
                    "auto" => AddressMode::Auto,
                    "1" => AddressMode::OneByte,
                    "2" => AddressMode::TwoByte,
                    other => return Err(format!("Invalid address width '{}'", other).into()),
                }
            }
            other => return Err(format!("Unknown linux-i2c parameter '{}'", other).into()),
        }
    }

    let bus = LinuxI2cBus::open(&LinuxI2cConfig::new(device))?;
    let mut driver = I2cEepromDriver::new(bus);
    if let Some(addr) = bus_addr {
        driver.set_bus_address(addr)?;
    }
    driver.set_address_mode(mode);
    Ok(Box::new(driver))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_target_spec() {
        let (name, params) = parse_target_spec("sim").unwrap();
        assert_eq!(name, "sim");
        assert!(params.is_empty());

        let (name, params) =
            parse_target_spec("linux-spi:dev=/dev/spidev0.0,speed=1000000").unwrap();
        assert_eq!(name, "linux-spi");
        assert_eq!(params, vec![("dev", "/dev/spidev0.0"), ("speed", "1000000")]);

        assert!(parse_target_spec("linux-i2c:banana").is_err());
    }
}
