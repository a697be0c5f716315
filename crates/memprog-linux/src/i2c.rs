//! i2c-dev backend
//!
//! Implements `memprog_core::i2c::I2cBus` over the Linux `/dev/i2c-N`
//! character device. The target is selected per transaction with the
//! I2C_SLAVE ioctl; presence probes use an SMBus quick write, which is
//! what bus scanners issue for the EEPROM address range.

use crate::error::{LinuxBusError, Result};

use memprog_core::error::{Error as CoreError, Result as CoreResult};
use memprog_core::i2c::I2cBus;

use std::fs::{File, OpenOptions};
use std::io::{Read, Write};
use std::os::unix::io::AsRawFd;

/// I2C_SLAVE ioctl: set the target 7-bit address
const I2C_SLAVE: libc::c_ulong = 0x0703;
/// I2C_SMBUS ioctl: execute an SMBus-level transaction
const I2C_SMBUS: libc::c_ulong = 0x0720;

/// SMBus write direction
const I2C_SMBUS_WRITE: u8 = 0;
/// SMBus quick transaction (address phase only)
const I2C_SMBUS_QUICK: u32 = 0;

/// Argument block for the I2C_SMBUS ioctl
#[repr(C)]
struct I2cSmbusIoctlData {
    read_write: u8,
    command: u8,
    size: u32,
    data: *mut libc::c_void,
}

/// Errno values the kernel uses for a missing acknowledgment
fn is_nack_errno(err: &std::io::Error) -> bool {
    matches!(err.raw_os_error(), Some(libc::EREMOTEIO) | Some(libc::ENXIO))
}

/// Configuration for opening an i2c-dev device
#[derive(Debug, Clone)]
pub struct LinuxI2cConfig {
    /// Device path (e.g. "/dev/i2c-1")
    pub device: String,
}

impl LinuxI2cConfig {
    /// Create a configuration with the given device path
    pub fn new(device: impl Into<String>) -> Self {
        Self {
            device: device.into(),
        }
    }
}

/// Two-wire bus over Linux i2c-dev
pub struct LinuxI2cBus {
    file: File,
    current_addr: Option<u8>,
}

impl LinuxI2cBus {
    /// Open an i2c-dev device
    pub fn open(config: &LinuxI2cConfig) -> Result<Self> {
        if config.device.is_empty() {
            return Err(LinuxBusError::InvalidParameter(
                "no i2c-dev device specified".into(),
            ));
        }

        log::debug!("linux_i2c: opening {}", config.device);
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .open(&config.device)
            .map_err(|e| LinuxBusError::OpenFailed {
                path: config.device.clone(),
                source: e,
            })?;

        log::info!("linux_i2c: opened {}", config.device);
        Ok(Self {
            file,
            current_addr: None,
        })
    }

    /// Point the kernel at `addr` for subsequent read/write syscalls
    fn set_target(&mut self, addr: u8) -> Result<()> {
        if self.current_addr == Some(addr) {
            return Ok(());
        }
        let fd = self.file.as_raw_fd();
        let ret = unsafe { libc::ioctl(fd, I2C_SLAVE, addr as libc::c_ulong) };
        if ret < 0 {
            return Err(LinuxBusError::ConfigFailed {
                what: "target address",
                source: std::io::Error::last_os_error(),
            });
        }
        self.current_addr = Some(addr);
        Ok(())
    }

    /// Address-phase-only probe via SMBus quick write
    fn probe(&mut self, addr: u8) -> Result<()> {
        self.set_target(addr)?;
        let fd = self.file.as_raw_fd();
        let mut args = I2cSmbusIoctlData {
            read_write: I2C_SMBUS_WRITE,
            command: 0,
            size: I2C_SMBUS_QUICK,
            data: std::ptr::null_mut(),
        };
        let ret = unsafe { libc::ioctl(fd, I2C_SMBUS, &mut args) };
        if ret < 0 {
            let err = std::io::Error::last_os_error();
            if is_nack_errno(&err) {
                return Err(LinuxBusError::NotAcknowledged { addr });
            }
            return Err(LinuxBusError::TransferFailed(err));
        }
        Ok(())
    }

    fn write_bytes(&mut self, addr: u8, bytes: &[u8]) -> Result<()> {
        if bytes.is_empty() {
            return self.probe(addr);
        }
        self.set_target(addr)?;
        match self.file.write(bytes) {
            Ok(n) if n == bytes.len() => Ok(()),
            Ok(_) => Err(LinuxBusError::TransferFailed(std::io::Error::new(
                std::io::ErrorKind::WriteZero,
                "short i2c write",
            ))),
            Err(err) if is_nack_errno(&err) => Err(LinuxBusError::NotAcknowledged { addr }),
            Err(err) => Err(LinuxBusError::TransferFailed(err)),
        }
    }

    fn read_bytes(&mut self, addr: u8, buf: &mut [u8]) -> Result<()> {
        self.set_target(addr)?;
        match self.file.read(buf) {
            Ok(n) if n == buf.len() => Ok(()),
            Ok(_) => Err(LinuxBusError::TransferFailed(std::io::Error::new(
                std::io::ErrorKind::UnexpectedEof,
                "short i2c read",
            ))),
            Err(err) if is_nack_errno(&err) => Err(LinuxBusError::NotAcknowledged { addr }),
            Err(err) => Err(LinuxBusError::TransferFailed(err)),
        }
    }
}

impl I2cBus for LinuxI2cBus {
    fn write(&mut self, addr: u8, bytes: &[u8]) -> CoreResult<()> {
        self.write_bytes(addr, bytes).map_err(|e| match e {
            LinuxBusError::NotAcknowledged { addr } => CoreError::BusAbsent { addr },
            other => {
                log::error!("linux_i2c: {}", other);
                CoreError::BusFault
            }
        })
    }

    fn read(&mut self, addr: u8, buf: &mut [u8]) -> CoreResult<()> {
        self.read_bytes(addr, buf).map_err(|e| match e {
            LinuxBusError::NotAcknowledged { addr } => CoreError::BusAbsent { addr },
            other => {
                log::error!("linux_i2c: {}", other);
                CoreError::BusFault
            }
        })
    }

    fn delay_ms(&mut self, ms: u32) {
        std::thread::sleep(std::time::Duration::from_millis(ms as u64));
    }
}
