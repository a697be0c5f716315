//! spidev backend
//!
//! Implements `memprog_core::spi::SpiBus` over the Linux
//! `/dev/spidevX.Y` interface. A transaction is executed as one
//! SPI_IOC_MESSAGE with chip select held across the header/write phase
//! and the read phase.

use crate::error::{LinuxBusError, Result};

use memprog_core::error::{Error as CoreError, Result as CoreResult};
use memprog_core::spi::{SpiBus, SpiTransaction};

use std::fs::{File, OpenOptions};
use std::os::unix::io::AsRawFd;

/// Default SPI clock speed in Hz (2 MHz)
const DEFAULT_SPEED_HZ: u32 = 2_000_000;

/// Linux spidev ioctl constants
mod ioctl {
    use nix::ioctl_write_ptr;

    // SPI ioctl magic number
    const SPI_IOC_MAGIC: u8 = b'k';

    const SPI_IOC_TYPE_MODE: u8 = 1;
    const SPI_IOC_TYPE_BITS_PER_WORD: u8 = 3;
    const SPI_IOC_TYPE_MAX_SPEED_HZ: u8 = 4;

    ioctl_write_ptr!(spi_ioc_wr_mode, SPI_IOC_MAGIC, SPI_IOC_TYPE_MODE, u8);
    ioctl_write_ptr!(
        spi_ioc_wr_bits_per_word,
        SPI_IOC_MAGIC,
        SPI_IOC_TYPE_BITS_PER_WORD,
        u8
    );
    ioctl_write_ptr!(
        spi_ioc_wr_max_speed_hz,
        SPI_IOC_MAGIC,
        SPI_IOC_TYPE_MAX_SPEED_HZ,
        u32
    );

    /// Size of the kernel's spi_ioc_transfer struct
    pub const SPI_IOC_TRANSFER_SIZE: usize = 32;

    /// Calculate the ioctl number for SPI_IOC_MESSAGE(n)
    ///
    /// _IOW(SPI_IOC_MAGIC, 0, char[n * sizeof(struct spi_ioc_transfer)])
    pub fn spi_ioc_message(n: u8) -> libc::c_ulong {
        let size = (n as usize) * SPI_IOC_TRANSFER_SIZE;
        ((1u32 << 30) | ((size as u32) << 16) | ((SPI_IOC_MAGIC as u32) << 8)) as libc::c_ulong
    }
}

/// SPI transfer structure matching the kernel's spi_ioc_transfer layout
#[repr(C)]
#[derive(Debug, Default, Clone)]
struct SpiIocTransfer {
    tx_buf: u64,
    rx_buf: u64,
    len: u32,
    speed_hz: u32,
    delay_usecs: u16,
    bits_per_word: u8,
    cs_change: u8,
    tx_nbits: u8,
    rx_nbits: u8,
    word_delay_usecs: u8,
    _pad: u8,
}

/// Configuration for opening a spidev device
#[derive(Debug, Clone)]
pub struct LinuxSpiConfig {
    /// Device path (e.g. "/dev/spidev0.0")
    pub device: String,
    /// Clock speed in Hz (default 2 MHz)
    pub speed_hz: u32,
    /// SPI mode (0-3, default 0)
    pub mode: u8,
}

impl LinuxSpiConfig {
    /// Create a configuration with the given device path
    pub fn new(device: impl Into<String>) -> Self {
        Self {
            device: device.into(),
            speed_hz: DEFAULT_SPEED_HZ,
            mode: 0,
        }
    }

    /// Set the clock speed in Hz
    pub fn with_speed(mut self, speed_hz: u32) -> Self {
        self.speed_hz = speed_hz;
        self
    }
}

/// Serial flash bus over Linux spidev
pub struct LinuxSpiBus {
    file: File,
    speed_hz: u32,
}

impl LinuxSpiBus {
    /// Open a spidev device
    pub fn open(config: &LinuxSpiConfig) -> Result<Self> {
        if config.device.is_empty() {
            return Err(LinuxBusError::InvalidParameter(
                "no spidev device specified".into(),
            ));
        }

        log::debug!("linux_spi: opening {}", config.device);
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .open(&config.device)
            .map_err(|e| LinuxBusError::OpenFailed {
                path: config.device.clone(),
                source: e,
            })?;

        let fd = file.as_raw_fd();

        let mode = config.mode;
        unsafe {
            ioctl::spi_ioc_wr_mode(fd, &mode).map_err(|e| LinuxBusError::ConfigFailed {
                what: "SPI mode",
                source: std::io::Error::from_raw_os_error(e as i32),
            })?;
        }

        let bits: u8 = 8;
        unsafe {
            ioctl::spi_ioc_wr_bits_per_word(fd, &bits).map_err(|e| LinuxBusError::ConfigFailed {
                what: "bits per word",
                source: std::io::Error::from_raw_os_error(e as i32),
            })?;
        }

        let speed = config.speed_hz;
        unsafe {
            ioctl::spi_ioc_wr_max_speed_hz(fd, &speed).map_err(|e| LinuxBusError::ConfigFailed {
                what: "clock speed",
                source: std::io::Error::from_raw_os_error(e as i32),
            })?;
        }

        log::info!(
            "linux_spi: opened {} (mode={}, speed={} kHz)",
            config.device,
            mode,
            speed / 1000
        );

        Ok(Self {
            file,
            speed_hz: speed,
        })
    }

    /// One write-then-read exchange with chip select held throughout
    fn transfer(&mut self, write_data: &[u8], read_buf: &mut [u8]) -> Result<()> {
        let fd = self.file.as_raw_fd();

        let mut transfers = vec![SpiIocTransfer {
            tx_buf: write_data.as_ptr() as u64,
            len: write_data.len() as u32,
            speed_hz: self.speed_hz,
            bits_per_word: 8,
            ..Default::default()
        }];
        if !read_buf.is_empty() {
            transfers.push(SpiIocTransfer {
                rx_buf: read_buf.as_mut_ptr() as u64,
                len: read_buf.len() as u32,
                speed_hz: self.speed_hz,
                bits_per_word: 8,
                ..Default::default()
            });
        }

        let ioctl_num = ioctl::spi_ioc_message(transfers.len() as u8);
        let ret = unsafe { libc::ioctl(fd, ioctl_num, transfers.as_ptr()) };
        if ret < 0 {
            return Err(LinuxBusError::TransferFailed(
                std::io::Error::last_os_error(),
            ));
        }
        Ok(())
    }
}

impl SpiBus for LinuxSpiBus {
    fn execute(&mut self, txn: &mut SpiTransaction<'_>) -> CoreResult<()> {
        let header_len = txn.header_len();
        let mut write_data = vec![0u8; header_len + txn.write_data.len()];
        txn.encode_header(&mut write_data);
        write_data[header_len..].copy_from_slice(txn.write_data);

        self.transfer(&write_data, txn.read_buf).map_err(|e| {
            log::error!("linux_spi: {}", e);
            CoreError::BusFault
        })
    }

    fn delay_us(&mut self, us: u32) {
        std::thread::sleep(std::time::Duration::from_micros(us as u64));
    }
}
