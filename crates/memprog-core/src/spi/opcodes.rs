//! Standard JEDEC serial flash opcodes
//!
//! The subset of the JEDEC command set this device class uses.

/// Write Enable - required before any program/erase operation
pub const WREN: u8 = 0x06;
/// Write Disable - clears the WEL bit
pub const WRDI: u8 = 0x04;
/// Read Status Register
pub const RDSR: u8 = 0x05;
/// Write Status Register
pub const WRSR: u8 = 0x01;
/// Read Data (no dummy byte)
pub const READ: u8 = 0x03;
/// Fast Read (one dummy byte after the address)
pub const FAST_READ: u8 = 0x0B;
/// Page Program (256-byte page)
pub const PP: u8 = 0x02;
/// Sector Erase (4 KiB)
pub const SE: u8 = 0x20;
/// Block Erase (32 KiB)
pub const BE_32K: u8 = 0x52;
/// Block Erase (64 KiB)
pub const BE_64K: u8 = 0xD8;
/// Chip Erase
pub const CE: u8 = 0xC7;
/// Read JEDEC ID (manufacturer + 2 device bytes)
pub const RDID: u8 = 0x9F;
