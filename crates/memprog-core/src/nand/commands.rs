//! NAND command set
//!
//! Command opcodes for small-page NAND parts, per the common ONFI-style
//! two-phase convention (command, address cycles, optional confirm
//! command).

/// Read - first cycle
pub const READ: u8 = 0x00;
/// Read - confirm cycle
pub const READ_CONFIRM: u8 = 0x30;
/// Page program - first cycle
pub const PROGRAM: u8 = 0x80;
/// Page program - confirm cycle
pub const PROGRAM_CONFIRM: u8 = 0x10;
/// Block erase - first cycle
pub const ERASE: u8 = 0x60;
/// Block erase - confirm cycle
pub const ERASE_CONFIRM: u8 = 0xD0;
/// Read ID (followed by one 0x00 address byte)
pub const READ_ID: u8 = 0x90;
/// Read status register
pub const READ_STATUS: u8 = 0x70;
/// Device reset
pub const RESET: u8 = 0xFF;
