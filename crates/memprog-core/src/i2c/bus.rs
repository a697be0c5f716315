//! Two-wire bus abstraction

use crate::error::Result;

/// Two-wire (I2C-style) bus master
///
/// Transactions address a 7-bit target. A write with an empty payload is
/// a presence probe: it carries only the address phase and reports
/// whether the target acknowledged.
///
/// Implementations distinguish a missing acknowledgment
/// ([`crate::Error::BusAbsent`]) from any other transfer failure
/// ([`crate::Error::BusFault`]).
pub trait I2cBus {
    /// Write `bytes` to `addr`; empty `bytes` probes for an ACK only
    fn write(&mut self, addr: u8, bytes: &[u8]) -> Result<()>;

    /// Read `buf.len()` bytes from `addr`
    fn read(&mut self, addr: u8, buf: &mut [u8]) -> Result<()>;

    /// Delay for the given number of milliseconds
    fn delay_ms(&mut self, ms: u32);
}

impl<T: I2cBus + ?Sized> I2cBus for &mut T {
    fn write(&mut self, addr: u8, bytes: &[u8]) -> Result<()> {
        (**self).write(addr, bytes)
    }

    fn read(&mut self, addr: u8, buf: &mut [u8]) -> Result<()> {
        (**self).read(addr, buf)
    }

    fn delay_ms(&mut self, ms: u32) {
        (**self).delay_ms(ms)
    }
}
