//! Parallel NAND bus abstraction

/// Low-level parallel NAND bus
///
/// Models the six discrete control lines (command latch, address latch,
/// write enable, read enable, chip enable, ready/busy) plus an 8-bit
/// shared data bus. Implementations own the wiring details; the contract
/// for data cycles is: atomically present the 8-bit value on the bus,
/// then pulse the appropriate strobe line for at least 1 microsecond.
///
/// Control levels are logical: `set_chip_enable(true)` selects the chip
/// regardless of the line's electrical polarity.
pub trait NandBus {
    /// Select (`true`) or deselect the chip
    fn set_chip_enable(&mut self, enabled: bool);

    /// Raise/lower the command latch; bytes written while high are
    /// interpreted as commands
    fn set_command_latch(&mut self, enabled: bool);

    /// Raise/lower the address latch; bytes written while high are
    /// interpreted as address cycles
    fn set_address_latch(&mut self, enabled: bool);

    /// Present a byte on the data bus and pulse write-enable (>= 1 us)
    fn write_byte(&mut self, byte: u8);

    /// Pulse read-enable (>= 1 us) and sample the data bus
    fn read_byte(&mut self) -> u8;

    /// Sample the ready/busy line; `true` while the device is busy
    fn busy(&mut self) -> bool;

    /// Delay for the given number of microseconds
    fn delay_us(&mut self, us: u32);
}

impl<T: NandBus + ?Sized> NandBus for &mut T {
    fn set_chip_enable(&mut self, enabled: bool) {
        (**self).set_chip_enable(enabled)
    }

    fn set_command_latch(&mut self, enabled: bool) {
        (**self).set_command_latch(enabled)
    }

    fn set_address_latch(&mut self, enabled: bool) {
        (**self).set_address_latch(enabled)
    }

    fn write_byte(&mut self, byte: u8) {
        (**self).write_byte(byte)
    }

    fn read_byte(&mut self) -> u8 {
        (**self).read_byte()
    }

    fn busy(&mut self) -> bool {
        (**self).busy()
    }

    fn delay_us(&mut self, us: u32) {
        (**self).delay_us(us)
    }
}
