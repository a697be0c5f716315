//! Error types for memprog-core
//!
//! This module provides a no_std compatible error type that is used
//! throughout the crate. All protocol failures are reported as values;
//! nothing in the core panics on device misbehavior.

use core::fmt;

/// Core error type - no_std compatible, Copy for efficiency
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// No memory technology has been selected on the session
    NoTechnologySelected,
    /// The requested operation does not apply to the active technology
    TechnologyMismatch,
    /// A NAND write would span more than one page
    BoundaryViolation {
        /// Start address of the rejected write
        addr: u32,
        /// Length of the rejected write in bytes
        len: usize,
    },
    /// A bounded readiness wait expired before the device became idle
    Timeout,
    /// The targeted bus address did not acknowledge
    BusAbsent {
        /// 7-bit bus address that failed to respond
        addr: u8,
    },
    /// Post-operation status register reported a program/erase failure
    OperationFailed,
    /// Bus address outside the legal 7-bit range [0x08, 0x77]
    InvalidBusAddress {
        /// The rejected address
        addr: u8,
    },
    /// The erase scope is not supported by the active technology
    UnsupportedEraseScope,
    /// The underlying bus transfer failed
    BusFault,
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoTechnologySelected => write!(f, "no memory technology selected"),
            Self::TechnologyMismatch => {
                write!(f, "operation does not apply to the active technology")
            }
            Self::BoundaryViolation { addr, len } => {
                write!(
                    f,
                    "write of {} bytes at 0x{:08X} crosses a page boundary",
                    len, addr
                )
            }
            Self::Timeout => write!(f, "device did not become ready in time"),
            Self::BusAbsent { addr } => {
                write!(f, "no acknowledgment from bus address 0x{:02X}", addr)
            }
            Self::OperationFailed => write!(f, "program/erase failed (status fail bit set)"),
            Self::InvalidBusAddress { addr } => {
                write!(f, "bus address 0x{:02X} outside [0x08, 0x77]", addr)
            }
            Self::UnsupportedEraseScope => {
                write!(f, "erase scope not supported by the active technology")
            }
            Self::BusFault => write!(f, "bus transfer failed"),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for Error {}

/// Result type alias using the core Error type
pub type Result<T> = core::result::Result<T, Error>;
