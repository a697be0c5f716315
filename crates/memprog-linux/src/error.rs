//! Error types for Linux bus backends

use thiserror::Error;

/// Linux backend specific errors
#[derive(Debug, Error)]
pub enum LinuxBusError {
    /// Failed to open device node
    #[error("Failed to open {path}: {source}")]
    OpenFailed {
        /// Device node path
        path: String,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// A configuration ioctl failed
    #[error("Failed to configure {what}: {source}")]
    ConfigFailed {
        /// What was being configured
        what: &'static str,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// Bus transfer failed
    #[error("Bus transfer failed: {0}")]
    TransferFailed(#[source] std::io::Error),

    /// Target address did not acknowledge
    #[error("No acknowledgment from address 0x{addr:02X}")]
    NotAcknowledged {
        /// The probed 7-bit address
        addr: u8,
    },

    /// Invalid parameter
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),
}

/// Result type for Linux bus backends
pub type Result<T> = std::result::Result<T, LinuxBusError>;
