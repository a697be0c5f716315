//! JEDEC identity decoding
//!
//! Minimal vendor/model lookup: manufacturer byte to vendor name, and an
//! exact density table for the Winbond W25Q family. Anything deeper than
//! this (per-part capability tables, SFDP) is out of scope for this
//! programmer.

/// JEDEC identity: manufacturer byte plus 16-bit device ID
///
/// The device ID's high byte is the family/memory-type code, the low
/// byte the density code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct JedecId {
    /// Manufacturer byte
    pub manufacturer: u8,
    /// Device ID, family byte in the high half
    pub device: u16,
}

impl JedecId {
    /// Family/memory-type byte (first device byte)
    pub fn family(&self) -> u8 {
        (self.device >> 8) as u8
    }

    /// Density code (second device byte)
    pub fn density_code(&self) -> u8 {
        self.device as u8
    }
}

/// Known serial flash vendors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Vendor {
    /// Spansion / Cypress (0x01)
    SpansionCypress,
    /// Micron / Numonyx / ST (0x20)
    MicronSt,
    /// Winbond (0xEF)
    Winbond,
    /// Macronix (0xC2)
    Macronix,
    /// SST (0xBF)
    Sst,
    /// Unrecognized manufacturer byte
    Unknown(u8),
}

impl Vendor {
    /// Resolve a manufacturer byte
    pub fn from_id(id: u8) -> Self {
        match id {
            0x01 => Vendor::SpansionCypress,
            0x20 => Vendor::MicronSt,
            0xEF => Vendor::Winbond,
            0xC2 => Vendor::Macronix,
            0xBF => Vendor::Sst,
            other => Vendor::Unknown(other),
        }
    }

    /// Vendor display name
    pub fn name(&self) -> &'static str {
        match self {
            Vendor::SpansionCypress => "Spansion/Cypress",
            Vendor::MicronSt => "Micron/ST",
            Vendor::Winbond => "Winbond",
            Vendor::Macronix => "Macronix",
            Vendor::Sst => "SST",
            Vendor::Unknown(_) => "Unknown manufacturer",
        }
    }
}

/// A named part from the density table
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Part {
    /// Part name
    pub name: &'static str,
    /// Density in megabits
    pub density_mbit: u32,
}

/// Result of a part lookup
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PartMatch {
    /// Exact family + density match
    Exact(Part),
    /// Vendor and family recognized, density code unknown
    Family {
        /// Series name, e.g. "W25Q"
        series: &'static str,
    },
    /// Vendor recognized, nothing known about the part
    VendorOnly,
    /// Manufacturer byte not in the table
    Unknown,
}

/// Winbond W25Q family byte
const WINBOND_W25Q_FAMILY: u8 = 0x40;

/// Winbond W25Q density table: density code to part
const W25Q_PARTS: &[(u8, Part)] = &[
    (0x14, Part { name: "W25Q80", density_mbit: 8 }),
    (0x15, Part { name: "W25Q16", density_mbit: 16 }),
    (0x16, Part { name: "W25Q32", density_mbit: 32 }),
    (0x17, Part { name: "W25Q64", density_mbit: 64 }),
    (0x18, Part { name: "W25Q128", density_mbit: 128 }),
];

/// Resolve a JEDEC identity against the lookup table
pub fn lookup_part(id: &JedecId) -> PartMatch {
    match Vendor::from_id(id.manufacturer) {
        Vendor::Winbond => {
            if id.family() != WINBOND_W25Q_FAMILY {
                return PartMatch::VendorOnly;
            }
            let code = id.density_code();
            match W25Q_PARTS.iter().find(|(c, _)| *c == code) {
                Some((_, part)) => PartMatch::Exact(*part),
                None => PartMatch::Family { series: "W25Q" },
            }
        }
        Vendor::Unknown(_) => PartMatch::Unknown,
        _ => PartMatch::VendorOnly,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_winbond_exact_density() {
        let id = JedecId {
            manufacturer: 0xEF,
            device: 0x4018,
        };
        assert_eq!(Vendor::from_id(id.manufacturer), Vendor::Winbond);
        match lookup_part(&id) {
            PartMatch::Exact(part) => {
                assert_eq!(part.name, "W25Q128");
                assert_eq!(part.density_mbit, 128);
            }
            other => panic!("expected exact match, got {:?}", other),
        }
    }

    #[test]
    fn test_winbond_unknown_density_resolves_to_family() {
        let id = JedecId {
            manufacturer: 0xEF,
            device: 0x4099,
        };
        assert_eq!(lookup_part(&id), PartMatch::Family { series: "W25Q" });
    }

    #[test]
    fn test_winbond_foreign_family() {
        let id = JedecId {
            manufacturer: 0xEF,
            device: 0x6017,
        };
        assert_eq!(lookup_part(&id), PartMatch::VendorOnly);
    }

    #[test]
    fn test_unknown_manufacturer() {
        let id = JedecId {
            manufacturer: 0x7A,
            device: 0x4018,
        };
        assert_eq!(Vendor::from_id(0x7A), Vendor::Unknown(0x7A));
        assert_eq!(lookup_part(&id), PartMatch::Unknown);
    }

    #[test]
    fn test_known_vendor_without_table() {
        let id = JedecId {
            manufacturer: 0xC2,
            device: 0x2018,
        };
        assert_eq!(lookup_part(&id), PartMatch::VendorOnly);
    }
}
