//! Identify command implementation

use memprog_core::device::{DeviceIdentity, MemoryDevice};
use memprog_core::spi::{lookup_part, JedecId, PartMatch, Vendor};

/// Run the identify command
pub fn run(device: &mut dyn MemoryDevice) -> Result<(), Box<dyn std::error::Error>> {
    match device.identify()? {
        DeviceIdentity::Nand(id) => {
            println!("Manufacturer ID: 0x{:02X}", id[0]);
            println!("Device ID:       0x{:02X}", id[1]);
            println!("ID bytes 3-5:    0x{:02X} 0x{:02X} 0x{:02X}", id[2], id[3], id[4]);
        }
        DeviceIdentity::Jedec(id) => {
            println!("Manufacturer ID: 0x{:02X}", id.manufacturer);
            println!("Device ID:       0x{:04X}", id.device);
            println!("Device:          {}", describe_jedec(&id));
        }
        DeviceIdentity::BusScan(scan) => {
            if scan.is_empty() {
                println!("No devices found on the bus");
            } else {
                for hit in &scan.hits {
                    if hit.likely_eeprom {
                        println!("Device found at address 0x{:02X} (likely EEPROM)", hit.addr);
                    } else {
                        println!("Device found at address 0x{:02X}", hit.addr);
                    }
                }
                println!("{} device(s) responding", scan.len());
            }
        }
    }
    Ok(())
}

/// Human-readable vendor/part description for a JEDEC identity
fn describe_jedec(id: &JedecId) -> String {
    let vendor = Vendor::from_id(id.manufacturer);
    match lookup_part(id) {
        PartMatch::Exact(part) => format!(
            "{} {} ({} Mbit)",
            vendor.name(),
            part.name,
            part.density_mbit
        ),
        PartMatch::Family { series } => {
            format!("{}, unknown {} series model", vendor.name(), series)
        }
        PartMatch::VendorOnly => format!("{}, unknown model", vendor.name()),
        PartMatch::Unknown => format!("Unknown manufacturer (0x{:02X})", id.manufacturer),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_describe_known_winbond_part() {
        let id = JedecId {
            manufacturer: 0xEF,
            device: 0x4018,
        };
        assert_eq!(describe_jedec(&id), "Winbond W25Q128 (128 Mbit)");
    }

    #[test]
    fn test_describe_unknown_family_member() {
        let id = JedecId {
            manufacturer: 0xEF,
            device: 0x4099,
        };
        assert_eq!(describe_jedec(&id), "Winbond, unknown W25Q series model");
    }

    #[test]
    fn test_describe_unknown_manufacturer() {
        let id = JedecId {
            manufacturer: 0x7A,
            device: 0x1234,
        };
        assert_eq!(describe_jedec(&id), "Unknown manufacturer (0x7A)");
    }
}
