//! Status command implementation

use memprog_core::device::{MemoryDevice, StatusReport};

/// Run the status command
pub fn run(device: &mut dyn MemoryDevice) -> Result<(), Box<dyn std::error::Error>> {
    match device.read_status()? {
        StatusReport::Nand(status) => {
            println!("Status: 0x{:02X}", status.raw);
            println!("Program/Erase failed: {}", yes_no(status.failed));
            println!(
                "Ready/Busy:           {}",
                if status.ready { "Ready" } else { "Busy" }
            );
            println!("Write protected:      {}", yes_no(status.write_protected));
        }
        StatusReport::Spi(status) => {
            println!("Status register: 0x{:02X}", status.raw);
            println!("Busy (WIP):           {}", yes_no(status.write_in_progress));
            println!(
                "Write enable latch:   {}",
                if status.write_enable_latch {
                    "Enabled"
                } else {
                    "Disabled"
                }
            );
            println!("Block protection:     {:04b}", status.block_protect);
            println!("Register locked:      {}", yes_no(status.register_locked));
        }
        StatusReport::Eeprom(status) => {
            println!("Device present: {}", yes_no(status.present));
            println!("Device ready:   {}", yes_no(status.ready));
        }
    }
    Ok(())
}

fn yes_no(value: bool) -> &'static str {
    if value {
        "Yes"
    } else {
        "No"
    }
}
