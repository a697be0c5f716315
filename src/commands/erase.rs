//! Erase command implementation

use indicatif::{ProgressBar, ProgressStyle};
use memprog_core::device::{EraseScope, MemoryDevice};
use std::io::{BufRead, Write};
use std::time::Duration;

/// Run the erase command
pub fn run(
    device: &mut dyn MemoryDevice,
    scope: EraseScope,
    address: u32,
    yes: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    if scope == EraseScope::Chip && !yes && !confirm_chip_erase()? {
        println!("Erase aborted");
        return Ok(());
    }

    let pb = ProgressBar::new_spinner();
    pb.set_style(ProgressStyle::default_spinner().template("{spinner:.green} {msg}")?);
    pb.set_message(match scope {
        EraseScope::Sector => format!("Erasing sector at 0x{:06X}...", address),
        EraseScope::Block => format!("Erasing block at 0x{:06X}...", address),
        EraseScope::Chip => "Erasing entire chip (this may take a while)...".to_string(),
    });
    pb.enable_steady_tick(Duration::from_millis(100));

    let result = device.erase(scope, address);
    match &result {
        Ok(()) => pb.finish_with_message("Erase complete"),
        Err(_) => pb.finish_with_message("Erase failed"),
    }
    result?;
    Ok(())
}

/// Chip erase is destructive; require a typed confirmation
fn confirm_chip_erase() -> Result<bool, Box<dyn std::error::Error>> {
    print!("This will erase the entire chip. Type YES to confirm: ");
    std::io::stdout().flush()?;
    let mut line = String::new();
    std::io::stdin().lock().read_line(&mut line)?;
    Ok(line.trim() == "YES")
}
