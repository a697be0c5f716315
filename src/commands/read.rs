//! Read command implementation

use indicatif::{ProgressBar, ProgressStyle};
use memprog_core::device::MemoryDevice;
use memprog_core::hexdump;
use std::path::Path;

/// Interactive dump size cap; a caller-side policy, not a core limit
const DUMP_LIMIT: u32 = 256;

/// Transfer chunk for file reads (keeps the progress bar honest)
const FILE_CHUNK: usize = 4096;

/// Run the read command
pub fn run(
    device: &mut dyn MemoryDevice,
    address: u32,
    length: u32,
    output: Option<&Path>,
    no_limit: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    match output {
        Some(path) => read_to_file(device, address, length, path),
        None => dump_to_stdout(device, address, length, no_limit),
    }
}

fn dump_to_stdout(
    device: &mut dyn MemoryDevice,
    address: u32,
    mut length: u32,
    no_limit: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    if !no_limit && length > DUMP_LIMIT {
        log::warn!(
            "limiting dump to {} bytes (use --no-limit or --output for more)",
            DUMP_LIMIT
        );
        length = DUMP_LIMIT;
    }

    let mut data = vec![0u8; length as usize];
    device.read(address, &mut data)?;

    let mut rendered = String::new();
    hexdump::write_hex_dump(&mut rendered, address, &data)?;
    print!("{}", rendered);
    Ok(())
}

fn read_to_file(
    device: &mut dyn MemoryDevice,
    address: u32,
    length: u32,
    path: &Path,
) -> Result<(), Box<dyn std::error::Error>> {
    let pb = ProgressBar::new(length as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{bar:40.cyan/blue} {bytes}/{total_bytes} {msg}")?,
    );
    pb.set_message("reading");

    let mut data = vec![0u8; length as usize];
    for chunk_start in (0..data.len()).step_by(FILE_CHUNK) {
        let chunk_end = (chunk_start + FILE_CHUNK).min(data.len());
        device.read(
            address + chunk_start as u32,
            &mut data[chunk_start..chunk_end],
        )?;
        pb.set_position(chunk_end as u64);
    }
    pb.finish_with_message("done");

    std::fs::write(path, &data)?;
    println!(
        "Read {} bytes from 0x{:06X} to {}",
        length,
        address,
        path.display()
    );
    Ok(())
}
