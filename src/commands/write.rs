//! Write command implementation

use memprog_core::device::MemoryDevice;
use std::path::Path;

/// Run the write command
pub fn run(
    device: &mut dyn MemoryDevice,
    address: u32,
    data: Option<&str>,
    input: Option<&Path>,
) -> Result<(), Box<dyn std::error::Error>> {
    let payload = match (data, input) {
        (Some(text), None) => parse_hex_bytes(text)?,
        (None, Some(path)) => std::fs::read(path)?,
        _ => return Err("Provide the payload with either --data or --input".into()),
    };
    if payload.is_empty() {
        return Err("Empty payload".into());
    }

    device.write(address, &payload)?;
    println!("Wrote {} bytes at 0x{:06X}", payload.len(), address);
    Ok(())
}

/// Parse "DE AD BE EF" style hex byte lists (spaces or commas)
fn parse_hex_bytes(text: &str) -> Result<Vec<u8>, String> {
    text.split([' ', ','])
        .filter(|token| !token.is_empty())
        .map(|token| {
            let token = token
                .strip_prefix("0x")
                .or_else(|| token.strip_prefix("0X"))
                .unwrap_or(token);
            u8::from_str_radix(token, 16).map_err(|_| format!("Invalid hex byte '{}'", token))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_hex_bytes() {
        assert_eq!(
            parse_hex_bytes("DE AD BE EF").unwrap(),
            vec![0xDE, 0xAD, 0xBE, 0xEF]
        );
        assert_eq!(parse_hex_bytes("0x01,0x02, 03").unwrap(), vec![1, 2, 3]);
        assert!(parse_hex_bytes("GG").is_err());
    }
}
