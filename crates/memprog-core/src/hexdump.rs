//! Hex dump rendering
//!
//! Shared by every read path: 16-byte rows with an address prefix, hex
//! byte columns and a printable-ASCII gutter. Pure formatting over
//! `core::fmt::Write`, so it works against a `String`, a serial console
//! or anything else that accepts text.

use core::fmt::{self, Write};

/// Bytes rendered per output row
pub const BYTES_PER_ROW: usize = 16;

/// Render `data` as a hex dump, addressing rows from `base`.
///
/// Row format: `0xNNNN: XX XX .. XX  | ascii.dots`. Short final rows are
/// padded so the ASCII gutter stays aligned.
pub fn write_hex_dump<W: Write>(out: &mut W, base: u32, data: &[u8]) -> fmt::Result {
    for (row_index, row) in data.chunks(BYTES_PER_ROW).enumerate() {
        let addr = base + (row_index * BYTES_PER_ROW) as u32;
        write!(out, "0x{:04X}: ", addr)?;

        for byte in row {
            write!(out, "{:02X} ", byte)?;
        }
        for _ in row.len()..BYTES_PER_ROW {
            write!(out, "   ")?;
        }

        write!(out, " | ")?;
        for &byte in row {
            let ch = if (0x20..=0x7E).contains(&byte) {
                byte as char
            } else {
                '.'
            };
            write!(out, "{}", ch)?;
        }
        writeln!(out)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::string::String;

    #[test]
    fn test_single_full_row() {
        let data: std::vec::Vec<u8> = (0x41..0x51).collect();
        let mut out = String::new();
        write_hex_dump(&mut out, 0, &data).unwrap();
        assert_eq!(
            out,
            "0x0000: 41 42 43 44 45 46 47 48 49 4A 4B 4C 4D 4E 4F 50  | ABCDEFGHIJKLMNOP\n"
        );
    }

    #[test]
    fn test_short_row_is_padded() {
        let mut out = String::new();
        write_hex_dump(&mut out, 0x100, &[0x00, 0x61, 0x7F]).unwrap();
        assert_eq!(
            out,
            "0x0100: 00 61 7F                                         | .a.\n"
        );
    }

    #[test]
    fn test_rows_advance_address() {
        let data = [0u8; 33];
        let mut out = String::new();
        write_hex_dump(&mut out, 0x2000, &data).unwrap();
        let addrs: std::vec::Vec<&str> = out
            .lines()
            .map(|l| l.split(':').next().unwrap())
            .collect();
        assert_eq!(addrs, ["0x2000", "0x2010", "0x2020"]);
    }

    #[test]
    fn test_empty_data_renders_nothing() {
        let mut out = String::new();
        write_hex_dump(&mut out, 0, &[]).unwrap();
        assert!(out.is_empty());
    }
}
