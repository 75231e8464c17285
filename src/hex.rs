//! Hex text helpers: hexstream, its inverse, and a classic hexdump.

use crate::error::Error;

const BYTES_IN_ROW: usize = 16;
/// Extra spacing between the two 8-byte halves of a dump row.
const HALF_SEPARATOR: &str = "  ";
/// Spacing between the hex cells and the ASCII column.
const TEXT_GUTTER: usize = 4;

/// Lowercase hex rendering of `data`, two digits per byte, no separators.
pub fn hexstream(data: &[u8]) -> String {
    data.iter().map(|b| format!("{b:02x}")).collect()
}

/// Decode a [hexstream] back into bytes.
///
/// The input must be an even number of hex digits; anything else is a
/// format error carrying the 1-based index of the offending byte pair.
pub fn from_hexstream(s: &str) -> Result<Vec<u8>, Error> {
    if s.len() % 2 != 0 {
        return Err(Error::format(
            s.len() / 2 + 1,
            "input must be a hexstream with an even number of digits",
        ));
    }
    let mut out = Vec::with_capacity(s.len() / 2);
    for (i, pair) in s.as_bytes().chunks(2).enumerate() {
        let value = hex_digit(pair[0])
            .zip(hex_digit(pair[1]))
            .map(|(hi, lo)| hi << 4 | lo)
            .ok_or_else(|| {
                Error::format(
                    i + 1,
                    format!(
                        "'{}' are not hexadecimal digits",
                        String::from_utf8_lossy(pair)
                    ),
                )
            })?;
        out.push(value);
    }
    Ok(out)
}

fn hex_digit(c: u8) -> Option<u8> {
    (c as char).to_digit(16).map(|d| d as u8)
}

/// Classic dump: rows of 16 bytes with an 8-digit hex offset, the hex cells
/// split into two halves, and a printable-ASCII gutter (`.` elsewhere).
pub fn hexdump(data: &[u8]) -> String {
    let mut out = String::new();
    let mut row_start = 0;
    while row_start < data.len() {
        let row_end = data.len().min(row_start + BYTES_IN_ROW);
        let row = &data[row_start..row_end];
        out.push_str(&format!("{row_start:08x}: "));
        let split = row.len().min(BYTES_IN_ROW / 2);
        for b in &row[..split] {
            out.push_str(&format!("{b:02x} "));
        }
        out.push_str(HALF_SEPARATOR);
        for b in &row[split..] {
            out.push_str(&format!("{b:02x} "));
        }
        let pad = TEXT_GUTTER + (BYTES_IN_ROW - row.len()) * 3;
        out.extend(std::iter::repeat(' ').take(pad));
        for &b in row {
            out.push(if b.is_ascii_graphic() || b == b' ' { b as char } else { '.' });
        }
        out.push('\n');
        row_start += BYTES_IN_ROW;
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stream_round_trip() {
        let data: Vec<u8> = (0..=255).collect();
        let s = hexstream(&data);
        assert_eq!(s.len(), 512);
        assert_eq!(from_hexstream(&s).unwrap(), data);
    }

    #[test]
    fn stream_rejects_odd_length() {
        let err = from_hexstream("abc").unwrap_err();
        assert!(matches!(err, Error::Format { .. }));
    }

    #[test]
    fn stream_rejects_non_hex() {
        let err = from_hexstream("0gff").unwrap_err();
        assert!(matches!(err, Error::Format { field: 1, .. }));
    }

    #[test]
    fn dump_row_layout() {
        let dump = hexdump(b"ABCDEFGHIJKLMNOPQR");
        let lines: Vec<&str> = dump.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].starts_with("00000000: 41 42 43 44 45 46 47 48   49 4a"));
        assert!(lines[0].ends_with("ABCDEFGHIJKLMNOP"));
        assert!(lines[1].starts_with("00000010: 51 52"));
        assert!(lines[1].ends_with("QR"));
        // ASCII gutter starts at the same column on full and partial rows.
        assert_eq!(lines[0].find("ABCDEFGHIJKLMNOP"), lines[1].find("QR"));
    }

    #[test]
    fn dump_masks_non_printable() {
        let dump = hexdump(&[0x00, 0x41, 0x7f]);
        assert!(dump.trim_end().ends_with(".A."));
    }
}
