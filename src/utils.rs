//! Small free functions shared across formats and the document translator.

/// JGadget hash used to address BCSV columns by name.
///
/// Seeded at 0; each byte updates `h = h * 31 + byte` modulo 2^32.
pub fn jgadget_hash(name: &str) -> u32 {
    name.bytes().fold(0u32, |h, b| h.wrapping_mul(31).wrapping_add(b as u32))
}

/// Parse a `#rrggbb` or `#rrggbbaa` string (case-insensitive) into RGBA
/// bytes, defaulting alpha to `0xFF` when omitted.
pub fn parse_hex_color(s: &str) -> Option<[u8; 4]> {
    let s = s.strip_prefix('#').unwrap_or(s);
    let byte = |i: usize| u8::from_str_radix(s.get(i..i + 2)?, 16).ok();
    match s.len() {
        6 => Some([byte(0)?, byte(2)?, byte(4)?, 0xFF]),
        8 => Some([byte(0)?, byte(2)?, byte(4)?, byte(6)?]),
        _ => None,
    }
}

/// Format RGBA bytes as `#rrggbb` (alpha `0xFF`) or `#rrggbbaa` otherwise.
pub fn format_hex_color(rgba: [u8; 4]) -> String {
    if rgba[3] == 0xFF {
        format!("#{:02x}{:02x}{:02x}", rgba[0], rgba[1], rgba[2])
    } else {
        format!(
            "#{:02x}{:02x}{:02x}{:02x}",
            rgba[0], rgba[1], rgba[2], rgba[3]
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn jgadget_hash_matches_known_vector() {
        assert_eq!(jgadget_hash("GroupName"), 0x1F0AAD8A);
    }

    #[test]
    fn hex_color_round_trips() {
        let rgba = parse_hex_color("#1a2b3c").unwrap();
        assert_eq!(rgba, [0x1a, 0x2b, 0x3c, 0xFF]);
        assert_eq!(format_hex_color(rgba), "#1a2b3c");

        let rgba = parse_hex_color("#1A2B3C80").unwrap();
        assert_eq!(rgba, [0x1a, 0x2b, 0x3c, 0x80]);
        assert_eq!(format_hex_color(rgba), "#1a2b3c80");
    }

    #[test]
    fn hex_color_rejects_bad_length() {
        assert!(parse_hex_color("#abc").is_none());
    }
}
