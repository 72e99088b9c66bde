//! Human-readable parameter descriptions.
//!
//! [`describe`] is a pure function from a mnemonic and the literal
//! parameter bytes collected for that command to a short summary string.
//! The output feeds log lines only; nothing in the decoder's behavior
//! depends on the exact wording.

use crate::opcode::{ASB_BITS, PRINT_MODE_BITS};

/// Space-separated lowercase hex.
pub(crate) fn hex(bytes: &[u8]) -> String {
    bytes
        .iter()
        .map(|b| format!("{b:02x}"))
        .collect::<Vec<_>>()
        .join(" ")
}

/// Describe the parameter bytes of a parsed command.
///
/// `params` must be the exact parameter bytes collected for the command,
/// excluding the introducer and opcode bytes. Mnemonics without a
/// dedicated describer fall back to lowercase hex.
pub fn describe(mnemonic: &str, params: &[u8]) -> String {
    match mnemonic {
        "ESC !" => print_mode(params),
        "ESC a" => keyed(params, &[(0, "left"), (1, "centre"), (2, "right")]),
        "ESC -" => keyed(params, &[(0, "off"), (1, "one-dot"), (2, "two-dot")]),
        "ESC $" => position(params),
        "ESC E" | "ESC B" | "ESC G" | "ESC {" | "GS B" | "GS b" | "FS -" => boolean(params),
        "ESC M" | "GS f" => keyed(params, FONTS),
        "ESC R" => keyed(params, INTERNATIONAL_SETS),
        "ESC *" => bit_image(params),
        "ESC D" => tab_stops(params),
        "GS !" => character_size(params),
        "GS H" => keyed(params, &[(0, "none"), (1, "above"), (2, "below"), (3, "both")]),
        "GS I" => keyed(params, &[(1, "model"), (2, "type"), (3, "firmware")]),
        "GS r" => keyed(params, &[
            (1, "paper sensor"),
            (2, "drawer kick-out connector"),
            (49, "paper sensor"),
            (50, "drawer kick-out connector"),
        ]),
        "GS a" => asb_flags(params),
        "GS h" => barcode_height(params),
        "GS V" => cut_mode(params),
        "GS v 0" => raster(params),
        "GS ( L" => graphics(params),
        "GS k" => barcode(params),
        "DLE EOT" => keyed(params, &[
            (1, "printer status"),
            (2, "offline status"),
            (3, "error status"),
            (4, "paper roll sensor status"),
        ]),
        "DLE ENQ" => keyed(params, &[(1, "recover and restart"), (2, "recover and clear buffer")]),
        other if other.starts_with("GS ( ") => extended(params),
        _ => hex(params),
    }
}

/// Font table for `ESC M` and `GS f`. Both the binary and ASCII forms
/// of the parameter appear in the wild.
const FONTS: &[(u8, &str)] = &[
    (0, "Font A"),
    (1, "Font B"),
    (48, "Font A"),
    (49, "Font B"),
];

/// International character set table for `ESC R`.
const INTERNATIONAL_SETS: &[(u8, &str)] = &[
    (0, "USA"),
    (1, "France"),
    (2, "Germany"),
    (3, "UK"),
    (4, "Denmark I"),
    (5, "Sweden"),
    (6, "Italy"),
    (7, "Spain I"),
    (8, "Japan"),
    (9, "Norway"),
    (10, "Denmark II"),
    (11, "Spain II"),
    (12, "Latin America"),
    (13, "Korea"),
    (14, "Slovenia/Croatia"),
    (15, "China"),
];

/// Barcode symbology names for `GS k` format A (NUL-terminated data).
const BARCODE_FORMAT_A: &[(u8, &str)] = &[
    (0, "UPC-A"),
    (1, "UPC-E"),
    (2, "JAN-13"),
    (3, "JAN-8"),
    (4, "CODE39"),
    (5, "ITF"),
    (6, "CODABAR"),
];

/// Barcode symbology names for `GS k` format B (length-counted data).
const BARCODE_FORMAT_B: &[(u8, &str)] = &[
    (65, "UPC-A"),
    (66, "UPC-E"),
    (67, "JAN-13"),
    (68, "JAN-8"),
    (69, "CODE39"),
    (70, "ITF"),
    (71, "CODABAR"),
    (72, "CODE93"),
    (73, "CODE128"),
];

/// Bit image mode names for `ESC *`.
const BIT_IMAGE_MODES: &[(u8, &str)] = &[
    (0, "8-dot single-density"),
    (1, "8-dot double-density"),
    (32, "24-dot single-density"),
    (33, "24-dot double-density"),
];

fn lookup(table: &[(u8, &'static str)], key: u8) -> Option<&'static str> {
    table.iter().find(|(k, _)| *k == key).map(|(_, name)| *name)
}

fn keyed(params: &[u8], table: &[(u8, &'static str)]) -> String {
    let Some(&n) = params.first() else {
        return String::new();
    };
    match lookup(table, n) {
        Some(name) => format!("n={n} ({name})"),
        None => format!("n={n}"),
    }
}

fn boolean(params: &[u8]) -> String {
    let Some(&n) = params.first() else {
        return String::new();
    };
    let state = if n & 0x01 != 0 { "enabled" } else { "disabled" };
    format!("n={n} ({state})")
}

fn le16(low: u8, high: u8) -> u16 {
    u16::from(low) + 256 * u16::from(high)
}

fn position(params: &[u8]) -> String {
    match params {
        [low, high, ..] => format!("position={}", le16(*low, *high)),
        _ => hex(params),
    }
}

fn print_mode(params: &[u8]) -> String {
    let Some(&n) = params.first() else {
        return String::new();
    };
    if n == 0 {
        return format!("n=0x{n:02X} (Font A)");
    }
    let names: Vec<&str> = PRINT_MODE_BITS
        .iter()
        .filter(|(bit, _)| n & bit != 0)
        .map(|(_, name)| *name)
        .collect();
    if names.is_empty() {
        format!("n=0x{n:02X}")
    } else {
        format!("n=0x{n:02X} ({})", names.join(", "))
    }
}

fn character_size(params: &[u8]) -> String {
    let Some(&n) = params.first() else {
        return String::new();
    };
    let width = (n >> 4) + 1;
    let height = (n & 0x0F) + 1;
    format!("n=0x{n:02X} (width x{width}, height x{height})")
}

fn asb_flags(params: &[u8]) -> String {
    let Some(&n) = params.first() else {
        return String::new();
    };
    if n == 0 {
        return format!("n=0x{n:02X} (ASB off)");
    }
    let names: Vec<&str> = ASB_BITS
        .iter()
        .filter(|(bit, _)| n & bit != 0)
        .map(|(_, name)| *name)
        .collect();
    if names.is_empty() {
        format!("n=0x{n:02X}")
    } else {
        format!("n=0x{n:02X} ({})", names.join(", "))
    }
}

fn barcode_height(params: &[u8]) -> String {
    match params.first() {
        Some(&n) => format!("height={n} dots"),
        None => String::new(),
    }
}

fn cut_mode(params: &[u8]) -> String {
    match params {
        [m @ (0 | 48)] => format!("m={m} (full cut)"),
        [m @ (1 | 49)] => format!("m={m} (partial cut)"),
        [m @ 65, n] => format!("m={m} (feed and full cut, n={n})"),
        [m @ 66, n] => format!("m={m} (feed and partial cut, n={n})"),
        _ => hex(params),
    }
}

fn bit_image(params: &[u8]) -> String {
    let [m, low, high, data @ ..] = params else {
        return hex(params);
    };
    let columns = le16(*low, *high);
    match lookup(BIT_IMAGE_MODES, *m) {
        Some(name) => format!("m={m} ({name}), width={columns}, data={} bytes", data.len()),
        None => format!("m={m}, width={columns}, data={} bytes", data.len()),
    }
}

fn tab_stops(params: &[u8]) -> String {
    // The trailing NUL terminator is part of the collected bytes.
    let stops: Vec<String> = params
        .iter()
        .take_while(|&&b| b != 0)
        .map(|b| b.to_string())
        .collect();
    if stops.is_empty() {
        "clear tab stops".to_string()
    } else {
        format!("tabs at {}", stops.join(", "))
    }
}

fn raster(params: &[u8]) -> String {
    let [m, xl, xh, yl, yh, data @ ..] = params else {
        return hex(params);
    };
    let width = u32::from(le16(*xl, *xh)) * 8;
    let height = le16(*yl, *yh);
    format!("m={m}, width={width}, height={height}, data={} bytes", data.len())
}

fn graphics(params: &[u8]) -> String {
    let [_, _, data @ ..] = params else {
        return hex(params);
    };
    // Second data byte selects the graphics function when present.
    match data {
        [_, function, ..] => format!("fn=0x{function:02X}, data={} bytes", data.len()),
        _ => format!("data={} bytes", data.len()),
    }
}

fn extended(params: &[u8]) -> String {
    let data = params.len().saturating_sub(2);
    format!("data={data} bytes")
}

fn barcode(params: &[u8]) -> String {
    let Some(&kind) = params.first() else {
        return String::new();
    };
    let (name, data) = if kind <= 6 {
        let data = params[1..].strip_suffix(&[0x00]).unwrap_or(&params[1..]);
        (lookup(BARCODE_FORMAT_A, kind), data)
    } else {
        let data = params.get(2..).unwrap_or(&[]);
        (lookup(BARCODE_FORMAT_B, kind), data)
    };
    let data = String::from_utf8_lossy(data);
    match name {
        Some(name) => format!("type={kind} ({name}), data=\"{data}\""),
        None => format!("type={kind}, data=\"{data}\""),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn print_mode_names_set_bits() {
        assert_eq!(describe("ESC !", &[0x30]), "n=0x30 (double-height, double-width)");
        assert_eq!(describe("ESC !", &[0x00]), "n=0x00 (Font A)");
        assert_eq!(describe("ESC !", &[0x09]), "n=0x09 (Font B, bold)");
    }

    #[test]
    fn print_mode_unknown_bits_fall_back_to_hex() {
        assert_eq!(describe("ESC !", &[0x46]), "n=0x46");
    }

    #[test]
    fn justification_lookup() {
        assert_eq!(describe("ESC a", &[1]), "n=1 (centre)");
        assert_eq!(describe("ESC a", &[2]), "n=2 (right)");
        assert_eq!(describe("ESC a", &[9]), "n=9");
    }

    #[test]
    fn absolute_position_is_little_endian() {
        assert_eq!(describe("ESC $", &[0x23, 0x01]), "position=291");
    }

    #[test]
    fn booleans_use_bit_zero() {
        assert_eq!(describe("ESC E", &[1]), "n=1 (enabled)");
        assert_eq!(describe("ESC E", &[0]), "n=0 (disabled)");
        assert_eq!(describe("GS B", &[3]), "n=3 (enabled)");
    }

    #[test]
    fn character_size_nibbles() {
        assert_eq!(describe("GS !", &[0x11]), "n=0x11 (width x2, height x2)");
        assert_eq!(describe("GS !", &[0x00]), "n=0x00 (width x1, height x1)");
    }

    #[test]
    fn status_query_kinds() {
        assert_eq!(describe("DLE EOT", &[1]), "n=1 (printer status)");
        assert_eq!(describe("DLE EOT", &[4]), "n=4 (paper roll sensor status)");
        assert_eq!(describe("DLE EOT", &[9]), "n=9");
        assert_eq!(describe("GS I", &[1]), "n=1 (model)");
        assert_eq!(describe("GS r", &[2]), "n=2 (drawer kick-out connector)");
    }

    #[test]
    fn asb_flags_named() {
        assert_eq!(describe("GS a", &[0x00]), "n=0x00 (ASB off)");
        assert_eq!(describe("GS a", &[0x0F]), "n=0x0F (drawer, online/offline, error, paper roll)");
    }

    #[test]
    fn cut_modes() {
        assert_eq!(describe("GS V", &[0]), "m=0 (full cut)");
        assert_eq!(describe("GS V", &[49]), "m=49 (partial cut)");
        assert_eq!(describe("GS V", &[66, 5]), "m=66 (feed and partial cut, n=5)");
    }

    #[test]
    fn bit_image_header() {
        let mut params = vec![33, 100, 0];
        params.extend(std::iter::repeat_n(0xFF, 300));
        assert_eq!(
            describe("ESC *", &params),
            "m=33 (24-dot double-density), width=100, data=300 bytes"
        );
    }

    #[test]
    fn tab_stop_lists() {
        assert_eq!(describe("ESC D", &[8, 16, 24, 0]), "tabs at 8, 16, 24");
        assert_eq!(describe("ESC D", &[0]), "clear tab stops");
    }

    #[test]
    fn raster_dimensions() {
        assert_eq!(
            describe("GS v 0", &[0, 2, 0, 1, 0, 0xAA, 0xBB]),
            "m=0, width=16, height=1, data=2 bytes"
        );
    }

    #[test]
    fn barcode_format_a_strips_terminator() {
        assert_eq!(describe("GS k", &[4, b'A', b'1', 0x00]), "type=4 (CODE39), data=\"A1\"");
    }

    #[test]
    fn barcode_format_b() {
        assert_eq!(
            describe("GS k", &[73, 5, b'{', b'A', b'1', b'2', b'3']),
            "type=73 (CODE128), data=\"{A123\""
        );
    }

    #[test]
    fn unknown_mnemonics_fall_back_to_hex() {
        assert_eq!(describe("ESC p", &[0x00, 0x19]), "00 19");
        assert_eq!(describe("DLE DC4", &[0x01, 0x02, 0x08]), "01 02 08");
    }
}
