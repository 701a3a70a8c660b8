//! Hex colour parsing

use crate::io::error::{Result, invalid_parameter};
use image::Rgba;

/// Parse `#RGB`, `#RRGGBB` or `#RRGGBBAA` (the `#` is optional)
///
/// # Errors
///
/// Returns an error if the string has another length or non-hex digits
pub fn parse_hex_color(value: &str) -> Result<Rgba<u8>> {
    let hex = value.trim().trim_start_matches('#');
    let invalid = || invalid_parameter("color", &value, &"expected #RGB, #RRGGBB or #RRGGBBAA");

    if !hex.chars().all(|ch| ch.is_ascii_hexdigit()) {
        return Err(invalid());
    }

    let channel = |range: std::ops::Range<usize>| {
        hex.get(range)
            .and_then(|digits| u8::from_str_radix(digits, 16).ok())
            .ok_or_else(invalid)
    };

    match hex.len() {
        3 => {
            let short = |index: usize| channel(index..index + 1).map(|v| v * 17);
            Ok(Rgba([short(0)?, short(1)?, short(2)?, 255]))
        }
        6 => Ok(Rgba([channel(0..2)?, channel(2..4)?, channel(4..6)?, 255])),
        8 => Ok(Rgba([
            channel(0..2)?,
            channel(2..4)?,
            channel(4..6)?,
            channel(6..8)?,
        ])),
        _ => Err(invalid()),
    }
}
