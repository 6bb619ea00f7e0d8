//! CSS-style hex colors.

use image::Rgba;

/// Parse `#rgb`, `#rrggbb` or `#rrggbbaa` (leading `#` optional).
pub fn parse_hex_color(text: &str) -> Option<Rgba<u8>> {
    let hex = text.trim().trim_start_matches('#');
    if !hex.is_ascii() {
        return None;
    }
    let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).ok();
    match hex.len() {
        3 => {
            let mut rgb = [0u8; 3];
            for (slot, c) in rgb.iter_mut().zip(hex.chars()) {
                let v = c.to_digit(16)? as u8;
                *slot = v * 17;
            }
            Some(Rgba([rgb[0], rgb[1], rgb[2], 255]))
        }
        6 => Some(Rgba([channel(0)?, channel(2)?, channel(4)?, 255])),
        8 => Some(Rgba([channel(0)?, channel(2)?, channel(4)?, channel(6)?])),
        _ => None,
    }
}

/// Parse a color, falling back to `fallback` with a warning.
pub fn color_or(text: &str, fallback: Rgba<u8>) -> Rgba<u8> {
    parse_hex_color(text).unwrap_or_else(|| {
        tracing::warn!(color = text, "Unparseable color; using fallback");
        fallback
    })
}
