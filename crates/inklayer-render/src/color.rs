//! Color string parsing.

use peniko::Color;

/// Parse a CSS-style color string into a peniko Color.
///
/// Accepts `#rgb`, `#rrggbb`, `#rrggbbaa`, `rgb(r, g, b)`, `rgba(r, g, b, a)`
/// and `transparent`. Anything else falls back to black.
pub fn parse_color(color: &str) -> Color {
    let color = color.trim();

    if color.eq_ignore_ascii_case("transparent") {
        return Color::from_rgba8(0, 0, 0, 0);
    }

    // Handle hex colors (#rgb, #rrggbb, #rrggbbaa)
    let parsed = match color.strip_prefix('#') {
        Some(hex) => parse_hex(hex),
        None => parse_rgb_function(color),
    };

    parsed.unwrap_or_else(|| {
        log::debug!("Unrecognized color {:?}, using black", color);
        Color::from_rgba8(0, 0, 0, 255)
    })
}

fn parse_hex(hex: &str) -> Option<Color> {
    let channel = |start: usize, len: usize| {
        let digits = hex.get(start..start + len)?;
        let value = u8::from_str_radix(digits, 16).ok()?;
        // #rgb -> #rrggbb
        Some(if len == 1 { value * 17 } else { value })
    };
    match hex.len() {
        3 => Some(Color::from_rgba8(channel(0, 1)?, channel(1, 1)?, channel(2, 1)?, 255)),
        6 => Some(Color::from_rgba8(channel(0, 2)?, channel(2, 2)?, channel(4, 2)?, 255)),
        8 => Some(Color::from_rgba8(
            channel(0, 2)?,
            channel(2, 2)?,
            channel(4, 2)?,
            channel(6, 2)?,
        )),
        _ => None,
    }
}

/// Parse `rgb(...)` / `rgba(...)` with 0-255 channels and a 0-1 alpha.
fn parse_rgb_function(color: &str) -> Option<Color> {
    let inner = color
        .strip_prefix("rgba(")
        .or_else(|| color.strip_prefix("rgb("))?
        .strip_suffix(')')?;
    let parts: Vec<&str> = inner.split(',').map(str::trim).collect();
    if parts.len() != 3 && parts.len() != 4 {
        return None;
    }
    let channel = |s: &str| s.parse::<f64>().ok().map(|v| v.clamp(0.0, 255.0).round() as u8);
    let r = channel(parts[0])?;
    let g = channel(parts[1])?;
    let b = channel(parts[2])?;
    let a = match parts.get(3) {
        Some(a) => (a.parse::<f64>().ok()?.clamp(0.0, 1.0) * 255.0).round() as u8,
        None => 255,
    };
    Some(Color::from_rgba8(r, g, b, a))
}

/// Multiply a color's alpha by `opacity` (clamped to `[0, 1]`).
pub fn with_opacity(color: Color, opacity: f64) -> Color {
    let rgba = color.to_rgba8();
    let alpha = (rgba.a as f64 * opacity.clamp(0.0, 1.0)) as u8;
    Color::from_rgba8(rgba.r, rgba.g, rgba.b, alpha)
}
