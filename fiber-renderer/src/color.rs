//! CSS color strings to `tiny-skia` colors.
//!
//! Accepted forms: `#rgb`, `#rrggbb`, `#rrggbbaa`, `rgb(r, g, b)`,
//! `rgba(r, g, b, a)` and a handful of keywords. Channels are 0-255 and alpha
//! is 0-1; out-of-range values are clamped.

use tiny_skia::Color;

use crate::error::{RenderError, RenderResult};

/// Parse a CSS color string.
///
/// # Errors
///
/// Returns [`RenderError::Color`] if the string is not a supported color.
pub fn parse_css_color(input: &str) -> RenderResult<Color> {
    let fail = |reason: &str| RenderError::Color {
        input: input.to_string(),
        reason: reason.to_string(),
    };

    let s = input.trim().to_ascii_lowercase();
    if let Some(hex) = s.strip_prefix('#') {
        return parse_hex(hex).map_err(|reason| fail(&reason));
    }
    if let Some(args) = function_args(&s, "rgba").or_else(|| function_args(&s, "rgb")) {
        return parse_rgb_args(args).map_err(|reason| fail(&reason));
    }
    keyword(&s).ok_or_else(|| fail("unknown color"))
}

/// Multiply the alpha of `color` by `alpha`.
#[must_use]
#[allow(clippy::cast_possible_truncation)]
pub fn with_alpha(color: Color, alpha: f64) -> Color {
    let a = (color.alpha() * alpha as f32).clamp(0.0, 1.0);
    Color::from_rgba(color.red(), color.green(), color.blue(), a).unwrap_or(color)
}

fn function_args<'a>(s: &'a str, name: &str) -> Option<&'a str> {
    s.strip_prefix(name)?
        .trim_start()
        .strip_prefix('(')?
        .strip_suffix(')')
}

fn parse_rgb_args(args: &str) -> Result<Color, String> {
    let parts: Vec<&str> = args.split(',').map(str::trim).collect();
    if parts.len() != 3 && parts.len() != 4 {
        return Err(format!("expected 3 or 4 components, got {}", parts.len()));
    }

    let number = |part: &str| -> Result<f32, String> {
        part.parse::<f32>()
            .ok()
            .filter(|v| v.is_finite())
            .ok_or_else(|| format!("invalid component \"{part}\""))
    };

    let r = number(parts[0])?.clamp(0.0, 255.0) / 255.0;
    let g = number(parts[1])?.clamp(0.0, 255.0) / 255.0;
    let b = number(parts[2])?.clamp(0.0, 255.0) / 255.0;
    let a = match parts.get(3) {
        Some(part) => number(part)?.clamp(0.0, 1.0),
        None => 1.0,
    };

    Color::from_rgba(r, g, b, a).ok_or_else(|| "component out of range".to_string())
}

fn parse_hex(hex: &str) -> Result<Color, String> {
    if !hex.bytes().all(|b| b.is_ascii_hexdigit()) {
        return Err("invalid hex digit".to_string());
    }
    let byte = |pair: &str| u8::from_str_radix(pair, 16).map_err(|e| e.to_string());
    let nibble = |digit: &str| byte(digit).map(|v| v * 17);

    match hex.len() {
        3 => Ok(Color::from_rgba8(
            nibble(&hex[0..1])?,
            nibble(&hex[1..2])?,
            nibble(&hex[2..3])?,
            255,
        )),
        6 => Ok(Color::from_rgba8(
            byte(&hex[0..2])?,
            byte(&hex[2..4])?,
            byte(&hex[4..6])?,
            255,
        )),
        8 => Ok(Color::from_rgba8(
            byte(&hex[0..2])?,
            byte(&hex[2..4])?,
            byte(&hex[4..6])?,
            byte(&hex[6..8])?,
        )),
        _ => Err("hex color must be #rgb, #rrggbb or #rrggbbaa".to_string()),
    }
}

fn keyword(s: &str) -> Option<Color> {
    match s {
        "transparent" => Some(Color::TRANSPARENT),
        "black" => Some(Color::BLACK),
        "white" => Some(Color::WHITE),
        "red" => Some(Color::from_rgba8(255, 0, 0, 255)),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rgba8(color: Color) -> [u8; 4] {
        let c = color.to_color_u8();
        [c.red(), c.green(), c.blue(), c.alpha()]
    }

    #[test]
    fn test_rgba_function() {
        let color = parse_css_color("rgba(255, 50, 50, 0.5)").expect("parse");
        assert_eq!(rgba8(color)[..3], [255, 50, 50]);
        assert!((color.alpha() - 0.5).abs() < 1e-6);
    }

    #[test]
    fn test_rgb_function() {
        let color = parse_css_color(" RGB(0, 128, 255) ").expect("parse");
        assert_eq!(rgba8(color), [0, 128, 255, 255]);
    }

    #[test]
    fn test_hex_forms() {
        assert_eq!(rgba8(parse_css_color("#bb0000").expect("6")), [187, 0, 0, 255]);
        assert_eq!(rgba8(parse_css_color("#0af").expect("3")), [0, 170, 255, 255]);
        assert_eq!(rgba8(parse_css_color("#ffffff80").expect("8")), [255, 255, 255, 128]);
    }

    #[test]
    fn test_out_of_range_is_clamped() {
        let color = parse_css_color("rgba(300, -5, 10, 4)").expect("parse");
        assert_eq!(rgba8(color), [255, 0, 10, 255]);
    }

    #[test]
    fn test_rejects_garbage() {
        for input in ["", "#12", "#ggg", "rgba(1, 2)", "rgb(a, b, c)", "hsl(0, 0%, 0%)"] {
            let err = parse_css_color(input).expect_err(input);
            assert!(matches!(err, RenderError::Color { .. }), "{input}");
        }
    }

    #[test]
    fn test_keywords() {
        assert_eq!(parse_css_color("black").expect("black"), Color::BLACK);
        assert_eq!(parse_css_color("transparent").expect("t"), Color::TRANSPARENT);
    }

    #[test]
    fn test_with_alpha() {
        let color = with_alpha(Color::from_rgba8(255, 0, 0, 255), 0.25);
        assert!((color.alpha() - 0.25).abs() < 1e-6);
        assert_eq!(with_alpha(color, 9.0).alpha(), 1.0);
    }
}
