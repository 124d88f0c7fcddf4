use std::str::FromStr;

use crate::foundation::error::{BoothError, BoothResult};

/// Straight-alpha colour with normalized `0..=1` channels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ColorDef {
    /// Red channel.
    pub r: f64,
    /// Green channel.
    pub g: f64,
    /// Blue channel.
    pub b: f64,
    /// Alpha channel.
    pub a: f64,
}

impl ColorDef {
    /// Build a colour from normalized channels.
    pub fn rgba(r: f64, g: f64, b: f64, a: f64) -> Self {
        Self { r, g, b, a }
    }

    /// Parse a CSS-style colour string.
    ///
    /// Accepted forms: `#RGB`, `#RRGGBB`, `#RRGGBBAA`, `rgb(r, g, b)`, `rgba(r, g, b, a)`,
    /// `hsl(h, s%, l%)` and `hsla(h, s%, l%, a)`. Channel values for `rgb()` are `0..=255`.
    pub fn parse(s: &str) -> BoothResult<Self> {
        let s = s.trim();
        if s.starts_with('#') {
            return parse_hex(s).map_err(BoothError::validation);
        }
        let lower = s.to_ascii_lowercase();
        if let Some(args) = function_args(&lower, "rgba").or_else(|| function_args(&lower, "rgb")) {
            return parse_rgb_args(&args).map_err(BoothError::validation);
        }
        if let Some(args) = function_args(&lower, "hsla").or_else(|| function_args(&lower, "hsl")) {
            return parse_hsl_args(&args).map_err(BoothError::validation);
        }
        Err(BoothError::validation(format!(
            "unsupported colour \"{s}\" (expected #hex, rgb(), rgba(), hsl() or hsla())"
        )))
    }

    /// Convert to the `tiny-skia` colour used by the rasterizer.
    pub(crate) fn to_skia(self) -> resvg::tiny_skia::Color {
        resvg::tiny_skia::Color::from_rgba(
            self.r.clamp(0.0, 1.0) as f32,
            self.g.clamp(0.0, 1.0) as f32,
            self.b.clamp(0.0, 1.0) as f32,
            self.a.clamp(0.0, 1.0) as f32,
        )
        .unwrap_or(resvg::tiny_skia::Color::BLACK)
    }

    /// Quantized straight-alpha RGBA8.
    pub fn to_rgba8(self) -> [u8; 4] {
        fn to_u8(x: f64) -> u8 {
            (x.clamp(0.0, 1.0) * 255.0).round() as u8
        }
        [to_u8(self.r), to_u8(self.g), to_u8(self.b), to_u8(self.a)]
    }
}

impl FromStr for ColorDef {
    type Err = BoothError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

fn function_args(s: &str, name: &str) -> Option<Vec<String>> {
    let rest = s.strip_prefix(name)?.trim_start();
    let inner = rest.strip_prefix('(')?.strip_suffix(')')?;
    Some(
        inner
            .split(|c: char| c == ',' || c == '/' || c.is_whitespace())
            .filter(|p| !p.is_empty())
            .map(str::to_owned)
            .collect(),
    )
}

fn parse_number(part: &str) -> Result<f64, String> {
    let v: f64 = part
        .trim_end_matches('%')
        .trim_end_matches("deg")
        .parse()
        .map_err(|_| format!("invalid colour component \"{part}\""))?;
    if !v.is_finite() {
        return Err(format!("colour component \"{part}\" must be finite"));
    }
    Ok(v)
}

fn parse_alpha(part: Option<&String>) -> Result<f64, String> {
    match part {
        None => Ok(1.0),
        Some(p) if p.ends_with('%') => Ok(parse_number(p)? / 100.0),
        Some(p) => parse_number(p),
    }
}

fn parse_rgb_args(args: &[String]) -> Result<ColorDef, String> {
    if args.len() != 3 && args.len() != 4 {
        return Err("rgb() expects 3 or 4 components".to_owned());
    }
    let channel = |p: &String| -> Result<f64, String> {
        if p.ends_with('%') {
            Ok(parse_number(p)? / 100.0)
        } else {
            Ok(parse_number(p)? / 255.0)
        }
    };
    Ok(ColorDef::rgba(
        channel(&args[0])?,
        channel(&args[1])?,
        channel(&args[2])?,
        parse_alpha(args.get(3))?,
    ))
}

fn parse_hsl_args(args: &[String]) -> Result<ColorDef, String> {
    if args.len() != 3 && args.len() != 4 {
        return Err("hsl() expects 3 or 4 components".to_owned());
    }
    let h = parse_number(&args[0])?;
    let s = parse_number(&args[1])? / 100.0;
    let l = parse_number(&args[2])? / 100.0;
    Ok(hsla_to_rgba(h, s, l, parse_alpha(args.get(3))?))
}

fn parse_hex(s: &str) -> Result<ColorDef, String> {
    let s = s.strip_prefix('#').unwrap_or(s);

    fn hex_byte(pair: &str) -> Result<u8, String> {
        u8::from_str_radix(pair, 16).map_err(|_| format!("invalid hex byte \"{pair}\""))
    }

    let (r, g, b, a) = match s.len() {
        3 => {
            let r = hex_byte(&s[0..1].repeat(2))?;
            let g = hex_byte(&s[1..2].repeat(2))?;
            let b = hex_byte(&s[2..3].repeat(2))?;
            (r, g, b, 255)
        }
        6 => {
            let r = hex_byte(&s[0..2])?;
            let g = hex_byte(&s[2..4])?;
            let b = hex_byte(&s[4..6])?;
            (r, g, b, 255)
        }
        8 => {
            let r = hex_byte(&s[0..2])?;
            let g = hex_byte(&s[2..4])?;
            let b = hex_byte(&s[4..6])?;
            let a = hex_byte(&s[6..8])?;
            (r, g, b, a)
        }
        _ => {
            return Err(
                "hex colour must be #RGB, #RRGGBB or #RRGGBBAA (case-insensitive)".to_owned(),
            );
        }
    };

    Ok(ColorDef::rgba(
        (r as f64) / 255.0,
        (g as f64) / 255.0,
        (b as f64) / 255.0,
        (a as f64) / 255.0,
    ))
}

fn hsla_to_rgba(h: f64, s: f64, l: f64, a: f64) -> ColorDef {
    // Standard HSL -> RGB conversion (sRGB space, normalized 0..1 inputs).
    let h = (h % 360.0 + 360.0) % 360.0 / 360.0;
    let s = s.clamp(0.0, 1.0);
    let l = l.clamp(0.0, 1.0);

    if s == 0.0 {
        return ColorDef::rgba(l, l, l, a);
    }

    fn hue_to_rgb(p: f64, q: f64, mut t: f64) -> f64 {
        if t < 0.0 {
            t += 1.0;
        }
        if t > 1.0 {
            t -= 1.0;
        }
        if t < 1.0 / 6.0 {
            return p + (q - p) * 6.0 * t;
        }
        if t < 1.0 / 2.0 {
            return q;
        }
        if t < 2.0 / 3.0 {
            return p + (q - p) * (2.0 / 3.0 - t) * 6.0;
        }
        p
    }

    let q = if l < 0.5 {
        l * (1.0 + s)
    } else {
        l + s - l * s
    };
    let p = 2.0 * l - q;

    let r = hue_to_rgb(p, q, h + 1.0 / 3.0);
    let g = hue_to_rgb(p, q, h);
    let b = hue_to_rgb(p, q, h - 1.0 / 3.0);
    ColorDef::rgba(r, g, b, a)
}

#[cfg(test)]
#[path = "../../tests/unit/assets/color.rs"]
mod tests;
