//! Color types and utilities

/// RGBA color with f32 components (0.0 to 1.0)
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Color {
    pub const WHITE: Color = Color::rgb(1.0, 1.0, 1.0);
    pub const BLACK: Color = Color::rgb(0.0, 0.0, 0.0);

    pub const fn new(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    pub const fn rgb(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b, a: 1.0 }
    }

    /// Create from u8 components (0-255)
    pub fn from_rgba8(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self {
            r: r as f32 / 255.0,
            g: g as f32 / 255.0,
            b: b as f32 / 255.0,
            a: a as f32 / 255.0,
        }
    }

    /// Create from hex value (0xRRGGBB or 0xRRGGBBAA)
    pub fn from_hex(hex: u32) -> Self {
        if hex > 0xFFFFFF {
            Self::from_rgba8(
                ((hex >> 24) & 0xFF) as u8,
                ((hex >> 16) & 0xFF) as u8,
                ((hex >> 8) & 0xFF) as u8,
                (hex & 0xFF) as u8,
            )
        } else {
            Self::from_rgba8(
                ((hex >> 16) & 0xFF) as u8,
                ((hex >> 8) & 0xFF) as u8,
                (hex & 0xFF) as u8,
                255,
            )
        }
    }

    /// Parse `#RRGGBB` / `#RRGGBBAA` (leading `#` optional)
    pub fn parse_hex(s: &str) -> Option<Self> {
        let digits = s.strip_prefix('#').unwrap_or(s);
        if digits.len() != 6 && digits.len() != 8 {
            return None;
        }
        let value = u32::from_str_radix(digits, 16).ok()?;
        if digits.len() == 8 {
            Some(Self::from_rgba8(
                ((value >> 24) & 0xFF) as u8,
                ((value >> 16) & 0xFF) as u8,
                ((value >> 8) & 0xFF) as u8,
                (value & 0xFF) as u8,
            ))
        } else {
            Some(Self::from_hex(value))
        }
    }

    /// Set alpha and return new color
    pub fn with_alpha(self, alpha: f32) -> Self {
        Self { a: alpha, ..self }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_hex_rgb() {
        let c = Color::from_hex(0xFF0000);
        assert_eq!(c, Color::rgb(1.0, 0.0, 0.0));
    }

    #[test]
    fn test_parse_hex_with_alpha() {
        let c = Color::parse_hex("#00FF0080").unwrap();
        assert_eq!(c, Color::from_rgba8(0, 255, 0, 128));
        assert_eq!(Color::parse_hex("00ff00"), Some(Color::rgb(0.0, 1.0, 0.0)));
        assert_eq!(Color::parse_hex("#abc"), None);
        assert_eq!(Color::parse_hex("#zzzzzz"), None);
    }

    #[test]
    fn test_with_alpha_keeps_channels() {
        let c = Color::rgb(0.2, 0.4, 0.6).with_alpha(0.25);
        assert_eq!(c, Color::new(0.2, 0.4, 0.6, 0.25));
    }
}
