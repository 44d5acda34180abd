//! Header configuration
//!
//! Set once before scrolling starts. The state machine reads it on every
//! update and never writes it.

use sticky_animation::LinearMap;
use sticky_core::Color;

use crate::error::{HeaderError, Result};

/// Overlay tint that fades as the header collapses
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TintFade {
    pub color: Color,
    /// Tint alpha at full header height (and throughout the extended zone)
    pub start_alpha: f32,
    /// Tint alpha at minimum header height (and once collapsed)
    pub end_alpha: f32,
}

impl TintFade {
    pub fn new(color: Color, start_alpha: f32, end_alpha: f32) -> Result<Self> {
        check_alpha(start_alpha)?;
        check_alpha(end_alpha)?;
        Ok(Self {
            color,
            start_alpha,
            end_alpha,
        })
    }

    /// Cover fill for a given tint alpha
    pub fn fill(&self, alpha: f32) -> Color {
        self.color.with_alpha(alpha)
    }
}

/// Configuration for the collapsing header
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HeaderConfig {
    /// Resting (maximum) header extent; also the content inset
    pub header_height: f32,
    /// Floor the header never collapses below (default: 0)
    pub minimum_height: f32,
    /// Optional overlay tint fade
    pub tint: Option<TintFade>,
}

impl HeaderConfig {
    pub fn new(header_height: f32) -> Result<Self> {
        if !header_height.is_finite() || header_height <= 0.0 {
            return Err(HeaderError::InvalidHeaderHeight(header_height));
        }
        Ok(Self {
            header_height,
            minimum_height: 0.0,
            tint: None,
        })
    }

    /// Builder: set the minimum header height
    pub fn with_minimum_height(mut self, minimum: f32) -> Result<Self> {
        self.set_minimum_height(minimum)?;
        Ok(self)
    }

    /// Builder: set the overlay tint fade
    pub fn with_tint(mut self, tint: TintFade) -> Self {
        self.tint = Some(tint);
        self
    }

    pub fn set_minimum_height(&mut self, minimum: f32) -> Result<()> {
        if !minimum.is_finite() || minimum < 0.0 || minimum > self.header_height {
            return Err(HeaderError::InvalidMinimumHeight {
                minimum,
                header: self.header_height,
            });
        }
        self.minimum_height = minimum;
        Ok(())
    }

    /// Distance the header travels between full and minimum height
    pub fn collapse_distance(&self) -> f32 {
        self.header_height - self.minimum_height
    }

    /// Map over visible header heights, from full (`header_height`) to
    /// collapsed (`minimum_height`). Degenerate when the header cannot collapse.
    pub fn collapse_span(&self) -> LinearMap {
        LinearMap::new((self.header_height, self.minimum_height), (0.0, 1.0))
    }
}

pub(crate) fn check_alpha(alpha: f32) -> Result<()> {
    if alpha.is_finite() {
        Ok(())
    } else {
        Err(HeaderError::InvalidAlpha(alpha))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = HeaderConfig::new(200.0).unwrap();
        assert_eq!(config.minimum_height, 0.0);
        assert!(config.tint.is_none());
        assert_eq!(config.collapse_distance(), 200.0);
    }

    #[test]
    fn test_rejects_bad_header_height() {
        assert_eq!(
            HeaderConfig::new(0.0),
            Err(HeaderError::InvalidHeaderHeight(0.0))
        );
        assert!(HeaderConfig::new(f32::INFINITY).is_err());
        assert!(HeaderConfig::new(-20.0).is_err());
    }

    #[test]
    fn test_minimum_height_bounds() {
        let config = HeaderConfig::new(200.0).unwrap();
        assert!(config.with_minimum_height(200.0).is_ok());
        assert!(config.with_minimum_height(0.0).is_ok());
        assert!(matches!(
            config.with_minimum_height(201.0),
            Err(HeaderError::InvalidMinimumHeight { .. })
        ));
        assert!(config.with_minimum_height(-1.0).is_err());
    }

    #[test]
    fn test_failed_setter_keeps_previous_value() {
        let mut config = HeaderConfig::new(200.0).unwrap();
        config.set_minimum_height(50.0).unwrap();
        assert!(config.set_minimum_height(500.0).is_err());
        assert_eq!(config.minimum_height, 50.0);
    }

    #[test]
    fn test_collapse_span_is_degenerate_when_heights_match() {
        let config = HeaderConfig::new(80.0)
            .unwrap()
            .with_minimum_height(80.0)
            .unwrap();
        assert!(config.collapse_span().is_degenerate());
    }

    #[test]
    fn test_tint_fill() {
        let tint = TintFade::new(Color::BLACK, 0.0, 0.8).unwrap();
        assert_eq!(tint.fill(0.4), Color::new(0.0, 0.0, 0.0, 0.4));
        assert!(TintFade::new(Color::BLACK, f32::NAN, 1.0).is_err());
    }
}
