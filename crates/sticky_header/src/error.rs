//! Header error types

use thiserror::Error;

/// Errors raised while configuring a sticky header or registering elements
#[derive(Error, Debug, Clone, PartialEq)]
pub enum HeaderError {
    /// Header height must be finite and positive
    #[error("Invalid header height: {0}")]
    InvalidHeaderHeight(f32),

    /// Minimum height must lie in `0..=header_height`
    #[error("Invalid minimum header height {minimum} for header height {header}")]
    InvalidMinimumHeight { minimum: f32, header: f32 },

    /// Scroll speed divisors must be finite and non-zero
    #[error("Invalid {name} ratio: {value}")]
    InvalidRatio { name: &'static str, value: f32 },

    /// Fade bounds must be finite
    #[error("Invalid alpha bound: {0}")]
    InvalidAlpha(f32),

    /// A keyframe target must be a finite frame
    #[error("Invalid end frame: {0}")]
    InvalidEndFrame(String),
}

/// Result type for header operations
pub type Result<T> = std::result::Result<T, HeaderError>;
