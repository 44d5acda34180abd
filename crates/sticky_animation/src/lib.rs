//! Sticky Animation
//!
//! Scroll-driven interpolation. Unlike time-based animation there is no clock:
//! the scroll position is the animation parameter, and every property is an
//! affine function of it.
//!
//! # Features
//!
//! - **Linear maps**: the unique affine function through two points
//! - **Frame interpolation**: x, y, width and height mapped independently

pub mod interpolate;

pub use interpolate::{interpolate, lerp_rect, LinearMap};
