//! Sticky Core Primitives
//!
//! Geometry and color types shared by the sticky header crates:
//!
//! - **Geometry**: `Point`, `Size` and `Rect` in view coordinates (y grows downward)
//! - **Color**: RGBA color with f32 components, used for fills and the overlay tint
//!
//! # Example
//!
//! ```rust
//! use sticky_core::{Color, Rect};
//!
//! let header = Rect::new(0.0, 0.0, 375.0, 200.0);
//! assert_eq!(header.with_height(80.0).max_y(), 80.0);
//!
//! let tint = Color::from_hex(0x1E88E5).with_alpha(0.5);
//! assert_eq!(tint.a, 0.5);
//! ```

pub mod color;
pub mod geometry;

pub use color::Color;
pub use geometry::{Point, Rect, Size};
