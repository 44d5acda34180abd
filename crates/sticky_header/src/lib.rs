//! Sticky Header
//!
//! A scroll-driven collapsing header for a scrollable content view. As the
//! content scrolls, the header background shrinks from its full height to a
//! minimum height (or stretches when pulled past the top), and registered
//! elements move, resize and fade along with it.
//!
//! # Features
//!
//! - **Background elements**: always sized to the header background
//! - **Ratio elements**: parallax motion with separate stretch/collapse speeds
//! - **Keyframe elements**: frame interpolated toward a target frame
//! - **Fades**: per-element alpha and an overlay tint across the collapse range
//! - **Host-agnostic**: views and the scroll container are traits; the header
//!   holds weak handles and never owns host views
//!
//! The host forwards every scroll offset change to
//! [`StickyHeader::on_scroll`], synchronously and in order.

pub mod config;
pub mod controller;
pub mod error;
pub mod registry;
pub mod state;
pub mod view;

pub use config::{HeaderConfig, TintFade};
pub use controller::{Layer, StickyHeader};
pub use error::{HeaderError, Result};
pub use registry::{
    AlphaFade, BackgroundElement, ElementId, ElementRegistry, HeaderElement, KeyframeMotion,
    Motion, RatioMotion,
};
pub use state::{ElementUpdate, FrameUpdate, HeaderStateMachine, HeaderUpdate, Regime};
pub use view::{ScrollContainer, ScrollSurface, SharedView, Surface, View, ViewRef};
