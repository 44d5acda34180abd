//! Element registry
//!
//! Append-only storage for the two kinds of registered elements:
//!
//! - **Background elements** always take the header background frame. They are
//!   kept in z-order (bottom first) and all sit below the overlay cover.
//! - **Header elements** sit on the overlay cover and carry their own
//!   [`Motion`] plus an optional [`AlphaFade`].
//!
//! Nothing is ever removed. The interactive flag is monotonic: once any
//! registered view needs interaction the header surface keeps accepting it.

use slotmap::{new_key_type, SlotMap};
use sticky_core::Rect;

use crate::config::check_alpha;
use crate::error::{HeaderError, Result};
use crate::view::{SharedView, View, ViewRef};

new_key_type! {
    /// Identifier for a registered header element
    pub struct ElementId;
}

/// Opacity fade across the collapse range
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AlphaFade {
    /// Alpha at full header height
    pub start: f32,
    /// Alpha at minimum header height
    pub end: f32,
}

impl AlphaFade {
    pub fn new(start: f32, end: f32) -> Result<Self> {
        check_alpha(start)?;
        check_alpha(end)?;
        Ok(Self { start, end })
    }
}

/// Parallax motion: y moves by the scroll delta divided by a ratio
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RatioMotion {
    /// Origin y at full header height
    pub original_offset_y: f32,
    /// Divisor while the header is stretched past its full height
    pub down_ratio: f32,
    /// Divisor while the header collapses toward its minimum height
    pub up_ratio: f32,
}

/// Frame interpolated from the registration frame to a target frame
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct KeyframeMotion {
    /// Captured at registration
    pub start_frame: Rect,
    /// Frame at (and below) minimum header height
    pub end_frame: Rect,
}

/// How a header element moves as the header changes height
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Motion {
    /// Never repositioned
    Fixed,
    Ratio(RatioMotion),
    Keyframe(KeyframeMotion),
    /// Keyframe motion whose y also follows `down_ratio` in the extended zone
    RatioAndKeyframe {
        keyframe: KeyframeMotion,
        down_ratio: f32,
    },
}

impl Motion {
    pub fn ratio(original_offset_y: f32, down_ratio: f32, up_ratio: f32) -> Result<Self> {
        check_ratio("down", down_ratio)?;
        check_ratio("up", up_ratio)?;
        Ok(Motion::Ratio(RatioMotion {
            original_offset_y,
            down_ratio,
            up_ratio,
        }))
    }

    pub fn keyframe(start_frame: Rect, end_frame: Rect) -> Result<Self> {
        check_end_frame(end_frame)?;
        Ok(Motion::Keyframe(KeyframeMotion {
            start_frame,
            end_frame,
        }))
    }

    pub fn keyframe_with_ratio(
        start_frame: Rect,
        end_frame: Rect,
        down_ratio: f32,
    ) -> Result<Self> {
        check_end_frame(end_frame)?;
        check_ratio("down", down_ratio)?;
        Ok(Motion::RatioAndKeyframe {
            keyframe: KeyframeMotion {
                start_frame,
                end_frame,
            },
            down_ratio,
        })
    }

    pub fn name(&self) -> &'static str {
        match self {
            Motion::Fixed => "fixed",
            Motion::Ratio(_) => "ratio",
            Motion::Keyframe(_) => "keyframe",
            Motion::RatioAndKeyframe { .. } => "ratio+keyframe",
        }
    }
}

fn check_ratio(name: &'static str, value: f32) -> Result<()> {
    if value.is_finite() && value != 0.0 {
        Ok(())
    } else {
        Err(HeaderError::InvalidRatio { name, value })
    }
}

fn check_end_frame(frame: Rect) -> Result<()> {
    if frame.is_finite() {
        Ok(())
    } else {
        Err(HeaderError::InvalidEndFrame(format!("{:?}", frame)))
    }
}

/// A registered header element
#[derive(Debug, Clone)]
pub struct HeaderElement {
    pub view: ViewRef,
    pub motion: Motion,
    pub fade: Option<AlphaFade>,
}

/// A view that always takes the header background frame
#[derive(Debug, Clone)]
pub struct BackgroundElement {
    pub view: ViewRef,
    /// Registration sequence number
    seq: usize,
}

impl BackgroundElement {
    pub fn seq(&self) -> usize {
        self.seq
    }
}

/// Append-only element storage
#[derive(Default)]
pub struct ElementRegistry {
    /// Background stack, bottom first
    backgrounds: Vec<BackgroundElement>,
    elements: SlotMap<ElementId, HeaderElement>,
    /// Header elements in registration order (also their z-order)
    order: Vec<ElementId>,
    interactive: bool,
}

impl ElementRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Raise the interactive flag if `view` needs interaction.
    ///
    /// Returns the flag after checking `view`. The flag is never lowered.
    pub fn note_interaction(&mut self, view: &dyn View) -> bool {
        if view.is_control() || view.accepts_interaction() {
            if !self.interactive {
                tracing::debug!("header surface now accepts interaction");
            }
            self.interactive = true;
        }
        self.interactive
    }

    pub fn is_interactive(&self) -> bool {
        self.interactive
    }

    /// Push a background element on top of the background stack
    pub fn push_background(&mut self, view: &SharedView) -> usize {
        let seq = self.backgrounds.len();
        self.backgrounds.push(BackgroundElement {
            view: ViewRef::new(view),
            seq,
        });
        seq
    }

    /// Insert a background image directly below the first registered
    /// background element, or on top of the stack when there is none.
    pub fn insert_background_image(&mut self, view: &SharedView) -> usize {
        let seq = self.backgrounds.len();
        let index = self
            .backgrounds
            .iter()
            .position(|b| b.seq == 0)
            .unwrap_or(self.backgrounds.len());
        self.backgrounds.insert(
            index,
            BackgroundElement {
                view: ViewRef::new(view),
                seq,
            },
        );
        seq
    }

    /// Background stack, bottom first
    pub fn backgrounds(&self) -> &[BackgroundElement] {
        &self.backgrounds
    }

    pub fn register(&mut self, element: HeaderElement) -> ElementId {
        let id = self.elements.insert(element);
        self.order.push(id);
        id
    }

    pub fn get(&self, id: ElementId) -> Option<&HeaderElement> {
        self.elements.get(id)
    }

    /// Header elements in registration order
    pub fn elements(&self) -> impl Iterator<Item = (ElementId, &HeaderElement)> {
        self.order
            .iter()
            .filter_map(move |&id| self.elements.get(id).map(|e| (id, e)))
    }

    pub fn element_count(&self) -> usize {
        self.order.len()
    }

    pub fn background_count(&self) -> usize {
        self.backgrounds.len()
    }
}
