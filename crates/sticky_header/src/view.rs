//! Host abstractions
//!
//! The header never owns the views it animates. The host UI tree owns them
//! through [`SharedView`]; the registry keeps a [`ViewRef`] (a weak handle)
//! and writes geometry back through the [`View`] trait on every update.
//!
//! [`Surface`] and [`ScrollSurface`] are plain in-memory implementations used
//! when no host toolkit is attached (headless replay, tests).

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use sticky_core::{Color, Point, Rect, Size};

/// A positioned, tintable view owned by the host
pub trait View {
    fn frame(&self) -> Rect;

    fn set_frame(&mut self, frame: Rect);

    fn alpha(&self) -> f32;

    fn set_alpha(&mut self, alpha: f32);

    fn set_background(&mut self, color: Color);

    /// Whether the view is an actionable control (a button)
    fn is_control(&self) -> bool {
        false
    }

    /// Whether the view already accepts user interaction
    fn accepts_interaction(&self) -> bool {
        false
    }
}

/// Strong, host-owned view reference
pub type SharedView = Rc<RefCell<dyn View>>;

/// Non-owning handle to a host view
#[derive(Clone)]
pub struct ViewRef(Weak<RefCell<dyn View>>);

impl ViewRef {
    pub fn new(view: &SharedView) -> Self {
        Self(Rc::downgrade(view))
    }

    /// Borrow the view mutably if the host still holds it.
    ///
    /// Returns `None` when the view was dropped or is currently borrowed.
    pub fn with<R>(&self, f: impl FnOnce(&mut dyn View) -> R) -> Option<R> {
        let view = self.0.upgrade()?;
        let mut view = view.try_borrow_mut().ok()?;
        Some(f(&mut *view))
    }

    pub fn is_alive(&self) -> bool {
        self.0.strong_count() > 0
    }

    /// True when both handles point at the same view
    pub fn ptr_eq(&self, other: &SharedView) -> bool {
        Rc::downgrade(other).ptr_eq(&self.0)
    }
}

impl std::fmt::Debug for ViewRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ViewRef")
            .field("alive", &self.is_alive())
            .finish()
    }
}

/// The scrollable container the header is attached to
pub trait ScrollContainer {
    fn frame(&self) -> Rect;

    fn content_offset(&self) -> Point;

    fn set_content_offset(&mut self, offset: Point);

    fn set_content_inset_top(&mut self, inset: f32);

    fn set_indicator_inset_top(&mut self, inset: f32);

    fn content_size(&self) -> Size;

    fn set_content_size(&mut self, size: Size);

    /// Place a view in the scrolling content
    fn add_content(&mut self, view: &SharedView);
}

/// Headless view: a frame, an alpha and a fill
#[derive(Debug, Clone, PartialEq)]
pub struct Surface {
    pub frame: Rect,
    pub alpha: f32,
    pub background: Option<Color>,
    /// Reported as "is an actionable control"
    pub control: bool,
    /// Reported as "already accepts interaction"
    pub interactive: bool,
}

impl Surface {
    pub fn new(frame: Rect) -> Self {
        Self {
            frame,
            alpha: 1.0,
            background: None,
            control: false,
            interactive: false,
        }
    }

    /// Builder: mark as an actionable control
    pub fn control(mut self) -> Self {
        self.control = true;
        self
    }

    /// Builder: mark as accepting interaction
    pub fn interactive(mut self) -> Self {
        self.interactive = true;
        self
    }

    /// Wrap in a host-owned handle
    pub fn shared(self) -> Rc<RefCell<Surface>> {
        Rc::new(RefCell::new(self))
    }
}

impl View for Surface {
    fn frame(&self) -> Rect {
        self.frame
    }

    fn set_frame(&mut self, frame: Rect) {
        self.frame = frame;
    }

    fn alpha(&self) -> f32 {
        self.alpha
    }

    fn set_alpha(&mut self, alpha: f32) {
        self.alpha = alpha;
    }

    fn set_background(&mut self, color: Color) {
        self.background = Some(color);
    }

    fn is_control(&self) -> bool {
        self.control
    }

    fn accepts_interaction(&self) -> bool {
        self.interactive
    }
}

/// Headless scroll container
#[derive(Default)]
pub struct ScrollSurface {
    pub frame: Rect,
    pub content_offset: Point,
    pub content_inset_top: f32,
    pub indicator_inset_top: f32,
    pub content_size: Size,
    /// Content views in insertion order
    pub content: Vec<SharedView>,
}

impl ScrollSurface {
    pub fn new(frame: Rect) -> Self {
        Self {
            frame,
            content_size: Size::new(frame.width(), 0.0),
            ..Default::default()
        }
    }
}

impl ScrollContainer for ScrollSurface {
    fn frame(&self) -> Rect {
        self.frame
    }

    fn content_offset(&self) -> Point {
        self.content_offset
    }

    fn set_content_offset(&mut self, offset: Point) {
        self.content_offset = offset;
    }

    fn set_content_inset_top(&mut self, inset: f32) {
        self.content_inset_top = inset;
    }

    fn set_indicator_inset_top(&mut self, inset: f32) {
        self.indicator_inset_top = inset;
    }

    fn content_size(&self) -> Size {
        self.content_size
    }

    fn set_content_size(&mut self, size: Size) {
        self.content_size = size;
    }

    fn add_content(&mut self, view: &SharedView) {
        self.content.push(view.clone());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_view_ref_does_not_keep_view_alive() {
        let view: SharedView = Surface::new(Rect::ZERO).shared();
        let handle = ViewRef::new(&view);
        assert!(handle.is_alive());
        assert!(handle.ptr_eq(&view));

        drop(view);
        assert!(!handle.is_alive());
        assert_eq!(handle.with(|v| v.alpha()), None);
    }

    #[test]
    fn test_view_ref_writes_through() {
        let surface = Surface::new(Rect::ZERO).shared();
        let view: SharedView = surface.clone();
        let handle = ViewRef::new(&view);

        handle.with(|v| v.set_frame(Rect::new(1.0, 2.0, 3.0, 4.0)));
        assert_eq!(surface.borrow().frame, Rect::new(1.0, 2.0, 3.0, 4.0));
    }

    #[test]
    fn test_view_ref_skips_borrowed_view() {
        let surface = Surface::new(Rect::ZERO).shared();
        let view: SharedView = surface.clone();
        let handle = ViewRef::new(&view);

        let held = surface.borrow();
        assert_eq!(handle.with(|v| v.set_alpha(0.5)), None);
        drop(held);

        assert_eq!(handle.with(|v| v.set_alpha(0.5)), Some(()));
        assert_eq!(surface.borrow().alpha, 0.5);
    }

    #[test]
    fn test_surface_flags() {
        let plain = Surface::new(Rect::ZERO);
        assert!(!plain.is_control() && !plain.accepts_interaction());
        assert!(Surface::new(Rect::ZERO).control().is_control());
        assert!(Surface::new(Rect::ZERO).interactive().accepts_interaction());
    }
}
