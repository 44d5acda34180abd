//! Sticky header controller
//!
//! Owns the configuration, the element registry and the state machine, and
//! wraps the scroll container the header is attached to.
//!
//! # Example
//!
//! ```rust
//! use sticky_core::{Color, Rect};
//! use sticky_header::{SharedView, StickyHeader, Surface};
//!
//! let mut header = StickyHeader::new(Rect::new(0.0, 0.0, 375.0, 667.0), 200.0)?;
//! header.set_minimum_height(64.0)?;
//! header.fade_to_color(Color::from_hex(0x1E88E5), 0.0, 1.0)?;
//!
//! let title = Surface::new(Rect::new(16.0, 140.0, 200.0, 32.0)).shared();
//! let title_view: SharedView = title.clone();
//! header.add_ratio_element(&title_view, 2.0, 3.0)?;
//!
//! header.scroll_to(-120.0);
//! assert_eq!(header.background_frame().height(), 120.0);
//! # Ok::<(), sticky_header::HeaderError>(())
//! ```

use sticky_core::{Color, Point, Rect, Size};

use crate::config::{HeaderConfig, TintFade};
use crate::error::Result;
use crate::registry::{
    AlphaFade, BackgroundElement, ElementId, ElementRegistry, HeaderElement, Motion,
};
use crate::state::{HeaderStateMachine, HeaderUpdate, Regime};
use crate::view::{ScrollContainer, ScrollSurface, SharedView, ViewRef};

/// Geometry and fill of the header background or of the overlay cover
/// above it. The host may attach a view to each layer with
/// [`StickyHeader::attach_layers`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Layer {
    pub frame: Rect,
    pub fill: Option<Color>,
}

/// Scroll-driven collapsing header attached to a scroll container
pub struct StickyHeader<S: ScrollContainer = ScrollSurface> {
    scroller: S,
    config: HeaderConfig,
    registry: ElementRegistry,
    machine: HeaderStateMachine,
    background: Layer,
    cover: Layer,
    /// Host views mirroring `background` and `cover`
    layer_views: Option<(ViewRef, ViewRef)>,
    /// Tallest content bottom edge seen so far
    content_height: f32,
    last_update: Option<HeaderUpdate>,
}

impl StickyHeader<ScrollSurface> {
    /// Create a header with its own headless scroll container sized to `frame`
    pub fn new(frame: Rect, header_height: f32) -> Result<Self> {
        Self::with_scroller(ScrollSurface::new(frame), header_height)
    }
}

impl<S: ScrollContainer> StickyHeader<S> {
    /// Attach a header to an existing scroll container.
    ///
    /// Pushes the content down by `header_height` and scrolls to the resting
    /// position (`-header_height`).
    pub fn with_scroller(mut scroller: S, header_height: f32) -> Result<Self> {
        let config = HeaderConfig::new(header_height)?;

        let frame = Rect::new(0.0, 0.0, scroller.frame().width(), header_height);
        scroller.set_content_inset_top(header_height);
        scroller.set_indicator_inset_top(header_height);
        let offset = scroller.content_offset();
        scroller.set_content_offset(Point::new(offset.x, -header_height));

        tracing::debug!(header_height, width = frame.width(), "sticky header attached");

        Ok(Self {
            scroller,
            config,
            registry: ElementRegistry::new(),
            machine: HeaderStateMachine::new(),
            background: Layer { frame, fill: None },
            cover: Layer { frame, fill: None },
            layer_views: None,
            content_height: 0.0,
            last_update: None,
        })
    }

    // =========================================================================
    // Configuration
    // =========================================================================

    /// Set the height the header collapses to (default: 0)
    pub fn set_minimum_height(&mut self, minimum: f32) -> Result<()> {
        self.config.set_minimum_height(minimum)?;
        tracing::debug!(minimum, "minimum header height set");
        Ok(())
    }

    /// Tint the overlay cover with `color`, fading its alpha from
    /// `start_alpha` at full height to `end_alpha` at minimum height
    pub fn fade_to_color(&mut self, color: Color, start_alpha: f32, end_alpha: f32) -> Result<()> {
        let tint = TintFade::new(color, start_alpha, end_alpha)?;
        self.cover.fill = Some(tint.fill(start_alpha));
        self.config.tint = Some(tint);
        self.push_layers();
        Ok(())
    }

    pub fn set_background_color(&mut self, color: Color) {
        self.background.fill = Some(color);
        self.push_layers();
    }

    /// Attach host views for the header background and the overlay cover.
    ///
    /// Both take the current layer frame and fill right away, and again after
    /// every change to either. A later call replaces the earlier views.
    pub fn attach_layers(&mut self, background: &SharedView, cover: &SharedView) {
        self.layer_views = Some((ViewRef::new(background), ViewRef::new(cover)));
        self.push_layers();
        tracing::debug!("header layers attached");
    }

    /// Write both layers to their attached views, if any.
    ///
    /// Returns how many attached views were skipped (dropped or borrowed).
    fn push_layers(&self) -> usize {
        let Some((background_view, cover_view)) = &self.layer_views else {
            return 0;
        };
        [(background_view, &self.background), (cover_view, &self.cover)]
            .into_iter()
            .filter(|(view, layer)| {
                view.with(|view| {
                    view.set_frame(layer.frame);
                    if let Some(fill) = layer.fill {
                        view.set_background(fill);
                    }
                })
                .is_none()
            })
            .count()
    }

    // =========================================================================
    // Content
    // =========================================================================

    /// Place a view in the scrolling content, growing the content height to
    /// fit its bottom edge
    pub fn add_to_scroller(&mut self, view: &SharedView) {
        self.scroller.add_content(view);

        let bottom = view.borrow().frame().max_y();
        if bottom > self.content_height {
            self.content_height = bottom;
            let size = self.scroller.content_size();
            self.scroller
                .set_content_size(Size::new(size.width, self.content_height));
        }
    }

    // =========================================================================
    // Background elements
    // =========================================================================

    /// Use an already-loaded image view as the header background image
    pub fn set_background_image(&mut self, view: &SharedView) {
        view.borrow_mut().set_frame(self.background.frame);
        self.registry.insert_background_image(view);
    }

    /// Add a view that always fills the header background
    pub fn add_background_element(&mut self, view: &SharedView) {
        self.registry.note_interaction(&*view.borrow());
        view.borrow_mut().set_frame(self.background.frame);
        let seq = self.registry.push_background(view);
        tracing::debug!(seq, "background element registered");
    }

    // =========================================================================
    // Header elements
    // =========================================================================

    /// Add a view that stays where it is
    pub fn add_fixed_element(&mut self, view: &SharedView) -> ElementId {
        self.add_element(view, Motion::Fixed, None)
    }

    /// Add a view that stays where it is but fades
    pub fn add_fixed_element_with_fade(
        &mut self,
        view: &SharedView,
        start_alpha: f32,
        end_alpha: f32,
    ) -> Result<ElementId> {
        let fade = AlphaFade::new(start_alpha, end_alpha)?;
        Ok(self.add_element(view, Motion::Fixed, Some(fade)))
    }

    /// Add a parallax view. `down_ratio` divides the scroll delta while the
    /// header is stretched, `up_ratio` while it collapses.
    pub fn add_ratio_element(
        &mut self,
        view: &SharedView,
        down_ratio: f32,
        up_ratio: f32,
    ) -> Result<ElementId> {
        let motion = Motion::ratio(view.borrow().frame().y(), down_ratio, up_ratio)?;
        Ok(self.add_element(view, motion, None))
    }

    pub fn add_ratio_element_with_fade(
        &mut self,
        view: &SharedView,
        down_ratio: f32,
        up_ratio: f32,
        start_alpha: f32,
        end_alpha: f32,
    ) -> Result<ElementId> {
        let motion = Motion::ratio(view.borrow().frame().y(), down_ratio, up_ratio)?;
        let fade = AlphaFade::new(start_alpha, end_alpha)?;
        Ok(self.add_element(view, motion, Some(fade)))
    }

    /// Add a view that moves from its current frame to `end_frame` as the
    /// header collapses
    pub fn add_keyframe_element(
        &mut self,
        view: &SharedView,
        end_frame: Rect,
    ) -> Result<ElementId> {
        let motion = Motion::keyframe(view.borrow().frame(), end_frame)?;
        Ok(self.add_element(view, motion, None))
    }

    pub fn add_keyframe_element_with_ratio(
        &mut self,
        view: &SharedView,
        end_frame: Rect,
        down_ratio: f32,
    ) -> Result<ElementId> {
        let motion = Motion::keyframe_with_ratio(view.borrow().frame(), end_frame, down_ratio)?;
        Ok(self.add_element(view, motion, None))
    }

    pub fn add_keyframe_element_with_fade(
        &mut self,
        view: &SharedView,
        end_frame: Rect,
        start_alpha: f32,
        end_alpha: f32,
    ) -> Result<ElementId> {
        let motion = Motion::keyframe(view.borrow().frame(), end_frame)?;
        let fade = AlphaFade::new(start_alpha, end_alpha)?;
        Ok(self.add_element(view, motion, Some(fade)))
    }

    pub fn add_keyframe_element_with_ratio_and_fade(
        &mut self,
        view: &SharedView,
        end_frame: Rect,
        down_ratio: f32,
        start_alpha: f32,
        end_alpha: f32,
    ) -> Result<ElementId> {
        let motion = Motion::keyframe_with_ratio(view.borrow().frame(), end_frame, down_ratio)?;
        let fade = AlphaFade::new(start_alpha, end_alpha)?;
        Ok(self.add_element(view, motion, Some(fade)))
    }

    /// Register a header element with an already-built motion.
    ///
    /// Animated or fading elements start at their start alpha (1 without a
    /// fade). Fixed elements without a fade keep the alpha they have.
    pub fn add_element(
        &mut self,
        view: &SharedView,
        motion: Motion,
        fade: Option<AlphaFade>,
    ) -> ElementId {
        self.registry.note_interaction(&*view.borrow());
        if fade.is_some() || motion != Motion::Fixed {
            view.borrow_mut()
                .set_alpha(fade.map_or(1.0, |fade| fade.start));
        }

        let id = self.registry.register(HeaderElement {
            view: ViewRef::new(view),
            motion,
            fade,
        });
        tracing::debug!(element = ?id, motion = motion.name(), "header element registered");
        id
    }

    // =========================================================================
    // Scrolling
    // =========================================================================

    /// Scroll notification entry point. Call once per offset change, in
    /// order. Non-finite offsets are ignored.
    pub fn on_scroll(&mut self, offset: Point) -> Option<&HeaderUpdate> {
        if !offset.y.is_finite() {
            tracing::warn!(offset_y = offset.y, "ignoring non-finite scroll offset");
            return None;
        }

        let update = self.machine.advance(
            &self.config,
            &self.registry,
            self.background.frame,
            offset.y,
        );

        self.background.frame = update.background_frame;
        if let (Some(tint), Some(alpha)) = (self.config.tint, update.tint_alpha) {
            self.cover.fill = Some(tint.fill(alpha));
        }
        self.cover.frame = self.background.frame;
        let skipped = update.apply(&self.registry) + self.push_layers();
        if skipped > 0 {
            tracing::trace!(skipped, "views skipped during update");
        }

        self.last_update = Some(update);
        self.last_update.as_ref()
    }

    /// Move the container to `offset_y` and run the update for it
    pub fn scroll_to(&mut self, offset_y: f32) -> Option<&HeaderUpdate> {
        let offset = Point::new(self.scroller.content_offset().x, offset_y);
        self.scroller.set_content_offset(offset);
        self.on_scroll(offset)
    }

    /// Run the update for the container's current offset
    pub fn sync(&mut self) -> Option<&HeaderUpdate> {
        let offset = self.scroller.content_offset();
        self.on_scroll(offset)
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    pub fn config(&self) -> &HeaderConfig {
        &self.config
    }

    pub fn scroller(&self) -> &S {
        &self.scroller
    }

    pub fn scroller_mut(&mut self) -> &mut S {
        &mut self.scroller
    }

    pub fn registry(&self) -> &ElementRegistry {
        &self.registry
    }

    /// Header background layer
    pub fn background(&self) -> &Layer {
        &self.background
    }

    pub fn background_frame(&self) -> Rect {
        self.background.frame
    }

    /// Overlay cover layer (tint and header elements)
    pub fn cover(&self) -> &Layer {
        &self.cover
    }

    /// Whether the header surface passes interaction through to its elements
    pub fn is_interactive(&self) -> bool {
        self.registry.is_interactive()
    }

    /// Background elements, bottom first
    pub fn background_stack(&self) -> &[BackgroundElement] {
        self.registry.backgrounds()
    }

    pub fn regime(&self) -> Option<Regime> {
        self.machine.regime()
    }

    pub fn last_update(&self) -> Option<&HeaderUpdate> {
        self.last_update.as_ref()
    }

    /// Height of the scrollable content (tallest appended bottom edge)
    pub fn content_height(&self) -> f32 {
        self.content_height
    }
}
