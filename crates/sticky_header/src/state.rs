//! Header state machine
//!
//! Maps a vertical scroll offset to the visual state of the header. With
//! `h = header_height`, `m = minimum_height` and `o = offset_y` (negative
//! while the header is visible, `-h` at rest):
//!
//! | Regime       | Offset            | Background height |
//! |--------------|-------------------|-------------------|
//! | `Extended`   | `o <= -h`         | `-o`              |
//! | `Collapsing` | `-h < o <= -m`    | `-o`              |
//! | `Collapsed`  | `o > -m`          | `m`               |
//!
//! [`HeaderStateMachine::resolve`] is pure: it produces a [`HeaderUpdate`]
//! that [`HeaderUpdate::apply`] then writes to the registered views.

use smallvec::SmallVec;
use sticky_animation::lerp_rect;
use sticky_core::Rect;

use crate::config::HeaderConfig;
use crate::registry::{ElementId, ElementRegistry, HeaderElement, Motion};

/// Scroll regime of the header
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Regime {
    /// Pulled down past full height; the header stretches
    Extended,
    /// Between full and minimum height
    Collapsing,
    /// Pinned at minimum height
    Collapsed,
}

impl Regime {
    pub fn classify(config: &HeaderConfig, offset_y: f32) -> Self {
        if offset_y <= -config.header_height {
            Regime::Extended
        } else if offset_y <= -config.minimum_height {
            Regime::Collapsing
        } else {
            Regime::Collapsed
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Regime::Extended => "extended",
            Regime::Collapsing => "collapsing",
            Regime::Collapsed => "collapsed",
        }
    }
}

/// What happens to an element's frame
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FrameUpdate {
    /// Leave the frame untouched
    Keep,
    /// Move vertically, keeping x and size
    SetY(f32),
    /// Replace the whole frame
    Set(Rect),
}

/// Computed state of one header element
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ElementUpdate {
    pub id: ElementId,
    pub frame: FrameUpdate,
    pub alpha: Option<f32>,
}

/// Computed state of the whole header for one scroll offset
#[derive(Debug, Clone, PartialEq)]
pub struct HeaderUpdate {
    pub offset_y: f32,
    pub regime: Regime,
    /// Header background frame; the cover and every background element take it too
    pub background_frame: Rect,
    /// Overlay tint alpha, when a tint fade is configured
    pub tint_alpha: Option<f32>,
    /// Header elements in registration order
    pub elements: SmallVec<[ElementUpdate; 8]>,
}

impl HeaderUpdate {
    pub fn element(&self, id: ElementId) -> Option<&ElementUpdate> {
        self.elements.iter().find(|e| e.id == id)
    }

    /// Write the computed state to the registered views.
    ///
    /// Returns how many views were skipped because the host dropped them or
    /// was holding a borrow of them.
    pub fn apply(&self, registry: &ElementRegistry) -> usize {
        let mut skipped = 0;

        for update in &self.elements {
            let Some(element) = registry.get(update.id) else {
                continue;
            };
            let written = element.view.with(|view| {
                match update.frame {
                    FrameUpdate::Keep => {}
                    FrameUpdate::SetY(y) => {
                        let frame = view.frame();
                        view.set_frame(frame.with_y(y));
                    }
                    FrameUpdate::Set(frame) => view.set_frame(frame),
                }
                if let Some(alpha) = update.alpha {
                    view.set_alpha(alpha);
                }
            });
            if written.is_none() {
                tracing::debug!(element = ?update.id, "skipping unavailable header element");
                skipped += 1;
            }
        }

        let frame = self.background_frame;
        for background in registry.backgrounds() {
            if background.view.with(|view| view.set_frame(frame)).is_none() {
                tracing::debug!(seq = background.seq(), "skipping unavailable background element");
                skipped += 1;
            }
        }

        skipped
    }
}

/// Tracks the regime across updates and resolves scroll offsets
#[derive(Debug, Default)]
pub struct HeaderStateMachine {
    regime: Option<Regime>,
    last_offset: Option<f32>,
}

impl HeaderStateMachine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Regime of the last advanced offset
    pub fn regime(&self) -> Option<Regime> {
        self.regime
    }

    pub fn last_offset(&self) -> Option<f32> {
        self.last_offset
    }

    /// Resolve `offset_y` and remember the resulting regime
    pub fn advance(
        &mut self,
        config: &HeaderConfig,
        registry: &ElementRegistry,
        background_frame: Rect,
        offset_y: f32,
    ) -> HeaderUpdate {
        let update = Self::resolve(config, registry, background_frame, offset_y);

        if self.regime != Some(update.regime) {
            tracing::debug!(
                from = self.regime.map(|r| r.name()),
                to = update.regime.name(),
                offset_y,
                "header regime changed"
            );
        }
        tracing::trace!(
            offset_y,
            height = update.background_frame.height(),
            "header update"
        );

        self.regime = Some(update.regime);
        self.last_offset = Some(offset_y);
        update
    }

    /// Compute the header state for `offset_y`.
    ///
    /// `background_frame` is the current header background frame; only its
    /// height is recomputed.
    pub fn resolve(
        config: &HeaderConfig,
        registry: &ElementRegistry,
        background_frame: Rect,
        offset_y: f32,
    ) -> HeaderUpdate {
        let regime = Regime::classify(config, offset_y);
        let height = match regime {
            Regime::Extended | Regime::Collapsing => -offset_y,
            Regime::Collapsed => config.minimum_height,
        };

        let tint_alpha = config.tint.map(|tint| match regime {
            Regime::Extended => tint.start_alpha,
            Regime::Collapsing => config
                .collapse_span()
                .with_range(tint.start_alpha, tint.end_alpha)
                .apply(-offset_y),
            Regime::Collapsed => tint.end_alpha,
        });

        let elements = registry
            .elements()
            .map(|(id, element)| ElementUpdate {
                id,
                frame: element_frame(config, element, regime, offset_y),
                alpha: element_alpha(config, element, regime, offset_y),
            })
            .collect();

        HeaderUpdate {
            offset_y,
            regime,
            background_frame: background_frame.with_height(height),
            tint_alpha,
            elements,
        }
    }
}

fn element_frame(
    config: &HeaderConfig,
    element: &HeaderElement,
    regime: Regime,
    offset_y: f32,
) -> FrameUpdate {
    let span = config.collapse_span();
    // Scroll delta from the resting position; negative while stretched
    let delta = offset_y + config.header_height;

    match (regime, &element.motion) {
        (_, Motion::Fixed) => FrameUpdate::Keep,

        (Regime::Extended, Motion::Ratio(ratio)) => {
            FrameUpdate::SetY(ratio.original_offset_y - delta / ratio.down_ratio)
        }
        (Regime::Collapsing, Motion::Ratio(ratio)) => {
            FrameUpdate::SetY(ratio.original_offset_y - delta / ratio.up_ratio)
        }
        (Regime::Collapsed, Motion::Ratio(ratio)) => FrameUpdate::SetY(
            ratio.original_offset_y - config.collapse_distance() / ratio.up_ratio,
        ),

        (Regime::Extended, Motion::Keyframe(keyframe)) => FrameUpdate::Set(keyframe.start_frame),
        // The down ratio only moves y, and only while stretched
        (Regime::Extended, Motion::RatioAndKeyframe { keyframe, down_ratio }) => {
            let start = keyframe.start_frame;
            FrameUpdate::Set(start.with_y(start.y() - delta / down_ratio))
        }
        (Regime::Collapsing, Motion::Keyframe(keyframe))
        | (Regime::Collapsing, Motion::RatioAndKeyframe { keyframe, .. }) => FrameUpdate::Set(
            lerp_rect(keyframe.start_frame, keyframe.end_frame, span.domain, -offset_y),
        ),
        (Regime::Collapsed, Motion::Keyframe(keyframe))
        | (Regime::Collapsed, Motion::RatioAndKeyframe { keyframe, .. }) => {
            FrameUpdate::Set(keyframe.end_frame)
        }
    }
}

fn element_alpha(
    config: &HeaderConfig,
    element: &HeaderElement,
    regime: Regime,
    offset_y: f32,
) -> Option<f32> {
    let fade = element.fade?;
    let alpha = match regime {
        // A header that cannot collapse has no range to fade across
        Regime::Extended if config.collapse_span().is_degenerate() => fade.start,
        Regime::Extended | Regime::Collapsing => config
            .collapse_span()
            .with_range(fade.start, fade.end)
            .apply(-offset_y),
        Regime::Collapsed => fade.end,
    };
    Some(alpha)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::AlphaFade;
    use crate::view::{SharedView, Surface, ViewRef};

    fn approx(a: f32, b: f32) -> bool {
        (a - b).abs() < 1e-4
    }

    fn config(h: f32, m: f32) -> HeaderConfig {
        HeaderConfig::new(h).unwrap().with_minimum_height(m).unwrap()
    }

    fn register(
        registry: &mut ElementRegistry,
        views: &mut Vec<SharedView>,
        motion: Motion,
        fade: Option<AlphaFade>,
    ) -> ElementId {
        let view: SharedView = Surface::new(Rect::new(0.0, 0.0, 10.0, 10.0)).shared();
        let id = registry.register(HeaderElement {
            view: ViewRef::new(&view),
            motion,
            fade,
        });
        views.push(view);
        id
    }

    fn background() -> Rect {
        Rect::new(0.0, 0.0, 375.0, 200.0)
    }

    #[test]
    fn test_classify_boundaries() {
        let config = config(200.0, 50.0);
        assert_eq!(Regime::classify(&config, -300.0), Regime::Extended);
        assert_eq!(Regime::classify(&config, -200.0), Regime::Extended);
        assert_eq!(Regime::classify(&config, -199.0), Regime::Collapsing);
        assert_eq!(Regime::classify(&config, -50.0), Regime::Collapsing);
        assert_eq!(Regime::classify(&config, -49.0), Regime::Collapsed);
        assert_eq!(Regime::classify(&config, 400.0), Regime::Collapsed);
    }

    #[test]
    fn test_background_height_per_regime() {
        let config = config(200.0, 50.0);
        let registry = ElementRegistry::new();
        for (offset, expected) in [
            (-320.0, 320.0),
            (-200.0, 200.0),
            (-120.0, 120.0),
            (-50.0, 50.0),
            (-10.0, 50.0),
            (900.0, 50.0),
        ] {
            let update = HeaderStateMachine::resolve(&config, &registry, background(), offset);
            assert_eq!(update.background_frame.height(), expected, "offset {offset}");
            assert_eq!(update.background_frame.width(), 375.0);
        }
    }

    #[test]
    fn test_ratio_motion() {
        let config = config(200.0, 50.0);
        let mut registry = ElementRegistry::new();
        let mut views = Vec::new();
        let id = register(
            &mut registry,
            &mut views,
            Motion::ratio(100.0, 2.0, 4.0).unwrap(),
            None,
        );

        let frame_at = |offset: f32| {
            HeaderStateMachine::resolve(&config, &registry, background(), offset)
                .element(id)
                .unwrap()
                .frame
        };
        assert_eq!(frame_at(-250.0), FrameUpdate::SetY(125.0));
        assert_eq!(frame_at(-100.0), FrameUpdate::SetY(75.0));
        assert_eq!(frame_at(-10.0), FrameUpdate::SetY(62.5));
        assert_eq!(frame_at(300.0), FrameUpdate::SetY(62.5));
    }

    #[test]
    fn test_keyframe_motion() {
        let config = config(200.0, 50.0);
        let mut registry = ElementRegistry::new();
        let mut views = Vec::new();
        let start = Rect::new(0.0, 0.0, 50.0, 50.0);
        let end = Rect::new(0.0, 100.0, 20.0, 20.0);
        let id = register(
            &mut registry,
            &mut views,
            Motion::keyframe(start, end).unwrap(),
            None,
        );

        let frame_at = |offset: f32| {
            HeaderStateMachine::resolve(&config, &registry, background(), offset)
                .element(id)
                .unwrap()
                .frame
        };
        assert_eq!(frame_at(-300.0), FrameUpdate::Set(start));
        assert_eq!(frame_at(-200.0), FrameUpdate::Set(start));
        assert_eq!(frame_at(-125.0), FrameUpdate::Set(Rect::new(0.0, 50.0, 35.0, 35.0)));
        assert_eq!(frame_at(-50.0), FrameUpdate::Set(end));
        assert_eq!(frame_at(-10.0), FrameUpdate::Set(end));
    }

    #[test]
    fn test_ratio_and_keyframe_precedence() {
        let config = config(200.0, 50.0);
        let mut registry = ElementRegistry::new();
        let mut views = Vec::new();
        let start = Rect::new(10.0, 20.0, 50.0, 50.0);
        let end = Rect::new(0.0, 100.0, 20.0, 20.0);
        let id = register(
            &mut registry,
            &mut views,
            Motion::keyframe_with_ratio(start, end, 2.0).unwrap(),
            None,
        );

        let frame_at = |offset: f32| {
            HeaderStateMachine::resolve(&config, &registry, background(), offset)
                .element(id)
                .unwrap()
                .frame
        };
        // Stretched: start frame with y following the down ratio
        assert_eq!(frame_at(-260.0), FrameUpdate::Set(start.with_y(50.0)));
        // Collapsing ignores the ratio entirely
        assert_eq!(frame_at(-125.0), FrameUpdate::Set(Rect::new(5.0, 60.0, 35.0, 35.0)));
        assert_eq!(frame_at(0.0), FrameUpdate::Set(end));
    }

    #[test]
    fn test_fixed_element_only_fades() {
        let config = config(200.0, 50.0);
        let mut registry = ElementRegistry::new();
        let mut views = Vec::new();
        let id = register(
            &mut registry,
            &mut views,
            Motion::Fixed,
            Some(AlphaFade::new(1.0, 0.0).unwrap()),
        );

        let update = HeaderStateMachine::resolve(&config, &registry, background(), -125.0);
        let element = update.element(id).unwrap();
        assert_eq!(element.frame, FrameUpdate::Keep);
        assert!(approx(element.alpha.unwrap(), 0.5));
    }

    #[test]
    fn test_alpha_per_regime() {
        let config = config(200.0, 50.0);
        let mut registry = ElementRegistry::new();
        let mut views = Vec::new();
        let faded = register(
            &mut registry,
            &mut views,
            Motion::ratio(0.0, 1.0, 1.0).unwrap(),
            Some(AlphaFade::new(1.0, 0.0).unwrap()),
        );
        let plain = register(&mut registry, &mut views, Motion::Fixed, None);

        let alpha_at = |offset: f32, id: ElementId| {
            HeaderStateMachine::resolve(&config, &registry, background(), offset)
                .element(id)
                .unwrap()
                .alpha
        };
        assert_eq!(alpha_at(-200.0, faded), Some(1.0));
        // Extended zone extrapolates past the start alpha
        assert!(approx(alpha_at(-350.0, faded).unwrap(), 2.0));
        assert_eq!(alpha_at(-50.0, faded), Some(0.0));
        assert_eq!(alpha_at(0.0, faded), Some(0.0));
        assert_eq!(alpha_at(-125.0, plain), None);
    }

    #[test]
    fn test_tint_alpha_per_regime() {
        let tint = crate::config::TintFade::new(sticky_core::Color::BLACK, 0.2, 0.8).unwrap();
        let config = config(200.0, 50.0).with_tint(tint);
        let registry = ElementRegistry::new();

        let tint_at = |offset: f32| {
            HeaderStateMachine::resolve(&config, &registry, background(), offset).tint_alpha
        };
        assert_eq!(tint_at(-400.0), Some(0.2));
        assert!(approx(tint_at(-125.0).unwrap(), 0.5));
        assert_eq!(tint_at(-20.0), Some(0.8));
    }

    #[test]
    fn test_no_tint_without_fade() {
        let config = config(200.0, 50.0);
        let registry = ElementRegistry::new();
        let update = HeaderStateMachine::resolve(&config, &registry, background(), -125.0);
        assert_eq!(update.tint_alpha, None);
    }

    #[test]
    fn test_non_collapsing_header_keeps_alpha_finite() {
        let config = config(100.0, 100.0);
        let mut registry = ElementRegistry::new();
        let mut views = Vec::new();
        let id = register(
            &mut registry,
            &mut views,
            Motion::Fixed,
            Some(AlphaFade::new(0.9, 0.1).unwrap()),
        );

        let extended = HeaderStateMachine::resolve(&config, &registry, background(), -150.0);
        assert_eq!(extended.element(id).unwrap().alpha, Some(0.9));
        let collapsed = HeaderStateMachine::resolve(&config, &registry, background(), -99.0);
        assert_eq!(collapsed.regime, Regime::Collapsed);
        assert_eq!(collapsed.element(id).unwrap().alpha, Some(0.1));
    }

    #[test]
    fn test_advance_tracks_regime() {
        let config = config(200.0, 50.0);
        let registry = ElementRegistry::new();
        let mut machine = HeaderStateMachine::new();
        assert_eq!(machine.regime(), None);

        machine.advance(&config, &registry, background(), -210.0);
        assert_eq!(machine.regime(), Some(Regime::Extended));
        machine.advance(&config, &registry, background(), -60.0);
        assert_eq!(machine.regime(), Some(Regime::Collapsing));
        assert_eq!(machine.last_offset(), Some(-60.0));
    }

    #[test]
    fn test_apply_writes_views_and_backgrounds() {
        let config = config(200.0, 50.0);
        let mut registry = ElementRegistry::new();

        let title = Surface::new(Rect::new(8.0, 100.0, 120.0, 30.0)).shared();
        let title_view: SharedView = title.clone();
        let id = registry.register(HeaderElement {
            view: ViewRef::new(&title_view),
            motion: Motion::ratio(100.0, 2.0, 4.0).unwrap(),
            fade: Some(AlphaFade::new(1.0, 0.0).unwrap()),
        });
        let photo = Surface::new(Rect::ZERO).shared();
        let photo_view: SharedView = photo.clone();
        registry.push_background(&photo_view);

        let update = HeaderStateMachine::resolve(&config, &registry, background(), -100.0);
        assert!(update.element(id).is_some());
        assert_eq!(update.apply(&registry), 0);

        let title = title.borrow();
        assert_eq!(title.frame, Rect::new(8.0, 75.0, 120.0, 30.0));
        assert!(approx(title.alpha, 1.0 / 3.0));
        assert_eq!(photo.borrow().frame, Rect::new(0.0, 0.0, 375.0, 100.0));
    }

    #[test]
    fn test_apply_skips_dropped_views() {
        let config = config(200.0, 50.0);
        let mut registry = ElementRegistry::new();
        let view: SharedView = Surface::new(Rect::ZERO).shared();
        registry.register(HeaderElement {
            view: ViewRef::new(&view),
            motion: Motion::ratio(0.0, 1.0, 1.0).unwrap(),
            fade: None,
        });
        registry.push_background(&view);
        drop(view);

        let update = HeaderStateMachine::resolve(&config, &registry, background(), -100.0);
        assert_eq!(update.apply(&registry), 2);
    }

    #[test]
    fn test_apply_skips_borrowed_views() {
        let config = config(200.0, 50.0);
        let mut registry = ElementRegistry::new();
        let held = Surface::new(Rect::new(0.0, 100.0, 10.0, 10.0)).shared();
        let held_view: SharedView = held.clone();
        let free = Surface::new(Rect::new(0.0, 100.0, 10.0, 10.0)).shared();
        let free_view: SharedView = free.clone();
        for view in [&held_view, &free_view] {
            registry.register(HeaderElement {
                view: ViewRef::new(view),
                motion: Motion::ratio(100.0, 2.0, 4.0).unwrap(),
                fade: None,
            });
        }

        let update = HeaderStateMachine::resolve(&config, &registry, background(), -100.0);
        let guard = held.borrow();
        assert_eq!(update.apply(&registry), 1);
        assert_eq!(guard.frame.y(), 100.0);
        drop(guard);
        assert_eq!(free.borrow().frame.y(), 75.0);
    }
}
