//! Headless replay of a scenario
//!
//! Builds a [`StickyHeader`] over headless surfaces, feeds it the scenario's
//! offsets and records what every view looks like after each update.

use anyhow::{Context, Result};
use serde::Serialize;
use std::cell::RefCell;
use std::fmt::Write as _;
use std::rc::Rc;

use sticky_core::{Rect, Size};
use sticky_header::{ScrollContainer, ScrollSurface, SharedView, StickyHeader, Surface};

use crate::scenario::{self, MotionSection, Scenario};

/// A header built from a scenario, plus the views it animates
pub struct Replay {
    header: StickyHeader,
    /// Header background and overlay cover, attached as layer views
    layers: (Rc<RefCell<Surface>>, Rc<RefCell<Surface>>),
    backgrounds: Vec<(String, Rc<RefCell<Surface>>)>,
    elements: Vec<(String, Rc<RefCell<Surface>>)>,
    // Content views are owned by the scroll surface
}

/// State of one named view
#[derive(Debug, Clone, Serialize)]
pub struct ViewSnapshot {
    pub name: String,
    pub frame: [f32; 4],
    pub alpha: f32,
}

/// State of the header after one offset
#[derive(Debug, Clone, Serialize)]
pub struct Snapshot {
    pub offset_y: f32,
    pub regime: &'static str,
    pub header: [f32; 4],
    /// Header background fill as RGBA
    pub fill: Option<[f32; 4]>,
    pub tint_alpha: Option<f32>,
    pub backgrounds: Vec<ViewSnapshot>,
    pub elements: Vec<ViewSnapshot>,
}

fn array(frame: Rect) -> [f32; 4] {
    [frame.x(), frame.y(), frame.width(), frame.height()]
}

impl Replay {
    pub fn build(scenario: &Scenario) -> Result<Self> {
        let section = &scenario.header;
        let scroller =
            ScrollSurface::new(Rect::new(0.0, 0.0, section.width, section.viewport_height));
        let mut header =
            StickyHeader::with_scroller(scroller, section.height).context("Invalid [header]")?;
        header
            .set_minimum_height(section.minimum_height)
            .context("Invalid [header] minimum_height")?;

        if let Some(fill) = &section.color {
            header.set_background_color(scenario::color(fill)?);
        }
        if let Some(tint) = &section.tint {
            header
                .fade_to_color(scenario::color(&tint.color)?, tint.start_alpha, tint.end_alpha)
                .context("Invalid [header.tint]")?;
        }

        let layers = (Surface::new(Rect::ZERO).shared(), Surface::new(Rect::ZERO).shared());
        let (background_view, cover_view): (SharedView, SharedView) =
            (layers.0.clone(), layers.1.clone());
        header.attach_layers(&background_view, &cover_view);

        for content in &scenario.content {
            let view: SharedView = Surface::new(scenario::rect(content.frame)).shared();
            header.add_to_scroller(&view);
        }

        let mut backgrounds = Vec::new();
        for background in &scenario.backgrounds {
            let mut surface = Surface::new(Rect::ZERO);
            surface.interactive = background.interactive;
            let surface = surface.shared();
            let view: SharedView = surface.clone();
            if background.image {
                header.set_background_image(&view);
            } else {
                header.add_background_element(&view);
            }
            backgrounds.push((background.name.clone(), surface));
        }

        let mut elements = Vec::new();
        for element in &scenario.elements {
            let mut surface = Surface::new(scenario::rect(element.frame));
            surface.control = element.control;
            let surface = surface.shared();
            let view: SharedView = surface.clone();

            let fade = element.fade;
            let registered = match (&element.motion, fade) {
                (MotionSection::Fixed, None) => Ok(header.add_fixed_element(&view)),
                (MotionSection::Fixed, Some(f)) => {
                    header.add_fixed_element_with_fade(&view, f.start, f.end)
                }
                (MotionSection::Ratio { down_ratio, up_ratio }, None) => {
                    header.add_ratio_element(&view, *down_ratio, *up_ratio)
                }
                (MotionSection::Ratio { down_ratio, up_ratio }, Some(f)) => header
                    .add_ratio_element_with_fade(&view, *down_ratio, *up_ratio, f.start, f.end),
                (MotionSection::Keyframe { end_frame, down_ratio }, fade) => {
                    let end = scenario::rect(*end_frame);
                    match (down_ratio, fade) {
                        (None, None) => header.add_keyframe_element(&view, end),
                        (Some(down), None) => {
                            header.add_keyframe_element_with_ratio(&view, end, *down)
                        }
                        (None, Some(f)) => {
                            header.add_keyframe_element_with_fade(&view, end, f.start, f.end)
                        }
                        (Some(down), Some(f)) => header.add_keyframe_element_with_ratio_and_fade(
                            &view, end, *down, f.start, f.end,
                        ),
                    }
                }
            };
            registered.with_context(|| format!("Invalid element `{}`", element.name))?;
            elements.push((element.name.clone(), surface));
        }

        tracing::info!(
            backgrounds = backgrounds.len(),
            elements = elements.len(),
            "scenario loaded"
        );

        Ok(Self {
            header,
            layers,
            backgrounds,
            elements,
        })
    }

    pub fn header(&self) -> &StickyHeader {
        &self.header
    }

    /// Scrollable content size after all content was appended
    pub fn content_size(&self) -> Size {
        self.header.scroller().content_size()
    }

    /// Replay `offsets` in order, one snapshot per offset
    pub fn run(&mut self, offsets: &[f32]) -> Vec<Snapshot> {
        offsets
            .iter()
            .filter_map(|&offset| self.step(offset))
            .collect()
    }

    pub fn step(&mut self, offset_y: f32) -> Option<Snapshot> {
        let regime = self.header.scroll_to(offset_y)?.regime.name();
        let (background, cover) = (self.layers.0.borrow(), self.layers.1.borrow());

        Some(Snapshot {
            offset_y,
            regime,
            header: array(background.frame),
            fill: background.background.map(|c| [c.r, c.g, c.b, c.a]),
            tint_alpha: cover.background.map(|c| c.a),
            backgrounds: snapshot_views(&self.backgrounds),
            elements: snapshot_views(&self.elements),
        })
    }
}

fn snapshot_views(views: &[(String, Rc<RefCell<Surface>>)]) -> Vec<ViewSnapshot> {
    views
        .iter()
        .map(|(name, surface)| {
            let surface = surface.borrow();
            ViewSnapshot {
                name: name.clone(),
                frame: array(surface.frame),
                alpha: surface.alpha,
            }
        })
        .collect()
}

/// Render snapshots as a plain text report
pub fn render_text(snapshots: &[Snapshot]) -> String {
    let mut out = String::new();
    for snapshot in snapshots {
        let _ = writeln!(
            out,
            "offset {:>8.1}  {:<10}  header {:>7.1}{}",
            snapshot.offset_y,
            snapshot.regime,
            snapshot.header[3],
            snapshot
                .tint_alpha
                .map(|a| format!("  tint {:.2}", a))
                .unwrap_or_default(),
        );
        for view in &snapshot.elements {
            let [x, y, w, h] = view.frame;
            let _ = writeln!(
                out,
                "    {:<16} ({:>7.1}, {:>7.1}, {:>6.1} x {:>6.1})  alpha {:.2}",
                view.name, x, y, w, h, view.alpha
            );
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scenario::SAMPLE;

    #[test]
    fn test_sample_replays() {
        let scenario = Scenario::from_toml(SAMPLE).unwrap();
        let mut replay = Replay::build(&scenario).unwrap();
        assert!(replay.header().is_interactive());
        assert_eq!(replay.content_size().height, 1400.0);

        let snapshots = replay.run(&scenario.offsets());
        assert_eq!(snapshots.len(), 8);

        let c = scenario::color("#263238").unwrap();
        let first = &snapshots[0];
        assert_eq!(first.regime, "extended");
        assert_eq!(first.header[3], 260.0);
        assert_eq!(first.fill, Some([c.r, c.g, c.b, c.a]));
        // Cover photo tracks the header
        assert_eq!(first.backgrounds[0].frame, first.header);

        let last = snapshots.last().unwrap();
        assert_eq!(last.regime, "collapsed");
        assert_eq!(last.header[3], 64.0);
        assert_eq!(last.tint_alpha, Some(1.0));
        assert_eq!(replay.layers.1.borrow().frame.height(), 64.0);
        let avatar = &last.elements[1];
        assert_eq!(avatar.frame, [16.0, 12.0, 40.0, 40.0]);
    }

    #[test]
    fn test_invalid_ratio_is_reported() {
        let input = r#"
[header]
height = 100.0

[[element]]
name = "broken"
frame = [0.0, 0.0, 10.0, 10.0]
motion = { type = "ratio", down_ratio = 0.0, up_ratio = 1.0 }
"#;
        let scenario = Scenario::from_toml(input).unwrap();
        let err = Replay::build(&scenario).err().unwrap();
        assert!(format!("{:#}", err).contains("broken"));
    }

    #[test]
    fn test_text_report_lists_elements() {
        let scenario = Scenario::from_toml(SAMPLE).unwrap();
        let mut replay = Replay::build(&scenario).unwrap();
        let text = render_text(&replay.run(&[-100.0]));
        assert!(text.contains("collapsing"));
        assert!(text.contains("title"));
        assert!(text.contains("tint"));
    }

    #[test]
    fn test_json_report() {
        let scenario = Scenario::from_toml(SAMPLE).unwrap();
        let mut replay = Replay::build(&scenario).unwrap();
        let json = serde_json::to_value(replay.run(&[-200.0])).unwrap();
        assert_eq!(json[0]["regime"], "extended");
        assert_eq!(json[0]["elements"][0]["name"], "title");
    }
}
