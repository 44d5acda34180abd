//! Scenario file handling (header.toml)
//!
//! A scenario describes a header, its elements and the scroll offsets to
//! replay against it.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use sticky_core::{Color, Rect};

/// Top-level scenario
#[derive(Debug, Deserialize, Serialize)]
pub struct Scenario {
    pub header: HeaderSection,
    #[serde(default, rename = "background")]
    pub backgrounds: Vec<BackgroundSection>,
    #[serde(default, rename = "element")]
    pub elements: Vec<ElementSection>,
    #[serde(default)]
    pub content: Vec<ContentSection>,
    #[serde(default)]
    pub scroll: ScrollSection,
}

/// Header geometry and colors
#[derive(Debug, Deserialize, Serialize)]
pub struct HeaderSection {
    /// Full header height (also the content inset)
    pub height: f32,
    #[serde(default)]
    pub minimum_height: f32,
    /// Scroll container width
    #[serde(default = "default_width")]
    pub width: f32,
    /// Scroll container height
    #[serde(default = "default_viewport_height")]
    pub viewport_height: f32,
    /// Header background fill, `#RRGGBB` or `#RRGGBBAA`
    #[serde(default)]
    pub color: Option<String>,
    #[serde(default)]
    pub tint: Option<TintSection>,
}

fn default_width() -> f32 {
    375.0
}

fn default_viewport_height() -> f32 {
    667.0
}

#[derive(Debug, Deserialize, Serialize)]
pub struct TintSection {
    pub color: String,
    #[serde(default)]
    pub start_alpha: f32,
    #[serde(default = "default_alpha")]
    pub end_alpha: f32,
}

fn default_alpha() -> f32 {
    1.0
}

/// A background element (or the background image)
#[derive(Debug, Deserialize, Serialize)]
pub struct BackgroundSection {
    pub name: String,
    /// Register through the background image path
    #[serde(default)]
    pub image: bool,
    #[serde(default)]
    pub interactive: bool,
}

/// A header element
#[derive(Debug, Deserialize, Serialize)]
pub struct ElementSection {
    pub name: String,
    /// `[x, y, width, height]` at full header height
    pub frame: [f32; 4],
    #[serde(default)]
    pub motion: MotionSection,
    #[serde(default)]
    pub fade: Option<FadeSection>,
    /// Report the element as an actionable control
    #[serde(default)]
    pub control: bool,
}

#[derive(Debug, Default, Deserialize, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum MotionSection {
    #[default]
    Fixed,
    Ratio {
        down_ratio: f32,
        up_ratio: f32,
    },
    Keyframe {
        end_frame: [f32; 4],
        #[serde(default)]
        down_ratio: Option<f32>,
    },
}

#[derive(Debug, Clone, Copy, Deserialize, Serialize)]
pub struct FadeSection {
    pub start: f32,
    pub end: f32,
}

/// Scrolling content
#[derive(Debug, Deserialize, Serialize)]
pub struct ContentSection {
    pub frame: [f32; 4],
}

/// Offsets to replay
#[derive(Debug, Default, Deserialize, Serialize)]
pub struct ScrollSection {
    /// Explicit offsets, replayed in order
    #[serde(default)]
    pub offsets: Vec<f32>,
    /// Number of evenly spaced offsets to generate when `offsets` is empty
    #[serde(default)]
    pub steps: Option<u32>,
}

impl Scenario {
    /// Load a scenario from a file
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            anyhow::bail!(
                "No scenario found at {}. Run `sticky init` to create one.",
                path.display()
            );
        }

        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;

        Self::from_toml(&content).with_context(|| format!("Failed to parse {}", path.display()))
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Offsets to replay: the explicit list, or a sweep from a stretched
    /// header (`-1.25 * height`) to fully scrolled content (`0`)
    pub fn offsets(&self) -> Vec<f32> {
        if !self.scroll.offsets.is_empty() {
            return self.scroll.offsets.clone();
        }
        let steps = self.scroll.steps.unwrap_or(10).max(1);
        let from = -1.25 * self.header.height;
        (0..=steps)
            .map(|i| from - from * i as f32 / steps as f32)
            .collect()
    }
}

/// Parse a `[x, y, width, height]` array
pub fn rect(values: [f32; 4]) -> Rect {
    Rect::new(values[0], values[1], values[2], values[3])
}

/// Parse a hex color string
pub fn color(value: &str) -> Result<Color> {
    Color::parse_hex(value).with_context(|| format!("Invalid color `{}`", value))
}

/// Sample scenario written by `sticky init`
pub const SAMPLE: &str = r##"# Sticky header scenario
#
# Replay with: sticky replay header.toml

[header]
height = 200.0
minimum_height = 64.0
width = 375.0
color = "#263238"

[header.tint]
color = "#1E88E5"
start_alpha = 0.0
end_alpha = 1.0

[[background]]
name = "cover-photo"
image = true

[[element]]
name = "title"
frame = [16.0, 140.0, 240.0, 32.0]
motion = { type = "ratio", down_ratio = 2.0, up_ratio = 1.6 }
fade = { start = 1.0, end = 0.0 }

[[element]]
name = "avatar"
frame = [16.0, 40.0, 80.0, 80.0]
motion = { type = "keyframe", end_frame = [16.0, 12.0, 40.0, 40.0], down_ratio = 3.0 }

[[element]]
name = "menu"
frame = [327.0, 12.0, 32.0, 32.0]
control = true

[[content]]
frame = [0.0, 0.0, 375.0, 1400.0]

[scroll]
offsets = [-260.0, -200.0, -160.0, -132.0, -100.0, -64.0, -20.0, 120.0]
"##;
