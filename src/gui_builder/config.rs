//! Configuration records for template libraries and detection

use image::Rgba;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;

/// Colour of the panel interior that counts as already covered.
pub const DEFAULT_BACKING_COLOR: Rgba<u8> = Rgba([198, 198, 198, 255]);

/// Layer assigned to templates without metadata.
pub const DEFAULT_LAYER: i32 = 100;

/// How a template is painted into the canvas.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TemplateMode {
    /// Copy the template once at the paint origin.
    #[default]
    Stamp,
    /// Repeat on both axes over the region's own rectangle.
    Tile,
    /// Repeat horizontally over the region's width at the template's native height.
    TileX,
    /// Repeat vertically over the region's height at the template's native width.
    TileY,
}

/// Per-template sidecar `<name>.json`.
///
/// Unknown keys are rejected so a misspelt field fails loudly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TemplateMetadata {
    pub dx: i32,
    pub dy: i32,
    pub mode: TemplateMode,
    pub layer: i32,
}

impl Default for TemplateMetadata {
    fn default() -> Self {
        Self {
            dx: 0,
            dy: 0,
            mode: TemplateMode::Stamp,
            layer: DEFAULT_LAYER,
        }
    }
}

/// Library-wide `configuration.json`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LibraryConfig {
    pub scale_multiplier: u32,
}

/// Direction an elastic template grows in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    /// Height grows one row at a time; the stop template is checked below.
    Down,
    /// Width grows one column at a time; the stop template is checked to the right.
    Right,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GrowthPolicy {
    FixedSize,
    GrowUntilFollowedBy { stop: String, axis: Axis },
}

/// Growth policy per template name; anything unlisted is [`GrowthPolicy::FixedSize`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GrowthRules {
    rules: HashMap<String, GrowthPolicy>,
}

impl GrowthRules {
    /// Rules with every template fixed-size.
    pub fn none() -> Self {
        Self {
            rules: HashMap::new(),
        }
    }

    pub fn with_rule(mut self, template: &str, stop: &str, axis: Axis) -> Self {
        self.rules.insert(
            template.to_string(),
            GrowthPolicy::GrowUntilFollowedBy {
                stop: stop.to_string(),
                axis,
            },
        );
        self
    }

    pub fn policy(&self, template: &str) -> GrowthPolicy {
        self.rules
            .get(template)
            .cloned()
            .unwrap_or(GrowthPolicy::FixedSize)
    }
}

impl Default for GrowthRules {
    /// Scrollbar tracks stretch down to their bottom cap, search boxes stretch
    /// right to their end cap.
    fn default() -> Self {
        Self::none()
            .with_rule("scrollbar_middle", "scrollbar_bottom", Axis::Down)
            .with_rule("search_middle", "search_right", Axis::Right)
    }
}

#[derive(Debug, Clone)]
pub struct DetectConfig {
    /// Interior pixels equal to this colour are attributed to the panel interior
    pub backing_color: Rgba<u8>,
    pub growth: GrowthRules,
    /// Where to write a snapshot of the unmatched remainder when detection fails
    pub debug_path: Option<PathBuf>,
}

impl Default for DetectConfig {
    fn default() -> Self {
        Self {
            backing_color: DEFAULT_BACKING_COLOR,
            growth: GrowthRules::default(),
            debug_path: None,
        }
    }
}
