//! Persisted overlay document
//!
//! One JSON document holds every user-editable entity. Cross references are
//! stored by stable name (grid names in layouts, style names in items) so a
//! document survives reordering between sessions.

use serde::{Deserialize, Serialize};

use crate::Rgba;

/// Name of the built-in style that always sits at index 0
pub const DEFAULT_STYLE_NAME: &str = "Default";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OverlayDocument {
    #[serde(default)]
    pub buff_grids: Vec<GridConfig>,
    #[serde(default)]
    pub styles: Vec<StyleConfig>,
    #[serde(default)]
    pub layouts: Vec<LayoutConfig>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_layout: Option<String>,
    /// Older documents called layouts "sets". Read alongside `layouts`,
    /// never written back.
    #[serde(default, skip_serializing)]
    pub buff_sets: Vec<LayoutConfig>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GridConfig {
    pub name: String,
    #[serde(default = "default_spacing")]
    pub spacing: [i32; 2],
    #[serde(default)]
    pub offset: [i32; 2],
    #[serde(default)]
    pub attached: bool,
    #[serde(default)]
    pub central_weight: f32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mouse_clip: Option<([i32; 2], [i32; 2])>,
    #[serde(default = "default_true")]
    pub track_mouse_while_held: bool,
    #[serde(default = "default_true")]
    pub square: bool,
    #[serde(default)]
    pub items: Vec<ItemConfig>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemConfig {
    pub pos: [i32; 2],
    pub buff_id: u32,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub additional_buff_ids: Vec<u32>,
    #[serde(default = "default_style_name")]
    pub style: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StyleConfig {
    pub name: String,
    #[serde(default)]
    pub thresholds: Vec<ThresholdConfig>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ThresholdConfig {
    #[serde(default)]
    pub min: i32,
    #[serde(default = "default_threshold_max")]
    pub max: i32,
    #[serde(flatten)]
    pub appearance: Appearance,
}

/// Reference from a layout to a grid.
///
/// Current documents store names; documents written before names were
/// stable stored raw indices.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum GridRef {
    Name(String),
    Index(usize),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayoutConfig {
    pub name: String,
    #[serde(default)]
    pub grids: Vec<GridRef>,
    #[serde(default)]
    pub combat_only: bool,
}

/// Visual treatment applied to an icon for some range of stack counts.
///
/// `Default` is the fully transparent appearance used for uncovered counts.
/// Missing fields in a persisted threshold fall back to a plain white tint.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Appearance {
    #[serde(default = "white")]
    pub tint: Rgba,
    #[serde(default)]
    pub border: Rgba,
    #[serde(default)]
    pub border_thickness: f32,
    #[serde(default)]
    pub glow: Rgba,
    #[serde(default)]
    pub glow_size: f32,
    /// (intensity, speed in Hz)
    #[serde(default)]
    pub glow_pulse: [f32; 2],
}

impl Appearance {
    /// Untinted, no border, no glow
    pub fn plain() -> Self {
        Self {
            tint: white(),
            ..Self::default()
        }
    }

    /// True when nothing of the icon would be visible
    pub fn is_transparent(&self) -> bool {
        self.tint[3] <= 0.0
            && (self.border_thickness <= 0.0 || self.border[3] <= 0.0)
            && (self.glow_size <= 0.0 || self.glow[3] <= 0.0)
    }
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            name: "New Grid".to_string(),
            spacing: default_spacing(),
            offset: [0, 0],
            attached: false,
            central_weight: 0.0,
            mouse_clip: None,
            track_mouse_while_held: true,
            square: true,
            items: Vec::new(),
        }
    }
}

impl Default for ThresholdConfig {
    fn default() -> Self {
        Self {
            min: 0,
            max: default_threshold_max(),
            appearance: Appearance::plain(),
        }
    }
}

fn default_spacing() -> [i32; 2] {
    [64, 64]
}

fn default_true() -> bool {
    true
}

fn default_style_name() -> String {
    DEFAULT_STYLE_NAME.to_string()
}

fn default_threshold_max() -> i32 {
    i32::MAX
}

fn white() -> Rgba {
    [1.0, 1.0, 1.0, 1.0]
}
