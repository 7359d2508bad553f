//! Styles and the appearance cache
//!
//! A style is a priority-ordered list of stack-count ranges, each carrying an
//! [`Appearance`]. Ranges may overlap; the earliest listed one wins. Lookups
//! happen for every item every frame, so each style keeps a flattened table
//! for counts `0..100` plus a single bucket for everything above.
//!
//! The table is always rebuilt from scratch after an edit. Overlap priority
//! is only preserved by replaying the whole overwrite order, so there is no
//! incremental update path.

mod pulse;

use std::ops::Index;

use clarity_types::{Appearance, StyleConfig, ThresholdConfig, DEFAULT_STYLE_NAME};

use crate::error::ModelError;

pub use pulse::{effective_glow_color, effective_glow_size};

/// Counts below this are looked up in the flat table
pub const CACHED_COUNTS: usize = 100;

static TRANSPARENT: Appearance = Appearance {
    tint: [0.0; 4],
    border: [0.0; 4],
    border_thickness: 0.0,
    glow: [0.0; 4],
    glow_size: 0.0,
    glow_pulse: [0.0; 2],
};

/// Closed stack-count range `[min, max]` with its appearance
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Threshold {
    pub min: i32,
    pub max: i32,
    pub appearance: Appearance,
}

impl Threshold {
    pub fn new(min: i32, max: i32, appearance: Appearance) -> Self {
        Self {
            min,
            max,
            appearance,
        }
    }

    pub fn contains(&self, count: i32) -> bool {
        (self.min..=self.max).contains(&count)
    }
}

impl Default for Threshold {
    fn default() -> Self {
        Self::new(1, i32::MAX, Appearance::plain())
    }
}

impl From<&ThresholdConfig> for Threshold {
    fn from(cfg: &ThresholdConfig) -> Self {
        Self::new(cfg.min, cfg.max, cfg.appearance)
    }
}

impl From<&Threshold> for ThresholdConfig {
    fn from(t: &Threshold) -> Self {
        Self {
            min: t.min,
            max: t.max,
            appearance: t.appearance,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Style {
    name: String,
    thresholds: Vec<Threshold>,
    built_in: bool,
    cache: Box<[Appearance; CACHED_COUNTS]>,
    above: Appearance,
}

impl Style {
    pub fn new(name: impl Into<String>, thresholds: Vec<Threshold>) -> Self {
        let mut style = Self {
            name: name.into(),
            thresholds,
            built_in: false,
            cache: Box::new([Appearance::default(); CACHED_COUNTS]),
            above: Appearance::default(),
        };
        style.rebuild_cache();
        style
    }

    /// The built-in "Default" style: hidden at 0 stacks, plain otherwise
    pub fn default_style() -> Self {
        let mut style = Self::new(DEFAULT_STYLE_NAME, vec![Threshold::default()]);
        style.built_in = true;
        style
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn thresholds(&self) -> &[Threshold] {
        &self.thresholds
    }

    pub fn is_built_in(&self) -> bool {
        self.built_in
    }

    /// Appearance for a stack count; `None` for negative counts
    pub fn appearance(&self, count: i32) -> Option<&Appearance> {
        match count {
            c if c < 0 => None,
            c if (c as usize) < CACHED_COUNTS => Some(&self.cache[c as usize]),
            _ => Some(&self.above),
        }
    }

    /// Appearance used for counts of 100 and more
    pub fn appearance_above(&self) -> &Appearance {
        &self.above
    }

    /// Re-derive the lookup table from the threshold list.
    fn rebuild_cache(&mut self) {
        self.cache.fill(Appearance::default());

        // Reverse so earlier (higher priority) thresholds are written last
        for t in self.thresholds.iter().rev() {
            let lo = t.min.max(0);
            let hi = t.max.min(CACHED_COUNTS as i32 - 1);
            if lo > hi {
                continue;
            }
            for slot in &mut self.cache[lo as usize..=hi as usize] {
                *slot = t.appearance;
            }
        }

        self.above = self
            .thresholds
            .iter()
            .find(|t| t.max >= CACHED_COUNTS as i32)
            .map(|t| t.appearance)
            .unwrap_or_default();
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Threshold edits (each one rebuilds the cache)
    // ─────────────────────────────────────────────────────────────────────────

    pub fn push_threshold(&mut self, threshold: Threshold) -> usize {
        self.thresholds.push(threshold);
        self.rebuild_cache();
        self.thresholds.len() - 1
    }

    pub fn remove_threshold(&mut self, style_id: usize, index: usize) -> Result<Threshold, ModelError> {
        self.check_threshold(style_id, index)?;
        let removed = self.thresholds.remove(index);
        self.rebuild_cache();
        Ok(removed)
    }

    /// Move a threshold to a new priority position
    pub fn move_threshold(&mut self, style_id: usize, from: usize, to: usize) -> Result<(), ModelError> {
        self.check_threshold(style_id, from)?;
        self.check_threshold(style_id, to)?;
        let t = self.thresholds.remove(from);
        self.thresholds.insert(to, t);
        self.rebuild_cache();
        Ok(())
    }

    pub fn edit_threshold(
        &mut self,
        style_id: usize,
        index: usize,
        edit: impl FnOnce(&mut Threshold),
    ) -> Result<(), ModelError> {
        self.check_threshold(style_id, index)?;
        edit(&mut self.thresholds[index]);
        self.rebuild_cache();
        Ok(())
    }

    pub fn set_thresholds(&mut self, thresholds: Vec<Threshold>) {
        self.thresholds = thresholds;
        self.rebuild_cache();
    }

    fn check_threshold(&self, style_id: usize, index: usize) -> Result<(), ModelError> {
        if index < self.thresholds.len() {
            Ok(())
        } else {
            Err(ModelError::ThresholdOutOfRange {
                style: style_id,
                index,
                len: self.thresholds.len(),
            })
        }
    }
}

impl Index<i32> for Style {
    type Output = Appearance;

    fn index(&self, count: i32) -> &Appearance {
        self.appearance(count).unwrap_or(&TRANSPARENT)
    }
}

impl From<&StyleConfig> for Style {
    fn from(cfg: &StyleConfig) -> Self {
        Style::new(cfg.name.clone(), cfg.thresholds.iter().map(Threshold::from).collect())
    }
}

impl From<&Style> for StyleConfig {
    fn from(style: &Style) -> Self {
        Self {
            name: style.name.clone(),
            thresholds: style.thresholds.iter().map(ThresholdConfig::from).collect(),
        }
    }
}

/// All styles; index 0 is always the built-in default
#[derive(Debug, Clone)]
pub struct StyleSet {
    styles: Vec<Style>,
}

impl Default for StyleSet {
    fn default() -> Self {
        Self::new()
    }
}

impl StyleSet {
    pub fn new() -> Self {
        Self {
            styles: vec![Style::default_style()],
        }
    }

    /// Build from persisted styles, hoisting (or creating) "Default" to index 0
    pub fn from_configs(configs: &[StyleConfig]) -> Self {
        let mut styles: Vec<Style> = configs.iter().map(Style::from).collect();

        let default = match styles.iter().position(|s| s.name == DEFAULT_STYLE_NAME) {
            Some(pos) => {
                let mut s = styles.remove(pos);
                s.built_in = true;
                s
            }
            None => Style::default_style(),
        };
        styles.insert(0, default);

        Self { styles }
    }

    pub fn to_configs(&self) -> Vec<StyleConfig> {
        self.styles.iter().map(StyleConfig::from).collect()
    }

    pub fn styles(&self) -> &[Style] {
        &self.styles
    }

    /// Rename styles repeating an earlier style's name
    pub fn dedupe_names(&mut self) -> Vec<String> {
        crate::names::dedupe_names(self.styles.iter_mut().map(|s| &mut s.name))
    }

    pub fn len(&self) -> usize {
        self.styles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.styles.is_empty()
    }

    pub fn style(&self, id: usize) -> Result<&Style, ModelError> {
        self.styles.get(id).ok_or(ModelError::StyleOutOfRange {
            index: id,
            len: self.styles.len(),
        })
    }

    pub fn style_mut(&mut self, id: usize) -> Result<&mut Style, ModelError> {
        let len = self.styles.len();
        self.styles
            .get_mut(id)
            .ok_or(ModelError::StyleOutOfRange { index: id, len })
    }

    /// Style for rendering; unknown ids fall back to the default style
    pub fn style_or_default(&self, id: usize) -> &Style {
        self.styles.get(id).unwrap_or(&self.styles[0])
    }

    /// Render-time lookup: `(valid, appearance)` semantics collapse to `Option`
    pub fn lookup(&self, id: usize, count: i32) -> Option<&Appearance> {
        self.style_or_default(id).appearance(count)
    }

    pub fn find(&self, name: &str) -> Option<usize> {
        self.styles.iter().position(|s| s.name == name)
    }

    pub fn add(&mut self, style: Style) -> usize {
        self.styles.push(style);
        self.styles.len() - 1
    }

    pub fn rename(&mut self, id: usize, name: impl Into<String>) -> Result<(), ModelError> {
        let style = self.style_mut(id)?;
        if style.built_in {
            return Err(ModelError::BuiltInStyle(style.name.clone()));
        }
        style.name = name.into();
        Ok(())
    }

    /// Remove a style. Items referencing it must be remapped by the caller.
    pub fn remove(&mut self, id: usize) -> Result<Style, ModelError> {
        let style = self.style(id)?;
        if style.built_in {
            return Err(ModelError::BuiltInStyle(style.name.clone()));
        }
        Ok(self.styles.remove(id))
    }

    /// Rebuild every cache (after a bulk load or before a save)
    pub fn rebuild_all(&mut self) {
        for style in &mut self.styles {
            style.rebuild_cache();
        }
    }
}
