//! Shared configuration types for Clarity
//!
//! These are the serde shapes persisted by the overlay and consumed by the
//! core crate. They carry only logical data; all derived state (appearance
//! caches, resolved buff handles, grid indices) lives in `clarity-core`.

pub mod document;
pub mod options;

pub use document::{
    Appearance, GridConfig, GridRef, ItemConfig, LayoutConfig, OverlayDocument, StyleConfig,
    ThresholdConfig, DEFAULT_STYLE_NAME,
};
pub use options::GeneralOptions;

/// RGBA color with components in `0.0..=1.0`
pub type Rgba = [f32; 4];
