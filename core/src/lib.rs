//! Clarity core
//!
//! Buff resolution and instance composition for the Clarity overlay: the
//! buff catalog, styles and their appearance caches, grids, layouts, the
//! per-frame selection rules, the compositor, and persistence.

pub mod catalog;
pub mod compositor;
pub mod error;
pub mod grids;
pub mod layouts;
pub mod names;
pub mod persistence;
pub mod selection;
pub mod stacks;
pub mod state;
pub mod styles;

// Re-exports for convenience
pub use catalog::{builtin_catalog, BuffCatalog, BuffDescription, BuffHandle, CatalogBuilder, INVALID_ID};
pub use compositor::{GridInstance, InstanceBatch, InstanceCompositor, RenderSink};
pub use error::{ModelError, StoreError};
pub use grids::{Grid, GridModel, Item, LoadReport, MouseButton, MouseState};
pub use layouts::{Layout, LayoutSet};
pub use persistence::{DocumentStore, MemoryStore, Models, PersistenceStore, SaveDebounce};
pub use selection::{ActiveGrids, EditTarget, GameState, SelectionContext};
pub use stacks::{LiveStacks, SharedStacks, StackedBuff};
pub use state::OverlayState;
pub use styles::{Style, StyleSet, Threshold};
