//! Overlay state
//!
//! [`OverlayState`] owns every model and is the only place they change.
//! The host feeds it input (stack tables, mouse, game flags), the editing
//! surface drives it through the command methods, and once per frame it
//! composes an instance batch and flushes pending saves.
//!
//! Every successful edit marks the document dirty; [`OverlayState::maybe_save`]
//! writes it once the debounce delay has passed.

use std::sync::Arc;
use std::time::{Duration, Instant};

use glam::{IVec2, Vec2};

use clarity_types::GeneralOptions;

use crate::catalog::{BuffCatalog, BuffHandle};
use crate::compositor::{
    compose_style_preview, FrameInput, InstanceBatch, InstanceCompositor, RenderSink,
};
use crate::error::{ModelError, StoreError};
use crate::grids::{cell_under, Grid, GridModel, Item, LoadReport, MouseButton, MouseState};
use crate::layouts::{Layout, LayoutSet};
use crate::names::unique_name;
use crate::persistence::{Models, PersistenceStore, SaveDebounce};
use crate::selection::{resolve_active, EditTarget, GameState, SelectionContext};
use crate::stacks::{LiveStacks, StackedBuff};
use crate::styles::{Style, StyleSet, Threshold};


pub struct OverlayState<S: PersistenceStore> {
    catalog: Arc<BuffCatalog>,
    models: Models,
    live: Arc<LiveStacks>,
    store: S,
    debounce: SaveDebounce,
    options: GeneralOptions,

    // Editing surface
    edit: EditTarget,
    creating_item: Item,
    fake_count: i32,
    test_mouse_mode: bool,
    settings_visible: bool,

    // Per-frame input
    selection: SelectionContext,
    mouse: MouseState,
    screen: Vec2,

    batch: InstanceBatch,
}

impl<S: PersistenceStore> OverlayState<S> {
    /// Empty state that saves into `store`
    pub fn new(catalog: Arc<BuffCatalog>, store: S, options: GeneralOptions) -> Self {
        Self::with_models(catalog, Models::default(), store, options)
    }

    /// Load the document from `store`; dangling references are degraded and
    /// reported, only an unreadable store is an error
    pub fn load(catalog: Arc<BuffCatalog>, store: S, options: GeneralOptions) -> Result<(Self, LoadReport), StoreError> {
        let document = store.load()?;
        let (models, report) = Models::from_document(&document, &catalog, options.remember_layout);
        Ok((Self::with_models(catalog, models, store, options), report))
    }

    fn with_models(catalog: Arc<BuffCatalog>, models: Models, store: S, options: GeneralOptions) -> Self {
        Self {
            catalog,
            models,
            live: Arc::new(LiveStacks::new()),
            store,
            debounce: SaveDebounce::new(Duration::from_millis(options.save_delay_ms)),
            batch: InstanceBatch::with_capacity(options.instance_capacity),
            options,
            edit: EditTarget::None,
            creating_item: Item::default(),
            fake_count: 1,
            test_mouse_mode: false,
            settings_visible: false,
            selection: SelectionContext::default(),
            mouse: MouseState::default(),
            screen: Vec2::new(1920.0, 1080.0),
        }
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Accessors
    // ─────────────────────────────────────────────────────────────────────────

    pub fn catalog(&self) -> &BuffCatalog {
        &self.catalog
    }

    pub fn grids(&self) -> &GridModel {
        &self.models.grids
    }

    pub fn styles(&self) -> &StyleSet {
        &self.models.styles
    }

    pub fn layouts(&self) -> &LayoutSet {
        &self.models.layouts
    }

    pub fn options(&self) -> &GeneralOptions {
        &self.options
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn edit_target(&self) -> EditTarget {
        self.edit
    }

    pub fn live_stacks(&self) -> &LiveStacks {
        &self.live
    }

    pub fn is_dirty(&self) -> bool {
        self.debounce.is_dirty()
    }

    pub fn mouse(&self) -> &MouseState {
        &self.mouse
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Host input
    // ─────────────────────────────────────────────────────────────────────────

    /// Replace the live table from a terminated host array
    pub fn update_stacks(&mut self, entries: &[StackedBuff]) {
        self.live = Arc::new(LiveStacks::from_entries(entries));
    }

    /// Adopt a snapshot published through [`crate::stacks::SharedStacks`]
    pub fn set_stacks(&mut self, stacks: Arc<LiveStacks>) {
        self.live = stacks;
    }

    pub fn set_screen_size(&mut self, screen: Vec2) {
        self.screen = screen;
    }

    pub fn mouse_moved(&mut self, position: Vec2) {
        self.mouse.moved(position);
    }

    pub fn mouse_button(&mut self, button: MouseButton, down: bool) {
        self.mouse.button(button, down);
    }

    pub fn set_game_state(&mut self, game: GameState) {
        self.selection.game = game;
    }

    /// Show every grid regardless of the selected layout
    pub fn set_ignore_layout(&mut self, ignore: bool) {
        self.selection.ignore_layout = ignore;
    }

    pub fn set_analyzer_filter(&mut self, filter: impl Into<String>) {
        self.selection.analyzer_filter = filter.into();
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Edit focus
    // ─────────────────────────────────────────────────────────────────────────

    /// Closing the settings ends any edit in progress
    pub fn set_settings_visible(&mut self, visible: bool) {
        self.settings_visible = visible;
        if !visible {
            self.edit = EditTarget::None;
            self.test_mouse_mode = false;
        }
    }

    pub fn settings_visible(&self) -> bool {
        self.settings_visible
    }

    pub fn select(&mut self, target: EditTarget) -> Result<(), ModelError> {
        match target {
            EditTarget::None | EditTarget::CreatingGrid => {}
            EditTarget::Grid(g) => {
                self.models.grids.grid(g)?;
            }
            EditTarget::Item { grid, item } => {
                self.models.grids.item(grid, item)?;
            }
            EditTarget::CreatingItem(g) => {
                self.models.grids.grid(g)?;
                self.creating_item = Item::default();
            }
        }
        self.edit = target;
        Ok(())
    }

    /// Count displayed for the item under edit
    pub fn set_fake_count(&mut self, count: i32) {
        self.fake_count = count.max(0);
    }

    /// Let the edited grid follow the mouse like it would in play
    pub fn set_test_mouse_mode(&mut self, enabled: bool) {
        self.test_mouse_mode = enabled;
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Grid commands
    // ─────────────────────────────────────────────────────────────────────────

    /// Add a grid with default settings and focus it. A taken name gets a
    /// numeric suffix.
    pub fn create_grid(&mut self, name: impl Into<String>) -> usize {
        let name = unique_name(&name.into(), self.models.grids.grids().iter().map(|g| g.name.as_str()));
        let index = self.models.grids.add_grid(Grid {
            name,
            ..Grid::default()
        });
        self.edit = EditTarget::Grid(index);
        self.debounce.mark_dirty();
        index
    }

    /// Remove a grid, renumbering layout membership and the edit target
    pub fn delete_grid(&mut self, index: usize) -> Result<Grid, ModelError> {
        let removed = self.models.grids.remove_grid(index)?;
        self.models.layouts.grid_removed(index);
        self.edit = self.edit.after_grid_removed(index);
        self.debounce.mark_dirty();
        tracing::debug!(grid = %removed.name, index, "Deleted grid");
        Ok(removed)
    }

    pub fn rename_grid(&mut self, index: usize, name: impl Into<String>) -> Result<(), ModelError> {
        let others = self.models.grids.grids().iter().enumerate().filter(|(i, _)| *i != index);
        let name = unique_name(&name.into(), others.map(|(_, g)| g.name.as_str()));
        self.edit_grid(index, |g| g.name = name)
    }

    pub fn set_grid_spacing(&mut self, index: usize, spacing: IVec2) -> Result<(), ModelError> {
        self.edit_grid(index, |g| g.set_spacing(spacing.max(IVec2::ONE)))
    }

    pub fn set_grid_square(&mut self, index: usize, square: bool) -> Result<(), ModelError> {
        self.edit_grid(index, |g| g.set_square(square))
    }

    /// Enabling the clip covers the current screen
    pub fn set_grid_mouse_clip(&mut self, index: usize, enabled: bool) -> Result<(), ModelError> {
        let screen = self.screen;
        self.edit_grid(index, |g| g.set_mouse_clip(enabled, screen))
    }

    /// Any other grid property (attachment, offset, central weight, ...)
    pub fn edit_grid(&mut self, index: usize, edit: impl FnOnce(&mut Grid)) -> Result<(), ModelError> {
        let grid = self.models.grids.grid_mut(index)?;
        edit(grid);
        grid.central_weight = grid.central_weight.clamp(0.0, 1.0);
        self.debounce.mark_dirty();
        Ok(())
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Item commands
    // ─────────────────────────────────────────────────────────────────────────

    /// The ephemeral item, while one is being created
    pub fn creating_item_mut(&mut self) -> Result<&mut Item, ModelError> {
        match self.edit {
            EditTarget::CreatingItem(_) => Ok(&mut self.creating_item),
            _ => Err(ModelError::NothingEdited),
        }
    }

    /// Move the edited item (or the one being created) to the cell under
    /// the cursor
    pub fn place_edited_item_at_mouse(&mut self) -> Result<IVec2, ModelError> {
        let (grid, item) = match self.edit {
            EditTarget::Item { grid, item } => (grid, Some(item)),
            EditTarget::CreatingItem(grid) => (grid, None),
            _ => return Err(ModelError::NothingEdited),
        };
        let spacing = self.models.grids.grid(grid)?.spacing;
        let cell = cell_under(self.mouse.position, self.screen, spacing);
        match item {
            Some(i) => {
                self.models.grids.item_mut(grid, i)?.pos = cell;
                self.debounce.mark_dirty();
            }
            None => self.creating_item.pos = cell,
        }
        Ok(cell)
    }

    /// Turn the ephemeral item into a real one and focus it
    pub fn commit_creating_item(&mut self) -> Result<usize, ModelError> {
        let EditTarget::CreatingItem(grid) = self.edit else {
            return Err(ModelError::NothingEdited);
        };
        let item = std::mem::take(&mut self.creating_item);
        let index = self.models.grids.add_item(grid, item)?;
        self.edit = EditTarget::Item { grid, item: index };
        self.debounce.mark_dirty();
        Ok(index)
    }

    pub fn delete_item(&mut self, grid: usize, item: usize) -> Result<Item, ModelError> {
        let removed = self.models.grids.remove_item(grid, item)?;
        self.edit = self.edit.after_item_removed(grid, item);
        self.debounce.mark_dirty();
        Ok(removed)
    }

    /// Change draw order inside a grid
    pub fn move_item(&mut self, grid: usize, from: usize, to: usize) -> Result<(), ModelError> {
        self.models.grids.move_item(grid, from, to)?;
        self.edit = self.edit.after_item_moved(grid, from, to);
        self.debounce.mark_dirty();
        Ok(())
    }

    pub fn set_item_buff(&mut self, grid: usize, item: usize, buff: BuffHandle) -> Result<(), ModelError> {
        self.edit_item(grid, item, |i| i.buff = buff)
    }

    pub fn set_item_style(&mut self, grid: usize, item: usize, style: usize) -> Result<(), ModelError> {
        self.models.styles.style(style)?;
        self.edit_item(grid, item, |i| i.style = style)
    }

    pub fn edit_item(&mut self, grid: usize, item: usize, edit: impl FnOnce(&mut Item)) -> Result<(), ModelError> {
        edit(self.models.grids.item_mut(grid, item)?);
        self.debounce.mark_dirty();
        Ok(())
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Style commands
    // ─────────────────────────────────────────────────────────────────────────

    /// New style with a single plain threshold
    pub fn create_style(&mut self, name: impl Into<String>) -> usize {
        let name = unique_name(&name.into(), self.models.styles.styles().iter().map(|s| s.name()));
        self.debounce.mark_dirty();
        self.models
            .styles
            .add(Style::new(name, vec![Threshold::default()]))
    }

    pub fn rename_style(&mut self, id: usize, name: impl Into<String>) -> Result<(), ModelError> {
        let others = self.models.styles.styles().iter().enumerate().filter(|(i, _)| *i != id);
        let name = unique_name(&name.into(), others.map(|(_, s)| s.name()));
        self.models.styles.rename(id, name)?;
        self.debounce.mark_dirty();
        Ok(())
    }

    /// Remove a style; its items fall back to the default style
    pub fn delete_style(&mut self, id: usize) -> Result<Style, ModelError> {
        let removed = self.models.styles.remove(id)?;
        self.models.grids.style_removed(id);
        if self.creating_item.style == id {
            self.creating_item.style = 0;
        } else if self.creating_item.style > id {
            self.creating_item.style -= 1;
        }
        self.debounce.mark_dirty();
        Ok(removed)
    }

    pub fn add_threshold(&mut self, style: usize, threshold: Threshold) -> Result<usize, ModelError> {
        let index = self.models.styles.style_mut(style)?.push_threshold(threshold);
        self.debounce.mark_dirty();
        Ok(index)
    }

    pub fn remove_threshold(&mut self, style: usize, index: usize) -> Result<Threshold, ModelError> {
        let removed = self.models.styles.style_mut(style)?.remove_threshold(style, index)?;
        self.debounce.mark_dirty();
        Ok(removed)
    }

    pub fn move_threshold(&mut self, style: usize, from: usize, to: usize) -> Result<(), ModelError> {
        self.models.styles.style_mut(style)?.move_threshold(style, from, to)?;
        self.debounce.mark_dirty();
        Ok(())
    }

    pub fn edit_threshold(
        &mut self,
        style: usize,
        index: usize,
        edit: impl FnOnce(&mut Threshold),
    ) -> Result<(), ModelError> {
        self.models
            .styles
            .style_mut(style)?
            .edit_threshold(style, index, edit)?;
        self.debounce.mark_dirty();
        Ok(())
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Layout commands
    // ─────────────────────────────────────────────────────────────────────────

    pub fn create_layout(&mut self, name: impl Into<String>) -> usize {
        let name = unique_name(&name.into(), self.models.layouts.layouts().iter().map(|l| l.name.as_str()));
        self.debounce.mark_dirty();
        self.models.layouts.add(Layout::new(name))
    }

    pub fn delete_layout(&mut self, index: usize) -> Result<Layout, ModelError> {
        let removed = self.models.layouts.remove(index)?;
        self.debounce.mark_dirty();
        Ok(removed)
    }

    pub fn rename_layout(&mut self, index: usize, name: impl Into<String>) -> Result<(), ModelError> {
        let others = self.models.layouts.layouts().iter().enumerate().filter(|(i, _)| *i != index);
        let name = unique_name(&name.into(), others.map(|(_, l)| l.name.as_str()));
        self.models.layouts.rename(index, name)?;
        self.debounce.mark_dirty();
        Ok(())
    }

    pub fn set_layout_combat_only(&mut self, index: usize, combat_only: bool) -> Result<(), ModelError> {
        self.models.layouts.set_combat_only(index, combat_only)?;
        self.debounce.mark_dirty();
        Ok(())
    }

    pub fn set_layout_grid(&mut self, layout: usize, grid: usize, member: bool) -> Result<(), ModelError> {
        self.models.grids.grid(grid)?;
        self.models.layouts.set_grid_membership(layout, grid, member)?;
        self.debounce.mark_dirty();
        Ok(())
    }

    pub fn select_layout(&mut self, index: Option<usize>) -> Result<(), ModelError> {
        self.models.layouts.select(index)?;
        self.layout_selection_changed();
        Ok(())
    }

    pub fn next_layout(&mut self) {
        self.models.layouts.select_next();
        self.layout_selection_changed();
    }

    pub fn prev_layout(&mut self) {
        self.models.layouts.select_prev();
        self.layout_selection_changed();
    }

    fn layout_selection_changed(&mut self) {
        tracing::debug!(layout = ?self.models.layouts.current().map(|l| &l.name), "Layout selected");
        if self.options.remember_layout {
            self.debounce.mark_dirty();
        }
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Frame
    // ─────────────────────────────────────────────────────────────────────────

    /// Compose this frame's instances
    pub fn frame(&mut self, time_secs: f32) -> &InstanceBatch {
        self.batch.clear();

        let input = FrameInput {
            screen: self.screen,
            mouse: self.mouse,
            time_secs,
            active: resolve_active(&self.edit, &self.selection, &self.models.layouts),
            edit: self.edit,
            test_mouse_mode: self.test_mouse_mode,
            fake_count: self.fake_count,
            creating_item: matches!(self.edit, EditTarget::CreatingItem(_)).then_some(&self.creating_item),
        };
        InstanceCompositor::new(&self.catalog, &self.models.styles, &self.models.grids, &self.live)
            .compose(&input, &mut self.batch);

        &self.batch
    }

    /// Compose a frame and hand it to `sink`
    pub fn render<R: RenderSink>(&mut self, sink: &mut R, time_secs: f32) -> Result<(), R::Error> {
        self.frame(time_secs);
        sink.submit(&self.batch)
    }

    /// Single-instance preview of `style` applied to `buff`
    pub fn style_preview(&self, buff: BuffHandle, style: usize, time_secs: f32) -> InstanceBatch {
        let mut batch = InstanceBatch::with_capacity(1);
        compose_style_preview(
            &self.catalog,
            &self.models.styles,
            buff,
            style,
            self.fake_count,
            time_secs,
            &mut batch,
        );
        batch
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Persistence
    // ─────────────────────────────────────────────────────────────────────────

    /// Save if dirty and the debounce delay has passed. Returns whether a
    /// write happened.
    pub fn maybe_save(&mut self, now: Instant) -> Result<bool, StoreError> {
        if !self.debounce.is_due(now) {
            return Ok(false);
        }
        self.save_now(now)?;
        Ok(true)
    }

    /// Write immediately, regardless of the debounce
    pub fn save_now(&mut self, now: Instant) -> Result<(), StoreError> {
        let document = self.models.to_document(&self.catalog);
        self.store.save(&document)?;
        self.debounce.mark_saved(now);
        Ok(())
    }
}
