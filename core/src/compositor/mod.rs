//! Instance compositor
//!
//! Turns the active grids plus the live stack table into one bounded batch
//! of draw instances per frame.
//!
//! ```text
//!   ActiveGrids ──► origin per grid ──► per item:
//!                                        count = catalog.stacks(item) | fake count
//!                                        appearance = styles[item.style][count]
//!                                        skip hidden zero-count items
//!                                        push GridInstance (dropped when full)
//! ```

mod instance;
mod numbers;

#[cfg(test)]
mod compositor_tests;

use glam::{IVec2, Vec2};

use clarity_types::Appearance;

use crate::catalog::{BuffCatalog, BuffDescription, BuffHandle, ICON_CELL_SIZE};
use crate::grids::{fit_to_area, item_position, resolve_origin, Grid, GridModel, Item, MouseState, DEFAULT_SPACING};
use crate::selection::{ActiveGrids, EditTarget};
use crate::stacks::LiveStacks;
use crate::styles::{effective_glow_color, effective_glow_size, StyleSet};

pub use instance::{GridInstance, InstanceBatch, DEFAULT_CAPACITY};
pub use numbers::{displayed_number, number_uv, MAX_NUMBER, NUMBER_GLYPHS};

/// Consumer of finished batches (a GPU uploader, a software rasterizer, ...)
pub trait RenderSink {
    type Error;

    fn submit(&mut self, batch: &InstanceBatch) -> Result<(), Self::Error>;
}

/// Appearance of analyzer entries with no live stacks
const PROBE_INACTIVE: Appearance = Appearance {
    tint: [1.0, 1.0, 1.0, 0.35],
    border: [0.0; 4],
    border_thickness: 0.0,
    glow: [0.0; 4],
    glow_size: 0.0,
    glow_pulse: [0.0; 2],
};

/// Per-frame inputs that are not part of the models
#[derive(Debug, Clone)]
pub struct FrameInput<'a> {
    pub screen: Vec2,
    pub mouse: MouseState,
    pub time_secs: f32,
    pub active: ActiveGrids<'a>,
    pub edit: EditTarget,
    /// Let edited grids follow the mouse instead of staying centred
    pub test_mouse_mode: bool,
    /// Count shown for the item under edit
    pub fake_count: i32,
    /// Ephemeral item drawn while `edit` is `CreatingItem`
    pub creating_item: Option<&'a Item>,
}

pub struct InstanceCompositor<'a> {
    catalog: &'a BuffCatalog,
    styles: &'a StyleSet,
    grids: &'a GridModel,
    live: &'a LiveStacks,
}

impl<'a> InstanceCompositor<'a> {
    pub fn new(catalog: &'a BuffCatalog, styles: &'a StyleSet, grids: &'a GridModel, live: &'a LiveStacks) -> Self {
        Self {
            catalog,
            styles,
            grids,
            live,
        }
    }

    /// Append this frame's instances to `batch`
    pub fn compose(&self, frame: &FrameInput<'_>, batch: &mut InstanceBatch) {
        match &frame.active {
            ActiveGrids::None => {}
            ActiveGrids::Edit(g) => match self.grids.grid(*g) {
                Ok(grid) => self.compose_grid(grid, Some(*g), frame, batch),
                Err(e) => tracing::debug!(error = %e, "Edited grid no longer exists"),
            },
            ActiveGrids::All => {
                for grid in self.grids.grids() {
                    self.compose_grid(grid, None, frame, batch);
                }
            }
            ActiveGrids::Layout(members) => {
                for g in members.iter() {
                    if let Ok(grid) = self.grids.grid(*g) {
                        self.compose_grid(grid, None, frame, batch);
                    }
                }
            }
            ActiveGrids::Probe(needle) => self.compose_probe(needle, frame, batch),
        }

        if batch.dropped() > 0 {
            tracing::trace!(dropped = batch.dropped(), "Instance batch full");
        }
    }

    fn compose_grid(&self, grid: &Grid, edited: Option<usize>, frame: &FrameInput<'_>, batch: &mut InstanceBatch) {
        let edit_anchor = edited.is_some() && !frame.test_mouse_mode;
        if grid.attached && !edit_anchor && !frame.mouse.is_on_screen(frame.screen) {
            return;
        }

        let origin = resolve_origin(grid, frame.screen, &frame.mouse, edit_anchor);
        for (index, item) in grid.items.iter().enumerate() {
            let editing = edited.is_some_and(|g| frame.edit.is_item(g, index));
            let count = if editing {
                frame.fake_count
            } else {
                self.catalog.stacks(item, self.live)
            };
            let pos = item_position(origin, item.pos, grid.spacing);
            self.emit_item(item, pos, grid.spacing, count, editing, frame, batch);
        }

        if let (Some(g), EditTarget::CreatingItem(c), Some(item)) = (edited, frame.edit, frame.creating_item)
            && g == c
        {
            self.emit_item(item, frame.screen * 0.5, grid.spacing, frame.fake_count, true, frame, batch);
        }
    }

    fn emit_item(
        &self,
        item: &Item,
        pos: Vec2,
        spacing: IVec2,
        count: i32,
        editing: bool,
        frame: &FrameInput<'_>,
        batch: &mut InstanceBatch,
    ) {
        let Some(appearance) = self.styles.lookup(item.style, count) else {
            return;
        };
        if count == 0 && appearance.is_transparent() && !editing {
            return;
        }
        let buff = self.catalog.get(item.buff);
        let dims = fit_to_area(ICON_CELL_SIZE.0, ICON_CELL_SIZE.1, spacing.x as f32);
        batch.push(build_instance(buff, appearance, count, pos, dims, frame.screen, frame.time_secs));
    }

    /// Analyzer view: every matching catalog entry in a centred, roughly
    /// square grid. Inactive entries are drawn dimmed.
    fn compose_probe(&self, needle: &str, frame: &FrameInput<'_>, batch: &mut InstanceBatch) {
        let matches: Vec<(BuffHandle, &BuffDescription)> = self.catalog.filter(needle).collect();
        if matches.is_empty() {
            return;
        }

        let cols = (matches.len() as f32).sqrt().ceil() as i32;
        let rows = (matches.len() as i32 + cols - 1) / cols;
        let origin = frame.screen * 0.5 - (IVec2::new(cols, rows) * DEFAULT_SPACING).as_vec2() * 0.5;
        let dims = fit_to_area(ICON_CELL_SIZE.0, ICON_CELL_SIZE.1, DEFAULT_SPACING.x as f32);

        for (k, (_, buff)) in matches.into_iter().enumerate() {
            let cell = IVec2::new(k as i32 % cols, k as i32 / cols);
            let count = buff.stacks(self.live);
            let appearance = if count > 0 {
                self.styles.lookup(0, count).copied().unwrap_or_else(Appearance::plain)
            } else {
                PROBE_INACTIVE
            };
            let pos = item_position(origin, cell, DEFAULT_SPACING);
            batch.push(build_instance(buff, &appearance, count, pos, dims, frame.screen, frame.time_secs));
        }
    }
}

/// Single-instance batch filling the whole preview surface, used while a
/// style is being edited
pub fn compose_style_preview(
    catalog: &BuffCatalog,
    styles: &StyleSet,
    buff: BuffHandle,
    style: usize,
    count: i32,
    time_secs: f32,
    batch: &mut InstanceBatch,
) {
    let Some(appearance) = styles.lookup(style, count) else {
        return;
    };
    batch.push(build_instance(
        catalog.get(buff),
        appearance,
        count,
        Vec2::ZERO,
        Vec2::ONE,
        Vec2::ONE,
        time_secs,
    ));
}

fn build_instance(
    buff: &BuffDescription,
    appearance: &Appearance,
    count: i32,
    pos: Vec2,
    dims: Vec2,
    screen: Vec2,
    time_secs: f32,
) -> GridInstance {
    let number = buff
        .show_number(count)
        .then(|| number_uv(displayed_number(count, buff.max_stacks)))
        .flatten();
    let pos = pos / screen;
    let dims = dims / screen;

    GridInstance {
        pos_dims: [pos.x, pos.y, dims.x, dims.y],
        uv: buff.icon,
        number_uv: number.unwrap_or_default(),
        tint: appearance.tint,
        border_color: appearance.border,
        glow_color: effective_glow_color(appearance),
        glow_size: effective_glow_size(appearance, time_secs),
        border_thickness: appearance.border_thickness,
        show_number: number.is_some() as u32,
        _pad: 0,
    }
}

