//! Per-frame grid selection
//!
//! Exactly one rule decides which grids draw in a frame, checked in order:
//!
//! 1. an edit target that names a grid shows only that grid
//! 2. the ignore-layout override shows every grid
//! 3. a non-blank analyzer filter shows the matching catalog entries in a
//!    probe grid
//! 4. otherwise, outside competitive mode, the current layout applies,
//!    gated by its combat-only flag; with no layouts defined at all every
//!    grid shows

use std::collections::BTreeSet;

use crate::layouts::LayoutSet;

/// What the editing surface is currently working on
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum EditTarget {
    #[default]
    None,
    CreatingGrid,
    Grid(usize),
    Item { grid: usize, item: usize },
    /// The ephemeral item being set up in `grid` before it is committed
    CreatingItem(usize),
}

impl EditTarget {
    /// Grid under edit focus, if any
    pub fn grid(&self) -> Option<usize> {
        match *self {
            EditTarget::Grid(g) | EditTarget::Item { grid: g, .. } | EditTarget::CreatingItem(g) => Some(g),
            EditTarget::None | EditTarget::CreatingGrid => None,
        }
    }

    pub fn is_editing(&self) -> bool {
        !matches!(self, EditTarget::None)
    }

    pub fn is_item(&self, grid: usize, item: usize) -> bool {
        *self == EditTarget::Item { grid, item }
    }

    /// Target after grid `removed` was deleted
    pub fn after_grid_removed(self, removed: usize) -> Self {
        let shift = |g: usize| if g > removed { g - 1 } else { g };
        match self {
            EditTarget::Grid(g) | EditTarget::CreatingItem(g) | EditTarget::Item { grid: g, .. } if g == removed => {
                EditTarget::None
            }
            EditTarget::Grid(g) => EditTarget::Grid(shift(g)),
            EditTarget::CreatingItem(g) => EditTarget::CreatingItem(shift(g)),
            EditTarget::Item { grid, item } => EditTarget::Item {
                grid: shift(grid),
                item,
            },
            other => other,
        }
    }

    /// Target after item `removed` of `grid` was deleted. Editing the removed
    /// item falls back to editing its grid.
    pub fn after_item_removed(self, grid: usize, removed: usize) -> Self {
        match self {
            EditTarget::Item { grid: g, item } if g == grid && item == removed => EditTarget::Grid(g),
            EditTarget::Item { grid: g, item } if g == grid && item > removed => EditTarget::Item {
                grid: g,
                item: item - 1,
            },
            other => other,
        }
    }

    /// Target after item `from` of `grid` was moved to position `to`.
    /// Items between the two positions shift by one toward `from`.
    pub fn after_item_moved(self, grid: usize, from: usize, to: usize) -> Self {
        let EditTarget::Item { grid: g, item } = self else {
            return self;
        };
        if g != grid {
            return self;
        }
        let item = if item == from {
            to
        } else if from < to && (from + 1..=to).contains(&item) {
            item - 1
        } else if to < from && (to..from).contains(&item) {
            item + 1
        } else {
            item
        };
        EditTarget::Item { grid: g, item }
    }
}

/// Game-side flags sampled once per frame
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GameState {
    pub in_combat: bool,
    pub competitive: bool,
}

/// Inputs to grid selection besides the models themselves
#[derive(Debug, Clone, Default)]
pub struct SelectionContext {
    pub game: GameState,
    /// Show every grid regardless of the current layout
    pub ignore_layout: bool,
    /// Buff analyzer filter; blank means off
    pub analyzer_filter: String,
}

impl SelectionContext {
    pub fn analyzer_filter(&self) -> Option<&str> {
        let needle = self.analyzer_filter.trim();
        (!needle.is_empty()).then_some(needle)
    }
}

/// Grids to draw this frame
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActiveGrids<'a> {
    None,
    Edit(usize),
    All,
    Probe(&'a str),
    Layout(&'a BTreeSet<usize>),
}

pub fn resolve_active<'a>(edit: &EditTarget, ctx: &'a SelectionContext, layouts: &'a LayoutSet) -> ActiveGrids<'a> {
    if edit.is_editing() {
        return match edit.grid() {
            Some(g) => ActiveGrids::Edit(g),
            None => ActiveGrids::None,
        };
    }

    if ctx.ignore_layout {
        return ActiveGrids::All;
    }

    if let Some(needle) = ctx.analyzer_filter() {
        return ActiveGrids::Probe(needle);
    }

    match layouts.current() {
        Some(layout) => {
            if ctx.game.competitive || (layout.combat_only && !ctx.game.in_combat) {
                ActiveGrids::None
            } else {
                ActiveGrids::Layout(&layout.grids)
            }
        }
        None if layouts.is_empty() && !ctx.game.competitive => ActiveGrids::All,
        None => ActiveGrids::None,
    }
}
