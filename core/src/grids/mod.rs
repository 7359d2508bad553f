//! Grids and items
//!
//! A grid is a spatial arrangement of buff icons. Item positions are cell
//! coordinates; pixels come from the grid's origin and spacing (see
//! [`origin`]).

mod origin;

use glam::{IVec2, Vec2};

use clarity_types::{GridConfig, ItemConfig};

use crate::catalog::{BuffCatalog, BuffHandle};
use crate::error::ModelError;
use crate::styles::StyleSet;

pub use origin::{
    cell_under, fit_to_area, item_position, resolve_origin, MouseButton, MouseState,
};

pub const DEFAULT_SPACING: IVec2 = IVec2::new(64, 64);

/// `mouse_clip_min` value meaning "no clip"
pub const CLIP_UNSET_MIN: IVec2 = IVec2::splat(i32::MAX);
/// `mouse_clip_max` value meaning "no clip"
pub const CLIP_UNSET_MAX: IVec2 = IVec2::splat(i32::MIN);

/// A single placed icon
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Item {
    pub pos: IVec2,
    pub buff: BuffHandle,
    /// Extra buffs counted toward this icon without changing it
    pub additional_buffs: Vec<BuffHandle>,
    pub style: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Grid {
    pub name: String,
    pub spacing: IVec2,
    pub offset: IVec2,
    pub attached: bool,
    pub central_weight: f32,
    pub mouse_clip_min: IVec2,
    pub mouse_clip_max: IVec2,
    pub track_mouse_while_held: bool,
    pub square: bool,
    pub items: Vec<Item>,
}

impl Default for Grid {
    fn default() -> Self {
        Self {
            name: "New Grid".to_string(),
            spacing: DEFAULT_SPACING,
            offset: IVec2::ZERO,
            attached: false,
            central_weight: 0.0,
            mouse_clip_min: CLIP_UNSET_MIN,
            mouse_clip_max: CLIP_UNSET_MAX,
            track_mouse_while_held: true,
            square: true,
            items: Vec::new(),
        }
    }
}

impl Grid {
    pub fn has_mouse_clip(&self) -> bool {
        self.mouse_clip_min.x != i32::MAX
    }

    /// Enable the clip over the whole screen, or reset it to unset
    pub fn set_mouse_clip(&mut self, enabled: bool, screen: Vec2) {
        if enabled {
            self.mouse_clip_min = IVec2::ZERO;
            self.mouse_clip_max = screen.as_ivec2();
        } else {
            self.mouse_clip_min = CLIP_UNSET_MIN;
            self.mouse_clip_max = CLIP_UNSET_MAX;
        }
    }

    /// Set spacing; square grids copy x into y
    pub fn set_spacing(&mut self, spacing: IVec2) {
        self.spacing = spacing;
        if self.square {
            self.spacing.y = self.spacing.x;
        }
    }

    pub fn set_square(&mut self, square: bool) {
        self.square = square;
        if square {
            self.spacing.y = self.spacing.x;
        }
    }

    pub fn set_central_weight(&mut self, weight: f32) {
        self.central_weight = weight.clamp(0.0, 1.0);
    }

    pub fn item(&self, grid_id: usize, index: usize) -> Result<&Item, ModelError> {
        self.items.get(index).ok_or(ModelError::ItemOutOfRange {
            grid: grid_id,
            index,
            len: self.items.len(),
        })
    }

    pub fn item_mut(&mut self, grid_id: usize, index: usize) -> Result<&mut Item, ModelError> {
        let len = self.items.len();
        self.items.get_mut(index).ok_or(ModelError::ItemOutOfRange {
            grid: grid_id,
            index,
            len,
        })
    }

    /// Build a grid from its persisted form. Unknown buffs degrade to the
    /// placeholder and unknown style names to the default style; both are
    /// logged and counted in `report`.
    pub fn from_config(
        cfg: &GridConfig,
        catalog: &BuffCatalog,
        styles: &StyleSet,
        report: &mut LoadReport,
    ) -> Self {
        let (mouse_clip_min, mouse_clip_max) = match cfg.mouse_clip {
            Some((min, max)) => (IVec2::from(min), IVec2::from(max)),
            None => (CLIP_UNSET_MIN, CLIP_UNSET_MAX),
        };

        let mut items = Vec::with_capacity(cfg.items.len());
        for i in &cfg.items {
            let buff = resolve_buff(catalog, i.buff_id, &cfg.name, report);
            let additional_buffs = i
                .additional_buff_ids
                .iter()
                .map(|id| resolve_buff(catalog, *id, &cfg.name, report))
                .collect();
            let style = match styles.find(&i.style) {
                Some(style) => style,
                None => {
                    tracing::warn!(style = %i.style, grid = %cfg.name, "Unknown style in saved item, using default");
                    report.missing_styles.push(i.style.clone());
                    0
                }
            };
            items.push(Item {
                pos: IVec2::from(i.pos),
                buff,
                additional_buffs,
                style,
            });
        }

        let mut grid = Self {
            name: cfg.name.clone(),
            spacing: IVec2::from(cfg.spacing),
            offset: IVec2::from(cfg.offset),
            attached: cfg.attached,
            central_weight: cfg.central_weight.clamp(0.0, 1.0),
            mouse_clip_min,
            mouse_clip_max,
            track_mouse_while_held: cfg.track_mouse_while_held,
            square: cfg.square,
            items,
        };
        grid.set_square(grid.square);
        grid
    }

    pub fn to_config(&self, catalog: &BuffCatalog, styles: &StyleSet) -> GridConfig {
        GridConfig {
            name: self.name.clone(),
            spacing: self.spacing.to_array(),
            offset: self.offset.to_array(),
            attached: self.attached,
            central_weight: self.central_weight,
            mouse_clip: self
                .has_mouse_clip()
                .then(|| (self.mouse_clip_min.to_array(), self.mouse_clip_max.to_array())),
            track_mouse_while_held: self.track_mouse_while_held,
            square: self.square,
            items: self
                .items
                .iter()
                .map(|i| ItemConfig {
                    pos: i.pos.to_array(),
                    buff_id: catalog.get(i.buff).id,
                    additional_buff_ids: i.additional_buffs.iter().map(|b| catalog.get(*b).id).collect(),
                    style: styles.style_or_default(i.style).name().to_string(),
                })
                .collect(),
        }
    }
}

fn resolve_buff(catalog: &BuffCatalog, id: u32, grid: &str, report: &mut LoadReport) -> BuffHandle {
    match catalog.resolve(id) {
        Some(handle) => handle,
        None => {
            tracing::warn!(buff_id = id, grid, "Unknown buff id in saved grid, using placeholder");
            report.unknown_buffs.push(id);
            BuffHandle::UNKNOWN
        }
    }
}

/// Degradations encountered while loading a document
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LoadReport {
    pub unknown_buffs: Vec<u32>,
    pub missing_styles: Vec<String>,
    pub missing_grids: Vec<String>,
    /// Repeated grid, style or layout names that were renamed apart
    pub duplicate_names: Vec<String>,
}

impl LoadReport {
    pub fn is_clean(&self) -> bool {
        self.unknown_buffs.is_empty()
            && self.missing_styles.is_empty()
            && self.missing_grids.is_empty()
            && self.duplicate_names.is_empty()
    }
}

/// Ordered collection of grids
#[derive(Debug, Clone, Default)]
pub struct GridModel {
    grids: Vec<Grid>,
}

impl GridModel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_grids(grids: Vec<Grid>) -> Self {
        Self { grids }
    }

    pub fn grids(&self) -> &[Grid] {
        &self.grids
    }

    /// Rename grids repeating an earlier grid's name
    pub fn dedupe_names(&mut self) -> Vec<String> {
        crate::names::dedupe_names(self.grids.iter_mut().map(|g| &mut g.name))
    }

    pub fn len(&self) -> usize {
        self.grids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.grids.is_empty()
    }

    pub fn grid(&self, index: usize) -> Result<&Grid, ModelError> {
        self.grids.get(index).ok_or(ModelError::GridOutOfRange {
            index,
            len: self.grids.len(),
        })
    }

    pub fn grid_mut(&mut self, index: usize) -> Result<&mut Grid, ModelError> {
        let len = self.grids.len();
        self.grids
            .get_mut(index)
            .ok_or(ModelError::GridOutOfRange { index, len })
    }

    pub fn item(&self, grid: usize, item: usize) -> Result<&Item, ModelError> {
        self.grid(grid)?.item(grid, item)
    }

    pub fn item_mut(&mut self, grid: usize, item: usize) -> Result<&mut Item, ModelError> {
        self.grid_mut(grid)?.item_mut(grid, item)
    }

    pub fn find(&self, name: &str) -> Option<usize> {
        self.grids.iter().position(|g| g.name == name)
    }

    pub fn add_grid(&mut self, grid: Grid) -> usize {
        self.grids.push(grid);
        self.grids.len() - 1
    }

    /// Remove a grid. Layout references must be renumbered by the caller.
    pub fn remove_grid(&mut self, index: usize) -> Result<Grid, ModelError> {
        self.grid(index)?;
        Ok(self.grids.remove(index))
    }

    pub fn add_item(&mut self, grid: usize, item: Item) -> Result<usize, ModelError> {
        let g = self.grid_mut(grid)?;
        g.items.push(item);
        Ok(g.items.len() - 1)
    }

    pub fn remove_item(&mut self, grid: usize, item: usize) -> Result<Item, ModelError> {
        let g = self.grid_mut(grid)?;
        g.item(grid, item)?;
        Ok(g.items.remove(item))
    }

    /// Change an item's draw order within its grid
    pub fn move_item(&mut self, grid: usize, from: usize, to: usize) -> Result<(), ModelError> {
        let g = self.grid_mut(grid)?;
        g.item(grid, from)?;
        g.item(grid, to)?;
        let item = g.items.remove(from);
        g.items.insert(to, item);
        Ok(())
    }

    /// Remap item styles after style `removed` was deleted: its users fall
    /// back to the default style, later ids shift down by one.
    pub fn style_removed(&mut self, removed: usize) {
        for item in self.grids.iter_mut().flat_map(|g| g.items.iter_mut()) {
            if item.style == removed {
                item.style = 0;
            } else if item.style > removed {
                item.style -= 1;
            }
        }
    }

    pub fn iter_items(&self) -> impl Iterator<Item = (usize, usize, &Item)> {
        self.grids
            .iter()
            .enumerate()
            .flat_map(|(g, grid)| grid.items.iter().enumerate().map(move |(i, item)| (g, i, item)))
    }
}
