//! Layouts
//!
//! A layout is a named subset of grids, optionally shown only in combat.
//! At most one layout is current. Grid membership is stored as grid indices,
//! so deleting a grid must renumber every layout through
//! [`LayoutSet::grid_removed`].

use std::collections::BTreeSet;

use clarity_types::{GridRef, LayoutConfig};

use crate::error::ModelError;
use crate::grids::{GridModel, LoadReport};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Layout {
    pub name: String,
    pub grids: BTreeSet<usize>,
    pub combat_only: bool,
}

impl Default for Layout {
    fn default() -> Self {
        Self {
            name: "New Layout".to_string(),
            grids: BTreeSet::new(),
            combat_only: false,
        }
    }
}

impl Layout {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Resolve a persisted layout against the loaded grids. Names that no
    /// longer exist and out-of-range legacy indices are dropped.
    pub fn from_config(cfg: &LayoutConfig, grids: &GridModel, report: &mut LoadReport) -> Self {
        let mut members = BTreeSet::new();
        for r in &cfg.grids {
            let resolved = match r {
                GridRef::Name(name) => grids.find(name),
                GridRef::Index(i) => (*i < grids.len()).then_some(*i),
            };
            match resolved {
                Some(index) => {
                    members.insert(index);
                }
                None => {
                    let label = match r {
                        GridRef::Name(name) => name.clone(),
                        GridRef::Index(i) => format!("#{i}"),
                    };
                    tracing::warn!(layout = %cfg.name, grid = %label, "Layout references a missing grid, dropping it");
                    report.missing_grids.push(label);
                }
            }
        }

        Self {
            name: cfg.name.clone(),
            grids: members,
            combat_only: cfg.combat_only,
        }
    }

    pub fn to_config(&self, grids: &GridModel) -> LayoutConfig {
        LayoutConfig {
            name: self.name.clone(),
            grids: self
                .grids
                .iter()
                .filter_map(|i| grids.grids().get(*i))
                .map(|g| GridRef::Name(g.name.clone()))
                .collect(),
            combat_only: self.combat_only,
        }
    }
}

/// All layouts plus the current selection
#[derive(Debug, Clone, Default)]
pub struct LayoutSet {
    layouts: Vec<Layout>,
    current: Option<usize>,
}

impl LayoutSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_layouts(layouts: Vec<Layout>) -> Self {
        Self {
            layouts,
            current: None,
        }
    }

    pub fn layouts(&self) -> &[Layout] {
        &self.layouts
    }

    /// Rename layouts repeating an earlier layout's name
    pub fn dedupe_names(&mut self) -> Vec<String> {
        crate::names::dedupe_names(self.layouts.iter_mut().map(|l| &mut l.name))
    }

    pub fn len(&self) -> usize {
        self.layouts.len()
    }

    /// No layouts defined at all. Normal mode then shows every grid.
    pub fn is_empty(&self) -> bool {
        self.layouts.is_empty()
    }

    pub fn layout(&self, index: usize) -> Result<&Layout, ModelError> {
        self.layouts.get(index).ok_or(ModelError::LayoutOutOfRange {
            index,
            len: self.layouts.len(),
        })
    }

    fn layout_mut(&mut self, index: usize) -> Result<&mut Layout, ModelError> {
        let len = self.layouts.len();
        self.layouts
            .get_mut(index)
            .ok_or(ModelError::LayoutOutOfRange { index, len })
    }

    pub fn current_index(&self) -> Option<usize> {
        self.current
    }

    pub fn current(&self) -> Option<&Layout> {
        self.current.and_then(|i| self.layouts.get(i))
    }

    pub fn find(&self, name: &str) -> Option<usize> {
        self.layouts.iter().position(|l| l.name == name)
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Selection
    // ─────────────────────────────────────────────────────────────────────────

    pub fn select(&mut self, index: Option<usize>) -> Result<(), ModelError> {
        if let Some(i) = index {
            self.layout(i)?;
        }
        self.current = index;
        Ok(())
    }

    /// Cycle forward; from "none" this selects the first layout
    pub fn select_next(&mut self) {
        if self.layouts.is_empty() {
            return;
        }
        self.current = Some(match self.current {
            Some(i) => (i + 1) % self.layouts.len(),
            None => 0,
        });
    }

    /// Cycle backward; from "none" this selects the last layout
    pub fn select_prev(&mut self) {
        if self.layouts.is_empty() {
            return;
        }
        let n = self.layouts.len();
        self.current = Some(match self.current {
            Some(i) => (i + n - 1) % n,
            None => n - 1,
        });
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Edits
    // ─────────────────────────────────────────────────────────────────────────

    pub fn add(&mut self, layout: Layout) -> usize {
        self.layouts.push(layout);
        self.layouts.len() - 1
    }

    pub fn remove(&mut self, index: usize) -> Result<Layout, ModelError> {
        self.layout(index)?;
        let removed = self.layouts.remove(index);
        self.current = match self.current {
            Some(c) if c == index => None,
            Some(c) if c > index => Some(c - 1),
            other => other,
        };
        Ok(removed)
    }

    pub fn rename(&mut self, index: usize, name: impl Into<String>) -> Result<(), ModelError> {
        self.layout_mut(index)?.name = name.into();
        Ok(())
    }

    pub fn set_combat_only(&mut self, index: usize, combat_only: bool) -> Result<(), ModelError> {
        self.layout_mut(index)?.combat_only = combat_only;
        Ok(())
    }

    pub fn set_grid_membership(&mut self, index: usize, grid: usize, member: bool) -> Result<(), ModelError> {
        let layout = self.layout_mut(index)?;
        if member {
            layout.grids.insert(grid);
        } else {
            layout.grids.remove(&grid);
        }
        Ok(())
    }

    /// Renumber after grid `removed` was deleted: drop it everywhere and
    /// shift every higher index down by one.
    pub fn grid_removed(&mut self, removed: usize) {
        for layout in &mut self.layouts {
            layout.grids = layout
                .grids
                .iter()
                .filter(|g| **g != removed)
                .map(|g| if *g > removed { g - 1 } else { *g })
                .collect();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grids::Grid;

    fn layout(name: &str, grids: &[usize]) -> Layout {
        Layout {
            name: name.to_string(),
            grids: grids.iter().copied().collect(),
            combat_only: false,
        }
    }

    #[test]
    fn test_grid_removed_renumbers_references() {
        let mut set = LayoutSet::from_layouts(vec![layout("a", &[0, 2, 3, 5]), layout("b", &[1, 2])]);

        set.grid_removed(2);

        let a: Vec<usize> = set.layouts()[0].grids.iter().copied().collect();
        let b: Vec<usize> = set.layouts()[1].grids.iter().copied().collect();
        assert_eq!(a, vec![0, 2, 4]);
        assert_eq!(b, vec![1]);
    }

    #[test]
    fn test_grid_removed_keeps_references_in_range() {
        // every prefix deletion of a 6-grid model keeps indices valid
        for k in 0..6 {
            let mut set = LayoutSet::from_layouts(vec![layout("all", &[0, 1, 2, 3, 4, 5])]);
            set.grid_removed(k);
            let grids = &set.layouts()[0].grids;
            assert_eq!(grids.len(), 5);
            assert!(grids.iter().all(|g| *g < 5));
        }
    }

    #[test]
    fn test_cycle_selection() {
        let mut set = LayoutSet::from_layouts(vec![layout("a", &[]), layout("b", &[]), layout("c", &[])]);

        set.select_next();
        assert_eq!(set.current_index(), Some(0));
        set.select_prev();
        assert_eq!(set.current_index(), Some(2));
        set.select_next();
        assert_eq!(set.current_index(), Some(0));

        assert!(set.select(Some(7)).is_err());
        assert_eq!(set.current_index(), Some(0));
        set.select(None).unwrap();
        set.select_prev();
        assert_eq!(set.current_index(), Some(2));
    }

    #[test]
    fn test_remove_adjusts_current() {
        let mut set = LayoutSet::from_layouts(vec![layout("a", &[]), layout("b", &[]), layout("c", &[])]);
        set.select(Some(2)).unwrap();

        set.remove(0).unwrap();
        assert_eq!(set.current().map(|l| l.name.as_str()), Some("c"));

        set.remove(1).unwrap();
        assert_eq!(set.current_index(), None);
        assert!(set.remove(3).is_err());
    }

    #[test]
    fn test_membership_and_flags() {
        let mut set = LayoutSet::new();
        let i = set.add(Layout::new("Raid"));
        set.set_grid_membership(i, 4, true).unwrap();
        set.set_grid_membership(i, 1, true).unwrap();
        set.set_grid_membership(i, 4, false).unwrap();
        set.set_combat_only(i, true).unwrap();
        set.rename(i, "Fractals").unwrap();

        let l = set.layout(i).unwrap();
        assert_eq!(l.name, "Fractals");
        assert!(l.combat_only);
        assert_eq!(l.grids.iter().copied().collect::<Vec<_>>(), vec![1]);
        assert_eq!(
            set.set_combat_only(5, true).unwrap_err(),
            ModelError::LayoutOutOfRange { index: 5, len: 1 }
        );
    }

    #[test]
    fn test_config_resolves_names_and_legacy_indices() {
        let grids = GridModel::from_grids(vec![
            Grid {
                name: "Boons".into(),
                ..Grid::default()
            },
            Grid {
                name: "Conditions".into(),
                ..Grid::default()
            },
        ]);
        let cfg = LayoutConfig {
            name: "Raid".into(),
            grids: vec![
                GridRef::Name("Conditions".into()),
                GridRef::Index(0),
                GridRef::Name("Gone".into()),
                GridRef::Index(9),
            ],
            combat_only: true,
        };

        let mut report = LoadReport::default();
        let layout = Layout::from_config(&cfg, &grids, &mut report);

        assert_eq!(layout.grids.iter().copied().collect::<Vec<_>>(), vec![0, 1]);
        assert_eq!(report.missing_grids, vec!["Gone".to_string(), "#9".to_string()]);

        let back = layout.to_config(&grids);
        assert_eq!(
            back.grids,
            vec![GridRef::Name("Boons".into()), GridRef::Name("Conditions".into())]
        );
    }
}
