//! Catalog construction
//!
//! Definitions are declared in batches: [`CatalogBuilder::category`] opens a
//! new batch and every buff pushed afterwards shares that category path.

use std::collections::{BTreeSet, HashSet};
use std::sync::Arc;

use super::atlas::{atlas_entry_name, icon_uv};
use super::{BuffCatalog, BuffDescription};

#[derive(Debug)]
pub struct CatalogBuilder {
    current_categories: Arc<[String]>,
    definitions: Vec<BuffDescription>,
}

impl Default for CatalogBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl CatalogBuilder {
    pub fn new() -> Self {
        Self {
            current_categories: Arc::from(Vec::new()),
            definitions: Vec::new(),
        }
    }

    /// Start a new batch of sibling definitions under this category path
    pub fn category(&mut self, path: &[&str]) -> &mut Self {
        self.current_categories = path.iter().map(|s| s.to_string()).collect();
        self
    }

    pub fn buff(&mut self, id: u32, name: &str, max_stacks: i32) -> &mut Self {
        self.push(id, &[], name, None, max_stacks)
    }

    /// A buff aliasing several underlying effect ids
    pub fn buff_with_extras(
        &mut self,
        id: u32,
        extra_ids: &[u32],
        name: &str,
        max_stacks: i32,
    ) -> &mut Self {
        self.push(id, extra_ids, name, None, max_stacks)
    }

    /// A buff whose icon does not follow the name-derived atlas entry
    pub fn buff_with_atlas(
        &mut self,
        id: u32,
        extra_ids: &[u32],
        name: &str,
        atlas_entry: &str,
        max_stacks: i32,
    ) -> &mut Self {
        self.push(id, extra_ids, name, Some(atlas_entry), max_stacks)
    }

    fn push(
        &mut self,
        id: u32,
        extra_ids: &[u32],
        name: &str,
        atlas_entry: Option<&str>,
        max_stacks: i32,
    ) -> &mut Self {
        let atlas_entry = atlas_entry.map_or_else(|| atlas_entry_name(name), str::to_string);
        self.definitions.push(BuffDescription {
            id,
            extra_ids: extra_ids.iter().copied().filter(|e| *e != id).collect::<BTreeSet<_>>(),
            max_stacks,
            name: name.to_string(),
            icon: [0.0; 4],
            atlas_entry,
            categories: Arc::clone(&self.current_categories),
        });
        self
    }

    /// Resolve atlas entries and freeze the catalog
    pub fn build(self) -> BuffCatalog {
        let mut names = HashSet::new();
        let mut definitions = self.definitions;

        for def in &mut definitions {
            if !names.insert(def.name.clone()) {
                tracing::warn!(name = %def.name, "Duplicate buff name in catalog");
            }
            match icon_uv(&def.atlas_entry) {
                Some(uv) => def.icon = uv,
                None => {
                    tracing::debug!(name = %def.name, entry = %def.atlas_entry, "No atlas entry for buff");
                }
            }
        }

        BuffCatalog::from_definitions(definitions)
    }
}
