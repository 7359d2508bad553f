//! Buff catalog
//!
//! Static registry of every buff the overlay knows how to draw. The catalog
//! is built once at startup through [`CatalogBuilder`] and is read-only
//! afterwards. Definitions live in a single arena; everything else refers to
//! them through a [`BuffHandle`], so items never hold pointers into the
//! catalog and serialization naturally goes through the buff id.
//!
//! ```text
//!   live stacks { id -> count }
//!            │
//!            ▼
//!   BuffCatalog::stacks(item)   (primary id + extra ids + additional buffs)
//!            │
//!            ▼
//!   StyleSet::lookup(style, count)
//! ```

mod atlas;
mod builder;
mod builtin;

use std::collections::BTreeSet;
use std::sync::Arc;

use hashbrown::HashMap;

use crate::grids::Item;
use crate::stacks::LiveStacks;

pub use atlas::{atlas_entry_name, icon_uv};
pub use builder::CatalogBuilder;
pub use builtin::builtin_catalog;

/// Id used for "unknown / unset". Never present in a live stack table.
pub const INVALID_ID: u32 = u32::MAX;

/// Intrinsic pixel size of one icon cell in the atlas
pub const ICON_CELL_SIZE: (f32, f32) = (128.0, 128.0);

/// Stable index of a definition inside a [`BuffCatalog`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BuffHandle(u32);

impl BuffHandle {
    /// The "Unknown" placeholder, always at slot 0
    pub const UNKNOWN: BuffHandle = BuffHandle(0);

    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl Default for BuffHandle {
    fn default() -> Self {
        Self::UNKNOWN
    }
}

/// A single buff definition
#[derive(Debug, Clone)]
pub struct BuffDescription {
    pub id: u32,
    /// Ids whose stacks count toward this buff
    pub extra_ids: BTreeSet<u32>,
    pub max_stacks: i32,
    pub name: String,
    pub atlas_entry: String,
    /// UV rect `[u0, v0, u1, v1]` in the icon atlas
    pub icon: [f32; 4],
    /// Category path shared with sibling definitions
    pub categories: Arc<[String]>,
}

impl BuffDescription {
    /// Whether a stack number should be drawn over the icon
    pub fn show_number(&self, count: i32) -> bool {
        self.max_stacks > 1 && count > 1
    }

    /// Sum of the live counts for the primary id and every extra id
    pub fn stacks(&self, live: &LiveStacks) -> i32 {
        self.extra_ids
            .iter()
            .fold(live.get(self.id), |acc, id| acc.saturating_add(live.get(*id)))
    }

    /// Every id that contributes to this buff
    pub fn ids(&self) -> impl Iterator<Item = u32> + '_ {
        std::iter::once(self.id).chain(self.extra_ids.iter().copied())
    }

    fn unknown() -> Self {
        Self {
            id: INVALID_ID,
            extra_ids: BTreeSet::new(),
            max_stacks: 1,
            name: "Unknown".to_string(),
            atlas_entry: "unknown".to_string(),
            icon: icon_uv("unknown").unwrap_or_default(),
            categories: Arc::from(Vec::new()),
        }
    }
}

/// Immutable buff registry
#[derive(Debug, Clone)]
pub struct BuffCatalog {
    buffs: Vec<BuffDescription>,
    by_id: HashMap<u32, BuffHandle>,
}

impl BuffCatalog {
    fn from_definitions(definitions: Vec<BuffDescription>) -> Self {
        let mut buffs = Vec::with_capacity(definitions.len() + 1);
        buffs.push(BuffDescription::unknown());
        buffs.extend(definitions);

        let mut by_id = HashMap::with_capacity(buffs.len());
        for (index, buff) in buffs.iter().enumerate().skip(1) {
            let handle = BuffHandle(index as u32);
            if by_id.insert(buff.id, handle).is_some() {
                tracing::warn!(buff_id = buff.id, name = %buff.name, "Duplicate buff id in catalog, keeping last");
            }
        }

        Self { buffs, by_id }
    }

    /// Definition behind a handle. Handles not issued by this catalog map to Unknown.
    pub fn get(&self, handle: BuffHandle) -> &BuffDescription {
        self.buffs.get(handle.index()).unwrap_or(&self.buffs[0])
    }

    pub fn unknown(&self) -> &BuffDescription {
        &self.buffs[0]
    }

    /// Handle of the definition with this primary id
    pub fn resolve(&self, id: u32) -> Option<BuffHandle> {
        self.by_id.get(&id).copied()
    }

    /// Like [`resolve`](Self::resolve) but degrades to Unknown with a warning
    pub fn resolve_or_unknown(&self, id: u32) -> BuffHandle {
        self.resolve(id).unwrap_or_else(|| {
            tracing::warn!(buff_id = id, "Unknown buff id, substituting placeholder");
            BuffHandle::UNKNOWN
        })
    }

    /// Every real definition, excluding the Unknown placeholder
    pub fn iter(&self) -> impl Iterator<Item = (BuffHandle, &BuffDescription)> {
        self.buffs
            .iter()
            .enumerate()
            .skip(1)
            .map(|(i, b)| (BuffHandle(i as u32), b))
    }

    pub fn len(&self) -> usize {
        self.buffs.len() - 1
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Total visible stacks of an item: its buff, that buff's extra ids, and
    /// every additional buff with its own extra ids. Missing ids count as 0.
    pub fn stacks(&self, item: &Item, live: &LiveStacks) -> i32 {
        item.additional_buffs
            .iter()
            .fold(self.get(item.buff).stacks(live), |acc, handle| {
                acc.saturating_add(self.get(*handle).stacks(live))
            })
    }

    /// Case-insensitive substring match over names and categories
    pub fn filter<'a>(
        &'a self,
        needle: &'a str,
    ) -> impl Iterator<Item = (BuffHandle, &'a BuffDescription)> + 'a {
        let needle = needle.to_lowercase();
        self.iter().filter(move |(_, b)| {
            b.name.to_lowercase().contains(&needle)
                || b.categories.iter().any(|c| c.to_lowercase().contains(&needle))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::IVec2;

    fn catalog() -> BuffCatalog {
        let mut b = CatalogBuilder::new();
        b.category(&["Test"]);
        b.buff_with_extras(1, &[2, 3], "Alpha", 25);
        b.buff(4, "Beta", 1);
        b.buff(5, "Gamma", 5);
        b.build()
    }

    #[test]
    fn test_stacks_sum_full_id_set() {
        let mut b = CatalogBuilder::new();
        b.category(&["Test"]);
        // A with extras B, C; D with primary id E
        b.buff_with_extras(10, &[11, 12], "A", 25);
        b.buff(14, "D", 25);
        let catalog = b.build();

        let live: LiveStacks = [(10, 2), (11, 0), (12, 1), (14, 5)].into_iter().collect();
        let item = Item {
            pos: IVec2::ZERO,
            buff: catalog.resolve(10).unwrap(),
            additional_buffs: vec![catalog.resolve(14).unwrap()],
            style: 0,
        };

        assert_eq!(catalog.stacks(&item, &live), 8);
    }

    #[test]
    fn test_stack_sum_saturates() {
        let mut b = CatalogBuilder::new();
        b.category(&["Test"]);
        b.buff_with_extras(10, &[11], "A", 25);
        b.buff(14, "D", 25);
        let catalog = b.build();

        let live: LiveStacks = [(10, i32::MAX), (11, 1), (14, i32::MAX)].into_iter().collect();
        let item = Item {
            pos: IVec2::ZERO,
            buff: catalog.resolve(10).unwrap(),
            additional_buffs: vec![catalog.resolve(14).unwrap()],
            style: 0,
        };

        assert_eq!(catalog.get(item.buff).stacks(&live), i32::MAX);
        assert_eq!(catalog.stacks(&item, &live), i32::MAX);
    }

    #[test]
    fn test_missing_ids_count_as_zero() {
        let catalog = catalog();
        let live = LiveStacks::default();
        let item = Item {
            buff: catalog.resolve(1).unwrap(),
            ..Item::default()
        };
        assert_eq!(catalog.stacks(&item, &live), 0);
    }

    #[test]
    fn test_show_number() {
        let catalog = catalog();
        let single = catalog.get(catalog.resolve(4).unwrap());
        assert!(!single.show_number(1));
        assert!(!single.show_number(7));

        let five = catalog.get(catalog.resolve(5).unwrap());
        assert!(!five.show_number(1));
        assert!(five.show_number(2));
    }

    #[test]
    fn test_unknown_fallbacks() {
        let catalog = catalog();
        assert_eq!(catalog.resolve_or_unknown(999), BuffHandle::UNKNOWN);
        assert_eq!(catalog.get(BuffHandle(5000)).id, INVALID_ID);
        assert_eq!(catalog.unknown().name, "Unknown");
        assert_eq!(catalog.len(), 3);
        assert!(catalog.resolve(INVALID_ID).is_none());
    }

    #[test]
    fn test_filter_matches_name_and_category() {
        let catalog = catalog();
        assert_eq!(catalog.filter("alp").count(), 1);
        assert_eq!(catalog.filter("TEST").count(), 3);
        assert_eq!(catalog.filter("zzz").count(), 0);
    }

    #[test]
    fn test_categories_shared_between_siblings() {
        let catalog = catalog();
        let a = catalog.get(catalog.resolve(1).unwrap());
        let b = catalog.get(catalog.resolve(4).unwrap());
        assert!(Arc::ptr_eq(&a.categories, &b.categories));
    }
}
