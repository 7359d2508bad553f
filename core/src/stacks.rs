//! Live buff stack table
//!
//! The host polls its buff source at its own cadence and hands over a
//! terminated array of `(id, count)` pairs. The compositor only ever reads
//! the resulting table. Hosts that poll on another thread publish snapshots
//! through [`SharedStacks`], which swaps an `Arc` atomically so readers
//! never observe a half-written table.

use std::sync::Arc;

use arc_swap::ArcSwap;
use bytemuck::{Pod, Zeroable};
use hashbrown::HashMap;

use crate::catalog::INVALID_ID;

/// One entry of the host's stack array. An entry with `id == 0` terminates it.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Pod, Zeroable)]
pub struct StackedBuff {
    pub id: u32,
    pub count: i32,
}

impl StackedBuff {
    pub const TERMINATOR: StackedBuff = StackedBuff { id: 0, count: 0 };

    pub fn new(id: u32, count: i32) -> Self {
        Self { id, count }
    }
}

/// Snapshot of `buff id -> stack count`
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LiveStacks {
    counts: HashMap<u32, i32>,
}

impl LiveStacks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a table from a host array, stopping at the terminator
    pub fn from_entries(entries: &[StackedBuff]) -> Self {
        let mut stacks = Self::new();
        stacks.update(entries);
        stacks
    }

    /// Replace the whole table with the contents of a host array
    pub fn update(&mut self, entries: &[StackedBuff]) {
        self.counts.clear();
        for entry in entries.iter().take_while(|e| e.id != 0) {
            self.insert(entry.id, entry.count);
        }
    }

    /// Set one count. The invalid id is reserved for the Unknown placeholder
    /// and is never stored.
    pub fn insert(&mut self, id: u32, count: i32) {
        if id == INVALID_ID {
            tracing::warn!(count, "Live stack entry uses the reserved invalid id, dropping");
            return;
        }
        self.counts.insert(id, count);
    }

    /// Count for an id, 0 when absent
    #[inline]
    pub fn get(&self, id: u32) -> i32 {
        self.counts.get(&id).copied().unwrap_or(0)
    }

    pub fn len(&self) -> usize {
        self.counts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (u32, i32)> + '_ {
        self.counts.iter().map(|(id, count)| (*id, *count))
    }
}

impl FromIterator<(u32, i32)> for LiveStacks {
    fn from_iter<I: IntoIterator<Item = (u32, i32)>>(iter: I) -> Self {
        let mut stacks = Self::new();
        for (id, count) in iter {
            stacks.insert(id, count);
        }
        stacks
    }
}

/// Stack snapshot shared between a polling thread and the render thread
#[derive(Debug)]
pub struct SharedStacks {
    current: ArcSwap<LiveStacks>,
}

impl Default for SharedStacks {
    fn default() -> Self {
        Self::new()
    }
}

impl SharedStacks {
    pub fn new() -> Self {
        Self {
            current: ArcSwap::from_pointee(LiveStacks::new()),
        }
    }

    /// Replace the published snapshot
    pub fn publish(&self, stacks: LiveStacks) {
        self.current.store(Arc::new(stacks));
    }

    /// Build and publish a snapshot from a host array
    pub fn publish_entries(&self, entries: &[StackedBuff]) {
        self.publish(LiveStacks::from_entries(entries));
    }

    /// Current snapshot; stays valid even if a newer one is published meanwhile
    pub fn snapshot(&self) -> Arc<LiveStacks> {
        self.current.load_full()
    }
}
