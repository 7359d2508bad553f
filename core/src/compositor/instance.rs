//! Draw instances and the fixed-capacity batch

use bytemuck::{Pod, Zeroable};

use clarity_types::Rgba;

/// Instances one frame can hold
pub const DEFAULT_CAPACITY: usize = 1024;

/// One icon as the render sink sees it.
///
/// Position and size are normalized to the target surface. Border thickness
/// and glow size stay in pixels.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct GridInstance {
    /// `[x, y, w, h]`
    pub pos_dims: [f32; 4],
    /// Icon atlas rect `[u0, v0, u1, v1]`
    pub uv: [f32; 4],
    /// Number atlas rect, meaningful only when `show_number != 0`
    pub number_uv: [f32; 4],
    pub tint: Rgba,
    pub border_color: Rgba,
    pub glow_color: Rgba,
    pub glow_size: f32,
    pub border_thickness: f32,
    pub show_number: u32,
    pub _pad: u32,
}

impl GridInstance {
    pub fn shows_number(&self) -> bool {
        self.show_number != 0
    }

    /// Pixel rect `[x, y, w, h]` on a surface of the given size
    pub fn pixel_rect(&self, width: f32, height: f32) -> [f32; 4] {
        let [x, y, w, h] = self.pos_dims;
        [x * width, y * height, w * width, h * height]
    }
}

/// Bounded instance list. Pushes past capacity are dropped and counted.
#[derive(Debug, Clone)]
pub struct InstanceBatch {
    instances: Vec<GridInstance>,
    capacity: usize,
    dropped: usize,
}

impl Default for InstanceBatch {
    fn default() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }
}

impl InstanceBatch {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            instances: Vec::with_capacity(capacity),
            capacity,
            dropped: 0,
        }
    }

    /// Append an instance; returns false if the batch was already full
    #[inline]
    pub fn push(&mut self, instance: GridInstance) -> bool {
        if self.instances.len() >= self.capacity {
            self.dropped += 1;
            return false;
        }
        self.instances.push(instance);
        true
    }

    pub fn clear(&mut self) {
        self.instances.clear();
        self.dropped = 0;
    }

    pub fn instances(&self) -> &[GridInstance] {
        &self.instances
    }

    /// Raw instance data for upload
    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.instances)
    }

    pub fn len(&self) -> usize {
        self.instances.len()
    }

    pub fn is_empty(&self) -> bool {
        self.instances.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn is_full(&self) -> bool {
        self.instances.len() >= self.capacity
    }

    /// Instances rejected since the last clear
    pub fn dropped(&self) -> usize {
        self.dropped
    }
}
