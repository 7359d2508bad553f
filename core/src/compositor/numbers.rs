//! Stack-number glyph atlas
//!
//! The numbers texture is a 5x5 grid of digits "2" through "26". Counts 0
//! and 1 never show a number and have no glyph.

/// Number of addressable glyph slots, including the two empty ones
pub const NUMBER_GLYPHS: usize = 27;

/// Highest count with its own glyph
pub const MAX_NUMBER: i32 = NUMBER_GLYPHS as i32 - 1;

const COLUMNS: usize = 5;
const ORIGIN: f32 = 0.001_533_742_3;
const STRIDE: f32 = 0.199_386_5;
const EXTENT: f32 = 0.196_319_02;

/// UV rect of the glyph for `count`, `None` for counts without a glyph
pub fn number_uv(count: i32) -> Option<[f32; 4]> {
    if !(2..=MAX_NUMBER).contains(&count) {
        return None;
    }
    let k = count as usize - 2;
    let u0 = ORIGIN + (k % COLUMNS) as f32 * STRIDE;
    let v0 = ORIGIN + (k / COLUMNS) as f32 * STRIDE;
    Some([u0, v0, u0 + EXTENT, v0 + EXTENT])
}

/// Count actually rendered for an item: never above the buff's visible
/// maximum nor the last glyph
pub fn displayed_number(count: i32, max_stacks: i32) -> i32 {
    count.min(max_stacks).min(MAX_NUMBER)
}
