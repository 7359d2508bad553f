//! CPU rasterizer for instance batches
//!
//! Per instance, back to front: glow, tinted icon, border, number.

use std::path::Path;

use clarity_core::{GridInstance, InstanceBatch, RenderSink};
use clarity_types::Rgba;
use tiny_skia::{
    Color, FilterQuality, Paint, PathBuilder, Pattern, Pixmap, PixmapPaint, PremultipliedColorU8, Rect,
    SpreadMode, Stroke, Transform,
};

use crate::atlas::Atlas;
use crate::error::SinkError;

/// Rings used to approximate a glow falloff
const GLOW_STEPS: u32 = 6;

/// Renders each submitted batch into an owned surface
pub struct SoftwareSink {
    target: Pixmap,
    icons: Atlas,
    numbers: Option<Atlas>,
    quality: FilterQuality,
    drawn: usize,
}

impl SoftwareSink {
    pub fn new(width: u32, height: u32, icons: Atlas, numbers: Option<Atlas>) -> Result<Self, SinkError> {
        let target = Pixmap::new(width, height).ok_or(SinkError::Allocation { width, height })?;
        if numbers.is_none() {
            tracing::debug!("No number atlas, stack counts will not be drawn");
        }
        Ok(Self {
            target,
            icons,
            numbers,
            quality: FilterQuality::Nearest,
            drawn: 0,
        })
    }

    /// Bilinear atlas sampling instead of nearest
    pub fn with_filtering(mut self, better: bool) -> Self {
        self.quality = if better {
            FilterQuality::Bilinear
        } else {
            FilterQuality::Nearest
        };
        self
    }

    pub fn target(&self) -> &Pixmap {
        &self.target
    }

    /// Instances drawn by the last submit
    pub fn drawn(&self) -> usize {
        self.drawn
    }

    pub fn encode_png(&self) -> Result<Vec<u8>, SinkError> {
        Ok(self.target.encode_png()?)
    }

    pub fn save_png(&self, path: &Path) -> Result<(), SinkError> {
        self.target.save_png(path)?;
        tracing::debug!(?path, "Wrote frame");
        Ok(())
    }

    fn draw_instance(&mut self, instance: &GridInstance) -> bool {
        let [x, y, w, h] = instance.pixel_rect(self.target.width() as f32, self.target.height() as f32);
        let Some(rect) = Rect::from_xywh(x, y, w, h).filter(|r| r.width() > 0.0 && r.height() > 0.0) else {
            tracing::trace!(?instance.pos_dims, "Skipping degenerate instance");
            return false;
        };

        if instance.glow_size > 0.0 && instance.glow_color[3] > 0.0 {
            draw_glow(&mut self.target, rect, instance.glow_color, instance.glow_size);
        }

        draw_atlas_rect(&mut self.target, &self.icons, instance.uv, rect, instance.tint, self.quality);

        if instance.border_thickness > 0.0 && instance.border_color[3] > 0.0 {
            draw_border(&mut self.target, rect, instance.border_color, instance.border_thickness);
        }

        if instance.shows_number()
            && let Some(numbers) = &self.numbers
        {
            draw_atlas_rect(&mut self.target, numbers, instance.number_uv, rect, [1.0; 4], self.quality);
        }

        true
    }
}

impl RenderSink for SoftwareSink {
    type Error = SinkError;

    fn submit(&mut self, batch: &InstanceBatch) -> Result<(), SinkError> {
        self.target.fill(Color::TRANSPARENT);
        self.drawn = 0;
        for instance in batch.instances() {
            if self.draw_instance(instance) {
                self.drawn += 1;
            }
        }
        if batch.dropped() > 0 {
            tracing::debug!(dropped = batch.dropped(), "Batch overflowed its capacity");
        }
        Ok(())
    }
}

/// Straight-alpha float color to a tiny-skia color, clamped
pub fn color_from_rgba(rgba: Rgba) -> Color {
    let [r, g, b, a] = rgba.map(|c| c.clamp(0.0, 1.0));
    Color::from_rgba(r, g, b, a).unwrap_or(Color::TRANSPARENT)
}

/// Sample `uv` of the atlas into `rect`, multiplied by `tint`
fn draw_atlas_rect(target: &mut Pixmap, atlas: &Atlas, uv: [f32; 4], rect: Rect, tint: Rgba, quality: FilterQuality) {
    let width = rect.width().ceil() as u32;
    let height = rect.height().ceil() as u32;
    let Some(mut scratch) = Pixmap::new(width, height) else {
        return;
    };

    let [x0, y0, x1, y1] = atlas.texel_rect(uv);
    if x1 <= x0 || y1 <= y0 {
        return;
    }
    let sx = width as f32 / (x1 - x0);
    let sy = height as f32 / (y1 - y0);

    let paint = Paint {
        shader: Pattern::new(
            atlas.pixmap().as_ref(),
            SpreadMode::Pad,
            quality,
            1.0,
            Transform::from_row(sx, 0.0, 0.0, sy, -x0 * sx, -y0 * sy),
        ),
        ..Paint::default()
    };
    let Some(local) = Rect::from_xywh(0.0, 0.0, width as f32, height as f32) else {
        return;
    };
    scratch.fill_rect(local, &paint, Transform::identity(), None);

    if tint != [1.0; 4] {
        apply_tint(&mut scratch, tint);
    }

    target.draw_pixmap(
        rect.x().round() as i32,
        rect.y().round() as i32,
        scratch.as_ref(),
        &PixmapPaint::default(),
        Transform::identity(),
        None,
    );
}

/// Multiply premultiplied pixels by a straight-alpha tint
fn apply_tint(pixmap: &mut Pixmap, tint: Rgba) {
    let [r, g, b, a] = tint.map(|c| c.clamp(0.0, 1.0));
    let scale = |c: u8, k: f32| (c as f32 * k).round() as u8;
    for px in pixmap.pixels_mut() {
        let tinted = PremultipliedColorU8::from_rgba(
            scale(px.red(), r * a),
            scale(px.green(), g * a),
            scale(px.blue(), b * a),
            scale(px.alpha(), a),
        );
        *px = tinted.unwrap_or(PremultipliedColorU8::TRANSPARENT);
    }
}

fn draw_border(target: &mut Pixmap, rect: Rect, color: Rgba, thickness: f32) {
    let half = thickness / 2.0;
    let Some(inner) = Rect::from_ltrb(
        rect.left() + half,
        rect.top() + half,
        rect.right() - half,
        rect.bottom() - half,
    ) else {
        // thicker than the icon itself
        let mut paint = Paint::default();
        paint.set_color(color_from_rgba(color));
        target.fill_rect(rect, &paint, Transform::identity(), None);
        return;
    };

    let path = PathBuilder::from_rect(inner);
    let mut paint = Paint::default();
    paint.set_color(color_from_rgba(color));
    paint.anti_alias = false;
    let stroke = Stroke {
        width: thickness,
        ..Stroke::default()
    };
    target.stroke_path(&path, &paint, &stroke, Transform::identity(), None);
}

/// Concentric rects fading out to `size` pixels beyond the icon
fn draw_glow(target: &mut Pixmap, rect: Rect, color: Rgba, size: f32) {
    let step_alpha = color[3] / GLOW_STEPS as f32;
    let mut paint = Paint::default();
    paint.set_color(color_from_rgba([color[0], color[1], color[2], step_alpha]));

    for step in (1..=GLOW_STEPS).rev() {
        let grow = size * step as f32 / GLOW_STEPS as f32;
        if let Some(ring) = Rect::from_ltrb(
            rect.left() - grow,
            rect.top() - grow,
            rect.right() + grow,
            rect.bottom() + grow,
        ) {
            target.fill_rect(ring, &paint, Transform::identity(), None);
        }
    }
}
