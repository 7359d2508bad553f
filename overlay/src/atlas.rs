//! Texture atlases
//!
//! Both the icon sheet and the number sheet are plain PNGs addressed by
//! normalized `[u0, v0, u1, v1]` rects.

use std::io::Cursor;
use std::path::Path;

use png::{ColorType, Transformations};
use tiny_skia::{ColorU8, Pixmap, PremultipliedColorU8};

use crate::error::SinkError;

/// A decoded atlas texture in premultiplied RGBA
#[derive(Debug, Clone)]
pub struct Atlas {
    pixmap: Pixmap,
}

impl Atlas {
    pub fn open(path: &Path) -> Result<Self, SinkError> {
        let bytes = std::fs::read(path).map_err(|source| SinkError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let atlas = Self::from_png_bytes(&bytes)?;
        tracing::debug!(?path, width = atlas.width(), height = atlas.height(), "Loaded atlas");
        Ok(atlas)
    }

    /// Decode a PNG of any 8 or 16 bit layout
    pub fn from_png_bytes(bytes: &[u8]) -> Result<Self, SinkError> {
        let mut decoder = png::Decoder::new(Cursor::new(bytes));
        decoder.set_transformations(Transformations::normalize_to_color8());
        let mut reader = decoder.read_info()?;
        let mut buf = vec![0; reader.output_buffer_size()];
        let info = reader.next_frame(&mut buf)?;
        let data = &buf[..info.buffer_size()];

        let channels = match info.color_type {
            ColorType::Grayscale => 1,
            ColorType::GrayscaleAlpha => 2,
            ColorType::Rgb => 3,
            ColorType::Rgba => 4,
            other => return Err(SinkError::Format(other)),
        };

        let mut pixmap = Pixmap::new(info.width, info.height).ok_or(SinkError::Allocation {
            width: info.width,
            height: info.height,
        })?;

        for (dst, src) in pixmap.pixels_mut().iter_mut().zip(data.chunks_exact(channels)) {
            let [r, g, b, a] = match *src {
                [l] => [l, l, l, 255],
                [l, a] => [l, l, l, a],
                [r, g, b] => [r, g, b, 255],
                [r, g, b, a] => [r, g, b, a],
                _ => [0; 4],
            };
            *dst = ColorU8::from_rgba(r, g, b, a).premultiply();
        }

        Ok(Self { pixmap })
    }

    /// Opaque white sheet, so tinted icons still show without real art
    pub fn blank(width: u32, height: u32) -> Result<Self, SinkError> {
        let mut pixmap = Pixmap::new(width, height).ok_or(SinkError::Allocation { width, height })?;
        pixmap.fill(tiny_skia::Color::WHITE);
        Ok(Self { pixmap })
    }

    pub fn from_pixmap(pixmap: Pixmap) -> Self {
        Self { pixmap }
    }

    pub fn pixmap(&self) -> &Pixmap {
        &self.pixmap
    }

    pub fn width(&self) -> u32 {
        self.pixmap.width()
    }

    pub fn height(&self) -> u32 {
        self.pixmap.height()
    }

    /// Source rect `[x0, y0, x1, y1]` in texels for a normalized UV rect
    pub fn texel_rect(&self, uv: [f32; 4]) -> [f32; 4] {
        let (w, h) = (self.width() as f32, self.height() as f32);
        [uv[0] * w, uv[1] * h, uv[2] * w, uv[3] * h]
    }

    pub fn pixel(&self, x: u32, y: u32) -> Option<PremultipliedColorU8> {
        self.pixmap.pixel(x, y)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_rgba_png() {
        let mut pixmap = Pixmap::new(4, 2).unwrap();
        pixmap.fill(tiny_skia::Color::from_rgba8(255, 0, 0, 255));
        let bytes = pixmap.encode_png().unwrap();

        let atlas = Atlas::from_png_bytes(&bytes).unwrap();

        assert_eq!((atlas.width(), atlas.height()), (4, 2));
        let p = atlas.pixel(3, 1).unwrap();
        assert_eq!((p.red(), p.green(), p.blue(), p.alpha()), (255, 0, 0, 255));
    }

    #[test]
    fn test_garbage_is_decode_error() {
        let err = Atlas::from_png_bytes(b"definitely not a png").unwrap_err();
        assert!(matches!(err, SinkError::Decode(_)));
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = Atlas::open(&dir.path().join("icons.png")).unwrap_err();
        assert!(matches!(err, SinkError::Io { .. }));
    }

    #[test]
    fn test_texel_rect() {
        let atlas = Atlas::blank(200, 100).unwrap();
        assert_eq!(atlas.texel_rect([0.0, 0.5, 0.5, 1.0]), [0.0, 50.0, 100.0, 100.0]);
        let p = atlas.pixel(0, 0).unwrap();
        assert_eq!(p.alpha(), 255);
    }
}
