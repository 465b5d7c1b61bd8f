use std::collections::HashMap;

use image::{ImageBuffer, Pixel, RgbaImage};

use crate::foundation::error::{TracemarkError, TracemarkResult};
use crate::foundation::math::{blend_channel, mul_div255_u8};

/// 8-bit coverage mask of rendered text, origin at the top-left of the text box.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GlyphMask {
    width: u32,
    height: u32,
    coverage: Vec<u8>,
}

impl GlyphMask {
    /// Build a mask from row-major coverage bytes.
    pub fn new(width: u32, height: u32, coverage: Vec<u8>) -> TracemarkResult<Self> {
        if coverage.len() != width as usize * height as usize {
            return Err(TracemarkError::validation(format!(
                "glyph mask expects {} coverage bytes, got {}",
                width as usize * height as usize,
                coverage.len()
            )));
        }
        Ok(Self {
            width,
            height,
            coverage,
        })
    }

    /// Empty (zero-sized) mask.
    pub fn empty() -> Self {
        Self {
            width: 0,
            height: 0,
            coverage: Vec::new(),
        }
    }

    /// Mask width in pixels.
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Mask height in pixels.
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Coverage at `(x, y)`; zero outside the mask.
    pub fn coverage_at(&self, x: u32, y: u32) -> u8 {
        if x >= self.width || y >= self.height {
            return 0;
        }
        self.coverage[y as usize * self.width as usize + x as usize]
    }

    /// Whether no pixel has any coverage.
    pub fn is_blank(&self) -> bool {
        self.coverage.iter().all(|&c| c == 0)
    }

    /// Drop empty columns and rows on the right and bottom. The origin stays put.
    pub fn trimmed(self) -> Self {
        let mut max_x = 0u32;
        let mut max_y = 0u32;
        for y in 0..self.height {
            for x in 0..self.width {
                if self.coverage_at(x, y) != 0 {
                    max_x = max_x.max(x + 1);
                    max_y = max_y.max(y + 1);
                }
            }
        }
        if max_x == self.width && max_y == self.height {
            return self;
        }
        let mut coverage = Vec::with_capacity(max_x as usize * max_y as usize);
        for y in 0..max_y {
            let row = y as usize * self.width as usize;
            coverage.extend_from_slice(&self.coverage[row..row + max_x as usize]);
        }
        Self {
            width: max_x,
            height: max_y,
            coverage,
        }
    }
}

/// Capability that turns text into a coverage mask at a pixel size.
pub trait TextRenderer {
    /// Rasterize `text` at `size_px`.
    fn rasterize(&mut self, text: &str, size_px: u32) -> TracemarkResult<GlyphMask>;
}

/// Composite `mask` onto `canvas` with its top-left at `origin`, filled with straight-alpha
/// `color`. Pixels outside the canvas are clipped.
///
/// RGB canvases blend the color channels; RGBA canvases use straight-alpha "over".
pub fn draw_text<P>(
    canvas: &mut ImageBuffer<P, Vec<u8>>,
    mask: &GlyphMask,
    origin: (i64, i64),
    color: [u8; 4],
) where
    P: Pixel<Subpixel = u8>,
{
    let (cw, ch) = canvas.dimensions();
    for my in 0..mask.height() {
        let y = origin.1 + i64::from(my);
        if y < 0 || y >= i64::from(ch) {
            continue;
        }
        for mx in 0..mask.width() {
            let x = origin.0 + i64::from(mx);
            if x < 0 || x >= i64::from(cw) {
                continue;
            }
            let cov = mask.coverage_at(mx, my);
            if cov == 0 {
                continue;
            }
            let a = mul_div255_u8(u16::from(cov), u16::from(color[3]));
            composite_px(canvas.get_pixel_mut(x as u32, y as u32).channels_mut(), color, a);
        }
    }
}

/// Transparent overlay that collects several glyphs before a single composite.
///
/// Stamping interpolates every channel, alpha included, so overlapping glyphs of the same
/// color never build up more opacity than one glyph has on its own.
#[derive(Clone, Debug)]
pub struct TextLayer {
    pixels: RgbaImage,
}

impl TextLayer {
    /// Empty layer of `width x height`.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            pixels: RgbaImage::new(width, height),
        }
    }

    /// Stamp `mask` filled with `color` at `origin`, clipping to the layer.
    pub fn stamp(&mut self, mask: &GlyphMask, origin: (i64, i64), color: [u8; 4]) {
        let (lw, lh) = self.pixels.dimensions();
        for my in 0..mask.height() {
            let y = origin.1 + i64::from(my);
            if y < 0 || y >= i64::from(lh) {
                continue;
            }
            for mx in 0..mask.width() {
                let x = origin.0 + i64::from(mx);
                if x < 0 || x >= i64::from(lw) {
                    continue;
                }
                let cov = mask.coverage_at(mx, my);
                if cov == 0 {
                    continue;
                }
                let px = &mut self.pixels.get_pixel_mut(x as u32, y as u32).0;
                if px[3] == 0 {
                    px[..3].copy_from_slice(&color[..3]);
                    px[3] = mul_div255_u8(u16::from(cov), u16::from(color[3]));
                } else {
                    for (d, s) in px.iter_mut().zip(color.iter()) {
                        *d = blend_channel(*d, *s, cov);
                    }
                }
            }
        }
    }

    /// Alpha-composite the layer over `canvas`. Sizes must match; extra pixels are ignored.
    pub fn composite_onto(&self, canvas: &mut RgbaImage) {
        for (dst, src) in canvas.pixels_mut().zip(self.pixels.pixels()) {
            let a = src.0[3];
            if a == 0 {
                continue;
            }
            composite_px(&mut dst.0, src.0, a);
        }
    }
}

fn composite_px(dst: &mut [u8], color: [u8; 4], a: u8) {
    if dst.len() < 4 || dst[3] == 255 {
        for (d, s) in dst.iter_mut().zip(color.iter()).take(3) {
            *d = blend_channel(*d, *s, a);
        }
        return;
    }
    // Straight-alpha over a translucent destination.
    let sa = u32::from(a);
    let da = u32::from(dst[3]);
    let out_a = sa * 255 + da * (255 - sa);
    if out_a == 0 {
        dst[..4].copy_from_slice(&[0, 0, 0, 0]);
        return;
    }
    for c in 0..3 {
        let v = (u32::from(color[c]) * sa * 255 + u32::from(dst[c]) * da * (255 - sa)) / out_a;
        dst[c] = v.min(255) as u8;
    }
    dst[3] = ((out_a + 127) / 255).min(255) as u8;
}

/// Fontless renderer: every non-whitespace character becomes a solid `size x size` square.
///
/// Useful when no font file is available; positions stay inspectable even though glyph
/// shapes are lost.
#[derive(Clone, Debug, Default)]
pub struct BlockTextRenderer;

impl TextRenderer for BlockTextRenderer {
    fn rasterize(&mut self, text: &str, size_px: u32) -> TracemarkResult<GlyphMask> {
        if size_px == 0 {
            return Err(TracemarkError::validation("text size_px must be > 0"));
        }
        let chars: Vec<char> = text.chars().collect();
        let width = size_px * chars.len() as u32;
        let mut coverage = vec![0u8; width as usize * size_px as usize];
        for (i, c) in chars.iter().enumerate() {
            if c.is_whitespace() {
                continue;
            }
            for y in 0..size_px as usize {
                let row = y * width as usize + i * size_px as usize;
                coverage[row..row + size_px as usize].fill(255);
            }
        }
        GlyphMask::new(width, size_px, coverage)
    }
}

/// Memoizing wrapper keyed by `(text, size)`.
pub struct CachedRenderer<R> {
    inner: R,
    cache: HashMap<(String, u32), GlyphMask>,
}

impl<R: TextRenderer> CachedRenderer<R> {
    /// Wrap a renderer.
    pub fn new(inner: R) -> Self {
        Self {
            inner,
            cache: HashMap::new(),
        }
    }

    /// Number of cached masks.
    pub fn cached(&self) -> usize {
        self.cache.len()
    }
}

impl<R: TextRenderer> TextRenderer for CachedRenderer<R> {
    fn rasterize(&mut self, text: &str, size_px: u32) -> TracemarkResult<GlyphMask> {
        let key = (text.to_string(), size_px);
        if let Some(mask) = self.cache.get(&key) {
            return Ok(mask.clone());
        }
        let mask = self.inner.rasterize(text, size_px)?;
        self.cache.insert(key, mask.clone());
        Ok(mask)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/text/renderer.rs"]
mod tests;
