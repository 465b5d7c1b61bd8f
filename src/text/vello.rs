use std::path::Path;

use crate::foundation::error::{TracemarkError, TracemarkResult};
use crate::text::renderer::{GlyphMask, TextRenderer};

/// Brush carried through Parley layouts. Coverage masks ignore it.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub(crate) struct MaskBrush;

/// Parley shaping state bound to one registered font family.
pub(crate) struct TextLayoutEngine {
    font_ctx: parley::FontContext,
    layout_ctx: parley::LayoutContext<MaskBrush>,
    family_name: String,
}

impl TextLayoutEngine {
    /// Register `font_bytes` and remember its first family.
    pub(crate) fn new(font_bytes: &[u8]) -> TracemarkResult<Self> {
        let mut font_ctx = parley::FontContext::default();
        let families = font_ctx
            .collection
            .register_fonts(parley::fontique::Blob::from(font_bytes.to_vec()), None);
        let family_id = families.first().map(|(id, _)| *id).ok_or_else(|| {
            TracemarkError::format("no font families registered from font bytes")
        })?;
        let family_name = font_ctx
            .collection
            .family_name(family_id)
            .ok_or_else(|| TracemarkError::format("registered font family has no name"))?
            .to_string();
        Ok(Self {
            font_ctx,
            layout_ctx: parley::LayoutContext::new(),
            family_name,
        })
    }

    pub(crate) fn family_name(&self) -> &str {
        &self.family_name
    }

    /// Shape and lay out a single line of plain text.
    pub(crate) fn layout_plain(
        &mut self,
        text: &str,
        size_px: f32,
    ) -> TracemarkResult<parley::Layout<MaskBrush>> {
        if !size_px.is_finite() || size_px <= 0.0 {
            return Err(TracemarkError::validation(
                "text size_px must be finite and > 0",
            ));
        }

        let mut builder = self
            .layout_ctx
            .ranged_builder(&mut self.font_ctx, text, 1.0, true);
        builder.push_default(parley::style::StyleProperty::FontStack(
            parley::style::FontStack::Source(std::borrow::Cow::Owned(self.family_name.clone())),
        ));
        builder.push_default(parley::style::StyleProperty::FontSize(size_px));
        builder.push_default(parley::style::StyleProperty::Brush(MaskBrush));

        let mut layout: parley::Layout<MaskBrush> = builder.build(text);
        layout.break_all_lines(None);
        Ok(layout)
    }
}

/// Font-backed [`TextRenderer`]: Parley shapes, `vello_cpu` rasterizes.
///
/// Every call shapes and rasterizes from scratch; wrap it in
/// [`CachedRenderer`](crate::text::renderer::CachedRenderer) when the same
/// strings repeat.
pub struct VelloTextRenderer {
    engine: TextLayoutEngine,
    font: vello_cpu::peniko::FontData,
}

impl VelloTextRenderer {
    /// Build a renderer from TrueType/OpenType bytes.
    pub fn from_bytes(font_bytes: Vec<u8>) -> TracemarkResult<Self> {
        let engine = TextLayoutEngine::new(&font_bytes)?;
        tracing::debug!(family = engine.family_name(), "registered font");
        let font = vello_cpu::peniko::FontData::new(vello_cpu::peniko::Blob::from(font_bytes), 0);
        Ok(Self {
            engine,
            font,
        })
    }

    /// Build a renderer from a font file.
    pub fn from_path(path: impl AsRef<Path>) -> TracemarkResult<Self> {
        let path = path.as_ref();
        let bytes = std::fs::read(path).map_err(|e| {
            TracemarkError::format(format!("read font '{}': {e}", path.display()))
        })?;
        Self::from_bytes(bytes)
    }

    fn render_mask(&mut self, text: &str, size_px: u32) -> TracemarkResult<GlyphMask> {
        let layout = self.engine.layout_plain(text, size_px as f32)?;

        // Generous box: two ems per character horizontally, two ems vertically.
        let chars = text.chars().count().max(1) as u32;
        let w: u16 = size_px
            .saturating_mul(2)
            .saturating_mul(chars)
            .clamp(1, u32::from(u16::MAX))
            .try_into()
            .map_err(|_| TracemarkError::validation("glyph box exceeds u16"))?;
        let h: u16 = size_px
            .saturating_mul(2)
            .clamp(1, u32::from(u16::MAX))
            .try_into()
            .map_err(|_| TracemarkError::validation("glyph box exceeds u16"))?;

        let mut ctx = vello_cpu::RenderContext::new(w, h);
        ctx.set_paint(vello_cpu::peniko::Color::from_rgba8(255, 255, 255, 255));
        for line in layout.lines() {
            for item in line.items() {
                let parley::layout::PositionedLayoutItem::GlyphRun(run) = item else {
                    continue;
                };
                let glyphs = run.positioned_glyphs().map(|g| vello_cpu::Glyph {
                    id: g.id,
                    x: g.x,
                    y: g.y,
                });
                ctx.glyph_run(&self.font)
                    .font_size(run.run().font_size())
                    .fill_glyphs(glyphs);
            }
        }
        ctx.flush();
        let mut pixmap = vello_cpu::Pixmap::new(w, h);
        ctx.render_to_pixmap(&mut pixmap);

        // Premultiplied output: alpha is the coverage.
        let coverage = pixmap
            .data_as_u8_slice()
            .chunks_exact(4)
            .map(|px| px[3])
            .collect();
        Ok(GlyphMask::new(u32::from(w), u32::from(h), coverage)?.trimmed())
    }
}

impl TextRenderer for VelloTextRenderer {
    fn rasterize(&mut self, text: &str, size_px: u32) -> TracemarkResult<GlyphMask> {
        if size_px == 0 {
            return Err(TracemarkError::validation("text size_px must be > 0"));
        }
        self.render_mask(text, size_px)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/text/vello.rs"]
mod tests;
