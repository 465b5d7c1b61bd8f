//! Text rendering capability.
//!
//! Watermark code never talks to a font library directly. It asks a [`renderer::TextRenderer`]
//! for a coverage mask and composites that mask with [`renderer::draw_text`].

/// Renderer trait, glyph masks, compositing, and the fontless block renderer.
pub mod renderer;
/// Font-backed renderer using `parley` shaping and `vello_cpu` rasterization.
pub mod vello;
