use crate::RenderParameters;
use crate::region::DirtyRegionTracker;

/// Fill color handed to the engine for the page-start background fill.
pub const PAGE_BACKGROUND: [u8; 3] = [255, 255, 255];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WritingMode {
    Horizontal,
    Vertical,
}

/// The subset of font state the rasterization decision needs. `procedural`
/// marks fonts whose glyphs are arbitrary drawn content (Type 3 in PDF
/// terms) rather than outlines.
#[derive(Debug, Clone, Copy)]
pub struct FontInfo {
    pub writing_mode: WritingMode,
    pub procedural: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GlyphDisposition {
    /// Hand the glyph to the engine's glyph-drawing primitive; its pixels
    /// land in the background layer and expand the dirty region.
    Rasterize,
    /// No pixel operation; the text-layer emitter reproduces the glyph as
    /// selectable markup text.
    DeferToText,
}

/// Draw characters into the background image only when
/// - in fallback mode
/// - OR using a vertical writing mode font
/// - OR using a procedural font
/// Everything else is reproducible as real markup text and must stay out of
/// the raster layer, or it would show doubled under the text layer.
pub fn rasterize_glyph(fallback: bool, font: Option<&FontInfo>) -> bool {
    fallback
        || font.is_some_and(|font| font.writing_mode == WritingMode::Vertical || font.procedural)
}

/// Render-pass callbacks this core registers with the external rasterizer's
/// hook interface. Registered per page; the engine invokes `page_start` once
/// after its own page-start work, then consults `draw_glyph` for every glyph.
pub trait RenderHooks {
    fn page_start(&mut self, page_number: u32);
    fn draw_glyph(&mut self, font: Option<&FontInfo>) -> GlyphDisposition;
    /// The background layer never paints annotations.
    fn draw_annotations(&self) -> bool {
        false
    }
}

pub struct BackgroundHooks<'a> {
    params: &'a RenderParameters,
    tracker: &'a mut DirtyRegionTracker,
}

impl<'a> BackgroundHooks<'a> {
    pub fn new(params: &'a RenderParameters, tracker: &'a mut DirtyRegionTracker) -> Self {
        Self { params, tracker }
    }

    pub fn tracker(&mut self) -> &mut DirtyRegionTracker {
        self.tracker
    }
}

impl RenderHooks for BackgroundHooks<'_> {
    fn page_start(&mut self, _page_number: u32) {
        // The engine's own page-start fill has already run and marked the
        // whole page dirty; start over from an empty region.
        self.tracker.reset();
    }

    fn draw_glyph(&mut self, font: Option<&FontInfo>) -> GlyphDisposition {
        if rasterize_glyph(self.params.fallback, font) {
            GlyphDisposition::Rasterize
        } else {
            GlyphDisposition::DeferToText
        }
    }
}
