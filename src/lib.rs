mod coords;
mod debug;
mod emit;
mod encode;
mod error;
mod pixmap;
mod policy;
mod region;

pub use coords::{DEFAULT_DPI, DocumentRect, to_document_units};
pub use debug::DebugLogger;
pub use emit::{
    BACKGROUND_IMAGE_CN, BOTTOM_CN, BackgroundImageDescriptor, HEIGHT_CN, LEFT_CN, LengthBank,
    LengthInterner, TempFileRegistry, WIDTH_CN, background_filename, emit,
};
pub use encode::write_png;
pub use error::UnderlayError;
pub use pixmap::{PixelMode, PixmapView, RegionRows};
pub use policy::{
    BackgroundHooks, FontInfo, GlyphDisposition, PAGE_BACKGROUND, RenderHooks, WritingMode,
    rasterize_glyph,
};
pub use region::{DirtyRegionTracker, PixelBox};

use std::path::PathBuf;

/// Document-scoped configuration, read by every component and never mutated
/// here. `use_cropbox` is forwarded to the external engine's page-display
/// call; this core does not interpret it.
#[derive(Debug, Clone)]
pub struct RenderParameters {
    pub fallback: bool,
    pub embed_image: bool,
    pub tmp_dir: PathBuf,
    pub dest_dir: PathBuf,
    pub h_dpi: f64,
    pub v_dpi: f64,
    pub use_cropbox: bool,
    pub text_zoom: f64,
}

impl Default for RenderParameters {
    fn default() -> Self {
        Self {
            fallback: false,
            embed_image: false,
            tmp_dir: std::env::temp_dir(),
            dest_dir: PathBuf::from("."),
            h_dpi: DEFAULT_DPI,
            v_dpi: DEFAULT_DPI,
            use_cropbox: false,
            text_zoom: 1.0,
        }
    }
}

/// Observable part of the page lifecycle. The extract/encode/position/emit
/// phases run inside `finish_page`, which consumes the context, so the
/// terminal state is the context being gone.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageStage {
    Idle,
    Rendering,
    Finalized,
}

/// Per-page state: the dirty-region tracker plus where the page is in its
/// lifecycle. Created at page start, consumed once at end-of-page. A new page
/// always gets a fresh context; there is no way back into `Rendering`.
pub struct PageRenderContext<'a> {
    page_number: u32,
    params: &'a RenderParameters,
    tracker: DirtyRegionTracker,
    stage: PageStage,
}

impl<'a> PageRenderContext<'a> {
    fn new(page_number: u32, params: &'a RenderParameters) -> Self {
        Self {
            page_number,
            params,
            tracker: DirtyRegionTracker::new(),
            stage: PageStage::Idle,
        }
    }

    pub fn page_number(&self) -> u32 {
        self.page_number
    }

    pub fn stage(&self) -> PageStage {
        self.stage
    }

    /// Hooks to register with the engine for this page's render pass. A
    /// finalized page never re-enters `Rendering`; start a new page instead.
    pub fn hooks(&mut self) -> BackgroundHooks<'_> {
        debug_assert!(
            self.stage != PageStage::Finalized,
            "render hooks requested after the page was finalized"
        );
        self.stage = PageStage::Rendering;
        BackgroundHooks::new(self.params, &mut self.tracker)
    }

    /// Ends the render pass and fixes the dirty bounding box.
    pub fn finalize(&mut self) -> PixelBox {
        self.stage = PageStage::Finalized;
        *self.tracker.query()
    }
}

pub struct BackgroundRenderer {
    params: RenderParameters,
    debug: Option<DebugLogger>,
}

impl BackgroundRenderer {
    pub fn new(params: RenderParameters) -> Self {
        Self {
            params,
            debug: None,
        }
    }

    pub fn with_debug(mut self, logger: DebugLogger) -> Self {
        self.debug = Some(logger);
        self
    }

    pub fn params(&self) -> &RenderParameters {
        &self.params
    }

    pub fn begin_page(&self, page_number: u32) -> PageRenderContext<'_> {
        PageRenderContext::new(page_number, &self.params)
    }

    /// Consumes a finalized page. An empty dirty box is a valid outcome that
    /// produces neither file nor markup. Otherwise the region is extracted
    /// from `view`, encoded into the temporary directory (when embedding) or
    /// the destination directory (when linking), positioned in document
    /// units, and emitted to `out`. Temp files are registered for the
    /// caller's end-of-run cleanup. Any failure aborts the conversion.
    pub fn finish_page(
        &self,
        ctx: PageRenderContext<'_>,
        view: &PixmapView<'_>,
        bank: &mut LengthBank<'_>,
        registry: &mut TempFileRegistry,
        out: &mut dyn std::io::Write,
    ) -> Result<Option<BackgroundImageDescriptor>, UnderlayError> {
        if ctx.stage != PageStage::Finalized {
            return Err(UnderlayError::Format(format!(
                "page {} consumed before its render pass was finalized",
                ctx.page_number
            )));
        }
        let page_number = ctx.page_number;
        let bbox = *ctx.tracker.query();
        if bbox.is_empty() {
            if let Some(debug) = &self.debug {
                debug.log_page_skip(page_number);
            }
            return Ok(None);
        }

        let dir = if self.params.embed_image {
            &self.params.tmp_dir
        } else {
            &self.params.dest_dir
        };
        let path = dir.join(background_filename(page_number));
        if self.params.embed_image {
            registry.add(path.clone());
        }

        let rows = view.region_rows(&bbox).map_err(|e| with_page(e, page_number))?;

        encode::write_png(
            rows,
            bbox.width(),
            bbox.height(),
            self.params.h_dpi,
            self.params.v_dpi,
            &path,
        )
        .map_err(|e| with_page(e, page_number))?;

        let rect = to_document_units(
            &bbox,
            view.height(),
            self.params.h_dpi,
            self.params.v_dpi,
            self.params.text_zoom,
            DEFAULT_DPI,
        );

        let descriptor = BackgroundImageDescriptor {
            page_number,
            bbox,
            path,
            embedded: self.params.embed_image,
        };
        emit::emit(out, &descriptor, &rect, bank).map_err(|e| with_page(e, page_number))?;

        if let Some(debug) = &self.debug {
            let bytes = std::fs::metadata(&descriptor.path)
                .map(|m| m.len())
                .unwrap_or(0);
            debug.log_page_background(page_number, &bbox, bytes);
        }
        Ok(Some(descriptor))
    }
}

fn with_page(err: UnderlayError, page_number: u32) -> UnderlayError {
    match err {
        UnderlayError::Format(message) => {
            UnderlayError::Format(format!("page {}: {}", page_number, message))
        }
        UnderlayError::Encode(message) => {
            UnderlayError::Encode(format!("page {}: {}", page_number, message))
        }
        UnderlayError::Io(source) => UnderlayError::Io(std::io::Error::new(
            source.kind(),
            format!("page {}: {}", page_number, source),
        )),
        other => other,
    }
}
