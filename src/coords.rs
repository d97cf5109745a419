use crate::region::PixelBox;

/// Base DPI of the destination length system: one document unit per point.
pub const DEFAULT_DPI: f64 = 72.0;

/// Position and size of a background image in document units, origin at the
/// bottom-left of the page.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DocumentRect {
    pub left: f64,
    pub bottom: f64,
    pub width: f64,
    pub height: f64,
}

/// Maps a device-pixel bounding box into document units. The raster origin is
/// top-left with y growing downwards; the document origin is bottom-left, so
/// the vertical axis flips around `bitmap_height - 1`.
pub fn to_document_units(
    bbox: &PixelBox,
    bitmap_height: u32,
    h_dpi: f64,
    v_dpi: f64,
    zoom: f64,
    base_dpi: f64,
) -> DocumentRect {
    let h_scale = zoom * base_dpi / h_dpi;
    let v_scale = zoom * base_dpi / v_dpi;
    DocumentRect {
        left: bbox.xmin as f64 * h_scale,
        bottom: (bitmap_height as f64 - 1.0 - bbox.ymax as f64) * v_scale,
        width: (bbox.xmax - bbox.xmin + 1) as f64 * h_scale,
        height: (bbox.ymax - bbox.ymin + 1) as f64 * v_scale,
    }
}
