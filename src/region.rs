/// Pixel-space bounding box in device coordinates, origin top-left.
/// Empty is encoded as an inverted box (`xmin > xmax`), so a single
/// expanded point is distinguishable from no expansion at all.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PixelBox {
    pub xmin: i32,
    pub ymin: i32,
    pub xmax: i32,
    pub ymax: i32,
}

impl PixelBox {
    pub const EMPTY: PixelBox = PixelBox {
        xmin: i32::MAX,
        ymin: i32::MAX,
        xmax: i32::MIN,
        ymax: i32::MIN,
    };

    pub fn is_empty(&self) -> bool {
        self.xmin > self.xmax || self.ymin > self.ymax
    }

    pub fn width(&self) -> u32 {
        if self.is_empty() {
            0
        } else {
            (self.xmax - self.xmin + 1) as u32
        }
    }

    pub fn height(&self) -> u32 {
        if self.is_empty() {
            0
        } else {
            (self.ymax - self.ymin + 1) as u32
        }
    }

    pub fn contains(&self, x: i32, y: i32) -> bool {
        !self.is_empty() && self.xmin <= x && x <= self.xmax && self.ymin <= y && y <= self.ymax
    }
}

/// Tracks the minimal bounding box of pixels modified during one page's
/// render pass. The external rasterizer calls `expand_*` from every
/// primitive that writes pixels.
#[derive(Debug)]
pub struct DirtyRegionTracker {
    bbox: PixelBox,
}

impl Default for DirtyRegionTracker {
    fn default() -> Self {
        Self::new()
    }
}

impl DirtyRegionTracker {
    pub fn new() -> Self {
        Self {
            bbox: PixelBox::EMPTY,
        }
    }

    /// Must run after the engine's own page-start hook: that hook may have
    /// painted the whole page with the background color and marked the full
    /// page area dirty. This discards that.
    pub fn reset(&mut self) {
        self.bbox = PixelBox::EMPTY;
    }

    pub fn expand_point(&mut self, x: i32, y: i32) {
        self.bbox.xmin = self.bbox.xmin.min(x);
        self.bbox.ymin = self.bbox.ymin.min(y);
        self.bbox.xmax = self.bbox.xmax.max(x);
        self.bbox.ymax = self.bbox.ymax.max(y);
    }

    pub fn expand_rect(&mut self, rect: &PixelBox) {
        if rect.is_empty() {
            return;
        }
        self.expand_point(rect.xmin, rect.ymin);
        self.expand_point(rect.xmax, rect.ymax);
    }

    pub fn query(&self) -> &PixelBox {
        &self.bbox
    }
}
