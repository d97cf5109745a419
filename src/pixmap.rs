use crate::error::UnderlayError;
use crate::region::PixelBox;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PixelMode {
    Rgb8,
    Rgba8,
    Gray8,
}

impl PixelMode {
    pub fn bytes_per_pixel(self) -> usize {
        match self {
            PixelMode::Rgb8 => 3,
            PixelMode::Rgba8 => 4,
            PixelMode::Gray8 => 1,
        }
    }
}

/// Read-only strided view into the rasterizer-owned pixel buffer. The view
/// (and every row slice derived from it) is valid only for the current page;
/// nothing here takes a copy.
#[derive(Debug, Clone, Copy)]
pub struct PixmapView<'a> {
    data: &'a [u8],
    width: u32,
    height: u32,
    row_stride: usize,
    mode: PixelMode,
}

impl<'a> PixmapView<'a> {
    pub fn new(
        data: &'a [u8],
        width: u32,
        height: u32,
        row_stride: usize,
        mode: PixelMode,
    ) -> Result<Self, UnderlayError> {
        let min_row = width as usize * mode.bytes_per_pixel();
        if row_stride < min_row {
            return Err(UnderlayError::Format(format!(
                "row stride {} shorter than {} pixels of {:?}",
                row_stride, width, mode
            )));
        }
        // The last row need not be padded out to the full stride.
        let needed = if height == 0 {
            0
        } else {
            (height as usize - 1) * row_stride + min_row
        };
        if data.len() < needed {
            return Err(UnderlayError::Format(format!(
                "pixel buffer holds {} bytes, {}x{} at stride {} needs {}",
                data.len(),
                width,
                height,
                row_stride,
                needed
            )));
        }
        Ok(Self {
            data,
            width,
            height,
            row_stride,
            mode,
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn mode(&self) -> PixelMode {
        self.mode
    }

    /// Row views covering `bbox`, one per scanline from `ymin` to `ymax`,
    /// each spanning `[xmin, xmax]` at 3 bytes per pixel.
    pub fn region_rows(&self, bbox: &PixelBox) -> Result<RegionRows<'a>, UnderlayError> {
        if bbox.is_empty() {
            return Err(UnderlayError::Format(
                "empty bounding box for background image".to_string(),
            ));
        }
        if self.mode != PixelMode::Rgb8 {
            return Err(UnderlayError::Format(format!(
                "background extraction requires 8-bit RGB, got {:?}",
                self.mode
            )));
        }
        if bbox.xmin < 0
            || bbox.ymin < 0
            || bbox.xmax as i64 >= self.width as i64
            || bbox.ymax as i64 >= self.height as i64
        {
            return Err(UnderlayError::Format(format!(
                "bounding box ({},{})-({},{}) outside {}x{} pixel buffer",
                bbox.xmin, bbox.ymin, bbox.xmax, bbox.ymax, self.width, self.height
            )));
        }
        Ok(RegionRows {
            data: self.data,
            row_stride: self.row_stride,
            x_offset: bbox.xmin as usize * 3,
            row_len: bbox.width() as usize * 3,
            next_row: bbox.ymin as usize,
            end_row: bbox.ymax as usize + 1,
        })
    }
}

/// Iterator of borrowed scanline slices over an extracted region.
#[derive(Debug, Clone)]
pub struct RegionRows<'a> {
    data: &'a [u8],
    row_stride: usize,
    x_offset: usize,
    row_len: usize,
    next_row: usize,
    end_row: usize,
}

impl RegionRows<'_> {
    pub fn width_px(&self) -> u32 {
        (self.row_len / 3) as u32
    }

    pub fn height_px(&self) -> u32 {
        (self.end_row - self.next_row) as u32
    }
}

impl<'a> Iterator for RegionRows<'a> {
    type Item = &'a [u8];

    fn next(&mut self) -> Option<&'a [u8]> {
        if self.next_row >= self.end_row {
            return None;
        }
        let start = self.next_row * self.row_stride + self.x_offset;
        self.next_row += 1;
        Some(&self.data[start..start + self.row_len])
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.end_row - self.next_row;
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for RegionRows<'_> {}

#[cfg(test)]
mod tests {
    use super::*;

    // 4x3 RGB8 buffer with one padding byte per row; pixel (x,y) holds
    // (x, y, x+y) so rows are easy to check.
    fn sample_buffer() -> Vec<u8> {
        let (width, height, stride) = (4usize, 3usize, 13usize);
        let mut data = vec![0xEE; height * stride];
        for y in 0..height {
            for x in 0..width {
                let at = y * stride + x * 3;
                data[at] = x as u8;
                data[at + 1] = y as u8;
                data[at + 2] = (x + y) as u8;
            }
        }
        data
    }

    #[test]
    fn rows_cover_the_requested_region() {
        let data = sample_buffer();
        let view = PixmapView::new(&data, 4, 3, 13, PixelMode::Rgb8).expect("view");
        let bbox = PixelBox {
            xmin: 1,
            ymin: 1,
            xmax: 2,
            ymax: 2,
        };
        let rows = view.region_rows(&bbox).expect("rows");
        assert_eq!(rows.width_px(), 2);
        assert_eq!(rows.height_px(), 2);
        let collected: Vec<&[u8]> = rows.collect();
        assert_eq!(collected.len(), 2);
        assert_eq!(collected[0], &[1, 1, 2, 2, 1, 3]);
        assert_eq!(collected[1], &[1, 2, 3, 2, 2, 4]);
    }

    #[test]
    fn empty_box_is_a_format_error() {
        let data = sample_buffer();
        let view = PixmapView::new(&data, 4, 3, 13, PixelMode::Rgb8).expect("view");
        let err = view.region_rows(&PixelBox::EMPTY).unwrap_err();
        assert!(matches!(err, UnderlayError::Format(_)));
    }

    #[test]
    fn non_rgb8_mode_is_a_format_error() {
        let data = vec![0u8; 4 * 3 * 4];
        let view = PixmapView::new(&data, 4, 3, 16, PixelMode::Rgba8).expect("view");
        let bbox = PixelBox {
            xmin: 0,
            ymin: 0,
            xmax: 1,
            ymax: 1,
        };
        assert!(matches!(
            view.region_rows(&bbox),
            Err(UnderlayError::Format(_))
        ));
    }

    #[test]
    fn out_of_bounds_box_is_rejected() {
        let data = sample_buffer();
        let view = PixmapView::new(&data, 4, 3, 13, PixelMode::Rgb8).expect("view");
        let bbox = PixelBox {
            xmin: 0,
            ymin: 0,
            xmax: 4,
            ymax: 2,
        };
        assert!(matches!(
            view.region_rows(&bbox),
            Err(UnderlayError::Format(_))
        ));
    }

    #[test]
    fn undersized_buffer_is_rejected_at_construction() {
        let data = vec![0u8; 10];
        assert!(matches!(
            PixmapView::new(&data, 4, 3, 13, PixelMode::Rgb8),
            Err(UnderlayError::Format(_))
        ));
    }

    #[test]
    fn last_row_may_omit_stride_padding() {
        let stride = 13usize;
        let data = vec![0u8; 2 * stride + 4 * 3];
        let view = PixmapView::new(&data, 4, 3, stride, PixelMode::Rgb8).expect("view");
        let bbox = PixelBox {
            xmin: 0,
            ymin: 2,
            xmax: 3,
            ymax: 2,
        };
        let rows: Vec<&[u8]> = view.region_rows(&bbox).expect("rows").collect();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].len(), 12);
    }
}
