use crate::error::UnderlayError;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

const INCHES_PER_METRE: f64 = 39.370_078_740_157_48;

fn dpi_to_ppm(dpi: f64) -> u32 {
    (dpi * INCHES_PER_METRE).round().max(1.0) as u32
}

/// Streams `rows` into a lossless 8-bit RGB PNG at `path`, embedding the
/// requested horizontal/vertical DPI in the pHYs chunk. Rows must each hold
/// exactly `width * 3` bytes and there must be exactly `height` of them.
pub fn write_png<'a, I>(
    rows: I,
    width: u32,
    height: u32,
    h_dpi: f64,
    v_dpi: f64,
    path: &Path,
) -> Result<(), UnderlayError>
where
    I: Iterator<Item = &'a [u8]>,
{
    if width == 0 || height == 0 {
        return Err(UnderlayError::Format(format!(
            "bad metric for background image: {}x{}",
            width, height
        )));
    }

    let file = File::create(path).map_err(|e| {
        UnderlayError::Io(std::io::Error::new(
            e.kind(),
            format!(
                "cannot open file for background image {}: {}",
                path.display(),
                e
            ),
        ))
    })?;
    let mut encoder = png::Encoder::new(BufWriter::new(file), width, height);
    encoder.set_color(png::ColorType::Rgb);
    encoder.set_depth(png::BitDepth::Eight);
    encoder.set_pixel_dims(Some(png::PixelDimensions {
        xppu: dpi_to_ppm(h_dpi),
        yppu: dpi_to_ppm(v_dpi),
        unit: png::Unit::Meter,
    }));

    // Writer and stream are scoped so the encoder state is released on every
    // exit path, including errors.
    let mut writer = encoder
        .write_header()
        .map_err(|e| UnderlayError::Encode(format!("{}: {}", path.display(), e)))?;
    let mut stream = writer
        .stream_writer()
        .map_err(|e| UnderlayError::Encode(format!("{}: {}", path.display(), e)))?;

    let row_len = width as usize * 3;
    let mut written = 0u32;
    for row in rows {
        if row.len() != row_len {
            return Err(UnderlayError::Encode(format!(
                "{}: row {} holds {} bytes, expected {}",
                path.display(),
                written,
                row.len(),
                row_len
            )));
        }
        stream
            .write_all(row)
            .map_err(|e| UnderlayError::Encode(format!("{}: {}", path.display(), e)))?;
        written += 1;
    }
    if written != height {
        return Err(UnderlayError::Encode(format!(
            "{}: wrote {} rows, expected {}",
            path.display(),
            written,
            height
        )));
    }
    stream
        .finish()
        .map_err(|e| UnderlayError::Encode(format!("{}: {}", path.display(), e)))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pixmap::{PixelMode, PixmapView};
    use crate::region::PixelBox;

    fn scratch_dir(tag: &str) -> std::path::PathBuf {
        let dir = std::env::temp_dir().join(format!(
            "underlay_encode_{}_{}_{}",
            tag,
            std::process::id(),
            std::time::SystemTime::now()
                .duration_since(std::time::UNIX_EPOCH)
                .expect("clock")
                .as_nanos()
        ));
        std::fs::create_dir_all(&dir).expect("mkdir");
        dir
    }

    #[test]
    fn round_trip_preserves_pixels() {
        let (width, height, stride) = (7u32, 5u32, 24usize);
        let mut data = vec![0u8; height as usize * stride];
        for y in 0..height as usize {
            for x in 0..width as usize {
                let at = y * stride + x * 3;
                data[at] = (x * 31) as u8;
                data[at + 1] = (y * 47) as u8;
                data[at + 2] = ((x + y) * 13) as u8;
            }
        }
        let view = PixmapView::new(&data, width, height, stride, PixelMode::Rgb8).expect("view");
        let bbox = PixelBox {
            xmin: 1,
            ymin: 1,
            xmax: 5,
            ymax: 3,
        };
        let rows = view.region_rows(&bbox).expect("rows");

        let dir = scratch_dir("roundtrip");
        let path = dir.join("bg1.png");
        write_png(rows, bbox.width(), bbox.height(), 144.0, 144.0, &path).expect("encode");

        let img = image::open(&path).expect("decode").to_rgb8();
        assert_eq!(img.width(), bbox.width());
        assert_eq!(img.height(), bbox.height());
        for (x, y, px) in img.enumerate_pixels() {
            let sx = (x as i32 + bbox.xmin) as usize;
            let sy = (y as i32 + bbox.ymin) as usize;
            let at = sy * stride + sx * 3;
            assert_eq!(px.0, [data[at], data[at + 1], data[at + 2]]);
        }
    }

    #[test]
    fn phys_chunk_carries_requested_dpi() {
        let dir = scratch_dir("phys");
        let path = dir.join("bg2.png");
        let row = [10u8, 20, 30, 40, 50, 60];
        write_png([&row[..], &row[..]].into_iter(), 2, 2, 96.0, 192.0, &path).expect("encode");

        let decoder = png::Decoder::new(std::fs::File::open(&path).expect("open"));
        let reader = decoder.read_info().expect("info");
        let dims = reader.info().pixel_dims.expect("pHYs");
        assert_eq!(dims.unit, png::Unit::Meter);
        assert_eq!(dims.xppu, 3780); // 96 dpi
        assert_eq!(dims.yppu, 7559); // 192 dpi
    }

    #[test]
    fn unwritable_destination_is_an_io_error() {
        let path = std::path::Path::new("/nonexistent-underlay-dir/bg3.png");
        let row = [0u8, 0, 0];
        let err = write_png([&row[..]].into_iter(), 1, 1, 72.0, 72.0, path).unwrap_err();
        assert!(matches!(err, UnderlayError::Io(_)));
        // The failure must name the destination it could not open.
        assert!(err.to_string().contains("bg3.png"));
    }

    #[test]
    fn short_row_is_an_encode_error() {
        let dir = scratch_dir("shortrow");
        let path = dir.join("bg4.png");
        let row = [0u8, 0, 0];
        let err = write_png([&row[..]].into_iter(), 2, 1, 72.0, 72.0, &path).unwrap_err();
        assert!(matches!(err, UnderlayError::Encode(_)));
    }

    #[test]
    fn missing_rows_are_an_encode_error() {
        let dir = scratch_dir("shortheight");
        let path = dir.join("bg5.png");
        let row = [0u8, 0, 0];
        let err = write_png([&row[..]].into_iter(), 1, 2, 72.0, 72.0, &path).unwrap_err();
        assert!(matches!(err, UnderlayError::Encode(_)));
    }
}
