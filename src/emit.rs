use crate::coords::DocumentRect;
use crate::error::UnderlayError;
use crate::region::PixelBox;
use base64::Engine;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};

pub const BACKGROUND_IMAGE_CN: &str = "background-image";
pub const LEFT_CN: &str = "left:";
pub const BOTTOM_CN: &str = "bottom:";
pub const WIDTH_CN: &str = "width:";
pub const HEIGHT_CN: &str = "height:";

/// External length-interning service: maps a numeric length to a reusable
/// symbolic class name. Deduplication precision is the service's business;
/// this core treats it as an exact-match black box.
pub trait LengthInterner {
    fn install(&mut self, value: f64) -> String;
}

/// One interner per positioned CSS property, mirroring how the destination
/// stylesheet is organized.
pub struct LengthBank<'a> {
    pub left: &'a mut dyn LengthInterner,
    pub bottom: &'a mut dyn LengthInterner,
    pub width: &'a mut dyn LengthInterner,
    pub height: &'a mut dyn LengthInterner,
}

/// Append-only list of temporary files created during a document run. The
/// owner deletes them in bulk once the whole document is done.
#[derive(Debug, Default)]
pub struct TempFileRegistry {
    files: Vec<PathBuf>,
}

impl TempFileRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, path: PathBuf) {
        self.files.push(path);
    }

    pub fn iter(&self) -> impl Iterator<Item = &Path> {
        self.files.iter().map(PathBuf::as_path)
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }
}

#[derive(Debug, Clone)]
pub struct BackgroundImageDescriptor {
    pub page_number: u32,
    pub bbox: PixelBox,
    pub path: PathBuf,
    pub embedded: bool,
}

pub fn background_filename(page_number: u32) -> String {
    format!("bg{:x}.png", page_number)
}

/// Appends the image-reference node for an encoded background to the page's
/// output stream. Embedded images are re-read and inlined as a base64 data
/// URI; linked images get a relative filename. The node is assembled in full
/// before anything reaches `out`, so a failed inline read leaves the stream
/// untouched.
pub fn emit(
    out: &mut dyn Write,
    descriptor: &BackgroundImageDescriptor,
    rect: &DocumentRect,
    bank: &mut LengthBank<'_>,
) -> Result<(), UnderlayError> {
    let mut node = String::new();
    node.push_str("<img class=\"");
    node.push_str(BACKGROUND_IMAGE_CN);
    node.push(' ');
    node.push_str(LEFT_CN);
    node.push_str(&bank.left.install(rect.left));
    node.push(' ');
    node.push_str(BOTTOM_CN);
    node.push_str(&bank.bottom.install(rect.bottom));
    node.push(' ');
    node.push_str(WIDTH_CN);
    node.push_str(&bank.width.install(rect.width));
    node.push(' ');
    node.push_str(HEIGHT_CN);
    node.push_str(&bank.height.install(rect.height));
    node.push_str("\" alt=\"\" src=\"");

    if descriptor.embedded {
        let mut bytes = Vec::new();
        std::fs::File::open(&descriptor.path)
            .and_then(|mut file| file.read_to_end(&mut bytes))
            .map_err(|_| UnderlayError::EmbedRead(descriptor.path.clone()))?;
        node.push_str("data:image/png;base64,");
        node.push_str(&base64::engine::general_purpose::STANDARD.encode(&bytes));
    } else {
        node.push_str(&background_filename(descriptor.page_number));
    }
    node.push_str("\"/>");

    out.write_all(node.as_bytes())?;
    Ok(())
}
