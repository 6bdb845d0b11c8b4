use std::path::Path;

use ab_glyph::{FontArc, PxScale};
use image::{Rgba, RgbaImage};
use imageproc::drawing::{draw_filled_rect_mut, draw_text_mut};
use imageproc::rect::Rect;

use frontpage_api::FrontpageError;

/// How text is drawn onto the template.
pub enum Typeface {
    /// A TrueType/OpenType font loaded from disk.
    TrueType(FontArc),
    /// Built-in 8x8 ASCII bitmap, scaled to the line height.
    Bitmap,
}

impl Typeface {
    pub fn load(path: &Path) -> Result<Self, FrontpageError> {
        let bytes = std::fs::read(path)
            .map_err(|e| FrontpageError::internal(format!("read font {}: {e}", path.display())))?;
        let font = FontArc::try_from_vec(bytes)
            .map_err(|e| FrontpageError::internal(format!("parse font {}: {e}", path.display())))?;
        Ok(Typeface::TrueType(font))
    }

    pub(crate) fn draw(
        &self,
        canvas: &mut RgbaImage,
        x: i32,
        y: i32,
        height: f32,
        color: Rgba<u8>,
        text: &str,
    ) {
        match self {
            Typeface::TrueType(font) => {
                draw_text_mut(canvas, color, x, y, PxScale::from(height), font, text);
            }
            Typeface::Bitmap => draw_bitmap(canvas, x, y, height, color, text),
        }
    }
}

fn draw_bitmap(canvas: &mut RgbaImage, x: i32, y: i32, height: f32, color: Rgba<u8>, text: &str) {
    let cell = ((height / 8.0).round() as u32).max(1);
    let step = cell as i32;

    for (i, ch) in text.chars().enumerate() {
        let ch = if ch.is_ascii() { ch } else { '?' };
        let glyph = font8x8::legacy::BASIC_LEGACY[ch as usize];
        let gx = x + i as i32 * 8 * step;
        for (row, bits) in glyph.iter().enumerate() {
            for col in 0..8 {
                // bit 0 is the leftmost pixel
                if *bits & (1u8 << col) != 0 {
                    let rect = Rect::at(gx + col * step, y + row as i32 * step).of_size(cell, cell);
                    draw_filled_rect_mut(canvas, rect, color);
                }
            }
        }
    }
}
