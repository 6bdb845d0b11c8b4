use std::io::Cursor;
use std::path::Path;

use image::{DynamicImage, ImageFormat, Rgba, RgbaImage};

use frontpage_api::FrontpageError;

use crate::{CoverFields, DocumentRenderer, Typeface};

/// Where the cover page lines go on the template.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Layout {
    pub origin_x: i32,
    pub origin_y: i32,
    pub line_gap: i32,
    pub glyph_height: f32,
}

impl Default for Layout {
    fn default() -> Self {
        Self {
            origin_x: 530,
            origin_y: 1060,
            line_gap: 87,
            glyph_height: 45.0,
        }
    }
}

// ════════════════════════════════════════════════════════════════
//  TemplateRenderer
// ════════════════════════════════════════════════════════════════

pub struct TemplateRenderer {
    template: RgbaImage,
    typeface: Typeface,
    layout: Layout,
}

impl TemplateRenderer {
    pub fn new(template: RgbaImage, typeface: Typeface) -> Self {
        Self {
            template,
            typeface,
            layout: Layout::default(),
        }
    }

    /// Load the template image, and the font if one is given.
    pub fn from_paths(template: &Path, font: Option<&Path>) -> Result<Self, FrontpageError> {
        let image = image::open(template)
            .map_err(|e| FrontpageError::internal(format!("open template {}: {e}", template.display())))?
            .to_rgba8();
        let typeface = match font {
            Some(path) => Typeface::load(path)?,
            None => {
                tracing::warn!("no font configured, using built-in bitmap font");
                Typeface::Bitmap
            }
        };
        tracing::info!(
            template = %template.display(),
            width = image.width(),
            height = image.height(),
            "loaded cover template"
        );
        Ok(Self::new(image, typeface))
    }

    pub fn with_layout(mut self, layout: Layout) -> Self {
        self.layout = layout;
        self
    }

    pub fn layout(&self) -> Layout {
        self.layout
    }
}

impl DocumentRenderer for TemplateRenderer {
    fn render(&self, fields: &CoverFields) -> Result<Vec<u8>, FrontpageError> {
        let lines = fields.lines()?;
        let black = Rgba([0, 0, 0, 255]);

        let mut canvas = self.template.clone();
        for (i, text) in lines.iter().enumerate() {
            let y = self.layout.origin_y + i as i32 * self.layout.line_gap;
            self.typeface
                .draw(&mut canvas, self.layout.origin_x, y, self.layout.glyph_height, black, text);
        }

        let mut out = Cursor::new(Vec::new());
        DynamicImage::ImageRgba8(canvas)
            .write_to(&mut out, ImageFormat::Png)
            .map_err(|e| FrontpageError::internal(format!("encode png: {e}")))?;
        Ok(out.into_inner())
    }
}
