//! Cover page rendering: text overlaid on a template image, encoded as PNG.

mod fields;
mod template;
mod typeface;

pub use fields::CoverFields;
pub use template::{Layout, TemplateRenderer};
pub use typeface::Typeface;

use frontpage_api::FrontpageError;

/// Produces the downloadable cover page for a set of validated fields.
pub trait DocumentRenderer: Send + Sync {
    /// Encoded PNG bytes.
    fn render(&self, fields: &CoverFields) -> Result<Vec<u8>, FrontpageError>;
}
