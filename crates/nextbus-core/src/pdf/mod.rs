//! PDF processing module.

mod extractor;
pub mod layout;
pub mod table;

pub use extractor::{PdfExtractor, PdfPage};
pub use layout::{render_rows, PlacedGlyph};
pub use table::{TableDetector, TextTable};

use crate::error::PdfError;

/// Result type for PDF operations.
pub type Result<T> = std::result::Result<T, PdfError>;

/// Trait for PDF text sources.
pub trait PdfProcessor {
    /// Load a PDF from bytes.
    fn load(&mut self, data: &[u8]) -> Result<()>;

    /// Get the number of pages in the PDF.
    fn page_count(&self) -> u32;

    /// Extract the text of every page, in order. A page that fails keeps its error.
    fn extract_pages(&self) -> Vec<PdfPage>;
}
