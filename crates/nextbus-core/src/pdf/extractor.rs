//! PDF text extraction using lopdf and pdf-extract.

use tracing::{debug, warn};

#[cfg(feature = "pdf")]
use super::layout::GlyphCollector;
use super::{PdfProcessor, Result};
use crate::error::PdfError;

/// Text from a single PDF page.
#[derive(Debug, Clone)]
pub struct PdfPage {
    /// Page number (1-indexed).
    pub number: u32,
    /// Extracted text, or why it could not be read.
    pub text: Result<String>,
}

/// PDF text extractor.
///
/// Page text is rebuilt from glyph positions reported by pdf-extract so
/// table columns survive; lopdf opens the document and serves as the
/// per-page fallback when pdf-extract gives up.
#[cfg_attr(not(feature = "pdf"), allow(dead_code))]
pub struct PdfExtractor {
    route: String,
    #[cfg(feature = "pdf")]
    document: Option<lopdf::Document>,
    raw_data: Vec<u8>,
}

impl PdfExtractor {
    /// Create an extractor. `route` labels errors for diagnostics.
    pub fn new(route: impl Into<String>) -> Self {
        Self {
            route: route.into(),
            #[cfg(feature = "pdf")]
            document: None,
            raw_data: Vec::new(),
        }
    }

    /// Row-and-column text of every page, rebuilt from glyph positions.
    #[cfg(feature = "pdf")]
    fn layout_pages(&self) -> Option<Vec<String>> {
        let data = self.raw_data.as_slice();

        // pdf-extract panics on some malformed font programs.
        let result = std::panic::catch_unwind(|| -> std::result::Result<_, pdf_extract::OutputError> {
            // pdf-extract walks its own lopdf version's document type.
            let doc = pdf_extract::Document::load_mem(data)?;
            let mut collector = GlyphCollector::default();
            pdf_extract::output_doc(&doc, &mut collector)?;
            Ok(collector.into_pages())
        });

        match result {
            Ok(Ok(pages)) => Some(pages),
            Ok(Err(e)) => {
                warn!("pdf-extract failed for route {}: {}", self.route, e);
                None
            }
            Err(_) => {
                warn!("pdf-extract panicked for route {}", self.route);
                None
            }
        }
    }

    #[cfg(feature = "pdf")]
    fn fallback_page_text(&self, page: u32) -> Result<String> {
        let doc = self.document.as_ref().ok_or_else(|| PdfError::Open {
            route: self.route.clone(),
            reason: "no document loaded".to_string(),
        })?;

        doc.extract_text(&[page]).map_err(|e| PdfError::PageText {
            page,
            reason: e.to_string(),
        })
    }
}

#[cfg(feature = "pdf")]
impl PdfProcessor for PdfExtractor {
    fn load(&mut self, data: &[u8]) -> Result<()> {
        let mut doc = lopdf::Document::load_mem(data).map_err(|e| PdfError::Open {
            route: self.route.clone(),
            reason: e.to_string(),
        })?;

        // Handle PDFs with empty password encryption
        if doc.is_encrypted() {
            if doc.decrypt("").is_err() {
                return Err(PdfError::Encrypted(self.route.clone()));
            }
            debug!("Decrypted PDF for route {} with empty password", self.route);

            let mut decrypted_data = Vec::new();
            doc.save_to(&mut decrypted_data).map_err(|e| PdfError::Open {
                route: self.route.clone(),
                reason: format!("failed to save decrypted PDF: {}", e),
            })?;
            self.raw_data = decrypted_data;
        } else {
            self.raw_data = data.to_vec();
        }

        let page_count = doc.get_pages().len();
        if page_count == 0 {
            return Err(PdfError::NoPages(self.route.clone()));
        }

        debug!("Loaded PDF for route {} with {} pages", self.route, page_count);
        self.document = Some(doc);
        Ok(())
    }

    fn page_count(&self) -> u32 {
        self.document
            .as_ref()
            .map(|doc| doc.get_pages().len() as u32)
            .unwrap_or(0)
    }

    fn extract_pages(&self) -> Vec<PdfPage> {
        let page_count = self.page_count();
        let layout = self
            .layout_pages()
            .filter(|pages| pages.len() == page_count as usize);

        (1..=page_count)
            .map(|number| {
                let text = match &layout {
                    Some(pages) => Ok(pages[(number - 1) as usize].clone()),
                    None => self.fallback_page_text(number),
                };
                PdfPage { number, text }
            })
            .collect()
    }
}

#[cfg(not(feature = "pdf"))]
impl PdfProcessor for PdfExtractor {
    fn load(&mut self, _data: &[u8]) -> Result<()> {
        Err(PdfError::CapabilityUnavailable)
    }

    fn page_count(&self) -> u32 {
        0
    }

    fn extract_pages(&self) -> Vec<PdfPage> {
        Vec::new()
    }
}
