//! Position-aware page text.
//!
//! Timetables usually draw every cell as its own text object, so the text
//! stream alone loses the grid. Glyphs are collected with their placement,
//! grouped into rows by baseline and rendered left to right. A horizontal
//! gap wider than a glyph becomes a run of spaces, which is what the table
//! detector splits columns on.

/// Gap (in glyph heights) below which two glyphs belong to the same word.
const WORD_GAP: f64 = 0.15;

/// Gap (in glyph heights) at or above which two glyphs sit in different columns.
const COLUMN_GAP: f64 = 0.8;

/// A glyph placed on the page.
#[derive(Debug, Clone, PartialEq)]
pub struct PlacedGlyph {
    /// Decoded text of the glyph.
    pub text: String,
    /// Bounding box in PDF user space (x1, y1, x2, y2), y growing upwards.
    /// `y1` is the baseline.
    pub bbox: [f64; 4],
}

impl PlacedGlyph {
    pub fn new(text: impl Into<String>, x: f64, baseline: f64, advance: f64, size: f64) -> Self {
        Self {
            text: text.into(),
            bbox: [x, baseline, x + advance, baseline + size],
        }
    }

    pub fn baseline(&self) -> f64 {
        self.bbox[1]
    }

    /// Glyph height, never below one unit.
    pub fn height(&self) -> f64 {
        (self.bbox[3] - self.bbox[1]).abs().max(1.0)
    }

    fn is_blank(&self) -> bool {
        self.text.trim().is_empty()
    }
}

/// Render placed glyphs as lines of text, top row first.
pub fn render_rows(glyphs: &[PlacedGlyph]) -> String {
    let mut placed: Vec<&PlacedGlyph> = glyphs.iter().filter(|g| !g.is_blank()).collect();
    placed.sort_by(|a, b| {
        b.baseline()
            .total_cmp(&a.baseline())
            .then(a.bbox[0].total_cmp(&b.bbox[0]))
    });

    let mut rows: Vec<Vec<&PlacedGlyph>> = Vec::new();
    for glyph in placed {
        let tolerance = |first: &PlacedGlyph| 0.5 * first.height().max(glyph.height());
        match rows.last_mut() {
            Some(row) if (row[0].baseline() - glyph.baseline()).abs() <= tolerance(row[0]) => {
                row.push(glyph);
            }
            _ => rows.push(vec![glyph]),
        }
    }

    rows.into_iter()
        .map(|mut row| {
            row.sort_by(|a, b| a.bbox[0].total_cmp(&b.bbox[0]));
            render_row(&row)
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn render_row(row: &[&PlacedGlyph]) -> String {
    let mut line = String::new();
    let mut end: Option<f64> = None;

    for glyph in row {
        if let Some(end) = end {
            let size = glyph.height();
            let gap = glyph.bbox[0] - end;
            if gap >= COLUMN_GAP * size {
                let spaces = ((gap / (0.5 * size)).round() as usize).max(2);
                line.push_str(&" ".repeat(spaces));
            } else if gap > WORD_GAP * size {
                line.push(' ');
            }
        }
        line.push_str(&glyph.text);
        end = Some(end.map_or(glyph.bbox[2], |e| e.max(glyph.bbox[2])));
    }

    line
}

/// Collects placed glyphs page by page from pdf-extract's content walk.
#[cfg(feature = "pdf")]
#[derive(Debug, Default)]
pub(crate) struct GlyphCollector {
    pages: Vec<Vec<PlacedGlyph>>,
}

#[cfg(feature = "pdf")]
impl GlyphCollector {
    /// Rendered text of every page seen, in order.
    pub(crate) fn into_pages(self) -> Vec<String> {
        self.pages.iter().map(|glyphs| render_rows(glyphs)).collect()
    }
}

#[cfg(feature = "pdf")]
impl pdf_extract::OutputDev for GlyphCollector {
    fn begin_page(
        &mut self,
        _page_num: u32,
        _media_box: &pdf_extract::MediaBox,
        _art_box: Option<(f64, f64, f64, f64)>,
    ) -> Result<(), pdf_extract::OutputError> {
        self.pages.push(Vec::new());
        Ok(())
    }

    fn end_page(&mut self) -> Result<(), pdf_extract::OutputError> {
        Ok(())
    }

    fn output_character(
        &mut self,
        trm: &pdf_extract::Transform,
        width: f64,
        _spacing: f64,
        font_size: f64,
        text: &str,
    ) -> Result<(), pdf_extract::OutputError> {
        // The rendering matrix carries scale and position but not the font size.
        let scale = (trm.m11 * trm.m22 - trm.m12 * trm.m21).abs().sqrt();
        let size = font_size * scale;

        if let Some(page) = self.pages.last_mut() {
            page.push(PlacedGlyph::new(text, trm.m31, trm.m32, width * size, size));
        }
        Ok(())
    }

    fn begin_word(&mut self) -> Result<(), pdf_extract::OutputError> {
        Ok(())
    }

    fn end_word(&mut self) -> Result<(), pdf_extract::OutputError> {
        Ok(())
    }

    fn end_line(&mut self) -> Result<(), pdf_extract::OutputError> {
        Ok(())
    }
}
