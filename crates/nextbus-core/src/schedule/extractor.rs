//! Turns timetable PDF bytes into a [`ScheduleDocument`].
//!
//! Opening the document is the only hard failure. Every page contributes
//! its text to the raw-text fallback; tables found in that text contribute
//! stop names and departure rows. A page that cannot be read is recorded as
//! a warning and the remaining pages are still processed.

use tracing::{debug, warn};

use crate::error::PdfError;
use crate::models::config::ExtractionConfig;
use crate::models::schedule::ScheduleDocument;
use crate::pdf::{PdfExtractor, PdfPage, PdfProcessor, TableDetector, TextTable};
use crate::time::parse_time;

/// Builds schedule documents from PDF bytes.
#[derive(Debug, Clone, Default)]
pub struct ScheduleExtractor {
    detector: TableDetector,
}

impl ScheduleExtractor {
    pub fn new(config: &ExtractionConfig) -> Self {
        Self {
            detector: TableDetector::new(config),
        }
    }

    /// Extract a schedule from raw PDF bytes.
    pub fn extract(&self, route_code: &str, data: &[u8]) -> Result<ScheduleDocument, PdfError> {
        let mut pdf = PdfExtractor::new(route_code);
        pdf.load(data)?;

        let pages = pdf.extract_pages();
        Ok(self.extract_pages(route_code, pages))
    }

    /// Extract a schedule, folding a failure into the document's error field.
    pub fn extract_or_failed(&self, route_code: &str, data: &[u8]) -> ScheduleDocument {
        self.extract(route_code, data).unwrap_or_else(|e| {
            warn!("Extraction failed for route {}: {}", route_code, e);
            ScheduleDocument::failed(route_code, e)
        })
    }

    /// Assemble a schedule from already-extracted page texts.
    pub fn extract_pages(
        &self,
        route_code: &str,
        pages: impl IntoIterator<Item = PdfPage>,
    ) -> ScheduleDocument {
        let mut schedule = ScheduleDocument::new(route_code);
        let mut page_texts = Vec::new();

        for page in pages {
            let text = match page.text {
                Ok(text) => text,
                Err(e) => {
                    warn!("Skipping page {} of route {}: {}", page.number, route_code, e);
                    schedule.warnings.push(e.to_string());
                    continue;
                }
            };

            if !text.trim().is_empty() {
                page_texts.push(format!("--- Page {} ---\n{}", page.number, text.trim_end()));
            }

            for table in self.detector.detect(&text) {
                collect_table(&mut schedule, &table);
            }
        }

        schedule.raw_text = page_texts.join("\n\n");
        let schedule = schedule.finish();

        debug!(
            "Route {}: {} stops, {} departure rows ({} times), {} chars of text, {} warnings",
            route_code,
            schedule.stops.len(),
            schedule.departures.len(),
            schedule.departure_count(),
            schedule.raw_text.len(),
            schedule.warnings.len()
        );

        schedule
    }
}

fn collect_table(schedule: &mut ScheduleDocument, table: &TextTable) {
    // A grid whose header line did not split starts directly with times.
    let headerless = is_time_row(table.header());
    let rows = if headerless { &table.rows[..] } else { table.data_rows() };

    for row in rows {
        let times: Vec<String> = row
            .iter()
            .filter(|cell| !cell.is_empty())
            .filter_map(|cell| parse_time(cell))
            .map(|time| time.to_string())
            .collect();

        if !times.is_empty() {
            schedule.departures.push(times);
        }
    }

    if schedule.stops.is_empty() && !headerless {
        schedule.stops = table
            .header()
            .iter()
            .map(|cell| cell.trim())
            .filter(|cell| !cell.is_empty())
            .map(str::to_string)
            .collect();
    }
}

/// True when every non-empty cell is a time and at least one cell is.
fn is_time_row(row: &[String]) -> bool {
    let mut cells = row.iter().filter(|cell| !cell.trim().is_empty()).peekable();
    cells.peek().is_some() && cells.all(|cell| parse_time(cell).is_some())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::{find_next, QueryOptions};
    use pretty_assertions::assert_eq;

    fn page(number: u32, text: &str) -> PdfPage {
        PdfPage {
            number,
            text: Ok(text.to_string()),
        }
    }

    fn strings(v: &[&str]) -> Vec<String> {
        v.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_extract_rows_and_stops() {
        let text = "\
Route SH1
Gold Souq    Burjuman    Union
6.00         612         25:20
06:30        -           06:50
Friday service differs    see notes
";
        let schedule = ScheduleExtractor::default().extract_pages("SH1", vec![page(1, text)]);

        assert_eq!(schedule.stops, strings(&["Gold Souq", "Burjuman", "Union"]));
        assert_eq!(
            schedule.departures,
            vec![strings(&["06:00", "06:12", "01:20"]), strings(&["06:30", "06:50"])]
        );
        assert!(schedule.parsed);
        assert!(schedule.raw_text.starts_with("--- Page 1 ---\nRoute SH1"));
    }

    #[test]
    fn test_first_header_wins() {
        let first = "Stop A    Stop B\n07:00    07:10\n";
        let second = "Stop C    Stop D\n08:00    08:10\n";
        let schedule =
            ScheduleExtractor::default().extract_pages("D03", vec![page(1, first), page(2, second)]);

        assert_eq!(schedule.stops, strings(&["Stop A", "Stop B"]));
        assert_eq!(schedule.departures.len(), 2);
        assert!(schedule.raw_text.contains("--- Page 2 ---"));
    }

    #[test]
    fn test_empty_header_does_not_claim_stops() {
        let first = "-    -\n07:00    07:10\n";
        let second = "Stop C    Stop D\n08:00    08:10\n";
        let schedule =
            ScheduleExtractor::default().extract_pages("D03", vec![page(1, first), page(2, second)]);

        assert_eq!(schedule.stops, strings(&["Stop C", "Stop D"]));
    }

    #[test]
    fn test_table_starting_with_times_keeps_first_departure() {
        let text = "\
Gold Souq Burjuman Union
06:00 06:12 06:20
06:30 06:42 06:50
07:00 07:12 07:20
";
        let schedule = ScheduleExtractor::default().extract_pages("SH1", vec![page(1, text)]);

        assert!(schedule.stops.is_empty());
        assert_eq!(
            schedule.departures,
            vec![
                strings(&["06:00", "06:12", "06:20"]),
                strings(&["06:30", "06:42", "06:50"]),
                strings(&["07:00", "07:12", "07:20"]),
            ]
        );

        let answer = find_next(&schedule, "05:00", QueryOptions::default());
        assert!(answer.contains("  06:00 (in 60 minutes)"), "{answer}");
        assert!(!answer.contains("Stops:"), "{answer}");
    }

    #[test]
    fn test_text_without_tables_is_parsed() {
        let schedule = ScheduleExtractor::default()
            .extract_pages("E411", vec![page(1, "Service suspended until further notice")]);

        assert!(schedule.departures.is_empty());
        assert!(schedule.parsed);
    }

    #[test]
    fn test_failed_page_is_a_warning() {
        let pages = vec![
            PdfPage {
                number: 1,
                text: Err(PdfError::PageText {
                    page: 1,
                    reason: "bad content stream".to_string(),
                }),
            },
            page(2, "Stop A    Stop B\n07:00    07:10\n"),
        ];
        let schedule = ScheduleExtractor::default().extract_pages("F62", pages);

        assert_eq!(schedule.warnings.len(), 1);
        assert!(schedule.warnings[0].contains("page 1"));
        assert_eq!(schedule.departures, vec![strings(&["07:00", "07:10"])]);
        assert!(!schedule.raw_text.contains("--- Page 1 ---"));
    }

    #[test]
    fn test_blank_pages_not_parsed() {
        let schedule = ScheduleExtractor::default().extract_pages("C01", vec![page(1, "  \n ")]);
        assert!(!schedule.parsed);
        assert!(schedule.raw_text.is_empty());
    }

    #[test]
    fn test_invalid_bytes_fail_softly() {
        let schedule = ScheduleExtractor::default().extract_or_failed("C10", b"not a pdf at all");
        assert!(schedule.error.is_some());
        assert!(!schedule.parsed);
    }
}
