//! Structured result of extracting one timetable document.

use serde::Serialize;

use crate::error::PdfError;

/// Schedule data recovered from a timetable PDF. Never persisted.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ScheduleDocument {
    /// Route this schedule belongs to.
    pub route_code: String,
    /// Stop names from the first non-empty table header.
    pub stops: Vec<String>,
    /// Departure rows, each a sequence of canonical `HH:MM` strings.
    pub departures: Vec<Vec<String>>,
    /// Concatenated page text with page markers.
    pub raw_text: String,
    /// True when any departure row or any raw text was recovered.
    pub parsed: bool,
    /// Recoverable faults met while reading individual pages.
    pub warnings: Vec<String>,
    /// Set when the document could not be opened at all.
    #[serde(serialize_with = "serialize_error")]
    pub error: Option<PdfError>,
}

impl ScheduleDocument {
    /// An empty schedule for a route, to be filled by the extractor.
    pub fn new(route_code: impl Into<String>) -> Self {
        Self {
            route_code: route_code.into(),
            ..Default::default()
        }
    }

    /// A schedule that carries an extraction failure instead of data.
    pub fn failed(route_code: impl Into<String>, error: PdfError) -> Self {
        Self {
            route_code: route_code.into(),
            error: Some(error),
            ..Default::default()
        }
    }

    /// Recompute `parsed` from the accumulated evidence.
    pub fn finish(mut self) -> Self {
        self.parsed = !self.departures.is_empty() || !self.raw_text.is_empty();
        self
    }

    /// Number of departure times across all rows.
    pub fn departure_count(&self) -> usize {
        self.departures.iter().map(Vec::len).sum()
    }
}

fn serialize_error<S: serde::Serializer>(error: &Option<PdfError>, serializer: S) -> Result<S::Ok, S::Error> {
    match error {
        Some(e) => serializer.serialize_some(&e.to_string()),
        None => serializer.serialize_none(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parsed_from_raw_text_only() {
        let mut doc = ScheduleDocument::new("SH1");
        doc.raw_text = "--- Page 1 ---\nTimetable".to_string();
        let doc = doc.finish();
        assert!(doc.parsed);
        assert!(doc.departures.is_empty());
    }

    #[test]
    fn test_departure_count_spans_rows() {
        let mut doc = ScheduleDocument::new("SH1");
        doc.departures = vec![
            vec!["06:00".to_string(), "06:12".to_string()],
            vec!["07:00".to_string()],
        ];
        assert_eq!(doc.departure_count(), 3);
    }

    #[test]
    fn test_not_parsed_without_evidence() {
        let doc = ScheduleDocument::new("SH1").finish();
        assert!(!doc.parsed);
    }

    #[test]
    fn test_serializes_error_as_message() {
        let doc = ScheduleDocument::failed("D03", PdfError::NoPages("D03".to_string()));
        let json = serde_json::to_value(&doc).unwrap();
        assert_eq!(json["error"], "PDF for route D03 has no pages");
    }
}
