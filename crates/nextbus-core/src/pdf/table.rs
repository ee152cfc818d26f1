//! Table detection over layout-preserving page text.
//!
//! Timetable PDFs lay out their grids with runs of spaces rather than ruled
//! cells, so tables are recovered from text alone: a line splits into cells
//! on wide whitespace gaps, and a run of multi-cell lines forms a table.
//! Blank lines do not end a run; a single-cell line does.

use crate::models::config::ExtractionConfig;
use crate::time::is_time_shaped;

/// Tokens that stand for "no departure" in a timetable cell.
const PLACEHOLDERS: &[&str] = &["-", "--", "–", "—", "|", "*", "..."];

/// A table recovered from page text. Cells may be empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextTable {
    /// Rows of cells in reading order.
    pub rows: Vec<Vec<String>>,
}

impl TextTable {
    /// Number of rows.
    pub fn num_rows(&self) -> usize {
        self.rows.len()
    }

    /// Width of the widest row.
    pub fn num_cols(&self) -> usize {
        self.rows.iter().map(Vec::len).max().unwrap_or(0)
    }

    /// Get header row (first row).
    pub fn header(&self) -> &[String] {
        self.rows.first().map(Vec::as_slice).unwrap_or(&[])
    }

    /// Get data rows (all rows except header).
    pub fn data_rows(&self) -> &[Vec<String>] {
        self.rows.get(1..).unwrap_or(&[])
    }
}

/// Finds whitespace-aligned tables in page text.
#[derive(Debug, Clone)]
pub struct TableDetector {
    min_column_gap: usize,
    min_columns: usize,
}

impl Default for TableDetector {
    fn default() -> Self {
        Self::new(&ExtractionConfig::default())
    }
}

impl TableDetector {
    /// Create a detector from extraction settings.
    pub fn new(config: &ExtractionConfig) -> Self {
        Self {
            min_column_gap: config.min_column_gap.max(1),
            min_columns: config.min_columns.max(1),
        }
    }

    /// Detect every table on a page. Tables need at least two rows.
    pub fn detect(&self, page_text: &str) -> Vec<TextTable> {
        let mut tables = Vec::new();
        let mut current: Vec<Vec<String>> = Vec::new();

        for line in page_text.lines() {
            // Row spacing often shows up as blank lines inside a grid.
            if line.trim().is_empty() {
                continue;
            }

            let cells = self.split_cells(line);
            if cells.len() >= self.min_columns {
                current.push(cells);
            } else {
                flush(&mut current, &mut tables);
            }
        }
        flush(&mut current, &mut tables);

        tables
    }

    /// Split one line into cells.
    pub fn split_cells(&self, line: &str) -> Vec<String> {
        if line.trim().is_empty() {
            return Vec::new();
        }

        let raw: Vec<String> = if line.contains('|') {
            line.split('|').map(str::to_string).collect()
        } else {
            self.split_on_gaps(line)
        };

        let mut cells = Vec::new();
        for cell in raw {
            let cell = cell.trim();
            let tokens: Vec<&str> = cell.split_whitespace().collect();

            // "06:00 06:15 06:30" is a run of columns printed too tightly.
            if tokens.len() > 1
                && tokens.iter().all(|t| is_time_shaped(t) || is_placeholder(t))
            {
                cells.extend(tokens.into_iter().map(normalize_cell));
            } else {
                cells.push(normalize_cell(cell));
            }
        }

        // A leading or trailing '|' yields an edge cell that is not a column.
        if line.contains('|') {
            if cells.first().is_some_and(String::is_empty) {
                cells.remove(0);
            }
            if cells.last().is_some_and(String::is_empty) {
                cells.pop();
            }
        }

        cells
    }

    fn split_on_gaps(&self, line: &str) -> Vec<String> {
        let mut cells = Vec::new();
        let mut cell = String::new();
        let mut gap = String::new();

        for c in line.trim().chars() {
            if c == '\t' {
                // A tab always separates columns.
                gap.push_str(&" ".repeat(self.min_column_gap));
            } else if c.is_whitespace() {
                gap.push(' ');
            } else {
                if gap.chars().count() >= self.min_column_gap {
                    cells.push(std::mem::take(&mut cell));
                } else {
                    cell.push_str(&gap);
                }
                gap.clear();
                cell.push(c);
            }
        }
        if !cell.is_empty() {
            cells.push(cell);
        }

        cells
    }
}

fn flush(current: &mut Vec<Vec<String>>, tables: &mut Vec<TextTable>) {
    if current.len() >= 2 {
        tables.push(TextTable {
            rows: std::mem::take(current),
        });
    } else {
        current.clear();
    }
}

fn is_placeholder(token: &str) -> bool {
    PLACEHOLDERS.contains(&token)
}

fn normalize_cell(cell: &str) -> String {
    let cell = cell.trim();
    if is_placeholder(cell) {
        String::new()
    } else {
        cell.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn cells(v: &[&str]) -> Vec<String> {
        v.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_split_on_wide_gaps() {
        let detector = TableDetector::default();
        assert_eq!(
            detector.split_cells("Al Ghubaiba Bus Station    Burjuman   Union"),
            cells(&["Al Ghubaiba Bus Station", "Burjuman", "Union"])
        );
    }

    #[test]
    fn test_split_tight_time_runs() {
        let detector = TableDetector::default();
        assert_eq!(
            detector.split_cells("06:00 06:15 -  06:45"),
            cells(&["06:00", "06:15", "", "06:45"])
        );
    }

    #[test]
    fn test_split_tabs_and_pipes() {
        let detector = TableDetector::default();
        assert_eq!(detector.split_cells("Stop\tTime"), cells(&["Stop", "Time"]));
        assert_eq!(
            detector.split_cells("| Union | 08:00 | — |"),
            cells(&["Union", "08:00", ""])
        );
    }

    #[test]
    fn test_single_words_stay_together() {
        let detector = TableDetector::default();
        assert_eq!(detector.split_cells("Route SH1 Weekdays"), cells(&["Route SH1 Weekdays"]));
        assert!(detector.split_cells("   ").is_empty());
    }

    #[test]
    fn test_detect_tables() {
        let text = "\
Route SH1 Timetable
Valid from 1 January

Gold Souq    Burjuman    Union
06:00        06:12       06:20
06:30        06:42       06:50
Notes apply on Fridays

Depot    Terminal
22:00    22:40
";
        let detector = TableDetector::default();
        let tables = detector.detect(text);

        assert_eq!(tables.len(), 2);
        assert_eq!(tables[0].header(), cells(&["Gold Souq", "Burjuman", "Union"]).as_slice());
        assert_eq!(tables[0].data_rows().len(), 2);
        assert_eq!(tables[0].num_cols(), 3);
        assert_eq!(tables[1].header(), cells(&["Depot", "Terminal"]).as_slice());
        assert_eq!(tables[1].num_rows(), 2);
    }

    #[test]
    fn test_single_row_is_not_a_table() {
        let detector = TableDetector::default();
        assert!(detector.detect("Route SH1    Weekdays\n\nSome text").is_empty());
    }

    #[test]
    fn test_blank_lines_between_rows() {
        let text = "\
Gold Souq    Burjuman    Union

06:00    06:12    06:20

06:30    06:42    06:50
";
        let tables = TableDetector::default().detect(text);
        assert_eq!(tables.len(), 1);
        assert_eq!(tables[0].num_rows(), 3);
        assert_eq!(tables[0].data_rows()[1], cells(&["06:30", "06:42", "06:50"]));
    }

    #[test]
    fn test_min_columns_setting() {
        let detector = TableDetector::new(&ExtractionConfig {
            min_column_gap: 2,
            min_columns: 3,
        });
        assert!(detector.detect("A    B\nC    D").is_empty());
    }
}
