//! Schedule extraction from timetable PDFs.

mod extractor;

pub use extractor::ScheduleExtractor;
