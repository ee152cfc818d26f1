//! Next-departure queries over an extracted schedule.

use crate::models::config::QueryConfig;
use crate::models::schedule::ScheduleDocument;
use crate::time::{parse_time, CanonicalTime};

/// A departure at or after the requested time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DepartureMatch {
    pub time: CanonicalTime,
    /// The cell text the time came from.
    pub source: String,
}

/// Limits applied to a rendered answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QueryOptions {
    pub max_results: usize,
    pub max_stops: usize,
}

impl Default for QueryOptions {
    fn default() -> Self {
        Self {
            max_results: 5,
            max_stops: 5,
        }
    }
}

impl From<&QueryConfig> for QueryOptions {
    fn from(config: &QueryConfig) -> Self {
        Self {
            max_results: config.max_results,
            max_stops: config.max_stops,
        }
    }
}

/// All departures at or after `after`, earliest first.
///
/// Same-day comparison only: nothing wraps past midnight. Equal times keep
/// their row/column order.
pub fn next_departures(schedule: &ScheduleDocument, after: CanonicalTime) -> Vec<DepartureMatch> {
    let mut matches: Vec<DepartureMatch> = schedule
        .departures
        .iter()
        .flatten()
        .filter_map(|cell| {
            let time = parse_time(cell)?;
            (time >= after).then(|| DepartureMatch {
                time,
                source: cell.clone(),
            })
        })
        .collect();

    matches.sort_by_key(|m| m.time);
    matches
}

/// Answer "next departures after `requested`" as human-readable text.
///
/// Never fails: extraction errors, empty schedules and bad time tokens all
/// produce an explanatory message.
pub fn find_next(schedule: &ScheduleDocument, requested: &str, options: QueryOptions) -> String {
    if let Some(error) = &schedule.error {
        return format!("Error: {}", error);
    }

    if schedule.departures.is_empty() {
        return "No schedule times found in the timetable. Raw content available in full schedule."
            .to_string();
    }

    let Some(requested_time) = parse_time(requested) else {
        return format!("Invalid time format: {}. Please use HH:MM format.", requested);
    };

    let matches = next_departures(schedule, requested_time);
    if matches.is_empty() {
        return format!(
            "No departures found after {} for route {}",
            requested, schedule.route_code
        );
    }

    let mut lines = vec![format!(
        "Next departures for Route {} after {}:",
        schedule.route_code, requested
    )];

    for departure in matches.iter().take(options.max_results) {
        lines.push(format!(
            "  {} (in {} minutes)",
            departure.source,
            requested_time.minutes_until(departure.time)
        ));
    }

    if !schedule.stops.is_empty() {
        let shown: Vec<&str> = schedule
            .stops
            .iter()
            .take(options.max_stops)
            .map(String::as_str)
            .collect();
        let mut stops_line = format!("\nStops: {}", shown.join(", "));
        if schedule.stops.len() > shown.len() {
            stops_line.push_str(&format!(" (+{} more)", schedule.stops.len() - shown.len()));
        }
        lines.push(stops_line);
    }

    lines.join("\n")
}
