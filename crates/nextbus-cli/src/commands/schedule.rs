//! Schedule and next-departure commands.

use std::time::Duration;

use clap::Args;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::debug;

use nextbus_core::ScheduleDocument;

use super::build_service;

/// Arguments for the schedule command.
#[derive(Args)]
pub struct ScheduleArgs {
    /// Route code (e.g., "SH1")
    route: String,

    /// Output format
    #[arg(short, long, value_enum, default_value = "text")]
    format: OutputFormat,

    /// Download a fresh copy even when the timetable is cached
    #[arg(long)]
    refresh: bool,
}

/// Arguments for the next command.
#[derive(Args)]
pub struct NextArgs {
    /// Route code (e.g., "SH1")
    route: String,

    /// Reference time (HH:MM, H.MM or HMM); defaults to the current local time
    time: Option<String>,
}

#[derive(Clone, Copy, Debug, clap::ValueEnum)]
pub enum OutputFormat {
    /// Human-readable summary
    Text,
    /// Extracted schedule as JSON
    Json,
    /// Stops header followed by departure rows
    Csv,
}

fn spinner(route: &str) -> anyhow::Result<ProgressBar> {
    let pb = ProgressBar::new_spinner();
    pb.set_style(ProgressStyle::default_spinner().template("{spinner:.green} {msg}")?);
    pb.set_message(format!("Loading timetable for route {}...", route));
    pb.enable_steady_tick(Duration::from_millis(100));
    Ok(pb)
}

pub async fn run_schedule(args: ScheduleArgs, config: Option<&str>) -> anyhow::Result<()> {
    let service = build_service(config)?;
    let pb = spinner(&args.route)?;

    let output = match args.format {
        OutputFormat::Text => service.route_schedule(&args.route, args.refresh).await,
        format => {
            let result = service.schedule(&args.route, args.refresh).await;
            pb.finish_and_clear();
            let (schedule, _) = result?;
            if let Some(error) = &schedule.error {
                anyhow::bail!("Error processing timetable: {}", error);
            }
            match format {
                OutputFormat::Csv => format_csv(&schedule)?,
                _ => serde_json::to_string_pretty(&schedule)?,
            }
        }
    };

    pb.finish_and_clear();
    println!("{}", output);
    Ok(())
}

pub async fn run_next(args: NextArgs, config: Option<&str>) -> anyhow::Result<()> {
    let time = args
        .time
        .unwrap_or_else(|| chrono::Local::now().format("%H:%M").to_string());
    debug!("Looking up route {} after {}", args.route, time);

    let service = build_service(config)?;
    let pb = spinner(&args.route)?;
    let output = service.next_departure(&args.route, &time).await;
    pb.finish_and_clear();

    println!("{}", output);
    Ok(())
}

fn format_csv(schedule: &ScheduleDocument) -> anyhow::Result<String> {
    // Rows from different tables may differ in width.
    let mut wtr = csv::WriterBuilder::new().flexible(true).from_writer(vec![]);

    if !schedule.stops.is_empty() {
        wtr.write_record(&schedule.stops)?;
    }
    for row in &schedule.departures {
        wtr.write_record(row)?;
    }

    let data = String::from_utf8(wtr.into_inner()?)?;
    Ok(data)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn csv_keeps_ragged_rows() {
        let mut schedule = ScheduleDocument::new("SH1");
        schedule.stops = vec!["Depot".into(), "Mall".into()];
        schedule.departures = vec![
            vec!["06:00".into(), "06:20".into()],
            vec!["07:00".into()],
        ];

        let csv = format_csv(&schedule).unwrap();
        assert_eq!(csv, "Depot,Mall\n06:00,06:20\n07:00\n");
    }
}
