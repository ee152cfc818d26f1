//! Cache command - inspect, clear and seed the timetable cache.

use std::fs;
use std::path::{Path, PathBuf};

use clap::{Args, Subcommand};
use console::style;
use glob::glob;
use tracing::{debug, warn};

use nextbus_core::{HttpTransport, RouteCode, RouteDescriptor, TimetableService};

use super::{build_service, config_path, load_config};

/// Arguments for the cache command.
#[derive(Args)]
pub struct CacheArgs {
    #[command(subcommand)]
    command: CacheCommand,
}

#[derive(Subcommand)]
enum CacheCommand {
    /// Show cached timetables and their sizes
    Status,

    /// Remove cached timetables
    Clear {
        /// Only clear this route
        route: Option<String>,
    },

    /// Import a local PDF as a route's timetable
    Import {
        /// Route code to store the PDF under
        route: String,
        /// Path to the PDF file
        path: PathBuf,
    },

    /// Import every PDF matching a glob, using each file stem as the route code
    ImportAll {
        /// Glob pattern (e.g., "timetables/*.pdf")
        pattern: String,
    },
}

pub fn run(args: CacheArgs, config: Option<&str>) -> anyhow::Result<()> {
    let service = build_service(config)?;

    match args.command {
        CacheCommand::Status => println!("{}", service.cache_status()),
        CacheCommand::Clear { route } => println!("{}", service.clear_cache(route.as_deref())),
        CacheCommand::Import { route, path } => {
            import_one(&service, &route, &path, config)?;
        }
        CacheCommand::ImportAll { pattern } => import_all(&service, &pattern, config)?,
    }

    Ok(())
}

/// Import one file. Returns true when the import succeeded.
fn import_one(
    service: &TimetableService<HttpTransport>,
    route: &str,
    path: &Path,
    config: Option<&str>,
) -> anyhow::Result<bool> {
    let code = RouteCode::parse(route)?;
    let known = service.registry().contains(&code);

    let message = service.import_pdf(code.as_str(), path);
    let ok = !message.starts_with("Error");
    println!("{}", message);

    if ok && !known {
        persist_route(RouteDescriptor::derived(code), config)?;
    }
    Ok(ok)
}

fn import_all(
    service: &TimetableService<HttpTransport>,
    pattern: &str,
    config: Option<&str>,
) -> anyhow::Result<()> {
    let files: Vec<PathBuf> = glob(pattern)?
        .filter_map(|r| r.ok())
        .filter(|p| {
            p.extension()
                .and_then(|e| e.to_str())
                .is_some_and(|e| e.eq_ignore_ascii_case("pdf"))
        })
        .collect();

    if files.is_empty() {
        anyhow::bail!("No PDF files found matching: {}", pattern);
    }
    debug!("Importing {} files", files.len());

    let mut imported = 0;
    for path in &files {
        let Some(stem) = path.file_stem().and_then(|s| s.to_str()) else {
            warn!("Skipping {}: file name is not valid UTF-8", path.display());
            continue;
        };
        match import_one(service, stem, path, config) {
            Ok(true) => imported += 1,
            Ok(false) => {}
            Err(e) => println!("{} {}: {}", style("✗").red(), path.display(), e),
        }
    }

    println!();
    println!(
        "{} Imported {}/{} files",
        if imported == files.len() {
            style("✓").green()
        } else {
            style("!").yellow()
        },
        imported,
        files.len()
    );

    Ok(())
}

/// Record a route derived from an import so later runs can resolve it.
fn persist_route(descriptor: RouteDescriptor, config: Option<&str>) -> anyhow::Result<()> {
    let path = config_path(config);
    let mut stored = load_config(&path)?;
    stored.upsert_route(descriptor);

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    stored.save(&path)?;
    debug!("Saved imported route to {}", path.display());
    Ok(())
}
