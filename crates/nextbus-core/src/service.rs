//! Service facade: the text-returning operations exposed to callers.
//!
//! Every operation returns a human-readable answer. Failures are rendered
//! into that answer and never escape as errors.

use std::path::Path;

use tracing::{info, warn};

use crate::cache::{has_pdf_signature, DocumentCache};
use crate::error::{FetchError, NextbusError, Result};
use crate::fetch::{AcquisitionClient, FetchedDocument, HttpTransport, Transport};
use crate::models::config::NextbusConfig;
use crate::models::route::{RouteCode, RouteDescriptor};
use crate::models::schedule::ScheduleDocument;
use crate::query::{find_next, QueryOptions};
use crate::registry::RouteRegistry;
use crate::schedule::ScheduleExtractor;

const RULE: &str = "============================================================";
const MAX_LISTED_STOPS: usize = 10;
const MAX_LISTED_ROWS: usize = 10;
const MAX_TIMES_PER_ROW: usize = 5;
const RAW_TEXT_PREVIEW_CHARS: usize = 1500;

/// Owns the registry, acquisition client and extractor for one deployment.
pub struct TimetableService<T: Transport> {
    registry: RouteRegistry,
    client: AcquisitionClient<T>,
    extractor: ScheduleExtractor,
    query: QueryOptions,
}

impl TimetableService<HttpTransport> {
    /// Build a service talking to the configured upstream endpoint.
    pub fn from_config(config: &NextbusConfig) -> Result<Self> {
        let transport = HttpTransport::new(&config.endpoint)
            .map_err(|e| NextbusError::Config(format!("failed to build HTTP client: {}", e)))?;
        Ok(Self::with_transport(transport, config))
    }
}

impl<T: Transport> TimetableService<T> {
    /// Build a service over any transport.
    pub fn with_transport(transport: T, config: &NextbusConfig) -> Self {
        let cache = DocumentCache::new(&config.cache.dir);
        Self {
            registry: RouteRegistry::with_routes(config.routes.iter().cloned()),
            client: AcquisitionClient::new(transport, cache, &config.endpoint),
            extractor: ScheduleExtractor::new(&config.extraction),
            query: QueryOptions::from(&config.query),
        }
    }

    pub fn registry(&self) -> &RouteRegistry {
        &self.registry
    }

    pub fn cache(&self) -> &DocumentCache {
        self.client.cache()
    }

    /// Resolve a route code against the registry.
    pub fn resolve(&self, route: &str) -> std::result::Result<RouteDescriptor, FetchError> {
        let code = RouteCode::parse(route)?;
        self.registry
            .get(&code)
            .ok_or_else(|| FetchError::UnknownRoute(code.to_string()))
    }

    /// Fetch and extract a route's schedule.
    ///
    /// Extraction failures are carried inside the returned document.
    pub async fn schedule(
        &self,
        route: &str,
        bypass_cache: bool,
    ) -> Result<(ScheduleDocument, FetchedDocument)> {
        let descriptor = self.resolve(route)?;
        let fetched = self.client.fetch(&descriptor, bypass_cache).await?;
        let schedule = self
            .extractor
            .extract_or_failed(descriptor.route_code.as_str(), &fetched.data);
        Ok((schedule, fetched))
    }

    /// List known routes.
    pub fn list_routes(&self) -> String {
        let mut lines = vec!["Available Bus Routes:".to_string(), String::new(), RULE.to_string()];
        for code in self.registry.codes() {
            lines.push(format!("  Route {}", code));
        }
        lines.push(RULE.to_string());
        lines.push(String::new());
        lines.push("Use `schedule <ROUTE>` for the full timetable".to_string());
        lines.push("Use `next <ROUTE> <HH:MM>` for the next departures".to_string());
        lines.join("\n")
    }

    /// Full schedule for a route.
    pub async fn route_schedule(&self, route: &str, bypass_cache: bool) -> String {
        let (schedule, fetched) = match self.schedule(route, bypass_cache).await {
            Ok(result) => result,
            Err(e) => return self.describe_failure(route, e),
        };

        if let Some(error) = &schedule.error {
            return format!("Error processing timetable: {}", error);
        }

        render_schedule(&schedule, &fetched)
    }

    /// Next departures for a route after a time token.
    pub async fn next_departure(&self, route: &str, time: &str) -> String {
        match self.schedule(route, false).await {
            Ok((schedule, _)) => find_next(&schedule, time, self.query),
            Err(e) => self.describe_failure(route, e),
        }
    }

    /// Register or overwrite a route.
    pub fn register_route(&self, route: &str, line_id: &str, line_name: &str) -> String {
        let code = match RouteCode::parse(route) {
            Ok(code) => code,
            Err(e) => return format!("Error: {}", e),
        };

        let descriptor = RouteDescriptor::new(code.clone(), line_id.trim(), line_name.trim());
        let replaced = self.registry.register(descriptor).is_some();
        info!("Registered route {} (replaced: {})", code, replaced);

        format!(
            "Successfully {} route {}. You can now query it with `schedule {}` or `next {} <HH:MM>`.",
            if replaced { "updated" } else { "added" },
            code,
            code,
            code
        )
    }

    /// Per-route cache sizes and total.
    pub fn cache_status(&self) -> String {
        let cache = self.cache();
        let listing = cache.list();

        let mut lines = vec![
            "PDF Cache Status".to_string(),
            RULE.to_string(),
            format!("Cache Directory: {}", cache.root().display()),
            String::new(),
        ];

        if listing.is_empty() {
            lines.push("No cached PDFs found.".to_string());
        } else {
            lines.push(format!("Cached Routes ({}):", listing.entries.len()));
            for entry in &listing.entries {
                lines.push(format!(
                    "  {}: {} bytes ({:.1} KB)",
                    entry.route_code,
                    entry.size,
                    entry.size as f64 / 1024.0
                ));
            }
            lines.push(String::new());
            lines.push(format!(
                "Total Cache Size: {} bytes ({:.1} KB)",
                listing.total_bytes,
                listing.total_bytes as f64 / 1024.0
            ));
        }

        lines.join("\n")
    }

    /// Clear one route's cached PDF, or all of them.
    pub fn clear_cache(&self, route: Option<&str>) -> String {
        let cache = self.cache();
        match route {
            Some(route) => {
                let code = match RouteCode::parse(route) {
                    Ok(code) => code,
                    Err(e) => return format!("Error: {}", e),
                };
                if cache.evict(&code) {
                    format!("Successfully cleared cache for route {}", code)
                } else {
                    format!("No cached PDF found for route {}", code)
                }
            }
            None => format!("Successfully cleared cache for {} route(s)", cache.evict_all()),
        }
    }

    /// Import a local PDF into the cache, registering the route if unknown.
    pub fn import_pdf(&self, route: &str, path: &Path) -> String {
        let code = match RouteCode::parse(route) {
            Ok(code) => code,
            Err(e) => return format!("Error: {}", e),
        };

        if !path.exists() {
            return format!("Error: PDF file not found at {}", path.display());
        }

        let data = match std::fs::read(path) {
            Ok(data) => data,
            Err(e) => return format!("Error importing PDF: {}", e),
        };

        if !has_pdf_signature(&data) {
            return format!(
                "Error: File at {} does not appear to be a valid PDF",
                path.display()
            );
        }

        if !self.cache().put(&code, &data) {
            return format!("Error importing PDF: could not write to {}", self.cache().root().display());
        }

        if !self.registry.contains(&code) {
            self.registry.register(RouteDescriptor::derived(code.clone()));
        }

        format!(
            "Successfully imported PDF timetable for route {} ({} bytes)\nYou can now use `schedule {}` or `next {} <HH:MM>`",
            code,
            data.len(),
            code,
            code
        )
    }

    fn describe_failure(&self, route: &str, error: NextbusError) -> String {
        warn!("Request for route {} failed: {}", route, error);
        match error {
            NextbusError::Fetch(FetchError::UnknownRoute(code)) => {
                let available: Vec<String> =
                    self.registry.codes().into_iter().map(String::from).collect();
                format!("Route {} not found. Available routes: {}", code, available.join(", "))
            }
            NextbusError::Fetch(FetchError::InvalidRouteCode(raw)) => {
                format!("Invalid route code: {:?}", raw)
            }
            NextbusError::Fetch(e) if e.is_network() => {
                format!("Failed to download timetable for route {}: {}", route.trim().to_uppercase(), e)
            }
            NextbusError::Fetch(e) => format!("Error: {}", e),
            other => format!("Error: {}", other),
        }
    }
}

fn render_schedule(schedule: &ScheduleDocument, fetched: &FetchedDocument) -> String {
    let route = &schedule.route_code;
    let mut lines = vec![format!("Route {} Schedule", route), RULE.to_string()];

    if !schedule.stops.is_empty() {
        lines.push(String::new());
        lines.push(format!("Stops ({}):", schedule.stops.len()));
        for (i, stop) in schedule.stops.iter().take(MAX_LISTED_STOPS).enumerate() {
            lines.push(format!("  {}. {}", i + 1, stop));
        }
        if schedule.stops.len() > MAX_LISTED_STOPS {
            lines.push(format!(
                "  ... and {} more stops",
                schedule.stops.len() - MAX_LISTED_STOPS
            ));
        }
    }

    if !schedule.departures.is_empty() {
        lines.push(String::new());
        lines.push(format!(
            "Schedule Times (showing first {} of {} departures):",
            schedule.departures.len().min(MAX_LISTED_ROWS),
            schedule.departures.len()
        ));
        for (i, row) in schedule.departures.iter().take(MAX_LISTED_ROWS).enumerate() {
            let mut times = row
                .iter()
                .take(MAX_TIMES_PER_ROW)
                .cloned()
                .collect::<Vec<_>>()
                .join(" → ");
            if row.len() > MAX_TIMES_PER_ROW {
                times.push_str(&format!(" ... (+{} more)", row.len() - MAX_TIMES_PER_ROW));
            }
            lines.push(format!("  {}. {}", i + 1, times));
        }
    } else if !schedule.raw_text.is_empty() {
        lines.push(String::new());
        lines.push(format!(
            "Raw Timetable Content (first {} characters):",
            RAW_TEXT_PREVIEW_CHARS
        ));
        lines.push("-".repeat(RULE.len()));
        lines.push(schedule.raw_text.chars().take(RAW_TEXT_PREVIEW_CHARS).collect());
        if schedule.raw_text.chars().count() > RAW_TEXT_PREVIEW_CHARS {
            lines.push("... (content truncated)".to_string());
        }
    } else {
        lines.push(String::new());
        lines.push("No text could be extracted from the timetable.".to_string());
    }

    for warning in &schedule.warnings {
        lines.push(format!("Warning: {}", warning));
    }
    if fetched.suspect {
        lines.push("Warning: the downloaded file did not look like a PDF".to_string());
    }

    lines.push(String::new());
    lines.push(RULE.to_string());
    lines.push(format!(
        "PDF Size: {} bytes{}",
        fetched.data.len(),
        if fetched.from_cache { " (cached)" } else { "" }
    ));
    lines.push(format!("Use `next {} <HH:MM>` to find the next departure", route));

    lines.join("\n")
}
