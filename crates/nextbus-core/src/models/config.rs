//! Configuration structures for timetable acquisition and querying.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use super::route::RouteDescriptor;

/// Default upstream timetable endpoint.
pub const DEFAULT_BASE_URL: &str = "https://www.rta.ae/wps/PA_JourneyPlanner/DownloadTimetableServlet";

/// Main configuration for nextbus.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct NextbusConfig {
    /// Raw document cache configuration.
    pub cache: CacheConfig,

    /// Upstream endpoint configuration.
    pub endpoint: EndpointConfig,

    /// Table extraction configuration.
    pub extraction: ExtractionConfig,

    /// Next-departure query configuration.
    pub query: QueryConfig,

    /// Routes registered in addition to the built-in seed table.
    pub routes: Vec<RouteDescriptor>,
}

/// Raw document cache configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Directory holding one `<ROUTE>.pdf` file per cached route.
    pub dir: PathBuf,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            dir: dirs::cache_dir()
                .unwrap_or_else(|| PathBuf::from(".cache"))
                .join("nextbus"),
        }
    }
}

/// Upstream endpoint configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EndpointConfig {
    /// Base URL; `lineId` and `lineName` query parameters are appended.
    pub base_url: String,

    /// Request timeout in seconds. The upstream is slow.
    pub timeout_secs: u64,

    /// User agent sent with every request.
    pub user_agent: String,

    /// Payloads shorter than this are rejected.
    pub min_payload_bytes: usize,

    /// Skip TLS certificate verification.
    pub accept_invalid_certs: bool,
}

impl Default for EndpointConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout_secs: 90,
            user_agent: concat!("nextbus/", env!("CARGO_PKG_VERSION")).to_string(),
            min_payload_bytes: 100,
            accept_invalid_certs: false,
        }
    }
}

/// Table extraction configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractionConfig {
    /// Whitespace run length that separates two table columns.
    pub min_column_gap: usize,

    /// Minimum number of cells for a line to count as a table row.
    pub min_columns: usize,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            min_column_gap: 2,
            min_columns: 2,
        }
    }
}

/// Next-departure query configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct QueryConfig {
    /// Number of departures listed in an answer.
    pub max_results: usize,

    /// Number of stop names listed in an answer.
    pub max_stops: usize,
}

impl Default for QueryConfig {
    fn default() -> Self {
        Self {
            max_results: 5,
            max_stops: 5,
        }
    }
}

impl NextbusConfig {
    /// Load configuration from a JSON file.
    pub fn from_file(path: &std::path::Path) -> Result<Self, std::io::Error> {
        let content = std::fs::read_to_string(path)?;
        serde_json::from_str(&content).map_err(|e| {
            std::io::Error::new(std::io::ErrorKind::InvalidData, e.to_string())
        })
    }

    /// Save configuration to a JSON file.
    pub fn save(&self, path: &std::path::Path) -> Result<(), std::io::Error> {
        let content = serde_json::to_string_pretty(self).map_err(|e| {
            std::io::Error::new(std::io::ErrorKind::InvalidData, e.to_string())
        })?;
        std::fs::write(path, content)
    }

    /// Add or replace a custom route by code.
    pub fn upsert_route(&mut self, descriptor: RouteDescriptor) {
        self.routes.retain(|r| r.route_code != descriptor.route_code);
        self.routes.push(descriptor);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::route::RouteCode;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_partial_config_uses_defaults() {
        let config: NextbusConfig =
            serde_json::from_str(r#"{"endpoint": {"timeout_secs": 10}}"#).unwrap();
        assert_eq!(config.endpoint.timeout_secs, 10);
        assert_eq!(config.endpoint.base_url, DEFAULT_BASE_URL);
        assert_eq!(config.endpoint.min_payload_bytes, 100);
        assert_eq!(config.query.max_results, 5);
        assert!(config.routes.is_empty());
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");

        let mut config = NextbusConfig::default();
        config.cache.dir = dir.path().join("cache");
        config.upsert_route(RouteDescriptor::derived(RouteCode::parse("X28").unwrap()));
        config.save(&path).unwrap();

        let loaded = NextbusConfig::from_file(&path).unwrap();
        assert_eq!(loaded.cache.dir, dir.path().join("cache"));
        assert_eq!(loaded.routes.len(), 1);
        assert_eq!(loaded.routes[0].route_code.as_str(), "X28");
    }

    #[test]
    fn test_upsert_route_replaces() {
        let code = RouteCode::parse("X28").unwrap();
        let mut config = NextbusConfig::default();
        config.upsert_route(RouteDescriptor::new(code.clone(), "a", "b"));
        config.upsert_route(RouteDescriptor::new(code, "c", "d"));
        assert_eq!(config.routes.len(), 1);
        assert_eq!(config.routes[0].line_id, "c");
    }
}
