//! Route registry: route code to upstream descriptor.
//!
//! Owned by the service instance. Registration overwrites by key with no
//! merge; a read-write lock keeps concurrent requests consistent.

use std::collections::BTreeMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use tracing::info;

use crate::models::route::{RouteCode, RouteDescriptor, SEED_ROUTES};

/// Known routes.
#[derive(Debug, Default)]
pub struct RouteRegistry {
    routes: RwLock<BTreeMap<RouteCode, RouteDescriptor>>,
}

impl RouteRegistry {
    /// An empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry holding the built-in seed routes.
    pub fn seeded() -> Self {
        let registry = Self::new();
        for (code, line_id, line_name) in SEED_ROUTES {
            if let Ok(route_code) = RouteCode::parse(code) {
                registry.register(RouteDescriptor::new(route_code, *line_id, *line_name));
            }
        }
        registry
    }

    /// Seed routes plus the given descriptors, later entries winning.
    pub fn with_routes(routes: impl IntoIterator<Item = RouteDescriptor>) -> Self {
        let registry = Self::seeded();
        for descriptor in routes {
            registry.register(descriptor);
        }
        registry
    }

    /// Add or overwrite a route. Returns the descriptor it replaced.
    pub fn register(&self, descriptor: RouteDescriptor) -> Option<RouteDescriptor> {
        let previous = self
            .write()
            .insert(descriptor.route_code.clone(), descriptor.clone());

        if previous.is_some() {
            info!("Replaced route {}", descriptor.route_code);
        }
        previous
    }

    pub fn get(&self, code: &RouteCode) -> Option<RouteDescriptor> {
        self.read().get(code).cloned()
    }

    pub fn contains(&self, code: &RouteCode) -> bool {
        self.read().contains_key(code)
    }

    /// Route codes in sorted order.
    pub fn codes(&self) -> Vec<RouteCode> {
        self.read().keys().cloned().collect()
    }

    // A poisoned lock still holds a consistent map: every write is a single insert.
    fn read(&self) -> RwLockReadGuard<'_, BTreeMap<RouteCode, RouteDescriptor>> {
        self.routes.read().unwrap_or_else(|e| e.into_inner())
    }

    fn write(&self) -> RwLockWriteGuard<'_, BTreeMap<RouteCode, RouteDescriptor>> {
        self.routes.write().unwrap_or_else(|e| e.into_inner())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn code(s: &str) -> RouteCode {
        RouteCode::parse(s).unwrap()
    }

    #[test]
    fn test_seeded_routes() {
        let registry = RouteRegistry::seeded();
        assert_eq!(registry.codes().len(), 8);
        assert!(registry.contains(&code("sh1")));

        let desc = registry.get(&code("E411")).unwrap();
        assert_eq!(desc.line_id, "dub:10411:%20:H:y08");
        assert_eq!(desc.line_name, "bus%20E411");
    }

    #[test]
    fn test_codes_sorted() {
        let registry = RouteRegistry::seeded();
        let codes: Vec<String> = registry.codes().into_iter().map(String::from).collect();
        assert_eq!(codes, vec!["11", "8", "C01", "C10", "D03", "E411", "F62", "SH1"]);
    }

    #[test]
    fn test_register_overwrites() {
        let registry = RouteRegistry::seeded();
        let previous = registry.register(RouteDescriptor::new(code("SH1"), "new-id", "new-name"));

        assert_eq!(previous.unwrap().line_id, "dub:01SH1:%20:H:y08");
        assert_eq!(registry.get(&code("SH1")).unwrap().line_id, "new-id");
        assert_eq!(registry.codes().len(), 8);
    }

    #[test]
    fn test_with_routes_adds_custom() {
        let registry = RouteRegistry::with_routes(vec![RouteDescriptor::derived(code("X28"))]);
        assert_eq!(registry.codes().len(), 9);
        assert!(registry.get(&code("X28")).is_some());
        assert!(registry.get(&code("Z99")).is_none());
    }
}
