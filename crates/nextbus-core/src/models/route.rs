//! Route identifiers and upstream descriptors.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::FetchError;

/// A canonical route code: trimmed, uppercase, safe to use as a file name.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct RouteCode(String);

impl RouteCode {
    /// Normalize and validate a route code.
    pub fn parse(raw: &str) -> Result<Self, FetchError> {
        let code = raw.trim().to_uppercase();
        let valid = !code.is_empty()
            && code
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');

        if valid {
            Ok(Self(code))
        } else {
            Err(FetchError::InvalidRouteCode(raw.to_string()))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RouteCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for RouteCode {
    type Error = FetchError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<RouteCode> for String {
    fn from(code: RouteCode) -> Self {
        code.0
    }
}

impl AsRef<str> for RouteCode {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// How a route code maps onto the upstream timetable endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RouteDescriptor {
    /// Canonical route code.
    pub route_code: RouteCode,
    /// Upstream line identifier, already URL-encoded.
    pub line_id: String,
    /// Upstream line name, already URL-encoded.
    pub line_name: String,
}

impl RouteDescriptor {
    pub fn new(route_code: RouteCode, line_id: impl Into<String>, line_name: impl Into<String>) -> Self {
        Self {
            route_code,
            line_id: line_id.into(),
            line_name: line_name.into(),
        }
    }

    /// Descriptor following the upstream naming convention for bus lines.
    pub fn derived(route_code: RouteCode) -> Self {
        let line_id = format!("dub:01{}:%20:H:y08", route_code);
        let line_name = format!("bus%20{}", route_code);
        Self::new(route_code, line_id, line_name)
    }
}

/// Built-in routes as (code, line id, line name).
pub const SEED_ROUTES: &[(&str, &str, &str)] = &[
    ("SH1", "dub:01SH1:%20:H:y08", "bus%20SH1"),
    ("D03", "dub:01D03:%20:H:y08", "bus%20D03"),
    ("E411", "dub:10411:%20:H:y08", "bus%20E411"),
    ("F62", "dub:12F62:%20:H:y08", "bus%20F62"),
    ("8", "dub:00008:%20:H:y08", "bus%208"),
    ("11", "dub:00011:%20:H:y08", "bus%2011"),
    ("C01", "dub:01C01:%20:H:y08", "bus%20C01"),
    ("C10", "dub:01C10:%20:H:y08", "bus%20C10"),
];

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_route_code_normalized() {
        let code = RouteCode::parse(" sh1 ").unwrap();
        assert_eq!(code.as_str(), "SH1");
        assert_eq!(RouteCode::parse("e411").unwrap().to_string(), "E411");
    }

    #[test]
    fn test_route_code_rejects_paths() {
        assert!(RouteCode::parse("").is_err());
        assert!(RouteCode::parse("../etc").is_err());
        assert!(RouteCode::parse("a/b").is_err());
        assert!(RouteCode::parse("X 28").is_err());
    }

    #[test]
    fn test_derived_descriptor() {
        let desc = RouteDescriptor::derived(RouteCode::parse("x28").unwrap());
        assert_eq!(desc.line_id, "dub:01X28:%20:H:y08");
        assert_eq!(desc.line_name, "bus%20X28");
    }

    #[test]
    fn test_descriptor_serde_normalizes_code() {
        let json = r#"{"route_code":"x28","line_id":"id","line_name":"name"}"#;
        let desc: RouteDescriptor = serde_json::from_str(json).unwrap();
        assert_eq!(desc.route_code.as_str(), "X28");
    }
}
