//! Error types for the nextbus-core library.

use thiserror::Error;

/// Main error type for the nextbus library.
#[derive(Error, Debug)]
pub enum NextbusError {
    /// Timetable acquisition error.
    #[error("fetch error: {0}")]
    Fetch(#[from] FetchError),

    /// PDF processing error.
    #[error("PDF error: {0}")]
    Pdf(#[from] PdfError),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),
}

/// Errors raised while resolving a route and downloading its timetable.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FetchError {
    /// The route code is not in the registry. No request was made.
    #[error("route {0} is not registered")]
    UnknownRoute(String),

    /// The route code cannot be used as a cache key.
    #[error("invalid route code: {0:?}")]
    InvalidRouteCode(String),

    /// The request did not complete within the configured timeout.
    #[error("timed out downloading timetable for route {route}")]
    Timeout { route: String },

    /// The upstream answered with a non-success status.
    #[error("HTTP {status} for route {route}: {body}")]
    HttpStatus { route: String, status: u16, body: String },

    /// Connection, TLS or protocol failure.
    #[error("network error for route {route}: {message}")]
    Network { route: String, message: String },

    /// The payload is too small to be a timetable.
    #[error("response for route {route} too small ({len} bytes)")]
    InvalidResponse { route: String, len: usize },
}

/// Errors related to PDF processing.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PdfError {
    /// This build carries no PDF codec.
    #[error("PDF parsing is not available in this build (enable the `pdf` feature)")]
    CapabilityUnavailable,

    /// The byte stream could not be opened as a PDF at all.
    #[error("failed to parse PDF for route {route}: {reason}")]
    Open { route: String, reason: String },

    /// The PDF is encrypted with a non-empty password.
    #[error("PDF for route {0} is encrypted")]
    Encrypted(String),

    /// The PDF has no pages.
    #[error("PDF for route {0} has no pages")]
    NoPages(String),

    /// Text could not be extracted from one page.
    #[error("failed to extract text from page {page}: {reason}")]
    PageText { page: u32, reason: String },
}

impl FetchError {
    /// Whether the failure happened on the wire (as opposed to route resolution).
    pub fn is_network(&self) -> bool {
        matches!(
            self,
            FetchError::Timeout { .. } | FetchError::HttpStatus { .. } | FetchError::Network { .. }
        )
    }
}

/// Result type for the nextbus library.
pub type Result<T> = std::result::Result<T, NextbusError>;
