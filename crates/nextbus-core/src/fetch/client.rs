//! Acquisition client.
//!
//! Serves a route's timetable from the document cache when possible, and
//! otherwise issues a single GET against the upstream endpoint.

use tracing::{debug, info, warn};

use super::transport::{Transport, TransportError};
use crate::cache::{has_pdf_signature, DocumentCache};
use crate::error::FetchError;
use crate::models::config::EndpointConfig;
use crate::models::route::RouteDescriptor;

/// Longest response body excerpt kept in an HTTP status error.
const BODY_PREVIEW_CHARS: usize = 200;

/// A timetable payload and where it came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchedDocument {
    pub data: Vec<u8>,
    /// Served from the document cache without a network call.
    pub from_cache: bool,
    /// Neither the content type nor the leading bytes looked like a PDF.
    pub suspect: bool,
}

/// Fetches timetable PDFs for registered routes.
pub struct AcquisitionClient<T: Transport> {
    transport: T,
    cache: DocumentCache,
    base_url: String,
    min_payload_bytes: usize,
}

impl<T: Transport> AcquisitionClient<T> {
    pub fn new(transport: T, cache: DocumentCache, config: &EndpointConfig) -> Self {
        Self {
            transport,
            cache,
            base_url: config.base_url.clone(),
            min_payload_bytes: config.min_payload_bytes,
        }
    }

    pub fn cache(&self) -> &DocumentCache {
        &self.cache
    }

    /// Upstream URL for a route. Descriptor values are already URL-encoded.
    pub fn url_for(&self, descriptor: &RouteDescriptor) -> String {
        format!(
            "{}?lineId={}&lineName={}",
            self.base_url, descriptor.line_id, descriptor.line_name
        )
    }

    /// Fetch a route's timetable, using the cache unless `bypass_cache` is set.
    pub async fn fetch(
        &self,
        descriptor: &RouteDescriptor,
        bypass_cache: bool,
    ) -> Result<FetchedDocument, FetchError> {
        let route = &descriptor.route_code;

        if !bypass_cache {
            if let Some(data) = self.cache.get(route) {
                info!("Using cached PDF for route {}", route);
                return Ok(FetchedDocument {
                    data,
                    from_cache: true,
                    suspect: false,
                });
            }
        }

        let url = self.url_for(descriptor);
        info!("Downloading PDF for route {} from {}", route, url);

        let response = self.transport.get(&url).await.map_err(|e| match e {
            TransportError::Timeout => FetchError::Timeout {
                route: route.to_string(),
            },
            TransportError::Network(message) => FetchError::Network {
                route: route.to_string(),
                message,
            },
        })?;

        if !response.is_success() {
            let body: String = String::from_utf8_lossy(&response.body)
                .chars()
                .take(BODY_PREVIEW_CHARS)
                .collect();
            warn!("HTTP {} downloading PDF for route {}", response.status, route);
            return Err(FetchError::HttpStatus {
                route: route.to_string(),
                status: response.status,
                body,
            });
        }

        let data = response.body;
        if data.len() < self.min_payload_bytes {
            warn!(
                "Response too small for route {} ({} bytes), not a valid PDF",
                route,
                data.len()
            );
            return Err(FetchError::InvalidResponse {
                route: route.to_string(),
                len: data.len(),
            });
        }

        let pdf_content_type = response
            .content_type
            .as_deref()
            .map(|ct| ct.to_lowercase().contains("pdf"))
            .unwrap_or(false);
        let suspect = !pdf_content_type && !has_pdf_signature(&data);

        if suspect {
            warn!(
                "Response for route {} might not be a PDF (content-type: {:?})",
                route, response.content_type
            );
        }

        self.cache.put(route, &data);
        debug!("Fetched {} bytes for route {}", data.len(), route);

        Ok(FetchedDocument {
            data,
            from_cache: false,
            suspect,
        })
    }
}
