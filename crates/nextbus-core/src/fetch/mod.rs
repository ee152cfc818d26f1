//! Timetable acquisition: resolve a route, fetch its PDF, validate, cache.

mod client;
#[cfg(test)]
pub(crate) mod mock;
mod transport;

pub use client::{AcquisitionClient, FetchedDocument};
pub use transport::{HttpTransport, Transport, TransportError, TransportResponse};
