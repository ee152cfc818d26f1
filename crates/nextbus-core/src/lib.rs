//! Core library for answering "when is the next departure" from PDF timetables.
//!
//! This crate provides:
//! - A raw-document cache keyed by route code
//! - A route registry and an acquisition client for the upstream timetable endpoint
//! - PDF text extraction and text-layout table detection
//! - Time token normalization and next-departure ranking
//! - A service facade returning plain text for every operation

pub mod cache;
pub mod error;
pub mod fetch;
pub mod models;
pub mod pdf;
pub mod query;
pub mod registry;
pub mod schedule;
pub mod service;
pub mod time;

pub use cache::{CacheEntry, CacheListing, DocumentCache};
pub use error::{FetchError, NextbusError, PdfError, Result};
pub use fetch::{AcquisitionClient, FetchedDocument, HttpTransport, Transport, TransportResponse};
pub use models::config::NextbusConfig;
pub use models::route::{RouteCode, RouteDescriptor};
pub use models::schedule::ScheduleDocument;
pub use query::{find_next, next_departures, DepartureMatch, QueryOptions};
pub use registry::RouteRegistry;
pub use schedule::ScheduleExtractor;
pub use service::TimetableService;
pub use time::{parse_time, CanonicalTime};
