//! Counting transport for tests.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use super::transport::{Transport, TransportError, TransportResponse};

/// Transport returning a canned response and recording every request.
#[derive(Clone)]
pub(crate) struct MockTransport {
    calls: Arc<AtomicUsize>,
    pub urls: Arc<Mutex<Vec<String>>>,
    response: Result<TransportResponse, TransportError>,
}

impl MockTransport {
    pub fn ok(body: Vec<u8>, content_type: &str) -> Self {
        Self::with(Ok(TransportResponse {
            status: 200,
            content_type: Some(content_type.to_string()),
            body,
        }))
    }

    pub fn with(response: Result<TransportResponse, TransportError>) -> Self {
        Self {
            calls: Arc::new(AtomicUsize::new(0)),
            urls: Arc::new(Mutex::new(Vec::new())),
            response,
        }
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl Transport for MockTransport {
    async fn get(&self, url: &str) -> Result<TransportResponse, TransportError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.urls.lock().unwrap().push(url.to_string());
        self.response.clone()
    }
}

/// A payload that passes the size and signature checks.
pub(crate) fn fake_pdf() -> Vec<u8> {
    let mut data = b"%PDF-1.4\n".to_vec();
    data.extend(std::iter::repeat_n(b'x', 200));
    data
}
