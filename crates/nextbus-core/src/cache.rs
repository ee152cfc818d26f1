//! Raw timetable document cache.
//!
//! One file per route at `<root>/<ROUTE_CODE>.pdf`, raw bytes, no metadata.
//! Caching is an optimization: every filesystem failure is logged and
//! reported as a miss or a no-op, never as an error.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::models::route::RouteCode;

/// Leading bytes of every PDF file.
pub const PDF_SIGNATURE: &[u8] = b"%PDF";

/// Whether a payload starts with the PDF signature.
pub fn has_pdf_signature(data: &[u8]) -> bool {
    data.starts_with(PDF_SIGNATURE)
}

/// A cached route document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheEntry {
    pub route_code: String,
    pub size: u64,
}

/// Snapshot of the cache contents.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CacheListing {
    /// Entries sorted by route code.
    pub entries: Vec<CacheEntry>,
    pub total_bytes: u64,
}

impl CacheListing {
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// File-backed store of raw timetable bytes keyed by route code.
#[derive(Debug, Clone)]
pub struct DocumentCache {
    root: PathBuf,
}

impl DocumentCache {
    /// Create a cache rooted at `root`. The directory is created lazily.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Path of the cache file for a route.
    pub fn path_for(&self, route: &RouteCode) -> PathBuf {
        self.root.join(format!("{}.pdf", route))
    }

    /// Read a cached document. Empty or non-PDF files count as absent.
    pub fn get(&self, route: &RouteCode) -> Option<Vec<u8>> {
        let path = self.path_for(route);
        if !path.exists() {
            return None;
        }

        match fs::read(&path) {
            Ok(data) if data.is_empty() => {
                debug!("Ignoring empty cache file {}", path.display());
                None
            }
            Ok(data) if !has_pdf_signature(&data) => {
                warn!("Ignoring cache file without PDF signature: {}", path.display());
                None
            }
            Ok(data) => {
                debug!("Cache hit for route {} ({} bytes)", route, data.len());
                Some(data)
            }
            Err(e) => {
                warn!("Error reading cached PDF {}: {}", path.display(), e);
                None
            }
        }
    }

    /// Store a document, replacing any previous one. Returns whether it was written.
    pub fn put(&self, route: &RouteCode, data: &[u8]) -> bool {
        if !has_pdf_signature(data) {
            warn!("Not caching payload for route {}: missing PDF signature", route);
            return false;
        }

        match self.write_atomic(route, data) {
            Ok(path) => {
                debug!("Cached PDF for route {} at {}", route, path.display());
                true
            }
            Err(e) => {
                warn!("Error caching PDF for route {}: {}", route, e);
                false
            }
        }
    }

    fn write_atomic(&self, route: &RouteCode, data: &[u8]) -> std::io::Result<PathBuf> {
        fs::create_dir_all(&self.root)?;

        let path = self.path_for(route);
        let temp_path = path.with_extension("tmp");
        fs::write(&temp_path, data)?;
        fs::rename(&temp_path, &path)?;
        Ok(path)
    }

    /// Remove one route's document. Returns whether a file was removed.
    pub fn evict(&self, route: &RouteCode) -> bool {
        let path = self.path_for(route);
        if !path.exists() {
            return false;
        }

        match fs::remove_file(&path) {
            Ok(()) => {
                debug!("Evicted cached PDF for route {}", route);
                true
            }
            Err(e) => {
                warn!("Error removing cached PDF {}: {}", path.display(), e);
                false
            }
        }
    }

    /// Remove every cached document. Returns the number of files removed.
    pub fn evict_all(&self) -> usize {
        let mut removed = 0;
        for path in self.pdf_files() {
            match fs::remove_file(&path) {
                Ok(()) => removed += 1,
                Err(e) => warn!("Error removing cached PDF {}: {}", path.display(), e),
            }
        }
        debug!("Evicted {} cached PDFs", removed);
        removed
    }

    /// List cached documents with their sizes.
    pub fn list(&self) -> CacheListing {
        let mut entries: Vec<CacheEntry> = self
            .pdf_files()
            .into_iter()
            .filter_map(|path| {
                let route_code = path.file_stem()?.to_str()?.to_string();
                match fs::metadata(&path) {
                    Ok(metadata) => Some(CacheEntry {
                        route_code,
                        size: metadata.len(),
                    }),
                    Err(e) => {
                        warn!("Error reading metadata for {}: {}", path.display(), e);
                        None
                    }
                }
            })
            .collect();

        entries.sort_by(|a, b| a.route_code.cmp(&b.route_code));
        let total_bytes = entries.iter().map(|e| e.size).sum();

        CacheListing {
            entries,
            total_bytes,
        }
    }

    fn pdf_files(&self) -> Vec<PathBuf> {
        let entries = match fs::read_dir(&self.root) {
            Ok(entries) => entries,
            Err(e) => {
                if e.kind() != std::io::ErrorKind::NotFound {
                    warn!("Error reading cache directory {}: {}", self.root.display(), e);
                }
                return Vec::new();
            }
        };

        entries
            .flatten()
            .map(|entry| entry.path())
            .filter(|path| path.is_file() && path.extension().map(|e| e == "pdf").unwrap_or(false))
            .collect()
    }
}
