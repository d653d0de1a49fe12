//! In-memory fetch source for embedded assets and tests.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use rustc_hash::FxHashMap;

use crate::source::{
    AsyncRequest, CancelToken, ErrorReason, FileSource, Resource, Response, ResponseCallback,
};

/// When a [`MemoryFileSource`] invokes its callbacks.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DeliveryMode {
    /// Inside `request`, before it returns.
    Immediate,
    /// Queued until [`MemoryFileSource::flush`].
    Deferred,
}

#[derive(Clone)]
enum Entry {
    Data(Arc<[u8]>),
    Error(ErrorReason),
    NotModified,
}

struct Queued {
    uri: String,
    token: CancelToken,
    callback: ResponseCallback,
}

/// Serves payloads from a map. Unknown uris answer `NotFound`.
pub struct MemoryFileSource {
    mode: DeliveryMode,
    entries: Mutex<FxHashMap<String, Entry>>,
    queue: Mutex<Vec<Queued>>,
    request_count: AtomicUsize,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

impl MemoryFileSource {
    pub fn new(mode: DeliveryMode) -> Self {
        Self {
            mode,
            entries: Mutex::new(FxHashMap::default()),
            queue: Mutex::new(Vec::new()),
            request_count: AtomicUsize::new(0),
        }
    }

    /// Serve `data` for `uri`.
    pub fn insert(&self, uri: impl Into<String>, data: impl Into<Arc<[u8]>>) {
        lock(&self.entries).insert(uri.into(), Entry::Data(data.into()));
    }

    /// Answer requests for `uri` with a fetch error.
    pub fn insert_error(&self, uri: impl Into<String>, reason: ErrorReason) {
        lock(&self.entries).insert(uri.into(), Entry::Error(reason));
    }

    /// Answer requests for `uri` as a cache revalidation without a body.
    pub fn insert_not_modified(&self, uri: impl Into<String>) {
        lock(&self.entries).insert(uri.into(), Entry::NotModified);
    }

    /// Total number of `request` calls so far.
    pub fn request_count(&self) -> usize {
        self.request_count.load(Ordering::Relaxed)
    }

    /// Number of deferred requests waiting for [`flush`](Self::flush).
    pub fn queued_count(&self) -> usize {
        lock(&self.queue).len()
    }

    /// Deliver every queued request that has not been cancelled.
    /// Returns the number of callbacks invoked.
    pub fn flush(&self) -> usize {
        let queued = std::mem::take(&mut *lock(&self.queue));
        let mut delivered = 0;
        for item in queued {
            if item.token.is_cancelled() {
                continue;
            }
            (item.callback)(self.respond(&item.uri));
            delivered += 1;
        }
        delivered
    }

    fn respond(&self, uri: &str) -> Response {
        match lock(&self.entries).get(uri).cloned() {
            Some(Entry::Data(data)) => Response::ok(data),
            Some(Entry::Error(reason)) => Response::error(reason, format!("{uri}: {reason:?}")),
            Some(Entry::NotModified) => Response::not_modified(),
            None => Response::error(ErrorReason::NotFound, format!("{uri}: not found")),
        }
    }
}

impl Default for MemoryFileSource {
    fn default() -> Self {
        Self::new(DeliveryMode::Immediate)
    }
}

impl FileSource for MemoryFileSource {
    fn request(&self, resource: Resource, callback: ResponseCallback) -> AsyncRequest {
        self.request_count.fetch_add(1, Ordering::Relaxed);
        let (request, token) = AsyncRequest::new();
        match self.mode {
            DeliveryMode::Immediate => callback(self.respond(&resource.uri)),
            DeliveryMode::Deferred => lock(&self.queue).push(Queued {
                uri: resource.uri,
                token,
                callback,
            }),
        }
        request
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn collect(source: &MemoryFileSource, uri: &str) -> (AsyncRequest, Arc<Mutex<Vec<Response>>>) {
        let out = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&out);
        let request = source.request(
            Resource::mesh(uri),
            Box::new(move |response: Response| sink.lock().unwrap().push(response)),
        );
        (request, out)
    }

    #[test]
    fn test_immediate_delivery() {
        let source = MemoryFileSource::default();
        source.insert("a.obj", b"v 0 0 0".to_vec());
        let (_req, out) = collect(&source, "a.obj");
        let out = out.lock().unwrap();
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].data.as_deref(), Some(&b"v 0 0 0"[..]));
        assert_eq!(source.request_count(), 1);
    }

    #[test]
    fn test_unknown_uri_is_not_found() {
        let source = MemoryFileSource::default();
        let (_req, out) = collect(&source, "missing.obj");
        let out = out.lock().unwrap();
        assert_eq!(
            out[0].error.as_ref().map(|e| e.reason),
            Some(ErrorReason::NotFound)
        );
    }

    #[test]
    fn test_deferred_waits_for_flush() {
        let source = MemoryFileSource::new(DeliveryMode::Deferred);
        source.insert("a.obj", b"v 0 0 0".to_vec());
        let (_req, out) = collect(&source, "a.obj");
        assert!(out.lock().unwrap().is_empty());
        assert_eq!(source.queued_count(), 1);
        assert_eq!(source.flush(), 1);
        assert_eq!(out.lock().unwrap().len(), 1);
        assert_eq!(source.queued_count(), 0);
    }

    #[test]
    fn test_cancelled_deferred_request_is_dropped() {
        let source = MemoryFileSource::new(DeliveryMode::Deferred);
        let (req, out) = collect(&source, "a.obj");
        drop(req);
        assert_eq!(source.flush(), 0);
        assert!(out.lock().unwrap().is_empty());
    }

    #[test]
    fn test_error_and_not_modified_entries() {
        let source = MemoryFileSource::default();
        source.insert_error("broken.obj", ErrorReason::Server);
        source.insert_not_modified("cached.obj");

        let (_a, broken) = collect(&source, "broken.obj");
        let (_b, cached) = collect(&source, "cached.obj");
        assert_eq!(
            broken.lock().unwrap()[0].error.as_ref().map(|e| e.reason),
            Some(ErrorReason::Server)
        );
        assert!(cached.lock().unwrap()[0].not_modified);
    }
}
