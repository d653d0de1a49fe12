//! Fetch capability consumed by the mesh loader.
//!
//! A [`FileSource`] turns a [`Resource`] into bytes asynchronously and
//! reports exactly one [`Response`] per request, possibly from another
//! thread. The returned [`AsyncRequest`] cancels the request when cancelled
//! explicitly or dropped.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use rustc_hash::FxHashMap;

use crate::descriptor::SourceKind;

/// What a request is for. Sources may use it to pick caching behavior.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ResourceKind {
    Mesh,
}

/// A fetchable resource.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Resource {
    pub kind: ResourceKind,
    pub uri: String,
}

impl Resource {
    pub fn new(kind: ResourceKind, uri: impl Into<String>) -> Self {
        Self {
            kind,
            uri: uri.into(),
        }
    }

    pub fn mesh(uri: impl Into<String>) -> Self {
        Self::new(ResourceKind::Mesh, uri)
    }
}

/// Why a fetch failed.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ErrorReason {
    NotFound,
    Server,
    Connection,
    Other,
}

/// Failure detail attached to a [`Response`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ResponseError {
    pub reason: ErrorReason,
    pub message: String,
}

impl ResponseError {
    pub fn new(reason: ErrorReason, message: impl Into<String>) -> Self {
        Self {
            reason,
            message: message.into(),
        }
    }
}

/// Result of a fetch.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Response {
    pub error: Option<ResponseError>,
    /// Cache revalidation succeeded and no body was sent.
    pub not_modified: bool,
    pub data: Option<Arc<[u8]>>,
}

impl Response {
    pub fn ok(data: impl Into<Arc<[u8]>>) -> Self {
        Self {
            data: Some(data.into()),
            ..Self::default()
        }
    }

    pub fn error(reason: ErrorReason, message: impl Into<String>) -> Self {
        Self {
            error: Some(ResponseError::new(reason, message)),
            ..Self::default()
        }
    }

    pub fn not_modified() -> Self {
        Self {
            not_modified: true,
            ..Self::default()
        }
    }
}

/// Completion for a single request. May be invoked on any thread.
pub type ResponseCallback = Box<dyn FnOnce(Response) + Send + 'static>;

/// Shared cancellation flag observed by a source while a request is in flight.
#[derive(Clone, Debug, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }
}

/// Handle to an in-flight request. Dropping it cancels the request.
#[derive(Debug)]
pub struct AsyncRequest {
    token: CancelToken,
}

impl AsyncRequest {
    /// Create a handle and the token the source should check.
    pub fn new() -> (Self, CancelToken) {
        let token = CancelToken::default();
        (
            Self {
                token: token.clone(),
            },
            token,
        )
    }

    pub fn cancel(&self) {
        self.token.0.store(true, Ordering::Release);
    }

    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }
}

impl Drop for AsyncRequest {
    fn drop(&mut self) {
        self.cancel();
    }
}

/// An asynchronous byte-fetching capability.
pub trait FileSource: Send + Sync {
    /// Start fetching `resource`. `callback` runs once when the fetch
    /// completes, unless the returned handle is cancelled first.
    fn request(&self, resource: Resource, callback: ResponseCallback) -> AsyncRequest;
}

/// Fetch sources keyed by [`SourceKind`].
#[derive(Clone, Default)]
pub struct SourceRegistry {
    sources: FxHashMap<SourceKind, Arc<dyn FileSource>>,
}

impl SourceRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register the source serving `kind`, replacing any previous one.
    pub fn insert(&mut self, kind: SourceKind, source: Arc<dyn FileSource>) -> &mut Self {
        self.sources.insert(kind, source);
        self
    }

    pub fn with(mut self, kind: SourceKind, source: Arc<dyn FileSource>) -> Self {
        self.insert(kind, source);
        self
    }

    pub fn get(&self, kind: SourceKind) -> Option<&Arc<dyn FileSource>> {
        self.sources.get(&kind)
    }
}
