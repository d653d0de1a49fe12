//! Mesh loaders: fetch bytes through a [`FileSource`] and decode them into a [`Mesh`].

use rustc_hash::FxHashMap;
use terra_mesh::{LoadStatus, Mesh, parse_obj};
use tracing::debug;

use crate::source::{AsyncRequest, ErrorReason, FileSource, Resource, Response};

/// Outcome of one `load_mesh` call, delivered to the registered callback.
#[derive(Debug)]
pub struct MeshLoadEvent {
    pub status: LoadStatus,
    pub uri: String,
    /// Present only when `status` is `Ok` and the uri named a real asset.
    pub mesh: Option<Mesh>,
}

/// Receives load outcomes on the thread that calls [`MeshLoader::poll`].
pub type MeshLoadCallback = Box<dyn FnMut(MeshLoadEvent)>;

/// Asynchronous mesh loading capability.
pub trait MeshLoader {
    /// Start loading `uri` from `source`. Does nothing until a callback is
    /// registered with [`on_loaded`](Self::on_loaded).
    fn load_mesh(&mut self, uri: &str, source: &dyn FileSource);

    /// Register the completion callback, replacing any previous one.
    fn on_loaded(&mut self, callback: MeshLoadCallback);

    /// Deliver completed loads to the callback on the calling thread.
    /// Returns the number of events delivered.
    fn poll(&mut self) -> usize;

    /// Cancel every in-flight request for `uri`. Cancelled requests never
    /// reach the callback. Returns the number of requests cancelled.
    fn cancel(&mut self, uri: &str) -> usize;

    /// Number of issued requests that have not completed or been cancelled.
    fn pending_count(&self) -> usize;
}

/// Create the OBJ loader behind the [`MeshLoader`] interface.
pub fn create_obj_loader() -> Box<dyn MeshLoader> {
    Box::new(ObjMeshLoader::new())
}

struct PendingRequest {
    uri: String,
    _request: AsyncRequest,
}

/// Decoded result sent from the fetch thread to the owning thread.
struct Completion {
    id: u64,
    status: LoadStatus,
    mesh: Option<Mesh>,
}

/// Loads Wavefront OBJ meshes.
///
/// Decoding runs inside the fetch completion, which may be a worker thread.
/// The decoded result travels over a channel and is handed to the callback
/// by [`poll`](MeshLoader::poll), so the callback and the pending-request map
/// are only touched by the owning thread.
pub struct ObjMeshLoader {
    callback: Option<MeshLoadCallback>,
    requests: FxHashMap<u64, PendingRequest>,
    next_id: u64,
    completion_sender: crossbeam_channel::Sender<Completion>,
    completion_receiver: crossbeam_channel::Receiver<Completion>,
}

impl ObjMeshLoader {
    pub fn new() -> Self {
        let (tx, rx) = crossbeam_channel::unbounded();
        Self {
            callback: None,
            requests: FxHashMap::default(),
            next_id: 0,
            completion_sender: tx,
            completion_receiver: rx,
        }
    }
}

impl Default for ObjMeshLoader {
    fn default() -> Self {
        Self::new()
    }
}

/// Map a fetch response to a load status and, on success, a decoded mesh.
fn decode_response(response: &Response) -> (LoadStatus, Option<Mesh>) {
    if let Some(error) = &response.error {
        let status = match error.reason {
            ErrorReason::NotFound => LoadStatus::NotFound,
            _ => LoadStatus::UnknownError,
        };
        return (status, None);
    }
    if response.not_modified {
        // Revalidation without a cached body to fall back to.
        return (LoadStatus::UnknownError, None);
    }
    let data = response.data.as_deref().unwrap_or_default();
    let (report, mesh) = parse_obj(data);
    if report.status.is_ok() {
        debug!(
            "Parsed OBJ: {} positions, {} normals, {} triangles",
            report.position_count, report.normal_count, report.triangle_count
        );
    }
    (report.status, mesh)
}

impl MeshLoader for ObjMeshLoader {
    fn load_mesh(&mut self, uri: &str, source: &dyn FileSource) {
        let Some(callback) = self.callback.as_mut() else {
            return;
        };
        if uri.is_empty() {
            callback(MeshLoadEvent {
                status: LoadStatus::Ok,
                uri: String::new(),
                mesh: None,
            });
            return;
        }

        let id = self.next_id;
        self.next_id += 1;

        let tx = self.completion_sender.clone();
        let request = source.request(
            Resource::mesh(uri),
            Box::new(move |response: Response| {
                let (status, mesh) = decode_response(&response);
                let _ = tx.send(Completion { id, status, mesh });
            }),
        );
        debug!("Mesh request {} issued for {}", id, uri);

        // Completions are only consumed by `poll`, so inserting after the
        // request has been issued cannot race a fast source.
        self.requests.insert(
            id,
            PendingRequest {
                uri: uri.to_string(),
                _request: request,
            },
        );
    }

    fn on_loaded(&mut self, callback: MeshLoadCallback) {
        self.callback = Some(callback);
    }

    fn poll(&mut self) -> usize {
        let mut delivered = 0;
        while let Ok(completion) = self.completion_receiver.try_recv() {
            let Some(pending) = self.requests.remove(&completion.id) else {
                debug!("Dropping completion for cancelled request {}", completion.id);
                continue;
            };
            debug!(
                "Mesh request {} for {} finished: {}",
                completion.id, pending.uri, completion.status
            );
            delivered += 1;
            if let Some(callback) = self.callback.as_mut() {
                callback(MeshLoadEvent {
                    status: completion.status,
                    uri: pending.uri,
                    mesh: completion.mesh,
                });
            }
        }
        delivered
    }

    fn cancel(&mut self, uri: &str) -> usize {
        let before = self.requests.len();
        // Dropping the pending entry drops its handle, which cancels the fetch.
        self.requests.retain(|_, pending| pending.uri != uri);
        let cancelled = before - self.requests.len();
        if cancelled > 0 {
            debug!("Cancelled {} request(s) for {}", cancelled, uri);
        }
        cancelled
    }

    fn pending_count(&self) -> usize {
        self.requests.len()
    }
}
